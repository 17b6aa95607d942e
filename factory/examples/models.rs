use fibre_factory::{ClassDescriptor, Factory, InterfaceDescriptor, Provider};
use std::sync::Arc;

// A small model hierarchy:
//   IModel <- IUserModel, IAccountModel <- ICharacterAccount
//   BaseModel <- UserModel, AccountModel <- CharacterAccountModel

trait User: Send + Sync {
  fn name(&self) -> &str;
}

trait Account: Send + Sync {
  fn user(&self) -> Arc<dyn User>;
}

struct UserModel;
impl User for UserModel {
  fn name(&self) -> &str {
    "guest"
  }
}

struct AccountModel {
  user: Arc<dyn User>,
}
impl Account for AccountModel {
  fn user(&self) -> Arc<dyn User> {
    Arc::clone(&self.user)
  }
}

struct CharacterAccountModel {
  user_account: Arc<dyn Account>,
}
impl Account for CharacterAccountModel {
  fn user(&self) -> Arc<dyn User> {
    self.user_account.user()
  }
}

fn declare_types(factory: &Factory) {
  let types = factory.types();
  types.declare_interface(InterfaceDescriptor::new("IModel"));
  types.declare_interface(InterfaceDescriptor::new("IUserModel").extends("IModel"));
  types.declare_interface(InterfaceDescriptor::new("IAccountModel").extends("IModel"));
  types.declare_interface(InterfaceDescriptor::new("ICharacterAccount").extends("IAccountModel"));
  types.declare_class(ClassDescriptor::abstract_class("BaseModel").implements("IModel").build());

  types.declare_class(
    ClassDescriptor::builder::<UserModel>("UserModel")
      .extends("BaseModel")
      .implements("IUserModel")
      .view(|this| this as Arc<dyn User>)
      .constructor(|_| Ok(UserModel))
      .build(),
  );
  types.declare_class(
    ClassDescriptor::builder::<AccountModel>("AccountModel")
      .extends("BaseModel")
      .implements("IAccountModel")
      .param("user", "IUserModel")
      .view(|this| this as Arc<dyn Account>)
      .constructor(|args| Ok(AccountModel { user: args.get::<dyn User>(0)? }))
      .build(),
  );
  types.declare_class(
    ClassDescriptor::builder::<CharacterAccountModel>("CharacterAccountModel")
      .extends("AccountModel")
      .implements("ICharacterAccount")
      .param("user_account", "IAccountModel")
      .view(|this| this as Arc<dyn Account>)
      .constructor(|args| {
        Ok(CharacterAccountModel {
          user_account: args.get::<dyn Account>(0)?,
        })
      })
      .build(),
  );
}

fn main() -> fibre_factory::Result<()> {
  let factory = Factory::new();
  declare_types(&factory);

  factory.register_class("IUserModel", "UserModel")?;
  factory.register_provider(
    "IAccountModel",
    Provider::new(|factory| factory.get_instance("AccountModel")).returns("IAccountModel"),
  )?;
  factory.register_class("ICharacterAccount", "CharacterAccountModel")?;

  // "AccountModel" was never bound explicitly; it binds to itself on first use.
  let non_shared = factory.get_instance("AccountModel")?;
  let shared_a = factory.get_shared_instance("AccountModel")?;
  let shared_b = factory.get_shared_instance("AccountModel")?;

  let character = factory.get::<dyn Account>("ICharacterAccount")?;
  println!("Character account belongs to: {}", character.user().name());

  println!("non-shared is shared: {}", non_shared.ptr_eq(&shared_a));
  println!("shared is shared:     {}", shared_a.ptr_eq(&shared_b));
  assert!(!non_shared.ptr_eq(&shared_a));
  assert!(shared_a.ptr_eq(&shared_b));
  Ok(())
}
