// Shared fixtures: a small user/account model hierarchy.
//
//   IModel <- IUserModel, IAccountModel <- ICharacterAccount
//   BaseModel (abstract, IModel) <- UserModel (IUserModel)
//                                <- AccountModel (IAccountModel) <- CharacterAccountModel

#![allow(dead_code)]

use fibre_factory::{ClassDescriptor, Factory, InterfaceDescriptor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub trait User: Send + Sync {
  fn name(&self) -> String;
}

pub trait Account: Send + Sync {
  fn user(&self) -> Arc<dyn User>;
}

pub struct UserModel {
  pub serial: usize,
}

impl User for UserModel {
  fn name(&self) -> String {
    format!("user-{}", self.serial)
  }
}

pub struct AccountModel {
  pub user: Arc<dyn User>,
}

impl Account for AccountModel {
  fn user(&self) -> Arc<dyn User> {
    Arc::clone(&self.user)
  }
}

pub struct CharacterAccountModel {
  pub user: Arc<dyn User>,
  pub user_account: Arc<dyn Account>,
}

impl Account for CharacterAccountModel {
  fn user(&self) -> Arc<dyn User> {
    Arc::clone(&self.user)
  }
}

/// Declares the model hierarchy. `serials` numbers every `UserModel` built.
pub fn declare_models(factory: &Factory, serials: Arc<AtomicUsize>) {
  let types = factory.types();
  types.declare_interface(InterfaceDescriptor::new("IModel"));
  types.declare_interface(InterfaceDescriptor::new("IUserModel").extends("IModel"));
  types.declare_interface(InterfaceDescriptor::new("IAccountModel").extends("IModel"));
  types.declare_interface(InterfaceDescriptor::new("ICharacterAccount").extends("IAccountModel"));

  types.declare_class(
    ClassDescriptor::abstract_class("BaseModel")
      .implements("IModel")
      .build(),
  );

  types.declare_class(
    ClassDescriptor::builder::<UserModel>("UserModel")
      .extends("BaseModel")
      .implements("IUserModel")
      .view(|this| this as Arc<dyn User>)
      .constructor(move |_| {
        Ok(UserModel {
          serial: serials.fetch_add(1, Ordering::SeqCst),
        })
      })
      .build(),
  );

  types.declare_class(
    ClassDescriptor::builder::<AccountModel>("AccountModel")
      .extends("BaseModel")
      .implements("IAccountModel")
      .param("user", "IUserModel")
      .view(|this| this as Arc<dyn Account>)
      .constructor(|args| {
        Ok(AccountModel {
          user: args.get::<dyn User>(0)?,
        })
      })
      .build(),
  );

  types.declare_class(
    ClassDescriptor::builder::<CharacterAccountModel>("CharacterAccountModel")
      .extends("AccountModel")
      .implements("ICharacterAccount")
      .param("user_account", "IAccountModel")
      .view(|this| this as Arc<dyn Account>)
      .constructor(|args| {
        let user_account = args.get::<dyn Account>(0)?;
        Ok(CharacterAccountModel {
          user: user_account.user(),
          user_account,
        })
      })
      .build(),
  );
}

/// A fresh factory with the model hierarchy declared and nothing bound.
pub fn model_factory() -> (Factory, Arc<AtomicUsize>) {
  let factory = Factory::new();
  let serials = Arc::new(AtomicUsize::new(0));
  declare_models(&factory, Arc::clone(&serials));
  (factory, serials)
}
