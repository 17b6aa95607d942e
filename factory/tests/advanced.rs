mod common;

use common::{model_factory, Account, User};
use fibre_factory::{ClassDescriptor, Factory, FactoryError, InterfaceDescriptor, Provider};
use pretty_assertions::assert_eq;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

// --- Advanced Test Fixtures ---

struct Node;

/// Declares `interface` plus a class `<interface>Impl` implementing it whose
/// constructor takes one parameter per entry of `needs`.
fn declare_node(factory: &Factory, interface: &str, needs: &[&str]) {
  factory
    .types()
    .declare_interface(InterfaceDescriptor::new(interface));
  let mut class = ClassDescriptor::builder::<Node>(format!("{}Impl", interface)).implements(interface);
  for (i, need) in needs.iter().enumerate() {
    class = class.param(format!("p{}", i), *need);
  }
  factory
    .types()
    .declare_class(class.constructor(|_| Ok(Node)).build());
  factory
    .register_class(interface, &format!("{}Impl", interface))
    .unwrap();
}

// --- Cycle Detection ---

#[test]
fn test_direct_cycle_is_detected_and_stack_recovers() {
  let factory = Factory::new();
  // Interfaces must exist before the classes referencing them are registered.
  factory.types().declare_interface(InterfaceDescriptor::new("IA"));
  factory.types().declare_interface(InterfaceDescriptor::new("IB"));
  declare_node(&factory, "IA", &["IB"]);
  declare_node(&factory, "IB", &["IA"]);
  declare_node(&factory, "IC", &[]);

  match factory.get_instance("IA") {
    Err(FactoryError::CircularDependency { interface, chain }) => {
      assert_eq!(interface, "IA");
      assert_eq!(chain, vec!["IA", "IB", "IA"]);
    }
    other => panic!("expected a circular dependency, got {:?}", other),
  }

  // The stack was unwound: unrelated resolutions work...
  factory.get_instance("IC").unwrap();
  // ...and the cycle is reported the same way again rather than some stale state.
  assert!(matches!(
    factory.get_instance("IB"),
    Err(FactoryError::CircularDependency { ref interface, .. }) if interface == "IB"
  ));
}

#[test]
fn test_transitive_cycle_is_detected() {
  let factory = Factory::new();
  for name in ["IA", "IB", "IC"] {
    factory.types().declare_interface(InterfaceDescriptor::new(name));
  }
  declare_node(&factory, "IA", &["IB"]);
  declare_node(&factory, "IB", &["IC"]);
  declare_node(&factory, "IC", &["IA"]);
  declare_node(&factory, "ID", &[]);

  let err = factory.get_shared_instance("IA").unwrap_err();
  assert!(matches!(err, FactoryError::CircularDependency { ref chain, .. } if chain.len() == 4));
  assert!(factory.binding("IA").unwrap().shared_instance().is_none());
  factory.get_instance("ID").unwrap();
}

#[test]
fn test_diamond_is_not_a_cycle() {
  let factory = Factory::new();
  declare_node(&factory, "IBase", &[]);
  declare_node(&factory, "ILeft", &["IBase"]);
  declare_node(&factory, "IRight", &["IBase"]);
  declare_node(&factory, "ITop", &["ILeft", "IRight", "IBase"]);

  factory.get_instance("ITop").unwrap();
}

#[test]
fn test_provider_reentering_its_own_interface_is_a_cycle() {
  let (factory, _) = model_factory();
  let seeded = Arc::new(AtomicBool::new(false));

  let flag = Arc::clone(&seeded);
  let provider = Provider::new(move |factory| {
    if flag.swap(true, Ordering::SeqCst) {
      factory.get_instance("IUserModel")
    } else {
      factory.get_instance("UserModel")
    }
  })
  .returns("IUserModel");
  factory.register_provider("IUserModel", provider).unwrap();

  assert!(matches!(
    factory.get_instance("IUserModel"),
    Err(FactoryError::CircularDependency { .. })
  ));
  // The seed is still served as the shared instance.
  factory.get_shared_instance("IUserModel").unwrap();
}

#[test]
fn test_reentering_shared_construction_fails_instead_of_deadlocking() {
  struct Outer;

  let (factory, _) = model_factory();
  factory.types().declare_interface(InterfaceDescriptor::new("IOuter"));
  factory.types().declare_class(
    ClassDescriptor::builder::<Outer>("Outer")
      .implements("IOuter")
      .param("user", "IUserModel")
      .constructor(|_| Ok(Outer))
      .build(),
  );
  factory.register_class("IOuter", "Outer").unwrap();

  let seeded = Arc::new(AtomicBool::new(false));
  let flag = Arc::clone(&seeded);
  let provider = Provider::new(move |factory| {
    if flag.swap(true, Ordering::SeqCst) {
      factory.get_shared_instance("IOuter")?;
    }
    factory.get_instance("UserModel")
  })
  .returns("IUserModel");
  factory.register_provider("IUserModel", provider).unwrap();

  assert!(matches!(
    factory.get_shared_instance("IOuter"),
    Err(FactoryError::CircularDependency { ref interface, .. }) if interface == "IOuter"
  ));
}

#[test]
fn test_panicking_constructor_leaves_stack_clean() {
  struct Fragile;

  let factory = Factory::new();
  factory.types().declare_interface(InterfaceDescriptor::new("IFragile"));
  factory.types().declare_class(
    ClassDescriptor::builder::<Fragile>("Fragile")
      .implements("IFragile")
      .constructor(|_| panic!("constructor exploded"))
      .build(),
  );
  factory.register_class("IFragile", "Fragile").unwrap();

  let result = panic::catch_unwind(AssertUnwindSafe(|| factory.get_instance("IFragile")));
  assert!(result.is_err());

  // Had the entry leaked, this would be reported as a circular dependency.
  let again = panic::catch_unwind(AssertUnwindSafe(|| factory.get_instance("IFragile")));
  assert!(again.is_err());
}

#[test]
fn test_factories_have_independent_stacks() {
  let inner = Arc::new(Factory::new());
  declare_node(&inner, "IShared", &[]);

  let outer = Factory::new();
  outer.types().declare_class(
    ClassDescriptor::builder::<Node>("SharedNode")
      .implements("IShared")
      .constructor(|_| Ok(Node))
      .build(),
  );
  outer.types().declare_interface(InterfaceDescriptor::new("IShared"));

  // Resolving "IShared" in another factory while "IShared" is under
  // construction here is not a cycle.
  let nested = Arc::clone(&inner);
  outer
    .register_provider(
      "IShared",
      Provider::new(move |factory| {
        nested.get_instance("IShared")?;
        factory.get_instance("SharedNode")
      })
      .returns("IShared"),
    )
    .unwrap();

  outer.get_instance("IShared").unwrap();
}

// --- Concurrency ---

#[test]
fn test_shared_instance_is_built_once_under_concurrency() {
  static CONSTRUCTIONS: AtomicUsize = AtomicUsize::new(0);
  struct Slow;

  let factory = Factory::new();
  factory.types().declare_class(
    ClassDescriptor::builder::<Slow>("Slow")
      .constructor(|_| {
        CONSTRUCTIONS.fetch_add(1, Ordering::SeqCst);
        // Widen the window for a racing second construction.
        thread::sleep(Duration::from_millis(50));
        Ok(Slow)
      })
      .build(),
  );
  factory.register_class("Slow", "Slow").unwrap();

  let instances: Vec<_> = thread::scope(|s| {
    let handles: Vec<_> = (0..20)
      .map(|_| s.spawn(|| factory.get_shared_instance("Slow").unwrap()))
      .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
  });

  assert_eq!(CONSTRUCTIONS.load(Ordering::SeqCst), 1);
  assert!(instances.windows(2).all(|pair| pair[0].ptr_eq(&pair[1])));
}

#[test]
fn test_self_registered_shared_instance_is_built_once_under_concurrency() {
  const THREADS: usize = 16;
  struct Lazy;

  for _ in 0..50 {
    let constructions = Arc::new(AtomicUsize::new(0));
    let factory = Factory::new();
    let counter = Arc::clone(&constructions);
    // Never registered: every thread goes through self-registration.
    factory.types().declare_class(
      ClassDescriptor::builder::<Lazy>("Lazy")
        .constructor(move |_| {
          counter.fetch_add(1, Ordering::SeqCst);
          Ok(Lazy)
        })
        .build(),
    );

    let barrier = Barrier::new(THREADS);
    let instances: Vec<_> = thread::scope(|s| {
      let handles: Vec<_> = (0..THREADS)
        .map(|_| {
          s.spawn(|| {
            barrier.wait();
            factory.get_shared_instance("Lazy").unwrap()
          })
        })
        .collect();
      handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(constructions.load(Ordering::SeqCst), 1);
    assert!(instances.windows(2).all(|pair| pair[0].ptr_eq(&pair[1])));
    assert!(factory
      .binding("Lazy")
      .unwrap()
      .shared_instance()
      .unwrap()
      .ptr_eq(&instances[0]));
  }
}

#[test]
fn test_concurrent_resolutions_do_not_share_cycle_state() {
  let (factory, _) = model_factory();
  factory.register_class("IUserModel", "UserModel").unwrap();
  factory.register_class("IAccountModel", "AccountModel").unwrap();
  factory
    .register_class("ICharacterAccount", "CharacterAccountModel")
    .unwrap();

  // Every thread walks the same chain at the same time. A global stack would
  // make them trip over each other's entries.
  thread::scope(|s| {
    for _ in 0..8 {
      s.spawn(|| {
        for _ in 0..200 {
          let account = factory.get::<dyn Account>("ICharacterAccount").unwrap();
          assert!(account.user().name().starts_with("user-"));
        }
      });
    }
  });
}

#[test]
fn test_concurrent_registration_and_resolution() {
  let (factory, _) = model_factory();
  factory.register_class("IUserModel", "UserModel").unwrap();

  thread::scope(|s| {
    for i in 0..10 {
      let factory = &factory;
      s.spawn(move || {
        let interface = format!("IThread{}", i);
        factory
          .types()
          .declare_interface(InterfaceDescriptor::new(interface.as_str()).extends("IUserModel"));
        factory.types().declare_class(
          ClassDescriptor::builder::<Node>(format!("Thread{}", i))
            .implements(interface.as_str())
            .constructor(|_| Ok(Node))
            .build(),
        );
        factory
          .register_class(&interface, &format!("Thread{}", i))
          .unwrap();

        for _ in 0..100 {
          let user = factory.get::<dyn User>("IUserModel").unwrap();
          assert!(user.name().starts_with("user-"));
        }

        let mine = factory.get_instance(&interface).unwrap();
        assert_eq!(mine.class_name(), format!("Thread{}", i));
      });
    }
  });

  assert!(factory.is_bound("IThread5"));
}

#[test]
fn test_shared_instances_are_dropped_with_the_factory() {
  static DROPS: AtomicUsize = AtomicUsize::new(0);

  struct ConnectionPool;
  impl Drop for ConnectionPool {
    fn drop(&mut self) {
      DROPS.fetch_add(1, Ordering::SeqCst);
    }
  }

  let factory = Factory::new();
  factory.types().declare_class(
    ClassDescriptor::builder::<ConnectionPool>("ConnectionPool")
      .constructor(|_| Ok(ConnectionPool))
      .build(),
  );

  let pool = factory.get_shared_instance("ConnectionPool").unwrap();
  drop(pool);
  // The factory still holds the shared instance.
  assert_eq!(DROPS.load(Ordering::SeqCst), 0);

  drop(factory);
  assert_eq!(DROPS.load(Ordering::SeqCst), 1);
}
