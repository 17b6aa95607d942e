//! Public macros for resolving from the global factory.

/// Resolves a new instance from the global factory.
///
/// `instance!("Name")` yields an [`Instance`](crate::Instance);
/// `instance!("Name" => dyn Trait)` yields an `Arc<dyn Trait>`.
///
/// # Panics
///
/// Panics if the interface cannot be resolved. Use `global().get_instance(...)`
/// for the fallible version.
///
/// # Examples
///
/// ```
/// use fibre_factory::{global, instance, ClassDescriptor, InterfaceDescriptor};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync { fn greet(&self) -> String; }
/// struct English;
/// impl Greeter for English { fn greet(&self) -> String { "Hello!".to_string() } }
///
/// global().types().declare_interface(InterfaceDescriptor::new("IGreeter"));
/// global().types().declare_class(
///   ClassDescriptor::builder::<English>("English")
///     .implements("IGreeter")
///     .view(|this| this as Arc<dyn Greeter>)
///     .constructor(|_| Ok(English))
///     .build(),
/// );
/// global().register_class("IGreeter", "English").unwrap();
///
/// let greeter = instance!("IGreeter" => dyn Greeter);
/// assert_eq!(greeter.greet(), "Hello!");
/// ```
#[macro_export]
macro_rules! instance {
  ($interface:expr => $view:ty) => {
    $crate::global()
      .get::<$view>($interface)
      .unwrap_or_else(|e| panic!("Failed to resolve required interface '{}': {}", $interface, e))
  };

  ($interface:expr) => {
    $crate::global()
      .get_instance($interface)
      .unwrap_or_else(|e| panic!("Failed to resolve required interface '{}': {}", $interface, e))
  };
}

/// Resolves the shared instance from the global factory.
///
/// Same forms as [`instance!`].
///
/// # Panics
///
/// Panics if the interface cannot be resolved.
#[macro_export]
macro_rules! shared {
  ($interface:expr => $view:ty) => {
    $crate::global()
      .get_shared::<$view>($interface)
      .unwrap_or_else(|e| panic!("Failed to resolve required shared interface '{}': {}", $interface, e))
  };

  ($interface:expr) => {
    $crate::global()
      .get_shared_instance($interface)
      .unwrap_or_else(|e| panic!("Failed to resolve required shared interface '{}': {}", $interface, e))
  };
}
