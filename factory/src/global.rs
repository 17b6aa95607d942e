//! The global factory instance and access functions.

use crate::factory::Factory;
use once_cell::sync::Lazy;

// The one process-wide factory, created on first access.
static GLOBAL_FACTORY: Lazy<Factory> = Lazy::new(Factory::default);

/// Provides a reference to the global factory.
///
/// Applications that prefer explicit ownership can create their own
/// [`Factory`] and pass it around instead.
///
/// # Examples
///
/// ```
/// use fibre_factory::{global, ClassDescriptor};
///
/// struct Clock;
///
/// global()
///   .types()
///   .declare_class(ClassDescriptor::builder::<Clock>("Clock").constructor(|_| Ok(Clock)).build());
///
/// let clock = global().get_instance("Clock").unwrap();
/// assert_eq!(clock.class_name(), "Clock");
/// ```
pub fn global() -> &'static Factory {
  &GLOBAL_FACTORY
}
