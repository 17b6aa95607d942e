use crate::descriptor::{ClassDescriptor, ErasedValue};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// An object produced by the factory.
///
/// Cloning an `Instance` is cheap and yields a handle to the *same* object.
/// The instance remembers the class it was built as, which is what interface
/// membership checks are made against.
#[derive(Clone)]
pub struct Instance {
  class: Arc<ClassDescriptor>,
  value: ErasedValue,
}

impl Instance {
  pub(crate) fn new(class: Arc<ClassDescriptor>, value: ErasedValue) -> Self {
    Self { class, value }
  }

  pub fn class(&self) -> &ClassDescriptor {
    &self.class
  }

  pub fn class_name(&self) -> &str {
    self.class.name()
  }

  /// Returns the object as its concrete Rust type.
  pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
    Arc::clone(&self.value).downcast::<T>().ok()
  }

  /// Returns the object as `Arc<I>`, if its class registered such a view.
  pub fn view<I: ?Sized + Any + Send + Sync>(&self) -> Option<Arc<I>> {
    let cast = self.class.view_fn(TypeId::of::<I>())?;
    cast(Arc::clone(&self.value))
      .and_then(|boxed| boxed.downcast::<Arc<I>>().ok())
      .map(|arc_in_a_box| *arc_in_a_box)
  }

  /// Whether both handles point at the same object.
  pub fn ptr_eq(&self, other: &Instance) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(&self.value), Arc::as_ptr(&other.value))
  }
}

impl fmt::Debug for Instance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Instance")
      .field("class", &self.class.name())
      .field("addr", &Arc::as_ptr(&self.value).cast::<()>())
      .finish()
  }
}
