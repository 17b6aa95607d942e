//! The set of known interfaces and classes, and the membership queries over them.

use crate::descriptor::{ClassDescriptor, InterfaceDescriptor};
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

#[derive(Default)]
struct CatalogInner {
  interfaces: HashMap<String, Arc<InterfaceDescriptor>>,
  classes: HashMap<String, Arc<ClassDescriptor>>,
  by_type: HashMap<TypeId, String>,
}

impl CatalogInner {
  /// Drops `class` from the type index if the index points at it, handing the
  /// entry to another declared class of the same type when there is one.
  fn unindex(&mut self, class: &ClassDescriptor) {
    let Some(type_id) = class.value_type() else {
      return;
    };
    if self.by_type.get(&type_id).map(String::as_str) != Some(class.name()) {
      return;
    }
    self.by_type.remove(&type_id);
    let heir = self
      .classes
      .values()
      .find(|other| other.value_type() == Some(type_id))
      .map(|other| other.name().to_owned());
    if let Some(heir) = heir {
      self.by_type.insert(type_id, heir);
    }
  }
}

/// Registry of type descriptors.
///
/// A name is either an interface or a class, never both: declaring one kind
/// under a name replaces a previous declaration of the other kind.
#[derive(Default)]
pub struct TypeCatalog {
  inner: RwLock<CatalogInner>,
}

impl TypeCatalog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn declare_interface(&self, interface: InterfaceDescriptor) {
    let mut inner = self.inner.write();
    let name = interface.name().to_owned();
    if let Some(previous) = inner.classes.remove(&name) {
      inner.unindex(&previous);
    }
    inner.interfaces.insert(name, Arc::new(interface));
  }

  /// Declares `class`, replacing any interface or class of the same name.
  ///
  /// The first class declared over a Rust type keeps the type index for as
  /// long as it stays declared.
  pub fn declare_class(&self, class: ClassDescriptor) -> Arc<ClassDescriptor> {
    let class = Arc::new(class);
    let mut inner = self.inner.write();
    let name = class.name().to_owned();
    inner.interfaces.remove(&name);
    if let Some(previous) = inner.classes.insert(name.clone(), Arc::clone(&class)) {
      inner.unindex(&previous);
    }
    if let Some(type_id) = class.value_type() {
      inner.by_type.entry(type_id).or_insert(name);
    }
    class
  }

  /// Whether `name` is a known interface or class.
  pub fn contains(&self, name: &str) -> bool {
    let inner = self.inner.read();
    inner.interfaces.contains_key(name) || inner.classes.contains_key(name)
  }

  pub fn is_interface(&self, name: &str) -> bool {
    self.inner.read().interfaces.contains_key(name)
  }

  pub fn interface(&self, name: &str) -> Option<Arc<InterfaceDescriptor>> {
    self.inner.read().interfaces.get(name).cloned()
  }

  pub fn class(&self, name: &str) -> Option<Arc<ClassDescriptor>> {
    self.inner.read().classes.get(name).cloned()
  }

  /// The class declared for the Rust type `T`, if any.
  ///
  /// When several classes share `T`, this is the earliest one still declared.
  pub fn class_for_type<T: 'static>(&self) -> Option<Arc<ClassDescriptor>> {
    let inner = self.inner.read();
    let name = inner.by_type.get(&TypeId::of::<T>())?;
    inner.classes.get(name).cloned()
  }

  /// Whether `name` is a class that can actually be built.
  pub fn is_concrete(&self, name: &str) -> bool {
    self
      .inner
      .read()
      .classes
      .get(name)
      .is_some_and(|class| class.is_instantiable())
  }

  /// Whether `name` is `target`, or inherits or implements it, transitively.
  pub fn is_a(&self, name: &str, target: &str) -> bool {
    let inner = self.inner.read();
    let mut seen = HashSet::new();
    let mut pending = VecDeque::from([name.to_owned()]);

    while let Some(current) = pending.pop_front() {
      if current == target {
        return true;
      }
      if !seen.insert(current.clone()) {
        continue;
      }
      if let Some(class) = inner.classes.get(&current) {
        pending.extend(class.parent().map(str::to_owned));
        pending.extend(class.interfaces().iter().cloned());
      } else if let Some(interface) = inner.interfaces.get(&current) {
        pending.extend(interface.parents().iter().cloned());
      }
    }
    false
  }

  /// Like [`is_a`](Self::is_a), but false when `name == target`.
  pub fn is_subclass_of(&self, name: &str, target: &str) -> bool {
    name != target && self.is_a(name, target)
  }
}
