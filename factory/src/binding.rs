//! Bindings: what an interface name resolves to.

use crate::descriptor::ClassDescriptor;
use crate::error::Result;
use crate::factory::Factory;
use crate::instance::Instance;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

type ProviderFn = dyn Fn(&Factory) -> Result<Instance> + Send + Sync;

/// A function producing instances for an interface.
///
/// It takes no dependency arguments. It is handed the owning factory so it
/// can resolve whatever it needs itself. A provider must declare the
/// capability it returns with [`Provider::returns`] before it can be
/// registered.
#[derive(Clone)]
pub struct Provider {
  func: Arc<ProviderFn>,
  returns: Option<String>,
}

impl Provider {
  pub fn new(func: impl Fn(&Factory) -> Result<Instance> + Send + Sync + 'static) -> Self {
    Self {
      func: Arc::new(func),
      returns: None,
    }
  }

  /// Declares the capability the provider's instances satisfy.
  pub fn returns(mut self, capability: impl Into<String>) -> Self {
    self.returns = Some(capability.into());
    self
  }

  pub fn return_type(&self) -> Option<&str> {
    self.returns.as_deref()
  }

  pub(crate) fn call(&self, factory: &Factory) -> Result<Instance> {
    (self.func)(factory)
  }
}

impl fmt::Debug for Provider {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Provider")
      .field("returns", &self.returns)
      .finish_non_exhaustive()
  }
}

/// The two ways an interface can be bound.
#[derive(Debug)]
pub enum BindingKind {
  /// Built by calling a class constructor with its resolved dependencies.
  Class {
    implementation: Arc<ClassDescriptor>,
    dependencies: Vec<String>,
  },
  /// Produced by calling a provider function.
  Provider(Provider),
}

/// A stored association from an interface name to a way of producing instances.
pub struct Binding {
  interface: String,
  kind: BindingKind,
  shared: OnceCell<Instance>,
}

impl Binding {
  pub(crate) fn class(
    interface: impl Into<String>,
    implementation: Arc<ClassDescriptor>,
    dependencies: Vec<String>,
  ) -> Self {
    Self {
      interface: interface.into(),
      kind: BindingKind::Class {
        implementation,
        dependencies,
      },
      shared: OnceCell::new(),
    }
  }

  /// A provider binding whose shared instance is seeded up front.
  pub(crate) fn provider(interface: impl Into<String>, provider: Provider, seed: Instance) -> Self {
    Self {
      interface: interface.into(),
      kind: BindingKind::Provider(provider),
      shared: OnceCell::with_value(seed),
    }
  }

  pub fn interface(&self) -> &str {
    &self.interface
  }

  pub fn kind(&self) -> &BindingKind {
    &self.kind
  }

  /// Ordered constructor dependencies. Always empty for provider bindings.
  pub fn dependencies(&self) -> &[String] {
    match &self.kind {
      BindingKind::Class { dependencies, .. } => dependencies,
      BindingKind::Provider(_) => &[],
    }
  }

  /// The cached shared instance, if one has been created.
  pub fn shared_instance(&self) -> Option<&Instance> {
    self.shared.get()
  }

  pub(crate) fn shared_cell(&self) -> &OnceCell<Instance> {
    &self.shared
  }
}

impl fmt::Debug for Binding {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Binding")
      .field("interface", &self.interface)
      .field("kind", &self.kind)
      .field("shared", &self.shared.get().is_some())
      .finish()
  }
}
