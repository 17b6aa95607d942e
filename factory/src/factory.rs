//! The main `Factory` struct: registration, resolution and the shared cache.

use crate::binding::{Binding, BindingKind, Provider};
use crate::catalog::TypeCatalog;
use crate::config::FactoryConfig;
use crate::descriptor::{Args, ClassDescriptor};
use crate::error::{FactoryError, Result, SignatureFault};
use crate::instance::Instance;
use crate::resolution::{self, ResolutionGuard};
use dashmap::DashMap;
use std::any::{type_name, Any, TypeId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

static NEXT_FACTORY_ID: AtomicUsize = AtomicUsize::new(0);

/// The object factory.
///
/// Holds the type catalog and every interface binding. It is thread-safe:
/// registration and resolution may happen concurrently from any thread.
/// Bindings are replaced whole, so a resolution sees either the previous or
/// the new binding for an interface. No internal lock is held while
/// constructors or providers run, so they may resolve and register freely.
pub struct Factory {
  id: usize,
  config: FactoryConfig,
  types: TypeCatalog,
  bindings: DashMap<String, Arc<Binding>>,
}

impl Default for Factory {
  fn default() -> Self {
    Self::with_config(FactoryConfig::default())
  }
}

impl Factory {
  /// Creates a new factory with an empty catalog and default configuration.
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates a factory with an empty catalog and the given configuration.
  pub fn with_config(config: FactoryConfig) -> Self {
    Self::with_catalog(TypeCatalog::new(), config)
  }

  /// Creates a factory over an already populated catalog.
  ///
  /// The factory starts with no bindings, whatever the catalog holds.
  pub fn with_catalog(types: TypeCatalog, config: FactoryConfig) -> Self {
    Self {
      id: NEXT_FACTORY_ID.fetch_add(1, Ordering::Relaxed),
      config,
      types,
      bindings: DashMap::new(),
    }
  }

  /// The configuration this factory was created with.
  pub fn config(&self) -> &FactoryConfig {
    &self.config
  }

  /// The catalog of known interfaces and classes.
  pub fn types(&self) -> &TypeCatalog {
    &self.types
  }

  /// Wraps a value of a declared class into an `Instance`.
  ///
  /// This is how providers hand back objects they built themselves. The class
  /// is looked up by the Rust type of `value`; when several classes share that
  /// type, the one indexed first is used. Use [`wrap_as`](Self::wrap_as) to
  /// name the class explicitly.
  pub fn wrap<T: Any + Send + Sync>(&self, value: T) -> Result<Instance> {
    let class = self
      .types
      .class_for_type::<T>()
      .ok_or_else(|| FactoryError::UnregisteredInterface {
        interface: type_name::<T>().to_string(),
      })?;
    Ok(Instance::new(class, Arc::new(value)))
  }

  /// Wraps `value` as an instance of the declared class `class`.
  ///
  /// Fails when `class` is not declared, or is declared over a Rust type
  /// other than `T`.
  pub fn wrap_as<T: Any + Send + Sync>(&self, class: &str, value: T) -> Result<Instance> {
    let descriptor = self.types.class(class).ok_or_else(|| unregistered(class))?;
    if descriptor.value_type() != Some(TypeId::of::<T>()) {
      return Err(FactoryError::binding(
        class,
        type_name::<T>(),
        format!("{} is not declared over {}", class, type_name::<T>()),
      ));
    }
    Ok(Instance::new(descriptor, Arc::new(value)))
  }

  // --- Registration ---

  /// Binds `interface` to the class `implementation`.
  ///
  /// Constructor dependencies are computed now, so a malformed signature fails
  /// here rather than on first use. On failure the previous binding, if any,
  /// is left untouched.
  pub fn register_class(&self, interface: &str, implementation: &str) -> Result<()> {
    let binding = self.class_binding(interface, implementation)?;
    debug!(interface, implementation, dependencies = ?binding.dependencies(), "registered class binding");
    self.store(binding);
    Ok(())
  }

  /// Binds `interface` to a provider function.
  ///
  /// The provider is called once, immediately, to check that what it produces
  /// satisfies `interface`. That first result becomes the shared instance.
  pub fn register_provider(&self, interface: &str, provider: Provider) -> Result<()> {
    let returns = provider
      .return_type()
      .ok_or_else(|| FactoryError::signature(interface, SignatureFault::MissingReturnType))?
      .to_owned();
    if !self.types.contains(&returns) {
      return Err(FactoryError::signature(
        interface,
        SignatureFault::UnknownReturnType { ty: returns },
      ));
    }

    let seed = provider.call(self)?;
    if !self.types.is_a(seed.class_name(), interface) {
      return Err(FactoryError::binding(
        interface,
        seed.class_name(),
        format!("return value of provider doesn't implement {}", interface),
      ));
    }
    if !self.types.is_a(seed.class_name(), &returns) {
      return Err(FactoryError::binding(
        interface,
        seed.class_name(),
        format!("return value of provider doesn't match its declared type {}", returns),
      ));
    }

    debug!(interface, returns = %returns, seed = seed.class_name(), "registered provider binding");
    self.store(Binding::provider(interface, provider, seed));
    Ok(())
  }

  /// Whether `interface` currently has a binding.
  pub fn is_bound(&self, interface: &str) -> bool {
    self.bindings.contains_key(interface)
  }

  /// The current binding for `interface`.
  pub fn binding(&self, interface: &str) -> Option<Arc<Binding>> {
    self
      .bindings
      .get(interface)
      .map(|entry| Arc::clone(entry.value()))
  }

  // --- Resolution ---

  /// Builds a new instance for `interface`, resolving its dependencies recursively.
  pub fn get_instance(&self, interface: &str) -> Result<Instance> {
    self.get_instance_with(interface, false)
  }

  /// Like [`get_instance`](Self::get_instance). When `skip_self_registration`
  /// is set, an unbound interface fails immediately instead of being bound to
  /// itself.
  pub fn get_instance_with(&self, interface: &str, skip_self_registration: bool) -> Result<Instance> {
    resolution::ensure_not_resolving(self.id, interface)?;

    let binding = if skip_self_registration {
      self.binding(interface).ok_or_else(|| unregistered(interface))?
    } else {
      self.resolve_or_auto_register(interface)?
    };

    self.build(&binding)
  }

  /// Returns the binding for `interface`, binding a concrete class to itself
  /// first if it has none.
  ///
  /// Self-registration happens only when it is enabled in the configuration
  /// and `interface` names an instantiable class.
  pub fn resolve_or_auto_register(&self, interface: &str) -> Result<Arc<Binding>> {
    if let Some(binding) = self.binding(interface) {
      return Ok(binding);
    }
    if !self.config.self_registration || !self.types.is_concrete(interface) {
      return Err(unregistered(interface));
    }

    let candidate = self.class_binding(interface, interface)?;
    // Racing self-registrations all agree on the first one stored.
    let entry = self.bindings.entry(interface.to_owned()).or_insert_with(|| {
      debug!(interface, "self-registering concrete class");
      Arc::new(candidate)
    });
    Ok(Arc::clone(entry.value()))
  }

  /// Returns the shared instance for `interface`, creating it on first use.
  ///
  /// Exactly one instance is ever created per binding, even when many threads
  /// ask at once; they all receive the same object.
  pub fn get_shared_instance(&self, interface: &str) -> Result<Instance> {
    resolution::ensure_not_resolving(self.id, interface)?;
    let binding = self.resolve_or_auto_register(interface)?;

    if let Some(instance) = binding.shared_instance() {
      trace!(interface, "shared instance cache hit");
      return Ok(instance.clone());
    }

    binding
      .shared_cell()
      .get_or_try_init(|| {
        trace!(interface, "shared instance cache miss");
        self.build(&binding)
      })
      .cloned()
  }

  /// Resolves a new instance and views it as `Arc<I>`.
  pub fn get<I: ?Sized + Any + Send + Sync>(&self, interface: &str) -> Result<Arc<I>> {
    let instance = self.get_instance(interface)?;
    view_as::<I>(interface, &instance)
  }

  /// Resolves the shared instance and views it as `Arc<I>`.
  pub fn get_shared<I: ?Sized + Any + Send + Sync>(&self, interface: &str) -> Result<Arc<I>> {
    let instance = self.get_shared_instance(interface)?;
    view_as::<I>(interface, &instance)
  }

  // --- PRIVATE HELPERS ---

  /// Validates `implementation` against `interface` and builds the binding
  /// without storing it.
  fn class_binding(&self, interface: &str, implementation: &str) -> Result<Binding> {
    let class = self.types.class(implementation).ok_or_else(|| {
      FactoryError::binding(interface, implementation, "no such class is declared")
    })?;
    if !class.is_instantiable() {
      return Err(FactoryError::binding(
        interface,
        implementation,
        "class cannot be instantiated",
      ));
    }
    if !self.types.is_a(implementation, interface) {
      return Err(FactoryError::binding(
        interface,
        implementation,
        format!("{} does not implement {}", implementation, interface),
      ));
    }

    let dependencies = self.constructor_dependencies(&class)?;
    Ok(Binding::class(interface, class, dependencies))
  }

  fn store(&self, binding: Binding) {
    let interface = binding.interface().to_owned();
    if self
      .bindings
      .insert(interface.clone(), Arc::new(binding))
      .is_some()
    {
      debug!(interface = %interface, "replaced existing binding");
    }
  }

  /// Produces an instance from `binding` with its interface on the resolution stack.
  fn build(&self, binding: &Binding) -> Result<Instance> {
    let interface = binding.interface();
    let _guard = ResolutionGuard::enter(self.id, interface)?;
    trace!(interface, "resolving");

    match binding.kind() {
      // Providers always run for a fresh instance; the seed is only ever
      // handed out as the shared instance.
      BindingKind::Provider(provider) => provider.call(self),
      BindingKind::Class {
        implementation,
        dependencies,
      } => {
        let construct = implementation
          .constructor()
          .ok_or_else(|| FactoryError::MissingInstanceProvider {
            interface: interface.to_owned(),
          })?;

        let values = dependencies
          .iter()
          .map(|dependency| self.get_instance(dependency))
          .collect::<Result<Vec<_>>>()?;
        let args = Args::new(implementation.name(), values);
        let value = construct(&args)?;
        Ok(Instance::new(Arc::clone(implementation), value))
      }
    }
  }

  /// Turns a class's constructor signature into its ordered dependency list.
  fn constructor_dependencies(&self, class: &ClassDescriptor) -> Result<Vec<String>> {
    class
      .params()
      .iter()
      .map(|param| {
        let ty = param.ty().ok_or_else(|| {
          FactoryError::signature(
            class.name(),
            SignatureFault::UntypedParameter {
              parameter: param.name().to_owned(),
            },
          )
        })?;

        let is_class = self.types.class(ty).is_some();
        if !is_class && !self.types.is_interface(ty) {
          return Err(FactoryError::signature(
            class.name(),
            SignatureFault::UnknownType {
              parameter: param.name().to_owned(),
              ty: ty.to_owned(),
            },
          ));
        }

        // A parameter of the class's own type would always re-enter itself.
        if self.config.reject_self_referring_parameters
          && is_class
          && self.types.is_a(class.name(), ty)
          && !self.types.is_subclass_of(class.name(), ty)
        {
          return Err(FactoryError::signature(
            class.name(),
            SignatureFault::SelfReferringParameter {
              parameter: param.name().to_owned(),
              ty: ty.to_owned(),
            },
          ));
        }

        Ok(ty.to_owned())
      })
      .collect()
  }
}

fn unregistered(interface: &str) -> FactoryError {
  FactoryError::UnregisteredInterface {
    interface: interface.to_owned(),
  }
}

fn view_as<I: ?Sized + Any + Send + Sync>(interface: &str, instance: &Instance) -> Result<Arc<I>> {
  instance.view::<I>().ok_or_else(|| {
    FactoryError::binding(
      interface,
      instance.class_name(),
      format!("instance cannot be viewed as {}", type_name::<I>()),
    )
  })
}
