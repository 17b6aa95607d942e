//! Type descriptors: the explicit stand-in for runtime reflection.
//!
//! Every interface and class the factory may build or reference is described
//! once, up front. Class descriptors carry their ordered constructor signature
//! and the constructor itself, so resolution only ever looks descriptors up.

use crate::error::{FactoryError, Result};
use crate::instance::Instance;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub(crate) type ErasedValue = Arc<dyn Any + Send + Sync>;
pub(crate) type ConstructFn = dyn Fn(&Args) -> Result<ErasedValue> + Send + Sync;
pub(crate) type ViewFn = dyn Fn(ErasedValue) -> Option<Box<dyn Any + Send + Sync>> + Send + Sync;

/// An abstract capability, optionally extending other capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDescriptor {
  name: String,
  extends: Vec<String>,
}

impl InterfaceDescriptor {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      extends: Vec::new(),
    }
  }

  pub fn extends(mut self, parent: impl Into<String>) -> Self {
    self.extends.push(parent.into());
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn parents(&self) -> &[String] {
    &self.extends
  }
}

/// One constructor parameter: its name and, if it has one, its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDescriptor {
  name: String,
  ty: Option<String>,
}

impl ParamDescriptor {
  pub fn typed(name: impl Into<String>, ty: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ty: Some(ty.into()),
    }
  }

  /// A parameter without a declared type. Classes with such parameters
  /// cannot be auto-wired.
  pub fn untyped(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ty: None,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn ty(&self) -> Option<&str> {
    self.ty.as_deref()
  }
}

/// Describes a class: its place in the type hierarchy, its constructor
/// signature and how to build and view it.
pub struct ClassDescriptor {
  name: String,
  type_id: Option<TypeId>,
  parent: Option<String>,
  implements: Vec<String>,
  params: Vec<ParamDescriptor>,
  constructor: Option<Arc<ConstructFn>>,
  views: HashMap<TypeId, Arc<ViewFn>>,
}

impl ClassDescriptor {
  /// Starts describing a concrete class backed by the Rust type `T`.
  ///
  /// The class only becomes instantiable once a constructor is supplied.
  pub fn builder<T: Any + Send + Sync>(name: impl Into<String>) -> ClassBuilder<T> {
    let mut views: HashMap<TypeId, Arc<ViewFn>> = HashMap::new();
    // Every class can be viewed as itself.
    views.insert(
      TypeId::of::<T>(),
      Arc::new(|value: ErasedValue| {
        value
          .downcast::<T>()
          .ok()
          .map(|this| Box::new(this) as Box<dyn Any + Send + Sync>)
      }),
    );
    ClassBuilder {
      descriptor: ClassDescriptor {
        name: name.into(),
        type_id: Some(TypeId::of::<T>()),
        parent: None,
        implements: Vec::new(),
        params: Vec::new(),
        constructor: None,
        views,
      },
      _marker: std::marker::PhantomData,
    }
  }

  /// Starts describing an abstract class: it takes part in the hierarchy but
  /// can never be instantiated.
  pub fn abstract_class(name: impl Into<String>) -> ClassBuilder<Abstract> {
    ClassBuilder {
      descriptor: ClassDescriptor {
        name: name.into(),
        type_id: None,
        parent: None,
        implements: Vec::new(),
        params: Vec::new(),
        constructor: None,
        views: HashMap::new(),
      },
      _marker: std::marker::PhantomData,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn parent(&self) -> Option<&str> {
    self.parent.as_deref()
  }

  pub fn interfaces(&self) -> &[String] {
    &self.implements
  }

  pub fn params(&self) -> &[ParamDescriptor] {
    &self.params
  }

  /// Whether the class has a constructor and can therefore be built.
  pub fn is_instantiable(&self) -> bool {
    self.constructor.is_some()
  }

  /// The Rust type backing this class; `None` for abstract classes.
  pub(crate) fn value_type(&self) -> Option<TypeId> {
    self.type_id
  }

  pub(crate) fn constructor(&self) -> Option<&Arc<ConstructFn>> {
    self.constructor.as_ref()
  }

  pub(crate) fn view_fn(&self, view: TypeId) -> Option<&Arc<ViewFn>> {
    self.views.get(&view)
  }
}

impl fmt::Debug for ClassDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ClassDescriptor")
      .field("name", &self.name)
      .field("parent", &self.parent)
      .field("implements", &self.implements)
      .field("params", &self.params)
      .field("instantiable", &self.is_instantiable())
      .field("views", &self.views.len())
      .finish()
  }
}

/// Marker for classes that have no backing Rust type.
pub enum Abstract {}

/// Builder returned by [`ClassDescriptor::builder`] and
/// [`ClassDescriptor::abstract_class`].
pub struct ClassBuilder<T> {
  descriptor: ClassDescriptor,
  _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T> ClassBuilder<T> {
  /// Sets the parent class. Capabilities of the parent are inherited.
  pub fn extends(mut self, parent: impl Into<String>) -> Self {
    self.descriptor.parent = Some(parent.into());
    self
  }

  pub fn implements(mut self, interface: impl Into<String>) -> Self {
    self.descriptor.implements.push(interface.into());
    self
  }

  /// Appends a typed constructor parameter.
  pub fn param(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
    self.descriptor.params.push(ParamDescriptor::typed(name, ty));
    self
  }

  /// Appends a constructor parameter with no declared type.
  pub fn untyped_param(mut self, name: impl Into<String>) -> Self {
    self.descriptor.params.push(ParamDescriptor::untyped(name));
    self
  }

  pub fn build(self) -> ClassDescriptor {
    self.descriptor
  }
}

impl<T: Any + Send + Sync> ClassBuilder<T> {
  /// Lets instances of this class be handed out as `Arc<I>`, typically a trait object.
  ///
  /// ```
  /// use fibre_factory::ClassDescriptor;
  /// use std::sync::Arc;
  ///
  /// trait Named: Send + Sync { fn name(&self) -> &str; }
  /// struct User;
  /// impl Named for User { fn name(&self) -> &str { "user" } }
  ///
  /// let class = ClassDescriptor::builder::<User>("User")
  ///   .implements("Named")
  ///   .view(|this| this as Arc<dyn Named>)
  ///   .constructor(|_| Ok(User))
  ///   .build();
  /// assert!(class.is_instantiable());
  /// ```
  pub fn view<I: ?Sized + Any + Send + Sync>(mut self, cast: fn(Arc<T>) -> Arc<I>) -> Self {
    self.descriptor.views.insert(
      TypeId::of::<I>(),
      Arc::new(move |value: ErasedValue| {
        value
          .downcast::<T>()
          .ok()
          .map(|this| Box::new(cast(this)) as Box<dyn Any + Send + Sync>)
      }),
    );
    self
  }

  /// Supplies the constructor. It receives the resolved dependencies in
  /// declared parameter order.
  pub fn constructor<F>(mut self, construct: F) -> Self
  where
    F: Fn(&Args) -> Result<T> + Send + Sync + 'static,
  {
    self.descriptor.constructor = Some(Arc::new(move |args: &Args| {
      construct(args).map(|value| Arc::new(value) as ErasedValue)
    }));
    self
  }
}

/// The resolved constructor arguments, in declared parameter order.
pub struct Args {
  class: String,
  values: Vec<Instance>,
}

impl Args {
  pub(crate) fn new(class: impl Into<String>, values: Vec<Instance>) -> Self {
    Self {
      class: class.into(),
      values,
    }
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Instance> {
    self.values.iter()
  }

  /// The raw resolved instance at `index`.
  pub fn instance(&self, index: usize) -> Result<&Instance> {
    self.values.get(index).ok_or_else(|| FactoryError::ArgumentMismatch {
      class: self.class.clone(),
      index,
      expected: "a resolved argument".to_string(),
    })
  }

  /// The argument at `index` viewed as `Arc<I>`.
  pub fn get<I: ?Sized + Any + Send + Sync>(&self, index: usize) -> Result<Arc<I>> {
    self
      .instance(index)?
      .view::<I>()
      .ok_or_else(|| FactoryError::ArgumentMismatch {
        class: self.class.clone(),
        index,
        expected: type_name::<I>().to_string(),
      })
  }
}
