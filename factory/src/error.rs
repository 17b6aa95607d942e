use std::fmt;
use thiserror::Error;

/// The error type returned by every fallible `Factory` operation.
///
/// Errors are terminal for the call that produced them. Nothing is retried and
/// partially built objects are discarded.
#[derive(Debug, Error)]
pub enum FactoryError {
  /// The interface has no binding and does not name a constructible class.
  #[error("interface '{interface}' is not registered")]
  UnregisteredInterface { interface: String },

  /// An implementation, or a provider's result, does not satisfy the interface.
  #[error("'{implementation}' cannot be bound to '{interface}': {reason}")]
  Binding {
    interface: String,
    implementation: String,
    reason: String,
  },

  /// A constructor or provider lacks the type information needed to auto-wire it.
  #[error("invalid signature for '{subject}': {fault}")]
  Signature { subject: String, fault: SignatureFault },

  /// Resolution re-entered an interface that is still under construction.
  #[error("circular dependency on '{interface}' (chain: {})", .chain.join(" -> "))]
  CircularDependency { interface: String, chain: Vec<String> },

  /// A binding exists but has nothing that can produce an instance.
  #[error("there is no instance provider for '{interface}'")]
  MissingInstanceProvider { interface: String },

  /// A constructor or provider reported a failure of its own.
  #[error("failed to construct '{class}': {source}")]
  Construction {
    class: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  /// A constructor asked for an argument in a shape the resolved instance does not have.
  #[error("argument {index} of '{class}' is not usable as {expected}")]
  ArgumentMismatch {
    class: String,
    index: usize,
    expected: String,
  },

  #[error("failed to parse factory configuration: {0}")]
  Config(String),
}

impl FactoryError {
  pub(crate) fn binding(
    interface: impl Into<String>,
    implementation: impl Into<String>,
    reason: impl Into<String>,
  ) -> Self {
    FactoryError::Binding {
      interface: interface.into(),
      implementation: implementation.into(),
      reason: reason.into(),
    }
  }

  pub(crate) fn signature(subject: impl Into<String>, fault: SignatureFault) -> Self {
    FactoryError::Signature {
      subject: subject.into(),
      fault,
    }
  }

  /// Wraps an arbitrary error raised while constructing `class`.
  pub fn construction<E>(class: impl Into<String>, source: E) -> Self
  where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
  {
    FactoryError::Construction {
      class: class.into(),
      source: source.into(),
    }
  }
}

/// The specific reason a signature was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureFault {
  /// A constructor parameter has no explicit, named type.
  UntypedParameter { parameter: String },
  /// A constructor parameter names a type the catalog does not know.
  UnknownType { parameter: String, ty: String },
  /// A constructor parameter is typed as the class being constructed.
  SelfReferringParameter { parameter: String, ty: String },
  /// A provider was registered without declaring what it returns.
  MissingReturnType,
  /// A provider declares a return capability the catalog does not know.
  UnknownReturnType { ty: String },
}

impl fmt::Display for SignatureFault {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SignatureFault::UntypedParameter { parameter } => write!(
        f,
        "parameter '{}' has no type; non-typed arguments are not supported, use a provider instead",
        parameter
      ),
      SignatureFault::UnknownType { parameter, ty } => {
        write!(f, "parameter '{}' has unknown interface/class '{}'", parameter, ty)
      }
      SignatureFault::SelfReferringParameter { parameter, ty } => write!(
        f,
        "parameter '{}' of type '{}' cannot be self-referring",
        parameter, ty
      ),
      SignatureFault::MissingReturnType => write!(f, "instance provider must declare a return type"),
      SignatureFault::UnknownReturnType { ty } => {
        write!(f, "instance provider declares unknown return type '{}'", ty)
      }
    }
  }
}

/// A specialized `Result` type for factory operations.
pub type Result<T, E = FactoryError> = std::result::Result<T, E>;
