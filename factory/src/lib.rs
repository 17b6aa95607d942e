//! # Fibre Factory
//!
//! A thread-safe object factory and dependency-injection container for Rust.
//!
//! Ask the factory for an abstract capability by name (an *interface*) and it
//! hands back a concrete instance, constructing whatever that instance needs
//! along the way. Instances are either transient (new on every request) or
//! shared (one per interface for the life of the factory).
//!
//! ## Core Concepts
//!
//! - **Type catalog**: Rust has no runtime reflection, so interfaces and classes
//!   are described once with [`InterfaceDescriptor`] and [`ClassDescriptor`].
//!   A class descriptor lists its constructor parameters by type name, in order.
//! - **Bindings**: an interface is bound either to a class ([`Factory::register_class`])
//!   or to a [`Provider`] function ([`Factory::register_provider`]).
//!   The last registration for an interface wins.
//! - **Resolution**: [`Factory::get_instance`] builds dependencies recursively and
//!   rejects circular dependencies with [`FactoryError::CircularDependency`].
//!   A concrete class that was never bound is bound to itself on first use.
//! - **Shared instances**: [`Factory::get_shared_instance`] creates one instance per
//!   interface, exactly once, even under contention.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_factory::{ClassDescriptor, Factory, InterfaceDescriptor};
//! use std::sync::Arc;
//!
//! trait UserModel: Send + Sync {
//!   fn name(&self) -> String;
//! }
//!
//! struct User;
//! impl UserModel for User {
//!   fn name(&self) -> String {
//!     "alice".to_string()
//!   }
//! }
//!
//! struct Account {
//!   user: Arc<dyn UserModel>,
//! }
//!
//! let factory = Factory::new();
//! factory.types().declare_interface(InterfaceDescriptor::new("IUserModel"));
//! factory.types().declare_class(
//!   ClassDescriptor::builder::<User>("User")
//!     .implements("IUserModel")
//!     .view(|this| this as Arc<dyn UserModel>)
//!     .constructor(|_| Ok(User))
//!     .build(),
//! );
//! factory.types().declare_class(
//!   ClassDescriptor::builder::<Account>("Account")
//!     .param("user", "IUserModel")
//!     .constructor(|args| Ok(Account { user: args.get::<dyn UserModel>(0)? }))
//!     .build(),
//! );
//!
//! factory.register_class("IUserModel", "User").unwrap();
//!
//! // "Account" was never registered; it is concrete, so it binds to itself.
//! let account = factory.get::<Account>("Account").unwrap();
//! assert_eq!(account.user.name(), "alice");
//!
//! let a = factory.get_shared_instance("Account").unwrap();
//! let b = factory.get_shared_instance("Account").unwrap();
//! assert!(a.ptr_eq(&b));
//! ```

mod binding;
mod catalog;
mod config;
mod descriptor;
mod error;
mod factory;
mod global;
mod instance;
mod macros;
mod resolution;

pub use binding::{Binding, BindingKind, Provider};
pub use catalog::TypeCatalog;
pub use config::FactoryConfig;
pub use descriptor::{Abstract, Args, ClassBuilder, ClassDescriptor, InterfaceDescriptor, ParamDescriptor};
pub use error::{FactoryError, Result, SignatureFault};
pub use factory::Factory;
pub use global::global;
pub use instance::Instance;

#[cfg(doctest)]
#[doc = include_str!("../README.md")]
pub struct ReadmeDoctests;
