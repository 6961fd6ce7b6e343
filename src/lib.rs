//! Service registry with runtime dependency resolution and constructor autowiring.
//!
//! # Simple use case
//!
//! ```
//! # use std::sync::Arc;
//! # use wirebox::*;
//! // Define traits and implementors
//! trait MyTrait: Send + Sync {
//!     fn cheers(&self) -> String;
//! }
//!
//! #[derive(Default)]
//! struct MyImpl;
//!
//! impl MyTrait for MyImpl {
//!     fn cheers(&self) -> String {
//!         "Hello world".to_string()
//!     }
//! }
//!
//! // Describe how the container builds the implementor
//! autowire!(dyn MyTrait: MyImpl);
//!
//! # fn main() -> Result<(), WiringError> {
//! // Register it as a shared service and request it
//! let container = Container::new();
//! container.register::<MyImpl>();
//! container.share("greeter", Producer::class("MyImpl"), BindOptions::new());
//!
//! let a: Arc<dyn MyTrait> = container.inject("greeter")?;
//! assert_eq!(a.cheers(), "Hello world");
//! # Ok(())
//! # }
//! ```
//!
//! # Mechanism
//!
//! Services are identified by string keys and stored as type-erased [Service] values.
//! A binding associates a key with a [Producer]: a ready value, a factory closure, or the name
//! of a class to autowire.
//!
//! * The [Catalog] holds a [ClassDescriptor] for every autowirable name: its constructor
//!   parameters and the function building it. The [Autowire] trait (usually through the
//!   [autowire] macro) lets a concrete type describe itself.
//! * The [Container] resolves keys. Shared bindings are cached after their first resolution.
//!   Unknown keys can be claimed by deferred [Provider]s, or rewritten by converters into
//!   known keys.
//! * Aliases, tags, extenders, initializers and contextual bindings decorate the registry;
//!   every mutation and resolution is reported to an optional [Dispatcher].

mod describe;
mod event;
mod helpers;
mod inject;
mod provider;
mod resolve;

pub use describe::{
    Autowire, CallableDescriptor, Catalog, ClassDescriptor, Construct, Parameter, TypeIntrospector,
};
pub use event::{ContainerEvent, Dispatcher, EventKind, Listeners};
pub use helpers::{Arguments, Service};
pub use inject::{
    AllOptions, BindOptions, Container, Contextual, ContextualBindingBuilder, ContextualNeeds,
    Converter, Extender, Factory, Producer, RawBinding, Snapshot, SnapshotEntry,
};
pub use provider::{Provider, ProviderQueue};
pub use resolve::{Fallback, GetOptions, Resolution, ResolvedCall, WiringError};
