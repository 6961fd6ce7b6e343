//! Resolution of services and autowiring
//!
//! A call to [Container::get] first asks the registry whether the key is known (activating
//! deferred providers and running converters as needed), then either reuses a cached
//! singleton or produces a new value:
//!
//! * a [Producer::Value] is returned as is,
//! * a [Producer::Factory] is called with the container and the extra call arguments,
//! * a [Producer::Class] is autowired: every constructor parameter described in the
//!   [Catalog](crate::Catalog) is resolved recursively through the container.
//!
//! Freshly produced values then go through the extension pipeline: per-key extenders,
//! global initializers, and the [Resolved](crate::ContainerEvent::Resolved) notification.
//!
//! The consumer stack used to select contextual bindings is kept in a per-call [Context]
//! rather than in the container.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, trace};

use crate::describe::{CallableDescriptor, Parameter, TypeIntrospector};
use crate::inject::{Contextual, Producer};
use crate::{Arguments, Container, ContainerEvent, Service};

/// Errors triggered during the autowiring process
#[derive(Error, Debug, Clone)]
pub enum WiringError {
    #[error("Class {0} is not instantiable")]
    NotInstantiable(String),
    #[error("No value available for parameter {parameter} of {consumer}")]
    MissingDependency { consumer: String, parameter: String },
    #[error("Service {0} is not bound")]
    NotFound(String),
    #[error("Cyclic dependencies: {0}")]
    CyclicResolution(String),
    #[error("Service {key} is not a {expected}")]
    TypeMismatch { key: String, expected: &'static str },
    #[error("Factory failed: {0}")]
    Factory(String),
}

/// Value returned by a non-throwing [Container::get_with] when resolution fails
#[derive(Clone)]
pub enum Fallback {
    Value(Service),
    Lazy(Arc<dyn Fn() -> Service + Send + Sync>),
}

impl Fallback {
    fn produce(&self) -> Service {
        match self {
            Fallback::Value(value) => value.clone(),
            Fallback::Lazy(f) => f(),
        }
    }
}

/// Options of a single [Container::get_with] call
#[derive(Clone, Default)]
pub struct GetOptions {
    pub(crate) throw: bool,
    pub(crate) rebuild: bool,
    pub(crate) rebuild_all: bool,
    pub(crate) resolve: bool,
    pub(crate) arguments: Vec<Service>,
    pub(crate) named: HashMap<String, Option<Service>>,
    pub(crate) default: Option<Fallback>,
}

impl GetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return resolution failures instead of the fallback.
    pub fn throwing(mut self) -> Self {
        self.throw = true;
        self
    }

    /// Ignore the cached singleton for this call only.
    pub fn rebuild(mut self) -> Self {
        self.rebuild = true;
        self
    }

    /// Ignore cached singletons for this call and every nested dependency.
    pub fn rebuild_all(mut self) -> Self {
        self.rebuild = true;
        self.rebuild_all = true;
        self
    }

    /// Autowire the key as a class name when it is not bound.
    pub fn resolving(mut self) -> Self {
        self.resolve = true;
        self
    }

    /// Extra argument passed to a factory after the container.
    pub fn argument(mut self, value: Service) -> Self {
        self.arguments.push(value);
        self
    }

    /// Explicit value for a named constructor or callable parameter.
    pub fn named(mut self, parameter: impl Into<String>, value: Service) -> Self {
        self.named.insert(parameter.into(), Some(value));
        self
    }

    pub fn named_null(mut self, parameter: impl Into<String>) -> Self {
        self.named.insert(parameter.into(), None);
        self
    }

    pub fn or_default(mut self, value: Service) -> Self {
        self.default = Some(Fallback::Value(value));
        self
    }

    pub fn or_else<F>(mut self, fallback: F) -> Self
    where
        F: Fn() -> Service + Send + Sync + 'static,
    {
        self.default = Some(Fallback::Lazy(Arc::new(fallback)));
        self
    }

    /// Options for the dependencies of the value being built
    pub(crate) fn nested(&self) -> GetOptions {
        GetOptions {
            throw: true,
            resolve: true,
            rebuild: self.rebuild_all,
            rebuild_all: self.rebuild_all,
            named: self.named.clone(),
            ..GetOptions::default()
        }
    }

    pub(crate) fn fallback(&self) -> Option<Service> {
        self.default.as_ref().map(Fallback::produce)
    }
}

impl fmt::Debug for GetOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetOptions")
            .field("throw", &self.throw)
            .field("rebuild", &self.rebuild)
            .field("rebuild_all", &self.rebuild_all)
            .field("resolve", &self.resolve)
            .field("arguments", &self.arguments.len())
            .field("named", &self.named.keys().collect::<Vec<_>>())
            .field("default", &self.default.is_some())
            .finish()
    }
}

/// State of one top-level call into the container
#[derive(Debug, Default)]
pub(crate) struct Context {
    /// Classes whose constructor dependencies are being resolved, innermost last
    stack: Vec<String>,
}

impl Context {
    fn consumer(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }
}

/// Result of [Container::resolve]
#[derive(Debug)]
pub enum Resolution {
    Service(Service),
    Call(ResolvedCall),
}

/// A callable paired with its resolved arguments, ready to be invoked
#[derive(Clone, Debug)]
pub struct ResolvedCall {
    pub callable: Arc<CallableDescriptor>,
    pub arguments: Arguments,
}

impl ResolvedCall {
    pub fn invoke(&self) -> Result<Service, WiringError> {
        self.callable.call(&self.arguments)
    }
}

impl Container {
    /// Obtain the service bound to `key` with default options.
    ///
    /// Returns `None` if the key is unknown or if building the value failed.
    pub fn get(&self, key: &str) -> Option<Service> {
        self.get_with(key, GetOptions::default()).ok().flatten()
    }

    /// Obtain a service.
    ///
    /// Failures are returned only if [GetOptions::throwing] was requested, otherwise they are
    /// replaced by the fallback value of the options (if any).
    pub fn get_with(&self, key: &str, options: GetOptions) -> Result<Option<Service>, WiringError> {
        match self.produce(key, &options, &mut Context::default()) {
            Ok(value) => Ok(Some(value)),
            Err(error) if options.throw => Err(error),
            Err(error) => {
                debug!(service = %key, %error, "resolution failed, using fallback");
                Ok(options.fallback())
            }
        }
    }

    /// Obtain a service and clone it out as `T`, autowiring unbound class names.
    pub fn inject<T: std::any::Any + Clone>(&self, key: &str) -> Result<T, WiringError> {
        let service = self
            .get_with(key, GetOptions::new().throwing().resolving())?
            .ok_or_else(|| WiringError::NotFound(key.to_string()))?;
        service.cloned::<T>().ok_or_else(|| WiringError::TypeMismatch {
            key: key.to_string(),
            expected: std::any::type_name::<T>(),
        })
    }

    /// Resolve a callable (`"Type::method"` or a registered callable name) or a service.
    ///
    /// Services are requested with autowiring enabled and failures returned.
    pub fn resolve(&self, target: &str, options: GetOptions) -> Result<Resolution, WiringError> {
        if target.contains("::") || self.catalog.has_callable(target) {
            return self.resolve_callable(target, options).map(Resolution::Call);
        }
        self.get_with(target, options.resolving().throwing())?
            .map(Resolution::Service)
            .ok_or_else(|| WiringError::NotFound(target.to_string()))
    }

    /// Build an instance of a described class, resolving its constructor parameters.
    pub fn resolve_class(&self, class: &str, options: GetOptions) -> Result<Service, WiringError> {
        self.resolve_class_in(class, &options, &mut Context::default())
    }

    /// Resolve the parameters of a registered callable without invoking it.
    pub fn resolve_callable(
        &self,
        name: &str,
        options: GetOptions,
    ) -> Result<ResolvedCall, WiringError> {
        let callable = self
            .catalog
            .describe_callable(name)
            .ok_or_else(|| WiringError::NotFound(name.to_string()))?;
        self.resolve_callable_descriptor(callable, options)
    }

    pub fn resolve_callable_descriptor(
        &self,
        callable: Arc<CallableDescriptor>,
        options: GetOptions,
    ) -> Result<ResolvedCall, WiringError> {
        let arguments = self.dependencies(
            callable.name(),
            callable.parameters(),
            &options,
            &mut Context::default(),
        )?;
        Ok(ResolvedCall {
            callable,
            arguments,
        })
    }

    /// Produce a value for `key`, failures are always returned
    fn produce(
        &self,
        key: &str,
        options: &GetOptions,
        ctx: &mut Context,
    ) -> Result<Service, WiringError> {
        let rebuild = options.rebuild || options.rebuild_all;

        let (key, value, created) = if self.has(key) {
            let key = self.canonical(key);
            let (cached, producer) = {
                let registry = self.registry.lock();
                (
                    registry.instances.get(&key).cloned(),
                    registry.bindings.get(&key).map(|b| b.producer.clone()),
                )
            };
            match (cached, producer) {
                (Some(instance), _) if !rebuild => {
                    trace!(service = %key, "reusing shared instance");
                    (key, instance, false)
                }
                (_, Some(producer)) => {
                    let value = match producer {
                        Producer::Value(value) => value,
                        Producer::Factory(factory) => factory(self, &options.arguments)?,
                        Producer::Class(class) => self.resolve_class_in(&class, options, ctx)?,
                    };
                    (key, value, true)
                }
                (_, None) => return Err(WiringError::NotFound(key)),
            }
        } else if options.resolve {
            let value = self.resolve_class_in(key, options, ctx)?;
            (key.to_string(), value, true)
        } else {
            return Err(WiringError::NotFound(key.to_string()));
        };

        Ok(self.extend_resolved(&key, value, created))
    }

    /// Extension pipeline applied to every produced value
    fn extend_resolved(&self, key: &str, mut value: Service, created: bool) -> Service {
        let (extenders, initializers) = {
            let registry = self.registry.lock();
            let extenders = registry.extenders.get(key).cloned().unwrap_or_default();
            let initializers = if created {
                registry.initializers.clone()
            } else {
                Vec::new()
            };
            (extenders, initializers)
        };

        for extender in &extenders {
            value = extender(value, self);
        }
        for initializer in &initializers {
            value = initializer(value, self);
        }

        let event = self.dispatch(ContainerEvent::Resolved {
            service: key.to_string(),
            resolved_service: value.clone(),
            initialized: created,
        });
        if let Some(replaced) = event.resolved_service() {
            value = replaced.clone();
        }

        let mut registry = self.registry.lock();
        registry.resolved.insert(key.to_string());
        if registry.bindings.get(key).is_some_and(|b| b.shared) {
            registry.extenders.shift_remove(key);
            registry.instances.insert(key.to_string(), value.clone());
        }
        value
    }

    pub(crate) fn resolve_class_in(
        &self,
        class: &str,
        options: &GetOptions,
        ctx: &mut Context,
    ) -> Result<Service, WiringError> {
        let mut class = class.to_string();
        match self.contextual_for(ctx, &class) {
            Some(Contextual::Factory(factory)) => return factory(self, &[]),
            Some(Contextual::Class(concrete)) => class = concrete,
            None => {}
        }

        if ctx.stack.contains(&class) {
            let mut chain = ctx.stack.clone();
            chain.push(class);
            return Err(WiringError::CyclicResolution(chain.join(" -> ")));
        }

        let descriptor = self
            .catalog
            .describe_class(&class)
            .ok_or_else(|| WiringError::NotFound(class.clone()))?;
        if !descriptor.is_instantiable() {
            return Err(WiringError::NotInstantiable(class));
        }

        let parameters = descriptor.parameters();
        if parameters.is_empty() {
            return descriptor.instantiate(&Arguments::new(class));
        }

        trace!(class = %class, depth = ctx.stack.len(), "autowiring constructor");
        ctx.stack.push(class.clone());
        let arguments = self.dependencies(&class, &parameters, options, ctx);
        ctx.stack.pop();
        descriptor.instantiate(&arguments?)
    }

    fn dependencies(
        &self,
        owner: &str,
        parameters: &[Parameter],
        options: &GetOptions,
        ctx: &mut Context,
    ) -> Result<Arguments, WiringError> {
        let mut arguments = Arguments::new(owner);
        for parameter in parameters {
            if let Some(value) = options.named.get(parameter.name()) {
                arguments.push(parameter.name(), value.clone());
                continue;
            }

            let missing = || WiringError::MissingDependency {
                consumer: owner.to_string(),
                parameter: parameter.name().to_string(),
            };

            let Some(dependency) = parameter.dependency() else {
                if !parameter.has_default() {
                    return Err(missing());
                }
                arguments.push(parameter.name(), parameter.default_value());
                continue;
            };

            match self.resolve_dependency(dependency, options, ctx) {
                Ok(value) => arguments.push(parameter.name(), Some(value)),
                Err(error) if parameter.is_optional() => {
                    trace!(consumer = %owner, parameter = parameter.name(), %error, "optional dependency defaulted");
                    arguments.push(parameter.name(), parameter.default_value());
                }
                Err(WiringError::NotFound(_)) => return Err(missing()),
                Err(error) => return Err(error),
            }
        }
        Ok(arguments)
    }

    fn resolve_dependency(
        &self,
        dependency: &str,
        options: &GetOptions,
        ctx: &mut Context,
    ) -> Result<Service, WiringError> {
        let nested = options.nested();
        match self.contextual_for(ctx, dependency) {
            Some(Contextual::Factory(factory)) => factory(self, &[]),
            Some(Contextual::Class(concrete)) => self.produce(&concrete, &nested, ctx),
            None => self.produce(dependency, &nested, ctx),
        }
    }

    fn contextual_for(&self, ctx: &Context, needs: &str) -> Option<Contextual> {
        let consumer = ctx.consumer()?;
        self.registry
            .lock()
            .contextual
            .get(consumer)
            .and_then(|overrides| overrides.get(needs))
            .cloned()
    }
}
