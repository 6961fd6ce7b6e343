use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::WiringError;

/// Type-erased, shared service value
///
/// Every binding produces a [Service]. Cloning is cheap and keeps the same allocation,
/// so two clones of a cached singleton are [Service::ptr_eq].
#[derive(Clone)]
pub struct Service {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Service {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Wrap an existing allocation without copying it.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            value,
            type_name: type_name::<T>(),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Clone the wrapped value out, typically an `Arc<dyn Trait>` handle.
    pub fn cloned<T: Any + Clone>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Reference identity of two service values
    pub fn ptr_eq(a: &Service, b: &Service) -> bool {
        Arc::ptr_eq(&a.value, &b.value)
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service<{}>", self.type_name)
    }
}

/// Ordered, named arguments assembled for a constructor or a callable.
///
/// A slot holding `None` is a parameter that was defaulted to "no value".
#[derive(Clone, Debug, Default)]
pub struct Arguments {
    owner: String,
    slots: Vec<(String, Option<Service>)>,
}

impl Arguments {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            slots: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, name: impl Into<String>, value: Option<Service>) {
        self.slots.push((name.into(), value));
    }

    /// Name of the class or callable these arguments were resolved for
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Service>)> {
        self.slots
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }

    pub fn service(&self, name: &str) -> Option<&Service> {
        self.slots
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_ref())
    }

    /// Fetch a required argument, cloned out as `T`.
    pub fn get<T: Any + Clone>(&self, name: &str) -> Result<T, WiringError> {
        self.optional(name)?
            .ok_or_else(|| WiringError::MissingDependency {
                consumer: self.owner.clone(),
                parameter: name.to_string(),
            })
    }

    /// Fetch an argument that may have been defaulted to no value.
    pub fn optional<T: Any + Clone>(&self, name: &str) -> Result<Option<T>, WiringError> {
        match self.service(name) {
            None => Ok(None),
            Some(service) => service
                .cloned::<T>()
                .map(Some)
                .ok_or_else(|| WiringError::TypeMismatch {
                    key: format!("{}::{}", self.owner, name),
                    expected: type_name::<T>(),
                }),
        }
    }
}

/// Describe how the container autowires a concrete type.
///
/// This macro provides an implementation of [Autowire](crate::Autowire) for the concrete type.
/// If the type implements default, then no extra information is needed.
/// Otherwise, the macro allows to expose the instance as a trait object, select the name of the
/// constructor function and list its parameters with the key of the service injected in each.
///
/// ```
/// # use std::sync::Arc;
/// # use wirebox::*;
/// trait Greeter: Send + Sync {}
/// #[derive(Default)]
/// struct Hello;
/// impl Greeter for Hello {}
///
/// struct Front { greeter: Arc<dyn Greeter> }
/// impl Front {
///     fn new(greeter: Arc<dyn Greeter>) -> Self { Self { greeter } }
/// }
///
/// autowire!(dyn Greeter: Hello);
/// autowire!(Front, new, greeter: Arc<dyn Greeter> = "Hello");
/// ```
#[macro_export]
macro_rules! autowire {
    (dyn $iface: path : $concrete_type: ty) => {
        $crate::autowire!(dyn $iface : $concrete_type, default);
    };
    (dyn $iface: path : $concrete_type: ty, $constructor: ident $(, $arg_name: ident : $arg_type: ty = $key: expr)*) => {
        impl $crate::Autowire for $concrete_type {
            fn class_name() -> &'static str {
                stringify!($concrete_type)
            }
            fn parameters() -> Vec<$crate::Parameter> {
                vec![ $( $crate::Parameter::new(stringify!($arg_name)).typed($key), )* ]
            }
            fn construct(_args: &$crate::Arguments) -> Result<Self, $crate::WiringError> {
                Ok(<$concrete_type>::$constructor( $( _args.get::<$arg_type>(stringify!($arg_name))?, )* ))
            }
            fn into_service(self) -> $crate::Service {
                let shared: std::sync::Arc<dyn $iface> = std::sync::Arc::new(self);
                $crate::Service::new(shared)
            }
        }
    };
    ($concrete_type: ty) => {
        $crate::autowire!($concrete_type, default);
    };
    ($concrete_type: ty, $constructor: ident $(, $arg_name: ident : $arg_type: ty = $key: expr)*) => {
        impl $crate::Autowire for $concrete_type {
            fn class_name() -> &'static str {
                stringify!($concrete_type)
            }
            fn parameters() -> Vec<$crate::Parameter> {
                vec![ $( $crate::Parameter::new(stringify!($arg_name)).typed($key), )* ]
            }
            fn construct(_args: &$crate::Arguments) -> Result<Self, $crate::WiringError> {
                Ok(<$concrete_type>::$constructor( $( _args.get::<$arg_type>(stringify!($arg_name))?, )* ))
            }
        }
    };
}
