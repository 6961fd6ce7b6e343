//! Constructor and callable descriptors
//!
//! The container never inspects types at runtime. Each constructible name is described once,
//! when it is registered in a [Catalog]: its parameter list (name, key of the injected service,
//! default value, optional flag) and a function building the value from resolved [Arguments].
//!
//! * The [Autowire] trait lets a concrete type describe itself. It is usually implemented
//!   with the [autowire](crate::autowire) macro.
//! * The [TypeIntrospector] trait is the lookup side used by the resolver.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::{Arguments, Service, WiringError};

/// Build a value from its resolved arguments
pub type Construct = Arc<dyn Fn(&Arguments) -> Result<Service, WiringError> + Send + Sync>;

/// One constructor or callable parameter
#[derive(Clone, Debug)]
pub struct Parameter {
    name: String,
    dependency: Option<String>,
    default: Option<Option<Service>>,
    optional: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependency: None,
            default: None,
            optional: false,
        }
    }

    /// Declare the key of the service injected in this parameter.
    pub fn typed(mut self, dependency: impl Into<String>) -> Self {
        self.dependency = Some(dependency.into());
        self
    }

    pub fn with_default(mut self, value: Service) -> Self {
        self.default = Some(Some(value));
        self
    }

    /// Default to "no value": the constructor receives `None` for this parameter.
    pub fn with_null_default(mut self) -> Self {
        self.default = Some(None);
        self
    }

    /// Mark the parameter optional: a failed dependency falls back to the default value,
    /// or to no value if none was declared.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependency(&self) -> Option<&str> {
        self.dependency.as_deref()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn default_value(&self) -> Option<Service> {
        self.default.clone().flatten()
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

/// Describe how a named type is instantiated
pub struct ClassDescriptor {
    name: String,
    instantiable: bool,
    describe: fn() -> Vec<Parameter>,
    parameters: OnceCell<Arc<[Parameter]>>,
    construct: Option<Construct>,
}

impl ClassDescriptor {
    pub fn new<F>(name: impl Into<String>, parameters: Vec<Parameter>, construct: F) -> Self
    where
        F: Fn(&Arguments) -> Result<Service, WiringError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            instantiable: true,
            describe: Vec::new,
            parameters: OnceCell::with_value(parameters.into()),
            construct: Some(Arc::new(construct)),
        }
    }

    /// Describe an interface or abstract name: known, but never instantiated directly.
    pub fn abstract_type(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instantiable: false,
            describe: Vec::new,
            parameters: OnceCell::new(),
            construct: None,
        }
    }

    pub fn of<T: Autowire>() -> Self {
        Self {
            name: T::class_name().to_string(),
            instantiable: true,
            describe: T::parameters,
            parameters: OnceCell::new(),
            construct: Some(Arc::new(|args: &Arguments| {
                T::construct(args).map(T::into_service)
            })),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_instantiable(&self) -> bool {
        self.instantiable
    }

    /// Constructor parameters, in declaration order.
    ///
    /// An empty list means the type is built without arguments.
    pub fn parameters(&self) -> Arc<[Parameter]> {
        self.parameters
            .get_or_init(|| (self.describe)().into())
            .clone()
    }

    pub fn instantiate(&self, args: &Arguments) -> Result<Service, WiringError> {
        match &self.construct {
            Some(construct) => construct(args),
            None => Err(WiringError::NotInstantiable(self.name.clone())),
        }
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("instantiable", &self.instantiable)
            .finish()
    }
}

/// Describe a function or method whose parameters are injected by the container
#[derive(Clone)]
pub struct CallableDescriptor {
    name: String,
    parameters: Arc<[Parameter]>,
    body: Construct,
}

impl CallableDescriptor {
    pub fn new<F>(name: impl Into<String>, parameters: Vec<Parameter>, body: F) -> Self
    where
        F: Fn(&Arguments) -> Result<Service, WiringError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            parameters: parameters.into(),
            body: Arc::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn call(&self, args: &Arguments) -> Result<Service, WiringError> {
        (self.body)(args)
    }
}

impl fmt::Debug for CallableDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallableDescriptor")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Mark a concrete type as constructible by the container
pub trait Autowire: Send + Sync + Sized + 'static {
    /// Name under which the type is registered and requested.
    fn class_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Constructor parameters. Types without parameters are built from empty arguments.
    fn parameters() -> Vec<Parameter> {
        Vec::new()
    }

    fn construct(args: &Arguments) -> Result<Self, WiringError>;

    /// Wrap the built value. Override to expose the value as a trait object.
    fn into_service(self) -> Service {
        Service::new(self)
    }
}

/// Lookup side of the descriptors
pub trait TypeIntrospector: Send + Sync {
    fn describe_class(&self, name: &str) -> Option<Arc<ClassDescriptor>>;
    fn describe_callable(&self, name: &str) -> Option<Arc<CallableDescriptor>>;
}

/// Registry of class and callable descriptors
#[derive(Default)]
pub struct Catalog {
    classes: RwLock<HashMap<String, Arc<ClassDescriptor>>>,
    callables: RwLock<HashMap<String, Arc<CallableDescriptor>>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Autowire>(&self) {
        self.register_class(ClassDescriptor::of::<T>());
    }

    pub fn register_class(&self, descriptor: ClassDescriptor) {
        self.classes
            .write()
            .insert(descriptor.name().to_string(), Arc::new(descriptor));
    }

    pub fn register_abstract(&self, name: impl Into<String>) {
        self.register_class(ClassDescriptor::abstract_type(name));
    }

    pub fn register_callable(&self, descriptor: CallableDescriptor) {
        self.callables
            .write()
            .insert(descriptor.name().to_string(), Arc::new(descriptor));
    }

    pub fn has_callable(&self, name: &str) -> bool {
        self.callables.read().contains_key(name)
    }
}

impl TypeIntrospector for Catalog {
    fn describe_class(&self, name: &str) -> Option<Arc<ClassDescriptor>> {
        self.classes.read().get(name).cloned()
    }

    fn describe_callable(&self, name: &str) -> Option<Arc<CallableDescriptor>> {
        self.callables.read().get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Plain;
    crate::autowire!(Plain);

    struct Counter {
        start: u32,
    }

    impl Autowire for Counter {
        fn class_name() -> &'static str {
            "Counter"
        }
        fn parameters() -> Vec<Parameter> {
            vec![Parameter::new("start").with_default(Service::new(7u32))]
        }
        fn construct(args: &Arguments) -> Result<Self, WiringError> {
            Ok(Counter {
                start: args.get("start")?,
            })
        }
    }

    #[test]
    fn macro_describes_a_default_type() {
        let catalog = Catalog::new();
        catalog.register::<Plain>();
        let descriptor = catalog.describe_class("Plain").unwrap();
        assert!(descriptor.is_instantiable());
        assert!(descriptor.parameters().is_empty());
        let built = descriptor.instantiate(&Arguments::new("Plain")).unwrap();
        assert!(built.is::<Plain>());
    }

    #[test]
    fn parameters_are_described_lazily_once() {
        let descriptor = ClassDescriptor::of::<Counter>();
        let first = descriptor.parameters();
        let second = descriptor.parameters();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first[0].name(), "start");
        assert!(first[0].has_default());
        assert!(first[0].dependency().is_none());

        let mut args = Arguments::new("Counter");
        args.push("start", first[0].default_value());
        let counter = descriptor.instantiate(&args).unwrap();
        assert_eq!(counter.downcast_ref::<Counter>().unwrap().start, 7);
    }

    #[test]
    fn abstract_names_refuse_instantiation() {
        let catalog = Catalog::new();
        catalog.register_abstract("Cache");
        let descriptor = catalog.describe_class("Cache").unwrap();
        assert!(!descriptor.is_instantiable());
        assert!(matches!(
            descriptor.instantiate(&Arguments::new("Cache")),
            Err(WiringError::NotInstantiable(name)) if name == "Cache"
        ));
        assert!(catalog.describe_class("Unknown").is_none());
    }
}
