use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use indexmap::{IndexMap, IndexSet};
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::*;

/// Produce a value, called with the container and the extra arguments of the call
pub type Factory = Arc<dyn Fn(&Container, &[Service]) -> Result<Service, WiringError> + Send + Sync>;

/// Transform a produced value (extenders and initializers)
pub type Extender = Arc<dyn Fn(Service, &Container) -> Service + Send + Sync>;

/// Rewrite an unknown key into a candidate key
pub type Converter = Arc<dyn Fn(&str, &Container) -> String + Send + Sync>;

/// How a binding produces its value
#[derive(Clone)]
pub enum Producer {
    Value(Service),
    Factory(Factory),
    /// Autowire the named class from its [ClassDescriptor]
    Class(String),
}

impl Producer {
    pub fn value<T: std::any::Any + Send + Sync>(value: T) -> Self {
        Producer::Value(Service::new(value))
    }

    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn(&Container, &[Service]) -> Result<Service, WiringError> + Send + Sync + 'static,
    {
        Producer::Factory(Arc::new(factory))
    }

    pub fn class(name: impl Into<String>) -> Self {
        Producer::Class(name.into())
    }
}

impl From<Service> for Producer {
    fn from(value: Service) -> Self {
        Producer::Value(value)
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Producer::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Producer::Factory(_) => f.write_str("Factory"),
            Producer::Class(name) => f.debug_tuple("Class").field(name).finish(),
        }
    }
}

/// Override of a dependency for one consumer
#[derive(Clone)]
pub enum Contextual {
    /// Resolve this key instead of the requested one
    Class(String),
    Factory(Factory),
}

impl Contextual {
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn(&Container) -> Result<Service, WiringError> + Send + Sync + 'static,
    {
        Contextual::Factory(Arc::new(move |container: &Container, _: &[Service]| {
            factory(container)
        }))
    }
}

impl From<&str> for Contextual {
    fn from(key: &str) -> Self {
        Contextual::Class(key.to_string())
    }
}

impl From<String> for Contextual {
    fn from(key: String) -> Self {
        Contextual::Class(key)
    }
}

impl fmt::Debug for Contextual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contextual::Class(name) => f.debug_tuple("Class").field(name).finish(),
            Contextual::Factory(_) => f.write_str("Factory"),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Binding {
    pub(crate) producer: Producer,
    pub(crate) shared: bool,
}

/// Options of [Container::bind]
#[derive(Clone, Default)]
pub struct BindOptions {
    pub shared: bool,
    pub tags: Vec<String>,
    pub aliases: Vec<String>,
    pub extenders: Vec<Extender>,
}

impl BindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(mut self) -> Self {
        self.shared = true;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn extender<F>(mut self, extender: F) -> Self
    where
        F: Fn(Service, &Container) -> Service + Send + Sync + 'static,
    {
        self.extenders.push(Arc::new(extender));
        self
    }
}

/// Options of [Container::all]
#[derive(Clone, Copy, Debug, Default)]
pub struct AllOptions {
    /// Report raw bindings instead of resolving every service
    pub raw: bool,
    pub providers: bool,
    pub contextual_bindings: bool,
}

/// Read-only view of a binding, see [Container::raw]
#[derive(Clone)]
pub struct RawBinding {
    pub key: String,
    pub producer: Producer,
    pub shared: bool,
    pub resolved: bool,
    pub instance: Option<Service>,
    pub extenders: Vec<Extender>,
    pub aliases: Vec<String>,
    pub tags: Vec<String>,
}

impl fmt::Debug for RawBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawBinding")
            .field("key", &self.key)
            .field("producer", &self.producer)
            .field("shared", &self.shared)
            .field("resolved", &self.resolved)
            .field("instance", &self.instance)
            .field("extenders", &self.extenders.len())
            .field("aliases", &self.aliases)
            .field("tags", &self.tags)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub enum SnapshotEntry {
    Raw(RawBinding),
    Resolved(Option<Service>),
}

/// Result of [Container::all]
#[derive(Clone, Default)]
pub struct Snapshot {
    pub services: IndexMap<String, SnapshotEntry>,
    pub providers: Option<Vec<Arc<dyn Provider>>>,
    pub contextual_bindings: Option<IndexMap<String, IndexMap<String, Contextual>>>,
}

/// Bindings and the bookkeeping attached to them
#[derive(Default)]
pub(crate) struct Registry {
    pub(crate) bindings: IndexMap<String, Binding>,
    pub(crate) instances: HashMap<String, Service>,
    pub(crate) resolved: HashSet<String>,
    pub(crate) aliases: IndexMap<String, String>,
    pub(crate) tags: IndexMap<String, IndexSet<String>>,
    pub(crate) extenders: IndexMap<String, Vec<Extender>>,
    pub(crate) initializers: Vec<Extender>,
    pub(crate) contextual: IndexMap<String, IndexMap<String, Contextual>>,
    pub(crate) converters: Vec<Converter>,
}

impl Registry {
    fn canonical(&self, key: &str) -> String {
        self.aliases
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    fn aliases_of(&self, key: &str) -> Vec<String> {
        self.aliases
            .iter()
            .filter(|(_, target)| *target == key)
            .map(|(alias, _)| alias.clone())
            .collect()
    }

    fn tags_of(&self, key: &str) -> Vec<String> {
        self.tags
            .iter()
            .filter(|(_, members)| members.contains(key))
            .map(|(tag, _)| tag.clone())
            .collect()
    }

    /// Point `alias` at `key`, keeping every alias single level
    fn set_alias(&mut self, alias: &str, key: &str) -> bool {
        if alias == key {
            return false;
        }
        for target in self.aliases.values_mut() {
            if target == alias {
                *target = key.to_string();
            }
        }
        self.aliases.insert(alias.to_string(), key.to_string());
        true
    }
}

/// Service registry and dependency resolution engine.
///
/// All methods take `&self`: providers, factories, extenders, initializers and converters
/// receive the container and may register or resolve other services while they run.
pub struct Container {
    pub(crate) registry: Mutex<Registry>,
    pub(crate) providers: Mutex<ProviderQueue>,
    pub(crate) catalog: Catalog,
    dispatcher: RwLock<Option<Arc<dyn Dispatcher>>>,
    /// Threads currently running the converters of this container
    converting: Mutex<HashSet<ThreadId>>,
}

/// Held while converters run, so a converter querying the container does not convert again
struct ConverterGuard<'a> {
    threads: &'a Mutex<HashSet<ThreadId>>,
    thread: ThreadId,
}

impl<'a> ConverterGuard<'a> {
    fn acquire(threads: &'a Mutex<HashSet<ThreadId>>) -> Option<Self> {
        let thread = thread::current().id();
        threads.lock().insert(thread).then_some(Self { threads, thread })
    }
}

impl Drop for ConverterGuard<'_> {
    fn drop(&mut self) {
        self.threads.lock().remove(&self.thread);
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    pub fn new() -> Self {
        Self {
            registry: Mutex::default(),
            providers: Mutex::default(),
            catalog: Catalog::new(),
            dispatcher: RwLock::new(None),
            converting: Mutex::default(),
        }
    }

    pub fn with_dispatcher(self, dispatcher: Arc<dyn Dispatcher>) -> Self {
        self.set_dispatcher(dispatcher);
        self
    }

    pub fn set_dispatcher(&self, dispatcher: Arc<dyn Dispatcher>) {
        *self.dispatcher.write() = Some(dispatcher);
    }

    /// Descriptors of the classes and callables the container can autowire
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Describe a concrete type so that it can be autowired.
    pub fn register<T: Autowire>(&self) {
        self.catalog.register::<T>();
    }

    pub(crate) fn dispatch(&self, event: ContainerEvent) -> ContainerEvent {
        let dispatcher = self.dispatcher.read().clone();
        match dispatcher {
            Some(dispatcher) => dispatcher.dispatch(event),
            None => event,
        }
    }

    pub(crate) fn canonical(&self, key: &str) -> String {
        self.registry.lock().canonical(key)
    }

    /// Register how to produce `key`, replacing any previous binding and its cached instance.
    pub fn bind(&self, key: &str, producer: impl Into<Producer>, options: BindOptions) {
        let BindOptions {
            shared,
            tags,
            aliases,
            extenders,
        } = options;

        let key = {
            let mut registry = self.registry.lock();
            let key = registry.canonical(key);
            registry.bindings.insert(
                key.clone(),
                Binding {
                    producer: producer.into(),
                    shared,
                },
            );
            registry.instances.remove(&key);
            registry.resolved.remove(&key);
            if !extenders.is_empty() {
                registry
                    .extenders
                    .entry(key.clone())
                    .or_default()
                    .extend(extenders);
            }
            key
        };
        debug!(service = %key, shared, "bound service");

        self.dispatch(ContainerEvent::Binded {
            service: key.clone(),
        });
        for tag in &tags {
            self.add_tag(&key, tag);
        }
        for alias in &aliases {
            self.add_alias(&key, alias);
        }
    }

    /// Bind a singleton: the first produced value is cached and reused.
    pub fn share(&self, key: &str, producer: impl Into<Producer>, options: BindOptions) {
        self.bind(key, producer, BindOptions { shared: true, ..options });
    }

    /// Bind an already built singleton.
    pub fn instance(&self, key: &str, value: Service, options: BindOptions) {
        self.share(key, Producer::Value(value.clone()), options);
        let mut registry = self.registry.lock();
        let key = registry.canonical(key);
        registry.resolved.insert(key.clone());
        registry.instances.insert(key, value);
    }

    /// Remove a binding with its cached instance, extenders, aliases and tag memberships.
    pub fn unbind(&self, key: &str) {
        let mut registry = self.registry.lock();
        let key = registry.canonical(key);
        registry.aliases.retain(|_, target| *target != key);
        for members in registry.tags.values_mut() {
            members.shift_remove(&key);
        }
        registry.tags.retain(|_, members| !members.is_empty());
        registry.extenders.shift_remove(&key);
        registry.bindings.shift_remove(&key);
        registry.instances.remove(&key);
        registry.resolved.remove(&key);
        debug!(service = %key, "unbound service");
    }

    /// Transform the next values produced for `key`.
    ///
    /// Extenders of a shared binding are dropped once its instance is cached.
    pub fn extend<F>(&self, key: &str, extender: F)
    where
        F: Fn(Service, &Container) -> Service + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        let key = registry.canonical(key);
        registry
            .extenders
            .entry(key)
            .or_default()
            .push(Arc::new(extender));
    }

    /// Transform every newly created value, whatever its key.
    pub fn add_initializer<F>(&self, initializer: F)
    where
        F: Fn(Service, &Container) -> Service + Send + Sync + 'static,
    {
        self.registry.lock().initializers.push(Arc::new(initializer));
    }

    /// Label a known key. Unknown keys are ignored.
    pub fn add_tag(&self, key: &str, tag: &str) {
        if !self.has(key) {
            return;
        }
        let (key, added) = {
            let mut registry = self.registry.lock();
            let key = registry.canonical(key);
            let added = registry
                .tags
                .entry(tag.to_string())
                .or_default()
                .insert(key.clone());
            (key, added)
        };
        if added {
            debug!(service = %key, tag, "tagged service");
            self.dispatch(ContainerEvent::Tagged {
                service: key,
                tag: tag.to_string(),
            });
        }
    }

    /// Make `alias` resolve to a known key. Unknown keys are ignored.
    pub fn add_alias(&self, key: &str, alias: &str) {
        if !self.has(key) {
            return;
        }
        self.alias_known(key, alias);
    }

    fn alias_known(&self, key: &str, alias: &str) {
        let (key, added) = {
            let mut registry = self.registry.lock();
            let key = registry.canonical(key);
            let added = registry.set_alias(alias, &key);
            (key, added)
        };
        if added {
            debug!(service = %key, alias, "aliased service");
            self.dispatch(ContainerEvent::Aliased {
                service: key,
                alias: alias.to_string(),
            });
        }
    }

    pub fn add_converter<F>(&self, converter: F)
    where
        F: Fn(&str, &Container) -> String + Send + Sync + 'static,
    {
        self.registry.lock().converters.push(Arc::new(converter));
    }

    /// Run every converter on `key`, each one receiving the previous result.
    pub fn convert(&self, key: &str) -> String {
        let converters = self.registry.lock().converters.clone();
        converters
            .iter()
            .fold(key.to_string(), |key, converter| converter(&key, self))
    }

    /// Override `needs` while it is injected in the constructor of `when`.
    pub fn add_contextual_binding(&self, when: &str, needs: &str, implementation: impl Into<Contextual>) {
        self.registry
            .lock()
            .contextual
            .entry(when.to_string())
            .or_default()
            .insert(needs.to_string(), implementation.into());
    }

    /// Start a contextual binding: `when("Consumer").needs("Dependency").give("Concrete")`.
    pub fn when(&self, consumer: &str) -> ContextualBindingBuilder<'_> {
        ContextualBindingBuilder {
            container: self,
            when: consumer.to_string(),
        }
    }

    /// Register eager providers now, keep deferred ones until one of their keys is requested.
    pub fn add_provider(&self, provider: Arc<dyn Provider>) {
        if provider.is_deferred() {
            self.providers.lock().push(provider);
        } else {
            provider.register(self);
        }
    }

    pub fn providers(&self) -> Vec<Arc<dyn Provider>> {
        self.providers.lock().pending().to_vec()
    }

    pub fn contextual_bindings(&self) -> IndexMap<String, IndexMap<String, Contextual>> {
        self.registry.lock().contextual.clone()
    }

    /// Whether `key` (or the key it is aliased to) can be resolved.
    ///
    /// May activate a deferred provider or, as a last resort, alias `key` to the first
    /// converted key that is known.
    pub fn has(&self, key: &str) -> bool {
        let key = {
            let registry = self.registry.lock();
            let key = registry.canonical(key);
            if registry.bindings.contains_key(&key) {
                return true;
            }
            key
        };

        let claimed = self.providers.lock().take_claiming(&key);
        if let Some(provider) = claimed {
            debug!(service = %key, "activating deferred provider");
            provider.register(self);
            return self.has(&key);
        }

        let Some(_guard) = ConverterGuard::acquire(&self.converting) else {
            return false;
        };
        let converters = self.registry.lock().converters.clone();
        for converter in &converters {
            let converted = converter(&key, self);
            if converted != key && self.has(&converted) {
                self.alias_known(&converted, &key);
                return true;
            }
        }
        false
    }

    /// Introspect a binding without building anything.
    pub fn raw(&self, key: &str) -> Option<RawBinding> {
        if !self.has(key) {
            return None;
        }
        let registry = self.registry.lock();
        let key = registry.canonical(key);
        let binding = registry.bindings.get(&key)?;
        Some(RawBinding {
            producer: binding.producer.clone(),
            shared: binding.shared,
            resolved: registry.resolved.contains(&key),
            instance: registry.instances.get(&key).cloned(),
            extenders: registry.extenders.get(&key).cloned().unwrap_or_default(),
            aliases: registry.aliases_of(&key),
            tags: registry.tags_of(&key),
            key,
        })
    }

    pub fn is_shared(&self, key: &str) -> bool {
        if !self.has(key) {
            return false;
        }
        let registry = self.registry.lock();
        let key = registry.canonical(key);
        registry.bindings.get(&key).is_some_and(|b| b.shared)
    }

    pub fn is_tagged(&self, key: &str) -> bool {
        if !self.has(key) {
            return false;
        }
        let registry = self.registry.lock();
        let key = registry.canonical(key);
        registry.tags.values().any(|members| members.contains(&key))
    }

    pub fn is_aliased(&self, key: &str) -> bool {
        if !self.has(key) {
            return false;
        }
        let registry = self.registry.lock();
        let key = registry.canonical(key);
        registry.aliases.values().any(|target| *target == key)
    }

    pub fn is_resolved(&self, key: &str) -> bool {
        let registry = self.registry.lock();
        registry.resolved.contains(&registry.canonical(key))
    }

    /// Activate every pending provider, then resolve each key carrying `tag`.
    pub fn find_by_tag(
        &self,
        tag: &str,
        options: GetOptions,
    ) -> Result<IndexMap<String, Option<Service>>, WiringError> {
        let pending = self.providers.lock().drain();
        for provider in pending {
            provider.register(self);
        }

        let keys: Vec<String> = self
            .registry
            .lock()
            .tags
            .get(tag)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default();
        keys.into_iter()
            .map(|key| {
                let value = self.get_with(&key, options.clone())?;
                Ok((key, value))
            })
            .collect()
    }

    /// Snapshot every bound key, resolved or as raw bindings.
    pub fn all(&self, options: AllOptions) -> Snapshot {
        let keys: Vec<String> = self.registry.lock().bindings.keys().cloned().collect();
        let mut services = IndexMap::with_capacity(keys.len());
        for key in keys {
            let entry = if options.raw {
                match self.raw(&key) {
                    Some(raw) => SnapshotEntry::Raw(raw),
                    None => continue,
                }
            } else {
                SnapshotEntry::Resolved(self.get(&key))
            };
            services.insert(key, entry);
        }

        Snapshot {
            services,
            providers: options.providers.then(|| self.providers()),
            contextual_bindings: options
                .contextual_bindings
                .then(|| self.contextual_bindings()),
        }
    }

    /// Copy the bindings, pending providers and contextual bindings of `other`.
    ///
    /// Instances already resolved by `other` are kept as they are.
    pub fn merge(&self, other: &Container) {
        let snapshot = other.all(AllOptions {
            raw: true,
            providers: true,
            contextual_bindings: true,
        });

        for (key, entry) in snapshot.services {
            let SnapshotEntry::Raw(raw) = entry else {
                continue;
            };
            self.bind(
                &key,
                raw.producer,
                BindOptions {
                    shared: raw.shared,
                    tags: raw.tags,
                    aliases: raw.aliases,
                    extenders: raw.extenders,
                },
            );
            if let (true, Some(instance)) = (raw.resolved, raw.instance) {
                let mut registry = self.registry.lock();
                registry.resolved.insert(key.clone());
                registry.instances.insert(key, instance);
            }
        }

        for provider in snapshot.providers.unwrap_or_default() {
            self.add_provider(provider);
        }

        let mut registry = self.registry.lock();
        for (when, overrides) in snapshot.contextual_bindings.unwrap_or_default() {
            registry.contextual.entry(when).or_default().extend(overrides);
        }
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let provides = self.providers.lock().provides();
        let registry = self.registry.lock();
        let services: IndexMap<&String, bool> = registry
            .bindings
            .iter()
            .map(|(key, binding)| (key, binding.shared))
            .collect();
        let contextual: IndexMap<&String, Vec<&String>> = registry
            .contextual
            .iter()
            .map(|(when, overrides)| (when, overrides.keys().collect()))
            .collect();
        f.debug_struct("Container")
            .field("services", &services)
            .field("resolved", &registry.resolved)
            .field("aliases", &registry.aliases)
            .field("tags", &registry.tags)
            .field("provides", &provides)
            .field("extenders", &registry.extenders.keys().collect::<Vec<_>>())
            .field("initializers", &registry.initializers.len())
            .field("contextual_bindings", &contextual)
            .finish()
    }
}

/// Builder returned by [Container::when]
pub struct ContextualBindingBuilder<'a> {
    container: &'a Container,
    when: String,
}

impl<'a> ContextualBindingBuilder<'a> {
    pub fn needs(self, dependency: &str) -> ContextualNeeds<'a> {
        ContextualNeeds {
            container: self.container,
            when: self.when,
            needs: dependency.to_string(),
        }
    }
}

pub struct ContextualNeeds<'a> {
    container: &'a Container,
    when: String,
    needs: String,
}

impl ContextualNeeds<'_> {
    pub fn give(self, implementation: impl Into<Contextual>) {
        self.container
            .add_contextual_binding(&self.when, &self.needs, implementation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(n: u32) -> Service {
        Service::new(n)
    }

    #[test]
    fn rebinding_evicts_the_cached_instance() {
        let container = Container::new();
        container.instance("n", value(1), BindOptions::new());
        assert!(container.is_resolved("n"));
        container.share("n", value(2), BindOptions::new());
        assert!(!container.is_resolved("n"));
        assert!(container.raw("n").unwrap().instance.is_none());
        assert_eq!(container.get("n").unwrap().cloned::<u32>(), Some(2));
    }

    #[test]
    fn binding_through_an_alias_targets_the_canonical_key() {
        let container = Container::new();
        container.bind("db", value(1), BindOptions::new().alias("database"));
        container.bind("database", value(2), BindOptions::new());

        let raw = container.raw("db").unwrap();
        assert_eq!(raw.aliases, vec!["database".to_string()]);
        assert_eq!(container.get("db").unwrap().cloned::<u32>(), Some(2));
        assert_eq!(container.all(AllOptions::default()).services.len(), 1);
    }

    #[test]
    fn unbind_clears_aliases_and_empty_tags() {
        let container = Container::new();
        container.bind("a", value(1), BindOptions::new().tag("t").alias("x"));
        container.bind("b", value(2), BindOptions::new().tag("t").tag("solo"));
        container.unbind("x");

        assert!(!container.has("a"));
        assert!(!container.has("x"));
        let raw = container.raw("b").unwrap();
        assert_eq!(raw.tags, vec!["t".to_string(), "solo".to_string()]);
        container.unbind("b");
        assert!(container.registry.lock().tags.is_empty());
    }

    #[test]
    fn aliases_and_tags_of_unknown_keys_are_ignored() {
        let container = Container::new();
        container.add_alias("ghost", "phantom");
        container.add_tag("ghost", "spooky");
        assert!(!container.has("phantom"));
        assert!(container.registry.lock().tags.is_empty());
    }

    #[test]
    fn aliases_stay_single_level() {
        let container = Container::new();
        container.bind("a", value(1), BindOptions::new());
        container.bind("b", value(2), BindOptions::new());
        container.add_alias("b", "c");
        container.add_alias("a", "b");
        container.add_alias("a", "a");

        let registry = container.registry.lock();
        assert_eq!(registry.aliases.get("c").map(String::as_str), Some("a"));
        assert_eq!(registry.aliases.get("b").map(String::as_str), Some("a"));
        assert!(registry.aliases.get("a").is_none());
    }

    #[test]
    fn predicates_follow_aliases() {
        let container = Container::new();
        container.share("a", value(1), BindOptions::new().alias("alias").tag("t"));
        container.bind("b", value(2), BindOptions::new());

        assert!(container.is_shared("alias"));
        assert!(container.is_tagged("alias"));
        assert!(container.is_aliased("a"));
        assert!(!container.is_shared("b"));
        assert!(!container.is_tagged("b"));
        assert!(!container.is_aliased("b"));
        assert!(!container.is_shared("missing"));
    }

    #[test]
    fn convert_pipes_every_converter() {
        let container = Container::new();
        container.add_converter(|key, _| key.to_lowercase());
        container.add_converter(|key, _| format!("app.{key}"));
        assert_eq!(container.convert("Mailer"), "app.mailer");
    }

    #[test]
    fn debug_lists_services_without_building_them() {
        let container = Container::new();
        container.bind(
            "lazy",
            Producer::factory(|_, _| panic!("must not be built")),
            BindOptions::new(),
        );
        container.when("A").needs("B").give("C");
        let debug = format!("{container:?}");
        assert!(debug.contains("lazy"));
        assert!(debug.contains("contextual_bindings"));
    }
}
