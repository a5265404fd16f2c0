//! # The Container
//!
//! A registry of identifiers, a singleton cache, and the resolution
//! pipeline that turns a registration into an instance.
//!
//! # Resolution
//! ```text
//! get(id) ──> cached singleton? ──yes──> return it
//!                  │ no
//!                  ▼
//!             registration ──Value────> return it
//!                  │ Type / Factory
//!                  ▼
//!      resolve each parameter in order
//!        registered  → get(parameter)        (recursive)
//!        nullable    → None
//!        otherwise   → UnknownParameter
//!                  │
//!                  ▼
//!      construct / invoke ──> cache if singleton ──> return
//! ```
//!
//! # Examples
//! ```rust
//! use block_container::prelude::*;
//! use std::sync::Arc;
//!
//! struct Config {
//!     dsn: &'static str,
//! }
//!
//! struct Database {
//!     config: Arc<Config>,
//! }
//!
//! let container = Container::new();
//! container.singleton(
//!     Identifier::of::<Config>(),
//!     Definition::value(Config { dsn: "postgres://localhost" }),
//! );
//! container.set(
//!     Identifier::of::<Database>(),
//!     Definition::factory(|config: Arc<Config>| Database { config }),
//! );
//!
//! let db: Arc<Database> = container.resolve().unwrap();
//! assert_eq!(db.config.dsn, "postgres://localhost");
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use block_support::rendering::suggest_similar;
use parking_lot::ReentrantMutex;
use tracing::{debug, instrument, trace, warn};

use crate::definition::{Arguments, Definition, Injectable, Instance, Parameter, downcast};
use crate::error::{
    BlockError, CircularDependencyError, NotFoundError, Result, UnknownParameterError,
};
use crate::identifier::Identifier;
use crate::provider::{ServiceProvider, find_provider};
use crate::registry::{Registration, Registry};
use crate::scope::Scope;
use crate::settings::Settings;

const MAX_SUGGESTIONS: usize = 3;

// ═══════════════════════════════════════════
// Container
// ═══════════════════════════════════════════

/// Runtime dependency injection container.
///
/// All operations take `&self`. One re-entrant lock guards the registry,
/// the singleton cache and every `get` from start to finish, so a
/// singleton is built exactly once even with concurrent callers, while
/// factories and providers may still call back into the container on
/// the same thread.
pub struct Container {
    state: ReentrantMutex<RefCell<State>>,
    settings: Settings,
}

#[derive(Default)]
struct State {
    registry: Registry,
    singletons: HashMap<Identifier, Instance>,
    /// Identifiers currently being built, outermost first.
    resolving: Vec<Identifier>,
}

impl State {
    fn contains(&self, identifier: &str) -> bool {
        self.singletons.contains_key(identifier) || self.registry.contains(identifier)
    }
}

impl Container {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            state: ReentrantMutex::new(RefCell::new(State::default())),
            settings,
        }
    }

    /// Create a new builder.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ── Registration ──

    /// Registers a transient definition: rebuilt on every `get`.
    pub fn set(&self, identifier: impl Into<Identifier>, definition: impl Into<Definition>) {
        self.set_scoped(identifier, definition, Scope::Transient);
    }

    /// Registers a singleton definition: built once, then cached.
    pub fn singleton(&self, identifier: impl Into<Identifier>, definition: impl Into<Definition>) {
        self.set_scoped(identifier, definition, Scope::Singleton);
    }

    /// Registers `definition` under `identifier` with an explicit scope.
    ///
    /// Replaces any earlier registration for the identifier. An instance
    /// already in the singleton cache is kept and keeps being returned;
    /// only [`remove`](Container::remove) clears it.
    pub fn set_scoped(
        &self,
        identifier: impl Into<Identifier>,
        definition: impl Into<Definition>,
        scope: impl Into<Scope>,
    ) {
        let registration = Registration {
            identifier: identifier.into(),
            scope: scope.into(),
            definition: definition.into(),
        };

        let guard = self.state.lock();
        let replaced = guard.borrow_mut().registry.insert(registration);
        if let Some(previous) = replaced {
            trace!(identifier = %previous.identifier, "Replaced previous registration");
        }
    }

    /// Registers the constructible type `T` under its own type identifier.
    pub fn bind<T: Injectable>(&self) {
        self.set(Identifier::of::<T>(), Definition::of::<T>());
    }

    /// Like [`bind`](Container::bind), cached as a singleton.
    pub fn bind_singleton<T: Injectable>(&self) {
        self.singleton(Identifier::of::<T>(), Definition::of::<T>());
    }

    /// Removes the registration and any cached instance. Idempotent.
    pub fn remove(&self, identifier: impl AsRef<str>) {
        let identifier = identifier.as_ref();
        let guard = self.state.lock();
        // dropped after the borrow ends, their Drop may call back in
        let (registration, instance) = {
            let mut state = guard.borrow_mut();
            (state.registry.remove(identifier), state.singletons.remove(identifier))
        };
        if registration.is_some() || instance.is_some() {
            debug!(identifier, "Removed dependency");
        }
    }

    // ── Lookup ──

    /// Whether `get` can find the identifier.
    ///
    /// `true` does not promise that building succeeds, only that `get`
    /// will not fail with [`BlockError::NotFound`].
    pub fn has(&self, identifier: impl AsRef<str>) -> bool {
        let guard = self.state.lock();
        let state = guard.borrow();
        state.contains(identifier.as_ref())
    }

    /// Resolves an identifier into an instance.
    ///
    /// # Errors
    /// - [`BlockError::InvalidArgument`] — the identifier is not well formed
    /// - [`BlockError::NotFound`] — nothing registered under it
    /// - [`BlockError::UnknownParameter`] — a required parameter could not
    ///   be resolved, at any depth
    /// - [`BlockError::CircularDependency`] — only with cycle detection on
    ///
    /// Nothing is cached for `identifier` when building it fails.
    pub fn get(&self, identifier: impl AsRef<str>) -> Result<Instance> {
        let guard = self.state.lock();
        self.resolve_in(&guard, identifier.as_ref())
    }

    /// Resolves an identifier and downcasts the instance to `T`.
    ///
    /// ```rust
    /// use block_container::prelude::*;
    ///
    /// let container = Container::new();
    /// container.set("greeting", Definition::value(String::from("hello")));
    ///
    /// let greeting = container.get_as::<String>("greeting").unwrap();
    /// assert_eq!(greeting.as_str(), "hello");
    /// assert!(container.get_as::<u32>("greeting").is_err());
    /// ```
    pub fn get_as<T: Send + Sync + 'static>(&self, identifier: impl AsRef<str>) -> Result<Arc<T>> {
        let identifier = identifier.as_ref();
        let instance = self.get(identifier)?;
        downcast(&Identifier::from(identifier.to_owned()), instance)
    }

    /// Resolves `T` from its type identifier.
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.get_as::<T>(Identifier::of::<T>())
    }

    // ── Providers ──

    /// Lets `provider` register its dependencies.
    pub fn register<P: ServiceProvider>(&self, provider: P) {
        self.register_provider(&provider);
    }

    /// Instantiates `P` with no arguments and registers it.
    pub fn register_type<P: ServiceProvider + Default>(&self) {
        self.register_provider(&P::default());
    }

    /// Instantiates the provider submitted under `name` with
    /// [`provider!`](crate::provider!) and registers it.
    ///
    /// # Errors
    /// [`BlockError::InvalidArgument`] if no provider goes by that name.
    pub fn register_named(&self, name: &str) -> Result<()> {
        let entry = find_provider(name).ok_or_else(|| BlockError::invalid_provider(name))?;
        self.register_provider(entry.instantiate().as_ref());
        Ok(())
    }

    #[instrument(skip_all, fields(provider = provider.name()))]
    fn register_provider(&self, provider: &dyn ServiceProvider) {
        debug!("Registering service provider");
        provider.register(self);
    }

    // ── Introspection ──

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.state.lock().borrow().registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every identifier `has` answers `true` for, sorted.
    pub fn identifiers(&self) -> Vec<Identifier> {
        let guard = self.state.lock();
        let state = guard.borrow();
        let mut identifiers: Vec<Identifier> = state
            .registry
            .identifiers()
            .chain(state.singletons.keys())
            .cloned()
            .collect();
        identifiers.sort();
        identifiers.dedup();
        identifiers
    }

    // ── Resolution (lock held) ──

    fn resolve_in(&self, state: &RefCell<State>, identifier: &str) -> Result<Instance> {
        let identifier = Identifier::from(identifier.to_owned());
        if !identifier.is_well_formed() {
            return Err(BlockError::invalid_identifier(identifier.as_str()));
        }

        let registration = {
            let state = state.borrow();
            if let Some(instance) = state.singletons.get(identifier.as_str()) {
                trace!(%identifier, "Returning cached singleton");
                return Ok(Arc::clone(instance));
            }
            match state.registry.get(identifier.as_str()) {
                Some(registration) => registration.clone(),
                None => return Err(self.not_found(&state, identifier)),
            }
        };

        if self.settings.detect_cycles {
            self.check_cycle(state, &identifier)?;
        }

        trace!(%identifier, kind = registration.definition.kind(), "Resolving");
        let instance = {
            let _resolving = ResolvingGuard::enter(state, identifier.clone());
            self.build(state, &registration)?
        };

        if registration.scope.is_cached() {
            debug!(%identifier, "Caching singleton");
            state
                .borrow_mut()
                .singletons
                .insert(identifier, Arc::clone(&instance));
        }

        Ok(instance)
    }

    /// Produces an instance from a registration's definition.
    fn build(&self, state: &RefCell<State>, registration: &Registration) -> Result<Instance> {
        let identifier = &registration.identifier;
        match &registration.definition {
            Definition::Value(instance) => Ok(Arc::clone(instance)),
            Definition::Type(descriptor) => {
                let mut arguments =
                    self.resolve_parameters(state, identifier, &descriptor.parameters())?;
                descriptor.construct(&mut arguments)
            }
            Definition::Factory(factory) => {
                let mut arguments =
                    self.resolve_parameters(state, identifier, factory.parameters())?;
                factory.invoke(self, &mut arguments)
            }
        }
    }

    /// Resolves declared parameters in order.
    fn resolve_parameters(
        &self,
        state: &RefCell<State>,
        consumer: &Identifier,
        parameters: &[Parameter],
    ) -> Result<Arguments> {
        let mut slots = Vec::with_capacity(parameters.len());

        for parameter in parameters {
            let dependency = parameter.identifier();
            let known = state.borrow().contains(dependency.as_str());

            let argument = if known {
                Some(self.resolve_in(state, dependency.as_str())?)
            } else if parameter.is_nullable() {
                trace!(%consumer, parameter = parameter.name(), %dependency, "Unregistered nullable parameter, passing None");
                None
            } else {
                return Err(BlockError::UnknownParameter(UnknownParameterError {
                    parameter: parameter.name(),
                    identifier: dependency.clone(),
                    consumer: consumer.clone(),
                }));
            };

            slots.push((parameter.clone(), argument));
        }

        Ok(Arguments::new(consumer.clone(), slots))
    }

    fn check_cycle(&self, state: &RefCell<State>, identifier: &Identifier) -> Result<()> {
        let state = state.borrow();
        let Some(start) = state.resolving.iter().position(|r| r == identifier) else {
            return Ok(());
        };

        let mut chain = state.resolving[start..].to_vec();
        chain.push(identifier.clone());
        warn!(cycle = ?chain, "Circular dependency detected");
        Err(BlockError::CircularDependency(CircularDependencyError { chain }))
    }

    fn not_found(&self, state: &State, requested: Identifier) -> BlockError {
        let mut available: Vec<&str> = state
            .registry
            .identifiers()
            .chain(state.singletons.keys())
            .map(Identifier::as_str)
            .collect();
        // resolved singletons sit in both maps
        available.sort_unstable();
        available.dedup();

        BlockError::NotFound(NotFoundError {
            suggestions: suggest_similar(requested.as_str(), &available, MAX_SUGGESTIONS),
            required_by: state.resolving.last().cloned(),
            requested,
        })
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.state.lock();
        let state = guard.borrow();
        f.debug_struct("Container")
            .field("registered", &state.registry.len())
            .field("singletons", &state.singletons.len())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Keeps `identifier` on the resolving stack while it is built.
struct ResolvingGuard<'a> {
    state: &'a RefCell<State>,
}

impl<'a> ResolvingGuard<'a> {
    fn enter(state: &'a RefCell<State>, identifier: Identifier) -> Self {
        state.borrow_mut().resolving.push(identifier);
        Self { state }
    }
}

impl Drop for ResolvingGuard<'_> {
    fn drop(&mut self) {
        self.state.borrow_mut().resolving.pop();
    }
}

// ═══════════════════════════════════════════
// ContainerBuilder
// ═══════════════════════════════════════════

/// Fluent setup for a [`Container`].
///
/// ```rust
/// use block_container::prelude::*;
///
/// let container = Container::builder()
///     .detect_cycles(true)
///     .singleton("app.name", Definition::value("block"))
///     .set("app.version", Definition::factory(|| (0u8, 1u8)))
///     .build();
///
/// assert!(container.settings().detect_cycles);
/// assert_eq!(container.len(), 2);
/// ```
pub struct ContainerBuilder {
    settings: Settings,
    steps: Vec<Step>,
}

enum Step {
    Set(Identifier, Definition, Scope),
    Provider(Box<dyn ServiceProvider>),
}

impl ContainerBuilder {
    fn new() -> Self {
        Self {
            settings: Settings::default(),
            steps: Vec::new(),
        }
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn detect_cycles(mut self, detect: bool) -> Self {
        self.settings.detect_cycles = detect;
        self
    }

    pub fn set(self, identifier: impl Into<Identifier>, definition: impl Into<Definition>) -> Self {
        self.push(Step::Set(identifier.into(), definition.into(), Scope::Transient))
    }

    pub fn singleton(
        self,
        identifier: impl Into<Identifier>,
        definition: impl Into<Definition>,
    ) -> Self {
        self.push(Step::Set(identifier.into(), definition.into(), Scope::Singleton))
    }

    /// Add a [`ServiceProvider`]. Providers run in order during `build`.
    pub fn provider<P: ServiceProvider + 'static>(self, provider: P) -> Self {
        self.push(Step::Provider(Box::new(provider)))
    }

    /// Creates the container and applies every step in order.
    pub fn build(self) -> Container {
        let container = Container::with_settings(self.settings);
        for step in self.steps {
            match step {
                Step::Set(identifier, definition, scope) => {
                    container.set_scoped(identifier, definition, scope)
                }
                Step::Provider(provider) => container.register_provider(provider.as_ref()),
            }
        }
        debug!(registered = container.len(), "Container built");
        container
    }

    fn push(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{Container, ContainerBuilder};
    pub use crate::definition::{
        Arguments, Definition, Factory, Inject, Injectable, Instance, Parameter,
    };
    pub use crate::error::{BlockError, ErrorKind, Result};
    pub use crate::identifier::Identifier;
    pub use crate::provider::ServiceProvider;
    pub use crate::scope::Scope;
    pub use crate::settings::Settings;
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Factory;
    use crate::error::ErrorKind;
    use std::sync::atomic::{AtomicU32, Ordering};

    static NEXT_SERIAL: AtomicU32 = AtomicU32::new(0);

    /// Gets a new serial on every construction.
    struct Clock {
        serial: u32,
    }

    impl Injectable for Clock {
        fn parameters() -> Vec<Parameter> {
            vec![]
        }

        fn construct(_: &mut Arguments) -> Result<Self> {
            Ok(Self { serial: NEXT_SERIAL.fetch_add(1, Ordering::SeqCst) })
        }
    }

    struct Scheduler {
        clock: Option<Arc<Clock>>,
    }

    impl Injectable for Scheduler {
        fn parameters() -> Vec<Parameter> {
            vec![<Option<Arc<Clock>> as crate::definition::Inject>::parameter("clock", None)]
        }

        fn construct(arguments: &mut Arguments) -> Result<Self> {
            Ok(Self { clock: arguments.take()? })
        }
    }

    #[test]
    fn plain_value_round_trip() {
        let container = Container::new();
        container.set("str", Definition::value(String::from("123")));

        assert!(container.has("str"));
        let value = container.get_as::<String>("str").unwrap();
        assert_eq!(value.as_str(), "123");
    }

    #[test]
    fn value_definitions_are_returned_as_is() {
        let container = Container::new();
        container.set("list", Definition::value(vec![1, 2, 3]));

        let a = container.get("list").unwrap();
        let b = container.get("list").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn remove_clears_registration_and_cache() {
        let container = Container::new();
        container.bind_singleton::<Clock>();
        let id = Identifier::of::<Clock>();
        container.get(&id).unwrap();

        container.remove(&id);
        assert!(!container.has(&id));
        assert_eq!(container.get(&id).unwrap_err().kind(), ErrorKind::NotFound);

        // idempotent
        container.remove(&id);
    }

    #[test]
    fn transient_type_builds_fresh_instances() {
        let container = Container::new();
        container.bind::<Clock>();

        let a: Arc<Clock> = container.resolve().unwrap();
        let b: Arc<Clock> = container.resolve().unwrap();
        assert_ne!(a.serial, b.serial);
    }

    #[test]
    fn singleton_type_is_built_once() {
        let container = Container::new();
        container.bind_singleton::<Clock>();

        let a: Arc<Clock> = container.resolve().unwrap();
        let b: Arc<Clock> = container.resolve().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn cached_singleton_survives_overwrite() {
        let container = Container::new();
        container.singleton("answer", Definition::factory(|| 1u32));
        assert_eq!(*container.get_as::<u32>("answer").unwrap(), 1);

        container.set("answer", Definition::factory(|| 2u32));
        assert_eq!(*container.get_as::<u32>("answer").unwrap(), 1);

        container.remove("answer");
        container.set("answer", Definition::factory(|| 2u32));
        assert_eq!(*container.get_as::<u32>("answer").unwrap(), 2);
    }

    #[test]
    fn factory_without_parameters_is_invoked_each_time() {
        let counter = Arc::new(AtomicU32::new(0));
        let container = Container::new();
        container.set("tick", Definition::factory({
            let counter = counter.clone();
            move || counter.fetch_add(1, Ordering::SeqCst)
        }));

        assert_eq!(*container.get_as::<u32>("tick").unwrap(), 0);
        assert_eq!(*container.get_as::<u32>("tick").unwrap(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn factory_parameters_are_resolved_recursively() {
        let container = Container::new();
        container.bind::<Clock>();
        container.set("scheduler", Definition::factory(|clock: Arc<Clock>| Scheduler {
            clock: Some(clock),
        }));

        let scheduler = container.get_as::<Scheduler>("scheduler").unwrap();
        assert!(scheduler.clock.is_some());
    }

    #[test]
    fn nullable_parameter_falls_back_to_none() {
        let container = Container::new();
        container.bind::<Scheduler>();

        let scheduler: Arc<Scheduler> = container.resolve().unwrap();
        assert!(scheduler.clock.is_none());
    }

    #[test]
    fn nullable_parameter_uses_registration_when_present() {
        let container = Container::new();
        container.bind::<Clock>();
        container.bind::<Scheduler>();

        let scheduler: Arc<Scheduler> = container.resolve().unwrap();
        assert!(scheduler.clock.is_some());
    }

    #[test]
    fn required_parameter_missing_is_runtime_error() {
        let container = Container::new();
        container.set("scheduler", Definition::factory(|clock: Arc<Clock>| Scheduler {
            clock: Some(clock),
        }));

        let err = container.get("scheduler").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Runtime);
        match err {
            BlockError::UnknownParameter(e) => {
                assert_eq!(e.parameter, "#0");
                assert_eq!(e.identifier, Identifier::of::<Clock>());
                assert_eq!(e.consumer.as_str(), "scheduler");
            }
            other => panic!("Expected UnknownParameter, got: {other:?}"),
        }
    }

    #[test]
    fn failed_singleton_is_not_cached() {
        let container = Container::new();
        container.singleton("scheduler", Definition::factory(|clock: Arc<Clock>| Scheduler {
            clock: Some(clock),
        }));
        assert!(container.get("scheduler").is_err());

        container.bind::<Clock>();
        let a = container.get("scheduler").unwrap();
        let b = container.get("scheduler").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn not_found_with_suggestions() {
        let container = Container::new();
        container.set("mailer.transport", Definition::value(()));

        match container.get("mailer").unwrap_err() {
            BlockError::NotFound(e) => {
                assert_eq!(e.requested.as_str(), "mailer");
                assert_eq!(e.suggestions, vec!["mailer.transport".to_string()]);
                assert!(e.required_by.is_none());
            }
            other => panic!("Expected NotFound, got: {other:?}"),
        }
    }

    #[test]
    fn suggestions_list_resolved_singletons_once() {
        let container = Container::new();
        container.singleton("mailer.transport", Definition::value(1u8));
        container.get("mailer.transport").unwrap();

        match container.get("mailer").unwrap_err() {
            BlockError::NotFound(e) => {
                assert_eq!(e.suggestions, vec!["mailer.transport".to_string()]);
            }
            other => panic!("Expected NotFound, got: {other:?}"),
        }
    }

    #[test]
    fn remove_lets_dropped_instances_use_the_container() {
        struct Tidy {
            container: Arc<Container>,
        }

        impl Drop for Tidy {
            fn drop(&mut self) {
                self.container.set("tidy.dropped", Definition::value(true));
            }
        }

        let container = Arc::new(Container::new());
        container.singleton("tidy", Definition::value(Tidy { container: container.clone() }));
        container.get("tidy").unwrap();

        container.remove("tidy");
        assert!(!container.has("tidy"));
        assert!(container.has("tidy.dropped"));
    }

    #[test]
    fn malformed_identifier_is_invalid_argument() {
        let container = Container::new();
        container.set("", Definition::value(1));

        assert_eq!(container.get("").unwrap_err().kind(), ErrorKind::InvalidArgument);
        assert_eq!(container.get("   ").unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn resolving_factory_reports_its_consumer() {
        let container = Container::new();
        container.set("report", Factory::resolving(|c: &Container| {
            let title = c.get_as::<String>("report.title")?;
            Ok(format!("# {title}"))
        }));

        match container.get("report").unwrap_err() {
            BlockError::NotFound(e) => {
                assert_eq!(e.required_by.map(|id| id.to_string()), Some("report".into()));
            }
            other => panic!("Expected NotFound, got: {other:?}"),
        }

        container.set("report.title", Definition::value(String::from("Weekly")));
        assert_eq!(container.get_as::<String>("report").unwrap().as_str(), "# Weekly");
    }

    #[test]
    fn type_mismatch_on_wrong_downcast() {
        let container = Container::new();
        container.set("n", Definition::value(1u8));
        assert!(matches!(
            container.get_as::<String>("n").unwrap_err(),
            BlockError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn cycle_detection_when_enabled() {
        let container = Container::builder()
            .detect_cycles(true)
            .set("a", Definition::factory(|_: Arc<u16>| 1u8))
            .set(Identifier::of::<u16>(), Factory::resolving(|c: &Container| {
                c.get("a")?;
                Ok(2u16)
            }))
            .build();

        match container.get("a").unwrap_err() {
            BlockError::CircularDependency(e) => {
                let chain: Vec<&str> = e.chain.iter().map(Identifier::as_str).collect();
                assert_eq!(chain, vec!["a", "u16", "a"]);
            }
            other => panic!("Expected CircularDependency, got: {other:?}"),
        }

        // the resolving stack is unwound after the failure
        container.set("a", Definition::value(1u8));
        assert!(container.get(Identifier::of::<u16>()).is_ok());
    }

    #[test]
    fn has_reflects_registry_and_cache() {
        let container = Container::new();
        assert!(!container.has("x"));
        container.set("x", Definition::value(1));
        assert!(container.has("x"));
        assert_eq!(container.identifiers(), vec![Identifier::from("x")]);
    }

    #[test]
    fn singleton_built_once_across_threads() {
        let builds = Arc::new(AtomicU32::new(0));
        let container = Arc::new(Container::new());
        container.singleton("shared", Definition::factory({
            let builds = builds.clone();
            move || {
                builds.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(std::time::Duration::from_millis(5));
                7u64
            }
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let container = container.clone();
                std::thread::spawn(move || *container.get_as::<u64>("shared").unwrap())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 7);
        }
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn providers_register_through_the_container() {
        struct Answers;
        impl ServiceProvider for Answers {
            fn register(&self, container: &Container) {
                container.set("answer", Definition::value(42));
            }
        }

        let container = Container::builder().provider(Answers).build();
        assert_eq!(*container.get_as::<i32>("answer").unwrap(), 42);
    }

    #[test]
    fn unknown_provider_name_is_invalid_argument() {
        let container = Container::new();
        let err = container.register_named("nope::Provider").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn debug_display() {
        let container = Container::new();
        container.set("a", Definition::value(1));
        container.set("b", Definition::value(2));

        let debug = format!("{container:?}");
        assert!(debug.contains("Container"));
        assert!(debug.contains("registered: 2"));
    }
}
