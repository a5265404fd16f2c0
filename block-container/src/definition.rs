//! What a registration knows about building its instance.
//!
//! A [`Definition`] is fixed when it is registered and is one of:
//!
//! - [`Definition::Value`] — an already built instance, handed out as-is
//! - [`Definition::Type`] — a constructible type ([`Injectable`])
//! - [`Definition::Factory`] — a closure ([`Factory`])
//!
//! Types and factories describe their constructor parameters up front as
//! [`Parameter`]s. The container resolves those parameters in order and
//! passes the results in as [`Arguments`].
//!
//! # Examples
//! ```rust
//! use block_container::prelude::*;
//! use std::sync::Arc;
//!
//! struct Transport;
//! struct Mailer {
//!     transport: Arc<Transport>,
//! }
//!
//! let container = Container::new();
//! container.set(Identifier::of::<Transport>(), Definition::factory(|| Transport));
//! container.set(
//!     "mailer",
//!     Definition::factory(|transport: Arc<Transport>| Mailer { transport }),
//! );
//!
//! let mailer = container.get_as::<Mailer>("mailer").unwrap();
//! let _transport: &Transport = &mailer.transport;
//! ```

use std::any::{Any, type_name};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::container::Container;
use crate::error::{BlockError, Result, UnknownParameterError};
use crate::identifier::Identifier;

/// A resolved instance, shared and type-erased.
pub type Instance = Arc<dyn Any + Send + Sync>;

type InvokeFn = Arc<dyn Fn(&Container, &mut Arguments) -> Result<Instance> + Send + Sync>;

// ═══════════════════════════════════════════
// Parameters
// ═══════════════════════════════════════════

/// A declared constructor or factory parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: &'static str,
    identifier: Identifier,
    nullable: bool,
}

impl Parameter {
    /// A parameter that must resolve, or the build fails.
    pub fn required(name: &'static str, identifier: impl Into<Identifier>) -> Self {
        Self { name, identifier: identifier.into(), nullable: false }
    }

    /// A parameter that falls back to `None` when nothing is registered.
    pub fn nullable(name: &'static str, identifier: impl Into<Identifier>) -> Self {
        Self { name, identifier: identifier.into(), nullable: true }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
}

/// A Rust type that can appear as an auto-wired parameter.
///
/// Implemented for `Arc<T>` (required) and `Option<Arc<T>>` (nullable).
/// Both resolve from [`Identifier::of::<T>()`](Identifier::of) unless an
/// explicit identifier is given.
pub trait Inject: Sized + 'static {
    /// Describes this parameter.
    fn parameter(name: &'static str, identifier: Option<Identifier>) -> Parameter;

    /// Turns the resolved argument back into the typed value.
    ///
    /// `argument` is `None` when the parameter was nullable and nothing
    /// was registered for it. `consumer` is the identifier being built.
    fn from_argument(
        consumer: &Identifier,
        parameter: &Parameter,
        argument: Option<Instance>,
    ) -> Result<Self>;
}

impl<T: Send + Sync + 'static> Inject for Arc<T> {
    fn parameter(name: &'static str, identifier: Option<Identifier>) -> Parameter {
        Parameter::required(name, identifier.unwrap_or_else(Identifier::of::<T>))
    }

    fn from_argument(
        consumer: &Identifier,
        parameter: &Parameter,
        argument: Option<Instance>,
    ) -> Result<Self> {
        let instance = argument.ok_or_else(|| {
            BlockError::UnknownParameter(UnknownParameterError {
                parameter: parameter.name,
                identifier: parameter.identifier.clone(),
                consumer: consumer.clone(),
            })
        })?;
        downcast(&parameter.identifier, instance)
    }
}

impl<T: Send + Sync + 'static> Inject for Option<Arc<T>> {
    fn parameter(name: &'static str, identifier: Option<Identifier>) -> Parameter {
        Parameter::nullable(name, identifier.unwrap_or_else(Identifier::of::<T>))
    }

    fn from_argument(
        _consumer: &Identifier,
        parameter: &Parameter,
        argument: Option<Instance>,
    ) -> Result<Self> {
        argument
            .map(|instance| downcast(&parameter.identifier, instance))
            .transpose()
    }
}

pub(crate) fn downcast<T: Send + Sync + 'static>(
    identifier: &Identifier,
    instance: Instance,
) -> Result<Arc<T>> {
    instance.downcast::<T>().map_err(|_| BlockError::TypeMismatch {
        identifier: identifier.clone(),
        expected: type_name::<T>(),
    })
}

/// Resolved arguments, one slot per declared parameter, in declaration order.
pub struct Arguments {
    consumer: Identifier,
    slots: VecDeque<(Parameter, Option<Instance>)>,
}

impl Arguments {
    pub(crate) fn new(consumer: Identifier, slots: Vec<(Parameter, Option<Instance>)>) -> Self {
        Self { consumer, slots: slots.into() }
    }

    /// Takes the next argument as `P`.
    ///
    /// # Errors
    /// [`BlockError::ConstructionFailed`] if every argument was already
    /// taken, [`BlockError::TypeMismatch`] if the slot holds another type.
    pub fn take<P: Inject>(&mut self) -> Result<P> {
        let (parameter, argument) = self.slots.pop_front().ok_or_else(|| {
            BlockError::ConstructionFailed {
                identifier: self.consumer.clone(),
                source: format!("argument list exhausted while taking {}", type_name::<P>())
                    .into(),
            }
        })?;
        P::from_argument(&self.consumer, &parameter, argument)
    }

    /// The identifier being built with these arguments.
    pub fn consumer(&self) -> &Identifier {
        &self.consumer
    }

    /// Arguments not taken yet.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments")
            .field("consumer", &self.consumer)
            .field("remaining", &self.slots.len())
            .finish()
    }
}

// ═══════════════════════════════════════════
// Constructible types
// ═══════════════════════════════════════════

/// A type the container can construct by itself.
///
/// Usually derived:
///
/// ```rust,ignore
/// #[derive(Injectable)]
/// struct Mailer {
///     transport: Arc<Transport>,
///     audit: Option<Arc<AuditLog>>,
///     #[inject(skip)]
///     sent: AtomicUsize,
/// }
/// ```
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Constructor parameters, in the order `construct` takes them.
    fn parameters() -> Vec<Parameter>;

    /// Builds the instance from the resolved arguments.
    fn construct(arguments: &mut Arguments) -> Result<Self>;
}

/// Type-erased handle on an [`Injectable`] type.
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    type_name: &'static str,
    parameters: fn() -> Vec<Parameter>,
    construct: fn(&mut Arguments) -> Result<Instance>,
}

impl TypeDescriptor {
    pub fn of<T: Injectable>() -> Self {
        Self {
            type_name: type_name::<T>(),
            parameters: T::parameters,
            construct: construct_erased::<T>,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn parameters(&self) -> Vec<Parameter> {
        (self.parameters)()
    }

    pub(crate) fn construct(&self, arguments: &mut Arguments) -> Result<Instance> {
        (self.construct)(arguments)
    }
}

fn construct_erased<T: Injectable>(arguments: &mut Arguments) -> Result<Instance> {
    Ok(Arc::new(T::construct(arguments)?) as Instance)
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeDescriptor").field(&self.type_name).finish()
    }
}

// ═══════════════════════════════════════════
// Factories
// ═══════════════════════════════════════════

/// A closure the container invokes to build an instance.
///
/// Every closure parameter must implement [`Inject`]; the container
/// resolves them by type before the call. Factories that want to fetch
/// dependencies themselves use [`Factory::resolving`].
#[derive(Clone)]
pub struct Factory {
    parameters: Arc<[Parameter]>,
    invoke: InvokeFn,
}

impl Factory {
    /// Wraps an auto-wired closure.
    ///
    /// ```rust
    /// use block_container::definition::Factory;
    /// use std::sync::Arc;
    ///
    /// struct Config;
    /// let factory = Factory::new(|_config: Arc<Config>, _audit: Option<Arc<String>>| 42u8);
    /// assert_eq!(factory.parameters().len(), 2);
    /// assert!(factory.parameters()[1].is_nullable());
    /// ```
    pub fn new<Args, F: IntoFactory<Args>>(factory: F) -> Self {
        factory.into_factory()
    }

    /// Wraps a closure that receives the container and resolves its own
    /// dependencies.
    pub fn resolving<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            parameters: Arc::from(Vec::new()),
            invoke: Arc::new(move |container: &Container, _: &mut Arguments| {
                Ok(Arc::new(factory(container)?) as Instance)
            }),
        }
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub(crate) fn invoke(&self, container: &Container, arguments: &mut Arguments) -> Result<Instance> {
        (self.invoke)(container, arguments)
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// Closures convertible into a [`Factory`].
///
/// `Args` is the tuple of parameter types; it only exists to keep the
/// implementations for different arities apart.
pub trait IntoFactory<Args> {
    fn into_factory(self) -> Factory;
}

macro_rules! impl_into_factory {
    ($($param:ident $index:literal),*) => {
        impl<F, R, $($param,)*> IntoFactory<($($param,)*)> for F
        where
            F: Fn($($param),*) -> R + Send + Sync + 'static,
            R: Send + Sync + 'static,
            $($param: Inject,)*
        {
            fn into_factory(self) -> Factory {
                let parameters: Vec<Parameter> = vec![
                    $(<$param as Inject>::parameter(concat!("#", $index), None)),*
                ];

                #[allow(unused_variables)]
                let invoke = move |_: &Container, arguments: &mut Arguments| -> Result<Instance> {
                    Ok(Arc::new((self)($(arguments.take::<$param>()?),*)) as Instance)
                };

                Factory {
                    parameters: Arc::from(parameters),
                    invoke: Arc::new(invoke),
                }
            }
        }
    };
}

impl_into_factory!();
impl_into_factory!(P0 0);
impl_into_factory!(P0 0, P1 1);
impl_into_factory!(P0 0, P1 1, P2 2);
impl_into_factory!(P0 0, P1 1, P2 2, P3 3);
impl_into_factory!(P0 0, P1 1, P2 2, P3 3, P4 4);
impl_into_factory!(P0 0, P1 1, P2 2, P3 3, P4 4, P5 5);
impl_into_factory!(P0 0, P1 1, P2 2, P3 3, P4 4, P5 5, P6 6);
impl_into_factory!(P0 0, P1 1, P2 2, P3 3, P4 4, P5 5, P6 6, P7 7);

// ═══════════════════════════════════════════
// Definition
// ═══════════════════════════════════════════

/// How a registration produces its instance.
#[derive(Clone)]
pub enum Definition {
    /// Already built; every `get` returns this same instance.
    Value(Instance),
    /// Constructed through [`Injectable`].
    Type(TypeDescriptor),
    /// Produced by invoking a closure.
    Factory(Factory),
}

impl Definition {
    /// A plain value.
    pub fn value<T: Send + Sync + 'static>(value: T) -> Self {
        Definition::Value(Arc::new(value))
    }

    /// An instance that is already shared.
    pub fn instance(instance: Instance) -> Self {
        Definition::Value(instance)
    }

    /// The constructible type `T`.
    pub fn of<T: Injectable>() -> Self {
        Definition::Type(TypeDescriptor::of::<T>())
    }

    /// An auto-wired factory closure.
    pub fn factory<Args, F: IntoFactory<Args>>(factory: F) -> Self {
        Definition::Factory(factory.into_factory())
    }

    /// Short name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Definition::Value(_) => "value",
            Definition::Type(_) => "type",
            Definition::Factory(_) => "factory",
        }
    }
}

impl From<TypeDescriptor> for Definition {
    fn from(descriptor: TypeDescriptor) -> Self {
        Definition::Type(descriptor)
    }
}

impl From<Factory> for Definition {
    fn from(factory: Factory) -> Self {
        Definition::Factory(factory)
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Definition::Value(_) => f.write_str("Value(..)"),
            Definition::Type(descriptor) => write!(f, "Type({})", descriptor.type_name()),
            Definition::Factory(factory) => write!(f, "{factory:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Transport;

    struct Mailer {
        transport: Arc<Transport>,
        audit: Option<Arc<String>>,
    }

    impl Injectable for Mailer {
        fn parameters() -> Vec<Parameter> {
            vec![
                <Arc<Transport> as Inject>::parameter("transport", None),
                <Option<Arc<String>> as Inject>::parameter("audit", Some("audit".into())),
            ]
        }

        fn construct(arguments: &mut Arguments) -> Result<Self> {
            Ok(Self {
                transport: arguments.take()?,
                audit: arguments.take()?,
            })
        }
    }

    fn slot<T: Send + Sync + 'static>(parameter: Parameter, value: Option<T>) -> (Parameter, Option<Instance>) {
        (parameter, value.map(|v| Arc::new(v) as Instance))
    }

    #[test]
    fn arc_parameter_is_required_by_type() {
        let parameter = <Arc<Transport> as Inject>::parameter("transport", None);
        assert!(!parameter.is_nullable());
        assert_eq!(parameter.identifier(), &Identifier::of::<Transport>());
    }

    #[test]
    fn option_parameter_is_nullable() {
        let parameter = <Option<Arc<Transport>> as Inject>::parameter("transport", None);
        assert!(parameter.is_nullable());
    }

    #[test]
    fn explicit_identifier_wins() {
        let parameter = <Arc<String> as Inject>::parameter("url", Some("db.url".into()));
        assert_eq!(parameter.identifier().as_str(), "db.url");
    }

    #[test]
    fn type_descriptor_constructs_in_order() {
        let descriptor = TypeDescriptor::of::<Mailer>();
        let parameters = descriptor.parameters();
        assert_eq!(parameters.len(), 2);

        let mut arguments = Arguments::new(
            Identifier::of::<Mailer>(),
            vec![
                slot(parameters[0].clone(), Some(Transport)),
                slot::<String>(parameters[1].clone(), None),
            ],
        );

        let instance = descriptor.construct(&mut arguments).unwrap();
        let mailer = instance.downcast::<Mailer>().ok().unwrap();
        let _transport: &Transport = &mailer.transport;
        assert!(mailer.audit.is_none());
        assert!(arguments.is_empty());
    }

    #[test]
    fn take_reports_type_mismatch() {
        let parameter = Parameter::required("n", "n");
        let mut arguments = Arguments::new("consumer".into(), vec![slot(parameter, Some(1u8))]);

        let err = arguments.take::<Arc<String>>().unwrap_err();
        assert!(matches!(err, BlockError::TypeMismatch { .. }));
    }

    #[test]
    fn empty_required_slot_names_the_consumer() {
        let parameter = <Arc<Transport> as Inject>::parameter("transport", None);
        let mut arguments = Arguments::new(
            Identifier::of::<Mailer>(),
            vec![slot::<Transport>(parameter, None)],
        );

        match arguments.take::<Arc<Transport>>().unwrap_err() {
            BlockError::UnknownParameter(e) => {
                assert_eq!(e.parameter, "transport");
                assert_eq!(e.identifier, Identifier::of::<Transport>());
                assert_eq!(e.consumer, Identifier::of::<Mailer>());
            }
            other => panic!("Expected UnknownParameter, got: {other:?}"),
        }
    }

    #[test]
    fn take_past_the_end_fails() {
        let mut arguments = Arguments::new("consumer".into(), vec![]);
        let err = arguments.take::<Arc<String>>().unwrap_err();
        assert!(matches!(err, BlockError::ConstructionFailed { .. }));
    }

    #[test]
    fn zero_argument_factory_has_no_parameters() {
        let factory = Factory::new(|| 1u32);
        assert!(factory.parameters().is_empty());
    }

    #[test]
    fn factory_parameters_follow_closure_order() {
        let factory = Factory::new(|_t: Arc<Transport>, _s: Option<Arc<String>>, _n: Arc<u64>| ());
        let names: Vec<_> = factory.parameters().iter().map(Parameter::name).collect();
        assert_eq!(names, vec!["#0", "#1", "#2"]);
        assert_eq!(factory.parameters()[2].identifier(), &Identifier::of::<u64>());
    }

    #[test]
    fn definition_kinds() {
        assert_eq!(Definition::value(1).kind(), "value");
        assert_eq!(Definition::of::<Mailer>().kind(), "type");
        assert_eq!(Definition::factory(|| 1).kind(), "factory");
        assert!(format!("{:?}", Definition::of::<Mailer>()).contains("Mailer"));
    }
}
