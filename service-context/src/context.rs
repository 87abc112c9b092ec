//! The [ServiceContext] is the lifecycle container of an application. It holds an ordered registry
//! of [Component]s, activates them in registration order, exposes them for lookup and finally
//! stops them.
//!
//! Contexts are created with a [ServiceContextBuilder]. Registration happens only in the builder,
//! so the registry is read-only once the context exists:
//!
//! ```
//! use service_context::context::ServiceContext;
//!
//! let mut context = ServiceContext::builder()
//!     .with_name("example")
//!     .with_tracing_logger(false)
//!     .build()
//!     .expect("unable to build context");
//!
//! context.load().expect("unable to load components");
//! assert!(context.get("logger").is_some());
//! context.stop().expect("unable to stop components");
//! ```
//!
//! ### Lifecycle
//!
//! A context moves through [LifecycleState]s: `Unloaded -> Loading -> Loaded | Failed` and
//! `Loaded | Failed -> Stopping -> Stopped | StopFailed`. Both loading and stopping abort on the
//! first error, leaving the remaining components untouched. There is no rollback and no restart:
//! a failed or stopped context should be discarded.

use crate::component::{Component, ComponentInstanceAnyPtr, ComponentPtr, ErrorPtr};
use crate::config::ContextConfig;
use crate::error::ServiceContextError;
use crate::logging::LoggingComponent;
use derivative::Derivative;
use derive_more::Display;
use fxhash::FxHashMap;
use serde::Deserialize;
use service_context_log::{debug, error, info, LogFacility, Logger};
use std::any::type_name;
use std::collections::hash_map::Entry;
use std::sync::Arc;

/// Current stage in the lifecycle of a [ServiceContext].
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash)]
pub enum LifecycleState {
    Unloaded,
    Loading,
    Loaded,
    Failed,
    Stopping,
    Stopped,
    StopFailed,
}

/// Order in which components are stopped.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ShutdownOrder {
    /// Registration order, the same as activation.
    #[default]
    Forward,
    /// Reverse registration order, so dependents stop before their dependencies.
    Reverse,
}

/// Handling of components registered with an already taken identifier.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Keep the first registration and silently drop later ones.
    #[default]
    Ignore,
    /// Fail building the context.
    Reject,
}

/// Deployment environment the application runs in.
#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    #[display(fmt = "dev")]
    Dev,
    #[display(fmt = "stg")]
    Stg,
    #[display(fmt = "prd")]
    Prd,
}

#[derive(Clone, Derivative)]
#[derivative(Debug)]
struct ComponentEntry {
    id: String,
    type_name: &'static str,
    #[derivative(Debug = "ignore")]
    instance: ComponentPtr,
    #[derivative(Debug = "ignore")]
    any: Option<ComponentInstanceAnyPtr>,
}

impl ComponentEntry {
    fn new<C: Component>(component: Arc<C>) -> Self {
        Self {
            id: component.id().to_string(),
            type_name: type_name::<C>(),
            instance: component.clone() as ComponentPtr,
            any: Some(component as ComponentInstanceAnyPtr),
        }
    }

    fn new_dyn(component: ComponentPtr) -> Self {
        Self {
            id: component.id().to_string(),
            type_name: type_name::<dyn Component>(),
            instance: component,
            any: None,
        }
    }

    fn downcast<C: Component>(&self) -> Option<Arc<C>> {
        self.any.clone()?.downcast::<C>().ok()
    }
}

/// Builder for [ServiceContext] with sensible defaults, for easy construction.
#[derive(Debug)]
pub struct ServiceContextBuilder {
    name: String,
    environment: Environment,
    facility: Option<LogFacility>,
    install_tracing_logger: bool,
    shutdown_order: ShutdownOrder,
    duplicate_policy: DuplicatePolicy,
    components: Vec<ComponentEntry>,
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceContextBuilder {
    /// Creates a new builder using the [global](service_context_log::global) log facility.
    pub fn new() -> Self {
        Self {
            name: String::new(),
            environment: Default::default(),
            facility: None,
            install_tracing_logger: true,
            shutdown_order: Default::default(),
            duplicate_policy: Default::default(),
            components: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Sets the facility used by the context and handed out through [ServiceContext::logger].
    pub fn with_log_facility(mut self, facility: LogFacility) -> Self {
        self.facility = Some(facility);
        self
    }

    /// Should the logging component install a global `tracing` subscriber when activated.
    pub fn with_tracing_logger(mut self, install_tracing_logger: bool) -> Self {
        self.install_tracing_logger = install_tracing_logger;
        self
    }

    pub fn with_shutdown_order(mut self, shutdown_order: ShutdownOrder) -> Self {
        self.shutdown_order = shutdown_order;
        self
    }

    pub fn with_duplicate_policy(mut self, duplicate_policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = duplicate_policy;
        self
    }

    /// Applies all settings from given config. Panics if the configured log level is invalid.
    pub fn with_config(mut self, config: &ContextConfig) -> Self {
        if let Some(name) = &config.name {
            self.name = name.clone();
        }

        self.environment = config.environment;
        self.facility = Some(LogFacility::new(&config.log_config()));
        self.install_tracing_logger = config.install_tracing_logger;
        self.shutdown_order = config.shutdown_order;
        self.duplicate_policy = config.duplicate_policy;
        self
    }

    /// Registers a component. Components are activated in registration order, after the
    /// logging component.
    pub fn with_component<C: Component>(self, component: C) -> Self {
        self.with_component_ptr(Arc::new(component))
    }

    /// Registers a component the caller keeps a handle to.
    pub fn with_component_ptr<C: Component>(mut self, component: Arc<C>) -> Self {
        self.components.push(ComponentEntry::new(component));
        self
    }

    /// Registers an already type-erased component. Its concrete type is unknown, so typed lookups
    /// ([ServiceContext::get_typed], [ServiceContext::instance_typed]) never return it; use
    /// [ServiceContext::get] instead.
    pub fn with_dyn_component(mut self, component: ComponentPtr) -> Self {
        self.components.push(ComponentEntry::new_dyn(component));
        self
    }

    /// Builds the resulting [ServiceContext]. Fails only on duplicate identifiers with
    /// [DuplicatePolicy::Reject].
    pub fn build(self) -> Result<ServiceContext, ServiceContextError> {
        let facility = self
            .facility
            .unwrap_or_else(|| service_context_log::global().clone());
        let logging_component = Arc::new(LoggingComponent::new(
            facility.clone(),
            self.install_tracing_logger,
        ));

        let mut components = Vec::with_capacity(self.components.len() + 1);
        let mut store = FxHashMap::default();

        for entry in
            std::iter::once(ComponentEntry::new(logging_component)).chain(self.components)
        {
            match store.entry(entry.id.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(components.len());
                    components.push(entry);
                }
                Entry::Occupied(_) if self.duplicate_policy == DuplicatePolicy::Reject => {
                    return Err(ServiceContextError::DuplicateComponent(entry.id));
                }
                Entry::Occupied(_) => {}
            }
        }

        Ok(ServiceContext {
            logger: facility.logger(&self.name),
            name: self.name,
            environment: self.environment,
            components,
            store,
            facility,
            shutdown_order: self.shutdown_order,
            state: LifecycleState::Unloaded,
        })
    }
}

/// Lifecycle container for [Component]s. See module documentation for details.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct ServiceContext {
    name: String,
    environment: Environment,
    components: Vec<ComponentEntry>,
    #[derivative(Debug = "ignore")]
    store: FxHashMap<String, usize>,
    facility: LogFacility,
    #[derivative(Debug = "ignore")]
    logger: Logger,
    shutdown_order: ShutdownOrder,
    state: LifecycleState,
}

impl ServiceContext {
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn environment(&self) -> Environment {
        self.environment
    }

    #[inline]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    #[inline]
    pub fn log_facility(&self) -> &LogFacility {
        &self.facility
    }

    /// Identifiers of all registered components, in registration order.
    pub fn component_ids(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|entry| entry.id.as_str())
    }

    /// Activates all components in registration order. Stops at the first failing component and
    /// returns its error; components activated before it stay activated.
    pub fn load(&mut self) -> Result<(), ServiceContextError> {
        if self.state != LifecycleState::Unloaded {
            return Err(ServiceContextError::InvalidState {
                operation: "load",
                state: self.state,
            });
        }

        self.state = LifecycleState::Loading;

        let result = self.activate_components();
        self.state = if result.is_ok() {
            LifecycleState::Loaded
        } else {
            LifecycleState::Failed
        };

        result
    }

    /// Stops all components in the configured [ShutdownOrder]. Stops at the first failing
    /// component and returns its error; remaining components are not stopped. Allowed after both
    /// successful and failed loading.
    pub fn stop(&mut self) -> Result<(), ServiceContextError> {
        if !matches!(self.state, LifecycleState::Loaded | LifecycleState::Failed) {
            return Err(ServiceContextError::InvalidState {
                operation: "stop",
                state: self.state,
            });
        }

        self.state = LifecycleState::Stopping;

        let result = self.stop_components();
        self.state = if result.is_ok() {
            LifecycleState::Stopped
        } else {
            LifecycleState::StopFailed
        };

        result
    }

    /// Returns the component registered under `id`, if any. Never activates anything.
    pub fn get(&self, id: &str) -> Option<ComponentPtr> {
        self.entry(id).map(|entry| entry.instance.clone())
    }

    /// Returns the component registered under `id`, panicking if it's missing. Use where a
    /// missing component is a programming or configuration error.
    pub fn must_get(&self, id: &str) -> ComponentPtr {
        match self.get(id) {
            Some(component) => component,
            None => panic!("Cannot find component: {id}"),
        }
    }

    /// Typesafe version of [ServiceContext::get].
    pub fn get_typed<C: Component>(&self, id: &str) -> Result<Arc<C>, ServiceContextError> {
        let entry = self
            .entry(id)
            .ok_or_else(|| ServiceContextError::NoComponent(id.to_string()))?;

        entry
            .downcast()
            .ok_or_else(|| ServiceContextError::IncompatibleComponent {
                id: id.to_string(),
                type_name: type_name::<C>(),
            })
    }

    /// Typesafe version of [ServiceContext::must_get].
    pub fn must_get_typed<C: Component>(&self, id: &str) -> Arc<C> {
        match self.get_typed(id) {
            Ok(component) => component,
            Err(error) => panic!("{error}"),
        }
    }

    /// Returns the first component of type `C` in registration order, regardless of its id.
    pub fn instance_typed<C: Component>(&self) -> Option<Arc<C>> {
        self.components.iter().find_map(ComponentEntry::downcast)
    }

    /// Returns a logger scoped to `prefix`. Available regardless of lifecycle state.
    pub fn logger(&self, prefix: &str) -> Logger {
        self.facility.logger(prefix)
    }

    fn entry(&self, id: &str) -> Option<&ComponentEntry> {
        self.store
            .get(id)
            .and_then(|index| self.components.get(*index))
    }

    fn activate_components(&self) -> Result<(), ServiceContextError> {
        info!(self.logger, "Service context is loading...");

        for entry in &self.components {
            debug!(
                self.logger,
                "Activating component {} of type {}",
                entry.id,
                entry.type_name
            );

            entry.instance.activate(self).map_err(|source| {
                error!(self.logger, "Error activating component '{}': {}", entry.id, source);
                ServiceContextError::ActivationError {
                    id: entry.id.clone(),
                    source,
                }
            })?;
        }

        info!(self.logger, "Service context loaded");
        Ok(())
    }

    fn stop_components(&self) -> Result<(), ServiceContextError> {
        info!(self.logger, "Stopping service context");

        let stop_component = |entry: &ComponentEntry| {
            debug!(self.logger, "Stopping component: {}", entry.id);

            entry.instance.stop().map_err(|source: ErrorPtr| {
                error!(self.logger, "Error stopping component '{}': {}", entry.id, source);
                ServiceContextError::ShutdownError {
                    id: entry.id.clone(),
                    source,
                }
            })
        };

        match self.shutdown_order {
            ShutdownOrder::Forward => self.components.iter().try_for_each(stop_component),
            ShutdownOrder::Reverse => self.components.iter().rev().try_for_each(stop_component),
        }?;

        info!(self.logger, "Service context stopped");
        Ok(())
    }
}
