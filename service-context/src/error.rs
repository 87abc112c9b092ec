use crate::component::ErrorPtr;
use crate::context::LifecycleState;
use thiserror::Error;

/// Errors related to building, loading and stopping a
/// [ServiceContext](crate::context::ServiceContext).
#[derive(Error, Clone, Debug)]
pub enum ServiceContextError {
    #[error("Error activating component '{id}': {source}")]
    ActivationError {
        id: String,
        #[source]
        source: ErrorPtr,
    },
    #[error("Error stopping component '{id}': {source}")]
    ShutdownError {
        id: String,
        #[source]
        source: ErrorPtr,
    },
    #[error("Cannot {operation} service context in state: {state}")]
    InvalidState {
        operation: &'static str,
        state: LifecycleState,
    },
    #[error("Attempted to register a duplicated component with id: {0}")]
    DuplicateComponent(String),
    #[error("Cannot find component: {0}")]
    NoComponent(String),
    #[error("Component '{id}' is not of type: {type_name}")]
    IncompatibleComponent {
        id: String,
        type_name: &'static str,
    },
}

impl ServiceContextError {
    /// Error returned by the component hook, if this error originated in one.
    pub fn component_error(&self) -> Option<&ErrorPtr> {
        match self {
            ServiceContextError::ActivationError { source, .. }
            | ServiceContextError::ShutdownError { source, .. } => Some(source),
            _ => None,
        }
    }
}
