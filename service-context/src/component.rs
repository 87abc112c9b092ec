//! [Component]s are the units managed by a [ServiceContext]. Each one has a unique identifier, an
//! activation hook run by [ServiceContext::load] and a shutdown hook run by
//! [ServiceContext::stop].
//!
//! Hooks take `&self`, since components are shared with whoever looks them up. State created
//! during activation (clients, pools, handles) should therefore live behind interior mutability:
//!
//! ```
//! use service_context::component::{Component, ErrorPtr};
//! use service_context::context::ServiceContext;
//! use std::sync::Mutex;
//!
//! #[derive(Default)]
//! struct Counter {
//!     value: Mutex<Option<u64>>,
//! }
//!
//! impl Component for Counter {
//!     fn id(&self) -> &str {
//!         "counter"
//!     }
//!
//!     fn activate(&self, context: &ServiceContext) -> Result<(), ErrorPtr> {
//!         context.logger("counter").info("Starting counter");
//!         *self.value.lock().unwrap() = Some(0);
//!         Ok(())
//!     }
//!
//!     fn stop(&self) -> Result<(), ErrorPtr> {
//!         self.value.lock().unwrap().take();
//!         Ok(())
//!     }
//! }
//! ```
//!
//! [ServiceContext]: crate::context::ServiceContext
//! [ServiceContext::load]: crate::context::ServiceContext::load
//! [ServiceContext::stop]: crate::context::ServiceContext::stop

use crate::context::ServiceContext;
use std::any::Any;
use std::error::Error;
use std::sync::Arc;

/// Error returned by component hooks.
pub type ErrorPtr = Arc<dyn Error + Send + Sync>;

pub type ComponentPtr = Arc<dyn Component>;

pub type ComponentInstanceAnyPtr = Arc<dyn Any + Send + Sync>;

/// A named unit with activation and shutdown hooks.
pub trait Component: Send + Sync + 'static {
    /// Identifier unique within a context. Must not change after registration.
    fn id(&self) -> &str;

    /// Prepares the component for use. Called once, in registration order, with the context
    /// which can be used to look up previously activated components or obtain loggers. Must
    /// return promptly - long-running work should be moved to the background.
    fn activate(&self, context: &ServiceContext) -> Result<(), ErrorPtr>;

    /// Releases resources acquired during activation.
    ///
    /// Called for every registered component when stopping a context, including when loading
    /// failed, so this might be called without (or after a partial) activation.
    fn stop(&self) -> Result<(), ErrorPtr>;
}

/// Converts any error into an [ErrorPtr].
pub fn into_error_ptr<E: Error + Send + Sync + 'static>(error: E) -> ErrorPtr {
    Arc::new(error) as ErrorPtr
}
