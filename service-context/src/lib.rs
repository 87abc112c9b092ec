//! Lifecycle container for application components.
//!
//! Applications are typically built from a number of independently configured subsystems: database
//! pools, caches, message broker clients, web servers. Each of them needs to be set up before use
//! and torn down on exit, often in a specific order. This crate provides a
//! [ServiceContext](context::ServiceContext), which registers such subsystems as
//! [Components](component::Component), activates them in a deterministic order, exposes them for
//! later lookup and finally stops them.
//!
//! Every context comes with a [logging component](logging::LoggingComponent) activated before any
//! other component, and hands out prefixed loggers from the [service_context_log] crate.

pub mod component;
pub mod config;
pub mod context;
mod error;
pub mod logging;

pub use error::ServiceContextError;
pub use service_context_log as log;
