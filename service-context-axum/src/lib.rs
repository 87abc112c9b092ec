//! axum web server running as a [service-context](service_context) component.
//!
//! The server is activated together with all other components of a
//! [ServiceContext](service_context::context::ServiceContext) and stopped gracefully when the
//! context stops. Handler panics are recovered and translated into JSON error responses, using
//! [Fault](fault::Fault) to carry the desired HTTP status.
//!
//! ### Simple usage example
//!
//! ```no_run
//! use axum::routing::get;
//! use axum::Router;
//! use service_context::context::ServiceContext;
//! use service_context_axum::component::AxumComponent;
//!
//! // note: for the sake of simplicity, errors are unwrapped, rather than
//! // gracefully handled
//! #[tokio::main]
//! async fn main() {
//!     let router = Router::new().route("/", get(|| async { "Hello world!" }));
//!
//!     let mut context = ServiceContext::builder()
//!         .with_component(AxumComponent::new("web", router))
//!         .build()
//!         .expect("unable to build context");
//!
//!     // the server starts listening on the address configured under the
//!     // "web.web" key, or 0.0.0.0:4000 by default
//!     context.load().expect("unable to load components");
//!
//!     tokio::signal::ctrl_c().await.expect("unable to listen for ctrl-c");
//!     context.stop().expect("unable to stop components");
//! }
//! ```

pub mod component;
pub mod config;
pub mod fault;

pub use axum;
