//! An axum server running as a [Component].
//!
//! The server binds its listener when the component activates, so an unavailable address fails
//! loading the whole context, and then serves requests in the background on the ambient `tokio`
//! runtime. Stopping the component triggers graceful shutdown and waits until the server finishes
//! in-flight requests and releases its listener.
//!
//! Waiting requires blocking the calling thread, which is possible outside of any runtime and on a
//! multi-threaded runtime. On a current-thread runtime, [Component::stop] only signals the shutdown,
//! logs a warning and returns, so the listener is released once the runtime gets to poll the server
//! again.

use crate::config::ServerConfig;
use crate::fault::recover_layer;
use axum::Router;
use hyper::Error as HyperError;
use service_context::component::{into_error_ptr, Component, ErrorPtr};
use service_context::context::ServiceContext;
use service_context::log::{info, warn, Logger};
use std::net::{AddrParseError, SocketAddr, TcpListener};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tokio::runtime::{Handle, RuntimeFlavor, TryCurrentError};
use tokio::sync::oneshot::{self, Sender};
use tokio::task::{block_in_place, JoinError, JoinHandle};
use tracing::error;

/// Errors related to starting servers.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Error reading server config: {0}")]
    ConfigError(#[source] config::ConfigError),
    #[error("Error parsing listen address: {0}")]
    ListenAddressParseError(#[source] AddrParseError),
    #[error("Error binding server: {0}")]
    BindError(#[source] std::io::Error),
    #[error("Error creating server: {0}")]
    ServeError(#[source] HyperError),
    #[error("Servers need a running tokio runtime: {0}")]
    NoRuntime(#[source] TryCurrentError),
    #[error("Server has already been started")]
    AlreadyStarted,
    #[error("Error waiting for server shutdown: {0}")]
    ShutdownError(#[source] JoinError),
}

#[derive(Debug)]
struct RunningServer {
    local_address: SocketAddr,
    shutdown: Sender<()>,
    task: JoinHandle<()>,
    runtime: Handle,
    logger: Logger,
}

impl RunningServer {
    fn shutdown(self) -> Result<(), ServerError> {
        // the server might have already exited on its own
        let _ = self.shutdown.send(());

        let result = match Handle::try_current() {
            Err(_) => self.runtime.block_on(self.task),
            Ok(current) if current.runtime_flavor() == RuntimeFlavor::MultiThread => {
                let runtime = self.runtime;
                let task = self.task;
                block_in_place(move || runtime.block_on(task))
            }
            Ok(_) => {
                warn!(
                    self.logger,
                    "Cannot wait for shutdown on a current-thread runtime, {} is released later",
                    self.local_address
                );
                return Ok(());
            }
        };

        match result {
            Ok(()) => {
                info!(self.logger, "Server on {} stopped", self.local_address);
                Ok(())
            }
            // the runtime has been shut down, taking the server with it
            Err(error) if error.is_cancelled() => Ok(()),
            Err(error) => Err(ServerError::ShutdownError(error)),
        }
    }
}

/// Component serving a [Router]. Every request goes through the
/// [recover_layer](crate::fault::recover_layer), logging through the context logger with the
/// component id as prefix.
#[derive(Debug)]
pub struct AxumComponent {
    id: String,
    config: Option<ServerConfig>,
    router: Mutex<Option<Router>>,
    server: Mutex<Option<RunningServer>>,
}

impl AxumComponent {
    /// Creates a server reading its [ServerConfig] from the config file on activation.
    pub fn new(id: impl Into<String>, router: Router) -> Self {
        Self {
            id: id.into(),
            config: None,
            router: Mutex::new(Some(router)),
            server: Mutex::new(None),
        }
    }

    /// Uses given config instead of reading it from the config file.
    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Address the server is listening on, once activated and until stopped.
    pub fn local_address(&self) -> Option<SocketAddr> {
        self.server().as_ref().map(|server| server.local_address)
    }

    fn server(&self) -> MutexGuard<'_, Option<RunningServer>> {
        self.server
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn start(&self, context: &ServiceContext) -> Result<RunningServer, ServerError> {
        let runtime = Handle::try_current().map_err(ServerError::NoRuntime)?;

        let config = match &self.config {
            Some(config) => config.clone(),
            None => ServerConfig::init_from_config(&self.id).map_err(ServerError::ConfigError)?,
        };

        let address: SocketAddr = config
            .listen_address
            .parse()
            .map_err(ServerError::ListenAddressParseError)?;

        let listener = TcpListener::bind(address).map_err(ServerError::BindError)?;
        let local_address = listener.local_addr().map_err(ServerError::BindError)?;

        let router = self
            .router
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
            .ok_or(ServerError::AlreadyStarted)?;

        let logger = context.logger(&self.id);
        let router: Router = router.layer(recover_layer(logger.clone()));

        // binding the listener to the reactor requires runtime context
        let _guard = runtime.enter();
        let builder = axum::Server::from_tcp(listener).map_err(ServerError::ServeError)?;

        let (shutdown, shutdown_signal) = oneshot::channel::<()>();
        let server = builder
            .serve(router.into_make_service())
            .with_graceful_shutdown(async move {
                // a dropped sender also means shutdown
                let _ = shutdown_signal.await;
            });

        let id = self.id.clone();
        let task = runtime.spawn(async move {
            if let Err(error) = server.await {
                error!("Server {} failed: {}", id, error);
            }
        });

        info!(logger, "Listening on {}", local_address);

        Ok(RunningServer {
            local_address,
            shutdown,
            task,
            runtime: runtime.clone(),
            logger,
        })
    }
}

impl Component for AxumComponent {
    fn id(&self) -> &str {
        &self.id
    }

    fn activate(&self, context: &ServiceContext) -> Result<(), ErrorPtr> {
        let server = self.start(context).map_err(into_error_ptr)?;
        *self.server() = Some(server);
        Ok(())
    }

    fn stop(&self) -> Result<(), ErrorPtr> {
        // release the lock before blocking on shutdown
        let server = self.server().take();
        match server {
            Some(server) => server.shutdown().map_err(into_error_ptr),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::component::{AxumComponent, ServerError};
    use crate::config::ServerConfig;
    use axum::routing::get;
    use axum::Router;
    use service_context::component::Component;
    use service_context::context::ServiceContext;
    use service_context::ServiceContextError;
    use std::net::TcpListener;

    fn create_context(component: AxumComponent) -> ServiceContext {
        ServiceContext::builder()
            .with_tracing_logger(false)
            .with_component(component)
            .build()
            .unwrap()
    }

    #[test]
    fn should_require_runtime() {
        let mut context = create_context(
            AxumComponent::new("web", Router::new().route("/", get(|| async { "" })))
                .with_config(ServerConfig::new("127.0.0.1:0")),
        );

        let error = context.load().unwrap_err();
        let source = error.component_error().unwrap();
        assert!(matches!(
            source.downcast_ref::<ServerError>(),
            Some(ServerError::NoRuntime(_))
        ));
    }

    #[tokio::test]
    async fn should_reject_invalid_address() {
        let mut context = create_context(
            AxumComponent::new("web", Router::new())
                .with_config(ServerConfig::new("not an address")),
        );

        assert!(matches!(
            context.load().unwrap_err(),
            ServiceContextError::ActivationError { id, .. } if id == "web"
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn should_expose_address_until_stopped() {
        let component = AxumComponent::new("web", Router::new())
            .with_config(ServerConfig::new("127.0.0.1:0"));
        assert!(component.local_address().is_none());

        let mut context = create_context(component);
        context.load().unwrap();

        let component = context.must_get_typed::<AxumComponent>("web");
        assert_ne!(component.local_address().unwrap().port(), 0);

        let address = component.local_address().unwrap();
        context.stop().unwrap();

        assert!(component.local_address().is_none());
        assert!(component.stop().is_ok());
        assert!(TcpListener::bind(address).is_ok());
    }

    #[test]
    fn should_wait_for_shutdown_outside_runtime() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut context = create_context(
            AxumComponent::new("web", Router::new())
                .with_config(ServerConfig::new("127.0.0.1:0")),
        );

        runtime.block_on(async { context.load() }).unwrap();
        let address = context
            .must_get_typed::<AxumComponent>("web")
            .local_address()
            .unwrap();

        context.stop().unwrap();
        assert!(TcpListener::bind(address).is_ok());
    }

    #[tokio::test]
    async fn should_not_block_current_thread_runtime() {
        let mut context = create_context(
            AxumComponent::new("web", Router::new())
                .with_config(ServerConfig::new("127.0.0.1:0")),
        );

        context.load().unwrap();
        context.stop().unwrap();

        assert!(context
            .must_get_typed::<AxumComponent>("web")
            .local_address()
            .is_none());
    }
}
