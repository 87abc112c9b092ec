//! The logging component, registered first in every [ServiceContext], so logging is ready before
//! any other component activates.

use crate::component::{Component, ErrorPtr};
use crate::context::ServiceContext;
use derive_more::Constructor;
use service_context_log::{debug, install_tracing_subscriber, LogFacility};

/// Identifier of the [LoggingComponent].
pub const LOGGER_COMPONENT_ID: &str = "logger";

/// Wraps the [LogFacility] of a context. When activated, optionally installs a global `tracing`
/// subscriber matching the facility threshold.
#[derive(Constructor, Debug)]
pub struct LoggingComponent {
    facility: LogFacility,
    install_tracing_logger: bool,
}

impl LoggingComponent {
    #[inline]
    pub fn facility(&self) -> &LogFacility {
        &self.facility
    }
}

impl Component for LoggingComponent {
    fn id(&self) -> &str {
        LOGGER_COMPONENT_ID
    }

    fn activate(&self, context: &ServiceContext) -> Result<(), ErrorPtr> {
        if self.install_tracing_logger && !install_tracing_subscriber(self.facility.level()) {
            debug!(
                context.logger(LOGGER_COMPONENT_ID),
                "Global tracing subscriber already installed - keeping existing one."
            );
        }

        Ok(())
    }

    fn stop(&self) -> Result<(), ErrorPtr> {
        Ok(())
    }
}
