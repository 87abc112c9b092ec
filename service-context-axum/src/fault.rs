//! Handler faults and their translation to HTTP responses.
//!
//! A handler can abort a request by raising a [Fault], either by returning it (it implements
//! [IntoResponse]) or by [raising](Fault::raise) it from deep within a call chain. The
//! [recover_layer] catches such panics, along with any other panic, and turns them into JSON error
//! responses, so a misbehaving handler never brings the server down.
//!
//! Recovered panics are logged at error level through the logger given to [recover_layer]. An
//! [AxumComponent](crate::component::AxumComponent) passes the context logger scoped to its own id,
//! so with the default base prefix, faults of a component named `api` are logged under `core.api`.

use axum::body::BoxBody;
use axum::http::{Response, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use service_context::log::{error, Logger};
use std::any::Any;
use std::panic::panic_any;
use thiserror::Error;
use tower_http::catch_panic::{CatchPanicLayer, ResponseForPanic};

/// Message returned for panics which do not carry a [Fault].
pub const GENERIC_FAULT_MESSAGE: &str =
    "something went wrong, please try again or contact supporters";

/// Application error carrying an optional HTTP status. Faults without a status are reported as
/// `500 Internal Server Error`.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
#[error("{message}")]
pub struct Fault {
    status: Option<StatusCode>,
    message: String,
}

impl Fault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    #[inline]
    pub fn status_code(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Aborts current request with this fault. Requires the [recover_layer] to be present in the
    /// router, which [AxumComponent](crate::component::AxumComponent) always adds.
    pub fn raise(self) -> ! {
        panic_any(self)
    }
}

#[derive(Serialize)]
struct FaultBody<'a> {
    code: u16,
    status: String,
    message: &'a str,
}

impl FaultBody<'_> {
    fn new(status: StatusCode, message: &str) -> FaultBody<'_> {
        FaultBody {
            code: status.as_u16(),
            status: status
                .canonical_reason()
                .unwrap_or_default()
                .to_lowercase(),
            message,
        }
    }
}

impl IntoResponse for Fault {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        (status, Json(FaultBody::new(status, &self.message))).into_response()
    }
}

/// Panic handler translating panic payloads into responses and logging them.
#[derive(Clone, Debug)]
pub struct RecoverPanic {
    logger: Logger,
}

impl RecoverPanic {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl ResponseForPanic for RecoverPanic {
    type ResponseBody = BoxBody;

    fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> Response<BoxBody> {
        let err = match err.downcast::<Fault>() {
            Ok(fault) => {
                error!(self.logger, "Request failed: {}", fault);
                return (*fault).into_response();
            }
            Err(err) => err,
        };

        if let Some(message) = err.downcast_ref::<String>() {
            error!(self.logger, "Recovered from panic: {}", message);
        } else if let Some(message) = err.downcast_ref::<&str>() {
            error!(self.logger, "Recovered from panic: {}", message);
        } else {
            error!(self.logger, "Recovered from panic with unknown payload");
        }

        let status = StatusCode::INTERNAL_SERVER_ERROR;
        (status, Json(FaultBody::new(status, GENERIC_FAULT_MESSAGE))).into_response()
    }
}

/// Creates a layer catching handler panics and responding with [Fault]-based responses.
pub fn recover_layer(logger: Logger) -> CatchPanicLayer<RecoverPanic> {
    CatchPanicLayer::custom(RecoverPanic::new(logger))
}

#[cfg(test)]
mod tests {
    use crate::fault::{Fault, RecoverPanic, GENERIC_FAULT_MESSAGE};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use hyper::body::to_bytes;
    use service_context::log::{LogConfig, LogFacility, LogRecord, LogSink, Severity};
    use std::sync::{Arc, Mutex};
    use tower_http::catch_panic::ResponseForPanic;

    #[derive(Default)]
    struct RecordingSink {
        records: Mutex<Vec<LogRecord>>,
    }

    impl LogSink for RecordingSink {
        fn write(&self, record: &LogRecord) {
            self.records.lock().unwrap().push(record.clone());
        }
    }

    fn create_handler(sink: Arc<RecordingSink>) -> RecoverPanic {
        RecoverPanic::new(
            LogFacility::with_sink(&LogConfig::new(Severity::Info, "core"), sink).logger("web"),
        )
    }

    async fn body_text(response: axum::response::Response) -> String {
        String::from_utf8(to_bytes(response.into_body()).await.unwrap().to_vec()).unwrap()
    }

    #[test]
    fn should_default_to_internal_error() {
        let fault = Fault::new("broken");
        assert_eq!(fault.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(fault.to_string(), "broken");

        let fault = Fault::with_status(StatusCode::NOT_FOUND, "missing");
        assert_eq!(fault.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(fault.message(), "missing");
    }

    #[tokio::test]
    async fn should_render_fault_body() {
        let response = Fault::with_status(StatusCode::BAD_REQUEST, "name is a required field")
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_text(response).await,
            r#"{"code":400,"status":"bad request","message":"name is a required field"}"#
        );
    }

    #[tokio::test]
    async fn should_recover_fault_payload() {
        let sink = Arc::new(RecordingSink::default());
        let mut handler = create_handler(sink.clone());

        let response = handler.response_for_panic(Box::new(Fault::with_status(
            StatusCode::CONFLICT,
            "already exists",
        )));

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(body_text(response).await.contains("already exists"));

        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, Severity::Error);
        assert_eq!(&*records[0].prefix, "core.web");
    }

    #[tokio::test]
    async fn should_hide_other_payloads() {
        let sink = Arc::new(RecordingSink::default());
        let mut handler = create_handler(sink.clone());

        let response = handler.response_for_panic(Box::new("index out of bounds".to_string()));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response).await.contains(GENERIC_FAULT_MESSAGE));
        assert_eq!(
            sink.records.lock().unwrap()[0].message,
            "Recovered from panic: index out of bounds"
        );
    }
}
