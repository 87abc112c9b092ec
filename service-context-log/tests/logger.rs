use service_context_log::{
    error, info, log, trace, warn, FieldValue, LogConfig, LogFacility, LogRecord, LogSink,
    Severity,
};
use std::env;
use std::panic::{self, AssertUnwindSafe};
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::thread;

const FATAL_CHILD_ENV: &str = "SERVICE_CONTEXT_LOG_FATAL_CHILD";

#[derive(Default)]
struct RecordingSink {
    records: Mutex<Vec<LogRecord>>,
}

impl LogSink for RecordingSink {
    fn write(&self, record: &LogRecord) {
        self.records.lock().unwrap().push(record.clone());
    }
}

impl RecordingSink {
    fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap().clone()
    }
}

struct StdoutSink;

impl LogSink for StdoutSink {
    fn write(&self, record: &LogRecord) {
        println!("record {} {}: {}", record.severity, record.prefix, record.message);
    }
}

fn create_facility(level: Severity) -> (LogFacility, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let facility = LogFacility::with_sink(&LogConfig::new(level, "core"), sink.clone());
    (facility, sink)
}

#[test]
fn should_pass_records_at_or_above_threshold_in_order() {
    let (facility, sink) = create_facility(Severity::Info);
    let logger = facility.logger("svc");

    trace!(logger, "trace {}", 1);
    service_context_log::debug!(logger, "debug {}", 2);
    info!(logger, "info {}", 3);
    warn!(logger, "warn {}", 4);
    error!(logger, "error {}", 5);

    let payload = panic::catch_unwind(AssertUnwindSafe(|| {
        log!(logger, Severity::Panic, "panic {}", 7);
    }))
    .unwrap_err();

    assert_eq!(
        payload.downcast_ref::<String>().map(String::as_str),
        Some("panic 7")
    );

    let records = sink.records();
    assert_eq!(
        records
            .iter()
            .map(|record| record.severity)
            .collect::<Vec<_>>(),
        vec![Severity::Info, Severity::Warn, Severity::Error, Severity::Panic]
    );
    assert_eq!(records[0].message, "info 3");
    assert_eq!(records[3].message, "panic 7");
    assert!(records.iter().all(|record| &*record.prefix == "core.svc"));
}

#[test]
fn should_panic_through_formatting_macro() {
    let (facility, sink) = create_facility(Severity::Info);
    let logger = facility.logger("svc").with_field("k", "v");

    let payload = panic::catch_unwind(AssertUnwindSafe(|| {
        service_context_log::panic!(logger, "broken {}", "invariant");
    }))
    .unwrap_err();

    assert_eq!(
        payload.downcast_ref::<String>().map(String::as_str),
        Some("broken invariant")
    );

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].severity, Severity::Panic);
    assert_eq!(records[0].fields.get("k"), Some(&FieldValue::from("v")));
}

// re-runs this test in a child process, which is expected to exit after writing one record
#[test]
fn should_exit_after_fatal_record() {
    if env::var_os(FATAL_CHILD_ENV).is_some() {
        let facility = LogFacility::with_sink(
            &LogConfig::new(Severity::Info, "core"),
            Arc::new(StdoutSink),
        );
        log!(facility.logger("svc"), Severity::Fatal, "fatal {}", 6);
        return;
    }

    let output = Command::new(env::current_exe().unwrap())
        .args(["should_exit_after_fatal_record", "--exact", "--nocapture"])
        .env(FATAL_CHILD_ENV, "1")
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout.matches("record fatal core.svc: fatal 6").count(), 1);
}

#[test]
fn should_keep_parent_unaffected_by_fields() {
    let (facility, sink) = create_facility(Severity::Trace);
    let parent = facility.logger("svc");
    let child = parent.with_field("k", "v");

    parent.info("before");
    child.info("child");
    parent.info("after");

    let records = sink.records();
    assert!(records[0].fields.is_empty());
    assert_eq!(
        records[1].fields.get("k"),
        Some(&FieldValue::Str("v".to_string()))
    );
    assert!(records[2].fields.is_empty());
}

#[test]
fn should_resolve_nested_and_dotted_prefixes_equally() {
    let (facility, _) = create_facility(Severity::Info);

    assert_eq!(
        facility.logger("a").logger("b").prefix(),
        facility.logger("a.b").prefix()
    );
    assert_eq!(facility.logger("a.b").prefix(), "core.a.b");
    assert_eq!(facility.logger(".a.").logger("").prefix(), "core.a");
}

#[test]
fn should_not_allow_children_to_change_threshold() {
    let (facility, _) = create_facility(Severity::Warn);
    let child = facility.logger("a").logger("b").with_field("x", 1);

    assert_eq!(child.level(), Severity::Warn);
    assert!(!child.enabled(Severity::Info));
    assert!(child.enabled(Severity::Panic));
}

#[test]
fn should_derive_loggers_concurrently() {
    let (facility, sink) = create_facility(Severity::Info);
    let parent = facility.logger("worker");

    let handles: Vec<_> = (0..8)
        .map(|index| {
            let parent = parent.clone();
            thread::spawn(move || {
                let logger = parent.logger(&index.to_string()).with_field("index", index);
                info!(logger, "started");
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let records = sink.records();
    assert_eq!(records.len(), 8);
    assert!(records.iter().all(|record| record.fields.len() == 1));
    assert!(parent.fields().is_empty());
}
