use ecs_trace_log::ecs::{ecs_handler, ecs_handler_with_level};
use ecs_trace_log::error::HandleError;
use ecs_trace_log::handler::Handler;
use ecs_trace_log::record::{attr, group, Record, Source};
use ecs_trace_log::trace::TraceHandler;
use ecs_trace_log::Logger;
use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};
use opentelemetry::Context;
use serde_json::{json, Value};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::Level;

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        // Accept at most a few bytes per call so that an unsynchronized
        // writer would tear lines.
        let n = data.len().min(7);
        self.0.lock().unwrap().extend_from_slice(&data[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuf {
    fn lines(&self) -> Vec<Value> {
        let text = String::from_utf8(self.0.lock().unwrap().clone()).unwrap();
        text.lines()
            .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("bad line {l:?}: {e}")))
            .collect()
    }
}

fn ecs_logger(buf: &SharedBuf) -> Logger {
    Logger::new(TraceHandler::new(ecs_handler(buf.clone())))
}

fn traced_context(trace: &str, span: &str) -> Context {
    let sc = SpanContext::new(
        TraceId::from_hex(trace).unwrap(),
        SpanId::from_hex(span).unwrap(),
        TraceFlags::SAMPLED,
        true,
        TraceState::default(),
    );
    Context::new().with_remote_span_context(sc)
}

#[test]
fn builtin_keys_are_renamed() {
    let buf = SharedBuf::default();
    ecs_logger(&buf).info(None, "started", []).unwrap();

    let lines = buf.lines();
    assert_eq!(lines.len(), 1);
    let line = lines[0].as_object().unwrap();
    assert!(line["@timestamp"].as_str().unwrap().ends_with('Z'));
    assert_eq!(line["message"], "started");
    assert_eq!(line["log.level"], "INFO");
    for old in ["time", "msg", "level", "source"] {
        assert!(!line.contains_key(old), "unexpected key {old}");
    }
}

#[test]
fn source_location_becomes_log_origin() {
    let buf = SharedBuf::default();
    let handler = TraceHandler::new(ecs_handler(buf.clone()));
    let record = Record::new(Level::INFO, "m").with_source(Source::new("f", "a.go", 42));
    handler.handle(None, record).unwrap();

    assert_eq!(
        buf.lines()[0]["log.origin"],
        json!({"file": {"name": "a.go", "line": 42, "function": "f"}})
    );
}

#[test]
fn logger_origin_points_at_call_site() {
    let buf = SharedBuf::default();
    let line = line!() + 1;
    ecs_logger(&buf).warn(None, "m", []).unwrap();

    let origin = &buf.lines()[0]["log.origin"]["file"];
    assert!(origin["name"].as_str().unwrap().ends_with("ecs_output.rs"));
    assert_eq!(origin["line"], line);
}

#[test]
fn no_active_trace_emits_zero_ids() {
    let buf = SharedBuf::default();
    let logger = ecs_logger(&buf);
    logger.info(None, "no handle", []).unwrap();
    logger.info(Some(&Context::new()), "empty handle", []).unwrap();

    for line in buf.lines() {
        assert_eq!(line["trace"], json!({"id": "0".repeat(32)}));
        assert_eq!(line["span"], json!({"id": "0".repeat(16)}));
    }
}

#[test]
fn active_trace_ids_are_emitted() {
    let buf = SharedBuf::default();
    let cx = traced_context("4bf92f3577b34da6a3ce929d0e0e4736", "00f067aa0ba902b7");
    ecs_logger(&buf)
        .error(Some(&cx), "failed", [attr("user_id", 7)])
        .unwrap();

    let line = &buf.lines()[0];
    assert_eq!(line["trace"], json!({"id": "4bf92f3577b34da6a3ce929d0e0e4736"}));
    assert_eq!(line["span"], json!({"id": "00f067aa0ba902b7"}));
    assert_eq!(line["user_id"], 7);
    assert_eq!(line["log.level"], "ERROR");
}

#[test]
fn below_info_produces_no_output() {
    let buf = SharedBuf::default();
    ecs_logger(&buf).debug(None, "hidden", []).unwrap();
    assert!(buf.0.lock().unwrap().is_empty());
}

#[test]
fn caller_attrs_pass_through_with_builtin_names_renamed() {
    let buf = SharedBuf::default();
    let logger = ecs_logger(&buf).with([attr("service", "billing")]);
    logger
        .info(
            None,
            "charged",
            [
                attr("amount", 9.5),
                group("req", [attr("msg", "inner"), attr("level", "x"), attr("id", 3)]),
            ],
        )
        .unwrap();

    let line = &buf.lines()[0];
    assert_eq!(line["service"], "billing");
    assert_eq!(line["amount"], 9.5);
    assert_eq!(
        line["req"],
        json!({"message": "inner", "log.level": "x", "id": 3})
    );
}

#[test]
fn lowered_threshold_emits_debug() {
    let buf = SharedBuf::default();
    let logger = Logger::new(TraceHandler::new(ecs_handler_with_level(
        buf.clone(),
        Level::DEBUG,
    )));
    logger.debug(None, "verbose", []).unwrap();
    assert!(!logger.enabled(Level::TRACE));

    let lines = buf.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["log.level"], "DEBUG");
    assert_eq!(lines[0]["message"], "verbose");
}

#[test]
fn concurrent_calls_do_not_interleave() {
    let buf = SharedBuf::default();
    let logger = ecs_logger(&buf);

    let workers: Vec<_> = (0..4)
        .map(|w| {
            let logger = logger.clone();
            thread::spawn(move || {
                for i in 0..200 {
                    logger
                        .info(None, "tick", [attr("worker", w), attr("i", i)])
                        .unwrap();
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    let lines = buf.lines();
    assert_eq!(lines.len(), 800);
    assert!(lines.iter().all(|l| l["message"] == "tick"));
}

#[test]
fn write_failure_reaches_caller() {
    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let logger = Logger::new(TraceHandler::new(ecs_handler(Closed)));
    let err = logger.info(None, "lost", []).unwrap_err();
    assert!(matches!(err, HandleError::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
}
