use crate::handler::Handler;
use crate::record::{Attr, Record, Source, Value};
use std::fmt;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tracing::field::{Field, Visit};
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns events into [`Record`]s and feeds
/// them through a [`Handler`] chain on the calling thread.
///
/// The trace context is taken from [`opentelemetry::Context::current`].
/// Events below the handler's minimum level are skipped before any field
/// is visited.
pub struct HandlerLayer<H> {
    handler: H,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Successfully written by the handler.
    pub written_events: Arc<AtomicU64>,
    /// Rejected by the handler with an error.
    pub failed_events: Arc<AtomicU64>,
}

impl<H: Handler> HandlerLayer<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            total_events: Arc::new(AtomicU64::new(0)),
            written_events: Arc::new(AtomicU64::new(0)),
            failed_events: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl<S, H> Layer<S> for HandlerLayer<H>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    H: Handler + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        let meta = event.metadata();
        if !self.handler.enabled(*meta.level()) {
            return;
        }

        let mut attrs = Vec::new();
        let mut message = None;
        event.record(&mut FieldVisitor {
            attrs: &mut attrs,
            message: &mut message,
        });

        let mut record = Record::new(*meta.level(), message.unwrap_or_default());
        record.source = source_of(meta);
        record.add_attrs(attrs);

        let cx = opentelemetry::Context::current();
        match self.handler.handle(Some(&cx), record) {
            Ok(()) => {
                self.written_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.failed_events.fetch_add(1, Ordering::Relaxed);
                eprintln!("error writing log record: {}", e);
            }
        }
    }
}

fn source_of(meta: &Metadata<'_>) -> Option<Source> {
    let file = meta.file()?;
    Some(Source::new(
        meta.module_path().unwrap_or_default(),
        file,
        meta.line().unwrap_or_default(),
    ))
}

/// Collects event fields into attributes; the `message` field becomes the
/// record's message.
pub struct FieldVisitor<'a> {
    pub attrs: &'a mut Vec<Attr>,
    pub message: &'a mut Option<String>,
}

impl FieldVisitor<'_> {
    fn push(&mut self, field: &Field, value: Value) {
        self.attrs.push(Attr::new(field.name(), value));
    }
}

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.push(field, Value::from(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, Value::I64(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, Value::U64(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, Value::F64(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, Value::Bool(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.push(field, Value::Str(format!("{:?}", value)));
        }
    }
}
