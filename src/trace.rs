use crate::error::HandleError;
use crate::handler::Handler;
use crate::record::{attr, group, Record};
use opentelemetry::trace::{SpanId, TraceContextExt, TraceId};
use opentelemetry::Context;
use tracing::Level;

/// Trace and span id of the span active in `cx`.
///
/// A missing handle, or one without a valid span context, yields
/// [`TraceId::INVALID`] and [`SpanId::INVALID`], which render as all zeros.
pub fn lookup_trace(cx: Option<&Context>) -> (TraceId, SpanId) {
    let Some(cx) = cx else {
        return (TraceId::INVALID, SpanId::INVALID);
    };
    let span = cx.span();
    let sc = span.span_context();
    if sc.is_valid() {
        (sc.trace_id(), sc.span_id())
    } else {
        (TraceId::INVALID, SpanId::INVALID)
    }
}

/// [`Handler`] decorator that stamps every record with `trace.id` and
/// `span.id` before passing it on.
///
/// Both groups are always added, with zero ids when no trace is active.
#[derive(Debug, Clone)]
pub struct TraceHandler<H> {
    inner: H,
}

impl<H: Handler> TraceHandler<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H: Handler> Handler for TraceHandler<H> {
    fn enabled(&self, level: Level) -> bool {
        self.inner.enabled(level)
    }

    fn handle(&self, cx: Option<&Context>, mut record: Record) -> Result<(), HandleError> {
        let (trace_id, span_id) = lookup_trace(cx);
        record.add_attrs([
            group("trace", [attr("id", trace_id.to_string())]),
            group("span", [attr("id", span_id.to_string())]),
        ]);
        self.inner.handle(cx, record)
    }
}
