use crate::error::HandleError;
use crate::handler::Handler;
use crate::record::{Attr, Record, Source};
use opentelemetry::Context;
use std::sync::Arc;
use tracing::Level;

/// Leveled logging front end over a [`Handler`].
///
/// Every call takes the context handle of the current unit of work, which
/// handlers such as [`TraceHandler`](crate::trace::TraceHandler) use to
/// correlate the record with a trace. Calls below the handler's minimum
/// level return `Ok(())` without building a record.
///
/// Cloning is cheap; clones share the handler.
#[derive(Clone)]
pub struct Logger {
    handler: Arc<dyn Handler>,
    attrs: Vec<Attr>,
}

impl Logger {
    pub fn new(handler: impl Handler + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
            attrs: Vec::new(),
        }
    }

    /// Child logger that adds `attrs` to every record, ahead of the
    /// attributes passed at the call site.
    pub fn with(&self, attrs: impl IntoIterator<Item = Attr>) -> Self {
        let mut child = self.clone();
        child.attrs.extend(attrs);
        child
    }

    /// Whether a call at `level` would reach the handler.
    pub fn enabled(&self, level: Level) -> bool {
        self.handler.enabled(level)
    }

    /// Emit a record at `level`. The caller's file and line become the
    /// record's source.
    #[track_caller]
    pub fn log(
        &self,
        level: Level,
        cx: Option<&Context>,
        message: impl Into<String>,
        attrs: impl IntoIterator<Item = Attr>,
    ) -> Result<(), HandleError> {
        if !self.handler.enabled(level) {
            return Ok(());
        }
        let mut record = Record::new(level, message).with_source(Source::caller());
        record.add_attrs(self.attrs.iter().cloned());
        record.add_attrs(attrs);
        self.handler.handle(cx, record)
    }

    #[track_caller]
    pub fn debug(
        &self,
        cx: Option<&Context>,
        message: impl Into<String>,
        attrs: impl IntoIterator<Item = Attr>,
    ) -> Result<(), HandleError> {
        self.log(Level::DEBUG, cx, message, attrs)
    }

    #[track_caller]
    pub fn info(
        &self,
        cx: Option<&Context>,
        message: impl Into<String>,
        attrs: impl IntoIterator<Item = Attr>,
    ) -> Result<(), HandleError> {
        self.log(Level::INFO, cx, message, attrs)
    }

    #[track_caller]
    pub fn warn(
        &self,
        cx: Option<&Context>,
        message: impl Into<String>,
        attrs: impl IntoIterator<Item = Attr>,
    ) -> Result<(), HandleError> {
        self.log(Level::WARN, cx, message, attrs)
    }

    #[track_caller]
    pub fn error(
        &self,
        cx: Option<&Context>,
        message: impl Into<String>,
        attrs: impl IntoIterator<Item = Attr>,
    ) -> Result<(), HandleError> {
        self.log(Level::ERROR, cx, message, attrs)
    }
}
