use crate::error::HandleError;
use crate::record::Record;
use opentelemetry::Context;
use std::sync::Arc;
use tracing::Level;

/// Destination for [`Record`]s.
///
/// Handlers compose by wrapping: a decorator holds another `Handler`,
/// adjusts the record and calls through. See
/// [`TraceHandler`](crate::trace::TraceHandler).
pub trait Handler: Send + Sync {
    /// Whether records at `level` would be emitted. Callers check this
    /// before building a record.
    fn enabled(&self, level: Level) -> bool;

    /// Encode and emit a single record.
    ///
    /// **Parameters**
    /// - `cx`: context handle of the unit of work that produced the record,
    ///   if the caller has one.
    /// - `record`: fully-populated record. Ownership moves into the handler.
    ///
    /// **Returns**
    /// - `Ok(())` once the record has been written.
    /// - `Err(..)` if encoding or the underlying writer failed. The error is
    ///   passed back as-is; handlers do not retry.
    fn handle(&self, cx: Option<&Context>, record: Record) -> Result<(), HandleError>;
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn enabled(&self, level: Level) -> bool {
        (**self).enabled(level)
    }

    fn handle(&self, cx: Option<&Context>, record: Record) -> Result<(), HandleError> {
        (**self).handle(cx, record)
    }
}
