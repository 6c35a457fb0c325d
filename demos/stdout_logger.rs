use ecs_trace_log::record::attr;
use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};
use opentelemetry::Context;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logger = ecs_trace_log::logger();

    // Outside of any request: ids are all zeros.
    logger.info(None, "starting service", [attr("port", 8080)])?;

    // Pretend a request arrived carrying a W3C traceparent.
    let sc = SpanContext::new(
        TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736")?,
        SpanId::from_hex("00f067aa0ba902b7")?,
        TraceFlags::SAMPLED,
        true,
        TraceState::default(),
    );
    let cx = Context::new().with_remote_span_context(sc);

    let request_log = logger.with([attr("route", "/login")]);
    request_log.debug(Some(&cx), "parsing body", [])?;
    request_log.error(
        Some(&cx),
        "authentication failed",
        [attr("user_id", 42), attr("reason", "invalid password")],
    )?;

    Ok(())
}
