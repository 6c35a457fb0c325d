use crate::ecs::ecs_handler_with_level;
use crate::error::InitError;
use crate::json::JsonHandler;
use crate::layer::HandlerLayer;
use crate::logger::Logger;
use crate::trace::TraceHandler;
use std::io::{self, Stdout};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// The default handler chain: trace enrichment over ECS JSON on stdout.
pub type StdoutHandler = TraceHandler<JsonHandler<Stdout>>;

fn stdout_handler(level: Level) -> StdoutHandler {
    TraceHandler::new(ecs_handler_with_level(io::stdout(), level))
}

/// Logger writing ECS JSON lines with trace and span ids to stdout,
/// dropping anything below `INFO`.
///
/// This is the recommended entrypoint for code that threads an
/// [`opentelemetry::Context`] explicitly.
pub fn logger() -> Logger {
    Logger::new(stdout_handler(Level::INFO))
}

/// Install a global `tracing` subscriber that routes every event through the
/// default handler chain.
///
/// **Effects**
///
/// This installs a [`Registry`] combined with a [`HandlerLayer`] as the
/// global default subscriber, so `tracing::info!` and friends produce the
/// same output as [`logger`].
///
/// **Errors**
///
/// Returns [`InitError::SetGlobal`] if a global subscriber is already set.
pub fn init_tracing() -> Result<(), InitError> {
    init_tracing_with_level(Level::INFO)
}

/// Same as [`init_tracing`] with a caller-chosen minimum level.
pub fn init_tracing_with_level(level: Level) -> Result<(), InitError> {
    let subscriber = Registry::default().with(HandlerLayer::new(stdout_handler(level)));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
