use ecs_trace_log::init::init_tracing;
use tracing::{debug, error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    info!("starting service");
    debug!("this line is filtered out");

    error!(
        user_id = 42,
        reason = "invalid password",
        "authentication failed"
    );

    Ok(())
}
