use std::io;
/// Structured logging utilities for runtime-image generation
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "runtime_image=info";

/// Initialize structured logging with optional JSON output.
/// Logs go to stderr so rendered output on stdout stays clean.
pub fn init_logging(json_output: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = Registry::default().with(env_filter);

    if json_output {
        // JSON output for structured logging aggregation
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()?;
    }

    Ok(())
}

#[macro_export]
macro_rules! log_runtime_steps_appended {
    ($output_image:expr, $total_steps:expr) => {
        tracing::info!(
            output_image = %$output_image,
            total_steps = $total_steps,
            "Appended runtime-image steps to build strategy"
        );
    };
}
