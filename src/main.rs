use std::process::ExitCode;

use fmtlog::{global, log_debug, log_default, log_error, log_info, log_warn, sprintf, Level, LogError, Logger, LoggerConfig};
use tracing_subscriber::EnvFilter;

fn run(logger: &Logger) -> Result<(), LogError> {
    let mode = sprintf!("%s/%s", logger.threshold().to_string(), format!("{:?}", logger.threshold_mode()))?;
    log_debug!(logger, "starting with threshold mode %s", mode)?;
    log_info!(logger, "%s has %d items", "cart", 3)?;
    log_warn!(logger, "disk %s at %d%%", "sda", 93)?;
    log_error!(logger, "request %#x failed after %.3f s", 0xbeef, 1.25)?;

    logger.set_threshold(Level::Warn);
    log_default!(logger, "%-8s|%8s|", "left", "right")?;
    logger.log("plain message at the current threshold")?;

    log::info!("routed through the log facade");
    logger.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let logger = match global::install(Logger::new(LoggerConfig::from_env())) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("fmtlog: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Internal diagnostics of the library, e.g. RUST_LOG=fmtlog=trace.
    // `finish` leaves the `log` facade to the installed logger; `init` would
    // claim it with a `LogTracer`.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("fmtlog: diagnostics disabled: {e}");
    }

    match run(logger) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fmtlog: {e}");
            ExitCode::FAILURE
        }
    }
}
