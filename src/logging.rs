use crate::error::AggregatorError;
use log::LevelFilter;
use std::path::Path;

/// Install the global logger: stdout plus an optional file, one
/// timestamped line per record.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> Result<(), AggregatorError> {
    let level: LevelFilter = level
        .parse()
        .map_err(|_| AggregatorError::Logging(format!("unknown log level {:?}", level)))?;

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout());

    if let Some(path) = log_file {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch
        .apply()
        .map_err(|err| AggregatorError::Logging(err.to_string()))
}
