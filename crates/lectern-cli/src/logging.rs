use anyhow::{anyhow, Result};
use twyg::{LogLevel, OptsBuilder};

use crate::config::LoggingConfig;

/// Parse a configured level name.
pub fn parse_level(level: &str) -> Result<LogLevel> {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Ok(LogLevel::Trace),
        "debug" => Ok(LogLevel::Debug),
        "info" => Ok(LogLevel::Info),
        "warn" | "warning" => Ok(LogLevel::Warn),
        "error" => Ok(LogLevel::Error),
        other => Err(anyhow!(
            "Unknown log level: {other}\n\nValid levels: trace, debug, info, warn, error"
        )),
    }
}

/// Install the global logger.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let level = if verbose {
        LogLevel::Debug
    } else {
        parse_level(&config.level)?
    };

    let opts = OptsBuilder::new()
        .coloured(config.coloured)
        .level(level)
        .report_caller(config.report_caller)
        .build()
        .map_err(|e| anyhow!("Invalid logging options: {e}"))?;

    twyg::setup(opts).map_err(|e| anyhow!("Failed to set up logging: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert!(matches!(parse_level("debug"), Ok(LogLevel::Debug)));
        assert!(matches!(parse_level("WARN"), Ok(LogLevel::Warn)));
        assert!(parse_level("loud").is_err());
    }
}
