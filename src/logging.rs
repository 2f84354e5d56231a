//! Logging setup

use tracing::info;

use crate::config::ClientConfig;

pub const APP_NAME: &str = "KanbanBoard";

/// Install the rolling file logger when a log directory is configured.
/// Returns whether a logger was installed.
pub fn init_logging(config: &ClientConfig) -> Result<bool, String> {
    let Some(dir) = &config.log_dir else {
        return Ok(false);
    };
    rolling_logger::init_logger(dir, APP_NAME)?;
    info!(base_url = %config.base_url, "client logging started");
    Ok(true)
}

/// Recently logged lines, for an in-app diagnostics view
pub fn recent_log_lines() -> Vec<String> {
    rolling_logger::recent_lines()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_log_dir_installs_nothing() {
        assert_eq!(init_logging(&ClientConfig::default()), Ok(false));
    }
}
