use color_eyre::{eyre::eyre, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Route tracing output to the log file so stdout stays clean for command
/// output. Keep the returned guard alive until exit or buffered lines are lost.
pub fn init(config: &Config) -> Result<WorkerGuard> {
  let path = config.log_path()?;
  let dir = path
    .parent()
    .filter(|p| !p.as_os_str().is_empty())
    .map(|p| p.to_path_buf())
    .unwrap_or_else(|| std::path::PathBuf::from("."));
  let file_name = path
    .file_name()
    .ok_or_else(|| eyre!("Log path has no file name: {}", path.display()))?;

  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let appender = tracing_appender::rolling::never(&dir, file_name);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(env_filter(&config.log.level))
    .with_writer(writer)
    .with_ansi(false)
    .try_init()
    .map_err(|e| eyre!("Failed to install tracing subscriber: {}", e))?;

  Ok(guard)
}

/// C9S_LOG wins over the configured level; a bad directive falls back to info.
fn env_filter(configured: &str) -> EnvFilter {
  EnvFilter::try_from_env("C9S_LOG")
    .or_else(|_| EnvFilter::try_new(configured))
    .unwrap_or_else(|_| EnvFilter::new("info"))
}
