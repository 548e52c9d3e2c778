pub mod outline;
pub mod render;
pub mod search;
pub mod stats;

use anyhow::{anyhow, Context, Result};
use markview_config::LogConfig;
use serde::Serialize;
use std::io::{IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Log files larger than this are discarded on startup.
const MAX_LOG_FILE_SIZE: u64 = 8 * 1024 * 1024;

/// Initializes the global logger.
///
/// The log file is taken from `--log`, then `MARKVIEW_LOG_PATH`, then the
/// config. Without a log file, logs go to stderr only when `RUST_LOG` is set.
///
/// The returned guard must be held until exit to flush the file writer.
pub fn init_logging(log: Option<PathBuf>, config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let maybe_log = if let Some(log_path) = log {
        Some(log_path)
    } else if let Ok(log_path) = std::env::var("MARKVIEW_LOG_PATH").map(PathBuf::from) {
        Some(log_path)
    } else {
        config.log_file.as_ref().map(PathBuf::from)
    };

    let Some(log_path) = maybe_log else {
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
            let subscriber = tracing_subscriber::FmtSubscriber::builder()
                .with_env_filter(EnvFilter::from_default_env())
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        return Ok(None);
    };

    if let Ok(metadata) = std::fs::metadata(&log_path) {
        if log_path.is_file() && metadata.len() > MAX_LOG_FILE_SIZE {
            std::fs::remove_file(&log_path)?;
        }
    }

    let file_name = log_path
        .file_name()
        .ok_or_else(|| anyhow!("no file name in {log_path:?}"))?;

    let directory = log_path
        .parent()
        .ok_or_else(|| anyhow!("{log_path:?} has no parent"))?;

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let max_level = config.max_level.parse().unwrap_or(tracing::Level::DEBUG);

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(max_level)
        .with_line_number(true)
        .with_writer(non_blocking)
        .with_ansi(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(Some(guard))
}

/// Reads the whole input, from `path` or from stdin when it is `None` or `-`.
pub fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    match path {
        Some(path) if path != Path::new("-") => {
            buf = std::fs::read(path).with_context(|| format!("failed to read {path:?}"))?;
        }
        _ => {
            std::io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .context("failed to read stdin")?;
        }
    }
    tracing::debug!(bytes = buf.len(), "Read input");
    Ok(buf)
}

/// Reads the input as UTF-8 text.
pub fn read_input_text(path: Option<&Path>) -> Result<String> {
    String::from_utf8(read_input(path)?).map_err(|err| anyhow!("input is not valid UTF-8: {err}"))
}

/// Writes `value` to stdout as a single line of JSON.
pub fn println_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    serde_json::to_writer(&mut lock, value)?;
    writeln!(lock)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_input_from_file() {
        let path = std::env::temp_dir().join(format!("markview_cli_{}.md", std::process::id()));
        std::fs::write(&path, "# Title\n").unwrap();
        let text = read_input_text(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(text, "# Title\n");
    }

    #[test]
    fn test_read_missing_file() {
        let path = std::env::temp_dir().join("markview_cli_missing.md");
        let err = read_input(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
