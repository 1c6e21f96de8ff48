//! Shopgraph CLI - retail transaction analytics over a graph store.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{Cli, Commands};

/// Open the log file for appending through a background writer.
///
/// The directory is created and the file opened up front so an unwritable
/// path is reported as an error instead of a panic inside the appender.
fn log_file_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    let name = path
        .file_name()
        .with_context(|| format!("Log file path {} has no file name", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(name))
        .with_context(|| format!("Log file {} is not writable", path.display()))?;

    Ok(tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name)))
}

/// Initialize tracing with optional file logging.
///
/// The returned guard flushes the file writer and must live until exit.
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopgraph=info,shopgraph_web=debug,shopgraph_graph=info,tower_http=info".into());

    let file = log_file.map(log_file_writer).transpose()?;

    match file {
        Some((writer, guard)) => {
            // Log to both stdout and file when --log-file is used
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = match &cli.command {
        Commands::Serve(args) => args.log_file.clone(),
        _ => None,
    };
    let _guard = init_tracing(log_file.as_deref())?;

    cli.execute().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwritable_log_path_is_an_error() {
        let err = log_file_writer(Path::new("/dev/null/shopgraph/serve.log")).unwrap_err();
        assert!(err.to_string().contains("log directory"));
    }

    #[test]
    fn test_log_path_needs_a_file_name() {
        assert!(log_file_writer(Path::new("/")).is_err());
    }

    #[test]
    fn test_log_file_is_created() {
        let path = std::env::temp_dir()
            .join(format!("shopgraph-log-{}", std::process::id()))
            .join("serve.log");
        let (_writer, _guard) = log_file_writer(&path).unwrap();
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
