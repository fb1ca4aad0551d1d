use std::path::{Path, PathBuf};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn";
const LOG_FILE_NAME: &str = "dashboard.log";

/// Инициализация системы трассировки (tracing)
///
/// Логи пишутся в:
/// - stdout (с цветами)
/// - logs/dashboard.log рядом с исполняемым файлом (без цветов)
pub fn initialize() -> anyhow::Result<()> {
    println!("========================================");
    println!("  LOGGING SYSTEM INITIALIZATION");
    println!("========================================\n");

    let log_dir = log_directory();
    println!("✓ Log directory: {}", log_dir.display());

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        println!("✗ ERROR: Cannot create log directory: {}", e);
        println!("  Error kind: {:?}", e.kind());
        println!("========================================\n");
        return Err(anyhow::anyhow!("Cannot create log directory: {}", e));
    }

    let log_file_path = log_dir.join(LOG_FILE_NAME);
    let log_file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
    {
        Ok(f) => {
            println!("✓ Log file: {}", log_file_path.display());
            f
        }
        Err(e) => {
            println!("✗ ERROR: Cannot open log file: {}", e);
            println!("  Path: {}", log_file_path.display());
            println!("========================================\n");
            return Err(anyhow::anyhow!("Cannot open log file: {}", e));
        }
    };

    let log_level = filter_directives(std::env::var("RUST_LOG").ok());
    println!("✓ Log level: {}", log_level);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(log_level))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .init();

    println!("✓ Tracing subscriber initialized");
    println!("========================================\n");

    Ok(())
}

/// `logs/` next to the executable, `target/logs` when its location is unknown.
fn log_directory() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("logs")))
        .unwrap_or_else(|| Path::new("target").join("logs"))
}

fn filter_directives(env_value: Option<String>) -> String {
    env_value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}
