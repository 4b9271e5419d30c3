use anyhow::Result;
use std::path::PathBuf;

const CHATBENCH_DIR: &str = ".chatbench";
const DB_FILE: &str = "presets.db";
const LOGS_DIR: &str = "logs";

/// Environment variable to override the chatbench directory.
const CHATBENCH_DIR_ENV: &str = "CHATBENCH_DIR";

/// Resolve the chatbench data directory.
/// Priority: CHATBENCH_DIR env var > ~/.chatbench/
pub fn resolve_chatbench_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(CHATBENCH_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|h| h.join(CHATBENCH_DIR))
        .ok_or_else(|| anyhow::anyhow!("Failed to determine home directory"))
}

/// Ensure the chatbench directory exists and return its path.
pub fn ensure_chatbench_dir() -> Result<PathBuf> {
    let dir = resolve_chatbench_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Default preset database: ~/.chatbench/presets.db
pub fn ensure_database_path() -> Result<PathBuf> {
    Ok(ensure_chatbench_dir()?.join(DB_FILE))
}

/// Get the logs directory: ~/.chatbench/logs/
pub fn logs_dir() -> Result<PathBuf> {
    let dir = resolve_chatbench_dir()?.join(LOGS_DIR);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
