use std::env;
use std::fs;
use std::path::PathBuf;

use crate::error::Result;

/// Per-user working directory, created on first use.
pub fn app_dir() -> Result<PathBuf> {
    let dir = env::temp_dir().join("promptmesh");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// `RUST_LOG` wins; otherwise info for this crate and warn for everything else.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("warn,promptmesh=info,promptmesh_lib=info");
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("logger already initialised");
    }
}

/// Shortens long opaque values (credentials, data URIs) for log lines.
pub fn redact(value: &str) -> String {
    const KEEP: usize = 6;
    if value.chars().count() <= KEEP {
        return "*".repeat(value.chars().count());
    }
    let head: String = value.chars().take(KEEP).collect();
    format!("{}…({} chars)", head, value.chars().count())
}

/// Data URIs are logged by their header only.
pub fn display_uri(uri: &str) -> String {
    match uri.split_once(',') {
        Some((header, payload)) if header.starts_with("data:") => {
            format!("{},…({} bytes)", header, payload.len())
        }
        _ => uri.to_string(),
    }
}
