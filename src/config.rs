use std::path::PathBuf;
use std::time::Duration;

/// Default timeout for tool operations (30 seconds).
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;

/// Default maximum bytes per JSON-RPC message (1 MiB).
const DEFAULT_MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// A graph file to load into the cache at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preload {
    pub alias: String,
    pub path: PathBuf,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub tool_timeout: Duration,
    pub max_message_bytes: usize,
    /// Base directory for relative `load_graph_from_file` paths.
    pub data_root: Option<PathBuf>,
    pub preload: Vec<Preload>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tool_timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            data_root: None,
            preload: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment.
    ///
    /// - `GRAPH_TOOL_TIMEOUT_SECS` (optional, default 30) — max seconds per tool call
    /// - `GRAPH_MAX_MESSAGE_BYTES` (optional, default 1 MiB) — max bytes per request line
    /// - `GRAPH_DATA_ROOT` (optional) — base directory for relative graph file paths
    /// - `GRAPH_PRELOAD` (optional) — comma-separated `alias=path` pairs cached at startup
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let tool_timeout_secs = match lookup("GRAPH_TOOL_TIMEOUT_SECS") {
            Some(val) => val
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| "GRAPH_TOOL_TIMEOUT_SECS must be a positive integer".to_string())?,
            None => DEFAULT_TOOL_TIMEOUT_SECS,
        };

        let max_message_bytes = match lookup("GRAPH_MAX_MESSAGE_BYTES") {
            Some(val) => val
                .parse::<usize>()
                .ok()
                .filter(|bytes| *bytes > 0)
                .ok_or_else(|| "GRAPH_MAX_MESSAGE_BYTES must be a positive integer".to_string())?,
            None => DEFAULT_MAX_MESSAGE_BYTES,
        };

        let data_root = lookup("GRAPH_DATA_ROOT")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let preload = match lookup("GRAPH_PRELOAD") {
            Some(raw) => parse_preload(&raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            tool_timeout: Duration::from_secs(tool_timeout_secs),
            max_message_bytes,
            data_root,
            preload,
        })
    }
}

fn parse_preload(raw: &str) -> Result<Vec<Preload>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (alias, path) = entry
                .split_once('=')
                .ok_or_else(|| format!("GRAPH_PRELOAD entry '{entry}' must be alias=path"))?;
            let (alias, path) = (alias.trim(), path.trim());
            if path.is_empty() {
                return Err(format!("GRAPH_PRELOAD entry '{entry}' has an empty path"));
            }
            Ok(Preload {
                alias: alias.to_string(),
                path: PathBuf::from(path),
            })
        })
        .collect()
}
