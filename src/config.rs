use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_THREADS: usize = 5;
const DEFAULT_REQUEUE_SECONDS: u64 = 5;
const DEFAULT_LIFECYCLE_NAME: &str = "logging-status";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Runtime configuration, read from `CATTLE_*` environment variables
/// (a `.env` file is honoured).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    /// Empty means all namespaces.
    pub watch_namespace: String,
    pub controller_threads: usize,
    pub requeue_delay: Duration,
    pub lifecycle_name: String,
    /// When set, lifecycles are registered cluster scoped.
    pub cluster_name: Option<String>,
    pub logging_enabled: bool,
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 8080))),
            watch_namespace: String::new(),
            controller_threads: DEFAULT_THREADS,
            requeue_delay: Duration::from_secs(DEFAULT_REQUEUE_SECONDS),
            lifecycle_name: DEFAULT_LIFECYCLE_NAME.to_string(),
            cluster_name: None,
            logging_enabled: true,
            log_dir: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        // Missing .env is fine
        dotenvy::dotenv().ok();
        let vars: HashMap<String, String> = env::vars()
            .filter(|(k, _)| k.starts_with("CATTLE_"))
            .collect();
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(addr) = get("CATTLE_LISTEN_ADDR") {
            config.listen_addr = addr
                .parse()
                .with_context(|| format!("CATTLE_LISTEN_ADDR is not a socket address: {addr}"))?;
        }
        if let Some(ns) = get("CATTLE_WATCH_NAMESPACE") {
            config.watch_namespace = ns;
        }
        if let Some(threads) = get("CATTLE_CONTROLLER_THREADS") {
            let threads: usize = threads
                .parse()
                .with_context(|| format!("CATTLE_CONTROLLER_THREADS is not a number: {threads}"))?;
            anyhow::ensure!(threads > 0, "CATTLE_CONTROLLER_THREADS must be at least 1");
            config.controller_threads = threads;
        }
        if let Some(secs) = get("CATTLE_REQUEUE_SECONDS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("CATTLE_REQUEUE_SECONDS is not a number: {secs}"))?;
            config.requeue_delay = Duration::from_secs(secs);
        }
        if let Some(name) = get("CATTLE_LIFECYCLE_NAME") {
            config.lifecycle_name = name;
        }
        config.cluster_name = get("CATTLE_CLUSTER_NAME");
        if let Some(enabled) = get("CATTLE_LOGGING_ENABLED") {
            config.logging_enabled = parse_bool(&enabled)
                .with_context(|| format!("CATTLE_LOGGING_ENABLED is not a boolean: {enabled}"))?;
        }
        config.log_dir = get("CATTLE_LOG_DIR").map(PathBuf::from);
        if let Some(level) = get("CATTLE_LOG_LEVEL") {
            config.log_level = level;
        }

        Ok(config)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
