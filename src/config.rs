use std::env;

use eyre::{eyre, Result};

use crate::cli::Args;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_RENDERER: &str = "wkhtmltopdf";

/// Immutable service configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Path to the wkhtmltopdf binary, or a bare name resolved via PATH.
    pub renderer: String,
}

impl Config {
    pub fn resolve(args: &Args) -> Result<Self> {
        let port = resolve_port(args.port, env::var("WKHTMLTOX_PORT").ok())?;
        let renderer = env::var("WKHTMLTOPDF_PATH")
            .ok()
            .filter(|path| !path.is_empty())
            .unwrap_or_else(|| DEFAULT_RENDERER.to_string());

        Ok(Self { port, renderer })
    }
}

// Precedence: command-line flag, then environment, then the default.
// An empty environment value counts as unset.
fn resolve_port(flag: Option<u16>, env_value: Option<String>) -> Result<u16> {
    if let Some(port) = flag {
        return Ok(port);
    }
    match env_value.filter(|value| !value.is_empty()) {
        Some(value) => value
            .parse()
            .map_err(|_| eyre!("invalid WKHTMLTOX_PORT value: {value}")),
        None => Ok(DEFAULT_PORT),
    }
}
