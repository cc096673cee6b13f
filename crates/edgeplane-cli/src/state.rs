//! Reading declared resources and recorded state from disk.

use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Reads a JSON document from `path`, or from stdin when `path` is `None`.
pub fn read_json<T: DeserializeOwned>(path: Option<&str>) -> Result<T> {
    let content = match path {
        Some(path) => fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            buf
        }
    };
    let source = path.unwrap_or("stdin");
    serde_json::from_str(&content).with_context(|| format!("Invalid resource JSON in {source}"))
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content + "\n").with_context(|| format!("Failed to write file: {path}"))
}
