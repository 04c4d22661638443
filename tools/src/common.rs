use std::{fs, path::Path};

use anyhow::Context;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Sets up logging to stderr, filtered through `RUST_LOG` (`info` by default).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

pub fn read(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("error reading {}", path.display()))
}

/// Returns the lines of the `[name]` section.
///
/// A file without any section headers is treated as one big section. `//` comments are skipped.
pub fn section<'a>(text: &'a str, name: &str) -> Vec<&'a str> {
    let has_headers = text.lines().any(|line| header(line).is_some());

    let mut inside = !has_headers;
    let mut lines = Vec::new();
    for line in text.lines() {
        if let Some(header) = header(line) {
            inside = header == name;
            continue;
        }

        if inside && !line.trim_start().starts_with("//") {
            lines.push(line);
        }
    }

    lines
}

fn header(line: &str) -> Option<&str> {
    line.trim().strip_prefix('[')?.strip_suffix(']')
}
