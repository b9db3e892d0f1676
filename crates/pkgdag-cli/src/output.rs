//! How commands print: one serializable value per command, shown as JSON,
//! plain lines or an aligned human layout.
//!
//! The mode comes from the first source that names a known mode:
//! `--format`, then `--json`, then `FORMAT`, then `output` in the user
//! config. Otherwise a terminal gets [`OutputMode::Pretty`] and a pipe gets
//! [`OutputMode::Text`].
//!
//! Results go to stdout. Errors and logs go to stderr.

use clap::ValueEnum;
use pkgdag_core::GraphError;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

const RULE: usize = 72;
const KEY_WIDTH: usize = 12;

/// Heading line underlined with dashes.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}\n{}", "-".repeat(RULE))
}

/// `key:` padded to a fixed column, then the value.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    let key = format!("{key}:");
    writeln!(w, "{key:<KEY_WIDTH$} {}", value.as_ref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Sections and aligned columns for people.
    Pretty,
    /// One record per line for pipes.
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputMode {
    fn named(raw: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(raw.trim(), true).ok()
    }
}

fn pick_mode(
    flag: Option<OutputMode>,
    json: bool,
    env: Option<&str>,
    user: Option<&str>,
    tty: bool,
) -> OutputMode {
    flag.or_else(|| json.then_some(OutputMode::Json))
        .or_else(|| env.and_then(OutputMode::named))
        .or_else(|| user.and_then(OutputMode::named))
        .unwrap_or(if tty { OutputMode::Pretty } else { OutputMode::Text })
}

/// Resolve the mode for this process from flags, `FORMAT`, the user
/// config value and whether stdout is a terminal.
pub fn resolve_output_mode(
    flag: Option<OutputMode>,
    json: bool,
    user: Option<&str>,
) -> OutputMode {
    let env = std::env::var("FORMAT").ok();
    pick_mode(flag, json, env.as_deref(), user, io::stdout().is_terminal())
}

fn write_value<T: Serialize + ?Sized>(
    out: &mut dyn Write,
    mode: OutputMode,
    value: &T,
    text: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text(value, out)?,
        OutputMode::Pretty => pretty(value, out)?,
    }
    Ok(())
}

/// Print `value` to stdout. JSON is handled here; the closures render
/// the text and pretty layouts.
pub fn render_mode<T: Serialize + ?Sized>(
    mode: OutputMode,
    value: &T,
    text: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    write_value(&mut out, mode, value, text, pretty)?;
    out.flush()?;
    Ok(())
}

/// What a failed command reports.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Stable code such as `E2001`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// The full context chain as the message. Code and hint come from the
    /// first [`GraphError`] in the chain, if any.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let code = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<GraphError>())
            .map(GraphError::code);
        Self {
            message: format!("{err:#}"),
            suggestion: code.and_then(|c| c.hint()).map(str::to_string),
            error_code: code.map(|c| c.code().to_string()),
        }
    }
}

fn write_error(out: &mut dyn Write, mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        serde_json::to_writer_pretty(&mut *out, &serde_json::json!({ "error": error }))?;
        writeln!(out)?;
        return Ok(());
    }

    let label = error
        .error_code
        .as_ref()
        .map_or_else(|| "error".to_string(), |code| format!("error[{code}]"));
    writeln!(out, "{label}: {}", error.message)?;
    if let Some(hint) = &error.suggestion {
        writeln!(out, "  suggestion: {hint}")?;
    }
    Ok(())
}

/// Print `error` to stderr.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    write_error(&mut io::stderr().lock(), mode, error)
}
