//! Command-line surface: argument handling and the fixed texts.

use sendeml_core::make_json_sample;

/// Version shown by `--version`.
pub const VERSION: &str = "1.0";

/// What the program was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action<'a> {
    /// Print usage and a settings sample.
    Usage,
    /// Print the version.
    Version,
    /// Send the batches described by these settings files, in order.
    Send(&'a [String]),
}

/// Interprets the arguments that follow the program name.
#[must_use]
pub fn parse_args(args: &[String]) -> Action<'_> {
    match args.first().map(String::as_str) {
        None => Action::Usage,
        Some("--version") => Action::Version,
        Some(_) => Action::Send(args),
    }
}

/// Returns the version line.
#[must_use]
pub fn version() -> String {
    format!("SendEML / Version: {VERSION}")
}

/// Returns the usage text, ending with a settings sample.
///
/// # Errors
///
/// Returns an error if the sample cannot be rendered.
pub fn usage(program: &str) -> serde_json::Result<String> {
    Ok(format!(
        "Usage: {program} json_file ...\n---\njson_file sample:\n{}",
        make_json_sample()?
    ))
}
