//! Command-line arguments for `invoice-render`

use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::error::CliError;

/// Renders an invoice request into a document model
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "invoice-render", version, about)]
pub struct Args {
    /// Path to the render request JSON, or "-" to read stdin
    pub input: PathBuf,
}

/// What the command line asks for
#[derive(Debug)]
pub enum Invocation {
    Render(Args),
    /// Help or version text, printed to stdout with a success exit
    Info(String),
}

impl Args {
    /// Parses an argument list whose first element is the program name
    ///
    /// Malformed arguments become `CliError::Usage`.
    pub fn parse_invocation<I, T>(args: I) -> Result<Invocation, CliError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Args::try_parse_from(args) {
            Ok(args) => Ok(Invocation::Render(args)),
            Err(err) => match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    Ok(Invocation::Info(err.to_string()))
                }
                _ => Err(CliError::Usage(err.to_string().trim_end().to_string())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdin_marker_is_a_path() {
        match Args::parse_invocation(["invoice-render", "-"]).unwrap() {
            Invocation::Render(args) => assert_eq!(args.input, PathBuf::from("-")),
            other => panic!("expected a render invocation, got {other:?}"),
        }
    }
}
