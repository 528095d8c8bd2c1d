//! Command types and the process-facing entry point.

use std::io::{self, Write};
use std::sync::Arc;

use crate::declare::{Declaration, Definition};
use crate::error::{DEFAULT_EXIT_CODE, Error, Result};
use crate::parser::ParseOutcome;
use crate::registry;

/// A type whose fields are filled in from command-line tokens.
///
/// `declare` receives a [`Declaration`] named after the type and adds the
/// options, arguments and subcommands. Each parse starts from
/// `Self::default()`.
///
/// ```
/// use argdecl::{Arg, Command, Declaration, Opt, decode};
///
/// #[derive(Debug, Default)]
/// struct Greet {
///     loud: bool,
///     name: String,
/// }
///
/// impl Command for Greet {
///     fn declare(cmd: Declaration<Self>) -> Declaration<Self> {
///         cmd.about("Say hello")
///             .help()
///             .flag(Opt::new("loud").short("l"), |g| &mut g.loud)
///             .arg(Arg::new("name"), decode::string(), |g| &mut g.name)
///     }
/// }
///
/// let greet = Greet::parse(["-l", "world"]).unwrap().parsed().unwrap();
/// assert!(greet.loud);
/// assert_eq!(greet.name, "world");
/// ```
pub trait Command: Default + Send + Sync + 'static {
    fn declare(cmd: Declaration<Self>) -> Declaration<Self>;

    fn definition() -> Arc<Definition<Self>> {
        registry::definition::<Self>()
    }

    fn parse<I, S>(argv: I) -> Result<ParseOutcome<Self>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::definition().parse(argv)
    }

    fn help() -> String {
        Self::definition().help()
    }
}

/// A command that can be run once parsed.
pub trait Execute: Command {
    /// Returns the process exit code.
    fn execute(self) -> i32;
}

/// Parse `argv` (without the program name) and execute `C`, writing to the
/// process's stdout and stderr.
pub fn run<C, I, S>(argv: I) -> i32
where
    C: Execute,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let stdout = io::stdout();
    let stderr = io::stderr();
    run_with::<C, _, _, _, _>(argv, &mut stdout.lock(), &mut stderr.lock())
}

/// [`run`] with explicit output streams.
///
/// Help and version text go to `out` with exit code 0. A parse error goes
/// to `err` followed by the help of the command level that rejected the
/// input, and yields the error's exit code.
pub fn run_with<C, I, S, O, E>(argv: I, out: &mut O, err: &mut E) -> i32
where
    C: Execute,
    I: IntoIterator<Item = S>,
    S: Into<String>,
    O: Write,
    E: Write,
{
    match C::parse(argv) {
        Ok(ParseOutcome::Parsed(command)) => command.execute(),
        Ok(ParseOutcome::Help(text)) | Ok(ParseOutcome::Version(text)) => {
            match writeln!(out, "{text}") {
                Ok(()) => 0,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to write help output");
                    DEFAULT_EXIT_CODE
                }
            }
        }
        Err(Error::Parse(parse)) => {
            report(err, format_args!("parse error: {parse}\n\n{}", parse.help()));
            parse.exit_code()
        }
        Err(Error::Definition(definition)) => {
            report(err, format_args!("definition error: {definition}"));
            DEFAULT_EXIT_CODE
        }
    }
}

/// Write an error report. The exit code already signals the failure, so a
/// broken `err` stream is only logged.
fn report<E: Write>(err: &mut E, message: std::fmt::Arguments<'_>) {
    if let Err(e) = writeln!(err, "{message}") {
        tracing::warn!(error = %e, "failed to write error report");
    }
}
