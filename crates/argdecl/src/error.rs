use std::sync::Arc;

use thiserror::Error;

use crate::descriptor::DescriptorSet;
use crate::help;

/// Exit code carried by a [`ParseError`] unless overridden.
pub const DEFAULT_EXIT_CODE: i32 = 1;

/// A mistake in a command declaration.
///
/// These are raised by validation before any token is looked at. They are
/// never caused by user input, so they carry no exit code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("cannot determine key at {loc}")]
    IndeterminateOptionKey { loc: String },

    #[error("option \"{key}\" is not valid at {loc}")]
    InvalidOptionKey { loc: String, key: String },

    #[error("duplicate option with key \"{key}\" defined at {loc}")]
    DuplicateOptionKey { loc: String, key: String },

    #[error("duplicate command with name \"{name}\" defined at {loc}")]
    DuplicateCommandName { loc: String, name: String },

    #[error("required argument defined after optional arguments at {loc}")]
    RequiredAfterOptional { loc: String },

    #[error("argument defined after rest arguments at {loc}")]
    RestBeforeLast { loc: String },

    #[error("both of positional arguments and subcommands are defined in {type_name}")]
    ArgAndSubcommandBothDefined { type_name: String },
}

/// What went wrong while consuming input tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("option \"{0}\" is not defined")]
    UnknownOptionKey(String),

    #[error("missing value for option \"{0}\"")]
    MissingOptionValue(String),

    /// The decoder's message, verbatim.
    #[error("{0}")]
    InvalidArgument(String),

    #[error("option \"{0}\" specified multiple times")]
    DuplicateOptionValue(String),

    #[error("command \"{0}\" is not defined")]
    UnknownCommandName(String),

    #[error("too many arguments")]
    TooManyArguments,

    #[error("missing arguments: {}", format_missing(.0))]
    MissingArguments(Vec<String>),
}

fn format_missing(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("<{name}>"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// A parse failure together with the command level it happened at.
///
/// The descriptor set and ancestor chain are kept so that a front-end can
/// print the help of the exact (sub)command the user got wrong.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct ParseError {
    kind: ParseErrorKind,
    exit_code: i32,
    descriptors: Arc<DescriptorSet>,
    ancestors: Vec<String>,
}

impl ParseError {
    pub(crate) fn new(
        kind: ParseErrorKind,
        descriptors: &Arc<DescriptorSet>,
        ancestors: &[String],
    ) -> Self {
        Self {
            kind,
            exit_code: DEFAULT_EXIT_CODE,
            descriptors: Arc::clone(descriptors),
            ancestors: ancestors.to_vec(),
        }
    }

    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    pub fn with_exit_code(mut self, exit_code: i32) -> Self {
        self.exit_code = exit_code;
        self
    }

    /// Descriptor set of the command level that rejected the input.
    pub fn descriptors(&self) -> &DescriptorSet {
        &self.descriptors
    }

    /// Names of the enclosing commands, root first.
    pub fn ancestors(&self) -> &[String] {
        &self.ancestors
    }

    /// Help text of the command level that rejected the input.
    pub fn help(&self) -> String {
        help::render(&self.descriptors, &self.ancestors)
    }
}

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
