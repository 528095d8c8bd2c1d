//! Declarative command-line argument parsing.
//!
//! A command type declares its options, positional arguments and
//! subcommands once. The declaration is validated on first use and then
//! drives a small state machine that fills a fresh instance from `argv`,
//! recursing into subcommands and rendering help for any command level.
//!
//! The descriptor model ([`DescriptorSet`]) is plain data, so it can also be
//! inspected, rendered or exported without knowing the Rust type behind it.

pub mod command;
pub mod declare;
pub mod decode;
pub mod descriptor;
pub mod error;
pub mod help;
pub mod naming;
pub mod parser;
pub mod registry;
pub mod text;
pub mod tokenize;
pub mod validate;

pub use command::{Command, Execute, run, run_with};
pub use declare::{Arg, Declaration, Definition, Opt};
pub use decode::Decoder;
pub use descriptor::{
    Builtin, DescriptorSet, OptionDescriptor, PositionalDescriptor, PositionalKind,
    SubcommandDescriptor,
};
pub use error::{DefinitionError, Error, ParseError, ParseErrorKind, Result};
pub use parser::ParseOutcome;
