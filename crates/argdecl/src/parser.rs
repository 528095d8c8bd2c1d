//! The parsing state machine.
//!
//! One call consumes tokens for one command level. Subcommand dispatch
//! recurses through the parent's bindings with the same token queue, so the
//! selected subcommand owns whatever is left of the input.

use std::collections::HashSet;

use crate::declare::{Definition, OptionAction, PositionalAction};
use crate::descriptor::PositionalKind;
use crate::error::{ParseError, ParseErrorKind};
use crate::help;
use crate::tokenize::{SEPARATOR, Tokens};

/// Result of a successful parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome<T> {
    Parsed(T),
    /// A help option was seen. Carries the rendered help of the command
    /// level it was seen at.
    Help(String),
    /// A version option was seen. Carries `<name> <version>`.
    Version(String),
}

impl<T> ParseOutcome<T> {
    pub fn parsed(self) -> Option<T> {
        match self {
            Self::Parsed(value) => Some(value),
            Self::Help(_) | Self::Version(_) => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParseOutcome<U> {
        match self {
            Self::Parsed(value) => ParseOutcome::Parsed(f(value)),
            Self::Help(text) => ParseOutcome::Help(text),
            Self::Version(text) => ParseOutcome::Version(text),
        }
    }
}

/// Help or version text travelling up from a nested command level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Early {
    Help(String),
    Version(String),
}

impl Early {
    fn into_outcome<T>(self) -> ParseOutcome<T> {
        match self {
            Self::Help(text) => ParseOutcome::Help(text),
            Self::Version(text) => ParseOutcome::Version(text),
        }
    }
}

enum Flow {
    Scan,
    /// Input is finished; required positionals are still checked.
    Halt,
    /// A stop-early option was seen; nothing else is checked.
    Stop,
    Early(Early),
}

/// Parse one command level into a fresh instance.
///
/// `ancestors` holds the names of the enclosing commands, root first.
pub(crate) fn run<T>(
    definition: &Definition<T>,
    tokens: &mut Tokens,
    ancestors: &[String],
) -> Result<ParseOutcome<T>, ParseError> {
    let mut state = State {
        definition,
        ancestors,
        target: definition.instantiate(),
        next_positional: 0,
        consumed: HashSet::new(),
    };
    tracing::trace!(
        command = definition.descriptors().name(),
        tokens = tokens.len(),
        "parsing command level"
    );

    loop {
        let flow = if tokens.is_empty() {
            Flow::Halt
        } else {
            state.step(tokens)?
        };
        match flow {
            Flow::Scan => continue,
            Flow::Halt => break,
            Flow::Stop => return Ok(ParseOutcome::Parsed(state.target)),
            Flow::Early(early) => return Ok(early.into_outcome()),
        }
    }

    state.check_missing()?;
    Ok(ParseOutcome::Parsed(state.target))
}

struct State<'a, T> {
    definition: &'a Definition<T>,
    ancestors: &'a [String],
    target: T,
    next_positional: usize,
    /// Keys of single-valued options already seen in this parse.
    consumed: HashSet<String>,
}

impl<T> State<'_, T> {
    fn step(&mut self, tokens: &mut Tokens) -> Result<Flow, ParseError> {
        let set = self.definition.descriptors();
        let (separator, option_like) = match tokens.peek() {
            Some(token) => (
                token == SEPARATOR,
                token.starts_with('-') && token.len() > 1,
            ),
            None => return Ok(Flow::Halt),
        };

        if separator {
            tokens.pop();
            return self.after_separator(tokens);
        }
        if option_like {
            return self.option(tokens);
        }
        if self.next_positional < set.positionals().len() {
            return self.positional(tokens);
        }
        if !set.subcommands().is_empty() {
            return self.subcommand(tokens);
        }
        Err(self.error(ParseErrorKind::TooManyArguments))
    }

    fn after_separator(&mut self, tokens: &mut Tokens) -> Result<Flow, ParseError> {
        let set = self.definition.descriptors();
        while !tokens.is_empty() {
            if self.next_positional >= set.positionals().len() {
                return Err(self.error(ParseErrorKind::TooManyArguments));
            }
            if let Flow::Halt = self.positional(tokens)? {
                break;
            }
        }
        Ok(Flow::Halt)
    }

    fn option(&mut self, tokens: &mut Tokens) -> Result<Flow, ParseError> {
        let definition = self.definition;
        let set = definition.descriptors();
        let Some(key) = tokens.pop() else {
            return Ok(Flow::Halt);
        };
        let Some((idx, opt)) = set.option(&key) else {
            return Err(self.error(ParseErrorKind::UnknownOptionKey(key)));
        };
        tracing::trace!(key = %key, prop = opt.prop(), "option");

        match &definition.bindings.options[idx] {
            OptionAction::Help => {
                tokens.discard();
                let text = help::render(set, self.ancestors);
                return Ok(Flow::Early(Early::Help(text)));
            }
            OptionAction::Version => {
                tokens.discard();
                let text = help::version(set).unwrap_or_else(|| set.name().to_string());
                return Ok(Flow::Early(Early::Version(text)));
            }
            OptionAction::Flag(mark) => mark(&mut self.target),
            OptionAction::Value(setter) => {
                let Some(token) = tokens.pop() else {
                    return Err(self.error(ParseErrorKind::MissingOptionValue(key)));
                };
                setter(&mut self.target, &token)
                    .map_err(|msg| self.error(ParseErrorKind::InvalidArgument(msg)))?;
            }
        }

        if !opt.multiple() {
            if let Some(seen) = opt.keys().find(|k| self.consumed.contains(*k)) {
                let seen = seen.to_string();
                return Err(self.error(ParseErrorKind::DuplicateOptionValue(seen)));
            }
            self.consumed.extend(opt.keys().map(str::to_string));
        }

        if opt.stop_early() {
            tracing::debug!(key = %key, "stop-early option, halting");
            tokens.discard();
            return Ok(Flow::Stop);
        }
        Ok(Flow::Scan)
    }

    fn positional(&mut self, tokens: &mut Tokens) -> Result<Flow, ParseError> {
        let definition = self.definition;
        let idx = self.next_positional;
        self.next_positional += 1;

        match &definition.bindings.positionals[idx] {
            PositionalAction::Single(setter) => {
                let Some(token) = tokens.pop() else {
                    return Ok(Flow::Halt);
                };
                setter(&mut self.target, &token)
                    .map_err(|msg| self.error(ParseErrorKind::InvalidArgument(msg)))?;
                Ok(Flow::Scan)
            }
            PositionalAction::Rest(setter) => {
                let rest = tokens.drain_rest();
                tracing::trace!(count = rest.len(), "rest arguments");
                setter(&mut self.target, &rest)
                    .map_err(|msg| self.error(ParseErrorKind::InvalidArgument(msg)))?;
                Ok(Flow::Halt)
            }
        }
    }

    fn subcommand(&mut self, tokens: &mut Tokens) -> Result<Flow, ParseError> {
        let definition = self.definition;
        let set = definition.descriptors();
        let Some(name) = tokens.pop() else {
            return Ok(Flow::Halt);
        };
        let Some((idx, sub)) = set.subcommand(&name) else {
            return Err(self.error(ParseErrorKind::UnknownCommandName(name)));
        };
        tracing::debug!(command = set.name(), subcommand = sub.name(), "dispatching");

        let mut chain = self.ancestors.to_vec();
        chain.push(set.name().to_string());
        let dispatch = &definition.bindings.subcommands[idx];
        match dispatch(&mut self.target, tokens, &chain)? {
            Some(early) => Ok(Flow::Early(early)),
            None => Ok(Flow::Halt),
        }
    }

    fn check_missing(&self) -> Result<(), ParseError> {
        let set = self.definition.descriptors();
        let missing: Vec<String> = set.positionals()[self.next_positional..]
            .iter()
            .filter(|arg| arg.kind() == PositionalKind::Required)
            .map(|arg| arg.name().to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(self.error(ParseErrorKind::MissingArguments(missing)))
        }
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        tracing::debug!(command = self.definition.descriptors().name(), error = %kind, "parse failed");
        ParseError::new(kind, self.definition.descriptors(), self.ancestors)
    }
}
