//! Declaring commands.
//!
//! A [`Declaration`] collects descriptors and, for each one, a closure that
//! knows how to write a decoded value into a field of the target type. The
//! result is a [`Definition`]: an immutable [`DescriptorSet`] plus the typed
//! setters the parser drives.
//!
//! ```
//! use argdecl::{Arg, Declaration, Opt, ParseOutcome, decode};
//!
//! #[derive(Debug, Default)]
//! struct Cp {
//!     verbose: bool,
//!     exclude: Vec<String>,
//!     src: String,
//!     dst: Option<String>,
//! }
//!
//! let def = Declaration::<Cp>::new("Cp")
//!     .about("Copy files")
//!     .flag(Opt::new("verbose").short("v"), |c| &mut c.verbose)
//!     .options(Opt::new("exclude").short("x"), decode::string(), |c| &mut c.exclude)
//!     .arg(Arg::new("src"), decode::string(), |c| &mut c.src)
//!     .arg(Arg::new("dst").optional(), decode::string(), |c| &mut c.dst)
//!     .build(Cp::default);
//!
//! let ParseOutcome::Parsed(copy) = def.parse(["-v", "a.txt"]).unwrap() else {
//!     panic!("expected a parsed instance");
//! };
//! assert!(copy.verbose);
//! assert_eq!(copy.src, "a.txt");
//! assert_eq!(copy.dst, None);
//! ```

use std::sync::Arc;

use crate::command::Command;
use crate::decode::{self, Decoder};
use crate::descriptor::{
    Builtin, DescriptorSet, OptionDescriptor, Parts, PositionalDescriptor, PositionalKind,
    SubcommandDescriptor,
};
use crate::error::{self, DefinitionError, ParseError};
use crate::help;
use crate::naming;
use crate::parser::{self, Early, ParseOutcome};
use crate::registry;
use crate::tokenize::Tokens;

type Setter<T> = Box<dyn Fn(&mut T, &str) -> Result<(), String> + Send + Sync>;
type RestSetter<T> = Box<dyn Fn(&mut T, &[String]) -> Result<(), String> + Send + Sync>;
type Mark<T> = Box<dyn Fn(&mut T) + Send + Sync>;
type Reset<T> = Box<dyn Fn(&mut T) + Send + Sync>;
pub(crate) type Dispatch<T> =
    Box<dyn Fn(&mut T, &mut Tokens, &[String]) -> Result<Option<Early>, ParseError> + Send + Sync>;

pub(crate) enum OptionAction<T> {
    Flag(Mark<T>),
    Value(Setter<T>),
    Help,
    Version,
}

pub(crate) enum PositionalAction<T> {
    Single(Setter<T>),
    Rest(RestSetter<T>),
}

/// Typed field setters, index-aligned with the descriptor set's lists.
pub(crate) struct Bindings<T> {
    pub options: Vec<OptionAction<T>>,
    pub positionals: Vec<PositionalAction<T>>,
    pub subcommands: Vec<Dispatch<T>>,
    /// Run on every fresh instance before parsing; clears list fields.
    pub resets: Vec<Reset<T>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Key {
    Derived,
    /// First character of the long key.
    FromLong,
    Explicit(String),
    Disabled,
}

/// An option declaration.
///
/// Keys are derived from the property name unless set explicitly: a
/// property longer than one character gets `--kebab-name`, a single
/// character property gets `-c`.
#[derive(Debug, Clone)]
pub struct Opt {
    prop: String,
    about: String,
    long: Key,
    short: Key,
    stop_early: bool,
}

impl Opt {
    pub fn new(prop: impl Into<String>) -> Self {
        Self {
            prop: prop.into(),
            about: String::new(),
            long: Key::Derived,
            short: Key::Derived,
            stop_early: false,
        }
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = about.into();
        self
    }

    /// `"name"` and `"--name"` are both accepted.
    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long = Key::Explicit(normalize_long(&long.into()));
        self
    }

    /// `"n"` and `"-n"` are both accepted.
    pub fn short(mut self, short: impl Into<String>) -> Self {
        self.short = Key::Explicit(normalize_short(&short.into()));
        self
    }

    /// Short key taken from the first character of the long key, so
    /// `--short-key` gets `-s`.
    pub fn short_derived(mut self) -> Self {
        self.short = Key::FromLong;
        self
    }

    pub fn no_long(mut self) -> Self {
        self.long = Key::Disabled;
        self
    }

    pub fn no_short(mut self) -> Self {
        self.short = Key::Disabled;
        self
    }

    /// Halt parsing once this option is seen, skipping missing-argument
    /// checks.
    pub fn stop_early(mut self) -> Self {
        self.stop_early = true;
        self
    }

    fn keys(&self) -> (Option<String>, Option<String>) {
        let single = self.prop.chars().count() == 1;
        let long = match &self.long {
            Key::Explicit(key) => Some(key.clone()),
            Key::Derived if !single && !self.prop.is_empty() => {
                Some(format!("--{}", naming::kebabify(&self.prop)))
            }
            Key::Derived | Key::FromLong | Key::Disabled => None,
        };
        let short = match &self.short {
            Key::Explicit(key) => Some(key.clone()),
            Key::Derived if single => Some(format!("-{}", self.prop)),
            Key::FromLong => long
                .as_deref()
                .map(|key| key.trim_start_matches('-'))
                .or(single.then_some(self.prop.as_str()))
                .and_then(|source| source.chars().next())
                .map(|c| format!("-{c}")),
            Key::Derived | Key::Disabled => None,
        };
        (long, short)
    }

    fn into_descriptor(self, multiple: bool, type_tag: Option<&str>) -> OptionDescriptor {
        let (long, short) = self.keys();
        OptionDescriptor {
            about: self.about,
            prop: self.prop,
            long,
            short,
            multiple,
            stop_early: self.stop_early,
            takes_value: type_tag.is_some(),
            type_tag: type_tag.unwrap_or(decode::BOOLEAN).to_string(),
            builtin: None,
        }
    }
}

fn normalize_short(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('-') {
        trimmed.to_string()
    } else {
        format!("-{trimmed}")
    }
}

fn normalize_long(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('-') {
        trimmed.to_string()
    } else {
        format!("--{trimmed}")
    }
}

/// A positional argument declaration. Required unless marked optional.
#[derive(Debug, Clone)]
pub struct Arg {
    prop: String,
    name: Option<String>,
    about: String,
    optional: bool,
}

impl Arg {
    pub fn new(prop: impl Into<String>) -> Self {
        Self {
            prop: prop.into(),
            name: None,
            about: String::new(),
            optional: false,
        }
    }

    /// Display name; defaults to the kebab-cased property.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = about.into();
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    fn into_descriptor(self, kind: PositionalKind, type_tag: &str) -> PositionalDescriptor {
        let name = self
            .name
            .unwrap_or_else(|| naming::kebabify(&self.prop));
        PositionalDescriptor {
            about: self.about,
            name: if name.is_empty() { "input".to_string() } else { name },
            prop: self.prop,
            kind,
            type_tag: type_tag.to_string(),
        }
    }
}

/// Builder for a [`Definition`].
pub struct Declaration<T> {
    name: String,
    type_name: String,
    about: Option<String>,
    version: Option<String>,
    options: Vec<OptionDescriptor>,
    positionals: Vec<PositionalDescriptor>,
    subcommands: Vec<SubcommandDescriptor>,
    bindings: Bindings<T>,
}

impl<T: 'static> Declaration<T> {
    /// Start a declaration for a type called `type_name`. The display name
    /// defaults to its kebab-case form.
    pub fn new(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self {
            name: naming::kebabify(&type_name),
            type_name,
            about: None,
            version: None,
            options: Vec::new(),
            positionals: Vec::new(),
            subcommands: Vec::new(),
            bindings: Bindings {
                options: Vec::new(),
                positionals: Vec::new(),
                subcommands: Vec::new(),
                resets: Vec::new(),
            },
        }
    }

    /// Start a declaration named after `T` itself.
    pub fn for_type() -> Self {
        Self::new(naming::type_name::<T>())
    }

    /// Override the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    /// Add `-h, --help`. When seen, parsing stops and yields
    /// [`ParseOutcome::Help`].
    pub fn help(mut self) -> Self {
        let opt = Opt::new("help")
            .long("--help")
            .short("-h")
            .about("Prints help information")
            .stop_early();
        self.options.push(OptionDescriptor {
            builtin: Some(Builtin::Help),
            ..opt.into_descriptor(false, None)
        });
        self.bindings.options.push(OptionAction::Help);
        self
    }

    /// Record `version` and add `-V, --version`. When seen, parsing stops
    /// and yields [`ParseOutcome::Version`].
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        let opt = Opt::new("version")
            .long("--version")
            .short("-V")
            .about("Prints version information")
            .stop_early();
        self.options.push(OptionDescriptor {
            builtin: Some(Builtin::Version),
            ..opt.into_descriptor(false, None)
        });
        self.bindings.options.push(OptionAction::Version);
        self
    }

    /// Boolean option: presence writes `true`.
    pub fn flag<S, F>(mut self, opt: Opt, field: F) -> Self
    where
        S: From<bool> + 'static,
        F: Fn(&mut T) -> &mut S + Send + Sync + 'static,
    {
        self.options.push(opt.into_descriptor(false, None));
        self.bindings
            .options
            .push(OptionAction::Flag(Box::new(move |target| {
                *field(target) = S::from(true);
            })));
        self
    }

    /// Repeatable boolean option: every occurrence pushes `true`. The list
    /// is emptied at the start of each parse, so its length counts the
    /// occurrences.
    pub fn flags<S, F>(mut self, opt: Opt, field: F) -> Self
    where
        S: From<bool> + 'static,
        F: Fn(&mut T) -> &mut Vec<S> + Send + Sync + 'static,
    {
        self.options.push(opt.into_descriptor(true, None));
        let field = Arc::new(field);
        let reset = Arc::clone(&field);
        self.bindings
            .resets
            .push(Box::new(move |target| (*reset)(target).clear()));
        self.bindings
            .options
            .push(OptionAction::Flag(Box::new(move |target| {
                (*field)(target).push(S::from(true));
            })));
        self
    }

    /// Single-valued option. Repeating it is a parse error.
    ///
    /// The field may be the decoded type itself or anything convertible
    /// from it, such as `Option<V>`.
    pub fn option<D, S, F>(mut self, opt: Opt, decoder: D, field: F) -> Self
    where
        D: Decoder,
        S: From<D::Value> + 'static,
        F: Fn(&mut T) -> &mut S + Send + Sync + 'static,
    {
        self.options
            .push(opt.into_descriptor(false, Some(decoder.name())));
        self.bindings
            .options
            .push(OptionAction::Value(Box::new(move |target, token| {
                let value = decoder.decode(token)?;
                *field(target) = S::from(value);
                Ok(())
            })));
        self
    }

    /// Repeatable option collecting every value in encounter order. The list
    /// is emptied at the start of each parse.
    pub fn options<D, S, F>(mut self, opt: Opt, decoder: D, field: F) -> Self
    where
        D: Decoder,
        S: From<D::Value> + 'static,
        F: Fn(&mut T) -> &mut Vec<S> + Send + Sync + 'static,
    {
        self.options
            .push(opt.into_descriptor(true, Some(decoder.name())));
        let field = Arc::new(field);
        let reset = Arc::clone(&field);
        self.bindings
            .resets
            .push(Box::new(move |target| (*reset)(target).clear()));
        self.bindings
            .options
            .push(OptionAction::Value(Box::new(move |target, token| {
                let value = decoder.decode(token)?;
                (*field)(target).push(S::from(value));
                Ok(())
            })));
        self
    }

    /// Required or optional positional argument.
    pub fn arg<D, S, F>(mut self, arg: Arg, decoder: D, field: F) -> Self
    where
        D: Decoder,
        S: From<D::Value> + 'static,
        F: Fn(&mut T) -> &mut S + Send + Sync + 'static,
    {
        let kind = if arg.optional {
            PositionalKind::Optional
        } else {
            PositionalKind::Required
        };
        self.positionals
            .push(arg.into_descriptor(kind, decoder.name()));
        self.bindings
            .positionals
            .push(PositionalAction::Single(Box::new(move |target, token| {
                let value = decoder.decode(token)?;
                *field(target) = S::from(value);
                Ok(())
            })));
        self
    }

    /// Variadic positional taking every remaining token. Must be last.
    pub fn rest<D, S, F>(mut self, arg: Arg, decoder: D, field: F) -> Self
    where
        D: Decoder,
        S: From<D::Value> + 'static,
        F: Fn(&mut T) -> &mut Vec<S> + Send + Sync + 'static,
    {
        self.positionals
            .push(arg.into_descriptor(PositionalKind::Rest, decoder.name()));
        let field = Arc::new(field);
        let reset = Arc::clone(&field);
        self.bindings
            .resets
            .push(Box::new(move |target| (*reset)(target).clear()));
        self.bindings
            .positionals
            .push(PositionalAction::Rest(Box::new(move |target, tokens| {
                let values = tokens
                    .iter()
                    .map(|token| decoder.decode(token).map(S::from))
                    .collect::<Result<Vec<_>, _>>()?;
                *(*field)(target) = values;
                Ok(())
            })));
        self
    }

    /// Subcommand backed by the registered definition of `C`.
    ///
    /// `set` receives the parsed `C` and stores it in the parent, typically
    /// as one variant of an enum field.
    pub fn subcommand<C, F>(self, prop: impl Into<String>, set: F) -> Self
    where
        C: Command,
        F: Fn(&mut T, C) + Send + Sync + 'static,
    {
        self.subcommand_with(prop, registry::definition::<C>(), set)
    }

    /// Subcommand backed by an explicit definition.
    pub fn subcommand_with<C, F>(
        mut self,
        prop: impl Into<String>,
        definition: Arc<Definition<C>>,
        set: F,
    ) -> Self
    where
        C: 'static,
        F: Fn(&mut T, C) + Send + Sync + 'static,
    {
        self.subcommands.push(SubcommandDescriptor {
            prop: prop.into(),
            descriptors: Arc::clone(definition.descriptors()),
        });
        self.bindings
            .subcommands
            .push(Box::new(move |target, tokens, ancestors| {
                match parser::run(&definition, tokens, ancestors)? {
                    ParseOutcome::Parsed(value) => {
                        set(target, value);
                        Ok(None)
                    }
                    ParseOutcome::Help(text) => Ok(Some(Early::Help(text))),
                    ParseOutcome::Version(text) => Ok(Some(Early::Version(text))),
                }
            }));
        self
    }

    /// Finish the declaration. `construct` creates the fresh instance each
    /// parse starts from; unset fields keep the values it gives them.
    pub fn build<F>(self, construct: F) -> Definition<T>
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let descriptors = DescriptorSet::new(Parts {
            name: self.name,
            type_name: self.type_name,
            about: self.about,
            version: self.version,
            options: self.options,
            positionals: self.positionals,
            subcommands: self.subcommands,
        });
        Definition {
            descriptors: Arc::new(descriptors),
            bindings: self.bindings,
            construct: Box::new(construct),
        }
    }
}

/// A validated-on-use descriptor set together with its typed setters.
pub struct Definition<T> {
    descriptors: Arc<DescriptorSet>,
    pub(crate) bindings: Bindings<T>,
    construct: Box<dyn Fn() -> T + Send + Sync>,
}

impl<T> Definition<T> {
    pub fn descriptors(&self) -> &Arc<DescriptorSet> {
        &self.descriptors
    }

    pub fn validate(&self) -> Result<(), DefinitionError> {
        self.descriptors.validate()
    }

    pub(crate) fn instantiate(&self) -> T {
        let mut instance = (self.construct)();
        for reset in &self.bindings.resets {
            reset(&mut instance);
        }
        instance
    }

    /// Validate the declaration, then parse `argv` into a fresh instance.
    pub fn parse<I, S>(&self, argv: I) -> error::Result<ParseOutcome<T>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.validate()?;
        let mut tokens = Tokens::from_argv(argv);
        Ok(parser::run(self, &mut tokens, &[])?)
    }

    /// Help text for this command as a root command.
    pub fn help(&self) -> String {
        help::render(&self.descriptors, &[])
    }
}

impl<T> std::fmt::Debug for Definition<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Definition")
            .field("descriptors", &self.descriptors)
            .finish_non_exhaustive()
    }
}
