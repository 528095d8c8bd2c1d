//! The descriptor model: plain data describing one command level.
//!
//! A [`DescriptorSet`] holds no reference to the Rust type it describes. The
//! typed half (how to write a decoded value into a field) lives next to it
//! in a [`Definition`](crate::Definition), so validation, help rendering and
//! schema export can all work on the plain data alone.

use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;

use crate::error::DefinitionError;
use crate::validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionalKind {
    Required,
    Optional,
    Rest,
}

impl PositionalKind {
    /// Usage notation: `<name>`, `[name]` or `[name]...`.
    pub fn notation(self, name: &str) -> String {
        match self {
            Self::Required => format!("<{name}>"),
            Self::Optional => format!("[{name}]"),
            Self::Rest => format!("[{name}]..."),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Optional => "optional",
            Self::Rest => "rest",
        }
    }
}

/// Options whose action is provided by the library itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Help,
    Version,
}

impl Builtin {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Version => "version",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDescriptor {
    pub(crate) about: String,
    pub(crate) prop: String,
    pub(crate) long: Option<String>,
    pub(crate) short: Option<String>,
    pub(crate) multiple: bool,
    pub(crate) stop_early: bool,
    pub(crate) takes_value: bool,
    pub(crate) type_tag: String,
    pub(crate) builtin: Option<Builtin>,
}

impl OptionDescriptor {
    pub fn about(&self) -> &str {
        &self.about
    }

    pub fn prop(&self) -> &str {
        &self.prop
    }

    pub fn long(&self) -> Option<&str> {
        self.long.as_deref()
    }

    pub fn short(&self) -> Option<&str> {
        self.short.as_deref()
    }

    pub fn multiple(&self) -> bool {
        self.multiple
    }

    pub fn stop_early(&self) -> bool {
        self.stop_early
    }

    /// `false` for boolean options: presence alone sets them.
    pub fn takes_value(&self) -> bool {
        self.takes_value
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// Set for the `--help` and `--version` options added by the declaration.
    pub fn builtin(&self) -> Option<Builtin> {
        self.builtin
    }

    /// Long key first, then short key.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.long().into_iter().chain(self.short())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionalDescriptor {
    pub(crate) about: String,
    pub(crate) name: String,
    pub(crate) prop: String,
    pub(crate) kind: PositionalKind,
    pub(crate) type_tag: String,
}

impl PositionalDescriptor {
    pub fn about(&self) -> &str {
        &self.about
    }

    /// Display name used in usage and in `MissingArguments`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prop(&self) -> &str {
        &self.prop
    }

    pub fn kind(&self) -> PositionalKind {
        self.kind
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn notation(&self) -> String {
        self.kind.notation(&self.name)
    }
}

#[derive(Debug, Clone)]
pub struct SubcommandDescriptor {
    pub(crate) prop: String,
    pub(crate) descriptors: Arc<DescriptorSet>,
}

impl SubcommandDescriptor {
    pub fn prop(&self) -> &str {
        &self.prop
    }

    /// The name the user types to select this subcommand.
    pub fn name(&self) -> &str {
        self.descriptors.name()
    }

    pub fn descriptors(&self) -> &Arc<DescriptorSet> {
        &self.descriptors
    }
}

/// Everything declared for one command type.
///
/// Immutable once built. Validation runs on first use and its result is
/// cached, so a set can be shared between threads and parsed against
/// repeatedly.
#[derive(Debug)]
pub struct DescriptorSet {
    name: String,
    type_name: String,
    about: Option<String>,
    version: Option<String>,
    options: Vec<OptionDescriptor>,
    option_map: IndexMap<String, usize>,
    positionals: Vec<PositionalDescriptor>,
    subcommands: Vec<SubcommandDescriptor>,
    subcommand_map: IndexMap<String, usize>,
    validation: OnceLock<Result<(), DefinitionError>>,
}

pub(crate) struct Parts {
    pub name: String,
    pub type_name: String,
    pub about: Option<String>,
    pub version: Option<String>,
    pub options: Vec<OptionDescriptor>,
    pub positionals: Vec<PositionalDescriptor>,
    pub subcommands: Vec<SubcommandDescriptor>,
}

impl DescriptorSet {
    pub(crate) fn new(parts: Parts) -> Self {
        // First declaration wins. Duplicates are reported by validation.
        let mut option_map = IndexMap::new();
        for (idx, opt) in parts.options.iter().enumerate() {
            for key in opt.short().into_iter().chain(opt.long()) {
                option_map.entry(key.to_string()).or_insert(idx);
            }
        }

        let mut subcommand_map = IndexMap::new();
        for (idx, sub) in parts.subcommands.iter().enumerate() {
            subcommand_map.entry(sub.name().to_string()).or_insert(idx);
        }

        Self {
            name: parts.name,
            type_name: parts.type_name,
            about: parts.about,
            version: parts.version,
            options: parts.options,
            option_map,
            positionals: parts.positionals,
            subcommands: parts.subcommands,
            subcommand_map,
            validation: OnceLock::new(),
        }
    }

    /// Display name: explicit override or kebab-cased type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the declaring type, used in definition error locations.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn about(&self) -> Option<&str> {
        self.about.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn options(&self) -> &[OptionDescriptor] {
        &self.options
    }

    /// Look up an option by `--long` or `-s` key.
    pub fn option(&self, key: &str) -> Option<(usize, &OptionDescriptor)> {
        self.option_map
            .get(key)
            .map(|&idx| (idx, &self.options[idx]))
    }

    pub fn positionals(&self) -> &[PositionalDescriptor] {
        &self.positionals
    }

    pub fn subcommands(&self) -> &[SubcommandDescriptor] {
        &self.subcommands
    }

    pub fn subcommand(&self, name: &str) -> Option<(usize, &SubcommandDescriptor)> {
        self.subcommand_map
            .get(name)
            .map(|&idx| (idx, &self.subcommands[idx]))
    }

    /// Validate this set and, recursively, every subcommand's set.
    ///
    /// Runs once; later calls return the cached outcome.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        self.validation
            .get_or_init(|| validate::check(self))
            .clone()
    }

    /// `Type.prop` location for definition errors.
    pub(crate) fn location(&self, prop: &str) -> String {
        format!("{}.{}", self.type_name, prop)
    }
}
