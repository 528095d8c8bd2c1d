//! Serializable model of argdecl command declarations.
//!
//! A [`CommandSchema`] mirrors a [`DescriptorSet`] (and, recursively, its
//! subcommands) as plain serde data. Exported schemas are wrapped in a
//! versioned [`SchemaDocumentV1`] envelope.

use argdecl::{Builtin, DescriptorSet, PositionalKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The only `format-version` this crate reads and writes.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported format-version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

fn boolean_tag() -> String {
    "boolean".to_string()
}

fn string_tag() -> String {
    "string".to_string()
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuiltinSchema {
    Help,
    Version,
}

impl From<Builtin> for BuiltinSchema {
    fn from(builtin: Builtin) -> Self {
        match builtin {
            Builtin::Help => Self::Help,
            Builtin::Version => Self::Version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OptionSchema {
    pub prop: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub about: String,
    /// Decoder name; `boolean` for options that take no value.
    #[serde(rename = "type", default = "boolean_tag")]
    pub value_type: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub multiple: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub stop_early: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builtin: Option<BuiltinSchema>,
}

impl OptionSchema {
    pub fn takes_value(&self) -> bool {
        self.value_type != "boolean"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArgKind {
    Required,
    Optional,
    Rest,
}

impl From<PositionalKind> for ArgKind {
    fn from(kind: PositionalKind) -> Self {
        match kind {
            PositionalKind::Required => Self::Required,
            PositionalKind::Optional => Self::Optional,
            PositionalKind::Rest => Self::Rest,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArgSchema {
    pub prop: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub about: String,
    pub kind: ArgKind,
    #[serde(rename = "type", default = "string_tag")]
    pub value_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommandEntry {
    pub prop: String,
    pub command: CommandSchema,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct CommandSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<ArgSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandEntry>,
}

impl CommandSchema {
    /// Snapshot a descriptor set and all of its subcommands.
    pub fn from_descriptors(set: &DescriptorSet) -> Self {
        Self {
            name: set.name().to_string(),
            type_name: set.type_name().to_string(),
            about: set.about().map(str::to_string),
            version: set.version().map(str::to_string),
            options: set
                .options()
                .iter()
                .map(|opt| OptionSchema {
                    prop: opt.prop().to_string(),
                    long: opt.long().map(str::to_string),
                    short: opt.short().map(str::to_string),
                    about: opt.about().to_string(),
                    value_type: opt.type_tag().to_string(),
                    multiple: opt.multiple(),
                    stop_early: opt.stop_early(),
                    builtin: opt.builtin().map(BuiltinSchema::from),
                })
                .collect(),
            args: set
                .positionals()
                .iter()
                .map(|arg| ArgSchema {
                    prop: arg.prop().to_string(),
                    name: arg.name().to_string(),
                    about: arg.about().to_string(),
                    kind: arg.kind().into(),
                    value_type: arg.type_tag().to_string(),
                })
                .collect(),
            commands: set
                .subcommands()
                .iter()
                .map(|sub| CommandEntry {
                    prop: sub.prop().to_string(),
                    command: Self::from_descriptors(sub.descriptors()),
                })
                .collect(),
        }
    }
}

/// Versioned envelope for an exported [`CommandSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SchemaDocumentV1 {
    pub format_version: u32,
    pub command: CommandSchema,
}

impl SchemaDocumentV1 {
    pub fn new(command: CommandSchema) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            command,
        }
    }

    pub fn from_descriptors(set: &DescriptorSet) -> Self {
        Self::new(CommandSchema::from_descriptors(set))
    }

    /// Pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let doc: Self = serde_json::from_str(json)?;
        if doc.format_version != FORMAT_VERSION {
            return Err(SchemaError::UnsupportedVersion {
                found: doc.format_version,
                expected: FORMAT_VERSION,
            });
        }
        Ok(doc)
    }
}
