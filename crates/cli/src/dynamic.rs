//! Definitions built at runtime from a [`CommandSchema`].
//!
//! Parsed values land in a [`Values`] map keyed by property name instead of
//! typed struct fields.

use std::sync::Arc;

use argdecl::decode::{self, Decoder};
use argdecl::{Arg, Declaration, Definition, Opt};
use argdecl_metadata::{ArgKind, BuiltinSchema, CommandSchema, OptionSchema};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Decodes by type tag: `number` and `integer` become JSON numbers, every
/// other tag keeps the token as a string.
#[derive(Debug, Clone)]
pub struct JsonDecoder {
    tag: String,
}

impl JsonDecoder {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl Decoder for JsonDecoder {
    type Value = Value;

    fn name(&self) -> &str {
        &self.tag
    }

    fn decode(&self, token: &str) -> Result<Value, String> {
        match self.tag.as_str() {
            "number" => decode::number().decode(token).map(Value::from),
            "integer" => decode::parsed::<i64>("integer")
                .decode(token)
                .map(Value::from),
            _ => Ok(Value::String(token.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Values {
    fields: IndexMap<String, Value>,
    lists: IndexMap<String, Vec<Value>>,
    command: Option<Box<Selected>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selected {
    prop: String,
    name: String,
    values: Values,
}

impl Values {
    fn field(&mut self, prop: &str) -> &mut Value {
        self.fields.entry(prop.to_string()).or_insert(Value::Null)
    }

    fn list(&mut self, prop: &str) -> &mut Vec<Value> {
        self.lists.entry(prop.to_string()).or_default()
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (prop, value) in &self.fields {
            map.insert(prop.clone(), value.clone());
        }
        for (prop, values) in &self.lists {
            map.insert(prop.clone(), Value::Array(values.clone()));
        }
        if let Some(selected) = &self.command {
            let mut entry = Map::new();
            entry.insert("name".to_string(), Value::String(selected.name.clone()));
            entry.insert("values".to_string(), selected.values.to_json());
            map.insert(selected.prop.clone(), Value::Object(entry));
        }
        Value::Object(map)
    }
}

/// Build a definition for `schema` and, recursively, its subcommands.
///
/// The result is not validated here; call [`Definition::validate`].
pub fn build_definition(schema: &CommandSchema) -> Definition<Values> {
    let type_name = if schema.type_name.is_empty() {
        schema.name.as_str()
    } else {
        schema.type_name.as_str()
    };
    let mut decl = Declaration::<Values>::new(type_name).name(schema.name.clone());
    if let Some(about) = &schema.about {
        decl = decl.about(about.clone());
    }

    for opt in &schema.options {
        decl = match opt.builtin {
            Some(BuiltinSchema::Help) => decl.help(),
            Some(BuiltinSchema::Version) => match &schema.version {
                Some(version) => decl.version(version.clone()),
                None => {
                    tracing::warn!(
                        command = %schema.name,
                        "version option declared without a version, skipping it"
                    );
                    decl
                }
            },
            None => declare_option(decl, opt),
        };
    }

    for arg in &schema.args {
        let prop = arg.prop.clone();
        let declared = Arg::new(arg.prop.clone())
            .name(arg.name.clone())
            .about(arg.about.clone());
        let decoder = JsonDecoder::new(arg.value_type.clone());
        decl = match arg.kind {
            ArgKind::Required => decl.arg(declared, decoder, move |v: &mut Values| v.field(&prop)),
            ArgKind::Optional => {
                decl.arg(declared.optional(), decoder, move |v: &mut Values| v.field(&prop))
            }
            ArgKind::Rest => decl.rest(declared, decoder, move |v: &mut Values| v.list(&prop)),
        };
    }

    for entry in &schema.commands {
        let child = Arc::new(build_definition(&entry.command));
        let prop = entry.prop.clone();
        let name = entry.command.name.clone();
        decl = decl.subcommand_with(entry.prop.clone(), child, move |parent: &mut Values, values| {
            parent.command = Some(Box::new(Selected {
                prop: prop.clone(),
                name: name.clone(),
                values,
            }));
        });
    }

    decl.build(Values::default)
}

fn declare_option(decl: Declaration<Values>, schema: &OptionSchema) -> Declaration<Values> {
    let mut opt = Opt::new(schema.prop.clone()).about(schema.about.clone());
    opt = match &schema.long {
        Some(long) => opt.long(long.clone()),
        None => opt.no_long(),
    };
    opt = match &schema.short {
        Some(short) => opt.short(short.clone()),
        None => opt.no_short(),
    };
    if schema.stop_early {
        opt = opt.stop_early();
    }

    let prop = schema.prop.clone();
    if !schema.takes_value() {
        return if schema.multiple {
            decl.flags(opt, move |v: &mut Values| v.list(&prop))
        } else {
            decl.flag(opt, move |v: &mut Values| v.field(&prop))
        };
    }
    let decoder = JsonDecoder::new(schema.value_type.clone());
    if schema.multiple {
        decl.options(opt, decoder, move |v: &mut Values| v.list(&prop))
    } else {
        decl.option(opt, decoder, move |v: &mut Values| v.field(&prop))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argdecl::{Command, ParseOutcome};
    use argdecl_metadata::SchemaDocumentV1;
    use serde_json::json;

    use crate::demo::Pkg;

    fn demo_definition() -> Definition<Values> {
        let doc = SchemaDocumentV1::from_descriptors(Pkg::definition().descriptors());
        build_definition(&doc.command)
    }

    fn parsed(def: &Definition<Values>, argv: &[&str]) -> Value {
        match def.parse(argv.iter().copied()) {
            Ok(ParseOutcome::Parsed(values)) => values.to_json(),
            Ok(other) => panic!("expected values for {argv:?}, got {other:?}"),
            Err(err) => panic!("parse of {argv:?} failed: {err}"),
        }
    }

    fn help_of(outcome: argdecl::Result<ParseOutcome<impl std::fmt::Debug>>) -> String {
        match outcome {
            Ok(ParseOutcome::Help(text)) => text,
            other => panic!("expected help, got {other:?}"),
        }
    }

    #[test]
    fn decoder_follows_type_tag() {
        assert_eq!(JsonDecoder::new("number").decode("1.5"), Ok(json!(1.5)));
        assert_eq!(JsonDecoder::new("integer").decode("7"), Ok(json!(7)));
        assert_eq!(
            JsonDecoder::new("integer").decode("7.5"),
            Err("argument \"7.5\" cannot be parsed into integer".to_string())
        );
        assert_eq!(JsonDecoder::new("path").decode("a/b"), Ok(json!("a/b")));
        assert_eq!(JsonDecoder::new("path").name(), "path");
    }

    #[test]
    fn schema_definition_renders_identical_help() {
        let def = demo_definition();
        assert_eq!(def.validate(), Ok(()));
        assert_eq!(def.help(), Pkg::help());

        for path in [["install", "--help"], ["search", "-h"]] {
            assert_eq!(help_of(def.parse(path)), help_of(Pkg::parse(path)));
        }
    }

    #[test]
    fn values_follow_schema() {
        let def = demo_definition();
        assert_eq!(
            parsed(&def, &["-v", "install", "-j", "4", "serde", "tokio"]),
            json!({
                "verbose": true,
                "command": {
                    "name": "install",
                    "values": {
                        "jobs": 4,
                        "packages": ["serde", "tokio"]
                    }
                }
            })
        );
    }

    #[test]
    fn unset_values_are_absent_and_lists_empty() {
        let def = demo_definition();
        assert_eq!(
            parsed(&def, &["search", "json"]),
            json!({
                "command": {
                    "name": "search",
                    "values": { "query": "json", "registry": [] }
                }
            })
        );
    }

    fn schema(value: Value) -> CommandSchema {
        serde_json::from_value(value).expect("valid command schema")
    }

    #[test]
    fn repeatable_flag_collects_every_occurrence() {
        let def = build_definition(&schema(json!({
            "name": "app",
            "options": [{ "prop": "verbose", "short": "-v", "multiple": true }]
        })));
        assert_eq!(def.validate(), Ok(()));
        assert_eq!(
            parsed(&def, &["-v", "-v", "-v"]),
            json!({ "verbose": [true, true, true] })
        );
        assert_eq!(parsed(&def, &[]), json!({ "verbose": [] }));
    }

    #[test]
    fn version_option_without_version_is_skipped() {
        let def = build_definition(&schema(json!({
            "name": "app",
            "options": [
                { "prop": "help", "long": "--help", "short": "-h", "stop-early": true, "builtin": "help" },
                { "prop": "version", "long": "--version", "short": "-V", "stop-early": true, "builtin": "version" }
            ]
        })));
        assert!(def.descriptors().option("--version").is_none());
        assert!(!def.help().contains("--version"));
        match def.parse(["--version"]) {
            Err(argdecl::Error::Parse(err)) => assert_eq!(
                err.kind(),
                &argdecl::ParseErrorKind::UnknownOptionKey("--version".to_string())
            ),
            other => panic!("expected an unknown option, got {other:?}"),
        }
    }
}
