//! Help text generation.
//!
//! Output layout:
//!
//! ```text
//! app - about text
//!
//! USAGE
//!     app [OPTIONS] <input>
//!
//! OPTIONS
//!     -s, --str <string>    about text
//!
//! ARGS
//!     <input>    about text
//! ```
//!
//! A section with no rows is left out.

use crate::descriptor::DescriptorSet;
use crate::text;

/// Shown in the COMMANDS block for subcommands declared without about text.
pub const NO_HELP_TEXT: &str = "(NO HELP TEXT)";

/// Render help for `set`, reached through `ancestors` (root first, not
/// including `set` itself).
pub fn render(set: &DescriptorSet, ancestors: &[String]) -> String {
    let mut lines = vec![title(set), String::new(), "USAGE".to_string()];
    lines.extend(text::indent([usage(set, ancestors)]));

    let options = option_rows(set);
    let commands = command_rows(set);
    let args = arg_rows(set);
    for (heading, rows) in [("OPTIONS", options), ("COMMANDS", commands), ("ARGS", args)] {
        if rows.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(heading.to_string());
        lines.extend(text::indent(text::table(&rows)));
    }

    lines.join("\n")
}

/// `name` or `name - about`.
pub fn title(set: &DescriptorSet) -> String {
    match set.about().map(str::trim).filter(|about| !about.is_empty()) {
        Some(about) => format!("{} - {}", set.name(), about),
        None => set.name().to_string(),
    }
}

/// The USAGE line without indentation.
pub fn usage(set: &DescriptorSet, ancestors: &[String]) -> String {
    let mut parts: Vec<String> = ancestors.to_vec();
    parts.push(set.name().to_string());
    if !set.options().is_empty() {
        parts.push("[OPTIONS]".to_string());
    }
    if !set.positionals().is_empty() {
        parts.extend(set.positionals().iter().map(|arg| arg.notation()));
    } else if !set.subcommands().is_empty() {
        parts.push("<SUBCOMMAND>".to_string());
    }
    parts.join(" ")
}

/// `<name> <version>`, if a version was declared.
pub fn version(set: &DescriptorSet) -> Option<String> {
    set.version()
        .map(|version| format!("{} {}", set.name(), version))
}

fn option_rows(set: &DescriptorSet) -> Vec<(String, String)> {
    set.options()
        .iter()
        .map(|opt| {
            let mut left = opt
                .short()
                .into_iter()
                .chain(opt.long())
                .collect::<Vec<_>>()
                .join(", ");
            if opt.takes_value() {
                left.push_str(&format!(" <{}>", opt.type_tag()));
            }
            (left, opt.about().to_string())
        })
        .collect()
}

fn command_rows(set: &DescriptorSet) -> Vec<(String, String)> {
    set.subcommands()
        .iter()
        .map(|sub| {
            let about = sub
                .descriptors()
                .about()
                .filter(|about| !about.trim().is_empty())
                .unwrap_or(NO_HELP_TEXT);
            (sub.name().to_string(), about.to_string())
        })
        .collect()
}

fn arg_rows(set: &DescriptorSet) -> Vec<(String, String)> {
    set.positionals()
        .iter()
        .map(|arg| (arg.notation(), arg.about().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declare::{Arg, Declaration, Opt};
    use crate::decode;

    #[derive(Default)]
    struct Tool {
        text: String,
        flag: bool,
        input: String,
        extra: Vec<String>,
    }

    #[test]
    fn renders_every_section() {
        let def = Declaration::<Tool>::new("Tool")
            .about("does things")
            .option(
                Opt::new("str").short("s").about("a string"),
                decode::string(),
                |t| &mut t.text,
            )
            .flag(Opt::new("flag").about("a flag"), |t| &mut t.flag)
            .arg(Arg::new("input").about("the input"), decode::string(), |t| &mut t.input)
            .rest(Arg::new("extra"), decode::string(), |t| &mut t.extra)
            .build(Tool::default);

        let expected = [
            "tool - does things",
            "",
            "USAGE",
            "    tool [OPTIONS] <input> [extra]...",
            "",
            "OPTIONS",
            "    -s, --str <string>    a string",
            "    --flag                a flag",
            "",
            "ARGS",
            "    <input>       the input",
            "    [extra]...",
        ]
        .join("\n");
        assert_eq!(render(def.descriptors(), &[]), expected);
    }

    #[test]
    fn bare_command_has_title_and_usage_only() {
        let def = Declaration::<Tool>::new("Tool").build(Tool::default);
        assert_eq!(
            render(def.descriptors(), &["root".to_string()]),
            "tool\n\nUSAGE\n    root tool"
        );
    }

    #[test]
    fn version_line() {
        let def = Declaration::<Tool>::new("Tool")
            .version("1.2.3")
            .build(Tool::default);
        assert_eq!(version(def.descriptors()).as_deref(), Some("tool 1.2.3"));
        let plain = Declaration::<Tool>::new("Tool").build(Tool::default);
        assert_eq!(version(plain.descriptors()), None);
    }
}
