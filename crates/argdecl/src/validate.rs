use std::collections::HashSet;

use crate::descriptor::{DescriptorSet, PositionalKind};
use crate::error::DefinitionError;

/// `--[a-zA-Z0-9]{2,}(-[a-zA-Z0-9]+)*`
pub fn is_long_key(key: &str) -> bool {
    let Some(body) = key.strip_prefix("--") else {
        return false;
    };
    let mut segments = body.split('-');
    let head_ok = segments
        .next()
        .is_some_and(|head| head.len() >= 2 && is_alnum(head));
    head_ok && segments.all(|seg| !seg.is_empty() && is_alnum(seg))
}

/// `-[a-zA-Z0-9]`
pub fn is_short_key(key: &str) -> bool {
    let bytes = key.as_bytes();
    bytes.len() == 2 && bytes[0] == b'-' && bytes[1].is_ascii_alphanumeric()
}

fn is_alnum(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_alphanumeric())
}

pub(crate) fn check(set: &DescriptorSet) -> Result<(), DefinitionError> {
    tracing::debug!(command = set.name(), "validating descriptor set");

    check_option_keys(set)?;
    check_positionals(set)?;

    if !set.positionals().is_empty() && !set.subcommands().is_empty() {
        return Err(DefinitionError::ArgAndSubcommandBothDefined {
            type_name: set.type_name().to_string(),
        });
    }

    check_subcommands(set)
}

fn check_option_keys(set: &DescriptorSet) -> Result<(), DefinitionError> {
    for opt in set.options() {
        if opt.long().is_none() && opt.short().is_none() {
            return Err(DefinitionError::IndeterminateOptionKey {
                loc: set.location(opt.prop()),
            });
        }
    }

    for opt in set.options() {
        let invalid = opt
            .long()
            .filter(|key| !is_long_key(key))
            .or_else(|| opt.short().filter(|key| !is_short_key(key)));
        if let Some(key) = invalid {
            return Err(DefinitionError::InvalidOptionKey {
                loc: set.location(opt.prop()),
                key: key.to_string(),
            });
        }
    }

    let mut keys = HashSet::new();
    for opt in set.options() {
        for key in opt.keys() {
            if !keys.insert(key) {
                return Err(DefinitionError::DuplicateOptionKey {
                    loc: set.location(opt.prop()),
                    key: key.to_string(),
                });
            }
        }
    }

    Ok(())
}

fn check_positionals(set: &DescriptorSet) -> Result<(), DefinitionError> {
    let args = set.positionals();
    let first_not_required = args
        .iter()
        .position(|arg| arg.kind() != PositionalKind::Required)
        .unwrap_or(args.len());
    let tail = &args[first_not_required..];

    if let Some(arg) = tail.iter().find(|arg| arg.kind() == PositionalKind::Required) {
        return Err(DefinitionError::RequiredAfterOptional {
            loc: set.location(arg.prop()),
        });
    }

    let before_last = &tail[..tail.len().saturating_sub(1)];
    if let Some(arg) = before_last.iter().find(|arg| arg.kind() == PositionalKind::Rest) {
        return Err(DefinitionError::RestBeforeLast {
            loc: set.location(arg.prop()),
        });
    }

    Ok(())
}

fn check_subcommands(set: &DescriptorSet) -> Result<(), DefinitionError> {
    let mut names = HashSet::new();
    for sub in set.subcommands() {
        if !names.insert(sub.name()) {
            return Err(DefinitionError::DuplicateCommandName {
                loc: set.location(sub.prop()),
                name: sub.name().to_string(),
            });
        }
    }

    for sub in set.subcommands() {
        sub.descriptors().validate()?;
    }

    Ok(())
}
