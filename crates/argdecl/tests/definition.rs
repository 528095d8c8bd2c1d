use std::sync::Arc;

use argdecl::{Arg, Declaration, Definition, DefinitionError, Error, Opt, decode};

#[derive(Debug, Default)]
struct Target {
    a: bool,
    b: bool,
    name: Option<String>,
    first: String,
    second: Option<String>,
    rest: Vec<String>,
}

fn target(type_name: &str) -> Declaration<Target> {
    Declaration::new(type_name)
}

fn leaf(name: &str) -> Arc<Definition<Target>> {
    Arc::new(target("Leaf").name(name).build(Target::default))
}

fn definition_error(def: &Definition<Target>) -> DefinitionError {
    def.validate().expect_err("declaration should be rejected")
}

#[test]
fn valid_declaration_passes() {
    let def = target("Good")
        .help()
        .version("1.0.0")
        .flag(Opt::new("a"), |t| &mut t.a)
        .flag(Opt::new("b").long("bravo"), |t| &mut t.b)
        .option(Opt::new("name").short("n"), decode::string(), |t| &mut t.name)
        .arg(Arg::new("first"), decode::string(), |t| &mut t.first)
        .arg(Arg::new("second").optional(), decode::string(), |t| &mut t.second)
        .rest(Arg::new("rest"), decode::string(), |t| &mut t.rest)
        .build(Target::default);
    assert_eq!(def.validate(), Ok(()));
}

#[test]
fn option_without_keys() {
    let def = target("NoKeys")
        .flag(Opt::new("a").no_short(), |t| &mut t.a)
        .build(Target::default);
    let err = definition_error(&def);
    assert_eq!(
        err,
        DefinitionError::IndeterminateOptionKey {
            loc: "NoKeys.a".to_string()
        }
    );
    assert_eq!(err.to_string(), "cannot determine key at NoKeys.a");
}

#[test]
fn malformed_keys() {
    let def = target("BadLong")
        .flag(Opt::new("a").long("x"), |t| &mut t.a)
        .build(Target::default);
    assert_eq!(
        definition_error(&def).to_string(),
        "option \"--x\" is not valid at BadLong.a"
    );

    let def = target("BadShort")
        .option(Opt::new("name").short("nm"), decode::string(), |t| &mut t.name)
        .build(Target::default);
    assert_eq!(
        definition_error(&def),
        DefinitionError::InvalidOptionKey {
            loc: "BadShort.name".to_string(),
            key: "-nm".to_string(),
        }
    );
}

#[test]
fn missing_keys_are_reported_before_malformed_ones() {
    let def = target("Order")
        .flag(Opt::new("a").long("x"), |t| &mut t.a)
        .flag(Opt::new("bravo").no_long(), |t| &mut t.b)
        .build(Target::default);
    assert!(matches!(
        definition_error(&def),
        DefinitionError::IndeterminateOptionKey { .. }
    ));
}

#[test]
fn duplicate_keys_across_long_and_short() {
    let cases = [
        (Opt::new("a").long("same"), Opt::new("b").long("same"), "--same"),
        (Opt::new("a"), Opt::new("b").short("a"), "-a"),
        (Opt::new("a").long("ab"), Opt::new("b").short("b").long("--ab"), "--ab"),
    ];
    for (first, second, key) in cases {
        let def = target("Dup")
            .flag(first, |t| &mut t.a)
            .flag(second, |t| &mut t.b)
            .build(Target::default);
        assert_eq!(
            definition_error(&def),
            DefinitionError::DuplicateOptionKey {
                loc: "Dup.b".to_string(),
                key: key.to_string(),
            }
        );
    }
}

#[test]
fn builtin_help_collides_with_user_key() {
    let def = target("Clash")
        .help()
        .flag(Opt::new("a").short("h"), |t| &mut t.a)
        .build(Target::default);
    assert_eq!(
        definition_error(&def).to_string(),
        "duplicate option with key \"-h\" defined at Clash.a"
    );
}

#[test]
fn required_after_optional() {
    let def = target("Args")
        .arg(Arg::new("second").optional(), decode::string(), |t| &mut t.second)
        .arg(Arg::new("first"), decode::string(), |t| &mut t.first)
        .build(Target::default);
    assert_eq!(
        definition_error(&def),
        DefinitionError::RequiredAfterOptional {
            loc: "Args.first".to_string()
        }
    );
}

#[test]
fn rest_must_be_last() {
    let def = target("Args")
        .rest(Arg::new("rest"), decode::string(), |t| &mut t.rest)
        .arg(Arg::new("second").optional(), decode::string(), |t| &mut t.second)
        .build(Target::default);
    assert_eq!(
        definition_error(&def).to_string(),
        "argument defined after rest arguments at Args.rest"
    );
}

#[test]
fn args_and_subcommands_are_exclusive() {
    let def = target("Both")
        .arg(Arg::new("first"), decode::string(), |t| &mut t.first)
        .subcommand_with("command", leaf("sub"), |_, _| {})
        .build(Target::default);
    assert_eq!(
        definition_error(&def).to_string(),
        "both of positional arguments and subcommands are defined in Both"
    );
}

#[test]
fn duplicate_subcommand_names() {
    let def = target("Root")
        .subcommand_with("one", leaf("same"), |_, _| {})
        .subcommand_with("two", leaf("same"), |_, _| {})
        .build(Target::default);
    assert_eq!(
        definition_error(&def),
        DefinitionError::DuplicateCommandName {
            loc: "Root.two".to_string(),
            name: "same".to_string(),
        }
    );
}

#[test]
fn nested_errors_surface_at_the_root() {
    let broken = Arc::new(
        target("Broken")
            .flag(Opt::new("a").no_short(), |t| &mut t.a)
            .build(Target::default),
    );
    let def = target("Root")
        .subcommand_with("command", broken, |_, _| {})
        .build(Target::default);
    assert_eq!(
        definition_error(&def).to_string(),
        "cannot determine key at Broken.a"
    );
}

#[test]
fn parse_refuses_invalid_declarations() {
    let def = target("Args")
        .arg(Arg::new("second").optional(), decode::string(), |t| &mut t.second)
        .arg(Arg::new("first"), decode::string(), |t| &mut t.first)
        .build(Target::default);
    let result = def.parse(["x", "y"]);
    assert!(matches!(
        result,
        Err(Error::Definition(DefinitionError::RequiredAfterOptional { .. }))
    ));
}

#[test]
fn validation_result_is_cached() {
    let def = target("Dup")
        .flag(Opt::new("a"), |t| &mut t.a)
        .flag(Opt::new("b").short("a"), |t| &mut t.b)
        .build(Target::default);
    let first = definition_error(&def);
    let second = definition_error(&def);
    assert_eq!(first, second);
}
