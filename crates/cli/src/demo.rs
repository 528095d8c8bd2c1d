//! A small package-manager style command tree used by `export-demo` and
//! `demo`.

use argdecl::{Arg, Command, Declaration, Execute, Opt, decode};

#[derive(Debug, Default)]
pub struct Pkg {
    verbose: bool,
    command: Option<PkgCommand>,
}

#[derive(Debug)]
enum PkgCommand {
    Install(Install),
    Remove(Remove),
    Search(Search),
}

#[derive(Debug, Default)]
pub struct Install {
    force: bool,
    jobs: Option<u32>,
    packages: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Remove {
    purge: bool,
    package: String,
}

#[derive(Debug, Default)]
pub struct Search {
    limit: Option<f64>,
    registry: Vec<String>,
    query: String,
}

impl Command for Pkg {
    fn declare(cmd: Declaration<Self>) -> Declaration<Self> {
        cmd.about("Package manager demo")
            .help()
            .version(env!("CARGO_PKG_VERSION"))
            .flag(
                Opt::new("verbose").short("v").about("Print what would happen"),
                |p| &mut p.verbose,
            )
            .subcommand::<Install, _>("command", |p, c| {
                p.command = Some(PkgCommand::Install(c))
            })
            .subcommand::<Remove, _>("command", |p, c| {
                p.command = Some(PkgCommand::Remove(c))
            })
            .subcommand::<Search, _>("command", |p, c| {
                p.command = Some(PkgCommand::Search(c))
            })
    }
}

impl Command for Install {
    fn declare(cmd: Declaration<Self>) -> Declaration<Self> {
        cmd.about("Install packages")
            .help()
            .flag(
                Opt::new("force").short("f").about("Reinstall if present"),
                |i| &mut i.force,
            )
            .option(
                Opt::new("jobs").short("j").about("Parallel downloads"),
                decode::parsed::<u32>("integer"),
                |i| &mut i.jobs,
            )
            .rest(
                Arg::new("packages").name("package").about("Packages to install"),
                decode::string(),
                |i| &mut i.packages,
            )
    }
}

impl Command for Remove {
    fn declare(cmd: Declaration<Self>) -> Declaration<Self> {
        cmd.about("Remove a package")
            .help()
            .flag(Opt::new("purge").about("Also delete configuration"), |r| {
                &mut r.purge
            })
            .arg(Arg::new("package"), decode::string(), |r| &mut r.package)
    }
}

impl Command for Search {
    fn declare(cmd: Declaration<Self>) -> Declaration<Self> {
        cmd.help()
            .option(
                Opt::new("limit").short("n").about("Maximum results"),
                decode::number(),
                |s| &mut s.limit,
            )
            .options(
                Opt::new("registry").short("r").about("Registry to query"),
                decode::string(),
                |s| &mut s.registry,
            )
            .arg(Arg::new("query").about("Search text"), decode::string(), |s| {
                &mut s.query
            })
    }
}

impl Execute for Pkg {
    fn execute(self) -> i32 {
        let Some(command) = self.command else {
            eprintln!("{}", Self::help());
            return 2;
        };
        let plan = match command {
            PkgCommand::Install(install) => format!(
                "install {} (force: {}, jobs: {})",
                install.packages.join(" "),
                install.force,
                install.jobs.unwrap_or(1),
            ),
            PkgCommand::Remove(remove) => {
                format!("remove {} (purge: {})", remove.package, remove.purge)
            }
            PkgCommand::Search(search) => format!(
                "search {:?} in {} (limit: {})",
                search.query,
                if search.registry.is_empty() {
                    "default".to_string()
                } else {
                    search.registry.join(", ")
                },
                search.limit.map_or("none".to_string(), |n| n.to_string()),
            ),
        };
        if self.verbose {
            tracing::info!("{plan}");
        }
        println!("{plan}");
        0
    }
}
