use std::{error::Error, fs, path::PathBuf, process};

use clap::Parser;
use evalctx::{
    ExtensionFlag, FragmentKind, SessionConfig, SessionMutator, config::SessionFile,
    fragment_kind,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// evalctx sorts interactive-session fragments into imports, expressions and
/// declarations, and applies imports to a session.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// A TOML session file to start from. Its `[units]` table is the
    /// installed package database.
    #[arg(short, long, value_name = "FILE")]
    session: Option<PathBuf>,

    /// Enables a language extension. May be repeated.
    #[arg(short = 'X', long = "extension", value_name = "EXT")]
    extensions: Vec<String>,

    /// Exposes a package, optionally with a renaming clause such as
    /// "containers (Data.Map as Map)". May be repeated.
    #[arg(short, long = "package", value_name = "PKG")]
    packages: Vec<String>,

    /// Adds a module search path. May be repeated.
    #[arg(short, long = "import-path", value_name = "DIR")]
    import_paths: Vec<PathBuf>,

    /// Tells evalctx to read the fragment from a file instead.
    #[arg(short, long)]
    file: bool,

    /// Prints the session after the fragment has been applied.
    #[arg(long)]
    dump: bool,

    /// Logs every session change to stderr.
    #[arg(short, long)]
    verbose: bool,

    fragment: String,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("{e}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("evalctx={level}").parse() {
        filter = filter.add_directive(directive);
    }
    let _ = tracing_subscriber::fmt().with_env_filter(filter)
                                     .with_writer(std::io::stderr)
                                     .try_init();
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let file = match &args.session {
        Some(path) => SessionFile::load(path)?,
        None => SessionFile::default(),
    };
    let db = file.package_db();
    let mutator = SessionMutator::new(&db, &db);

    let mut session = file.apply(&mutator, &SessionConfig::default())?;
    for name in &args.extensions {
        session = mutator.add_extension(&session, name.parse::<ExtensionFlag>()?);
    }
    for path in &args.import_paths {
        session = mutator.add_import_path(&session, path.clone());
    }
    session = mutator.expose_packages(&session, args.packages.as_slice())?;

    let fragment = if args.file {
        fs::read_to_string(&args.fragment).map_err(|e| {
                                              format!("Failed to read the input file '{}': {e}",
                                                      args.fragment)
                                          })?
    } else {
        args.fragment.clone()
    };

    let kind = fragment_kind(session.extension_flags(), &fragment);
    debug!(?kind, "classified fragment");
    match kind {
        FragmentKind::Import => {
            let (next, imports) = mutator.add_import(&session, &fragment)?;
            for import in &imports {
                println!("{import}");
            }
            session = next;
        },
        FragmentKind::Expression => println!("expression"),
        FragmentKind::Declaration => println!("declaration"),
    }

    if args.dump {
        println!("{session}");
    }

    Ok(())
}
