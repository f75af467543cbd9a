use std::{path::Path, process::ExitCode};

use clap::Parser;
use debsearch::{Error, Model, Result, Sources, discover_file_pairs, ingest};
use tracing_subscriber::EnvFilter;

mod cli;
mod output;

use cli::{Cli, Command, SearchArgs};

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("DEBSEARCH_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        lists_dir,
        arch,
        command,
        ..
    } = cli;

    let lists_dir = lists_dir.as_deref();
    let arch = arch.as_deref();
    let mut out = std::io::stdout().lock();

    match command {
        Command::Search(args) => {
            let model = load_model(lists_dir, arch, !args.no_descriptions)?;
            cmd_search(&mut out, &model, &args)?;
        }
        Command::Sections(args) => {
            let model = load_model(lists_dir, arch, false)?;
            let counts = &model.sections_and_counts;
            output::write_counts(&mut out, counts, args.json)?;
        }
        Command::Tags(args) => {
            let model = load_model(lists_dir, arch, false)?;
            output::write_counts(&mut out, &model.tags_and_counts, args.json)?;
        }
        Command::Show(args) => {
            let model = load_model(lists_dir, arch, true)?;
            let record =
                model.get(&args.name).ok_or_else(|| Error::NotFound {
                    kind: "package",
                    name: args.name.clone(),
                })?;
            output::write_record(&mut out, record, args.json)?;
        }
        Command::Completions(args) => args.generate(),
    }

    Ok(())
}

/// Discover and ingest the package lists, reporting unreadable files
/// without giving up on the rest.
fn load_model(
    lists_dir: Option<&Path>,
    arch: Option<&str>,
    with_descriptions: bool,
) -> Result<Model> {
    let sources =
        Sources::resolve(lists_dir, arch)?.with_descriptions(with_descriptions);
    let pairs = discover_file_pairs(&sources)?;

    let ingested = match ingest(&pairs) {
        Err(Error::NoInputFiles) => {
            return Err(Error::Config(format!(
                "no package lists found for architecture {} in {}",
                sources.architecture(),
                sources.lists_dir().display()
            )));
        }
        result => result?,
    };

    let (model, error) = ingested.into_parts();
    if let Some(error) = error {
        tracing::warn!("Some package lists could not be read:\n{error}");
    }
    Ok(model)
}

fn cmd_search(
    out: &mut impl std::io::Write,
    model: &Model,
    args: &SearchArgs,
) -> Result<()> {
    let query = args.query();
    tracing::debug!(%query, "Selecting packages");

    let mut results = query.select_from(model);
    if let Some(count) = args.count {
        results.truncate(count);
    }

    if args.json {
        output::write_json(out, &query, &results)
    } else {
        output::write_human(out, &results)
    }
}
