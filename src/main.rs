use std::{collections::HashMap, fs::read_to_string, path::PathBuf, process, time::Instant};

use anyhow::Context;
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use tern::{config::Config, format_error, format_fixit, format_warning, semantic::semantic::Compilation};

/// Semantic analysis for tern source files.
#[derive(Parser, Debug)]
#[command(name = "ternc", version)]
struct Args {
    /// Source files to analyze together.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// External library metadata to import, in addition to the configured ones.
    #[arg(short, long = "lib", value_name = "FILE")]
    libraries: Vec<PathBuf>,

    /// Report warnings without failing the run.
    #[arg(long)]
    allow_warnings: bool,

    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8, config: &Config) {
    let mut builder = Builder::new();
    builder.filter_level(LevelFilter::Warn);

    if let Some(level) = config.log_level.as_deref() {
        builder.parse_filters(level);
    }
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(LevelFilter::Info);
        }
        2 => {
            builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(LevelFilter::Trace);
        }
    }

    builder.init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.libraries.extend(args.libraries.iter().cloned());
    if args.allow_warnings {
        config.deny_warnings = false;
    }

    init_logging(args.verbose, &config);

    let start = Instant::now();
    let mut compilation = Compilation::new(config);
    compilation.import_libraries();

    let mut sources = HashMap::new();
    for path in &args.files {
        let source = read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let file = path.to_string_lossy().to_string();

        compilation.add_source(&source, &file);
        sources.insert(file, source);
    }
    log::info!("Parsed {} file(s) in {:?}", args.files.len(), start.elapsed());

    compilation.analyze();
    log::info!("Analyzed in {:?}", start.elapsed());

    for error in compilation.diagnostics.errors() {
        let file = error.get_span().start.file.as_str();
        let source = sources.get(file).map(String::as_str).unwrap_or_default();
        eprintln!("{}\n", format_error(error, source));
    }
    for warning in compilation.diagnostics.warnings() {
        eprintln!("{}\n", format_warning(warning));
    }
    for fixit in compilation.diagnostics.fixits() {
        eprintln!("{}\n", format_fixit(fixit));
    }

    if !compilation.can_generate() {
        eprintln!(
            "{} error(s), {} warning(s)",
            compilation.diagnostics.errors().len(),
            compilation.diagnostics.warnings().len()
        );
        process::exit(1);
    }

    println!("No problems found in {} file(s)", args.files.len());
    Ok(())
}
