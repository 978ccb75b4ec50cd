//! Content Blocker Converter CLI
//!
//! Reads filter rules from stdin and writes the Safari content blocker.
//!
//! ```text
//! cat rules.txt | cbc-cli --safari-version 15 --optimize true --output-file-name list
//! ```

mod output;

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::Instant;

use clap::{ArgAction, Parser};
use env_logger::{Builder, Env, Target};

use cbc_compiler::convert_array;
use cbc_core::{AdvancedBlockingFormat, ConversionConfig, LogFacade, SafariVersion};

#[derive(Parser, Debug)]
#[command(name = "cbc-cli")]
#[command(about = "Convert AdBlock filter rules into a Safari content blocker")]
struct Cli {
    /// Target Safari version
    #[arg(short, long, default_value_t = 13.0)]
    safari_version: f32,

    /// Merge and deduplicate entries
    #[arg(short, long, default_value_t = false, action = ArgAction::Set)]
    optimize: bool,

    /// Produce the advanced blocking payload
    #[arg(short, long, default_value_t = false, action = ArgAction::Set)]
    advanced_blocking: bool,

    /// Advanced blocking payload format (json or txt)
    #[arg(short = 'f', long, default_value = "json")]
    advanced_blocking_format: String,

    /// Maximum size of the content blocker in bytes, 0 for no limit
    #[arg(short, long, default_value_t = 0)]
    max_json_size_bytes: usize,

    /// Name of the output file, without extension
    #[arg(short = 'n', long, default_value = "unnamed_list")]
    output_file_name: String,

    /// Directory the output files are written to
    #[arg(short = 'd', long, default_value = ".")]
    output_dir: PathBuf,
}

fn main() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    // Options are checked before anything is read from stdin
    let config = build_config(cli)?;
    log::info!("Safari version: {}", config.safari_version);
    log::info!("Optimize: {}", config.optimize);
    log::info!(
        "Advanced blocking: {} ({})",
        config.advanced_blocking,
        config.advanced_blocking_format
    );
    match config.max_json_size_bytes {
        Some(limit) => log::info!("Max json size: {limit} bytes"),
        None => log::info!("Max json size: no limit"),
    }

    let rules = read_rules(io::stdin().lock())?;
    log::info!("Rules to convert: {}", rules.len());

    let start = Instant::now();
    let result = convert_array(&rules, config.clone(), &LogFacade)
        .map_err(|e| format!("Conversion failed: {e}"))?;
    log::info!(
        "Converted {} rules ({} errors) into {} entries in {:.1}ms{}",
        result.converted_count,
        result.errors_count,
        result.entries_count,
        start.elapsed().as_secs_f64() * 1000.0,
        if result.over_limit { ", over limit" } else { "" }
    );

    let path = output::output_path(&cli.output_dir, &cli.output_file_name, "json");
    let pretty = output::pretty_json(&result.converted)?;
    output::create_or_append(&path, &pretty)?;
    println!("Wrote {} entries to '{}'", result.entries_count, path.display());

    if let Some(advanced) = &result.advanced_blocking {
        let format = config.advanced_blocking_format;
        let path = output::advanced_path(&cli.output_dir, &cli.output_file_name, format);
        let contents = match format {
            AdvancedBlockingFormat::Json => output::pretty_json(advanced)?,
            AdvancedBlockingFormat::Txt => advanced.clone(),
        };
        output::create_or_append(&path, &contents)?;
        println!(
            "Wrote {} advanced blocking entries to '{}'",
            result.advanced_blocking_count,
            path.display()
        );
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<ConversionConfig, String> {
    let safari_version = SafariVersion::new(cli.safari_version).map_err(|e| e.to_string())?;
    let advanced_blocking_format = cli
        .advanced_blocking_format
        .parse::<AdvancedBlockingFormat>()
        .map_err(|e| e.to_string())?;

    let config = ConversionConfig {
        safari_version,
        optimize: cli.optimize,
        advanced_blocking: cli.advanced_blocking,
        advanced_blocking_format,
        max_json_size_bytes: (cli.max_json_size_bytes > 0).then_some(cli.max_json_size_bytes),
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// Lines up to EOF or the first empty line.
fn read_rules(reader: impl BufRead) -> Result<Vec<String>, String> {
    let mut rules = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|e| format!("Failed to read stdin: {e}"))?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            break;
        }
        rules.push(line.to_string());
    }
    Ok(rules)
}
