//! # vdl
//!
//! Command-line driver for the VDL schema toolchain.
//!
//! ## Usage
//!
//! ```bash
//! # Run every target in ./vdl.toml
//! vdl generate
//!
//! # Preview a single target
//! vdl generate --target typescript --dry-run
//!
//! # Compile a schema and report diagnostics
//! vdl check schema/main.vdl.json
//!
//! # Print the IR
//! vdl ir schema/main.vdl.json --minify
//!
//! # Create a starter manifest
//! vdl init
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

use vdl_cli::{
    commands::{self, GenerateOptions},
    error::{CliError, CliResult},
    logging,
};
use vdl_codegen::{RunSummary, WriteResult};

#[derive(Parser)]
#[command(name = "vdl")]
#[command(author, version, about = "Compile VDL schemas and generate code", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides this.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the targets configured in the manifest
    Generate {
        /// Manifest path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Preview files without writing them
        #[arg(long)]
        dry_run: bool,

        /// Run only this target (repeatable)
        #[arg(short, long = "target", value_name = "NAME")]
        targets: Vec<String>,
    },

    /// Build the IR and report diagnostics
    Check {
        /// Main parsed schema document
        schema: PathBuf,
    },

    /// Print the IR as JSON
    Ir {
        /// Main parsed schema document
        schema: PathBuf,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit compact JSON
        #[arg(long)]
        minify: bool,
    },

    /// Initialize a new vdl.toml
    Init {
        /// Output path for the manifest
        #[arg(short, long, default_value = "vdl.toml")]
        output: PathBuf,

        /// Overwrite an existing manifest
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Generate {
            config,
            dry_run,
            targets,
        } => cmd_generate(GenerateOptions {
            config,
            dry_run,
            targets,
        }),
        Commands::Check { schema } => cmd_check(schema),
        Commands::Ir {
            schema,
            output,
            minify,
        } => cmd_ir(schema, output, minify),
        Commands::Init { output, force } => cmd_init(output, force),
    }
}

/// Generate command implementation.
fn cmd_generate(options: GenerateOptions) -> CliResult<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    println!("{}", "Compiling schema and running targets...".cyan());
    let report = runtime.block_on(commands::generate(&options))?;

    print_summary(&report.summary);
    let summary = report.into_result()?;

    println!(
        "{} {} target(s) succeeded",
        "✓".green(),
        summary.outcomes.len().to_string().green()
    );
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    for outcome in &summary.outcomes {
        match &outcome.result {
            Ok(files) => {
                println!(
                    "{} {} ({} file(s) → {})",
                    "✓".green(),
                    outcome.name.bold(),
                    files.len(),
                    outcome.output.display()
                );
                for file in files {
                    print_write_result(file);
                }
            }
            Err(_) => println!("{} {}", "✗".red(), outcome.name.bold()),
        }
    }

    let failures = commands::failure_lines(summary);
    if !failures.is_empty() {
        eprintln!("\n{}", "Failed targets:".red().bold());
        for line in failures {
            eprintln!("  {line}");
        }
    }
}

fn print_write_result(result: &WriteResult) {
    match result {
        WriteResult::Written { path, bytes } => {
            println!("    Written {} bytes to {}", bytes, path.display());
        }
        WriteResult::DryRun { content, path } => {
            println!("  {} Would write to {}:", "[dry-run]".yellow(), path.display());
            println!("{}", "─".repeat(60).dimmed());
            println!("{}", content);
            println!("{}", "─".repeat(60).dimmed());
        }
    }
}

/// Check command implementation.
fn cmd_check(schema: PathBuf) -> CliResult<()> {
    let compiled = commands::compile(&schema)?;
    let ir = &compiled.ir;

    println!("{} {} compiled", "✓".green(), schema.display());
    println!("  Files:      {}", compiled.files.len());
    println!("  Types:      {}", ir.types.len());
    println!("  Enums:      {}", ir.enums.len());
    println!("  Constants:  {}", ir.constants.len());
    println!("  Patterns:   {}", ir.patterns.len());
    println!("  RPCs:       {}", ir.rpcs.len());
    println!("  Procedures: {}", ir.procedures.len());
    println!("  Streams:    {}", ir.streams.len());
    Ok(())
}

/// IR command implementation.
fn cmd_ir(schema: PathBuf, output: Option<PathBuf>, minify: bool) -> CliResult<()> {
    let json = commands::ir_json(&schema, minify)?;
    match output {
        Some(path) => {
            commands::write_file(&path, &json)?;
            println!("{} Written IR to {}", "✓".green(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Init command implementation.
fn cmd_init(output: PathBuf, force: bool) -> CliResult<()> {
    commands::init(&output, force)?;
    println!(
        "{} Created configuration file: {}",
        "✓".green(),
        output.display()
    );
    Ok(())
}

/// Print an error with formatting.
fn print_error(error: &CliError) {
    match error {
        CliError::Compile(err) => {
            eprintln!("{} schema failed to compile", "Error:".red().bold());
            for line in commands::compile_diagnostics(err) {
                eprintln!("  {line}");
            }
        }
        other => eprintln!("{} {}", "Error:".red().bold(), other),
    }
}
