//! Gameready CLI - game-readiness validation for 3D assets
//!
//! This binary scans scene snapshots and glTF models for problems that keep
//! an asset out of a real-time engine: topology and transform faults, UV
//! layout issues, texture conventions, modifier stacks and rigs.

use clap::{ArgAction, Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use gameready_cli::commands;
use gameready_cli::commands::scan::ScanOptions;

/// Gameready - Mesh Game-Readiness Validator
#[derive(Parser)]
#[command(name = "gameready")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a scene snapshot or glTF model and print the game-ready report
    Scan {
        /// Path to the input file (.json scene snapshot, .gltf or .glb)
        #[arg(short, long)]
        input: String,

        /// What to scan (default: single)
        #[arg(long, value_parser = ["single", "collection", "scene"])]
        scope: Option<String>,

        /// Object to scan instead of the active object
        #[arg(long)]
        object: Option<String>,

        /// Collection to scan (implies --scope collection)
        #[arg(long)]
        collection: Option<String>,

        /// Keep high-poly source objects (*_high, "High Poly" collection) in the scan
        #[arg(long)]
        include_high_poly: bool,

        /// AAA mode: stricter texture naming, texel density and UV targets
        #[arg(long)]
        strict: bool,

        /// Apply hero-asset policies
        #[arg(long)]
        hero: bool,

        /// Treat the collection as a modular kit (object offsets allowed)
        #[arg(long)]
        modular: bool,

        /// Path to a settings file (JSON); flags override its values
        #[arg(long)]
        config: Option<String>,

        /// Disable specific checks (can be repeated)
        #[arg(long = "disable-check", value_name = "CHECK_ID")]
        disable_checks: Vec<String>,

        /// Only run these checks (comma-separated list)
        #[arg(long = "only-checks", value_name = "CHECK_IDS")]
        only_checks: Option<String>,

        /// Extra findings supplied by the host (JSON object of name -> items)
        #[arg(long)]
        findings: Option<String>,

        /// Output machine-readable JSON instead of report text
        #[arg(long)]
        json: bool,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List the registered checks
    Checks {
        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Scan {
            input,
            scope,
            object,
            collection,
            include_high_poly,
            strict,
            hero,
            modular,
            config,
            disable_checks,
            only_checks,
            findings,
            json,
            output,
        } => commands::scan::run(&ScanOptions {
            input,
            scope,
            object,
            collection,
            include_high_poly,
            strict,
            hero,
            modular,
            config,
            disable_checks,
            only_checks,
            findings,
            json,
            output,
        }),
        Commands::Checks { json } => commands::checks::run(json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_scan() {
        let cli = Cli::try_parse_from([
            "gameready",
            "scan",
            "--input",
            "rock.glb",
            "--collection",
            "Props",
            "--hero",
            "--disable-check",
            "uv/stacked",
            "--disable-check",
            "rig/pose",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Scan {
                input,
                collection,
                hero,
                strict,
                disable_checks,
                ..
            } => {
                assert_eq!(input, "rock.glb");
                assert_eq!(collection.as_deref(), Some("Props"));
                assert!(hero);
                assert!(!strict);
                assert_eq!(disable_checks, vec!["uv/stacked", "rig/pose"]);
            }
            _ => panic!("expected scan command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_scope() {
        assert!(Cli::try_parse_from(["gameready", "scan", "-i", "a.json", "--scope", "world"]).is_err());
    }

    #[test]
    fn test_cli_parses_checks() {
        let cli = Cli::try_parse_from(["gameready", "checks", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Checks { json: true }));
    }
}
