//! envtoml CLI - Load TOML files with environment variable substitution
//!
//! Usage:
//!   envtoml dump config.toml --format json
//!   envtoml get config.toml database.port
//!   envtoml check config.toml other.toml

use clap::{Parser, Subcommand};
use colored::Colorize;
use envtoml_core::interpolation;
use envtoml_core::{
    Environment, Error, ErrorKind, LoadOptions, Loader, ProcessEnv, TomlBackend,
    TomlCrateBackend, Value,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// envtoml - TOML with environment variable interpolation
#[derive(Parser)]
#[command(name = "envtoml")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a file with substitution and print the resulting document
    Dump {
        /// TOML file to load
        file: PathBuf,

        /// Output format: toml, json, yaml
        #[arg(short, long, default_value = "toml")]
        format: String,

        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail when a referenced variable is unset and has no default
        #[arg(long)]
        fail_on_missing: bool,
    },

    /// Get a specific value from the substituted document
    Get {
        /// TOML file to load
        file: PathBuf,

        /// Path to the value (e.g., database.host or servers[0].port)
        path: String,

        /// Output format: text, json, toml
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Default value if path not found
        #[arg(short, long)]
        default: Option<String>,

        /// Fail when a referenced variable is unset and has no default
        #[arg(long)]
        fail_on_missing: bool,
    },

    /// Syntax check and list the variables each file references
    Check {
        /// TOML file(s) to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// Run the CLI with the process arguments
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Dump {
            file,
            format,
            output,
            fail_on_missing,
        } => cmd_dump(&file, &format, output, fail_on_missing),

        Commands::Get {
            file,
            path,
            format,
            default,
            fail_on_missing,
        } => cmd_get(&file, &path, &format, default, fail_on_missing),

        Commands::Check { files } => cmd_check(files),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// Exit status for a failed load: 2 for unreadable or malformed input, 1 otherwise
fn failure_code(err: &Error) -> u8 {
    match err.kind {
        ErrorKind::Parse | ErrorKind::Io => 2,
        _ => 1,
    }
}

fn load_document(file: &Path, fail_on_missing: bool) -> Result<Value, Error> {
    let options = LoadOptions::new().with_fail_on_missing(fail_on_missing);
    Loader::new(options).load_file(file)
}

fn render(value: &Value, format: &str) -> Result<String, String> {
    match format {
        "json" => serde_json::to_string_pretty(value)
            .map(|s| s + "\n")
            .map_err(|e| e.to_string()),
        "yaml" | "yml" => serde_yaml::to_string(value).map_err(|e| e.to_string()),
        "toml" => match value.to_toml() {
            toml::Value::Table(table) => toml::to_string_pretty(&table).map_err(|e| e.to_string()),
            other => Ok(format!("{}\n", other)),
        },
        _ => Err(format!(
            "Unsupported format: {}. Use toml, json, or yaml.",
            format
        )),
    }
}

fn cmd_dump(file: &Path, format: &str, output: Option<PathBuf>, fail_on_missing: bool) -> ExitCode {
    let value = match load_document(file, fail_on_missing) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            return ExitCode::from(failure_code(&e));
        }
    };

    let content = match render(&value, format) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            return ExitCode::from(1);
        }
    };

    if let Some(output_path) = output {
        if let Err(e) = std::fs::write(&output_path, &content) {
            eprintln!("{}: {}", "Error writing file".red(), e);
            return ExitCode::from(2);
        }
        eprintln!("{} Wrote to {}", "✓".green(), output_path.display());
    } else {
        print!("{}", content);
    }
    ExitCode::SUCCESS
}

fn cmd_get(
    file: &Path,
    path: &str,
    format: &str,
    default: Option<String>,
    fail_on_missing: bool,
) -> ExitCode {
    let document = match load_document(file, fail_on_missing) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            return ExitCode::from(failure_code(&e));
        }
    };

    let value = match document.get_path(path) {
        Ok(v) => v,
        Err(_) => {
            if let Some(default_val) = default {
                println!("{}", default_val);
                return ExitCode::SUCCESS;
            }
            eprintln!("{}: Path '{}' not found", "Error".red(), path);
            return ExitCode::from(1);
        }
    };

    let rendered = match format {
        "text" => match value {
            Value::Sequence(_) | Value::Mapping(_) => render(value, "toml"),
            scalar => Ok(format!("{}\n", scalar)),
        },
        other => render(value, other),
    };

    match rendered {
        Ok(s) => {
            print!("{}", s);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

/// Collect the variable names referenced anywhere in a raw document
fn collect_references(value: &Value, names: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            for name in interpolation::referenced_names(s) {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        Value::Sequence(seq) => seq.iter().for_each(|v| collect_references(v, names)),
        Value::Mapping(map) => map.values().for_each(|v| collect_references(v, names)),
        _ => {}
    }
}

fn cmd_check(files: Vec<PathBuf>) -> ExitCode {
    let mut all_valid = true;
    let options = LoadOptions::default();

    for file in files {
        let content = match std::fs::read_to_string(&file) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), file.display(), e);
                all_valid = false;
                continue;
            }
        };

        let raw = match TomlCrateBackend.parse_document(&content, &options.parse_float) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), file.display(), e);
                all_valid = false;
                continue;
            }
        };

        let mut names = Vec::new();
        collect_references(&raw, &mut names);
        println!("{} {}: valid TOML", "✓".green(), file.display());

        for name in names {
            let is_set = ProcessEnv.lookup(&name).is_some_and(|v| !v.is_empty());
            if is_set {
                println!("    {} {}", "set".green(), name);
            } else {
                println!("    {} {}", "unset".yellow(), name);
            }
        }
    }

    if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
