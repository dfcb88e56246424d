//! Mnemonic dictionary generator.
//!
//! ## Usage
//!
//! ```bash
//! mb generate constraints_file.txt word_list.txt
//! ```
//!
//! ## Configuration
//!
//! Environment variables:
//! - `MB_POLICY`: Path to a JSON resolver policy (default: built-in policy)
//! - `MB_REPORT`: Path to write the JSON resolution report (optional)
//! - `RUST_LOG`: Log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: pretty)
//!
//! ## Exit codes
//!
//! - 0: conflict-free mapping
//! - 1: stuck or iteration limit
//! - 2: usage error
//! - 3: input or configuration error

use std::path::Path;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mnemonic_kernel::{Outcome, Pipeline, PipelineOutput, ResolverPolicyV1};

const USAGE: &str = "Usage: mb generate constraints_file.txt word_list.txt";

/// Digits of pi used for the demonstration encoding.
const PI_DIGITS: &str = "3141592653589793238462643383279502884197169399375105820974944592307816406286208998628034825342117067982148086513282306647093844609550";

/// Initialize the tracing subscriber with JSON or pretty format
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mb=info,mnemonic_kernel=info".into());

    if log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .flatten_event(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

/// Load the resolver policy from `MB_POLICY`, if set.
fn load_policy() -> Result<ResolverPolicyV1, String> {
    match std::env::var("MB_POLICY") {
        Ok(path) if !path.is_empty() => {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read policy {}: {}", path, e))?;
            let policy = ResolverPolicyV1::from_json(&text)
                .map_err(|e| format!("Invalid policy {}: {}", path, e))?;
            info!(path = %path, "Policy loaded from file");
            Ok(policy)
        }
        _ => Ok(ResolverPolicyV1::default()),
    }
}

fn print_summary(output: &mut PipelineOutput) {
    println!("Dictionary source to target");
    print!("{}", output.dictionary);

    println!("Resulting balance in word frequency:");
    for entry in &output.report.balance {
        println!("{} = {}", entry.source, entry.probability);
    }

    if let Outcome::Stuck { .. } | Outcome::IterationLimit { .. } = output.resolution.outcome {
        println!("Unresolved conflicts ({}):", output.report.outcome);
        for conflict in &output.report.unresolved {
            println!("{} claimed by {} sources", conflict.target, conflict.count + 1);
        }
    }

    let encoded = output.dictionary.encode(PI_DIGITS);
    println!("Encoded: {}", output.dictionary.spell(&encoded));
}

fn generate(constraints: &Path, word_list: &Path) -> ExitCode {
    let policy = match load_policy() {
        Ok(policy) => policy,
        Err(e) => {
            error!(error = %e, "Configuration error");
            return ExitCode::from(3);
        }
    };
    info!(
        policy_id = policy.policy_id(),
        params_hash = %policy.params_hash(),
        fallback = %policy.fallback,
        "Resolver policy"
    );

    let mut output = match Pipeline::new(policy).run(constraints, word_list) {
        Ok(output) => output,
        Err(e) => {
            error!(error = %e, "Pipeline aborted");
            return ExitCode::from(3);
        }
    };

    print_summary(&mut output);

    if let Ok(path) = std::env::var("MB_REPORT") {
        let written = output
            .report
            .to_json()
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(&path, json).map_err(|e| e.to_string()));
        match written {
            Ok(()) => info!(path = %path, "Report written"),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to write report");
                return ExitCode::from(3);
            }
        }
    }

    if output.resolution.outcome.is_resolved() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    match args.as_slice() {
        [_, command, constraints, word_list] if command == "generate" => {
            info!(version = env!("CARGO_PKG_VERSION"), "Starting mnemonic dictionary generation");
            generate(Path::new(constraints), Path::new(word_list))
        }
        _ => {
            println!("{}", USAGE);
            ExitCode::from(2)
        }
    }
}
