//! Config validation CLI tool
//!
//! Validates a Bug Smasher configuration file and reports any errors.

use smash_config::RewardPolicy;
use smash_util::default_config_path;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a Bug Smasher configuration file.");
            eprintln!();
            eprintln!("If no path is provided, uses: {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match smash_config::load_config(&config_path) {
        Ok(config) => {
            let policy = match config.rules.reward_policy {
                RewardPolicy::Flat => "flat",
                RewardPolicy::Dampened => "dampened",
            };

            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", smash_config::CURRENT_CONFIG_VERSION);
            println!("  Data dir: {}", config.service.data_dir.display());
            println!("  Undo window: {}s", config.rules.undo_window.as_secs());
            println!("  Reward policy: {}", policy);
            println!("  History limit: {}", config.rules.history_limit);
            println!("  Warning threshold: {}", config.rules.warning_threshold);

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                smash_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                smash_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                smash_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                smash_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        smash_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
