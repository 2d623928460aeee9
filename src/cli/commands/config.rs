use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{detail, info, success, warning};
use std::fs;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        check,
    } = cmd
    {
        let path = Config::config_file();

        if *print_config {
            println!("📄 Current configuration:\n");
            println!("{}", serde_yaml::to_string(cfg)?);
        }

        if *check {
            if !path.exists() {
                warning(format!(
                    "No configuration file at {} (defaults in use). Run `rtimeclock init`.",
                    path.display()
                ));
                return Ok(());
            }

            let content = fs::read_to_string(&path)?;
            let missing = Config::missing_keys(&content)?;
            if missing.is_empty() {
                success(format!("Configuration file is complete: {}", path.display()));
            } else {
                warning(format!("Missing keys in {}:", path.display()));
                for key in missing {
                    detail(key);
                }
                info("Missing keys use their default values.");
            }
        }
    }

    Ok(())
}
