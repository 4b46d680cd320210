//! CLI subcommand handlers.

use crate::{Commands, ConfigAction};
use scholar_core::config::{ScholarConfig, check_api_keys, user_config_path};
use std::path::Path;

/// Handle a CLI subcommand.
pub fn handle_command(
    command: Commands,
    config: &ScholarConfig,
    workspace: &Path,
) -> anyhow::Result<()> {
    match command {
        Commands::Check => {
            print!("{}", check_report(config));
            Ok(())
        }
        Commands::Config { action } => handle_config(action, config, workspace),
    }
}

fn handle_config(action: ConfigAction, config: &ScholarConfig, workspace: &Path) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            if let Some(path) = user_config_path() {
                println!("# user config: {}", path.display());
            }
            println!(
                "# workspace config: {}\n",
                workspace.join(".scholar").join("config.toml").display()
            );
            print!("{}", config.to_toml()?);
            Ok(())
        }
        ConfigAction::Init => {
            let config_dir = workspace.join(".scholar");
            std::fs::create_dir_all(&config_dir)?;

            let config_path = config_dir.join("config.toml");
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }

            std::fs::write(&config_path, ScholarConfig::default().to_toml()?)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
    }
}

/// Environment check: API key presence plus configuration warnings.
pub fn check_report(config: &ScholarConfig) -> String {
    let mut out = String::from("Environment check\n");
    for key in check_api_keys(config) {
        let mark = if key.present { "ok" } else { "missing" };
        out.push_str(&format!("  {:<8} {:<20} {mark}\n", key.service, key.env_var));
    }

    let warnings = config.validate();
    if warnings.is_empty() {
        out.push_str("Configuration: ok\n");
    } else {
        out.push_str("Configuration warnings:\n");
        for w in warnings {
            out.push_str(&format!("  - {w}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_report_lists_services() {
        let mut config = ScholarConfig::default();
        config.search.tavily_api_key_env = "SCHOLAR_TEST_UNSET_TAVILY".into();
        let report = check_report(&config);
        assert!(report.contains("tavily"));
        assert!(report.contains("SCHOLAR_TEST_UNSET_TAVILY"));
        assert!(report.contains("missing"));
        assert!(report.contains("Configuration: ok"));
    }

    #[test]
    fn test_check_report_shows_warnings() {
        let mut config = ScholarConfig::default();
        config.search.max_results = 0;
        assert!(check_report(&config).contains("Configuration warnings:"));
    }

    #[test]
    fn test_config_init_writes_once() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ScholarConfig::default();
        handle_config(ConfigAction::Init, &config, dir.path()).unwrap();
        let path = dir.path().join(".scholar").join("config.toml");
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("gemini-2.5-flash"));

        std::fs::write(&path, "# edited").unwrap();
        handle_config(ConfigAction::Init, &config, dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# edited");
    }
}
