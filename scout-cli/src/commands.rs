//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use scout_core::config;
use std::path::Path;

/// Handle a CLI subcommand.
pub fn handle_command(command: Commands, workspace: &Path) -> anyhow::Result<()> {
    match command {
        Commands::Config { action } => handle_config(action, workspace),
    }
}

fn handle_config(action: ConfigAction, workspace: &Path) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_path = config::workspace_config_path(workspace);
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }
            let path = config::init_workspace_config(workspace)
                .map_err(|e| anyhow::anyhow!("Failed to write config: {}", e))?;
            println!("Created default configuration at: {}", path.display());
            Ok(())
        }
        ConfigAction::Show => {
            print!("{}", show_config(workspace)?);
            Ok(())
        }
        ConfigAction::Path => {
            match config::user_config_path() {
                Some(path) => println!("user:      {}", path.display()),
                None => println!("user:      (no home directory)"),
            }
            println!(
                "workspace: {}",
                config::workspace_config_path(workspace).display()
            );
            Ok(())
        }
    }
}

/// The effective configuration as TOML, secrets masked.
fn show_config(workspace: &Path) -> anyhow::Result<String> {
    let config = config::load_config(Some(workspace))
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    Ok(toml::to_string_pretty(&config.redacted())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::config::ScoutConfig;
    use tempfile::TempDir;

    #[test]
    fn test_config_init_creates_file() {
        let dir = TempDir::new().unwrap();
        let workspace = dir.path();

        let command = Commands::Config {
            action: ConfigAction::Init,
        };
        handle_command(command, workspace).unwrap();

        let config_path = workspace.join(".shadow-scout").join("config.toml");
        assert!(config_path.exists());

        let content = std::fs::read_to_string(&config_path).unwrap();
        let parsed: ScoutConfig = toml::from_str(&content).unwrap();
        assert_eq!(parsed.llm.models[0], "gemini-3-flash-preview");
        assert_eq!(parsed.search.max_results, 10);
    }

    #[test]
    fn test_config_init_idempotent() {
        let dir = TempDir::new().unwrap();
        let workspace = dir.path();
        let config_path = workspace.join(".shadow-scout").join("config.toml");

        handle_command(
            Commands::Config {
                action: ConfigAction::Init,
            },
            workspace,
        )
        .unwrap();
        std::fs::write(&config_path, "# edited\n").unwrap();

        handle_command(
            Commands::Config {
                action: ConfigAction::Init,
            },
            workspace,
        )
        .unwrap();
        assert_eq!(std::fs::read_to_string(&config_path).unwrap(), "# edited\n");
    }

    #[test]
    fn test_show_config_masks_inline_secrets() {
        let dir = TempDir::new().unwrap();
        let workspace = dir.path();
        std::fs::create_dir_all(workspace.join(".shadow-scout")).unwrap();
        std::fs::write(
            workspace.join(".shadow-scout").join("config.toml"),
            "[llm]\napi_key = \"super-secret-value\"\n",
        )
        .unwrap();

        let shown = show_config(workspace).unwrap();
        assert!(!shown.contains("super-secret-value"));
        assert!(shown.contains("********"));
        assert!(shown.contains("gemini-2.5-flash"));
    }
}
