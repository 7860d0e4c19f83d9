//! # Init Subcommand
//!
//! `dvp init` scaffolds a plugin project in a directory.
//!
//! ```bash
//! dvp init --root-dir my-plugin --plugin-name "My Plugin" --ingestion-strategy staged
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use dvp_core::PluginType;

/// Arguments for `dvp init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to create the project in. Created if missing.
    #[arg(short = 'r', long, default_value = ".")]
    pub root_dir: PathBuf,

    /// Display name. Defaults to the generated plugin id.
    #[arg(short = 'n', long)]
    pub plugin_name: Option<String>,

    /// Ingestion strategy: DIRECT or STAGED (case-insensitive).
    #[arg(short = 's', long, default_value = "DIRECT", value_parser = parse_strategy)]
    pub ingestion_strategy: PluginType,
}

fn parse_strategy(s: &str) -> Result<PluginType, String> {
    s.parse::<PluginType>().map_err(|e| e.to_string())
}

/// Execute `dvp init`.
pub fn run_init(args: &InitArgs, cwd: &Path) -> Result<u8> {
    let root = crate::resolve_path(&args.root_dir, cwd);

    let config = dvp_plugin::init(
        &root,
        args.ingestion_strategy,
        args.plugin_name.as_deref(),
    )
    .with_context(|| format!("failed to initialize plugin in {}", root.display()))?;

    println!(
        "Initialized {} plugin '{}' ({}) in {}",
        config.plugin_type,
        config.name,
        config.id,
        root.display()
    );
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_strategy_is_case_insensitive() {
        assert_eq!(parse_strategy("staged").unwrap(), PluginType::Staged);
        assert_eq!(parse_strategy("DIRECT").unwrap(), PluginType::Direct);
        assert!(parse_strategy("hybrid").is_err());
    }

    #[test]
    fn run_init_scaffolds_relative_to_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let args = InitArgs {
            root_dir: PathBuf::from("demo"),
            plugin_name: None,
            ingestion_strategy: PluginType::Staged,
        };
        assert_eq!(run_init(&args, dir.path()).unwrap(), 0);
        assert!(dir.path().join("demo/plugin_config.yml").is_file());
    }

    #[test]
    fn run_init_fails_on_existing_project() {
        let dir = tempfile::tempdir().unwrap();
        let args = InitArgs {
            root_dir: dir.path().to_path_buf(),
            plugin_name: Some("demo".to_string()),
            ingestion_strategy: PluginType::Direct,
        };
        run_init(&args, dir.path()).unwrap();
        let err = run_init(&args, dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("path already exists"));
    }
}
