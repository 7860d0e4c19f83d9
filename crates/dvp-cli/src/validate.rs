//! # Validate Subcommand
//!
//! `dvp validate` checks a plugin config, the source layout it points at,
//! and (unless skipped) its schema file. Warnings are printed; with
//! `--warnings-as-errors` any warning fails the command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use dvp_plugin::init::DEFAULT_PLUGIN_CONFIG_FILE;
use dvp_plugin::read_and_validate_plugin_config_file;

/// Arguments for `dvp validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Plugin config file to validate.
    #[arg(short = 'c', long, default_value = DEFAULT_PLUGIN_CONFIG_FILE)]
    pub plugin_config: PathBuf,

    /// Do not validate the schema file named by the config.
    #[arg(long)]
    pub skip_schema: bool,

    /// Fail when validation produces warnings.
    #[arg(long)]
    pub warnings_as_errors: bool,
}

/// Execute `dvp validate`.
///
/// Returns exit code: 0 when the config passed, 1 when warnings were
/// escalated.
pub fn run_validate(args: &ValidateArgs, cwd: &Path) -> Result<u8> {
    let path = crate::resolve_path(&args.plugin_config, cwd);

    let result =
        read_and_validate_plugin_config_file(&path, !args.skip_schema, args.warnings_as_errors)
            .with_context(|| format!("failed to validate {}", path.display()))?;

    for warning in &result.warnings {
        println!("  WARN: {warning}");
    }

    if result.passed() {
        println!(
            "{}: plugin '{}' is valid ({} warning(s))",
            path.display(),
            result.plugin_config_content.name,
            result.warnings.len()
        );
        Ok(0)
    } else {
        println!(
            "{}: {} warning(s) treated as errors",
            path.display(),
            result.warnings.len()
        );
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dvp_core::PluginType;

    fn args(warnings_as_errors: bool) -> ValidateArgs {
        ValidateArgs {
            plugin_config: PathBuf::from(DEFAULT_PLUGIN_CONFIG_FILE),
            skip_schema: false,
            warnings_as_errors,
        }
    }

    #[test]
    fn scaffolded_project_validates() {
        let dir = tempfile::tempdir().unwrap();
        dvp_plugin::init(dir.path(), PluginType::Direct, Some("demo")).unwrap();
        assert_eq!(run_validate(&args(true), dir.path()).unwrap(), 0);
    }

    #[test]
    fn escalated_warnings_exit_one() {
        let dir = tempfile::tempdir().unwrap();
        dvp_plugin::init(dir.path(), PluginType::Staged, None).unwrap();
        std::fs::write(dir.path().join("src/plugin_runner.py"), "# emptied\n").unwrap();

        assert_eq!(run_validate(&args(false), dir.path()).unwrap(), 0);
        assert_eq!(run_validate(&args(true), dir.path()).unwrap(), 1);
    }

    #[test]
    fn missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_validate(&args(false), dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("required file not found"));
    }
}
