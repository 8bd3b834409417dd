//! `clawker config` - validate and scaffold configuration.

use crate::errors::CliError;
use crate::factory::Factory;
use clap::Args;
use clawker_core::config::{ProjectConfig, Settings};
use std::path::PathBuf;

/// Arguments for `clawker config check`.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Project configuration file to validate
    #[arg(long, default_value = "clawker.yml")]
    pub file: PathBuf,
}

/// Validate a project configuration file.
pub fn check(factory: &Factory, args: CheckArgs) -> Result<(), CliError> {
    let ios = factory.ios();
    let config = ProjectConfig::load_from(&args.file)?;
    let problems = config.check();
    if problems.is_empty() {
        ios.print_success(format!("{} is valid", args.file.display()));
        return Ok(());
    }
    for problem in &problems {
        ios.print_warning(problem);
    }
    // Diagnostics above are the full report.
    Err(CliError::Silent)
}

/// Write default settings to the clawker home.
pub fn init(factory: &Factory) -> Result<(), CliError> {
    let ios = factory.ios();
    let path = clawker_core::settings_path();
    if path.exists() {
        let overwrite = factory
            .prompter()
            .confirm(&format!("Overwrite {}?", path.display()), false)?;
        if !overwrite {
            ios.print_info("Existing settings left unchanged.");
            return Ok(());
        }
    }
    Settings::init(&path)?;
    ios.print_success(format!("Created: {}", path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iostreams::IoStreams;
    use std::sync::Arc;

    fn factory() -> (Factory, crate::iostreams::TestStreams) {
        let (ios, handles) = IoStreams::test();
        (Factory::test(Arc::new(ios)), handles)
    }

    #[test]
    fn test_check_missing_file_reports_absolute_path() {
        let (factory, _handles) = factory();
        let args = CheckArgs {
            file: PathBuf::from("definitely-missing.yaml"),
        };
        let err = check(&factory, args).unwrap_err();
        let rendered = format!("{err}");
        assert!(rendered.starts_with("Configuration file not found: "));
        assert!(rendered.ends_with("definitely-missing.yaml"));
        assert!(PathBuf::from(rendered.trim_start_matches("Configuration file not found: ")).is_absolute());
    }

    #[test]
    fn test_check_clean_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clawker.yml");
        std::fs::write(&path, "name: demo\nimage: clawker/agent:latest\n").unwrap();

        let (factory, handles) = factory();
        check(&factory, CheckArgs { file: path.clone() }).unwrap();
        assert!(handles.err_string().contains("is valid"));
        assert_eq!(handles.out_string(), "");
    }

    #[test]
    fn test_check_reports_all_problems() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clawker.yml");
        std::fs::write(
            &path,
            "image: untagged\nports: ['8080:80', '8080:81', 'nope']\n",
        )
        .unwrap();

        let (factory, handles) = factory();
        let err = check(&factory, CheckArgs { file: path }).unwrap_err();
        assert!(matches!(err, CliError::Silent));
        let err_out = handles.err_string();
        assert!(err_out.contains("has no tag"));
        assert!(err_out.contains("mapped more than once"));
        assert!(err_out.contains("invalid port mapping 'nope'"));
    }
}
