//! `clawker init` - create the clawker home directory.

use crate::errors::CliError;
use crate::factory::Factory;
use clap::Args;
use clawker_core::config::Settings;

/// Arguments for `clawker init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite existing settings without asking
    #[arg(long)]
    pub force: bool,
}

/// Create the home directory layout and default settings.
pub fn run(factory: &Factory, args: InitArgs) -> Result<(), CliError> {
    let ios = factory.ios();
    std::fs::create_dir_all(clawker_core::projects_dir())?;
    std::fs::create_dir_all(clawker_core::sockets_dir())?;
    std::fs::create_dir_all(clawker_core::log_dir())?;

    let path = clawker_core::settings_path();
    if path.exists() && !args.force {
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
