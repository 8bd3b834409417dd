//! `clawker project` - project registry under the clawker home.

use crate::errors::CliError;
use crate::factory::Factory;
use clap::Args;
use clawker_core::config::ProjectConfig;

/// Arguments for `clawker project create`.
#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Project name
    pub name: String,

    /// Image override for this project
    #[arg(long)]
    pub image: Option<String>,
}

/// List registered projects.
pub fn list(factory: &Factory) -> Result<(), CliError> {
    let ios = factory.ios();
    let root = clawker_core::projects_dir();
    let mut projects = Vec::new();
    if root.is_dir() {
        for entry in std::fs::read_dir(&root)? {
            let entry = entry?;
            let config_path = entry.path().join("clawker.yml");
            if !config_path.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match ProjectConfig::load_from(&config_path) {
                Ok(config) => projects.push((name, config.image)),
                Err(e) => {
                    tracing::warn!(project = %name, error = %e, "skipping unreadable project");
                    ios.print_warning(format!("{name}: {e}"));
                }
            }
        }
    }
    if projects.is_empty() {
        ios.print_empty("projects", &["Run 'clawker project create <name>' to add one."]);
        return Ok(());
    }
    projects.sort();
    let mut table = ios.table_printer();
    table.header(&["Name", "Image"]);
    for (name, image) in &projects {
        table
            .colored_field(name, |s, t| s.primary(t))
            .field(if image.is_empty() {
                "(default)"
            } else {
                image.as_str()
            })
            .end_row();
    }
    table.render()?;
    Ok(())
}

/// Create a project skeleton with a default `clawker.yml`.
pub fn create(factory: &Factory, args: CreateArgs) -> Result<(), CliError> {
    let ios = factory.ios();
    let dir = clawker_core::projects_dir().join(&args.name);
    let config_path = dir.join("clawker.yml");
    if config_path.exists() {
        return Err(CliError::Other(anyhow::anyhow!(
            "project '{}' already exists at {}",
            args.name,
            dir.display()
        )));
    }
    let config = ProjectConfig {
        name: args.name.clone(),
        image: args.image.unwrap_or_default(),
        ..ProjectConfig::default()
    };
    config.store(&config_path)?;
    ios.print_success(format!(
        "Created project '{}' at {}",
        args.name,
        dir.display()
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::testutil::ENV_LOCK;
    use crate::iostreams::IoStreams;
    use std::sync::Arc;

    fn factory() -> (Factory, crate::iostreams::TestStreams) {
        let (ios, handles) = IoStreams::test();
        (Factory::test(Arc::new(ios)), handles)
    }

    #[test]
    #[allow(unsafe_code)]
    fn test_create_then_list_round_trip() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        unsafe { std::env::set_var("CLAWKER_HOME", dir.path()) };

        let (factory, handles) = factory();
        create(
            &factory,
            CreateArgs {
                name: "demo".to_string(),
                image: Some("custom:1".to_string()),
            },
        )
        .unwrap();
        assert!(handles.err_string().contains("Created project 'demo'"));

        let (factory, handles) = super::tests::factory();
        list(&factory).unwrap();
        assert_eq!(handles.out_string(), "demo\tcustom:1\n");

        let (factory, _handles) = super::tests::factory();
        let err = create(
            &factory,
            CreateArgs {
                name: "demo".to_string(),
                image: None,
            },
        )
        .unwrap_err();
        assert!(format!("{err}").contains("already exists"));

        unsafe { std::env::remove_var("CLAWKER_HOME") };
    }

    #[test]
    #[allow(unsafe_code)]
    fn test_list_empty_home() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        unsafe { std::env::set_var("CLAWKER_HOME", dir.path()) };

        let (factory, handles) = factory();
        list(&factory).unwrap();
        assert!(handles.err_string().starts_with("No projects found.\n"));

        unsafe { std::env::remove_var("CLAWKER_HOME") };
    }
}
