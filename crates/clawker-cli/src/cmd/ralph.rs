//! `clawker ralph` - the brute-force agent loop.
//!
//! Launches a container that re-runs the agent against the same prompt
//! until it converges or hits the iteration cap. The loop itself lives in
//! the agent image; this command prepares and starts the container.

use crate::errors::CliError;
use crate::factory::Factory;
use clap::Args;
use clawker_core::client::CreateOptions;
use clawker_core::config::ProjectConfig;
use std::path::PathBuf;

/// Arguments for `clawker ralph run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Project configuration file
    #[arg(long, default_value = "clawker.yml")]
    pub config: PathBuf,

    /// Prompt handed to every iteration
    #[arg(long)]
    pub prompt: Option<String>,

    /// Stop after this many iterations
    #[arg(long, default_value_t = 10)]
    pub max_iterations: u32,
}

/// Launch the agent loop container for the current project.
pub async fn run(factory: &Factory, args: RunArgs) -> Result<(), CliError> {
    let ios = factory.ios();
    let settings = factory.settings()?;
    let client = factory.client()?;

    let project = ProjectConfig::load_from(&args.config)?;
    let project_name = if project.name.is_empty() {
        "agent".to_string()
    } else {
        project.name.clone()
    };
    let container_name = format!("{project_name}-ralph");

    let mut env: Vec<(String, String)> = project
        .env
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    env.push((
        "CLAWKER_RALPH_MAX_ITERATIONS".to_string(),
        args.max_iterations.to_string(),
    ));
    if let Some(prompt) = &args.prompt {
        env.push(("CLAWKER_RALPH_PROMPT".to_string(), prompt.clone()));
    }

    let mut mounts = project.mounts.clone();
    mounts.push(factory.bridge().prepare(&container_name)?);

    let opts = CreateOptions {
        name: container_name.clone(),
        image: if project.image.is_empty() {
            settings.default_image.clone()
        } else {
            project.image.clone()
        },
        env,
        ports: project.ports.clone(),
        mounts,
        workdir: None,
        command: settings.agent_command.clone(),
    };

    let id = ios
        .run_with_spinner(
            &format!("Launching {container_name}"),
            client.create_container(&opts),
        )
        .await?;
    client.start_container(&container_name).await?;
    ios.print_success(format!("Agent loop running in '{container_name}' ({id})"));
    ios.print_info("Follow along with 'clawker monitor status'.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::testutil::FakeClient;
    use super::*;
    use crate::iostreams::IoStreams;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_run_launches_loop_container() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("clawker.yml");
        std::fs::write(&config_path, "name: demo\nimage: custom:1\n").unwrap();

        let (ios, handles) = IoStreams::test();
        let mut factory = Factory::test(Arc::new(ios));
        let fake = Arc::new(FakeClient::new());
        let injected = Arc::clone(&fake);
        factory.set_client_ctor(Box::new(move || {
            Ok(Arc::clone(&injected) as Arc<dyn clawker_core::client::ContainerClient>)
        }));
        factory.set_bridge(clawker_core::bridge::SocketBridge::with_root(
            dir.path().join("sockets"),
        ));

        run(
            &factory,
            RunArgs {
                config: config_path,
                prompt: Some("fix the tests".to_string()),
                max_iterations: 3,
            },
        )
        .await
        .unwrap();

        let containers = fake.containers.lock().unwrap();
        assert_eq!(containers[0].name, "demo-ralph");
        assert_eq!(containers[0].image, "custom:1");
        assert_eq!(containers[0].state, "running");
        assert!(handles.err_string().contains("Agent loop running in 'demo-ralph'"));
    }

    #[tokio::test]
    async fn test_run_missing_config_fails() {
        let (ios, _handles) = IoStreams::test();
        let factory = Factory::test(Arc::new(ios));
        let err = run(
            &factory,
            RunArgs {
                config: PathBuf::from("nowhere/clawker.yml"),
                prompt: None,
                max_iterations: 10,
            },
        )
        .await
        .unwrap_err();
        assert!(format!("{err}").contains("Configuration file not found"));
    }
}
