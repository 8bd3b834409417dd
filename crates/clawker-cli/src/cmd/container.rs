//! `clawker container` - lifecycle of agent containers.

use crate::errors::CliError;
use crate::factory::Factory;
use clap::Args;
use clawker_core::client::CreateOptions;

/// Arguments naming one or more containers.
#[derive(Debug, Args)]
pub struct NamesArgs {
    /// Container name(s)
    #[arg(required = true)]
    pub names: Vec<String>,
}

/// Arguments for `clawker container create`.
#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Container name
    pub name: String,

    /// Image reference (defaults to the configured default image)
    #[arg(long)]
    pub image: Option<String>,

    /// Host:container port mapping (repeatable)
    #[arg(long = "port", short = 'p')]
    pub ports: Vec<String>,

    /// Environment variable, KEY=VALUE (repeatable)
    #[arg(long = "env", short = 'e')]
    pub env: Vec<String>,

    /// Bind mount, host:container (repeatable)
    #[arg(long = "mount")]
    pub mounts: Vec<String>,

    /// Working directory inside the container
    #[arg(long)]
    pub workdir: Option<String>,
}

/// Arguments for `clawker container remove`.
#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Container name(s)
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Remove without confirmation, even if running
    #[arg(short, long)]
    pub force: bool,
}

/// List managed containers.
pub async fn list(factory: &Factory) -> Result<(), CliError> {
    let ios = factory.ios();
    let client = factory.client()?;
    let containers = client.list_containers().await?;
    if containers.is_empty() {
        ios.print_empty(
            "containers",
            &["Run 'clawker container create <name>' to make one."],
        );
        return Ok(());
    }
    let mut table = ios.table_printer();
    table.header(&["Name", "Image", "State", "Status"]);
    for c in &containers {
        table
            .colored_field(&c.name, |s, t| s.primary(t))
            .field(&c.image)
            .field(ios.badge(&c.state))
            .colored_field(&c.status, |s, t| s.muted(t))
            .end_row();
    }
    table.render()?;
    Ok(())
}

/// Create an agent container.
pub async fn create(factory: &Factory, args: CreateArgs) -> Result<(), CliError> {
    let ios = factory.ios();
    let settings = factory.settings()?;
    let client = factory.client()?;

    let mut env = Vec::new();
    for pair in &args.env {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(CliError::Other(anyhow::anyhow!(
                "invalid --env '{pair}', expected KEY=VALUE"
            )));
        };
        env.push((key.to_string(), value.to_string()));
    }

    let mut mounts = args.mounts.clone();
    mounts.push(factory.bridge().prepare(&args.name)?);

    let opts = CreateOptions {
        name: args.name.clone(),
        image: args
            .image
            .unwrap_or_else(|| settings.default_image.clone()),
        env,
        ports: args.ports,
        mounts,
        workdir: args.workdir,
        command: settings.agent_command.clone(),
    };

    let id = ios
        .run_with_spinner(
            &format!("Creating {}", args.name),
            client.create_container(&opts),
        )
        .await?;
    ios.print_success(format!("Created container '{}' ({id})", args.name));
    Ok(())
}

/// Start containers.
pub async fn start(factory: &Factory, args: NamesArgs) -> Result<(), CliError> {
    for_each(factory, &args.names, |client, name| async move {
        Ok(client.start_container(&name).await?)
    })
    .await
}

/// Pause containers.
pub async fn pause(factory: &Factory, args: NamesArgs) -> Result<(), CliError> {
    for_each(factory, &args.names, |client, name| async move {
        Ok(client.pause_container(&name).await?)
    })
    .await
}

/// Resume paused containers.
pub async fn resume(factory: &Factory, args: NamesArgs) -> Result<(), CliError> {
    for_each(factory, &args.names, |client, name| async move {
        Ok(client.unpause_container(&name).await?)
    })
    .await
}

/// Remove containers, confirming first unless forced.
pub async fn remove(factory: &Factory, args: RemoveArgs) -> Result<(), CliError> {
    let ios = factory.ios();
    if !args.force {
        let question = format!(
            "Remove {} container(s): {}?",
            args.names.len(),
            args.names.join(", ")
        );
        if !factory.prompter().confirm(&question, false)? {
            ios.print_info("Aborted.");
            return Err(CliError::Silent);
        }
    }
    let force = args.force;
    for_each(factory, &args.names, move |client, name| async move {
        client.remove_container(&name, force).await?;
        factory.bridge().cleanup(&name)?;
        Ok(())
    })
    .await
}

/// Apply `op` to each name: successes are listed on Out, failures become
/// one failure line each on ErrOut. Any failure makes the whole command a
/// silent error, since everything worth saying was already said.
async fn for_each<F, Fut>(factory: &Factory, names: &[String], op: F) -> Result<(), CliError>
where
    F: Fn(std::sync::Arc<dyn clawker_core::client::ContainerClient>, String) -> Fut,
    Fut: Future<Output = Result<(), anyhow::Error>>,
{
    let ios = factory.ios();
    let client = factory.client()?;
    let mut failed = false;
    for name in names {
        match op(std::sync::Arc::clone(&client), name.clone()).await {
            Ok(()) => {
                ios.out().write_line(name)?;
            }
            Err(e) => {
                ios.print_failure(format!("{name}: {e}"));
                failed = true;
            }
        }
    }
    if failed { Err(CliError::Silent) } else { Ok(()) }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::FakeClient;
    use super::*;
    use crate::iostreams::IoStreams;
    use std::sync::Arc;

    fn factory_with(fake: FakeClient) -> (Factory, crate::iostreams::TestStreams, Arc<FakeClient>) {
        let (ios, handles) = IoStreams::test();
        let mut factory = Factory::test(Arc::new(ios));
        let fake = Arc::new(fake);
        let injected = Arc::clone(&fake);
        factory.set_client_ctor(Box::new(move || {
            Ok(Arc::clone(&injected) as Arc<dyn clawker_core::client::ContainerClient>)
        }));
        (factory, handles, fake)
    }

    #[tokio::test]
    async fn test_pause_partial_failure() {
        let (factory, handles, fake) = factory_with(FakeClient::new().with_container("c1", "running"));
        let args = NamesArgs {
            names: vec!["c1".to_string(), "c2".to_string()],
        };
        let err = pause(&factory, args).await.unwrap_err();
        assert!(matches!(err, CliError::Silent));
        assert_eq!(handles.out_string(), "c1\n");
        assert!(handles.err_string().contains("c2: container 'c2' not found"));
        assert_eq!(fake.containers.lock().unwrap()[0].state, "paused");
    }

    #[tokio::test]
    async fn test_start_all_succeed() {
        let (factory, handles, _fake) = factory_with(
            FakeClient::new()
                .with_container("a", "created")
                .with_container("b", "created"),
        );
        let args = NamesArgs {
            names: vec!["a".to_string(), "b".to_string()],
        };
        start(&factory, args).await.unwrap();
        assert_eq!(handles.out_string(), "a\nb\n");
        assert_eq!(handles.err_string(), "");
    }

    #[tokio::test]
    async fn test_list_empty_prints_hint() {
        let (factory, handles, _fake) = factory_with(FakeClient::new());
        list(&factory).await.unwrap();
        assert_eq!(handles.out_string(), "");
        assert!(handles.err_string().starts_with("No containers found.\n"));
    }

    #[tokio::test]
    async fn test_list_piped_is_tabbed() {
        let (factory, handles, _fake) =
            factory_with(FakeClient::new().with_container("web", "running"));
        list(&factory).await.unwrap();
        let out = handles.out_string();
        assert!(out.starts_with("web\tclawker/agent:latest\tRUNNING\t"));
        assert!(!out.contains('\u{1b}'));
    }

    #[tokio::test]
    async fn test_create_uses_default_image_and_bridge_mount() {
        let dir = tempfile::tempdir().unwrap();
        let (ios, handles) = IoStreams::test();
        let mut factory = Factory::test(Arc::new(ios));
        let fake = Arc::new(FakeClient::new());
        let injected = Arc::clone(&fake);
        factory.set_client_ctor(Box::new(move || {
            Ok(Arc::clone(&injected) as Arc<dyn clawker_core::client::ContainerClient>)
        }));
        factory.set_bridge(clawker_core::bridge::SocketBridge::with_root(
            dir.path().to_path_buf(),
        ));
        let args = CreateArgs {
            name: "agent-1".to_string(),
            image: None,
            ports: vec![],
            env: vec!["MODE=loop".to_string()],
            mounts: vec![],
            workdir: None,
        };
        create(&factory, args).await.unwrap();
        assert!(handles.err_string().contains("Created container 'agent-1'"));
        let containers = fake.containers.lock().unwrap();
        assert_eq!(containers[0].image, "clawker/agent:latest");
    }

    #[tokio::test]
    async fn test_remove_declined_is_silent() {
        let (factory, handles, fake) =
            factory_with(FakeClient::new().with_container("c1", "running"));
        // Non-interactive confirm answers the default (no).
        let args = RemoveArgs {
            names: vec!["c1".to_string()],
            force: false,
        };
        let err = remove(&factory, args).await.unwrap_err();
        assert!(matches!(err, CliError::Silent));
        assert!(handles.err_string().contains("Aborted."));
        assert_eq!(fake.containers.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_forced() {
        let (factory, handles, fake) =
            factory_with(FakeClient::new().with_container("c1", "running"));
        let args = RemoveArgs {
            names: vec!["c1".to_string()],
            force: true,
        };
        remove(&factory, args).await.unwrap();
        assert_eq!(handles.out_string(), "c1\n");
        assert!(fake.containers.lock().unwrap().is_empty());
    }
}
