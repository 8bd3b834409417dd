//! `clawker monitor` - the local monitoring stack.

use crate::errors::CliError;
use crate::factory::Factory;
use clawker_core::bridge::HostProxy;
use clawker_core::client::{ClientError, CreateOptions};

/// Container name carrying the monitor stack.
pub const MONITOR_CONTAINER: &str = "clawker-monitor";

/// Image the monitor stack runs from.
pub const MONITOR_IMAGE: &str = "clawker/monitor:latest";

fn proxy(factory: &Factory) -> Result<HostProxy, CliError> {
    let settings = factory.settings()?;
    let specs: Vec<String> = settings
        .monitor_ports
        .iter()
        .map(|p| format!("{p}:{p}"))
        .collect();
    Ok(HostProxy::new(&specs)?)
}

/// Show monitor stack status and its port forwards.
pub async fn status(factory: &Factory) -> Result<(), CliError> {
    let ios = factory.ios();
    let client = factory.client()?;
    let containers = client.list_containers().await?;
    let Some(monitor) = containers.iter().find(|c| c.name == MONITOR_CONTAINER) else {
        ios.print_empty("monitor stack", &["Run 'clawker monitor up' to start it."]);
        return Ok(());
    };
    ios.print_fields(&[
        ("Name", monitor.name.clone()),
        ("Image", monitor.image.clone()),
        ("State", ios.badge(&monitor.state)),
        ("Status", monitor.status.clone()),
    ]);
    for (host, container) in proxy(factory)?.forwards() {
        let _ = ios
            .out()
            .write_line(&format!("http://localhost:{host} -> {container}"));
    }
    Ok(())
}

/// Start the monitor stack container.
pub async fn up(factory: &Factory) -> Result<(), CliError> {
    let ios = factory.ios();
    let client = factory.client()?;
    let proxy = proxy(factory)?;

    let containers = client.list_containers().await?;
    if !containers.iter().any(|c| c.name == MONITOR_CONTAINER) {
        let opts = CreateOptions {
            name: MONITOR_CONTAINER.to_string(),
            image: MONITOR_IMAGE.to_string(),
            ports: proxy.port_args(),
            ..CreateOptions::default()
        };
        ios.run_with_spinner("Creating monitor stack", client.create_container(&opts))
            .await?;
    }
    ios.run_with_spinner(
        "Starting monitor stack",
        client.start_container(MONITOR_CONTAINER),
    )
    .await?;
    ios.print_success("Monitor stack running");
    for (host, _) in proxy.forwards() {
        ios.print_info(format!("http://localhost:{host}"));
    }
    Ok(())
}

/// Stop and remove the monitor stack container.
pub async fn down(factory: &Factory) -> Result<(), CliError> {
    let ios = factory.ios();
    let client = factory.client()?;
    match client.stop_container(MONITOR_CONTAINER).await {
        Ok(()) => {}
        Err(ClientError::NotFound { .. }) => {
            ios.print_info("Monitor stack is not running.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }
    client.remove_container(MONITOR_CONTAINER, true).await?;
    ios.print_success("Monitor stack stopped");
    Ok(())
}
