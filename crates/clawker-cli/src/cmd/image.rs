//! `clawker image` - agent image management.

use crate::errors::CliError;
use crate::factory::Factory;
use crate::iostreams::ProgressBar;
use clap::Args;
use std::path::PathBuf;
use std::sync::Mutex;

/// Arguments for `clawker image inspect`.
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Image reference(s), `repo:tag` form
    #[arg(required = true)]
    pub references: Vec<String>,
}

/// Arguments for `clawker image build`.
#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Tag for the built image
    #[arg(short, long)]
    pub tag: String,

    /// Build context directory
    #[arg(default_value = ".")]
    pub context: PathBuf,

    /// Dockerfile path, when not `<context>/Dockerfile`
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// Arguments for `clawker image remove`.
#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Image reference
    pub reference: String,

    /// Remove even when containers still use the image
    #[arg(short, long)]
    pub force: bool,
}

/// List local images.
pub async fn list(factory: &Factory) -> Result<(), CliError> {
    let ios = factory.ios();
    let client = factory.client()?;
    let images = client.list_images().await?;
    if images.is_empty() {
        ios.print_empty("images", &["Run 'clawker image build -t <tag>' to build one."]);
        return Ok(());
    }
    let mut table = ios.table_printer();
    table.header(&["Reference", "Id", "Size", "Created"]);
    for image in &images {
        table
            .colored_field(&image.reference, |s, t| s.primary(t))
            .field(&image.id)
            .field(&image.size)
            .colored_field(&image.created, |s, t| s.muted(t))
            .end_row();
    }
    table.render()?;
    Ok(())
}

/// Print raw runtime metadata for each reference.
///
/// Found images are printed to Out even when a later reference fails; the
/// first failure is returned after the loop so `main` reports it once.
pub async fn inspect(factory: &Factory, args: InspectArgs) -> Result<(), CliError> {
    let ios = factory.ios();
    let client = factory.client()?;
    let mut first_err = None;
    for reference in &args.references {
        match client.inspect_image(reference).await {
            Ok(value) => {
                let body = serde_json::to_string_pretty(&value)
                    .map_err(|e| CliError::Other(e.into()))?;
                ios.out().write_line(&body)?;
            }
            Err(e) => {
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
    }
    match first_err {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Build an agent image, reporting step progress.
pub async fn build(factory: &Factory, args: BuildArgs) -> Result<(), CliError> {
    let ios = factory.ios();
    let client = factory.client()?;
    let opts = clawker_core::client::BuildOptions {
        context: args.context,
        dockerfile: args.file,
        tag: args.tag.clone(),
    };

    // The step total is only known once the runtime reports it, so the bar
    // is created on the first callback.
    let bar: Mutex<Option<ProgressBar>> = Mutex::new(None);
    let progress = |done: u64, total: u64| {
        let mut slot = bar.lock().unwrap();
        let bar = slot.get_or_insert_with(|| ios.progress_bar(total, "Building"));
        bar.set(done as i64);
    };
    let result = client.build_image(&opts, &progress).await;
    if let Some(bar) = bar.lock().unwrap().take() {
        bar.finish();
    }
    let id = result?;
    ios.print_success(format!("Built {} ({id})", args.tag));
    Ok(())
}

/// Remove an image.
pub async fn remove(factory: &Factory, args: RemoveArgs) -> Result<(), CliError> {
    let ios = factory.ios();
    let client = factory.client()?;
    client.remove_image(&args.reference, args.force).await?;
    ios.print_success(format!("Removed {}", args.reference));
    Ok(())
}
