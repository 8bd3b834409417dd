//! `clawker worktree` - one worktree per agent run.

use crate::errors::CliError;
use crate::factory::Factory;
use clap::Args;
use std::path::PathBuf;

/// Arguments for `clawker worktree add`.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Branch to check out (created when missing)
    pub branch: String,

    /// Worktree location; defaults to `.worktrees/<branch>`
    #[arg(long)]
    pub path: Option<PathBuf>,
}

/// Arguments for `clawker worktree remove`.
#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Worktree path
    pub path: PathBuf,

    /// Remove even when the worktree is dirty
    #[arg(short, long)]
    pub force: bool,
}

/// List worktrees of the current repository.
pub async fn list(factory: &Factory) -> Result<(), CliError> {
    let ios = factory.ios();
    let git = factory.git()?;
    let worktrees = git.list_worktrees().await?;
    if worktrees.is_empty() {
        ios.print_empty("worktrees", &["Run 'clawker worktree add <branch>' to add one."]);
        return Ok(());
    }
    let mut table = ios.table_printer();
    table.header(&["Path", "Branch", "Head"]);
    for wt in &worktrees {
        let head: String = wt.head.chars().take(8).collect();
        table
            .colored_field(wt.path.display().to_string(), |s, t| s.primary(t))
            .field(wt.branch.as_deref().unwrap_or("(detached)"))
            .colored_field(head, |s, t| s.muted(t))
            .end_row();
    }
    table.render()?;
    Ok(())
}

/// Add a worktree for a branch.
pub async fn add(factory: &Factory, args: AddArgs) -> Result<(), CliError> {
    let ios = factory.ios();
    let git = factory.git()?;
    let path = args
        .path
        .unwrap_or_else(|| PathBuf::from(".worktrees").join(&args.branch));
    ios.run_with_spinner(
        &format!("Adding worktree for {}", args.branch),
        git.add_worktree(&path, &args.branch),
    )
    .await?;
    ios.print_success(format!(
        "Added worktree for '{}' at {}",
        args.branch,
        path.display()
    ));
    Ok(())
}

/// Remove a worktree.
pub async fn remove(factory: &Factory, args: RemoveArgs) -> Result<(), CliError> {
    let ios = factory.ios();
    let git = factory.git()?;
    git.remove_worktree(&args.path, args.force).await?;
    ios.print_success(format!("Removed worktree {}", args.path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iostreams::IoStreams;
    use clawker_core::git::GitManager;
    use std::process::Command;
    use std::sync::Arc;

    fn init_repo(dir: &std::path::Path) -> bool {
        let run = |args: &[&str]| {
            Command::new("git")
                .args(args)
                .current_dir(dir)
                .output()
                .map(|o| o.status.success())
                .unwrap_or(false)
        };
        run(&["init", "-q", "-b", "main"])
            && run(&["config", "user.email", "test@example.com"])
            && run(&["config", "user.name", "test"])
            && run(&["commit", "--allow-empty", "-q", "-m", "init"])
    }

    fn factory_for(repo: std::path::PathBuf) -> (Factory, crate::iostreams::TestStreams) {
        let (ios, handles) = IoStreams::test();
        let mut factory = Factory::test(Arc::new(ios));
        factory.set_git_ctor(Box::new(move || GitManager::discover(&repo)));
        (factory, handles)
    }

    #[tokio::test]
    async fn test_add_list_remove_round_trip() {
        if which::which("git").is_err() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        if !init_repo(dir.path()) {
            return;
        }
        let (factory, handles) = factory_for(dir.path().to_path_buf());

        let wt_path = dir.path().join("wt-feature");
        add(
            &factory,
            AddArgs {
                branch: "feature".to_string(),
                path: Some(wt_path.clone()),
            },
        )
        .await
        .unwrap();
        assert!(handles.err_string().contains("Added worktree for 'feature'"));

        let (factory, handles) = factory_for(dir.path().to_path_buf());
        list(&factory).await.unwrap();
        let out = handles.out_string();
        assert!(out.contains("wt-feature"));
        assert!(out.contains("feature"));

        let (factory, handles) = factory_for(dir.path().to_path_buf());
        remove(
            &factory,
            RemoveArgs {
                path: wt_path,
                force: false,
            },
        )
        .await
        .unwrap();
        assert!(handles.err_string().contains("Removed worktree"));
    }
}
