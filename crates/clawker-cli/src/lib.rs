//! clawker - sandboxed agent containers
//!
//! Launches and manages containerized coding agents. Every subcommand talks
//! to the terminal through [`iostreams::IoStreams`] (data on stdout, status
//! on stderr) and reaches services through the [`factory::Factory`], so the
//! whole surface is drivable from tests without a container daemon.

pub mod cmd;
pub mod errors;
pub mod factory;
pub mod iostreams;
pub mod prompter;
pub mod update;

use clap::{ArgAction, Parser, Subcommand};
use errors::CliError;
use factory::Factory;

/// Root argument parser.
#[derive(Debug, Parser)]
#[command(name = "clawker")]
#[command(version = env!("CLAWKER_VERSION"))]
#[command(about = "clawker - sandboxed agent containers")]
pub struct Cli {
    /// Increase log verbosity (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Force color output on
    #[arg(long, global = true, conflicts_with = "no_color")]
    pub color: bool,

    /// Force color output off
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Answer every prompt with its default
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// The invoked subcommand.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Inspect and validate configuration
    Config {
        /// The subcommand to run.
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Manage agent projects
    Project {
        /// The subcommand to run.
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Manage agent containers
    Container {
        /// The subcommand to run.
        #[command(subcommand)]
        command: ContainerCommands,
    },
    /// Manage agent images
    Image {
        /// The subcommand to run.
        #[command(subcommand)]
        command: ImageCommands,
    },
    /// Manage git worktrees for agent runs
    Worktree {
        /// The subcommand to run.
        #[command(subcommand)]
        command: WorktreeCommands,
    },
    /// Manage the monitoring stack
    Monitor {
        /// The subcommand to run.
        #[command(subcommand)]
        command: MonitorCommands,
    },
    /// Run an agent in a loop until it converges
    Ralph {
        /// The subcommand to run.
        #[command(subcommand)]
        command: RalphCommands,
    },
    /// Initialize the clawker home directory
    Init(cmd::init::InitArgs),
    /// Print version and build information
    Version,
}

/// `clawker config ...`
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Validate a project configuration file
    Check(cmd::config::CheckArgs),
    /// Write default settings to the clawker home
    Init,
}

/// `clawker project ...`
#[derive(Debug, Subcommand)]
pub enum ProjectCommands {
    /// List registered projects
    List,
    /// Create a project skeleton
    Create(cmd::project::CreateArgs),
}

/// `clawker container ...`
#[derive(Debug, Subcommand)]
pub enum ContainerCommands {
    /// List managed containers
    List,
    /// Create an agent container
    Create(cmd::container::CreateArgs),
    /// Start containers
    Start(cmd::container::NamesArgs),
    /// Pause containers
    Pause(cmd::container::NamesArgs),
    /// Resume paused containers
    Resume(cmd::container::NamesArgs),
    /// Remove containers
    Remove(cmd::container::RemoveArgs),
}

/// `clawker image ...`
#[derive(Debug, Subcommand)]
pub enum ImageCommands {
    /// List local images
    List,
    /// Show raw runtime metadata for images
    Inspect(cmd::image::InspectArgs),
    /// Build an agent image
    Build(cmd::image::BuildArgs),
    /// Remove an image
    Remove(cmd::image::RemoveArgs),
}

/// `clawker worktree ...`
#[derive(Debug, Subcommand)]
pub enum WorktreeCommands {
    /// List worktrees of the current repository
    List,
    /// Add a worktree for a branch
    Add(cmd::worktree::AddArgs),
    /// Remove a worktree
    Remove(cmd::worktree::RemoveArgs),
}

/// `clawker monitor ...`
#[derive(Debug, Subcommand)]
pub enum MonitorCommands {
    /// Show monitor stack status
    Status,
    /// Start the monitor stack
    Up,
    /// Stop the monitor stack
    Down,
}

/// `clawker ralph ...`
#[derive(Debug, Subcommand)]
pub enum RalphCommands {
    /// Launch the agent loop container
    Run(cmd::ralph::RunArgs),
}

impl Commands {
    /// The full command path, for the help footer.
    pub fn path(&self) -> String {
        let leaf: &[&str] = match self {
            Self::Config { command } => match command {
                ConfigCommands::Check(_) => &["config", "check"],
                ConfigCommands::Init => &["config", "init"],
            },
            Self::Project { command } => match command {
                ProjectCommands::List => &["project", "list"],
                ProjectCommands::Create(_) => &["project", "create"],
            },
            Self::Container { command } => match command {
                ContainerCommands::List => &["container", "list"],
                ContainerCommands::Create(_) => &["container", "create"],
                ContainerCommands::Start(_) => &["container", "start"],
                ContainerCommands::Pause(_) => &["container", "pause"],
                ContainerCommands::Resume(_) => &["container", "resume"],
                ContainerCommands::Remove(_) => &["container", "remove"],
            },
            Self::Image { command } => match command {
                ImageCommands::List => &["image", "list"],
                ImageCommands::Inspect(_) => &["image", "inspect"],
                ImageCommands::Build(_) => &["image", "build"],
                ImageCommands::Remove(_) => &["image", "remove"],
            },
            Self::Worktree { command } => match command {
                WorktreeCommands::List => &["worktree", "list"],
                WorktreeCommands::Add(_) => &["worktree", "add"],
                WorktreeCommands::Remove(_) => &["worktree", "remove"],
            },
            Self::Monitor { command } => match command {
                MonitorCommands::Status => &["monitor", "status"],
                MonitorCommands::Up => &["monitor", "up"],
                MonitorCommands::Down => &["monitor", "down"],
            },
            Self::Ralph { command } => match command {
                RalphCommands::Run(_) => &["ralph", "run"],
            },
            Self::Init(_) => &["init"],
            Self::Version => &["version"],
        };
        let mut path = "clawker".to_string();
        for part in leaf {
            path.push(' ');
            path.push_str(part);
        }
        path
    }
}

/// Route a parsed invocation to its command.
///
/// Commands never print classified errors or exit the process; they return
/// a [`CliError`] for `main` to render.
pub async fn dispatch(factory: &Factory, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Config { command } => match command {
            ConfigCommands::Check(args) => cmd::config::check(factory, args),
            ConfigCommands::Init => cmd::config::init(factory),
        },
        Commands::Project { command } => match command {
            ProjectCommands::List => cmd::project::list(factory),
            ProjectCommands::Create(args) => cmd::project::create(factory, args),
        },
        Commands::Container { command } => match command {
            ContainerCommands::List => cmd::container::list(factory).await,
            ContainerCommands::Create(args) => cmd::container::create(factory, args).await,
            ContainerCommands::Start(args) => cmd::container::start(factory, args).await,
            ContainerCommands::Pause(args) => cmd::container::pause(factory, args).await,
            ContainerCommands::Resume(args) => cmd::container::resume(factory, args).await,
            ContainerCommands::Remove(args) => cmd::container::remove(factory, args).await,
        },
        Commands::Image { command } => match command {
            ImageCommands::List => cmd::image::list(factory).await,
            ImageCommands::Inspect(args) => cmd::image::inspect(factory, args).await,
            ImageCommands::Build(args) => cmd::image::build(factory, args).await,
            ImageCommands::Remove(args) => cmd::image::remove(factory, args).await,
        },
        Commands::Worktree { command } => match command {
            WorktreeCommands::List => cmd::worktree::list(factory).await,
            WorktreeCommands::Add(args) => cmd::worktree::add(factory, args).await,
            WorktreeCommands::Remove(args) => cmd::worktree::remove(factory, args).await,
        },
        Commands::Monitor { command } => match command {
            MonitorCommands::Status => cmd::monitor::status(factory).await,
            MonitorCommands::Up => cmd::monitor::up(factory).await,
            MonitorCommands::Down => cmd::monitor::down(factory).await,
        },
        Commands::Ralph { command } => match command {
            RalphCommands::Run(args) => cmd::ralph::run(factory, args).await,
        },
        Commands::Init(args) => cmd::init::run(factory, args),
        Commands::Version => cmd::version::run(factory),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_paths() {
        let cli = Cli::try_parse_from(["clawker", "image", "inspect", "x:latest"]).unwrap();
        assert_eq!(cli.command.path(), "clawker image inspect");

        let cli = Cli::try_parse_from(["clawker", "init"]).unwrap();
        assert_eq!(cli.command.path(), "clawker init");

        let cli = Cli::try_parse_from(["clawker", "container", "pause", "c1", "c2"]).unwrap();
        assert_eq!(cli.command.path(), "clawker container pause");
    }

    #[test]
    fn test_global_flags_parse_anywhere() {
        let cli = Cli::try_parse_from(["clawker", "container", "list", "--yes", "-v"]).unwrap();
        assert!(cli.yes);
        assert_eq!(cli.verbose, 1);

        assert!(Cli::try_parse_from(["clawker", "--color", "--no-color", "version"]).is_err());
    }

    #[test]
    fn test_unknown_subcommand_is_flag_error() {
        let err = Cli::try_parse_from(["clawker", "frobnicate"]).unwrap_err();
        assert!(err.use_stderr());
    }
}
