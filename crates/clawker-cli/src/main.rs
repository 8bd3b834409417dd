//! clawker - sandboxed agent containers

use clap::Parser;
use clawker_cli::errors::CliError;
use clawker_cli::factory::Factory;
use clawker_cli::iostreams::IoStreams;
use clawker_cli::update::UpdateChecker;
use clawker_cli::{Cli, dispatch, update};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let ios = Arc::new(IoStreams::system());

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return finish_parse(&ios, &e),
    };

    // Logging goes to stderr so Out stays parseable; -v widens the filter.
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if cli.color {
        ios.set_color_enabled(true);
    }
    if cli.no_color {
        ios.set_color_enabled(false);
    }
    if cli.yes {
        ios.set_never_prompt(true);
    }

    let factory = Factory::new(Arc::clone(&ios), env!("CLAWKER_VERSION"), "clawker");
    let mut checker = UpdateChecker::spawn(factory.app_version());

    let command_path = cli.command.path();
    let result = dispatch(&factory, cli.command).await;

    // Let the update task send its one message promptly.
    checker.cancel();

    let code = match result {
        Ok(()) => 0,
        Err(err) => {
            render_error(&ios, &err, &command_path);
            err.exit_code()
        }
    };

    let release = checker.wait().await;
    if ios.is_stderr_tty() {
        update::print_notice(&ios, factory.app_version(), release.as_ref());
    }
    ExitCode::from(code)
}

/// Handle a parse "error", which includes `--help` and `--version`: those
/// are written to Out through the pager; real errors go to ErrOut with the
/// help footer.
fn finish_parse(ios: &IoStreams, e: &clap::Error) -> ExitCode {
    if e.use_stderr() {
        let _ = ios.err().write_str(&e.render().to_string());
        let _ = ios
            .err()
            .write_line("Run 'clawker --help' for more information.");
        return ExitCode::from(1);
    }
    let paged = ios.start_pager().is_ok();
    let _ = ios.out().write_str(&e.render().to_string());
    if paged {
        ios.stop_pager();
    }
    ExitCode::SUCCESS
}

fn render_error(ios: &IoStreams, err: &CliError, command_path: &str) {
    match err {
        // The command already said everything; byte-for-byte silence here.
        CliError::Silent => {}
        CliError::Exit { source, .. } => {
            if let Some(source) = source {
                ios.print_failure(source);
            }
        }
        CliError::Flag(e) => {
            let _ = ios.err().write_str(&e.render().to_string());
            let _ = ios.err().write_line(&format!(
                "Run '{command_path} --help' for more information."
            ));
        }
        CliError::Other(_) => {
            ios.render_error(err, &err.suggestions());
            let _ = ios.err().write_line(&format!(
                "Run '{command_path} --help' for more information."
            ));
        }
    }
}
