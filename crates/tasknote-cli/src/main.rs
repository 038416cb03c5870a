use clap::Parser;
use owo_colors::{OwoColorize, Style};
use tasknote_core::error::CoreError;
use tasknote_core::resolver::OccurrenceAction;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod parser;
mod store;
mod util;
mod views;

fn main() {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    let config = match config::Config::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} Invalid configuration: {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    let ctx = match commands::Context::new(
        config,
        cli.file.clone(),
        cli.timezone.as_deref(),
        cli.today.as_deref(),
    ) {
        Ok(ctx) => ctx,
        Err(e) => {
            handle_error(e);
            std::process::exit(1);
        }
    };
    debug!(today = %ctx.today, tz = %ctx.tz, file = %ctx.store.path().display(), "starting");

    let result = match cli.command {
        cli::Commands::Calendar(command) => commands::calendar::show_calendar(&ctx, command),
        cli::Commands::Complete(command) => {
            commands::occurrence::mark(&ctx, command, OccurrenceAction::Complete)
        }
        cli::Commands::Skip(command) => {
            commands::occurrence::mark(&ctx, command, OccurrenceAction::Skip)
        }
        cli::Commands::Next(command) => commands::next::show_next(&ctx, command),
        cli::Commands::Expand(command) => commands::expand::expand_rule(&ctx, command),
        cli::Commands::Prune(command) => commands::prune::prune_ledgers(&ctx, command),
    };

    if let Err(e) = result {
        handle_error(e);
        std::process::exit(1);
    }
}

/// `TASKNOTE_LOG` wins; otherwise `-v` flags pick the level, default warn.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("TASKNOTE_LOG")
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        match core_error {
            CoreError::NotFound(s) => {
                eprintln!("{} {}", "Error:".style(error_style), s);
            }
            CoreError::AmbiguousId(tasks) => {
                eprintln!("{}", "Error: Ambiguous task reference.".style(error_style));
                eprintln!("Did you mean one of these?");
                for (id, title) in tasks {
                    eprintln!("  {} ({})", id.yellow(), title);
                }
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            CoreError::NotRecurring(title) => {
                eprintln!(
                    "{} Task '{}' has no recurrence rule",
                    "Error:".style(error_style),
                    title.yellow()
                );
            }
            CoreError::Rule(rule_error) => {
                eprintln!("{} {}", "Error:".style(error_style), rule_error.yellow());
            }
            _ => eprintln!("{} {}", "Error:".style(error_style), err),
        }
    } else {
        eprintln!("{} {:#}", "Error:".style(error_style), err);
    }
}
