use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use relay::cli::{Cli, Commands, ScanArgs};
use relay::launcher::ExitCode;
use relay::output::{self, Verbosity};
use relay::{RelayContext, commands};
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "RELAY_LOG";

fn main() {
    let cli = Cli::parse();

    if let Commands::Completion { shell } = cli.command {
        print_completions(shell, &mut Cli::command());
        return;
    }

    if cli.quiet {
        output::set_verbosity(Verbosity::Quiet);
    } else if cli.verbose {
        output::set_verbosity(Verbosity::Verbose);
    }

    let ctx = match RelayContext::new() {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            process::exit(ExitCode::ConfigInvalid.code());
        }
    };

    init_logging(cli.verbose || ctx.config.diagnostics.verbose_logging);

    match run(&cli, &ctx) {
        Ok(ExitCode::Success) => {}
        Ok(code) => process::exit(code.code()),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli, ctx: &RelayContext) -> Result<ExitCode> {
    match &cli.command {
        Commands::Scan { args } => {
            commands::scan::execute(ctx, scan_options(ctx, *args))?;
        }
        Commands::AddAll { args } => {
            commands::add_all::execute(ctx, scan_options(ctx, *args))?;
        }
        Commands::Launch { key, tool } => {
            return commands::launch::execute(ctx, *key, tool.as_deref());
        }
        Commands::List => commands::list::execute(ctx)?,
        Commands::Hide { exe_path } => {
            commands::hide::execute(ctx, exe_path)?;
        }
        Commands::Validate => {
            if let Err(e) = commands::validate::execute(ctx) {
                commands::print_error(&format!("{e:#}"));
                return Ok(ExitCode::ConfigInvalid);
            }
        }
        Commands::Completion { .. } => {}
    }
    Ok(ExitCode::Success)
}

fn scan_options(ctx: &RelayContext, args: ScanArgs) -> relay::scanner::ScanOptions {
    commands::scan::options(ctx, args.full, args.skip_known, args.no_incremental)
}

/// Installs the stderr subscriber. `RELAY_LOG` wins over the verbosity
/// switch.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "relay=debug" } else { "relay=info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
