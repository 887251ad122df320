use clap::Parser;

mod cli;
mod commands;
mod output;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("glt error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;
    let flags = cli.global_flags();

    match &cli.command {
        cli::Commands::Validate(args) => commands::validate::handle(args, &flags),
        cli::Commands::Quality(args) => commands::quality::handle(args, &flags),
        cli::Commands::Import(args) => commands::import::handle(args, &flags),
        cli::Commands::Build(args) => commands::build::handle(args, &flags),
        cli::Commands::Pipeline(args) => commands::pipeline::handle(args, &flags),
        cli::Commands::Schema(args) => commands::schema::handle(args, &flags),
        cli::Commands::LinkCheck(args) => commands::link_check::handle(args, &flags).await,
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("GLOTTOREG_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
