use clap::Parser;
use fieldrank::cli::{Cli, Commands, execute_search};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    fieldrank::logging::init(cli.log_format, cli.verbose);

    match cli.command {
        Commands::Search(args) => {
            let output = execute_search(&args).inspect_err(|e| {
                tracing::error!("Search failed: {:#}", e);
            })?;
            println!("{}", output.trim_end());
        }
    }

    Ok(())
}
