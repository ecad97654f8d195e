use crate::utils::run_until_ctrl_c;
use clap::{value_parser, Parser, Subcommand};
use dotenv::dotenv;

pub mod args;
pub mod commands;

/// The main Safebatch CLI interface
#[derive(Debug, Parser)]
#[command(author, version, about = "Safebatch", long_about = None)]
pub struct Cli {
    /// The command to execute
    #[clap(subcommand)]
    command: Commands,

    /// The verbosity level
    #[clap(
        long,
        short,
        global = true,
        default_value_t = 2,
        value_parser = value_parser!(u8).range(..=4)
    )]
    verbosity: u8,
}

impl Cli {
    /// Get the log level based on the verbosity level
    pub fn get_log_level(&self) -> String {
        match self.verbosity {
            0 => "error",
            1 => "warn",
            2 => "info",
            3 => "debug",
            _ => "trace",
        }
        .into()
    }
}

/// Commands to be executed
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the counterfactual address of the owner's Safe account
    #[command(name = "address")]
    Address(commands::AddressCommand),

    /// Print the selector of a function signature
    #[command(name = "selector")]
    Selector(commands::SelectorCommand),

    /// Batch calls into a user operation, sign it, send it to the bundler and wait for inclusion
    #[command(name = "send")]
    Send(Box<commands::SendCommand>),
}

pub fn run() -> eyre::Result<()> {
    // values from `.env` are visible to clap as environment variables
    dotenv().ok();
    let cli = Cli::parse();

    let rust_log = match std::env::var("RUST_LOG") {
        Ok(val) => format!("{val},safebatch={}", cli.get_log_level()),
        Err(_) => format!("safebatch={}", cli.get_log_level()),
    };
    std::env::set_var("RUST_LOG", rust_log);
    tracing_subscriber::fmt::init();

    let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

    let task = async move {
        match cli.command {
            Commands::Address(command) => command.execute(),
            Commands::Selector(command) => command.execute(),
            Commands::Send(command) => command.execute().await,
        }
    };

    rt.block_on(run_until_ctrl_c(task))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn log_level() {
        let parse = |verbosity| {
            Cli::try_parse_from(["safebatch", "-v", verbosity, "selector", "mint(address)"])
        };
        assert_eq!(parse("3").unwrap().get_log_level(), "debug");
        assert!(parse("5").is_err());
    }
}
