mod cli;
mod config;
mod paths;
mod run;
mod shell;

use anyhow::Result;
use cli::{Command, ConfigAction};

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    let config_file = cli.config.as_deref();
    match cli.command {
        Some(Command::Export(args)) => run::export(config_file, args),
        Some(Command::Config(config_cmd)) => match config_cmd.action {
            ConfigAction::Where => run::config_where(config_file),
            ConfigAction::Show => run::config_show(config_file),
        },
        None => run::run(config_file, cli.run),
    }
}
