use crate::demo::{run_demo, run_simulation, DemoArgs, SimulateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use kra_engine::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "KRA Performance Engine",
    about = "Score KRA sheets, simulate what-if achievements and serve the incentive API",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a KRA sheet, optionally with hypothetical achieved values
    Simulate(SimulateArgs),
    /// Walk through the field officer month-end scenario
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Simulate(args) => run_simulation(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kra_engine::scoring::KraId;

    #[test]
    fn parses_simulate_overrides() {
        let cli = Cli::try_parse_from([
            "kra-engine-api",
            "simulate",
            "--kras",
            "sheet.csv",
            "--role",
            "field_officer",
            "--set",
            "shg=25",
            "--set",
            "visits=95",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Simulate(args)) => {
                assert_eq!(args.role.as_deref(), Some("field_officer"));
                assert_eq!(args.set.len(), 2);
                assert_eq!(args.set[0], (KraId::new("shg"), 25.0));
            }
            other => panic!("expected simulate command, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_override() {
        let result = Cli::try_parse_from([
            "kra-engine-api",
            "simulate",
            "--kras",
            "sheet.csv",
            "--set",
            "shg",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn defaults_to_serve() {
        let cli = Cli::try_parse_from(["kra-engine-api"]).expect("arguments parse");
        assert!(cli.command.is_none());
    }
}
