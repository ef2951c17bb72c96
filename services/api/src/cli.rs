use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hiredesk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "HireDesk",
    about = "Run and demonstrate the HireDesk intake service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (the default when no command is given)
    Serve(ServeArgs),
    /// Walk the intake wizard and review console end to end on the terminal
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Bind address, overriding APP_HOST
    #[arg(long, value_name = "HOST")]
    pub(crate) host: Option<String>,
    /// Listener port, overriding APP_PORT
    #[arg(long, value_name = "PORT")]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    match Cli::parse().command {
        Some(Command::Demo(args)) => run_demo(args),
        Some(Command::Serve(args)) => server::run(args).await,
        None => server::run(ServeArgs::default()).await,
    }
}
