use clap::{Args, Parser, Subcommand};

use crate::demo::{run_demo, run_passport_report, DemoArgs, PassportReportArgs};
use crate::server;
use passport_ai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Credentialing Passport",
    about = "Demonstrate and run the clinician credentialing passport service from the command line",
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
    /// Inspect the bundled sample passport
    Passport {
        #[command(subcommand)]
        command: PassportCommand,
    },
    /// Run an end-to-end credentialing demo against in-memory stores
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum PassportCommand {
    /// Render the requirements checklist and quality report
    Report(PassportReportArgs),
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
        Command::Passport {
            command: PassportCommand::Report(args),
        } => run_passport_report(args),
        Command::Demo(args) => run_demo(args).await,
    }
}
