use crate::demo::{run_demo, run_slot_generation, DemoArgs, SlotGenerateArgs};
use crate::server;
use ceremony_booking::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Ceremony Booking",
    about = "Run and demonstrate the ceremony appointment booking service from the command line",
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
    /// Work with the bookable slot calendar
    Slots {
        #[command(subcommand)]
        command: SlotsCommand,
    },
    /// Run an end-to-end CLI demo covering booking, review, reminders and reporting
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum SlotsCommand {
    /// Generate the slots of a month and print the summary
    Generate(SlotGenerateArgs),
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
        Command::Slots {
            command: SlotsCommand::Generate(args),
        } => run_slot_generation(args),
        Command::Demo(args) => run_demo(args),
    }
}
