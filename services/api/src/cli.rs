use crate::convert::{run_convert, run_flatten, ConvertArgs, FlattenArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use profile_csv::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Profile CSV",
    about = "Turn public profile pages into one-row spreadsheet files",
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
    /// Submit a profile URL, wait for the scrape and save the CSV
    Convert(ConvertArgs),
    /// Flatten a saved snapshot JSON file into CSV
    Flatten(FlattenArgs),
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
        Command::Convert(args) => run_convert(args).await,
        Command::Flatten(args) => run_flatten(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_arguments_parse() {
        let cli = Cli::try_parse_from([
            "profile-csv-api",
            "convert",
            "--url",
            "https://www.linkedin.com/in/jane",
            "--max-attempts",
            "3",
            "--interval-secs",
            "1",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Convert(args)) => {
                assert_eq!(args.url, "https://www.linkedin.com/in/jane");
                assert_eq!(args.max_attempts, Some(3));
                assert_eq!(args.interval_secs, Some(1));
                assert!(args.api.is_none());
            }
            other => panic!("expected convert, got {other:?}"),
        }
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["profile-csv-api"]).expect("arguments parse");
        assert!(cli.command.is_none());
    }
}
