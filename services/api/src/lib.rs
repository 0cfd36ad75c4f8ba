mod cli;
mod convert;
mod infra;
mod routes;
mod server;

use profile_csv::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
