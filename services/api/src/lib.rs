//! HireDesk service binary: CLI entry, router assembly, in-memory infra.

mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use hiredesk::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
