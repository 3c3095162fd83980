mod report;
mod serve;
mod sources;

use clap::{Parser, Subcommand};

pub use self::{report::report, serve::serve};
use crate::cli::{report::ReportArgs, serve::ServeArgs};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve the dashboard page and its JSON.
    #[clap(name = "serve")]
    Serve(Box<ServeArgs>),

    /// Print the cost, savings and price summary to the terminal.
    #[clap(name = "report")]
    Report(Box<ReportArgs>),
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_verify_args() {
        Args::command().debug_assert();
    }
}
