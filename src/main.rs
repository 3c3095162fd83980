#![doc = include_str!("../README.md")]

mod api;
mod cli;
mod core;
mod dashboard;
mod fmt;
mod prelude;
mod quantity;
mod tables;
mod weather;
mod web;

use clap::{Parser, crate_version};

use crate::{
    cli::{Args, Command, report, serve},
    prelude::*,
};

#[tokio::main]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Serve(args) => serve(&args).await,
        Command::Report(args) => report(&args).await,
    }
}
