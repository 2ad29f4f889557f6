//! Command-line viewer for a travel session.
//!
//! Loads a seed file and prints documents, alerts, reviews, budget and
//! itinerary. Nothing is ever written back.

use clap::Parser;

mod cli;
use cli::Cli;

fn main() -> anyhow::Result<()> {
    Cli::parse().run()
}
