use std::path::PathBuf;

mod documents;
mod plan;
mod reviews;
mod terminal;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{ArgAction, ValueEnum};
use documents::{Alerts, Documents};
use plan::{Budget, Itinerary};
use reviews::{Reviews, Stats};
use terminal::Colorize;
use tracing::instrument;
use wanderwise::{domain::expiry, Config, Session};

/// Parse a `YYYY-MM-DD` date at the CLI boundary.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    expiry::parse_date("today", s).map_err(|e| e.to_string())
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Seed file (YAML or JSON) describing the session's records
    #[arg(short, long, global = true)]
    seed: Option<PathBuf>,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Reference date for expiry checks (defaults to today)
    #[arg(long, global = true, value_parser = parse_date)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let session = self.load_session()?;
        let today = self.today.unwrap_or_else(expiry::today);

        self.command.unwrap_or(Command::Status).run(&session, today)
    }

    fn load_session(&self) -> anyhow::Result<Session> {
        let config = match &self.config {
            Some(path) => Config::load(path).map_err(anyhow::Error::msg)?,
            None => Config::default(),
        };

        let Some(path) = &self.seed else {
            return Ok(Session::new(config));
        };
        Session::load(path, config)
            .with_context(|| format!("failed to load seed file {}", path.display()))
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show a summary of the session (default)
    Status,

    /// List travel documents with their expiry status
    Documents(Documents),

    /// List documents that expire within the next 30 days
    Alerts(Alerts),

    /// List reviews with filters and sorting
    Reviews(Reviews),

    /// Show the average rating and rating distribution
    Stats(Stats),

    /// Show the trip budget and expenses
    Budget(Budget),

    /// Show the itinerary in time order
    Itinerary(Itinerary),

    /// Print the effective configuration
    Config,
}

impl Command {
    fn run(self, session: &Session, today: NaiveDate) -> anyhow::Result<()> {
        match self {
            Self::Status => show_status(session, today),
            Self::Documents(command) => command.run(session, today)?,
            Self::Alerts(command) => command.run(session, today)?,
            Self::Reviews(command) => command.run(session)?,
            Self::Stats(command) => command.run(session)?,
            Self::Budget(command) => command.run(session)?,
            Self::Itinerary(command) => command.run(session)?,
            Self::Config => show_config(&session.config)?,
        }
        Ok(())
    }
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[instrument(skip_all)]
fn show_status(session: &Session, today: NaiveDate) {
    let alerts = session.documents.expiring_alerts(today);

    println!("Documents: {}", session.documents.len());
    if alerts.is_empty() {
        println!("  {}", "No documents require attention".success());
    } else {
        println!(
            "  {}",
            format!("{} document(s) require attention", alerts.len()).warning()
        );
    }

    println!(
        "Reviews:   {} (average {:.1})",
        session.reviews.len(),
        session.reviews.average_rating()
    );

    let remaining = session.budget.remaining();
    if session.budget.is_over_budget() {
        println!(
            "Budget:    {}",
            format!("{} over budget", remaining.abs()).danger()
        );
    } else {
        println!("Budget:    {remaining} remaining of {}", session.budget.limit());
    }

    println!(
        "Itinerary: {} activities{}",
        session.itinerary.activities().len(),
        match session.itinerary.destination() {
            "" => String::new(),
            destination => format!(" in {destination}"),
        }
    );
}

fn show_config(config: &Config) -> anyhow::Result<()> {
    let text = toml::to_string_pretty(config).context("failed to serialize configuration")?;
    print!("{text}");
    Ok(())
}
