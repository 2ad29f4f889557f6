use chrono::NaiveDate;
use serde::Serialize;
use tracing::instrument;
use wanderwise::{
    domain::Classification,
    registry::KindFilter,
    Document, Session,
};

use super::{
    terminal::{status_label, Colorize},
    OutputFormat,
};

/// Command arguments for `wander documents`.
#[derive(Debug, clap::Parser)]
pub struct Documents {
    /// Case-insensitive substring match against name or number.
    #[arg(long)]
    search: Option<String>,

    /// Restrict to one document kind (passport, visa, license, insurance,
    /// vaccination, other), or 'all'.
    #[arg(long, default_value = "all")]
    kind: KindFilter,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

#[derive(Debug, Serialize)]
struct Row<'a> {
    #[serde(flatten)]
    document: &'a Document,
    #[serde(flatten)]
    classification: Classification,
}

impl Documents {
    #[instrument(skip(session))]
    pub fn run(self, session: &Session, today: NaiveDate) -> anyhow::Result<()> {
        let term = self.search.unwrap_or_default();
        let rows: Vec<Row<'_>> = session
            .documents
            .search(&term, self.kind)
            .into_iter()
            .map(|document| Row {
                document,
                classification: document.status(today),
            })
            .collect();

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
            OutputFormat::Table => print_table(&rows),
        }
        Ok(())
    }
}

fn print_table(rows: &[Row<'_>]) {
    if rows.is_empty() {
        println!("{}", "No documents found".dim());
        return;
    }

    println!(
        "{:<24} {:<20} {:<14} {:<10} STATUS",
        "NAME", "KIND", "NUMBER", "EXPIRES"
    );
    for row in rows {
        let document = row.document;
        println!(
            "{:<24} {:<20} {:<14} {:<10} {}",
            document.name(),
            document.kind().label(),
            document.number(),
            document.expiry_date().format("%Y-%m-%d"),
            status_label(row.classification.status),
        );
    }
}

/// Command arguments for `wander alerts`.
#[derive(Debug, clap::Parser)]
pub struct Alerts {
    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

impl Alerts {
    #[instrument(skip(session))]
    pub fn run(self, session: &Session, today: NaiveDate) -> anyhow::Result<()> {
        let alerts = session.documents.expiring_alerts(today);

        if self.output == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&alerts)?);
            return Ok(());
        }

        if alerts.is_empty() {
            println!("{}", "No documents require attention".success());
            return Ok(());
        }

        println!("{}", "Documents requiring attention".warning());
        for alert in alerts {
            println!(
                "  {} expires in {} days ({})",
                alert.document.name(),
                alert.days_left,
                status_label(alert.status),
            );
        }
        Ok(())
    }
}
