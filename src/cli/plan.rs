use tracing::instrument;
use wanderwise::Session;

use super::{terminal::Colorize, OutputFormat};

/// Command arguments for `wander budget`.
#[derive(Debug, clap::Parser)]
pub struct Budget {
    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

impl Budget {
    #[instrument(skip(session))]
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        let budget = &session.budget;

        if self.output == OutputFormat::Json {
            let value = serde_json::json!({
                "limit": budget.limit(),
                "spent": budget.total_spent(),
                "remaining": budget.remaining(),
                "expenses": budget.expenses(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
            return Ok(());
        }

        println!("Total budget: {}", budget.limit());
        println!("Spent:        {}", budget.total_spent());
        if budget.is_over_budget() {
            println!(
                "Over budget:  {}",
                budget.remaining().abs().to_string().danger()
            );
        } else {
            println!("Remaining:    {}", budget.remaining().to_string().success());
        }

        let by_category = budget.by_category();
        if !by_category.is_empty() {
            println!();
            for (category, amount) in by_category {
                println!("  {:<16} {amount:>10}", category.label());
            }
        }

        if !budget.expenses().is_empty() {
            println!();
            for expense in budget.expenses() {
                println!(
                    "  {} {:<32} {:>10} {}",
                    expense.date().format("%Y-%m-%d"),
                    expense.description(),
                    expense.amount(),
                    expense.category().label().dim()
                );
            }
        }
        Ok(())
    }
}

/// Command arguments for `wander itinerary`.
#[derive(Debug, clap::Parser)]
pub struct Itinerary {
    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

impl Itinerary {
    #[instrument(skip(session))]
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        let activities = session.itinerary.chronological();

        if self.output == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&activities)?);
            return Ok(());
        }

        let destination = session.itinerary.destination();
        if !destination.is_empty() {
            println!("Itinerary for {destination}");
        }
        if activities.is_empty() {
            println!("{}", "No activities planned".dim());
            return Ok(());
        }
        for activity in activities {
            println!(
                "  {} {:<32} {} {}",
                activity.time().format("%H:%M"),
                activity.title(),
                activity.location(),
                format!("[{}]", activity.kind()).dim()
            );
        }
        Ok(())
    }
}
