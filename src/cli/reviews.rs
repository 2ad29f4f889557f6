use clap::ValueEnum;
use tracing::instrument;
use wanderwise::{
    registry::{ReviewQuery, ServiceFilter, SortOrder},
    Review, Session,
};

use super::{
    terminal::{stars, Colorize},
    OutputFormat,
};

/// Sortable fields.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum SortField {
    #[default]
    Newest,
    Oldest,
    Highest,
    Lowest,
}

impl From<SortField> for SortOrder {
    fn from(field: SortField) -> Self {
        match field {
            SortField::Newest => Self::Newest,
            SortField::Oldest => Self::Oldest,
            SortField::Highest => Self::Highest,
            SortField::Lowest => Self::Lowest,
        }
    }
}

/// Command arguments for `wander reviews`.
#[derive(Debug, clap::Parser)]
pub struct Reviews {
    /// Restrict to one service (flights, hotels, transport, activities), or
    /// 'all'.
    #[arg(long, default_value = "all")]
    service: ServiceFilter,

    /// Case-insensitive substring match against service name or review text.
    #[arg(long)]
    search: Option<String>,

    /// Sort order (default: newest).
    #[arg(long, value_enum, default_value_t)]
    sort: SortField,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

impl Reviews {
    #[instrument(skip(session))]
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        let query = ReviewQuery {
            service: self.service,
            term: self.search.unwrap_or_default(),
            sort: self.sort.into(),
        };
        let reviews = session.reviews.query(&query);

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reviews)?),
            OutputFormat::Table => print_reviews(&reviews, query.service),
        }
        Ok(())
    }
}

fn print_reviews(reviews: &[&Review], service: ServiceFilter) {
    if reviews.is_empty() {
        let message = match service {
            ServiceFilter::All => "No reviews yet.".to_string(),
            ServiceFilter::Only(service) => {
                format!("No {} reviews yet.", service.label().to_lowercase())
            }
        };
        println!("{}", message.dim());
        return;
    }

    for review in reviews {
        println!(
            "{} {} ({})",
            stars(review.rating().stars()),
            review.service_name(),
            review.service().label()
        );
        println!(
            "  {}",
            format!("{} on {}", review.author(), review.date().format("%Y-%m-%d")).dim()
        );
        println!("  {}", review.text());
        if !review.photos().is_empty() {
            println!("  {}", format!("{} photo(s)", review.photos().len()).dim());
        }
    }
}

/// Command arguments for `wander stats`.
#[derive(Debug, clap::Parser)]
pub struct Stats {
    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

impl Stats {
    #[instrument(skip(session))]
    pub fn run(self, session: &Session) -> anyhow::Result<()> {
        let average = session.reviews.average_rating();
        let distribution = session.reviews.rating_distribution();

        if self.output == OutputFormat::Json {
            let value = serde_json::json!({
                "total": session.reviews.len(),
                "average": average,
                "distribution": distribution,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
            return Ok(());
        }

        let shown = session
            .reviews
            .average_stars()
            .map_or(0, wanderwise::domain::Rating::stars);
        println!(
            "Average rating: {average:.1} {} ({} reviews)",
            stars(shown),
            session.reviews.len()
        );
        for bucket in distribution {
            println!(
                "  {} {:>3} {:>5.1}%",
                stars(bucket.stars),
                bucket.count,
                bucket.percentage
            );
        }
        Ok(())
    }
}
