use std::{fmt, iter::Sum, ops::Sub, str::FromStr};

use chrono::NaiveDate;
use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    domain::required,
    error::{Error, RecordKind, ValidationError},
};

/// An amount of money in minor units (hundredths).
///
/// Parses from and displays as a decimal with two places, e.g. `"12.50"`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "AmountRepr", into = "String")]
pub struct Money(i64);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Construct from minor units (cents).
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Construct from whole major units, saturating at the `i64` range.
    #[must_use]
    pub const fn from_major(major: i64) -> Self {
        Self(major.saturating_mul(100))
    }

    /// The amount in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Whether the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// The absolute value.
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        f.pad(&format!("{sign}{}.{:02}", abs / 100, abs % 100))
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ValidationError::MalformedAmount(s.to_string());
        let text = s.trim();
        let (negative, digits) = text
            .strip_prefix('-')
            .map_or((false, text), |rest| (true, rest));
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }
        if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }

        let whole: i64 = whole.parse().map_err(|_| malformed())?;
        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| malformed())? * 10,
            _ => fraction.parse().map_err(|_| malformed())?,
        };
        let minor = whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(cents))
            .ok_or_else(malformed)?;

        Ok(Self(if negative { -minor } else { minor }))
    }
}

/// Saturates at the bounds of the `i64` range.
impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

/// Saturates at the bounds of the `i64` range.
impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.fold(0, |total, m| total.saturating_add(m.0)))
    }
}

impl From<Money> for String {
    fn from(money: Money) -> Self {
        money.to_string()
    }
}

/// Seed files may spell amounts as numbers (`450`, `120.5`) or strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Integer(i64),
    Text(String),
    Float(f64),
}

impl TryFrom<AmountRepr> for Money {
    type Error = ValidationError;

    fn try_from(repr: AmountRepr) -> Result<Self, Self::Error> {
        match repr {
            AmountRepr::Integer(major) => major
                .checked_mul(100)
                .map(Self)
                .ok_or_else(|| ValidationError::MalformedAmount(major.to_string())),
            AmountRepr::Text(text) => text.parse(),
            AmountRepr::Float(value) => format!("{value:.2}").parse(),
        }
    }
}

/// What an expense was spent on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    /// Air travel.
    Flights,
    /// Accommodation.
    Hotel,
    /// Food and dining.
    #[default]
    Food,
    /// Local transport.
    Transport,
    /// Tours and entry fees.
    Activities,
    /// Shopping.
    Shopping,
}

impl ExpenseCategory {
    /// Every category, in display order.
    pub const ALL: [Self; 6] = [
        Self::Flights,
        Self::Hotel,
        Self::Food,
        Self::Transport,
        Self::Activities,
        Self::Shopping,
    ];

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Flights => "Flights",
            Self::Hotel => "Hotels",
            Self::Food => "Food & Dining",
            Self::Transport => "Transport",
            Self::Activities => "Activities",
            Self::Shopping => "Shopping",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unvalidated expense fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExpenseDraft {
    /// What the money was spent on.
    #[serde(default)]
    pub category: ExpenseCategory,
    /// How much was spent. Must be positive.
    pub amount: Money,
    /// What the expense was. Required.
    #[serde(default)]
    pub description: String,
}

impl ExpenseDraft {
    /// Create a draft.
    #[must_use]
    pub fn new(category: ExpenseCategory, amount: Money, description: impl Into<String>) -> Self {
        Self {
            category,
            amount,
            description: description.into(),
        }
    }

    fn into_expense(self, id: Uuid, date: NaiveDate) -> Result<Expense, ValidationError> {
        if self.amount <= Money::ZERO {
            return Err(ValidationError::NonPositiveAmount);
        }
        let description = required("description", self.description)?;
        Ok(Expense {
            id,
            category: self.category,
            amount: self.amount,
            description,
            date,
        })
    }
}

/// A recorded expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expense {
    id: Uuid,
    category: ExpenseCategory,
    amount: Money,
    description: NonEmptyString,
    date: NaiveDate,
}

impl Expense {
    /// Unique identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// What the money was spent on.
    #[must_use]
    pub const fn category(&self) -> ExpenseCategory {
        self.category
    }

    /// How much was spent.
    #[must_use]
    pub const fn amount(&self) -> Money {
        self.amount
    }

    /// What the expense was.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// When the expense was recorded.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }
}

/// A trip budget and the expenses charged against it.
#[derive(Debug, Clone, Default)]
pub struct Budget {
    limit: Money,
    expenses: Vec<Expense>,
}

impl Budget {
    /// An empty budget with the given limit.
    #[must_use]
    pub const fn new(limit: Money) -> Self {
        Self {
            limit,
            expenses: Vec::new(),
        }
    }

    /// The budget limit.
    #[must_use]
    pub const fn limit(&self) -> Money {
        self.limit
    }

    /// Change the budget limit.
    pub const fn set_limit(&mut self, limit: Money) {
        self.limit = limit;
    }

    /// Record an expense dated `date`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the amount is not positive or the
    /// description is empty.
    #[instrument(skip(self, draft), fields(amount = %draft.amount))]
    pub fn add_expense(&mut self, draft: ExpenseDraft, date: NaiveDate) -> Result<&Expense, Error> {
        let expense = draft.into_expense(Uuid::new_v4(), date)?;
        debug!(id = %expense.id, "recorded expense");
        self.expenses.push(expense);
        Ok(&self.expenses[self.expenses.len() - 1])
    }

    /// Remove an expense.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no expense has this id.
    #[instrument(skip(self))]
    pub fn remove_expense(&mut self, id: Uuid) -> Result<Expense, Error> {
        let index = self
            .expenses
            .iter()
            .position(|expense| expense.id == id)
            .ok_or(Error::not_found(RecordKind::Expense, id))?;
        debug!("removed expense");
        Ok(self.expenses.remove(index))
    }

    /// All expenses in the order they were recorded.
    #[must_use]
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Sum of all expenses.
    #[must_use]
    pub fn total_spent(&self) -> Money {
        self.expenses.iter().map(Expense::amount).sum()
    }

    /// Limit minus total spent. Negative when over budget.
    #[must_use]
    pub fn remaining(&self) -> Money {
        self.limit - self.total_spent()
    }

    /// Whether spending has exceeded the limit.
    #[must_use]
    pub fn is_over_budget(&self) -> bool {
        self.remaining().is_negative()
    }

    /// Total spent per category, in category display order.
    ///
    /// Categories with no expenses are omitted.
    #[must_use]
    pub fn by_category(&self) -> Vec<(ExpenseCategory, Money)> {
        ExpenseCategory::ALL
            .into_iter()
            .filter_map(|category| {
                let mut amounts = self
                    .expenses
                    .iter()
                    .filter(|expense| expense.category == category)
                    .map(Expense::amount)
                    .peekable();
                amounts.peek()?;
                Some((category, amounts.sum()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 16).unwrap()
    }

    fn paris_budget() -> Budget {
        let mut budget = Budget::new(Money::from_major(2000));
        for (category, amount, description) in [
            (ExpenseCategory::Flights, "450", "Round trip to Paris"),
            (ExpenseCategory::Hotel, "120", "Hotel Marriott - 2 nights"),
            (ExpenseCategory::Food, "85", "Local restaurant dinner"),
        ] {
            budget
                .add_expense(
                    ExpenseDraft::new(category, amount.parse().unwrap(), description),
                    date(),
                )
                .unwrap();
        }
        budget
    }

    #[test]
    fn totals_and_remaining() {
        let budget = paris_budget();
        assert_eq!(budget.total_spent(), Money::from_major(655));
        assert_eq!(budget.remaining(), Money::from_major(1345));
        assert!(!budget.is_over_budget());
    }

    #[test]
    fn overspending_goes_negative() {
        let mut budget = paris_budget();
        budget.set_limit(Money::from_major(600));
        assert_eq!(budget.remaining(), Money::from_major(-55));
        assert!(budget.is_over_budget());
        assert_eq!(budget.remaining().abs().to_string(), "55.00");
    }

    #[test]
    fn by_category_omits_empty_categories() {
        let budget = paris_budget();
        assert_eq!(
            budget.by_category(),
            vec![
                (ExpenseCategory::Flights, Money::from_major(450)),
                (ExpenseCategory::Hotel, Money::from_major(120)),
                (ExpenseCategory::Food, Money::from_major(85)),
            ]
        );
    }

    #[test]
    fn invalid_expenses_are_rejected() {
        let mut budget = Budget::new(Money::from_major(100));
        let error = budget
            .add_expense(ExpenseDraft::new(ExpenseCategory::Food, Money::ZERO, "Lunch"), date())
            .unwrap_err();
        assert_eq!(error, Error::Validation(ValidationError::NonPositiveAmount));

        let error = budget
            .add_expense(
                ExpenseDraft::new(ExpenseCategory::Food, Money::from_major(5), " "),
                date(),
            )
            .unwrap_err();
        assert_eq!(
            error,
            Error::Validation(ValidationError::MissingField("description"))
        );
        assert!(budget.expenses().is_empty());
    }

    #[test]
    fn remove_unknown_expense_is_not_found() {
        let mut budget = paris_budget();
        let id = budget.expenses()[0].id();
        budget.remove_expense(id).unwrap();
        assert_eq!(budget.expenses().len(), 2);
        assert!(matches!(
            budget.remove_expense(id),
            Err(Error::NotFound {
                kind: RecordKind::Expense,
                ..
            })
        ));
    }

    #[test]
    fn huge_totals_saturate_instead_of_overflowing() {
        let mut budget = Budget::new(Money::from_major(2000));
        for description in ["Charter jet", "Private island"] {
            let amount = "90000000000000000".parse().unwrap();
            budget
                .add_expense(
                    ExpenseDraft::new(ExpenseCategory::Shopping, amount, description),
                    date(),
                )
                .unwrap();
        }

        assert_eq!(budget.total_spent(), Money::from_minor(i64::MAX));
        assert_eq!(budget.by_category()[0].1, Money::from_minor(i64::MAX));
        assert!(budget.is_over_budget());
        assert_eq!(budget.remaining(), Money::from_minor(200_000 - i64::MAX));
        assert_eq!(Money::from_minor(i64::MIN).abs(), Money::from_minor(i64::MAX));
    }

    #[test]
    fn money_parses_decimal_text() {
        assert_eq!("12".parse::<Money>().unwrap(), Money::from_minor(1200));
        assert_eq!("12.5".parse::<Money>().unwrap(), Money::from_minor(1250));
        assert_eq!("12.05".parse::<Money>().unwrap(), Money::from_minor(1205));
        assert_eq!("-3.10".parse::<Money>().unwrap(), Money::from_minor(-310));
        assert!("12.345".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!(".5".parse::<Money>().is_err());
    }

    #[test]
    fn money_displays_two_places() {
        assert_eq!(Money::from_minor(1205).to_string(), "12.05");
        assert_eq!(Money::from_minor(-5).to_string(), "-0.05");
        assert_eq!(format!("{:>8}", Money::from_major(3)), "    3.00");
    }

    #[test]
    fn money_deserializes_numbers_and_strings() {
        let amounts: Vec<Money> = serde_json::from_str(r#"[450, 120.5, "85.25"]"#).unwrap();
        assert_eq!(
            amounts,
            vec![
                Money::from_minor(45_000),
                Money::from_minor(12_050),
                Money::from_minor(8_525),
            ]
        );
    }
}
