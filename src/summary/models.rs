use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::fmt;
use utoipa::{IntoParams, ToSchema};

use crate::errors::AppError;
use crate::transaction::models::{TransactionKind, TransactionResponse};

/// One calendar month, identified by year and month (1-12)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, AppError> {
        if !(1..=12).contains(&month) {
            return Err(AppError::ValidationError(
                "Month must be between 1 and 12".to_string(),
            ));
        }
        if !(1..=9999).contains(&year) {
            return Err(AppError::ValidationError(
                "Year must be between 1 and 9999".to_string(),
            ));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // year/month are range-checked on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// First day of the following month; the exclusive upper bound of this period
    pub fn end_exclusive(&self) -> NaiveDate {
        self.next().first_day()
    }

    fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Path parameters selecting a month
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct PeriodPath {
    #[param(example = 2024)]
    pub year: i32,
    /// 1-12
    #[param(example = 5)]
    pub month: u32,
}

impl PeriodPath {
    pub fn period(&self) -> Result<Period, AppError> {
        Period::new(self.year, self.month)
    }
}

/// A single amount as seen by the aggregator
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryEntry {
    pub kind: TransactionKind,
    pub category_name: String,
    pub amount: Decimal,
    pub date: NaiveDate,
}

impl SummaryEntry {
    pub fn new(
        kind: TransactionKind,
        category_name: impl Into<String>,
        amount: Decimal,
        date: NaiveDate,
    ) -> Self {
        Self {
            kind,
            category_name: category_name.into(),
            amount,
            date,
        }
    }
}

impl From<&TransactionResponse> for SummaryEntry {
    fn from(t: &TransactionResponse) -> Self {
        Self::new(t.kind, t.category_name.clone(), t.amount, t.date)
    }
}

/// Row shape of the period query
#[derive(Debug, FromRow)]
pub struct SummaryRow {
    pub kind: String,
    pub category_name: String,
    pub amount: Decimal,
    pub transaction_date: NaiveDate,
}

impl TryFrom<SummaryRow> for SummaryEntry {
    type Error = AppError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        let kind = TransactionKind::parse(&row.kind).ok_or_else(|| {
            AppError::InternalError(format!("Unknown transaction kind: {}", row.kind))
        })?;
        Ok(Self::new(kind, row.category_name, row.amount, row.transaction_date))
    }
}

/// Monthly totals and per-category breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MonthlySummary {
    #[schema(example = "1000.00")]
    pub total_income: Decimal,
    #[schema(example = "50.00")]
    pub total_expense: Decimal,
    /// total_income - total_expense
    #[schema(example = "950.00")]
    pub balance: Decimal,
    /// Category name to summed expense amount; categories without activity are omitted
    pub expense_by_category: BTreeMap<String, Decimal>,
    /// Category name to summed income amount; categories without activity are omitted
    pub income_by_category: BTreeMap<String, Decimal>,
}

impl MonthlySummary {
    /// Summary of a period with no transactions
    pub fn empty() -> Self {
        Self {
            total_income: super::aggregate::money(Decimal::ZERO),
            total_expense: super::aggregate::money(Decimal::ZERO),
            balance: super::aggregate::money(Decimal::ZERO),
            expense_by_category: BTreeMap::new(),
            income_by_category: BTreeMap::new(),
        }
    }
}

impl Default for MonthlySummary {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_month_range_checked() {
        assert!(Period::new(2024, 0).is_err());
        assert!(Period::new(2024, 13).is_err());
        assert!(Period::new(0, 5).is_err());
        assert!(Period::new(2024, 12).is_ok());
    }

    #[test]
    fn test_bounds_roll_over_year() {
        let december = Period::new(2023, 12).expect("valid period");
        assert_eq!(december.first_day(), date(2023, 12, 1));
        assert_eq!(december.end_exclusive(), date(2024, 1, 1));
        assert_eq!(december.next(), Period::new(2024, 1).expect("valid period"));
    }

    #[test]
    fn test_contains() {
        let may = Period::new(2024, 5).expect("valid period");
        assert!(may.contains(date(2024, 5, 1)));
        assert!(may.contains(date(2024, 5, 31)));
        assert!(!may.contains(date(2024, 6, 1)));
        assert!(!may.contains(date(2023, 5, 15)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Period::new(2024, 5).expect("valid period").to_string(), "2024-05");
    }

    #[test]
    fn test_row_with_unknown_kind_is_rejected() {
        let row = SummaryRow {
            kind: "transfer".to_string(),
            category_name: "Food".to_string(),
            amount: Decimal::ONE,
            transaction_date: date(2024, 5, 1),
        };
        assert!(SummaryEntry::try_from(row).is_err());
    }

    #[test]
    fn test_empty_summary_serializes_zero_totals() {
        let json = serde_json::to_value(MonthlySummary::empty()).expect("Should serialize");
        assert_eq!(json["total_income"], "0.00");
        assert_eq!(json["balance"], "0.00");
        assert!(json["expense_by_category"]
            .as_object()
            .expect("object")
            .is_empty());
    }
}
