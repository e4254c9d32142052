use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Largest amount a NUMERIC(10, 2) column holds, exclusive
const AMOUNT_LIMIT: i64 = 100_000_000;

/// Whether a category or transaction records money going out or coming in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Expense,
    Income,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "expense" => Some(TransactionKind::Expense),
            "income" => Some(TransactionKind::Income),
            _ => None,
        }
    }

    /// Plural URL segment used by the REST routes ("expenses" / "incomes")
    pub fn segment(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "expenses",
            TransactionKind::Income => "incomes",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plural form of [`TransactionKind`] as it appears in URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum KindSegment {
    Expenses,
    Incomes,
}

impl From<KindSegment> for TransactionKind {
    fn from(segment: KindSegment) -> Self {
        match segment {
            KindSegment::Expenses => TransactionKind::Expense,
            KindSegment::Incomes => TransactionKind::Income,
        }
    }
}

/// Validate that amount is positive, has at most two decimals and fits NUMERIC(10, 2)
pub fn validate_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        return Err(ValidationError::new("amount_must_be_positive"));
    }
    if amount.normalize().scale() > 2 {
        return Err(ValidationError::new("amount_too_precise"));
    }
    if *amount >= Decimal::from(AMOUNT_LIMIT) {
        return Err(ValidationError::new("amount_too_large"));
    }
    Ok(())
}

/// Transaction row joined with its category name
#[derive(Debug, Clone, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub category_id: Uuid,
    pub category_name: String,
    pub kind: String,
    pub amount: Decimal,
    pub transaction_date: NaiveDate,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn get_kind(&self) -> Option<TransactionKind> {
        TransactionKind::parse(&self.kind)
    }
}

/// Transaction information returned in responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    /// Unique transaction identifier
    pub id: Uuid,
    /// expense or income
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Date of the transaction
    #[schema(example = "2024-05-03")]
    pub date: NaiveDate,
    /// Transaction amount (always positive)
    #[schema(example = "50.00")]
    pub amount: Decimal,
    /// Category this transaction belongs to
    pub category_id: Uuid,
    #[schema(example = "Food")]
    pub category_name: String,
    #[schema(example = "Weekly groceries")]
    pub description: Option<String>,
}

impl TransactionResponse {
    /// Convert a row; the kind comes from the route, which the query already filtered on
    pub fn from_row(t: Transaction, kind: TransactionKind) -> Self {
        Self {
            id: t.id,
            kind: t.get_kind().unwrap_or(kind),
            date: t.transaction_date,
            amount: t.amount,
            category_id: t.category_id,
            category_name: t.category_name,
            description: t.description,
        }
    }
}

/// Request body for creating a transaction
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTransactionDto {
    /// Category ID; must be owned by the caller and match the route's kind
    #[serde(alias = "category_id")]
    pub category: Uuid,

    /// Transaction amount (positive, at most two decimals)
    #[validate(custom(
        function = "validate_amount",
        message = "Amount must be positive, below 100000000 and have at most two decimals"
    ))]
    #[schema(example = "50.00")]
    pub amount: Decimal,

    /// Date of the transaction (YYYY-MM-DD)
    #[schema(example = "2024-05-03")]
    pub date: NaiveDate,

    /// Optional description (max 1000 chars)
    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    #[serde(default)]
    #[schema(example = "Weekly groceries")]
    pub description: Option<String>,
}

impl CreateTransactionDto {
    /// Description with surrounding whitespace removed; blank becomes None
    pub fn clean_description(&self) -> Option<String> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
    }
}

/// Path parameters for the transaction collection of one kind
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct KindPath {
    /// expenses or incomes
    #[param(value_type = String, example = "expenses")]
    pub kind: KindSegment,
}

/// Path parameters for listing one kind of transaction in a month
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct KindPeriodPath {
    /// expenses or incomes
    #[param(value_type = String, example = "expenses")]
    pub kind: KindSegment,
    #[param(example = 2024)]
    pub year: i32,
    /// 1-12
    #[param(example = 5)]
    pub month: u32,
}

/// Path parameters addressing a single transaction
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct KindIdPath {
    /// expenses or incomes
    #[param(value_type = String, example = "expenses")]
    pub kind: KindSegment,
    /// Transaction UUID
    pub id: Uuid,
}
