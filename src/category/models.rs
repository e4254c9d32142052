use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::transaction::models::{KindSegment, TransactionKind};

/// Reject names that are empty once surrounding whitespace is removed
fn validate_not_blank(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Database entity for categories
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn get_kind(&self) -> Option<TransactionKind> {
        TransactionKind::parse(&self.kind)
    }
}

/// Category information returned in responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    /// Unique category identifier
    pub id: Uuid,
    /// expense or income
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Category name, unique per user and type
    #[schema(example = "Food")]
    pub name: String,
}

impl CategoryResponse {
    /// Convert a row; the kind comes from the route, which the query already filtered on
    pub fn from_category(category: Category, kind: TransactionKind) -> Self {
        Self {
            id: category.id,
            kind: category.get_kind().unwrap_or(kind),
            name: category.name,
        }
    }
}

/// Request body for creating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    /// Category name (1-255 characters after trimming)
    #[serde(alias = "category")]
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    #[validate(custom(function = "validate_not_blank", message = "Name cannot be empty"))]
    #[schema(example = "Food")]
    pub name: String,
}

impl CreateCategoryDto {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn trimmed_name(&self) -> &str {
        self.name.trim()
    }
}

/// Path parameters addressing a single category
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct CategoryIdPath {
    /// expenses or incomes
    #[param(value_type = String, example = "expenses")]
    pub kind: KindSegment,
    /// Category UUID
    pub id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_dto_accepts_category_alias() {
        let dto: CreateCategoryDto =
            serde_json::from_str(r#"{"category": "  Food "}"#).expect("Should deserialize");
        assert_eq!(dto.trimmed_name(), "Food");
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(CreateCategoryDto::new("").validate().is_err());
        assert!(CreateCategoryDto::new("   ").validate().is_err());
    }

    #[test]
    fn test_long_name_rejected() {
        assert!(CreateCategoryDto::new("x".repeat(256)).validate().is_err());
        assert!(CreateCategoryDto::new("x".repeat(255)).validate().is_ok());
    }

    #[test]
    fn test_response_uses_type_field() {
        let response = CategoryResponse {
            id: Uuid::new_v4(),
            kind: TransactionKind::Income,
            name: "Salary".to_string(),
        };
        let json = serde_json::to_value(&response).expect("Should serialize");
        assert_eq!(json["type"], "income");
        assert_eq!(json["name"], "Salary");
    }
}
