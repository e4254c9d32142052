use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::transaction::models::TransactionKind;

use super::models::{MonthlySummary, Period, SummaryEntry};

/// Currency amounts are carried at two decimal places
const MONEY_SCALE: u32 = 2;

/// Normalize an amount to two decimal places
pub fn money(mut amount: Decimal) -> Decimal {
    amount.rescale(MONEY_SCALE);
    amount
}

/// Reduce a list of transactions to the summary of one period.
///
/// Entries dated outside `period` are ignored, so callers may pass an
/// unfiltered list. Categories without entries in the period do not appear
/// in the per-category maps.
pub fn summarize<'a, I>(period: Period, entries: I) -> MonthlySummary
where
    I: IntoIterator<Item = &'a SummaryEntry>,
{
    let mut expense_by_category: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut income_by_category: BTreeMap<String, Decimal> = BTreeMap::new();

    for entry in entries.into_iter().filter(|e| period.contains(e.date)) {
        let bucket = match entry.kind {
            TransactionKind::Expense => &mut expense_by_category,
            TransactionKind::Income => &mut income_by_category,
        };
        *bucket
            .entry(entry.category_name.clone())
            .or_insert(Decimal::ZERO) += entry.amount;
    }

    let total_expense = money(expense_by_category.values().copied().sum());
    let total_income = money(income_by_category.values().copied().sum());

    MonthlySummary {
        total_income,
        total_expense,
        balance: money(total_income - total_expense),
        expense_by_category: into_money(expense_by_category),
        income_by_category: into_money(income_by_category),
    }
}

fn into_money(map: BTreeMap<String, Decimal>) -> BTreeMap<String, Decimal> {
    map.into_iter().map(|(name, sum)| (name, money(sum))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::models::TransactionResponse;
    use chrono::NaiveDate;
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).expect("valid decimal")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn period(y: i32, m: u32) -> Period {
        Period::new(y, m).expect("valid period")
    }

    fn may_entries() -> Vec<SummaryEntry> {
        vec![
            SummaryEntry::new(TransactionKind::Expense, "Food", dec("50"), date(2024, 5, 3)),
            SummaryEntry::new(TransactionKind::Income, "Salary", dec("1000"), date(2024, 5, 1)),
        ]
    }

    #[test]
    fn test_example_month() {
        let summary = summarize(period(2024, 5), &may_entries());

        assert_eq!(summary.total_expense, dec("50"));
        assert_eq!(summary.total_income, dec("1000"));
        assert_eq!(summary.balance, dec("950"));
        assert_eq!(summary.expense_by_category.len(), 1);
        assert_eq!(summary.expense_by_category["Food"], dec("50"));
        assert_eq!(summary.income_by_category.len(), 1);
        assert_eq!(summary.income_by_category["Salary"], dec("1000"));
    }

    #[test]
    fn test_other_month_is_empty() {
        let summary = summarize(period(2024, 6), &may_entries());

        assert_eq!(summary, MonthlySummary::empty());
        assert!(summary.total_income.is_zero());
        assert!(summary.total_expense.is_zero());
        assert!(summary.balance.is_zero());
        assert!(summary.expense_by_category.is_empty());
        assert!(summary.income_by_category.is_empty());
    }

    #[test]
    fn test_no_entries() {
        let summary = summarize(period(2024, 5), &Vec::<SummaryEntry>::new());
        assert_eq!(summary, MonthlySummary::empty());
    }

    #[test]
    fn test_groups_by_category_name() {
        let entries = vec![
            SummaryEntry::new(TransactionKind::Expense, "Food", dec("12.30"), date(2024, 2, 1)),
            SummaryEntry::new(TransactionKind::Expense, "Food", dec("7.70"), date(2024, 2, 29)),
            SummaryEntry::new(TransactionKind::Expense, "Rent", dec("800"), date(2024, 2, 10)),
            SummaryEntry::new(TransactionKind::Income, "Bonus", dec("0.10"), date(2024, 2, 5)),
            SummaryEntry::new(TransactionKind::Income, "Bonus", dec("0.20"), date(2024, 2, 6)),
        ];

        let summary = summarize(period(2024, 2), &entries);

        assert_eq!(summary.expense_by_category["Food"], dec("20.00"));
        assert_eq!(summary.expense_by_category["Rent"], dec("800"));
        assert_eq!(summary.income_by_category["Bonus"], dec("0.30"));
        assert_eq!(summary.total_expense, dec("820"));
        assert_eq!(summary.balance, dec("-819.70"));
    }

    #[test]
    fn test_same_name_in_both_kinds_stays_separate() {
        let entries = vec![
            SummaryEntry::new(TransactionKind::Expense, "Other", dec("5"), date(2024, 3, 1)),
            SummaryEntry::new(TransactionKind::Income, "Other", dec("9"), date(2024, 3, 2)),
        ];

        let summary = summarize(period(2024, 3), &entries);

        assert_eq!(summary.expense_by_category["Other"], dec("5"));
        assert_eq!(summary.income_by_category["Other"], dec("9"));
        assert_eq!(summary.balance, dec("4"));
    }

    #[test]
    fn test_month_boundaries() {
        let entries = vec![
            SummaryEntry::new(TransactionKind::Expense, "Food", dec("1"), date(2024, 4, 30)),
            SummaryEntry::new(TransactionKind::Expense, "Food", dec("2"), date(2024, 5, 1)),
            SummaryEntry::new(TransactionKind::Expense, "Food", dec("4"), date(2024, 5, 31)),
            SummaryEntry::new(TransactionKind::Expense, "Food", dec("8"), date(2024, 6, 1)),
            SummaryEntry::new(TransactionKind::Expense, "Food", dec("16"), date(2023, 5, 15)),
        ];

        let summary = summarize(period(2024, 5), &entries);
        assert_eq!(summary.total_expense, dec("6"));
    }

    #[test]
    fn test_totals_are_consistent() {
        let entries: Vec<SummaryEntry> = (1..=28)
            .map(|day| {
                let kind = if day % 3 == 0 {
                    TransactionKind::Income
                } else {
                    TransactionKind::Expense
                };
                let category = format!("cat-{}", day % 5);
                let amount = Decimal::new(i64::from(day) * 137, 2);
                SummaryEntry::new(kind, category, amount, date(2024, 2, day))
            })
            .collect();

        let summary = summarize(period(2024, 2), &entries);

        let expense_sum: Decimal = summary.expense_by_category.values().copied().sum();
        let income_sum: Decimal = summary.income_by_category.values().copied().sum();
        assert_eq!(expense_sum, summary.total_expense);
        assert_eq!(income_sum, summary.total_income);
        assert_eq!(summary.total_income - summary.total_expense, summary.balance);
    }

    #[test]
    fn test_summarize_fetched_transactions() {
        let fetched = vec![
            TransactionResponse {
                id: Uuid::new_v4(),
                kind: TransactionKind::Expense,
                date: date(2024, 5, 3),
                amount: dec("50.00"),
                category_id: Uuid::new_v4(),
                category_name: "Food".to_string(),
                description: None,
            },
            TransactionResponse {
                id: Uuid::new_v4(),
                kind: TransactionKind::Income,
                date: date(2024, 5, 1),
                amount: dec("1000.00"),
                category_id: Uuid::new_v4(),
                category_name: "Salary".to_string(),
                description: Some("May".to_string()),
            },
        ];
        let entries: Vec<SummaryEntry> = fetched.iter().map(SummaryEntry::from).collect();

        assert_eq!(
            summarize(period(2024, 5), &entries),
            summarize(period(2024, 5), &may_entries())
        );
    }

    #[test]
    fn test_amounts_serialize_with_two_decimals() {
        let summary = summarize(period(2024, 5), &may_entries());
        let json = serde_json::to_value(&summary).expect("Should serialize");

        assert_eq!(json["total_expense"], "50.00");
        assert_eq!(json["balance"], "950.00");
        assert_eq!(json["income_by_category"]["Salary"], "1000.00");
    }
}
