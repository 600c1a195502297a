use crate::balance::{compute_balances, Balances};
use crate::error::{DataIntegrityWarning, ReferenceError};
use crate::exchange::{suggest_settlements, SettlementSuggestion};
use crate::money::Money;
use crate::schemas::{Group, GroupExpense};
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything the group overview shows at once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub group_id: String,
    pub expense_count: usize,
    pub total_spent: Money,
    pub by_category: BTreeMap<String, Money>,
    pub balances: Balances,
    pub settlements: Vec<SettlementSuggestion>,
    pub warnings: Vec<DataIntegrityWarning>,
}

pub fn summarize(
    group: &Group,
    expenses: &[GroupExpense],
) -> Result<GroupSummary, ReferenceError> {
    let balances = compute_balances(group, expenses)?;
    let plan = suggest_settlements(&balances);

    let mut total_spent = Money::ZERO;
    let mut by_category: BTreeMap<String, Money> = BTreeMap::new();
    for expense in expenses {
        let overflow = || ReferenceError::AmountOverflow {
            expense_id: expense.id.clone(),
        };
        total_spent = total_spent.checked_add(expense.amount).ok_or_else(overflow)?;
        let category = by_category.entry(expense.category.clone()).or_default();
        *category = category.checked_add(expense.amount).ok_or_else(overflow)?;
    }

    let mut warnings: Vec<DataIntegrityWarning> =
        balances.integrity_warning().into_iter().collect();
    warnings.extend(plan.warnings());

    Ok(GroupSummary {
        group_id: group.id.clone(),
        expense_count: expenses.len(),
        total_spent,
        by_category,
        balances,
        settlements: plan.suggestions,
        warnings,
    })
}
