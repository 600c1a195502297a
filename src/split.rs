//! Split calculator
//!
//! Turns an expense amount plus per-member raw input into the owed amount of
//! every member. Amounts are apportioned in minor units: each member gets the
//! floor of their proportional part, and the minor units left over go one each
//! to the members with the largest remainders (earlier members first on ties),
//! so the splits always add up to the expense amount exactly.

use crate::error::ValidationError;
use crate::money::Money;
use crate::schemas::{
    ExpenseDraft, Group, GroupExpense, MemberId, SplitType, Splits, FALLBACK_CATEGORY,
};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Per-member input: literal amounts, percentages or share weights.
pub type SplitInput = BTreeMap<MemberId, Decimal>;

/// How far a total may drift from its target and still count as matching.
pub const TOTAL_TOLERANCE: Decimal = dec!(0.01);

pub const PERCENTAGE_TOTAL: Decimal = dec!(100);

/// Sum of raw input values, `None` when it leaves the decimal range.
pub fn input_total<'a>(values: impl IntoIterator<Item = &'a Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |total, value| total.checked_add(*value))
}

/// Whether `values` add up to `target`, give or take [`TOTAL_TOLERANCE`].
pub fn validate_total<'a>(values: impl IntoIterator<Item = &'a Decimal>, target: Decimal) -> bool {
    input_total(values)
        .and_then(|total| total.checked_sub(target))
        .map_or(false, |drift| drift.abs() <= TOTAL_TOLERANCE)
}

pub fn compute_splits(
    amount: Money,
    split_type: SplitType,
    group: &Group,
    raw_input: &SplitInput,
) -> Result<Splits, ValidationError> {
    if !amount.is_positive() {
        return Err(ValidationError::NonPositiveAmount(amount));
    }
    if amount > Money::MAX_AMOUNT {
        return Err(ValidationError::AmountOutOfRange(amount.to_decimal()));
    }
    if group.members.is_empty() {
        return Err(ValidationError::EmptyGroup);
    }
    if split_type != SplitType::Equal {
        check_raw_input(group, raw_input)?;
    }

    let splits = match split_type {
        SplitType::Equal => {
            let weights = group
                .members
                .iter()
                .map(|m| (m.id.clone(), Decimal::ONE))
                .collect::<Vec<_>>();
            apportion(amount, &weights)?
        }
        SplitType::Exact => exact_splits(amount, raw_input)?,
        SplitType::Percentage => {
            if !validate_total(raw_input.values(), PERCENTAGE_TOTAL) {
                return Err(mismatch(PERCENTAGE_TOTAL, raw_input));
            }
            apportion(amount, &ordered_weights(group, raw_input))?
        }
        SplitType::Shares => {
            if raw_input.values().all(Decimal::is_zero) {
                return Err(ValidationError::ZeroTotalShares);
            }
            apportion(amount, &ordered_weights(group, raw_input))?
        }
    };

    Splits::new(group, splits)
}

/// Validates a draft against its group and produces the expense to persist.
pub fn prepare_expense(
    group: &Group,
    draft: ExpenseDraft,
    now: DateTime<Utc>,
) -> Result<GroupExpense, ValidationError> {
    let split_type: SplitType = draft.split_type.parse()?;
    if !group.contains(&draft.paid_by) {
        return Err(ValidationError::UnknownMember(draft.paid_by));
    }
    let amount = to_money(draft.amount)?;
    let splits = compute_splits(amount, split_type, group, &draft.custom_splits)?;

    let category = match draft.category.trim() {
        "" => FALLBACK_CATEGORY.to_string(),
        category => category.to_string(),
    };

    Ok(GroupExpense {
        id: uuid::Uuid::new_v4().to_string(),
        group_id: group.id.clone(),
        description: draft.description.trim().to_string(),
        amount,
        paid_by: draft.paid_by,
        category,
        date: draft.date.unwrap_or(now),
        split_type,
        splits,
    })
}

fn check_raw_input(group: &Group, raw_input: &SplitInput) -> Result<(), ValidationError> {
    for (member, value) in raw_input {
        if !group.contains(member) {
            return Err(ValidationError::UnknownMember(member.clone()));
        }
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ValidationError::NegativeInput {
                member: member.clone(),
                value: *value,
            });
        }
    }
    Ok(())
}

fn exact_splits(
    amount: Money,
    raw_input: &SplitInput,
) -> Result<BTreeMap<MemberId, Money>, ValidationError> {
    let target = amount.to_decimal();
    if !validate_total(raw_input.values(), target) {
        return Err(mismatch(target, raw_input));
    }
    raw_input
        .iter()
        .map(|(member, value)| Ok((member.clone(), to_money(*value)?)))
        .collect()
}

fn mismatch(expected: Decimal, raw_input: &SplitInput) -> ValidationError {
    match input_total(raw_input.values()) {
        Some(actual) => ValidationError::TotalMismatch { expected, actual },
        None => ValidationError::AmountOutOfRange(Decimal::MAX),
    }
}

// Raw input re-keyed into group member order, which decides who receives
// leftover minor units.
fn ordered_weights(group: &Group, raw_input: &SplitInput) -> Vec<(MemberId, Decimal)> {
    group
        .members
        .iter()
        .filter_map(|m| raw_input.get(&m.id).map(|w| (m.id.clone(), *w)))
        .collect()
}

fn apportion(
    amount: Money,
    weights: &[(MemberId, Decimal)],
) -> Result<BTreeMap<MemberId, Money>, ValidationError> {
    let total_weight = input_total(weights.iter().map(|(_, w)| w))
        .ok_or(ValidationError::AmountOutOfRange(Decimal::MAX))?;
    let total_minor = Decimal::from(amount.minor());

    let mut floors = Vec::with_capacity(weights.len());
    let mut remainders = Vec::with_capacity(weights.len());
    for (position, (_, weight)) in weights.iter().enumerate() {
        let exact = total_minor
            .checked_mul(*weight)
            .and_then(|scaled| scaled.checked_div(total_weight))
            .ok_or(ValidationError::AmountOutOfRange(*weight))?;
        let floor = exact.floor();
        floors.push(floor.to_i64().ok_or(ValidationError::AmountOutOfRange(*weight))?);
        remainders.push((Reverse(exact - floor), position));
    }

    // Leftover minor units go to the largest remainders; ties in member order.
    let leftover = amount.minor() - floors.iter().sum::<i64>();
    remainders.sort();
    for (_, position) in remainders.into_iter().take(leftover.max(0) as usize) {
        floors[position] += 1;
    }

    Ok(weights
        .iter()
        .zip(floors)
        .map(|((member, _), minor)| (member.clone(), Money::from_minor(minor)))
        .collect())
}

fn to_money(value: Decimal) -> Result<Money, ValidationError> {
    Money::from_decimal(value).ok_or(ValidationError::AmountOutOfRange(value))
}
