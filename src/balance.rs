use crate::error::{DataIntegrityWarning, ReferenceError};
use crate::money::Money;
use crate::schemas::{Group, GroupExpense, MemberId};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub member_id: MemberId,
    pub paid: Money,
    pub owed: Money,
    pub net: Money,
}

impl Balance {
    pub fn new(member_id: MemberId) -> Self {
        Self {
            member_id,
            paid: Money::ZERO,
            owed: Money::ZERO,
            net: Money::ZERO,
        }
    }

    /// A balance that only carries a net position, as used for settlement.
    pub fn with_net(member_id: MemberId, net: Money) -> Self {
        let (paid, owed) = if net.is_negative() {
            (Money::ZERO, -net)
        } else {
            (net, Money::ZERO)
        };
        Self {
            member_id,
            paid,
            owed,
            net,
        }
    }
}

/// Per-member balances, in group member order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Balances {
    entries: Vec<Balance>,
    #[serde(skip)]
    index: HashMap<MemberId, usize>,
    #[serde(skip)]
    expense_count: usize,
}

impl Balances {
    pub fn from_entries(entries: Vec<Balance>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(position, balance)| (balance.member_id.clone(), position))
            .collect();
        Self {
            entries,
            index,
            expense_count: 0,
        }
    }

    pub fn get(&self, member: &MemberId) -> Option<&Balance> {
        self.index.get(member).map(|&position| &self.entries[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Balance> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all net balances. Zero for a consistent ledger. Saturates
    /// instead of wrapping when the nets are wildly out of range.
    pub fn imbalance(&self) -> Money {
        let total: i128 = self.entries.iter().map(|b| i128::from(b.net.minor())).sum();
        let clamped = total.clamp(i128::from(i64::MIN), i128::from(i64::MAX));
        Money::from_minor(clamped as i64)
    }

    /// Every folded expense may contribute at most one minor unit of drift;
    /// anything beyond that is reported.
    pub fn integrity_warning(&self) -> Option<DataIntegrityWarning> {
        let imbalance = self.imbalance();
        if imbalance.minor().unsigned_abs() <= self.expense_count as u64 {
            None
        } else {
            Some(DataIntegrityWarning::UnbalancedLedger { imbalance })
        }
    }

    fn entry_mut(&mut self, member: &MemberId) -> Option<&mut Balance> {
        let position = *self.index.get(member)?;
        self.entries.get_mut(position)
    }
}

impl IntoIterator for Balances {
    type Item = Balance;
    type IntoIter = std::vec::IntoIter<Balance>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Folds a group's expenses into paid/owed/net balances for every member.
pub fn compute_balances(
    group: &Group,
    expenses: &[GroupExpense],
) -> Result<Balances, ReferenceError> {
    let mut balances = Balances::from_entries(
        group
            .members
            .iter()
            .map(|member| Balance::new(member.id.clone()))
            .collect(),
    );

    for expense in expenses {
        if expense.group_id != group.id {
            return Err(ReferenceError::ForeignExpense {
                expense_id: expense.id.clone(),
                expense_group: expense.group_id.clone(),
                group: group.id.clone(),
            });
        }
        let overflow = || ReferenceError::AmountOverflow {
            expense_id: expense.id.clone(),
        };

        let payer = balances
            .entry_mut(&expense.paid_by)
            .ok_or_else(|| ReferenceError::UnknownPayer {
                expense_id: expense.id.clone(),
                member: expense.paid_by.clone(),
            })?;
        payer.paid = payer.paid.checked_add(expense.amount).ok_or_else(overflow)?;
        payer.net = payer.net.checked_add(expense.amount).ok_or_else(overflow)?;

        for (member, share) in expense.splits.iter() {
            let debtor = balances
                .entry_mut(member)
                .ok_or_else(|| ReferenceError::UnknownSplitMember {
                    expense_id: expense.id.clone(),
                    member: member.clone(),
                })?;
            debtor.owed = debtor.owed.checked_add(share).ok_or_else(overflow)?;
            debtor.net = debtor.net.checked_sub(share).ok_or_else(overflow)?;
        }
    }

    balances.expense_count = expenses.len();

    if let Some(warning) = balances.integrity_warning() {
        tracing::warn!(group_id = %group.id, "{}", warning);
    }

    Ok(balances)
}
