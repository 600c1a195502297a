use crate::balance::Balances;
use crate::error::DataIntegrityWarning;
use crate::money::Money;
use crate::schemas::MemberId;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementSuggestion {
    pub from_member_id: MemberId,
    pub to_member_id: MemberId,
    pub amount: Money,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SettlementPlan {
    pub suggestions: Vec<SettlementSuggestion>,
    /// Parties still open once the other side ran out. Empty for a consistent ledger.
    pub residual: Vec<(MemberId, Money)>,
}

impl SettlementPlan {
    pub fn warnings(&self) -> Vec<DataIntegrityWarning> {
        self.residual
            .iter()
            .map(|(member_id, remaining)| DataIntegrityWarning::UnmatchedBalance {
                member_id: member_id.clone(),
                remaining: *remaining,
            })
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.residual.is_empty()
    }
}

// Remaining amount (always positive) first, then earlier members win ties.
type Party = (Money, Reverse<usize>);

/// Greedy debt simplification: keep pairing the largest creditor with the
/// largest debtor until one side is exhausted.
pub fn suggest_settlements(balances: &Balances) -> SettlementPlan {
    let members: Vec<&MemberId> = balances.iter().map(|b| &b.member_id).collect();

    let mut creditors = BinaryHeap::new();
    let mut debtors = BinaryHeap::new();
    for (position, balance) in balances.iter().enumerate() {
        // Within one cent of zero counts as settled.
        if balance.net.is_negligible() {
            continue;
        }
        if balance.net.is_positive() {
            creditors.push((balance.net, Reverse(position)));
        } else {
            debtors.push((balance.net.abs(), Reverse(position)));
        }
    }

    let mut suggestions = Vec::new();
    while let (Some(&creditor), Some(&debtor)) = (creditors.peek(), debtors.peek()) {
        creditors.pop();
        debtors.pop();
        let (credit, Reverse(creditor_at)) = creditor;
        let (debt, Reverse(debtor_at)) = debtor;

        let amount = credit.min(debt);
        suggestions.push(SettlementSuggestion {
            from_member_id: members[debtor_at].clone(),
            to_member_id: members[creditor_at].clone(),
            amount,
        });

        reinsert(&mut creditors, (credit - amount, Reverse(creditor_at)));
        reinsert(&mut debtors, (debt - amount, Reverse(debtor_at)));
    }

    let mut residual: Vec<(usize, Money)> = creditors
        .into_iter()
        .map(|(remaining, Reverse(at))| (at, remaining))
        .chain(
            debtors
                .into_iter()
                .map(|(remaining, Reverse(at))| (at, -remaining)),
        )
        .collect();
    residual.sort_by_key(|(at, _)| *at);

    let plan = SettlementPlan {
        suggestions,
        residual: residual
            .into_iter()
            .map(|(at, remaining)| (members[at].clone(), remaining))
            .collect(),
    };
    for warning in plan.warnings() {
        tracing::warn!("{}", warning);
    }
    plan
}

fn reinsert(parties: &mut BinaryHeap<Party>, party: Party) {
    if !party.0.is_negligible() {
        parties.push(party);
    }
}
