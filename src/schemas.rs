use crate::error::ValidationError;
use crate::money::Money;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Categories offered by the dashboard when logging a shared expense.
pub const DEFAULT_CATEGORIES: [&str; 9] = [
    "Food & Dining",
    "Transportation",
    "Accommodation",
    "Entertainment",
    "Shopping",
    "Groceries",
    "Bills",
    "Travel",
    "Other",
];

pub const FALLBACK_CATEGORY: &str = "Other";

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyMemberId);
        }
        if trimmed.len() == id.len() {
            Ok(Self(id))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MemberId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        MemberId::new(value)
    }
}

impl From<MemberId> for String {
    fn from(id: MemberId) -> Self {
        id.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Member {
    pub fn new(id: MemberId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: None,
            phone: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub members: Vec<Member>,
    pub created_by: MemberId,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Group {
    /// Builds a group with the creator as its first member.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        creator: Member,
        others: Vec<Member>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyGroupName);
        }
        let created_by = creator.id.clone();
        let mut members = Vec::with_capacity(others.len() + 1);
        members.push(creator);
        members.extend(others);

        let group = Self {
            id: id.into(),
            name,
            description: description.filter(|d| !d.trim().is_empty()),
            members,
            created_by,
            created_at: Utc::now(),
        };
        group.validate()?;
        Ok(group)
    }

    /// Checks the membership invariants of a group, e.g. one loaded from storage.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.members.is_empty() {
            return Err(ValidationError::EmptyGroup);
        }
        let mut seen = HashSet::with_capacity(self.members.len());
        for member in &self.members {
            if !seen.insert(&member.id) {
                return Err(ValidationError::DuplicateMember(member.id.clone()));
            }
        }
        if !seen.contains(&self.created_by) {
            return Err(ValidationError::UnknownMember(self.created_by.clone()));
        }
        Ok(())
    }

    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|m| &m.id == id)
    }

    pub fn contains(&self, id: &MemberId) -> bool {
        self.member(id).is_some()
    }

    pub fn position(&self, id: &MemberId) -> Option<usize> {
        self.members.iter().position(|m| &m.id == id)
    }

    pub fn add_member(&mut self, member: Member) -> Result<(), ValidationError> {
        if self.contains(&member.id) {
            return Err(ValidationError::DuplicateMember(member.id));
        }
        self.members.push(member);
        Ok(())
    }

    /// Removes a member nobody's expenses point at. The creator always stays.
    pub fn remove_member(
        &mut self,
        id: &MemberId,
        expenses: &[GroupExpense],
    ) -> Result<Member, ValidationError> {
        let position = self
            .position(id)
            .ok_or_else(|| ValidationError::UnknownMember(id.clone()))?;
        if &self.created_by == id {
            return Err(ValidationError::CreatorRemoval(id.clone()));
        }
        if expenses.iter().any(|e| e.references(id)) {
            return Err(ValidationError::MemberReferenced(id.clone()));
        }
        Ok(self.members.remove(position))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitType {
    Equal,
    Exact,
    Percentage,
    Shares,
}

impl SplitType {
    pub fn as_str(self) -> &'static str {
        match self {
            SplitType::Equal => "equal",
            SplitType::Exact => "exact",
            SplitType::Percentage => "percentage",
            SplitType::Shares => "shares",
        }
    }
}

impl FromStr for SplitType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equal" => Ok(SplitType::Equal),
            "exact" => Ok(SplitType::Exact),
            "percentage" => Ok(SplitType::Percentage),
            "shares" => Ok(SplitType::Shares),
            _ => Err(ValidationError::UnknownSplitType(s.to_string())),
        }
    }
}

impl fmt::Display for SplitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owed amount per member for one expense.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Splits(BTreeMap<MemberId, Money>);

impl Splits {
    /// Only members of `group` with non-negative amounts are accepted.
    pub fn new(group: &Group, splits: BTreeMap<MemberId, Money>) -> Result<Self, ValidationError> {
        for (member, amount) in &splits {
            if !group.contains(member) {
                return Err(ValidationError::UnknownMember(member.clone()));
            }
            if amount.is_negative() {
                return Err(ValidationError::NegativeInput {
                    member: member.clone(),
                    value: amount.to_decimal(),
                });
            }
        }
        Ok(Self(splits))
    }

    pub fn get(&self, member: &MemberId) -> Option<Money> {
        self.0.get(member).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MemberId, Money)> {
        self.0.iter().map(|(id, amount)| (id, *amount))
    }

    pub fn total(&self) -> Money {
        self.0.values().sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupExpense {
    pub id: String,
    pub group_id: String,
    pub description: String,
    pub amount: Money,
    pub paid_by: MemberId,
    pub category: String,
    pub date: DateTime<Utc>,
    pub split_type: SplitType,
    pub splits: Splits,
}

impl GroupExpense {
    /// Whether the member paid for or shares in this expense.
    pub fn references(&self, member: &MemberId) -> bool {
        &self.paid_by == member || self.splits.get(member).is_some()
    }
}

/// Expense as submitted by a user, before splits are computed.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDraft {
    pub description: String,
    pub amount: Decimal,
    pub paid_by: MemberId,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    pub split_type: String,
    #[serde(default)]
    pub custom_splits: BTreeMap<MemberId, Decimal>,
}
