//! Group expense splitting and debt settlement.
//!
//! The core is three pure functions over plain data:
//!
//! 1. [`split::compute_splits`] turns an expense amount and a split rule into
//!    the owed amount of every member
//! 2. [`balance::compute_balances`] folds a group's expenses into paid, owed
//!    and net balances
//! 3. [`exchange::suggest_settlements`] pairs the largest creditor with the
//!    largest debtor until everyone is square
//!
//! Storage ([`repository`], [`mongo`]) and the HTTP surface ([`routes`]) sit
//! around them.
//!
//! ```
//! use groupsplit::compute_splits;
//! use groupsplit::schemas::{Group, Member, MemberId, SplitType};
//! use groupsplit::split::SplitInput;
//! use groupsplit::Money;
//!
//! let member = |id: &str| Member::new(MemberId::new(id).unwrap(), id);
//! let others = vec![member("b"), member("c")];
//! let group = Group::new("g1", "Trip", None, member("a"), others).unwrap();
//! let amount = Money::from_minor(30000);
//! let splits = compute_splits(amount, SplitType::Equal, &group, &SplitInput::new()).unwrap();
//! assert_eq!(splits.total(), amount);
//! ```

#![forbid(unsafe_code)]

pub mod balance;
pub mod config;
pub mod error;
pub mod exchange;
pub mod money;
pub mod mongo;
pub mod repository;
pub mod routes;
pub mod schemas;
pub mod split;
pub mod summary;

pub use balance::{compute_balances, Balance, Balances};
pub use config::Config;
pub use error::{DataIntegrityWarning, Error, ReferenceError, Result, ValidationError};
pub use exchange::{suggest_settlements, SettlementPlan, SettlementSuggestion};
pub use money::Money;
pub use split::{compute_splits, validate_total};
