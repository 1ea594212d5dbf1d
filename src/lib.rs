//! Cross-field business-rule validation for the loan application lifecycle.
//!
//! The engine turns an untrusted request document plus the persisted
//! loan/product state into either a fully validated pass or a complete,
//! ordered list of structured failures. Ordinary violations accumulate in a
//! per-call [`context::ValidationContext`]; contradictory feature
//! combinations, illegal lifecycle states and impossible dates abort
//! immediately through [`error::DomainRuleError`].
//!
//! Entry points live on [`validator::LoanApplicationValidator`], one per
//! lifecycle context: create, modify, approve, reject, withdraw, undo and
//! disburse.

pub mod api;
pub mod calendar;
pub mod context;
pub mod disbursement;
pub mod document;
pub mod error;
pub mod loan;
pub mod party;
pub mod product;
pub mod types;
pub mod validator;
