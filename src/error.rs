//! Failure channels of the validation engine.
//!
//! Two channels exist and are never conflated: [`ValidationFailure`] carries
//! every accumulated field error for a request, while [`DomainRuleError`] is
//! raised immediately when continuing the validation would be meaningless
//! (structural rejection, contradictory feature combinations, illegal
//! lifecycle state, lookup misses).

use serde::Serialize;

use crate::context::ValidationError;

/// Global code attached to every aggregated validation failure.
pub const VALIDATION_ERRORS_EXIST: &str = "validation.msg.validation.errors.exist";

/// Aggregate of all field errors collected during one validation call.
#[derive(Debug, Serialize, thiserror::Error)]
#[error("validation errors exist")]
pub struct ValidationFailure {
    #[serde(rename = "globalCode")]
    pub global_code: &'static str,
    pub errors: Vec<ValidationError>,
}

impl ValidationFailure {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { global_code: VALIDATION_ERRORS_EXIST, errors }
    }
}

/// Rules that abort validation as soon as they trip.
#[derive(Debug, thiserror::Error)]
pub enum DomainRuleError {
    #[error("the request body is empty or is not a JSON object")]
    InvalidJson,

    #[error("unsupported parameters: {0:?}")]
    UnsupportedParameters(Vec<String>),

    #[error("loan product {0} not found")]
    ProductNotFound(i64),

    #[error("client {0} not found")]
    ClientNotFound(i64),

    #[error("group {0} not found")]
    GroupNotFound(i64),

    #[error("savings account {0} not found")]
    SavingsAccountNotFound(i64),

    #[error("calendar {0} not found")]
    CalendarNotFound(i64),

    #[error("client {0} is not active")]
    ClientNotActive(i64),

    #[error("group {0} is not active")]
    GroupNotActive(i64),

    #[error("client {client_id} is not a member of group {group_id}")]
    ClientNotInGroup { client_id: i64, group_id: i64 },

    #[error("equal amortization is not supported with {feature}")]
    EqualAmortizationUnsupported { feature: &'static str },

    #[error("loan application {0} is not in submitted and pending approval state")]
    NotInSubmittedAndPendingApprovalState(i64),

    /// Illegal lifecycle transition, e.g. approving before the submission
    /// date. `action` and `postfix` combine into the machine-readable code.
    #[error("{message}")]
    InvalidLoanStateTransition {
        action: &'static str,
        postfix: &'static str,
        message: String,
    },

    /// A date landed outside the window the product or calendar allows.
    #[error("{message}")]
    ApplicationDate { code: &'static str, message: String },

    /// Coded domain rules with no dedicated variant (top-up checks and the
    /// schedule-type/strategy pairing).
    #[error("{message}")]
    DomainRule { code: &'static str, message: String },

    #[error("for this loan product, disbursement details must be provided")]
    MultiDisbursementDataRequired,

    #[error("for this loan product, disbursement details are not allowed")]
    MultiDisbursementDataNotAllowed,

    #[error("number of tranches {provided} exceeds the maximum of {maximum}")]
    ExceedingTrancheCount { maximum: usize, provided: usize },
}

impl DomainRuleError {
    /// Machine-readable code of the rule that tripped.
    pub fn code(&self) -> String {
        match self {
            Self::InvalidJson => "error.msg.invalid.request.body".into(),
            Self::UnsupportedParameters(_) => "error.msg.parameter.unsupported".into(),
            Self::ProductNotFound(_) => "error.msg.loanproduct.not.found".into(),
            Self::ClientNotFound(_) => "error.msg.client.not.found".into(),
            Self::GroupNotFound(_) => "error.msg.group.not.found".into(),
            Self::SavingsAccountNotFound(_) => "error.msg.savingsaccount.not.found".into(),
            Self::CalendarNotFound(_) => "error.msg.calendar.not.found".into(),
            Self::ClientNotActive(_) => "error.msg.client.not.active".into(),
            Self::GroupNotActive(_) => "error.msg.group.not.active".into(),
            Self::ClientNotInGroup { .. } => "error.msg.client.not.in.group".into(),
            Self::EqualAmortizationUnsupported { .. } => {
                "error.msg.loan.equal.amortization.not.supported".into()
            }
            Self::NotInSubmittedAndPendingApprovalState(_) => {
                "error.msg.loan.application.not.in.submitted.and.pending.approval.state".into()
            }
            Self::InvalidLoanStateTransition { action, postfix, .. } => {
                format!("error.msg.loan.{action}.{postfix}")
            }
            Self::ApplicationDate { code, .. } => format!("error.msg.loan.{code}"),
            Self::DomainRule { code, .. } => (*code).into(),
            Self::MultiDisbursementDataRequired => {
                "error.msg.loan.disbursement.data.required".into()
            }
            Self::MultiDisbursementDataNotAllowed => {
                "error.msg.loan.disbursement.data.not.allowed".into()
            }
            Self::ExceedingTrancheCount { .. } => {
                "error.msg.loan.disbursement.exceeding.max.tranche.count".into()
            }
        }
    }
}

/// Outcome of a lifecycle entry point: either every accumulated problem at
/// once, or the single rule that made the request meaningless.
#[derive(Debug, thiserror::Error)]
pub enum LoanValidationError {
    #[error(transparent)]
    Invalid(#[from] ValidationFailure),

    #[error(transparent)]
    Domain(#[from] DomainRuleError),
}

impl LoanValidationError {
    pub fn as_failure(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Invalid(failure) => Some(failure),
            Self::Domain(_) => None,
        }
    }

    pub fn as_domain(&self) -> Option<&DomainRuleError> {
        match self {
            Self::Invalid(_) => None,
            Self::Domain(rule) => Some(rule),
        }
    }
}
