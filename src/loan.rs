//! Persisted loan state as seen by the validation engine

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::types::{
    AmortizationMethod, InterestCalculationPeriod, InterestMethod, LoanType, PeriodFrequency,
    ScheduleProcessingType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanStatus {
    SubmittedAndPendingApproval,
    Approved,
    Active,
    Rejected,
    Withdrawn,
    Closed,
    Overpaid,
}

/// Snapshot of a persisted loan. The engine reads it to substitute prior
/// values on modify and to gate lifecycle transitions; it never writes back.
#[derive(Debug, Clone)]
pub struct Loan {
    pub id: i64,
    pub loan_type: LoanType,
    pub client_id: Option<i64>,
    pub group_id: Option<i64>,
    pub product_id: i64,
    pub status: LoanStatus,
    pub currency_code: String,
    pub proposed_principal: Decimal,
    pub approved_principal: Option<Decimal>,
    pub submitted_on_date: NaiveDate,
    pub expected_disbursement_date: NaiveDate,
    pub approved_on_date: Option<NaiveDate>,
    pub actual_disbursement_date: Option<NaiveDate>,
    /// Most recent repayment-side transaction, used by top-up ordering rules
    pub last_user_transaction_date: Option<NaiveDate>,
    pub term_frequency: i64,
    pub term_frequency_type: PeriodFrequency,
    pub number_of_repayments: i64,
    pub repayment_every: i64,
    pub repayment_frequency_type: PeriodFrequency,
    pub interest_method: InterestMethod,
    pub interest_calculation_period: InterestCalculationPeriod,
    pub amortization_method: AmortizationMethod,
    pub equal_amortization: bool,
    pub interest_rate_per_period: Option<Decimal>,
    pub floating_interest_rate: Option<bool>,
    pub interest_rate_differential: Option<Decimal>,
    pub transaction_processing_strategy: String,
    pub schedule_processing_type: ScheduleProcessingType,
    pub fixed_emi_amount: Option<Decimal>,
    pub grace_on_principal_payment: Option<i64>,
    pub grace_on_interest_payment: Option<i64>,
    pub grace_on_interest_charged: Option<i64>,
    pub sync_disbursement_with_meeting: bool,
    pub multi_disburse: bool,
    pub interest_recalculation_enabled: bool,
    pub topup: bool,
    pub loan_id_to_close: Option<i64>,
}

impl Loan {
    pub fn is_submitted_and_pending_approval(&self) -> bool {
        self.status == LoanStatus::SubmittedAndPendingApproval
    }

    /// Principal used when re-running tranche validation at approval time.
    pub fn effective_principal(&self) -> Decimal {
        self.approved_principal.unwrap_or(self.proposed_principal)
    }
}

impl Default for Loan {
    fn default() -> Self {
        let submitted = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap_or_default();
        Self {
            id: 1,
            loan_type: LoanType::Individual,
            client_id: Some(1),
            group_id: None,
            product_id: 1,
            status: LoanStatus::SubmittedAndPendingApproval,
            currency_code: "USD".to_string(),
            proposed_principal: Decimal::new(10_000, 0),
            approved_principal: None,
            submitted_on_date: submitted,
            expected_disbursement_date: submitted,
            approved_on_date: None,
            actual_disbursement_date: None,
            last_user_transaction_date: None,
            term_frequency: 12,
            term_frequency_type: PeriodFrequency::Months,
            number_of_repayments: 12,
            repayment_every: 1,
            repayment_frequency_type: PeriodFrequency::Months,
            interest_method: InterestMethod::DecliningBalance,
            interest_calculation_period: InterestCalculationPeriod::SameAsRepaymentPeriod,
            amortization_method: AmortizationMethod::EqualInstallments,
            equal_amortization: false,
            interest_rate_per_period: Some(Decimal::new(12, 0)),
            floating_interest_rate: None,
            interest_rate_differential: None,
            transaction_processing_strategy: "mifos-standard-strategy".to_string(),
            schedule_processing_type: ScheduleProcessingType::Horizontal,
            fixed_emi_amount: None,
            grace_on_principal_payment: None,
            grace_on_interest_payment: None,
            grace_on_interest_charged: None,
            sync_disbursement_with_meeting: false,
            multi_disburse: false,
            interest_recalculation_enabled: false,
            topup: false,
            loan_id_to_close: None,
        }
    }
}

/// Read-only port over persisted loans, used to resolve top-up targets.
pub trait LoanLookup {
    /// An open (not closed, not written off) loan owned by the client.
    fn find_open_loan_for_client(&self, loan_id: i64, client_id: i64) -> Option<Loan>;

    /// Outstanding prepayment amount of a loan as of the given date.
    fn prepayment_amount(&self, loan_id: i64, on_date: NaiveDate) -> Option<Decimal>;
}
