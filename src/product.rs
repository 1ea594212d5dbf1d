//! Loan product snapshot and the constraint resolver.
//!
//! The engine only ever reads product state. [`ProductConstraints::resolve`]
//! derives the dynamic rule parameters for a request once per validation
//! call; the resolved snapshot is then threaded through the rule sets as a
//! plain parameter.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::types::{
    ADVANCED_PAYMENT_ALLOCATION_STRATEGY, InterestCalculationPeriod, LoanScheduleType,
    ScheduleProcessingType,
};

/// How far an approved amount may exceed the proposed principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverAppliedCalculation {
    /// A flat amount on top of the proposed principal
    Flat,
    /// A percentage of the proposed principal
    Percentage,
}

/// Floating-rate linkage configured on a product.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingRateConfig {
    pub floating_calculation_allowed: bool,
    pub min_differential_rate: Decimal,
    pub max_differential_rate: Decimal,
}

/// Read-only snapshot of a loan product definition, owned by a separate
/// subsystem and handed to the engine already resolved.
#[derive(Debug, Clone)]
pub struct LoanProduct {
    pub id: i64,
    pub name: String,
    pub currency_code: String,
    pub start_date: Option<NaiveDate>,
    pub close_date: Option<NaiveDate>,
    pub min_principal: Option<Decimal>,
    pub max_principal: Option<Decimal>,
    pub min_number_of_repayments: Option<i64>,
    pub max_number_of_repayments: Option<i64>,
    /// `Some` means the product is linked to a floating rate
    pub floating_rates: Option<FloatingRateConfig>,
    pub interest_recalculation_enabled: bool,
    pub allow_partial_period_interest: bool,
    pub allow_variable_installments: bool,
    pub multi_disburse: bool,
    pub max_tranche_count: usize,
    pub disallow_expected_disbursements: bool,
    pub can_define_installment_amount: bool,
    pub can_use_for_topup: bool,
    pub allow_approved_amount_over_applied: bool,
    pub over_applied_calculation_type: OverAppliedCalculation,
    pub over_applied_number: i64,
    pub transaction_processing_strategy: String,
    pub schedule_type: LoanScheduleType,
    pub schedule_processing_type: ScheduleProcessingType,
    /// Disbursal must happen on the expected date when set
    pub sync_expected_with_disbursement_date: bool,
}

impl Default for LoanProduct {
    fn default() -> Self {
        Self {
            id: 1,
            name: "standard term loan".to_string(),
            currency_code: "USD".to_string(),
            start_date: None,
            close_date: None,
            min_principal: None,
            max_principal: None,
            min_number_of_repayments: None,
            max_number_of_repayments: None,
            floating_rates: None,
            interest_recalculation_enabled: false,
            allow_partial_period_interest: true,
            allow_variable_installments: false,
            multi_disburse: false,
            max_tranche_count: 0,
            disallow_expected_disbursements: false,
            can_define_installment_amount: false,
            can_use_for_topup: false,
            allow_approved_amount_over_applied: false,
            over_applied_calculation_type: OverAppliedCalculation::Flat,
            over_applied_number: 0,
            transaction_processing_strategy: "mifos-standard-strategy".to_string(),
            schedule_type: LoanScheduleType::Cumulative,
            schedule_processing_type: ScheduleProcessingType::Horizontal,
            sync_expected_with_disbursement_date: false,
        }
    }
}

impl LoanProduct {
    pub fn is_linked_to_floating_rate(&self) -> bool {
        self.floating_rates.is_some()
    }
}

/// Read-only port resolving product snapshots for lifecycle contexts that
/// receive only a loan (approval, disbursement) or a changed product id.
pub trait ProductLookup {
    fn find_product(&self, id: i64) -> Option<LoanProduct>;
}

/// Dynamic rule parameters derived from one product snapshot. Resolved once
/// per validation call, never per field.
#[derive(Debug, Clone)]
pub struct ProductConstraints {
    linked_to_floating_rate: bool,
    floating_calculation_allowed: bool,
    floating_rate_bounds: Option<(Decimal, Decimal)>,
    principal_bounds: (Option<Decimal>, Option<Decimal>),
    repayments_bounds: (Option<i64>, Option<i64>),
    multi_disburse: bool,
    max_tranche_count: usize,
    disallow_expected_disbursements: bool,
    partial_period_interest_default: bool,
    interest_recalculation_enabled: bool,
    allow_variable_installments: bool,
    schedule_type: LoanScheduleType,
    strategy: String,
}

impl ProductConstraints {
    pub fn resolve(product: &LoanProduct) -> Self {
        Self {
            linked_to_floating_rate: product.floating_rates.is_some(),
            floating_calculation_allowed: product
                .floating_rates
                .as_ref()
                .is_some_and(|f| f.floating_calculation_allowed),
            floating_rate_bounds: product
                .floating_rates
                .as_ref()
                .map(|f| (f.min_differential_rate, f.max_differential_rate)),
            principal_bounds: (product.min_principal, product.max_principal),
            repayments_bounds: (product.min_number_of_repayments, product.max_number_of_repayments),
            multi_disburse: product.multi_disburse,
            max_tranche_count: product.max_tranche_count,
            disallow_expected_disbursements: product.disallow_expected_disbursements,
            partial_period_interest_default: product.allow_partial_period_interest,
            interest_recalculation_enabled: product.interest_recalculation_enabled,
            allow_variable_installments: product.allow_variable_installments,
            schedule_type: product.schedule_type,
            strategy: product.transaction_processing_strategy.clone(),
        }
    }

    pub fn is_linked_to_floating_rate(&self) -> bool {
        self.linked_to_floating_rate
    }

    pub fn floating_calculation_allowed(&self) -> bool {
        self.floating_calculation_allowed
    }

    pub fn floating_rate_bounds(&self) -> Option<(Decimal, Decimal)> {
        self.floating_rate_bounds
    }

    pub fn principal_bounds(&self) -> (Option<Decimal>, Option<Decimal>) {
        self.principal_bounds
    }

    pub fn repayments_bounds(&self) -> (Option<i64>, Option<i64>) {
        self.repayments_bounds
    }

    pub fn is_multi_disburse(&self) -> bool {
        self.multi_disburse
    }

    pub fn max_tranche_count(&self) -> usize {
        self.max_tranche_count
    }

    pub fn disallows_expected_disbursements(&self) -> bool {
        self.disallow_expected_disbursements
    }

    pub fn is_interest_recalculation_enabled(&self) -> bool {
        self.interest_recalculation_enabled
    }

    pub fn allows_variable_installments(&self) -> bool {
        self.allow_variable_installments
    }

    pub fn schedule_type(&self) -> LoanScheduleType {
        self.schedule_type
    }

    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    /// Progressive schedules only work with advanced payment allocation.
    pub fn requires_advanced_payment_allocation(&self) -> bool {
        self.schedule_type == LoanScheduleType::Progressive
    }

    /// Cumulative schedules must not use advanced payment allocation.
    pub fn forbids_advanced_payment_allocation(&self) -> bool {
        self.schedule_type == LoanScheduleType::Cumulative
    }

    pub fn uses_advanced_payment_allocation(&self) -> bool {
        self.strategy == ADVANCED_PAYMENT_ALLOCATION_STRATEGY
    }

    /// Whether partial-period interest is considered for the given
    /// calculation period. Daily calculation always considers partial
    /// periods; otherwise the product default applies.
    pub fn supports_partial_period_interest(&self, period: InterestCalculationPeriod) -> bool {
        period.is_daily() || self.partial_period_interest_default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn resolver_exposes_floating_bounds_only_when_linked() {
        let mut product = LoanProduct::default();
        assert!(!ProductConstraints::resolve(&product).is_linked_to_floating_rate());

        product.floating_rates = Some(FloatingRateConfig {
            floating_calculation_allowed: true,
            min_differential_rate: dec!(-2.5),
            max_differential_rate: dec!(4.0),
        });
        let constraints = ProductConstraints::resolve(&product);
        assert!(constraints.is_linked_to_floating_rate());
        assert_eq!(constraints.floating_rate_bounds(), Some((dec!(-2.5), dec!(4.0))));
    }

    #[test]
    fn schedule_type_drives_strategy_requirements() {
        let mut product = LoanProduct::default();
        let cumulative = ProductConstraints::resolve(&product);
        assert!(cumulative.forbids_advanced_payment_allocation());
        assert!(!cumulative.requires_advanced_payment_allocation());

        product.schedule_type = LoanScheduleType::Progressive;
        let progressive = ProductConstraints::resolve(&product);
        assert!(progressive.requires_advanced_payment_allocation());
        assert!(!progressive.forbids_advanced_payment_allocation());
    }

    #[test]
    fn daily_interest_calculation_always_considers_partial_periods() {
        let product = LoanProduct { allow_partial_period_interest: false, ..Default::default() };
        let constraints = ProductConstraints::resolve(&product);
        assert!(constraints.supports_partial_period_interest(InterestCalculationPeriod::Daily));
        assert!(
            !constraints
                .supports_partial_period_interest(InterestCalculationPeriod::SameAsRepaymentPeriod)
        );
    }
}
