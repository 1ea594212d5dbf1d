//! Lifecycle entry points of the loan application validation engine.
//!
//! Each entry point receives the raw request document plus the resolved
//! snapshots it needs, resolves the product constraints once, and runs its
//! rule set against a single [`ValidationContext`]. Ordinary violations
//! accumulate; contradictory feature combinations, illegal lifecycle states
//! and impossible dates abort immediately through the domain channel.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use tracing::debug;

use crate::api::{self, param};
use crate::calendar::{
    CalendarLookup, HolidaySchedule, WorkingDays, ensure_not_on_holiday,
    ensure_not_on_non_working_day, ensure_on_meeting_date,
};
use crate::context::ValidationContext;
use crate::disbursement;
use crate::document::{Document, ensure_supported_parameters};
use crate::error::{DomainRuleError, LoanValidationError};
use crate::loan::{Loan, LoanLookup};
use crate::party::{Client, ClientLookup, Group, GroupLookup, SavingsLookup};
use crate::product::{
    LoanProduct, OverAppliedCalculation, ProductConstraints, ProductLookup,
};
use crate::types::{
    ADVANCED_PAYMENT_ALLOCATION_STRATEGY, AmortizationMethod, InterestCalculationPeriod,
    InterestMethod, LoanType, ScheduleProcessingType,
};

/// Tenant-level configuration and calendar snapshots the rules consult.
/// Threaded explicitly so two validations never share ambient state.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// "Today" for every not-in-the-future check
    pub business_date: NaiveDate,
    pub allow_transactions_on_holiday: bool,
    pub allow_transactions_on_non_working_day: bool,
    pub meeting_mandatory_for_jlg_loans: bool,
    pub working_days: WorkingDays,
    pub holidays: HolidaySchedule,
}

impl ValidatorConfig {
    pub fn new(business_date: NaiveDate) -> Self {
        Self {
            business_date,
            allow_transactions_on_holiday: false,
            allow_transactions_on_non_working_day: false,
            meeting_mandatory_for_jlg_loans: false,
            working_days: WorkingDays::default(),
            holidays: HolidaySchedule::default(),
        }
    }
}

/// The cross-field rule evaluator. Holds only read-only ports; every call
/// allocates its own context and leaves no state behind.
pub struct LoanApplicationValidator<'a> {
    config: ValidatorConfig,
    clients: &'a dyn ClientLookup,
    groups: &'a dyn GroupLookup,
    loans: &'a dyn LoanLookup,
    savings: &'a dyn SavingsLookup,
    products: &'a dyn ProductLookup,
    calendars: &'a dyn CalendarLookup,
}

fn validate_or_throw<F>(resource: &str, body: F) -> Result<(), LoanValidationError>
where
    F: FnOnce(&mut ValidationContext) -> Result<(), DomainRuleError>,
{
    let mut ctx = ValidationContext::new(resource);
    body(&mut ctx).map_err(LoanValidationError::Domain)?;
    ctx.into_result().map_err(LoanValidationError::Invalid)
}

impl<'a> LoanApplicationValidator<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: ValidatorConfig,
        clients: &'a dyn ClientLookup,
        groups: &'a dyn GroupLookup,
        loans: &'a dyn LoanLookup,
        savings: &'a dyn SavingsLookup,
        products: &'a dyn ProductLookup,
        calendars: &'a dyn CalendarLookup,
    ) -> Self {
        Self { config, clients, groups, loans, savings, products, calendars }
    }

    /// Validates a new loan application against the resolved product.
    pub fn validate_for_create(
        &self,
        doc: &dyn Document,
        product: &LoanProduct,
    ) -> Result<(), LoanValidationError> {
        debug!(product_id = product.id, "validating loan application for create");
        ensure_supported_parameters(doc, api::CREATE_AND_MODIFY_PARAMETERS)
            .map_err(LoanValidationError::Domain)?;

        let constraints = ProductConstraints::resolve(product);
        let client_id = doc.long_named(param::CLIENT_ID);
        let group_id = doc.long_named(param::GROUP_ID);
        let client = self.resolve_client(client_id).map_err(LoanValidationError::Domain)?;
        let group = self.resolve_group(group_id).map_err(LoanValidationError::Domain)?;
        validate_client_or_group(client.as_ref(), group.as_ref())
            .map_err(LoanValidationError::Domain)?;

        validate_or_throw("loan", |ctx| {
            let loan_type = self.loan_type_rules(ctx, doc, client_id, group_id)?;

            let mut equal_amortization = false;
            if doc.exists(param::IS_EQUAL_AMORTIZATION) {
                let value = doc.bool_named(param::IS_EQUAL_AMORTIZATION);
                ctx.param(param::IS_EQUAL_AMORTIZATION, value).true_or_false_required();
                equal_amortization = value.unwrap_or(false);
                if equal_amortization && constraints.is_interest_recalculation_enabled() {
                    return Err(DomainRuleError::EqualAmortizationUnsupported {
                        feature: "interest recalculation",
                    });
                }
            }

            let fixed_principal_pct =
                doc.decimal_named(param::FIXED_PRINCIPAL_PERCENTAGE_PER_INSTALLMENT);
            ctx.param(param::FIXED_PRINCIPAL_PERCENTAGE_PER_INSTALLMENT, fixed_principal_pct)
                .not_less_than_min(dec!(1))
                .not_greater_than_max(dec!(100));

            ctx.param(param::PRODUCT_ID, doc.long_named(param::PRODUCT_ID))
                .not_null()
                .integer_greater_than_zero();

            if doc.exists(param::EXTERNAL_ID) {
                ctx.param(param::EXTERNAL_ID, doc.string_named(param::EXTERNAL_ID))
                    .ignore_if_null()
                    .not_exceeding_length_of(100);
            }

            let loan_term_frequency = doc.long_named(param::LOAN_TERM_FREQUENCY);
            ctx.param(param::LOAN_TERM_FREQUENCY, loan_term_frequency)
                .not_null()
                .integer_greater_than_zero();

            let loan_term_frequency_type = doc.long_named(param::LOAN_TERM_FREQUENCY_TYPE);
            ctx.param(param::LOAN_TERM_FREQUENCY_TYPE, loan_term_frequency_type)
                .not_null()
                .in_min_max_range(0, 3);

            let number_of_repayments = doc.long_named(param::NUMBER_OF_REPAYMENTS);
            ctx.param(param::NUMBER_OF_REPAYMENTS, number_of_repayments)
                .not_null()
                .integer_greater_than_zero();
            repayments_bounds_rule(ctx, number_of_repayments, &constraints);

            let repayment_every = doc.long_named(param::REPAYMENT_EVERY);
            ctx.param(param::REPAYMENT_EVERY, repayment_every)
                .not_null()
                .integer_greater_than_zero();

            let repayment_frequency_type = doc.long_named(param::REPAYMENT_FREQUENCY_TYPE);
            ctx.param(param::REPAYMENT_FREQUENCY_TYPE, repayment_frequency_type)
                .not_null()
                .in_min_max_range(0, 3);

            loan_term_consistency_rule(
                ctx,
                loan_term_frequency,
                loan_term_frequency_type,
                number_of_repayments,
                repayment_every,
                repayment_frequency_type,
            );

            let interest_type = doc.long_named(param::INTEREST_TYPE);
            ctx.param(param::INTEREST_TYPE, interest_type).not_null().in_min_max_range(0, 1);

            let interest_calculation_period_type =
                doc.long_named(param::INTEREST_CALCULATION_PERIOD_TYPE);
            ctx.param(param::INTEREST_CALCULATION_PERIOD_TYPE, interest_calculation_period_type)
                .not_null()
                .in_min_max_range(0, 1);

            floating_rate_rules(ctx, doc, &constraints, equal_amortization, interest_type, None)?;

            let amortization_type = doc.long_named(param::AMORTIZATION_TYPE);
            ctx.param(param::AMORTIZATION_TYPE, amortization_type).not_null().in_min_max_range(0, 1);
            amortization_vs_fixed_principal_rule(ctx, amortization_type, fixed_principal_pct);

            let expected_disbursement_date = doc.date_named(param::EXPECTED_DISBURSEMENT_DATE);
            ctx.param(param::EXPECTED_DISBURSEMENT_DATE, expected_disbursement_date).not_null();

            grace_rules(ctx, doc);

            let submitted_on_date = doc.date_named(param::SUBMITTED_ON_DATE);
            ctx.param(param::SUBMITTED_ON_DATE, submitted_on_date).not_null();

            if doc.exists(param::SUBMITTED_ON_NOTE) {
                ctx.param(param::SUBMITTED_ON_NOTE, doc.string_named(param::SUBMITTED_ON_NOTE))
                    .ignore_if_null()
                    .not_exceeding_length_of(500);
            }

            let strategy = doc.string_named(param::TRANSACTION_PROCESSING_STRATEGY);
            transaction_processing_strategy_rules(ctx, strategy.as_deref(), &constraints)?;

            self.linked_savings_rules(ctx, doc, client_id)?;
            charges_rules(ctx, doc);
            if loan_type.is_some_and(LoanType::is_individual) {
                collateral_rules(ctx, doc);
            }

            fixed_emi_rules(ctx, doc, product, equal_amortization)?;

            ctx.param(param::MAX_OUTSTANDING_BALANCE, doc.decimal_named(param::MAX_OUTSTANDING_BALANCE))
                .ignore_if_null()
                .positive_amount();

            let principal = doc.decimal_named(param::PRINCIPAL);
            principal_rules(ctx, principal, &constraints);

            self.topup_rules(
                ctx,
                doc,
                product,
                client_id,
                principal,
                submitted_on_date,
                expected_disbursement_date,
            )?;

            let tranches = disbursement::tranches_from_document(doc);
            disbursement::validate_disbursement_details(&constraints, tranches.len())?;
            disbursement::validate_tranches(
                ctx,
                &tranches,
                expected_disbursement_date,
                principal,
                interest_type,
                equal_amortization,
            )?;

            schedule_processing_rules(
                ctx,
                doc,
                product.schedule_processing_type,
                strategy.as_deref(),
            );
            partial_period_rules(
                ctx,
                doc,
                interest_calculation_period_type
                    .and_then(InterestCalculationPeriod::from_code),
                &constraints,
            );

            self.submitted_on_date_rules(
                submitted_on_date,
                expected_disbursement_date,
                product,
                client.as_ref(),
                group.as_ref(),
            )?;
            self.disbursement_day_rules(expected_disbursement_date)?;
            Ok(())
        })
    }

    /// Validates a modification of a pending application. Absent fields keep
    /// their persisted values, which are substituted into every consistency
    /// check.
    pub fn validate_for_modify(
        &self,
        doc: &dyn Document,
        product: &LoanProduct,
        loan: &Loan,
    ) -> Result<(), LoanValidationError> {
        debug!(loan_id = loan.id, "validating loan application for modify");
        ensure_supported_parameters(doc, api::CREATE_AND_MODIFY_PARAMETERS)
            .map_err(LoanValidationError::Domain)?;

        if !loan.is_submitted_and_pending_approval() {
            return Err(LoanValidationError::Domain(
                DomainRuleError::NotInSubmittedAndPendingApprovalState(loan.id),
            ));
        }

        // the application may move to another product mid-flight
        let requested_product_id = doc.long_named(param::PRODUCT_ID);
        let swapped_product;
        let product = match requested_product_id {
            Some(id) if id != product.id => {
                swapped_product = self
                    .products
                    .find_product(id)
                    .ok_or(DomainRuleError::ProductNotFound(id))
                    .map_err(LoanValidationError::Domain)?;
                &swapped_product
            }
            _ => product,
        };
        let constraints = ProductConstraints::resolve(product);

        let client_id = doc.long_named(param::CLIENT_ID).or(loan.client_id);
        let group_id = doc.long_named(param::GROUP_ID).or(loan.group_id);
        let client = self.resolve_client(client_id).map_err(LoanValidationError::Domain)?;
        let group = self.resolve_group(group_id).map_err(LoanValidationError::Domain)?;

        validate_or_throw("loan", |ctx| {
            let updated = doc.parameter_names().iter().any(|name| {
                !matches!(name.as_str(), "locale" | "dateFormat" | "id")
            });
            if !updated {
                ctx.fail_with_code(
                    param::ID,
                    "no.parameters.for.update",
                    "No parameters were passed for the update.",
                    vec![],
                );
            }

            if doc.exists(param::CLIENT_ID) {
                ctx.param(param::CLIENT_ID, doc.long_named(param::CLIENT_ID))
                    .not_null()
                    .integer_greater_than_zero();
            }
            if doc.exists(param::GROUP_ID) {
                ctx.param(param::GROUP_ID, doc.long_named(param::GROUP_ID))
                    .not_null()
                    .integer_greater_than_zero();
            }
            if doc.exists(param::PRODUCT_ID) {
                ctx.param(param::PRODUCT_ID, requested_product_id)
                    .not_null()
                    .integer_greater_than_zero();
            }
            if doc.exists(param::EXTERNAL_ID) {
                ctx.param(param::EXTERNAL_ID, doc.string_named(param::EXTERNAL_ID))
                    .ignore_if_null()
                    .not_exceeding_length_of(100);
            }

            let mut equal_amortization = loan.equal_amortization;
            if doc.exists(param::IS_EQUAL_AMORTIZATION) {
                let value = doc.bool_named(param::IS_EQUAL_AMORTIZATION);
                ctx.param(param::IS_EQUAL_AMORTIZATION, value).true_or_false_required();
                equal_amortization = value.unwrap_or(false);
            }
            if equal_amortization && constraints.is_interest_recalculation_enabled() {
                return Err(DomainRuleError::EqualAmortizationUnsupported {
                    feature: "interest recalculation",
                });
            }

            let fixed_principal_pct =
                doc.decimal_named(param::FIXED_PRINCIPAL_PERCENTAGE_PER_INSTALLMENT);
            ctx.param(param::FIXED_PRINCIPAL_PERCENTAGE_PER_INSTALLMENT, fixed_principal_pct)
                .not_less_than_min(dec!(1))
                .not_greater_than_max(dec!(100));

            let principal = doc.decimal_named(param::PRINCIPAL);
            if doc.exists(param::PRINCIPAL) {
                principal_rules(ctx, principal, &constraints);
            }
            let effective_principal = principal.unwrap_or(loan.proposed_principal);

            let loan_term_frequency = doc.long_named(param::LOAN_TERM_FREQUENCY);
            if doc.exists(param::LOAN_TERM_FREQUENCY) {
                ctx.param(param::LOAN_TERM_FREQUENCY, loan_term_frequency)
                    .not_null()
                    .integer_greater_than_zero();
            }
            let loan_term_frequency_type = doc.long_named(param::LOAN_TERM_FREQUENCY_TYPE);
            if doc.exists(param::LOAN_TERM_FREQUENCY_TYPE) {
                ctx.param(param::LOAN_TERM_FREQUENCY_TYPE, loan_term_frequency_type)
                    .not_null()
                    .in_min_max_range(0, 3);
            }
            let number_of_repayments = doc.long_named(param::NUMBER_OF_REPAYMENTS);
            if doc.exists(param::NUMBER_OF_REPAYMENTS) {
                ctx.param(param::NUMBER_OF_REPAYMENTS, number_of_repayments)
                    .not_null()
                    .integer_greater_than_zero();
                repayments_bounds_rule(ctx, number_of_repayments, &constraints);
            }
            let repayment_every = doc.long_named(param::REPAYMENT_EVERY);
            if doc.exists(param::REPAYMENT_EVERY) {
                ctx.param(param::REPAYMENT_EVERY, repayment_every)
                    .not_null()
                    .integer_greater_than_zero();
            }
            let repayment_frequency_type = doc.long_named(param::REPAYMENT_FREQUENCY_TYPE);
            if doc.exists(param::REPAYMENT_FREQUENCY_TYPE) {
                ctx.param(param::REPAYMENT_FREQUENCY_TYPE, repayment_frequency_type)
                    .not_null()
                    .in_min_max_range(0, 3);
            }

            // consistency is recomputed over the merged view of the request
            loan_term_consistency_rule(
                ctx,
                loan_term_frequency.or(Some(loan.term_frequency)),
                loan_term_frequency_type.or(Some(loan.term_frequency_type.code())),
                number_of_repayments.or(Some(loan.number_of_repayments)),
                repayment_every.or(Some(loan.repayment_every)),
                repayment_frequency_type.or(Some(loan.repayment_frequency_type.code())),
            );

            let interest_type = doc.long_named(param::INTEREST_TYPE);
            if doc.exists(param::INTEREST_TYPE) {
                ctx.param(param::INTEREST_TYPE, interest_type).not_null().in_min_max_range(0, 1);
            }
            let merged_interest_type = interest_type.or(Some(loan.interest_method.code()));

            floating_rate_rules(
                ctx,
                doc,
                &constraints,
                equal_amortization,
                merged_interest_type,
                Some(loan),
            )?;

            let interest_calculation_period_type =
                doc.long_named(param::INTEREST_CALCULATION_PERIOD_TYPE);
            if doc.exists(param::INTEREST_CALCULATION_PERIOD_TYPE) {
                ctx.param(
                    param::INTEREST_CALCULATION_PERIOD_TYPE,
                    interest_calculation_period_type,
                )
                .not_null()
                .in_min_max_range(0, 1);
            }

            let amortization_type = doc.long_named(param::AMORTIZATION_TYPE);
            if doc.exists(param::AMORTIZATION_TYPE) {
                ctx.param(param::AMORTIZATION_TYPE, amortization_type)
                    .not_null()
                    .in_min_max_range(0, 1);
            }
            amortization_vs_fixed_principal_rule(ctx, amortization_type, fixed_principal_pct);

            let expected_disbursement_date = doc.date_named(param::EXPECTED_DISBURSEMENT_DATE);
            if doc.exists(param::EXPECTED_DISBURSEMENT_DATE) {
                ctx.param(param::EXPECTED_DISBURSEMENT_DATE, expected_disbursement_date).not_null();
            }
            let effective_expected =
                expected_disbursement_date.unwrap_or(loan.expected_disbursement_date);

            grace_rules(ctx, doc);

            let submitted_on_date = doc.date_named(param::SUBMITTED_ON_DATE);
            if doc.exists(param::SUBMITTED_ON_DATE) {
                ctx.param(param::SUBMITTED_ON_DATE, submitted_on_date).not_null();
            }
            if doc.exists(param::SUBMITTED_ON_NOTE) {
                ctx.param(param::SUBMITTED_ON_NOTE, doc.string_named(param::SUBMITTED_ON_NOTE))
                    .ignore_if_null()
                    .not_exceeding_length_of(500);
            }

            let strategy = doc
                .string_named(param::TRANSACTION_PROCESSING_STRATEGY)
                .unwrap_or_else(|| loan.transaction_processing_strategy.clone());
            transaction_processing_strategy_rules(ctx, Some(strategy.as_str()), &constraints)?;

            self.linked_savings_rules(ctx, doc, client_id)?;
            charges_rules(ctx, doc);
            if loan.loan_type.is_individual() {
                collateral_rules(ctx, doc);
            }

            // disbursement synced to a meeting needs the meeting calendar
            let mut meeting_required = false;
            if doc.exists(param::SYNC_DISBURSEMENT_WITH_MEETING) {
                let sync = doc.bool_named(param::SYNC_DISBURSEMENT_WITH_MEETING);
                ctx.param(param::SYNC_DISBURSEMENT_WITH_MEETING, sync).true_or_false_required();
                meeting_required = sync.unwrap_or(false);
            }
            if meeting_required || doc.exists(param::CALENDAR_ID) {
                ctx.param(param::CALENDAR_ID, doc.long_named(param::CALENDAR_ID))
                    .not_null()
                    .integer_greater_than_zero();
            }

            fixed_emi_rules(ctx, doc, product, equal_amortization)?;

            ctx.param(param::MAX_OUTSTANDING_BALANCE, doc.decimal_named(param::MAX_OUTSTANDING_BALANCE))
                .ignore_if_null()
                .positive_amount();

            self.topup_rules(
                ctx,
                doc,
                product,
                client_id,
                Some(effective_principal),
                submitted_on_date.or(Some(loan.submitted_on_date)),
                Some(effective_expected),
            )?;

            let tranches = disbursement::tranches_from_document(doc);
            disbursement::validate_disbursement_details(&constraints, tranches.len())?;
            disbursement::validate_tranches(
                ctx,
                &tranches,
                Some(effective_expected),
                Some(effective_principal),
                merged_interest_type,
                equal_amortization,
            )?;

            schedule_processing_rules(
                ctx,
                doc,
                loan.schedule_processing_type,
                Some(strategy.as_str()),
            );
            partial_period_rules(
                ctx,
                doc,
                interest_calculation_period_type
                    .and_then(InterestCalculationPeriod::from_code)
                    .or(Some(loan.interest_calculation_period)),
                &constraints,
            );

            validate_client_or_group(client.as_ref(), group.as_ref())?;
            self.submitted_on_date_rules(
                submitted_on_date.or(Some(loan.submitted_on_date)),
                Some(effective_expected),
                product,
                client.as_ref(),
                group.as_ref(),
            )?;
            self.disbursement_day_rules(Some(effective_expected))?;
            Ok(())
        })
    }

    /// Validates the approval of a pending application, re-running the
    /// tranche walk against the approved principal for multi-disburse
    /// products.
    pub fn validate_approval(
        &self,
        doc: &dyn Document,
        loan: &Loan,
    ) -> Result<(), LoanValidationError> {
        debug!(loan_id = loan.id, "validating loan approval");
        ensure_supported_parameters(doc, api::APPROVAL_PARAMETERS)
            .map_err(LoanValidationError::Domain)?;

        let product = self
            .products
            .find_product(loan.product_id)
            .ok_or(DomainRuleError::ProductNotFound(loan.product_id))
            .map_err(LoanValidationError::Domain)?;

        validate_or_throw("loanapplication", |ctx| {
            let approved_amount = doc.decimal_named(param::APPROVED_LOAN_AMOUNT);
            ctx.param(param::APPROVED_LOAN_AMOUNT, approved_amount)
                .ignore_if_null()
                .positive_amount();

            ctx.param(param::NET_DISBURSAL_AMOUNT, doc.decimal_named(param::NET_DISBURSAL_AMOUNT))
                .ignore_if_null()
                .positive_amount();

            let approved_on_date = doc.date_named(param::APPROVED_ON_DATE);
            ctx.param(param::APPROVED_ON_DATE, approved_on_date).not_null();

            ctx.param(param::NOTE, doc.string_named(param::NOTE))
                .ignore_if_null()
                .not_exceeding_length_of(1000);

            if let Some(client_id) = loan.client_id {
                let client = self
                    .clients
                    .find_client(client_id)
                    .ok_or(DomainRuleError::ClientNotFound(client_id))?;
                if !client.active {
                    return Err(DomainRuleError::ClientNotActive(client_id));
                }
            }
            if let Some(group_id) = loan.group_id {
                let group = self
                    .groups
                    .find_group(group_id)
                    .ok_or(DomainRuleError::GroupNotFound(group_id))?;
                if !group.active {
                    return Err(DomainRuleError::GroupNotActive(group_id));
                }
            }

            if !loan.is_submitted_and_pending_approval() {
                return Err(DomainRuleError::NotInSubmittedAndPendingApprovalState(loan.id));
            }

            let expected_disbursement_date = doc
                .date_named(param::EXPECTED_DISBURSEMENT_DATE)
                .unwrap_or(loan.expected_disbursement_date);

            if let Some(approved_on) = approved_on_date {
                if approved_on < loan.submitted_on_date {
                    return Err(DomainRuleError::InvalidLoanStateTransition {
                        action: "approval",
                        postfix: "cannot.be.before.submittal.date",
                        message: format!(
                            "Loan approval date {approved_on} cannot be before its submittal date {}.",
                            loan.submitted_on_date
                        ),
                    });
                }
                if expected_disbursement_date < approved_on {
                    return Err(DomainRuleError::InvalidLoanStateTransition {
                        action: "expecteddisbursal",
                        postfix: "should.be.on.or.after.approval.date",
                        message: format!(
                            "The expected disbursement date {expected_disbursement_date} should be on or after the approval date {approved_on}.",
                        ),
                    });
                }
                if approved_on > self.config.business_date {
                    return Err(DomainRuleError::InvalidLoanStateTransition {
                        action: "approval",
                        postfix: "cannot.be.a.future.date",
                        message: format!(
                            "The date on which a loan is approved cannot be in the future: {approved_on}.",
                        ),
                    });
                }
            }

            if let Some(amount) = approved_amount {
                compare_approved_to_proposed(loan, &product, amount)?;
            }

            if product.multi_disburse {
                let tranches = disbursement::tranches_from_document(doc);
                if tranches.len() > product.max_tranche_count {
                    return Err(DomainRuleError::ExceedingTrancheCount {
                        maximum: product.max_tranche_count,
                        provided: tranches.len(),
                    });
                }
                disbursement::validate_tranches(
                    ctx,
                    &tranches,
                    Some(expected_disbursement_date),
                    Some(approved_amount.unwrap_or(loan.proposed_principal)),
                    None,
                    loan.equal_amortization,
                )?;
            }

            if loan.sync_disbursement_with_meeting
                && (loan.loan_type.is_group() || loan.loan_type.is_jlg())
            {
                if let Some(meeting) = self.calendars.meeting_for_loan(loan.id) {
                    ensure_on_meeting_date(expected_disbursement_date, &meeting)?;
                }
            }

            if loan.topup && loan.client_id.is_some() {
                self.topup_recheck(loan, expected_disbursement_date)?;
            }
            Ok(())
        })
    }

    /// Validates the rejection of a pending application.
    pub fn validate_rejection(&self, doc: &dyn Document) -> Result<(), LoanValidationError> {
        debug!("validating loan rejection");
        ensure_supported_parameters(doc, api::REJECTION_PARAMETERS)
            .map_err(LoanValidationError::Domain)?;
        validate_or_throw("loanapplication", |ctx| {
            ctx.param(param::REJECTED_ON_DATE, doc.date_named(param::REJECTED_ON_DATE)).not_null();
            ctx.param(param::NOTE, doc.string_named(param::NOTE))
                .ignore_if_null()
                .not_exceeding_length_of(1000);
            Ok(())
        })
    }

    /// Validates the withdrawal of a pending application by the applicant.
    pub fn validate_withdrawal(&self, doc: &dyn Document) -> Result<(), LoanValidationError> {
        debug!("validating loan withdrawal");
        ensure_supported_parameters(doc, api::WITHDRAWAL_PARAMETERS)
            .map_err(LoanValidationError::Domain)?;
        validate_or_throw("loanapplication", |ctx| {
            ctx.param(param::WITHDRAWN_ON_DATE, doc.date_named(param::WITHDRAWN_ON_DATE))
                .not_null();
            ctx.param(param::NOTE, doc.string_named(param::NOTE))
                .ignore_if_null()
                .not_exceeding_length_of(1000);
            Ok(())
        })
    }

    /// Validates the undo of an approval. No business-date rules apply.
    pub fn validate_undo(&self, doc: &dyn Document) -> Result<(), LoanValidationError> {
        debug!("validating loan approval undo");
        ensure_supported_parameters(doc, api::UNDO_PARAMETERS)
            .map_err(LoanValidationError::Domain)?;
        validate_or_throw("loanapplication.undo", |ctx| {
            ctx.param(param::NOTE, doc.string_named(param::NOTE))
                .ignore_if_null()
                .not_exceeding_length_of(1000);
            Ok(())
        })
    }

    /// Validates an actual disbursement against the approved loan.
    pub fn validate_disbursement(
        &self,
        doc: &dyn Document,
        loan: &Loan,
    ) -> Result<(), LoanValidationError> {
        debug!(loan_id = loan.id, "validating loan disbursement");
        ensure_supported_parameters(doc, api::DISBURSEMENT_PARAMETERS)
            .map_err(LoanValidationError::Domain)?;

        let product = self
            .products
            .find_product(loan.product_id)
            .ok_or(DomainRuleError::ProductNotFound(loan.product_id))
            .map_err(LoanValidationError::Domain)?;

        validate_or_throw("loan.disbursement", |ctx| {
            let actual_disbursement_date = doc.date_named(param::ACTUAL_DISBURSEMENT_DATE);
            ctx.param(param::ACTUAL_DISBURSEMENT_DATE, actual_disbursement_date).not_null();

            ctx.param(param::NOTE, doc.string_named(param::NOTE))
                .ignore_if_null()
                .not_exceeding_length_of(1000);

            if doc.exists(param::EXTERNAL_ID) {
                ctx.param(param::EXTERNAL_ID, doc.string_named(param::EXTERNAL_ID))
                    .ignore_if_null()
                    .not_exceeding_length_of(100);
            }

            let principal = doc.decimal_named(param::PRINCIPAL_DISBURSED);
            ctx.param(param::PRINCIPAL_DISBURSED, principal).ignore_if_null().positive_amount();

            ctx.param(param::NET_DISBURSAL_AMOUNT, doc.decimal_named(param::NET_DISBURSAL_AMOUNT))
                .ignore_if_null()
                .positive_amount();

            let emi = doc.decimal_named(param::FIXED_EMI_AMOUNT);
            match principal {
                Some(principal) => {
                    ctx.param(param::FIXED_EMI_AMOUNT, emi)
                        .ignore_if_null()
                        .positive_amount()
                        .not_greater_than_max(principal);
                }
                None => {
                    ctx.param(param::FIXED_EMI_AMOUNT, emi).ignore_if_null().positive_amount();
                }
            }

            let Some(actual) = actual_disbursement_date else { return Ok(()) };

            if let Some(approved_on) = loan.approved_on_date {
                if actual < approved_on {
                    return Err(DomainRuleError::InvalidLoanStateTransition {
                        action: "disbursal",
                        postfix: "cannot.be.before.approval.date",
                        message: format!(
                            "The disbursement date {actual} cannot be before the loan approval date {approved_on}.",
                        ),
                    });
                }
            }
            if actual < loan.submitted_on_date {
                return Err(DomainRuleError::InvalidLoanStateTransition {
                    action: "disbursal",
                    postfix: "cannot.be.before.submittal.date",
                    message: format!(
                        "The disbursement date {actual} cannot be before the loan submittal date {}.",
                        loan.submitted_on_date
                    ),
                });
            }
            if actual > self.config.business_date {
                return Err(DomainRuleError::InvalidLoanStateTransition {
                    action: "disbursal",
                    postfix: "cannot.be.a.future.date",
                    message: format!("The disbursement date {actual} cannot be in the future."),
                });
            }

            ensure_not_on_non_working_day(
                actual,
                &self.config.working_days,
                self.config.allow_transactions_on_non_working_day,
            )?;
            ensure_not_on_holiday(
                actual,
                &self.config.holidays,
                self.config.allow_transactions_on_holiday,
            )?;

            if loan.sync_disbursement_with_meeting {
                if let Some(meeting) = self.calendars.meeting_for_loan(loan.id) {
                    ensure_on_meeting_date(actual, &meeting)?;
                }
            }

            if product.sync_expected_with_disbursement_date
                && actual != loan.expected_disbursement_date
            {
                return Err(DomainRuleError::ApplicationDate {
                    code: "actual.disbursement.date.must.match.expected.disbursement.date",
                    message: format!(
                        "The disbursement date {actual} must match the expected disbursement date {}.",
                        loan.expected_disbursement_date
                    ),
                });
            }
            Ok(())
        })
    }

    fn resolve_client(&self, id: Option<i64>) -> Result<Option<Client>, DomainRuleError> {
        match id {
            None => Ok(None),
            Some(id) => self
                .clients
                .find_client(id)
                .map(Some)
                .ok_or(DomainRuleError::ClientNotFound(id)),
        }
    }

    fn resolve_group(&self, id: Option<i64>) -> Result<Option<Group>, DomainRuleError> {
        match id {
            None => Ok(None),
            Some(id) => self
                .groups
                .find_group(id)
                .map(Some)
                .ok_or(DomainRuleError::GroupNotFound(id)),
        }
    }

    fn loan_type_rules(
        &self,
        ctx: &mut ValidationContext,
        doc: &dyn Document,
        client_id: Option<i64>,
        group_id: Option<i64>,
    ) -> Result<Option<LoanType>, DomainRuleError> {
        let loan_type_name = doc.string_named(param::LOAN_TYPE);
        ctx.param(param::LOAN_TYPE, loan_type_name.clone()).not_null();

        let loan_type = loan_type_name.as_deref().and_then(LoanType::from_name);
        if let Some(name) = &loan_type_name {
            if loan_type.is_none() {
                ctx.fail_with_code(
                    param::LOAN_TYPE,
                    "is.not.one.of.expected.enumerations",
                    format!("The loan type `{name}` is not supported."),
                    vec![json!(name)],
                );
            }
        }

        match loan_type {
            Some(LoanType::Individual) => {
                ctx.param(param::CLIENT_ID, client_id).not_null().integer_greater_than_zero();
                ctx.param(param::GROUP_ID, group_id)
                    .must_be_blank_when_parameter_provided(param::CLIENT_ID, client_id.is_some());
            }
            Some(LoanType::Group) => {
                ctx.param(param::GROUP_ID, group_id).not_null().integer_greater_than_zero();
                ctx.param(param::CLIENT_ID, client_id)
                    .must_be_blank_when_parameter_provided(param::GROUP_ID, group_id.is_some());
            }
            Some(LoanType::Jlg) => {
                ctx.param(param::CLIENT_ID, client_id).not_null().integer_greater_than_zero();
                ctx.param(param::GROUP_ID, group_id).not_null().integer_greater_than_zero();

                if self.config.meeting_mandatory_for_jlg_loans {
                    let calendar_id = doc.long_named(param::CALENDAR_ID);
                    ctx.param(param::CALENDAR_ID, calendar_id)
                        .not_null()
                        .integer_greater_than_zero();
                    if let Some(calendar_id) = calendar_id {
                        self.calendars
                            .find_calendar(calendar_id)
                            .ok_or(DomainRuleError::CalendarNotFound(calendar_id))?;
                    }
                    if doc.bool_named(param::SYNC_DISBURSEMENT_WITH_MEETING).is_none() {
                        ctx.param(param::SYNC_DISBURSEMENT_WITH_MEETING, None::<bool>)
                            .true_or_false_required();
                    }
                }
            }
            None => {}
        }
        Ok(loan_type)
    }

    fn linked_savings_rules(
        &self,
        ctx: &mut ValidationContext,
        doc: &dyn Document,
        client_id: Option<i64>,
    ) -> Result<(), DomainRuleError> {
        let Some(link_account_id) = doc.long_named(param::LINK_ACCOUNT_ID) else {
            return Ok(());
        };
        ctx.param(param::LINK_ACCOUNT_ID, Some(link_account_id)).integer_greater_than_zero();

        let account = self
            .savings
            .find_account(link_account_id)
            .ok_or(DomainRuleError::SavingsAccountNotFound(link_account_id))?;
        if !account.active {
            ctx.fail_with_code(
                param::LINK_ACCOUNT_ID,
                "is.not.active",
                format!("Linked savings account {} is not in active state.", account.id),
                vec![json!(account.id)],
            );
        } else if client_id != Some(account.client_id) {
            ctx.fail_with_code(
                param::LINK_ACCOUNT_ID,
                "not.belongs.to.same.client",
                format!("Linked savings account {} does not belong to the same client.", account.id),
                vec![json!(account.id)],
            );
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn topup_rules(
        &self,
        ctx: &mut ValidationContext,
        doc: &dyn Document,
        product: &LoanProduct,
        client_id: Option<i64>,
        principal: Option<Decimal>,
        submitted_on_date: Option<NaiveDate>,
        expected_disbursement_date: Option<NaiveDate>,
    ) -> Result<(), DomainRuleError> {
        if !(product.can_use_for_topup && doc.exists(param::IS_TOPUP)) {
            return Ok(());
        }
        let is_topup = doc.bool_named(param::IS_TOPUP);
        ctx.param(param::IS_TOPUP, is_topup).true_or_false_required();
        if is_topup != Some(true) {
            return Ok(());
        }

        let loan_id_to_close = doc.long_named(param::LOAN_ID_TO_CLOSE);
        ctx.param(param::LOAN_ID_TO_CLOSE, loan_id_to_close)
            .not_null()
            .integer_greater_than_zero();

        let (Some(loan_id), Some(client_id)) = (loan_id_to_close, client_id) else {
            return Ok(());
        };
        let loan_to_close = self.loans.find_open_loan_for_client(loan_id, client_id).ok_or(
            DomainRuleError::DomainRule {
                code: "error.msg.loan.loanIdToClose.no.active.loan.associated.to.client.found",
                message: "loanIdToClose is invalid, no active loan associated with the given client was found.".to_string(),
            },
        )?;

        if loan_to_close.multi_disburse && !loan_to_close.interest_recalculation_enabled {
            return Err(DomainRuleError::DomainRule {
                code: "error.msg.loan.topup.on.multi.tranche.loan.without.interest.recalculation.not.supported",
                message: "Top-up on a loan with multi-tranche disbursal and without interest recalculation is not supported.".to_string(),
            });
        }
        if let (Some(submitted), Some(disbursal)) =
            (submitted_on_date, loan_to_close.actual_disbursement_date)
        {
            if submitted <= disbursal {
                return Err(DomainRuleError::DomainRule {
                    code: "error.msg.loan.submitted.date.should.be.after.topup.loan.disbursal.date",
                    message: format!(
                        "The submitted date {submitted} should be after the disbursal date {disbursal} of the loan to be closed.",
                    ),
                });
            }
        }
        if loan_to_close.currency_code != product.currency_code {
            return Err(DomainRuleError::DomainRule {
                code: "error.msg.loan.to.be.closed.has.different.currency",
                message: "loanIdToClose is invalid, the currency code is different.".to_string(),
            });
        }
        if let (Some(expected), Some(last_transaction)) =
            (expected_disbursement_date, loan_to_close.last_user_transaction_date)
        {
            if expected < last_transaction {
                return Err(DomainRuleError::DomainRule {
                    code: "error.msg.loan.disbursal.date.should.be.after.last.transaction.date.of.loan.to.be.closed",
                    message: format!(
                        "The disbursal date {expected} should be after the last transaction date {last_transaction} of the loan to be closed.",
                    ),
                });
            }
        }
        if let (Some(expected), Some(principal)) = (expected_disbursement_date, principal) {
            if let Some(outstanding) = self.loans.prepayment_amount(loan_id, expected) {
                if outstanding > principal {
                    return Err(DomainRuleError::DomainRule {
                        code: "error.msg.loan.amount.less.than.outstanding.of.loan.to.be.closed",
                        message: "The top-up loan amount should be greater than the outstanding amount of the loan to be closed.".to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Re-run of the top-up preconditions at approval time.
    fn topup_recheck(
        &self,
        loan: &Loan,
        expected_disbursement_date: NaiveDate,
    ) -> Result<(), DomainRuleError> {
        let (Some(loan_id_to_close), Some(client_id)) = (loan.loan_id_to_close, loan.client_id)
        else {
            return Ok(());
        };
        let loan_to_close = self
            .loans
            .find_open_loan_for_client(loan_id_to_close, client_id)
            .ok_or(DomainRuleError::DomainRule {
                code: "error.msg.loan.to.be.closed.with.topup.is.not.active",
                message: "The loan to be closed with this top-up is not active.".to_string(),
            })?;

        if let Some(last_transaction) = loan_to_close.last_user_transaction_date {
            if expected_disbursement_date < last_transaction {
                return Err(DomainRuleError::DomainRule {
                    code: "error.msg.loan.disbursal.date.should.be.after.last.transaction.date.of.loan.to.be.closed",
                    message: format!(
                        "The disbursal date {expected_disbursement_date} should be after the last transaction date {last_transaction} of the loan to be closed.",
                    ),
                });
            }
        }
        if let Some(outstanding) =
            self.loans.prepayment_amount(loan_id_to_close, expected_disbursement_date)
        {
            if outstanding > loan.effective_principal() {
                return Err(DomainRuleError::DomainRule {
                    code: "error.msg.loan.amount.less.than.outstanding.of.loan.to.be.closed",
                    message: "The top-up loan amount should be greater than the outstanding amount of the loan to be closed.".to_string(),
                });
            }
        }
        Ok(())
    }

    fn submitted_on_date_rules(
        &self,
        submitted_on_date: Option<NaiveDate>,
        expected_disbursement_date: Option<NaiveDate>,
        product: &LoanProduct,
        client: Option<&Client>,
        group: Option<&Group>,
    ) -> Result<(), DomainRuleError> {
        let Some(submitted) = submitted_on_date else { return Ok(()) };

        if let Some(start) = product.start_date {
            if submitted < start {
                return Err(DomainRuleError::ApplicationDate {
                    code: "submitted.on.date.cannot.be.before.the.loan.product.start.date",
                    message: format!(
                        "submittedOnDate {submitted} cannot be before the loan product start date {start}.",
                    ),
                });
            }
        }
        if let Some(close) = product.close_date {
            if submitted > close {
                return Err(DomainRuleError::ApplicationDate {
                    code: "submitted.on.date.cannot.be.after.the.loan.product.close.date",
                    message: format!(
                        "submittedOnDate {submitted} cannot be after the loan product close date {close}.",
                    ),
                });
            }
        }
        if submitted > self.config.business_date {
            return Err(DomainRuleError::InvalidLoanStateTransition {
                action: "submittal",
                postfix: "cannot.be.a.future.date",
                message: format!(
                    "The date on which a loan is submitted cannot be in the future: {submitted}.",
                ),
            });
        }
        if let Some(client) = client {
            if client.activated_after(submitted) {
                return Err(DomainRuleError::InvalidLoanStateTransition {
                    action: "submittal",
                    postfix: "cannot.be.before.client.activation.date",
                    message: "The date on which a loan is submitted cannot be earlier than the client's activation date.".to_string(),
                });
            }
            if let Some(joined) = client.office_joining_date {
                if submitted < joined {
                    return Err(DomainRuleError::InvalidLoanStateTransition {
                        action: "submittal",
                        postfix: "cannot.be.before.client.transfer.date",
                        message: "The date on which a loan is submitted cannot be earlier than the client's transfer date to this office.".to_string(),
                    });
                }
            }
        }
        if let Some(group) = group {
            if group.activated_after(submitted) {
                return Err(DomainRuleError::InvalidLoanStateTransition {
                    action: "submittal",
                    postfix: "cannot.be.before.group.activation.date",
                    message: "The date on which a loan is submitted cannot be earlier than the group's activation date.".to_string(),
                });
            }
        }
        if let Some(expected) = expected_disbursement_date {
            if submitted > expected {
                return Err(DomainRuleError::InvalidLoanStateTransition {
                    action: "submittal",
                    postfix: "cannot.be.after.expected.disbursement.date",
                    message: format!(
                        "The date on which a loan is submitted cannot be after its expected disbursement date {expected}.",
                    ),
                });
            }
        }
        Ok(())
    }

    fn disbursement_day_rules(&self, date: Option<NaiveDate>) -> Result<(), DomainRuleError> {
        let Some(date) = date else { return Ok(()) };
        ensure_not_on_non_working_day(
            date,
            &self.config.working_days,
            self.config.allow_transactions_on_non_working_day,
        )?;
        ensure_not_on_holiday(
            date,
            &self.config.holidays,
            self.config.allow_transactions_on_holiday,
        )
    }
}

fn validate_client_or_group(
    client: Option<&Client>,
    group: Option<&Group>,
) -> Result<(), DomainRuleError> {
    if let Some(client) = client {
        if !client.active {
            return Err(DomainRuleError::ClientNotActive(client.id));
        }
    }
    if let Some(group) = group {
        if !group.active {
            return Err(DomainRuleError::GroupNotActive(group.id));
        }
    }
    if let (Some(client), Some(group)) = (client, group) {
        if !group.has_member(client.id) {
            return Err(DomainRuleError::ClientNotInGroup {
                client_id: client.id,
                group_id: group.id,
            });
        }
    }
    Ok(())
}

/// Term arithmetic must reconcile exactly. Undershoot and overshoot carry
/// distinct codes on purpose; downstream clients branch on them.
fn loan_term_consistency_rule(
    ctx: &mut ValidationContext,
    loan_term_frequency: Option<i64>,
    loan_term_frequency_type: Option<i64>,
    number_of_repayments: Option<i64>,
    repayment_every: Option<i64>,
    repayment_frequency_type: Option<i64>,
) {
    if let (Some(term_type), Some(every_type)) = (loan_term_frequency_type, repayment_frequency_type)
    {
        if term_type != every_type {
            ctx.fail_with_code(
                param::LOAN_TERM_FREQUENCY_TYPE,
                "not.the.same.as.repaymentFrequencyType",
                "The loan term frequency type must match the repayment frequency type.",
                vec![json!(term_type), json!(every_type)],
            );
            return;
        }
    }
    if let (Some(term), Some(repayments), Some(every)) =
        (loan_term_frequency, number_of_repayments, repayment_every)
    {
        let suggested = every * repayments;
        if term < suggested {
            ctx.fail_with_code(
                param::LOAN_TERM_FREQUENCY,
                "lesser.than.suggested.loan.term",
                format!("The loan term {term} is lesser than the suggested loan term {suggested}."),
                vec![json!(term), json!(suggested)],
            );
        } else if term > suggested {
            ctx.fail_with_code(
                param::LOAN_TERM_FREQUENCY,
                "greater.than.suggested.loan.term",
                format!("The loan term {term} is greater than the suggested loan term {suggested}."),
                vec![json!(term), json!(suggested)],
            );
        }
    }
}

fn repayments_bounds_rule(
    ctx: &mut ValidationContext,
    number_of_repayments: Option<i64>,
    constraints: &ProductConstraints,
) {
    let Some(value) = number_of_repayments else { return };
    let (min, max) = constraints.repayments_bounds();
    if min.is_some_and(|min| value < min) || max.is_some_and(|max| value > max) {
        ctx.fail_with_code(
            param::NUMBER_OF_REPAYMENTS,
            "is.not.within.expected.range",
            "numberOfRepayments is outside the range configured on the loan product.",
            vec![json!(value), json!(min), json!(max)],
        );
    }
}

fn principal_rules(
    ctx: &mut ValidationContext,
    principal: Option<Decimal>,
    constraints: &ProductConstraints,
) {
    let (min, max) = constraints.principal_bounds();
    let mut chain = ctx.param(param::PRINCIPAL, principal).not_null().positive_amount();
    if let Some(min) = min {
        chain = chain.not_less_than_min(min);
    }
    if let Some(max) = max {
        chain = chain.not_greater_than_max(max);
    }
    drop(chain);
}

/// Parameter sets for floating and non-floating products are mutually
/// exclusive; which side applies is decided by the product linkage.
fn floating_rate_rules(
    ctx: &mut ValidationContext,
    doc: &dyn Document,
    constraints: &ProductConstraints,
    equal_amortization: bool,
    interest_type: Option<i64>,
    persisted: Option<&Loan>,
) -> Result<(), DomainRuleError> {
    if constraints.is_linked_to_floating_rate() {
        if equal_amortization {
            return Err(DomainRuleError::EqualAmortizationUnsupported {
                feature: "floating interest rate",
            });
        }
        if doc.exists(param::INTEREST_RATE_PER_PERIOD) {
            ctx.fail_with_code(
                param::INTEREST_RATE_PER_PERIOD,
                "not.supported.loanproduct.linked.to.floating.rate",
                "interestRatePerPeriod is not supported, the selected loan product is linked to a floating interest rate.",
                vec![],
            );
        }
        let is_floating = match doc.bool_named(param::IS_FLOATING_INTEREST_RATE) {
            Some(value) => Some(value),
            None if doc.exists(param::IS_FLOATING_INTEREST_RATE) => None,
            None => persisted.and_then(|loan| loan.floating_interest_rate),
        };
        match is_floating {
            Some(true) if !constraints.floating_calculation_allowed() => {
                ctx.fail_with_code(
                    param::IS_FLOATING_INTEREST_RATE,
                    "true.not.supported.for.selected.loanproduct",
                    "isFloatingInterestRate value of true is not supported for the selected loan product.",
                    vec![],
                );
            }
            Some(_) => {}
            None => {
                ctx.param(param::IS_FLOATING_INTEREST_RATE, None::<bool>).true_or_false_required();
            }
        }
        if interest_type == Some(InterestMethod::Flat.code()) {
            ctx.fail_with_code(
                param::INTEREST_TYPE,
                "should.be.0.for.selected.loan.product",
                "interestType must be declining balance, the selected loan product is linked to floating rates.",
                vec![],
            );
        }
        let differential = doc
            .decimal_named(param::INTEREST_RATE_DIFFERENTIAL)
            .or_else(|| persisted.and_then(|loan| loan.interest_rate_differential));
        match constraints.floating_rate_bounds() {
            Some((min, max)) => {
                ctx.param(param::INTEREST_RATE_DIFFERENTIAL, differential)
                    .not_null()
                    .zero_or_positive_amount()
                    .in_min_max_amount_range(min, max);
            }
            None => {
                ctx.param(param::INTEREST_RATE_DIFFERENTIAL, differential)
                    .not_null()
                    .zero_or_positive_amount();
            }
        }
    } else {
        if doc.exists(param::IS_FLOATING_INTEREST_RATE) {
            ctx.fail_with_code(
                param::IS_FLOATING_INTEREST_RATE,
                "not.supported.loanproduct.not.linked.to.floating.rate",
                "isFloatingInterestRate is not supported, the selected loan product is not linked to a floating interest rate.",
                vec![],
            );
        }
        if doc.exists(param::INTEREST_RATE_DIFFERENTIAL) {
            ctx.fail_with_code(
                param::INTEREST_RATE_DIFFERENTIAL,
                "not.supported.loanproduct.not.linked.to.floating.rate",
                "interestRateDifferential is not supported, the selected loan product is not linked to a floating interest rate.",
                vec![],
            );
        }
        let rate = doc
            .decimal_named(param::INTEREST_RATE_PER_PERIOD)
            .or_else(|| persisted.and_then(|loan| loan.interest_rate_per_period));
        ctx.param(param::INTEREST_RATE_PER_PERIOD, rate).not_null().zero_or_positive_amount();
    }
    Ok(())
}

fn amortization_vs_fixed_principal_rule(
    ctx: &mut ValidationContext,
    amortization_type: Option<i64>,
    fixed_principal_pct: Option<Decimal>,
) {
    let equal_principal = amortization_type.and_then(AmortizationMethod::from_code)
        == Some(AmortizationMethod::EqualPrincipal);
    if !equal_principal && fixed_principal_pct.is_some() {
        ctx.fail_with_code(
            param::FIXED_PRINCIPAL_PERCENTAGE_PER_INSTALLMENT,
            "not.supported.principal.fixing.not.allowed.with.equal.installments",
            "Principal fixing cannot be done with equal installment amortization.",
            vec![],
        );
    }
}

fn grace_rules(ctx: &mut ValidationContext, doc: &dyn Document) {
    for name in [
        param::GRACE_ON_PRINCIPAL_PAYMENT,
        param::GRACE_ON_INTEREST_PAYMENT,
        param::GRACE_ON_INTEREST_CHARGED,
    ] {
        ctx.param(name, doc.long_named(name)).ignore_if_null().zero_or_positive();
    }
}

/// The pairing between the schedule type and the processing strategy: a
/// progressive schedule demands advanced payment allocation, a cumulative
/// schedule rejects it.
fn transaction_processing_strategy_rules(
    ctx: &mut ValidationContext,
    strategy: Option<&str>,
    constraints: &ProductConstraints,
) -> Result<(), DomainRuleError> {
    ctx.param(param::TRANSACTION_PROCESSING_STRATEGY, strategy.map(str::to_string)).not_null();
    let Some(strategy) = strategy else { return Ok(()) };

    if strategy == ADVANCED_PAYMENT_ALLOCATION_STRATEGY
        && !constraints.uses_advanced_payment_allocation()
    {
        ctx.fail_with_code(
            param::TRANSACTION_PROCESSING_STRATEGY,
            "strategy.cannot.be.advanced.payment.allocation.if.not.configured",
            "The strategy cannot be advanced payment allocation when the loan product is not configured for it.",
            vec![],
        );
    } else if constraints.requires_advanced_payment_allocation()
        && strategy != ADVANCED_PAYMENT_ALLOCATION_STRATEGY
    {
        return Err(DomainRuleError::DomainRule {
            code: "error.msg.loan.repayment.strategy.can.not.be.different.than.advanced.payment.allocation",
            message: "The loan repayment strategy cannot be different than advanced payment allocation.".to_string(),
        });
    } else if constraints.forbids_advanced_payment_allocation()
        && strategy == ADVANCED_PAYMENT_ALLOCATION_STRATEGY
    {
        return Err(DomainRuleError::DomainRule {
            code: "error.msg.loan.repayment.strategy.can.not.be.equal.to.advanced.payment.allocation",
            message: "The loan repayment strategy cannot be equal to advanced payment allocation.".to_string(),
        });
    }
    Ok(())
}

fn schedule_processing_rules(
    ctx: &mut ValidationContext,
    doc: &dyn Document,
    default_type: ScheduleProcessingType,
    strategy: Option<&str>,
) {
    let mut processing = default_type;
    if doc.exists(param::LOAN_SCHEDULE_PROCESSING_TYPE) {
        let raw = doc.string_named(param::LOAN_SCHEDULE_PROCESSING_TYPE);
        match raw.as_deref().and_then(ScheduleProcessingType::from_name) {
            Some(parsed) => processing = parsed,
            None => ctx.fail_with_code(
                param::LOAN_SCHEDULE_PROCESSING_TYPE,
                "is.not.one.of.expected.enumerations",
                "loanScheduleProcessingType must be HORIZONTAL or VERTICAL.",
                vec![json!(raw)],
            ),
        }
    }
    if processing == ScheduleProcessingType::Vertical
        && strategy != Some(ADVANCED_PAYMENT_ALLOCATION_STRATEGY)
    {
        ctx.fail_with_code(
            param::LOAN_SCHEDULE_PROCESSING_TYPE,
            "supported.only.with.advanced.payment.allocation.strategy",
            "Vertical repayment schedule processing is only available with the advanced payment allocation strategy.",
            vec![],
        );
    }
}

fn partial_period_rules(
    ctx: &mut ValidationContext,
    doc: &dyn Document,
    interest_calculation_period: Option<InterestCalculationPeriod>,
    constraints: &ProductConstraints,
) {
    let Some(period) = interest_calculation_period else { return };
    let mut consider_partial_periods = constraints.supports_partial_period_interest(period);

    if doc.exists(param::ALLOW_PARTIAL_PERIOD_INTEREST_CALCULATION) {
        let enabled = doc.bool_named(param::ALLOW_PARTIAL_PERIOD_INTEREST_CALCULATION);
        ctx.param(param::ALLOW_PARTIAL_PERIOD_INTEREST_CALCULATION, enabled)
            .true_or_false_required();
        let wants_partial = enabled.unwrap_or(false);
        if period.is_daily() {
            if wants_partial {
                ctx.fail_with_code(
                    param::ALLOW_PARTIAL_PERIOD_INTEREST_CALCULATION,
                    "not.supported.for.daily.calculations",
                    "Partial period interest calculation is not supported with daily interest calculation.",
                    vec![],
                );
            }
        } else {
            consider_partial_periods = wants_partial;
        }
    }

    if !consider_partial_periods {
        let incompatible = [
            (constraints.is_interest_recalculation_enabled(), "isInterestRecalculationEnabled"),
            (constraints.is_multi_disburse(), "multiDisburseLoan"),
            (constraints.allows_variable_installments(), "allowVariableInstallments"),
            (constraints.is_linked_to_floating_rate(), "isLinkedToFloatingInterestRates"),
        ];
        for (enabled, parameter) in incompatible {
            if enabled {
                ctx.fail_with_code(
                    parameter,
                    "not.supported.for.selected.interest.calculation.type",
                    format!("`{parameter}` is not supported for the selected interest calculation type."),
                    vec![],
                );
            }
        }
    }
}

fn charges_rules(ctx: &mut ValidationContext, doc: &dyn Document) {
    if !doc.exists(param::CHARGES) {
        return;
    }
    if !doc.is_array(param::CHARGES) {
        ctx.fail_with_code(
            param::CHARGES,
            "expected.an.array",
            "The parameter `charges` must be an array.",
            vec![],
        );
        return;
    }
    let Some(entries) = doc.array_named(param::CHARGES) else { return };
    for (i, entry) in entries.iter().enumerate() {
        ctx.param(format!("{}[{i}].{}", param::CHARGES, param::CHARGE_ID), entry.long_named(param::CHARGE_ID))
            .not_null()
            .integer_greater_than_zero();
        ctx.param(format!("{}[{i}].{}", param::CHARGES, param::AMOUNT), entry.decimal_named(param::AMOUNT))
            .not_null()
            .positive_amount();
    }
}

fn collateral_rules(ctx: &mut ValidationContext, doc: &dyn Document) {
    if !doc.exists(param::COLLATERAL) {
        return;
    }
    if !doc.is_array(param::COLLATERAL) {
        ctx.fail_with_code(
            param::COLLATERAL,
            "expected.an.array",
            "The parameter `collateral` must be an array.",
            vec![],
        );
        return;
    }
    let Some(entries) = doc.array_named(param::COLLATERAL) else { return };
    for (i, entry) in entries.iter().enumerate() {
        ctx.param(
            format!("{}[{i}].{}", param::COLLATERAL, param::CLIENT_COLLATERAL_ID),
            entry.long_named(param::CLIENT_COLLATERAL_ID),
        )
        .not_null()
        .integer_greater_than_zero();
        ctx.param(
            format!("{}[{i}].{}", param::COLLATERAL, param::QUANTITY),
            entry.decimal_named(param::QUANTITY),
        )
        .not_null()
        .positive_amount();
    }
}

fn fixed_emi_rules(
    ctx: &mut ValidationContext,
    doc: &dyn Document,
    product: &LoanProduct,
    equal_amortization: bool,
) -> Result<(), DomainRuleError> {
    if !doc.exists(param::FIXED_EMI_AMOUNT) {
        return Ok(());
    }
    if !(product.can_define_installment_amount || product.multi_disburse) {
        return Err(DomainRuleError::UnsupportedParameters(vec![
            param::FIXED_EMI_AMOUNT.to_string(),
        ]));
    }
    if equal_amortization {
        return Err(DomainRuleError::EqualAmortizationUnsupported { feature: "fixed emi" });
    }
    ctx.param(param::FIXED_EMI_AMOUNT, doc.decimal_named(param::FIXED_EMI_AMOUNT))
        .ignore_if_null()
        .positive_amount();
    Ok(())
}

fn compare_approved_to_proposed(
    loan: &Loan,
    product: &LoanProduct,
    approved_amount: Decimal,
) -> Result<(), DomainRuleError> {
    if product.disallow_expected_disbursements && product.allow_approved_amount_over_applied {
        let max_approved = over_applied_max(loan, product);
        if approved_amount > max_approved {
            return Err(DomainRuleError::InvalidLoanStateTransition {
                action: "approval",
                postfix: "amount.can't.be.greater.than.maximum.applied.loan.amount.calculation",
                message: format!(
                    "The approved amount {approved_amount} cannot be greater than the maximum applied loan amount {max_approved}.",
                ),
            });
        }
    } else if approved_amount > loan.proposed_principal {
        return Err(DomainRuleError::InvalidLoanStateTransition {
            action: "approval",
            postfix: "amount.can't.be.greater.than.loan.amount.demanded",
            message: format!(
                "The approved amount {approved_amount} cannot be greater than the loan amount demanded {}.",
                loan.proposed_principal
            ),
        });
    }
    Ok(())
}

fn over_applied_max(loan: &Loan, product: &LoanProduct) -> Decimal {
    match product.over_applied_calculation_type {
        OverAppliedCalculation::Percentage => {
            let factor = Decimal::ONE + Decimal::from(product.over_applied_number) / dec!(100);
            loan.proposed_principal * factor
        }
        OverAppliedCalculation::Flat => {
            loan.proposed_principal + Decimal::from(product.over_applied_number)
        }
    }
}
