//! Multi-tranche disbursement schedule validation.
//!
//! The walk is order-sensitive and cumulative: dates must ascend without
//! duplicates, the first tranche must open on the overall expected
//! disbursement date, and the principal sum must stay within the total. The
//! whole pass is idempotent so approval can re-run it against the approved
//! principal.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;

use crate::api::{self, param};
use crate::context::ValidationContext;
use crate::document::Document;
use crate::error::DomainRuleError;
use crate::product::ProductConstraints;
use crate::types::InterestMethod;

/// One scheduled partial disbursement as submitted, before any checks ran.
#[derive(Debug, Clone, PartialEq)]
pub struct DisbursementTranche {
    pub expected_date: Option<NaiveDate>,
    pub principal: Option<Decimal>,
}

/// Reads the `disbursementData` array off the request document. Entries stay
/// in submission order; missing fields stay `None` for the walk to report.
pub fn tranches_from_document(doc: &dyn Document) -> Vec<DisbursementTranche> {
    doc.array_named(param::DISBURSEMENT_DATA)
        .map(|entries| {
            entries
                .iter()
                .map(|entry| DisbursementTranche {
                    expected_date: entry.date_named(param::EXPECTED_DISBURSEMENT_DATE),
                    principal: entry.decimal_named(param::PRINCIPAL),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Gate checks on the tranche list shape for multi-disburse products: the
/// list is required unless the product disallows expected disbursements, and
/// may never exceed the configured tranche count.
pub fn validate_disbursement_details(
    constraints: &ProductConstraints,
    tranche_count: usize,
) -> Result<(), DomainRuleError> {
    if !constraints.is_multi_disburse() {
        return Ok(());
    }
    if constraints.disallows_expected_disbursements() {
        if tranche_count > 0 {
            return Err(DomainRuleError::MultiDisbursementDataNotAllowed);
        }
    } else if tranche_count == 0 {
        return Err(DomainRuleError::MultiDisbursementDataRequired);
    }
    if tranche_count > constraints.max_tranche_count() {
        return Err(DomainRuleError::ExceedingTrancheCount {
            maximum: constraints.max_tranche_count(),
            provided: tranche_count,
        });
    }
    Ok(())
}

/// Validates the tranche schedule against the expected disbursement date and
/// the total (proposed or approved) principal, appending every violation to
/// the accumulator. Tranche disbursal combined with equal amortization is a
/// contradictory request and aborts instead.
pub fn validate_tranches(
    ctx: &mut ValidationContext,
    tranches: &[DisbursementTranche],
    expected_disbursement_date: Option<NaiveDate>,
    total_principal: Option<Decimal>,
    interest_type: Option<i64>,
    equal_amortization: bool,
) -> Result<(), DomainRuleError> {
    // any inversion counts, not just adjacent neighbours
    for (i, earlier) in tranches.iter().enumerate() {
        let Some(first_date) = earlier.expected_date else { continue };
        for later in &tranches[i + 1..] {
            if let Some(second_date) = later.expected_date {
                if first_date > second_date {
                    ctx.fail_with_code(
                        param::DISBURSEMENT_DATA,
                        api::DISBURSEMENT_DATES_NOT_IN_ORDER,
                        "Disbursement dates must be provided in ascending order.",
                        vec![json!(first_date), json!(second_date)],
                    );
                }
            }
        }
    }

    if tranches.is_empty() {
        return Ok(());
    }

    if equal_amortization {
        return Err(DomainRuleError::EqualAmortizationUnsupported { feature: "tranche disbursal" });
    }

    let (Some(expected), Some(total)) = (expected_disbursement_date, total_principal) else {
        return Ok(());
    };

    let mut seen_dates: Vec<NaiveDate> = Vec::new();
    let mut disbursed_total = Decimal::ZERO;
    for (i, tranche) in tranches.iter().enumerate() {
        ctx.param(
            format!("{}[{i}].{}", param::DISBURSEMENT_DATA, param::EXPECTED_DISBURSEMENT_DATE),
            tranche.expected_date,
        )
        .not_null();

        if let Some(date) = tranche.expected_date {
            if i == 0 && date != expected {
                ctx.fail_with_code(
                    param::EXPECTED_DISBURSEMENT_DATE,
                    api::DISBURSEMENT_DATE_START_WITH_ERROR,
                    "The first disbursement date must match the expected disbursement date.",
                    vec![json!(date), json!(expected)],
                );
            } else if i > 0 && date < expected {
                ctx.fail_with_code(
                    param::DISBURSEMENT_DATA,
                    api::DISBURSEMENT_DATE_BEFORE_ERROR,
                    "Disbursement dates cannot be before the expected disbursement date.",
                    vec![json!(date), json!(expected)],
                );
            }
            if seen_dates.contains(&date) {
                ctx.fail_with_code(
                    param::EXPECTED_DISBURSEMENT_DATE,
                    api::DISBURSEMENT_DATE_UNIQUE_ERROR,
                    "Disbursement dates must be unique.",
                    vec![json!(date)],
                );
            }
            seen_dates.push(date);
        }

        ctx.param(format!("{}[{i}].{}", param::DISBURSEMENT_DATA, param::PRINCIPAL), tranche.principal)
            .not_null();
        if let Some(principal) = tranche.principal {
            disbursed_total += principal;
        }
    }

    if disbursed_total > total {
        ctx.fail_with_code(
            param::PRINCIPAL,
            api::APPROVED_AMOUNT_IS_LESS_THAN_SUM_OF_TRANCHES,
            "The sum of tranche principals cannot exceed the loan principal.",
            vec![json!(disbursed_total), json!(total)],
        );
    }

    if let Some(code) = interest_type {
        if code != InterestMethod::DecliningBalance.code() {
            ctx.fail_with_code(
                param::INTEREST_TYPE,
                "must.be.declining.balance.for.tranche.disbursement",
                "Tranche disbursement requires the declining balance interest method.",
                vec![json!(code)],
            );
        }
    }

    Ok(())
}
