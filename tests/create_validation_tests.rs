//! Unit-style tests spanning the create rule set: structural rejection,
//! required fields, term arithmetic, floating-rate exclusivity, product
//! constraints and the fail-fast feature-incompatibility rules.
#![allow(unused_imports)]

mod common;

use common::{Fixture, aggregate_codes, date, doc, valid_create_request};
use loan_approval::api::param;
use loan_approval::document::JsonDocument;
use loan_approval::error::{DomainRuleError, LoanValidationError};
use loan_approval::product::{FloatingRateConfig, LoanProduct};
use loan_approval::types::{ADVANCED_PAYMENT_ALLOCATION_STRATEGY, LoanScheduleType};
use rust_decimal_macros::dec;
use serde_json::json;

mod structural_tests {
    use super::*;

    /// A blank body never reaches business rules.
    #[test]
    fn blank_body_is_rejected_before_any_rule() {
        assert!(matches!(JsonDocument::parse(""), Err(DomainRuleError::InvalidJson)));
    }

    /// Any parameter outside the allow-list aborts immediately, naming the
    /// offender.
    #[test]
    fn unknown_parameter_fails_fast() {
        let fixture = Fixture::new();
        let mut request = valid_create_request();
        request["smuggledField"] = json!(42);

        let err = fixture
            .validator()
            .validate_for_create(&doc(request), &fixture.products.0[0])
            .unwrap_err();
        match err.as_domain() {
            Some(DomainRuleError::UnsupportedParameters(names)) => {
                assert_eq!(names, &["smuggledField"]);
            }
            other => panic!("expected unsupported parameters, got {other:?}"),
        }
    }

    /// A fully valid request passes with no errors at all.
    #[test]
    fn valid_request_passes() {
        let fixture = Fixture::new();
        let result = fixture
            .validator()
            .validate_for_create(&doc(valid_create_request()), &fixture.products.0[0]);
        assert!(result.is_ok(), "unexpected failure: {result:?}");
    }
}

mod required_field_tests {
    use super::*;

    /// Missing required fields are all reported together, first found first.
    #[test]
    fn missing_fields_accumulate_in_order() {
        let fixture = Fixture::new();
        let request = json!({ "clientId": 1 });

        let err = fixture
            .validator()
            .validate_for_create(&doc(request), &fixture.products.0[0])
            .unwrap_err();
        let failure = err.as_failure().expect("accumulated failure expected");
        assert!(failure.errors.len() >= 8);
        assert_eq!(failure.errors[0].parameter, "loanType");
        assert_eq!(failure.errors[0].code, "validation.msg.loan.loanType.cannot.be.blank");
    }

    /// Two runs over identical input report byte-identical ordered lists.
    #[test]
    fn validation_is_idempotent() {
        let fixture = Fixture::new();
        let request = json!({
            "loanType": "individual",
            "principal": -1,
            "numberOfRepayments": 0
        });

        let first = fixture
            .validator()
            .validate_for_create(&doc(request.clone()), &fixture.products.0[0])
            .unwrap_err();
        let second = fixture
            .validator()
            .validate_for_create(&doc(request), &fixture.products.0[0])
            .unwrap_err();

        assert_eq!(
            first.as_failure().expect("aggregate").errors,
            second.as_failure().expect("aggregate").errors,
        );
    }

    /// An individual loan cannot name a group as well.
    #[test]
    fn individual_loan_rejects_group_id() {
        let fixture = Fixture::new();
        let mut request = valid_create_request();
        request["groupId"] = json!(10);

        let err = fixture
            .validator()
            .validate_for_create(&doc(request), &fixture.products.0[0])
            .unwrap_err();
        assert!(aggregate_codes(&err).iter().any(|c| {
            c == "validation.msg.loan.groupId.cannot.also.be.provided.when.clientId.is.populated"
        }));
    }
}

mod term_consistency_tests {
    use super::*;

    fn run_with_term(term: i64) -> Result<(), LoanValidationError> {
        let fixture = Fixture::new();
        let mut request = valid_create_request();
        request["loanTermFrequency"] = json!(term);
        fixture.validator().validate_for_create(&doc(request), &fixture.products.0[0])
    }

    /// `loanTermFrequency == repaymentEvery * numberOfRepayments` is clean.
    #[test]
    fn exact_term_contributes_no_error() {
        assert!(run_with_term(12).is_ok());
    }

    /// Undershoot carries its own code.
    #[test]
    fn lesser_term_reports_the_lesser_code() {
        let err = run_with_term(10).unwrap_err();
        let codes = aggregate_codes(&err);
        assert_eq!(
            codes,
            vec!["validation.msg.loan.loanTermFrequency.lesser.than.suggested.loan.term"]
        );
    }

    /// Overshoot carries the other code; the two are never collapsed.
    #[test]
    fn greater_term_reports_the_greater_code() {
        let err = run_with_term(14).unwrap_err();
        let codes = aggregate_codes(&err);
        assert_eq!(
            codes,
            vec!["validation.msg.loan.loanTermFrequency.greater.than.suggested.loan.term"]
        );
    }

    /// Mismatched frequency units are reported instead of the arithmetic.
    #[test]
    fn frequency_type_mismatch_is_reported() {
        let fixture = Fixture::new();
        let mut request = valid_create_request();
        request["loanTermFrequencyType"] = json!(1);

        let err = fixture
            .validator()
            .validate_for_create(&doc(request), &fixture.products.0[0])
            .unwrap_err();
        assert!(aggregate_codes(&err).iter().any(|c| {
            c == "validation.msg.loan.loanTermFrequencyType.not.the.same.as.repaymentFrequencyType"
        }));
    }
}

mod floating_rate_tests {
    use super::*;

    fn floating_product() -> LoanProduct {
        LoanProduct {
            floating_rates: Some(FloatingRateConfig {
                floating_calculation_allowed: true,
                min_differential_rate: dec!(0),
                max_differential_rate: dec!(5),
            }),
            ..Default::default()
        }
    }

    fn floating_request() -> serde_json::Value {
        let mut request = valid_create_request();
        let obj = request.as_object_mut().unwrap();
        obj.remove("interestRatePerPeriod");
        obj.insert("isFloatingInterestRate".into(), json!(true));
        obj.insert("interestRateDifferential".into(), json!(2.5));
        request
    }

    /// The floating parameter set is accepted when the product is linked.
    #[test]
    fn linked_product_accepts_floating_parameters() {
        let mut fixture = Fixture::new();
        fixture.products.0[0] = floating_product();
        let result = fixture
            .validator()
            .validate_for_create(&doc(floating_request()), &fixture.products.0[0]);
        assert!(result.is_ok(), "unexpected failure: {result:?}");
    }

    /// A fixed nominal rate is meaningless on a floating product.
    #[test]
    fn linked_product_rejects_fixed_rate_parameter() {
        let mut fixture = Fixture::new();
        fixture.products.0[0] = floating_product();
        let mut request = floating_request();
        request["interestRatePerPeriod"] = json!(10);

        let err = fixture
            .validator()
            .validate_for_create(&doc(request), &fixture.products.0[0])
            .unwrap_err();
        assert!(aggregate_codes(&err).iter().any(|c| {
            c == "validation.msg.loan.interestRatePerPeriod.not.supported.loanproduct.linked.to.floating.rate"
        }));
    }

    /// The floating flag is required once the product is linked.
    #[test]
    fn linked_product_requires_the_floating_flag() {
        let mut fixture = Fixture::new();
        fixture.products.0[0] = floating_product();
        let mut request = floating_request();
        request.as_object_mut().unwrap().remove("isFloatingInterestRate");

        let err = fixture
            .validator()
            .validate_for_create(&doc(request), &fixture.products.0[0])
            .unwrap_err();
        assert!(aggregate_codes(&err).iter().any(|c| {
            c == "validation.msg.loan.isFloatingInterestRate.must.be.true.or.false"
        }));
    }

    /// Flat interest cannot combine with floating linkage.
    #[test]
    fn linked_product_rejects_flat_interest() {
        let mut fixture = Fixture::new();
        fixture.products.0[0] = floating_product();
        let mut request = floating_request();
        request["interestType"] = json!(1);

        let err = fixture
            .validator()
            .validate_for_create(&doc(request), &fixture.products.0[0])
            .unwrap_err();
        assert!(aggregate_codes(&err).iter().any(|c| {
            c == "validation.msg.loan.interestType.should.be.0.for.selected.loan.product"
        }));
    }

    /// The differential must sit inside the product bounds.
    #[test]
    fn differential_outside_bounds_is_reported() {
        let mut fixture = Fixture::new();
        fixture.products.0[0] = floating_product();
        let mut request = floating_request();
        request["interestRateDifferential"] = json!(9.5);

        let err = fixture
            .validator()
            .validate_for_create(&doc(request), &fixture.products.0[0])
            .unwrap_err();
        assert!(aggregate_codes(&err).iter().any(|c| {
            c == "validation.msg.loan.interestRateDifferential.amount.is.not.within.min.max.range"
        }));
    }

    /// Floating parameters on an unlinked product are both rejected.
    #[test]
    fn unlinked_product_rejects_floating_parameters() {
        let fixture = Fixture::new();
        let mut request = valid_create_request();
        request["isFloatingInterestRate"] = json!(false);
        request["interestRateDifferential"] = json!(1);

        let err = fixture
            .validator()
            .validate_for_create(&doc(request), &fixture.products.0[0])
            .unwrap_err();
        let codes = aggregate_codes(&err);
        assert!(codes.iter().any(|c| {
            c == "validation.msg.loan.isFloatingInterestRate.not.supported.loanproduct.not.linked.to.floating.rate"
        }));
        assert!(codes.iter().any(|c| {
            c == "validation.msg.loan.interestRateDifferential.not.supported.loanproduct.not.linked.to.floating.rate"
        }));
    }
}

mod feature_incompatibility_tests {
    use super::*;

    /// Equal amortization with interest recalculation is contradictory; the
    /// engine aborts instead of accumulating.
    #[test]
    fn equal_amortization_with_recalculation_fails_fast() {
        let mut fixture = Fixture::new();
        fixture.products.0[0].interest_recalculation_enabled = true;
        let mut request = valid_create_request();
        request["isEqualAmortization"] = json!(true);

        let err = fixture
            .validator()
            .validate_for_create(&doc(request), &fixture.products.0[0])
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainRuleError::EqualAmortizationUnsupported { feature: "interest recalculation" })
        ));
    }

    /// Same for floating-rate linkage.
    #[test]
    fn equal_amortization_with_floating_rate_fails_fast() {
        let mut fixture = Fixture::new();
        fixture.products.0[0].floating_rates = Some(FloatingRateConfig {
            floating_calculation_allowed: true,
            min_differential_rate: dec!(0),
            max_differential_rate: dec!(5),
        });
        let mut request = valid_create_request();
        request["isEqualAmortization"] = json!(true);

        let err = fixture
            .validator()
            .validate_for_create(&doc(request), &fixture.products.0[0])
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainRuleError::EqualAmortizationUnsupported { feature: "floating interest rate" })
        ));
    }

    /// A fixed EMI is an unsupported parameter unless the product allows it.
    #[test]
    fn fixed_emi_unsupported_without_product_support() {
        let fixture = Fixture::new();
        let mut request = valid_create_request();
        request["fixedEmiAmount"] = json!(250);

        let err = fixture
            .validator()
            .validate_for_create(&doc(request), &fixture.products.0[0])
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainRuleError::UnsupportedParameters(_))
        ));
    }

    /// With installment amounts allowed, equal amortization still vetoes it.
    #[test]
    fn fixed_emi_with_equal_amortization_fails_fast() {
        let mut fixture = Fixture::new();
        fixture.products.0[0].can_define_installment_amount = true;
        let mut request = valid_create_request();
        request["fixedEmiAmount"] = json!(250);
        request["isEqualAmortization"] = json!(true);

        let err = fixture
            .validator()
            .validate_for_create(&doc(request), &fixture.products.0[0])
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainRuleError::EqualAmortizationUnsupported { feature: "fixed emi" })
        ));
    }
}

mod product_constraint_tests {
    use super::*;

    /// Principal outside the configured bounds is accumulated, not fatal.
    #[test]
    fn principal_bounds_come_from_the_product() {
        let mut fixture = Fixture::new();
        fixture.products.0[0].min_principal = Some(dec!(1000));
        fixture.products.0[0].max_principal = Some(dec!(4000));

        let err = fixture
            .validator()
            .validate_for_create(&doc(valid_create_request()), &fixture.products.0[0])
            .unwrap_err();
        assert_eq!(
            aggregate_codes(&err),
            vec!["validation.msg.loan.principal.is.greater.than.max"]
        );
    }

    /// So is a repayment count outside the product range.
    #[test]
    fn repayment_count_bounds_come_from_the_product() {
        let mut fixture = Fixture::new();
        fixture.products.0[0].min_number_of_repayments = Some(24);

        let err = fixture
            .validator()
            .validate_for_create(&doc(valid_create_request()), &fixture.products.0[0])
            .unwrap_err();
        assert!(aggregate_codes(&err).iter().any(|c| {
            c == "validation.msg.loan.numberOfRepayments.is.not.within.expected.range"
        }));
    }

    /// Progressive schedules insist on advanced payment allocation.
    #[test]
    fn progressive_schedule_demands_advanced_payment_allocation() {
        let mut fixture = Fixture::new();
        fixture.products.0[0].schedule_type = LoanScheduleType::Progressive;
        fixture.products.0[0].transaction_processing_strategy =
            ADVANCED_PAYMENT_ALLOCATION_STRATEGY.to_string();

        let err = fixture
            .validator()
            .validate_for_create(&doc(valid_create_request()), &fixture.products.0[0])
            .unwrap_err();
        match err.as_domain() {
            Some(DomainRuleError::DomainRule { code, .. }) => assert_eq!(
                *code,
                "error.msg.loan.repayment.strategy.can.not.be.different.than.advanced.payment.allocation"
            ),
            other => panic!("expected fail-fast domain rule, got {other:?}"),
        }
    }

    /// Cumulative schedules reject advanced payment allocation.
    #[test]
    fn cumulative_schedule_rejects_advanced_payment_allocation() {
        let mut fixture = Fixture::new();
        fixture.products.0[0].transaction_processing_strategy =
            ADVANCED_PAYMENT_ALLOCATION_STRATEGY.to_string();
        let mut request = valid_create_request();
        request["transactionProcessingStrategyCode"] = json!(ADVANCED_PAYMENT_ALLOCATION_STRATEGY);

        let err = fixture
            .validator()
            .validate_for_create(&doc(request), &fixture.products.0[0])
            .unwrap_err();
        match err.as_domain() {
            Some(DomainRuleError::DomainRule { code, .. }) => assert_eq!(
                *code,
                "error.msg.loan.repayment.strategy.can.not.be.equal.to.advanced.payment.allocation"
            ),
            other => panic!("expected fail-fast domain rule, got {other:?}"),
        }
    }

    /// Requesting the strategy on a product not configured for it is an
    /// ordinary accumulated error.
    #[test]
    fn unconfigured_advanced_payment_allocation_accumulates() {
        let fixture = Fixture::new();
        let mut request = valid_create_request();
        request["transactionProcessingStrategyCode"] = json!(ADVANCED_PAYMENT_ALLOCATION_STRATEGY);

        let err = fixture
            .validator()
            .validate_for_create(&doc(request), &fixture.products.0[0])
            .unwrap_err();
        assert!(aggregate_codes(&err).iter().any(|c| {
            c == "validation.msg.loan.transactionProcessingStrategyCode.strategy.cannot.be.advanced.payment.allocation.if.not.configured"
        }));
    }
}

mod date_window_tests {
    use super::*;

    /// Submission dates in the future are illegal state transitions.
    #[test]
    fn future_submission_date_fails_fast() {
        let fixture = Fixture::new();
        let mut request = valid_create_request();
        request["submittedOnDate"] = json!("2024-07-01");
        request["expectedDisbursementDate"] = json!("2024-07-01");

        let err = fixture
            .validator()
            .validate_for_create(&doc(request), &fixture.products.0[0])
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainRuleError::InvalidLoanStateTransition {
                action: "submittal",
                postfix: "cannot.be.a.future.date",
                ..
            })
        ));
    }

    /// Submission after the expected disbursement date is illegal.
    #[test]
    fn submission_after_disbursement_fails_fast() {
        let fixture = Fixture::new();
        let mut request = valid_create_request();
        request["submittedOnDate"] = json!("2024-06-12");

        let err = fixture
            .validator()
            .validate_for_create(&doc(request), &fixture.products.0[0])
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainRuleError::InvalidLoanStateTransition {
                action: "submittal",
                postfix: "cannot.be.after.expected.disbursement.date",
                ..
            })
        ));
    }

    /// The product open/close window gates submission.
    #[test]
    fn submission_before_product_start_fails_fast() {
        let mut fixture = Fixture::new();
        fixture.products.0[0].start_date = Some(date(2024, 6, 12));

        let err = fixture
            .validator()
            .validate_for_create(&doc(valid_create_request()), &fixture.products.0[0])
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainRuleError::ApplicationDate {
                code: "submitted.on.date.cannot.be.before.the.loan.product.start.date",
                ..
            })
        ));
    }

    /// Disbursement on a configured holiday is rejected unless allowed.
    #[test]
    fn disbursement_on_holiday_fails_fast_unless_allowed() {
        use loan_approval::calendar::{Holiday, HolidaySchedule};

        let mut fixture = Fixture::new();
        fixture.config.holidays = HolidaySchedule::new(vec![Holiday {
            from_date: date(2024, 6, 10),
            to_date: date(2024, 6, 10),
        }]);

        let err = fixture
            .validator()
            .validate_for_create(&doc(valid_create_request()), &fixture.products.0[0])
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainRuleError::ApplicationDate { code: "disbursement.date.on.holiday", .. })
        ));

        fixture.config.allow_transactions_on_holiday = true;
        assert!(
            fixture
                .validator()
                .validate_for_create(&doc(valid_create_request()), &fixture.products.0[0])
                .is_ok()
        );
    }
}

mod party_state_tests {
    use super::*;

    /// Inactive clients cannot apply; this is a state precondition, not a
    /// field error.
    #[test]
    fn inactive_client_fails_fast() {
        let mut fixture = Fixture::new();
        fixture.clients.0[0].active = false;

        let err = fixture
            .validator()
            .validate_for_create(&doc(valid_create_request()), &fixture.products.0[0])
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainRuleError::ClientNotActive(1))));
    }

    /// Unknown clients surface as lookup misses.
    #[test]
    fn unknown_client_fails_fast() {
        let fixture = Fixture::new();
        let mut request = valid_create_request();
        request["clientId"] = json!(99);

        let err = fixture
            .validator()
            .validate_for_create(&doc(request), &fixture.products.0[0])
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainRuleError::ClientNotFound(99))));
    }

    /// A JLG application pairs the client with a group they belong to.
    #[test]
    fn jlg_client_outside_group_fails_fast() {
        let mut fixture = Fixture::new();
        fixture.groups.0[0].member_client_ids = vec![2];
        let mut request = valid_create_request();
        request["loanType"] = json!("jlg");
        request["groupId"] = json!(10);

        let err = fixture
            .validator()
            .validate_for_create(&doc(request), &fixture.products.0[0])
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainRuleError::ClientNotInGroup { client_id: 1, group_id: 10 })
        ));
    }

    /// When meetings are mandatory for JLG loans, the calendar id and sync
    /// flag become required fields.
    #[test]
    fn jlg_meeting_mandate_requires_calendar_fields() {
        let mut fixture = Fixture::new();
        fixture.config.meeting_mandatory_for_jlg_loans = true;
        let mut request = valid_create_request();
        request["loanType"] = json!("jlg");
        request["groupId"] = json!(10);

        let err = fixture
            .validator()
            .validate_for_create(&doc(request), &fixture.products.0[0])
            .unwrap_err();
        let codes = aggregate_codes(&err);
        assert!(codes.iter().any(|c| c == "validation.msg.loan.calendarId.cannot.be.blank"));
        assert!(codes.iter().any(|c| {
            c == "validation.msg.loan.syncDisbursementWithMeeting.must.be.true.or.false"
        }));
    }

    /// A linked savings account must belong to the applicant.
    #[test]
    fn linked_savings_of_other_client_is_reported() {
        let mut fixture = Fixture::new();
        fixture.savings.0[0].client_id = 2;
        let mut request = valid_create_request();
        request["linkAccountId"] = json!(5);

        let err = fixture
            .validator()
            .validate_for_create(&doc(request), &fixture.products.0[0])
            .unwrap_err();
        assert!(aggregate_codes(&err).iter().any(|c| {
            c == "validation.msg.loan.linkAccountId.not.belongs.to.same.client"
        }));
    }
}
