//! Field-error accumulator with the reset-then-chain check API.
//!
//! A [`ValidationContext`] is owned by exactly one validation call. Every
//! field is checked through [`ValidationContext::param`], which discards any
//! previous chain and returns a fresh [`FieldCheck`]; predicates on the chain
//! append structured errors in discovery order and never stop the outer
//! sequence. A failed null-check halts only its own chain, so later
//! predicates cannot cascade on a missing value.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::ValidationFailure;

/// One structured field failure. Identity is structural and creation order
/// is preserved, so two runs over the same input report identically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    #[serde(rename = "parameterPath")]
    pub parameter: String,
    pub code: String,
    pub message: String,
    pub args: Vec<Value>,
}

#[derive(Debug)]
pub struct ValidationContext {
    resource: String,
    errors: Vec<ValidationError>,
}

impl ValidationContext {
    pub fn new(resource: impl Into<String>) -> Self {
        Self { resource: resource.into(), errors: Vec::new() }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Starts a new field-scoped check chain, resetting any prior one.
    pub fn param<T>(&mut self, parameter: impl Into<String>, value: Option<T>) -> FieldCheck<'_, T> {
        FieldCheck { parameter: parameter.into(), value, halted: false, ctx: self }
    }

    /// Appends an error unconditionally; used by rules whose condition was
    /// computed beforehand.
    pub fn fail_with_code(
        &mut self,
        parameter: &str,
        suffix: &str,
        message: impl Into<String>,
        args: Vec<Value>,
    ) {
        let code = format!("validation.msg.{}.{}.{}", self.resource, parameter, suffix);
        self.errors.push(ValidationError {
            parameter: parameter.to_string(),
            code,
            message: message.into(),
            args,
        });
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Raises the aggregate if anything was collected, otherwise returns
    /// normally. Consumes the context; it is never reused across calls.
    pub fn into_result(self) -> Result<(), ValidationFailure> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure::new(self.errors))
        }
    }
}

/// A single field under scrutiny. Created by [`ValidationContext::param`]
/// and consumed predicate by predicate.
pub struct FieldCheck<'a, T> {
    ctx: &'a mut ValidationContext,
    parameter: String,
    value: Option<T>,
    halted: bool,
}

impl<'a, T> FieldCheck<'a, T> {
    fn fail(&mut self, suffix: &str, message: String, args: Vec<Value>) {
        let parameter = self.parameter.clone();
        self.ctx.fail_with_code(&parameter, suffix, message, args);
    }

    /// Runs `ok` against a present value, recording a failure when it
    /// returns false. Absent values are skipped; only `not_null` reports
    /// absence.
    fn ensure(
        mut self,
        ok: impl FnOnce(&T) -> bool,
        suffix: &str,
        message: impl FnOnce(&str) -> String,
        args: impl FnOnce(&T) -> Vec<Value>,
    ) -> Self {
        if self.halted {
            return self;
        }
        if let Some(value) = self.value.take() {
            if !ok(&value) {
                let msg = message(&self.parameter);
                let args = args(&value);
                self.fail(suffix, msg, args);
            }
            self.value = Some(value);
        }
        self
    }

    pub fn not_null(mut self) -> Self {
        if !self.halted && self.value.is_none() {
            let msg = format!("The parameter `{}` is mandatory.", self.parameter);
            self.fail("cannot.be.blank", msg, vec![]);
            self.halted = true;
        }
        self
    }

    /// Marks the rest of the chain as optional: nothing downstream fires
    /// when the value is absent.
    pub fn ignore_if_null(mut self) -> Self {
        if self.value.is_none() {
            self.halted = true;
        }
        self
    }

    /// The field must be absent whenever `other` was supplied.
    pub fn must_be_blank_when_parameter_provided(mut self, other: &str, other_provided: bool) -> Self {
        if !self.halted && other_provided && self.value.is_some() {
            let msg = format!(
                "The parameter `{}` cannot also be provided when `{other}` is populated.",
                self.parameter
            );
            let suffix = format!("cannot.also.be.provided.when.{other}.is.populated");
            self.fail(&suffix, msg, vec![]);
        }
        self
    }
}

impl FieldCheck<'_, i64> {
    pub fn integer_greater_than_zero(self) -> Self {
        self.ensure(
            |v| *v > 0,
            "not.greater.than.zero",
            |p| format!("The parameter `{p}` must be greater than 0."),
            |v| vec![json!(v)],
        )
    }

    pub fn in_min_max_range(self, min: i64, max: i64) -> Self {
        self.ensure(
            |v| (min..=max).contains(v),
            "is.not.within.expected.range",
            |p| format!("The parameter `{p}` must be between {min} and {max}."),
            |v| vec![json!(v), json!(min), json!(max)],
        )
    }

    pub fn zero_or_positive(self) -> Self {
        self.ensure(
            |v| *v >= 0,
            "not.zero.or.greater",
            |p| format!("The parameter `{p}` must be zero or greater."),
            |v| vec![json!(v)],
        )
    }

    pub fn is_one_of(self, values: &[i64]) -> Self {
        self.ensure(
            |v| values.contains(v),
            "is.not.one.of.expected.enumerations",
            |p| format!("The parameter `{p}` must be one of {values:?}."),
            |v| vec![json!(v)],
        )
    }
}

impl FieldCheck<'_, Decimal> {
    pub fn positive_amount(self) -> Self {
        self.ensure(
            |v| v.is_sign_positive() && !v.is_zero(),
            "not.greater.than.zero",
            |p| format!("The parameter `{p}` must be greater than 0."),
            |v| vec![json!(v)],
        )
    }

    pub fn zero_or_positive_amount(self) -> Self {
        self.ensure(
            |v| !v.is_sign_negative(),
            "not.zero.or.greater",
            |p| format!("The parameter `{p}` must be zero or greater."),
            |v| vec![json!(v)],
        )
    }

    pub fn in_min_max_amount_range(self, min: Decimal, max: Decimal) -> Self {
        self.ensure(
            |v| (min..=max).contains(v),
            "amount.is.not.within.min.max.range",
            |p| format!("The parameter `{p}` must be between {min} and {max}."),
            |v| vec![json!(v), json!(min), json!(max)],
        )
    }

    pub fn not_less_than_min(self, min: Decimal) -> Self {
        self.ensure(
            |v| *v >= min,
            "is.less.than.min",
            |p| format!("The parameter `{p}` must not be less than {min}."),
            |v| vec![json!(v), json!(min)],
        )
    }

    pub fn not_greater_than_max(self, max: Decimal) -> Self {
        self.ensure(
            |v| *v <= max,
            "is.greater.than.max",
            |p| format!("The parameter `{p}` must not be more than {max}."),
            |v| vec![json!(v), json!(max)],
        )
    }
}

impl FieldCheck<'_, String> {
    pub fn not_blank(mut self) -> Self {
        let blank = match &self.value {
            Some(v) => v.trim().is_empty(),
            None => true,
        };
        if !self.halted && blank {
            let msg = format!("The parameter `{}` is mandatory.", self.parameter);
            self.fail("cannot.be.blank", msg, vec![]);
            self.halted = true;
        }
        self
    }

    pub fn not_exceeding_length_of(self, max: usize) -> Self {
        self.ensure(
            |v| v.chars().count() <= max,
            "exceeds.max.length",
            |p| format!("The parameter `{p}` exceeds max length of {max}."),
            |v| vec![json!(max), json!(v)],
        )
    }
}

impl FieldCheck<'_, bool> {
    /// Used when the parameter was present in the document but did not parse
    /// as a boolean; the typed accessor then yields `None`.
    pub fn true_or_false_required(mut self) -> Self {
        if !self.halted && self.value.is_none() {
            let msg = format!("The parameter `{}` must be true or false.", self.parameter);
            self.fail("must.be.true.or.false", msg, vec![]);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn chain_continues_after_a_failed_predicate() {
        let mut ctx = ValidationContext::new("loan");
        ctx.param("principal", Some(dec!(-5)))
            .positive_amount()
            .in_min_max_amount_range(dec!(100), dec!(1000));

        let codes: Vec<_> = ctx.errors().iter().map(|e| e.code.clone()).collect();
        assert_eq!(
            codes,
            vec![
                "validation.msg.loan.principal.not.greater.than.zero",
                "validation.msg.loan.principal.amount.is.not.within.min.max.range",
            ]
        );
    }

    #[test]
    fn null_check_halts_only_its_own_chain() {
        let mut ctx = ValidationContext::new("loan");
        ctx.param("numberOfRepayments", None::<i64>)
            .not_null()
            .integer_greater_than_zero();
        ctx.param("repaymentEvery", Some(0i64)).not_null().integer_greater_than_zero();

        assert_eq!(ctx.errors().len(), 2);
        assert_eq!(ctx.errors()[0].parameter, "numberOfRepayments");
        assert_eq!(ctx.errors()[1].parameter, "repaymentEvery");
    }

    #[test]
    fn ignore_if_null_suppresses_downstream_checks() {
        let mut ctx = ValidationContext::new("loan");
        ctx.param("inArrearsTolerance", None::<Decimal>)
            .ignore_if_null()
            .zero_or_positive_amount();
        assert!(ctx.is_empty());
    }

    #[test]
    fn into_result_raises_ordered_aggregate() {
        let mut ctx = ValidationContext::new("loan");
        ctx.param("loanType", None::<String>).not_null();
        ctx.param("submittedOnNote", Some("x".repeat(501))).not_exceeding_length_of(500);

        let failure = ctx.into_result().unwrap_err();
        assert_eq!(failure.global_code, "validation.msg.validation.errors.exist");
        assert_eq!(failure.errors.len(), 2);
        assert_eq!(failure.errors[0].parameter, "loanType");
    }

    #[test]
    fn blank_when_other_provided_fires_only_when_both_present() {
        let mut ctx = ValidationContext::new("loan");
        ctx.param("groupId", Some(3i64)).must_be_blank_when_parameter_provided("clientId", true);
        ctx.param("groupId", Some(3i64)).must_be_blank_when_parameter_provided("clientId", false);
        ctx.param("groupId", None::<i64>).must_be_blank_when_parameter_provided("clientId", true);

        assert_eq!(ctx.errors().len(), 1);
        assert_eq!(
            ctx.errors()[0].code,
            "validation.msg.loan.groupId.cannot.also.be.provided.when.clientId.is.populated"
        );
    }
}
