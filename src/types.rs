//! Closed enumerations shared across the lifecycle rule sets

/// Processing strategy code that pairs with progressive schedules.
pub const ADVANCED_PAYMENT_ALLOCATION_STRATEGY: &str = "advanced-payment-allocation-strategy";

/// Account type of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanType {
    Individual,
    Group,
    /// Joint-liability group loan, tied to a meeting calendar
    Jlg,
}

impl LoanType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "individual" => Some(Self::Individual),
            "group" => Some(Self::Group),
            "jlg" => Some(Self::Jlg),
            _ => None,
        }
    }

    pub fn is_individual(self) -> bool {
        matches!(self, Self::Individual)
    }

    pub fn is_group(self) -> bool {
        matches!(self, Self::Group)
    }

    pub fn is_jlg(self) -> bool {
        matches!(self, Self::Jlg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterestMethod {
    DecliningBalance,
    Flat,
}

impl InterestMethod {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::DecliningBalance),
            1 => Some(Self::Flat),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::DecliningBalance => 0,
            Self::Flat => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterestCalculationPeriod {
    Daily,
    SameAsRepaymentPeriod,
}

impl InterestCalculationPeriod {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Daily),
            1 => Some(Self::SameAsRepaymentPeriod),
            _ => None,
        }
    }

    pub fn is_daily(self) -> bool {
        matches!(self, Self::Daily)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmortizationMethod {
    EqualInstallments,
    EqualPrincipal,
}

impl AmortizationMethod {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::EqualInstallments),
            1 => Some(Self::EqualPrincipal),
            _ => None,
        }
    }
}

/// Unit for the loan term and for repayment spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodFrequency {
    Days,
    Weeks,
    Months,
    Years,
}

impl PeriodFrequency {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Days),
            1 => Some(Self::Weeks),
            2 => Some(Self::Months),
            3 => Some(Self::Years),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Days => 0,
            Self::Weeks => 1,
            Self::Months => 2,
            Self::Years => 3,
        }
    }
}

/// Repayment schedule family configured on the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanScheduleType {
    Cumulative,
    Progressive,
}

/// How installments are walked when a payment is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleProcessingType {
    Horizontal,
    Vertical,
}

impl ScheduleProcessingType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "HORIZONTAL" => Some(Self::Horizontal),
            "VERTICAL" => Some(Self::Vertical),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loan_type_parses_known_names() {
        assert_eq!(LoanType::from_name("individual"), Some(LoanType::Individual));
        assert_eq!(LoanType::from_name("jlg"), Some(LoanType::Jlg));
        assert_eq!(LoanType::from_name("syndicated"), None);
    }

    #[test]
    fn interest_method_round_trips_codes() {
        assert_eq!(InterestMethod::from_code(0), Some(InterestMethod::DecliningBalance));
        assert_eq!(InterestMethod::from_code(1), Some(InterestMethod::Flat));
        assert_eq!(InterestMethod::from_code(2), None);
        assert_eq!(InterestMethod::Flat.code(), 1);
    }

    #[test]
    fn period_frequency_rejects_out_of_range_codes() {
        assert_eq!(PeriodFrequency::from_code(3), Some(PeriodFrequency::Years));
        assert_eq!(PeriodFrequency::from_code(4), None);
    }
}
