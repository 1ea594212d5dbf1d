//! Parameter names and per-context allow-lists for the loan application API

/// Parameter names accepted in request documents.
pub mod param {
    pub const LOCALE: &str = "locale";
    pub const DATE_FORMAT: &str = "dateFormat";
    pub const ID: &str = "id";
    pub const CLIENT_ID: &str = "clientId";
    pub const GROUP_ID: &str = "groupId";
    pub const LOAN_TYPE: &str = "loanType";
    pub const PRODUCT_ID: &str = "productId";
    pub const PRINCIPAL: &str = "principal";
    pub const LOAN_TERM_FREQUENCY: &str = "loanTermFrequency";
    pub const LOAN_TERM_FREQUENCY_TYPE: &str = "loanTermFrequencyType";
    pub const NUMBER_OF_REPAYMENTS: &str = "numberOfRepayments";
    pub const REPAYMENT_EVERY: &str = "repaymentEvery";
    pub const REPAYMENT_FREQUENCY_TYPE: &str = "repaymentFrequencyType";
    pub const INTEREST_TYPE: &str = "interestType";
    pub const INTEREST_RATE_PER_PERIOD: &str = "interestRatePerPeriod";
    pub const IS_FLOATING_INTEREST_RATE: &str = "isFloatingInterestRate";
    pub const INTEREST_RATE_DIFFERENTIAL: &str = "interestRateDifferential";
    pub const INTEREST_CALCULATION_PERIOD_TYPE: &str = "interestCalculationPeriodType";
    pub const ALLOW_PARTIAL_PERIOD_INTEREST_CALCULATION: &str = "allowPartialPeriodInterestCalcualtion";
    pub const AMORTIZATION_TYPE: &str = "amortizationType";
    pub const IS_EQUAL_AMORTIZATION: &str = "isEqualAmortization";
    pub const FIXED_PRINCIPAL_PERCENTAGE_PER_INSTALLMENT: &str = "fixedPrincipalPercentagePerInstallment";
    pub const EXPECTED_DISBURSEMENT_DATE: &str = "expectedDisbursementDate";
    pub const REPAYMENTS_STARTING_FROM_DATE: &str = "repaymentsStartingFromDate";
    pub const INTEREST_CHARGED_FROM_DATE: &str = "interestChargedFromDate";
    pub const GRACE_ON_PRINCIPAL_PAYMENT: &str = "graceOnPrincipalPayment";
    pub const GRACE_ON_INTEREST_PAYMENT: &str = "graceOnInterestPayment";
    pub const GRACE_ON_INTEREST_CHARGED: &str = "graceOnInterestCharged";
    pub const SUBMITTED_ON_DATE: &str = "submittedOnDate";
    pub const SUBMITTED_ON_NOTE: &str = "submittedOnNote";
    pub const EXTERNAL_ID: &str = "externalId";
    pub const TRANSACTION_PROCESSING_STRATEGY: &str = "transactionProcessingStrategyCode";
    pub const LOAN_SCHEDULE_PROCESSING_TYPE: &str = "loanScheduleProcessingType";
    pub const CALENDAR_ID: &str = "calendarId";
    pub const SYNC_DISBURSEMENT_WITH_MEETING: &str = "syncDisbursementWithMeeting";
    pub const LINK_ACCOUNT_ID: &str = "linkAccountId";
    pub const DISBURSEMENT_DATA: &str = "disbursementData";
    pub const FIXED_EMI_AMOUNT: &str = "fixedEmiAmount";
    pub const MAX_OUTSTANDING_BALANCE: &str = "maxOutstandingBalance";
    pub const CHARGES: &str = "charges";
    pub const CHARGE_ID: &str = "chargeId";
    pub const AMOUNT: &str = "amount";
    pub const COLLATERAL: &str = "collateral";
    pub const CLIENT_COLLATERAL_ID: &str = "clientCollateralId";
    pub const QUANTITY: &str = "quantity";
    pub const IS_TOPUP: &str = "isTopup";
    pub const LOAN_ID_TO_CLOSE: &str = "loanIdToClose";
    pub const APPROVED_LOAN_AMOUNT: &str = "approvedLoanAmount";
    pub const APPROVED_ON_DATE: &str = "approvedOnDate";
    pub const REJECTED_ON_DATE: &str = "rejectedOnDate";
    pub const WITHDRAWN_ON_DATE: &str = "withdrawnOnDate";
    pub const ACTUAL_DISBURSEMENT_DATE: &str = "actualDisbursementDate";
    pub const PRINCIPAL_DISBURSED: &str = "transactionAmount";
    pub const NET_DISBURSAL_AMOUNT: &str = "netDisbursalAmount";
    pub const NOTE: &str = "note";
}

/// Error-code suffixes raised by the multi-tranche disbursement walk.
pub const DISBURSEMENT_DATES_NOT_IN_ORDER: &str = "disbursement.dates.must.be.in.ascending.order";
pub const DISBURSEMENT_DATE_START_WITH_ERROR: &str = "first.disbursement.date.must.match.expected.disbursement.date";
pub const DISBURSEMENT_DATE_BEFORE_ERROR: &str = "disbursement.date.must.not.be.before.expected.disbursement.date";
pub const DISBURSEMENT_DATE_UNIQUE_ERROR: &str = "disbursement.date.must.be.unique";
pub const APPROVED_AMOUNT_IS_LESS_THAN_SUM_OF_TRANCHES: &str = "approved.amount.is.less.than.sum.of.tranches";

/// Parameters accepted when submitting or modifying a loan application.
pub const CREATE_AND_MODIFY_PARAMETERS: &[&str] = &[
    param::LOCALE,
    param::DATE_FORMAT,
    param::ID,
    param::CLIENT_ID,
    param::GROUP_ID,
    param::LOAN_TYPE,
    param::PRODUCT_ID,
    param::PRINCIPAL,
    param::LOAN_TERM_FREQUENCY,
    param::LOAN_TERM_FREQUENCY_TYPE,
    param::NUMBER_OF_REPAYMENTS,
    param::REPAYMENT_EVERY,
    param::REPAYMENT_FREQUENCY_TYPE,
    param::INTEREST_TYPE,
    param::INTEREST_RATE_PER_PERIOD,
    param::IS_FLOATING_INTEREST_RATE,
    param::INTEREST_RATE_DIFFERENTIAL,
    param::INTEREST_CALCULATION_PERIOD_TYPE,
    param::ALLOW_PARTIAL_PERIOD_INTEREST_CALCULATION,
    param::AMORTIZATION_TYPE,
    param::IS_EQUAL_AMORTIZATION,
    param::FIXED_PRINCIPAL_PERCENTAGE_PER_INSTALLMENT,
    param::EXPECTED_DISBURSEMENT_DATE,
    param::REPAYMENTS_STARTING_FROM_DATE,
    param::INTEREST_CHARGED_FROM_DATE,
    param::GRACE_ON_PRINCIPAL_PAYMENT,
    param::GRACE_ON_INTEREST_PAYMENT,
    param::GRACE_ON_INTEREST_CHARGED,
    param::SUBMITTED_ON_DATE,
    param::SUBMITTED_ON_NOTE,
    param::EXTERNAL_ID,
    param::TRANSACTION_PROCESSING_STRATEGY,
    param::LOAN_SCHEDULE_PROCESSING_TYPE,
    param::CALENDAR_ID,
    param::SYNC_DISBURSEMENT_WITH_MEETING,
    param::LINK_ACCOUNT_ID,
    param::DISBURSEMENT_DATA,
    param::FIXED_EMI_AMOUNT,
    param::MAX_OUTSTANDING_BALANCE,
    param::CHARGES,
    param::COLLATERAL,
    param::IS_TOPUP,
    param::LOAN_ID_TO_CLOSE,
];

pub const APPROVAL_PARAMETERS: &[&str] = &[
    param::LOCALE,
    param::DATE_FORMAT,
    param::APPROVED_LOAN_AMOUNT,
    param::APPROVED_ON_DATE,
    param::EXPECTED_DISBURSEMENT_DATE,
    param::NET_DISBURSAL_AMOUNT,
    param::DISBURSEMENT_DATA,
    param::NOTE,
];

pub const REJECTION_PARAMETERS: &[&str] = &[
    param::LOCALE,
    param::DATE_FORMAT,
    param::REJECTED_ON_DATE,
    param::NOTE,
];

pub const WITHDRAWAL_PARAMETERS: &[&str] = &[
    param::LOCALE,
    param::DATE_FORMAT,
    param::WITHDRAWN_ON_DATE,
    param::NOTE,
];

pub const UNDO_PARAMETERS: &[&str] = &[param::NOTE];

pub const DISBURSEMENT_PARAMETERS: &[&str] = &[
    param::LOCALE,
    param::DATE_FORMAT,
    param::ACTUAL_DISBURSEMENT_DATE,
    param::PRINCIPAL_DISBURSED,
    param::FIXED_EMI_AMOUNT,
    param::NET_DISBURSAL_AMOUNT,
    param::EXTERNAL_ID,
    param::NOTE,
];
