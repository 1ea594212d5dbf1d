//! Shared fixture for the integration tests: in-memory port fakes, a known
//! business date and a request document that passes create validation
//! against the default product.
#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use loan_approval::calendar::{CalendarLookup, MeetingCalendar};
use loan_approval::document::JsonDocument;
use loan_approval::error::LoanValidationError;
use loan_approval::loan::{Loan, LoanLookup};
use loan_approval::party::{Client, ClientLookup, Group, GroupLookup, SavingsAccount, SavingsLookup};
use loan_approval::product::{LoanProduct, ProductLookup};
use loan_approval::validator::{LoanApplicationValidator, ValidatorConfig};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// The "today" every test runs against (a Friday).
pub fn business_date() -> NaiveDate {
    date(2024, 6, 14)
}

pub struct InMemoryClients(pub Vec<Client>);

impl ClientLookup for InMemoryClients {
    fn find_client(&self, id: i64) -> Option<Client> {
        self.0.iter().find(|c| c.id == id).cloned()
    }
}

pub struct InMemoryGroups(pub Vec<Group>);

impl GroupLookup for InMemoryGroups {
    fn find_group(&self, id: i64) -> Option<Group> {
        self.0.iter().find(|g| g.id == id).cloned()
    }
}

pub struct InMemorySavings(pub Vec<SavingsAccount>);

impl SavingsLookup for InMemorySavings {
    fn find_account(&self, id: i64) -> Option<SavingsAccount> {
        self.0.iter().find(|a| a.id == id).cloned()
    }
}

pub struct InMemoryProducts(pub Vec<LoanProduct>);

impl ProductLookup for InMemoryProducts {
    fn find_product(&self, id: i64) -> Option<LoanProduct> {
        self.0.iter().find(|p| p.id == id).cloned()
    }
}

#[derive(Default)]
pub struct InMemoryLoans {
    pub loans: Vec<Loan>,
    /// outstanding prepayment amount per loan id
    pub outstanding: Vec<(i64, Decimal)>,
}

impl LoanLookup for InMemoryLoans {
    fn find_open_loan_for_client(&self, loan_id: i64, client_id: i64) -> Option<Loan> {
        self.loans
            .iter()
            .find(|l| l.id == loan_id && l.client_id == Some(client_id))
            .cloned()
    }

    fn prepayment_amount(&self, loan_id: i64, _on_date: NaiveDate) -> Option<Decimal> {
        self.outstanding.iter().find(|(id, _)| *id == loan_id).map(|(_, amount)| *amount)
    }
}

#[derive(Default)]
pub struct InMemoryCalendars {
    pub by_id: Vec<(i64, MeetingCalendar)>,
    pub by_loan: Vec<(i64, MeetingCalendar)>,
}

impl CalendarLookup for InMemoryCalendars {
    fn find_calendar(&self, id: i64) -> Option<MeetingCalendar> {
        self.by_id.iter().find(|(i, _)| *i == id).map(|(_, c)| c.clone())
    }

    fn meeting_for_loan(&self, loan_id: i64) -> Option<MeetingCalendar> {
        self.by_loan.iter().find(|(i, _)| *i == loan_id).map(|(_, c)| c.clone())
    }
}

pub struct Fixture {
    pub config: ValidatorConfig,
    pub clients: InMemoryClients,
    pub groups: InMemoryGroups,
    pub loans: InMemoryLoans,
    pub savings: InMemorySavings,
    pub products: InMemoryProducts,
    pub calendars: InMemoryCalendars,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            config: ValidatorConfig::new(business_date()),
            clients: InMemoryClients(vec![Client {
                id: 1,
                active: true,
                activation_date: Some(date(2024, 1, 1)),
                office_joining_date: None,
            }]),
            groups: InMemoryGroups(vec![Group {
                id: 10,
                active: true,
                activation_date: Some(date(2024, 1, 1)),
                member_client_ids: vec![1],
            }]),
            loans: InMemoryLoans::default(),
            savings: InMemorySavings(vec![SavingsAccount { id: 5, client_id: 1, active: true }]),
            products: InMemoryProducts(vec![LoanProduct::default()]),
            calendars: InMemoryCalendars::default(),
        }
    }

    pub fn validator(&self) -> LoanApplicationValidator<'_> {
        LoanApplicationValidator::new(
            self.config.clone(),
            &self.clients,
            &self.groups,
            &self.loans,
            &self.savings,
            &self.products,
            &self.calendars,
        )
    }
}

/// A request that passes create validation against `LoanProduct::default()`.
pub fn valid_create_request() -> Value {
    json!({
        "loanType": "individual",
        "clientId": 1,
        "productId": 1,
        "principal": 5000,
        "loanTermFrequency": 12,
        "loanTermFrequencyType": 2,
        "numberOfRepayments": 12,
        "repaymentEvery": 1,
        "repaymentFrequencyType": 2,
        "interestType": 0,
        "interestCalculationPeriodType": 1,
        "interestRatePerPeriod": 12.5,
        "amortizationType": 0,
        "expectedDisbursementDate": "2024-06-10",
        "submittedOnDate": "2024-06-10",
        "transactionProcessingStrategyCode": "mifos-standard-strategy"
    })
}

pub fn doc(value: Value) -> JsonDocument {
    JsonDocument::from_value(value).expect("test documents are JSON objects")
}

/// Error codes of an aggregated failure, in reported order.
pub fn aggregate_codes(err: &LoanValidationError) -> Vec<String> {
    err.as_failure()
        .map(|failure| failure.errors.iter().map(|e| e.code.clone()).collect())
        .unwrap_or_default()
}
