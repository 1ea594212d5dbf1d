//! Client and group snapshots plus the read-only lookup ports

use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct Client {
    pub id: i64,
    pub active: bool,
    pub activation_date: Option<NaiveDate>,
    pub office_joining_date: Option<NaiveDate>,
}

impl Client {
    pub fn activated_after(&self, date: NaiveDate) -> bool {
        self.activation_date.is_some_and(|activated| activated > date)
    }
}

#[derive(Debug, Clone)]
pub struct Group {
    pub id: i64,
    pub active: bool,
    pub activation_date: Option<NaiveDate>,
    pub member_client_ids: Vec<i64>,
}

impl Group {
    pub fn activated_after(&self, date: NaiveDate) -> bool {
        self.activation_date.is_some_and(|activated| activated > date)
    }

    pub fn has_member(&self, client_id: i64) -> bool {
        self.member_client_ids.contains(&client_id)
    }
}

/// Savings account that a loan may link for standing instructions.
#[derive(Debug, Clone)]
pub struct SavingsAccount {
    pub id: i64,
    pub client_id: i64,
    pub active: bool,
}

pub trait ClientLookup {
    fn find_client(&self, id: i64) -> Option<Client>;
}

pub trait GroupLookup {
    fn find_group(&self, id: i64) -> Option<Group>;
}

pub trait SavingsLookup {
    fn find_account(&self, id: i64) -> Option<SavingsAccount>;
}
