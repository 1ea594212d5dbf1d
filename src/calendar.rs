//! Working-day, holiday and meeting-calendar snapshots with the temporal
//! rules that gate disbursement dates.
//!
//! All snapshots are supplied by the caller; nothing is fetched here. The
//! predicates are pure, and the `ensure_*` rules raise typed date errors
//! which are always fail-fast, never accumulated.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::DomainRuleError;
use crate::types::PeriodFrequency;

/// Days of the week on which transactions may be booked.
#[derive(Debug, Clone)]
pub struct WorkingDays {
    days: Vec<Weekday>,
}

impl WorkingDays {
    pub fn new(days: Vec<Weekday>) -> Self {
        Self { days }
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        self.days.contains(&date.weekday())
    }
}

impl Default for WorkingDays {
    /// Every day is a working day until an office configures otherwise.
    fn default() -> Self {
        Self {
            days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun,
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Holiday {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

/// Active holidays of the office servicing the loan.
#[derive(Debug, Clone, Default)]
pub struct HolidaySchedule {
    holidays: Vec<Holiday>,
}

impl HolidaySchedule {
    pub fn new(holidays: Vec<Holiday>) -> Self {
        Self { holidays }
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays
            .iter()
            .any(|holiday| holiday.from_date <= date && date <= holiday.to_date)
    }
}

/// Recurring meeting schedule a JLG or group loan is synced to.
#[derive(Debug, Clone)]
pub struct MeetingCalendar {
    pub start_date: NaiveDate,
    pub frequency: PeriodFrequency,
    pub interval: u32,
}

impl MeetingCalendar {
    /// Whether the candidate date lands on a meeting occurrence.
    pub fn falls_on_meeting(&self, date: NaiveDate) -> bool {
        if date < self.start_date || self.interval == 0 {
            return false;
        }
        let elapsed_days = (date - self.start_date).num_days();
        match self.frequency {
            PeriodFrequency::Days => elapsed_days % i64::from(self.interval) == 0,
            PeriodFrequency::Weeks => elapsed_days % (7 * i64::from(self.interval)) == 0,
            PeriodFrequency::Months => {
                let months = i64::from(date.year() - self.start_date.year()) * 12
                    + i64::from(date.month()) - i64::from(self.start_date.month());
                date.day() == self.start_date.day() && months % i64::from(self.interval) == 0
            }
            PeriodFrequency::Years => {
                date.day() == self.start_date.day()
                    && date.month() == self.start_date.month()
                    && i64::from(date.year() - self.start_date.year()) % i64::from(self.interval)
                        == 0
            }
        }
    }
}

pub fn ensure_not_on_non_working_day(
    date: NaiveDate,
    working_days: &WorkingDays,
    transactions_allowed: bool,
) -> Result<(), DomainRuleError> {
    if !transactions_allowed && !working_days.is_working_day(date) {
        return Err(DomainRuleError::ApplicationDate {
            code: "disbursement.date.on.non.working.day",
            message: format!("Expected disbursement date {date} cannot be on a non working day."),
        });
    }
    Ok(())
}

pub fn ensure_not_on_holiday(
    date: NaiveDate,
    holidays: &HolidaySchedule,
    transactions_allowed: bool,
) -> Result<(), DomainRuleError> {
    if !transactions_allowed && holidays.is_holiday(date) {
        return Err(DomainRuleError::ApplicationDate {
            code: "disbursement.date.on.holiday",
            message: format!("Expected disbursement date {date} cannot be on a holiday."),
        });
    }
    Ok(())
}

pub fn ensure_on_meeting_date(
    date: NaiveDate,
    calendar: &MeetingCalendar,
) -> Result<(), DomainRuleError> {
    if !calendar.falls_on_meeting(date) {
        return Err(DomainRuleError::ApplicationDate {
            code: "disbursement.date.do.not.match.meeting.date",
            message: format!("Expected disbursement date {date} does not fall on a meeting date."),
        });
    }
    Ok(())
}

/// Read-only port resolving meeting calendars.
pub trait CalendarLookup {
    fn find_calendar(&self, id: i64) -> Option<MeetingCalendar>;

    /// The meeting calendar attached to a persisted loan, if any.
    fn meeting_for_loan(&self, loan_id: i64) -> Option<MeetingCalendar>;
}
