use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;

use stockroom_fulfillment::SlipNumber;

use crate::error::{ServiceError, ServiceResult};
use crate::store::SlipStore;

/// Issues slip numbers `PS<YYYYMMDD><NNN>` for a date.
///
/// The last number handed out per date is kept in memory and compared with the
/// greatest stored number, so two concurrent creates never receive the same
/// number and a number freed by a cancel is not handed out again by this process.
#[derive(Debug, Default)]
pub struct DailySequence {
    issued: Mutex<HashMap<NaiveDate, SlipNumber>>,
}

impl DailySequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next<S>(&self, date: NaiveDate, slips: &S) -> ServiceResult<SlipNumber>
    where
        S: SlipStore + ?Sized,
    {
        let mut issued = self.issued.lock().unwrap_or_else(|e| e.into_inner());

        let stored = slips.last_number_with_prefix(&SlipNumber::date_prefix(date))?;
        let last = match (issued.get(&date), stored) {
            (Some(cached), Some(stored)) => Some(cached.clone().max(stored)),
            (Some(cached), None) => Some(cached.clone()),
            (None, stored) => stored,
        };

        let number = match last {
            Some(last) => last.next().map_err(ServiceError::from)?,
            None => SlipNumber::first_of(date),
        };

        // Only neighbouring days can still be issued; older entries are dead weight.
        issued.retain(|d, _| (*d - date).num_days().abs() <= 1);
        issued.insert(date, number.clone());
        Ok(number)
    }
}
