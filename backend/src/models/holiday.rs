use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::HolidayId;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Holiday {
    pub id: HolidayId,
    pub holiday_date: NaiveDate,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HolidayResponse {
    pub id: HolidayId,
    pub holiday_date: NaiveDate,
    pub name: String,
}

impl From<Holiday> for HolidayResponse {
    fn from(holiday: Holiday) -> Self {
        HolidayResponse {
            id: holiday.id,
            holiday_date: holiday.holiday_date,
            name: holiday.name,
        }
    }
}
