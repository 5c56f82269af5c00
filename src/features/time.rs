use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::Serialize;

/// Night covers [20:00, 06:00)
const NIGHT_STARTS_AT: u32 = 20;
const DAY_STARTS_AT: u32 = 6;

/// Features derived from the pickup timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeFeatures {
    pub hour: u32,
    pub is_night: u8,
    pub is_day: u8,
    pub weekday: Weekday,
    pub days: DayFlags,
}

impl TimeFeatures {
    pub fn from_datetime(pickup_at: NaiveDateTime) -> Self {
        let hour = pickup_at.hour();
        let is_night = is_night_hour(hour);
        let weekday = pickup_at.weekday();

        Self {
            hour,
            is_night: u8::from(is_night),
            is_day: u8::from(!is_night),
            weekday,
            days: DayFlags::one_hot(weekday),
        }
    }
}

pub fn is_night_hour(hour: u32) -> bool {
    !(DAY_STARTS_AT..NIGHT_STARTS_AT).contains(&hour)
}

/// One-hot day of week. Fields are in the model's column order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayFlags {
    #[serde(rename = "day_Friday")]
    pub friday: u8,
    #[serde(rename = "day_Monday")]
    pub monday: u8,
    #[serde(rename = "day_Saturday")]
    pub saturday: u8,
    #[serde(rename = "day_Sunday")]
    pub sunday: u8,
    #[serde(rename = "day_Thursday")]
    pub thursday: u8,
    #[serde(rename = "day_Tuesday")]
    pub tuesday: u8,
    #[serde(rename = "day_Wednesday")]
    pub wednesday: u8,
}

impl DayFlags {
    pub fn one_hot(weekday: Weekday) -> Self {
        let mut flags = Self::default();
        *flags.flag_mut(weekday) = 1;
        flags
    }

    pub fn flag(&self, weekday: Weekday) -> u8 {
        match weekday {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }

    pub fn flag_mut(&mut self, weekday: Weekday) -> &mut u8 {
        match weekday {
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
            Weekday::Sun => &mut self.sunday,
        }
    }

    /// Values in column order
    pub fn to_array(&self) -> [u8; 7] {
        [
            self.friday,
            self.monday,
            self.saturday,
            self.sunday,
            self.thursday,
            self.tuesday,
            self.wednesday,
        ]
    }

    pub fn active_count(&self) -> usize {
        self.to_array().iter().filter(|&&f| f == 1).count()
    }
}
