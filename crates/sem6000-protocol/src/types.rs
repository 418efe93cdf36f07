//! Common types used in the protocol.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{ProtocolError, ProtocolResult};

/// Day of the week as numbered by the plug (Sunday = 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    /// Sunday (0).
    Sunday = 0,
    /// Monday (1).
    Monday = 1,
    /// Tuesday (2).
    Tuesday = 2,
    /// Wednesday (3).
    Wednesday = 3,
    /// Thursday (4).
    Thursday = 4,
    /// Friday (5).
    Friday = 5,
    /// Saturday (6).
    Saturday = 6,
}

impl Weekday {
    /// All weekdays in wire order.
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// Upper-case name, as printed in scheduler listings.
    pub fn name(&self) -> &'static str {
        match self {
            Weekday::Sunday => "SUNDAY",
            Weekday::Monday => "MONDAY",
            Weekday::Tuesday => "TUESDAY",
            Weekday::Wednesday => "WEDNESDAY",
            Weekday::Thursday => "THURSDAY",
            Weekday::Friday => "FRIDAY",
            Weekday::Saturday => "SATURDAY",
        }
    }
}

impl TryFrom<u8> for Weekday {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Weekday::ALL
            .get(value as usize)
            .copied()
            .ok_or(ProtocolError::InvalidWeekday(value))
    }
}

impl From<Weekday> for u8 {
    fn from(day: Weekday) -> Self {
        day as u8
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A switching rule stored in one scheduler slot.
///
/// When `repeat_weekdays` is non-empty the rule recurs on those days and the
/// `year`/`month`/`day` fields are informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheduler {
    /// Whether the rule is enabled.
    pub active: bool,
    /// Switch on (true) or off (false) when the rule fires.
    pub turn_on: bool,
    /// Days the rule repeats on.
    pub repeat_weekdays: BTreeSet<Weekday>,
    /// Full year, e.g. 2024.
    pub year: u16,
    /// Month (1-12).
    pub month: u8,
    /// Day of month (1-31).
    pub day: u8,
    /// Hour (0-23).
    pub hour: u8,
    /// Minute (0-59).
    pub minute: u8,
}

impl Scheduler {
    /// Build a scheduler from raw weekday numbers.
    ///
    /// Fails with [`ProtocolError::InvalidWeekday`] if any value is outside 0-6.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        active: bool,
        turn_on: bool,
        repeat_weekdays: impl IntoIterator<Item = u8>,
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
    ) -> ProtocolResult<Self> {
        let repeat_weekdays = repeat_weekdays
            .into_iter()
            .map(Weekday::try_from)
            .collect::<ProtocolResult<BTreeSet<_>>>()?;

        Ok(Scheduler {
            active,
            turn_on,
            repeat_weekdays,
            year,
            month,
            day,
            hour,
            minute,
        })
    }

    /// Whether the rule repeats weekly rather than firing on one date.
    pub fn is_recurring(&self) -> bool {
        !self.repeat_weekdays.is_empty()
    }

    /// Weekday set as the one-byte wire mask (bit n = weekday n).
    pub fn weekday_mask(&self) -> u8 {
        self.repeat_weekdays
            .iter()
            .fold(0u8, |mask, day| mask | (1 << u8::from(*day)))
    }

    /// Decode a weekday set from its wire mask.
    pub fn weekdays_from_mask(mask: u8) -> ProtocolResult<BTreeSet<Weekday>> {
        (0..8u8)
            .filter(|bit| mask & (1 << bit) != 0)
            .map(Weekday::try_from)
            .collect()
    }
}

impl fmt::Display for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days: Vec<&str> = self.repeat_weekdays.iter().map(Weekday::name).collect();
        write!(
            f,
            "Scheduler(active={}, turn_on={}, repeat_weekdays=[{}], year={}, month={}, day={}, hour={}, minute={})",
            self.active,
            self.turn_on,
            days.join(", "),
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute
        )
    }
}

/// A scheduler together with the device slot it is stored in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerEntry {
    /// Device-side storage position; stable across pages.
    pub slot_id: u8,
    /// The stored rule.
    pub scheduler: Scheduler,
}

impl fmt::Display for SchedulerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchedulerEntry(slot_id={}, scheduler={})", self.slot_id, self.scheduler)
    }
}

/// One page of scheduler slots, or the aggregate of all pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerPage {
    /// Number of schedulers stored on the device.
    pub total_count: u8,
    /// Entries in retrieval order.
    pub entries: Vec<SchedulerEntry>,
}

impl SchedulerPage {
    /// Index of the last page to request for `total_count` entries.
    ///
    /// This is `total_count / 4` with no rounding up, which requests one
    /// trailing page when the count is an exact multiple of four. The plug
    /// answers that page, so the formula is kept as is.
    pub fn last_page_index(total_count: u8) -> u8 {
        total_count / SCHEDULERS_PER_PAGE as u8
    }
}

/// Snapshot of the plug settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Whether the reduced tariff period is enabled.
    pub reduced_mode_active: bool,
    /// Normal price in cents per kWh.
    pub normal_price_cents: u16,
    /// Reduced price in cents per kWh.
    pub reduced_price_cents: u16,
    /// Start of the reduced period in minutes after midnight.
    pub reduced_start_minute: u16,
    /// End of the reduced period in minutes after midnight.
    pub reduced_end_minute: u16,
    /// Whether the status LED is on.
    pub led_active: bool,
    /// Overload limit in watts (0 = disabled).
    pub power_limit_watts: u16,
}

/// Point in time at which the countdown timer fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerTarget {
    /// Second (0-59).
    pub second: u8,
    /// Minute (0-59).
    pub minute: u8,
    /// Hour (0-23).
    pub hour: u8,
    /// Day of month (1-31).
    pub day: u8,
    /// Month (1-12).
    pub month: u8,
    /// Two-digit year.
    pub year: u8,
}

/// Snapshot of the countdown timer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerStatus {
    /// Whether a timer is running.
    pub running: bool,
    /// Switch on (true) or off (false) when it fires.
    pub turn_on: bool,
    /// When it fires.
    pub target: TimerTarget,
    /// Length the timer was started with, in seconds.
    pub original_length_seconds: u32,
}

/// Format minutes after midnight as `HH:MM`.
pub fn format_minutes(minutes: u16) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_values_in_order() {
        for value in 0..7u8 {
            let day = Weekday::try_from(value).unwrap();
            assert_eq!(u8::from(day), value);
        }
        assert_eq!(Weekday::try_from(0).unwrap(), Weekday::Sunday);
        assert_eq!(Weekday::try_from(6).unwrap(), Weekday::Saturday);
    }

    #[test]
    fn test_scheduler_rejects_invalid_weekday() {
        let err = Scheduler::new(true, true, [1, 9], 2024, 1, 1, 8, 0).unwrap_err();
        assert_eq!(err, ProtocolError::InvalidWeekday(9));
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_scheduler_accepts_all_weekdays() {
        let scheduler = Scheduler::new(true, false, 0..7, 2024, 1, 1, 8, 0).unwrap();
        assert_eq!(scheduler.repeat_weekdays.len(), 7);
        assert!(scheduler.is_recurring());
        assert_eq!(scheduler.weekday_mask(), 0x7F);
    }

    #[test]
    fn test_weekday_mask_round_trip() {
        let scheduler = Scheduler::new(true, true, [1, 3, 5], 2024, 6, 1, 7, 30).unwrap();
        assert_eq!(scheduler.weekday_mask(), 0b0010_1010);
        let days = Scheduler::weekdays_from_mask(0b0010_1010).unwrap();
        assert_eq!(days, scheduler.repeat_weekdays);
    }

    #[test]
    fn test_weekday_mask_high_bit_is_invalid() {
        let err = Scheduler::weekdays_from_mask(0x80).unwrap_err();
        assert_eq!(err, ProtocolError::InvalidWeekday(7));
    }

    #[test]
    fn test_scheduler_display() {
        let scheduler = Scheduler::new(true, false, [0, 6], 2024, 2, 3, 4, 5).unwrap();
        assert_eq!(
            scheduler.to_string(),
            "Scheduler(active=true, turn_on=false, repeat_weekdays=[SUNDAY, SATURDAY], year=2024, month=2, day=3, hour=4, minute=5)"
        );
    }

    #[test]
    fn test_last_page_index() {
        assert_eq!(SchedulerPage::last_page_index(0), 0);
        assert_eq!(SchedulerPage::last_page_index(3), 0);
        assert_eq!(SchedulerPage::last_page_index(4), 1);
        assert_eq!(SchedulerPage::last_page_index(9), 2);
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0), "00:00");
        assert_eq!(format_minutes(360), "06:00");
        assert_eq!(format_minutes(1439), "23:59");
    }
}
