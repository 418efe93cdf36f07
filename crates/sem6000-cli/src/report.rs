//! Human-readable reports for CLI output.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use sem6000_session::protocol::{format_minutes, SchedulerPage, Settings, TimerStatus, TimerTarget};

fn on_off(value: bool) -> &'static str {
    if value {
        "On"
    } else {
        "Off"
    }
}

fn action(turn_on: bool) -> &'static str {
    if turn_on {
        "Turn On"
    } else {
        "Turn Off"
    }
}

/// Format a duration as `H:MM:SS`, prefixed with `-` when negative.
pub fn format_delta(delta: TimeDelta) -> String {
    let total = delta.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs();
    format!("{}{}:{:02}:{:02}", sign, total / 3600, total / 60 % 60, total % 60)
}

fn target_datetime(target: &TimerTarget) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(
        2000 + i32::from(target.year),
        u32::from(target.month),
        u32::from(target.day),
    )?
    .and_hms_opt(
        u32::from(target.hour),
        u32::from(target.minute),
        u32::from(target.second),
    )
}

/// Time remaining until a running timer fires, relative to `now`.
pub fn time_left(status: &TimerStatus, now: NaiveDateTime) -> Option<TimeDelta> {
    if !status.running {
        return None;
    }
    target_datetime(&status.target).map(|at| at - now)
}

/// Settings report.
pub struct SettingsReport<'a>(pub &'a Settings);

impl fmt::Display for SettingsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settings = self.0;
        writeln!(f, "Settings:")?;
        writeln!(f, "\tReduced mode:\t\t{}", on_off(settings.reduced_mode_active))?;
        writeln!(
            f,
            "\tNormal price:\t\t{:.2} EUR",
            f64::from(settings.normal_price_cents) / 100.0
        )?;
        writeln!(
            f,
            "\tReduced price:\t\t{:.2} EUR",
            f64::from(settings.reduced_price_cents) / 100.0
        )?;
        writeln!(
            f,
            "\tReduced mode start:\t{} minutes ({})",
            settings.reduced_start_minute,
            format_minutes(settings.reduced_start_minute)
        )?;
        writeln!(
            f,
            "\tReduced mode end:\t{} minutes ({})",
            settings.reduced_end_minute,
            format_minutes(settings.reduced_end_minute)
        )?;
        writeln!(f, "\tLED state:\t\t{}", on_off(settings.led_active))?;
        writeln!(f, "\tPower limit:\t\t{} W", settings.power_limit_watts)
    }
}

/// Timer status report; time left is computed against `now`.
pub struct TimerReport<'a> {
    pub status: &'a TimerStatus,
    pub now: NaiveDateTime,
}

impl fmt::Display for TimerReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self.status;
        writeln!(f, "Timer Status:")?;
        if status.running {
            writeln!(f, "\tTimer state:\t\tOn")?;
            if let Some(left) = time_left(status, self.now) {
                writeln!(f, "\tTime left:\t\t{}", format_delta(left))?;
            }
            writeln!(f, "\tAction:\t\t\t{}", action(status.turn_on))?;
        } else {
            writeln!(f, "\tTimer state:\t\tOff")?;
        }
        writeln!(
            f,
            "\tOriginal timer length:\t{}",
            format_delta(TimeDelta::seconds(i64::from(status.original_length_seconds)))
        )
    }
}

/// Scheduler listing.
pub struct SchedulerReport<'a>(pub &'a SchedulerPage);

impl fmt::Display for SchedulerReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Schedulers:")?;
        for (i, entry) in self.0.entries.iter().enumerate() {
            let scheduler = &entry.scheduler;
            writeln!(f, "\t#{} (slot {})", i + 1, entry.slot_id)?;
            writeln!(f, "\tActive:\t{}", on_off(scheduler.active))?;
            writeln!(f, "\tAction:\t{}", action(scheduler.turn_on))?;
            if scheduler.is_recurring() {
                let days: Vec<&str> = scheduler.repeat_weekdays.iter().map(|d| d.name()).collect();
                writeln!(f, "\tRepeat on:\t{}", days.join(", "))?;
            } else {
                writeln!(
                    f,
                    "\tDate:\t{:04}-{:02}-{:02}",
                    scheduler.year, scheduler.month, scheduler.day
                )?;
            }
            writeln!(f, "\tTime:\t{:02}:{:02}", scheduler.hour, scheduler.minute)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sem6000_session::protocol::{Scheduler, SchedulerEntry};

    #[test]
    fn test_settings_report() {
        let report = SettingsReport(&Settings {
            reduced_mode_active: true,
            normal_price_cents: 32,
            reduced_price_cents: 21,
            reduced_start_minute: 360,
            reduced_end_minute: 1320,
            led_active: false,
            power_limit_watts: 3000,
        })
        .to_string();
        assert!(report.starts_with("Settings:\n"));
        assert!(report.contains("Reduced mode:\t\tOn"));
        assert!(report.contains("Normal price:\t\t0.32 EUR"));
        assert!(report.contains("360 minutes (06:00)"));
        assert!(report.contains("1320 minutes (22:00)"));
        assert!(report.contains("LED state:\t\tOff"));
        assert!(report.contains("3000 W"));
    }

    #[test]
    fn test_timer_report_time_left() {
        let now = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let status = TimerStatus {
            running: true,
            turn_on: false,
            target: TimerTarget {
                second: 30,
                minute: 30,
                hour: 13,
                day: 1,
                month: 5,
                year: 24,
            },
            original_length_seconds: 5400,
        };
        let report = TimerReport {
            status: &status,
            now,
        }
        .to_string();
        assert!(report.contains("Time left:\t\t1:30:30"));
        assert!(report.contains("Turn Off"));
        assert!(report.contains("Original timer length:\t1:30:00"));

        let stopped = TimerStatus::default();
        assert_eq!(time_left(&stopped, now), None);
        let stopped_report = TimerReport {
            status: &stopped,
            now,
        }
        .to_string();
        assert!(!stopped_report.contains("Time left"));
        assert!(stopped_report.contains("Timer state:\t\tOff"));
    }

    #[test]
    fn test_scheduler_report() {
        let page = SchedulerPage {
            total_count: 2,
            entries: vec![
                SchedulerEntry {
                    slot_id: 3,
                    scheduler: Scheduler::new(true, true, [1, 5], 2024, 1, 1, 7, 5).unwrap(),
                },
                SchedulerEntry {
                    slot_id: 4,
                    scheduler: Scheduler::new(false, false, [], 2024, 12, 24, 18, 0).unwrap(),
                },
            ],
        };
        let report = SchedulerReport(&page).to_string();
        assert!(report.starts_with("Schedulers:\n"));
        assert!(report.contains("#1 (slot 3)"));
        assert!(report.contains("Repeat on:\tMONDAY, FRIDAY"));
        assert!(report.contains("Time:\t07:05"));
        assert!(report.contains("Active:\tOff"));
        assert!(report.contains("Date:\t2024-12-24"));
    }

    /// Accepts at most `room` bytes, then fails.
    struct Bounded {
        room: usize,
    }

    impl fmt::Write for Bounded {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            self.room = self.room.checked_sub(s.len()).ok_or(fmt::Error)?;
            Ok(())
        }
    }

    #[test]
    fn test_report_write_error_propagates() {
        use std::fmt::Write as _;

        let settings = Settings::default();
        let mut short = Bounded { room: 16 };
        assert!(write!(short, "{}", SettingsReport(&settings)).is_err());

        let page = SchedulerPage {
            total_count: 1,
            entries: vec![SchedulerEntry {
                slot_id: 0,
                scheduler: Scheduler::new(true, true, [1], 2024, 1, 1, 7, 5).unwrap(),
            }],
        };
        let mut short = Bounded { room: 24 };
        assert!(write!(short, "{}", SchedulerReport(&page)).is_err());

        let mut roomy = Bounded { room: 4096 };
        assert!(write!(roomy, "{}", SettingsReport(&settings)).is_ok());
    }

    #[test]
    fn test_format_delta_negative() {
        assert_eq!(format_delta(TimeDelta::seconds(-61)), "-0:01:01");
    }
}
