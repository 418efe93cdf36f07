//! Commands that can be sent to the plug.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{ProtocolError, ProtocolResult};
use crate::frame::{decode_frame, encode_frame};
use crate::notifications::NotificationKind;
use crate::types::*;

/// Commands that can be sent to the plug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Log in. Must precede every command except [`Command::ResetPin`].
    Authorize {
        /// Current four-digit PIN.
        pin: String,
    },

    /// Replace the PIN.
    ChangePin {
        /// Current four-digit PIN.
        pin: String,
        /// New four-digit PIN.
        new_pin: String,
    },

    /// Reset the PIN to the factory default.
    ResetPin,

    /// Switch the relay.
    PowerSwitch {
        /// Target relay state.
        on: bool,
    },

    /// Switch the status LED.
    LedSwitch {
        /// Target LED state.
        on: bool,
    },

    /// Set the device clock.
    SetDateTime {
        /// Full year.
        year: u16,
        /// Month (1-12).
        month: u8,
        /// Day of month (1-31).
        day: u8,
        /// Hour (0-23).
        hour: u8,
        /// Minute (0-59).
        minute: u8,
        /// Second (0-59).
        second: u8,
    },

    /// Request the settings snapshot.
    RequestSettings,

    /// Set the overload limit.
    SetPowerLimit {
        /// Limit in watts (0 = disabled).
        watts: u16,
    },

    /// Set the energy prices.
    SetPrices {
        /// Normal price in cents.
        normal_cents: u16,
        /// Reduced price in cents.
        reduced_cents: u16,
    },

    /// Configure the reduced tariff period.
    SetReducedPeriod {
        /// Whether the period is enabled.
        active: bool,
        /// Start in minutes after midnight (0-1439).
        start_minute: u16,
        /// End in minutes after midnight (0-1439).
        end_minute: u16,
    },

    /// Request the countdown timer status.
    RequestTimerStatus,

    /// Start or cancel the countdown timer.
    SetTimer {
        /// Cancel the running timer instead of starting one.
        reset: bool,
        /// Switch on (true) or off (false) when the timer fires.
        turn_on: bool,
        /// When the timer fires.
        target: TimerTarget,
    },

    /// Request one page of scheduler slots.
    RequestScheduler {
        /// Zero-based page index.
        page: u8,
    },

    /// Store a scheduler in a free slot chosen by the plug.
    AddScheduler {
        /// Rule to store.
        scheduler: Scheduler,
    },

    /// Overwrite the scheduler in an existing slot.
    EditScheduler {
        /// Slot to overwrite.
        slot_id: u8,
        /// New rule.
        scheduler: Scheduler,
    },

    /// Clear an existing slot.
    RemoveScheduler {
        /// Slot to clear.
        slot_id: u8,
    },
}

impl Command {
    /// Get the wire code for this command.
    pub fn code(&self) -> u8 {
        match self {
            Command::Authorize { .. } | Command::ChangePin { .. } | Command::ResetPin => CODE_PIN,
            Command::PowerSwitch { .. } => CODE_POWER_SWITCH,
            Command::LedSwitch { .. }
            | Command::SetPrices { .. }
            | Command::SetReducedPeriod { .. } => CODE_SETTINGS,
            Command::SetDateTime { .. } => CODE_SET_DATE_TIME,
            Command::RequestSettings => CODE_REQUEST_SETTINGS,
            Command::SetPowerLimit { .. } => CODE_SET_POWER_LIMIT,
            Command::RequestTimerStatus => CODE_REQUEST_TIMER_STATUS,
            Command::SetTimer { .. } => CODE_SET_TIMER,
            Command::RequestScheduler { .. } => CODE_REQUEST_SCHEDULER,
            Command::AddScheduler { .. }
            | Command::EditScheduler { .. }
            | Command::RemoveScheduler { .. } => CODE_SET_SCHEDULER,
        }
    }

    /// Operation name used in logs and failure reports.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Authorize { .. } => "authorize",
            Command::ChangePin { .. } => "change_pin",
            Command::ResetPin => "reset_pin",
            Command::PowerSwitch { on: true } => "power_on",
            Command::PowerSwitch { on: false } => "power_off",
            Command::LedSwitch { on: true } => "led_on",
            Command::LedSwitch { on: false } => "led_off",
            Command::SetDateTime { .. } => "set_date_time",
            Command::RequestSettings => "request_settings",
            Command::SetPowerLimit { .. } => "set_power_limit",
            Command::SetPrices { .. } => "set_prices",
            Command::SetReducedPeriod { .. } => "set_reduced_period",
            Command::RequestTimerStatus => "request_timer_status",
            Command::SetTimer { .. } => "set_timer",
            Command::RequestScheduler { .. } => "request_scheduler",
            Command::AddScheduler { .. } => "add_scheduler",
            Command::EditScheduler { .. } => "edit_scheduler",
            Command::RemoveScheduler { .. } => "remove_scheduler",
        }
    }

    /// The notification variant the plug answers this command with.
    pub fn expected_notification(&self) -> NotificationKind {
        match self {
            Command::Authorize { .. } => NotificationKind::Authorization,
            Command::ChangePin { .. } => NotificationKind::ChangePin,
            Command::ResetPin => NotificationKind::ResetPin,
            Command::PowerSwitch { .. } => NotificationKind::PowerSwitch,
            Command::LedSwitch { .. } => NotificationKind::LedSwitch,
            Command::SetDateTime { .. } => NotificationKind::DateTimeSet,
            Command::RequestSettings => NotificationKind::Settings,
            Command::SetPowerLimit { .. } => NotificationKind::PowerLimitSet,
            Command::SetPrices { .. } => NotificationKind::PricesSet,
            Command::SetReducedPeriod { .. } => NotificationKind::ReducedPeriodSet,
            Command::RequestTimerStatus => NotificationKind::TimerStatus,
            Command::SetTimer { .. } => NotificationKind::TimerSet,
            Command::RequestScheduler { .. } => NotificationKind::SchedulerPage,
            Command::AddScheduler { .. }
            | Command::EditScheduler { .. }
            | Command::RemoveScheduler { .. } => NotificationKind::SchedulerSet,
        }
    }

    /// Whether a `was_successful == false` answer counts as a failure.
    ///
    /// Power limit, prices, reduced period and timer confirmations are only
    /// checked for their variant.
    pub fn checks_success_flag(&self) -> bool {
        match self {
            Command::Authorize { .. }
            | Command::ChangePin { .. }
            | Command::ResetPin
            | Command::PowerSwitch { .. }
            | Command::LedSwitch { .. }
            | Command::SetDateTime { .. }
            | Command::AddScheduler { .. }
            | Command::EditScheduler { .. }
            | Command::RemoveScheduler { .. } => true,
            Command::SetPowerLimit { .. }
            | Command::SetPrices { .. }
            | Command::SetReducedPeriod { .. }
            | Command::SetTimer { .. }
            | Command::RequestSettings
            | Command::RequestTimerStatus
            | Command::RequestScheduler { .. } => false,
        }
    }

    /// Encode the command into a complete frame.
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(16);
        buf.push(self.code());
        buf.push(0x00);

        match self {
            Command::Authorize { pin } => {
                buf.push(PIN_AUTHORIZE);
                buf.extend_from_slice(&pin_digits("pin", pin)?);
                buf.extend_from_slice(&[0x00; PIN_LENGTH]);
            }

            Command::ChangePin { pin, new_pin } => {
                buf.push(PIN_CHANGE);
                buf.extend_from_slice(&pin_digits("new_pin", new_pin)?);
                buf.extend_from_slice(&pin_digits("pin", pin)?);
            }

            Command::ResetPin => {
                buf.push(PIN_RESET);
                buf.extend_from_slice(&[0x00; 2 * PIN_LENGTH]);
            }

            Command::PowerSwitch { on } => {
                buf.push(u8::from(*on));
                buf.extend_from_slice(&[0x00, 0x00]);
            }

            Command::LedSwitch { on } => {
                buf.push(SETTINGS_LED);
                buf.push(u8::from(*on));
                buf.extend_from_slice(&[0x00; 5]);
            }

            Command::SetDateTime {
                year,
                month,
                day,
                hour,
                minute,
                second,
            } => {
                check_range("month", *month, 1, 12)?;
                check_range("day", *day, 1, 31)?;
                check_range("hour", *hour, 0, 23)?;
                check_range("minute", *minute, 0, 59)?;
                check_range("second", *second, 0, 59)?;
                buf.extend_from_slice(&[*second, *minute, *hour, *day, *month]);
                buf.extend_from_slice(&year.to_be_bytes());
                buf.extend_from_slice(&[0x00, 0x00]);
            }

            Command::RequestSettings | Command::RequestTimerStatus => {
                buf.extend_from_slice(&[0x00, 0x00]);
            }

            Command::SetPowerLimit { watts } => {
                buf.extend_from_slice(&watts.to_be_bytes());
                buf.push(0x00);
            }

            Command::SetPrices {
                normal_cents,
                reduced_cents,
            } => {
                buf.push(SETTINGS_PRICES);
                buf.extend_from_slice(&normal_cents.to_be_bytes());
                buf.extend_from_slice(&reduced_cents.to_be_bytes());
                buf.extend_from_slice(&[0x00, 0x00]);
            }

            Command::SetReducedPeriod {
                active,
                start_minute,
                end_minute,
            } => {
                check_minute_of_day("start_minute", *start_minute)?;
                check_minute_of_day("end_minute", *end_minute)?;
                buf.push(SETTINGS_REDUCED_PERIOD);
                buf.push(u8::from(*active));
                buf.extend_from_slice(&start_minute.to_be_bytes());
                buf.extend_from_slice(&end_minute.to_be_bytes());
                buf.push(0x00);
            }

            Command::SetTimer {
                reset,
                turn_on,
                target,
            } => {
                let mode = match (reset, turn_on) {
                    (true, _) => TIMER_MODE_RESET,
                    (false, true) => TIMER_MODE_TURN_ON,
                    (false, false) => TIMER_MODE_TURN_OFF,
                };
                check_range("target_year", target.year, 0, 99)?;
                buf.push(mode);
                buf.extend_from_slice(&encode_timer_target(target));
                buf.push(0x00);
            }

            Command::RequestScheduler { page } => {
                buf.push(*page);
                buf.push(0x00);
            }

            Command::AddScheduler { scheduler } => {
                buf.push(SCHEDULER_ADD);
                buf.push(0x00);
                buf.extend_from_slice(&encode_scheduler(scheduler)?);
            }

            Command::EditScheduler { slot_id, scheduler } => {
                buf.push(SCHEDULER_EDIT);
                buf.push(*slot_id);
                buf.extend_from_slice(&encode_scheduler(scheduler)?);
            }

            Command::RemoveScheduler { slot_id } => {
                buf.push(SCHEDULER_REMOVE);
                buf.push(*slot_id);
                buf.extend_from_slice(&[0x00; SCHEDULER_SIZE]);
            }
        }

        encode_frame(&buf)
    }

    /// Decode a complete command frame (device side).
    pub fn decode(frame: &[u8]) -> ProtocolResult<Self> {
        let payload = decode_frame(frame)?;
        let code = payload[0];
        let body = &payload[2..];

        match code {
            CODE_PIN => {
                require(body, 1 + 2 * PIN_LENGTH)?;
                match body[0] {
                    PIN_AUTHORIZE => Ok(Command::Authorize {
                        pin: pin_string(&body[1..1 + PIN_LENGTH]),
                    }),
                    PIN_CHANGE => Ok(Command::ChangePin {
                        new_pin: pin_string(&body[1..1 + PIN_LENGTH]),
                        pin: pin_string(&body[1 + PIN_LENGTH..1 + 2 * PIN_LENGTH]),
                    }),
                    PIN_RESET => Ok(Command::ResetPin),
                    sub => Err(ProtocolError::UnknownSubCode { code, sub }),
                }
            }

            CODE_POWER_SWITCH => {
                require(body, 1)?;
                Ok(Command::PowerSwitch { on: body[0] != 0 })
            }

            CODE_SETTINGS => {
                require(body, 6)?;
                match body[0] {
                    SETTINGS_LED => Ok(Command::LedSwitch { on: body[1] != 0 }),
                    SETTINGS_PRICES => Ok(Command::SetPrices {
                        normal_cents: u16::from_be_bytes([body[1], body[2]]),
                        reduced_cents: u16::from_be_bytes([body[3], body[4]]),
                    }),
                    SETTINGS_REDUCED_PERIOD => Ok(Command::SetReducedPeriod {
                        active: body[1] != 0,
                        start_minute: u16::from_be_bytes([body[2], body[3]]),
                        end_minute: u16::from_be_bytes([body[4], body[5]]),
                    }),
                    sub => Err(ProtocolError::UnknownSubCode { code, sub }),
                }
            }

            CODE_SET_DATE_TIME => {
                require(body, 7)?;
                Ok(Command::SetDateTime {
                    second: body[0],
                    minute: body[1],
                    hour: body[2],
                    day: body[3],
                    month: body[4],
                    year: u16::from_be_bytes([body[5], body[6]]),
                })
            }

            CODE_REQUEST_SETTINGS => Ok(Command::RequestSettings),

            CODE_SET_POWER_LIMIT => {
                require(body, 2)?;
                Ok(Command::SetPowerLimit {
                    watts: u16::from_be_bytes([body[0], body[1]]),
                })
            }

            CODE_REQUEST_TIMER_STATUS => Ok(Command::RequestTimerStatus),

            CODE_SET_TIMER => {
                require(body, 7)?;
                let (reset, turn_on) = match body[0] {
                    TIMER_MODE_RESET => (true, false),
                    TIMER_MODE_TURN_ON => (false, true),
                    TIMER_MODE_TURN_OFF => (false, false),
                    sub => return Err(ProtocolError::UnknownSubCode { code, sub }),
                };
                Ok(Command::SetTimer {
                    reset,
                    turn_on,
                    target: decode_timer_target(&body[1..7]),
                })
            }

            CODE_REQUEST_SCHEDULER => {
                require(body, 1)?;
                Ok(Command::RequestScheduler { page: body[0] })
            }

            CODE_SET_SCHEDULER => {
                require(body, 2 + SCHEDULER_SIZE)?;
                let slot_id = body[1];
                match body[0] {
                    SCHEDULER_ADD => Ok(Command::AddScheduler {
                        scheduler: decode_scheduler(&body[2..])?,
                    }),
                    SCHEDULER_EDIT => Ok(Command::EditScheduler {
                        slot_id,
                        scheduler: decode_scheduler(&body[2..])?,
                    }),
                    SCHEDULER_REMOVE => Ok(Command::RemoveScheduler { slot_id }),
                    sub => Err(ProtocolError::UnknownSubCode { code, sub }),
                }
            }

            _ => Err(ProtocolError::UnknownCode(code)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Authorize { pin } => write!(f, "AuthorizeCommand(pin={})", pin),
            Command::ChangePin { pin, new_pin } => {
                write!(f, "ChangePinCommand(pin={}, new_pin={})", pin, new_pin)
            }
            Command::ResetPin => write!(f, "ResetPinCommand()"),
            Command::PowerSwitch { on } => write!(f, "PowerSwitchCommand(on={})", on),
            Command::LedSwitch { on } => write!(f, "LedSwitchCommand(on={})", on),
            Command::SetDateTime {
                year,
                month,
                day,
                hour,
                minute,
                second,
            } => write!(
                f,
                "SetDateTimeCommand(year={}, month={}, day={}, hour={}, minute={}, second={})",
                year, month, day, hour, minute, second
            ),
            Command::RequestSettings => write!(f, "RequestSettingsCommand()"),
            Command::SetPowerLimit { watts } => write!(f, "SetPowerLimitCommand(watts={})", watts),
            Command::SetPrices {
                normal_cents,
                reduced_cents,
            } => write!(
                f,
                "SetPricesCommand(normal_cents={}, reduced_cents={})",
                normal_cents, reduced_cents
            ),
            Command::SetReducedPeriod {
                active,
                start_minute,
                end_minute,
            } => write!(
                f,
                "SetReducedPeriodCommand(active={}, start_minute={}, end_minute={})",
                active, start_minute, end_minute
            ),
            Command::RequestTimerStatus => write!(f, "RequestTimerStatusCommand()"),
            Command::SetTimer {
                reset,
                turn_on,
                target,
            } => write!(
                f,
                "SetTimerCommand(reset={}, turn_on={}, target={:02}-{:02}-{:02} {:02}:{:02}:{:02})",
                reset, turn_on, target.year, target.month, target.day, target.hour, target.minute, target.second
            ),
            Command::RequestScheduler { page } => write!(f, "RequestSchedulerCommand(page={})", page),
            Command::AddScheduler { scheduler } => {
                write!(f, "AddSchedulerCommand(scheduler={})", scheduler)
            }
            Command::EditScheduler { slot_id, scheduler } => write!(
                f,
                "EditSchedulerCommand(slot_id={}, scheduler={})",
                slot_id, scheduler
            ),
            Command::RemoveScheduler { slot_id } => {
                write!(f, "RemoveSchedulerCommand(slot_id={})", slot_id)
            }
        }
    }
}

// ============================================================================
// Field helpers (shared with notifications)
// ============================================================================

pub(crate) fn require(body: &[u8], expected: usize) -> ProtocolResult<()> {
    if body.len() < expected {
        return Err(ProtocolError::FrameTooShort {
            expected,
            actual: body.len(),
        });
    }
    Ok(())
}

fn pin_digits(field: &'static str, pin: &str) -> ProtocolResult<[u8; PIN_LENGTH]> {
    let bytes = pin.as_bytes();
    if bytes.len() != PIN_LENGTH || !bytes.iter().all(u8::is_ascii_digit) {
        return Err(ProtocolError::invalid_field(
            field,
            format!("expected {} digits, got {:?}", PIN_LENGTH, pin),
        ));
    }

    let mut digits = [0u8; PIN_LENGTH];
    for (digit, byte) in digits.iter_mut().zip(bytes) {
        *digit = byte - b'0';
    }
    Ok(digits)
}

fn pin_string(digits: &[u8]) -> String {
    digits.iter().map(|d| char::from(b'0' + d % 10)).collect()
}

fn check_range(field: &'static str, value: u8, min: u8, max: u8) -> ProtocolResult<()> {
    if value < min || value > max {
        return Err(ProtocolError::invalid_field(
            field,
            format!("{} outside {}-{}", value, min, max),
        ));
    }
    Ok(())
}

fn check_minute_of_day(field: &'static str, minute: u16) -> ProtocolResult<()> {
    if minute > MAX_MINUTE_OF_DAY {
        return Err(ProtocolError::invalid_field(
            field,
            format!("{} outside 0-{}", minute, MAX_MINUTE_OF_DAY),
        ));
    }
    Ok(())
}

pub(crate) fn encode_timer_target(target: &TimerTarget) -> [u8; 6] {
    [
        target.second,
        target.minute,
        target.hour,
        target.day,
        target.month,
        target.year,
    ]
}

pub(crate) fn decode_timer_target(data: &[u8]) -> TimerTarget {
    TimerTarget {
        second: data[0],
        minute: data[1],
        hour: data[2],
        day: data[3],
        month: data[4],
        year: data[5],
    }
}

pub(crate) fn encode_scheduler(scheduler: &Scheduler) -> ProtocolResult<[u8; SCHEDULER_SIZE]> {
    let year = scheduler
        .year
        .checked_sub(SCHEDULER_BASE_YEAR)
        .and_then(|offset| u8::try_from(offset).ok())
        .ok_or_else(|| {
            ProtocolError::invalid_field(
                "year",
                format!(
                    "{} outside {}-{}",
                    scheduler.year,
                    SCHEDULER_BASE_YEAR,
                    SCHEDULER_BASE_YEAR + u8::MAX as u16
                ),
            )
        })?;
    check_range("hour", scheduler.hour, 0, 23)?;
    check_range("minute", scheduler.minute, 0, 59)?;

    Ok([
        u8::from(scheduler.active),
        u8::from(scheduler.turn_on),
        scheduler.weekday_mask(),
        year,
        scheduler.month,
        scheduler.day,
        scheduler.hour,
        scheduler.minute,
        0x00,
    ])
}

pub(crate) fn decode_scheduler(data: &[u8]) -> ProtocolResult<Scheduler> {
    require(data, SCHEDULER_SIZE)?;
    Ok(Scheduler {
        active: data[0] != 0,
        turn_on: data[1] != 0,
        repeat_weekdays: Scheduler::weekdays_from_mask(data[2])?,
        year: SCHEDULER_BASE_YEAR + data[3] as u16,
        month: data[4],
        day: data[5],
        hour: data[6],
        minute: data[7],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_power_on() {
        let frame = Command::PowerSwitch { on: true }.encode().unwrap();
        assert_eq!(frame, vec![0x0F, 0x06, 0x03, 0x00, 0x01, 0x00, 0x00, 0x05, 0xFF, 0xFF]);
    }

    #[test]
    fn test_encode_authorize() {
        let frame = Command::Authorize {
            pin: "1234".to_string(),
        }
        .encode()
        .unwrap();
        assert_eq!(&frame[..2], &[0x0F, 0x0C]);
        assert_eq!(&frame[2..7], &[CODE_PIN, 0x00, PIN_AUTHORIZE, 1, 2]);
        assert_eq!(&frame[7..13], &[3, 4, 0, 0, 0, 0]);
        assert_eq!(&frame[frame.len() - 2..], &FRAME_SENTINEL);
    }

    #[test]
    fn test_encode_rejects_bad_pin() {
        for pin in ["123", "12345", "12a4", ""] {
            let err = Command::Authorize {
                pin: pin.to_string(),
            }
            .encode()
            .unwrap_err();
            assert!(err.is_encode_error(), "pin {pin:?}");
        }
    }

    #[test]
    fn test_encode_reduced_period_minutes() {
        let command = Command::SetReducedPeriod {
            active: true,
            start_minute: 360,
            end_minute: 1320,
        };
        let frame = command.encode().unwrap();
        // code, reserved, sub, active, start(be), end(be)
        assert_eq!(&frame[2..10], &[0x0F, 0x00, 0x01, 0x01, 0x01, 0x68, 0x05, 0x28]);
        assert_eq!(Command::decode(&frame).unwrap(), command);
    }

    #[test]
    fn test_encode_rejects_minute_out_of_range() {
        let err = Command::SetReducedPeriod {
            active: true,
            start_minute: 0,
            end_minute: 1440,
        }
        .encode()
        .unwrap_err();
        assert_eq!(
            err,
            ProtocolError::InvalidField {
                field: "end_minute",
                reason: "1440 outside 0-1439".to_string()
            }
        );
    }

    #[test]
    fn test_encode_rejects_scheduler_year() {
        let scheduler = Scheduler::new(true, true, [], 1999, 1, 1, 0, 0).unwrap();
        let err = Command::AddScheduler { scheduler }.encode().unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidField { field: "year", .. }));
    }

    #[test]
    fn test_decode_device_side_commands() {
        let scheduler = Scheduler::new(false, true, [2, 4], 2025, 3, 14, 6, 45).unwrap();
        let commands = vec![
            Command::ChangePin {
                pin: "0000".to_string(),
                new_pin: "4711".to_string(),
            },
            Command::ResetPin,
            Command::LedSwitch { on: false },
            Command::SetDateTime {
                year: 2024,
                month: 12,
                day: 31,
                hour: 23,
                minute: 59,
                second: 58,
            },
            Command::SetPowerLimit { watts: 3000 },
            Command::SetPrices {
                normal_cents: 30,
                reduced_cents: 22,
            },
            Command::SetTimer {
                reset: false,
                turn_on: true,
                target: TimerTarget {
                    second: 1,
                    minute: 2,
                    hour: 3,
                    day: 4,
                    month: 5,
                    year: 24,
                },
            },
            Command::RequestScheduler { page: 2 },
            Command::EditScheduler {
                slot_id: 7,
                scheduler: scheduler.clone(),
            },
            Command::RemoveScheduler { slot_id: 3 },
        ];

        for command in commands {
            let frame = command.encode().unwrap();
            assert_eq!(Command::decode(&frame).unwrap(), command);
        }
    }

    #[test]
    fn test_expected_notification() {
        assert_eq!(
            Command::RequestSettings.expected_notification(),
            NotificationKind::Settings
        );
        assert_eq!(
            Command::RemoveScheduler { slot_id: 1 }.expected_notification(),
            NotificationKind::SchedulerSet
        );
        assert!(Command::ResetPin.checks_success_flag());
        assert!(!Command::SetPowerLimit { watts: 1 }.checks_success_flag());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Command::PowerSwitch { on: true }.to_string(),
            "PowerSwitchCommand(on=true)"
        );
        assert_eq!(Command::ResetPin.to_string(), "ResetPinCommand()");
    }
}
