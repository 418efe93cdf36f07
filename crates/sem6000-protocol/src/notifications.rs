//! Notifications pushed by the plug in answer to commands.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::commands::{decode_scheduler, decode_timer_target, encode_scheduler, encode_timer_target, require};
use crate::constants::*;
use crate::error::{ProtocolError, ProtocolResult};
use crate::frame::{decode_frame, encode_frame};
use crate::types::*;

/// Notifications received from the plug.
///
/// Confirmation variants carry only a success flag; the remaining variants
/// carry a data payload and no flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    /// Answer to [`Command::Authorize`](crate::Command::Authorize).
    Authorization {
        /// Whether the PIN was accepted.
        was_successful: bool,
    },
    /// Answer to [`Command::ChangePin`](crate::Command::ChangePin).
    ChangePin {
        /// Whether the PIN was changed.
        was_successful: bool,
    },
    /// Answer to [`Command::ResetPin`](crate::Command::ResetPin).
    ResetPin {
        /// Whether the PIN was reset.
        was_successful: bool,
    },
    /// Answer to [`Command::PowerSwitch`](crate::Command::PowerSwitch).
    PowerSwitch {
        /// Whether the relay was switched.
        was_successful: bool,
    },
    /// Answer to [`Command::LedSwitch`](crate::Command::LedSwitch).
    LedSwitch {
        /// Whether the LED was switched.
        was_successful: bool,
    },
    /// Answer to [`Command::SetDateTime`](crate::Command::SetDateTime).
    DateTimeSet {
        /// Whether the clock was set.
        was_successful: bool,
    },
    /// Answer to [`Command::SetPowerLimit`](crate::Command::SetPowerLimit).
    PowerLimitSet {
        /// Status flag as reported by the plug.
        was_successful: bool,
    },
    /// Answer to [`Command::SetPrices`](crate::Command::SetPrices).
    PricesSet {
        /// Status flag as reported by the plug.
        was_successful: bool,
    },
    /// Answer to [`Command::SetReducedPeriod`](crate::Command::SetReducedPeriod).
    ReducedPeriodSet {
        /// Status flag as reported by the plug.
        was_successful: bool,
    },
    /// Answer to [`Command::SetTimer`](crate::Command::SetTimer).
    TimerSet {
        /// Status flag as reported by the plug.
        was_successful: bool,
    },
    /// Answer to add, edit and remove scheduler commands.
    SchedulerSet {
        /// Whether the slot was written.
        was_successful: bool,
    },
    /// Settings snapshot.
    Settings(Settings),
    /// Countdown timer snapshot.
    TimerStatus(TimerStatus),
    /// One page of scheduler slots.
    SchedulerPage(SchedulerPage),
}

/// The variant tag of a [`Notification`], without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    /// [`Notification::Authorization`].
    Authorization,
    /// [`Notification::ChangePin`].
    ChangePin,
    /// [`Notification::ResetPin`].
    ResetPin,
    /// [`Notification::PowerSwitch`].
    PowerSwitch,
    /// [`Notification::LedSwitch`].
    LedSwitch,
    /// [`Notification::DateTimeSet`].
    DateTimeSet,
    /// [`Notification::PowerLimitSet`].
    PowerLimitSet,
    /// [`Notification::PricesSet`].
    PricesSet,
    /// [`Notification::ReducedPeriodSet`].
    ReducedPeriodSet,
    /// [`Notification::TimerSet`].
    TimerSet,
    /// [`Notification::SchedulerSet`].
    SchedulerSet,
    /// [`Notification::Settings`].
    Settings,
    /// [`Notification::TimerStatus`].
    TimerStatus,
    /// [`Notification::SchedulerPage`].
    SchedulerPage,
}

impl NotificationKind {
    /// Whether notifications of this kind carry only a success flag.
    pub fn is_confirmation(&self) -> bool {
        !matches!(
            self,
            NotificationKind::Settings | NotificationKind::TimerStatus | NotificationKind::SchedulerPage
        )
    }

    /// Build a confirmation of this kind. Returns `None` for data-bearing kinds.
    pub fn confirmation(self, was_successful: bool) -> Option<Notification> {
        let notification = match self {
            NotificationKind::Authorization => Notification::Authorization { was_successful },
            NotificationKind::ChangePin => Notification::ChangePin { was_successful },
            NotificationKind::ResetPin => Notification::ResetPin { was_successful },
            NotificationKind::PowerSwitch => Notification::PowerSwitch { was_successful },
            NotificationKind::LedSwitch => Notification::LedSwitch { was_successful },
            NotificationKind::DateTimeSet => Notification::DateTimeSet { was_successful },
            NotificationKind::PowerLimitSet => Notification::PowerLimitSet { was_successful },
            NotificationKind::PricesSet => Notification::PricesSet { was_successful },
            NotificationKind::ReducedPeriodSet => Notification::ReducedPeriodSet { was_successful },
            NotificationKind::TimerSet => Notification::TimerSet { was_successful },
            NotificationKind::SchedulerSet => Notification::SchedulerSet { was_successful },
            NotificationKind::Settings
            | NotificationKind::TimerStatus
            | NotificationKind::SchedulerPage => return None,
        };
        Some(notification)
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NotificationKind::Authorization => "AuthorizationNotification",
            NotificationKind::ChangePin => "ChangePinNotification",
            NotificationKind::ResetPin => "ResetPinNotification",
            NotificationKind::PowerSwitch => "PowerSwitchNotification",
            NotificationKind::LedSwitch => "LedSwitchNotification",
            NotificationKind::DateTimeSet => "DateTimeSetNotification",
            NotificationKind::PowerLimitSet => "PowerLimitSetNotification",
            NotificationKind::PricesSet => "PricesSetNotification",
            NotificationKind::ReducedPeriodSet => "ReducedPeriodSetNotification",
            NotificationKind::TimerSet => "TimerSetNotification",
            NotificationKind::SchedulerSet => "SchedulerSetNotification",
            NotificationKind::Settings => "SettingsNotification",
            NotificationKind::TimerStatus => "TimerStatusNotification",
            NotificationKind::SchedulerPage => "SchedulerPageNotification",
        };
        f.write_str(name)
    }
}

impl Notification {
    /// Get the variant tag.
    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::Authorization { .. } => NotificationKind::Authorization,
            Notification::ChangePin { .. } => NotificationKind::ChangePin,
            Notification::ResetPin { .. } => NotificationKind::ResetPin,
            Notification::PowerSwitch { .. } => NotificationKind::PowerSwitch,
            Notification::LedSwitch { .. } => NotificationKind::LedSwitch,
            Notification::DateTimeSet { .. } => NotificationKind::DateTimeSet,
            Notification::PowerLimitSet { .. } => NotificationKind::PowerLimitSet,
            Notification::PricesSet { .. } => NotificationKind::PricesSet,
            Notification::ReducedPeriodSet { .. } => NotificationKind::ReducedPeriodSet,
            Notification::TimerSet { .. } => NotificationKind::TimerSet,
            Notification::SchedulerSet { .. } => NotificationKind::SchedulerSet,
            Notification::Settings(_) => NotificationKind::Settings,
            Notification::TimerStatus(_) => NotificationKind::TimerStatus,
            Notification::SchedulerPage(_) => NotificationKind::SchedulerPage,
        }
    }

    /// The success flag of a confirmation, or `None` for data-bearing variants.
    pub fn was_successful(&self) -> Option<bool> {
        match self {
            Notification::Authorization { was_successful }
            | Notification::ChangePin { was_successful }
            | Notification::ResetPin { was_successful }
            | Notification::PowerSwitch { was_successful }
            | Notification::LedSwitch { was_successful }
            | Notification::DateTimeSet { was_successful }
            | Notification::PowerLimitSet { was_successful }
            | Notification::PricesSet { was_successful }
            | Notification::ReducedPeriodSet { was_successful }
            | Notification::TimerSet { was_successful }
            | Notification::SchedulerSet { was_successful } => Some(*was_successful),
            Notification::Settings(_)
            | Notification::TimerStatus(_)
            | Notification::SchedulerPage(_) => None,
        }
    }

    /// Decode a complete notification frame.
    pub fn decode(frame: &[u8]) -> ProtocolResult<Self> {
        let payload = decode_frame(frame)?;
        let code = payload[0];
        let body = &payload[2..];
        log::trace!("decoding notification code 0x{:02X}, {} body bytes", code, body.len());

        match code {
            CODE_PIN => {
                require(body, 2)?;
                let was_successful = body[1] == STATUS_OK;
                match body[0] {
                    PIN_AUTHORIZE => Ok(Notification::Authorization { was_successful }),
                    PIN_CHANGE => Ok(Notification::ChangePin { was_successful }),
                    PIN_RESET => Ok(Notification::ResetPin { was_successful }),
                    sub => Err(ProtocolError::UnknownSubCode { code, sub }),
                }
            }

            CODE_SETTINGS => {
                require(body, 2)?;
                let was_successful = body[1] == STATUS_OK;
                match body[0] {
                    SETTINGS_LED => Ok(Notification::LedSwitch { was_successful }),
                    SETTINGS_PRICES => Ok(Notification::PricesSet { was_successful }),
                    SETTINGS_REDUCED_PERIOD => Ok(Notification::ReducedPeriodSet { was_successful }),
                    sub => Err(ProtocolError::UnknownSubCode { code, sub }),
                }
            }

            CODE_POWER_SWITCH | CODE_SET_DATE_TIME | CODE_SET_POWER_LIMIT | CODE_SET_TIMER
            | CODE_SET_SCHEDULER => {
                require(body, 1)?;
                let was_successful = body[0] == STATUS_OK;
                Ok(match code {
                    CODE_POWER_SWITCH => Notification::PowerSwitch { was_successful },
                    CODE_SET_DATE_TIME => Notification::DateTimeSet { was_successful },
                    CODE_SET_POWER_LIMIT => Notification::PowerLimitSet { was_successful },
                    CODE_SET_TIMER => Notification::TimerSet { was_successful },
                    _ => Notification::SchedulerSet { was_successful },
                })
            }

            CODE_REQUEST_SETTINGS => {
                require(body, 12)?;
                Ok(Notification::Settings(Settings {
                    reduced_mode_active: body[0] != 0,
                    normal_price_cents: u16::from_be_bytes([body[1], body[2]]),
                    reduced_price_cents: u16::from_be_bytes([body[3], body[4]]),
                    reduced_start_minute: u16::from_be_bytes([body[5], body[6]]),
                    reduced_end_minute: u16::from_be_bytes([body[7], body[8]]),
                    led_active: body[9] != 0,
                    power_limit_watts: u16::from_be_bytes([body[10], body[11]]),
                }))
            }

            CODE_REQUEST_TIMER_STATUS => {
                require(body, 11)?;
                Ok(Notification::TimerStatus(TimerStatus {
                    running: body[0] != 0,
                    turn_on: body[1] != 0,
                    target: decode_timer_target(&body[2..8]),
                    original_length_seconds: u32::from_be_bytes([0, body[8], body[9], body[10]]),
                }))
            }

            CODE_REQUEST_SCHEDULER => {
                require(body, 1)?;
                let total_count = body[0];
                let entries = body[1..]
                    .chunks_exact(SCHEDULER_ENTRY_SIZE)
                    .map(|chunk| -> ProtocolResult<SchedulerEntry> {
                        Ok(SchedulerEntry {
                            slot_id: chunk[0],
                            scheduler: decode_scheduler(&chunk[1..])?,
                        })
                    })
                    .collect::<ProtocolResult<Vec<_>>>()?;
                Ok(Notification::SchedulerPage(SchedulerPage {
                    total_count,
                    entries,
                }))
            }

            _ => Err(ProtocolError::UnknownCode(code)),
        }
    }

    /// Encode the notification into a complete frame (device side).
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        let status = |ok: bool| if ok { STATUS_OK } else { STATUS_FAILED };
        let mut buf = Vec::with_capacity(16);

        match self {
            Notification::Authorization { was_successful } => {
                buf.extend_from_slice(&[CODE_PIN, 0x00, PIN_AUTHORIZE, status(*was_successful)]);
            }
            Notification::ChangePin { was_successful } => {
                buf.extend_from_slice(&[CODE_PIN, 0x00, PIN_CHANGE, status(*was_successful)]);
            }
            Notification::ResetPin { was_successful } => {
                buf.extend_from_slice(&[CODE_PIN, 0x00, PIN_RESET, status(*was_successful)]);
            }
            Notification::LedSwitch { was_successful } => {
                buf.extend_from_slice(&[CODE_SETTINGS, 0x00, SETTINGS_LED, status(*was_successful)]);
            }
            Notification::PricesSet { was_successful } => {
                buf.extend_from_slice(&[CODE_SETTINGS, 0x00, SETTINGS_PRICES, status(*was_successful)]);
            }
            Notification::ReducedPeriodSet { was_successful } => {
                buf.extend_from_slice(&[
                    CODE_SETTINGS,
                    0x00,
                    SETTINGS_REDUCED_PERIOD,
                    status(*was_successful),
                ]);
            }
            Notification::PowerSwitch { was_successful } => {
                buf.extend_from_slice(&[CODE_POWER_SWITCH, 0x00, status(*was_successful)]);
            }
            Notification::DateTimeSet { was_successful } => {
                buf.extend_from_slice(&[CODE_SET_DATE_TIME, 0x00, status(*was_successful)]);
            }
            Notification::PowerLimitSet { was_successful } => {
                buf.extend_from_slice(&[CODE_SET_POWER_LIMIT, 0x00, status(*was_successful)]);
            }
            Notification::TimerSet { was_successful } => {
                buf.extend_from_slice(&[CODE_SET_TIMER, 0x00, status(*was_successful)]);
            }
            Notification::SchedulerSet { was_successful } => {
                buf.extend_from_slice(&[CODE_SET_SCHEDULER, 0x00, status(*was_successful)]);
            }

            Notification::Settings(settings) => {
                buf.extend_from_slice(&[CODE_REQUEST_SETTINGS, 0x00]);
                buf.push(u8::from(settings.reduced_mode_active));
                buf.extend_from_slice(&settings.normal_price_cents.to_be_bytes());
                buf.extend_from_slice(&settings.reduced_price_cents.to_be_bytes());
                buf.extend_from_slice(&settings.reduced_start_minute.to_be_bytes());
                buf.extend_from_slice(&settings.reduced_end_minute.to_be_bytes());
                buf.push(u8::from(settings.led_active));
                buf.extend_from_slice(&settings.power_limit_watts.to_be_bytes());
            }

            Notification::TimerStatus(status) => {
                if status.original_length_seconds > 0x00FF_FFFF {
                    return Err(ProtocolError::invalid_field(
                        "original_length_seconds",
                        format!("{} does not fit in 24 bits", status.original_length_seconds),
                    ));
                }
                buf.extend_from_slice(&[CODE_REQUEST_TIMER_STATUS, 0x00]);
                buf.push(u8::from(status.running));
                buf.push(u8::from(status.turn_on));
                buf.extend_from_slice(&encode_timer_target(&status.target));
                buf.extend_from_slice(&status.original_length_seconds.to_be_bytes()[1..]);
            }

            Notification::SchedulerPage(page) => {
                if page.entries.len() > SCHEDULERS_PER_PAGE {
                    return Err(ProtocolError::invalid_field(
                        "entries",
                        format!("{} entries exceed page size {}", page.entries.len(), SCHEDULERS_PER_PAGE),
                    ));
                }
                buf.extend_from_slice(&[CODE_REQUEST_SCHEDULER, 0x00, page.total_count]);
                for entry in &page.entries {
                    buf.push(entry.slot_id);
                    buf.extend_from_slice(&encode_scheduler(&entry.scheduler)?);
                }
            }
        }

        encode_frame(&buf)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::Settings(s) => write!(
                f,
                "{}(reduced_mode_active={}, normal_price_cents={}, reduced_price_cents={}, reduced_start_minute={}, reduced_end_minute={}, led_active={}, power_limit_watts={})",
                self.kind(),
                s.reduced_mode_active,
                s.normal_price_cents,
                s.reduced_price_cents,
                s.reduced_start_minute,
                s.reduced_end_minute,
                s.led_active,
                s.power_limit_watts
            ),
            Notification::TimerStatus(s) => write!(
                f,
                "{}(running={}, turn_on={}, target_second={}, target_minute={}, target_hour={}, target_day={}, target_month={}, target_year={}, original_length_seconds={})",
                self.kind(),
                s.running,
                s.turn_on,
                s.target.second,
                s.target.minute,
                s.target.hour,
                s.target.day,
                s.target.month,
                s.target.year,
                s.original_length_seconds
            ),
            Notification::SchedulerPage(page) => {
                let entries: Vec<String> = page.entries.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "{}(total_count={}, entries=[{}])",
                    self.kind(),
                    page.total_count,
                    entries.join(", ")
                )
            }
            confirmation => write!(
                f,
                "{}(was_successful={})",
                confirmation.kind(),
                confirmation.was_successful().unwrap_or_default()
            ),
        }
    }
}
