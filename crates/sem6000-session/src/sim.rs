//! In-process simulated plug.
//!
//! [`SimulatedPlug`] implements [`Transport`] by decoding each written
//! command, applying it to an in-memory device model and queueing the
//! encoded answer as fragments. It drives the CLI's `--simulate` mode and
//! the integration tests.

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime};
use sem6000_protocol::{
    split_fragments, Command, Notification, Scheduler, SchedulerEntry, SchedulerPage, Settings,
    TimerStatus, TimerTarget, DEFAULT_PIN, FRAGMENT_SIZE, SCHEDULERS_PER_PAGE,
};
use tracing::{debug, warn};

use crate::error::TransportError;
use crate::transport::Transport;

/// Number of scheduler slots the simulated plug offers.
pub const MAX_SCHEDULER_SLOTS: usize = 12;

/// A software model of one SEM6000 plug.
#[derive(Debug, Clone)]
pub struct SimulatedPlug {
    pin: String,
    authorized: bool,
    power_on: bool,
    clock: Option<NaiveDateTime>,
    settings: Settings,
    timer: TimerStatus,
    schedulers: BTreeMap<u8, Scheduler>,
    pending: VecDeque<Vec<u8>>,
    fragment_size: usize,
    muted: bool,
    received: Vec<Command>,
}

impl Default for SimulatedPlug {
    fn default() -> Self {
        SimulatedPlug::new()
    }
}

impl SimulatedPlug {
    /// A factory-fresh plug with the default PIN.
    pub fn new() -> Self {
        SimulatedPlug {
            pin: DEFAULT_PIN.to_string(),
            authorized: false,
            power_on: false,
            clock: None,
            settings: Settings {
                reduced_mode_active: false,
                normal_price_cents: 0,
                reduced_price_cents: 0,
                reduced_start_minute: 0,
                reduced_end_minute: 0,
                led_active: true,
                power_limit_watts: 0,
            },
            timer: TimerStatus {
                running: false,
                turn_on: false,
                target: TimerTarget::default(),
                original_length_seconds: 0,
            },
            schedulers: BTreeMap::new(),
            pending: VecDeque::new(),
            fragment_size: FRAGMENT_SIZE,
            muted: false,
            received: Vec::new(),
        }
    }

    /// Use `pin` instead of the default PIN.
    pub fn with_pin(mut self, pin: impl Into<String>) -> Self {
        self.pin = pin.into();
        self
    }

    /// Pre-fill scheduler slots.
    pub fn with_schedulers(mut self, schedulers: impl IntoIterator<Item = (u8, Scheduler)>) -> Self {
        self.schedulers.extend(schedulers);
        self
    }

    /// Split answers into fragments of at most `size` bytes.
    pub fn with_fragment_size(mut self, size: usize) -> Self {
        self.fragment_size = size.max(1);
        self
    }

    /// Stop answering; every command then times out.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Queue raw fragments ahead of the next answer.
    pub fn inject_fragments(&mut self, fragments: impl IntoIterator<Item = Vec<u8>>) {
        self.pending.extend(fragments);
    }

    /// Current PIN.
    pub fn pin(&self) -> &str {
        &self.pin
    }

    /// Whether a correct PIN has been presented on this connection.
    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    /// Relay state.
    pub fn is_power_on(&self) -> bool {
        self.power_on
    }

    /// Clock as last set by the host.
    pub fn clock(&self) -> Option<NaiveDateTime> {
        self.clock
    }

    /// Settings snapshot.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Timer snapshot.
    pub fn timer(&self) -> &TimerStatus {
        &self.timer
    }

    /// Occupied scheduler slots.
    pub fn schedulers(&self) -> &BTreeMap<u8, Scheduler> {
        &self.schedulers
    }

    /// Every command decoded so far, in order.
    pub fn received_commands(&self) -> &[Command] {
        &self.received
    }

    fn respond(&mut self, command: &Command) -> Notification {
        let kind = command.expected_notification();

        let needs_auth = !matches!(command, Command::Authorize { .. } | Command::ResetPin);
        if needs_auth && !self.authorized {
            debug!("simulated plug: {} rejected, not authorized", command.name());
            return kind
                .confirmation(false)
                .unwrap_or(Notification::Authorization {
                    was_successful: false,
                });
        }

        match command {
            Command::Authorize { pin } => {
                self.authorized = *pin == self.pin;
                Notification::Authorization {
                    was_successful: self.authorized,
                }
            }
            Command::ChangePin { pin, new_pin } => {
                let ok = *pin == self.pin;
                if ok {
                    self.pin = new_pin.clone();
                }
                Notification::ChangePin { was_successful: ok }
            }
            Command::ResetPin => {
                self.pin = DEFAULT_PIN.to_string();
                Notification::ResetPin {
                    was_successful: true,
                }
            }
            Command::PowerSwitch { on } => {
                self.power_on = *on;
                Notification::PowerSwitch {
                    was_successful: true,
                }
            }
            Command::LedSwitch { on } => {
                self.settings.led_active = *on;
                Notification::LedSwitch {
                    was_successful: true,
                }
            }
            Command::SetDateTime {
                year,
                month,
                day,
                hour,
                minute,
                second,
            } => {
                self.clock = NaiveDate::from_ymd_opt(i32::from(*year), u32::from(*month), u32::from(*day))
                    .and_then(|date| {
                        date.and_hms_opt(u32::from(*hour), u32::from(*minute), u32::from(*second))
                    });
                Notification::DateTimeSet {
                    was_successful: self.clock.is_some(),
                }
            }
            Command::RequestSettings => Notification::Settings(self.settings.clone()),
            Command::SetPowerLimit { watts } => {
                self.settings.power_limit_watts = *watts;
                Notification::PowerLimitSet {
                    was_successful: true,
                }
            }
            Command::SetPrices {
                normal_cents,
                reduced_cents,
            } => {
                self.settings.normal_price_cents = *normal_cents;
                self.settings.reduced_price_cents = *reduced_cents;
                Notification::PricesSet {
                    was_successful: true,
                }
            }
            Command::SetReducedPeriod {
                active,
                start_minute,
                end_minute,
            } => {
                self.settings.reduced_mode_active = *active;
                self.settings.reduced_start_minute = *start_minute;
                self.settings.reduced_end_minute = *end_minute;
                Notification::ReducedPeriodSet {
                    was_successful: true,
                }
            }
            Command::RequestTimerStatus => Notification::TimerStatus(self.timer.clone()),
            Command::SetTimer {
                reset,
                turn_on,
                target,
            } => {
                self.timer = if *reset {
                    TimerStatus {
                        running: false,
                        turn_on: false,
                        target: TimerTarget::default(),
                        original_length_seconds: 0,
                    }
                } else {
                    TimerStatus {
                        running: true,
                        turn_on: *turn_on,
                        target: *target,
                        original_length_seconds: seconds_until(target),
                    }
                };
                Notification::TimerSet {
                    was_successful: true,
                }
            }
            Command::RequestScheduler { page } => Notification::SchedulerPage(self.page(*page)),
            Command::AddScheduler { scheduler } => {
                let free = (0..MAX_SCHEDULER_SLOTS as u8).find(|slot| !self.schedulers.contains_key(slot));
                if let Some(slot) = free {
                    self.schedulers.insert(slot, scheduler.clone());
                }
                Notification::SchedulerSet {
                    was_successful: free.is_some(),
                }
            }
            Command::EditScheduler { slot_id, scheduler } => {
                let ok = match self.schedulers.get_mut(slot_id) {
                    Some(existing) => {
                        *existing = scheduler.clone();
                        true
                    }
                    None => false,
                };
                Notification::SchedulerSet { was_successful: ok }
            }
            Command::RemoveScheduler { slot_id } => Notification::SchedulerSet {
                was_successful: self.schedulers.remove(slot_id).is_some(),
            },
        }
    }

    fn page(&self, page: u8) -> SchedulerPage {
        let entries = self
            .schedulers
            .iter()
            .skip(usize::from(page) * SCHEDULERS_PER_PAGE)
            .take(SCHEDULERS_PER_PAGE)
            .map(|(slot_id, scheduler)| SchedulerEntry {
                slot_id: *slot_id,
                scheduler: scheduler.clone(),
            })
            .collect();
        SchedulerPage {
            total_count: self.schedulers.len() as u8,
            entries,
        }
    }
}

fn seconds_until(target: &TimerTarget) -> u32 {
    let at = NaiveDate::from_ymd_opt(
        2000 + i32::from(target.year),
        u32::from(target.month),
        u32::from(target.day),
    )
    .and_then(|date| {
        date.and_hms_opt(
            u32::from(target.hour),
            u32::from(target.minute),
            u32::from(target.second),
        )
    });

    at.map(|at| (at - Local::now().naive_local()).num_seconds().clamp(0, 0x00FF_FFFF) as u32)
        .unwrap_or(0)
}

impl Transport for SimulatedPlug {
    fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let command = match Command::decode(data) {
            Ok(command) => command,
            Err(e) => {
                warn!("simulated plug: ignoring undecodable write {}: {}", hex::encode(data), e);
                return Ok(());
            }
        };
        debug!("simulated plug: received {}", command);

        let answer = self.respond(&command);
        self.received.push(command);
        if self.muted {
            return Ok(());
        }

        let frame = answer
            .encode()
            .map_err(|e| TransportError::Io(std::io::Error::other(e.to_string())))?;
        self.pending.extend(split_fragments(&frame, self.fragment_size));
        Ok(())
    }

    fn wait_for_fragment(&mut self, _timeout: Duration) -> Result<Option<Vec<u8>>, TransportError> {
        Ok(self.pending.pop_front())
    }
}
