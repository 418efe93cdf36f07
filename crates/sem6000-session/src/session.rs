//! The session driver.
//!
//! A [`Session`] owns one transport, one codec and one frame reassembler and
//! runs exactly one command at a time:
//!
//! 1. reset the reassembler
//! 2. encode the command and write it
//! 3. feed pushed fragments into the reassembler until the sentinel arrives
//!    or the timeout elapses
//! 4. parse the frame and check it against the variant the command expects
//! 5. for confirmations whose flag counts, reject `was_successful == false`
//!
//! Nothing is retried here; every failure is returned to the caller and the
//! session stays usable.

use std::time::{Duration, Instant};

use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use sem6000_protocol::{
    Codec, Command, FrameReassembler, Notification, NotificationKind, Scheduler, Sem6000Codec,
    Settings, TimerStatus, TimerTarget, DEFAULT_PIN,
};
use tracing::{debug, trace, warn};

use crate::config::SessionConfig;
use crate::convert;
use crate::error::{SessionError, SessionResult};
use crate::transport::Transport;

/// Where the session is in its request/response cycle.
///
/// `send` holds `&mut self` from write to validation, so `Busy` is only set
/// inside that call. Between calls, whatever the outcome, the state read
/// through [`Session::state`] is always `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No command in flight.
    Ready,
    /// Waiting for a notification of the given kind.
    Busy(NotificationKind),
}

/// A request/response session with one plug.
///
/// `authorize` has to be the first operation on a fresh connection (except
/// `reset_pin`); the plug rejects anything else until then. The session
/// does not enforce this ordering.
pub struct Session<T: Transport, C: Codec = Sem6000Codec> {
    transport: T,
    codec: C,
    reassembler: FrameReassembler,
    state: SessionState,
    pin: String,
    timeout: Duration,
}

impl<T: Transport> Session<T> {
    /// Create a session speaking the SEM6000 wire format.
    pub fn new(transport: T, config: &SessionConfig) -> Self {
        Session::with_codec(transport, Sem6000Codec, config)
    }
}

impl<T: Transport, C: Codec> Session<T, C> {
    /// Create a session with a custom codec.
    pub fn with_codec(transport: T, codec: C, config: &SessionConfig) -> Self {
        Session {
            transport,
            codec,
            reassembler: FrameReassembler::new(),
            state: SessionState::Ready,
            pin: config.pin.clone(),
            timeout: config.timeout(),
        }
    }

    /// Current state; `Ready` whenever the caller can observe it.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// PIN used for `authorize`; updated by a successful `change_pin` or `reset_pin`.
    pub fn pin(&self) -> &str {
        &self.pin
    }

    /// Per-command timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Change the per-command timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Borrow the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the session and return the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    // ========================================================================
    // Core exchange
    // ========================================================================

    /// Send one command and return its validated notification.
    pub fn send(&mut self, command: &Command, timeout: Duration) -> SessionResult<Notification> {
        let operation = command.name();
        let expected = command.expected_notification();

        self.reassembler.reset();
        let frame = self
            .codec
            .encode(command)
            .map_err(|source| SessionError::Encode { operation, source })?;

        self.state = SessionState::Busy(expected);
        let result = self.exchange(command, &frame, timeout);
        self.state = SessionState::Ready;
        result
    }

    fn exchange(
        &mut self,
        command: &Command,
        frame: &[u8],
        timeout: Duration,
    ) -> SessionResult<Notification> {
        let operation = command.name();
        let expected = command.expected_notification();

        debug!("sent data: {} ({})", hex::encode(frame), command);
        self.transport.write(frame)?;

        let received = self.wait_for_frame(operation, timeout)?;
        let notification = match self.codec.parse(&received) {
            Ok(notification) => notification,
            Err(source) => {
                debug!("received data: {} (unknown notification)", hex::encode(&received));
                return Err(SessionError::Decode {
                    operation,
                    frame: received,
                    source,
                });
            }
        };
        debug!("received data: {} ({})", hex::encode(&received), notification);

        if notification.kind() != expected {
            return Err(SessionError::UnexpectedNotification {
                operation,
                expected,
                actual: Box::new(notification),
            });
        }

        if notification.was_successful() == Some(false) {
            if command.checks_success_flag() {
                return Err(SessionError::OperationFailed(operation));
            }
            warn!(
                "{}: plug reported was_successful=false, accepting on variant match",
                operation
            );
        }

        Ok(notification)
    }

    fn wait_for_frame(&mut self, operation: &'static str, timeout: Duration) -> SessionResult<Vec<u8>> {
        let deadline = Instant::now() + timeout;

        while !self.reassembler.is_complete() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let fragment = if remaining.is_zero() {
                None
            } else {
                self.transport.wait_for_fragment(remaining)?
            };

            match fragment {
                Some(fragment) => {
                    trace!("{}: fragment {}", operation, hex::encode(&fragment));
                    self.reassembler.push(&fragment);
                }
                None => {
                    return Err(SessionError::IncompleteFrame {
                        operation,
                        received: self.reassembler.peek(),
                    });
                }
            }
        }

        self.reassembler
            .take_frame()
            .map_err(|_| SessionError::IncompleteFrame {
                operation,
                received: self.reassembler.peek(),
            })
    }

    pub(crate) fn exchange_command(&mut self, command: Command) -> SessionResult<Notification> {
        let timeout = self.timeout;
        self.send(&command, timeout)
    }

    // ========================================================================
    // PIN
    // ========================================================================

    /// Log in with the session PIN.
    pub fn authorize(&mut self) -> SessionResult<Notification> {
        let pin = self.pin.clone();
        self.exchange_command(Command::Authorize { pin })
    }

    /// Replace the PIN; the session uses `new_pin` afterwards.
    pub fn change_pin(&mut self, new_pin: &str) -> SessionResult<Notification> {
        let notification = self.exchange_command(Command::ChangePin {
            pin: self.pin.clone(),
            new_pin: new_pin.to_string(),
        })?;
        self.pin = new_pin.to_string();
        Ok(notification)
    }

    /// Reset the PIN to the factory default. Needs no prior authorization.
    pub fn reset_pin(&mut self) -> SessionResult<Notification> {
        let notification = self.exchange_command(Command::ResetPin)?;
        self.pin = DEFAULT_PIN.to_string();
        Ok(notification)
    }

    // ========================================================================
    // Switches
    // ========================================================================

    /// Switch the relay on.
    pub fn power_on(&mut self) -> SessionResult<Notification> {
        self.exchange_command(Command::PowerSwitch { on: true })
    }

    /// Switch the relay off.
    pub fn power_off(&mut self) -> SessionResult<Notification> {
        self.exchange_command(Command::PowerSwitch { on: false })
    }

    /// Switch the status LED on.
    pub fn led_on(&mut self) -> SessionResult<Notification> {
        self.exchange_command(Command::LedSwitch { on: true })
    }

    /// Switch the status LED off.
    pub fn led_off(&mut self) -> SessionResult<Notification> {
        self.exchange_command(Command::LedSwitch { on: false })
    }

    // ========================================================================
    // Clock
    // ========================================================================

    /// Set the plug clock.
    pub fn set_date_time(&mut self, datetime: NaiveDateTime) -> SessionResult<Notification> {
        let year = u16::try_from(datetime.year()).map_err(|_| SessionError::InvalidArgument {
            name: "datetime",
            reason: format!("year {} is not representable", datetime.year()),
        })?;
        self.exchange_command(Command::SetDateTime {
            year,
            month: datetime.month() as u8,
            day: datetime.day() as u8,
            hour: datetime.hour() as u8,
            minute: datetime.minute() as u8,
            second: datetime.second() as u8,
        })
    }

    /// Set the plug clock from an ISO 8601 string.
    pub fn set_date_time_iso(&mut self, value: &str) -> SessionResult<Notification> {
        let datetime = convert::parse_datetime("datetime", value)?;
        self.set_date_time(datetime)
    }

    /// Set the plug clock to the local time.
    pub fn synchronize_date_time(&mut self) -> SessionResult<Notification> {
        self.set_date_time(Local::now().naive_local())
    }

    // ========================================================================
    // Settings
    // ========================================================================

    /// Read the settings snapshot.
    pub fn request_settings(&mut self) -> SessionResult<Settings> {
        match self.exchange_command(Command::RequestSettings)? {
            Notification::Settings(settings) => Ok(settings),
            other => Err(unexpected("request_settings", NotificationKind::Settings, other)),
        }
    }

    /// Set the overload limit in watts.
    pub fn set_power_limit(&mut self, watts: u16) -> SessionResult<Notification> {
        self.exchange_command(Command::SetPowerLimit { watts })
    }

    /// Set the normal and reduced prices in cents.
    pub fn set_prices(&mut self, normal_cents: u16, reduced_cents: u16) -> SessionResult<Notification> {
        self.exchange_command(Command::SetPrices {
            normal_cents,
            reduced_cents,
        })
    }

    /// Configure the reduced tariff period from `HH:MM` strings.
    pub fn set_reduced_period(
        &mut self,
        active: bool,
        start: &str,
        end: &str,
    ) -> SessionResult<Notification> {
        let start_minute = convert::minutes_of_day("start", start)?;
        let end_minute = convert::minutes_of_day("end", end)?;
        self.exchange_command(Command::SetReducedPeriod {
            active,
            start_minute,
            end_minute,
        })
    }

    // ========================================================================
    // Timer
    // ========================================================================

    /// Read the countdown timer.
    pub fn request_timer_status(&mut self) -> SessionResult<TimerStatus> {
        match self.exchange_command(Command::RequestTimerStatus)? {
            Notification::TimerStatus(status) => Ok(status),
            other => Err(unexpected("request_timer_status", NotificationKind::TimerStatus, other)),
        }
    }

    /// Start or cancel the timer with an explicit target.
    pub fn set_timer_at(
        &mut self,
        reset: bool,
        turn_on: bool,
        target: TimerTarget,
    ) -> SessionResult<Notification> {
        self.exchange_command(Command::SetTimer {
            reset,
            turn_on,
            target,
        })
    }

    /// Start a timer that fires `delay` (`HH:MM[:SS]`) from now.
    pub fn set_timer(&mut self, turn_on: bool, delay: &str) -> SessionResult<Notification> {
        let delay = convert::parse_delay("delay", delay)?;
        let target = convert::timer_target(Local::now().naive_local(), delay)?;
        self.set_timer_at(false, turn_on, target)
    }

    /// Cancel the running timer.
    pub fn reset_timer(&mut self) -> SessionResult<Notification> {
        let target = convert::timer_target(Local::now().naive_local(), chrono::TimeDelta::zero())?;
        self.set_timer_at(true, false, target)
    }

    // ========================================================================
    // Scheduler slots
    // ========================================================================

    /// Store a new scheduler in a slot chosen by the plug.
    pub fn add_scheduler(&mut self, scheduler: Scheduler) -> SessionResult<Notification> {
        self.exchange_command(Command::AddScheduler { scheduler })
    }

    /// Overwrite the scheduler in `slot_id`.
    pub fn edit_scheduler(&mut self, slot_id: u8, scheduler: Scheduler) -> SessionResult<Notification> {
        self.exchange_command(Command::EditScheduler { slot_id, scheduler })
    }

    /// Clear `slot_id`.
    pub fn remove_scheduler(&mut self, slot_id: u8) -> SessionResult<Notification> {
        self.exchange_command(Command::RemoveScheduler { slot_id })
    }
}

pub(crate) fn unexpected(
    operation: &'static str,
    expected: NotificationKind,
    actual: Notification,
) -> SessionError {
    SessionError::UnexpectedNotification {
        operation,
        expected,
        actual: Box::new(actual),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{ChannelPeer, ChannelTransport};
    use sem6000_protocol::{split_fragments, ProtocolError};

    fn session_with_peer() -> (Session<ChannelTransport>, ChannelPeer) {
        let (transport, peer) = ChannelTransport::new_pair();
        let config = SessionConfig {
            timeout_secs: 1,
            ..SessionConfig::default()
        };
        (Session::new(transport, &config), peer)
    }

    fn queue(peer: &ChannelPeer, notification: Notification, fragment_size: usize) {
        let frame = notification.encode().unwrap();
        for fragment in split_fragments(&frame, fragment_size) {
            peer.push_fragment(fragment).unwrap();
        }
    }

    #[test]
    fn test_power_on_success() {
        let (mut session, peer) = session_with_peer();
        queue(&peer, Notification::PowerSwitch { was_successful: true }, 3);

        let notification = session.power_on().unwrap();
        assert_eq!(notification.was_successful(), Some(true));
        assert_eq!(
            peer.try_recv_written().unwrap(),
            Command::PowerSwitch { on: true }.encode().unwrap()
        );
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn test_authorize_failure_is_operation_failed() {
        let (mut session, peer) = session_with_peer();
        queue(&peer, Notification::Authorization { was_successful: false }, 20);

        let err = session.authorize().unwrap_err();
        assert!(matches!(err, SessionError::OperationFailed("authorize")));
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn test_request_settings_rejects_wrong_variant() {
        let (mut session, peer) = session_with_peer();
        queue(&peer, Notification::PowerSwitch { was_successful: true }, 20);

        match session.request_settings().unwrap_err() {
            SessionError::UnexpectedNotification {
                operation,
                expected,
                actual,
            } => {
                assert_eq!(operation, "request_settings");
                assert_eq!(expected, NotificationKind::Settings);
                assert_eq!(actual.kind(), NotificationKind::PowerSwitch);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_power_limit_ignores_failure_flag() {
        let (mut session, peer) = session_with_peer();
        queue(&peer, Notification::PowerLimitSet { was_successful: false }, 20);

        let notification = session.set_power_limit(2500).unwrap();
        assert_eq!(notification.kind(), NotificationKind::PowerLimitSet);
    }

    #[test]
    fn test_timeout_is_incomplete_frame() {
        let (mut session, peer) = session_with_peer();
        session.set_timeout(Duration::from_millis(50));
        peer.push_fragment(vec![0x0F, 0x04, 0x03]).unwrap();

        match session.power_off().unwrap_err() {
            SessionError::IncompleteFrame { operation, received } => {
                assert_eq!(operation, "power_off");
                assert_eq!(received, vec![0x0F, 0x04, 0x03]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn test_stale_fragments_do_not_leak_into_next_command() {
        let (mut session, peer) = session_with_peer();
        session.set_timeout(Duration::from_millis(50));
        peer.push_fragment(vec![0x0F, 0x04]).unwrap();
        assert!(session.power_on().is_err());

        session.set_timeout(Duration::from_secs(1));
        queue(&peer, Notification::LedSwitch { was_successful: true }, 20);
        assert!(session.led_on().is_ok());
    }

    #[test]
    fn test_decode_error_carries_frame() {
        let (mut session, peer) = session_with_peer();
        let frame = sem6000_protocol::encode_frame(&[0x42, 0x00, 0x00]).unwrap();
        peer.push_fragment(frame.clone()).unwrap();

        match session.request_timer_status().unwrap_err() {
            SessionError::Decode {
                operation,
                frame: received,
                source,
            } => {
                assert_eq!(operation, "request_timer_status");
                assert_eq!(received, frame);
                assert_eq!(source, ProtocolError::UnknownCode(0x42));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_encode_error_sends_nothing() {
        let (mut session, peer) = session_with_peer();
        let err = session.change_pin("12").unwrap_err();
        assert!(matches!(
            err,
            SessionError::Encode {
                operation: "change_pin",
                ..
            }
        ));
        assert_eq!(peer.try_recv_written(), None);
        assert_eq!(session.pin(), "0000");
    }

    #[test]
    fn test_state_is_ready_after_every_outcome() {
        let (mut session, peer) = session_with_peer();
        assert_eq!(session.state(), SessionState::Ready);

        queue(&peer, Notification::PowerSwitch { was_successful: true }, 20);
        assert!(session.power_on().is_ok());
        assert_eq!(session.state(), SessionState::Ready);

        queue(&peer, Notification::PowerSwitch { was_successful: false }, 20);
        assert!(matches!(session.power_on(), Err(SessionError::OperationFailed(_))));
        assert_eq!(session.state(), SessionState::Ready);

        queue(&peer, Notification::LedSwitch { was_successful: true }, 20);
        assert!(matches!(
            session.power_on(),
            Err(SessionError::UnexpectedNotification { .. })
        ));
        assert_eq!(session.state(), SessionState::Ready);

        assert!(matches!(session.change_pin("x"), Err(SessionError::Encode { .. })));
        assert_eq!(session.state(), SessionState::Ready);

        session.set_timeout(Duration::from_millis(20));
        assert!(matches!(session.led_on(), Err(SessionError::IncompleteFrame { .. })));
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn test_change_pin_updates_session_pin() {
        let (mut session, peer) = session_with_peer();
        queue(&peer, Notification::ChangePin { was_successful: true }, 20);
        session.change_pin("4711").unwrap();
        assert_eq!(session.pin(), "4711");
    }

    #[test]
    fn test_set_reduced_period_encodes_minutes() {
        let (mut session, peer) = session_with_peer();
        queue(&peer, Notification::ReducedPeriodSet { was_successful: true }, 20);

        let notification = session.set_reduced_period(true, "06:00", "22:00").unwrap();
        assert_eq!(notification.was_successful(), Some(true));

        let written = peer.try_recv_written().unwrap();
        assert_eq!(
            Command::decode(&written).unwrap(),
            Command::SetReducedPeriod {
                active: true,
                start_minute: 360,
                end_minute: 1320,
            }
        );
    }
}
