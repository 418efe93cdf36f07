//! Protocol constants
//!
//! These constants define the framing bytes, command codes and sub-codes
//! used by the SEM6000 serial characteristic. Commands and their
//! notifications share the same code byte.

// ============================================================================
// Framing
// ============================================================================

/// First byte of every frame.
pub const FRAME_START: u8 = 0x0F;
/// Trailing sentinel marking the end of a frame.
pub const FRAME_SENTINEL: [u8; 2] = [0xFF, 0xFF];
/// Smallest possible frame: start, length, code, reserved, checksum, sentinel.
pub const MIN_FRAME_SIZE: usize = 7;
/// Largest payload the one-byte length field can describe.
pub const MAX_PAYLOAD_SIZE: usize = 254;
/// Fragment size used by the plug when pushing notifications (BLE ATT payload).
pub const FRAGMENT_SIZE: usize = 20;

// ============================================================================
// Command / Notification Codes
// ============================================================================

/// Synchronize the device clock.
pub const CODE_SET_DATE_TIME: u8 = 0x01;
/// Switch the relay.
pub const CODE_POWER_SWITCH: u8 = 0x03;
/// Set the overload power limit.
pub const CODE_SET_POWER_LIMIT: u8 = 0x05;
/// Start or reset the countdown timer.
pub const CODE_SET_TIMER: u8 = 0x08;
/// Query the countdown timer.
pub const CODE_REQUEST_TIMER_STATUS: u8 = 0x09;
/// Settings group (LED, prices, reduced period).
pub const CODE_SETTINGS: u8 = 0x0F;
/// Query the settings snapshot.
pub const CODE_REQUEST_SETTINGS: u8 = 0x10;
/// Add, edit or remove a scheduler slot.
pub const CODE_SET_SCHEDULER: u8 = 0x13;
/// Query one page of scheduler slots.
pub const CODE_REQUEST_SCHEDULER: u8 = 0x14;
/// PIN group (authorize, change, reset).
pub const CODE_PIN: u8 = 0x17;

// ============================================================================
// Sub-codes
// ============================================================================

/// [`CODE_PIN`]: log in with the current PIN.
pub const PIN_AUTHORIZE: u8 = 0x00;
/// [`CODE_PIN`]: reset the PIN to the factory default.
pub const PIN_RESET: u8 = 0x01;
/// [`CODE_PIN`]: replace the current PIN.
pub const PIN_CHANGE: u8 = 0x20;

/// [`CODE_SETTINGS`]: reduced tariff period.
pub const SETTINGS_REDUCED_PERIOD: u8 = 0x01;
/// [`CODE_SETTINGS`]: normal and reduced prices.
pub const SETTINGS_PRICES: u8 = 0x04;
/// [`CODE_SETTINGS`]: status LED.
pub const SETTINGS_LED: u8 = 0x05;

/// [`CODE_SET_SCHEDULER`]: add into a free slot.
pub const SCHEDULER_ADD: u8 = 0x00;
/// [`CODE_SET_SCHEDULER`]: overwrite an existing slot.
pub const SCHEDULER_EDIT: u8 = 0x01;
/// [`CODE_SET_SCHEDULER`]: clear an existing slot.
pub const SCHEDULER_REMOVE: u8 = 0x02;

/// [`CODE_SET_TIMER`]: cancel a running timer.
pub const TIMER_MODE_RESET: u8 = 0x00;
/// [`CODE_SET_TIMER`]: switch on when the timer fires.
pub const TIMER_MODE_TURN_ON: u8 = 0x01;
/// [`CODE_SET_TIMER`]: switch off when the timer fires.
pub const TIMER_MODE_TURN_OFF: u8 = 0x02;

/// Status byte of a successful confirmation.
pub const STATUS_OK: u8 = 0x00;
/// Status byte of a rejected command.
pub const STATUS_FAILED: u8 = 0x01;

// ============================================================================
// Sizes
// ============================================================================

/// Number of digits in a PIN.
pub const PIN_LENGTH: usize = 4;
/// PIN the plug falls back to after a reset.
pub const DEFAULT_PIN: &str = "0000";
/// Scheduler slots reported per page.
pub const SCHEDULERS_PER_PAGE: usize = 4;
/// Encoded size of one scheduler body.
pub const SCHEDULER_SIZE: usize = 9;
/// Encoded size of one scheduler page entry (slot id + scheduler).
pub const SCHEDULER_ENTRY_SIZE: usize = 1 + SCHEDULER_SIZE;
/// Last valid minute of the day.
pub const MAX_MINUTE_OF_DAY: u16 = 24 * 60 - 1;
/// Scheduler years are sent as an offset from this year.
pub const SCHEDULER_BASE_YEAR: u16 = 2000;
