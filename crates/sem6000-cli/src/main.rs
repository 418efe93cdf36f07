//! Command line client for the SEM6000 smart plug.
//!
//! # Usage
//!
//! List plugs in range (requires the `ble` feature):
//! ```bash
//! sem6000 discover
//! ```
//!
//! Switch a plug through a TCP bridge:
//! ```bash
//! sem6000 --tcp 192.168.1.20:4000 --pin 1234 power-on
//! ```
//!
//! Try the commands against the built-in simulated plug:
//! ```bash
//! sem6000 --simulate --debug request-settings
//! ```

mod report;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use chrono::{Datelike, Local, NaiveDate, Timelike};
use clap::{Args, Parser, Subcommand};
use sem6000_session::convert::{parse_bool, parse_time_of_day};
use sem6000_session::protocol::{Notification, Scheduler};
use sem6000_session::{
    ConfigError, Session, SessionConfig, SessionError, SimulatedPlug, TcpTransport, Transport,
    TransportError,
};
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sem6000", version, about = "Control a SEM6000 smart plug", long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log sent and received frames
    #[arg(long, global = true)]
    debug: bool,

    /// Seconds to wait for each answer
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Bluetooth address of the plug (needs the `ble` feature)
    #[arg(long, global = true, conflicts_with_all = ["tcp", "simulate"])]
    address: Option<String>,

    /// HOST:PORT of a TCP bridge to the plug
    #[arg(long, global = true, conflicts_with = "simulate")]
    tcp: Option<String>,

    /// Talk to an in-process simulated plug
    #[arg(long, global = true)]
    simulate: bool,

    /// Four-digit PIN (default from config, else 0000)
    #[arg(long, global = true)]
    pin: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan for plugs and print name and address
    Discover,
    /// Change the PIN
    ChangePin {
        /// New four-digit PIN
        new_pin: String,
    },
    /// Reset the PIN to 0000
    ResetPin,
    /// Switch the relay on
    PowerOn,
    /// Switch the relay off
    PowerOff,
    /// Switch the LED on
    LedOn,
    /// Switch the LED off
    LedOff,
    /// Set the plug clock
    SetDateTime {
        /// ISO 8601 date-time, e.g. 2024-03-09T14:05:00
        datetime: String,
    },
    /// Set the plug clock to local time
    SynchronizeDateTime,
    /// Print the settings
    RequestSettings,
    /// Set the overload limit
    SetPowerLimit {
        /// Limit in watts, 0 disables
        watts: u16,
    },
    /// Set the energy prices
    SetPrices {
        /// Normal price in cents
        normal_cents: u16,
        /// Reduced price in cents
        reduced_cents: u16,
    },
    /// Configure the reduced tariff period
    SetReducedPeriod {
        /// true|on|1 enables the period
        active: String,
        /// Start, HH:MM
        start: String,
        /// End, HH:MM
        end: String,
    },
    /// Print the countdown timer
    RequestTimerStatus,
    /// Start the countdown timer
    SetTimer {
        /// true|on|1 switches on when the timer fires, anything else off
        action: String,
        /// Delay, HH:MM[:SS]
        delay: String,
    },
    /// Cancel the countdown timer
    ResetTimer,
    /// Print all scheduler slots
    RequestScheduler,
    /// Add a scheduler
    AddScheduler(SchedulerArgs),
    /// Replace the scheduler in a slot
    EditScheduler {
        /// Slot id as printed by request-scheduler
        slot: u8,
        #[command(flatten)]
        scheduler: SchedulerArgs,
    },
    /// Clear a scheduler slot
    RemoveScheduler {
        /// Slot id as printed by request-scheduler
        slot: u8,
    },
}

#[derive(Args, Debug)]
struct SchedulerArgs {
    /// true|on|1 enables the scheduler
    active: String,
    /// true|on|1 switches on, anything else off
    action: String,
    /// Time of day, HH:MM
    time: String,
    /// Repeat on these weekdays (0 = Sunday .. 6 = Saturday), comma separated
    #[arg(long, value_delimiter = ',')]
    weekdays: Vec<u8>,
    /// Date for a one-shot scheduler, YYYY-MM-DD (default today)
    #[arg(long)]
    date: Option<String>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("no plug selected; use --address, --tcp or --simulate")]
    NoTarget,

    #[error("this build has no Bluetooth support; rebuild with --features ble")]
    BleUnavailable,

    #[error("JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<SessionConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => SessionConfig::from_yaml_file(path)?,
        None => SessionConfig::default(),
    };
    if let Some(pin) = &cli.pin {
        config.pin = pin.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    Ok(config)
}

#[cfg(feature = "ble")]
fn connect_ble(address: &str, config: &SessionConfig) -> Result<Box<dyn Transport>, CliError> {
    Ok(Box::new(sem6000_session::BleTransport::connect(
        address,
        config.scan_timeout(),
    )?))
}

#[cfg(not(feature = "ble"))]
fn connect_ble(_address: &str, _config: &SessionConfig) -> Result<Box<dyn Transport>, CliError> {
    Err(CliError::BleUnavailable)
}

#[cfg(feature = "ble")]
fn discover(timeout: Duration) -> Result<Vec<sem6000_session::DiscoveredDevice>, CliError> {
    use sem6000_session::Discover;
    Ok(sem6000_session::BleScanner::new()?.discover(timeout)?)
}

#[cfg(not(feature = "ble"))]
fn discover(_timeout: Duration) -> Result<Vec<sem6000_session::DiscoveredDevice>, CliError> {
    Err(TransportError::DiscoveryUnsupported.into())
}

fn open_transport(cli: &Cli, config: &SessionConfig) -> Result<Box<dyn Transport>, CliError> {
    if cli.simulate {
        info!("Using simulated plug");
        return Ok(Box::new(SimulatedPlug::new().with_pin(config.pin.clone())));
    }
    if let Some(addr) = &cli.tcp {
        return Ok(Box::new(TcpTransport::connect(addr.as_str())?));
    }
    if let Some(address) = &cli.address {
        return connect_ble(address, config);
    }
    Err(CliError::NoTarget)
}

fn build_scheduler(args: &SchedulerArgs) -> Result<Scheduler, CliError> {
    let time = parse_time_of_day("time", &args.time)?;
    let date = match &args.date {
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
            SessionError::InvalidArgument {
                name: "date",
                reason: format!("{:?} is not YYYY-MM-DD ({})", value, e),
            }
        })?,
        None => Local::now().date_naive(),
    };
    let year = u16::try_from(date.year()).map_err(|_| SessionError::InvalidArgument {
        name: "date",
        reason: format!("{} is out of range", date),
    })?;

    let scheduler = Scheduler::new(
        parse_bool(&args.active),
        parse_bool(&args.action),
        args.weekdays.iter().copied(),
        year,
        date.month() as u8,
        date.day() as u8,
        time.hour() as u8,
        time.minute() as u8,
    )
    .map_err(SessionError::Validation)?;
    Ok(scheduler)
}

fn print_confirmation(notification: &Notification, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(notification)?);
    } else {
        debug!("{}", notification);
    }
    Ok(())
}

fn execute<T: Transport>(
    session: &mut Session<T>,
    command: &Commands,
    json: bool,
) -> Result<(), CliError> {
    if !matches!(command, Commands::ResetPin | Commands::Discover) {
        session.authorize()?;
    }

    let confirmation = match command {
        Commands::Discover => return Ok(()),
        Commands::ChangePin { new_pin } => session.change_pin(new_pin)?,
        Commands::ResetPin => session.reset_pin()?,
        Commands::PowerOn => session.power_on()?,
        Commands::PowerOff => session.power_off()?,
        Commands::LedOn => session.led_on()?,
        Commands::LedOff => session.led_off()?,
        Commands::SetDateTime { datetime } => session.set_date_time_iso(datetime)?,
        Commands::SynchronizeDateTime => session.synchronize_date_time()?,
        Commands::SetPowerLimit { watts } => session.set_power_limit(*watts)?,
        Commands::SetPrices {
            normal_cents,
            reduced_cents,
        } => session.set_prices(*normal_cents, *reduced_cents)?,
        Commands::SetReducedPeriod { active, start, end } => {
            session.set_reduced_period(parse_bool(active), start, end)?
        }
        Commands::SetTimer { action, delay } => session.set_timer(parse_bool(action), delay)?,
        Commands::ResetTimer => session.reset_timer()?,
        Commands::AddScheduler(args) => session.add_scheduler(build_scheduler(args)?)?,
        Commands::EditScheduler { slot, scheduler } => {
            session.edit_scheduler(*slot, build_scheduler(scheduler)?)?
        }
        Commands::RemoveScheduler { slot } => session.remove_scheduler(*slot)?,

        Commands::RequestSettings => {
            let settings = session.request_settings()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                print!("{}", report::SettingsReport(&settings));
            }
            return Ok(());
        }
        Commands::RequestTimerStatus => {
            let status = session.request_timer_status()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print!(
                    "{}",
                    report::TimerReport {
                        status: &status,
                        now: Local::now().naive_local(),
                    }
                );
            }
            return Ok(());
        }
        Commands::RequestScheduler => {
            let page = session.request_scheduler()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&page)?);
            } else {
                print!("{}", report::SchedulerReport(&page));
            }
            return Ok(());
        }
    };

    print_confirmation(&confirmation, json)
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;

    if let Commands::Discover = cli.command {
        for device in discover(config.scan_timeout())? {
            println!("{}\t{}", device.name, device.address);
        }
        return Ok(());
    }

    let transport = open_transport(&cli, &config)?;
    let mut session = Session::new(transport, &config);
    execute(&mut session, &cli.command, cli.json)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use sem6000_session::protocol::ProtocolError;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scheduler_args() {
        let cli = Cli::try_parse_from([
            "sem6000",
            "--simulate",
            "add-scheduler",
            "on",
            "true",
            "07:30",
            "--weekdays",
            "1,2,3",
        ])
        .unwrap();
        let Commands::AddScheduler(args) = &cli.command else {
            panic!("expected add-scheduler");
        };
        let scheduler = build_scheduler(args).unwrap();
        assert!(scheduler.active);
        assert!(scheduler.turn_on);
        assert_eq!(scheduler.hour, 7);
        assert_eq!(scheduler.minute, 30);
        assert_eq!(scheduler.repeat_weekdays.len(), 3);
    }

    #[test]
    fn test_invalid_weekday_is_validation_error() {
        let args = SchedulerArgs {
            active: "1".to_string(),
            action: "0".to_string(),
            time: "07:30".to_string(),
            weekdays: vec![7],
            date: Some("2024-01-01".to_string()),
        };
        assert!(matches!(
            build_scheduler(&args),
            Err(CliError::Session(SessionError::Validation(
                ProtocolError::InvalidWeekday(7)
            )))
        ));
    }

    #[test]
    fn test_simulated_run() {
        let cli = Cli::try_parse_from(["sem6000", "--simulate", "--pin", "1234", "power-on"]).unwrap();
        run(cli).unwrap();
    }

    #[test]
    fn test_missing_target() {
        let cli = Cli::try_parse_from(["sem6000", "power-on"]).unwrap();
        assert!(matches!(run(cli), Err(CliError::NoTarget)));
    }

    #[test]
    fn test_config_overrides() {
        let cli = Cli::try_parse_from(["sem6000", "--timeout", "3", "--pin", "4711", "reset-pin"]).unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.pin, "4711");
        assert_eq!(config.timeout(), Duration::from_secs(3));
    }
}
