//! Log level selection and subscriber setup.
//!
//! Library code logs through `tracing` macros. Binaries call [`init_logging`] once
//! to install a formatting subscriber; `RUST_LOG` overrides the chosen level.

use std::fmt;
use std::str::FromStr;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Verbosity levels, from silent to everything.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Nothing = 0,
    User = 1,
    Error = 2,
    Warning = 3,
    #[default]
    Info = 4,
    Debug = 5,
    All = 6,
}

impl LogLevel {
    /// Create a LogLevel from an integer
    pub fn from_i32(level: i32) -> Self {
        match level {
            0 => LogLevel::Nothing,
            1 => LogLevel::User,
            2 => LogLevel::Error,
            3 => LogLevel::Warning,
            4 => LogLevel::Info,
            5 => LogLevel::Debug,
            6 => LogLevel::All,
            _ => LogLevel::Info,
        }
    }

    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    /// The `tracing` filter admitting this level and everything more severe.
    pub fn as_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Nothing => LevelFilter::OFF,
            LogLevel::User | LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::All => LevelFilter::TRACE,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Nothing => "nothing",
            LogLevel::User => "user",
            LogLevel::Error => "error",
            LogLevel::Warning => "warning",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::All => "all",
        };
        f.write_str(name)
    }
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        if let Ok(level) = s.parse::<i32>() {
            if (0..=6).contains(&level) {
                return Ok(LogLevel::from_i32(level));
            }
            anyhow::bail!("Log level {} out of range (0 to 6)", level);
        }
        match s.to_lowercase().as_str() {
            "nothing" | "off" | "none" => Ok(LogLevel::Nothing),
            "user" => Ok(LogLevel::User),
            "error" => Ok(LogLevel::Error),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "all" | "trace" => Ok(LogLevel::All),
            _ => anyhow::bail!(
                "Invalid log level: {}. Valid options: nothing, user, error, warning, info, debug, all",
                s
            ),
        }
    }
}

/// Install the global `tracing` subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init_logging(level: LogLevel) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level.as_filter().into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))
}
