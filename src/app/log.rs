use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::util::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

static MIN_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => crate::bail!(Config, "unknown log level {}", s),
        })
    }
}

pub fn set_level(level: LogLevel) {
    MIN_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn enabled(level: LogLevel) -> bool {
    level as u8 >= MIN_LEVEL.load(Ordering::Relaxed)
}

pub fn manual(level: LogLevel, message: &str) {
    if !enabled(level) {
        return;
    }
    let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");
    if level >= LogLevel::Warn {
        eprintln!("{} {} {}", timestamp, level, message);
    } else {
        println!("{} {} {}", timestamp, level, message);
    }
}

#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        $crate::app::log::manual($crate::app::log::LogLevel::Trace, &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::app::log::manual($crate::app::log::LogLevel::Debug, &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::app::log::manual($crate::app::log::LogLevel::Info, &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::app::log::manual($crate::app::log::LogLevel::Warn, &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::app::log::manual($crate::app::log::LogLevel::Error, &format!($($arg)*));
    };
}
