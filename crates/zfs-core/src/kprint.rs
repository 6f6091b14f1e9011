//! Leveled stderr logging for the libzfs boundary.
//!
//! # Environment Variables
//!
//! - `ZFS_LOG_LEVEL=<level>` - off|error|warn|info|debug|trace or 0-5 (default: warn)
//! - `ZFS_FLUSH_EPRINT=1` - flush stderr after every line
//!
//! # Usage
//!
//! ```ignore
//! use zfs_core::{kdebug, kwarn};
//!
//! kdebug!("ioctl", "growing inbound buffer to {} bytes", n);
//! kwarn!("mnttab", "no entry for device {}", dev);
//! ```
//!
//! Every line carries a short component tag: `zfs[ioctl] DEBUG ...`.

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::env::{env_get_bool, env_get_str};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    fn from_raw(v: u8) -> Self {
        match v {
            0 => LogLevel::Off,
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// Parse a level name or digit; `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.trim().to_ascii_lowercase().as_str() {
            "off" | "0" => LogLevel::Off,
            "error" | "1" => LogLevel::Error,
            "warn" | "2" => LogLevel::Warn,
            "info" | "3" => LogLevel::Info,
            "debug" | "4" => LogLevel::Debug,
            "trace" | "5" => LogLevel::Trace,
            _ => return None,
        })
    }

    fn label(self) -> &'static str {
        match self {
            LogLevel::Off => "",
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

static LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Warn as u8);
static FLUSH: AtomicBool = AtomicBool::new(false);
static LOADED: AtomicBool = AtomicBool::new(false);

/// Read `ZFS_LOG_LEVEL` / `ZFS_FLUSH_EPRINT` once. Later calls are no-ops.
pub fn init() {
    if LOADED.swap(true, Ordering::SeqCst) {
        return;
    }
    if let Some(level) = LogLevel::parse(&env_get_str("ZFS_LOG_LEVEL", "warn")) {
        LEVEL.store(level as u8, Ordering::Relaxed);
    }
    FLUSH.store(env_get_bool("ZFS_FLUSH_EPRINT", false), Ordering::Relaxed);
}

pub fn log_level() -> LogLevel {
    if !LOADED.load(Ordering::Relaxed) {
        init();
    }
    LogLevel::from_raw(LEVEL.load(Ordering::Relaxed))
}

/// Override the level, e.g. from a `-v` flag.
pub fn set_log_level(level: LogLevel) {
    LOADED.store(true, Ordering::SeqCst);
    LEVEL.store(level as u8, Ordering::Relaxed);
}

#[inline]
pub fn enabled(level: LogLevel) -> bool {
    level != LogLevel::Off && level <= log_level()
}

/// Write one full line to stderr under the stderr lock.
pub fn write_line(line: &str) {
    let stderr = std::io::stderr();
    let mut out = stderr.lock();
    let _ = out.write_all(line.as_bytes());
    let _ = out.write_all(b"\n");
    if FLUSH.load(Ordering::Relaxed) {
        let _ = out.flush();
    }
}

#[doc(hidden)]
pub fn _klog_impl(level: LogLevel, tag: &str, args: std::fmt::Arguments<'_>) {
    if !enabled(level) {
        return;
    }
    write_line(&format!("zfs[{}] {} {}", tag, level.label(), args));
}

#[macro_export]
macro_rules! kerror {
    ($tag:expr, $($arg:tt)*) => {
        $crate::kprint::_klog_impl($crate::kprint::LogLevel::Error, $tag, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! kwarn {
    ($tag:expr, $($arg:tt)*) => {
        $crate::kprint::_klog_impl($crate::kprint::LogLevel::Warn, $tag, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! kinfo {
    ($tag:expr, $($arg:tt)*) => {
        $crate::kprint::_klog_impl($crate::kprint::LogLevel::Info, $tag, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! kdebug {
    ($tag:expr, $($arg:tt)*) => {
        $crate::kprint::_klog_impl($crate::kprint::LogLevel::Debug, $tag, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! ktrace {
    ($tag:expr, $($arg:tt)*) => {
        $crate::kprint::_klog_impl($crate::kprint::LogLevel::Trace, $tag, format_args!($($arg)*))
    };
}
