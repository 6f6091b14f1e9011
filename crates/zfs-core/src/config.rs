//! Handle configuration

use std::path::PathBuf;

use crate::command::DEFAULT_DST_SIZE;
use crate::env::{env_get, env_get_bool, env_get_opt, env_get_str};

cfg_if::cfg_if! {
    if #[cfg(any(target_os = "illumos", target_os = "solaris"))] {
        const DEFAULT_MNTTAB: &str = "/etc/mnttab";
        const DEFAULT_SHARETAB: &str = "/etc/dfs/sharetab";
    } else if #[cfg(target_os = "linux")] {
        const DEFAULT_MNTTAB: &str = "/proc/self/mounts";
        const DEFAULT_SHARETAB: &str = "/etc/dfs/sharetab";
    } else {
        const DEFAULT_MNTTAB: &str = "/etc/mtab";
        const DEFAULT_SHARETAB: &str = "/etc/dfs/sharetab";
    }
}

const DEFAULT_DEV: &str = "/dev/zfs";

/// Upper bound for the default inbound size; anything larger is a typo.
pub const MAX_DEFAULT_DST_SIZE: usize = 64 << 20;

/// What the handle does after echoing a fatal code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalPolicy {
    /// `Unknown` aborts, `NoMem` exits with status 1.
    Terminate,
    /// Record and return like any other error.
    Return,
}

impl FatalPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "terminate" | "abort" => Some(FatalPolicy::Terminate),
            "return" => Some(FatalPolicy::Return),
            _ => None,
        }
    }
}

/// Configuration for a libzfs handle
#[derive(Debug, Clone)]
pub struct HandleConfig {
    /// Control device (default: /dev/zfs)
    pub dev_path: PathBuf,

    /// Mount table read by path resolution
    pub mnttab_path: PathBuf,

    /// Share table; opened if present, absence is fine
    pub sharetab_path: PathBuf,

    /// Echo every recorded error to the diagnostic sink
    pub print_on_error: bool,

    /// Consulted only while echo is on
    pub fatal_policy: FatalPolicy,

    /// Inbound size used when a caller asks for 0 bytes (default: 2048)
    pub default_dst_size: usize,
}

impl Default for HandleConfig {
    fn default() -> Self {
        Self {
            dev_path: PathBuf::from(DEFAULT_DEV),
            mnttab_path: PathBuf::from(DEFAULT_MNTTAB),
            sharetab_path: PathBuf::from(DEFAULT_SHARETAB),
            print_on_error: false,
            fatal_policy: FatalPolicy::Terminate,
            default_dst_size: DEFAULT_DST_SIZE,
        }
    }
}

impl HandleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `ZFS_DEV`, `ZFS_MNTTAB`, `ZFS_SHARETAB`,
    /// `ZFS_PRINT_ERRORS`, `ZFS_FATAL` and `ZFS_DST_SIZE`.
    ///
    /// Unparsable values fall back to the default.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            dev_path: PathBuf::from(env_get_str("ZFS_DEV", DEFAULT_DEV)),
            mnttab_path: PathBuf::from(env_get_str("ZFS_MNTTAB", DEFAULT_MNTTAB)),
            sharetab_path: PathBuf::from(env_get_str("ZFS_SHARETAB", DEFAULT_SHARETAB)),
            print_on_error: env_get_bool("ZFS_PRINT_ERRORS", d.print_on_error),
            fatal_policy: env_get_opt::<String>("ZFS_FATAL")
                .and_then(|s| FatalPolicy::parse(&s))
                .unwrap_or(d.fatal_policy),
            default_dst_size: env_get("ZFS_DST_SIZE", d.default_dst_size),
        }
    }

    pub fn dev_path(mut self, p: impl Into<PathBuf>) -> Self {
        self.dev_path = p.into();
        self
    }

    pub fn mnttab_path(mut self, p: impl Into<PathBuf>) -> Self {
        self.mnttab_path = p.into();
        self
    }

    pub fn sharetab_path(mut self, p: impl Into<PathBuf>) -> Self {
        self.sharetab_path = p.into();
        self
    }

    pub fn print_on_error(mut self, enable: bool) -> Self {
        self.print_on_error = enable;
        self
    }

    pub fn fatal_policy(mut self, policy: FatalPolicy) -> Self {
        self.fatal_policy = policy;
        self
    }

    pub fn default_dst_size(mut self, n: usize) -> Self {
        self.default_dst_size = n;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.default_dst_size == 0 {
            return Err("default_dst_size must be at least 1");
        }
        if self.default_dst_size > MAX_DEFAULT_DST_SIZE {
            return Err("default_dst_size exceeds maximum");
        }
        if self.dev_path.as_os_str().is_empty() {
            return Err("dev_path must not be empty");
        }
        if self.mnttab_path.as_os_str().is_empty() {
            return Err("mnttab_path must not be empty");
        }
        Ok(())
    }
}
