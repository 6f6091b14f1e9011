//! The closed libzfs error taxonomy.
//!
//! Numeric values start at 2000 and follow declaration order, so a code
//! printed as a number can be read back with [`ZfsErrorCode::from_raw`].
//! Every member carries a fixed default description used when no
//! auxiliary text was recorded with the error.

use std::fmt;

/// Text returned by `describe()` before any error has been recorded.
pub const NO_ERROR_TEXT: &str = "no error";

/// Domain error code returned to every layer above the syscall boundary.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ZfsErrorCode {
    NoMem = 2000,
    BadProp,
    PropReadonly,
    PropType,
    PropNonInherit,
    PropSpace,
    BadType,
    Busy,
    Exists,
    NoEnt,
    BadStream,
    DsReadonly,
    VolTooBig,
    VolHasData,
    InvalidName,
    BadRestore,
    BadBackup,
    BadTarget,
    NoDevice,
    BadDev,
    NoReplicas,
    Resilvering,
    BadVersion,
    PoolUnavail,
    DevOverflow,
    BadPath,
    CrossTarget,
    Zoned,
    MountFailed,
    UmountFailed,
    UnshareNfsFailed,
    ShareNfsFailed,
    DevLinks,
    Perm,
    NoSpc,
    Io,
    Intr,
    IsSpare,
    InvalConfig,
    Recursive,
    NoHistory,
    UnshareIscsiFailed,
    ShareIscsiFailed,
    PoolProps,
    PoolNotSup,
    PoolInvalArg,
    NameTooLong,
    OpenFailed,
    NoCap,
    LabelFailed,
    IscsiSvcUnavail,
    BadWho,
    BadPerm,
    BadPermSet,
    NoDelegation,
    PermReadonly,
    Unknown,
}

/// How a code behaves when the handle echoes errors and is configured to
/// stop the process on fatal codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fatality {
    /// "Should not happen" trap: print the internal-error line, then abort.
    Abort,
    /// Memory exhaustion: print the normal line, then exit(1).
    Exit,
}

impl ZfsErrorCode {
    /// Every member, in numeric order.
    pub const ALL: [ZfsErrorCode; 57] = [
        Self::NoMem, Self::BadProp, Self::PropReadonly, Self::PropType,
        Self::PropNonInherit, Self::PropSpace, Self::BadType, Self::Busy,
        Self::Exists, Self::NoEnt, Self::BadStream, Self::DsReadonly,
        Self::VolTooBig, Self::VolHasData, Self::InvalidName, Self::BadRestore,
        Self::BadBackup, Self::BadTarget, Self::NoDevice, Self::BadDev,
        Self::NoReplicas, Self::Resilvering, Self::BadVersion, Self::PoolUnavail,
        Self::DevOverflow, Self::BadPath, Self::CrossTarget, Self::Zoned,
        Self::MountFailed, Self::UmountFailed, Self::UnshareNfsFailed,
        Self::ShareNfsFailed, Self::DevLinks, Self::Perm, Self::NoSpc, Self::Io,
        Self::Intr, Self::IsSpare, Self::InvalConfig, Self::Recursive,
        Self::NoHistory, Self::UnshareIscsiFailed, Self::ShareIscsiFailed,
        Self::PoolProps, Self::PoolNotSup, Self::PoolInvalArg, Self::NameTooLong,
        Self::OpenFailed, Self::NoCap, Self::LabelFailed, Self::IscsiSvcUnavail,
        Self::BadWho, Self::BadPerm, Self::BadPermSet, Self::NoDelegation,
        Self::PermReadonly, Self::Unknown,
    ];

    #[inline]
    pub fn as_raw(self) -> i32 {
        self as i32
    }

    /// Look a numeric code back up. Returns `None` outside the taxonomy.
    pub fn from_raw(raw: i32) -> Option<Self> {
        let idx = raw.checked_sub(Self::NoMem as i32)?;
        Self::ALL.get(usize::try_from(idx).ok()?).copied()
    }

    /// Fixed default description, used when no auxiliary text was staged.
    pub fn description(self) -> &'static str {
        use ZfsErrorCode::*;
        match self {
            NoMem => "out of memory",
            BadProp => "invalid property value",
            PropReadonly => "read only property",
            PropType => "property doesn't apply to datasets of this type",
            PropNonInherit => "property cannot be inherited",
            PropSpace => "invalid quota or reservation",
            BadType => "operation not applicable to datasets of this type",
            Busy => "pool or dataset is busy",
            Exists => "pool or dataset exists",
            NoEnt => "no such pool or dataset",
            BadStream => "invalid backup stream",
            DsReadonly => "dataset is read only",
            VolTooBig => "volume size exceeds limit for this system",
            VolHasData => "volume has data",
            InvalidName => "invalid name",
            BadRestore => "unable to restore to destination",
            BadBackup => "backup failed",
            BadTarget => "invalid target vdev",
            NoDevice => "no such device in pool",
            BadDev => "invalid device",
            NoReplicas => "no valid replicas",
            Resilvering => "currently resilvering",
            BadVersion => "unsupported version",
            PoolUnavail => "pool is unavailable",
            DevOverflow => "too many devices in one vdev",
            BadPath => "must be an absolute path",
            CrossTarget => "operation crosses datasets or pools",
            Zoned => "dataset in use by local zone",
            MountFailed => "mount failed",
            UmountFailed => "umount failed",
            UnshareNfsFailed => "unshare(1M) failed",
            ShareNfsFailed => "share(1M) failed",
            DevLinks => "failed to create /dev links",
            Perm => "permission denied",
            NoSpc => "out of space",
            Io => "I/O error",
            Intr => "signal received",
            IsSpare => "device is reserved as a hot spare",
            InvalConfig => "invalid vdev configuration",
            Recursive => "recursive dataset dependency",
            NoHistory => "no history available",
            UnshareIscsiFailed => "iscsitgtd failed request to unshare",
            ShareIscsiFailed => "iscsitgtd failed request to share",
            PoolProps => "failed to retrieve pool properties",
            PoolNotSup => "operation not supported on this type of pool",
            PoolInvalArg => "invalid argument for this pool operation",
            NameTooLong => "dataset name is too long",
            OpenFailed => "open failed",
            NoCap => "disk capacity information could not be retrieved",
            LabelFailed => "write of label failed",
            IscsiSvcUnavail => {
                "iscsitgt service need to be enabled by a privileged user"
            }
            BadWho => "invalid user/group",
            BadPerm => "invalid permission",
            BadPermSet => "invalid permission set name",
            NoDelegation => "delegated administration is disabled on pool",
            PermReadonly => "snapshot permissions cannot be modified",
            Unknown => "unknown error",
        }
    }

    /// `Some` for the two codes that stop the process in echo mode.
    pub fn fatality(self) -> Option<Fatality> {
        match self {
            ZfsErrorCode::Unknown => Some(Fatality::Abort),
            ZfsErrorCode::NoMem => Some(Fatality::Exit),
            _ => None,
        }
    }
}

impl fmt::Display for ZfsErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
