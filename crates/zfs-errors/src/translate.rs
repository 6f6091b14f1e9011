//! errno → domain code translation.
//!
//! Three tables: a shared one consulted first for every call class, then
//! the dataset or pool table. Anything a table does not name becomes
//! [`ZfsErrorCode::Unknown`] with the OS's own message as auxiliary text,
//! so nothing the kernel said is dropped.

use nix::errno::Errno;

use crate::code::ZfsErrorCode;

/// Which family of privileged operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallClass {
    /// Only the shared mapping applies.
    Generic,
    /// Filesystem, volume and snapshot operations.
    Dataset,
    /// Pool-wide operations (create, import, configuration, vdevs).
    Pool,
}

/// Result of classifying one OS error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translation {
    pub code: ZfsErrorCode,
    /// Canned explanation to stage before recording, if the table has one.
    pub auxiliary: Option<&'static str>,
}

impl Translation {
    const fn bare(code: ZfsErrorCode) -> Self {
        Self { code, auxiliary: None }
    }

    const fn with_aux(code: ZfsErrorCode, text: &'static str) -> Self {
        Self { code, auxiliary: Some(text) }
    }

    fn unknown(errno: Errno) -> Self {
        Self::with_aux(ZfsErrorCode::Unknown, errno.desc())
    }
}

// ── Canned auxiliary texts ────────────────────────────────────────

pub const DATASET_NOT_FOUND: &str = "dataset does not exist";
pub const DATASET_EXISTS: &str = "dataset already exists";
pub const DATASET_BUSY: &str = "dataset is busy";
pub const SNAPSHOT_PERMS_READONLY: &str = "snapshot permissions cannot be modified";
pub const POOL_NOT_FOUND: &str = "no such pool or dataset";
pub const POOL_EXISTS: &str = "pool already exists";
pub const POOL_BUSY: &str = "pool is busy";
pub const DEVICES_UNAVAILABLE: &str = "one or more devices is currently unavailable";

/// Classify `errno` for the given call class.
pub fn translate(class: CallClass, errno: Errno) -> Translation {
    if let Some(shared) = translate_shared(errno) {
        return shared;
    }
    match class {
        CallClass::Generic => Translation::unknown(errno),
        CallClass::Dataset => translate_dataset(errno),
        CallClass::Pool => translate_pool(errno),
    }
}

/// Raw-integer convenience for callers holding a C-style errno.
pub fn translate_raw(class: CallClass, errno: i32) -> Translation {
    translate(class, Errno::from_raw(errno))
}

fn translate_shared(errno: Errno) -> Option<Translation> {
    let code = match errno {
        Errno::EPERM | Errno::EACCES => ZfsErrorCode::Perm,
        Errno::ECANCELED => ZfsErrorCode::NoDelegation,
        Errno::EIO => ZfsErrorCode::Io,
        Errno::EINTR => ZfsErrorCode::Intr,
        _ => return None,
    };
    Some(Translation::bare(code))
}

fn translate_dataset(errno: Errno) -> Translation {
    use ZfsErrorCode::*;
    match errno {
        Errno::ENXIO => Translation::bare(Io),
        Errno::ENOENT => Translation::with_aux(NoEnt, DATASET_NOT_FOUND),
        Errno::ENOSPC | Errno::EDQUOT => Translation::bare(NoSpc),
        Errno::EEXIST => Translation::with_aux(Exists, DATASET_EXISTS),
        Errno::EBUSY => Translation::with_aux(Busy, DATASET_BUSY),
        Errno::EROFS => Translation::with_aux(PermReadonly, SNAPSHOT_PERMS_READONLY),
        Errno::ENAMETOOLONG => Translation::bare(NameTooLong),
        other => Translation::unknown(other),
    }
}

fn translate_pool(errno: Errno) -> Translation {
    use ZfsErrorCode::*;
    match errno {
        Errno::ENODEV => Translation::bare(NoDevice),
        Errno::ENOENT => Translation::with_aux(NoEnt, POOL_NOT_FOUND),
        Errno::EEXIST => Translation::with_aux(Exists, POOL_EXISTS),
        // Busy pools report Exists; callers match on that value.
        Errno::EBUSY => Translation::with_aux(Exists, POOL_BUSY),
        Errno::ENXIO => Translation::with_aux(BadDev, DEVICES_UNAVAILABLE),
        Errno::ENAMETOOLONG => Translation::bare(DevOverflow),
        e if e == Errno::ENOTSUP => Translation::bare(PoolNotSup),
        Errno::EINVAL => Translation::bare(PoolInvalArg),
        Errno::ENOSPC | Errno::EDQUOT => Translation::bare(NoSpc),
        other => Translation::unknown(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLASSES: [CallClass; 3] = [CallClass::Generic, CallClass::Dataset, CallClass::Pool];

    #[test]
    fn shared_codes_ignore_class() {
        let shared = [
            (Errno::EPERM, ZfsErrorCode::Perm),
            (Errno::EACCES, ZfsErrorCode::Perm),
            (Errno::ECANCELED, ZfsErrorCode::NoDelegation),
            (Errno::EIO, ZfsErrorCode::Io),
            (Errno::EINTR, ZfsErrorCode::Intr),
        ];
        for (errno, expected) in shared {
            for class in CLASSES {
                let t = translate(class, errno);
                assert_eq!(t.code, expected, "{:?} in {:?}", errno, class);
                assert_eq!(t.auxiliary, None);
            }
        }
    }

    #[test]
    fn dataset_table() {
        let t = translate(CallClass::Dataset, Errno::ENOENT);
        assert_eq!(t, Translation::with_aux(ZfsErrorCode::NoEnt, "dataset does not exist"));

        assert_eq!(translate(CallClass::Dataset, Errno::ENXIO).code, ZfsErrorCode::Io);
        assert_eq!(translate(CallClass::Dataset, Errno::EDQUOT).code, ZfsErrorCode::NoSpc);
        assert_eq!(translate(CallClass::Dataset, Errno::ENOSPC).auxiliary, None);
        assert_eq!(
            translate(CallClass::Dataset, Errno::EEXIST).auxiliary,
            Some("dataset already exists")
        );
        assert_eq!(translate(CallClass::Dataset, Errno::EBUSY).code, ZfsErrorCode::Busy);
        assert_eq!(
            translate(CallClass::Dataset, Errno::EROFS),
            Translation::with_aux(
                ZfsErrorCode::PermReadonly,
                "snapshot permissions cannot be modified"
            )
        );
        assert_eq!(
            translate(CallClass::Dataset, Errno::ENAMETOOLONG).code,
            ZfsErrorCode::NameTooLong
        );
    }

    #[test]
    fn pool_table() {
        assert_eq!(translate(CallClass::Pool, Errno::ENODEV).code, ZfsErrorCode::NoDevice);
        assert_eq!(
            translate(CallClass::Pool, Errno::ENOENT).auxiliary,
            Some("no such pool or dataset")
        );
        assert_eq!(
            translate(CallClass::Pool, Errno::EEXIST),
            Translation::with_aux(ZfsErrorCode::Exists, "pool already exists")
        );
        assert_eq!(
            translate(CallClass::Pool, Errno::ENXIO),
            Translation::with_aux(
                ZfsErrorCode::BadDev,
                "one or more devices is currently unavailable"
            )
        );
        assert_eq!(
            translate(CallClass::Pool, Errno::ENAMETOOLONG).code,
            ZfsErrorCode::DevOverflow
        );
        assert_eq!(translate(CallClass::Pool, Errno::ENOTSUP).code, ZfsErrorCode::PoolNotSup);
        assert_eq!(translate(CallClass::Pool, Errno::EINVAL).code, ZfsErrorCode::PoolInvalArg);
        assert_eq!(translate(CallClass::Pool, Errno::EDQUOT).code, ZfsErrorCode::NoSpc);
    }

    #[test]
    fn pool_busy_collapses_into_exists() {
        // Known quirk, kept on purpose: there is no distinct busy code here.
        let t = translate(CallClass::Pool, Errno::EBUSY);
        assert_eq!(t.code, ZfsErrorCode::Exists);
        assert_ne!(t.code, ZfsErrorCode::Busy);
        assert_eq!(t.auxiliary, Some("pool is busy"));
    }

    #[test]
    fn unmapped_errno_is_unknown_with_os_text() {
        for class in CLASSES {
            let t = translate(class, Errno::EMLINK);
            assert_eq!(t.code, ZfsErrorCode::Unknown);
            assert_eq!(t.auxiliary, Some(Errno::EMLINK.desc()));
        }
        // EINVAL is only meaningful to the pool table.
        assert_eq!(translate(CallClass::Dataset, Errno::EINVAL).code, ZfsErrorCode::Unknown);
        assert_eq!(translate(CallClass::Generic, Errno::ENOENT).code, ZfsErrorCode::Unknown);
    }

    #[test]
    fn raw_errno_matches_typed() {
        assert_eq!(
            translate_raw(CallClass::Pool, libc::EBUSY),
            translate(CallClass::Pool, Errno::EBUSY)
        );
    }
}
