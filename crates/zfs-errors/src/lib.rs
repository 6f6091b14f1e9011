//! # zfs-errors: the libzfs error taxonomy
//!
//! Everything needed to turn a failed privileged call into something a
//! user can read, without touching the kernel:
//!
//! - [`ZfsErrorCode`]: the closed domain taxonomy with default texts
//! - [`translate`]: errno → domain code, per [`CallClass`]
//! - [`ErrorContext`]: the per-handle last-error slot with one-shot
//!   auxiliary text
//! - [`ZfsError`]: the failure value returned to callers
//!
//! Higher layers read domain codes only. An errno is translated once, at
//! the call that failed, and never again.
//!
//! ## Quick Start
//!
//! ```rust
//! use nix::errno::Errno;
//! use zfs_errors::{CallClass, ErrorContext, ZfsErrorCode};
//!
//! let mut ctx = ErrorContext::new();
//! let err = ctx.report(CallClass::Pool, Errno::EBUSY, "cannot export 'tank'");
//! assert_eq!(err.code(), ZfsErrorCode::Exists);
//! assert_eq!(err.to_string(), "cannot export 'tank': pool is busy");
//! ```

mod code;
mod context;
mod error;
mod text;
mod translate;

pub use code::{Fatality, ZfsErrorCode, NO_ERROR_TEXT};
pub use context::ErrorContext;
pub use error::{ZfsError, ZfsResult};
pub use text::{BoundedText, SLOT_LEN};
pub use translate::{translate, translate_raw, CallClass, Translation};

/// Canned auxiliary texts, exposed for callers that match on them.
pub mod canned {
    pub use crate::translate::{
        DATASET_BUSY, DATASET_EXISTS, DATASET_NOT_FOUND, DEVICES_UNAVAILABLE,
        POOL_BUSY, POOL_EXISTS, POOL_NOT_FOUND, SNAPSHOT_PERMS_READONLY,
    };
}
