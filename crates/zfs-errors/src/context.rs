use std::fmt;

use nix::errno::Errno;

use crate::code::{ZfsErrorCode, NO_ERROR_TEXT};
use crate::error::ZfsError;
use crate::text::BoundedText;
use crate::translate::{translate, CallClass};

/// The last-error slot of one administration handle.
///
/// `record_error` is the only operation that changes `code` and `action`.
/// Auxiliary text is staged by `set_auxiliary` and consumed by the next
/// record; a record with nothing staged clears the auxiliary text. The
/// accessors never mutate.
///
/// ```
/// use zfs_errors::{CallClass, ErrorContext, ZfsErrorCode};
/// use nix::errno::Errno;
///
/// let mut ctx = ErrorContext::new();
/// let err = ctx.report(CallClass::Dataset, Errno::ENOENT, "cannot open 'tank/a'");
/// assert_eq!(err.code(), ZfsErrorCode::NoEnt);
/// assert_eq!(ctx.describe(), "dataset does not exist");
/// ```
#[derive(Debug, Clone)]
pub struct ErrorContext {
    code: Option<ZfsErrorCode>,
    action: BoundedText,
    auxiliary: BoundedText,
    staged: Option<BoundedText>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            code: None,
            action: BoundedText::slot(),
            auxiliary: BoundedText::slot(),
            staged: None,
        }
    }

    // ── Mutation ──────────────────────────────────────────────────

    /// Stage an explanation for the next recorded error.
    ///
    /// Replaces anything staged earlier and not yet consumed.
    pub fn set_auxiliary(&mut self, text: impl fmt::Display) {
        let mut staged = BoundedText::slot();
        staged.set(text);
        self.staged = Some(staged);
    }

    /// Record `code` as the current error, consuming any staged auxiliary.
    pub fn record_error(&mut self, code: ZfsErrorCode, action: impl fmt::Display) -> ZfsError {
        self.action.set(action);
        self.code = Some(code);
        match self.staged.take() {
            Some(staged) => self.auxiliary = staged,
            None => self.auxiliary.clear(),
        }
        self.snapshot(code)
    }

    /// Translate an OS failure for `class` and record it.
    ///
    /// Stages the table's canned explanation (or the OS text for unmapped
    /// errnos) ahead of recording. Caller-staged text is replaced only when
    /// the table has something of its own to say.
    pub fn report(&mut self, class: CallClass, errno: Errno, action: impl fmt::Display) -> ZfsError {
        let t = translate(class, errno);
        if let Some(aux) = t.auxiliary {
            self.set_auxiliary(aux);
        }
        self.record_error(t.code, action)
    }

    // ── Accessors ─────────────────────────────────────────────────

    /// The last recorded code, `None` before the first error.
    #[inline]
    pub fn code(&self) -> Option<ZfsErrorCode> {
        self.code
    }

    /// Raw numeric form of [`code`](Self::code); 0 before the first error.
    pub fn errno(&self) -> i32 {
        self.code.map_or(0, ZfsErrorCode::as_raw)
    }

    /// What was being attempted when the last error was recorded.
    pub fn action(&self) -> &str {
        self.action.as_str()
    }

    /// Best available explanation of the last error.
    pub fn describe(&self) -> &str {
        if !self.auxiliary.is_empty() {
            return self.auxiliary.as_str();
        }
        self.code.map_or(NO_ERROR_TEXT, ZfsErrorCode::description)
    }

    /// True while staged text waits for the next record.
    pub fn auxiliary_active(&self) -> bool {
        self.staged.is_some()
    }

    fn snapshot(&self, code: ZfsErrorCode) -> ZfsError {
        ZfsError::new(code, self.action.as_str(), self.describe())
    }
}
