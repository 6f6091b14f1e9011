//! Calls whose response size is unknown up front.
//!
//! The caller guesses an inbound size. If the responder answers with the
//! insufficient-buffer signal (`ENOMEM`) it has written the size it needs
//! into the command; the buffer is regrown once to that size and the call
//! repeated. A second `ENOMEM` is a hard failure.
//!
//! ```text
//!   Sized ──ENOMEM──▶ NeedsGrowth ──grow──▶ Retried ──ENOMEM──▶ BufferTooSmall
//!     │                                       │
//!     └──ok/other──▶ done                     └──ok/other──▶ done
//! ```

use std::fmt;

use nix::errno::Errno;
use thiserror::Error;
use zfs_errors::{CallClass, ZfsError, ZfsErrorCode};

use crate::channel::Channel;
use crate::command::{ZfsCommand, ZfsIoc};
use crate::handle::LibzfsHandle;
use crate::kdebug;

#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Allocation failed; `NoMem` is already recorded on the handle.
    #[error(transparent)]
    Alloc(#[from] ZfsError),

    #[error("ioctl failed: {}", .0.desc())]
    Ioctl(Errno),

    #[error("inbound buffer still too small after growth (responder wants {required} bytes)")]
    BufferTooSmall { required: u64 },
}

impl ExchangeError {
    /// The OS error behind this failure, if there is one.
    pub fn errno(&self) -> Option<Errno> {
        match self {
            ExchangeError::Alloc(_) => None,
            ExchangeError::Ioctl(e) => Some(*e),
            ExchangeError::BufferTooSmall { .. } => Some(Errno::ENOMEM),
        }
    }
}

/// Growth state of one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowState {
    /// First attempt with the caller's size.
    Sized,
    /// Responder asked for more; regrow before the next attempt.
    NeedsGrowth,
    /// Already regrown once.
    Retried,
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Grow,
    Fail,
    TooSmall,
}

impl GrowState {
    pub fn after_failure(self, errno: Errno) -> (GrowState, Step) {
        match (self, errno) {
            (GrowState::Sized, Errno::ENOMEM) => (GrowState::NeedsGrowth, Step::Grow),
            (GrowState::Retried, Errno::ENOMEM) => (GrowState::Retried, Step::TooSmall),
            (state, _) => (state, Step::Fail),
        }
    }

    /// The state once the inbound buffer has been regrown.
    pub fn grown(self) -> GrowState {
        match self {
            GrowState::NeedsGrowth => GrowState::Retried,
            other => other,
        }
    }
}

impl<C: Channel> LibzfsHandle<C> {
    /// Issue `request` with an inbound buffer of `initial_size` bytes
    /// (0 for the default), growing it at most once.
    pub fn call_with_growable_buffer(
        &mut self,
        request: ZfsIoc,
        cmd: &mut ZfsCommand,
        initial_size: usize,
    ) -> Result<(), ExchangeError> {
        self.allocate_inbound(cmd, initial_size)?;

        let mut state = GrowState::Sized;
        loop {
            let errno = match self.ioctl(request, cmd) {
                Ok(()) => return Ok(()),
                Err(e) => e,
            };

            let (next, step) = state.after_failure(errno);
            match step {
                Step::Grow => {
                    kdebug!(
                        "exchange",
                        "{:?} on '{}': responder needs {} bytes",
                        request,
                        cmd.name,
                        cmd.dst_size()
                    );
                    state = next;
                    self.grow_inbound(cmd)?;
                    state = state.grown();
                }
                Step::TooSmall => {
                    return Err(ExchangeError::BufferTooSmall { required: cmd.dst_size() });
                }
                Step::Fail => return Err(ExchangeError::Ioctl(errno)),
            }
        }
    }

    /// Record an exchange failure in the error context.
    ///
    /// Allocation failures were recorded when they happened and are passed
    /// through; OS failures are translated for `class`. A buffer that is
    /// still too small after growth is recorded as `NoSpc`, never as one of
    /// the fatal codes.
    pub fn report_exchange(
        &mut self,
        class: CallClass,
        err: ExchangeError,
        action: impl fmt::Display,
    ) -> ZfsError {
        match err {
            ExchangeError::Alloc(e) => e,
            ExchangeError::BufferTooSmall { required } => {
                self.set_auxiliary(format_args!(
                    "inbound buffer still too small (need {} bytes)",
                    required
                ));
                self.error(ZfsErrorCode::NoSpc, action)
            }
            ExchangeError::Ioctl(errno) => self.report(class, errno, action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FatalPolicy, HandleConfig};
    use crate::diag::CaptureSink;
    use crate::mock::{MockChannel, Reply};

    const POOL_CONFIGS: ZfsIoc = ZfsIoc(4);

    fn handle(script: Vec<Reply>) -> LibzfsHandle<MockChannel> {
        let config = HandleConfig::new().fatal_policy(FatalPolicy::Return);
        LibzfsHandle::new(MockChannel::with_script(script), config)
    }

    #[test]
    fn state_machine_transitions() {
        assert_eq!(
            GrowState::Sized.after_failure(Errno::ENOMEM),
            (GrowState::NeedsGrowth, Step::Grow)
        );
        assert_eq!(
            GrowState::Retried.after_failure(Errno::ENOMEM),
            (GrowState::Retried, Step::TooSmall)
        );
        assert_eq!(GrowState::Sized.after_failure(Errno::EPERM).1, Step::Fail);
        assert_eq!(GrowState::Retried.after_failure(Errno::EIO).1, Step::Fail);
        assert_eq!(GrowState::NeedsGrowth.grown(), GrowState::Retried);
        assert_eq!(GrowState::Sized.grown(), GrowState::Sized);
    }

    #[test]
    fn first_try_success() {
        let mut h = handle(vec![Reply::Data(vec![1; 100])]);
        let mut cmd = ZfsCommand::default();
        h.call_with_growable_buffer(POOL_CONFIGS, &mut cmd, 0).unwrap();
        assert_eq!(cmd.dst_size(), 100);
        assert_eq!(h.channel().calls().len(), 1);
        assert_eq!(h.channel().calls()[0].inbound_len, Some(2048));
    }

    #[test]
    fn grows_once_from_2048_to_9000() {
        let mut h = handle(vec![Reply::NeedSize(9000), Reply::Data(vec![7; 9000])]);
        let mut cmd = ZfsCommand::default();
        h.call_with_growable_buffer(POOL_CONFIGS, &mut cmd, 0).unwrap();

        let seen: Vec<_> = h.channel().calls().iter().map(|c| c.inbound_len).collect();
        assert_eq!(seen, vec![Some(2048), Some(9000)]);
        assert_eq!(cmd.inbound_data().unwrap().len(), 9000);
    }

    #[test]
    fn second_enomem_is_hard_failure_without_third_allocation() {
        let mut h = handle(vec![
            Reply::NeedSize(9000),
            Reply::NeedSize(20_000),
            Reply::Data(vec![0; 20_000]),
        ]);
        let mut cmd = ZfsCommand::default();
        let err = h.call_with_growable_buffer(POOL_CONFIGS, &mut cmd, 0).unwrap_err();

        assert!(matches!(err, ExchangeError::BufferTooSmall { required: 20_000 }));
        assert_eq!(err.errno(), Some(Errno::ENOMEM));
        assert_eq!(h.channel().calls().len(), 2);
        assert_eq!(h.channel().remaining(), 1);
        // Still the 9000-byte buffer, never a third one.
        assert_eq!(cmd.inbound().unwrap().len(), 9000);
    }

    #[test]
    fn too_small_after_growth_is_reported_not_trapped() {
        let sink = CaptureSink::new();
        let config = HandleConfig::new().print_on_error(true).fatal_policy(FatalPolicy::Return);
        let mut h = LibzfsHandle::new(
            MockChannel::with_script(vec![Reply::NeedSize(9000), Reply::NeedSize(20_000)]),
            config,
        )
        .with_sink(sink.clone());
        let mut cmd = ZfsCommand::default();
        let err = h.call_with_growable_buffer(POOL_CONFIGS, &mut cmd, 0).unwrap_err();

        let z = h.report_exchange(CallClass::Pool, err, "cannot list pools");
        assert_eq!(z.code(), ZfsErrorCode::NoSpc);
        assert_eq!(z.code().fatality(), None);
        assert_eq!(h.describe(), "inbound buffer still too small (need 20000 bytes)");
        assert_eq!(
            sink.lines(),
            vec!["cannot list pools: inbound buffer still too small (need 20000 bytes)"]
        );
        assert!(sink.lines().iter().all(|l| !l.starts_with("internal error:")));
    }

    #[test]
    fn other_errors_pass_through_raw() {
        let mut h = handle(vec![Reply::NeedSize(4096), Reply::Fail(Errno::ENOENT)]);
        let mut cmd = ZfsCommand::new("tank");
        let err = h.call_with_growable_buffer(POOL_CONFIGS, &mut cmd, 0).unwrap_err();
        assert!(matches!(err, ExchangeError::Ioctl(Errno::ENOENT)));
        assert_eq!(h.code(), None);

        let z = h.report_exchange(CallClass::Pool, err, "cannot open 'tank'");
        assert_eq!(z.code(), ZfsErrorCode::NoEnt);
        assert_eq!(h.describe(), "no such pool or dataset");
    }

    #[test]
    fn growth_allocation_failure_is_no_memory() {
        let mut h = handle(vec![Reply::NeedSize(u64::MAX)]);
        let mut cmd = ZfsCommand::default();
        let err = h.call_with_growable_buffer(POOL_CONFIGS, &mut cmd, 0).unwrap_err();
        let z = h.report_exchange(CallClass::Pool, err, "ignored");
        assert_eq!(z.code(), ZfsErrorCode::NoMem);
        assert_eq!(h.action(), "internal error");
    }

    #[test]
    fn journal_rides_only_the_first_attempt() {
        let mut h = handle(vec![Reply::NeedSize(4096), Reply::Ok]);
        h.log_history("zpool import tank");
        let mut cmd = ZfsCommand::default();
        h.call_with_growable_buffer(POOL_CONFIGS, &mut cmd, 1024).unwrap();
        let calls = h.channel().calls();
        assert_eq!(calls[0].history.as_deref(), Some("zpool import tank"));
        assert_eq!(calls[0].inbound_len, Some(1024));
        assert_eq!(calls[1].history, None);
    }
}
