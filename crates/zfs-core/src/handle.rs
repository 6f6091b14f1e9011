//! `LibzfsHandle`: one administration session.
//!
//! The handle owns the channel to the kernel, the last-error slot, the
//! pending journal string and the echo settings. Every privileged call and
//! every recorded error goes through `&mut self`, so one handle is never
//! mutated from two threads at once without an outer lock.

use std::fmt;
use std::fs::File;

use nix::errno::Errno;
use zfs_errors::{CallClass, ErrorContext, Fatality, ZfsError, ZfsErrorCode, ZfsResult};

use crate::buffer::{size_to_len, zeroed};
use crate::channel::Channel;
use crate::codec::PackedCodec;
use crate::command::{ZfsCommand, ZfsIoc};
use crate::config::{FatalPolicy, HandleConfig};
use crate::diag::{DiagnosticSink, StderrSink};
use crate::{kdebug, kerror, ktrace};

const NO_MEMORY_ACTION: &str = "internal error";

pub struct LibzfsHandle<C: Channel> {
    channel: C,
    errors: ErrorContext,
    journal: Option<String>,
    config: HandleConfig,
    print_on_error: bool,
    sink: Box<dyn DiagnosticSink>,
    sharetab: Option<File>,
}

impl<C: Channel> fmt::Debug for LibzfsHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibzfsHandle")
            .field("errors", &self.errors)
            .field("journal", &self.journal)
            .field("config", &self.config)
            .field("print_on_error", &self.print_on_error)
            .field("sharetab", &self.sharetab.is_some())
            .finish_non_exhaustive()
    }
}

impl<C: Channel> LibzfsHandle<C> {
    pub fn new(channel: C, config: HandleConfig) -> Self {
        Self {
            channel,
            errors: ErrorContext::new(),
            journal: None,
            print_on_error: config.print_on_error,
            config,
            sink: Box::new(StderrSink),
            sharetab: None,
        }
    }

    /// Replace the diagnostic sink (stderr by default).
    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn attach_sharetab(&mut self, file: File) {
        self.sharetab = Some(file);
    }

    pub fn sharetab(&self) -> Option<&File> {
        self.sharetab.as_ref()
    }

    pub fn config(&self) -> &HandleConfig {
        &self.config
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Release the channel and the share table.
    pub fn close(self) {
        kdebug!("handle", "closing handle (sharetab open: {})", self.sharetab.is_some());
        drop(self);
    }

    // ── Error context ─────────────────────────────────────────────

    /// Echo every subsequently recorded error to the sink.
    pub fn set_print_on_error(&mut self, on: bool) {
        self.print_on_error = on;
    }

    pub fn print_on_error(&self) -> bool {
        self.print_on_error
    }

    /// Stage an explanation for the next recorded error.
    pub fn set_auxiliary(&mut self, text: impl fmt::Display) {
        self.errors.set_auxiliary(text);
    }

    /// Record a domain error directly.
    pub fn error(&mut self, code: ZfsErrorCode, action: impl fmt::Display) -> ZfsError {
        let err = self.errors.record_error(code, action);
        self.echo(&err);
        err
    }

    /// Translate an OS failure for `class` and record it.
    pub fn report(&mut self, class: CallClass, errno: Errno, action: impl fmt::Display) -> ZfsError {
        let err = self.errors.report(class, errno, action);
        self.echo(&err);
        err
    }

    /// Record `NoMem` with the fixed "internal error" action.
    pub fn no_memory(&mut self) -> ZfsError {
        self.error(ZfsErrorCode::NoMem, NO_MEMORY_ACTION)
    }

    pub fn code(&self) -> Option<ZfsErrorCode> {
        self.errors.code()
    }

    /// Raw numeric form of the last code, 0 before the first error.
    pub fn errno(&self) -> i32 {
        self.errors.errno()
    }

    pub fn action(&self) -> &str {
        self.errors.action()
    }

    pub fn describe(&self) -> &str {
        self.errors.describe()
    }

    pub fn errors(&self) -> &ErrorContext {
        &self.errors
    }

    fn echo(&self, err: &ZfsError) {
        if !self.print_on_error {
            return;
        }
        let terminate = self.config.fatal_policy == FatalPolicy::Terminate;
        match err.code().fatality() {
            Some(Fatality::Abort) => {
                self.sink.emit(&format!("internal error: {}", err.description()));
                if terminate {
                    kerror!("handle", "aborting on internal error");
                    std::process::abort();
                }
            }
            Some(Fatality::Exit) => {
                self.sink.emit(&err.to_string());
                if terminate {
                    std::process::exit(1);
                }
            }
            None => self.sink.emit(&err.to_string()),
        }
    }

    // ── Journal ───────────────────────────────────────────────────

    /// Stage `text` to ride along with the next privileged call.
    pub fn log_history(&mut self, text: impl Into<String>) {
        self.journal = Some(text.into());
    }

    pub fn pending_history(&self) -> Option<&str> {
        self.journal.as_deref()
    }

    // ── Channel invoker ───────────────────────────────────────────

    /// Perform one privileged call, carrying the pending journal string.
    ///
    /// The journal is gone from both the handle and `cmd` afterwards,
    /// whatever the outcome. The OS result is returned untranslated.
    pub fn ioctl(&mut self, request: ZfsIoc, cmd: &mut ZfsCommand) -> Result<(), Errno> {
        if let Some(history) = self.journal.take() {
            ktrace!("ioctl", "{:?}: attaching history ({} bytes)", request, history.len());
            cmd.history = Some(history);
        }
        let rc = self.channel.ioctl(request, cmd);
        cmd.history = None;
        if let Err(e) = rc {
            ktrace!("ioctl", "{:?} on '{}' failed: {}", request, cmd.name, e);
        }
        rc
    }

    // ── Buffer manager ────────────────────────────────────────────

    /// Attach a zeroed inbound buffer of `n` bytes (0 means the default).
    ///
    /// On failure `NoMem` is recorded and no inbound buffer is attached.
    pub fn allocate_inbound(&mut self, cmd: &mut ZfsCommand, n: usize) -> ZfsResult<()> {
        let len = if n == 0 { self.config.default_dst_size } else { n };
        cmd.dst = None;
        cmd.dst_size = 0;
        match zeroed(len) {
            Some(buf) => {
                cmd.attach_inbound(buf);
                Ok(())
            }
            None => Err(self.no_memory()),
        }
    }

    /// Replace the inbound buffer with one of the size the responder asked
    /// for. Only meaningful after the insufficient-buffer signal.
    pub fn grow_inbound(&mut self, cmd: &mut ZfsCommand) -> ZfsResult<()> {
        let wanted = cmd.dst_size;
        cmd.dst = None;
        kdebug!("buffer", "growing inbound buffer for '{}' to {} bytes", cmd.name, wanted);
        match size_to_len(wanted).and_then(zeroed) {
            Some(buf) => {
                cmd.attach_inbound(buf);
                Ok(())
            }
            None => {
                cmd.dst_size = 0;
                Err(self.no_memory())
            }
        }
    }

    /// Encode `value` and attach it as the outbound buffer.
    ///
    /// Returns the encoded size. Any encoding failure is recorded as `NoMem`.
    pub fn write_outbound<K: PackedCodec>(
        &mut self,
        cmd: &mut ZfsCommand,
        codec: &K,
        value: &K::Value,
    ) -> ZfsResult<usize> {
        match codec.encode(value) {
            Ok(bytes) => {
                let len = bytes.len();
                cmd.set_outbound(bytes);
                Ok(len)
            }
            Err(e) => {
                kdebug!("codec", "encode for '{}' failed: {}", cmd.name, e);
                Err(self.no_memory())
            }
        }
    }

    /// Decode the valid part of the inbound buffer. Failure records `NoMem`.
    pub fn read_inbound<K: PackedCodec>(&mut self, cmd: &ZfsCommand, codec: &K) -> ZfsResult<K::Value> {
        match codec.decode(cmd.inbound_data().unwrap_or(&[])) {
            Ok(v) => Ok(v),
            Err(e) => {
                kdebug!("codec", "decode for '{}' failed: {}", cmd.name, e);
                Err(self.no_memory())
            }
        }
    }
}
