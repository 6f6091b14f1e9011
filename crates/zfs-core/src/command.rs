//! The command structure exchanged with the kernel.
//!
//! A [`ZfsCommand`] owns at most one outbound buffer (request payload, read
//! by the responder) and one inbound buffer (response payload, written by
//! the responder). The inbound size field is writable by the responder: on
//! the insufficient-buffer signal it holds the size the responder needs.
//!
//! Buffers live exactly as long as the command or until [`release`]
//! (`ZfsCommand::release`), whichever comes first.

use std::fmt;

/// Inbound size used when the caller asks for 0 bytes.
pub const DEFAULT_DST_SIZE: usize = 2048;

/// Index of a privileged request in the kernel's ioctl table.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZfsIoc(pub u32);

impl fmt::Debug for ZfsIoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ZfsIoc({:#x})", self.0)
    }
}

#[derive(Debug, Default)]
pub struct ZfsCommand {
    /// Dataset or pool the request targets.
    pub name: String,
    pub value: String,
    /// Iteration cursor for list-style requests.
    pub cookie: u64,
    pub guid: u64,
    pub objset_type: u64,
    pub(crate) src: Option<Vec<u8>>,
    pub(crate) dst: Option<Vec<u8>>,
    pub(crate) dst_size: u64,
    pub(crate) history: Option<String>,
}

impl ZfsCommand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    // ── Outbound ──────────────────────────────────────────────────

    pub fn outbound(&self) -> Option<&[u8]> {
        self.src.as_deref()
    }

    pub fn src_size(&self) -> u64 {
        self.src.as_ref().map_or(0, |b| b.len() as u64)
    }

    pub fn set_outbound(&mut self, bytes: Vec<u8>) {
        self.src = Some(bytes);
    }

    // ── Inbound ───────────────────────────────────────────────────

    /// The whole inbound buffer as allocated.
    pub fn inbound(&self) -> Option<&[u8]> {
        self.dst.as_deref()
    }

    /// Writable view for the responder.
    pub fn inbound_mut(&mut self) -> Option<&mut [u8]> {
        self.dst.as_deref_mut()
    }

    /// The bytes the responder reports as valid.
    pub fn inbound_data(&self) -> Option<&[u8]> {
        let buf = self.dst.as_deref()?;
        let n = usize::try_from(self.dst_size).unwrap_or(usize::MAX).min(buf.len());
        Some(&buf[..n])
    }

    pub fn dst_size(&self) -> u64 {
        self.dst_size
    }

    /// Responder side: record the filled (or required) inbound size.
    pub fn set_dst_size(&mut self, size: u64) {
        self.dst_size = size;
    }

    /// Move the inbound buffer out, truncated to the reported size.
    pub fn take_inbound(&mut self) -> Option<Vec<u8>> {
        let mut buf = self.dst.take()?;
        let n = usize::try_from(self.dst_size).unwrap_or(usize::MAX).min(buf.len());
        buf.truncate(n);
        self.dst_size = 0;
        Some(buf)
    }

    pub(crate) fn attach_inbound(&mut self, buf: Vec<u8>) {
        self.dst_size = buf.len() as u64;
        self.dst = Some(buf);
    }

    // ── Journal ───────────────────────────────────────────────────

    /// Journal string riding along with this call, if any.
    pub fn history(&self) -> Option<&str> {
        self.history.as_deref()
    }

    /// Free both buffers. Idempotent.
    pub fn release(&mut self) {
        self.src = None;
        self.dst = None;
        self.dst_size = 0;
    }
}
