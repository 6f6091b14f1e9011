//! The privileged call itself.
//!
//! A `Channel` performs one request against the kernel (or a stand-in) and
//! reports the raw OS result. It never translates errors; that is the
//! handle's job, once, at the point of failure.
//!
//! # Implementors
//!
//! - `DevChannel` (zfs-module): `ioctl(2)` on an open `/dev/zfs`.
//! - `MockChannel` (feature = "testing"): scripted responses for tests.

use nix::errno::Errno;

use crate::command::{ZfsCommand, ZfsIoc};

pub trait Channel {
    /// Issue `request` with `cmd` as the in/out argument.
    ///
    /// On `Err(Errno::ENOMEM)` the implementation must leave the required
    /// inbound size in `cmd.dst_size()`.
    fn ioctl(&mut self, request: ZfsIoc, cmd: &mut ZfsCommand) -> Result<(), Errno>;
}

impl<C: Channel + ?Sized> Channel for &mut C {
    fn ioctl(&mut self, request: ZfsIoc, cmd: &mut ZfsCommand) -> Result<(), Errno> {
        (**self).ioctl(request, cmd)
    }
}

impl<C: Channel + ?Sized> Channel for Box<C> {
    fn ioctl(&mut self, request: ZfsIoc, cmd: &mut ZfsCommand) -> Result<(), Errno> {
        (**self).ioctl(request, cmd)
    }
}
