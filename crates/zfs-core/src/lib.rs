//! # zfs-core: command exchange with the ZFS kernel module
//!
//! Everything between "I want to ask the kernel something" and "here is a
//! recorded, readable error":
//!
//! - [`ZfsCommand`]: the in/out structure with its owned buffers
//! - [`Channel`]: the privileged call, swappable for tests
//! - [`LibzfsHandle`]: error slot, journal, buffer manager, invoker
//! - [`LibzfsHandle::call_with_growable_buffer`]: the one-regrow retry
//!
//! The kernel-facing `Channel` lives in `zfs-module`; this crate has no
//! `unsafe` and never opens a device.
//!
//! ## Design principle
//!
//! An errno is translated exactly once, by whoever saw it fail, through
//! [`LibzfsHandle::report`]. Layers above read domain codes only.

pub mod kprint;
pub mod env;
pub mod config;
pub mod diag;
pub mod buffer;
pub mod command;
pub mod channel;
pub mod codec;
pub mod handle;
pub mod exchange;
pub mod nicenum;
pub mod proptable;

#[cfg(any(test, feature = "testing"))]
pub mod mock;

pub use channel::Channel;
pub use codec::{CodecError, OpaqueCodec, PackedCodec};
pub use command::{ZfsCommand, ZfsIoc, DEFAULT_DST_SIZE};
pub use config::{FatalPolicy, HandleConfig};
pub use diag::{CaptureSink, DiagnosticSink, StderrSink};
pub use exchange::{ExchangeError, GrowState};
pub use handle::LibzfsHandle;
pub use nicenum::nicenum;

pub use zfs_errors::{CallClass, ZfsError, ZfsErrorCode, ZfsResult};
