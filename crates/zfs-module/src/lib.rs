//! # zfs-module: the kernel side of libzfs
//!
//! Concrete implementations behind the `zfs-core` seams:
//!
//! | Piece         | Provides                                     |
//! |---------------|----------------------------------------------|
//! | `DevChannel`  | `Channel` over `ioctl(2)` on `/dev/zfs`      |
//! | `open`        | handle lifecycle from a `HandleConfig`       |
//! | `resolve_path`| path → mounted dataset via the mount table   |
//!
//! Everything `unsafe` in the workspace is in [`dev_channel`].

pub mod zfs_sys;
pub mod dev_channel;
pub mod open;
pub mod mnttab;

pub use dev_channel::DevChannel;
pub use mnttab::{parse_mnttab, resolve_path, DatasetRef, MntEntry, ResolveError};
pub use open::{open, open_from_env, DevHandle, OpenError};
