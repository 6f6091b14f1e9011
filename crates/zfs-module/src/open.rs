//! Handle lifecycle: open the control device and the tables next to it.

use std::fs::File;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use zfs_core::{kdebug, kprint, HandleConfig, LibzfsHandle};

use crate::dev_channel::DevChannel;

#[derive(Debug, Error)]
pub enum OpenError {
    #[error("invalid configuration: {0}")]
    Config(&'static str),

    #[error("cannot open {}: {source}", .path.display())]
    Device { path: PathBuf, source: io::Error },

    #[error("cannot open mount table {}: {source}", .path.display())]
    Mnttab { path: PathBuf, source: io::Error },
}

pub type DevHandle = LibzfsHandle<DevChannel>;

/// Open a handle on the configured control device.
///
/// The mount table must be readable; the share table is optional.
pub fn open(config: HandleConfig) -> Result<DevHandle, OpenError> {
    config.validate().map_err(OpenError::Config)?;

    let channel = DevChannel::open(&config.dev_path).map_err(|source| OpenError::Device {
        path: config.dev_path.clone(),
        source,
    })?;

    File::open(&config.mnttab_path).map_err(|source| OpenError::Mnttab {
        path: config.mnttab_path.clone(),
        source,
    })?;

    let sharetab = File::open(&config.sharetab_path).ok();
    kdebug!(
        "open",
        "handle on {} (mnttab {}, sharetab {})",
        config.dev_path.display(),
        config.mnttab_path.display(),
        if sharetab.is_some() { "present" } else { "absent" }
    );

    let mut handle = LibzfsHandle::new(channel, config);
    if let Some(f) = sharetab {
        handle.attach_sharetab(f);
    }
    Ok(handle)
}

/// [`open`] with configuration and log level taken from the environment.
pub fn open_from_env() -> Result<DevHandle, OpenError> {
    kprint::init();
    open(HandleConfig::from_env())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::errno::Errno;
    use zfs_core::{ZfsCommand, ZfsIoc};

    fn scratch(name: &str, contents: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!("zfs-open-{}-{}", std::process::id(), name));
        std::fs::write(&p, contents).unwrap();
        p
    }

    #[test]
    fn invalid_config_rejected() {
        let err = open(HandleConfig::new().default_dst_size(0)).unwrap_err();
        assert!(matches!(err, OpenError::Config(_)));
    }

    #[test]
    fn missing_device() {
        let err = open(HandleConfig::new().dev_path("/nonexistent/zfs")).unwrap_err();
        assert!(matches!(err, OpenError::Device { .. }));
        assert!(err.to_string().starts_with("cannot open /nonexistent/zfs"));
    }

    #[test]
    fn missing_mnttab() {
        let cfg = HandleConfig::new().dev_path("/dev/null").mnttab_path("/nonexistent/mnttab");
        assert!(matches!(open(cfg), Err(OpenError::Mnttab { .. })));
    }

    #[test]
    fn sharetab_is_optional() {
        let mnttab = scratch("mnttab", "");
        let cfg = HandleConfig::new()
            .dev_path("/dev/null")
            .mnttab_path(&mnttab)
            .sharetab_path("/nonexistent/sharetab");
        let h = open(cfg).unwrap();
        assert!(h.sharetab().is_none());
        h.close();

        let sharetab = scratch("sharetab", "");
        let cfg = HandleConfig::new().dev_path("/dev/null").mnttab_path(&mnttab).sharetab_path(&sharetab);
        let h = open(cfg).unwrap();
        assert!(h.sharetab().is_some());
        h.close();

        std::fs::remove_file(mnttab).ok();
        std::fs::remove_file(sharetab).ok();
    }

    #[test]
    fn calls_on_non_zfs_device_fail_raw() {
        let mnttab = scratch("mnttab-raw", "");
        let mut h = open(HandleConfig::new().dev_path("/dev/null").mnttab_path(&mnttab)).unwrap();
        let mut cmd = ZfsCommand::new("tank");
        let err = h.ioctl(ZfsIoc(5), &mut cmd).unwrap_err();
        assert_ne!(err, Errno::ENOMEM);
        assert_eq!(h.code(), None);
        std::fs::remove_file(mnttab).ok();
    }
}
