//! Mapping a filesystem path to the dataset mounted there.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::sys::stat::stat;
use thiserror::Error;
use zfs_core::{kdebug, Channel, LibzfsHandle};

pub const MNTTYPE_ZFS: &str = "zfs";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{path}: {}", .errno.desc())]
    Stat { path: String, errno: Errno },

    #[error("'{path}': not a ZFS filesystem")]
    NotZfs { path: String, fstype: String },

    #[error("'{path}': no mount table entry")]
    NotMounted { path: String },

    #[error("cannot read {}: {source}", .mnttab.display())]
    Mnttab { mnttab: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetRef {
    /// Not a path; taken as a dataset name as given.
    Name(String),
    Mounted { dataset: String, mountpoint: PathBuf },
}

impl DatasetRef {
    pub fn dataset(&self) -> &str {
        match self {
            DatasetRef::Name(n) => n,
            DatasetRef::Mounted { dataset, .. } => dataset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MntEntry {
    pub special: String,
    pub mountpoint: String,
    pub fstype: String,
    pub options: String,
}

/// Parse a mount table: `special mountpoint fstype options ...` per line,
/// separated by tabs or spaces, with `\NNN` octal escapes.
pub fn parse_mnttab(text: &str) -> Vec<MntEntry> {
    text.lines()
        .filter(|l| !l.trim().is_empty() && !l.starts_with('#'))
        .filter_map(|line| {
            let mut f = line.split_whitespace().map(unescape);
            Some(MntEntry {
                special: f.next()?,
                mountpoint: f.next()?,
                fstype: f.next()?,
                options: f.next().unwrap_or_default(),
            })
        })
        .collect()
}

fn unescape(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            if let Some(oct) = bytes.get(i + 1..i + 4) {
                if oct.iter().all(|b| (b'0'..=b'7').contains(b)) {
                    let v = oct.iter().fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
                    if let Ok(b) = u8::try_from(v) {
                        out.push(b);
                        i += 4;
                        continue;
                    }
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Whether `path` is meant as a filesystem path rather than a dataset name.
pub fn looks_like_path(path: &str) -> bool {
    path.starts_with('/') || path.starts_with("./")
}

/// Resolve `path` to a dataset.
///
/// Anything not starting with `/` or `./` is returned as a name untouched.
/// A path is matched to the mount table entry whose mount point lives on
/// the same device. Entries stacked on one mount point all stat to the top
/// mount, so the last of them wins.
pub fn resolve_path<C: Channel>(
    handle: &LibzfsHandle<C>,
    path: &str,
) -> Result<DatasetRef, ResolveError> {
    if !looks_like_path(path) {
        return Ok(DatasetRef::Name(path.to_string()));
    }

    let st = stat(Path::new(path)).map_err(|errno| ResolveError::Stat {
        path: path.to_string(),
        errno,
    })?;

    let mnttab = &handle.config().mnttab_path;
    let text = fs::read_to_string(mnttab).map_err(|source| ResolveError::Mnttab {
        mnttab: mnttab.clone(),
        source,
    })?;

    let entry = parse_mnttab(&text)
        .into_iter()
        .filter(|e| stat(Path::new(&e.mountpoint)).map_or(false, |m| m.st_dev == st.st_dev))
        .last();

    let Some(entry) = entry else {
        kdebug!("mnttab", "no entry in {} for device of {}", mnttab.display(), path);
        return Err(ResolveError::NotMounted { path: path.to_string() });
    };

    if entry.fstype != MNTTYPE_ZFS {
        return Err(ResolveError::NotZfs { path: path.to_string(), fstype: entry.fstype });
    }

    Ok(DatasetRef::Mounted {
        dataset: entry.special,
        mountpoint: PathBuf::from(entry.mountpoint),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use zfs_core::mock::MockChannel;
    use zfs_core::HandleConfig;

    fn handle_with_mnttab(name: &str, contents: &str) -> (LibzfsHandle<MockChannel>, PathBuf) {
        let p = std::env::temp_dir().join(format!("zfs-module-{}-{}", std::process::id(), name));
        fs::write(&p, contents).unwrap();
        let h = LibzfsHandle::new(MockChannel::new(), HandleConfig::new().mnttab_path(&p));
        (h, p)
    }

    #[test]
    fn parse_linux_and_illumos_tables() {
        let linux = "rpool/ROOT / zfs rw,xattr 0 0\nproc /proc proc rw 0 0\n";
        let e = parse_mnttab(linux);
        assert_eq!(e.len(), 2);
        assert_eq!(e[0].special, "rpool/ROOT");
        assert_eq!(e[0].fstype, "zfs");
        assert_eq!(e[1].mountpoint, "/proc");

        let illumos = "tank/home\t/export/home\tzfs\trw,devices\t1189792418\n";
        assert_eq!(parse_mnttab(illumos)[0].mountpoint, "/export/home");
    }

    #[test]
    fn parse_unescapes_spaces() {
        let e = parse_mnttab("tank/my\\040data /mnt/my\\040data zfs rw 0 0\n");
        assert_eq!(e[0].special, "tank/my data");
        assert_eq!(e[0].mountpoint, "/mnt/my data");
    }

    #[test]
    fn parse_skips_short_lines() {
        assert!(parse_mnttab("only two\n\n# comment\n").is_empty());
    }

    #[test]
    fn names_are_not_paths() {
        let (h, p) = handle_with_mnttab("names", "");
        assert_eq!(resolve_path(&h, "tank/home").unwrap(), DatasetRef::Name("tank/home".into()));
        assert_eq!(resolve_path(&h, "tank").unwrap().dataset(), "tank");
        fs::remove_file(p).ok();
    }

    #[test]
    fn zfs_mount_resolves() {
        let (h, p) = handle_with_mnttab("zfs", "/nonexistent/dev /nonexistent zfs rw 0 0\nrpool/ROOT / zfs rw 0 0\n");
        let r = resolve_path(&h, "/").unwrap();
        assert_eq!(
            r,
            DatasetRef::Mounted { dataset: "rpool/ROOT".into(), mountpoint: PathBuf::from("/") }
        );
        fs::remove_file(p).ok();
    }

    #[test]
    fn overmounted_root_takes_top_entry() {
        let (h, p) = handle_with_mnttab("stacked", "rootfs / rootfs rw 0 0\nrpool/ROOT / zfs rw 0 0\n");
        assert_eq!(
            resolve_path(&h, "/").unwrap(),
            DatasetRef::Mounted { dataset: "rpool/ROOT".into(), mountpoint: PathBuf::from("/") }
        );
        fs::remove_file(p).ok();

        let (h, p) = handle_with_mnttab("stacked-rev", "rpool/ROOT / zfs rw 0 0\n/dev/sda1 / ext4 rw 0 0\n");
        assert!(matches!(resolve_path(&h, "/"), Err(ResolveError::NotZfs { fstype, .. }) if fstype == "ext4"));
        fs::remove_file(p).ok();
    }

    #[test]
    fn other_fstype_is_not_zfs() {
        let (h, p) = handle_with_mnttab("ext4", "/dev/sda1 / ext4 rw 0 0\n");
        let err = resolve_path(&h, "/").unwrap_err();
        assert!(matches!(err, ResolveError::NotZfs { .. }));
        assert_eq!(err.to_string(), "'/': not a ZFS filesystem");
        fs::remove_file(p).ok();
    }

    #[test]
    fn no_matching_entry() {
        let (h, p) = handle_with_mnttab("none", "/dev/x /nonexistent zfs rw 0 0\n");
        assert!(matches!(resolve_path(&h, "/"), Err(ResolveError::NotMounted { .. })));
        fs::remove_file(p).ok();
    }

    #[test]
    fn stat_failure_message() {
        let (h, p) = handle_with_mnttab("stat", "");
        let err = resolve_path(&h, "/nonexistent/path").unwrap_err();
        assert_eq!(err.to_string(), format!("/nonexistent/path: {}", Errno::ENOENT.desc()));
        fs::remove_file(p).ok();
    }
}
