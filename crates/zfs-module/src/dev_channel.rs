//! `DevChannel`, the default `Channel` over `ioctl(2)` on `/dev/zfs`.
//!
//! Each call marshals a [`ZfsCommand`] into a fresh `zfs_cmd_t`, issues the
//! request, and copies back the fields the kernel may write: name, value,
//! cookie, guid, objset type and the inbound size. Buffers are passed by
//! address; the kernel writes the inbound buffer in place.

use std::ffi::CString;
use std::fs::File;
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use zfs_core::{kdebug, ktrace, Channel, ZfsCommand, ZfsIoc};

use crate::zfs_sys::{get_cstr, put_cstr, request_number, ZfsCmdRaw};

#[derive(Debug)]
pub struct DevChannel {
    file: File,
    path: PathBuf,
}

impl DevChannel {
    /// Open the control device read/write, close-on-exec.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_CLOEXEC)
            .open(path)?;
        kdebug!("dev", "opened {} (fd {})", path.display(), file.as_raw_fd());
        Ok(Self { file, path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Channel for DevChannel {
    fn ioctl(&mut self, request: ZfsIoc, cmd: &mut ZfsCommand) -> Result<(), Errno> {
        let mut raw = ZfsCmdRaw::boxed();
        put_cstr(&mut raw.zc_name, &cmd.name).ok_or(Errno::ENAMETOOLONG)?;
        put_cstr(&mut raw.zc_value, &cmd.value).ok_or(Errno::ENAMETOOLONG)?;
        raw.zc_guid = cmd.guid;
        raw.zc_cookie = cmd.cookie;
        raw.zc_objset_type = cmd.objset_type;

        // Keep the journal string alive across the call.
        let history = cmd
            .history()
            .map(CString::new)
            .transpose()
            .map_err(|_| Errno::EINVAL)?;
        if let Some(h) = &history {
            raw.zc_history = h.as_ptr() as u64;
        }

        if let Some(src) = cmd.outbound() {
            raw.zc_nvlist_src = src.as_ptr() as u64;
            raw.zc_nvlist_src_size = src.len() as u64;
        }
        if let Some(dst) = cmd.inbound_mut() {
            raw.zc_nvlist_dst = dst.as_mut_ptr() as u64;
            raw.zc_nvlist_dst_size = dst.len() as u64;
        }

        ktrace!("dev", "{:?} name='{}' src={} dst={}", request, cmd.name,
            raw.zc_nvlist_src_size, raw.zc_nvlist_dst_size);

        // Safety: `raw` is a live, exclusively borrowed zfs_cmd_t sized past
        // any kernel layout. The buffer addresses in it belong to `cmd` and
        // `history`, both of which outlive the call and are not otherwise
        // touched until it returns.
        let rc = unsafe {
            libc::ioctl(
                self.file.as_raw_fd(),
                request_number(request) as _,
                &mut *raw as *mut ZfsCmdRaw,
            )
        };
        let result = Errno::result(rc).map(drop);

        cmd.name = get_cstr(&raw.zc_name);
        cmd.value = get_cstr(&raw.zc_value);
        cmd.guid = raw.zc_guid;
        cmd.cookie = raw.zc_cookie;
        cmd.objset_type = raw.zc_objset_type;
        cmd.set_dst_size(raw.zc_nvlist_dst_size);
        drop(history);

        result
    }
}
