//! Raw bindings to the ZFS control device.
//!
//! Mirrors the leading fields of the kernel's `zfs_cmd_t`. The trailing
//! records (share, objset stats, stream header, inject record) are not
//! interpreted here and live in an opaque tail that is larger than any
//! known kernel layout, so copy-out never writes past the allocation.

use zfs_core::ZfsIoc;

pub const MAXPATHLEN: usize = 1024;
pub const MAXNAMELEN: usize = 256;

const ZC_TAIL_LEN: usize = 16 * 1024;

// ── ioctl ──

/// All requests are `('Z' << 8) | index`.
pub const ZFS_IOC_BASE: u32 = (b'Z' as u32) << 8;

pub const ZFS_IOC_POOL_CREATE: ZfsIoc = ZfsIoc(0);
pub const ZFS_IOC_POOL_DESTROY: ZfsIoc = ZfsIoc(1);
pub const ZFS_IOC_POOL_IMPORT: ZfsIoc = ZfsIoc(2);
pub const ZFS_IOC_POOL_EXPORT: ZfsIoc = ZfsIoc(3);
pub const ZFS_IOC_POOL_CONFIGS: ZfsIoc = ZfsIoc(4);
pub const ZFS_IOC_POOL_STATS: ZfsIoc = ZfsIoc(5);
pub const ZFS_IOC_POOL_TRYIMPORT: ZfsIoc = ZfsIoc(6);
pub const ZFS_IOC_POOL_SCRUB: ZfsIoc = ZfsIoc(7);
pub const ZFS_IOC_POOL_FREEZE: ZfsIoc = ZfsIoc(8);
pub const ZFS_IOC_POOL_UPGRADE: ZfsIoc = ZfsIoc(9);
pub const ZFS_IOC_POOL_GET_HISTORY: ZfsIoc = ZfsIoc(10);

#[inline]
pub fn request_number(ioc: ZfsIoc) -> u32 {
    ZFS_IOC_BASE | ioc.0
}

// ── Command structure ──

#[repr(C)]
pub struct ZfsCmdRaw {
    pub zc_name: [u8; MAXPATHLEN],
    pub zc_value: [u8; MAXPATHLEN * 2],
    pub zc_string: [u8; MAXNAMELEN],
    pub zc_guid: u64,
    pub zc_nvlist_conf: u64,
    pub zc_nvlist_conf_size: u64,
    pub zc_nvlist_src: u64,
    pub zc_nvlist_src_size: u64,
    pub zc_nvlist_dst: u64,
    pub zc_nvlist_dst_size: u64,
    pub zc_cookie: u64,
    pub zc_objset_type: u64,
    pub zc_perm_action: u64,
    pub zc_history: u64,
    pub zc_history_len: u64,
    pub zc_history_offset: u64,
    pub zc_obj: u64,
    pub _tail: [u8; ZC_TAIL_LEN],
}

impl ZfsCmdRaw {
    /// Heap-allocated and zeroed; the structure is too large for the stack.
    pub fn boxed() -> Box<Self> {
        Box::new(Self {
            zc_name: [0; MAXPATHLEN],
            zc_value: [0; MAXPATHLEN * 2],
            zc_string: [0; MAXNAMELEN],
            zc_guid: 0,
            zc_nvlist_conf: 0,
            zc_nvlist_conf_size: 0,
            zc_nvlist_src: 0,
            zc_nvlist_src_size: 0,
            zc_nvlist_dst: 0,
            zc_nvlist_dst_size: 0,
            zc_cookie: 0,
            zc_objset_type: 0,
            zc_perm_action: 0,
            zc_history: 0,
            zc_history_len: 0,
            zc_history_offset: 0,
            zc_obj: 0,
            _tail: [0; ZC_TAIL_LEN],
        })
    }
}

/// Copy `s` into a fixed NUL-terminated field. `None` if it does not fit
/// or contains a NUL.
pub fn put_cstr(field: &mut [u8], s: &str) -> Option<()> {
    let bytes = s.as_bytes();
    if bytes.len() >= field.len() || bytes.contains(&0) {
        return None;
    }
    field[..bytes.len()].copy_from_slice(bytes);
    field[bytes.len()..].fill(0);
    Some(())
}

/// Read a NUL-terminated field back, lossily.
pub fn get_cstr(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}
