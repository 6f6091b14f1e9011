//! Zero-initialised heap buffers for the command exchange.
//!
//! Allocation failure is reported as `None` instead of aborting, so the
//! caller can record it as a domain `NoMem`.

/// Allocate `len` zero bytes, or `None` if the allocator refuses.
pub fn zeroed(len: usize) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).ok()?;
    buf.resize(len, 0);
    Some(buf)
}

/// Convert a responder-written size to an allocation length.
pub fn size_to_len(size: u64) -> Option<usize> {
    usize::try_from(size).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_is_zeroed() {
        let b = zeroed(2048).unwrap();
        assert_eq!(b.len(), 2048);
        assert!(b.iter().all(|&x| x == 0));
    }

    #[test]
    fn zero_length_is_fine() {
        assert_eq!(zeroed(0).unwrap().len(), 0);
    }

    #[test]
    fn absurd_length_fails_softly() {
        assert!(zeroed(usize::MAX).is_none());
    }
}
