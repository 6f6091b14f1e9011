//! Packed-buffer codec seam.
//!
//! Request and response payloads are packed name/value lists in the kernel's
//! native encoding. The codec is a collaborator: the handle only needs to
//! turn a value into bytes and back.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("packed buffer truncated: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },
    #[error("malformed packed buffer: {0}")]
    Malformed(String),
    #[error("out of memory while encoding")]
    NoMemory,
}

pub trait PackedCodec {
    type Value;

    fn encode(&self, value: &Self::Value) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Value, CodecError>;
}

/// Passes bytes through untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpaqueCodec;

impl PackedCodec for OpaqueCodec {
    type Value = Vec<u8>;

    fn encode(&self, value: &Vec<u8>) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        out.try_reserve_exact(value.len()).map_err(|_| CodecError::NoMemory)?;
        out.extend_from_slice(value);
        Ok(out)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(bytes.to_vec())
    }
}
