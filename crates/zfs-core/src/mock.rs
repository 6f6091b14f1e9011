//! Scripted channel for exercising the handle without a kernel.
//!
//! Each call pops one [`Reply`] and records what the responder saw. An
//! exhausted script answers `ENOSYS`.

use std::collections::VecDeque;

use nix::errno::Errno;

use crate::channel::Channel;
use crate::command::{ZfsCommand, ZfsIoc};

#[derive(Debug, Clone)]
pub enum Reply {
    /// Succeed without touching the inbound buffer.
    Ok,
    /// Behave like the kernel returning `bytes`: copy them in if the
    /// inbound buffer is large enough, otherwise write the required size
    /// and fail with `ENOMEM`.
    Data(Vec<u8>),
    /// Fail with `ENOMEM`, reporting `required` as the needed size.
    NeedSize(u64),
    Fail(Errno),
}

/// What one call looked like from the responder's side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub request: ZfsIoc,
    pub name: String,
    pub inbound_len: Option<usize>,
    pub outbound_len: Option<usize>,
    pub history: Option<String>,
}

#[derive(Debug, Default)]
pub struct MockChannel {
    script: VecDeque<Reply>,
    calls: Vec<Call>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self { script: replies.into_iter().collect(), calls: Vec::new() }
    }

    pub fn push(&mut self, reply: Reply) {
        self.script.push_back(reply);
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Channel for MockChannel {
    fn ioctl(&mut self, request: ZfsIoc, cmd: &mut ZfsCommand) -> Result<(), Errno> {
        self.calls.push(Call {
            request,
            name: cmd.name.clone(),
            inbound_len: cmd.inbound().map(<[u8]>::len),
            outbound_len: cmd.outbound().map(<[u8]>::len),
            history: cmd.history().map(str::to_string),
        });

        match self.script.pop_front() {
            None => Err(Errno::ENOSYS),
            Some(Reply::Ok) => Ok(()),
            Some(Reply::Fail(e)) => Err(e),
            Some(Reply::NeedSize(required)) => {
                cmd.set_dst_size(required);
                Err(Errno::ENOMEM)
            }
            Some(Reply::Data(bytes)) => {
                let fits = cmd.inbound().map_or(false, |b| b.len() >= bytes.len());
                cmd.set_dst_size(bytes.len() as u64);
                if !fits {
                    return Err(Errno::ENOMEM);
                }
                if let Some(buf) = cmd.inbound_mut() {
                    buf[..bytes.len()].copy_from_slice(&bytes);
                }
                Ok(())
            }
        }
    }
}
