//! XMODEM protocol core: receiver and sender state machines, the checksum/CRC
//! integrity codec, a transport abstraction, and a bounded diagnostic log.
#![cfg_attr(not(test), no_std)]
#![deny(
    warnings,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    clippy::all,
    clippy::cargo,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications,
    unused_extern_crates,
    variant_size_differences
)]

#[macro_use]
extern crate log;

pub mod codec;
pub mod config;
pub mod consts;
pub mod diagnostics;
pub mod error;
pub mod receiver;
pub mod sender;
pub mod transport;

pub use config::{Mode, Xmodem};
pub use error::{ModemError, ModemResult};
pub use receiver::ReceiveOutcome;
pub use transport::Transport;

impl Xmodem {
    /// Receives a transfer into `out_buffer`. See [`receiver::receive`].
    pub fn receive<T: Transport>(
        &self,
        transport: &mut T,
        out_buffer: &mut [u8],
        banner: Option<&str>,
        side_channel: Option<&mut dyn FnMut(u8) -> bool>,
    ) -> ModemResult<ReceiveOutcome> {
        receiver::receive(self, transport, out_buffer, banner, side_channel)
    }

    /// Sends `in_buffer`. See [`sender::send`].
    pub fn send<T: Transport>(&self, transport: &mut T, in_buffer: &[u8]) -> ModemResult<()> {
        sender::send(self, transport, in_buffer)
    }
}
