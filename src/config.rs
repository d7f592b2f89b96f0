//! Transfer configuration shared by the receiver and sender.

/// Integrity scheme used for a transfer.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// 8-bit additive checksum.
    #[default]
    Checksum,
    /// CRC-16/XMODEM.
    Crc,
}

/// Configuration for an XMODEM transfer.
///
/// Constructed once and reused across a `receive`/`send` call. Unlike the
/// original firmware's single global configuration struct, this is a plain
/// `Copy` value with no shared mutable state, so nothing prevents a caller
/// from holding independent configurations for sequential transfers.
#[derive(Copy, Clone, Debug)]
pub struct Xmodem {
    mode: Mode,
    use_escape: bool,
    log_level: u8,
}

impl Default for Xmodem {
    fn default() -> Self {
        Xmodem::new()
    }
}

impl Xmodem {
    /// Creates a configuration with sane defaults: checksum mode, no escape, silent logging.
    #[must_use]
    pub fn new() -> Self {
        Xmodem {
            mode: Mode::default(),
            use_escape: false,
            log_level: 0,
        }
    }

    /// Sets the preferred integrity mode. The sender may still switch to the
    /// peer's requested mode during handshake; the receiver does not renegotiate.
    pub fn set_mode(&mut self, mode: Mode) -> &mut Self {
        self.mode = mode;
        self
    }

    /// Enables or disables the receive-only DLE byte-escape extension.
    pub fn set_escape(&mut self, use_escape: bool) -> &mut Self {
        self.use_escape = use_escape;
        self
    }

    /// Sets the diagnostic log verbosity, 0 (silent) through 3 (byte-level trace).
    pub fn set_log_level(&mut self, log_level: u8) -> &mut Self {
        self.log_level = log_level;
        self
    }

    pub(crate) fn mode(&self) -> Mode {
        self.mode
    }

    pub(crate) fn use_escape(&self) -> bool {
        self.use_escape
    }

    pub(crate) fn log_level(&self) -> u8 {
        self.log_level
    }
}
