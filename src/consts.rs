//! Collection of protocol bytes and tuning constants for internal use.

/// Start of header, precedes every block frame.
pub const SOH: u8 = 0x01;
/// End of transmission, sent in place of a further block.
pub const EOT: u8 = 0x04;
/// Positive acknowledgement of a block or of EOT.
pub const ACK: u8 = 0x06;
/// Backspace, emitted ahead of the CRC solicitation byte.
pub const BS: u8 = 0x08;
/// Data-link escape, prefixes an escaped payload byte.
pub const DLE: u8 = 0x10;
/// Negative acknowledgement: bad frame, or checksum-mode solicitation.
pub const NAK: u8 = 0x15;
/// Cancel, sent by either side to abort a transfer.
pub const CAN: u8 = 0x18;
/// Substitute, used to pad the final block's payload.
pub const SUB: u8 = 0x1A;
/// ASCII `'C'`, the CRC-mode solicitation byte.
pub const CRC: u8 = b'C';

/// Fixed XMODEM payload size.
pub const BLOCK_SIZE: usize = 128;

/// Value XORed into an escaped payload byte following a DLE.
pub const DLE_XOR: u8 = 0x40;

/// Wall-clock period between solicitation re-announcements while soliciting.
pub const SOLICIT_PERIOD_MS: u32 = 3_000;

/// Per-frame deadline from the moment SOH is recognized.
pub const FRAME_TIMEOUT_MS: u32 = 1_000;

/// Read timeout used for every poll outside of frame assembly.
pub const POLL_TIMEOUT_US: u32 = 1_000;

/// Number of CAN bytes emitted on an abort/cancel cleanup path.
pub const CANCEL_BYTE_COUNT: usize = 8;

/// Sender's per-block retry budget before giving up.
pub const SENDER_RETRY_BUDGET: u32 = 10;

/// Sender's attempt budget while awaiting the peer's handshake byte.
pub const HANDSHAKE_ATTEMPTS: u32 = 30_000;

/// Sender's attempt budget while awaiting the final ACK after EOT.
pub const EOT_ATTEMPTS: u32 = 2_000;

/// Capacity of the diagnostic log buffer, in bytes.
pub const DIAG_LOG_CAPACITY: usize = 16 * 1024;
