//! Sender state machine.

use crate::codec::{calc_checksum, calc_crc};
use crate::config::{Mode, Xmodem};
use crate::consts::{
    ACK, BLOCK_SIZE, CAN, CANCEL_BYTE_COUNT, CRC, EOT, EOT_ATTEMPTS, HANDSHAKE_ATTEMPTS, NAK,
    POLL_TIMEOUT_US, SENDER_RETRY_BUDGET, SOH, SUB,
};
use crate::error::{ModemError, ModemResult};
use crate::transport::Transport;

/// Sends `in_buffer` over `transport`, using `config`'s preferred mode as a
/// fallback until the peer's handshake byte dictates the effective mode.
pub fn send<T: Transport>(config: &Xmodem, transport: &mut T, in_buffer: &[u8]) -> ModemResult<()> {
    debug!("Starting XMODEM transfer");
    let mut mode = config.mode();

    match await_handshake(transport) {
        Some(negotiated) => mode = negotiated,
        None => {
            warn!("Timed out waiting for start of XMODEM transfer.");
            return Err(ModemError::HandshakeTimeout);
        }
    }

    let mut block_num: u8 = 1;
    let mut offset = 0usize;
    let total = in_buffer.len();

    while offset < total {
        let end = (offset + BLOCK_SIZE).min(total);
        let mut payload = [SUB; BLOCK_SIZE];
        payload[..end - offset].copy_from_slice(&in_buffer[offset..end]);

        if !send_block_until_acked(transport, mode, block_num, &payload)? {
            error!(
                "Exhausted max retries ({}) while sending block {} in XMODEM transfer",
                SENDER_RETRY_BUDGET, block_num
            );
            return Err(ModemError::RetryBudgetExhausted);
        }

        block_num = block_num.wrapping_add(1);
        offset = end;
    }

    debug!("Reached EOF");
    debug!("Sending EOT");
    send_eot(transport)
}

/// Polls for the peer's solicitation byte. Returns the mode it dictates, or
/// `None` if no valid byte arrives within the attempt budget.
fn await_handshake<T: Transport>(transport: &mut T) -> Option<Mode> {
    for _ in 0..HANDSHAKE_ATTEMPTS {
        match transport.read_byte(POLL_TIMEOUT_US) {
            Some(CRC) => {
                debug!("16-bit CRC requested");
                return Some(Mode::Crc);
            }
            Some(NAK) => {
                debug!("Standard checksum requested");
                return Some(Mode::Checksum);
            }
            Some(crate::consts::BS) | None => {}
            Some(other) => {
                warn!("Unrecognized symbol during handshake: {}", other);
            }
        }
    }
    None
}

/// Sends one block repeatedly until ACKed, a peer double-CAN is seen, or the
/// retry budget is exhausted. Returns `Ok(true)` on ACK, `Ok(false)` never
/// (retry exhaustion is surfaced as `Err` by the caller); `Err` on peer cancel.
fn send_block_until_acked<T: Transport>(
    transport: &mut T,
    mode: Mode,
    block_num: u8,
    payload: &[u8; BLOCK_SIZE],
) -> ModemResult<bool> {
    let mut retries = 0u32;
    loop {
        debug!("Sending block {}", block_num);
        emit_block(transport, mode, block_num, payload);

        match transport.read_byte(POLL_TIMEOUT_US) {
            Some(ACK) => {
                debug!("Received ACK for block {}", block_num);
                return Ok(true);
            }
            Some(CAN) => {
                if transport.read_byte(POLL_TIMEOUT_US) == Some(CAN) {
                    warn!("Cancel (CAN) byte received");
                    cleanup_cancel(transport);
                    return Err(ModemError::Cancelled);
                }
                retries += 1;
            }
            Some(other) => {
                warn!("Expected ACK, got {}", other);
                retries += 1;
            }
            None => {
                warn!("Timeout waiting for ACK for block {}", block_num);
                retries += 1;
            }
        }

        if retries > SENDER_RETRY_BUDGET {
            cleanup_cancel(transport);
            return Ok(false);
        }
    }
}

fn emit_block<T: Transport>(transport: &mut T, mode: Mode, block_num: u8, payload: &[u8; BLOCK_SIZE]) {
    transport.write_byte(SOH);
    transport.write_byte(block_num);
    transport.write_byte(255u8.wrapping_sub(block_num));
    for &b in payload {
        transport.write_byte(b);
    }
    match mode {
        Mode::Checksum => transport.write_byte(calc_checksum(payload)),
        Mode::Crc => {
            let crc = calc_crc(payload);
            transport.write_byte((crc >> 8) as u8);
            transport.write_byte((crc & 0xFF) as u8);
        }
    }
}

fn send_eot<T: Transport>(transport: &mut T) -> ModemResult<()> {
    for _ in 0..EOT_ATTEMPTS {
        transport.write_byte(EOT);
        match transport.read_byte(POLL_TIMEOUT_US) {
            Some(ACK) => {
                info!("XMODEM transmission successful");
                return Ok(());
            }
            Some(CAN) => {
                if transport.read_byte(POLL_TIMEOUT_US) == Some(CAN) {
                    warn!("Cancel (CAN) byte received");
                    cleanup_cancel(transport);
                    return Err(ModemError::Cancelled);
                }
            }
            Some(other) => {
                warn!("Expected ACK, got {}", other);
            }
            None => {}
        }
    }
    error!("Exhausted max retries ({}) while waiting for EOT acknowledgement", EOT_ATTEMPTS);
    cleanup_cancel(transport);
    Err(ModemError::EotTimeout)
}

fn cleanup_cancel<T: Transport>(transport: &mut T) {
    transport.write_bytes(CAN, CANCEL_BYTE_COUNT);
    while transport.read_byte(POLL_TIMEOUT_US).is_some() {}
}
