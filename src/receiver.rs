//! Receiver state machine.

use crate::codec::{calc_checksum, calc_crc};
use crate::config::{Mode, Xmodem};
use crate::consts::{
    BLOCK_SIZE, CANCEL_BYTE_COUNT, CRC, DLE, DLE_XOR, FRAME_TIMEOUT_MS, NAK, SOLICIT_PERIOD_MS,
};
use crate::diagnostics::DiagnosticLog;
use crate::error::{ModemError, ModemResult};
use crate::transport::Transport;

pub use crate::consts::{ACK, BS, CAN, EOT, SOH};

/// Result of a completed or caller-aborted receive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// The transfer finished normally; `.0` is the number of bytes written into the output buffer.
    Completed(usize),
    /// The caller's side channel requested an abort.
    Aborted,
}

/// Receives an XMODEM transfer into `out_buffer`, using `config` to pick the
/// solicitation byte and escape handling.
///
/// `banner`, if supplied, is re-emitted alongside the solicitation byte while
/// soliciting. `side_channel`, if supplied, is evaluated against every byte
/// seen during solicitation that is not SOH/EOT/CAN/BS/NAK; returning `true`
/// aborts the receive.
pub fn receive<T: Transport>(
    config: &Xmodem,
    transport: &mut T,
    out_buffer: &mut [u8],
    banner: Option<&str>,
    mut side_channel: Option<&mut dyn FnMut(u8) -> bool>,
) -> ModemResult<ReceiveOutcome> {
    debug!("Starting XMODEM receive");
    let capacity = out_buffer.len();
    let mut log = DiagnosticLog::new(config.log_level());
    let mut buffer_cursor = 0usize;
    let mut next_block_num: u8 = 1;
    let mut seen_first_frame = false;
    let mut next_solicit = transport.deadline_after(0);

    loop {
        // Soliciting periodically re-announces; once the first frame arrives this is a plain poll.
        if !seen_first_frame && transport.deadline_elapsed(next_solicit) {
            log.flush(transport);
            if let Some(banner) = banner {
                transport.write_line(banner);
            }
            solicit(config, transport);
            next_solicit = transport.deadline_after(SOLICIT_PERIOD_MS);
        }
        let byte = transport.read_byte(crate::consts::POLL_TIMEOUT_US);

        let Some(byte) = byte else {
            continue;
        };

        match byte {
            SOH => {
                if buffer_cursor + BLOCK_SIZE > capacity {
                    error!(
                        "Output buffer exhausted after {} bytes; cancelling transfer",
                        buffer_cursor
                    );
                    transport.write_bytes(CAN, CANCEL_BYTE_COUNT);
                    drain(transport);
                    return Err(ModemError::BufferFull {
                        bytes_received: buffer_cursor,
                    });
                }
                if !seen_first_frame {
                    debug!("First byte received. Receiving stream.");
                }
                seen_first_frame = true;
                match read_frame(config, transport, next_block_num) {
                    Ok(payload) => {
                        transport.write_byte(ACK);
                        out_buffer[buffer_cursor..buffer_cursor + BLOCK_SIZE]
                            .copy_from_slice(&payload);
                        buffer_cursor += BLOCK_SIZE;
                        debug!("Received block {}", next_block_num);
                        next_block_num = next_block_num.wrapping_add(1);
                    }
                    Err(()) => {
                        log.push(1, "bad frame, sending NAK");
                        transport.write_byte(NAK);
                    }
                }
            }
            EOT => {
                debug!("EOT received");
                transport.write_byte(ACK);
                info!("XMODEM reception successful");
                log.flush(transport);
                return Ok(ReceiveOutcome::Completed(buffer_cursor));
            }
            CAN => {
                warn!("Cancel (CAN) byte received");
                transport.write_byte(ACK);
                log.flush(transport);
                return Err(ModemError::Cancelled);
            }
            BS | NAK if !seen_first_frame => {
                // Silently ignored during solicitation.
            }
            other if !seen_first_frame => {
                if let Some(side_channel) = side_channel.as_deref_mut() {
                    if side_channel(other) {
                        log.flush(transport);
                        return Ok(ReceiveOutcome::Aborted);
                    }
                }
                log.push(1, "unexpected byte while soliciting");
            }
            _ => {
                log.push(1, "unexpected byte awaiting frame");
            }
        }
    }
}

fn solicit<T: Transport>(config: &Xmodem, transport: &mut T) {
    match config.mode() {
        Mode::Crc => {
            debug!("NCG sent. Receiving stream.");
            transport.write_byte(BS);
            transport.write_byte(CRC);
        }
        Mode::Checksum => {
            debug!("NAK sent. Receiving stream.");
            transport.write_byte(NAK);
        }
    }
}

/// Reads the remainder of a frame (block number, complement, payload, trailer)
/// after SOH has already been consumed, and validates it against `expected_block`.
///
/// Returns `Err(())` for any validation failure (wrong block number, wrong
/// complement, bad trailer, or frame deadline expiry) — these never surface
/// past the receiver, per the local-vs-surfaced split in the error design.
fn read_frame<T: Transport>(
    config: &Xmodem,
    transport: &mut T,
    expected_block: u8,
) -> Result<[u8; BLOCK_SIZE], ()> {
    let deadline = transport.deadline_after(FRAME_TIMEOUT_MS);
    let trailer_len = match config.mode() {
        Mode::Checksum => 1,
        Mode::Crc => 2,
    };

    let block_byte = read_byte_before(transport, deadline)?;
    let complement_byte = read_byte_before(transport, deadline)?;

    let mut payload = [0u8; BLOCK_SIZE];
    let mut i = 0;
    let mut escape_next = false;
    while i < BLOCK_SIZE {
        let b = read_byte_before(transport, deadline)?;
        if config.use_escape() && b == DLE && !escape_next {
            escape_next = true;
            continue;
        }
        payload[i] = if escape_next { b ^ DLE_XOR } else { b };
        escape_next = false;
        i += 1;
    }

    let mut trailer = [0u8; 2];
    for slot in trailer.iter_mut().take(trailer_len) {
        *slot = read_byte_before(transport, deadline)?;
    }

    if block_byte != expected_block {
        return Err(());
    }
    if complement_byte != 255u8.wrapping_sub(block_byte) {
        return Err(());
    }

    let integrity_ok = match config.mode() {
        Mode::Checksum => calc_checksum(&payload) == trailer[0],
        Mode::Crc => {
            let received = (u16::from(trailer[0]) << 8) | u16::from(trailer[1]);
            calc_crc(&payload) == received
        }
    };

    if !integrity_ok {
        return Err(());
    }

    Ok(payload)
}

fn read_byte_before<T: Transport>(transport: &mut T, deadline: T::Instant) -> Result<u8, ()> {
    loop {
        if transport.deadline_elapsed(deadline) {
            return Err(());
        }
        if let Some(b) = transport.read_byte(crate::consts::POLL_TIMEOUT_US) {
            return Ok(b);
        }
    }
}

fn drain<T: Transport>(transport: &mut T) {
    while transport.read_byte(crate::consts::POLL_TIMEOUT_US).is_some() {}
}
