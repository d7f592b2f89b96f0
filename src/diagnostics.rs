//! Bounded, wire-flushed diagnostic log.
//!
//! Distinct from the `log`-crate calls used elsewhere in this crate: this
//! buffer accumulates text during a transfer and is only ever flushed to the
//! transport between solicitation cycles or at transfer end, since the
//! transport is shared with live protocol bytes and must never see the two
//! interleaved.

use heapless::String;

use crate::consts::DIAG_LOG_CAPACITY;
use crate::transport::Transport;

/// Accumulates diagnostic lines for later, carefully-sequenced flush.
#[derive(Debug)]
pub struct DiagnosticLog {
    buf: String<DIAG_LOG_CAPACITY>,
    overflowed: bool,
    level: u8,
}

impl DiagnosticLog {
    /// Creates an empty log that only accepts appends at or below `level`.
    pub fn new(level: u8) -> Self {
        DiagnosticLog {
            buf: String::new(),
            overflowed: false,
            level,
        }
    }

    /// Appends one line at `level`. A no-op if `level` exceeds the configured verbosity.
    ///
    /// Once the buffer would overflow, further appends are dropped and the
    /// earliest content is preserved so the first-failure evidence survives.
    pub fn push(&mut self, level: u8, line: &str) {
        if level > self.level || self.overflowed {
            return;
        }
        if line.len() + 2 > self.buf.capacity() - self.buf.len() {
            self.overflowed = true;
            return;
        }
        let _ = self.buf.push_str(line);
        let _ = self.buf.push_str("\r\n");
    }

    /// True if any append was dropped due to capacity.
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Flushes the accumulated text to the transport and clears the buffer.
    ///
    /// Callers must only invoke this between solicitation cycles or at
    /// transfer end, never mid-frame.
    pub fn flush<T: Transport>(&mut self, transport: &mut T) {
        if !self.buf.is_empty() {
            transport.write_line(&self.buf);
            self.buf.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_below_configured_level() {
        let mut log = DiagnosticLog::new(1);
        log.push(2, "should not appear");
        assert!(log.buf.is_empty());
    }

    #[test]
    fn latches_full_and_preserves_earliest_content() {
        let mut log = DiagnosticLog::new(3);
        let long_line = "x".repeat(DIAG_LOG_CAPACITY);
        log.push(0, "first");
        log.push(0, &long_line);
        assert!(log.overflowed());
        assert!(log.buf.starts_with("first"));
    }

    #[test]
    fn append_is_all_or_nothing_when_only_the_separator_would_overflow() {
        let mut log = DiagnosticLog::new(3);
        // Leave exactly `line.len() + 1` bytes of headroom: the line itself
        // fits, but the line plus its CRLF separator does not.
        let filler_len = DIAG_LOG_CAPACITY - 8;
        let filler = "y".repeat(filler_len);
        log.push(0, &filler);
        assert!(!log.overflowed());
        let before = log.buf.clone();

        log.push(0, "abcde");
        assert!(log.overflowed());
        assert_eq!(log.buf, before, "half-written line leaked into the buffer");
    }
}
