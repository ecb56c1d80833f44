//! Status line formatting and the transmit outbox.
//!
//! Lines are formatted into one of two fixed-capacity buffers. The buffer
//! handed to the DMA channel is left alone until the channel reports
//! completion; the next line goes into the other buffer. If that one still
//! holds an unsent line, the newer line replaces it.

use core::fmt::Write as FmtWrite;

use heapless::String;

use crate::config::MESSAGE_CAPACITY;
use crate::error::Error;

/// One status line.
pub type StatusMessage = String<MESSAGE_CAPACITY>;

/// Writes the temperature report line, e.g. `Temperature = 23 C\r\n`.
pub fn write_temperature(msg: &mut StatusMessage, celsius: u8) -> Result<(), Error> {
    FmtWrite::write_fmt(msg, format_args!("Temperature = {:02} C\r\n", celsius))?;
    Ok(())
}

/// Appends a fixed line.
pub fn write_line(msg: &mut StatusMessage, line: &str) -> Result<(), Error> {
    msg.push_str(line).map_err(|_| Error::MessageOverflow)
}

/// Double-buffered transmit queue holding at most one line in flight and one pending.
#[derive(Debug, Default)]
pub struct Outbox {
    slots: [StatusMessage; 2],
    in_flight: Option<usize>,
    pending: Option<usize>,
}

impl Outbox {
    pub const fn new() -> Self {
        Self {
            slots: [String::new(), String::new()],
            in_flight: None,
            pending: None,
        }
    }

    /// Formats a new line with `write` into a free slot and marks it pending.
    ///
    /// Returns `Ok(true)` if an older unsent line was replaced. On error the
    /// slot is left empty and nothing is queued.
    pub fn compose<F>(&mut self, write: F) -> Result<bool, Error>
    where
        F: FnOnce(&mut StatusMessage) -> Result<(), Error>,
    {
        let slot = match self.in_flight {
            Some(busy) => 1 - busy,
            None => self.pending.unwrap_or(0),
        };
        let replaced = self.pending.take().is_some();

        let msg = &mut self.slots[slot];
        msg.clear();
        if let Err(e) = write(msg) {
            msg.clear();
            return Err(e);
        }

        self.pending = Some(slot);
        Ok(replaced)
    }

    /// Moves the pending line in flight if the channel is idle and returns its bytes.
    pub fn dispatch(&mut self) -> Option<&[u8]> {
        if self.in_flight.is_some() {
            return None;
        }
        let slot = self.pending.take()?;
        self.in_flight = Some(slot);
        Some(self.slots[slot].as_bytes())
    }

    /// Frees the in-flight slot once the channel reports completion.
    pub fn release(&mut self) {
        self.in_flight = None;
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The line currently owned by the channel.
    pub fn in_flight(&self) -> Option<&str> {
        self.in_flight.map(|slot| self.slots[slot].as_str())
    }
}
