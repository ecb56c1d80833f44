//! Event flags shared between interrupt handlers and the main loop.
//!
//! Each [`EventFlag`] is a one-bit latch with exactly one producer (the
//! interrupt handler for its event) and exactly one consumer (the control
//! loop). The storage does not enforce this: it is a contract.
//!
//! - Producers only ever call [`EventFlag::set`].
//! - The consumer only ever calls [`EventFlag::consume`] and
//!   [`EventFlag::is_pending`].
//!
//! Under that contract no location is read-modify-written from two contexts.
//! `consume` is a plain load followed by a store, so it also works on cores
//! without compare-and-swap. If the handler fires between the load and the
//! store, the flag was already set and the two events coalesce, which is the
//! same outcome as a second `set` on an already-set flag.

use core::sync::atomic::{AtomicBool, Ordering};

/// One-bit single-producer, single-consumer event latch.
#[derive(Debug)]
pub struct EventFlag(AtomicBool);

impl EventFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Latches the event. Idempotent, never blocks. Producer side only.
    #[inline]
    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns whether the event had been latched, and clears it. Consumer side only.
    #[inline]
    pub fn consume(&self) -> bool {
        if self.0.load(Ordering::Acquire) {
            self.0.store(false, Ordering::Release);
            true
        } else {
            false
        }
    }

    /// Peeks at the latch without clearing it. Consumer side only.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for EventFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// The four event latches of the firmware.
///
/// Lives in a `static` on the target. Handlers borrow the single flag they
/// raise; the controller borrows the whole set as the sole consumer.
#[derive(Debug, Default)]
pub struct EventFlags {
    /// Raised by the timer handler on compare match.
    pub timer_expired: EventFlag,
    /// Raised by the external pin handler on each edge.
    pub rate_change_requested: EventFlag,
    /// Raised by the channel handler when a UART DMA transfer ends.
    pub transmit_complete: EventFlag,
    /// Raised by the bus handler when a sensor read finished without error.
    pub sample_ready: EventFlag,
}

impl EventFlags {
    pub const fn new() -> Self {
        Self {
            timer_expired: EventFlag::new(),
            rate_change_requested: EventFlag::new(),
            transmit_complete: EventFlag::new(),
            sample_ready: EventFlag::new(),
        }
    }
}
