//! Interrupt-context event handlers.
//!
//! One handler per hardware source. Each borrows only the flag it raises, so
//! the single-producer side of the [`EventFlags`](crate::EventFlags) contract
//! is visible in the types. Handlers do no formatting, no logging and no I/O:
//! at most a status check and one flag write.

use embedded_hal::i2c::ErrorKind;

use crate::flags::EventFlag;

bitflags::bitflags! {
    /// Interrupt causes reported by the periodic timer peripheral.
    pub struct TimerInterrupt: u32 {
        const COMPARE0 = 1 << 0;
        const COMPARE1 = 1 << 1;
        const COMPARE2 = 1 << 2;
        const COMPARE3 = 1 << 3;
    }
}

/// Outcome of a DMA transfer as reported by the channel interrupt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferEvent {
    /// All bytes were moved to the peripheral.
    Complete,
    /// The channel stopped on a bus error.
    Error,
}

/// Periodic timer compare handler. Raises `timer_expired`.
#[derive(Clone, Copy, Debug)]
pub struct TimerHandler<'a> {
    flag: &'a EventFlag,
    cause: TimerInterrupt,
}

impl<'a> TimerHandler<'a> {
    /// Handler reacting to compare channel 0.
    pub const fn new(flag: &'a EventFlag) -> Self {
        Self { flag, cause: TimerInterrupt::COMPARE0 }
    }

    /// Handler reacting to another compare channel of a shared timer interrupt.
    pub const fn for_cause(flag: &'a EventFlag, cause: TimerInterrupt) -> Self {
        Self { flag, cause }
    }

    /// Call from the timer interrupt with the pending cause bits.
    #[inline]
    pub fn on_interrupt(&self, pending: TimerInterrupt) {
        if pending.intersects(self.cause) {
            self.flag.set();
        }
    }
}

/// External pin edge handler. Raises `rate_change_requested`.
///
/// There is no debounce: every edge, including contact bounce, counts as a
/// request.
#[derive(Clone, Copy, Debug)]
pub struct PinHandler<'a> {
    flag: &'a EventFlag,
}

impl<'a> PinHandler<'a> {
    pub const fn new(flag: &'a EventFlag) -> Self {
        Self { flag }
    }

    #[inline]
    pub fn on_edge(&self) {
        self.flag.set();
    }
}

/// Sensor bus transfer-complete handler. Raises `sample_ready`.
///
/// On a bus error the flag stays clear and the cycle is dropped; the next
/// timer period issues a fresh read.
#[derive(Clone, Copy, Debug)]
pub struct BusHandler<'a> {
    flag: &'a EventFlag,
}

impl<'a> BusHandler<'a> {
    pub const fn new(flag: &'a EventFlag) -> Self {
        Self { flag }
    }

    #[inline]
    pub fn on_transfer_complete(&self, status: Result<(), ErrorKind>) {
        if status.is_ok() {
            self.flag.set();
        }
    }
}

/// UART DMA channel handler. Raises `transmit_complete`.
///
/// A transfer that ends in error also frees the channel, so both outcomes
/// raise the flag.
#[derive(Clone, Copy, Debug)]
pub struct ChannelHandler<'a> {
    flag: &'a EventFlag,
}

impl<'a> ChannelHandler<'a> {
    pub const fn new(flag: &'a EventFlag) -> Self {
        Self { flag }
    }

    #[inline]
    pub fn on_transfer_event(&self, event: TransferEvent) {
        match event {
            TransferEvent::Complete | TransferEvent::Error => self.flag.set(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::EventFlags;
    use embedded_hal::i2c::NoAcknowledgeSource;

    #[test]
    fn timer_filters_on_compare_cause() {
        let flags = EventFlags::new();
        let handler = TimerHandler::new(&flags.timer_expired);

        handler.on_interrupt(TimerInterrupt::COMPARE1 | TimerInterrupt::COMPARE3);
        assert!(!flags.timer_expired.consume());

        handler.on_interrupt(TimerInterrupt::COMPARE0 | TimerInterrupt::COMPARE1);
        assert!(flags.timer_expired.consume());
    }

    #[test]
    fn timer_on_other_channel() {
        let flags = EventFlags::new();
        let handler = TimerHandler::for_cause(&flags.timer_expired, TimerInterrupt::COMPARE2);

        handler.on_interrupt(TimerInterrupt::COMPARE0);
        assert!(!flags.timer_expired.is_pending());
        handler.on_interrupt(TimerInterrupt::COMPARE2);
        assert!(flags.timer_expired.is_pending());
    }

    #[test]
    fn bus_error_leaves_sample_flag_clear() {
        let flags = EventFlags::new();
        let handler = BusHandler::new(&flags.sample_ready);

        handler.on_transfer_complete(Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)));
        handler.on_transfer_complete(Err(ErrorKind::ArbitrationLoss));
        assert!(!flags.sample_ready.consume());

        handler.on_transfer_complete(Ok(()));
        assert!(flags.sample_ready.consume());
    }

    #[test]
    fn pin_edges_coalesce_until_consumed() {
        let flags = EventFlags::new();
        let handler = PinHandler::new(&flags.rate_change_requested);

        handler.on_edge();
        handler.on_edge();
        assert!(flags.rate_change_requested.consume());
        assert!(!flags.rate_change_requested.consume());
    }

    #[test]
    fn each_handler_raises_only_its_own_flag() {
        let flags = EventFlags::new();

        TimerHandler::new(&flags.timer_expired).on_interrupt(TimerInterrupt::all());
        PinHandler::new(&flags.rate_change_requested).on_edge();
        BusHandler::new(&flags.sample_ready).on_transfer_complete(Ok(()));

        assert!(!flags.transmit_complete.is_pending());
        ChannelHandler::new(&flags.transmit_complete).on_transfer_event(TransferEvent::Complete);

        assert!(flags.timer_expired.consume());
        assert!(flags.rate_change_requested.consume());
        assert!(flags.sample_ready.consume());
        assert!(flags.transmit_complete.consume());
    }

    #[test]
    fn channel_error_still_frees_channel() {
        let flags = EventFlags::new();
        ChannelHandler::new(&flags.transmit_complete).on_transfer_event(TransferEvent::Error);
        assert!(flags.transmit_complete.consume());
    }
}
