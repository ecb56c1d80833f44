//! Sampling-rate state machine.
//!
//! Four states cycling 500 ms → 1 s → 2 s → 4 s → 500 ms on each rate-change
//! request. The per-state data (timer period, announcement line) lives in a
//! lookup table indexed by [`SamplingRate`]; the transitions are a
//! `typed-fsm` machine.

use fugit::MillisDurationU32;
use typed_fsm::{state_machine, Transition};

/// Sampling interval of the periodic timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SamplingRate {
    Every500Ms = 0,
    Every1S = 1,
    Every2S = 2,
    Every4S = 3,
}

/// Timer period and status line for one sampling rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateEntry {
    pub period: MillisDurationU32,
    pub announcement: &'static str,
}

const RATE_TABLE: [RateEntry; 4] = [
    RateEntry {
        period: MillisDurationU32::from_ticks(500),
        announcement: "Sampling Temperature every 500 ms \r\n",
    },
    RateEntry {
        period: MillisDurationU32::from_ticks(1_000),
        announcement: "Sampling Temperature every 1 second \r\n",
    },
    RateEntry {
        period: MillisDurationU32::from_ticks(2_000),
        announcement: "Sampling Temperature every 2 seconds \r\n",
    },
    RateEntry {
        period: MillisDurationU32::from_ticks(4_000),
        announcement: "Sampling Temperature every 4 seconds \r\n",
    },
];

impl SamplingRate {
    /// All rates in cycle order.
    pub const ALL: [SamplingRate; 4] = [
        SamplingRate::Every500Ms,
        SamplingRate::Every1S,
        SamplingRate::Every2S,
        SamplingRate::Every4S,
    ];

    /// Successor in the cycle.
    pub const fn next(self) -> Self {
        match self {
            SamplingRate::Every500Ms => SamplingRate::Every1S,
            SamplingRate::Every1S => SamplingRate::Every2S,
            SamplingRate::Every2S => SamplingRate::Every4S,
            SamplingRate::Every4S => SamplingRate::Every500Ms,
        }
    }

    /// Index exposed to telemetry readers.
    pub const fn index(self) -> u8 {
        self as u8
    }

    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(SamplingRate::Every500Ms),
            1 => Some(SamplingRate::Every1S),
            2 => Some(SamplingRate::Every2S),
            3 => Some(SamplingRate::Every4S),
            _ => None,
        }
    }

    pub const fn entry(self) -> RateEntry {
        RATE_TABLE[self as usize]
    }

    /// Compare period to program into the periodic timer.
    pub const fn period(self) -> MillisDurationU32 {
        self.entry().period
    }

    /// Status line sent after switching to this rate.
    pub const fn announcement(self) -> &'static str {
        self.entry().announcement
    }
}

// FSM Context
pub struct RateContext {
    pub rate: SamplingRate,
}

// FSM Events
#[derive(Clone, Copy, Debug)]
pub enum RateEvent {
    ChangeRequested,
}

state_machine! {
    Name: RateFsm,
    Context: RateContext,
    Event: RateEvent,
    States: {
        Sampling500Ms => {
            entry: |ctx| {
                ctx.rate = SamplingRate::Every500Ms;
            }
            process: |_ctx, evt| {
                match evt {
                    RateEvent::ChangeRequested => Transition::To(RateFsm::Sampling1S),
                }
            }
        },

        Sampling1S => {
            entry: |ctx| {
                ctx.rate = SamplingRate::Every1S;
            }
            process: |_ctx, evt| {
                match evt {
                    RateEvent::ChangeRequested => Transition::To(RateFsm::Sampling2S),
                }
            }
        },

        Sampling2S => {
            entry: |ctx| {
                ctx.rate = SamplingRate::Every2S;
            }
            process: |_ctx, evt| {
                match evt {
                    RateEvent::ChangeRequested => Transition::To(RateFsm::Sampling4S),
                }
            }
        },

        Sampling4S => {
            entry: |ctx| {
                ctx.rate = SamplingRate::Every4S;
            }
            process: |_ctx, evt| {
                match evt {
                    RateEvent::ChangeRequested => Transition::To(RateFsm::Sampling500Ms),
                }
            }
        }
    }
}

/// Owns the rate FSM and its context.
pub struct RateMachine {
    fsm: RateFsm,
    ctx: RateContext,
}

impl RateMachine {
    pub fn new(initial: SamplingRate) -> Self {
        let mut ctx = RateContext { rate: initial };
        let mut fsm = match initial {
            SamplingRate::Every500Ms => RateFsm::Sampling500Ms,
            SamplingRate::Every1S => RateFsm::Sampling1S,
            SamplingRate::Every2S => RateFsm::Sampling2S,
            SamplingRate::Every4S => RateFsm::Sampling4S,
        };
        fsm.init(&mut ctx);
        Self { fsm, ctx }
    }

    pub fn rate(&self) -> SamplingRate {
        self.ctx.rate
    }

    /// Moves to the next rate and returns it.
    pub fn advance(&mut self) -> SamplingRate {
        self.fsm.dispatch(&mut self.ctx, &RateEvent::ChangeRequested);
        self.ctx.rate
    }
}

impl Default for RateMachine {
    fn default() -> Self {
        Self::new(SamplingRate::Every500Ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_transitions_return_to_start() {
        let mut machine = RateMachine::default();
        assert_eq!(machine.rate(), SamplingRate::Every500Ms);

        assert_eq!(machine.advance(), SamplingRate::Every1S);
        assert_eq!(machine.advance(), SamplingRate::Every2S);
        assert_eq!(machine.advance(), SamplingRate::Every4S);
        assert_eq!(machine.advance(), SamplingRate::Every500Ms);
        assert_eq!(machine.rate(), SamplingRate::Every500Ms);
    }

    #[test]
    fn starts_from_any_rate() {
        for rate in SamplingRate::ALL {
            let mut machine = RateMachine::new(rate);
            assert_eq!(machine.rate(), rate);
            assert_eq!(machine.advance(), rate.next());
        }
    }

    #[test]
    fn fsm_transitions_follow_successor() {
        for start in SamplingRate::ALL {
            let mut machine = RateMachine::new(start);
            let mut expected = start;
            for _ in 0..8 {
                expected = expected.next();
                assert_eq!(machine.advance(), expected, "starting from {start:?}");
                assert_eq!(machine.rate(), expected);
            }
        }
    }

    #[test]
    fn table_periods() {
        let periods: [u32; 4] = SamplingRate::ALL.map(|rate| rate.period().to_millis());
        assert_eq!(periods, [500, 1_000, 2_000, 4_000]);
    }

    #[test]
    fn announcements_name_the_interval() {
        assert_eq!(SamplingRate::Every1S.announcement(), "Sampling Temperature every 1 second \r\n");
        assert_eq!(SamplingRate::Every2S.announcement(), "Sampling Temperature every 2 seconds \r\n");
        assert_eq!(SamplingRate::Every4S.announcement(), "Sampling Temperature every 4 seconds \r\n");
        assert_eq!(SamplingRate::Every500Ms.announcement(), "Sampling Temperature every 500 ms \r\n");
    }

    #[test]
    fn index_round_trips_through_telemetry_encoding() {
        for rate in SamplingRate::ALL {
            assert_eq!(SamplingRate::from_index(rate.index()), Some(rate));
        }
        assert_eq!(SamplingRate::from_index(4), None);
    }

    #[test]
    fn successor_visits_every_rate_once() {
        let mut rate = SamplingRate::Every500Ms;
        let mut seen = [false; 4];
        for _ in 0..4 {
            assert!(!seen[rate as usize]);
            seen[rate as usize] = true;
            rate = rate.next();
        }
        assert_eq!(seen, [true; 4]);
        assert_eq!(rate, SamplingRate::Every500Ms);
    }
}
