//! Price aggregator abstraction
//!
//! Mirrors the Chainlink AggregatorV3 read surface: a round of data with
//! a fixed-decimals answer. `ManualAggregator` is the settable in-process
//! implementation used by the simulations and tests.

use common::Clock;
use parking_lot::Mutex;
use std::sync::Arc;

/// One oracle round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundData {
    pub round_id: u64,
    pub answer: i128,
    pub started_at: i64,
    pub updated_at: i64,
}

/// Read interface over a price (or uptime) oracle
pub trait Aggregator: Send + Sync {
    fn latest_round_data(&self) -> RoundData;
    fn decimals(&self) -> u32;
}

#[derive(Debug)]
struct ManualState {
    round: RoundData,
}

/// Settable aggregator backed by a shared clock
#[derive(Clone)]
pub struct ManualAggregator {
    state: Arc<Mutex<ManualState>>,
    clock: Arc<dyn Clock>,
    decimals: u32,
}

impl ManualAggregator {
    pub fn new(clock: Arc<dyn Clock>, decimals: u32, answer: i128) -> Self {
        let now = clock.now();
        Self {
            state: Arc::new(Mutex::new(ManualState {
                round: RoundData {
                    round_id: 1,
                    answer,
                    started_at: now,
                    updated_at: now,
                },
            })),
            clock,
            decimals,
        }
    }

    /// Publish a new answer, stamping it with the current clock time
    pub fn set_answer(&self, answer: i128) {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.round = RoundData {
            round_id: state.round.round_id + 1,
            answer,
            started_at: now,
            updated_at: now,
        };
    }

    /// Publish a round with explicit timestamps (uptime feeds use
    /// `started_at` as the moment the sequencer came back up)
    pub fn set_round(&self, answer: i128, started_at: i64, updated_at: i64) {
        let mut state = self.state.lock();
        state.round = RoundData {
            round_id: state.round.round_id + 1,
            answer,
            started_at,
            updated_at,
        };
    }
}

impl Aggregator for ManualAggregator {
    fn latest_round_data(&self) -> RoundData {
        self.state.lock().round
    }

    fn decimals(&self) -> u32 {
        self.decimals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ManualClock;

    #[test]
    fn test_set_answer_bumps_round() {
        let clock = Arc::new(ManualClock::new(1_000));
        let agg = ManualAggregator::new(clock.clone(), 8, 2_500_00000000);

        let first = agg.latest_round_data();
        assert_eq!(first.round_id, 1);
        assert_eq!(first.updated_at, 1_000);

        clock.advance(60);
        agg.set_answer(2_600_00000000);

        let second = agg.latest_round_data();
        assert_eq!(second.round_id, 2);
        assert_eq!(second.answer, 2_600_00000000);
        assert_eq!(second.updated_at, 1_060);
    }
}
