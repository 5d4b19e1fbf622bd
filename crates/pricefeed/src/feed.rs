//! Pair-keyed price feed registry

use crate::aggregator::Aggregator;
use crate::error::PriceFeedError;
use common::{Clock, Wad};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default grace period after a sequencer restart
pub const SEQUENCER_GRACE_PERIOD_SECS: i64 = 1_800;

/// Registry of price aggregators keyed by (base, quote) symbol pair
pub struct PriceFeed {
    feeds: RwLock<HashMap<(String, String), Arc<dyn Aggregator>>>,
    sequencer_uptime_feed: RwLock<Option<Arc<dyn Aggregator>>>,
    clock: Arc<dyn Clock>,
    max_price_age_secs: i64,
    grace_period_secs: i64,
}

impl PriceFeed {
    pub fn new(clock: Arc<dyn Clock>, max_price_age_secs: i64) -> Self {
        Self {
            feeds: RwLock::new(HashMap::new()),
            sequencer_uptime_feed: RwLock::new(None),
            clock,
            max_price_age_secs,
            grace_period_secs: SEQUENCER_GRACE_PERIOD_SECS,
        }
    }

    pub fn with_grace_period(mut self, grace_period_secs: i64) -> Self {
        self.grace_period_secs = grace_period_secs;
        self
    }

    /// Register an aggregator for a pair, replacing any previous one
    pub fn add_price_feed(&self, base: &str, quote: &str, aggregator: Arc<dyn Aggregator>) {
        debug!(base, quote, "registering price feed");
        self.feeds
            .write()
            .insert((base.to_string(), quote.to_string()), aggregator);
    }

    /// Install the L2 sequencer uptime feed; once set, every quote
    /// checks sequencer liveness first
    pub fn set_sequencer_uptime_feed(&self, aggregator: Arc<dyn Aggregator>) {
        *self.sequencer_uptime_feed.write() = Some(aggregator);
    }

    /// Raw answer at the aggregator's native decimals
    pub fn get_rate(&self, base: &str, quote: &str) -> Result<i128, PriceFeedError> {
        self.check_sequencer()?;
        let aggregator = self
            .feeds
            .read()
            .get(&(base.to_string(), quote.to_string()))
            .cloned()
            .ok_or_else(|| PriceFeedError::FeedNotFound {
                base: base.to_string(),
                quote: quote.to_string(),
            })?;

        let round = aggregator.latest_round_data();
        if round.answer <= 0 {
            warn!(base, quote, answer = round.answer, "invalid oracle round");
            return Err(PriceFeedError::InvalidRound {
                answer: round.answer,
            });
        }

        let age_secs = self.clock.now() - round.updated_at;
        if age_secs > self.max_price_age_secs {
            warn!(base, quote, age_secs, "stale oracle round");
            return Err(PriceFeedError::StalePrice {
                age_secs,
                max_age_secs: self.max_price_age_secs,
            });
        }

        Ok(round.answer)
    }

    /// Answer scaled to e18 regardless of the aggregator's decimals
    pub fn get_normalized_rate(&self, base: &str, quote: &str) -> Result<Wad, PriceFeedError> {
        let aggregator = self
            .feeds
            .read()
            .get(&(base.to_string(), quote.to_string()))
            .cloned()
            .ok_or_else(|| PriceFeedError::FeedNotFound {
                base: base.to_string(),
                quote: quote.to_string(),
            })?;
        let decimals = aggregator.decimals();
        let rate = self.get_rate(base, quote)?;

        let normalized = match decimals.cmp(&18) {
            std::cmp::Ordering::Less => rate * 10i128.pow(18 - decimals),
            std::cmp::Ordering::Equal => rate,
            std::cmp::Ordering::Greater => rate / 10i128.pow(decimals - 18),
        };
        Ok(normalized)
    }

    /// Reject quotes while the sequencer is down or freshly restarted
    fn check_sequencer(&self) -> Result<(), PriceFeedError> {
        let Some(uptime) = self.sequencer_uptime_feed.read().clone() else {
            return Ok(());
        };
        let round = uptime.latest_round_data();

        // uptime feed convention: answer 0 = up, 1 = down
        if round.answer != 0 {
            return Err(PriceFeedError::SequencerDown);
        }
        let up_for = self.clock.now() - round.started_at;
        if up_for <= self.grace_period_secs {
            return Err(PriceFeedError::GracePeriodNotOver);
        }
        Ok(())
    }
}
