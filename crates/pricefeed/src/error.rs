use thiserror::Error;

/// Errors raised by the price feed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceFeedError {
    /// No aggregator registered for the requested pair
    #[error("no price feed for pair {base}/{quote}")]
    FeedNotFound { base: String, quote: String },

    /// Aggregator returned a non-positive or malformed answer
    #[error("invalid round from aggregator: answer {answer}")]
    InvalidRound { answer: i128 },

    /// Round is older than the configured maximum age
    #[error("stale price: round updated {age_secs}s ago, max {max_age_secs}s")]
    StalePrice { age_secs: i64, max_age_secs: i64 },

    /// Sequencer uptime feed reports the sequencer as down
    #[error("sequencer is down")]
    SequencerDown,

    /// Sequencer restarted less than the grace period ago
    #[error("sequencer grace period not over")]
    GracePeriodNotOver,
}
