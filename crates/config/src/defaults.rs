//! Default values applied when the YAML omits a field

pub fn default_enabled() -> bool {
    true
}

pub fn default_buffer_bps() -> i64 {
    1_000
}

pub fn default_feed_decimals() -> u32 {
    8
}

pub fn default_max_price_age() -> u64 {
    3_600
}

pub fn default_health_factor_bps() -> i64 {
    5_000
}

pub fn default_min_amount() -> f64 {
    0.01
}

pub fn default_execution_delay() -> u64 {
    180
}

pub fn default_keeper_interval() -> u64 {
    30
}

pub fn default_metrics_port() -> u16 {
    9_090
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}
