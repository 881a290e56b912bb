use std::{num::ParseIntError, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Milliseconds,
}

impl TimeUnit {
    fn duration(self, amount: u64) -> Duration {
        match self {
            TimeUnit::Seconds => Duration::from_secs(amount),
            TimeUnit::Milliseconds => Duration::from_millis(amount),
        }
    }
}

/// Reads an interval from `env_var_name`, interpreted in `units`. Unset means `default`.
pub fn poll_interval(units: TimeUnit, env_var_name: &str, default: u64) -> Result<Duration, ParseIntError> {
    parse_interval(units, std::env::var(env_var_name).ok().as_deref(), default)
}

fn parse_interval(units: TimeUnit, raw: Option<&str>, default: u64) -> Result<Duration, ParseIntError> {
    let amount = match raw.map(str::trim) {
        Some(v) if !v.is_empty() => v.parse::<u64>()?,
        _ => default,
    };
    Ok(units.duration(amount))
}
