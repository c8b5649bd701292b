//! Pure quota decision logic. No I/O here; everything is a function of the
//! identity class, the counter state and the clock, which keeps the rules
//! unit-testable without a database.

use chrono::{DateTime, Duration, Utc};

use crate::config::QuotaConfig;

/// Billing class of the caller, as seen by the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityClass {
    /// No account; limited by a lifetime cap on a client-local counter
    Anonymous,
    /// Free account; limited per rolling reset window
    Free,
    /// Paid account; unlimited
    Paid,
}

/// Raw counter state as read from the store
#[derive(Debug, Clone, Copy)]
pub struct CounterState {
    /// Questions consumed so far (raw stored value, pre any logical reset)
    pub used: u32,
    /// Start of the current window. `None` for a brand-new account (treated
    /// as "now", establishing the first window) and always `None` for
    /// anonymous counters, which have no reset concept.
    pub last_reset: Option<DateTime<Utc>>,
}

impl CounterState {
    pub fn anonymous(used: u32) -> Self {
        Self {
            used,
            last_reset: None,
        }
    }
}

/// Outcome of evaluating the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaDecision {
    pub allowed: bool,
    /// Questions left before the limit. `None` means unlimited (paid).
    pub remaining: Option<u32>,
    /// Whole days until the counter resets. `None` for anonymous (lifetime
    /// cap) and paid (no window).
    pub days_to_reset: Option<i64>,
}

impl QuotaDecision {
    /// The unconditional paid-tier decision
    pub fn unlimited() -> Self {
        Self {
            allowed: true,
            remaining: None,
            days_to_reset: None,
        }
    }
}

/// Returns true when the account's reset window has fully elapsed, i.e. the
/// stored counter should be treated as zero until it is physically reset.
pub fn window_elapsed(state: &CounterState, now: DateTime<Utc>, config: &QuotaConfig) -> bool {
    match state.last_reset {
        Some(last_reset) => now >= last_reset + Duration::days(config.reset_period_days),
        // Unset last_reset is treated as "now": the first window starts here
        None => false,
    }
}

/// Evaluates the quota rules for one submission attempt.
///
/// The logical reset is applied here (an elapsed window makes `used` count as
/// zero); physically zeroing the stored counter is the gate's job, done
/// lazily on the next permitted submission.
pub fn decide(
    class: IdentityClass,
    state: &CounterState,
    now: DateTime<Utc>,
    config: &QuotaConfig,
) -> QuotaDecision {
    // Paid accounts short-circuit regardless of the stored counter
    if class == IdentityClass::Paid {
        return QuotaDecision::unlimited();
    }

    let limit = match class {
        IdentityClass::Anonymous => config.anonymous_limit,
        IdentityClass::Free => config.free_tier_limit,
        IdentityClass::Paid => unreachable!(),
    };

    let effective_used = if class == IdentityClass::Free && window_elapsed(state, now, config) {
        0
    } else {
        state.used
    };

    let remaining = limit.saturating_sub(effective_used);

    let days_to_reset = match class {
        IdentityClass::Anonymous => None,
        _ => {
            let reset_at =
                state.last_reset.unwrap_or(now) + Duration::days(config.reset_period_days);
            let left = reset_at - now;
            // Negative window collapses to 0, never a negative day count
            if left <= Duration::zero() {
                Some(0)
            } else {
                // Ceiling division: any partial day counts as a full day
                let days = left.num_days();
                let exact = Duration::days(days) == left;
                Some(if exact { days } else { days + 1 })
            }
        }
    };

    QuotaDecision {
        allowed: remaining > 0,
        remaining: Some(remaining),
        days_to_reset,
    }
}
