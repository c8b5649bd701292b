//! Question-quota accounting.
//!
//! Anonymous visitors get a small lifetime allowance tracked by a
//! client-local counter; free accounts get a per-window allowance backed by
//! counter columns on their user row; paid accounts are unlimited. The
//! policy is pure, the store does the row reads/updates, and the gate ties
//! them together in front of every LLM call.

pub mod gate;
pub mod policy;
pub mod store;

pub use gate::{LimitStatus, QuotaGate, SubmitOutcome};
pub use policy::{decide, CounterState, IdentityClass, QuotaDecision};
pub use store::CounterStore;

use crate::error::AppError;

/// Fail-open policy: quota plumbing must never take down the chat feature.
/// A transient failure degrades to the given permissive fallback, logged and
/// never surfaced. Every call site in the gate and the routes goes through
/// here rather than handling errors ad hoc.
pub fn fail_open<T>(context: &str, err: &AppError, fallback: T) -> T {
    log::error!("{}: {} (failing open)", context, err);
    fallback
}
