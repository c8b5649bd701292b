use serde::Serialize;
use sqlx::PgPool;

use crate::auth::Identity;
use crate::config::QuotaConfig;
use crate::quota::fail_open;
use crate::quota::policy::{self, CounterState, IdentityClass};
use crate::quota::store::CounterStore;

/// Read-only quota probe result, returned verbatim by `POST /api/check-limit`.
/// Field names match the wire contract consumed by the web client.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LimitStatus {
    pub is_anonymous: bool,
    pub has_reached_limit: bool,
    /// Questions left; `null` means unlimited (paid account)
    pub questions_left: Option<u32>,
    pub days_to_reset: Option<i64>,
}

impl LimitStatus {
    /// The anonymous shape computed from a client-supplied counter. Also the
    /// fallback every failure path degrades to.
    pub fn anonymous(anonymous_count: u32, config: &QuotaConfig) -> Self {
        let left = config.anonymous_limit.saturating_sub(anonymous_count);
        Self {
            is_anonymous: true,
            has_reached_limit: left == 0,
            questions_left: Some(left),
            days_to_reset: None,
        }
    }
}

/// Result of the mutating gate call, one per user-initiated question
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub can_proceed: bool,
    pub is_anonymous: bool,
    /// Questions left *after* the one just consumed; `null` means unlimited
    pub questions_left: Option<u32>,
    pub days_to_reset: Option<i64>,
    /// Post-increment anonymous counter for the client to persist locally;
    /// `null` for accounts
    pub new_anonymous_count: Option<u32>,
}

/// Orchestration in front of every LLM dispatch: resolve the counter state,
/// apply the policy, and either consume a question or deny.
///
/// Neither entry point ever returns an error. The only hard-stop is the
/// explicit limit-reached denial; storage failures degrade to a permissive
/// outcome through the fail-open policy.
pub struct QuotaGate;

impl QuotaGate {
    /// Side-effect-free probe, safe to call on page load. Never mutates a
    /// counter and never fails: a broken store yields the anonymous fallback
    /// shape built from the client-supplied counter.
    pub async fn check(
        pool: &PgPool,
        config: &QuotaConfig,
        identity: &Identity,
        anonymous_count: u32,
    ) -> LimitStatus {
        let account_id = match identity {
            Identity::Anonymous => return LimitStatus::anonymous(anonymous_count, config),
            Identity::Account { id, .. } => *id,
        };

        let counter = match CounterStore::read(pool, account_id).await {
            Ok(counter) => counter,
            Err(e) => {
                return fail_open(
                    "quota check: counter read failed",
                    &e,
                    LimitStatus::anonymous(anonymous_count, config),
                )
            }
        };

        let class = if counter.is_paid_user {
            IdentityClass::Paid
        } else {
            IdentityClass::Free
        };
        let state = CounterState {
            used: counter.questions_count.max(0) as u32,
            last_reset: Some(counter.last_questions_reset),
        };

        let decision = policy::decide(class, &state, chrono::Utc::now(), config);

        LimitStatus {
            is_anonymous: false,
            has_reached_limit: !decision.allowed,
            questions_left: decision.remaining,
            days_to_reset: decision.days_to_reset,
        }
    }

    /// The mutating gate call, invoked exactly once per question immediately
    /// before dispatching to the LLM provider. On a permitted submission the
    /// stored counter is incremented (with a lazy physical reset first when
    /// the window has elapsed); on denial nothing is mutated.
    ///
    /// `questions_left` is reported post-increment: "left after this one".
    pub async fn submit(
        pool: &PgPool,
        config: &QuotaConfig,
        identity: &Identity,
        anonymous_count: u32,
    ) -> SubmitOutcome {
        let account_id = match identity {
            Identity::Anonymous => return Self::submit_anonymous(anonymous_count, config),
            Identity::Account { id, .. } => *id,
        };

        let permissive = SubmitOutcome {
            can_proceed: true,
            is_anonymous: false,
            questions_left: None,
            days_to_reset: None,
            new_anonymous_count: None,
        };

        let counter = match CounterStore::read(pool, account_id).await {
            Ok(counter) => counter,
            Err(e) => return fail_open("quota submit: counter read failed", &e, permissive),
        };

        let now = chrono::Utc::now();
        let class = if counter.is_paid_user {
            IdentityClass::Paid
        } else {
            IdentityClass::Free
        };
        let state = CounterState {
            used: counter.questions_count.max(0) as u32,
            last_reset: Some(counter.last_questions_reset),
        };

        let decision = policy::decide(class, &state, now, config);

        if !decision.allowed {
            return SubmitOutcome {
                can_proceed: false,
                is_anonymous: false,
                questions_left: Some(0),
                days_to_reset: decision.days_to_reset,
                new_anonymous_count: None,
            };
        }

        // Consume the question. An elapsed window is physically reset here,
        // folding this submission into the fresh window.
        let window_elapsed =
            class == IdentityClass::Free && policy::window_elapsed(&state, now, config);
        let write = if window_elapsed {
            CounterStore::reset_and_increment(pool, account_id).await
        } else {
            CounterStore::increment(pool, account_id).await
        };
        if let Err(e) = write {
            return fail_open("quota submit: counter increment failed", &e, permissive);
        }

        SubmitOutcome {
            can_proceed: true,
            is_anonymous: false,
            questions_left: decision.remaining.map(|r| r.saturating_sub(1)),
            days_to_reset: if window_elapsed {
                Some(config.reset_period_days)
            } else {
                decision.days_to_reset
            },
            new_anonymous_count: None,
        }
    }

    /// Anonymous submissions never touch the database; the client-local
    /// counter arrives with the request and the post-increment value goes
    /// back for the client to persist.
    fn submit_anonymous(anonymous_count: u32, config: &QuotaConfig) -> SubmitOutcome {
        let state = CounterState::anonymous(anonymous_count);
        let decision = policy::decide(
            IdentityClass::Anonymous,
            &state,
            chrono::Utc::now(),
            config,
        );

        if !decision.allowed {
            return SubmitOutcome {
                can_proceed: false,
                is_anonymous: true,
                questions_left: Some(0),
                days_to_reset: None,
                new_anonymous_count: Some(anonymous_count),
            };
        }

        let new_count = anonymous_count + 1;
        SubmitOutcome {
            can_proceed: true,
            is_anonymous: true,
            questions_left: Some(config.anonymous_limit.saturating_sub(new_count)),
            days_to_reset: None,
            new_anonymous_count: Some(new_count),
        }
    }
}
