//! Per-call-site rate limiting for log output.
//!
//! Legacy applications probe unsupported states in tight loops; every warning
//! site gets a fixed budget and goes quiet once it is spent.

use std::sync::atomic::{AtomicU32, Ordering};

pub const DEFAULT_LOG_LIMIT: u32 = 100;

static LOG_LIMIT: AtomicU32 = AtomicU32::new(DEFAULT_LOG_LIMIT);

/// Sets the budget applied to every call site. Sites that already spent more
/// than the new limit stay silent.
pub fn set_log_limit(limit: u32) {
    LOG_LIMIT.store(limit, Ordering::Relaxed);
}

pub fn current_log_limit() -> u32 {
    LOG_LIMIT.load(Ordering::Relaxed)
}

/// Usage counter backing one `log_limit!` call site.
#[derive(Debug, Default)]
pub struct LogBudget {
    used: AtomicU32,
}

impl LogBudget {
    pub const fn new() -> Self {
        Self {
            used: AtomicU32::new(0),
        }
    }

    /// Returns `true` while the site may still emit.
    pub fn take(&self) -> bool {
        let limit = current_log_limit();
        if self.used.load(Ordering::Relaxed) >= limit {
            return false;
        }
        self.used.fetch_add(1, Ordering::Relaxed) < limit
    }
}

/// `tracing` event that is emitted at most [`current_log_limit`] times per call site.
macro_rules! log_limit {
    ($level:ident, $($arg:tt)+) => {{
        static BUDGET: $crate::log_limit::LogBudget = $crate::log_limit::LogBudget::new();
        if BUDGET.take() {
            ::tracing::$level!($($arg)+);
        }
    }};
}

pub(crate) use log_limit;
