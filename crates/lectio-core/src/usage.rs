use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Token totals for one text-generation service in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyUsage {
    pub service: String,
    pub year: i32,
    pub month: u32,
    pub requests: u64,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
}

impl MonthlyUsage {
    #[must_use]
    pub fn total_tokens(&self) -> u64 {
        self.total_input_tokens + self.total_output_tokens
    }
}

type UsageKey = (String, i32, u32);

/// Accumulates token usage per service and month. Safe to share across tasks.
#[derive(Debug, Default)]
pub struct UsageTracker {
    entries: Mutex<HashMap<UsageKey, MonthlyUsage>>,
}

impl UsageTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, service: &str, input_tokens: u64, output_tokens: u64) {
        self.record_at(service, Utc::now(), input_tokens, output_tokens);
    }

    pub fn record_at(
        &self,
        service: &str,
        at: DateTime<Utc>,
        input_tokens: u64,
        output_tokens: u64,
    ) {
        let (year, month) = (at.year(), at.month());
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        let usage = entries
            .entry((service.to_string(), year, month))
            .or_insert_with(|| MonthlyUsage {
                service: service.to_string(),
                year,
                month,
                requests: 0,
                total_input_tokens: 0,
                total_output_tokens: 0,
            });

        usage.requests += 1;
        usage.total_input_tokens += input_tokens;
        usage.total_output_tokens += output_tokens;

        tracing::debug!(
            service,
            year,
            month,
            input_tokens,
            output_tokens,
            "Recorded token usage"
        );
    }

    #[must_use]
    pub fn get(&self, service: &str, year: i32, month: u32) -> Option<MonthlyUsage> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(&(service.to_string(), year, month)).cloned()
    }

    /// All months, ordered by service then date.
    #[must_use]
    pub fn snapshot(&self) -> Vec<MonthlyUsage> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut all: Vec<MonthlyUsage> = entries.values().cloned().collect();
        all.sort_by(|a, b| {
            a.service
                .cmp(&b.service)
                .then(a.year.cmp(&b.year))
                .then(a.month.cmp(&b.month))
        });
        all
    }
}
