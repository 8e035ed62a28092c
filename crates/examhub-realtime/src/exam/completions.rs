//! Exams submitted per local calendar day.

use chrono::{Local, NaiveDate};
use dashmap::DashMap;

/// Counts submitted exams per day.
#[derive(Debug, Default)]
pub struct DailyCompletions {
    counts: DashMap<NaiveDate, u64>,
}

impl DailyCompletions {
    /// Create an empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Today's local date.
    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Count one completion on `date`, returning the new total for that day.
    pub fn record(&self, date: NaiveDate) -> u64 {
        let mut count = self.counts.entry(date).or_insert(0);
        *count += 1;
        *count
    }

    /// Completions on `date`.
    pub fn count(&self, date: NaiveDate) -> u64 {
        self.counts.get(&date).map(|c| *c).unwrap_or(0)
    }

    /// Forget days before `date`.
    pub fn prune_before(&self, date: NaiveDate) {
        self.counts.retain(|day, _| *day >= date);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_per_day() {
        let completions = DailyCompletions::new();
        let monday = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();

        assert_eq!(completions.record(monday), 1);
        assert_eq!(completions.record(monday), 2);
        assert_eq!(completions.record(tuesday), 1);
        assert_eq!(completions.count(monday), 2);

        completions.prune_before(tuesday);
        assert_eq!(completions.count(monday), 0);
        assert_eq!(completions.count(tuesday), 1);
    }
}
