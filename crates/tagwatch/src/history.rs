//! Bounded per-tag value history.

use smol_str::SmolStr;

/// Default number of retained samples per tag.
pub const DEFAULT_HISTORY_CAP: usize = 100;

/// Bounded FIFO time series of past values for one tag.
///
/// Values and timestamps are parallel sequences of equal length; once the
/// cap is reached the oldest sample is evicted first. Histories are keyed by
/// tag name and live independently of the tag itself.
#[derive(Debug, Clone, PartialEq)]
pub struct TagHistory {
    values: Vec<f64>,
    stamps: Vec<SmolStr>,
    cap: usize,
}

impl TagHistory {
    /// Empty history retaining at most `cap` samples.
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self {
            values: Vec::new(),
            stamps: Vec::new(),
            cap,
        }
    }

    /// Append a sample, evicting the oldest entries beyond the cap.
    pub fn push(&mut self, value: f64, stamp: impl Into<SmolStr>) {
        self.values.push(value);
        self.stamps.push(stamp.into());
        while self.values.len() > self.cap {
            self.values.remove(0);
            self.stamps.remove(0);
        }
    }

    /// Recorded values, oldest first.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Timestamps parallel to [`Self::values`].
    #[must_use]
    pub fn stamps(&self) -> &[SmolStr] {
        &self.stamps
    }

    /// Most recent sample, if any.
    #[must_use]
    pub fn last(&self) -> Option<(f64, &SmolStr)> {
        let value = self.values.last().copied()?;
        let stamp = self.stamps.last()?;
        Some((value, stamp))
    }

    /// Number of recorded samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no sample has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Configured sample cap.
    #[must_use]
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Drop all recorded samples; the cap is kept.
    pub fn clear(&mut self) {
        self.values.clear();
        self.stamps.clear();
    }
}

impl Default for TagHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_keeps_values_and_stamps_parallel() {
        let mut history = TagHistory::default();
        assert!(history.is_empty());

        history.push(10.0, "12:00:00");

        assert_eq!(history.len(), 1);
        assert_eq!(history.values(), &[10.0]);
        assert_eq!(history.stamps()[0], "12:00:00");
        assert_eq!(history.last(), Some((10.0, &SmolStr::new("12:00:00"))));
    }

    #[test]
    fn cap_evicts_oldest_first() {
        let mut history = TagHistory::new(3);
        for (value, stamp) in [
            (1.0, "12:00:00"),
            (2.0, "12:00:01"),
            (3.0, "12:00:02"),
            (4.0, "12:00:03"),
            (5.0, "12:00:04"),
        ] {
            history.push(value, stamp);
        }

        assert_eq!(history.values(), &[3.0, 4.0, 5.0]);
        let stamps: Vec<&str> = history.stamps().iter().map(SmolStr::as_str).collect();
        assert_eq!(stamps, ["12:00:02", "12:00:03", "12:00:04"]);
    }

    #[test]
    fn samples_stay_in_insertion_order() {
        let mut history = TagHistory::default();
        for idx in 0..10 {
            history.push(f64::from(idx), format!("stamp_{idx}"));
        }
        assert_eq!(history.len(), 10);
        for idx in 0..10 {
            assert!((history.values()[idx] - idx as f64).abs() < f64::EPSILON);
            assert_eq!(history.stamps()[idx], format!("stamp_{idx}").as_str());
        }
    }

    #[test]
    fn clear_removes_all_samples_but_keeps_cap() {
        let mut history = TagHistory::new(5);
        history.push(10.0, "12:00:00");
        history.push(20.0, "12:00:01");

        history.clear();

        assert!(history.is_empty());
        assert_eq!(history.cap(), 5);
    }

    #[test]
    fn default_cap_is_one_hundred() {
        assert_eq!(TagHistory::default().cap(), DEFAULT_HISTORY_CAP);
        assert_eq!(DEFAULT_HISTORY_CAP, 100);
    }
}
