//! Selection of the history entries a rate can be measured from.

use crate::alerts::{HistoryEntry, HistorySeries};

/// Valid measurements of one alert, split the way the rate engine needs them.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedHistory<'a> {
    /// The alert's own measurement (last history entry).
    pub current: &'a HistoryEntry,
    /// Times of every entry with a magnitude, all bands, in history order.
    pub valid_times: Vec<f64>,
    /// Entries with a magnitude taken in the current filter, in history order.
    pub same_filter: Vec<&'a HistoryEntry>,
}

impl<'a> ExtractedHistory<'a> {
    /// Apply the validity and filter-match masks to a history.
    pub fn extract(history: &'a HistorySeries) -> Option<Self> {
        let current = history.current()?;
        let valid: Vec<bool> = history
            .entries()
            .iter()
            .map(|entry| entry.magpsf.is_some())
            .collect();
        let filter_match: Vec<bool> = history
            .entries()
            .iter()
            .map(|entry| entry.fid == current.fid)
            .collect();

        let valid_times = history
            .entries()
            .iter()
            .zip(&valid)
            .filter(|(_, keep)| **keep)
            .map(|(entry, _)| entry.jd)
            .collect();
        let same_filter = history
            .entries()
            .iter()
            .zip(valid.iter().zip(&filter_match))
            .filter(|(_, (v, f))| **v && **f)
            .map(|(entry, _)| entry)
            .collect();

        Some(Self {
            current,
            valid_times,
            same_filter,
        })
    }

    /// Days between the last two valid detections in any band.
    pub fn days_since_last_detection(&self) -> Option<f64> {
        match self.valid_times.as_slice() {
            [.., previous, last] => Some(last - previous),
            _ => None,
        }
    }

    /// The last two same-filter measurements, oldest first.
    pub fn last_pair(&self) -> Option<(&'a HistoryEntry, &'a HistoryEntry)> {
        match self.same_filter.as_slice() {
            [.., previous, last] => Some((*previous, *last)),
            _ => None,
        }
    }
}
