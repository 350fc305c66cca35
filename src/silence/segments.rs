//! Audible interval extraction from silence events.

use serde::{Deserialize, Serialize};

use super::SilenceEvent;
use crate::error::{Error, Result};

/// A contiguous audible region `[start, end)` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Inclusive start in seconds.
    pub start: f64,
    /// Exclusive end in seconds.
    pub end: f64,
}

impl Interval {
    /// Create an interval without validation.
    #[must_use]
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Length of the interval in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Sweep silence events into audible intervals.
///
/// `cursor` tracks where the last silence ended. A `Start(t)` past the
/// cursor closes the audible run `[cursor, t)`; a `Start(t)` at or before
/// the cursor closes nothing. An `End(t)` moves the cursor to `t` whether
/// or not a `Start` preceded it. After the stream, any time between the
/// cursor and `total_duration` is audible, unless the stream finished
/// inside a silence that never reported its end.
///
/// Events are taken in arrival order and are neither sorted nor
/// deduplicated; out-of-order timestamps yield out-of-order intervals.
pub fn sweep<I>(events: I, total_duration: f64) -> Vec<Interval>
where
    I: IntoIterator<Item = SilenceEvent>,
{
    let mut cursor = 0.0_f64;
    let mut silence_open = false;
    let mut intervals = Vec::new();

    for event in events {
        match event {
            SilenceEvent::Start(t) => {
                if t > cursor {
                    intervals.push(Interval::new(cursor, t));
                }
                silence_open = true;
            }
            SilenceEvent::End(t) => {
                cursor = t;
                silence_open = false;
            }
        }
    }

    if !silence_open && total_duration > cursor {
        intervals.push(Interval::new(cursor, total_duration));
    }

    intervals
}

/// Sweep silence events and require at least one audible interval.
///
/// # Errors
///
/// Returns [`Error::NoAudibleContent`] if the media is silent end to end.
pub fn audible_segments<I>(events: I, total_duration: f64) -> Result<AudibleSegments>
where
    I: IntoIterator<Item = SilenceEvent>,
{
    let intervals = sweep(events, total_duration);
    if intervals.is_empty() {
        return Err(Error::NoAudibleContent);
    }
    Ok(AudibleSegments(intervals))
}

/// Non-empty, chronologically ordered list of audible intervals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AudibleSegments(Vec<Interval>);

impl AudibleSegments {
    /// Build from externally supplied intervals, checking every invariant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoAudibleContent`] for an empty list and
    /// [`Error::InvalidSegment`] for non-finite values, negative starts,
    /// zero/negative lengths, or overlapping/unordered neighbours.
    pub fn from_intervals(intervals: Vec<Interval>) -> Result<Self> {
        if intervals.is_empty() {
            return Err(Error::NoAudibleContent);
        }

        for (index, interval) in intervals.iter().enumerate() {
            if !interval.start.is_finite() || !interval.end.is_finite() {
                return Err(Error::InvalidSegment {
                    index,
                    reason: "timestamps must be finite".to_string(),
                });
            }
            if interval.start < 0.0 {
                return Err(Error::InvalidSegment {
                    index,
                    reason: format!("start ({}) must not be negative", interval.start),
                });
            }
            if interval.end <= interval.start {
                return Err(Error::InvalidSegment {
                    index,
                    reason: format!(
                        "end ({}) must be greater than start ({})",
                        interval.end, interval.start
                    ),
                });
            }
        }

        for (index, pair) in intervals.windows(2).enumerate() {
            if pair[0].end > pair[1].start {
                return Err(Error::InvalidSegment {
                    index: index + 1,
                    reason: format!(
                        "start ({}) overlaps or precedes the previous segment ending at {}",
                        pair[1].start, pair[0].end
                    ),
                });
            }
        }

        Ok(Self(intervals))
    }

    /// Number of intervals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with slices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the intervals.
    #[must_use]
    pub fn as_slice(&self) -> &[Interval] {
        &self.0
    }

    /// Iterate over the intervals in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Interval> {
        self.0.iter()
    }

    /// Total audible time in seconds.
    #[must_use]
    pub fn kept_duration(&self) -> f64 {
        self.0.iter().map(Interval::duration).sum()
    }

    /// Consume into the underlying vector.
    #[must_use]
    pub fn into_inner(self) -> Vec<Interval> {
        self.0
    }
}

impl<'a> IntoIterator for &'a AudibleSegments {
    type Item = &'a Interval;
    type IntoIter = std::slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl AsRef<[Interval]> for AudibleSegments {
    fn as_ref(&self) -> &[Interval] {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use SilenceEvent::{End, Start};

    #[test]
    fn test_silence_at_head_starts_at_cursor() {
        let intervals = sweep([Start(0.0), End(3.0)], 10.0);
        assert_eq!(intervals, vec![Interval::new(3.0, 10.0)]);
    }

    #[test]
    fn test_silence_at_tail_drops_trailing_interval() {
        let intervals = sweep([Start(7.0), End(10.0)], 10.0);
        assert_eq!(intervals, vec![Interval::new(0.0, 7.0)]);
    }

    #[test]
    fn test_unterminated_silence_runs_to_end() {
        // older ffmpeg builds omit silence_end when the file ends silent
        let intervals = sweep([Start(2.0), End(4.0), Start(6.0)], 10.0);
        assert_eq!(
            intervals,
            vec![Interval::new(0.0, 2.0), Interval::new(4.0, 6.0)]
        );
    }

    #[test]
    fn test_unterminated_silence_from_zero_is_all_silent() {
        assert!(sweep([Start(0.0)], 10.0).is_empty());
    }

    #[test]
    fn test_unmatched_end_advances_cursor() {
        let intervals = sweep([End(1.5), Start(3.0), End(4.0)], 6.0);
        assert_eq!(
            intervals,
            vec![Interval::new(1.5, 3.0), Interval::new(4.0, 6.0)]
        );
    }

    #[test]
    fn test_end_past_duration_leaves_nothing_trailing() {
        let intervals = sweep([Start(5.0), End(12.0)], 10.0);
        assert_eq!(intervals, vec![Interval::new(0.0, 5.0)]);
    }

    #[test]
    fn test_audible_segments_rejects_silent_media() {
        let result = audible_segments([Start(0.0), End(4.0)], 4.0);
        assert!(matches!(result, Err(Error::NoAudibleContent)));
    }

    #[test]
    fn test_kept_duration() {
        let segments = audible_segments([Start(2.0), End(5.0)], 10.0).unwrap();
        assert_eq!(segments.kept_duration(), 7.0);
    }

    #[test]
    fn test_from_intervals_accepts_touching_neighbours() {
        let segments = AudibleSegments::from_intervals(vec![
            Interval::new(0.0, 1.0),
            Interval::new(1.0, 3.0),
        ]);
        assert!(segments.is_ok());
    }

    #[test]
    fn test_from_intervals_rejects_overlap() {
        let result = AudibleSegments::from_intervals(vec![
            Interval::new(0.0, 2.0),
            Interval::new(1.5, 3.0),
        ]);
        assert!(matches!(result, Err(Error::InvalidSegment { index: 1, .. })));
    }

    #[test]
    fn test_from_intervals_rejects_degenerate() {
        let result = AudibleSegments::from_intervals(vec![Interval::new(2.0, 2.0)]);
        assert!(matches!(result, Err(Error::InvalidSegment { index: 0, .. })));
    }

    #[test]
    fn test_from_intervals_rejects_nan() {
        let result = AudibleSegments::from_intervals(vec![Interval::new(f64::NAN, 2.0)]);
        assert!(matches!(result, Err(Error::InvalidSegment { .. })));
    }

    #[test]
    fn test_from_intervals_rejects_empty() {
        let result = AudibleSegments::from_intervals(Vec::new());
        assert!(matches!(result, Err(Error::NoAudibleContent)));
    }
}
