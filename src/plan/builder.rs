//! Trim plan types and builder.

use std::fmt;

use serde::Serialize;

use crate::constants::render::{AUDIO_OUTPUT_LABEL, VIDEO_OUTPUT_LABEL};
use crate::error::{Error, Result};
use crate::silence::Interval;

/// Kind of elementary stream carried by a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    /// Video frames.
    Video,
    /// Audio samples.
    Audio,
}

/// Label of one trimmed stream, unique within a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StreamTag {
    /// Stream kind.
    pub kind: StreamKind,
    /// Position of the owning segment.
    pub position: usize,
}

impl fmt::Display for StreamTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            StreamKind::Video => write!(f, "v{}", self.position),
            StreamKind::Audio => write!(f, "a{}", self.position),
        }
    }
}

/// Extraction of one audible interval from the source.
///
/// Both the video and audio streams are cut to `[start, end)` and then have
/// their timestamps shifted so the piece starts at zero. Without that shift
/// the concatenated pieces keep their absolute source timestamps and the
/// output freezes or drops audio at every splice point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentTrim {
    /// Position of this segment in the output.
    pub position: usize,
    /// Start in source time, seconds.
    pub start: f64,
    /// End in source time, seconds.
    pub end: f64,
}

impl SegmentTrim {
    /// Tag of the trimmed video stream.
    #[must_use]
    pub const fn video_tag(&self) -> StreamTag {
        StreamTag {
            kind: StreamKind::Video,
            position: self.position,
        }
    }

    /// Tag of the trimmed audio stream.
    #[must_use]
    pub const fn audio_tag(&self) -> StreamTag {
        StreamTag {
            kind: StreamKind::Audio,
            position: self.position,
        }
    }

    /// Length of the piece in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Final splice of every trimmed pair into one video and one audio stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcatDirective {
    /// Video/audio pairs in output order.
    pub inputs: Vec<(StreamTag, StreamTag)>,
    /// Number of combined video outputs.
    pub video_outputs: usize,
    /// Number of combined audio outputs.
    pub audio_outputs: usize,
    /// Label of the combined video stream.
    pub video_output: String,
    /// Label of the combined audio stream.
    pub audio_output: String,
}

/// Ordered per-segment trims plus the concatenation that joins them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrimPlan {
    trims: Vec<SegmentTrim>,
    concat: ConcatDirective,
}

impl TrimPlan {
    /// Per-segment trims in output order.
    #[must_use]
    pub fn trims(&self) -> &[SegmentTrim] {
        &self.trims
    }

    /// The concatenation step.
    #[must_use]
    pub fn concat(&self) -> &ConcatDirective {
        &self.concat
    }

    /// Number of segments spliced together.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.trims.len()
    }

    /// Duration of the rendered output in seconds.
    #[must_use]
    pub fn output_duration(&self) -> f64 {
        self.trims.iter().map(SegmentTrim::duration).sum()
    }
}

/// Build the trim plan for an ordered list of audible intervals.
///
/// Segment order is preserved exactly; trim `i` corresponds to
/// `segments[i]`.
///
/// # Errors
///
/// Returns [`Error::EmptyInput`] when `segments` is empty.
pub fn build(segments: &[Interval]) -> Result<TrimPlan> {
    if segments.is_empty() {
        return Err(Error::EmptyInput);
    }

    let trims: Vec<SegmentTrim> = segments
        .iter()
        .enumerate()
        .map(|(position, interval)| SegmentTrim {
            position,
            start: interval.start,
            end: interval.end,
        })
        .collect();

    let concat = ConcatDirective {
        inputs: trims.iter().map(|t| (t.video_tag(), t.audio_tag())).collect(),
        video_outputs: 1,
        audio_outputs: 1,
        video_output: VIDEO_OUTPUT_LABEL.to_string(),
        audio_output: AUDIO_OUTPUT_LABEL.to_string(),
    };

    Ok(TrimPlan { trims, concat })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_build_rejects_empty() {
        assert!(matches!(build(&[]), Err(Error::EmptyInput)));
    }

    #[test]
    fn test_tags_display() {
        let trim = SegmentTrim {
            position: 3,
            start: 1.0,
            end: 2.0,
        };
        assert_eq!(trim.video_tag().to_string(), "v3");
        assert_eq!(trim.audio_tag().to_string(), "a3");
    }

    #[test]
    fn test_concat_pairs_follow_trims() {
        let plan = build(&[Interval::new(0.0, 1.0), Interval::new(2.0, 4.0)]).unwrap();
        let pairs: Vec<String> = plan
            .concat()
            .inputs
            .iter()
            .map(|(v, a)| format!("{v}{a}"))
            .collect();
        assert_eq!(pairs, vec!["v0a0", "v1a1"]);
        assert_eq!(plan.concat().video_outputs, 1);
        assert_eq!(plan.concat().audio_outputs, 1);
    }

    #[test]
    fn test_output_duration() {
        let plan = build(&[Interval::new(0.0, 2.0), Interval::new(5.0, 10.0)]).unwrap();
        assert_eq!(plan.output_duration(), 7.0);
    }

    #[test]
    fn test_plan_serializes() {
        let plan = build(&[Interval::new(0.0, 2.0)]).unwrap();
        let json = serde_json::to_string(&plan).unwrap();
        assert!(json.contains("\"trims\""));
        assert!(json.contains("\"kind\":\"video\""));
        assert!(json.contains("\"video_output\":\"v\""));
    }
}
