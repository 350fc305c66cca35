//! Rendering a [`TrimPlan`] as an FFmpeg `-filter_complex` graph.

use super::TrimPlan;

/// Render the plan as a filter graph string.
///
/// Each segment contributes a `trim`/`setpts` chain on input video and an
/// `atrim`/`asetpts` chain on input audio. The graph ends with a single
/// `concat` that emits the combined `[v]` and `[a]` streams.
///
/// Timestamps use Rust's shortest round-trip float formatting, so `2.0`
/// renders as `2` and `2.5` as `2.5`.
#[must_use]
pub fn filter_graph(plan: &TrimPlan) -> String {
    let mut graph: String = plan
        .trims()
        .iter()
        .map(|trim| {
            format!(
                "[0:v]trim=start={start}:end={end},setpts=PTS-STARTPTS[{v}];\
                 [0:a]atrim=start={start}:end={end},asetpts=PTS-STARTPTS[{a}];",
                start = trim.start,
                end = trim.end,
                v = trim.video_tag(),
                a = trim.audio_tag(),
            )
        })
        .collect();

    let concat = plan.concat();
    for (video, audio) in &concat.inputs {
        graph.push_str(&format!("[{video}][{audio}]"));
    }
    graph.push_str(&format!(
        "concat=n={n}:v={vo}:a={ao}[{vl}][{al}]",
        n = concat.inputs.len(),
        vo = concat.video_outputs,
        ao = concat.audio_outputs,
        vl = concat.video_output,
        al = concat.audio_output,
    ));

    graph
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::plan::build;
    use crate::silence::Interval;

    #[test]
    fn test_two_segment_graph() {
        let plan = build(&[Interval::new(0.0, 2.0), Interval::new(5.0, 10.0)]).unwrap();
        assert_eq!(
            filter_graph(&plan),
            "[0:v]trim=start=0:end=2,setpts=PTS-STARTPTS[v0];\
             [0:a]atrim=start=0:end=2,asetpts=PTS-STARTPTS[a0];\
             [0:v]trim=start=5:end=10,setpts=PTS-STARTPTS[v1];\
             [0:a]atrim=start=5:end=10,asetpts=PTS-STARTPTS[a1];\
             [v0][a0][v1][a1]concat=n=2:v=1:a=1[v][a]"
        );
    }

    #[test]
    fn test_fractional_timestamps_are_kept() {
        let plan = build(&[Interval::new(1.25, 3.5)]).unwrap();
        let graph = filter_graph(&plan);
        assert!(graph.contains("trim=start=1.25:end=3.5,"));
        assert!(graph.ends_with("[v0][a0]concat=n=1:v=1:a=1[v][a]"));
    }

    #[test]
    fn test_every_segment_resets_timestamps() {
        let intervals: Vec<Interval> = (0..5)
            .map(|i| Interval::new(f64::from(i) * 3.0, f64::from(i) * 3.0 + 1.0))
            .collect();
        let graph = filter_graph(&build(&intervals).unwrap());
        assert_eq!(graph.matches(",setpts=PTS-STARTPTS[").count(), 5);
        assert_eq!(graph.matches(",asetpts=PTS-STARTPTS[").count(), 5);
        assert!(graph.contains("concat=n=5:"));
    }
}
