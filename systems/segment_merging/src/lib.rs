#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that merges per-strand blocking distances into draw segments.
//!
//! Strands blocked at the same distance form one [`SegmentEvent`]. Walking the
//! events in ascending order, the merger emits middle segments for the strands
//! still travelling and a tail segment for the strands that stop, collapsing
//! adjacent strand indices into a single wide segment each time.

use std::collections::BTreeSet;

use astral_beam_core::{SegmentEvent, SegmentKind, VisualSegment};

/// Half the length of a segment slice; the head spans one cell centred on the logical origin.
pub const HALF_SLICE: f32 = 0.5;

/// Builds the fixed head segment covering every strand around the logical origin.
///
/// Returns `None` for a beam without strands.
#[must_use]
pub fn head_segment(strand_count: u32) -> Option<VisualSegment> {
    (strand_count > 0).then_some(VisualSegment {
        kind: SegmentKind::Head,
        first_strand: 0,
        width: strand_count,
        start: -HALF_SLICE,
        end: HALF_SLICE,
    })
}

/// Groups strand distances into events of identical distance, ascending.
///
/// Strand indices inside each event are ascending. Non-finite distances are
/// ignored. The output buffer is cleared before it is filled.
pub fn group_events(distances: &[f32], out: &mut Vec<SegmentEvent>) {
    out.clear();

    let mut ordered: Vec<(f32, u32)> = distances
        .iter()
        .zip(0_u32..)
        .filter(|(distance, _)| distance.is_finite())
        .map(|(&distance, index)| (distance, index))
        .collect();
    ordered.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    for (distance, index) in ordered {
        match out.last_mut() {
            Some(event) if event.distance == distance => event.strands.push(index),
            _ => out.push(SegmentEvent {
                distance,
                strands: vec![index],
            }),
        }
    }
}

/// Splits ascending strand indices into maximal runs of consecutive values.
///
/// Each run is reported as `(first_index, width)`.
pub fn contiguous_runs<I>(indices: I) -> Vec<(u32, u32)>
where
    I: IntoIterator<Item = u32>,
{
    let mut runs: Vec<(u32, u32)> = Vec::new();
    for index in indices {
        match runs.last_mut() {
            Some((first, width)) if *first + *width == index => *width += 1,
            _ => runs.push((index, 1)),
        }
    }
    runs
}

/// Segment merger that reuses its event and active-set buffers between steps.
#[derive(Debug, Default)]
pub struct SegmentMerger {
    events: Vec<SegmentEvent>,
    active: BTreeSet<u32>,
}

impl SegmentMerger {
    /// Creates a new merger with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events computed by the most recent call to [`SegmentMerger::handle`].
    #[must_use]
    pub fn events(&self) -> &[SegmentEvent] {
        &self.events
    }

    /// Emits middle and tail segments for the provided per-strand distances.
    ///
    /// `distances[i]` is the blocking distance of strand `i` measured from the
    /// logical origin. Middle segments start where the head ends and are cut at
    /// half a cell before every event; tails cover one cell centred on the
    /// event distance. Segments never reach back into the head. The output
    /// buffer is cleared before it is filled.
    pub fn handle(&mut self, distances: &[f32], out: &mut Vec<VisualSegment>) {
        out.clear();
        group_events(distances, &mut self.events);

        self.active.clear();
        for event in &self.events {
            self.active.extend(event.strands.iter().copied());
        }

        let mut last_boundary = HALF_SLICE;
        for event in &self.events {
            let boundary = event.distance - HALF_SLICE;
            if boundary > last_boundary {
                if !self.active.is_empty() {
                    emit_runs(
                        self.active.iter().copied(),
                        SegmentKind::Middle,
                        last_boundary,
                        boundary,
                        out,
                    );
                }
                last_boundary = boundary;
            }

            let tail_end = event.distance + HALF_SLICE;
            if tail_end > last_boundary {
                emit_runs(
                    event.strands.iter().copied(),
                    SegmentKind::Tail,
                    last_boundary,
                    tail_end,
                    out,
                );
            }

            for strand in &event.strands {
                let _ = self.active.remove(strand);
            }
        }
    }
}

fn emit_runs<I>(indices: I, kind: SegmentKind, start: f32, end: f32, out: &mut Vec<VisualSegment>)
where
    I: IntoIterator<Item = u32>,
{
    out.extend(
        contiguous_runs(indices)
            .into_iter()
            .map(|(first_strand, width)| VisualSegment {
                kind,
                first_strand,
                width,
                start,
                end,
            }),
    );
}
