use std::collections::{BTreeMap, BTreeSet};

use astral_beam_core::{
    GridQuery, SegmentHandle, SegmentKind, SegmentSink, SegmentTemplate, VisualSegment,
};
use astral_beam_system_segment_merging::{head_segment, SegmentMerger};
use astral_beam_system_tracing::{trace_strands, BeamGeometry, CollisionResult, StrandAnchor};
use log::{trace, warn};

/// Visual segments owned by one channel, rebuilt every step.
///
/// The head persists and is moved each step; middles and tails are destroyed
/// and recreated from the latest merge.
#[derive(Debug, Default)]
pub(crate) struct BeamVisuals {
    templates: BTreeMap<SegmentKind, SegmentTemplate>,
    reported: BTreeSet<SegmentKind>,
    head: Option<SegmentHandle>,
    segments: Vec<SegmentHandle>,
    merger: SegmentMerger,
    collisions: Vec<CollisionResult>,
    distances: Vec<f32>,
    layout: Vec<VisualSegment>,
}

impl BeamVisuals {
    /// Resolves every segment template once, warning about the missing ones.
    pub(crate) fn resolve<S>(sink: &S) -> Self
    where
        S: SegmentSink,
    {
        let mut visuals = Self::default();
        for kind in SegmentKind::ALL {
            match sink.resolve_template(kind) {
                Some(template) => {
                    let _ = visuals.templates.insert(kind, template);
                }
                None => {
                    warn!("no template for {kind:?} beam segments, they will not be drawn");
                    let _ = visuals.reported.insert(kind);
                }
            }
        }
        visuals
    }

    pub(crate) fn live_segments(&self) -> usize {
        self.segments.len() + usize::from(self.head.is_some())
    }

    /// Recomputes the segment layout for the current geometry.
    ///
    /// Degenerate geometry has nothing to draw and releases every segment.
    pub(crate) fn refresh<G, S>(
        &mut self,
        grid: &G,
        geometry: Option<&BeamGeometry>,
        max_range: f32,
        sink: &mut S,
    ) where
        G: GridQuery,
        S: SegmentSink,
    {
        let Some(geometry) = geometry else {
            self.release(sink);
            return;
        };

        trace_strands(
            grid,
            geometry,
            StrandAnchor::LogicalOrigin,
            max_range,
            &mut self.collisions,
        );
        self.distances.clear();
        self.distances
            .extend(self.collisions.iter().map(|result| result.distance));

        let mut layout = std::mem::take(&mut self.layout);
        self.merger.handle(&self.distances, &mut layout);
        trace!(
            "{} blocking distances merged into {} segments",
            self.merger.events().len(),
            layout.len()
        );

        for handle in self.segments.drain(..) {
            sink.destroy_segment(handle);
        }

        if let Some(head) = head_segment(geometry.strand_count()) {
            self.place_head(geometry, &head, sink);
        }
        for segment in &layout {
            if let Some(handle) = self.create(geometry, segment, sink) {
                self.segments.push(handle);
            }
        }

        self.layout = layout;
    }

    /// Destroys every owned segment.
    pub(crate) fn release<S>(&mut self, sink: &mut S)
    where
        S: SegmentSink,
    {
        if let Some(head) = self.head.take() {
            sink.destroy_segment(head);
        }
        for handle in self.segments.drain(..) {
            sink.destroy_segment(handle);
        }
    }

    fn place_head<S>(&mut self, geometry: &BeamGeometry, head: &VisualSegment, sink: &mut S)
    where
        S: SegmentSink,
    {
        match self.head {
            Some(handle) => {
                let (start, end) = geometry.segment_endpoints(head);
                sink.update_segment(handle, start, end);
            }
            None => self.head = self.create(geometry, head, sink),
        }
    }

    fn create<S>(
        &mut self,
        geometry: &BeamGeometry,
        segment: &VisualSegment,
        sink: &mut S,
    ) -> Option<SegmentHandle>
    where
        S: SegmentSink,
    {
        let template = *self.templates.get(&segment.kind)?;
        let (start, end) = geometry.segment_endpoints(segment);
        match sink.create_segment(template, start, end, segment.width as f32) {
            Ok(handle) => Some(handle),
            Err(error) => {
                if self.reported.insert(segment.kind) {
                    warn!("skipping {:?} beam segment: {error}", segment.kind);
                }
                None
            }
        }
    }
}
