#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Presentation-side contracts for Astral Beam adapters.
//!
//! [`SegmentLedger`] owns the visual segment entities requested by beam
//! channels and is the reference implementation of [`SegmentSink`]. The
//! remaining types describe what an adapter draws: coloured segment quads,
//! the cast preview overlay and a plain text frame for terminal output.

use std::{collections::BTreeMap, fmt};

use astral_beam_core::{
    CellCoord, SegmentError, SegmentHandle, SegmentKind, SegmentSink, SegmentTemplate,
};
use glam::Vec2;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque white, used for a cast preview that would be accepted.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Opaque red, used for a cast preview that would overload.
    pub const RED: Self = Self::new(1.0, 0.0, 0.0, 1.0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Color used to outline the affected area of a cast preview.
#[must_use]
pub const fn preview_color(valid: bool) -> Color {
    if valid {
        Color::WHITE
    } else {
        Color::RED
    }
}

/// Base color of the beam body.
const BEAM_COLOR: Color = Color::from_rgb_u8(120, 170, 255);

/// Color used to draw a segment of the provided kind.
///
/// The head glows brightest and tails fade towards the beam's base color.
#[must_use]
pub fn segment_color(kind: SegmentKind) -> Color {
    match kind {
        SegmentKind::Head => BEAM_COLOR.lighten(0.6),
        SegmentKind::Middle => BEAM_COLOR,
        SegmentKind::Tail => BEAM_COLOR.lighten(0.3),
    }
}

/// Live quad drawn for one visual segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentQuad {
    /// Template the quad was instantiated from.
    pub template: SegmentTemplate,
    /// Planar start point of the quad's centre line.
    pub start: Vec2,
    /// Planar end point of the quad's centre line.
    pub end: Vec2,
    /// Quad width measured in strands, one world unit each.
    pub width: f32,
}

impl SegmentQuad {
    /// Color used to fill the quad.
    #[must_use]
    pub fn color(&self) -> Color {
        segment_color(self.template.kind())
    }

    /// Length of the quad along the beam.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// Registry of live visual segments owned on behalf of beam channels.
///
/// Handles are allocated from a monotonic counter and never reused, so a stale
/// handle can never address a newer segment.
#[derive(Clone, Debug)]
pub struct SegmentLedger {
    templates: BTreeMap<SegmentKind, SegmentTemplate>,
    capacity: Option<usize>,
    next_handle: u64,
    live: BTreeMap<SegmentHandle, SegmentQuad>,
}

impl SegmentLedger {
    /// Creates a ledger that provides a template for every segment kind.
    #[must_use]
    pub fn new() -> Self {
        let templates = SegmentKind::ALL
            .into_iter()
            .zip(0_u32..)
            .map(|(kind, id)| (kind, SegmentTemplate::new(kind, id)))
            .collect();
        Self {
            templates,
            capacity: None,
            next_handle: 0,
            live: BTreeMap::new(),
        }
    }

    /// Removes the template of the provided kind, as if its asset failed to load.
    #[must_use]
    pub fn without_template(mut self, kind: SegmentKind) -> Self {
        let _ = self.templates.remove(&kind);
        self
    }

    /// Caps the number of segments that may be alive at once.
    #[must_use]
    pub fn with_capacity_limit(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Number of live segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Reports whether no segment is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Looks up a live segment.
    #[must_use]
    pub fn get(&self, handle: SegmentHandle) -> Option<&SegmentQuad> {
        self.live.get(&handle)
    }

    /// Iterates over live segments in creation order.
    pub fn quads(&self) -> impl Iterator<Item = (SegmentHandle, &SegmentQuad)> + '_ {
        self.live.iter().map(|(handle, quad)| (*handle, quad))
    }

    /// Counts the live segments of one kind.
    #[must_use]
    pub fn count_of(&self, kind: SegmentKind) -> usize {
        self.live
            .values()
            .filter(|quad| quad.template.kind() == kind)
            .count()
    }
}

impl Default for SegmentLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentSink for SegmentLedger {
    fn resolve_template(&self, kind: SegmentKind) -> Option<SegmentTemplate> {
        self.templates.get(&kind).copied()
    }

    fn create_segment(
        &mut self,
        template: SegmentTemplate,
        start: Vec2,
        end: Vec2,
        width: f32,
    ) -> Result<SegmentHandle, SegmentError> {
        if self.templates.get(&template.kind()) != Some(&template) {
            return Err(SegmentError::MissingTemplate(template.kind()));
        }
        if let Some(capacity) = self.capacity {
            if self.live.len() >= capacity {
                return Err(SegmentError::CapacityExhausted { capacity });
            }
        }

        let handle = SegmentHandle::new(self.next_handle);
        self.next_handle += 1;
        let _ = self.live.insert(
            handle,
            SegmentQuad {
                template,
                start,
                end,
                width,
            },
        );
        Ok(handle)
    }

    fn update_segment(&mut self, handle: SegmentHandle, start: Vec2, end: Vec2) {
        if let Some(quad) = self.live.get_mut(&handle) {
            quad.start = start;
            quad.end = end;
        }
    }

    fn destroy_segment(&mut self, handle: SegmentHandle) {
        let _ = self.live.remove(&handle);
    }
}

/// Overlay outlining the cells a cast would hit while the player aims.
#[derive(Clone, Debug, PartialEq)]
pub struct PreviewPresentation {
    /// Cells outlined by the overlay.
    pub cells: Vec<CellCoord>,
    /// Outline color, white when the cast is accepted and red otherwise.
    pub color: Color,
}

impl PreviewPresentation {
    /// Creates a preview overlay for the provided cells and validity.
    #[must_use]
    pub fn new(cells: Vec<CellCoord>, valid: bool) -> Self {
        Self {
            cells,
            color: preview_color(valid),
        }
    }
}

/// Character grid used to draw a beam scenario in a terminal.
///
/// Row zero is printed first. Later marks overwrite earlier ones, so callers
/// draw from the background up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextFrame {
    columns: u32,
    rows: u32,
    glyphs: Vec<char>,
}

impl TextFrame {
    /// Glyph used for empty cells.
    pub const EMPTY: char = '.';

    /// Creates a blank frame with the provided dimensions.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let len = columns as usize * rows as usize;
        Self {
            columns,
            rows,
            glyphs: vec![Self::EMPTY; len],
        }
    }

    /// Marks a cell with a glyph; cells outside the frame are ignored.
    pub fn mark(&mut self, cell: CellCoord, glyph: char) {
        if let Some(index) = self.index(cell) {
            self.glyphs[index] = glyph;
        }
    }

    /// Glyph currently drawn in a cell.
    #[must_use]
    pub fn glyph(&self, cell: CellCoord) -> Option<char> {
        self.index(cell).map(|index| self.glyphs[index])
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let column = u32::try_from(cell.column()).ok()?;
        let row = u32::try_from(cell.row()).ok()?;
        (column < self.columns && row < self.rows)
            .then(|| row as usize * self.columns as usize + column as usize)
    }
}

impl fmt::Display for TextFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns == 0 {
            return Ok(());
        }
        for row in self.glyphs.chunks(self.columns as usize) {
            let line: String = row.iter().collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
