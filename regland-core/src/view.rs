//! Genomic view-state engine.
//!
//! Owns the zoom level and view offset for the gene region viewer and
//! recomputes window bounds for every zoom, pan, and wheel gesture. All
//! positions are in base pairs; `view_start` is an offset within the base
//! window, which itself is anchored in absolute coordinates at `base_start`.

use crate::types::{GenomicPos, GenomicRegion};

pub const ZOOM_STEP: f64 = 0.5;
pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 10.0;

/// Multiplicative zoom factor for wheel gestures.
pub const WHEEL_ZOOM_FACTOR: f64 = 1.5;

/// Fraction of the current window a single pan step moves.
pub const PAN_FRACTION: f64 = 0.1;

/// Floor for the base window so short (or coordinate-less) genes still get
/// a usable span.
pub const MIN_BASE_WINDOW: f64 = 100_000.0;

/// The base window is the gene body length scaled by this factor, so the
/// body sits inside the window with margins on both sides.
pub const GENE_WINDOW_SCALE: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDirection {
    In,
    Out,
}

/// Base window span shown at zoom level 1, derived from gene length.
pub fn base_window_size(gene_len: GenomicPos) -> f64 {
    (gene_len as f64 * GENE_WINDOW_SCALE).max(MIN_BASE_WINDOW)
}

/// View state for a single selected gene.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneViewport {
    /// Absolute bp coordinate of the base window's left edge.
    base_start: f64,
    /// Span of the base window (the window at zoom level 1).
    base_size: f64,
    zoom: f64,
    /// Offset of the visible window within the base window.
    view_start: f64,
}

impl GeneViewport {
    /// Creates a viewport for a gene body, centered and reset to zoom 1.
    pub fn new(gene_body: GenomicRegion) -> Self {
        let mut vp = Self {
            base_start: 0.0,
            base_size: MIN_BASE_WINDOW,
            zoom: MIN_ZOOM,
            view_start: 0.0,
        };
        vp.set_gene(gene_body);
        vp
    }

    /// Re-anchors the viewport on a new gene body. Always resets zoom and
    /// offset; a gene change must never inherit the previous view.
    pub fn set_gene(&mut self, gene_body: GenomicRegion) {
        self.base_size = base_window_size(gene_body.len());
        self.base_start = (gene_body.center() as f64 - self.base_size / 2.0).max(0.0);
        self.reset();
    }

    pub fn zoom_level(&self) -> f64 {
        self.zoom
    }

    pub fn base_size(&self) -> f64 {
        self.base_size
    }

    pub fn window_size(&self) -> f64 {
        self.base_size / self.zoom
    }

    /// Offset of the visible window within the base window.
    pub fn view_start(&self) -> f64 {
        self.view_start
    }

    pub fn max_view_start(&self) -> f64 {
        (self.base_size - self.window_size()).max(0.0)
    }

    /// Absolute bp coordinate of the visible window's left edge.
    pub fn abs_view_start(&self) -> f64 {
        self.base_start + self.view_start
    }

    /// Absolute bp range of the visible window.
    pub fn abs_view_range(&self) -> (f64, f64) {
        let start = self.abs_view_start();
        (start, start + self.window_size())
    }

    /// Zoom level 1, gene body (the middle 60% of the base window) centered.
    pub fn reset(&mut self) {
        self.zoom = MIN_ZOOM;
        let body_center = (0.2 * self.base_size + 0.8 * self.base_size) / 2.0;
        self.view_start = (body_center - self.window_size() / 2.0).max(0.0);
        self.clamp();
    }

    pub fn zoom_in(&mut self) {
        self.step_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.step_zoom(self.zoom - ZOOM_STEP);
    }

    /// Applies a stepped zoom change, keeping the center of the current
    /// view fixed.
    fn step_zoom(&mut self, new_zoom: f64) {
        let center = self.view_start + self.window_size() / 2.0;
        self.zoom = new_zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.view_start = (center - self.window_size() / 2.0).max(0.0);
        self.clamp();
    }

    /// Wheel zoom: the genomic position under the cursor stays under the
    /// cursor. `cursor_ratio` is the cursor's horizontal position within
    /// the view in [0, 1].
    pub fn zoom_at_cursor(&mut self, cursor_ratio: f64, direction: WheelDirection) {
        let ratio = cursor_ratio.clamp(0.0, 1.0);
        let anchor = self.view_start + self.window_size() * ratio;

        let factor = match direction {
            WheelDirection::In => WHEEL_ZOOM_FACTOR,
            WheelDirection::Out => 1.0 / WHEEL_ZOOM_FACTOR,
        };
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);

        self.view_start = anchor - self.window_size() * ratio;
        self.clamp();
    }

    /// Shifts the view by one pan step. A no-op at zoom level 1 where the
    /// window already spans the whole base window.
    pub fn pan(&mut self, direction: PanDirection) {
        let step = self.window_size() * PAN_FRACTION;
        self.view_start += match direction {
            PanDirection::Left => -step,
            PanDirection::Right => step,
        };
        self.clamp();
    }

    /// Viewport over another gene's coordinates sharing this viewport's
    /// zoom level and relative pan offset. Species tracks use this to stay
    /// in lockstep with the reference track while keeping their own
    /// coordinate frames.
    pub fn rebase(&self, gene_body: GenomicRegion) -> GeneViewport {
        let mut vp = GeneViewport::new(gene_body);
        vp.zoom = self.zoom;
        let max = self.max_view_start();
        let frac = if max > 0.0 { self.view_start / max } else { 0.0 };
        vp.view_start = frac * vp.max_view_start();
        vp.clamp();
        vp
    }

    /// Invariant enforced after every operation:
    /// `0 <= view_start <= max(0, base_size - window_size)`.
    fn clamp(&mut self) {
        self.view_start = self.view_start.clamp(0.0, self.max_view_start());
    }
}
