//! Toolpath Model Builder
//!
//! Owns the layered structure while a parse is running. The interpreter
//! decides what to append; the builder only keeps the structure consistent:
//! every layer has at least one segment and every segment at least one point.

use std::mem;

use super::model::{Layer, MoveKind, PathSegment, PathType, Point};

#[derive(Debug)]
pub struct ToolpathBuilder {
    /// Closed layers, in order
    layers: Vec<Layer>,
    /// Closed segments of the layer being filled
    segments: Vec<PathSegment>,
    /// Segment receiving points
    open: PathSegment,
}

impl ToolpathBuilder {
    /// Start with one open layer holding a travel segment seeded at `origin`
    pub fn new(origin: Point, layer_thickness: f64) -> Self {
        Self {
            layers: Vec::new(),
            segments: Vec::new(),
            open: PathSegment::new(MoveKind::Travel, PathType::Custom, layer_thickness, origin),
        }
    }

    /// Number of layers closed so far
    pub fn closed_layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Append a point, opening a new segment if the kind or type changed
    pub fn push_point(
        &mut self,
        kind: MoveKind,
        path_type: &PathType,
        layer_thickness: f64,
        point: Point,
    ) {
        if !self.open.accepts(kind, path_type) {
            let seed = self.open.last_point();
            let next = PathSegment::new(kind, path_type.clone(), layer_thickness, seed);
            let closed = mem::replace(&mut self.open, next);
            self.segments.push(closed);
        }
        self.open.push(point);
    }

    /// Close the current layer and start a new one
    ///
    /// The new layer begins with a continuation of the open segment so the
    /// path stays contiguous across the boundary.
    pub fn close_layer(&mut self) {
        let continuation = self.open.continuation();
        let closed = mem::replace(&mut self.open, continuation);
        self.segments.push(closed);
        self.layers.push(Layer::new(mem::take(&mut self.segments)));
    }

    /// Close the in-progress layer and return every layer
    pub fn finish(mut self) -> Vec<Layer> {
        self.segments.push(self.open);
        self.layers.push(Layer::new(self.segments));
        self.layers
    }

    /// Return only the layers closed so far, dropping the in-progress one
    pub fn into_closed_layers(self) -> Vec<Layer> {
        self.layers
    }
}
