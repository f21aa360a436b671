//! Toolpath entities
//!
//! Plain data types for the reconstructed print: layers hold path segments,
//! path segments hold points. Nothing here knows about G-code syntax.

use std::fmt;

use serde::{Serialize, Serializer};

use super::vector::Vec3;

/// How the head moved between two points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
    /// Non-extruding move
    Travel,
    /// Material fed forward
    Extrude,
    /// Material pulled back
    Retract,
}

impl MoveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveKind::Travel => "travel",
            MoveKind::Extrude => "extrude",
            MoveKind::Retract => "retract",
        }
    }
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic role of a segment within its layer
///
/// Known slicer tags get their own variant; anything else is kept verbatim
/// in `Other` so unusual generators still split segments correctly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum PathType {
    /// Unclassified motion (start code, end code, custom blocks)
    #[default]
    Custom,
    WallOuter,
    WallInner,
    Fill,
    Skin,
    Skirt,
    Support,
    Other(String),
}

impl PathType {
    /// Parse a `;TYPE:` tag
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "CUSTOM" => PathType::Custom,
            "WALL-OUTER" => PathType::WallOuter,
            "WALL-INNER" => PathType::WallInner,
            "FILL" => PathType::Fill,
            "SKIN" => PathType::Skin,
            "SKIRT" => PathType::Skirt,
            "SUPPORT" => PathType::Support,
            other => PathType::Other(other.to_string()),
        }
    }

    /// Tag text as written by the slicer
    pub fn as_str(&self) -> &str {
        match self {
            PathType::Custom => "CUSTOM",
            PathType::WallOuter => "WALL-OUTER",
            PathType::WallInner => "WALL-INNER",
            PathType::Fill => "FILL",
            PathType::Skin => "SKIN",
            PathType::Skirt => "SKIRT",
            PathType::Support => "SUPPORT",
            PathType::Other(tag) => tag,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, PathType::Custom)
    }
}

impl fmt::Display for PathType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PathType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A recorded position with its extrusion annotations
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub position: Vec3,
    /// Accumulated extrusion (mm of filament) when the head reached this point
    pub extrusion: f64,
    /// Extrusion multiplier (M221) active at this point
    pub extrusion_multiplier: f64,
}

impl Point {
    pub fn new(position: Vec3, extrusion: f64, extrusion_multiplier: f64) -> Self {
        Self {
            position,
            extrusion,
            extrusion_multiplier,
        }
    }
}

/// Contiguous run of points sharing a move kind and path type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathSegment {
    kind: MoveKind,
    path_type: PathType,
    layer_thickness: f64,
    points: Vec<Point>,
}

impl PathSegment {
    /// Start a segment at `seed`, usually the last point of the previous one
    pub fn new(kind: MoveKind, path_type: PathType, layer_thickness: f64, seed: Point) -> Self {
        Self {
            kind,
            path_type,
            layer_thickness,
            points: vec![seed],
        }
    }

    pub fn kind(&self) -> MoveKind {
        self.kind
    }

    pub fn path_type(&self) -> &PathType {
        &self.path_type
    }

    /// Layer thickness inferred when the segment was opened
    pub fn layer_thickness(&self) -> f64 {
        self.layer_thickness
    }

    /// Points in order, never empty
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn first_point(&self) -> Point {
        self.points[0]
    }

    pub fn last_point(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Whether a move of this kind and type continues the segment
    pub fn accepts(&self, kind: MoveKind, path_type: &PathType) -> bool {
        self.kind == kind && self.path_type == *path_type
    }

    /// Empty segment with the same kind and type, seeded at this one's end
    pub fn continuation(&self) -> PathSegment {
        PathSegment::new(
            self.kind,
            self.path_type.clone(),
            self.layer_thickness,
            self.last_point(),
        )
    }

    /// Travelled distance along the segment
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| pair[0].position.distance(&pair[1].position))
            .sum()
    }

    pub(crate) fn push(&mut self, point: Point) {
        self.points.push(point);
    }
}

/// One Z slice worth of motion, bounded by layer markers
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Layer {
    segments: Vec<PathSegment>,
}

impl Layer {
    pub(crate) fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Points across all segments, seeds included
    pub fn point_count(&self) -> usize {
        self.segments.iter().map(|s| s.points().len()).sum()
    }

    /// Filament fed by the extruding segments of this layer
    pub fn extruded_length(&self) -> f64 {
        self.segments
            .iter()
            .filter(|s| s.kind() == MoveKind::Extrude)
            .map(|s| s.last_point().extrusion - s.first_point().extrusion)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64, e: f64) -> Point {
        Point::new(Vec3::new(x, 0.0, 0.0), e, 1.0)
    }

    #[test]
    fn test_path_type_tags() {
        assert_eq!(PathType::from_tag("WALL-INNER"), PathType::WallInner);
        assert_eq!(PathType::from_tag("CUSTOM"), PathType::Custom);
        assert_eq!(
            PathType::from_tag("BRIDGE"),
            PathType::Other("BRIDGE".to_string())
        );
        assert_eq!(PathType::Fill.to_string(), "FILL");
        assert_eq!(PathType::Other("BRIDGE".into()).as_str(), "BRIDGE");
        assert!(PathType::default().is_custom());
    }

    #[test]
    fn test_segment_is_seeded() {
        let segment = PathSegment::new(MoveKind::Travel, PathType::Custom, 0.2, point(1.0, 0.0));
        assert_eq!(segment.points().len(), 1);
        assert_eq!(segment.first_point(), segment.last_point());
    }

    #[test]
    fn test_continuation_starts_at_last_point() {
        let mut segment = PathSegment::new(MoveKind::Extrude, PathType::Fill, 0.2, point(0.0, 0.0));
        segment.push(point(10.0, 1.0));

        let next = segment.continuation();
        assert_eq!(next.points(), &[point(10.0, 1.0)]);
        assert!(next.accepts(MoveKind::Extrude, &PathType::Fill));
        assert!(!next.accepts(MoveKind::Travel, &PathType::Fill));
    }

    #[test]
    fn test_layer_extruded_length_ignores_travel() {
        let mut extrude = PathSegment::new(MoveKind::Extrude, PathType::Fill, 0.2, point(0.0, 0.0));
        extrude.push(point(10.0, 2.5));
        let mut travel = PathSegment::new(
            MoveKind::Travel,
            PathType::Fill,
            0.2,
            extrude.last_point(),
        );
        travel.push(point(20.0, 2.5));

        let layer = Layer::new(vec![extrude, travel]);
        assert_eq!(layer.segment_count(), 2);
        assert_eq!(layer.point_count(), 4);
        assert_eq!(layer.extruded_length(), 2.5);
        assert_eq!(layer.segments()[0].length(), 10.0);
    }
}
