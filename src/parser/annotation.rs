//! Comment/Annotation Classifier
//!
//! Slicers embed semantic hints in comments: Cura writes `;TYPE:` tags and
//! `;LAYER:` markers, Slic3r writes bare keywords like `; perimeter`.
//! This module finds those hints and strips the comment off the line.

use crate::toolpath::PathType;

/// Marker that starts a comment
pub const COMMENT_START: char = ';';

/// Line prefix carrying the path classification
pub const TYPE_PREFIX: &str = ";TYPE:";

/// Comment prefix announcing a new layer
pub const LAYER_MARKER: &str = "LAYER:";

/// Result of classifying one raw line
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation<'a> {
    /// Line content with any comment removed
    pub code: &'a str,
    /// Path classification requested by the line, if any
    pub path_type: Option<PathType>,
    /// Whether the line carries a comment at all
    pub has_comment: bool,
    /// Whether the comment marks a layer boundary
    pub layer_boundary: bool,
}

/// Classify a raw line and split off its comment
pub fn classify_line(line: &str) -> Annotation<'_> {
    let mut path_type = line
        .strip_prefix(TYPE_PREFIX)
        .map(|tag| PathType::from_tag(tag.trim()));

    let Some(start) = line.find(COMMENT_START) else {
        return Annotation {
            code: line,
            path_type,
            has_comment: false,
            layer_boundary: false,
        };
    };

    let comment = line[start + 1..].trim();
    if let Some(keyword_type) = keyword_path_type(comment) {
        path_type = Some(keyword_type);
    }

    Annotation {
        code: &line[..start],
        path_type,
        has_comment: true,
        layer_boundary: comment.starts_with(LAYER_MARKER),
    }
}

/// Slic3r-style bare keywords
fn keyword_path_type(comment: &str) -> Option<PathType> {
    match comment {
        "fill" => Some(PathType::Fill),
        "perimeter" => Some(PathType::WallInner),
        "skirt" => Some(PathType::Skirt),
        _ => None,
    }
}
