//! Per-slide view of the shapes that can take text.

use crate::normalize::trailing_number;
use crate::types::{BoundingBox, Point, ShapeId, ShapeRole, Slide};
use serde::Serialize;

/// A shape eligible for content, with the derived data the matcher needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexedShape {
    pub id: ShapeId,
    pub name: String,
    pub role: ShapeRole,
    /// Geometry normalized to the unit slide frame.
    pub bbox: BoundingBox,
    /// Center of `bbox`.
    pub center: Point,
    /// Integer the shape name ends with, if any.
    pub placeholder_number: Option<u32>,
    /// Text the shape held when the index was built.
    pub text: String,
}

/// Eligible shapes of one slide in document order.
///
/// Pictures, tables, slide numbers and detached shapes never appear here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeIndex {
    pub slide_index: usize,
    pub layout: String,
    shapes: Vec<IndexedShape>,
}

impl ShapeIndex {
    /// Build the index for a slide. Pure read.
    pub fn build(slide: &Slide) -> Self {
        let shapes: Vec<IndexedShape> = slide
            .shapes
            .iter()
            .filter(|s| !s.role.is_excluded() && !s.detached)
            .map(|s| {
                let bbox = s.bbox.normalized(slide.frame);
                IndexedShape {
                    id: s.id,
                    name: s.name.clone(),
                    role: s.role,
                    bbox,
                    center: bbox.center(),
                    placeholder_number: trailing_number(&s.name),
                    text: s.text(),
                }
            })
            .collect();

        log::debug!(
            "Slide {}: {} of {} shapes eligible",
            slide.index,
            shapes.len(),
            slide.shapes.len()
        );

        Self {
            slide_index: slide.index,
            layout: slide.layout.clone(),
            shapes,
        }
    }

    /// Eligible shapes in document order.
    pub fn shapes(&self) -> &[IndexedShape] {
        &self.shapes
    }

    pub fn get(&self, id: ShapeId) -> Option<&IndexedShape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// A copy holding only the shapes `keep` accepts.
    pub fn restricted(&self, keep: impl Fn(&IndexedShape) -> bool) -> Self {
        Self {
            slide_index: self.slide_index,
            layout: self.layout.clone(),
            shapes: self.shapes.iter().filter(|s| keep(s)).cloned().collect(),
        }
    }
}
