//! Domain types for slide decks and the content intended for them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A whole deck: slides in presentation order.
///
/// Structure is fixed once loaded; only shape text changes afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Slides in presentation order.
    pub slides: Vec<Slide>,
}

impl Document {
    /// Create a document from its slides.
    pub fn new(slides: Vec<Slide>) -> Self {
        Self { slides }
    }

    /// Get a slide by its 0-based index.
    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    /// Get a mutable slide by its 0-based index.
    pub fn slide_mut(&mut self, index: usize) -> Option<&mut Slide> {
        self.slides.get_mut(index)
    }

    /// Number of slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Whether the document has no slides.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

/// Size of the slide frame in the same units as shape geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlideFrame {
    pub width: f64,
    pub height: f64,
}

impl Default for SlideFrame {
    /// A unit frame: geometry is already normalized.
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
        }
    }
}

/// A single slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    /// 0-based slide index.
    pub index: usize,

    /// Layout archetype name, e.g. "Two Content" or "Comparison".
    pub layout: String,

    /// Frame size used to normalize shape geometry.
    #[serde(default)]
    pub frame: SlideFrame,

    /// Shapes in document order.
    pub shapes: Vec<Shape>,
}

impl Slide {
    /// Create an empty slide with a unit frame.
    pub fn new(index: usize, layout: impl Into<String>) -> Self {
        Self {
            index,
            layout: layout.into(),
            frame: SlideFrame::default(),
            shapes: Vec::new(),
        }
    }

    /// Set the frame size.
    pub fn with_frame(mut self, width: f64, height: f64) -> Self {
        self.frame = SlideFrame { width, height };
        self
    }

    /// Append a shape, assigning it the next document-order id.
    pub fn push_shape(
        &mut self,
        name: impl Into<String>,
        role: ShapeRole,
        bbox: BoundingBox,
        text: &str,
    ) -> ShapeId {
        let id = ShapeId(self.shapes.len());
        let mut shape = Shape::new(id, name, role, bbox);
        if !text.is_empty() {
            shape.set_text(text, false);
            shape.modified = false;
        }
        self.shapes.push(shape);
        id
    }

    /// Builder form of [`Slide::push_shape`].
    pub fn with_shape(
        mut self,
        name: impl Into<String>,
        role: ShapeRole,
        bbox: BoundingBox,
        text: &str,
    ) -> Self {
        self.push_shape(name, role, bbox, text);
        self
    }

    /// Look up a shape by id.
    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    /// Look up a shape by id for mutation.
    pub fn shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }
}

/// Document-order index of a shape within its slide.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ShapeId(pub usize);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a shape is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeRole {
    Title,
    Body,
    Picture,
    Table,
    SlideNumber,
    Other,
}

impl ShapeRole {
    /// Pictures, tables and slide numbers never receive text.
    pub fn is_excluded(&self) -> bool {
        matches!(
            self,
            ShapeRole::Picture | ShapeRole::Table | ShapeRole::SlideNumber
        )
    }

    /// Coarse category used when comparing a role hint with a shape.
    pub fn category(&self) -> RoleCategory {
        match self {
            ShapeRole::Title => RoleCategory::Heading,
            ShapeRole::Body | ShapeRole::Other => RoleCategory::Content,
            ShapeRole::Picture | ShapeRole::Table | ShapeRole::SlideNumber => {
                RoleCategory::Excluded
            }
        }
    }
}

/// Coarse grouping of shape roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleCategory {
    Heading,
    Content,
    Excluded,
}

/// A point, either in source units or normalized to the slide frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Position and size of a shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Center of the box.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Scale into a unit frame, clamping every component to [0, 1].
    pub fn normalized(&self, frame: SlideFrame) -> Self {
        let scale = |value: f64, extent: f64| {
            if extent > 0.0 && value.is_finite() {
                (value / extent).clamp(0.0, 1.0)
            } else {
                0.0
            }
        };
        Self {
            x: scale(self.x, frame.width),
            y: scale(self.y, frame.height),
            w: scale(self.w, frame.width),
            h: scale(self.h, frame.height),
        }
    }
}

/// Character formatting of a text run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFormat {
    /// Typeface name.
    pub font: Option<String>,
    /// Size in hundredths of a point.
    pub size: Option<u32>,
    /// RGB colour as six hex digits.
    pub color: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
}

/// A run of uniformly formatted text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default)]
    pub format: RunFormat,
}

impl TextRun {
    pub fn new(text: impl Into<String>, format: RunFormat) -> Self {
        Self {
            text: text.into(),
            format,
        }
    }
}

/// A paragraph of runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
}

impl Paragraph {
    /// Concatenated run text.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A positioned element on a slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Document-order index within the slide.
    pub id: ShapeId,

    /// Shape name, often with a trailing placeholder number.
    pub name: String,

    pub role: ShapeRole,

    /// Geometry in the slide frame's units.
    pub bbox: BoundingBox,

    /// Text content as paragraphs of runs.
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,

    /// Set when the container no longer holds this shape.
    #[serde(default)]
    pub detached: bool,

    /// Set once the text was replaced after load.
    #[serde(default)]
    pub modified: bool,
}

impl Shape {
    /// Create a shape with no text.
    pub fn new(id: ShapeId, name: impl Into<String>, role: ShapeRole, bbox: BoundingBox) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            bbox,
            paragraphs: Vec::new(),
            detached: false,
            modified: false,
        }
    }

    /// Visible text, paragraphs joined by newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format of the first run that exists, if any.
    pub fn first_run_format(&self) -> Option<&RunFormat> {
        self.paragraphs
            .iter()
            .flat_map(|p| p.runs.iter())
            .next()
            .map(|r| &r.format)
    }

    /// Replace the visible text.
    ///
    /// Each line becomes one paragraph holding a single run. With
    /// `preserve_runs`, the runs copy the format of the first existing run;
    /// otherwise they carry the default format.
    pub fn set_text(&mut self, text: &str, preserve_runs: bool) {
        let format = if preserve_runs {
            self.first_run_format().cloned().unwrap_or_default()
        } else {
            RunFormat::default()
        };

        self.paragraphs = text
            .split('\n')
            .map(|line| Paragraph {
                runs: vec![TextRun::new(line.trim_end_matches('\r'), format.clone())],
            })
            .collect();
        self.modified = true;
    }
}

/// One piece of intended content, after validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Slide the item belongs to.
    pub slide_index: usize,

    /// Role the item is meant for, if known.
    pub role_hint: Option<ShapeRole>,

    /// Text to place.
    pub text: String,

    /// Name of the shape the item was authored against, if known.
    pub name_hint: Option<String>,

    /// Normalized center the item was authored at, if known.
    pub position_hint: Option<Point>,

    /// Position within the slide's intended list.
    pub order: usize,
}

impl ContentItem {
    /// Create an item with only text and order.
    pub fn new(slide_index: usize, order: usize, text: impl Into<String>) -> Self {
        Self {
            slide_index,
            role_hint: None,
            text: text.into(),
            name_hint: None,
            position_hint: None,
            order,
        }
    }

    pub fn with_role(mut self, role: ShapeRole) -> Self {
        self.role_hint = Some(role);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name_hint = Some(name.into());
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position_hint = Some(Point::new(x, y));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excluded_roles() {
        assert!(ShapeRole::Picture.is_excluded());
        assert!(ShapeRole::Table.is_excluded());
        assert!(ShapeRole::SlideNumber.is_excluded());
        assert!(!ShapeRole::Title.is_excluded());
        assert!(!ShapeRole::Body.is_excluded());
        assert!(!ShapeRole::Other.is_excluded());
    }

    #[test]
    fn test_role_categories() {
        assert_eq!(ShapeRole::Title.category(), RoleCategory::Heading);
        assert_eq!(ShapeRole::Body.category(), RoleCategory::Content);
        assert_eq!(ShapeRole::Other.category(), RoleCategory::Content);
        assert_eq!(ShapeRole::Table.category(), RoleCategory::Excluded);
    }

    #[test]
    fn test_bbox_normalized_and_clamped() {
        let frame = SlideFrame {
            width: 10.0,
            height: 5.0,
        };
        let bbox = BoundingBox::new(5.0, 1.0, 2.0, 10.0).normalized(frame);
        assert_eq!(bbox, BoundingBox::new(0.5, 0.2, 0.2, 1.0));

        let degenerate = SlideFrame {
            width: 0.0,
            height: 0.0,
        };
        assert_eq!(
            BoundingBox::new(3.0, 3.0, 1.0, 1.0).normalized(degenerate),
            BoundingBox::default()
        );
    }

    #[test]
    fn test_set_text_preserves_first_run_format() {
        let mut shape = Shape::new(ShapeId(0), "Title 1", ShapeRole::Title, BoundingBox::default());
        let bold = RunFormat {
            font: Some("Calibri".to_string()),
            size: Some(4400),
            bold: Some(true),
            ..Default::default()
        };
        shape.paragraphs = vec![Paragraph {
            runs: vec![
                TextRun::new("Old ", bold.clone()),
                TextRun::new("title", RunFormat::default()),
            ],
        }];

        shape.set_text("New title\nSecond line", true);

        assert_eq!(shape.text(), "New title\nSecond line");
        assert_eq!(shape.paragraphs.len(), 2);
        assert!(shape.paragraphs.iter().all(|p| p.runs.len() == 1));
        assert!(shape.paragraphs.iter().all(|p| p.runs[0].format == bold));
        assert!(shape.modified);
    }

    #[test]
    fn test_set_text_without_prior_runs_uses_default() {
        let mut shape = Shape::new(ShapeId(1), "Body", ShapeRole::Body, BoundingBox::default());
        shape.set_text("Hello", true);
        assert_eq!(shape.text(), "Hello");
        assert_eq!(shape.paragraphs[0].runs[0].format, RunFormat::default());
    }

    #[test]
    fn test_push_shape_assigns_document_order_ids() {
        let mut slide = Slide::new(0, "Title Only");
        let a = slide.push_shape("A", ShapeRole::Title, BoundingBox::default(), "");
        let b = slide.push_shape("B", ShapeRole::Body, BoundingBox::default(), "text");
        assert_eq!(a, ShapeId(0));
        assert_eq!(b, ShapeId(1));
        assert_eq!(slide.shape(b).map(Shape::text), Some("text".to_string()));
        assert!(slide.shape(ShapeId(7)).is_none());
    }
}
