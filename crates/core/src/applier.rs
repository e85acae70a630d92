//! Writing approved text into shapes.

use crate::error::ApplyError;
use crate::types::{ShapeId, Slide};

/// Replaces a shape's visible text, keeping the look of its first run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentApplier;

impl ContentApplier {
    pub fn new() -> Self {
        Self
    }

    /// Write `text` into one shape of `slide`.
    ///
    /// Only the referenced shape is touched. A shape that is gone or
    /// detached yields [`ApplyError::StaleShape`]; pictures, tables and
    /// slide numbers yield [`ApplyError::ExcludedShape`].
    pub fn apply(&self, slide: &mut Slide, shape: ShapeId, text: &str) -> Result<(), ApplyError> {
        let slide_index = slide.index;
        let target = slide
            .shape_mut(shape)
            .filter(|s| !s.detached)
            .ok_or(ApplyError::StaleShape {
                slide: slide_index,
                shape,
            })?;

        if target.role.is_excluded() {
            return Err(ApplyError::ExcludedShape {
                slide: slide_index,
                shape,
                role: target.role,
            });
        }

        target.set_text(text, true);
        log::debug!(
            "Slide {}: wrote {} chars into '{}'",
            slide_index,
            text.chars().count(),
            target.name
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundingBox, Paragraph, RunFormat, ShapeRole, TextRun};

    fn slide() -> Slide {
        Slide::new(2, "Title and Content")
            .with_shape("Title 1", ShapeRole::Title, BoundingBox::default(), "")
            .with_shape("Content Placeholder 2", ShapeRole::Body, BoundingBox::default(), "old")
            .with_shape("Slide Number 3", ShapeRole::SlideNumber, BoundingBox::default(), "3")
    }

    #[test]
    fn test_apply_replaces_text_and_keeps_format() {
        let mut slide = slide();
        let format = RunFormat {
            size: Some(2800),
            color: Some("1F497D".to_string()),
            ..Default::default()
        };
        slide.shapes[1].paragraphs = vec![Paragraph {
            runs: vec![TextRun::new("old", format.clone())],
        }];

        ContentApplier::new()
            .apply(&mut slide, ShapeId(1), "Revenue grew 12% YoY")
            .unwrap();

        let body = &slide.shapes[1];
        assert_eq!(body.text(), "Revenue grew 12% YoY");
        assert_eq!(body.paragraphs[0].runs[0].format, format);
        assert!(body.modified);
        assert!(!slide.shapes[0].modified);
        assert_eq!(slide.shapes[2].text(), "3");
    }

    #[test]
    fn test_apply_creates_default_run() {
        let mut slide = slide();
        ContentApplier::new()
            .apply(&mut slide, ShapeId(0), "Quarterly Results")
            .unwrap();
        assert_eq!(slide.shapes[0].text(), "Quarterly Results");
        assert_eq!(slide.shapes[0].paragraphs[0].runs[0].format, RunFormat::default());
    }

    #[test]
    fn test_apply_to_missing_or_detached_shape_is_stale() {
        let mut slide = slide();
        let err = ContentApplier::new()
            .apply(&mut slide, ShapeId(9), "x")
            .unwrap_err();
        assert_eq!(
            err,
            ApplyError::StaleShape {
                slide: 2,
                shape: ShapeId(9)
            }
        );

        slide.shapes[1].detached = true;
        let err = ContentApplier::new()
            .apply(&mut slide, ShapeId(1), "x")
            .unwrap_err();
        assert!(matches!(err, ApplyError::StaleShape { .. }));
        assert_eq!(slide.shapes[1].text(), "old");
    }

    #[test]
    fn test_apply_refuses_excluded_shape() {
        let mut slide = slide();
        let err = ContentApplier::new()
            .apply(&mut slide, ShapeId(2), "x")
            .unwrap_err();
        assert!(matches!(
            err,
            ApplyError::ExcludedShape {
                role: ShapeRole::SlideNumber,
                ..
            }
        ));
        assert_eq!(slide.shapes[2].text(), "3");
    }
}
