//! Intended content as produced by the text-generation collaborator, and
//! its validation against a document.

use crate::error::{Error, Result};
use crate::types::{ContentItem, Point, ShapeRole};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Intended content for a whole document, one entry per slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntendedContent {
    pub slides: Vec<SlideIntent>,
}

/// Intended content for one slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideIntent {
    /// Target slide; the entry's position in the list when absent.
    #[serde(default)]
    pub slide_index: Option<usize>,

    /// Records in intended order.
    #[serde(default)]
    pub items: Vec<IntentRecord>,
}

/// One raw record as emitted upstream. `text` is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentRecord {
    #[serde(default)]
    pub role_hint: Option<ShapeRole>,
    #[serde(default)]
    pub name_hint: Option<String>,
    #[serde(default)]
    pub position_hint: Option<Point>,
    #[serde(default)]
    pub text: Option<String>,
}

impl IntentRecord {
    /// A record carrying only text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
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

/// Why a slide's intended content was set aside or trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationKind {
    /// The slide's intent was malformed and the slide was skipped.
    ConfigurationError,
    /// A record had blank text and was dropped.
    EmptyIntent,
}

/// A note about one slide's intended content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideAnnotation {
    pub slide_index: usize,
    pub kind: AnnotationKind,
    pub message: String,
}

impl SlideAnnotation {
    fn configuration_error(slide_index: usize, message: impl Into<String>) -> Self {
        Self {
            slide_index,
            kind: AnnotationKind::ConfigurationError,
            message: message.into(),
        }
    }
}

/// Validated items for one slide, sorted by intended order.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideItems {
    pub slide_index: usize,
    pub items: Vec<ContentItem>,
}

/// Outcome of validating intended content against a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedIntent {
    pub slides: Vec<SlideItems>,
    pub annotations: Vec<SlideAnnotation>,
}

impl ValidatedIntent {
    /// Items for a given slide, if that slide survived validation.
    pub fn items_for(&self, slide_index: usize) -> Option<&[ContentItem]> {
        self.slides
            .iter()
            .find(|s| s.slide_index == slide_index)
            .map(|s| s.items.as_slice())
    }

    /// Whether a slide was skipped as malformed.
    pub fn is_skipped(&self, slide_index: usize) -> bool {
        self.items_for(slide_index).is_none()
            && self.annotations.iter().any(|a| {
                a.slide_index == slide_index && a.kind == AnnotationKind::ConfigurationError
            })
    }
}

impl IntendedContent {
    pub fn new(slides: Vec<SlideIntent>) -> Self {
        Self { slides }
    }

    /// Parse intended content from JSON.
    ///
    /// Accepts either `{"slides": [...]}` or a bare array of slide entries.
    pub fn from_json_str(json: &str) -> Result<Self> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Wrapped(IntendedContent),
            Bare(Vec<SlideIntent>),
        }

        let value: serde_json::Value = serde_json::from_str(json)?;
        let wire = serde_json::from_value::<Wire>(value).map_err(|_| {
            Error::InvalidIntent(
                "expected {\"slides\": [...]} or an array of slide entries".to_string(),
            )
        })?;
        Ok(match wire {
            Wire::Wrapped(content) => content,
            Wire::Bare(slides) => Self { slides },
        })
    }

    /// Load intended content from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Turn raw records into content items for a document of `slide_count` slides.
    ///
    /// A malformed slide entry is skipped with a configuration-error
    /// annotation; every other slide proceeds.
    pub fn validate(&self, slide_count: usize) -> ValidatedIntent {
        let mut validated = ValidatedIntent::default();
        let mut seen = BTreeSet::new();

        for (position, entry) in self.slides.iter().enumerate() {
            let slide_index = entry.slide_index.unwrap_or(position);

            if slide_index >= slide_count {
                log::warn!(
                    "Skipping intent for slide {}: document has {} slides",
                    slide_index,
                    slide_count
                );
                validated.annotations.push(SlideAnnotation::configuration_error(
                    slide_index,
                    format!(
                        "slide index {} is out of range for a document with {} slides",
                        slide_index, slide_count
                    ),
                ));
                continue;
            }

            if !seen.insert(slide_index) {
                log::warn!("Skipping duplicate intent for slide {}", slide_index);
                validated.annotations.push(SlideAnnotation::configuration_error(
                    slide_index,
                    format!("slide index {} appears more than once", slide_index),
                ));
                continue;
            }

            match validate_records(slide_index, &entry.items) {
                Ok((items, notes)) => {
                    validated.annotations.extend(notes);
                    validated.slides.push(SlideItems { slide_index, items });
                }
                Err(annotation) => {
                    log::warn!("Skipping slide {}: {}", slide_index, annotation.message);
                    validated.annotations.push(annotation);
                }
            }
        }

        validated.slides.sort_by_key(|s| s.slide_index);
        validated
    }
}

fn validate_records(
    slide_index: usize,
    records: &[IntentRecord],
) -> std::result::Result<(Vec<ContentItem>, Vec<SlideAnnotation>), SlideAnnotation> {
    let mut items = Vec::with_capacity(records.len());
    let mut notes = Vec::new();

    for (order, record) in records.iter().enumerate() {
        let Some(text) = record.text.as_deref() else {
            return Err(SlideAnnotation::configuration_error(
                slide_index,
                format!("item {} has no text field", order),
            ));
        };

        if let Some(point) = record.position_hint {
            let in_frame = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
            if !in_frame(point.x) || !in_frame(point.y) {
                return Err(SlideAnnotation::configuration_error(
                    slide_index,
                    format!(
                        "item {} has position hint ({}, {}) outside the unit frame",
                        order, point.x, point.y
                    ),
                ));
            }
        }

        if text.trim().is_empty() {
            notes.push(SlideAnnotation {
                slide_index,
                kind: AnnotationKind::EmptyIntent,
                message: format!("item {} has blank text and was dropped", order),
            });
            continue;
        }

        items.push(ContentItem {
            slide_index,
            role_hint: record.role_hint,
            text: text.to_string(),
            name_hint: record.name_hint.clone(),
            position_hint: record.position_hint,
            order,
        });
    }

    Ok((items, notes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide(index: Option<usize>, items: Vec<IntentRecord>) -> SlideIntent {
        SlideIntent {
            slide_index: index,
            items,
        }
    }

    #[test]
    fn test_parse_wrapped_and_bare() {
        let wrapped = IntendedContent::from_json_str(
            r#"{"slides": [{"items": [{"role_hint": "Title", "text": "Hello"}]}]}"#,
        )
        .unwrap();
        let bare =
            IntendedContent::from_json_str(r#"[{"items": [{"role_hint": "Title", "text": "Hello"}]}]"#)
                .unwrap();
        assert_eq!(wrapped, bare);
        assert_eq!(wrapped.slides[0].items[0].role_hint, Some(ShapeRole::Title));
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        assert!(matches!(
            IntendedContent::from_json_str(r#"{"pages": []}"#),
            Err(Error::InvalidIntent(_))
        ));
        assert!(matches!(
            IntendedContent::from_json_str("[{"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_index_alignment_when_slide_index_absent() {
        let content = IntendedContent::new(vec![
            slide(None, vec![IntentRecord::text("first")]),
            slide(None, vec![IntentRecord::text("second")]),
        ]);
        let validated = content.validate(2);
        assert!(validated.annotations.is_empty());
        assert_eq!(validated.items_for(1).unwrap()[0].text, "second");
        assert_eq!(validated.items_for(1).unwrap()[0].slide_index, 1);
    }

    #[test]
    fn test_out_of_range_slide_is_skipped() {
        let content = IntendedContent::new(vec![
            slide(Some(0), vec![IntentRecord::text("kept")]),
            slide(Some(5), vec![IntentRecord::text("lost")]),
        ]);
        let validated = content.validate(1);
        assert_eq!(validated.slides.len(), 1);
        assert!(validated.is_skipped(5));
        assert!(!validated.is_skipped(0));
    }

    #[test]
    fn test_missing_text_skips_whole_slide() {
        let content = IntendedContent::new(vec![slide(
            Some(0),
            vec![IntentRecord::text("ok"), IntentRecord::default()],
        )]);
        let validated = content.validate(1);
        assert!(validated.items_for(0).is_none());
        assert_eq!(validated.annotations.len(), 1);
        assert_eq!(validated.annotations[0].kind, AnnotationKind::ConfigurationError);
    }

    #[test]
    fn test_position_hint_outside_frame_skips_slide() {
        let content = IntendedContent::new(vec![slide(
            Some(0),
            vec![IntentRecord::text("x").with_position(0.5, 1.5)],
        )]);
        assert!(content.validate(1).is_skipped(0));
    }

    #[test]
    fn test_duplicate_slide_index_skips_second_entry() {
        let content = IntendedContent::new(vec![
            slide(Some(0), vec![IntentRecord::text("a")]),
            slide(Some(0), vec![IntentRecord::text("b")]),
        ]);
        let validated = content.validate(1);
        assert_eq!(validated.items_for(0).unwrap()[0].text, "a");
        assert!(!validated.is_skipped(0));
        assert_eq!(validated.annotations.len(), 1);
        assert_eq!(validated.annotations[0].kind, AnnotationKind::ConfigurationError);
    }

    #[test]
    fn test_blank_text_dropped_with_note() {
        let content = IntendedContent::new(vec![slide(
            Some(0),
            vec![IntentRecord::text("  "), IntentRecord::text("Body")],
        )]);
        let validated = content.validate(1);
        let items = validated.items_for(0).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].order, 1);
        assert_eq!(validated.annotations[0].kind, AnnotationKind::EmptyIntent);
    }
}
