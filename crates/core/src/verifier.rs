//! Checking written shapes against the intended content.
//!
//! Verification is a pure read of the document: running it twice on an
//! unchanged document gives identical reports.

use crate::config::VerifierConfig;
use crate::engine::SlidePlan;
use crate::matcher::SlideMatches;
use crate::normalize::{normalize_for_comparison, text_similarity};
use crate::types::{ContentItem, Document, ShapeId, Slide};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How bad a mismatch is. Critical mismatches are eligible for repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

/// What went wrong with a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MismatchKind {
    /// The shape shows nothing.
    Empty,
    /// The shape still shows a vendor prompt such as "Click to add text".
    DefaultText,
    /// The shape shows something other than the intended text.
    TextMismatch,
    /// No shape holds the item: it was never matched or could not be written.
    Unassigned,
}

/// A discrepancy between an intended item and what the slide shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mismatch {
    pub slide_index: usize,
    /// Order index of the intended item.
    pub item: usize,
    /// Shape holding the item, if any.
    pub shape: Option<ShapeId>,
    pub severity: Severity,
    pub kind: MismatchKind,
    pub expected: String,
    pub actual: String,
    /// Similarity score, for text mismatches.
    pub similarity: Option<f64>,
}

/// Verification result for one slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideReport {
    pub slide_index: usize,
    pub total_items: usize,
    pub passed: usize,
    pub mismatches: Vec<Mismatch>,
    pub success_rate: f64,
}

/// Overall verdict of a verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
    Pass,
    Warning,
    Fail,
}

/// Verification result for a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub slides: Vec<SlideReport>,
    pub total_items: usize,
    pub passed: usize,
    pub success_rate: f64,
    pub status: VerificationStatus,
}

impl VerificationReport {
    fn from_slides(slides: Vec<SlideReport>, warning_budget: usize) -> Self {
        let total_items = slides.iter().map(|s| s.total_items).sum();
        let passed = slides.iter().map(|s| s.passed).sum();
        let mut report = Self {
            slides,
            total_items,
            passed,
            success_rate: rate(passed, total_items),
            status: VerificationStatus::Pass,
        };
        report.status = report.grade(warning_budget);
        report
    }

    fn grade(&self, warning_budget: usize) -> VerificationStatus {
        match (self.critical_count(), self.warning_count()) {
            (0, 0) => VerificationStatus::Pass,
            (0, w) if w <= warning_budget => VerificationStatus::Warning,
            _ => VerificationStatus::Fail,
        }
    }

    /// All mismatches in slide, then item, order.
    pub fn mismatches(&self) -> impl Iterator<Item = &Mismatch> {
        self.slides.iter().flat_map(|s| s.mismatches.iter())
    }

    /// Critical mismatches only.
    pub fn critical(&self) -> impl Iterator<Item = &Mismatch> {
        self.mismatches()
            .filter(|m| m.severity == Severity::Critical)
    }

    pub fn critical_count(&self) -> usize {
        self.critical().count()
    }

    pub fn warning_count(&self) -> usize {
        self.mismatches()
            .filter(|m| m.severity == Severity::Warning)
            .count()
    }

    pub fn slide(&self, slide_index: usize) -> Option<&SlideReport> {
        self.slides.iter().find(|s| s.slide_index == slide_index)
    }
}

fn rate(passed: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        passed as f64 / total as f64
    }
}

/// Classifies what each matched shape shows against its intended text.
#[derive(Debug, Clone)]
pub struct Verifier {
    config: VerifierConfig,
    /// Default prompts in normalized form.
    default_texts: BTreeSet<String>,
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new(VerifierConfig::default())
    }
}

impl Verifier {
    pub fn new(config: VerifierConfig) -> Self {
        let default_texts = config
            .default_texts
            .iter()
            .map(|t| normalize_for_comparison(t))
            .filter(|t| !t.is_empty())
            .collect();
        Self {
            config,
            default_texts,
        }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Whether `text` is one of the configured vendor prompts.
    pub fn is_default_text(&self, text: &str) -> bool {
        self.default_texts.contains(&normalize_for_comparison(text))
    }

    /// Classify what a shape shows. `None` means the item passes.
    pub fn classify(
        &self,
        expected: &str,
        actual: &str,
    ) -> Option<(Severity, MismatchKind, Option<f64>)> {
        let actual = actual.trim();
        if actual.is_empty() {
            return Some((Severity::Critical, MismatchKind::Empty, None));
        }
        if self.is_default_text(actual) {
            return Some((Severity::Critical, MismatchKind::DefaultText, None));
        }

        let score = text_similarity(expected, actual);
        if score < self.config.critical_below {
            Some((Severity::Critical, MismatchKind::TextMismatch, Some(score)))
        } else if score < self.config.pass_at {
            Some((Severity::Warning, MismatchKind::TextMismatch, Some(score)))
        } else {
            None
        }
    }

    /// Check one item against the shape holding it, or against nothing.
    pub fn check_item(
        &self,
        slide: &Slide,
        item: &ContentItem,
        shape: Option<ShapeId>,
    ) -> Option<Mismatch> {
        let unassigned = |shape: Option<ShapeId>| Mismatch {
            slide_index: slide.index,
            item: item.order,
            shape,
            severity: Severity::Critical,
            kind: MismatchKind::Unassigned,
            expected: item.text.clone(),
            actual: String::new(),
            similarity: None,
        };

        let Some(id) = shape else {
            return Some(unassigned(None));
        };
        let Some(target) = slide.shape(id).filter(|s| !s.detached) else {
            return Some(unassigned(Some(id)));
        };

        let actual = target.text();
        self.classify(&item.text, &actual)
            .map(|(severity, kind, similarity)| Mismatch {
                slide_index: slide.index,
                item: item.order,
                shape: Some(id),
                severity,
                kind,
                expected: item.text.clone(),
                actual: actual.trim().to_string(),
                similarity,
            })
    }

    /// Verify every intended item of a slide against its assignment.
    pub fn verify_slide(
        &self,
        slide: &Slide,
        items: &[ContentItem],
        matches: &SlideMatches,
    ) -> SlideReport {
        let mut sorted: Vec<&ContentItem> = items.iter().collect();
        sorted.sort_by_key(|item| item.order);

        let mismatches: Vec<Mismatch> = sorted
            .iter()
            .filter_map(|item| {
                let shape = matches.for_item(item.order).map(|m| m.shape);
                self.check_item(slide, item, shape)
            })
            .collect();

        let total_items = items.len();
        let passed = total_items - mismatches.len();
        SlideReport {
            slide_index: slide.index,
            total_items,
            passed,
            mismatches,
            success_rate: rate(passed, total_items),
        }
    }

    /// Verify all planned slides of a document.
    pub fn verify_document(&self, document: &Document, plans: &[SlidePlan]) -> VerificationReport {
        let slides = plans
            .iter()
            .filter_map(|plan| {
                document
                    .slide(plan.slide_index)
                    .map(|slide| self.verify_slide(slide, &plan.items, &plan.matches))
            })
            .collect();

        let report = VerificationReport::from_slides(slides, self.config.warning_budget);
        log::info!(
            "Verification: {}/{} items correct ({:.1}%), {} critical, {} warnings",
            report.passed,
            report.total_items,
            report.success_rate * 100.0,
            report.critical_count(),
            report.warning_count()
        );
        report
    }
}
