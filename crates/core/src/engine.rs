//! Orchestration: fill a document from intended content, verify it and
//! repair what went wrong.

use crate::applier::ContentApplier;
use crate::config::EngineConfig;
use crate::error::ApplyError;
use crate::intent::{IntendedContent, SlideAnnotation};
use crate::matcher::{MatchResult, Matcher, SlideMatches};
use crate::repairer::{RepairReport, Repairer};
use crate::shape_index::ShapeIndex;
use crate::types::{ContentItem, Document, ShapeId, Slide};
use crate::verifier::{VerificationReport, Verifier};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A write that failed during fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemApplyError {
    pub item: usize,
    pub shape: ShapeId,
    pub error: ApplyError,
}

/// What happened to one slide's content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlidePlan {
    pub slide_index: usize,
    /// Validated items in intended order.
    pub items: Vec<ContentItem>,
    /// Current assignment. Items whose write failed count as unmatched.
    pub matches: SlideMatches,
    pub apply_errors: Vec<ItemApplyError>,
}

impl SlidePlan {
    /// Record `result` as the item's assignment, replacing any previous one.
    pub fn assign(&mut self, result: MatchResult) {
        self.matches.unmatched.retain(|order| *order != result.item);
        match self.matches.matches.iter_mut().find(|m| m.item == result.item) {
            Some(existing) => *existing = result,
            None => {
                self.matches.matches.push(result);
                self.matches.matches.sort_by_key(|m| m.item);
            }
        }
    }

    /// Drop the item's assignment and list it as unmatched.
    fn unassign(&mut self, item: usize) {
        self.matches.matches.retain(|m| m.item != item);
        if !self.matches.unmatched.contains(&item) {
            self.matches.unmatched.push(item);
            self.matches.unmatched.sort_unstable();
        }
    }
}

/// Result of filling a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FillOutcome {
    /// One plan per slide that had valid intended content, by slide index.
    pub plans: Vec<SlidePlan>,
    /// Skipped slides and dropped items.
    pub annotations: Vec<SlideAnnotation>,
}

impl FillOutcome {
    pub fn plan(&self, slide_index: usize) -> Option<&SlidePlan> {
        self.plans.iter().find(|p| p.slide_index == slide_index)
    }

    pub fn matched_count(&self) -> usize {
        self.plans.iter().map(|p| p.matches.matches.len()).sum()
    }

    pub fn unmatched_count(&self) -> usize {
        self.plans.iter().map(|p| p.matches.unmatched.len()).sum()
    }

    /// Every match result across slides, with its slide index.
    pub fn matches(&self) -> impl Iterator<Item = (usize, &MatchResult)> {
        self.plans
            .iter()
            .flat_map(|p| p.matches.matches.iter().map(move |m| (p.slide_index, m)))
    }
}

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub fill: FillOutcome,
    pub verification: VerificationReport,
    pub repair: Option<RepairReport>,
}

impl RunReport {
    /// Success rate after the last step that ran.
    pub fn final_success_rate(&self) -> f64 {
        self.repair
            .as_ref()
            .map(|r| r.post_success_rate)
            .unwrap_or(self.verification.success_rate)
    }

    /// Verification after the last step that ran.
    pub fn final_report(&self) -> &VerificationReport {
        self.repair
            .as_ref()
            .map(|r| &r.post_report)
            .unwrap_or(&self.verification)
    }
}

/// The matching and repair engine.
///
/// Nothing here fails: per-item and per-slide problems are reported in the
/// returned values.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    matcher: Matcher,
    verifier: Verifier,
    applier: ContentApplier,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            matcher: Matcher::new(config.matcher),
            verifier: Verifier::new(config.verifier),
            applier: ContentApplier::new(),
        }
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn verifier(&self) -> &Verifier {
        &self.verifier
    }

    fn repairer(&self) -> Repairer<'_> {
        Repairer::new(&self.matcher, &self.verifier)
    }

    /// Match and write intended content, slide by slide.
    pub fn fill(&self, document: &mut Document, intent: &IntendedContent) -> FillOutcome {
        let validated = intent.validate(document.len());
        let mut slides = slides_by_index(document);

        let plans = validated
            .slides
            .into_iter()
            .filter_map(|entry| {
                let slide = slides.remove(&entry.slide_index)?;
                Some(self.fill_slide(slide, entry.items))
            })
            .collect();

        self.finish_fill(plans, validated.annotations)
    }

    /// Same as [`Engine::fill`] with slides processed in parallel.
    pub fn fill_parallel(&self, document: &mut Document, intent: &IntendedContent) -> FillOutcome {
        let validated = intent.validate(document.len());
        let mut slides = slides_by_index(document);

        let work: Vec<(&mut Slide, Vec<ContentItem>)> = validated
            .slides
            .into_iter()
            .filter_map(|entry| Some((slides.remove(&entry.slide_index)?, entry.items)))
            .collect();
        let plans = work
            .into_par_iter()
            .map(|(slide, items)| self.fill_slide(slide, items))
            .collect();

        self.finish_fill(plans, validated.annotations)
    }

    /// Match and write one slide's items.
    ///
    /// A failed write is recorded and the item counts as unmatched; the
    /// remaining items still proceed.
    pub fn fill_slide(&self, slide: &mut Slide, items: Vec<ContentItem>) -> SlidePlan {
        let index = ShapeIndex::build(slide);
        let matches = self.matcher.match_slide(&items, &index);

        let mut plan = SlidePlan {
            slide_index: slide.index,
            items,
            matches,
            apply_errors: Vec::new(),
        };

        let writes: Vec<MatchResult> = plan.matches.matches.clone();
        for result in writes {
            let Some(item) = plan.items.iter().find(|i| i.order == result.item) else {
                continue;
            };
            if let Err(error) = self.applier.apply(slide, result.shape, &item.text) {
                log::warn!("Slide {} item {}: {}", slide.index, result.item, error);
                plan.apply_errors.push(ItemApplyError {
                    item: result.item,
                    shape: result.shape,
                    error,
                });
                plan.unassign(result.item);
            }
        }
        plan
    }

    fn finish_fill(&self, plans: Vec<SlidePlan>, annotations: Vec<SlideAnnotation>) -> FillOutcome {
        let outcome = FillOutcome { plans, annotations };
        log::info!(
            "Fill: {} slides, {} items matched, {} unmatched, {} annotations",
            outcome.plans.len(),
            outcome.matched_count(),
            outcome.unmatched_count(),
            outcome.annotations.len()
        );
        outcome
    }

    /// Verify the document against what fill planned. Read-only.
    pub fn verify(&self, document: &Document, outcome: &FillOutcome) -> VerificationReport {
        self.verifier.verify_document(document, &outcome.plans)
    }

    /// Repair the Critical mismatches of `report`.
    pub fn repair(
        &self,
        document: &mut Document,
        outcome: &mut FillOutcome,
        report: &VerificationReport,
    ) -> RepairReport {
        self.repairer().repair(document, &mut outcome.plans, report)
    }

    /// Fill, verify and optionally repair.
    pub fn run(
        &self,
        document: &mut Document,
        intent: &IntendedContent,
        auto_repair: bool,
    ) -> RunReport {
        let mut fill = self.fill(document, intent);
        let verification = self.verify(document, &fill);
        let repair = auto_repair.then(|| self.repair(document, &mut fill, &verification));
        RunReport {
            fill,
            verification,
            repair,
        }
    }

    /// Same as [`Engine::run`] with slides processed in parallel. The
    /// result is identical to the sequential run.
    pub fn run_parallel(
        &self,
        document: &mut Document,
        intent: &IntendedContent,
        auto_repair: bool,
    ) -> RunReport {
        let mut fill = self.fill_parallel(document, intent);
        let verification = self.verify(document, &fill);
        let repair = auto_repair.then(|| {
            self.repairer()
                .repair_parallel(document, &mut fill.plans, &verification)
        });
        RunReport {
            fill,
            verification,
            repair,
        }
    }
}

fn slides_by_index(document: &mut Document) -> BTreeMap<usize, &mut Slide> {
    document.slides.iter_mut().enumerate().collect()
}
