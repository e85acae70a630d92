//! Scoped repair of Critical mismatches.
//!
//! Each Critical mismatch gets one more matching attempt over a small pool:
//! the shape the item landed in plus the shapes the initial pass never
//! matched. Shapes holding correctly placed content are never offered, so
//! repair cannot lower the success rate.

use crate::applier::ContentApplier;
use crate::engine::SlidePlan;
use crate::error::ApplyError;
use crate::matcher::{Matcher, Strategy};
use crate::shape_index::ShapeIndex;
use crate::types::{Document, ShapeId, Slide};
use crate::verifier::{Mismatch, MismatchKind, Severity, VerificationReport, Verifier};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Why a repair attempt did not clear its mismatch.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RepairFailure {
    #[error("no candidate shape left in the repair pool")]
    NoCandidate,

    #[error("could not write the content: {0}")]
    ApplyFailed(ApplyError),

    #[error("still mismatched after repair ({severity:?}/{kind:?})")]
    StillMismatched {
        severity: Severity,
        kind: MismatchKind,
    },

    #[error("slide is not part of the document")]
    SlideMissing,
}

/// Outcome of one repair attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairResult {
    pub mismatch: Mismatch,
    pub attempted: bool,
    pub successful: bool,
    pub strategy: Option<Strategy>,
    /// Shape the content was written to.
    pub shape: Option<ShapeId>,
    /// Text written, when a candidate was found.
    pub applied_text: Option<String>,
    pub error: Option<RepairFailure>,
}

impl RepairResult {
    fn failed(mismatch: &Mismatch, attempted: bool, error: RepairFailure) -> Self {
        Self {
            mismatch: mismatch.clone(),
            attempted,
            successful: false,
            strategy: None,
            shape: None,
            applied_text: None,
            error: Some(error),
        }
    }
}

/// Outcome of a whole repair pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairReport {
    pub results: Vec<RepairResult>,
    pub pre_success_rate: f64,
    pub post_success_rate: f64,
    /// Successful repairs per strategy.
    pub strategy_breakdown: BTreeMap<Strategy, usize>,
    /// Verification of the document after repair.
    pub post_report: VerificationReport,
}

impl RepairReport {
    /// Change in success rate. Never negative.
    pub fn delta(&self) -> f64 {
        self.post_success_rate - self.pre_success_rate
    }

    pub fn attempted_count(&self) -> usize {
        self.results.iter().filter(|r| r.attempted).count()
    }

    pub fn successful_count(&self) -> usize {
        self.results.iter().filter(|r| r.successful).count()
    }
}

/// Re-matches, re-applies and re-verifies items with Critical mismatches.
#[derive(Debug, Clone, Copy)]
pub struct Repairer<'a> {
    matcher: &'a Matcher,
    verifier: &'a Verifier,
    applier: ContentApplier,
}

impl<'a> Repairer<'a> {
    pub fn new(matcher: &'a Matcher, verifier: &'a Verifier) -> Self {
        Self {
            matcher,
            verifier,
            applier: ContentApplier::new(),
        }
    }

    /// Repair every Critical mismatch in `report`, slide by slide.
    pub fn repair(
        &self,
        document: &mut Document,
        plans: &mut [SlidePlan],
        report: &VerificationReport,
    ) -> RepairReport {
        let critical = critical_by_slide(report);
        let (paired, missing) = pair_slides(document, plans);

        let mut results = missing_results(&critical, &missing);
        for (slide, plan) in paired {
            if let Some(mismatches) = critical.get(&plan.slide_index) {
                results.extend(self.repair_slide(slide, plan, mismatches));
            }
        }

        self.finish(document, plans, report, results)
    }

    /// Same as [`Repairer::repair`] with slides repaired in parallel.
    pub fn repair_parallel(
        &self,
        document: &mut Document,
        plans: &mut [SlidePlan],
        report: &VerificationReport,
    ) -> RepairReport {
        let critical = critical_by_slide(report);
        let (paired, missing) = pair_slides(document, plans);

        let mut results = missing_results(&critical, &missing);
        let repaired: Vec<Vec<RepairResult>> = paired
            .into_par_iter()
            .map(|(slide, plan)| match critical.get(&plan.slide_index) {
                Some(mismatches) => self.repair_slide(slide, plan, mismatches),
                None => Vec::new(),
            })
            .collect();
        results.extend(repaired.into_iter().flatten());

        self.finish(document, plans, report, results)
    }

    /// Repair the Critical mismatches of one slide.
    ///
    /// Mismatches are handled in item order. A never-matched shape claimed
    /// by a successful repair leaves the pool for the rest of the slide.
    pub fn repair_slide(
        &self,
        slide: &mut Slide,
        plan: &mut SlidePlan,
        mismatches: &[&Mismatch],
    ) -> Vec<RepairResult> {
        let index = ShapeIndex::build(slide);
        let assigned: BTreeSet<ShapeId> = plan.matches.matches.iter().map(|m| m.shape).collect();
        let mut never_matched: BTreeSet<ShapeId> = index
            .shapes()
            .iter()
            .map(|s| s.id)
            .filter(|id| !assigned.contains(id))
            .collect();

        let mut results = Vec::with_capacity(mismatches.len());
        for mismatch in mismatches {
            let result = self.repair_one(slide, plan, &index, &never_matched, mismatch);
            if let Some(shape) = result.shape.filter(|_| result.successful) {
                never_matched.remove(&shape);
            }
            results.push(result);
        }
        results
    }

    fn repair_one(
        &self,
        slide: &mut Slide,
        plan: &mut SlidePlan,
        index: &ShapeIndex,
        never_matched: &BTreeSet<ShapeId>,
        mismatch: &Mismatch,
    ) -> RepairResult {
        let Some(item) = plan.items.iter().find(|i| i.order == mismatch.item).cloned() else {
            return RepairResult::failed(mismatch, true, RepairFailure::NoCandidate);
        };

        let pool = index.restricted(|s| Some(s.id) == mismatch.shape || never_matched.contains(&s.id));
        let outcome = self
            .matcher
            .match_with(std::slice::from_ref(&item), &pool, &Strategy::REPAIR);
        let Some(candidate) = outcome.matches.first().copied() else {
            log::warn!(
                "Slide {} item {}: no repair candidate among {} shapes",
                slide.index,
                item.order,
                pool.len()
            );
            return RepairResult::failed(mismatch, true, RepairFailure::NoCandidate);
        };

        let mut result = RepairResult {
            mismatch: mismatch.clone(),
            attempted: true,
            successful: false,
            strategy: Some(candidate.strategy),
            shape: Some(candidate.shape),
            applied_text: Some(item.text.clone()),
            error: None,
        };

        if let Err(err) = self.applier.apply(slide, candidate.shape, &item.text) {
            log::warn!("Slide {} item {}: repair write failed: {}", slide.index, item.order, err);
            result.error = Some(RepairFailure::ApplyFailed(err));
            return result;
        }

        match self.verifier.check_item(slide, &item, Some(candidate.shape)) {
            None => {
                log::debug!(
                    "Slide {} item {}: repaired into shape {} via {}",
                    slide.index,
                    item.order,
                    candidate.shape,
                    candidate.strategy
                );
                plan.assign(candidate);
                result.successful = true;
            }
            Some(still) => {
                log::warn!(
                    "Slide {} item {}: still {:?}/{:?} after repair",
                    slide.index,
                    item.order,
                    still.severity,
                    still.kind
                );
                result.error = Some(RepairFailure::StillMismatched {
                    severity: still.severity,
                    kind: still.kind,
                });
            }
        }
        result
    }

    fn finish(
        &self,
        document: &Document,
        plans: &[SlidePlan],
        report: &VerificationReport,
        results: Vec<RepairResult>,
    ) -> RepairReport {
        let mut strategy_breakdown = BTreeMap::new();
        for strategy in results.iter().filter(|r| r.successful).filter_map(|r| r.strategy) {
            *strategy_breakdown.entry(strategy).or_insert(0) += 1;
        }

        let post_report = self.verifier.verify_document(document, plans);
        let repair = RepairReport {
            pre_success_rate: report.success_rate,
            post_success_rate: post_report.success_rate,
            strategy_breakdown,
            post_report,
            results,
        };

        log::info!(
            "Repair: {}/{} mismatches fixed, success rate {:.1}% -> {:.1}%",
            repair.successful_count(),
            repair.results.len(),
            repair.pre_success_rate * 100.0,
            repair.post_success_rate * 100.0
        );
        repair
    }
}

/// Critical mismatches grouped by slide, in item order.
fn critical_by_slide(report: &VerificationReport) -> BTreeMap<usize, Vec<&Mismatch>> {
    let mut grouped: BTreeMap<usize, Vec<&Mismatch>> = BTreeMap::new();
    for mismatch in report.critical() {
        grouped.entry(mismatch.slide_index).or_default().push(mismatch);
    }
    for mismatches in grouped.values_mut() {
        mismatches.sort_by_key(|m| m.item);
    }
    grouped
}

/// Pair each plan with its slide. Returns the pairs and the slide indices of
/// plans whose slide the document does not hold.
pub(crate) fn pair_slides<'d, 'p>(
    document: &'d mut Document,
    plans: &'p mut [SlidePlan],
) -> (Vec<(&'d mut Slide, &'p mut SlidePlan)>, Vec<usize>) {
    let mut slides: BTreeMap<usize, &'d mut Slide> = document
        .slides
        .iter_mut()
        .enumerate()
        .collect();

    let mut paired = Vec::with_capacity(plans.len());
    let mut missing = Vec::new();
    for plan in plans.iter_mut() {
        match slides.remove(&plan.slide_index) {
            Some(slide) => paired.push((slide, plan)),
            None => missing.push(plan.slide_index),
        }
    }
    (paired, missing)
}

fn missing_results(
    critical: &BTreeMap<usize, Vec<&Mismatch>>,
    missing: &[usize],
) -> Vec<RepairResult> {
    missing
        .iter()
        .filter_map(|slide_index| critical.get(slide_index))
        .flatten()
        .map(|mismatch| {
            log::warn!("Slide {}: cannot repair, slide is missing", mismatch.slide_index);
            RepairResult::failed(mismatch, false, RepairFailure::SlideMissing)
        })
        .collect()
}
