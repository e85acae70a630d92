//! Assigning content items to shapes.
//!
//! Each item is run through a fixed cascade of strategies. The first
//! strategy producing an acceptable candidate decides the match, whatever
//! confidence a later strategy might have reported.

use crate::config::MatcherConfig;
use crate::normalize::{dice_coefficient, trailing_number};
use crate::shape_index::{IndexedShape, ShapeIndex};
use crate::types::{ContentItem, RoleCategory, ShapeId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

/// Tolerance for comparing fixed confidences against thresholds.
const EPSILON: f64 = 1e-9;

/// Matching strategies, declared in priority order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    ExactName,
    PlaceholderNumber,
    Position,
    LayoutPattern,
    ContentSimilarity,
    FallbackOrder,
}

impl Strategy {
    /// Full cascade used for the initial pass.
    pub const PRIORITY: [Strategy; 6] = [
        Strategy::ExactName,
        Strategy::PlaceholderNumber,
        Strategy::Position,
        Strategy::LayoutPattern,
        Strategy::ContentSimilarity,
        Strategy::FallbackOrder,
    ];

    /// Cascade used when repairing. Position is left out: a placed shape's
    /// geometry is exact, not a hint.
    pub const REPAIR: [Strategy; 4] = [
        Strategy::ExactName,
        Strategy::PlaceholderNumber,
        Strategy::LayoutPattern,
        Strategy::FallbackOrder,
    ];

    /// Stable snake_case tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Strategy::ExactName => "exact_name",
            Strategy::PlaceholderNumber => "placeholder_number",
            Strategy::Position => "position",
            Strategy::LayoutPattern => "layout_pattern",
            Strategy::ContentSimilarity => "content_similarity",
            Strategy::FallbackOrder => "fallback_order",
        }
    }

    /// Minimum confidence a candidate needs to count.
    pub fn min_confidence(&self) -> f64 {
        match self {
            Strategy::ExactName => 1.0,
            Strategy::PlaceholderNumber => 0.95,
            Strategy::Position => 0.0,
            Strategy::LayoutPattern => 0.7,
            Strategy::ContentSimilarity => 0.3,
            Strategy::FallbackOrder => 0.5,
        }
    }

    /// Whether a candidate confidence clears this strategy's threshold.
    /// Position needs strictly positive confidence.
    pub fn accepts(&self, confidence: f64) -> bool {
        match self {
            Strategy::Position => confidence > 0.0,
            _ => confidence + EPSILON >= self.min_confidence(),
        }
    }

    /// Candidate shapes for `item` among the context's unused shapes.
    pub fn evaluate(
        &self,
        item: &ContentItem,
        ctx: &MatchContext<'_>,
        config: &MatcherConfig,
    ) -> Vec<RankedCandidate> {
        match self {
            Strategy::ExactName => exact_name(item, ctx),
            Strategy::PlaceholderNumber => placeholder_number(item, ctx),
            Strategy::Position => position(item, ctx, config),
            Strategy::LayoutPattern => layout_pattern(item, ctx, config),
            Strategy::ContentSimilarity => content_similarity(item, ctx, config),
            Strategy::FallbackOrder => fallback_order(ctx),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A shape a strategy proposes, with its confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub shape: ShapeId,
    pub confidence: f64,
}

impl RankedCandidate {
    fn new(shape: ShapeId, confidence: f64) -> Self {
        Self {
            shape,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Higher confidence first; on ties the lower document-order id.
    fn rank(&self, other: &Self) -> Ordering {
        other
            .confidence
            .partial_cmp(&self.confidence)
            .unwrap_or(Ordering::Equal)
            .then(self.shape.cmp(&other.shape))
    }
}

/// Assignment of one content item to one shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Order index of the content item within its slide.
    pub item: usize,
    pub shape: ShapeId,
    pub strategy: Strategy,
    pub confidence: f64,
}

/// Outcome of matching one slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideMatches {
    /// One result per matched item, in intended order.
    pub matches: Vec<MatchResult>,
    /// Order indices of items no shape was left for.
    pub unmatched: Vec<usize>,
}

impl SlideMatches {
    pub fn for_item(&self, order: usize) -> Option<&MatchResult> {
        self.matches.iter().find(|m| m.item == order)
    }
}

/// Matching state for one slide pass.
///
/// Holds the shapes already claimed, so that nothing leaks between slides.
#[derive(Debug)]
pub struct MatchContext<'a> {
    index: &'a ShapeIndex,
    used: BTreeSet<ShapeId>,
}

impl<'a> MatchContext<'a> {
    pub fn new(index: &'a ShapeIndex) -> Self {
        Self {
            index,
            used: BTreeSet::new(),
        }
    }

    pub fn layout(&self) -> &str {
        &self.index.layout
    }

    pub fn is_used(&self, id: ShapeId) -> bool {
        self.used.contains(&id)
    }

    /// Eligible shapes not yet claimed, in document order.
    pub fn unused(&self) -> impl Iterator<Item = &'a IndexedShape> + '_ {
        self.index
            .shapes()
            .iter()
            .filter(move |s| !self.used.contains(&s.id))
    }

    /// Mark a shape as taken for the rest of the pass.
    pub fn claim(&mut self, id: ShapeId) {
        self.used.insert(id);
    }
}

/// Runs the strategy cascade over a slide's content items.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    config: MatcherConfig,
}

impl Matcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Match items to shapes with the full cascade.
    pub fn match_slide(&self, items: &[ContentItem], index: &ShapeIndex) -> SlideMatches {
        self.match_with(items, index, &Strategy::PRIORITY)
    }

    /// Match items to shapes using only `strategies`, in the order given.
    ///
    /// Items are processed by ascending order index. Each winning shape is
    /// claimed for the rest of the pass.
    pub fn match_with(
        &self,
        items: &[ContentItem],
        index: &ShapeIndex,
        strategies: &[Strategy],
    ) -> SlideMatches {
        let mut sorted: Vec<&ContentItem> = items.iter().collect();
        sorted.sort_by_key(|item| item.order);

        let mut ctx = MatchContext::new(index);
        let mut outcome = SlideMatches::default();

        for item in sorted {
            match self.best_for(item, &ctx, strategies) {
                Some(result) => {
                    log::debug!(
                        "Slide {} item {} -> shape {} via {} ({:.2})",
                        item.slide_index,
                        item.order,
                        result.shape,
                        result.strategy,
                        result.confidence
                    );
                    ctx.claim(result.shape);
                    outcome.matches.push(result);
                }
                None => {
                    log::debug!(
                        "Slide {} item {}: no eligible shape left",
                        item.slide_index,
                        item.order
                    );
                    outcome.unmatched.push(item.order);
                }
            }
        }

        outcome
    }

    /// First strategy with an acceptable candidate decides.
    fn best_for(
        &self,
        item: &ContentItem,
        ctx: &MatchContext<'_>,
        strategies: &[Strategy],
    ) -> Option<MatchResult> {
        strategies.iter().find_map(|strategy| {
            strategy
                .evaluate(item, ctx, &self.config)
                .into_iter()
                .filter(|c| !ctx.is_used(c.shape) && strategy.accepts(c.confidence))
                .min_by(RankedCandidate::rank)
                .map(|best| MatchResult {
                    item: item.order,
                    shape: best.shape,
                    strategy: *strategy,
                    confidence: best.confidence,
                })
        })
    }
}

/// Category an item competes in for the layout pattern. Items without a
/// role hint count as content.
fn layout_category(item: &ContentItem) -> RoleCategory {
    item.role_hint
        .map(|r| r.category())
        .unwrap_or(RoleCategory::Content)
}

/// Role hint and shape role agree at the coarse level. No hint agrees with
/// any eligible shape.
fn categories_agree(item: &ContentItem, shape: &IndexedShape) -> bool {
    match item.role_hint {
        Some(role) => role.category() == shape.role.category(),
        None => true,
    }
}

fn exact_name(item: &ContentItem, ctx: &MatchContext<'_>) -> Vec<RankedCandidate> {
    let Some(hint) = item.name_hint.as_deref() else {
        return Vec::new();
    };
    ctx.unused()
        .filter(|s| s.name == hint)
        .map(|s| RankedCandidate::new(s.id, 1.0))
        .collect()
}

fn placeholder_number(item: &ContentItem, ctx: &MatchContext<'_>) -> Vec<RankedCandidate> {
    let Some(number) = item.name_hint.as_deref().and_then(trailing_number) else {
        return Vec::new();
    };
    ctx.unused()
        .filter(|s| s.placeholder_number == Some(number) && categories_agree(item, s))
        .map(|s| RankedCandidate::new(s.id, 0.95))
        .collect()
}

fn position(
    item: &ContentItem,
    ctx: &MatchContext<'_>,
    config: &MatcherConfig,
) -> Vec<RankedCandidate> {
    let Some(hint) = item.position_hint else {
        return Vec::new();
    };
    ctx.unused()
        .filter_map(|s| {
            let confidence = (1.0 - hint.distance(&s.center) / config.position_tolerance).max(0.0);
            (confidence > 0.0).then(|| RankedCandidate::new(s.id, confidence))
        })
        .collect()
}

/// Items arrive in intended order and each claims its column, so the
/// leftmost unclaimed column of the item's category is the one at the
/// item's left-to-right position.
fn layout_pattern(
    item: &ContentItem,
    ctx: &MatchContext<'_>,
    config: &MatcherConfig,
) -> Vec<RankedCandidate> {
    let Some(pattern) = config.layout_pattern(ctx.layout()) else {
        return Vec::new();
    };

    let category = layout_category(item);
    ctx.unused()
        .filter(|s| s.role.category() == category)
        .min_by(|a, b| {
            a.bbox
                .x
                .partial_cmp(&b.bbox.x)
                .unwrap_or(Ordering::Equal)
                .then(a.id.cmp(&b.id))
        })
        .map(|s| vec![RankedCandidate::new(s.id, pattern.effective_confidence())])
        .unwrap_or_default()
}

fn content_similarity(
    item: &ContentItem,
    ctx: &MatchContext<'_>,
    config: &MatcherConfig,
) -> Vec<RankedCandidate> {
    let floor = config.similarity_confidence_floor;
    let ceiling = config.similarity_confidence_ceiling;
    ctx.unused()
        .filter_map(|s| {
            let dice = dice_coefficient(&s.text, &item.text);
            if dice <= 0.0 || dice < config.similarity_min {
                return None;
            }
            let confidence = (floor + dice * (ceiling - floor)).clamp(floor, ceiling);
            Some(RankedCandidate::new(s.id, confidence))
        })
        .collect()
}

fn fallback_order(ctx: &MatchContext<'_>) -> Vec<RankedCandidate> {
    ctx.unused()
        .next()
        .map(|s| vec![RankedCandidate::new(s.id, 0.5)])
        .unwrap_or_default()
}
