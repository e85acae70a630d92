//! Property tests for the matching, verification and repair guarantees.

use deckfill_core::{
    BoundingBox, ContentItem, Document, Engine, IntendedContent, IntentRecord, MatchContext,
    Matcher, MatcherConfig, Point, ShapeIndex, ShapeRole, Slide, SlideIntent,
    Strategy as MatchStrategy,
};
use proptest::prelude::*;

const WORDS: &[&str] = &["revenue", "growth", "team", "plan", "risk", "quarter", "goal"];

fn role() -> impl Strategy<Value = ShapeRole> {
    prop_oneof![
        Just(ShapeRole::Title),
        Just(ShapeRole::Body),
        Just(ShapeRole::Picture),
        Just(ShapeRole::Table),
        Just(ShapeRole::SlideNumber),
        Just(ShapeRole::Other),
    ]
}

fn phrase() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS), 1..4).prop_map(|words| words.join(" "))
}

fn name() -> impl Strategy<Value = String> {
    (prop::sample::select(&["Title", "Content Placeholder", "Text", "Box"][..]), 1u32..6)
        .prop_map(|(prefix, n)| format!("{} {}", prefix, n))
}

fn layout() -> impl Strategy<Value = String> {
    prop::sample::select(&["Two Content", "Comparison", "Title and Content", "Blank"][..])
        .prop_map(str::to_string)
}

fn slide() -> impl Strategy<Value = Slide> {
    let shape = (name(), role(), 0.0f64..1.0, 0.0f64..1.0, 0.0f64..0.5, 0.0f64..0.5, prop::option::of(phrase()));
    (layout(), prop::collection::vec(shape, 0..7)).prop_map(|(layout, shapes)| {
        let mut slide = Slide::new(0, layout);
        for (name, role, x, y, w, h, text) in shapes {
            slide.push_shape(name, role, BoundingBox::new(x, y, w, h), text.as_deref().unwrap_or(""));
        }
        slide
    })
}

fn record() -> impl Strategy<Value = IntentRecord> {
    (
        phrase(),
        prop::option::of(role()),
        prop::option::of(name()),
        prop::option::of((0.0f64..=1.0, 0.0f64..=1.0)),
    )
        .prop_map(|(text, role, name, position)| IntentRecord {
            role_hint: role,
            name_hint: name,
            position_hint: position.map(|(x, y)| Point::new(x, y)),
            text: Some(text),
        })
}

fn intent_for_one_slide() -> impl Strategy<Value = IntendedContent> {
    prop::collection::vec(record(), 0..6).prop_map(|items| {
        IntendedContent::new(vec![SlideIntent {
            slide_index: Some(0),
            items,
        }])
    })
}

fn items_of(intent: &IntendedContent) -> Vec<ContentItem> {
    intent.validate(1).items_for(0).map(<[_]>::to_vec).unwrap_or_default()
}

proptest! {
    /// Pictures, tables and slide numbers never receive text.
    #[test]
    fn excluded_shapes_are_never_written(slide in slide(), intent in intent_for_one_slide()) {
        let mut document = Document::new(vec![slide.clone()]);
        let report = Engine::default().run(&mut document, &intent, true);

        for (before, after) in slide.shapes.iter().zip(&document.slides[0].shapes) {
            if before.role.is_excluded() {
                prop_assert_eq!(before, after);
            }
        }
        for (_, m) in report.fill.matches() {
            prop_assert!(!slide.shapes[m.shape.0].role.is_excluded());
        }
    }

    /// Every item gets a shape while an eligible shape is left, and no
    /// shape is used twice.
    #[test]
    fn coverage_and_uniqueness(slide in slide(), intent in intent_for_one_slide()) {
        let items = items_of(&intent);
        let index = ShapeIndex::build(&slide);
        let outcome = Matcher::default().match_slide(&items, &index);

        prop_assert_eq!(outcome.matches.len(), items.len().min(index.len()));
        prop_assert_eq!(outcome.matches.len() + outcome.unmatched.len(), items.len());

        let mut shapes: Vec<_> = outcome.matches.iter().map(|m| m.shape).collect();
        shapes.sort();
        shapes.dedup();
        prop_assert_eq!(shapes.len(), outcome.matches.len());
    }

    /// Confidences stay in [0, 1] and clear their strategy's threshold.
    #[test]
    fn confidences_are_bounded(slide in slide(), intent in intent_for_one_slide()) {
        let items = items_of(&intent);
        let outcome = Matcher::default().match_slide(&items, &ShapeIndex::build(&slide));
        for m in &outcome.matches {
            prop_assert!((0.0..=1.0).contains(&m.confidence));
            prop_assert!(m.strategy.accepts(m.confidence));
        }
    }

    /// Every winning tier had no acceptable candidate above it, given the
    /// shapes claimed by earlier items.
    #[test]
    fn higher_tiers_had_nothing(slide in slide(), intent in intent_for_one_slide()) {
        let items = items_of(&intent);
        let index = ShapeIndex::build(&slide);
        let config = MatcherConfig::default();
        let outcome = Matcher::new(config.clone()).match_slide(&items, &index);

        let mut ctx = MatchContext::new(&index);
        for result in &outcome.matches {
            let item = items.iter().find(|i| i.order == result.item);
            prop_assert!(item.is_some());
            let item = item.unwrap();
            for strategy in MatchStrategy::PRIORITY.iter().take_while(|s| **s != result.strategy) {
                let acceptable = strategy
                    .evaluate(item, &ctx, &config)
                    .into_iter()
                    .any(|c| !ctx.is_used(c.shape) && strategy.accepts(c.confidence));
                prop_assert!(
                    !acceptable,
                    "item {}: {} had a candidate before {}",
                    result.item,
                    strategy,
                    result.strategy
                );
            }
            prop_assert!(!ctx.is_used(result.shape));
            ctx.claim(result.shape);
        }
    }

    /// Verifying twice without changes gives the same report.
    #[test]
    fn verification_is_idempotent(slide in slide(), intent in intent_for_one_slide()) {
        let engine = Engine::default();
        let mut document = Document::new(vec![slide]);
        let outcome = engine.fill(&mut document, &intent);
        let first = engine.verify(&document, &outcome);
        let second = engine.verify(&document, &outcome);
        prop_assert_eq!(first, second);
    }

    /// Repair never lowers the success rate, whatever was corrupted.
    #[test]
    fn repair_is_monotonic(
        slide in slide(),
        intent in intent_for_one_slide(),
        corrupt in prop::collection::vec(prop::option::of(prop::sample::select(&["", "Click to add text", "zzz"][..])), 7),
    ) {
        let engine = Engine::default();
        let mut document = Document::new(vec![slide]);
        let mut outcome = engine.fill(&mut document, &intent);

        for (shape, damage) in document.slides[0].shapes.iter_mut().zip(corrupt) {
            if let Some(text) = damage {
                if !shape.role.is_excluded() {
                    shape.set_text(text, true);
                }
            }
        }

        let before = engine.verify(&document, &outcome);
        let repair = engine.repair(&mut document, &mut outcome, &before);
        prop_assert!(repair.post_success_rate + 1e-12 >= repair.pre_success_rate);
        prop_assert!(repair.delta() >= -1e-12);
    }
}
