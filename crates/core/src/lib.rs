//! Core engine for filling slide decks: matching intended content to
//! shapes, writing it, verifying the result and repairing what went wrong.

pub mod applier;
pub mod config;
pub mod engine;
pub mod error;
pub mod intent;
pub mod matcher;
pub mod normalize;
pub mod repairer;
pub mod shape_index;
pub mod types;
pub mod verifier;

pub use applier::ContentApplier;
pub use config::{EngineConfig, LayoutPattern, MatcherConfig, VerifierConfig};
pub use engine::{Engine, FillOutcome, ItemApplyError, RunReport, SlidePlan};
pub use error::{ApplyError, Error, Result};
pub use intent::{
    AnnotationKind, IntendedContent, IntentRecord, SlideAnnotation, SlideIntent, ValidatedIntent,
};
pub use matcher::{MatchContext, MatchResult, Matcher, RankedCandidate, SlideMatches, Strategy};
pub use repairer::{RepairFailure, RepairReport, RepairResult, Repairer};
pub use shape_index::{IndexedShape, ShapeIndex};
pub use types::{
    BoundingBox, ContentItem, Document, Paragraph, Point, RoleCategory, RunFormat, Shape, ShapeId,
    ShapeRole, Slide, SlideFrame, TextRun,
};
pub use verifier::{
    Mismatch, MismatchKind, Severity, SlideReport, VerificationReport, VerificationStatus, Verifier,
};
