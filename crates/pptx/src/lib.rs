//! PPTX (Office Open XML) document backend for deckfill.
//!
//! Loads .pptx files, which are ZIP archives of XML parts, into a
//! [`deckfill_core::Document`] and writes changed shape text back.

pub mod package;
mod reader;
mod writer;

pub use package::PptxPackage;
