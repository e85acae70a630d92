//! PPTX package: load a deck into a [`Document`], save it back.

use crate::reader::{
    inherited_bbox, layout_target, master_target, parse_layout_name, parse_presentation,
    parse_relationships, parse_shapes, rels_path_for, slide_order, RawShape,
};
use crate::writer::rewrite_slide;
use deckfill_core::{Document, Error, Result, Shape, ShapeId, Slide, SlideFrame};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// Layout facts shared by the slides that use a layout.
#[derive(Debug, Clone, Default)]
struct LayoutInfo {
    name: String,
    shapes: Vec<RawShape>,
    master: Vec<RawShape>,
}

/// An opened PPTX package.
///
/// Every part is kept in memory in archive order; only slide parts whose
/// shapes changed are regenerated on save.
#[derive(Debug, Clone)]
pub struct PptxPackage {
    parts: Vec<(String, Vec<u8>)>,
    /// Slide part path per slide index.
    slide_parts: Vec<String>,
    document: Document,
}

impl PptxPackage {
    /// Read a package from a reader.
    pub fn open<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| Error::Zip(format!("Failed to open ZIP: {}", e)))?;

        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| Error::Zip(format!("Failed to read entry {}: {}", i, e)))?;
            if file.is_dir() {
                continue;
            }
            let mut bytes = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut bytes)
                .map_err(|e| Error::Zip(format!("Failed to read '{}': {}", file.name(), e)))?;
            parts.push((file.name().to_string(), bytes));
        }

        let mut package = Self {
            parts,
            slide_parts: Vec::new(),
            document: Document::default(),
        };
        package.load_document()?;
        Ok(package)
    }

    /// Read a package from a file.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::open(BufReader::new(file))
    }

    /// The deck as the engine sees it.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The deck, for filling.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Part path of a slide.
    pub fn slide_part(&self, index: usize) -> Option<&str> {
        self.slide_parts.get(index).map(String::as_str)
    }

    /// Write the package, regenerating slides with changed shapes.
    pub fn save<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let rewritten = self.rewritten_slides()?;
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, bytes) in &self.parts {
            zip.start_file(name.as_str(), options)
                .map_err(|e| Error::Zip(format!("Failed to start '{}': {}", name, e)))?;
            let body = rewritten.get(name.as_str()).unwrap_or(bytes);
            zip.write_all(body)?;
        }

        zip.finish()
            .map_err(|e| Error::Zip(format!("Failed to finish ZIP: {}", e)))?;
        Ok(())
    }

    /// Write the package to a file.
    pub fn save_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        self.save(BufWriter::new(file))
    }

    fn rewritten_slides(&self) -> Result<BTreeMap<&str, Vec<u8>>> {
        let mut rewritten = BTreeMap::new();
        for (slide, path) in self.document.slides.iter().zip(&self.slide_parts) {
            if !slide.shapes.iter().any(|s| s.modified) {
                continue;
            }
            let xml = self.part_str(path)?;
            log::debug!("Rewriting {}", path);
            rewritten.insert(path.as_str(), rewrite_slide(&xml, slide)?);
        }
        Ok(rewritten)
    }

    fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, bytes)| bytes.as_slice())
    }

    fn part_str(&self, name: &str) -> Result<String> {
        let bytes = self
            .part(name)
            .ok_or_else(|| Error::PptxParse(format!("Missing part '{}'", name)))?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::PptxParse(format!("Part '{}' is not UTF-8: {}", name, e)))
    }

    /// Relationships of a part; none if it has no `.rels` part.
    fn relationships(&self, part: &str) -> Result<Vec<crate::reader::Relationship>> {
        let rels_path = rels_path_for(part);
        if self.part(&rels_path).is_none() {
            return Ok(Vec::new());
        }
        parse_relationships(&self.part_str(&rels_path)?)
    }

    fn load_document(&mut self) -> Result<()> {
        let info = parse_presentation(&self.part_str(PRESENTATION_PART)?)?;
        let order = slide_order(&info, &self.relationships(PRESENTATION_PART)?);

        let mut layouts: BTreeMap<String, LayoutInfo> = BTreeMap::new();
        let mut slides = Vec::with_capacity(order.len());

        for (index, path) in order.iter().enumerate() {
            let slide_rels = self.relationships(path)?;
            let layout = match layout_target(path, &slide_rels) {
                Some(layout_path) => {
                    if !layouts.contains_key(&layout_path) {
                        let loaded = self.load_layout(&layout_path)?;
                        layouts.insert(layout_path.clone(), loaded);
                    }
                    layouts.get(&layout_path).cloned().unwrap_or_default()
                }
                None => LayoutInfo::default(),
            };

            let raw = parse_shapes(&self.part_str(path)?)?;
            slides.push(build_slide(index, info.frame, &layout, raw));
        }

        log::info!("Loaded {} slides", slides.len());
        self.slide_parts = order;
        self.document = Document::new(slides);
        Ok(())
    }

    fn load_layout(&self, layout_path: &str) -> Result<LayoutInfo> {
        let xml = self.part_str(layout_path)?;
        let master = match master_target(layout_path, &self.relationships(layout_path)?) {
            Some(master_path) if self.part(&master_path).is_some() => {
                parse_shapes(&self.part_str(&master_path)?)?
            }
            _ => Vec::new(),
        };

        Ok(LayoutInfo {
            name: parse_layout_name(&xml)?.unwrap_or_default(),
            shapes: parse_shapes(&xml)?,
            master,
        })
    }
}

fn build_slide(index: usize, frame: SlideFrame, layout: &LayoutInfo, raw: Vec<RawShape>) -> Slide {
    let mut slide = Slide::new(index, layout.name.clone());
    slide.frame = frame;
    slide.shapes = raw
        .into_iter()
        .enumerate()
        .map(|(i, raw)| {
            let bbox = raw
                .bbox
                .or_else(|| {
                    raw.placeholder
                        .as_ref()
                        .and_then(|ph| inherited_bbox(ph, &layout.shapes, &layout.master))
                })
                .unwrap_or_default();
            let mut shape = Shape::new(ShapeId(i), raw.name.clone(), raw.role(), bbox);
            shape.paragraphs = raw.paragraphs;
            shape
        })
        .collect();
    slide
}
