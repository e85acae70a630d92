//! Writing changed shape text back into slide XML.
//!
//! The slide part is streamed through unchanged except for the paragraphs of
//! shapes marked modified. Shapes are counted exactly as the reader counts
//! them, so shape ids line up.

use crate::reader::{local_name, ShapeKind};
use deckfill_core::{Error, Paragraph, Result, RunFormat, Shape, Slide};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::fmt::Display;

fn xml_error(e: impl Display) -> Error {
    Error::Xml(e.to_string())
}

/// Rewrite the paragraphs of every modified shape of `slide` in `xml`.
pub(crate) fn rewrite_slide(xml: &str, slide: &Slide) -> Result<Vec<u8>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));

    let mut next_id = 0usize;
    // Shape being streamed: the slide's shape if it needs rewriting.
    let mut current: Option<Option<&Shape>> = None;
    let mut depth = 0usize;
    let mut in_text_body = false;
    let mut wrote_body = false;
    // Depth of an original paragraph being dropped.
    let mut skipping = 0usize;

    loop {
        let event = reader.read_event().map_err(xml_error)?;

        match &event {
            Event::Start(e) => {
                let name = e.name();
                let local = local_name(name.as_ref());

                if current.is_none() {
                    if ShapeKind::from_local_name(local).is_some() {
                        let shape = slide
                            .shapes
                            .iter()
                            .find(|s| s.id.0 == next_id)
                            .filter(|s| s.modified && local == b"sp");
                        next_id += 1;
                        current = Some(shape);
                        depth = 1;
                        wrote_body = false;
                    }
                    writer.write_event(&event).map_err(xml_error)?;
                    continue;
                }

                depth += 1;
                if skipping > 0 {
                    skipping += 1;
                    continue;
                }
                if matches!(current, Some(Some(_))) {
                    if local == b"txBody" && depth == 2 {
                        in_text_body = true;
                    } else if in_text_body && local == b"p" {
                        skipping = 1;
                        continue;
                    }
                }
                writer.write_event(&event).map_err(xml_error)?;
            }
            Event::Empty(e) => {
                if skipping > 0 {
                    continue;
                }
                let name = e.name();
                if in_text_body && local_name(name.as_ref()) == b"p" {
                    continue;
                }
                writer.write_event(&event).map_err(xml_error)?;
            }
            Event::End(e) => {
                if current.is_none() {
                    writer.write_event(&event).map_err(xml_error)?;
                    continue;
                }
                depth -= 1;
                if skipping > 0 {
                    skipping -= 1;
                    continue;
                }

                let name = e.name();
                let local = local_name(name.as_ref());
                if let Some(Some(shape)) = current {
                    if in_text_body && local == b"txBody" && depth == 1 {
                        write_paragraphs(&mut writer, &shape.paragraphs)?;
                        in_text_body = false;
                        wrote_body = true;
                    } else if depth == 0 && !wrote_body {
                        write_text_body(&mut writer, &shape.paragraphs)?;
                    }
                }
                if depth == 0 {
                    current = None;
                }
                writer.write_event(&event).map_err(xml_error)?;
            }
            Event::Eof => break,
            _ => {
                if skipping == 0 {
                    writer.write_event(&event).map_err(xml_error)?;
                }
            }
        }
    }

    Ok(writer.into_inner())
}

/// A complete `p:txBody` for a shape that had none.
fn write_text_body(writer: &mut Writer<Vec<u8>>, paragraphs: &[Paragraph]) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new("p:txBody")))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Empty(BytesStart::new("a:bodyPr")))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Empty(BytesStart::new("a:lstStyle")))
        .map_err(xml_error)?;
    write_paragraphs(writer, paragraphs)?;
    writer
        .write_event(Event::End(BytesEnd::new("p:txBody")))
        .map_err(xml_error)?;
    Ok(())
}

fn write_paragraphs(writer: &mut Writer<Vec<u8>>, paragraphs: &[Paragraph]) -> Result<()> {
    if paragraphs.is_empty() {
        writer
            .write_event(Event::Empty(BytesStart::new("a:p")))
            .map_err(xml_error)?;
        return Ok(());
    }

    for paragraph in paragraphs {
        let runs: Vec<_> = paragraph.runs.iter().filter(|r| !r.text.is_empty()).collect();
        if runs.is_empty() {
            writer
                .write_event(Event::Empty(BytesStart::new("a:p")))
                .map_err(xml_error)?;
            continue;
        }

        writer
            .write_event(Event::Start(BytesStart::new("a:p")))
            .map_err(xml_error)?;
        for run in runs {
            writer
                .write_event(Event::Start(BytesStart::new("a:r")))
                .map_err(xml_error)?;
            write_run_props(writer, &run.format)?;
            writer
                .write_event(Event::Start(BytesStart::new("a:t")))
                .map_err(xml_error)?;
            writer
                .write_event(Event::Text(BytesText::new(&run.text)))
                .map_err(xml_error)?;
            writer
                .write_event(Event::End(BytesEnd::new("a:t")))
                .map_err(xml_error)?;
            writer
                .write_event(Event::End(BytesEnd::new("a:r")))
                .map_err(xml_error)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("a:p")))
            .map_err(xml_error)?;
    }
    Ok(())
}

/// `a:rPr` for a run format. Fill comes before the typeface, as the schema
/// orders them.
fn write_run_props(writer: &mut Writer<Vec<u8>>, format: &RunFormat) -> Result<()> {
    let mut props = BytesStart::new("a:rPr");
    props.push_attribute(("lang", "en-US"));
    let size = format.size.map(|s| s.to_string());
    if let Some(size) = size.as_deref() {
        props.push_attribute(("sz", size));
    }
    if let Some(bold) = format.bold {
        props.push_attribute(("b", if bold { "1" } else { "0" }));
    }
    if let Some(italic) = format.italic {
        props.push_attribute(("i", if italic { "1" } else { "0" }));
    }
    props.push_attribute(("dirty", "0"));

    if format.color.is_none() && format.font.is_none() {
        writer.write_event(Event::Empty(props)).map_err(xml_error)?;
        return Ok(());
    }

    writer.write_event(Event::Start(props)).map_err(xml_error)?;
    if let Some(color) = format.color.as_deref() {
        writer
            .write_event(Event::Start(BytesStart::new("a:solidFill")))
            .map_err(xml_error)?;
        let mut rgb = BytesStart::new("a:srgbClr");
        rgb.push_attribute(("val", color));
        writer.write_event(Event::Empty(rgb)).map_err(xml_error)?;
        writer
            .write_event(Event::End(BytesEnd::new("a:solidFill")))
            .map_err(xml_error)?;
    }
    if let Some(font) = format.font.as_deref() {
        let mut latin = BytesStart::new("a:latin");
        latin.push_attribute(("typeface", font));
        writer.write_event(Event::Empty(latin)).map_err(xml_error)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("a:rPr")))
        .map_err(xml_error)?;
    Ok(())
}
