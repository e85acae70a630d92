//! Reading slide structure out of PPTX XML parts.

use deckfill_core::{BoundingBox, Error, Paragraph, Result, RunFormat, ShapeRole, SlideFrame, TextRun};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Relationship type suffixes we follow.
const SLIDE_REL: &str = "/slide";
const LAYOUT_REL: &str = "/slideLayout";
const MASTER_REL: &str = "/slideMaster";

/// One `<Relationship>` of a `.rels` part.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
}

impl Relationship {
    fn is(&self, suffix: &str) -> bool {
        self.rel_type.ends_with(suffix)
    }
}

/// What `ppt/presentation.xml` tells us.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PresentationInfo {
    pub frame: SlideFrame,
    /// Relationship ids of the slides, in presentation order.
    pub slide_ids: Vec<String>,
}

/// Element a shape was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShapeKind {
    Sp,
    Pic,
    GraphicFrame,
}

impl ShapeKind {
    /// Shape elements in a shape tree. Connectors and groups are not shapes;
    /// the shapes inside a group are.
    pub fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"sp" => Some(ShapeKind::Sp),
            b"pic" => Some(ShapeKind::Pic),
            b"graphicFrame" => Some(ShapeKind::GraphicFrame),
            _ => None,
        }
    }
}

/// `<p:ph>` attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Placeholder {
    pub kind: Option<String>,
    pub idx: Option<u32>,
}

impl Placeholder {
    /// Type used to match against layouts and masters. An absent type means
    /// a body placeholder.
    fn type_key(&self) -> &str {
        match self.kind.as_deref() {
            None | Some("body") | Some("obj") | Some("subTitle") => "body",
            Some("ctrTitle") | Some("title") => "title",
            Some(other) => other,
        }
    }
}

/// A shape as written in the XML, before layout inheritance.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawShape {
    pub name: String,
    pub kind: ShapeKind,
    pub placeholder: Option<Placeholder>,
    pub bbox: Option<BoundingBox>,
    pub paragraphs: Vec<Paragraph>,
}

impl RawShape {
    fn new(kind: ShapeKind) -> Self {
        Self {
            name: String::new(),
            kind,
            placeholder: None,
            bbox: None,
            paragraphs: Vec::new(),
        }
    }

    pub fn role(&self) -> ShapeRole {
        match self.kind {
            ShapeKind::Pic => ShapeRole::Picture,
            ShapeKind::GraphicFrame => ShapeRole::Table,
            ShapeKind::Sp => match &self.placeholder {
                None => ShapeRole::Other,
                Some(ph) => match ph.kind.as_deref() {
                    Some("title") | Some("ctrTitle") => ShapeRole::Title,
                    Some("sldNum") => ShapeRole::SlideNumber,
                    Some("pic") => ShapeRole::Picture,
                    Some("tbl") => ShapeRole::Table,
                    None | Some("body") | Some("obj") | Some("subTitle") => ShapeRole::Body,
                    Some(_) => ShapeRole::Other,
                },
            },
        }
    }
}

/// Parse a `.rels` part.
pub(crate) fn parse_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut rels = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                rels.push(Relationship {
                    id: attribute(e, b"Id").unwrap_or_default(),
                    rel_type: attribute(e, b"Type").unwrap_or_default(),
                    target: attribute(e, b"Target").unwrap_or_default(),
                });
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Xml(format!("Error parsing relationships: {}", e)));
            }
            _ => {}
        }
    }

    Ok(rels)
}

/// Parse slide size and slide order from `ppt/presentation.xml`.
pub(crate) fn parse_presentation(xml: &str) -> Result<PresentationInfo> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut info = PresentationInfo::default();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"sldSz" => {
                    let cx = attribute(e, b"cx").and_then(|v| v.parse::<f64>().ok());
                    let cy = attribute(e, b"cy").and_then(|v| v.parse::<f64>().ok());
                    if let (Some(width), Some(height)) = (cx, cy) {
                        info.frame = SlideFrame { width, height };
                    }
                }
                b"sldId" => {
                    if let Some(id) = relationship_id(e) {
                        info.slide_ids.push(id);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Xml(format!("Error parsing presentation: {}", e)));
            }
            _ => {}
        }
    }

    Ok(info)
}

/// The `r:id` of a `sldId`. Its bare `id` is a numeric slide id, not a
/// relationship id.
fn relationship_id(e: &BytesStart) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() != b"id" && local_name(a.key.as_ref()) == b"id")
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

/// Ordered slide part paths.
///
/// Follows `sldIdLst` when present; otherwise orders the slide
/// relationships by the number in their id or target.
pub(crate) fn slide_order(info: &PresentationInfo, rels: &[Relationship]) -> Vec<String> {
    let slide_rels: Vec<&Relationship> = rels.iter().filter(|r| r.is(SLIDE_REL)).collect();

    if !info.slide_ids.is_empty() {
        return info
            .slide_ids
            .iter()
            .filter_map(|id| slide_rels.iter().find(|r| &r.id == id))
            .map(|r| resolve_target("ppt/presentation.xml", &r.target))
            .collect();
    }

    let mut slides: Vec<(String, Option<usize>)> = slide_rels
        .iter()
        .map(|r| {
            let order_num = extract_slide_number(&r.id).or_else(|| extract_slide_number(&r.target));
            (resolve_target("ppt/presentation.xml", &r.target), order_num)
        })
        .collect();

    slides.sort_by(|a, b| match (a.1, b.1) {
        (Some(na), Some(nb)) => na.cmp(&nb),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.0.cmp(&b.0),
    });

    slides.into_iter().map(|(path, _)| path).collect()
}

/// The layout a slide uses, from the slide's relationships.
pub(crate) fn layout_target(slide_path: &str, rels: &[Relationship]) -> Option<String> {
    rels.iter()
        .find(|r| r.is(LAYOUT_REL))
        .map(|r| resolve_target(slide_path, &r.target))
}

/// The master a layout uses, from the layout's relationships.
pub(crate) fn master_target(layout_path: &str, rels: &[Relationship]) -> Option<String> {
    rels.iter()
        .find(|r| r.is(MASTER_REL))
        .map(|r| resolve_target(layout_path, &r.target))
}

/// `.rels` part path for a part: `ppt/slides/slide1.xml` gives
/// `ppt/slides/_rels/slide1.xml.rels`.
pub(crate) fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that owns it.
pub(crate) fn resolve_target(base_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = base_part.split('/').collect();
    segments.pop();
    for segment in target.split('/') {
        match segment {
            ".." => {
                segments.pop();
            }
            "." | "" => {}
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// The name of a slide layout, from `<p:cSld name="...">`.
pub(crate) fn parse_layout_name(xml: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if local_name(e.name().as_ref()) == b"cSld" =>
            {
                return Ok(attribute(e, b"name"));
            }
            Ok(Event::Eof) => return Ok(None),
            Err(e) => {
                return Err(Error::Xml(format!("Error parsing layout: {}", e)));
            }
            _ => {}
        }
    }
}

/// Geometry for a placeholder without its own `a:xfrm`: the layout
/// placeholder with the same `idx`, then the same type; then the master
/// placeholder of the same type.
pub(crate) fn inherited_bbox(
    placeholder: &Placeholder,
    layout: &[RawShape],
    master: &[RawShape],
) -> Option<BoundingBox> {
    let placed = |shapes: &[RawShape], same: &dyn Fn(&Placeholder) -> bool| {
        shapes
            .iter()
            .filter_map(|s| Some((s.placeholder.as_ref()?, s.bbox?)))
            .find(|(ph, _)| same(ph))
            .map(|(_, bbox)| bbox)
    };

    let by_idx = |ph: &Placeholder| placeholder.idx.is_some() && ph.idx == placeholder.idx;
    let by_type = |ph: &Placeholder| ph.type_key() == placeholder.type_key();

    placed(layout, &by_idx)
        .or_else(|| placed(layout, &by_type))
        .or_else(|| placed(master, &by_type))
}

/// Read-side state for the run being collected.
#[derive(Default)]
struct RunState {
    run: Option<TextRun>,
    in_props: bool,
    in_fill: bool,
    in_text: bool,
}

/// Extract shapes, in document order, from a slide, layout or master part.
pub(crate) fn parse_shapes(xml: &str) -> Result<Vec<RawShape>> {
    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut current: Option<RawShape> = None;
    // Elements open inside the current shape, the shape itself included.
    let mut depth = 0usize;
    let mut in_xfrm = false;
    let mut in_text_body = false;
    let mut paragraph: Option<Paragraph> = None;
    let mut state = RunState::default();

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => return Err(Error::Xml(format!("Error parsing shapes: {}", e))),
        };

        match event {
            Event::Start(ref e) => {
                let name = e.name();
                let local = local_name(name.as_ref());

                if current.is_none() {
                    if let Some(kind) = ShapeKind::from_local_name(local) {
                        current = Some(RawShape::new(kind));
                        depth = 1;
                    }
                    continue;
                }
                let Some(shape) = current.as_mut() else {
                    continue;
                };
                depth += 1;

                match local {
                    b"cNvPr" if shape.name.is_empty() => {
                        shape.name = attribute(e, b"name").unwrap_or_default();
                    }
                    b"ph" => shape.placeholder = Some(placeholder(e)),
                    b"xfrm" if shape.bbox.is_none() && !in_text_body => in_xfrm = true,
                    b"txBody" if shape.kind == ShapeKind::Sp => in_text_body = true,
                    b"p" if in_text_body => paragraph = Some(Paragraph::default()),
                    b"r" | b"fld" if paragraph.is_some() => {
                        state.run = Some(TextRun::default());
                    }
                    b"rPr" if state.run.is_some() => {
                        state.in_props = true;
                        read_run_props(e, &mut state);
                    }
                    b"solidFill" if state.in_props => state.in_fill = true,
                    b"t" if state.run.is_some() => state.in_text = true,
                    _ => {}
                }
            }
            Event::Empty(ref e) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                let Some(shape) = current.as_mut() else {
                    continue;
                };

                match local {
                    b"cNvPr" if shape.name.is_empty() => {
                        shape.name = attribute(e, b"name").unwrap_or_default();
                    }
                    b"ph" => shape.placeholder = Some(placeholder(e)),
                    b"off" if in_xfrm => {
                        let bbox = shape.bbox.get_or_insert_with(BoundingBox::default);
                        bbox.x = numeric(e, b"x").unwrap_or(0.0);
                        bbox.y = numeric(e, b"y").unwrap_or(0.0);
                    }
                    b"ext" if in_xfrm => {
                        let bbox = shape.bbox.get_or_insert_with(BoundingBox::default);
                        bbox.w = numeric(e, b"cx").unwrap_or(0.0);
                        bbox.h = numeric(e, b"cy").unwrap_or(0.0);
                    }
                    b"p" if in_text_body => shape.paragraphs.push(Paragraph::default()),
                    b"rPr" if state.run.is_some() => read_run_props(e, &mut state),
                    b"latin" if state.in_props => {
                        if let Some(run) = state.run.as_mut() {
                            run.format.font = attribute(e, b"typeface");
                        }
                    }
                    b"srgbClr" if state.in_fill => {
                        if let Some(run) = state.run.as_mut() {
                            run.format.color = attribute(e, b"val");
                        }
                    }
                    b"br" => {
                        if let Some(p) = paragraph.as_mut() {
                            p.runs.push(TextRun::new("\n", RunFormat::default()));
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(ref e) => {
                if state.in_text {
                    if let Some(run) = state.run.as_mut() {
                        let text = e.unescape().unwrap_or_default();
                        run.text.push_str(&text);
                    }
                }
            }
            Event::End(ref e) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                let Some(shape) = current.as_mut() else {
                    continue;
                };
                depth -= 1;

                if depth == 0 {
                    if let Some(done) = current.take() {
                        shapes.push(done);
                    }
                    in_xfrm = false;
                    in_text_body = false;
                    paragraph = None;
                    state = RunState::default();
                    continue;
                }

                match local {
                    b"xfrm" => in_xfrm = false,
                    b"txBody" => in_text_body = false,
                    b"p" if in_text_body => {
                        if let Some(p) = paragraph.take() {
                            shape.paragraphs.push(p);
                        }
                    }
                    b"r" | b"fld" => {
                        if let (Some(run), Some(p)) = (state.run.take(), paragraph.as_mut()) {
                            p.runs.push(run);
                        }
                    }
                    b"rPr" => state.in_props = false,
                    b"solidFill" => state.in_fill = false,
                    b"t" => state.in_text = false,
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes)
}

fn placeholder(e: &BytesStart) -> Placeholder {
    Placeholder {
        kind: attribute(e, b"type"),
        idx: attribute(e, b"idx").and_then(|v| v.parse().ok()),
    }
}

fn read_run_props(e: &BytesStart, state: &mut RunState) {
    let Some(run) = state.run.as_mut() else {
        return;
    };
    run.format.size = attribute(e, b"sz").and_then(|v| v.parse().ok());
    run.format.bold = attribute(e, b"b").map(|v| flag(&v));
    run.format.italic = attribute(e, b"i").map(|v| flag(&v));
}

fn flag(value: &str) -> bool {
    matches!(value, "1" | "true")
}

fn numeric(e: &BytesStart, key: &[u8]) -> Option<f64> {
    attribute(e, key).and_then(|v| v.parse::<f64>().ok())
}

/// Value of the attribute whose local name is `key`.
pub(crate) fn attribute(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| local_name(a.key.as_ref()) == key)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld><p:spTree>
    <p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
    <p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/></a:xfrm></p:grpSpPr>
    <p:sp>
      <p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>
      <p:spPr/>
      <p:txBody><a:bodyPr/><a:lstStyle/>
        <a:p><a:r><a:rPr lang="en-US" sz="4400" b="1"><a:solidFill><a:srgbClr val="1F497D"/></a:solidFill><a:latin typeface="Calibri"/></a:rPr><a:t>Hello &amp; welcome</a:t></a:r></a:p>
      </p:txBody>
    </p:sp>
    <p:sp>
      <p:nvSpPr><p:cNvPr id="3" name="Content Placeholder 2"/><p:cNvSpPr/><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr>
      <p:spPr><a:xfrm><a:off x="838200" y="1825625"/><a:ext cx="10515600" cy="4351338"/></a:xfrm></p:spPr>
      <p:txBody><a:bodyPr/><a:p><a:r><a:t>First</a:t></a:r></a:p><a:p/><a:p><a:r><a:t>Third</a:t></a:r></a:p></p:txBody>
    </p:sp>
    <p:pic><p:nvPicPr><p:cNvPr id="4" name="Picture 3"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill/><p:spPr/></p:pic>
    <p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="5" name="Table 4"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr>
      <p:xfrm><a:off x="1" y="2"/><a:ext cx="3" cy="4"/></p:xfrm>
      <a:graphic><a:graphicData><a:tbl><a:tr><a:tc><a:txBody><a:bodyPr/><a:p><a:r><a:t>cell</a:t></a:r></a:p></a:txBody></a:tc></a:tr></a:tbl></a:graphicData></a:graphic>
    </p:graphicFrame>
    <p:sp>
      <p:nvSpPr><p:cNvPr id="6" name="Slide Number Placeholder 5"/><p:cNvSpPr/><p:nvPr><p:ph type="sldNum" idx="12"/></p:nvPr></p:nvSpPr>
      <p:spPr/>
      <p:txBody><a:bodyPr/><a:p><a:fld id="{1}" type="slidenum"><a:rPr lang="en-US"/><a:t>3</a:t></a:fld></a:p></p:txBody>
    </p:sp>
  </p:spTree></p:cSld>
</p:sld>"#;

    #[test]
    fn test_parse_shapes_roles_and_text() {
        let shapes = parse_shapes(SLIDE).unwrap();
        let roles: Vec<ShapeRole> = shapes.iter().map(RawShape::role).collect();
        assert_eq!(
            roles,
            vec![
                ShapeRole::Title,
                ShapeRole::Body,
                ShapeRole::Picture,
                ShapeRole::Table,
                ShapeRole::SlideNumber
            ]
        );

        let title = &shapes[0];
        assert_eq!(title.name, "Title 1");
        assert_eq!(title.bbox, None);
        let run = &title.paragraphs[0].runs[0];
        assert_eq!(run.text, "Hello & welcome");
        assert_eq!(run.format.size, Some(4400));
        assert_eq!(run.format.bold, Some(true));
        assert_eq!(run.format.italic, None);
        assert_eq!(run.format.font.as_deref(), Some("Calibri"));
        assert_eq!(run.format.color.as_deref(), Some("1F497D"));

        let body = &shapes[1];
        assert_eq!(
            body.bbox,
            Some(BoundingBox::new(838200.0, 1825625.0, 10515600.0, 4351338.0))
        );
        assert_eq!(body.paragraphs.len(), 3);
        assert_eq!(body.placeholder.as_ref().unwrap().idx, Some(1));

        assert_eq!(shapes[3].bbox, Some(BoundingBox::new(1.0, 2.0, 3.0, 4.0)));
        assert!(shapes[3].paragraphs.is_empty());
        assert_eq!(shapes[4].paragraphs[0].runs[0].text, "3");
    }

    #[test]
    fn test_inherited_bbox_prefers_idx_then_type() {
        let layout = parse_shapes(SLIDE).unwrap();
        let by_idx = Placeholder {
            kind: None,
            idx: Some(1),
        };
        assert_eq!(
            inherited_bbox(&by_idx, &layout, &[]),
            Some(BoundingBox::new(838200.0, 1825625.0, 10515600.0, 4351338.0))
        );

        let by_type = Placeholder {
            kind: Some("obj".to_string()),
            idx: Some(9),
        };
        assert!(inherited_bbox(&by_type, &layout, &[]).is_some());

        let title = Placeholder {
            kind: Some("ctrTitle".to_string()),
            idx: None,
        };
        assert_eq!(inherited_bbox(&title, &layout, &[]), None);
    }

    #[test]
    fn test_presentation_and_order() {
        let presentation = r#"<p:presentation xmlns:p="p" xmlns:r="r">
            <p:sldIdLst><p:sldId id="257" r:id="rId3"/><p:sldId id="256" r:id="rId2"/></p:sldIdLst>
            <p:sldSz cx="12192000" cy="6858000"/></p:presentation>"#;
        let info = parse_presentation(presentation).unwrap();
        assert_eq!(info.frame.width, 12192000.0);
        assert_eq!(info.slide_ids, vec!["rId3", "rId2"]);

        let rels = parse_relationships(
            r#"<Relationships>
            <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
            <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
            <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide2.xml"/>
            </Relationships>"#,
        )
        .unwrap();
        assert_eq!(
            slide_order(&info, &rels),
            vec!["ppt/slides/slide2.xml", "ppt/slides/slide1.xml"]
        );
        assert_eq!(
            slide_order(&PresentationInfo::default(), &rels),
            vec!["ppt/slides/slide1.xml", "ppt/slides/slide2.xml"]
        );
    }

    #[test]
    fn test_paths() {
        assert_eq!(rels_path_for("ppt/slides/slide1.xml"), "ppt/slides/_rels/slide1.xml.rels");
        assert_eq!(
            resolve_target("ppt/slides/slide1.xml", "../slideLayouts/slideLayout2.xml"),
            "ppt/slideLayouts/slideLayout2.xml"
        );
        assert_eq!(resolve_target("ppt/presentation.xml", "/ppt/slides/slide1.xml"), "ppt/slides/slide1.xml");
    }

    #[test]
    fn test_layout_name() {
        let xml = r#"<p:sldLayout xmlns:p="p"><p:cSld name="Two Content"><p:spTree/></p:cSld></p:sldLayout>"#;
        assert_eq!(parse_layout_name(xml).unwrap().as_deref(), Some("Two Content"));
    }

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("rId12"), Some(12));
        assert_eq!(extract_slide_number("slide1.xml"), Some(1));
        assert_eq!(extract_slide_number("slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }
}
