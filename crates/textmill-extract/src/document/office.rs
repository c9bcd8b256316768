//! Zipped XML office formats: DOCX, PPTX, ODT and ODP

use crate::error::{ExtractError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Cursor, Read};
use zip::ZipArchive;

type Container<'a> = ZipArchive<Cursor<&'a [u8]>>;

/// Largest XML part read out of an office container, in bytes
const MAX_PART_BYTES: usize = 64 * 1024 * 1024;

/// Element names that shape text in one XML vocabulary
struct Markup {
    /// Element whose paragraphs are grouped together (a shape or a page)
    group: Option<&'static [u8]>,
    paragraph: &'static [&'static [u8]],
    /// Text run element; when unset all text inside a paragraph counts
    run: Option<&'static [u8]>,
    tab: &'static [u8],
    line_break: &'static [u8],
    space: Option<&'static [u8]>,
    /// Paragraph property block; its tab stops are not text
    properties: Option<&'static [u8]>,
}

const WORDPROCESSINGML: Markup = Markup {
    group: None,
    paragraph: &[b"w:p"],
    run: Some(b"w:t"),
    tab: b"w:tab",
    line_break: b"w:br",
    space: None,
    properties: Some(b"w:pPr"),
};

const DRAWINGML: Markup = Markup {
    group: Some(b"p:sp"),
    paragraph: &[b"a:p"],
    run: Some(b"a:t"),
    tab: b"a:tab",
    line_break: b"a:br",
    space: None,
    properties: Some(b"a:pPr"),
};

const ODF_TEXT: Markup = Markup {
    group: None,
    paragraph: &[b"text:p", b"text:h"],
    run: None,
    tab: b"text:tab",
    line_break: b"text:line-break",
    space: Some(b"text:s"),
    properties: None,
};

const ODF_PRESENTATION: Markup = Markup {
    group: Some(b"draw:page"),
    ..ODF_TEXT
};

pub(super) fn docx(bytes: &[u8]) -> Result<String> {
    let mut container = open(bytes)?;
    let xml = read_part(&mut container, "word/document.xml")?;
    Ok(flatten(read_paragraphs(&xml, &WORDPROCESSINGML)?).join("\n"))
}

pub(super) fn odt(bytes: &[u8]) -> Result<String> {
    let mut container = open(bytes)?;
    let xml = read_part(&mut container, "content.xml")?;
    Ok(flatten(read_paragraphs(&xml, &ODF_TEXT)?).join("\n"))
}

/// Shape texts slide by slide, slides in numeric order
pub(super) fn pptx(bytes: &[u8]) -> Result<String> {
    let mut container = open(bytes)?;

    let mut slides: Vec<(u32, String)> = container
        .file_names()
        .filter_map(|name| {
            let number = name
                .strip_prefix("ppt/slides/slide")?
                .strip_suffix(".xml")?
                .parse()
                .ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    slides.sort_unstable();

    let mut shapes = Vec::new();
    for (_, name) in slides {
        let xml = read_part(&mut container, &name)?;
        shapes.extend(group_texts(read_paragraphs(&xml, &DRAWINGML)?));
    }
    Ok(shapes.join("\n"))
}

/// Page texts in document order
pub(super) fn odp(bytes: &[u8]) -> Result<String> {
    let mut container = open(bytes)?;
    let xml = read_part(&mut container, "content.xml")?;
    Ok(group_texts(read_paragraphs(&xml, &ODF_PRESENTATION)?).join("\n"))
}

fn open(bytes: &[u8]) -> Result<Container<'_>> {
    Ok(ZipArchive::new(Cursor::new(bytes))?)
}

fn read_part(container: &mut Container<'_>, name: &str) -> Result<String> {
    read_part_capped(container, name, MAX_PART_BYTES)
}

/// Parts inflating past `max_bytes` are rejected without being read further
fn read_part_capped(container: &mut Container<'_>, name: &str, max_bytes: usize) -> Result<String> {
    let part = container
        .by_name(name)
        .map_err(|_| ExtractError::CorruptFile(format!("missing {}", name)))?;
    let mut xml = String::new();
    part.take(max_bytes as u64 + 1)
        .read_to_string(&mut xml)
        .map_err(|err| ExtractError::CorruptFile(format!("{}: {}", name, err)))?;
    if xml.len() > max_bytes {
        return Err(ExtractError::ContentTooLarge {
            size: xml.len(),
            max: max_bytes,
        });
    }
    Ok(xml)
}

fn flatten(groups: Vec<Vec<String>>) -> Vec<String> {
    groups
        .into_iter()
        .flatten()
        .filter(|p| !p.trim().is_empty())
        .collect()
}

/// Each group's paragraphs joined and trimmed; blank groups dropped
fn group_texts(groups: Vec<Vec<String>>) -> Vec<String> {
    groups
        .into_iter()
        .map(|paragraphs| paragraphs.join("\n").trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

/// Paragraph texts in document order, grouped by `markup.group` elements.
/// Without a group element everything lands in one group.
fn read_paragraphs(xml: &str, markup: &Markup) -> Result<Vec<Vec<String>>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut groups = Vec::new();
    let mut group = Vec::new();
    let mut paragraph = String::new();
    let mut depth = 0usize;
    let mut in_run = false;
    let mut in_properties = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = e.name();
                if markup.paragraph.contains(&name.as_ref()) {
                    depth += 1;
                } else if Some(name.as_ref()) == markup.run {
                    in_run = true;
                } else if Some(name.as_ref()) == markup.properties {
                    in_properties = true;
                } else if depth > 0 && !in_properties {
                    push_inline(&e, markup, &mut paragraph);
                }
            }
            Event::Empty(e) => {
                if markup.paragraph.contains(&e.name().as_ref()) {
                    if depth == 0 {
                        group.push(String::new());
                    }
                } else if depth > 0 && !in_properties {
                    push_inline(&e, markup, &mut paragraph);
                }
            }
            Event::End(e) => {
                let name = e.name();
                if markup.paragraph.contains(&name.as_ref()) {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        group.push(std::mem::take(&mut paragraph));
                    }
                } else if Some(name.as_ref()) == markup.run {
                    in_run = false;
                } else if Some(name.as_ref()) == markup.properties {
                    in_properties = false;
                } else if Some(name.as_ref()) == markup.group {
                    groups.push(std::mem::take(&mut group));
                }
            }
            Event::Text(t) if depth > 0 && (in_run || markup.run.is_none()) => {
                paragraph.push_str(&t.unescape()?);
            }
            Event::CData(t) if depth > 0 && (in_run || markup.run.is_none()) => {
                paragraph.push_str(&String::from_utf8_lossy(&t));
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !group.is_empty() {
        groups.push(group);
    }
    Ok(groups)
}

fn push_inline(e: &BytesStart<'_>, markup: &Markup, paragraph: &mut String) {
    let name = e.name();
    let name = name.as_ref();
    if name == markup.tab {
        paragraph.push('\t');
    } else if name == markup.line_break {
        paragraph.push('\n');
    } else if Some(name) == markup.space {
        let count = e
            .try_get_attribute("text:c")
            .ok()
            .flatten()
            .and_then(|attr| std::str::from_utf8(&attr.value).ok()?.parse().ok())
            .unwrap_or(1);
        paragraph.extend(std::iter::repeat(' ').take(count));
    }
}
