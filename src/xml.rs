//! Conversion between XML text and [`Node`] documents.
//!
//! A document is a [`Node`] whose children are the root elements, so a
//! parsed `settings.xml` is reached through `document.get("settings")`.
//! Serialization is headless (no XML declaration) and indented with two
//! spaces.

use crate::error::{Error, Result};
use crate::node::{Node, Value};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::fmt::Display;
use std::path::Path;

const BOM: char = '\u{feff}';

/// Carriage-return character reference some writers leave behind.
pub const CARRIAGE_RETURN_ENTITY: &str = "&#xD;";

/// XML Schema instance namespace.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Remove a leading UTF-8 byte order mark.
pub fn strip_bom(content: &str) -> &str {
    content.strip_prefix(BOM).unwrap_or(content)
}

/// Parse XML text into a document node.
///
/// Comments, processing instructions and the declaration are dropped.
/// Whitespace around text is trimmed. An element without attributes or
/// children becomes a [`Value::Scalar`]; a repeated element becomes a
/// [`Value::List`].
pub fn parse_document(content: &str) -> Result<Node> {
    let mut reader = Reader::from_str(strip_bom(content));
    reader.config_mut().trim_text(true);

    // Bottom entry is the document itself.
    let mut stack: Vec<(String, Node)> = vec![(String::new(), Node::new())];

    loop {
        match reader.read_event().map_err(parse_error)? {
            Event::Start(e) => {
                stack.push((element_name(&e)?, element_node(&e)?));
            }
            Event::Empty(e) => {
                let name = element_name(&e)?;
                let node = element_node(&e)?;
                attach(&mut stack, &name, node)?;
            }
            Event::End(_) => {
                if stack.len() < 2 {
                    return Err(parse_message("unexpected closing tag"));
                }
                if let Some((name, node)) = stack.pop() {
                    attach(&mut stack, &name, node)?;
                }
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(parse_error)?;
                append_text(&mut stack, &text)?;
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                append_text(&mut stack, &text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        let open = stack.last().map(|(name, _)| name.as_str()).unwrap_or("");
        return Err(parse_message(format!("unclosed element <{}>", open)));
    }

    Ok(stack.pop().map(|(_, node)| node).unwrap_or_default())
}

fn element_name(e: &BytesStart<'_>) -> Result<String> {
    std::str::from_utf8(e.name().as_ref())
        .map(str::to_owned)
        .map_err(parse_error)
}

fn element_node(e: &BytesStart<'_>) -> Result<Node> {
    let mut node = Node::new();
    for attr in e.attributes() {
        let attr = attr.map_err(parse_error)?;
        let key = std::str::from_utf8(attr.key.as_ref()).map_err(parse_error)?;
        let value = attr.unescape_value().map_err(parse_error)?;
        node.set_attribute(key, &value);
    }
    Ok(node)
}

fn attach(stack: &mut [(String, Node)], name: &str, node: Node) -> Result<()> {
    let value = if node.attributes().next().is_none() && node.children().next().is_none() {
        Value::Scalar(node.text().unwrap_or_default().to_string())
    } else {
        Value::Node(node)
    };

    let (_, parent) = stack
        .last_mut()
        .ok_or_else(|| parse_message("element outside of document"))?;
    parent.push_child(name, value);
    Ok(())
}

fn append_text(stack: &mut [(String, Node)], text: &str) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    if stack.len() < 2 {
        return Err(parse_message("text outside of root element"));
    }
    if let Some((_, node)) = stack.last_mut() {
        let combined = match node.text() {
            Some(previous) => format!("{}{}", previous, text),
            None => text.to_string(),
        };
        node.set_text(combined);
    }
    Ok(())
}

/// Serialize a single root element.
///
/// Carriage returns are removed from the output, both raw and as
/// [`CARRIAGE_RETURN_ENTITY`].
pub fn to_xml_string(root_name: &str, root: &Value) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_value(&mut writer, root_name, root)?;
    finish(writer)
}

/// Serialize every root element of a document.
pub fn document_to_xml(document: &Node) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    for (name, value) in document.children() {
        write_value(&mut writer, name, value)?;
    }
    finish(writer)
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String> {
    let xml = String::from_utf8(writer.into_inner()).map_err(serialize_error)?;
    Ok(xml.replace(CARRIAGE_RETURN_ENTITY, "").replace('\r', ""))
}

/// Serialize the `root_name` element of a document and write it to `path`.
///
/// A document without that root is written as an empty element. Parent
/// directories are created as needed.
pub fn write_document_root(path: &Path, document: &Node, root_name: &str) -> Result<()> {
    let xml = match document.get(root_name) {
        Some(root) => to_xml_string(root_name, root)?,
        None => to_xml_string(root_name, &Value::Node(Node::new()))?,
    };
    write_xml(path, &xml)
}

/// Write serialized XML to `path`, creating parent directories.
pub fn write_xml(path: &Path, xml: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::CreateDir {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, xml).map_err(|e| Error::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_value(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> Result<()> {
    match value {
        Value::List(items) => {
            for item in items {
                write_value(writer, name, item)?;
            }
        }
        Value::Scalar(text) if text.is_empty() => {
            write_event(writer, Event::Empty(BytesStart::new(name)))?;
        }
        Value::Scalar(text) => {
            write_event(writer, Event::Start(BytesStart::new(name)))?;
            write_event(writer, Event::Text(BytesText::new(text)))?;
            write_event(writer, Event::End(BytesEnd::new(name)))?;
        }
        Value::Node(node) => {
            let mut start = BytesStart::new(name);
            for attr in node.attributes() {
                start.push_attribute(attr);
            }

            if node.text().is_none() && node.children().next().is_none() {
                return write_event(writer, Event::Empty(start));
            }

            write_event(writer, Event::Start(start))?;
            if let Some(text) = node.text() {
                write_event(writer, Event::Text(BytesText::new(text)))?;
            }
            for (child_name, child) in node.children() {
                write_value(writer, child_name, child)?;
            }
            write_event(writer, Event::End(BytesEnd::new(name)))?;
        }
    }
    Ok(())
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer.write_event(event).map_err(serialize_error)
}

fn parse_error(e: impl Display) -> Error {
    parse_message(e.to_string())
}

fn parse_message(message: impl Into<String>) -> Error {
    Error::ParseXml {
        message: message.into(),
    }
}

fn serialize_error(e: impl Display) -> Error {
    Error::SerializeXml {
        message: e.to_string(),
    }
}
