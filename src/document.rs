//! In-memory XML document model
//!
//! Documents are parsed with a `quick_xml::Reader` event loop into an owned
//! [`Element`] tree. Only what the comparison needs is kept: tag names,
//! attributes, the leading character data of each element, and child
//! elements in document order.
//!
//! Files are decoded with the encoding named in their XML declaration.

use std::path::Path;

use indexmap::IndexMap;
use quick_xml::Reader;
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};

use crate::error::{CompareError, Result};

/// A single XML element and its subtree
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Tag name, including any namespace prefix
    pub tag: String,
    /// Attributes in document order
    pub attributes: IndexMap<String, String>,
    /// Character data preceding the first child element
    pub text: Option<String>,
    /// Child elements in document order
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Text with surrounding whitespace removed; empty when there is none
    pub fn trimmed_text(&self) -> &str {
        self.text.as_deref().map(str::trim).unwrap_or("")
    }
}

/// Element under construction while its end tag has not been seen yet
struct OpenElement {
    element: Element,
    seen_child: bool,
}

impl OpenElement {
    fn push_text(&mut self, text: &str) {
        // Character data after the first child is tail text of that child.
        if self.seen_child {
            return;
        }
        match &mut self.element.text {
            Some(existing) => existing.push_str(text),
            None => self.element.text = Some(text.to_string()),
        }
    }
}

/// Parse an XML document held in memory
pub fn parse_document(xml: &str) -> Result<Element> {
    build_tree(Reader::from_str(xml), Path::new("<memory>"))
}

/// Parse raw document bytes, decoding them with the encoding the document declares
///
/// Without a declaration or byte order mark the bytes are read as UTF-8.
pub fn parse_document_bytes(bytes: &[u8]) -> Result<Element> {
    build_tree(Reader::from_reader(bytes), Path::new("<memory>"))
}

/// Read and parse an XML document from disk
pub async fn load_document(path: &Path) -> Result<Element> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CompareError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(CompareError::Io(e)),
    };
    build_tree(Reader::from_reader(bytes.as_slice()), path)
}

fn build_tree(mut reader: Reader<&[u8]>, file: &Path) -> Result<Element> {
    reader.config_mut().trim_text(false);
    reader.config_mut().check_end_names = true;

    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            CompareError::parse_failure(
                file,
                format!("{} (at byte {})", e, reader.error_position()),
            )
        })?;
        // The declaration may switch the encoding, so ask after every event.
        let decoder = reader.decoder();

        match event {
            Event::Start(start) => {
                ensure_single_root(&root, file)?;
                if let Some(parent) = stack.last_mut() {
                    parent.seen_child = true;
                }
                stack.push(OpenElement {
                    element: start_element(&start, decoder, file)?,
                    seen_child: false,
                });
            }
            Event::Empty(start) => {
                ensure_single_root(&root, file)?;
                let element = start_element(&start, decoder, file)?;
                match stack.last_mut() {
                    Some(parent) => {
                        parent.seen_child = true;
                        parent.element.children.push(element);
                    }
                    None => root = Some(element),
                }
            }
            Event::End(_) => {
                let Some(open) = stack.pop() else {
                    return Err(CompareError::parse_failure(file, "unexpected closing tag"));
                };
                match stack.last_mut() {
                    Some(parent) => parent.element.children.push(open.element),
                    None => root = Some(open.element),
                }
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| CompareError::parse_failure(file, e))?;
                match stack.last_mut() {
                    Some(open) => open.push_text(&text),
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(CompareError::parse_failure(
                            file,
                            "character data outside the root element",
                        ));
                    }
                }
            }
            Event::CData(cdata) => {
                let text = cdata
                    .decode()
                    .map_err(|e| CompareError::parse_failure(file, e))?;
                match stack.last_mut() {
                    Some(open) => open.push_text(&text),
                    None => {
                        return Err(CompareError::parse_failure(
                            file,
                            "CDATA section outside the root element",
                        ));
                    }
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes
            // carry nothing we compare.
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(CompareError::parse_failure(
            file,
            format!("unclosed element <{}>", open.element.tag),
        ));
    }

    root.ok_or_else(|| CompareError::parse_failure(file, "no root element found"))
}

fn ensure_single_root(root: &Option<Element>, file: &Path) -> Result<()> {
    if root.is_some() {
        return Err(CompareError::parse_failure(
            file,
            "junk after document element",
        ));
    }
    Ok(())
}

fn start_element(start: &BytesStart<'_>, decoder: Decoder, file: &Path) -> Result<Element> {
    let tag = decoder
        .decode(start.name().as_ref())
        .map_err(|e| CompareError::parse_failure(file, e))?
        .into_owned();

    let mut element = Element::new(tag);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| CompareError::parse_failure(file, e))?;
        let key = decoder
            .decode(attr.key.as_ref())
            .map_err(|e| CompareError::parse_failure(file, e))?
            .into_owned();
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(|e| CompareError::parse_failure(file, e))?
            .into_owned();
        element.attributes.insert(key, value);
    }
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_document() {
        let root = parse_document(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<root version="2">
    <section name="a">
        <item id="1">first</item>
        <item id="2"/>
    </section>
</root>"#,
        )
        .unwrap();

        assert_eq!(root.tag, "root");
        assert_eq!(root.attributes.get("version").map(String::as_str), Some("2"));
        assert_eq!(root.children.len(), 1);

        let section = &root.children[0];
        assert_eq!(section.tag, "section");
        assert_eq!(section.children.len(), 2);
        assert_eq!(section.children[0].trimmed_text(), "first");
        assert_eq!(section.children[1].text, None);
    }

    #[test]
    fn test_text_is_leading_character_data_only() {
        let root = parse_document("<a> head <b/> tail </a>").unwrap();
        assert_eq!(root.text.as_deref(), Some(" head "));
        assert_eq!(root.trimmed_text(), "head");
        assert_eq!(root.children[0].text, None);
    }

    #[test]
    fn test_entities_and_cdata_are_decoded() {
        let root = parse_document(r#"<a key="x &amp; y">1 &lt; 2<![CDATA[ <raw>]]></a>"#).unwrap();
        assert_eq!(root.attributes["key"], "x & y");
        assert_eq!(root.text.as_deref(), Some("1 < 2 <raw>"));
    }

    #[test]
    fn test_attribute_order_is_preserved() {
        let root = parse_document(r#"<a z="1" b="2" m="3"/>"#).unwrap();
        let keys: Vec<&str> = root.attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "b", "m"]);
    }

    #[test]
    fn test_namespace_prefix_kept_in_tag() {
        let root = parse_document(r#"<ns:root xmlns:ns="urn:x"><ns:child/></ns:root>"#).unwrap();
        assert_eq!(root.tag, "ns:root");
        assert_eq!(root.children[0].tag, "ns:child");
    }

    #[test]
    fn test_comments_and_processing_instructions_ignored() {
        let root =
            parse_document("<!-- c --><?pi data?><root><!-- inner --><a/></root>").unwrap();
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_malformed_documents_fail() {
        for xml in [
            "",
            "   ",
            "<root>",
            "<root></other>",
            "<root/><second/>",
            "text<root/>",
            r#"<root a="1" a="2"/>"#,
        ] {
            let result = parse_document(xml);
            assert!(
                matches!(result, Err(CompareError::ParseFailure { .. })),
                "expected parse failure for {:?}, got {:?}",
                xml,
                result
            );
        }
    }

    #[tokio::test]
    async fn test_load_missing_document() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.xml");

        let result = load_document(&path).await;
        assert!(matches!(result, Err(CompareError::MissingFile { .. })));
    }

    #[test]
    fn test_declared_latin1_encoding_is_decoded() {
        let mut xml = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><root><a n=\"caf".to_vec();
        xml.push(0xE9);
        xml.extend_from_slice(b"\">cr");
        xml.push(0xE8);
        xml.extend_from_slice(b"me</a></root>");

        let root = parse_document_bytes(&xml).unwrap();
        assert_eq!(root.children[0].attributes["n"], "caf\u{e9}");
        assert_eq!(root.children[0].trimmed_text(), "cr\u{e8}me");
    }

    #[test]
    fn test_undeclared_encoding_is_utf8() {
        let root = parse_document_bytes("<root n=\"\u{e9}t\u{e9}\"/>".as_bytes()).unwrap();
        assert_eq!(root.attributes["n"], "\u{e9}t\u{e9}");
    }

    #[tokio::test]
    async fn test_load_latin1_document_from_disk() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("latin1.xml");
        let mut xml = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><root><a n=\"caf".to_vec();
        xml.push(0xE9);
        xml.extend_from_slice(b"\"/></root>");
        std::fs::write(&path, xml).unwrap();

        let root = load_document(&path).await.unwrap();
        assert_eq!(root.children[0].attributes["n"], "caf\u{e9}");
    }

    #[tokio::test]
    async fn test_load_document_from_disk() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.xml");
        std::fs::write(&path, "<root><a x=\"1\">hi</a></root>").unwrap();

        let root = load_document(&path).await.unwrap();
        assert_eq!(root.children[0].attributes["x"], "1");
    }
}
