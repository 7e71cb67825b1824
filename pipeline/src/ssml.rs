//! SSML-subset parsing (spec §6.5). The XML DOM/SAX parser itself is an
//! external collaborator (spec §1) — `quick-xml` drives the actual
//! tokenizing; this module only builds the annotated document tree from its
//! event stream, tolerating unknown elements as pass-throughs.

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use tts_core::tree::NodeKind;
use tts_core::{Document, ElementName, Error, NodeId, Result};

/// Parse `xml` as a document fragment and append its nodes under `parent`.
/// Unknown elements become [`NodeKind::Unknown`] pass-throughs (spec §6.5);
/// attribute order is preserved.
pub fn parse_fragment_into(doc: &mut Document, parent: NodeId, xml: &str) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut stack = vec![parent];
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                let cur = *stack.last().unwrap();
                let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                let node = match ElementName::from_str(&local) {
                    Some(name) => doc.append_element(cur, name),
                    None => {
                        let n = doc.create_node(NodeKind::Unknown {
                            raw: format!("<{local}>"),
                        });
                        doc.append_child(cur, n);
                        n
                    }
                };
                for attr in e.attributes().flatten() {
                    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                    let val = attr
                        .unescape_value()
                        .map_err(|e| Error::InvalidInput(e.to_string()))?
                        .into_owned();
                    let _ = doc.set_attr(node, key, val);
                }
                stack.push(node);
            }
            Ok(Event::Empty(e)) => {
                let cur = *stack.last().unwrap();
                let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                let node = match ElementName::from_str(&local) {
                    Some(name) => doc.append_element(cur, name),
                    None => {
                        let n = doc.create_node(NodeKind::Unknown {
                            raw: format!("<{local}/>"),
                        });
                        doc.append_child(cur, n);
                        n
                    }
                };
                for attr in e.attributes().flatten() {
                    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                    let val = attr
                        .unescape_value()
                        .map_err(|e| Error::InvalidInput(e.to_string()))?
                        .into_owned();
                    let _ = doc.set_attr(node, key, val);
                }
            }
            Ok(Event::End(_)) => {
                if stack.len() > 1 {
                    stack.pop();
                }
            }
            Ok(Event::Text(t)) => {
                let cur = *stack.last().unwrap();
                let text = t
                    .unescape()
                    .map_err(|e| Error::InvalidInput(e.to_string()))?
                    .into_owned();
                if !text.is_empty() {
                    doc.append_text(cur, text);
                }
            }
            Ok(_) => {}
            Err(e) => return Err(Error::InvalidInput(format!("malformed SSML: {e}"))),
        }
        buf.clear();
    }

    Ok(())
}

/// Check that `xml` is well-formed, without building a tree (used by
/// `PreProcess` for the `partial` input kind, spec §4.2).
pub fn check_well_formed(xml: &str) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut depth: i32 = 0;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => depth -= 1,
            Ok(_) => {}
            Err(e) => return Err(Error::InvalidInput(format!("ill-formed SSML: {e}"))),
        }
        buf.clear();
    }
    if depth != 0 {
        return Err(Error::InvalidInput("unbalanced SSML tags".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_elements_become_pass_throughs() {
        let mut doc = Document::new();
        let root = doc.root();
        parse_fragment_into(&mut doc, root, "<foo>hi</foo>").unwrap();
        let child = doc.children(root)[0];
        assert!(matches!(doc.kind(child), NodeKind::Unknown { .. }));
    }

    #[test]
    fn known_elements_build_real_nodes() {
        let mut doc = Document::new();
        let root = doc.root();
        parse_fragment_into(&mut doc, root, "<w role=\"n\">你好</w>").unwrap();
        let w = doc.children(root)[0];
        assert_eq!(doc.element_name(w), Some(ElementName::W));
        assert_eq!(doc.attr(w, "role"), Some("n"));
        assert_eq!(doc.text_content(w), "你好");
    }

    #[test]
    fn rejects_unbalanced_fragment() {
        assert!(check_well_formed("<w>hi").is_err());
        assert!(check_well_formed("<w>hi</w>").is_ok());
    }
}
