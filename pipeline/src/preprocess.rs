//! PreProcess (spec §4.2): wrap raw/partial text in a synthetic `speak`
//! root, or parse a full SSML document as-is.

use tracing::debug;

use tts_core::{Document, ElementName, Error, Result};

use crate::ssml;

/// Shape of the input handed to `process` (spec §6.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Raw,
    PartialSsml,
    FullSsml,
}

/// Build the initial document from `input`, per spec §4.2.
pub fn pre_process(input: &str, kind: InputKind, lang: Option<&str>) -> Result<Document> {
    debug!(stage = "PreProcess", ?kind, "wrapping input");
    let mut doc = Document::new();
    let root = doc.root();

    match kind {
        InputKind::FullSsml => {
            ssml::check_well_formed(input)?;
            ssml::parse_fragment_into(&mut doc, root, input)?;
            if doc.children(root).is_empty() {
                return Err(Error::InvalidInput(
                    "full SSML document has no root element".into(),
                ));
            }
        }
        InputKind::Raw | InputKind::PartialSsml => {
            if kind == InputKind::PartialSsml {
                ssml::check_well_formed(input)?;
            }
            let speak = doc.append_element(root, ElementName::Speak);
            if let Some(l) = lang {
                doc.set_attr(speak, "xml:lang", l)?;
            }
            if kind == InputKind::PartialSsml {
                ssml::parse_fragment_into(&mut doc, speak, input)?;
            } else {
                doc.append_text(speak, input);
            }
        }
    }

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_input_is_wrapped_in_speak() {
        let doc = pre_process("你好", InputKind::Raw, Some("zh-CN")).unwrap();
        let root = doc.root();
        let speak = doc.children(root)[0];
        assert_eq!(doc.element_name(speak), Some(ElementName::Speak));
        assert_eq!(doc.attr(speak, "xml:lang"), Some("zh-CN"));
        assert_eq!(doc.text_content(speak), "你好");
    }

    #[test]
    fn partial_rejects_ill_formed_xml() {
        let err = pre_process("<w>broken", InputKind::PartialSsml, None).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn empty_raw_input_is_a_noop_through_preprocess() {
        let doc = pre_process("", InputKind::Raw, None).unwrap();
        let root = doc.root();
        let speak = doc.children(root)[0];
        assert_eq!(doc.text_content(speak), "");
    }
}
