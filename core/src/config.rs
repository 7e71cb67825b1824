//! Module config file loader (spec §6.4).
//!
//! The config is a small XML document; parsed with `quick-xml` rather than
//! hand-rolled scanning, matching the rest of the pack's approach to XML
//! (`emotechlab-ssml-parser`, `mufeedali-oewn_rs`).

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{Error, Result};

/// One `dlib` entry: a dynamic library providing additional stages.
/// Loading the library itself is a deployment mechanism out of scope here
/// (spec §9); only its declared path is retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DlibEntry {
    pub file: String,
}

/// Lexicon data location, parsed from a `textdata` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDataEntry {
    pub path: String,
    pub load_data: bool,
}

/// HMM model location, parsed from a `voicedata` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceDataEntry {
    pub path: String,
}

/// Parsed `<modules xml:lang="...">` config document.
#[derive(Debug, Clone, Default)]
pub struct ModuleConfig {
    pub lang: String,
    pub dlibs: Vec<DlibEntry>,
    pub textdata: Vec<TextDataEntry>,
    pub voicedata: Vec<VoiceDataEntry>,
}

impl ModuleConfig {
    /// Parse a module config document from its XML text.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut cfg = ModuleConfig::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Eof) => break,
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    match local.as_str() {
                        "modules" => {
                            for attr in e.attributes().flatten() {
                                let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                                if key == "xml:lang" || key == "lang" {
                                    cfg.lang = attr
                                        .unescape_value()
                                        .map_err(|e| Error::ConfigOpenFailed(e.to_string()))?
                                        .into_owned();
                                }
                            }
                        }
                        "dlib" => {
                            let mut file = String::new();
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"file" {
                                    file = attr
                                        .unescape_value()
                                        .map_err(|e| Error::ConfigOpenFailed(e.to_string()))?
                                        .into_owned();
                                }
                            }
                            cfg.dlibs.push(DlibEntry { file });
                        }
                        "textdata" => {
                            let mut path = String::new();
                            let mut load_data = true;
                            for attr in e.attributes().flatten() {
                                let val = attr
                                    .unescape_value()
                                    .map_err(|e| Error::ConfigOpenFailed(e.to_string()))?
                                    .into_owned();
                                match attr.key.as_ref() {
                                    b"path" => path = val,
                                    b"loaddata" => load_data = val == "true",
                                    _ => {}
                                }
                            }
                            cfg.textdata.push(TextDataEntry { path, load_data });
                        }
                        "voicedata" => {
                            let mut path = String::new();
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"path" {
                                    path = attr
                                        .unescape_value()
                                        .map_err(|e| Error::ConfigOpenFailed(e.to_string()))?
                                        .into_owned();
                                }
                            }
                            cfg.voicedata.push(VoiceDataEntry { path });
                        }
                        _ => {}
                    }
                }
                Err(e) => {
                    return Err(Error::ConfigOpenFailed(format!(
                        "malformed module config XML: {e}"
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(cfg)
    }

    /// Load and parse a module config file from disk.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigOpenFailed(format!("{}: {e}", path.display())))?;
        Self::parse(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <modules xml:lang="zh-CN">
            <dlib file="libextra.so"/>
            <textdata path="data/lexicon.bin" loaddata="true"/>
            <voicedata path="data/voice"/>
        </modules>
    "#;

    #[test]
    fn parses_all_children() {
        let cfg = ModuleConfig::parse(SAMPLE).unwrap();
        assert_eq!(cfg.lang, "zh-CN");
        assert_eq!(cfg.dlibs, vec![DlibEntry { file: "libextra.so".into() }]);
        assert_eq!(
            cfg.textdata,
            vec![TextDataEntry {
                path: "data/lexicon.bin".into(),
                load_data: true
            }]
        );
        assert_eq!(
            cfg.voicedata,
            vec![VoiceDataEntry { path: "data/voice".into() }]
        );
    }

    #[test]
    fn empty_dlib_list_is_fine() {
        let cfg = ModuleConfig::parse(r#"<modules xml:lang="en"></modules>"#).unwrap();
        assert!(cfg.dlibs.is_empty());
    }

    #[test]
    fn malformed_xml_surfaces_config_open_failed() {
        let err = ModuleConfig::parse("<modules><unclosed></modules>").unwrap_err();
        assert!(matches!(err, Error::ConfigOpenFailed(_)));
    }
}
