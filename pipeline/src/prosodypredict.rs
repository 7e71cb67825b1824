//! ProsodyPredict (spec §4.11), HMM backend: writes a default `prosody`
//! onto every `unit` — durations are owned by the HMM synthesizer and
//! filled in later (spec §4.12.6). A concatenative backend would predict
//! real values here; that path is out of scope (spec §1).

use tts_core::{Document, ElementName, EnterAction, NodeId, Result, Visitor};

use crate::stage::Stage;

/// Number of points in the default (flat) pitch contour.
const CONTOUR_POINTS: usize = 5;

/// The `ProsodyPredict` stage (HMM backend: no-op numeric defaults).
pub struct ProsodyPredict;

impl Stage for ProsodyPredict {
    fn name(&self) -> &'static str {
        "ProsodyPredict"
    }

    fn process(&mut self, doc: &mut Document) -> Result<()> {
        struct WriteDefaults;
        impl Visitor for WriteDefaults {
            fn enter(&mut self, doc: &mut Document, node: NodeId) -> Result<EnterAction> {
                if doc.element_name(node) == Some(ElementName::Unit) {
                    if let Some(prosody) = doc
                        .children(node)
                        .into_iter()
                        .find(|&c| doc.element_name(c) == Some(ElementName::Prosody))
                    {
                        write_defaults(doc, prosody);
                    }
                }
                Ok(EnterAction::Continue)
            }
            fn leave(&mut self, _doc: &mut Document, _node: NodeId) -> Result<()> {
                Ok(())
            }
        }
        let root = doc.root();
        tts_core::walk(doc, root, &mut WriteDefaults)
    }
}

fn write_defaults(doc: &mut Document, prosody: NodeId) {
    let _ = doc.set_attr(prosody, "duration", "0");
    let _ = doc.set_attr(prosody, "rate", "1.0");
    let _ = doc.set_attr(prosody, "volume", "1.0");
    let _ = doc.set_attr(prosody, "pitch", "1.0");
    let _ = doc.set_attr(prosody, "pratio", "0");
    let _ = doc.set_attr(prosody, "dratio", "0");
    let _ = doc.set_attr(prosody, "vratio", "0");
    let contour = vec!["0"; CONTOUR_POINTS].join(",");
    let _ = doc.set_attr(prosody, "contour", contour);
}
