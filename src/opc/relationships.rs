//! Relationship part parsing

use crate::error::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::Event;

/// Find the target of the first relationship with the given type
pub(super) fn find_relationship_target(rels_xml: &str, rel_type: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(rels_xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let mut target = None;
                    let mut found_type = None;

                    for attr in e.attributes() {
                        let attr = attr?;
                        let value = std::str::from_utf8(&attr.value)
                            .map_err(|e| Error::InvalidXml(e.to_string()))?;

                        match attr.key.as_ref() {
                            b"Target" => target = Some(value.to_string()),
                            b"Type" => found_type = Some(value.to_string()),
                            _ => {}
                        }
                    }

                    if let (Some(t), Some(rt)) = (target, found_type)
                        && rt == rel_type
                    {
                        return Ok(Some(t));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(None)
}
