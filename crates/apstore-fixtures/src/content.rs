//! Sample payloads for generated objects.

use apstore_types::ItemType;

/// Text longer than this becomes an `Article` instead of a `Note`.
pub const ARTICLE_THRESHOLD: usize = 600;

/// One sample payload and its media type.
#[derive(Clone, Copy, Debug)]
pub struct Sample {
    pub media_type: &'static str,
    pub body: &'static [u8],
}

impl Sample {
    pub fn is_text(&self) -> bool {
        self.media_type.starts_with("text/")
    }

    /// The object type this payload is published as.
    pub fn object_type(&self) -> ItemType {
        match self.media_type {
            "text/html" | "text/markdown" | "text/plain" => {
                if self.body.len() > ARTICLE_THRESHOLD {
                    ItemType::Article
                } else {
                    ItemType::Note
                }
            }
            "image/svg+xml" => ItemType::Document,
            "image/png" | "image/jpeg" => ItemType::Image,
            "video/webm" | "video/mp4" => ItemType::Video,
            "audio/mpeg" => ItemType::Audio,
            _ => ItemType::Document,
        }
    }

    /// First sentence of a text payload.
    pub fn summary(&self) -> Option<String> {
        if !self.is_text() {
            return None;
        }
        let text = String::from_utf8_lossy(self.body);
        let end = text.find('.').unwrap_or(text.len());
        Some(text[..end].trim().to_string())
    }
}

const PNG: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, b'I', b'H', b'D', b'R',
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4,
    0x89,
];

const WEBM: &[u8] = &[0x1a, 0x45, 0xdf, 0xa3, 0x9f, 0x42, 0x86, 0x81, 0x01, b'w', b'e', b'b', b'm'];

const MP3: &[u8] = &[b'I', b'D', b'3', 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0f, 0xff, 0xfb];

const SVG: &[u8] = br#"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16"><circle cx="8" cy="8" r="7" fill="teal"/></svg>"#;

const LONG_FORM: &[u8] = b"Federated timelines are assembled from many small pieces. \
Every activity a server receives names an actor, an object, and an audience, and the \
receiving side has to decide where each of those lands. Inboxes collect what arrives, \
outboxes record what was sent, and the followers collection decides who hears about it next. \
None of these collections is special on its own; each is an ordered list of references that \
happens to be owned by an actor. What makes them useful is that they exist from the moment \
the actor does, that their counts never drift from their contents, and that a reader can walk \
them page by page without missing an entry or seeing one twice. Getting those three properties \
right is most of the work of storing a social graph.";

/// The built-in sample table.
pub const SAMPLES: &[Sample] = &[
    Sample {
        media_type: "text/plain",
        body: b"Hello from the fediverse. This note was generated for a test run.",
    },
    Sample {
        media_type: "text/html",
        body: b"<p>Short update. Nothing to see here, move along.</p>",
    },
    Sample {
        media_type: "text/markdown",
        body: b"# Release notes. The *outbox* is now paginated.",
    },
    Sample {
        media_type: "text/plain",
        body: LONG_FORM,
    },
    Sample {
        media_type: "image/svg+xml",
        body: SVG,
    },
    Sample {
        media_type: "image/png",
        body: PNG,
    },
    Sample {
        media_type: "video/webm",
        body: WEBM,
    },
    Sample {
        media_type: "audio/mpeg",
        body: MP3,
    },
];

/// The first sample of `media_type`, if any.
pub fn by_media_type(media_type: &str) -> Option<&'static Sample> {
    SAMPLES.iter().find(|s| s.media_type == media_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_every_object_kind() {
        let kinds: Vec<ItemType> = SAMPLES.iter().map(Sample::object_type).collect();
        for kind in [
            ItemType::Note,
            ItemType::Article,
            ItemType::Document,
            ItemType::Image,
            ItemType::Video,
            ItemType::Audio,
        ] {
            assert!(kinds.contains(&kind), "{kind} missing");
        }
    }

    #[test]
    fn summary_is_first_sentence() {
        let sample = by_media_type("text/markdown").unwrap();
        assert_eq!(sample.summary().as_deref(), Some("# Release notes"));
        assert!(by_media_type("image/png").unwrap().summary().is_none());
    }
}
