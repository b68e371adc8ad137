// Rust guideline compliant 2026-10-12

//! Code codec -- turns a ticket id into a scannable payload and a captured
//! payload back into a ticket id.
//!
//! Pure and stateless. The payload content is the raw id, byte for byte; the
//! rendering layer draws it as a QR symbol. Whether a well-shaped id actually
//! exists is the redemption coordinator's business, not the codec's.
//!
//! Entry points: [`encode`], [`decode`].

use domain::TicketId;
use std::fmt;

/// Captured content that cannot be a ticket id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Content does not have the shape of an issued id.
    #[error("malformed payload ({len} bytes)")]
    MalformedPayload {
        /// Length of the offending content after trimming.
        len: usize,
    },
}

/// Visual symbology the payload is meant to be drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbology {
    /// QR code, byte mode.
    Qr,
}

/// A scannable payload ready for the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    symbology: Symbology,
    content: String,
}

impl Payload {
    /// Symbology to render with.
    #[must_use]
    pub fn symbology(&self) -> Symbology {
        self.symbology
    }

    /// Exact content to embed in the symbol.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

/// Encode `id` as a QR payload whose content is identical to the id.
#[must_use]
pub fn encode(id: &TicketId) -> Payload {
    Payload { symbology: Symbology::Qr, content: id.as_str().to_owned() }
}

/// Decode captured content into a ticket id.
///
/// Surrounding ASCII whitespace is dropped (keyboard-wedge scanners append a
/// line terminator); everything else must be a canonical id.
///
/// # Errors
///
/// Returns [`CodecError::MalformedPayload`] when the content is not a
/// well-formed ticket id.
pub fn decode(content: &str) -> Result<TicketId, CodecError> {
    let trimmed = content.trim_matches(|c: char| c.is_ascii_whitespace());
    let id = TicketId::new(trimmed);
    if id.is_well_formed() {
        Ok(id)
    } else {
        Err(CodecError::MalformedPayload { len: trimmed.len() })
    }
}
