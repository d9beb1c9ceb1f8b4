//! Semantic checks that run after decoding and before any lobby state is
//! touched.
//!
//! Decoding already guarantees the *shape* of a payload (an integer really
//! is an integer). Validation covers what serde can't express: a display
//! name that is only whitespace, or one long enough to break every
//! scoreboard.

use crate::{ClientEvent, MAX_DISPLAY_NAME_LEN, ProtocolError};

impl ClientEvent {
    /// Checks and normalizes the event.
    ///
    /// Display names are trimmed; the trimmed name must be non-empty and at
    /// most [`MAX_DISPLAY_NAME_LEN`] characters. Other events pass through
    /// unchanged.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] describing the first
    /// problem found.
    pub fn validated(self) -> Result<Self, ProtocolError> {
        match self {
            Self::JoinGame(name) => {
                display_name(&name).map(|n| Self::JoinGame(n.to_owned()))
            }
            other => Ok(other),
        }
    }
}

/// Trims `raw` and checks it is usable as a display name.
pub fn display_name(raw: &str) -> Result<&str, ProtocolError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ProtocolError::InvalidMessage(
            "display name must not be empty".into(),
        ));
    }
    if name.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(ProtocolError::InvalidMessage(format!(
            "display name must be at most {MAX_DISPLAY_NAME_LEN} characters"
        )));
    }
    Ok(name)
}
