//! Typed silence detector events.

use serde::{Deserialize, Serialize};

/// A boundary of a silent region, in seconds from the start of the media.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "at", rename_all = "snake_case")]
pub enum SilenceEvent {
    /// A silent region begins.
    Start(f64),
    /// A silent region ends.
    End(f64),
}

impl SilenceEvent {
    /// Timestamp of the boundary in seconds.
    #[must_use]
    pub fn timestamp(&self) -> f64 {
        match *self {
            Self::Start(t) | Self::End(t) => t,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp() {
        assert_eq!(SilenceEvent::Start(2.5).timestamp(), 2.5);
        assert_eq!(SilenceEvent::End(4.0).timestamp(), 4.0);
    }

    #[test]
    fn test_serialization_shape() {
        let json = serde_json::to_string(&SilenceEvent::End(5.0)).expect("serialize");
        assert_eq!(json, r#"{"kind":"end","at":5.0}"#);
    }
}
