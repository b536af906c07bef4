use serde::Serialize;

/// Everything the match tells the page. Serialized with a `type` tag,
/// e.g. `{"type":"Message","text":"SIX!","duration_ms":1000}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum UiEvent {
    Score { text: String, runs: u32, wickets: u32 },
    Overs { text: String, balls: u32 },
    Target { runs: u32 },
    /// Transient banner.
    Message { text: String, duration_ms: u32 },
    StartScreen { visible: bool },
    EndScreen {
        visible: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        final_score: Option<String>,
    },
    Error { message: String },
}

impl UiEvent {
    pub fn message(text: impl Into<String>, duration_ms: u32) -> Self {
        UiEvent::Message {
            text: text.into(),
            duration_ms,
        }
    }

    pub fn to_json(&self) -> Option<String> {
        match serde_json::to_string(self) {
            Ok(json) => Some(json),
            Err(err) => {
                log::error!("failed to serialize {:?}: {}", self, err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_json_is_tagged() {
        let json = UiEvent::message("SIX!", 1000).to_json().unwrap();
        assert_eq!(json, r#"{"type":"Message","text":"SIX!","duration_ms":1000}"#);
    }

    #[test]
    fn hidden_end_screen_omits_text() {
        let json = UiEvent::EndScreen {
            visible: false,
            result: None,
            final_score: None,
        }
        .to_json()
        .unwrap();
        assert_eq!(json, r#"{"type":"EndScreen","visible":false}"#);
    }
}
