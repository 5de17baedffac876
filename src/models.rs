use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Inbound event from the voice platform.
/// Only the `request` member matters here, everything else is ignored.
#[derive(Debug, Deserialize)]
pub struct SkillEvent {
    pub request: SkillRequest,
}

/// The request half of the envelope, tagged by its `type` field
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum SkillRequest {
    LaunchRequest,
    IntentRequest { intent: Intent },
    SessionEndedRequest,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub struct Intent {
    pub name: String,
    #[serde(default)]
    pub slots: HashMap<String, Slot>,
}

#[derive(Debug, Deserialize)]
pub struct Slot {
    #[serde(default)]
    pub value: Option<String>,
}

impl Intent {
    /// Raw value of a slot, `None` when the slot is missing or was left unfilled
    pub fn slot_value(&self, name: &str) -> Option<&str> {
        self.slots
            .get(name)
            .and_then(|slot| slot.value.as_deref())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// Outbound response envelope
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SkillResponse {
    pub version: &'static str,
    pub response: ResponseBody,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
    pub should_end_session: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct OutputSpeech {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub ssml: String,
}

/// Simple text card shown in the companion app
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Card {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: String,
    pub content: String,
}

impl SkillResponse {
    pub fn speak(ssml: String) -> Self {
        Self {
            version: "1.0",
            response: ResponseBody {
                output_speech: Some(OutputSpeech { kind: "SSML", ssml }),
                card: None,
                should_end_session: true,
            },
        }
    }

    pub fn with_card(mut self, title: String, content: String) -> Self {
        self.response.card = Some(Card {
            kind: "Simple",
            title,
            content,
        });
        self
    }

    /// Envelope without speech, used to acknowledge session end
    pub fn empty() -> Self {
        Self {
            version: "1.0",
            response: ResponseBody {
                output_speech: None,
                card: None,
                should_end_session: true,
            },
        }
    }

    pub fn ssml(&self) -> Option<&str> {
        self.response
            .output_speech
            .as_ref()
            .map(|speech| speech.ssml.as_str())
    }
}

/// One parsed line entry from the status feed
#[derive(Debug, Clone, PartialEq)]
pub struct LineStatusEntry {
    pub line_id: String,
    pub status_text: String,
    pub detail_text: Option<String>,
    pub posted: Option<String>,
}

impl LineStatusEntry {
    pub fn kind(&self) -> StatusKind {
        StatusKind::from_status_text(&self.status_text)
    }
}

/// Classification of the feed's status text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusKind {
    GoodService,
    PlannedWork,
    ServiceChange,
    Delays,
    Suspended,
    Other(String),
}

impl StatusKind {
    pub fn from_status_text(text: &str) -> Self {
        match text.trim().to_ascii_uppercase().as_str() {
            "GOOD SERVICE" => Self::GoodService,
            "PLANNED WORK" => Self::PlannedWork,
            "SERVICE CHANGE" => Self::ServiceChange,
            "DELAYS" => Self::Delays,
            "SUSPENDED" => Self::Suspended,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_nominal(&self) -> bool {
        matches!(self, Self::GoodService)
    }

    /// Higher is worse
    pub fn severity(&self) -> u8 {
        match self {
            Self::GoodService => 0,
            Self::Other(_) => 1,
            Self::PlannedWork => 2,
            Self::ServiceChange => 3,
            Self::Delays => 4,
            Self::Suspended => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_request_ignores_extra_fields() {
        let event: SkillEvent = serde_json::from_value(serde_json::json!({
            "version": "1.0",
            "request": { "type": "LaunchRequest", "requestId": "r-1", "locale": "en-US" }
        }))
        .unwrap();

        assert!(matches!(event.request, SkillRequest::LaunchRequest));
    }

    #[test]
    fn test_unknown_request_type() {
        let event: SkillEvent = serde_json::from_value(serde_json::json!({
            "request": { "type": "CanFulfillIntentRequest" }
        }))
        .unwrap();

        assert!(matches!(event.request, SkillRequest::Unknown));
    }

    #[test]
    fn test_slot_value_blank_is_absent() {
        let event: SkillEvent = serde_json::from_value(serde_json::json!({
            "request": {
                "type": "IntentRequest",
                "intent": {
                    "name": "StatusOfLine",
                    "slots": {
                        "subwayLineOrGroup": { "name": "subwayLineOrGroup", "value": "  " },
                        "other": { "name": "other" }
                    }
                }
            }
        }))
        .unwrap();

        let SkillRequest::IntentRequest { intent } = event.request else {
            panic!("expected an intent request");
        };
        assert_eq!(intent.slot_value("subwayLineOrGroup"), None);
        assert_eq!(intent.slot_value("other"), None);
        assert_eq!(intent.slot_value("missing"), None);
    }

    #[test]
    fn test_response_serializes_platform_shape() {
        let response = SkillResponse::speak("<speak> hi </speak>".to_string())
            .with_card("Title".to_string(), "Body".to_string());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["version"], "1.0");
        assert_eq!(json["response"]["outputSpeech"]["type"], "SSML");
        assert_eq!(json["response"]["outputSpeech"]["ssml"], "<speak> hi </speak>");
        assert_eq!(json["response"]["card"]["type"], "Simple");
        assert_eq!(json["response"]["shouldEndSession"], true);
    }

    #[test]
    fn test_response_without_card_omits_field() {
        let json = serde_json::to_value(SkillResponse::speak(String::new())).unwrap();
        assert!(json["response"].get("card").is_none());

        let json = serde_json::to_value(SkillResponse::empty()).unwrap();
        assert!(json["response"].get("outputSpeech").is_none());
    }

    #[test]
    fn test_status_kind_classification() {
        assert_eq!(StatusKind::from_status_text(" good service "), StatusKind::GoodService);
        assert_eq!(StatusKind::from_status_text("DELAYS"), StatusKind::Delays);
        assert_eq!(
            StatusKind::from_status_text("Weekend Advisory"),
            StatusKind::Other("WEEKEND ADVISORY".to_string())
        );
        assert!(StatusKind::Suspended.severity() > StatusKind::Delays.severity());
        assert!(StatusKind::PlannedWork.severity() > StatusKind::Other(String::new()).severity());
    }
}
