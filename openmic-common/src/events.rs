//! Queue mutation events
//!
//! Every request-queue mutation produces exactly one `QueueEvent`, broadcast
//! by the server's notifier to connected admin and watcher sockets. The serde
//! shape is the wire envelope: `{"event": <name>, "data": <payload>}` (unit
//! variants omit `data`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Request, RequestStatus};

/// A request-queue mutation, ready for fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum QueueEvent {
    /// A request was created; carries the full record.
    #[serde(rename = "request:new")]
    RequestNew(Request),

    /// A request changed status.
    #[serde(rename = "request:update")]
    #[serde(rename_all = "camelCase")]
    RequestUpdate {
        id: String,
        status: RequestStatus,
        updated_at: DateTime<Utc>,
    },

    /// A request was removed.
    #[serde(rename = "request:delete")]
    RequestDelete { id: String },

    /// The whole queue was cleared.
    #[serde(rename = "requests:clear")]
    RequestsClear,
}

impl QueueEvent {
    /// Wire name of the event, as seen by socket clients.
    pub fn name(&self) -> &'static str {
        match self {
            QueueEvent::RequestNew(_) => "request:new",
            QueueEvent::RequestUpdate { .. } => "request:update",
            QueueEvent::RequestDelete { .. } => "request:delete",
            QueueEvent::RequestsClear => "requests:clear",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RequestPerformer, RequestSource};

    fn sample_request() -> Request {
        Request {
            id: "8f14e45f-ceea-467f-a34e-cbb7cf2b0443".to_string(),
            full_name: "Ana López".to_string(),
            artist: "Soda Stereo".to_string(),
            title: "De Música Ligera".to_string(),
            notes: None,
            source: RequestSource::Public,
            performer: RequestPerformer::Guest,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn envelope_carries_event_name_and_payload() {
        let event = QueueEvent::RequestNew(sample_request());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "request:new");
        assert_eq!(json["data"]["fullName"], "Ana López");
    }

    #[test]
    fn update_payload_is_id_status_timestamp() {
        let event = QueueEvent::RequestUpdate {
            id: "abc".to_string(),
            status: RequestStatus::OnStage,
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "request:update");
        assert_eq!(json["data"]["status"], "on_stage");
        assert!(json["data"].get("updatedAt").is_some());
        assert_eq!(json["data"].as_object().unwrap().len(), 3);
    }

    #[test]
    fn clear_has_no_payload() {
        let json = serde_json::to_value(&QueueEvent::RequestsClear).unwrap();
        assert_eq!(json["event"], "requests:clear");
        assert!(json.get("data").is_none());
    }
}
