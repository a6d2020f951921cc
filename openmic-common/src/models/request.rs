//! Song request model
//!
//! A request is free text (no foreign key into the catalog) with three enum
//! fields. Unrecognized `source`/`performer` values coerce to their defaults
//! rather than erroring; only the required text fields can fail validation.
//! `status` starts at `pending` and is relabeled freely by admin action.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::normalize::clean_text;

/// Field length bounds, enforced after whitespace cleanup.
pub const FULL_NAME_MIN: usize = 2;
pub const FULL_NAME_MAX: usize = 80;
pub const ARTIST_MAX: usize = 120;
pub const TITLE_MAX: usize = 180;
pub const NOTES_MAX: usize = 500;

/// Queue position of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    OnStage,
    Done,
    NoShow,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 4] = [
        RequestStatus::Pending,
        RequestStatus::OnStage,
        RequestStatus::Done,
        RequestStatus::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::OnStage => "on_stage",
            RequestStatus::Done => "done",
            RequestStatus::NoShow => "no_show",
        }
    }

    /// Exact-match parse; no case folding, mirroring the enum columns.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RequestStatus::Pending),
            "on_stage" => Some(RequestStatus::OnStage),
            "done" => Some(RequestStatus::Done),
            "no_show" => Some(RequestStatus::NoShow),
            _ => None,
        }
    }
}

impl Default for RequestStatus {
    fn default() -> Self {
        RequestStatus::Pending
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the request entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestSource {
    Public,
    Quick,
}

impl RequestSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestSource::Public => "public",
            RequestSource::Quick => "quick",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "public" => Some(RequestSource::Public),
            "quick" => Some(RequestSource::Quick),
            _ => None,
        }
    }

    /// Lenient policy: anything unrecognized falls back to `public`.
    pub fn coerce(input: Option<&str>) -> Self {
        input.and_then(RequestSource::parse).unwrap_or_default()
    }
}

impl Default for RequestSource {
    fn default() -> Self {
        RequestSource::Public
    }
}

impl std::fmt::Display for RequestSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who performs the song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestPerformer {
    Guest,
    Host,
}

impl RequestPerformer {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestPerformer::Guest => "guest",
            RequestPerformer::Host => "host",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "guest" => Some(RequestPerformer::Guest),
            "host" => Some(RequestPerformer::Host),
            _ => None,
        }
    }

    /// Lenient policy: unrecognized values default to `host` for quick-added
    /// requests and `guest` otherwise.
    pub fn coerce(input: Option<&str>, source: RequestSource) -> Self {
        input.and_then(RequestPerformer::parse).unwrap_or(match source {
            RequestSource::Quick => RequestPerformer::Host,
            RequestSource::Public => RequestPerformer::Guest,
        })
    }
}

impl Default for RequestPerformer {
    fn default() -> Self {
        RequestPerformer::Guest
    }
}

impl std::fmt::Display for RequestPerformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored request, as returned by the API and carried in queue events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: String,
    pub full_name: String,
    pub artist: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub source: RequestSource,
    pub performer: RequestPerformer,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One failed field in a create payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Raw create payload, before cleanup and coercion.
///
/// `source`/`performer` arrive as free strings so unknown values can be
/// coerced instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRequestInput {
    pub full_name: Option<String>,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub source: Option<String>,
    pub performer: Option<String>,
}

/// A validated request ready for insertion.
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub full_name: String,
    pub artist: String,
    pub title: String,
    pub notes: Option<String>,
    pub source: RequestSource,
    pub performer: RequestPerformer,
}

impl NewRequestInput {
    /// Force the quick-add semantics regardless of caller input.
    pub fn quick(self) -> Self {
        NewRequestInput {
            source: Some("quick".to_string()),
            performer: Some("host".to_string()),
            ..self
        }
    }

    /// Clean, validate and coerce the payload.
    ///
    /// Errors are collected per field so the client sees every problem at
    /// once. With `strict_enums`, unrecognized `source`/`performer` values
    /// become field errors instead of coercing.
    pub fn validate(self, strict_enums: bool) -> Result<NewRequest, Vec<FieldError>> {
        let mut errors = Vec::new();

        let full_name = clean_text(self.full_name.as_deref().unwrap_or(""));
        if full_name.is_empty() {
            errors.push(FieldError::new("fullName", "fullName is required"));
        } else if full_name.chars().count() < FULL_NAME_MIN {
            errors.push(FieldError::new(
                "fullName",
                format!("fullName must be at least {} characters", FULL_NAME_MIN),
            ));
        } else if full_name.chars().count() > FULL_NAME_MAX {
            errors.push(FieldError::new(
                "fullName",
                format!("fullName must be at most {} characters", FULL_NAME_MAX),
            ));
        }

        let artist = clean_text(self.artist.as_deref().unwrap_or(""));
        if artist.is_empty() {
            errors.push(FieldError::new("artist", "artist is required"));
        } else if artist.chars().count() > ARTIST_MAX {
            errors.push(FieldError::new(
                "artist",
                format!("artist must be at most {} characters", ARTIST_MAX),
            ));
        }

        let title = clean_text(self.title.as_deref().unwrap_or(""));
        if title.is_empty() {
            errors.push(FieldError::new("title", "title is required"));
        } else if title.chars().count() > TITLE_MAX {
            errors.push(FieldError::new(
                "title",
                format!("title must be at most {} characters", TITLE_MAX),
            ));
        }

        let notes = self
            .notes
            .as_deref()
            .map(clean_text)
            .filter(|n| !n.is_empty());
        if let Some(n) = &notes {
            if n.chars().count() > NOTES_MAX {
                errors.push(FieldError::new(
                    "notes",
                    format!("notes must be at most {} characters", NOTES_MAX),
                ));
            }
        }

        let source_raw = self.source.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let source = if strict_enums {
            match source_raw {
                None => RequestSource::default(),
                Some(raw) => RequestSource::parse(raw).unwrap_or_else(|| {
                    errors.push(FieldError::new("source", format!("unknown source '{}'", raw)));
                    RequestSource::default()
                }),
            }
        } else {
            RequestSource::coerce(source_raw)
        };

        let performer_raw = self
            .performer
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let performer = if strict_enums {
            match performer_raw {
                None => RequestPerformer::coerce(None, source),
                Some(raw) => RequestPerformer::parse(raw).unwrap_or_else(|| {
                    errors.push(FieldError::new(
                        "performer",
                        format!("unknown performer '{}'", raw),
                    ));
                    RequestPerformer::coerce(None, source)
                }),
            }
        } else {
            RequestPerformer::coerce(performer_raw, source)
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewRequest {
            full_name,
            artist,
            title,
            notes,
            source,
            performer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(full_name: &str, artist: &str, title: &str) -> NewRequestInput {
        NewRequestInput {
            full_name: Some(full_name.to_string()),
            artist: Some(artist.to_string()),
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_a_minimal_payload() {
        let req = input("Ana López", "Soda Stereo", "De Música Ligera")
            .validate(false)
            .unwrap();
        assert_eq!(req.full_name, "Ana López");
        assert_eq!(req.source, RequestSource::Public);
        assert_eq!(req.performer, RequestPerformer::Guest);
        assert_eq!(req.notes, None);
    }

    #[test]
    fn missing_title_names_the_field() {
        let errs = input("Ana López", "Soda Stereo", "   ")
            .validate(false)
            .unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].field, "title");
    }

    #[test]
    fn collects_every_failed_field() {
        let errs = NewRequestInput::default().validate(false).unwrap_err();
        let fields: Vec<&str> = errs.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["fullName", "artist", "title"]);
    }

    #[test]
    fn enforces_length_bounds() {
        let errs = input("A", "Soda Stereo", &"x".repeat(TITLE_MAX + 1))
            .validate(false)
            .unwrap_err();
        let fields: Vec<&str> = errs.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["fullName", "title"]);
    }

    #[test]
    fn unknown_source_coerces_to_public() {
        let mut payload = input("Ana López", "Soda Stereo", "Persiana Americana");
        payload.source = Some("bogus".to_string());
        let req = payload.validate(false).unwrap();
        assert_eq!(req.source, RequestSource::Public);
        assert_eq!(req.performer, RequestPerformer::Guest);
    }

    #[test]
    fn unknown_performer_follows_the_source() {
        let mut payload = input("Ana López", "Soda Stereo", "Persiana Americana");
        payload.source = Some("quick".to_string());
        payload.performer = Some("whoever".to_string());
        let req = payload.validate(false).unwrap();
        assert_eq!(req.source, RequestSource::Quick);
        assert_eq!(req.performer, RequestPerformer::Host);
    }

    #[test]
    fn quick_overrides_caller_input() {
        let mut payload = input("Ana López", "Soda Stereo", "Persiana Americana");
        payload.source = Some("public".to_string());
        payload.performer = Some("guest".to_string());
        let req = payload.quick().validate(false).unwrap();
        assert_eq!(req.source, RequestSource::Quick);
        assert_eq!(req.performer, RequestPerformer::Host);
    }

    #[test]
    fn strict_mode_rejects_unknown_enums() {
        let mut payload = input("Ana López", "Soda Stereo", "Persiana Americana");
        payload.source = Some("bogus".to_string());
        let errs = payload.validate(true).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].field, "source");
    }

    #[test]
    fn strict_mode_still_defaults_missing_enums() {
        let req = input("Ana López", "Soda Stereo", "Persiana Americana")
            .validate(true)
            .unwrap();
        assert_eq!(req.source, RequestSource::Public);
        assert_eq!(req.performer, RequestPerformer::Guest);
    }

    #[test]
    fn notes_are_cleaned_and_optional() {
        let mut payload = input("Ana López", "Soda Stereo", "Persiana Americana");
        payload.notes = Some("  \u{00A0} ".to_string());
        let req = payload.validate(false).unwrap();
        assert_eq!(req.notes, None);

        let mut payload = input("Ana López", "Soda Stereo", "Persiana Americana");
        payload.notes = Some("  in  Spanish\u{00A0}please ".to_string());
        let req = payload.validate(false).unwrap();
        assert_eq!(req.notes.as_deref(), Some("in Spanish please"));
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in RequestStatus::ALL {
            assert_eq!(RequestStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(RequestStatus::parse("onstage"), None);
        assert_eq!(RequestStatus::default(), RequestStatus::Pending);
    }

    #[test]
    fn wire_format_is_camel_case() {
        let req = Request {
            id: "0192aa00-0000-7000-8000-000000000001".to_string(),
            full_name: "Ana López".to_string(),
            artist: "Soda Stereo".to_string(),
            title: "De Música Ligera".to_string(),
            notes: None,
            source: RequestSource::Public,
            performer: RequestPerformer::Guest,
            status: RequestStatus::OnStage,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["fullName"], "Ana López");
        assert_eq!(json["status"], "on_stage");
        assert!(json.get("notes").is_none());
        assert!(json.get("createdAt").is_some());
    }
}
