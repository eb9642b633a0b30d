use crate::error::{MatchError, Result};
use crate::matching::auto_match;
use crate::slots::normalize_assignments;
use reelslot_core::types::{ContentVideo, SlotAssignment, VideoSlot};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Default budget for one remote matching call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// A matcher living outside this process (typically a language model
/// behind an HTTP endpoint).
pub trait SmartMatcher {
    fn smart_match(
        &self,
        slots: &[VideoSlot],
        clips: &[ContentVideo],
    ) -> impl Future<Output = Result<Vec<SlotAssignment>>> + Send;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RemoteBody {
    Wrapped { assignments: Vec<SlotAssignment> },
    Bare(Vec<SlotAssignment>),
}

/// Parse a remote matcher body. Both a bare array of assignments and an
/// object with an `assignments` field are accepted.
pub fn parse_remote_response(body: &str) -> Result<Vec<SlotAssignment>> {
    let parsed: RemoteBody = serde_json::from_str(body)?;
    Ok(match parsed {
        RemoteBody::Wrapped { assignments } => assignments,
        RemoteBody::Bare(assignments) => assignments,
    })
}

/// Replays a response obtained elsewhere, or a failure.
#[derive(Debug, Clone)]
pub struct StaticMatcher {
    response: std::result::Result<Vec<SlotAssignment>, String>,
}

impl StaticMatcher {
    pub fn ok(assignments: Vec<SlotAssignment>) -> Self {
        Self {
            response: Ok(assignments),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
        }
    }

    /// Replay a raw response body; a body that does not parse replays as
    /// a remote failure.
    pub fn from_response(body: &str) -> Self {
        match parse_remote_response(body) {
            Ok(assignments) => Self::ok(assignments),
            Err(e) => Self::failing(e.to_string()),
        }
    }
}

impl SmartMatcher for StaticMatcher {
    async fn smart_match(
        &self,
        _slots: &[VideoSlot],
        _clips: &[ContentVideo],
    ) -> Result<Vec<SlotAssignment>> {
        self.response.clone().map_err(MatchError::Remote)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    Remote,
    LocalFallback,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MatchOutcome {
    pub assignments: Vec<SlotAssignment>,
    pub source: MatchSource,
}

/// Decide between a remote result and the local heuristic.
///
/// Remote results are normalized first. An error, an empty list, or a list
/// that assigns nothing once normalized all fall back to [`auto_match`].
pub fn resolve_assignments(
    remote: Result<Vec<SlotAssignment>>,
    slots: &[VideoSlot],
    clips: &[ContentVideo],
) -> MatchOutcome {
    let remote = remote.and_then(|raw| {
        if raw.is_empty() {
            return Err(MatchError::EmptyResponse);
        }
        let normalized = normalize_assignments(slots, &raw, clips);
        if normalized.iter().any(SlotAssignment::is_assigned) {
            Ok(normalized)
        } else {
            Err(MatchError::EmptyResponse)
        }
    });

    match remote {
        Ok(assignments) => {
            tracing::info!(slots = slots.len(), "using remote assignments");
            MatchOutcome {
                assignments,
                source: MatchSource::Remote,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "smart matching unavailable, falling back to local heuristic");
            MatchOutcome {
                assignments: auto_match(slots, clips),
                source: MatchSource::LocalFallback,
            }
        }
    }
}

/// Ask `matcher` for assignments within `timeout`. Never fails: any
/// problem with the remote side yields the local heuristic's result.
pub async fn match_with_fallback<S: SmartMatcher>(
    matcher: &S,
    slots: &[VideoSlot],
    clips: &[ContentVideo],
    timeout: Duration,
) -> MatchOutcome {
    let remote = match tokio::time::timeout(timeout, matcher.smart_match(slots, clips)).await {
        Ok(result) => result,
        Err(_) => Err(MatchError::Timeout(timeout)),
    };
    resolve_assignments(remote, slots, clips)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn slot(id: &str, order: u32, duration: f64, description: &str) -> VideoSlot {
        VideoSlot {
            id: id.to_string(),
            order,
            duration,
            description: description.to_string(),
            start_time: 0.0,
            end_time: 0.0,
            assigned_video: None,
        }
    }

    fn clip(id: &str, title: &str, duration: f64) -> ContentVideo {
        ContentVideo {
            id: id.to_string(),
            title: title.to_string(),
            thumbnail_url: String::new(),
            video_url: String::new(),
            duration,
            description: String::new(),
        }
    }

    fn fixture() -> (Vec<VideoSlot>, Vec<ContentVideo>) {
        (
            vec![slot("s1", 1, 3.0, "pool"), slot("s2", 2, 3.0, "lobby")],
            vec![clip("lobby", "Lobby entrance", 5.0), clip("pool", "Pool sunset", 5.0)],
        )
    }

    struct SlowMatcher;

    impl SmartMatcher for SlowMatcher {
        async fn smart_match(
            &self,
            _slots: &[VideoSlot],
            _clips: &[ContentVideo],
        ) -> Result<Vec<SlotAssignment>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn remote_assignments_are_normalized_and_used() {
        let (slots, clips) = fixture();
        let matcher = StaticMatcher::ok(vec![SlotAssignment {
            slot_id: "s2".into(),
            video_id: Some("pool".into()),
            confidence: Some(0.9),
        }]);

        let outcome = match_with_fallback(&matcher, &slots, &clips, DEFAULT_TIMEOUT).await;
        assert_eq!(outcome.source, MatchSource::Remote);
        assert_eq!(outcome.assignments.len(), 2);
        assert_eq!(outcome.assignments[0], SlotAssignment::unassigned("s1"));
        assert_eq!(outcome.assignments[1].video_id.as_deref(), Some("pool"));
    }

    #[tokio::test]
    async fn remote_error_falls_back() {
        let (slots, clips) = fixture();
        let outcome =
            match_with_fallback(&StaticMatcher::failing("503"), &slots, &clips, DEFAULT_TIMEOUT)
                .await;

        assert_eq!(outcome.source, MatchSource::LocalFallback);
        assert_eq!(outcome.assignments, auto_match(&slots, &clips));
        assert_eq!(outcome.assignments[0].video_id.as_deref(), Some("pool"));
        assert_eq!(outcome.assignments[1].video_id.as_deref(), Some("lobby"));
    }

    #[tokio::test]
    async fn empty_response_falls_back() {
        let (slots, clips) = fixture();
        let outcome =
            match_with_fallback(&StaticMatcher::ok(vec![]), &slots, &clips, DEFAULT_TIMEOUT).await;
        assert_eq!(outcome.source, MatchSource::LocalFallback);
    }

    #[tokio::test]
    async fn response_with_only_unknown_clips_falls_back() {
        let (slots, clips) = fixture();
        let matcher = StaticMatcher::ok(vec![SlotAssignment {
            slot_id: "s1".into(),
            video_id: Some("ghost".into()),
            confidence: Some(1.0),
        }]);
        let outcome = match_with_fallback(&matcher, &slots, &clips, DEFAULT_TIMEOUT).await;
        assert_eq!(outcome.source, MatchSource::LocalFallback);
        assert!(outcome.assignments.iter().all(|a| a.is_assigned()));
    }

    #[tokio::test]
    async fn slow_remote_times_out() {
        let (slots, clips) = fixture();
        let outcome =
            match_with_fallback(&SlowMatcher, &slots, &clips, Duration::from_millis(20)).await;
        assert_eq!(outcome.source, MatchSource::LocalFallback);
        assert_eq!(outcome.assignments.len(), 2);
    }

    #[tokio::test]
    async fn static_matcher_reports_remote_error() {
        let result = StaticMatcher::failing("boom").smart_match(&[], &[]).await;
        assert_matches!(result, Err(MatchError::Remote(msg)) if msg == "boom");
    }

    #[test]
    fn remote_body_in_both_shapes() {
        let bare = r#"[{"slot_id": "s1", "video_id": "pool", "confidence": 0.7}]"#;
        let wrapped = r#"{"assignments": [{"slot_id": "s1", "video_id": null, "confidence": null}]}"#;

        let parsed = parse_remote_response(bare).unwrap();
        assert_eq!(parsed[0].video_id.as_deref(), Some("pool"));
        let parsed = parse_remote_response(wrapped).unwrap();
        assert_eq!(parsed, vec![SlotAssignment::unassigned("s1")]);
        assert_matches!(parse_remote_response("not json"), Err(MatchError::Json(_)));
    }

    #[tokio::test]
    async fn garbled_body_falls_back() {
        let (slots, clips) = fixture();
        let matcher = StaticMatcher::from_response("<html>502</html>");
        let outcome = match_with_fallback(&matcher, &slots, &clips, DEFAULT_TIMEOUT).await;
        assert_eq!(outcome.source, MatchSource::LocalFallback);
    }

    #[test]
    fn outcome_serializes_source_in_snake_case() {
        let outcome = MatchOutcome {
            assignments: vec![],
            source: MatchSource::LocalFallback,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["source"], "local_fallback");
    }
}
