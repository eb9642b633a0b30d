use anyhow::{bail, Context, Result};
use reelslot_core::config::EditorConfig;
use reelslot_core::document::OverlayDocument;
use reelslot_core::geometry::PixelPoint;
use reelslot_core::interaction::EditorController;
use reelslot_core::layers::layer_count;
use reelslot_core::types::{ContentVideo, SlotAssignment, VideoSlot};
use reelslot_match::slots::{layout_slots, project_assigned_videos, unassigned_slots};
use reelslot_match::smart::{match_with_fallback, MatchOutcome, StaticMatcher, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

const USAGE: &str = "usage:
  reelslot layers <document.reelslot>
  reelslot match <request.json> [remote_response.json]
  reelslot hit <document.reelslot> <x> <y> <time>";

#[derive(Deserialize)]
struct MatchRequest {
    slots: Vec<VideoSlot>,
    clips: Vec<ContentVideo>,
    #[serde(default)]
    remote_assignments: Option<Vec<SlotAssignment>>,
}

#[derive(Serialize)]
struct MatchReport {
    #[serde(flatten)]
    outcome: MatchOutcome,
    slots: Vec<VideoSlot>,
    needs_content: Vec<String>,
}

#[derive(Serialize)]
struct LayersReport {
    layer_count: usize,
    layers: BTreeMap<Uuid, usize>,
}

fn load_config() -> Result<EditorConfig> {
    match std::env::var("REELSLOT_CONFIG") {
        Ok(path) => {
            let config = EditorConfig::load_from_file(&path)
                .with_context(|| format!("loading editor config from {path}"))?;
            tracing::info!(path = %path, "editor config loaded");
            Ok(config)
        }
        Err(_) => Ok(EditorConfig::default()),
    }
}

fn match_timeout() -> Result<Duration> {
    match std::env::var("REELSLOT_MATCH_TIMEOUT_MS") {
        Ok(ms) => {
            let ms: u64 = ms
                .parse()
                .with_context(|| format!("REELSLOT_MATCH_TIMEOUT_MS={ms} is not a number"))?;
            Ok(Duration::from_millis(ms))
        }
        Err(_) => Ok(DEFAULT_TIMEOUT),
    }
}

fn load_document(path: &str) -> Result<OverlayDocument> {
    OverlayDocument::load_from_file(path).with_context(|| format!("loading document {path}"))
}

fn parse_number(name: &str, value: &str) -> Result<f64> {
    value
        .parse()
        .with_context(|| format!("{name} must be a number, got {value:?}"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_layers(path: &str) -> Result<()> {
    let doc = load_document(path)?;
    let mut editor = EditorController::new(doc.surface, doc.total_duration, load_config()?);
    editor.load_overlays(doc.overlays);

    let layers = editor.layers();
    tracing::info!(overlays = layers.len(), layers = layer_count(&layers), "layers assigned");
    print_json(&LayersReport {
        layer_count: layer_count(&layers),
        layers: layers.into_iter().collect(),
    })
}

fn parse_request(data: &str) -> Result<MatchRequest> {
    Ok(serde_json::from_str(data)?)
}

/// A remote response file takes precedence over inline assignments.
fn build_matcher(remote_body: Option<&str>, inline: Option<Vec<SlotAssignment>>) -> StaticMatcher {
    match (remote_body, inline) {
        (Some(body), _) => StaticMatcher::from_response(body),
        (None, Some(assignments)) => StaticMatcher::ok(assignments),
        (None, None) => StaticMatcher::failing("no remote matcher configured"),
    }
}

async fn run_match(request: MatchRequest, remote_body: Option<&str>, timeout: Duration) -> MatchReport {
    let matcher = build_matcher(remote_body, request.remote_assignments);
    let slots = layout_slots(&request.slots);
    let outcome = match_with_fallback(&matcher, &slots, &request.clips, timeout).await;

    let needs_content = unassigned_slots(&slots, &outcome.assignments)
        .into_iter()
        .map(str::to_string)
        .collect();
    let slots = project_assigned_videos(&slots, &outcome.assignments, &request.clips);
    MatchReport {
        outcome,
        slots,
        needs_content,
    }
}

async fn cmd_match(request_path: &str, remote_path: Option<&str>) -> Result<()> {
    let data = std::fs::read_to_string(request_path)
        .with_context(|| format!("reading match request {request_path}"))?;
    let request =
        parse_request(&data).with_context(|| format!("parsing match request {request_path}"))?;

    let remote_body = match remote_path {
        Some(path) => Some(
            std::fs::read_to_string(Path::new(path))
                .with_context(|| format!("reading remote response {path}"))?,
        ),
        None => None,
    };

    let report = run_match(request, remote_body.as_deref(), match_timeout()?).await;
    print_json(&report)
}

fn cmd_hit(path: &str, x: &str, y: &str, time: &str) -> Result<()> {
    let doc = load_document(path)?;
    let point = PixelPoint::new(parse_number("x", x)?, parse_number("y", y)?);
    let time = parse_number("time", time)?;

    let mut editor = EditorController::new(doc.surface, doc.total_duration, load_config()?);
    editor.load_overlays(doc.overlays);
    print_json(&editor.hit_test(point, time))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["layers", doc] => cmd_layers(doc),
        ["match", request] => cmd_match(request, None).await,
        ["match", request, remote] => cmd_match(request, Some(*remote)).await,
        ["hit", doc, x, y, time] => cmd_hit(doc, x, y, time),
        _ => bail!("{USAGE}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelslot_match::smart::MatchSource;

    const REQUEST: &str = r#"{
        "slots": [
            {"id": "outro", "order": 2, "duration": 4.0, "description": "rooftop bar"},
            {"id": "intro", "order": 1, "duration": 3.0, "description": "piscine vue mer"}
        ],
        "clips": [
            {"id": "pool", "title": "Pool sunset", "thumbnail_url": "pool.jpg", "duration": 6.0},
            {"id": "bar", "title": "Rooftop bar", "thumbnail_url": "bar.jpg", "duration": 2.0}
        ]
    }"#;

    fn with_inline(assignments: &str) -> String {
        let mut value: serde_json::Value = serde_json::from_str(REQUEST).unwrap();
        value["remote_assignments"] = serde_json::from_str(assignments).unwrap();
        value.to_string()
    }

    #[test]
    fn request_without_remote_assignments() {
        let request = parse_request(REQUEST).unwrap();
        assert_eq!(request.slots.len(), 2);
        assert_eq!(request.clips.len(), 2);
        assert!(request.remote_assignments.is_none());
    }

    #[test]
    fn request_with_remote_assignments() {
        let data = with_inline(r#"[{"slot_id": "intro", "video_id": "bar", "confidence": 0.5}]"#);
        let request = parse_request(&data).unwrap();
        let inline = request.remote_assignments.unwrap();
        assert_eq!(inline[0].video_id.as_deref(), Some("bar"));
    }

    #[test]
    fn malformed_request_is_an_error() {
        assert!(parse_request(r#"{"slots": []}"#).is_err());
    }

    #[tokio::test]
    async fn no_remote_uses_local_heuristic() {
        let report = run_match(parse_request(REQUEST).unwrap(), None, DEFAULT_TIMEOUT).await;

        assert_eq!(report.outcome.source, MatchSource::LocalFallback);
        let ids: Vec<&str> = report.slots.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["intro", "outro"]);
        assert_eq!((report.slots[1].start_time, report.slots[1].end_time), (3.0, 7.0));
        assert_eq!(report.slots[0].assigned_video.as_ref().unwrap().title, "Pool sunset");
        // the bar clip is shorter than the outro slot
        assert_eq!(report.needs_content, vec!["outro".to_string()]);
    }

    #[tokio::test]
    async fn inline_assignments_are_used_as_remote() {
        let data = with_inline(r#"[{"slot_id": "outro", "video_id": "bar", "confidence": 0.9}]"#);
        let report = run_match(parse_request(&data).unwrap(), None, DEFAULT_TIMEOUT).await;

        assert_eq!(report.outcome.source, MatchSource::Remote);
        assert_eq!(report.outcome.assignments[1].video_id.as_deref(), Some("bar"));
        assert_eq!(report.needs_content, vec!["intro".to_string()]);
    }

    #[tokio::test]
    async fn remote_response_file_wins_over_inline() {
        let data = with_inline(r#"[{"slot_id": "outro", "video_id": "bar", "confidence": 0.9}]"#);
        let body = r#"{"assignments": [{"slot_id": "intro", "video_id": "pool", "confidence": 0.7}]}"#;
        let report = run_match(parse_request(&data).unwrap(), Some(body), DEFAULT_TIMEOUT).await;

        assert_eq!(report.outcome.source, MatchSource::Remote);
        assert_eq!(report.outcome.assignments[0].video_id.as_deref(), Some("pool"));
        assert!(!report.outcome.assignments[1].is_assigned());
    }

    #[tokio::test]
    async fn garbled_remote_file_falls_back_even_with_inline() {
        let data = with_inline(r#"[{"slot_id": "outro", "video_id": "bar", "confidence": 0.9}]"#);
        let report = run_match(parse_request(&data).unwrap(), Some("oops"), DEFAULT_TIMEOUT).await;
        assert_eq!(report.outcome.source, MatchSource::LocalFallback);
    }

    #[test]
    fn report_flattens_outcome() {
        let report = MatchReport {
            outcome: MatchOutcome {
                assignments: vec![],
                source: MatchSource::Remote,
            },
            slots: vec![],
            needs_content: vec![],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["source"], "remote");
        assert!(json["assignments"].is_array());
    }
}
