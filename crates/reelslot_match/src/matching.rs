use crate::keywords::{themes_in, tokenize};
use reelslot_core::types::{ContentVideo, SlotAssignment, VideoSlot};
use std::collections::HashSet;

/// Added once per slot word that matches a clip word.
pub const TOKEN_MATCH_WEIGHT: f64 = 0.2;
/// Added once per theme signalled by both the slot and the clip.
pub const THEME_BONUS: f64 = 0.4;
/// Slot words must be longer than this (in characters) to count.
pub const MIN_TOKEN_CHARS: usize = 3;

/// Tokens and themes of one side of a comparison, computed once.
#[derive(Debug, Clone)]
pub struct TextProfile {
    tokens: Vec<String>,
    themes: Vec<&'static str>,
}

impl TextProfile {
    pub fn new(text: &str) -> Self {
        let tokens = tokenize(text);
        let themes = themes_in(&tokens);
        Self { tokens, themes }
    }

    pub fn for_slot(slot: &VideoSlot) -> Self {
        Self::new(&slot.description)
    }

    pub fn for_clip(clip: &ContentVideo) -> Self {
        Self::new(&format!("{} {}", clip.title, clip.description))
    }

    pub fn themes(&self) -> &[&'static str] {
        &self.themes
    }
}

/// Raw, uncapped score of a clip against a slot.
pub fn raw_score(slot: &TextProfile, clip: &TextProfile) -> f64 {
    let token_hits = slot
        .tokens
        .iter()
        .filter(|word| word.chars().count() > MIN_TOKEN_CHARS)
        .filter(|word| {
            clip.tokens
                .iter()
                .any(|c| c.contains(word.as_str()) || word.contains(c.as_str()))
        })
        .count();

    let shared_themes = slot
        .themes
        .iter()
        .filter(|theme| clip.themes.contains(*theme))
        .count();

    token_hits as f64 * TOKEN_MATCH_WEIGHT + shared_themes as f64 * THEME_BONUS
}

/// Compatibility of `clip` with `slot`, in `[0, 1]`.
pub fn score(slot: &VideoSlot, clip: &ContentVideo) -> f64 {
    raw_score(&TextProfile::for_slot(slot), &TextProfile::for_clip(clip)).min(1.0)
}

/// Assign a clip to every slot, in slot order.
///
/// Candidates for a slot are the unused clips at least as long as the slot.
/// The highest score wins, earliest clip on ties. A slot with no candidate
/// is left unassigned. Each clip is used at most once.
pub fn auto_match(slots: &[VideoSlot], clips: &[ContentVideo]) -> Vec<SlotAssignment> {
    let profiles: Vec<TextProfile> = clips.iter().map(TextProfile::for_clip).collect();
    let mut used: HashSet<usize> = HashSet::new();
    let mut assignments = Vec::with_capacity(slots.len());

    for slot in slots {
        let slot_profile = TextProfile::for_slot(slot);
        let mut best: Option<(usize, f64)> = None;

        for (idx, clip) in clips.iter().enumerate() {
            // false for NaN on either side
            let long_enough = clip.duration >= slot.duration;
            if used.contains(&idx) || !long_enough {
                continue;
            }
            let s = raw_score(&slot_profile, &profiles[idx]).min(1.0);
            if best.map_or(true, |(_, b)| s > b) {
                best = Some((idx, s));
            }
        }

        match best {
            Some((idx, confidence)) => {
                used.insert(idx);
                // the same clip id listed twice is still one clip
                let clip_id = &clips[idx].id;
                used.extend(
                    clips
                        .iter()
                        .enumerate()
                        .filter(|(_, c)| &c.id == clip_id)
                        .map(|(i, _)| i),
                );
                tracing::debug!(slot = %slot.id, clip = %clip_id, confidence, "slot matched");
                assignments.push(SlotAssignment {
                    slot_id: slot.id.clone(),
                    video_id: Some(clip_id.clone()),
                    confidence: Some(confidence),
                });
            }
            None => {
                tracing::debug!(slot = %slot.id, duration = slot.duration, "no clip long enough");
                assignments.push(SlotAssignment::unassigned(slot.id.clone()));
            }
        }
    }

    let filled = assignments.iter().filter(|a| a.is_assigned()).count();
    tracing::info!(slots = slots.len(), clips = clips.len(), filled, "local auto-match complete");
    assignments
}

#[cfg(test)]
mod tests {
    use super::*;

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
            thumbnail_url: format!("https://cdn.example.com/{id}.jpg"),
            video_url: format!("https://cdn.example.com/{id}.mp4"),
            duration,
            description: String::new(),
        }
    }

    #[test]
    fn thematic_bonus_picks_pool_clip_in_any_order() {
        let slots = vec![slot("s1", 1, 5.0, "piscine vue mer")];
        let a = clip("A", "Pool sunset", 6.0);
        let b = clip("B", "Lobby entrance", 10.0);

        let forward = auto_match(&slots, &[a.clone(), b.clone()]);
        let reverse = auto_match(&slots, &[b, a]);
        assert_eq!(forward[0].video_id.as_deref(), Some("A"));
        assert_eq!(reverse[0].video_id.as_deref(), Some("A"));
        assert!((forward[0].confidence.unwrap() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn too_short_clip_leaves_slot_unassigned() {
        let slots = vec![slot("s1", 1, 20.0, "rooftop bar")];
        let result = auto_match(&slots, &[clip("c1", "Rooftop bar", 5.0)]);
        assert_eq!(result, vec![SlotAssignment::unassigned("s1")]);
    }

    #[test]
    fn clip_exactly_slot_length_qualifies() {
        let slots = vec![slot("s1", 1, 5.0, "spa")];
        let result = auto_match(&slots, &[clip("c1", "Anything", 5.0)]);
        assert_eq!(result[0].video_id.as_deref(), Some("c1"));
        assert_eq!(result[0].confidence, Some(0.0));
    }

    #[test]
    fn ties_go_to_earliest_clip() {
        let slots = vec![slot("s1", 1, 2.0, "something unrelated")];
        let result = auto_match(&slots, &[clip("first", "Lobby", 3.0), clip("second", "Garden", 3.0)]);
        assert_eq!(result[0].video_id.as_deref(), Some("first"));
    }

    #[test]
    fn clips_are_used_once() {
        let slots = vec![
            slot("s1", 1, 3.0, "pool"),
            slot("s2", 2, 3.0, "pool"),
            slot("s3", 3, 3.0, "pool"),
        ];
        let clips = vec![clip("p1", "Pool", 4.0), clip("p2", "Pool party", 4.0)];
        let result = auto_match(&slots, &clips);

        assert_eq!(result[0].video_id.as_deref(), Some("p1"));
        assert_eq!(result[1].video_id.as_deref(), Some("p2"));
        assert_eq!(result[2], SlotAssignment::unassigned("s3"));
    }

    #[test]
    fn duplicate_clip_ids_are_one_clip() {
        let slots = vec![slot("s1", 1, 3.0, "pool"), slot("s2", 2, 3.0, "pool")];
        let clips = vec![clip("p1", "Pool", 4.0), clip("p1", "Pool", 4.0)];
        let result = auto_match(&slots, &clips);
        assert_eq!(result[0].video_id.as_deref(), Some("p1"));
        assert!(!result[1].is_assigned());
    }

    #[test]
    fn greedy_does_not_backtrack() {
        // s1 grabs the only clip that would also have suited s2
        let slots = vec![slot("s1", 1, 3.0, "breakfast terrace"), slot("s2", 2, 3.0, "breakfast")];
        let clips = vec![clip("b", "Breakfast terrace", 4.0), clip("x", "Parking", 10.0)];
        let result = auto_match(&slots, &clips);
        assert_eq!(result[0].video_id.as_deref(), Some("b"));
        assert_eq!(result[1].video_id.as_deref(), Some("x"));
    }

    #[test]
    fn output_follows_slot_order_and_duration_constraint() {
        let slots = vec![
            slot("a", 1, 2.0, "chambre suite"),
            slot("b", 2, 8.0, "plage"),
            slot("c", 3, 4.0, "cocktail bar"),
        ];
        let clips = vec![
            clip("room", "Suite with balcony", 3.0),
            clip("beach", "Beach walk", 9.0),
            clip("bar", "Cocktail hour at the bar", 4.5),
            clip("short", "Beach", 1.0),
        ];
        let result = auto_match(&slots, &clips);
        let ids: Vec<&str> = result.iter().map(|a| a.slot_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        for (assignment, slot) in result.iter().zip(&slots) {
            let vid = assignment.video_id.as_deref().unwrap();
            let chosen = clips.iter().find(|c| c.id == vid).unwrap();
            assert!(chosen.duration >= slot.duration);
        }
        assert_eq!(result[1].video_id.as_deref(), Some("beach"));
        assert_eq!(result[2].video_id.as_deref(), Some("bar"));
    }

    #[test]
    fn score_is_capped_at_one() {
        let s = slot("s", 1, 1.0, "pool piscine swimming sunset view beach plage ocean");
        let c = clip("c", "pool piscine swimming sunset view beach plage ocean", 2.0);
        assert_eq!(score(&s, &c), 1.0);
    }

    #[test]
    fn token_matches_accumulate() {
        // "sunrise" and "yoga" are both themed and both words match
        let s = slot("s", 1, 1.0, "sunrise yoga");
        let c = clip("c", "Yoga at sunrise", 2.0);
        // 2 words * 0.2 + view + activity themes * 0.4 = 1.2, capped
        assert_eq!(score(&s, &c), 1.0);

        let s = slot("s", 1, 1.0, "golden hour staircase");
        let c = clip("c", "Staircase in golden light", 2.0);
        // golden, staircase match; "hour" is 4 chars and matches nothing
        assert!((score(&s, &c) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn elided_slot_description_earns_theme_bonus() {
        let s = slot("s", 1, 1.0, "vue sur l'océan");
        let c = clip("c", "Beach walk", 2.0);
        assert!((score(&s, &c) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn nan_durations_never_qualify() {
        let result = auto_match(&[slot("s", 1, 2.0, "pool")], &[clip("c", "Pool", f64::NAN)]);
        assert_eq!(result, vec![SlotAssignment::unassigned("s")]);

        let result = auto_match(&[slot("s", 1, f64::NAN, "pool")], &[clip("c", "Pool", 4.0)]);
        assert_eq!(result, vec![SlotAssignment::unassigned("s")]);
    }

    #[test]
    fn short_slot_words_do_not_count() {
        let s = slot("s", 1, 1.0, "the red car");
        let c = clip("c", "the red car", 2.0);
        assert_eq!(score(&s, &c), 0.0);
    }

    #[test]
    fn empty_inputs() {
        assert!(auto_match(&[], &[clip("c", "Pool", 3.0)]).is_empty());
        let result = auto_match(&[slot("s", 1, 1.0, "pool")], &[]);
        assert_eq!(result, vec![SlotAssignment::unassigned("s")]);
    }
}
