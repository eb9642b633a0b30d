use reelslot_core::types::{AssignedVideo, ContentVideo, SlotAssignment, VideoSlot};

/// Sort slots by `order` and derive their start/end times from the
/// cumulative durations.
pub fn layout_slots(slots: &[VideoSlot]) -> Vec<VideoSlot> {
    let mut laid_out = slots.to_vec();
    laid_out.sort_by_key(|s| s.order);

    let mut cursor = 0.0;
    for slot in &mut laid_out {
        slot.start_time = cursor;
        cursor += slot.duration.max(0.0);
        slot.end_time = cursor;
    }
    laid_out
}

pub fn template_duration(slots: &[VideoSlot]) -> f64 {
    slots.iter().map(|s| s.duration.max(0.0)).sum()
}

fn find_clip<'a>(clips: &'a [ContentVideo], video_id: &str) -> Option<&'a ContentVideo> {
    clips.iter().find(|c| c.id == video_id)
}

/// Put `video_id` in `slot_id` by hand. Unknown clips are ignored; a slot
/// without a record gets one. The same clip may sit in several slots.
pub fn assign_manual(
    assignments: &[SlotAssignment],
    slot_id: &str,
    video_id: &str,
    clips: &[ContentVideo],
) -> Vec<SlotAssignment> {
    if find_clip(clips, video_id).is_none() {
        return assignments.to_vec();
    }

    let mut next = assignments.to_vec();
    let record = SlotAssignment {
        slot_id: slot_id.to_string(),
        video_id: Some(video_id.to_string()),
        confidence: Some(1.0),
    };
    match next.iter_mut().find(|a| a.slot_id == slot_id) {
        Some(existing) => *existing = record,
        None => next.push(record),
    }
    next
}

pub fn clear_assignment(assignments: &[SlotAssignment], slot_id: &str) -> Vec<SlotAssignment> {
    assignments
        .iter()
        .map(|a| {
            if a.slot_id == slot_id {
                SlotAssignment::unassigned(slot_id)
            } else {
                a.clone()
            }
        })
        .collect()
}

/// Exchange the clips of two slots. Either slot missing is a no-op.
pub fn swap_assignments(assignments: &[SlotAssignment], a: &str, b: &str) -> Vec<SlotAssignment> {
    let mut next = assignments.to_vec();
    let ia = next.iter().position(|x| x.slot_id == a);
    let ib = next.iter().position(|x| x.slot_id == b);
    if let (Some(ia), Some(ib)) = (ia, ib) {
        let (va, ca) = (next[ia].video_id.take(), next[ia].confidence.take());
        let (vb, cb) = (next[ib].video_id.take(), next[ib].confidence.take());
        next[ia].video_id = vb;
        next[ia].confidence = cb;
        next[ib].video_id = va;
        next[ib].confidence = ca;
    }
    next
}

/// Ids of slots that still need content, in slot order.
pub fn unassigned_slots<'a>(slots: &'a [VideoSlot], assignments: &[SlotAssignment]) -> Vec<&'a str> {
    slots
        .iter()
        .filter(|slot| {
            !assignments
                .iter()
                .any(|a| a.slot_id == slot.id && a.is_assigned())
        })
        .map(|slot| slot.id.as_str())
        .collect()
}

/// Fill each slot's `assigned_video` projection from the assignments.
pub fn project_assigned_videos(
    slots: &[VideoSlot],
    assignments: &[SlotAssignment],
    clips: &[ContentVideo],
) -> Vec<VideoSlot> {
    slots
        .iter()
        .map(|slot| {
            let assigned = assignments
                .iter()
                .find(|a| a.slot_id == slot.id)
                .and_then(|a| a.video_id.as_deref())
                .and_then(|vid| find_clip(clips, vid))
                .map(|clip| AssignedVideo {
                    title: clip.title.clone(),
                    thumbnail_url: clip.thumbnail_url.clone(),
                });
            VideoSlot {
                assigned_video: assigned,
                ..slot.clone()
            }
        })
        .collect()
}

/// Bring an externally produced assignment list into shape: exactly one
/// record per slot, in slot order. The first record for a slot wins,
/// records for unknown slots are dropped, unknown clips become unassigned
/// and confidences are clamped to `[0, 1]`.
pub fn normalize_assignments(
    slots: &[VideoSlot],
    assignments: &[SlotAssignment],
    clips: &[ContentVideo],
) -> Vec<SlotAssignment> {
    slots
        .iter()
        .map(|slot| {
            let record = assignments.iter().find(|a| a.slot_id == slot.id);
            let video_id = record
                .and_then(|a| a.video_id.as_deref())
                .filter(|vid| find_clip(clips, vid).is_some());
            match video_id {
                Some(vid) => SlotAssignment {
                    slot_id: slot.id.clone(),
                    video_id: Some(vid.to_string()),
                    confidence: record
                        .and_then(|a| a.confidence)
                        .filter(|c| c.is_finite())
                        .map(|c| c.clamp(0.0, 1.0)),
                },
                None => SlotAssignment::unassigned(slot.id.clone()),
            }
        })
        .collect()
}
