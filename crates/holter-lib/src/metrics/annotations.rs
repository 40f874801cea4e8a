use crate::events::{WaveEvent, WaveType};

/// Number of `wave_type` events carrying a tag that contains `tag`.
pub fn count_tagged(events: &[WaveEvent], wave_type: &WaveType, tag: &str) -> usize {
    events
        .iter()
        .filter(|event| &event.wave_type == wave_type && event.has_tag_containing(tag))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_log_counts_zero() {
        assert_eq!(count_tagged(&[], &WaveType::P, "premature"), 0);
    }

    #[test]
    fn matches_tag_substring() {
        let events = vec![WaveEvent::new(WaveType::P, 100, 180).with_tags(["premature-ectopic"])];
        assert_eq!(count_tagged(&events, &WaveType::P, "premature"), 1);
    }

    #[test]
    fn wave_type_must_match_exactly() {
        let events = vec![
            WaveEvent::new(WaveType::P, 0, 80).with_tags(["premature"]),
            WaveEvent::new(WaveType::Qrs, 100, 180).with_tags(["premature"]),
            WaveEvent::new(WaveType::Qrs, 900, 980).with_tags(["noise", "premature"]),
            WaveEvent::new(WaveType::T, 300, 500).with_tags(["premature"]),
            WaveEvent::new(WaveType::Qrs, 1_700, 1_780),
        ];
        assert_eq!(count_tagged(&events, &WaveType::P, "premature"), 1);
        assert_eq!(count_tagged(&events, &WaveType::Qrs, "premature"), 2);
        assert_eq!(
            count_tagged(&events, &WaveType::Other("INV".into()), "premature"),
            0
        );
    }
}
