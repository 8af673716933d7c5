/// Messages shown to a viewer, ordered from mildest to harshest
///
/// The index is the whole-number part of the deviation between the viewer
/// and the judge.
pub const JUDGMENT_MESSAGES: [&str; 5] = [
    "I suppose you don't have such bad taste after all.",
    "I regret every decision that I've ever made that has brought me to listen to your opinion.",
    "Words fail me, as your taste in movies has clearly failed you.",
    "That movie is great. For a clown to watch. Idiot.",
    "Words cannot express the awfulness of your taste.",
];

/// Absolute difference between two scores, absent when either side is absent
pub fn deviation(x: Option<f64>, y: Option<f64>) -> Option<f64> {
    match (x, y) {
        (Some(x), Some(y)) => Some((x - y).abs()),
        _ => None,
    }
}

/// Maps a deviation to a position in a list of `len` severity levels
///
/// Large deviations land on the last level; negative or NaN deviations on
/// the first. `None` only when the list is empty.
pub fn severity_index(deviation: f64, len: usize) -> Option<usize> {
    let last = len.checked_sub(1)?;
    if deviation.is_nan() || deviation <= 0.0 {
        return Some(0);
    }

    let bucket = deviation.floor();
    if bucket >= last as f64 {
        Some(last)
    } else {
        Some(bucket as usize)
    }
}

/// Picks the message for a deviation from `messages`
pub fn select_message<'a>(deviation: f64, messages: &[&'a str]) -> Option<&'a str> {
    severity_index(deviation, messages.len()).map(|index| messages[index])
}

/// Picks the message for a deviation from [`JUDGMENT_MESSAGES`]
pub fn judgment_for(deviation: f64) -> &'static str {
    select_message(deviation, &JUDGMENT_MESSAGES).unwrap_or(JUDGMENT_MESSAGES[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deviation_is_absolute() {
        assert_eq!(deviation(Some(2.0), Some(4.5)), Some(2.5));
        assert_eq!(deviation(Some(4.5), Some(2.0)), Some(2.5));
    }

    #[test]
    fn test_deviation_absent_when_either_side_absent() {
        assert_eq!(deviation(None, Some(3.0)), None);
        assert_eq!(deviation(Some(3.0), None), None);
        assert_eq!(deviation(None, None), None);
    }

    #[test]
    fn test_zero_deviation_is_a_value() {
        assert_eq!(deviation(Some(3.0), Some(3.0)), Some(0.0));
        assert_eq!(judgment_for(0.0), JUDGMENT_MESSAGES[0]);
    }

    #[test]
    fn test_severity_index_floors() {
        assert_eq!(severity_index(0.9, 5), Some(0));
        assert_eq!(severity_index(1.0, 5), Some(1));
        assert_eq!(severity_index(3.99, 5), Some(3));
    }

    #[test]
    fn test_severity_index_clamps_at_list_length() {
        assert_eq!(severity_index(5.0, 5), Some(4));
        assert_eq!(severity_index(6.0, 5), Some(4));
        assert_eq!(severity_index(f64::INFINITY, 5), Some(4));
    }

    #[test]
    fn test_judgment_clamps_large_deviation() {
        let len = JUDGMENT_MESSAGES.len() as f64;
        assert_eq!(judgment_for(len), JUDGMENT_MESSAGES[4]);
        assert_eq!(judgment_for(len + 1.0), JUDGMENT_MESSAGES[4]);
    }

    #[test]
    fn test_severity_index_handles_degenerate_input() {
        assert_eq!(severity_index(-1.0, 5), Some(0));
        assert_eq!(severity_index(f64::NAN, 5), Some(0));
        assert_eq!(severity_index(2.0, 0), None);
    }

    #[test]
    fn test_select_message_from_custom_list() {
        let messages = ["fine", "bad"];
        assert_eq!(select_message(0.5, &messages), Some("fine"));
        assert_eq!(select_message(2.0, &messages), Some("bad"));
        assert_eq!(select_message(3.0, &messages), Some("bad"));
        assert_eq!(select_message(1.0, &[]), None);
    }

    #[test]
    fn test_judgment_agrees_with_select_message() {
        for deviation in [-1.0, 0.0, 0.5, 1.0, 2.7, 3.99, 4.0, 5.0, 9.0, f64::NAN] {
            assert_eq!(
                Some(judgment_for(deviation)),
                select_message(deviation, &JUDGMENT_MESSAGES)
            );
        }
    }
}
