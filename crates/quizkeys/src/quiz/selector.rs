// Candidate Selector
//
// Maps a label predicate to the single best element among the scanned
// candidates. Labels are ambiguous (a paragraph can mention "next"), so
// survivors must look like buttons and are ranked by how button-like they are.

use crate::quiz::scanner::Candidate;

/// Maximum penalty applied for long labels
const MAX_LENGTH_PENALTY: i32 = 40;

/// Ranking score for one candidate. Higher is more button-like.
pub fn score(candidate: &Candidate) -> i32 {
    let mut score = 0;
    if candidate.tag == "button" {
        score += 100;
    }
    if candidate.role == "button" {
        score += 60;
    }
    if !candidate.aria_label.is_empty() {
        score += 20;
    }
    if candidate.has_click_handler {
        score += 10;
    }
    // UTF-16 code units, the way browsers measure string length
    let label_len = i32::try_from(candidate.label.encode_utf16().count()).unwrap_or(i32::MAX);
    score - MAX_LENGTH_PENALTY.min(label_len / 10)
}

/// Buttons, role=button, or anything carrying an accessible label.
pub fn is_button_like(candidate: &Candidate) -> bool {
    candidate.tag == "button" || candidate.role == "button" || !candidate.aria_label.is_empty()
}

/// Picks the best button-like candidate whose label satisfies `predicate`.
///
/// Ties keep scan order. `None` means the action is not available in this
/// frame.
pub fn select<'a, F>(candidates: &'a [Candidate], predicate: F) -> Option<&'a Candidate>
where
    F: Fn(&str) -> bool,
{
    let mut matches: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| predicate(&c.label) && is_button_like(c))
        .collect();
    // Stable sort, so equal scores stay in scan order
    matches.sort_by_key(|c| std::cmp::Reverse(score(c)));
    matches.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeId;
    use crate::quiz::classifier::is_next_label;
    use url::Url;

    fn candidate(node: usize, label: &str, tag: &str, role: &str, aria: &str) -> Candidate {
        Candidate {
            node: NodeId(node),
            label: label.to_string(),
            role: role.to_string(),
            tag: tag.to_string(),
            aria_label: aria.to_string(),
            has_click_handler: false,
            source_url: Url::parse("https://quiz.example/").unwrap(),
        }
    }

    #[test]
    fn test_score_components() {
        let mut c = candidate(0, "Next", "button", "button", "Next");
        c.has_click_handler = true;
        assert_eq!(score(&c), 190);

        let long = "x".repeat(1000);
        let c = candidate(1, &long, "div", "", "");
        assert_eq!(score(&c), -40);

        let c = candidate(2, &"y".repeat(25), "button", "", "");
        assert_eq!(score(&c), 98);
    }

    #[test]
    fn test_length_penalty_counts_utf16_units() {
        // Each emoji is one char but two UTF-16 units
        let c = candidate(0, &"\u{1F600}".repeat(5), "button", "", "");
        assert_eq!(score(&c), 99);

        let c = candidate(1, &"é".repeat(10), "button", "", "");
        assert_eq!(score(&c), 99);
    }

    #[test]
    fn test_plain_text_is_never_selected() {
        let candidates = vec![candidate(0, "Next", "span", "", "")];
        assert!(select(&candidates, is_next_label).is_none());
    }

    #[test]
    fn test_prefers_real_button_over_role_button() {
        let candidates = vec![
            candidate(0, "Next", "div", "button", ""),
            candidate(1, "Next", "button", "", ""),
        ];
        let chosen = select(&candidates, is_next_label).unwrap();
        assert_eq!(chosen.node, NodeId(1));
    }

    #[test]
    fn test_long_labels_lose_to_short_ones() {
        let paragraph = format!("Read this before moving to the next section. {}", "z".repeat(80));
        let candidates = vec![
            candidate(0, &paragraph, "button", "", ""),
            candidate(1, "Next", "button", "", ""),
        ];
        assert_eq!(select(&candidates, is_next_label).unwrap().node, NodeId(1));
    }

    #[test]
    fn test_ties_resolve_to_scan_order() {
        let candidates = vec![
            candidate(7, "Next", "button", "", ""),
            candidate(3, "Next", "button", "", ""),
        ];
        for _ in 0..3 {
            assert_eq!(select(&candidates, is_next_label).unwrap().node, NodeId(7));
        }
    }

    #[test]
    fn test_aria_label_makes_any_tag_button_like() {
        let candidates = vec![candidate(0, "Next", "a", "", "Next")];
        assert_eq!(select(&candidates, is_next_label).unwrap().node, NodeId(0));
    }
}
