// Element Scanner
//
// Walks a frame's document for interactive elements (buttons, role=button,
// anything with a tabindex), keeps the visible, labeled ones, and descends
// into every shadow root it meets. Results are never cached: quiz widgets
// re-render constantly and a stale candidate is worse than a rescan.

use crate::dom::{DomSurface, NodeId};
use std::collections::HashSet;
use url::Url;

/// One scanned interactive element.
///
/// Valid only for the scan that produced it; the element may be gone by the
/// next keystroke.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub node: NodeId,
    /// Accessible name: trimmed `aria-label`, else trimmed text
    pub label: String,
    /// Lower-cased `role` attribute, or ""
    pub role: String,
    /// Lower-cased tag name
    pub tag: String,
    /// Trimmed `aria-label`, or ""
    pub aria_label: String,
    pub has_click_handler: bool,
    pub source_url: Url,
}

/// Scans the whole document of `dom`.
pub fn scan<D: DomSurface + ?Sized>(dom: &D) -> Vec<Candidate> {
    scan_root(dom, dom.document())
}

/// Scans the subtree under `root`, shadow roots included.
pub fn scan_root<D: DomSurface + ?Sized>(dom: &D, root: NodeId) -> Vec<Candidate> {
    let mut items = Vec::new();
    let mut visited = HashSet::new();
    collect_from_root(dom, root, &mut visited, &mut items);
    items
}

fn collect_from_root<D: DomSurface + ?Sized>(
    dom: &D,
    root: NodeId,
    visited: &mut HashSet<NodeId>,
    items: &mut Vec<Candidate>,
) {
    let descendants = dom.descendants(root);

    for &node in &descendants {
        if !is_interactive(dom, node) || !visited.insert(node) {
            continue;
        }
        if !is_visible(dom, node) {
            continue;
        }
        let Some(label) = label_of(dom, node) else {
            continue;
        };
        let aria_label = dom
            .attribute(node, "aria-label")
            .map(|v| v.trim().to_string())
            .unwrap_or_default();
        items.push(Candidate {
            node,
            label,
            role: dom
                .attribute(node, "role")
                .map(|v| v.to_lowercase())
                .unwrap_or_default(),
            tag: dom.tag_name(node).unwrap_or_default().to_lowercase(),
            aria_label,
            has_click_handler: dom.has_click_handler(node),
            source_url: dom.url().clone(),
        });
    }

    // Shadow content comes after the light matches of the same root
    for &node in &descendants {
        if let Some(shadow) = dom.shadow_root(node) {
            collect_from_root(dom, shadow, visited, items);
        }
    }
}

/// `button`, `[role='button']` or `[tabindex]`
fn is_interactive<D: DomSurface + ?Sized>(dom: &D, node: NodeId) -> bool {
    dom.tag_name(node).as_deref() == Some("button")
        || dom.attribute(node, "role").as_deref() == Some("button")
        || dom.attribute(node, "tabindex").is_some()
}

/// Style and geometry check; any failed query counts as not visible.
pub fn is_visible<D: DomSurface + ?Sized>(dom: &D, node: NodeId) -> bool {
    let style = match dom.computed_style(node) {
        Ok(style) => style,
        Err(e) => {
            tracing::debug!("style query failed for {}: {}", node, e);
            return false;
        }
    };
    if style.display == "none" || style.visibility == "hidden" {
        return false;
    }
    // Unparseable opacity behaves like parseFloat's NaN: not zero
    if style
        .opacity
        .trim()
        .parse::<f64>()
        .is_ok_and(|opacity| opacity == 0.0)
    {
        return false;
    }
    match dom.client_rects(node) {
        Ok(rects) => rects.iter().any(|rect| !rect.is_empty()),
        Err(e) => {
            tracing::debug!("rect query failed for {}: {}", node, e);
            false
        }
    }
}

/// Trimmed `aria-label`, falling back to trimmed text; `None` when both are empty.
pub fn label_of<D: DomSurface + ?Sized>(dom: &D, node: NodeId) -> Option<String> {
    let aria = dom.attribute(node, "aria-label").unwrap_or_default();
    let aria = aria.trim();
    if !aria.is_empty() {
        return Some(aria.to_string());
    }
    let text = dom.text_content(node);
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementSpec, MemoryDocument};

    fn doc() -> MemoryDocument {
        MemoryDocument::parse("https://quiz.example/").unwrap()
    }

    fn labels(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn test_scan_collects_interactive_kinds() {
        let mut doc = doc();
        let body = doc.body();
        doc.append(body, ElementSpec::button("A. Paris")).unwrap();
        doc.append(body, ElementSpec::new("div").attr("role", "button").text("Hint"))
            .unwrap();
        doc.append(body, ElementSpec::new("span").attr("tabindex", "0").text("Next"))
            .unwrap();
        doc.append(body, ElementSpec::new("p").text("Question 3 of 10"))
            .unwrap();

        let candidates = scan(&doc);
        assert_eq!(labels(&candidates), vec!["A. Paris", "Hint", "Next"]);
        assert_eq!(candidates[0].tag, "button");
        assert_eq!(candidates[1].role, "button");
        assert_eq!(candidates[2].tag, "span");
        assert_eq!(candidates[2].source_url.as_str(), "https://quiz.example/");
    }

    #[test]
    fn test_aria_label_wins_over_text() {
        let mut doc = doc();
        let body = doc.body();
        doc.append(
            body,
            ElementSpec::button("→").attr("aria-label", "  Next question  "),
        )
        .unwrap();

        let candidates = scan(&doc);
        assert_eq!(candidates[0].label, "Next question");
        assert_eq!(candidates[0].aria_label, "Next question");
    }

    #[test]
    fn test_unlabeled_and_invisible_elements_are_skipped() {
        let mut doc = doc();
        let body = doc.body();
        doc.append(body, ElementSpec::button("   ")).unwrap();
        doc.append(body, ElementSpec::button("Gone").hidden()).unwrap();
        doc.append(body, ElementSpec::button("Ghost").invisible())
            .unwrap();
        doc.append(body, ElementSpec::button("Faded").transparent())
            .unwrap();
        doc.append(body, ElementSpec::button("Collapsed").zero_size())
            .unwrap();
        doc.append(body, ElementSpec::button("Kept")).unwrap();

        assert_eq!(labels(&scan(&doc)), vec!["Kept"]);
    }

    #[test]
    fn test_unparseable_opacity_counts_as_visible() {
        let mut doc = doc();
        let body = doc.body();
        let mut style = crate::dom::ComputedStyle::default();
        style.opacity = "calc(weird)".to_string();
        doc.append(body, ElementSpec::button("Next").style(style))
            .unwrap();

        assert_eq!(scan(&doc).len(), 1);
    }

    #[test]
    fn test_nested_shadow_roots_are_scanned_once() {
        let mut doc = doc();
        let body = doc.body();
        doc.append(body, ElementSpec::button("Next")).unwrap();
        let outer_host = doc.append(body, ElementSpec::new("quiz-app")).unwrap();
        let outer = doc.attach_shadow(outer_host).unwrap();
        doc.append(outer, ElementSpec::button("A. Paris")).unwrap();
        let inner_host = doc.append(outer, ElementSpec::new("quiz-choice")).unwrap();
        let inner = doc.attach_shadow(inner_host).unwrap();
        doc.append(inner, ElementSpec::button("B. Lyon")).unwrap();

        let candidates = scan(&doc);
        assert_eq!(labels(&candidates), vec!["Next", "A. Paris", "B. Lyon"]);
    }

    #[test]
    fn test_detached_element_is_invisible() {
        let mut doc = doc();
        let body = doc.body();
        let button = doc.append(body, ElementSpec::button("Next")).unwrap();
        doc.detach(button).unwrap();

        assert!(!is_visible(&doc, button));
        assert!(scan(&doc).is_empty());
    }
}
