//! Video candidate selection.
//!
//! Walks a highlights document depth-first and collects every string that
//! looks like a playable video: one ending in a known video suffix or one
//! starting with a URL scheme. A qualifying string is collected and never
//! inspected further; containers and non-qualifying scalars are descended
//! into (scalars have no children, so this ends there).
//!
//! Map entries are visited in key order.

use rand::seq::IndexedRandom;
use rand::Rng;

use hl_models::{HighlightsDocument, VideoCandidate};

/// File suffixes recognised as video files.
pub const VIDEO_SUFFIXES: &[&str] = &[".mp4", ".mov", ".m4v", ".webm", ".mkv"];

/// Prefix recognised as a URL scheme (covers `http://` and `https://`).
pub const URL_SCHEME_PREFIX: &str = "http";

/// Whether a string value is a candidate video reference.
pub fn is_qualifying(value: &str) -> bool {
    value.starts_with(URL_SCHEME_PREFIX) || VIDEO_SUFFIXES.iter().any(|s| value.ends_with(s))
}

/// All qualifying strings in traversal order.
pub fn collect_candidates(doc: &HighlightsDocument) -> Vec<&str> {
    let mut candidates = Vec::new();
    let mut stack = vec![doc];

    while let Some(node) = stack.pop() {
        match node {
            HighlightsDocument::String(s) if is_qualifying(s) => candidates.push(s.as_str()),
            // Children are pushed in reverse so they pop in document order.
            HighlightsDocument::Sequence(items) => stack.extend(items.iter().rev()),
            HighlightsDocument::Map(entries) => stack.extend(entries.values().rev()),
            _ => {}
        }
    }

    candidates
}

/// Uniformly pick one candidate from `doc` using the thread-local RNG.
pub fn select(doc: &HighlightsDocument) -> Option<VideoCandidate> {
    select_with(doc, &mut rand::rng())
}

/// Uniformly pick one candidate from `doc` using `rng`.
///
/// Returns `None` when the document holds no qualifying string.
pub fn select_with<R: Rng + ?Sized>(doc: &HighlightsDocument, rng: &mut R) -> Option<VideoCandidate> {
    collect_candidates(doc)
        .choose(rng)
        .map(|url| VideoCandidate::from_url(*url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> HighlightsDocument {
        HighlightsDocument::from(value)
    }

    #[test]
    fn test_qualifying_strings() {
        assert!(is_qualifying("http://x/a"));
        assert!(is_qualifying("https://x/a.m3u8"));
        assert!(is_qualifying("clip.mp4"));
        assert!(is_qualifying("clip.webm"));
        assert!(!is_qualifying("Goal by Svensson"));
        assert!(!is_qualifying("ftp://x/a.txt"));
        assert!(!is_qualifying(""));
    }

    #[test]
    fn test_collects_in_document_order() {
        let d = doc(json!({
            "events": [
                {"clip": "http://x/a.mp4", "title": "first"},
                {"clip": "http://x/b.mp4", "title": "second"}
            ]
        }));
        assert_eq!(collect_candidates(&d), vec!["http://x/a.mp4", "http://x/b.mp4"]);
    }

    #[test]
    fn test_selection_is_member_of_candidates() {
        let d = doc(json!({"events":[{"clip":"http://x/a.mp4"},{"clip":"http://x/b.mp4"}]}));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let picked = select_with(&d, &mut rng).unwrap();
            assert!(picked.url == "http://x/a.mp4" || picked.url == "http://x/b.mp4");
            assert!(picked.filename == "a.mp4" || picked.filename == "b.mp4");
        }
    }

    #[test]
    fn test_all_candidates_are_reachable() {
        let d = doc(json!(["http://x/a.mp4", "http://x/b.mp4", "http://x/c.mp4"]));
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(select_with(&d, &mut rng).unwrap().url);
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_no_candidates_returns_none() {
        let d = doc(json!({"events": [{"title": "Goal", "minute": 12, "var": null, "ok": true}]}));
        assert!(collect_candidates(&d).is_empty());
        assert!(select(&d).is_none());
        assert!(select(&HighlightsDocument::Null).is_none());
    }

    #[test]
    fn test_qualifying_string_counted_once() {
        // A URL whose text contains more URLs and suffixes is still one candidate.
        let d = doc(json!({"u": "http://x/redirect?to=http://y/a.mp4&alt=b.mp4"}));
        assert_eq!(collect_candidates(&d).len(), 1);
    }

    #[test]
    fn test_deeply_nested_document() {
        let mut value = json!("http://x/deep.mp4");
        for i in 0..100 {
            value = if i % 2 == 0 { json!([value]) } else { json!({"k": value}) };
        }
        let d = doc(value);
        assert_eq!(collect_candidates(&d), vec!["http://x/deep.mp4"]);
    }

    #[test]
    fn test_root_string_and_sequence_items_qualify() {
        assert_eq!(collect_candidates(&doc(json!("a.mp4"))), vec!["a.mp4"]);
        assert_eq!(
            collect_candidates(&doc(json!({"list": ["x", "b.mov", 3]}))),
            vec!["b.mov"]
        );
    }
}
