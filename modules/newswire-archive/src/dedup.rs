use std::collections::HashSet;

use newswire_common::Article;
use tracing::debug;

/// Fingerprint length cap, in characters.
pub const FINGERPRINT_LEN: usize = 60;

/// Lowercased, alphanumeric-only prefix of a title.
pub fn fingerprint(title: &str) -> String {
    title
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .take(FINGERPRINT_LEN)
        .collect()
}

/// Keep the first article for each fingerprint, in input order.
/// First wins, not most recent: pre-sort if recency matters.
pub fn dedupe(articles: Vec<Article>) -> Vec<Article> {
    let before = articles.len();
    let mut seen = HashSet::new();
    let kept: Vec<Article> = articles
        .into_iter()
        .filter(|a| seen.insert(fingerprint(&a.title)))
        .collect();
    debug!(before, after = kept.len(), "dedupe: complete");
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, source: &str) -> Article {
        Article::new(Some(title), None, source, "", "")
    }

    #[test]
    fn punctuation_and_case_are_ignored() {
        assert_eq!(fingerprint("Chanel No. 5!!"), "chanelno5");
        assert_eq!(fingerprint("chanel no 5"), "chanelno5");

        let kept = dedupe(vec![
            article("Chanel No. 5!!", "first"),
            article("chanel no 5", "second"),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source, "first");
    }

    #[test]
    fn fingerprint_is_capped() {
        let long = "a".repeat(100);
        assert_eq!(fingerprint(&long).chars().count(), FINGERPRINT_LEN);

        // Same first 60 alphanumerics → duplicates even if tails differ.
        let a = format!("{} one", "x".repeat(60));
        let b = format!("{} two", "x".repeat(60));
        assert_eq!(dedupe(vec![article(&a, "a"), article(&b, "b")]).len(), 1);
    }

    #[test]
    fn non_ascii_letters_survive() {
        assert_eq!(fingerprint("Eau de Café — Été"), "eaudecaféété");
    }

    #[test]
    fn result_is_unique_and_never_longer() {
        let input = vec![
            article("Launch", "a"),
            article("Other", "b"),
            article("LAUNCH!", "c"),
            article("other", "d"),
            article("Third", "e"),
        ];
        let kept = dedupe(input.clone());
        assert!(kept.len() <= input.len());
        let prints: HashSet<_> = kept.iter().map(|a| fingerprint(&a.title)).collect();
        assert_eq!(prints.len(), kept.len());
        let sources: Vec<_> = kept.iter().map(|a| a.source.as_str()).collect();
        assert_eq!(sources, vec!["a", "b", "e"]);
    }

    #[test]
    fn dedupe_is_idempotent() {
        let input = vec![
            article("A!", "1"),
            article("a", "2"),
            article("B", "3"),
            article("???", "4"),
            article("...", "5"),
        ];
        let once = dedupe(input);
        let twice = dedupe(once.clone());
        assert_eq!(once, twice);
        // Titles without alphanumerics share the empty fingerprint.
        assert_eq!(once.len(), 3);
    }
}
