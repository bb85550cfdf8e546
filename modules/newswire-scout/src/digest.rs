// Markdown digest of one run's gathered articles.

use std::fmt::Write;

use chrono::NaiveDate;
use newswire_common::{Article, GatherResult};

/// Render articles grouped by source, in first-appearance order, then errors.
pub fn render_digest(result: &GatherResult, date: NaiveDate) -> String {
    let mut groups: Vec<(&str, Vec<&Article>)> = Vec::new();
    for article in &result.articles {
        match groups.iter_mut().find(|(source, _)| *source == article.source) {
            Some((_, items)) => items.push(article),
            None => groups.push((article.source.as_str(), vec![article])),
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "# News Briefing: {}", date.format("%Y-%m-%d"));
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} articles from {} sources.",
        result.articles.len(),
        groups.len()
    );

    for (source, items) in &groups {
        let _ = writeln!(out);
        let _ = writeln!(out, "## {source}");
        let _ = writeln!(out);
        for article in items {
            render_article(&mut out, article);
        }
    }

    if !result.errors.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Errors");
        let _ = writeln!(out);
        for error in &result.errors {
            let _ = writeln!(out, "- {error}");
        }
    }

    out
}

fn render_article(out: &mut String, article: &Article) {
    let heading = if article.url.is_empty() {
        article.title.clone()
    } else {
        format!("[{}]({})", article.title, article.url)
    };
    match article.date.get(..10) {
        Some(day) => {
            let _ = writeln!(out, "- {heading} ({day})");
        }
        None if !article.date.is_empty() => {
            let _ = writeln!(out, "- {heading} ({})", article.date);
        }
        None => {
            let _ = writeln!(out, "- {heading}");
        }
    }
    if !article.snippet.is_empty() {
        let _ = writeln!(out, "  {}", article.snippet);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn groups_by_source_in_first_seen_order() {
        let result = GatherResult {
            articles: vec![
                Article::new(
                    Some("A"),
                    Some("https://a.example"),
                    "notes",
                    "2025-05-20T08:00:00Z",
                    "first",
                ),
                Article::new(Some("B"), None, "news", "", ""),
                Article::new(Some("C"), Some("https://c.example"), "notes", "2025-05-21", "third"),
            ],
            errors: vec!["trade (search): rate limited".into()],
        };

        let digest = render_digest(&result, day());

        assert!(digest.starts_with("# News Briefing: 2025-06-01\n"));
        assert!(digest.contains("3 articles from 2 sources."));
        let notes = digest.find("## notes").unwrap();
        let news = digest.find("## news").unwrap();
        assert!(notes < news);
        assert!(digest.contains("- [A](https://a.example) (2025-05-20)\n  first\n"));
        assert!(digest.contains("- [C](https://c.example) (2025-05-21)\n  third\n"));
        assert!(digest.contains("- B\n"));
        assert!(digest.ends_with("## Errors\n\n- trade (search): rate limited\n"));
    }

    #[test]
    fn no_errors_section_when_clean() {
        let result = GatherResult {
            articles: vec![Article::new(Some("A"), None, "s", "", "")],
            errors: vec![],
        };
        assert!(!render_digest(&result, day()).contains("## Errors"));
    }
}
