/// Lexical relevance ranking over the course corpus.
///
/// Each record is scored independently by token overlap with the query, title hits
/// weighted double. Results are ordered by score, ties kept in corpus order, then
/// deduplicated by URL and cut to the requested limit.
use std::collections::HashSet;

use tracing::debug;

use crate::model::{Record, RecordKind, ScoredLink};
use crate::tokenize::{tokenize, truncate_chars};

pub const TITLE_WEIGHT: u32 = 2;
pub const CONTENT_WEIGHT: u32 = 1;
const MAX_LINK_TEXT_LEN: usize = 150;
const MAX_EXCERPT_LEN: usize = 200;

/// `2 × |query ∩ title| + 1 × |query ∩ content|`.
pub fn score(query_tokens: &HashSet<String>, record: &Record) -> u32 {
    let overlap = |text: &str| tokenize(text).intersection(query_tokens).count() as u32;
    TITLE_WEIGHT * overlap(&record.title) + CONTENT_WEIGHT * overlap(&record.content)
}

pub fn rank<'a, I>(query: &str, records: I, limit: usize) -> Vec<ScoredLink>
where
    I: IntoIterator<Item = (RecordKind, &'a Record)>,
{
    let query_tokens = tokenize(query);
    if query_tokens.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(u32, RecordKind, &Record)> = records
        .into_iter()
        .filter(|(_, record)| !record.url.trim().is_empty())
        .map(|(kind, record)| (score(&query_tokens, record), kind, record))
        .filter(|(score, _, _)| *score > 0)
        .collect();

    // sort_by is stable: equal scores keep corpus order
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut seen: HashSet<&str> = HashSet::new();
    let results: Vec<ScoredLink> = scored
        .into_iter()
        .filter(|&(_, _, record)| seen.insert(record.url.as_str()))
        .take(limit)
        .map(|(score, kind, record)| ScoredLink {
            url: record.url.clone(),
            text: truncate_chars(&record.title, MAX_LINK_TEXT_LEN),
            score,
            kind,
            excerpt: truncate_chars(&record.content, MAX_EXCERPT_LEN),
        })
        .collect();

    debug!(
        query,
        matched = results.len(),
        top_score = results.first().map(|r| r.score).unwrap_or(0),
        "ranked corpus"
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Corpus;

    fn post(title: &str, url: &str, content: &str) -> Record {
        Record::new(title, url, content)
    }

    fn corpus() -> Corpus {
        Corpus::new(
            vec![
                post("Docker Basics", "https://tds.example/docker", "containers and images"),
                post("Python Tools", "https://tds.example/uv", "python package management with uv"),
            ],
            vec![
                post("Docker compose help", "https://forum.example/t/1", "compose file errors"),
                post("Docker Basics", "https://tds.example/docker", "duplicate of the course page"),
                post("Unrelated", "https://forum.example/t/2", "nothing to see"),
            ],
        )
    }

    #[test]
    fn title_hits_weigh_double() {
        let query = tokenize("docker images");
        let record = post("Docker Basics", "u", "containers and images");
        assert_eq!(score(&query, &record), 2 + 1);
    }

    #[test]
    fn empty_query_ranks_nothing() {
        let corpus = corpus();
        assert!(rank("   ", corpus.iter(), 5).is_empty());
        assert!(rank("?!", corpus.iter(), 5).is_empty());
    }

    #[test]
    fn results_are_sorted_unique_and_bounded() {
        let corpus = corpus();
        let ranked = rank("docker compose images", corpus.iter(), 5);

        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
        let urls: HashSet<&str> = ranked.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls.len(), ranked.len());
        assert_eq!(ranked[0].url, "https://forum.example/t/1");
        assert_eq!(ranked[0].score, 2 * 2 + 1);

        assert_eq!(rank("docker compose images", corpus.iter(), 1).len(), 1);
    }

    #[test]
    fn duplicate_url_keeps_highest_scored_copy() {
        let corpus = corpus();
        let ranked = rank("duplicate docker", corpus.iter(), 5);
        let dupes: Vec<&ScoredLink> = ranked
            .iter()
            .filter(|r| r.url == "https://tds.example/docker")
            .collect();
        assert_eq!(dupes.len(), 1);
        assert_eq!(dupes[0].kind, RecordKind::DiscoursePost);
        assert_eq!(dupes[0].score, 3);
    }

    #[test]
    fn ties_keep_corpus_order() {
        let corpus = Corpus::new(
            vec![post("alpha", "https://a", "")],
            vec![post("alpha", "https://b", ""), post("alpha", "https://c", "")],
        );
        let urls: Vec<String> = rank("alpha", corpus.iter(), 5)
            .into_iter()
            .map(|r| r.url)
            .collect();
        assert_eq!(urls, ["https://a", "https://b", "https://c"]);
    }

    #[test]
    fn records_without_url_or_text_never_surface() {
        let corpus = Corpus::new(
            vec![post("Docker", "", "docker"), Record::default()],
            vec![post("", "https://forum.example/t/3", "")],
        );
        assert!(rank("docker", corpus.iter(), 5).is_empty());
    }

    #[test]
    fn long_titles_and_content_are_truncated() {
        let title = "docker ".repeat(40);
        let corpus = Corpus::new(vec![post(&title, "https://long", &"x".repeat(500))], vec![]);
        let ranked = rank("docker", corpus.iter(), 5);
        assert_eq!(ranked[0].text.chars().count(), 150 + 3);
        assert!(ranked[0].text.ends_with("..."));
        assert_eq!(ranked[0].excerpt.chars().count(), 200 + 3);
    }

    #[test]
    fn scales_linearly_over_hundreds_of_records() {
        let posts: Vec<Record> = (0..500)
            .map(|i| post(&format!("topic {i}"), &format!("https://forum.example/t/{i}"), "body"))
            .collect();
        let corpus = Corpus::new(vec![], posts);
        let ranked = rank("topic 42", corpus.iter(), 5);
        assert_eq!(ranked[0].url, "https://forum.example/t/42");
        assert_eq!(ranked[0].score, 4);
        assert_eq!(ranked.len(), 5);
    }
}
