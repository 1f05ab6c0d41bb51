/// The question-answering entry point: rank, synthesize, assemble links.
///
/// `answer` never fails. Any fault in the pipeline, including a panic, is logged and
/// turned into a fixed apology with no links.
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};

use ta_common::api::Link;
use tracing::{error, info};

use crate::error::CoreError;
use crate::image::{validate_image_payload, IMAGE_NOTE};
use crate::model::{AnswerResult, Corpus};
use crate::rank::rank;
use crate::synth::{fallback_link, synthesize, Source};

pub const ERROR_ANSWER: &str = "Sorry, I encountered an error processing your question.";
pub const DEFAULT_MAX_LINKS: usize = 5;

#[derive(Debug, Clone)]
pub struct AnswerConfig {
    /// Upper bound on links per answer (K).
    pub max_links: usize,
    /// Cite the course Discourse category when nothing else matched.
    pub fallback_link: bool,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            max_links: DEFAULT_MAX_LINKS,
            fallback_link: true,
        }
    }
}

impl AnswerResult {
    pub fn apology() -> Self {
        Self {
            answer: ERROR_ANSWER.to_string(),
            links: Vec::new(),
        }
    }
}

pub fn answer(
    corpus: &Corpus,
    question: &str,
    image: Option<&str>,
    config: &AnswerConfig,
) -> AnswerResult {
    answer_with(question, || try_answer(corpus, question, image, config))
}

/// Runs `pipeline`, turning an error or a panic into the apology.
fn answer_with<F>(question: &str, pipeline: F) -> AnswerResult
where
    F: FnOnce() -> Result<AnswerResult, CoreError>,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(pipeline))
        .unwrap_or_else(|payload| Err(CoreError::Panicked(panic_message(payload.as_ref()))));

    match outcome {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, question, "answer generation failed");
            AnswerResult::apology()
        }
    }
}

fn try_answer(
    corpus: &Corpus,
    question: &str,
    image: Option<&str>,
    config: &AnswerConfig,
) -> Result<AnswerResult, CoreError> {
    let ranked = rank(question, corpus.iter(), config.max_links);
    let synthesis = synthesize(question, &ranked);
    let top_category = ranked.first().map(|r| r.kind.label());

    let mut candidates = synthesis.fixed_links;
    if synthesis.source == Source::Fallback && config.fallback_link {
        candidates.push(fallback_link());
    }
    candidates.extend(ranked.into_iter().map(|r| r.into_link()));
    let links = dedup_links(candidates, config.max_links);

    let mut answer = synthesis.answer;
    if image.is_some_and(validate_image_payload) {
        answer.push_str(IMAGE_NOTE);
    }

    info!(
        source = ?synthesis.source,
        top_category,
        links = links.len(),
        image = image.is_some(),
        "answered question"
    );

    let result = AnswerResult { answer, links };
    check_postconditions(&result, config.max_links)?;
    Ok(result)
}

fn dedup_links(candidates: Vec<Link>, max_links: usize) -> Vec<Link> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|link| !link.url.trim().is_empty())
        .filter(|link| seen.insert(link.url.clone()))
        .take(max_links)
        .collect()
}

fn check_postconditions(result: &AnswerResult, max_links: usize) -> Result<(), CoreError> {
    if result.answer.trim().is_empty() {
        return Err(CoreError::EmptyAnswer);
    }
    if result.links.iter().any(|l| l.url.trim().is_empty()) {
        return Err(CoreError::EmptyLinkUrl);
    }
    if result.links.len() > max_links {
        return Err(CoreError::TooManyLinks {
            count: result.links.len(),
            max: max_links,
        });
    }
    Ok(())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
