use serde::{Deserialize, Serialize};
use ta_common::api::{AskResponse, Link};

/// One course page or forum post. Both kinds share this shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Post date as published, e.g. "2025-04-10". Not parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl Record {
    pub fn new(title: &str, url: &str, content: &str) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
            content: content.to_string(),
            tags: None,
            date: None,
        }
    }

    pub fn with_date(mut self, date: &str) -> Self {
        self.date = Some(date.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    CourseItem,
    DiscoursePost,
}

impl RecordKind {
    pub fn label(self) -> &'static str {
        match self {
            RecordKind::CourseItem => "course",
            RecordKind::DiscoursePost => "discourse",
        }
    }
}

/// The read-only corpus answered against. Course items rank ahead of discourse posts
/// on equal score because they come first in iteration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    pub course_items: Vec<Record>,
    pub discourse_posts: Vec<Record>,
}

impl Corpus {
    pub fn new(course_items: Vec<Record>, discourse_posts: Vec<Record>) -> Self {
        Self {
            course_items,
            discourse_posts,
        }
    }

    pub fn len(&self) -> usize {
        self.course_items.len() + self.discourse_posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (RecordKind, &Record)> {
        self.course_items
            .iter()
            .map(|r| (RecordKind::CourseItem, r))
            .chain(
                self.discourse_posts
                    .iter()
                    .map(|r| (RecordKind::DiscoursePost, r)),
            )
    }
}

/// A record that matched a query, ready to become an output link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredLink {
    pub url: String,
    /// Record title, truncated for display.
    pub text: String,
    pub score: u32,
    pub kind: RecordKind,
    /// Leading slice of the record content, quoted by the synthesizer.
    pub excerpt: String,
}

impl ScoredLink {
    pub fn into_link(self) -> Link {
        Link {
            url: self.url,
            text: self.text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerResult {
    pub answer: String,
    pub links: Vec<Link>,
}

impl From<AnswerResult> for AskResponse {
    fn from(result: AnswerResult) -> Self {
        AskResponse {
            answer: result.answer,
            links: result.links,
        }
    }
}
