use ta_common::api::{AskRequest, AskResponse};

pub struct ProbeCase {
    pub name: &'static str,
    pub question: &'static str,
}

impl ProbeCase {
    pub fn request(&self) -> AskRequest {
        AskRequest::new(self.question)
    }
}

pub const CASES: &[ProbeCase] = &[
    ProbeCase {
        name: "model choice",
        question: "Should I use gpt-4o-mini or gpt-3.5-turbo for GA5?",
    },
    ProbeCase {
        name: "assignment deadline",
        question: "What is the deadline for GA5?",
    },
    ProbeCase {
        name: "api usage",
        question: "How should I use APIs in my assignments?",
    },
    ProbeCase {
        name: "python setup",
        question: "How do I set up Python environment for TDS?",
    },
];

/// Problems with a response that parsed but doesn't look like a real answer.
pub fn check_shape(response: &AskResponse) -> Vec<String> {
    let mut problems = Vec::new();
    if response.answer.trim().is_empty() {
        problems.push("empty answer".to_string());
    }
    for (i, link) in response.links.iter().enumerate() {
        if link.url.trim().is_empty() {
            problems.push(format!("link {i} has no url"));
        }
    }
    let mut urls: Vec<&str> = response.links.iter().map(|l| l.url.as_str()).collect();
    urls.sort_unstable();
    urls.dedup();
    if urls.len() != response.links.len() {
        problems.push("duplicate link urls".to_string());
    }
    problems
}
