/// Lexical normalization shared by the ranker and the synthesizer.
use std::collections::HashSet;

/// Lower-cases `text` and splits it on whitespace into a set of tokens.
///
/// Punctuation hugging a word is trimmed (`"ga5?"` becomes `"ga5"`), while inner
/// punctuation survives (`"gpt-3.5-turbo"` stays whole). Tokens left empty are dropped.
pub fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Cuts `text` to at most `max_chars` characters, appending `...` when anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}
