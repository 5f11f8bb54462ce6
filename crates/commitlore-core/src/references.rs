//! Reference scanner.

use regex::Captures;

use commitlore_commit::Reference;

use crate::CompiledGrammar;
use crate::grammar::catch_all_sentences;

/// Extracts the issue references of `text`.
///
/// Each action sentence is searched for reference parts. When `text` holds no
/// action sentence at all, every line of it is searched instead with no
/// action, so bare `#123` references are still found.
pub fn scan(text: &str, grammar: &CompiledGrammar) -> Vec<Reference> {
    let Some(parts) = grammar.reference_parts() else {
        return Vec::new();
    };

    let mut sentences = grammar.references().sentences(text, grammar.catch_all());
    if sentences.is_empty() {
        sentences = catch_all_sentences(text, grammar.catch_all());
    }

    sentences
        .iter()
        .flat_map(|sentence| {
            parts
                .captures_all(sentence.text)
                .into_iter()
                .map(move |captures| decode(sentence.action, &captures))
        })
        .collect()
}

/// Builds a reference from a reference-parts match.
fn decode(action: Option<&str>, captures: &Captures<'_>) -> Reference {
    let group = |index| captures.get(index).map_or("", |m| m.as_str());

    let (owner, repository) = match group(1).split_once('/') {
        Some((owner, repository)) => (Some(owner.to_string()), repository),
        None => (None, group(1)),
    };

    Reference {
        action: action.map(String::from),
        owner,
        repository: (!repository.is_empty()).then(|| repository.to_string()),
        issue: group(3).to_string(),
        raw: group(0).to_string(),
        prefix: group(2).to_string(),
    }
}
