//! Commit message parser.

use std::sync::Arc;

use regex::Captures;
use tracing::trace;

use commitlore_commit::{CommitRecord, Fields, Note, RevertInfo};
use commitlore_config::GrammarOptions;

use crate::lines::{message_lines, trim_newlines};
use crate::references::scan;
use crate::stream::Records;
use crate::{CompiledGrammar, GrammarError, ParseError, ParseResult};

/// Title of the note synthesized from a breaking-change header.
const BREAKING_CHANGE: &str = "BREAKING CHANGE";

/// Parses one raw commit message.
///
/// Text that does not match a pattern leaves the corresponding fields empty;
/// the only failure is an empty message.
///
/// # Errors
///
/// Returns [`ParseError::EmptyInput`] if `raw` is empty or whitespace only.
pub fn parse(raw: &str, grammar: &CompiledGrammar) -> ParseResult<CommitRecord> {
    if raw.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let lines = message_lines(raw, grammar.comment_char());
    let Some((&first, rest)) = lines.split_first() else {
        trace!("no structural lines left");
        return Ok(empty_record(grammar));
    };
    let mut rest = rest.iter().copied();

    let merge_captures = grammar.merge().and_then(|merge| merge.captures(first));
    let (merge, header) = match &merge_captures {
        Some(captures) => {
            let header = rest.by_ref().find(|line| !line.trim().is_empty());
            (Some(group(captures, 0).to_string()), header.unwrap_or(""))
        }
        None => (None, first),
    };
    let merge_fields = correspondence(grammar.merge_correspondence(), merge_captures.as_ref());
    let header_fields = correspondence(
        grammar.header_correspondence(),
        grammar.header().captures(header).as_ref(),
    );

    let mut references = scan(header, grammar);
    let mut notes: Vec<Note> = Vec::new();
    let mut custom_fields = Fields::new();
    let mut body = String::new();
    let mut footer = String::new();
    let mut open_field: Option<String> = None;
    let mut in_body = true;
    let mut in_note = false;

    for line in rest {
        if let Some(field) = grammar.field() {
            if let Some(captures) = field.captures(line) {
                let name = group(&captures, 1);
                open_field = (!name.is_empty()).then(|| name.to_string());
                continue;
            }
            if let Some(name) = &open_field {
                custom_fields.append(name, line);
                continue;
            }
        }

        if let Some(captures) = grammar.notes().and_then(|notes| notes.captures(line)) {
            notes.push(Note::new(group(&captures, 1), group(&captures, 2)));
            in_body = false;
            in_note = true;
            append(&mut footer, line);
            continue;
        }

        let found = scan(line, grammar);
        if !found.is_empty() {
            references.extend(found);
            in_body = false;
            in_note = false;
            append(&mut footer, line);
            continue;
        }

        match notes.last_mut() {
            Some(note) if in_note => {
                append(&mut note.text, line);
                append(&mut footer, line);
            }
            _ if in_body => append(&mut body, line),
            _ => append(&mut footer, line),
        }
    }

    if notes.is_empty() {
        if let Some(captures) = grammar
            .breaking_header()
            .and_then(|pattern| pattern.captures(header))
        {
            notes.push(Note::new(BREAKING_CHANGE, group(&captures, 3)));
        }
    }

    let mentions: Vec<String> = grammar
        .mentions()
        .captures_all(raw)
        .iter()
        .filter_map(|captures| captures.get(1))
        .map(|name| name.as_str().to_string())
        .collect();

    let revert = grammar.revert().captures(raw).map(|captures| {
        RevertInfo::new(correspondence(
            grammar.revert_correspondence(),
            Some(&captures),
        ))
    });

    for note in &mut notes {
        note.text = trim_newlines(&note.text).to_string();
    }

    trace!(
        header = %header,
        is_merge = merge.is_some(),
        notes = notes.len(),
        references = references.len(),
        mentions = mentions.len(),
        is_revert = revert.is_some(),
        "parsed commit message"
    );

    Ok(CommitRecord::builder()
        .merge(merge)
        .header(header.to_string())
        .body(non_empty(trim_newlines(&body)))
        .footer(non_empty(trim_newlines(&footer)))
        .notes(notes)
        .references(references)
        .mentions(mentions)
        .revert(revert)
        .header_fields(header_fields)
        .merge_fields(merge_fields)
        .custom_fields(custom_fields)
        .build())
}

/// Returns the record of a message with no structural lines.
///
/// Every text field is `None` and every list is empty; the header and merge
/// correspondence names are present with `None` values.
pub fn empty_record(grammar: &CompiledGrammar) -> CommitRecord {
    CommitRecord::builder()
        .header_fields(correspondence(grammar.header_correspondence(), None))
        .merge_fields(correspondence(grammar.merge_correspondence(), None))
        .build()
}

/// Maps capture groups `1..` to `names`; unmatched or empty groups are `None`.
///
/// An empty name skips its group.
fn correspondence(names: &[String], captures: Option<&Captures<'_>>) -> Fields {
    names
        .iter()
        .enumerate()
        .filter(|(_, name)| !name.is_empty())
        .map(|(index, name)| {
            let value = captures
                .and_then(|captures| captures.get(index + 1))
                .map(|m| m.as_str())
                .filter(|value| !value.is_empty())
                .map(String::from);
            (name.as_str(), value)
        })
        .collect()
}

fn group<'t>(captures: &Captures<'t>, index: usize) -> &'t str {
    captures.get(index).map_or("", |m| m.as_str())
}

/// Appends `line` on a new line; an empty target is replaced.
fn append(target: &mut String, line: &str) {
    if !target.is_empty() {
        target.push('\n');
    }
    target.push_str(line);
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

/// A parser bound to one compiled grammar.
///
/// Cloning is cheap; clones share the grammar.
#[derive(Debug, Clone)]
pub struct CommitParser {
    grammar: Arc<CompiledGrammar>,
}

impl CommitParser {
    /// Compiles `options` into a parser.
    ///
    /// # Errors
    ///
    /// Returns an error if the options do not form a valid grammar.
    pub fn new(options: &GrammarOptions) -> Result<Self, GrammarError> {
        Ok(Self::from_grammar(Arc::new(CompiledGrammar::compile(options)?)))
    }

    /// Creates a parser for the Conventional Commits grammar.
    ///
    /// # Panics
    ///
    /// Panics if the built-in conventional patterns fail to compile.
    #[must_use]
    pub fn conventional() -> Self {
        Self::new(&GrammarOptions::conventional()).expect("invalid conventional grammar")
    }

    /// Creates a parser sharing an already compiled grammar.
    #[must_use]
    pub fn from_grammar(grammar: Arc<CompiledGrammar>) -> Self {
        Self { grammar }
    }

    /// Parses one raw commit message.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::EmptyInput`] if `raw` is empty or whitespace only.
    pub fn parse(&self, raw: &str) -> ParseResult<CommitRecord> {
        parse(raw, &self.grammar)
    }

    /// The compiled grammar.
    pub fn grammar(&self) -> &Arc<CompiledGrammar> {
        &self.grammar
    }

    /// Parses a sequence of raw messages lazily, stopping at the first error.
    pub fn records<I>(&self, upstream: I) -> Records<I::IntoIter>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Records::new(upstream, Arc::clone(&self.grammar))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SCISSOR_LINE;

    fn parse_conventional(raw: &str) -> CommitRecord {
        CommitParser::conventional().parse(raw).unwrap()
    }

    #[test]
    fn test_empty_input() {
        let parser = CommitParser::conventional();
        assert!(matches!(parser.parse(""), Err(ParseError::EmptyInput)));
        assert!(matches!(parser.parse(" \n\t\r\n"), Err(ParseError::EmptyInput)));
    }

    #[test]
    fn test_header_correspondence() {
        let record = parse_conventional("feat(parser): add x");

        assert_eq!(record.header.as_deref(), Some("feat(parser): add x"));
        assert_eq!(record.r#type(), Some("feat"));
        assert_eq!(record.scope(), Some("parser"));
        assert_eq!(record.subject(), Some("add x"));
        assert_eq!(record.body, None);
        assert_eq!(record.footer, None);
        assert_eq!(record.merge, None);
        assert_eq!(record.revert, None);
    }

    #[test]
    fn test_header_without_scope() {
        let record = parse_conventional("fix: handle edge case");

        assert_eq!(record.r#type(), Some("fix"));
        assert!(record.header_fields.contains("scope"));
        assert_eq!(record.scope(), None);
        assert_eq!(record.subject(), Some("handle edge case"));
    }

    #[test]
    fn test_unmatched_header() {
        let record = parse_conventional("random commit message");

        assert_eq!(record.header.as_deref(), Some("random commit message"));
        assert_eq!(record.r#type(), None);
        assert_eq!(record.subject(), None);
        assert_eq!(record.header_fields.len(), 3);
    }

    #[test]
    fn test_body_and_footer() {
        let record = parse_conventional(
            "feat: x\n\nfirst paragraph\nstill first\n\nsecond paragraph\n\nCloses #1\ntrailing line",
        );

        assert_eq!(
            record.body.as_deref(),
            Some("first paragraph\nstill first\n\nsecond paragraph")
        );
        assert_eq!(record.footer.as_deref(), Some("Closes #1\ntrailing line"));
        assert_eq!(record.references.len(), 1);
        assert_eq!(record.references[0].issue, "1");
    }

    #[test]
    fn test_mentions_keep_order_and_duplicates() {
        let record = parse_conventional("@alice reviewed, @bob-2 approved, @alice again");

        insta::assert_yaml_snapshot!(record.mentions, @r"
        - alice
        - bob-2
        - alice
        ");
    }

    #[test]
    fn test_breaking_change_continuation() {
        let record =
            parse_conventional("feat: x\n\nintro\n\nBREAKING CHANGE: removes foo\nsee docs");

        assert_eq!(
            record.notes,
            [Note::new("BREAKING CHANGE", "removes foo\nsee docs")]
        );
        assert_eq!(record.body.as_deref(), Some("intro"));
        assert_eq!(
            record.footer.as_deref(),
            Some("BREAKING CHANGE: removes foo\nsee docs")
        );
    }

    #[test]
    fn test_note_with_text_on_next_line() {
        let record = parse_conventional("feat: x\n\nBREAKING CHANGE:\nthe api changed\n");

        assert_eq!(record.notes, [Note::new("BREAKING CHANGE", "the api changed")]);
        assert_eq!(record.body, None);
    }

    #[test]
    fn test_reference_ends_note_continuation() {
        let record = parse_conventional(
            "feat: x\n\nBREAKING-CHANGE: drops node 12\nCloses #5\nunrelated trailer",
        );

        assert_eq!(record.notes, [Note::new("BREAKING-CHANGE", "drops node 12")]);
        assert_eq!(record.references.len(), 1);
        assert_eq!(
            record.footer.as_deref(),
            Some("BREAKING-CHANGE: drops node 12\nCloses #5\nunrelated trailer")
        );
    }

    #[test]
    fn test_references_with_owner_and_repository() {
        let record = parse_conventional("fix: x\n\nfixes octo/repo#12, closes #13");

        assert_eq!(record.references.len(), 2);
        assert_eq!(record.references[0].owner.as_deref(), Some("octo"));
        assert_eq!(record.references[0].repository.as_deref(), Some("repo"));
        assert_eq!(record.references[0].issue, "12");
        assert_eq!(record.references[1].action.as_deref(), Some("closes"));
        assert_eq!(record.references[1].owner, None);
        assert_eq!(record.references[1].issue, "13");
    }

    #[test]
    fn test_header_references() {
        let record = parse_conventional("fix: handle crash, closes #42");

        assert_eq!(record.references.len(), 1);
        assert_eq!(record.references[0].action.as_deref(), Some("closes"));
        assert_eq!(record.references[0].issue, "42");
    }

    #[test]
    fn test_revert() {
        let record = parse_conventional("Revert \"feat: x\"\n\nThis reverts commit abcd1234.");
        let revert = record.revert.as_ref().unwrap();

        assert_eq!(revert.header(), Some("feat: x"));
        assert_eq!(revert.hash(), Some("abcd1234"));
        assert!(record.is_revert());
        assert_eq!(
            serde_json::to_value(revert).unwrap(),
            serde_json::json!({ "header": "feat: x", "hash": "abcd1234" })
        );
    }

    #[test]
    fn test_scissor_truncates() {
        let raw = format!(
            "feat: x\n\nbody\n{SCISSOR_LINE}\nfix(y): z\nBREAKING CHANGE: no\nCloses #9"
        );
        let record = parse_conventional(&raw);

        assert_eq!(record.body.as_deref(), Some("body"));
        assert_eq!(record.footer, None);
        assert!(record.notes.is_empty());
        assert!(record.references.is_empty());
    }

    #[test]
    fn test_comment_and_signature_lines_are_stripped() {
        let options = GrammarOptions::conventional().with_comment_char('#');
        let parser = CommitParser::new(&options).unwrap();
        let record = parser
            .parse(
                "feat: x\n\n# BREAKING CHANGE: commented out\nbody\ngpg: Signature made\n  gpg: Good signature",
            )
            .unwrap();

        assert_eq!(record.body.as_deref(), Some("body"));
        assert_eq!(record.footer, None);
        assert!(record.notes.is_empty());
    }

    #[test]
    fn test_only_filtered_lines_give_empty_record() {
        let options = GrammarOptions::conventional().with_comment_char('#');
        let parser = CommitParser::new(&options).unwrap();
        let record = parser.parse("# nothing but a comment").unwrap();

        assert_eq!(record, empty_record(parser.grammar()));
        assert_eq!(record.header, None);
        assert_eq!(record.header_fields.len(), 3);
        assert_eq!(record.r#type(), None);
    }

    #[test]
    fn test_deterministic() {
        let parser = CommitParser::conventional();
        let raw = "feat(api): x @dev\n\nbody\n\nBREAKING CHANGE: y\nCloses #1";

        assert_eq!(parser.parse(raw).unwrap(), parser.parse(raw).unwrap());
    }

    #[test]
    fn test_merge_preamble() {
        let options = GrammarOptions::conventional().with_merge(
            r"^Merge pull request #(\d+) from (.*)$",
            &["id", "source"],
        );
        let parser = CommitParser::new(&options).unwrap();
        let record = parser
            .parse("Merge pull request #7 from dev/feature\n\n\nfeat(ui): dark mode\n\nbody")
            .unwrap();

        assert_eq!(
            record.merge.as_deref(),
            Some("Merge pull request #7 from dev/feature")
        );
        assert_eq!(record.field("id"), Some("7"));
        assert_eq!(record.field("source"), Some("dev/feature"));
        assert_eq!(record.header.as_deref(), Some("feat(ui): dark mode"));
        assert_eq!(record.r#type(), Some("feat"));
        assert_eq!(record.body.as_deref(), Some("body"));
        assert!(record.is_merge());
    }

    #[test]
    fn test_merge_without_header() {
        let options = GrammarOptions::conventional()
            .with_merge(r"^Merge branch '(\w+)'$", &["branch"]);
        let parser = CommitParser::new(&options).unwrap();
        let record = parser.parse("Merge branch 'main'\n\n").unwrap();

        assert_eq!(record.header.as_deref(), Some(""));
        assert_eq!(record.field("branch"), Some("main"));
        assert_eq!(record.r#type(), None);
    }

    #[test]
    fn test_unmatched_merge_fields_are_null() {
        let options = GrammarOptions::conventional()
            .with_merge(r"^Merge branch '(\w+)'$", &["branch"]);
        let parser = CommitParser::new(&options).unwrap();
        let record = parser.parse("feat: x").unwrap();

        assert_eq!(record.merge, None);
        assert!(record.merge_fields.contains("branch"));
        assert_eq!(record.field("branch"), None);
        assert_eq!(record.r#type(), Some("feat"));
    }

    #[test]
    fn test_merge_fields_override_header_fields() {
        let options = GrammarOptions::conventional()
            .with_merge(r"^Merge (\w+) into \w+$", &["type"]);
        let parser = CommitParser::new(&options).unwrap();
        let record = parser.parse("Merge hotfix into main\nfix: y").unwrap();

        assert_eq!(record.header_fields.get("type"), Some("fix"));
        assert_eq!(record.r#type(), Some("hotfix"));
    }

    #[test]
    fn test_custom_fields() {
        let record = parse_conventional(
            "feat: x\n\nbody\n-hash-\n9b1aff905b638aa274a5fc8f88662df446d374bd\n-sideNotes-\nIt should warn the correct unfound file names.\nAlso it should continue if one file cannot be found.\nCloses #1",
        );

        assert_eq!(record.body.as_deref(), Some("body"));
        assert_eq!(
            record.field("hash"),
            Some("9b1aff905b638aa274a5fc8f88662df446d374bd")
        );
        assert_eq!(
            record.field("sideNotes"),
            Some(
                "It should warn the correct unfound file names.\nAlso it should continue if one file cannot be found.\nCloses #1"
            )
        );
        assert!(record.references.is_empty());
        assert_eq!(record.footer, None);
    }

    #[test]
    fn test_empty_correspondence_name_skips_group() {
        let options = GrammarOptions::conventional().with_header(
            r"^(\w*)(?:\((.*)\))?: (.*)$",
            &["type", "", "subject"],
        );
        let parser = CommitParser::new(&options).unwrap();
        let record = parser.parse("feat(api): add x").unwrap();

        assert_eq!(record.r#type(), Some("feat"));
        assert_eq!(record.subject(), Some("add x"));
        assert_eq!(record.header_fields.len(), 2);
        assert!(!record.header_fields.contains(""));

        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("").is_none());

        let empty = empty_record(parser.grammar());
        assert!(!empty.header_fields.contains(""));
    }

    #[test]
    fn test_custom_field_overrides_structural_field() {
        let record = parse_conventional("feat: x\n\n-body-\nfrom a field");

        assert_eq!(record.body, None);
        assert_eq!(record.field("body"), Some("from a field"));
    }

    #[test]
    fn test_empty_field_name_closes_capture() {
        let record = parse_conventional("feat: x\n\n-note-\nkept\n--\nback in body");

        assert_eq!(record.field("note"), Some("kept"));
        assert_eq!(record.body.as_deref(), Some("back in body"));
    }

    #[test]
    fn test_field_pattern_disabled() {
        let options = GrammarOptions::conventional().with_field_pattern(None);
        let parser = CommitParser::new(&options).unwrap();
        let record = parser.parse("feat: x\n\n-hash-\nabc").unwrap();

        assert_eq!(record.body.as_deref(), Some("-hash-\nabc"));
        assert!(record.custom_fields.is_empty());
    }

    #[test]
    fn test_breaking_header_pattern() {
        let options = GrammarOptions::conventional()
            .with_header(r"^(\w*)(?:\((.*)\))?!?: (.*)$", &["type", "scope", "subject"])
            .with_breaking_header_pattern(r"^(\w*)(?:\((.*)\))?!: (.*)$");
        let parser = CommitParser::new(&options).unwrap();

        let record = parser.parse("feat(api)!: drop v1 endpoints").unwrap();
        assert_eq!(record.r#type(), Some("feat"));
        assert_eq!(
            record.notes,
            [Note::new("BREAKING CHANGE", "drop v1 endpoints")]
        );

        let record = parser
            .parse("feat(api)!: drop v1\n\nBREAKING CHANGE: see migration guide")
            .unwrap();
        assert_eq!(
            record.notes,
            [Note::new("BREAKING CHANGE", "see migration guide")]
        );

        let record = parser.parse("feat(api): add v2").unwrap();
        assert!(record.notes.is_empty());
    }

    #[test]
    fn test_crlf_message() {
        let record = parse_conventional("feat: x\r\n\r\nbody line\r\n\r\nBREAKING CHANGE: y\r\n");

        assert_eq!(record.body.as_deref(), Some("body line"));
        assert_eq!(record.notes, [Note::new("BREAKING CHANGE", "y")]);
    }

    #[test]
    fn test_serialized_record_is_flat() {
        let record = parse_conventional("feat(parser): add x\n\nCloses #3");
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["type"], "feat");
        assert_eq!(value["scope"], "parser");
        assert_eq!(value["merge"], serde_json::Value::Null);
        assert_eq!(value["body"], serde_json::Value::Null);
        assert_eq!(value["footer"], "Closes #3");
        assert_eq!(value["references"][0]["issue"], "3");
        assert_eq!(value["references"][0]["action"], "Closes");
        assert_eq!(value["mentions"], serde_json::json!([]));
    }

    #[test]
    fn test_parser_is_shareable_across_threads() {
        let parser = CommitParser::conventional();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let parser = parser.clone();
                std::thread::spawn(move || parser.parse(&format!("fix: issue {i}")).unwrap())
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let record = handle.join().unwrap();
            assert_eq!(record.subject(), Some(format!("issue {i}").as_str()));
        }
    }
}
