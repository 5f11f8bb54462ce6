//! Commit message grammar for Commitlore.
//!
//! This crate turns free-text commit messages into [`CommitRecord`]s:
//! - [`CompiledGrammar`]: matchers built once from [`GrammarOptions`]
//! - [`parse`] / [`CommitParser`]: the pure message parser
//! - [`scan_references`]: issue reference extraction for any span of text
//! - [`Records`] and [`channel`]: sequence adapters with per-item failure isolation

mod error;
mod grammar;
mod lines;
mod parser;
mod references;
mod stream;

pub use commitlore_commit::{CommitRecord, Fields, Note, Reference, RevertInfo};
pub use commitlore_config::GrammarOptions;
pub use error::{GrammarError, ParseError, ParseResult};
pub use grammar::{CompiledGrammar, Matcher};
pub use lines::{SCISSOR_LINE, message_lines};
pub use parser::{CommitParser, empty_record, parse};
pub use references::scan as scan_references;
pub use stream::{
    RawSender, RecordStream, Records, StreamClosed, WarnPolicy, WarnSink, channel,
};
