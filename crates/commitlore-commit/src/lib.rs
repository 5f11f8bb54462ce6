//! Commit record types for Commitlore.
//!
//! This crate provides the output side of the commit grammar:
//! - [`CommitRecord`]: A commit message after parsing
//! - [`Note`]: A labeled footer annotation such as `BREAKING CHANGE`
//! - [`Reference`]: An issue or pull request mentioned by the message
//! - [`RevertInfo`]: What a revert commit reverts
//! - [`Fields`]: Ordered name/value pairs used for correspondence and custom fields

mod fields;
mod note;
mod record;
mod reference;
mod revert;

pub use fields::Fields;
pub use note::Note;
pub use record::{CommitRecord, CommitRecordBuilder, FIELD_PRECEDENCE, FieldLayer, FieldValue};
pub use reference::Reference;
pub use revert::RevertInfo;
