//! Sequence adapters over the commit parser.
//!
//! [`Records`] parses a pull-based iterator of raw messages; [`channel`]
//! connects an async producer to a parsing consumer through a bounded buffer
//! whose capacity is the high-water mark.

use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::warn;

use commitlore_commit::CommitRecord;
use commitlore_config::GrammarOptions;

use crate::parser::{empty_record, parse};
use crate::{CompiledGrammar, GrammarError, ParseError, ParseResult};

/// Receives the input errors skipped by a lenient sequence.
pub type WarnSink = Box<dyn FnMut(&ParseError) + Send>;

/// How a sequence reacts to an unparsable message.
#[derive(Default)]
pub enum WarnPolicy {
    /// Yield the error and end the sequence.
    #[default]
    Strict,
    /// Report the error to the sink, yield an empty record and continue.
    Lenient(WarnSink),
}

impl WarnPolicy {
    /// A lenient policy reporting to `sink`.
    pub fn lenient(sink: impl FnMut(&ParseError) + Send + 'static) -> Self {
        Self::Lenient(Box::new(sink))
    }

    /// A lenient policy that logs skipped messages as warnings.
    #[must_use]
    pub fn logging() -> Self {
        Self::lenient(|error| warn!(%error, "skipping commit message"))
    }

    /// Returns true if input errors end the sequence.
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Strict)
    }
}

impl fmt::Debug for WarnPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("Strict"),
            Self::Lenient(_) => f.write_str("Lenient(..)"),
        }
    }
}

/// Parses one upstream item. An `Err` always ends the sequence.
fn step(
    raw: &str,
    grammar: &CompiledGrammar,
    policy: &mut WarnPolicy,
) -> ParseResult<CommitRecord> {
    match parse(raw, grammar) {
        Ok(record) => Ok(record),
        Err(error) if error.is_fatal() => Err(error),
        Err(error) => match policy {
            WarnPolicy::Strict => Err(error),
            WarnPolicy::Lenient(sink) => {
                sink(&error);
                Ok(empty_record(grammar))
            }
        },
    }
}

/// A lazy, single-pass sequence of parsed records.
///
/// Each call to `next` pulls exactly one raw message from upstream.
/// After an error is yielded the sequence is exhausted.
pub struct Records<I> {
    upstream: I,
    grammar: Result<Arc<CompiledGrammar>, GrammarError>,
    policy: WarnPolicy,
    done: bool,
}

impl<I> Records<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    /// Creates a strict sequence over `upstream`.
    pub fn new<U>(upstream: U, grammar: Arc<CompiledGrammar>) -> Self
    where
        U: IntoIterator<IntoIter = I>,
    {
        Self {
            upstream: upstream.into_iter(),
            grammar: Ok(grammar),
            policy: WarnPolicy::Strict,
            done: false,
        }
    }

    /// Creates a strict sequence, compiling `options` first.
    ///
    /// A compilation failure is yielded by the first `next` call as
    /// [`ParseError::Configuration`], without pulling from upstream.
    pub fn from_options<U>(upstream: U, options: &GrammarOptions) -> Self
    where
        U: IntoIterator<IntoIter = I>,
    {
        Self {
            upstream: upstream.into_iter(),
            grammar: CompiledGrammar::compile(options).map(Arc::new),
            policy: WarnPolicy::Strict,
            done: false,
        }
    }

    /// Makes the sequence lenient, reporting input errors to `sink`.
    #[must_use]
    pub fn with_warn(self, sink: impl FnMut(&ParseError) + Send + 'static) -> Self {
        self.with_policy(WarnPolicy::lenient(sink))
    }

    /// Replaces the warn policy.
    #[must_use]
    pub fn with_policy(mut self, policy: WarnPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl<I> Iterator for Records<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = ParseResult<CommitRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let grammar = match &self.grammar {
            Ok(grammar) => grammar,
            Err(error) => {
                self.done = true;
                return Some(Err(error.clone().into()));
            }
        };

        let Some(raw) = self.upstream.next() else {
            self.done = true;
            return None;
        };

        let result = step(raw.as_ref(), grammar, &mut self.policy);
        self.done = result.is_err();
        Some(result)
    }
}

impl<I> FusedIterator for Records<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
}

impl<I> fmt::Debug for Records<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Records")
            .field("policy", &self.policy)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

/// The consumer of a record stream has gone away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("record stream closed")]
pub struct StreamClosed;

/// Creates a bounded raw-message channel and its parsing consumer.
///
/// At most `capacity` raw messages wait unparsed; beyond that
/// [`RawSender::send`] suspends until the consumer catches up.
///
/// # Errors
///
/// Returns [`GrammarError::InvalidCapacity`] if `capacity` is zero.
pub fn channel(
    grammar: Arc<CompiledGrammar>,
    capacity: usize,
    policy: WarnPolicy,
) -> Result<(RawSender, RecordStream), GrammarError> {
    if capacity == 0 {
        return Err(GrammarError::InvalidCapacity);
    }

    let (tx, rx) = mpsc::channel(capacity);
    Ok((
        RawSender { tx },
        RecordStream {
            rx,
            grammar,
            policy,
            done: false,
        },
    ))
}

/// Producer half of [`channel`].
#[derive(Debug, Clone)]
pub struct RawSender {
    tx: mpsc::Sender<String>,
}

impl RawSender {
    /// Queues a raw message, waiting while the buffer is full.
    ///
    /// # Errors
    ///
    /// Returns [`StreamClosed`] once the [`RecordStream`] is closed or dropped.
    pub async fn send(&self, raw: impl Into<String>) -> Result<(), StreamClosed> {
        self.tx.send(raw.into()).await.map_err(|_| StreamClosed)
    }

    /// Number of messages that can be queued without waiting.
    pub fn capacity(&self) -> usize {
        self.tx.capacity()
    }

    /// Returns true if the consumer has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half of [`channel`]; parses messages as they are pulled.
#[derive(Debug)]
pub struct RecordStream {
    rx: mpsc::Receiver<String>,
    grammar: Arc<CompiledGrammar>,
    policy: WarnPolicy,
    done: bool,
}

impl RecordStream {
    /// Parses the next queued message.
    ///
    /// Returns `None` once every sender is dropped and the buffer is
    /// drained, or after an error has been returned.
    pub async fn next(&mut self) -> Option<ParseResult<CommitRecord>> {
        if self.done {
            return None;
        }

        let Some(raw) = self.rx.recv().await else {
            self.done = true;
            return None;
        };

        let result = step(&raw, &self.grammar, &mut self.policy);
        if result.is_err() {
            self.close();
        }
        Some(result)
    }

    /// Stops accepting messages; queued messages are dropped unparsed.
    pub fn close(&mut self) {
        self.done = true;
        self.rx.close();
    }
}
