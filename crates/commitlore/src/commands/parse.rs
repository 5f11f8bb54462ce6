//! Parse command.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;
use tracing::{debug, info};

use commitlore_config::{
    Config, ConfigError, GrammarOptions, find_and_load_config, load_config, split_list,
};
use commitlore_core::{CommitRecord, CompiledGrammar, WarnPolicy, channel};

/// Arguments for parsing commit messages.
#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Files holding commit messages (reads stdin when omitted)
    pub files: Vec<PathBuf>,

    /// Configuration file (default: nearest commitlore.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Separator between messages in the input
    #[arg(short, long)]
    pub separator: Option<String>,

    /// Maximum number of messages buffered ahead of the parser
    #[arg(long)]
    pub high_water_mark: Option<usize>,

    /// Warn about empty messages instead of failing
    #[arg(long)]
    pub lenient: bool,

    #[command(flatten)]
    pub grammar: GrammarArgs,
}

/// Grammar overrides; each one replaces the configured value.
#[derive(Debug, Default, Args)]
pub struct GrammarArgs {
    /// Header pattern
    #[arg(short = 'p', long)]
    pub header_pattern: Option<String>,

    /// Comma-separated field names of the header pattern groups
    #[arg(short = 'c', long)]
    pub header_correspondence: Option<String>,

    /// Comma-separated reference action keywords
    #[arg(short = 'r', long)]
    pub reference_actions: Option<String>,

    /// Comma-separated issue prefixes
    #[arg(short = 'i', long)]
    pub issue_prefixes: Option<String>,

    /// Match issue prefixes case-sensitively
    #[arg(long)]
    pub issue_prefixes_case_sensitive: bool,

    /// Comma-separated note keywords
    #[arg(short = 'n', long)]
    pub note_keywords: Option<String>,

    /// Custom field pattern (empty disables custom fields)
    #[arg(short = 'f', long)]
    pub field_pattern: Option<String>,

    /// Revert pattern
    #[arg(long)]
    pub revert_pattern: Option<String>,

    /// Comma-separated field names of the revert pattern groups
    #[arg(long)]
    pub revert_correspondence: Option<String>,

    /// Merge pattern
    #[arg(long)]
    pub merge_pattern: Option<String>,

    /// Comma-separated field names of the merge pattern groups
    #[arg(long)]
    pub merge_correspondence: Option<String>,

    /// Lines starting with this character are ignored
    #[arg(long)]
    pub comment_char: Option<char>,

    /// Pattern flagging a breaking change in the header
    #[arg(long)]
    pub breaking_header_pattern: Option<String>,
}

impl GrammarArgs {
    /// Applies the given overrides on top of `options`.
    pub fn apply(&self, options: &mut GrammarOptions) {
        if let Some(pattern) = &self.header_pattern {
            options.header_pattern.clone_from(pattern);
        }
        if let Some(names) = &self.header_correspondence {
            options.header_correspondence = split_list(names);
        }
        if let Some(actions) = &self.reference_actions {
            options.reference_actions = split_list(actions);
        }
        if let Some(prefixes) = &self.issue_prefixes {
            options.issue_prefixes = split_list(prefixes);
        }
        if self.issue_prefixes_case_sensitive {
            options.issue_prefixes_case_sensitive = true;
        }
        if let Some(keywords) = &self.note_keywords {
            options.note_keywords = split_list(keywords);
        }
        if let Some(pattern) = &self.field_pattern {
            options.field_pattern = Some(pattern.clone());
        }
        if let Some(pattern) = &self.revert_pattern {
            options.revert_pattern.clone_from(pattern);
        }
        if let Some(names) = &self.revert_correspondence {
            options.revert_correspondence = split_list(names);
        }
        if let Some(pattern) = &self.merge_pattern {
            options.merge_pattern = Some(pattern.clone());
        }
        if let Some(names) = &self.merge_correspondence {
            options.merge_correspondence = split_list(names);
        }
        if let Some(comment_char) = self.comment_char {
            options.comment_char = Some(comment_char);
        }
        if let Some(pattern) = &self.breaking_header_pattern {
            options.breaking_header_pattern = Some(pattern.clone());
        }
    }
}

/// Runs the parse command.
pub fn run(args: ParseArgs) -> Result<()> {
    let mut config = load(args.config.as_ref())?;
    args.grammar.apply(&mut config.grammar);

    let separator = args.separator.unwrap_or(config.stream.separator);
    if separator.is_empty() {
        bail!("separator must not be empty");
    }
    let high_water_mark = args.high_water_mark.unwrap_or(config.stream.high_water_mark);

    let grammar = CompiledGrammar::compile(&config.grammar).context("invalid grammar")?;
    let messages = read_messages(&args.files, &separator)?;
    info!(count = messages.len(), "read commit messages");

    let rt = tokio::runtime::Runtime::new().context("failed to create async runtime")?;
    let records = rt.block_on(parse_all(
        Arc::new(grammar),
        messages,
        high_water_mark,
        args.lenient,
    ))?;

    let json = serde_json::to_string_pretty(&records).context("failed to serialize records")?;
    println!("{json}");

    Ok(())
}

fn load(path: Option<&PathBuf>) -> Result<Config> {
    if let Some(path) = path {
        return load_config(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()));
    }

    match find_and_load_config() {
        Ok(config) => Ok(config),
        Err(ConfigError::NotFound(_)) => {
            debug!("no configuration file found, using defaults");
            Ok(Config::default())
        }
        Err(err) => Err(err).context("failed to load configuration"),
    }
}

fn read_messages(files: &[PathBuf], separator: &str) -> Result<Vec<String>> {
    if files.is_empty() {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("failed to read stdin")?;
        return Ok(split_messages(&input, separator));
    }

    let mut messages = Vec::new();
    for path in files {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        messages.extend(split_messages(&content, separator));
    }
    Ok(messages)
}

/// Splits `input` on `separator`; a blank final piece is dropped.
fn split_messages(input: &str, separator: &str) -> Vec<String> {
    let mut messages: Vec<String> = input.split(separator).map(String::from).collect();
    if messages.last().is_some_and(|last| last.trim().is_empty()) {
        messages.pop();
    }
    messages
}

/// Feeds `messages` through a bounded channel from a producer task.
async fn parse_all(
    grammar: Arc<CompiledGrammar>,
    messages: Vec<String>,
    high_water_mark: usize,
    lenient: bool,
) -> Result<Vec<CommitRecord>> {
    let policy = if lenient {
        WarnPolicy::logging()
    } else {
        WarnPolicy::Strict
    };
    let (sender, mut stream) =
        channel(grammar, high_water_mark, policy).context("invalid high-water mark")?;

    let producer = tokio::spawn(async move {
        for raw in messages {
            if sender.send(raw).await.is_err() {
                break;
            }
        }
    });

    let mut records = Vec::new();
    while let Some(result) = stream.next().await {
        let position = records.len() + 1;
        let record =
            result.with_context(|| format!("failed to parse commit message #{position}"))?;
        records.push(record);
    }

    producer.await.context("message producer failed")?;
    Ok(records)
}
