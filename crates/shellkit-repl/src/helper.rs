//! rustyline integration: completion and syntax highlighting driven by
//! the kernel's registry notifications.
//!
//! The kernel knows which commands and variables exist but owns no
//! terminal logic; this module subscribes to registry changes through
//! [`RegistryObserver`] and keeps the editor's completion tables in
//! sync. Highlighting reuses the kernel's token scanner for the
//! argument tail, with the leading command word classified against the
//! live command table.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use shellkit_kernel::{scan_for_highlight, CompletionHint, RegistryObserver, TokenCategory};

const CONTROL_KEYWORDS: [&str; 6] = ["if", "elif", "else", "while", "endif", "endwhile"];

#[derive(Default)]
struct Tables {
    commands: BTreeMap<String, CompletionHint>,
    variables: BTreeSet<String>,
}

/// Kernel-side subscriber feeding the editor's tables.
pub struct CompletionSync {
    tables: Arc<Mutex<Tables>>,
}

impl RegistryObserver for CompletionSync {
    fn command_added(&self, name: &str, hint: &CompletionHint) {
        if let Ok(mut tables) = self.tables.lock() {
            tables.commands.insert(name.to_string(), hint.clone());
        }
    }

    fn variable_added(&self, name: &str) {
        if let Ok(mut tables) = self.tables.lock() {
            tables.variables.insert(name.to_string());
        }
    }

    fn variable_removed(&self, name: &str) {
        if let Ok(mut tables) = self.tables.lock() {
            tables.variables.remove(name);
        }
    }
}

/// The rustyline helper: completer, highlighter, and no-op hinter and
/// validator.
pub struct ShellHelper {
    tables: Arc<Mutex<Tables>>,
    files: FilenameCompleter,
}

impl ShellHelper {
    /// Build the helper together with the observer to hang on the
    /// session.
    pub fn new() -> (Self, Arc<CompletionSync>) {
        let tables = Arc::new(Mutex::new(Tables::default()));
        let observer = Arc::new(CompletionSync {
            tables: Arc::clone(&tables),
        });
        (
            Self {
                tables,
                files: FilenameCompleter::new(),
            },
            observer,
        )
    }

    fn complete_word(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let before = &line[..pos];
        let start = before
            .rfind(char::is_whitespace)
            .map(|i| i + 1)
            .unwrap_or(0);
        let word = &before[start..];

        // Variable references complete anywhere in the line.
        if let Some(prefix) = word.strip_prefix("${") {
            return Ok((start, self.variable_candidates(prefix, true)));
        }
        if let Some(prefix) = word.strip_prefix('$') {
            return Ok((start, self.variable_candidates(prefix, false)));
        }

        let first_word_ends = before[..start].trim().is_empty();
        if first_word_ends {
            // Completing the command position.
            let tables = match self.tables.lock() {
                Ok(tables) => tables,
                Err(_) => return Ok((start, Vec::new())),
            };
            let candidates = tables
                .commands
                .keys()
                .map(String::as_str)
                .chain(CONTROL_KEYWORDS)
                .filter(|name| name.starts_with(word))
                .map(|name| Pair {
                    display: name.to_string(),
                    replacement: name.to_string(),
                })
                .collect();
            return Ok((start, candidates));
        }

        // Argument position: defer to the command's hint.
        let command = line.split_whitespace().next().unwrap_or("");
        let hint = self
            .tables
            .lock()
            .ok()
            .and_then(|tables| tables.commands.get(command).cloned())
            .unwrap_or_default();
        match hint {
            CompletionHint::None => Ok((start, Vec::new())),
            CompletionHint::Words(words) => {
                let candidates = words
                    .iter()
                    .filter(|w| w.starts_with(word))
                    .map(|w| Pair {
                        display: w.clone(),
                        replacement: w.clone(),
                    })
                    .collect();
                Ok((start, candidates))
            }
            CompletionHint::FileExt(ext) => {
                let (file_start, mut candidates) = self.files.complete(line, pos, ctx)?;
                candidates.retain(|pair| {
                    pair.replacement.ends_with(&ext) || pair.replacement.ends_with('/')
                });
                Ok((file_start, candidates))
            }
        }
    }

    fn variable_candidates(&self, prefix: &str, braced: bool) -> Vec<Pair> {
        let Ok(tables) = self.tables.lock() else {
            return Vec::new();
        };
        tables
            .variables
            .iter()
            .filter(|name| name.starts_with(prefix))
            .map(|name| {
                let replacement = if braced {
                    format!("${{{name}}}")
                } else {
                    format!("${name}")
                };
                Pair {
                    display: name.clone(),
                    replacement,
                }
            })
            .collect()
    }

    fn command_color(&self, word: &str) -> Option<&'static str> {
        if CONTROL_KEYWORDS.contains(&word) {
            return Some(ANSI_KEYWORD);
        }
        let known = self
            .tables
            .lock()
            .map(|tables| tables.commands.contains_key(word))
            .unwrap_or(false);
        known.then_some(ANSI_COMMAND)
    }
}

const ANSI_RESET: &str = "\x1b[0m";
const ANSI_COMMAND: &str = "\x1b[1;32m";
const ANSI_KEYWORD: &str = "\x1b[1;35m";

fn category_color(category: TokenCategory) -> Option<&'static str> {
    match category {
        TokenCategory::Keyword => Some(ANSI_KEYWORD),
        TokenCategory::Operator => Some("\x1b[1m"),
        TokenCategory::String => Some("\x1b[32m"),
        TokenCategory::Number => Some("\x1b[33m"),
        TokenCategory::Variable => Some("\x1b[36m"),
        TokenCategory::Punctuation => None,
        TokenCategory::Error => Some("\x1b[31m"),
    }
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        self.complete_word(line, pos, ctx)
    }
}

impl Highlighter for ShellHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let trimmed = line.trim_start();
        let Some(word) = trimmed.split_whitespace().next() else {
            return Cow::Borrowed(line);
        };
        let word_start = line.len() - trimmed.len();
        let word_end = word_start + word.len();

        let mut out = String::with_capacity(line.len() + 16);
        out.push_str(&line[..word_start]);
        match self.command_color(word) {
            Some(color) => {
                out.push_str(color);
                out.push_str(word);
                out.push_str(ANSI_RESET);
            }
            None => out.push_str(word),
        }

        // The tail is expression-ish text for most commands; the
        // kernel's scanner classifies it token by token.
        let rest = &line[word_end..];
        let mut cursor = 0;
        for (category, span) in scan_for_highlight(rest) {
            out.push_str(&rest[cursor..span.start]);
            match category_color(category) {
                Some(color) => {
                    out.push_str(color);
                    out.push_str(&rest[span.start..span.end]);
                    out.push_str(ANSI_RESET);
                }
                None => out.push_str(&rest[span.start..span.end]),
            }
            cursor = span.end;
        }
        out.push_str(&rest[cursor..]);
        Cow::Owned(out)
    }

    fn highlight_char(&self, line: &str, _pos: usize, _kind: CmdKind) -> bool {
        !line.is_empty()
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}
