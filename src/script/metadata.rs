/// Inline script metadata parser
///
/// Recovers the dependency list from a `// /// script` ... `// ///` comment
/// block and returns the script body with that block and a leading `#!` line removed.
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::error::ScriptError;

/// Opening marker line (compared after trimming)
pub const BLOCK_OPEN: &str = "// /// script";
/// Closing marker line (compared after trimming)
pub const BLOCK_CLOSE: &str = "// ///";

const COMMENT_PREFIX: &str = "//";
const SHEBANG_PREFIX: &str = "#!";
const DEPENDENCIES_KEY: &str = "dependencies";

/// Metadata declared by a script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptMetadata {
    /// Dependency references (`module` or `module@version`) in source order
    pub dependencies: Vec<String>,
}

/// A script split into its metadata and executable body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedScript {
    pub metadata: ScriptMetadata,
    pub body: String,
}

/// Parser behaviour knobs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Reject unterminated blocks and dependency lists instead of ignoring them
    pub strict: bool,
}

/// Metadata that could not be interpreted (only reported in strict mode)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedMetadata {
    pub line: usize,
    pub message: String,
}

enum ScanState {
    Outside,
    Inside { opened_at: usize, lines: Vec<String> },
    Done,
}

enum DependencyList<'a> {
    Missing,
    Unclosed,
    Found(&'a str),
}

/// Read and parse a script file
pub fn parse_script(path: &Path, options: ParseOptions) -> Result<ParsedScript, ScriptError> {
    let source = fs::read_to_string(path).map_err(|source| ScriptError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_source(&source, options).map_err(|malformed| ScriptError::Metadata {
        path: path.to_path_buf(),
        line: malformed.line,
        message: malformed.message,
    })
}

/// Parse script text already in memory
///
/// Only the first metadata block is interpreted. Marker lines appearing after
/// it are ordinary comments and stay in the body.
pub fn parse_source(source: &str, options: ParseOptions) -> Result<ParsedScript, MalformedMetadata> {
    let mut state = ScanState::Outside;
    let mut metadata = ScriptMetadata::default();
    let mut body = String::with_capacity(source.len());

    for (idx, raw) in source.split_inclusive('\n').enumerate() {
        let line_no = idx + 1;
        let trimmed = strip_terminator(raw).trim();

        // Only the interpreter line; `#!` later on belongs to the program
        if line_no == 1 && raw.starts_with(SHEBANG_PREFIX) {
            continue;
        }

        state = match state {
            ScanState::Outside if trimmed == BLOCK_OPEN => ScanState::Inside {
                opened_at: line_no,
                lines: Vec::new(),
            },
            ScanState::Outside => {
                body.push_str(raw);
                ScanState::Outside
            }
            ScanState::Inside { opened_at, lines } if trimmed == BLOCK_CLOSE => {
                metadata.dependencies = extract_dependencies(&lines.join("\n"), opened_at, options)?;
                debug!(
                    line = line_no,
                    dependency_count = metadata.dependencies.len(),
                    "metadata block closed"
                );
                ScanState::Done
            }
            // A repeated open marker inside the block is dropped
            ScanState::Inside { opened_at, lines } if trimmed == BLOCK_OPEN => {
                ScanState::Inside { opened_at, lines }
            }
            ScanState::Inside {
                opened_at,
                mut lines,
            } => {
                let content = trimmed
                    .strip_prefix(COMMENT_PREFIX)
                    .unwrap_or(trimmed)
                    .trim();
                if !content.is_empty() {
                    lines.push(content.to_string());
                }
                ScanState::Inside { opened_at, lines }
            }
            ScanState::Done => {
                body.push_str(raw);
                ScanState::Done
            }
        };
    }

    if let ScanState::Inside { opened_at, .. } = state {
        if options.strict {
            return Err(MalformedMetadata {
                line: opened_at,
                message: format!("metadata block opened here is never closed with '{BLOCK_CLOSE}'"),
            });
        }
        warn!(
            line = opened_at,
            "metadata block is never closed; ignoring declared dependencies"
        );
    }

    Ok(ParsedScript { metadata, body })
}

/// Extract `dependencies = [ ... ]` from the joined block text
fn extract_dependencies(
    text: &str,
    opened_at: usize,
    options: ParseOptions,
) -> Result<Vec<String>, MalformedMetadata> {
    let contents = match locate_dependency_list(text) {
        DependencyList::Found(contents) => contents,
        DependencyList::Missing => return Ok(Vec::new()),
        DependencyList::Unclosed if options.strict => {
            return Err(MalformedMetadata {
                line: opened_at,
                message: "dependency list is missing its closing ']'".to_string(),
            });
        }
        DependencyList::Unclosed => {
            warn!(line = opened_at, "dependency list is never closed; ignoring it");
            return Ok(Vec::new());
        }
    };

    Ok(contents
        .split(',')
        .map(|piece| unquote(piece.trim()))
        .filter(|dep| !dep.trim().is_empty())
        .map(str::to_string)
        .collect())
}

fn locate_dependency_list(text: &str) -> DependencyList<'_> {
    for (start, _) in text.match_indices(DEPENDENCIES_KEY) {
        // Skip keys that merely end in "dependencies" (e.g. dev-dependencies)
        let preceded_by_word = text[..start]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '-');
        if preceded_by_word {
            continue;
        }

        let rest = text[start + DEPENDENCIES_KEY.len()..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else {
            continue;
        };
        let Some(contents) = rest.trim_start().strip_prefix('[') else {
            continue;
        };

        return match closing_bracket(contents).or_else(|| unbalanced_quote_fallback(contents)) {
            Some(end) => DependencyList::Found(&contents[..end]),
            None => DependencyList::Unclosed,
        };
    }

    DependencyList::Missing
}

/// Byte offset of the `]` that closes an already-opened list
fn closing_bracket(contents: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (idx, ch) in contents.char_indices() {
        match (quote, ch) {
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') if depth == 0 => return Some(idx),
            (None, ']') => depth -= 1,
            _ => {}
        }
    }

    None
}

/// A stray quote hides every later `]`; close at the first one instead
fn unbalanced_quote_fallback(contents: &str) -> Option<usize> {
    let end = contents.find(']')?;
    warn!("unbalanced quote in dependency list; closing it at the first ']'");
    Some(end)
}

/// Remove one layer of surrounding quotes
fn unquote(piece: &str) -> &str {
    let piece = piece.strip_prefix(['"', '\'']).unwrap_or(piece);
    piece.strip_suffix(['"', '\'']).unwrap_or(piece)
}

fn strip_terminator(raw: &str) -> &str {
    match raw.strip_suffix('\n') {
        Some(line) => line.strip_suffix('\r').unwrap_or(line),
        None => raw,
    }
}
