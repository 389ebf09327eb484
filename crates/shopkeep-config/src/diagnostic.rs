// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! miette diagnostics for `shopkeep.toml` problems.
//!
//! Every section of the model has defaults, so extraction can only fail on a
//! key that does not exist or a value of the wrong shape. Both are pointed at
//! in the file that supplied them.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a valid key needs before it is offered as a fix.
const SUGGESTION_THRESHOLD: f64 = 0.75;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key that no section of `ShopConfig` declares.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(shopkeep::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        /// Keys the enclosing table accepts, comma separated.
        valid_keys: String,
        #[label("not a shopkeep setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A known key whose value could not be deserialized.
    #[error("bad value for `{key}`: {detail}")]
    #[diagnostic(code(shopkeep::config::bad_value))]
    BadValue {
        /// Dotted path, e.g. `gateway.port`.
        key: String,
        detail: String,
        #[label("{detail}")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// The file parsed but a value failed a semantic check.
    #[error("validation error: {message}")]
    #[diagnostic(code(shopkeep::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(shopkeep::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// The TOML texts that fed a figment, as `(display name, content)` pairs.
struct Sources<'a>(&'a [(String, String)]);

impl<'a> Sources<'a> {
    /// The source an error came from. Inline strings carry no file metadata,
    /// so a lone source is assumed to be the culprit.
    fn origin_of(&self, error: &figment::error::Error) -> Option<&'a (String, String)> {
        let file = error
            .metadata
            .as_ref()
            .and_then(|m| m.source.as_ref())
            .and_then(|s| match s {
                figment::Source::File(path) => Some(path.display().to_string()),
                _ => None,
            });
        match file {
            Some(path) => self.0.iter().find(|(name, _)| *name == path),
            None if self.0.len() == 1 => self.0.first(),
            None => None,
        }
    }

    /// Span of `key` inside `table` in the originating file.
    fn span(
        &self,
        error: &figment::error::Error,
        table: &[String],
        key: &str,
    ) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
        let Some((name, content)) = self.origin_of(error) else {
            return (None, None);
        };
        match key_offset(content, table, key) {
            Some(at) => (
                Some(SourceSpan::new(at.into(), key.len())),
                Some(NamedSource::new(name, content.clone())),
            ),
            None => (None, None),
        }
    }
}

/// Convert a `figment::Error` (which may hold several errors) into diagnostics.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    let sources = Sources(toml_sources);
    err.into_iter()
        .map(|error| {
            let path: Vec<String> = error.path.to_vec();
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    // The error path names the table that rejected the field.
                    let (span, src) = sources.span(&error, &path, field);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        suggestion: suggest_key(field, expected),
                        valid_keys: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::InvalidType(..) | Kind::InvalidValue(..) => {
                    // Here the path ends with the offending key itself.
                    let (span, src) = match path.split_last() {
                        Some((key, table)) => sources.span(&error, table, key),
                        None => (None, None),
                    };
                    ConfigError::BadValue {
                        key: path.join("."),
                        detail: error.kind.to_string(),
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// Byte offset of `key` declared directly under the `[table]` header.
///
/// Lines are scanned while tracking the current header, so `[a.b]` tables
/// and keys repeated in other tables are told apart. An empty `table` means
/// the root, before any header.
pub fn key_offset(content: &str, table: &[String], key: &str) -> Option<usize> {
    let wanted = table.join(".");
    let mut current = String::new();
    let mut at = 0;

    for line in content.split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        let body = line.trim();

        if let Some(header) = body.strip_prefix('[').and_then(|h| h.split(']').next()) {
            current = header.trim().to_string();
        } else if current == wanted {
            let declared = body
                .split_once('=')
                .map(|(lhs, _)| lhs.trim().trim_matches('"'));
            if declared == Some(key) {
                return Some(at + indent + usize::from(body.starts_with('"')));
            }
        }
        at += line.len();
    }

    None
}

/// The valid key closest to `unknown`, if any clears the threshold.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|&key| (key, strsim::jaro_winkler(unknown, key)))
        .filter(|(_, score)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(key, _)| key.to_string())
}

/// Print each error to stderr, falling back to plain text if miette fails.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}
