//! Dictionary: symbol tables plus the constraint graph over them.
//!
//! ## Constraints format
//!
//! Alternating non-blank lines: a single source character, then a line whose
//! characters (whitespace ignored) are the permitted targets for it.
//!
//! ```text
//! 1
//! tdт
//! 2
//! nн
//! ```
//!
//! ## Serialized format
//!
//! ```text
//! # mnemonic-kernel dictionary v1
//! # sha256 <hex digest of the body>
//! 1 td
//! 2 n
//! ```
//!
//! One body line per source, in handle order, with targets sorted by text.
//! Only the exact header line and the `# sha256 ` line are metadata, so `#`
//! is a valid source symbol. The digest line is optional when reading; when
//! present it must match the body.

use std::fmt;
use tracing::info;

use crate::canonical_content::{normalize_text, validate_content_hash, compute_content_hash, HashValidation};
use crate::frequency::FrequencyModel;
use crate::graph::ConstraintGraph;
use crate::types::{SourceId, SymbolTable, TargetId};

/// Header line of the serialized dictionary format.
pub const DICTIONARY_HEADER: &str = "# mnemonic-kernel dictionary v1";

const DIGEST_PREFIX: &str = "# sha256 ";

/// Error type for dictionary parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DictionaryError {
    /// A source line does not hold exactly one character.
    #[error("Line {line}: source must be a single character, got {token:?}")]
    MalformedSource {
        /// 1-based line number.
        line: usize,
        /// Offending line content.
        token: String,
    },
    /// A source line is not followed by a target line.
    #[error("Line {line}: source {symbol:?} has no target line")]
    DanglingSource {
        /// 1-based line number of the source.
        line: usize,
        /// Source symbol text.
        symbol: String,
    },
    /// A serialized entry has no targets.
    #[error("Line {line}: entry has no targets")]
    EmptyTargets {
        /// 1-based line number.
        line: usize,
    },
    /// The stored digest does not match the body.
    #[error("Dictionary digest mismatch: expected {expected}, computed {computed}")]
    HashMismatch {
        /// Digest stored in the file.
        expected: String,
        /// Digest of the body as read.
        computed: String,
    },
}

/// Source and target symbol tables with the constraint graph over them.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    sources: SymbolTable<SourceId>,
    targets: SymbolTable<TargetId>,
    graph: ConstraintGraph,
}

impl Dictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Source symbol table.
    pub fn sources(&self) -> &SymbolTable<SourceId> {
        &self.sources
    }

    /// Target symbol table.
    pub fn targets(&self) -> &SymbolTable<TargetId> {
        &self.targets
    }

    /// Current constraint graph.
    pub fn graph(&self) -> &ConstraintGraph {
        &self.graph
    }

    /// Replace the graph, e.g. with a resolved one.
    ///
    /// The new graph must use handles from this dictionary's tables.
    pub fn set_graph(&mut self, graph: ConstraintGraph) {
        self.graph = graph;
    }

    /// Load equality constraints, returning the number of edges read.
    pub fn load_constraints(&mut self, text: &str) -> Result<usize, DictionaryError> {
        let mut pending: Option<(usize, SourceId)> = None;
        let mut count = 0;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            match pending.take() {
                None => {
                    let mut chars = line.chars();
                    let (Some(c), None) = (chars.next(), chars.next()) else {
                        return Err(DictionaryError::MalformedSource {
                            line: line_no,
                            token: line.to_string(),
                        });
                    };
                    pending = Some((line_no, self.sources.add_char(c)));
                }
                Some((_, source)) => {
                    for c in line.chars().filter(|c| !c.is_whitespace()) {
                        let target = self.targets.add_char(c);
                        self.graph.insert(source, target);
                        count += 1;
                    }
                }
            }
        }

        if let Some((line, source)) = pending {
            return Err(DictionaryError::DanglingSource {
                line,
                symbol: self.sources.text(source).to_string(),
            });
        }

        info!(
            constraints = count,
            sources = self.graph.num_sources(),
            targets = self.targets.len(),
            "Loaded equality constraints"
        );
        Ok(count)
    }

    /// Build the frequency model of this dictionary's targets from a corpus.
    pub fn frequency_model(&self, corpus: &str) -> FrequencyModel {
        FrequencyModel::from_corpus(corpus, &self.targets)
    }

    /// Encode text as source symbols, one per character.
    ///
    /// Characters never seen before are interned as new source symbols.
    pub fn encode(&mut self, text: &str) -> Vec<SourceId> {
        text.chars().map(|c| self.sources.add_char(c)).collect()
    }

    /// Render encoded symbols through the current mapping.
    ///
    /// A source with one target renders as that target, several targets as
    /// `{abc}`, and a source without targets as its own text.
    pub fn spell(&self, encoded: &[SourceId]) -> String {
        let mut out = String::new();
        for source in encoded {
            match self.graph.targets(*source).filter(|set| !set.is_empty()) {
                Some(set) if set.len() == 1 => {
                    set.iter().for_each(|t| out.push_str(self.targets.text(*t)));
                }
                Some(set) => {
                    out.push('{');
                    set.iter().for_each(|t| out.push_str(self.targets.text(*t)));
                    out.push('}');
                }
                None => out.push_str(self.sources.text(*source)),
            }
        }
        out
    }

    /// Targets of a source, concatenated in handle order.
    pub fn target_string(&self, source: SourceId) -> String {
        self.graph
            .targets(source)
            .map(|set| set.iter().map(|t| self.targets.text(*t)).collect())
            .unwrap_or_default()
    }

    /// Serialize the mapping to the dictionary text format.
    pub fn to_text(&self) -> String {
        let body = self.body();
        format!(
            "{}\n{}{}\n{}",
            DICTIONARY_HEADER,
            DIGEST_PREFIX,
            compute_content_hash(&body),
            body
        )
    }

    /// Parse a dictionary from the text format.
    pub fn from_text(text: &str) -> Result<Self, DictionaryError> {
        let mut digest: Option<&str> = None;
        let mut body_lines: Vec<(usize, &str)> = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if line == DICTIONARY_HEADER {
                continue;
            }
            if let Some(d) = line.strip_prefix(DIGEST_PREFIX) {
                digest = Some(d.trim());
                continue;
            }
            body_lines.push((idx + 1, line));
        }

        let body: String = body_lines.iter().map(|(_, l)| format!("{}\n", l)).collect();
        if let HashValidation::Mismatch { expected, computed } = validate_content_hash(&body, digest) {
            return Err(DictionaryError::HashMismatch { expected, computed });
        }

        let mut dictionary = Self::new();
        for (line_no, line) in body_lines {
            let mut chars = line.chars();
            let source_char = chars.next().ok_or(DictionaryError::EmptyTargets { line: line_no })?;
            let rest = chars.as_str();
            if rest.trim().is_empty() {
                return Err(DictionaryError::EmptyTargets { line: line_no });
            }
            if !rest.starts_with(char::is_whitespace) {
                return Err(DictionaryError::MalformedSource {
                    line: line_no,
                    token: line.split_whitespace().next().unwrap_or(line).to_string(),
                });
            }

            let source = dictionary.sources.add_char(source_char);
            for c in rest.chars().filter(|c| !c.is_whitespace()) {
                let target = dictionary.targets.add_char(c);
                dictionary.graph.insert(source, target);
            }
        }
        Ok(dictionary)
    }

    fn body(&self) -> String {
        let mut body = String::new();
        for (source, targets) in self.graph.iter() {
            let mut names: Vec<&str> = targets.iter().map(|t| self.targets.text(*t)).collect();
            names.sort_unstable();
            body.push_str(self.sources.text(source));
            body.push(' ');
            body.push_str(&names.concat());
            body.push('\n');
        }
        normalize_text(&body) + "\n"
    }
}

impl fmt::Display for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (source, targets) in self.graph.iter() {
            let names: Vec<&str> = targets.iter().map(|t| self.targets.text(*t)).collect();
            writeln!(f, "{} = [{}]", self.sources.text(source), names.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(text: &str) -> Dictionary {
        let mut dictionary = Dictionary::new();
        dictionary.load_constraints(text).unwrap();
        dictionary
    }

    #[test]
    fn test_load_constraints() {
        let mut dictionary = Dictionary::new();
        let count = dictionary.load_constraints("1\nab\n\n2\nb c\n").unwrap();

        assert_eq!(count, 4);
        assert_eq!(dictionary.sources().len(), 2);
        assert_eq!(dictionary.targets().len(), 3);
        let two = dictionary.sources().find("2").unwrap();
        assert_eq!(dictionary.target_string(two), "bc");
    }

    #[test]
    fn test_load_non_latin_constraints() {
        let dictionary = loaded("1\nжш\n");
        let one = dictionary.sources().find("1").unwrap();
        assert_eq!(dictionary.graph().targets(one).unwrap().len(), 2);
        assert!(dictionary.targets().find("ж").is_some());
    }

    #[test]
    fn test_multi_char_source_is_malformed() {
        let mut dictionary = Dictionary::new();
        let err = dictionary.load_constraints("12\nab\n").unwrap_err();
        assert_eq!(
            err,
            DictionaryError::MalformedSource { line: 1, token: "12".to_string() }
        );
    }

    #[test]
    fn test_dangling_source() {
        let mut dictionary = Dictionary::new();
        let err = dictionary.load_constraints("1\nab\n2\n").unwrap_err();
        assert_eq!(
            err,
            DictionaryError::DanglingSource { line: 3, symbol: "2".to_string() }
        );
    }

    #[test]
    fn test_encode_returns_symbols_in_order() {
        let mut dictionary = loaded("1\na\n2\nb\n3\nc\n");
        let expected: Vec<_> = ["1", "2", "3"]
            .iter()
            .map(|s| dictionary.sources().find(s).unwrap())
            .collect();

        assert_eq!(dictionary.encode("123"), expected);
    }

    #[test]
    fn test_encode_interns_unknown_characters() {
        let mut dictionary = loaded("1\na\n");
        let encoded = dictionary.encode("19");

        assert_eq!(encoded.len(), 2);
        assert_eq!(dictionary.sources().len(), 2);
        assert_eq!(dictionary.spell(&encoded), "a9");
    }

    #[test]
    fn test_spell_shows_alternatives() {
        let mut dictionary = loaded("1\nab\n2\nc\n");
        let encoded = dictionary.encode("21");
        assert_eq!(dictionary.spell(&encoded), "c{ab}");
    }

    #[test]
    fn test_text_round_trip() {
        let original = loaded("1\nab\n2\nжc\n");
        let text = original.to_text();
        let restored = Dictionary::from_text(&text).unwrap();

        assert_eq!(restored.to_text(), text);
        assert_eq!(restored.graph().num_edges(), 4);
        let two = restored.sources().find("2").unwrap();
        assert_eq!(restored.target_string(two), "cж");
    }

    #[test]
    fn test_text_round_trip_with_hash_source() {
        let original = loaded("#\nab\n1\nc\n");
        let text = original.to_text();
        assert!(text.contains("\n# ab\n"));

        let restored = Dictionary::from_text(&text).unwrap();
        assert_eq!(restored.to_text(), text);
        assert_eq!(restored.graph().num_edges(), 3);
        let hash = restored.sources().find("#").unwrap();
        assert_eq!(restored.target_string(hash), "ab");
    }

    #[test]
    fn test_text_is_stable_across_round_trips() {
        // Reading back interns b before a.
        let mut dictionary = loaded("1\nab\n2\nab\n");
        let one = dictionary.sources().find("1").unwrap();
        let a = dictionary.targets().find("a").unwrap();
        let graph = dictionary.graph().without_edge(one, a).unwrap();
        dictionary.set_graph(graph);

        let first = dictionary.to_text();
        let second = Dictionary::from_text(&first).unwrap().to_text();
        let third = Dictionary::from_text(&second).unwrap().to_text();

        assert!(first.contains("\n2 ab\n"));
        assert_eq!(second, first);
        assert_eq!(third, first);
    }

    #[test]
    fn test_from_text_without_digest() {
        let restored = Dictionary::from_text("1 ab\n2 c\n").unwrap();
        assert_eq!(restored.graph().num_edges(), 3);
    }

    #[test]
    fn test_from_text_detects_tampering() {
        let text = loaded("1\nab\n").to_text().replace("1 ab", "1 abz");
        assert!(matches!(
            Dictionary::from_text(&text),
            Err(DictionaryError::HashMismatch { .. })
        ));
    }

    #[test]
    fn test_from_text_rejects_empty_entry() {
        assert_eq!(
            Dictionary::from_text("1 ab\n2\n").unwrap_err(),
            DictionaryError::EmptyTargets { line: 2 }
        );
    }

    #[test]
    fn test_display_dump() {
        let dictionary = loaded("1\nab\n");
        assert_eq!(dictionary.to_string(), "1 = [a, b]\n");
    }
}
