//! End-to-end pipeline: load constraints, load corpus, resolve, report.
//!
//! Input failures abort before the resolver runs and are reported as
//! [`PipelineError`]. A run that ends stuck is not an error; inspect
//! [`Resolution::outcome`].

use std::path::{Path, PathBuf};
use tracing::info;

use crate::canonical_content::{compute_content_hash, decode_input};
use crate::dictionary::{Dictionary, DictionaryError};
use crate::frequency::FrequencyModel;
use crate::policy::ResolverPolicyV1;
use crate::report::ResolutionReport;
use crate::resolver::{GreedyResolver, Resolution, ResolverError};

/// Error type for pipeline startup and execution.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// An input file could not be read.
    #[error("Failed to read {}: {}", .path.display(), .source)]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// An input file is not valid UTF-8.
    #[error("File is not valid UTF-8: {}", .path.display())]
    Decode {
        /// Path of the file.
        path: PathBuf,
    },
    /// The constraints file is malformed.
    #[error("Invalid constraints: {0}")]
    Dictionary(#[from] DictionaryError),
    /// Internal resolver error.
    #[error(transparent)]
    Resolver(#[from] ResolverError),
}

/// Everything produced by a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Dictionary holding the final graph.
    pub dictionary: Dictionary,
    /// Frequency model built from the corpus.
    pub model: FrequencyModel,
    /// Resolver result.
    pub resolution: Resolution,
    /// Serializable summary.
    pub report: ResolutionReport,
}

/// Batch pipeline around a [`GreedyResolver`].
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    resolver: GreedyResolver,
}

impl Pipeline {
    /// Create a pipeline with the given policy.
    pub fn new(policy: ResolverPolicyV1) -> Self {
        Self {
            resolver: GreedyResolver::new(policy),
        }
    }

    /// Get the policy.
    pub fn policy(&self) -> &ResolverPolicyV1 {
        self.resolver.policy()
    }

    /// Run from files on disk.
    pub fn run(&self, constraints_path: &Path, word_list_path: &Path) -> Result<PipelineOutput, PipelineError> {
        let constraints = read_text(constraints_path)?;
        let corpus = read_text(word_list_path)?;
        info!(
            constraints = %constraints_path.display(),
            word_list = %word_list_path.display(),
            "Inputs read"
        );
        self.run_text(&constraints, &corpus)
    }

    /// Run from in-memory text.
    pub fn run_text(&self, constraints: &str, corpus: &str) -> Result<PipelineOutput, PipelineError> {
        let mut dictionary = Dictionary::new();
        dictionary.load_constraints(constraints)?;
        let model = dictionary.frequency_model(corpus);

        let initial = dictionary.graph().clone();
        let resolution = self.resolver.resolve(initial.clone(), &model)?;
        dictionary.set_graph(resolution.graph.clone());

        let report = ResolutionReport::build(
            &dictionary,
            &initial,
            &model,
            &resolution,
            self.resolver.policy(),
            Some(compute_content_hash(corpus)),
        );

        Ok(PipelineOutput {
            dictionary,
            model,
            resolution,
            report,
        })
    }
}

/// Read and decode a UTF-8 input file.
pub fn read_text(path: &Path) -> Result<String, PipelineError> {
    let bytes = std::fs::read(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_input(&bytes).ok_or_else(|| PipelineError::Decode {
        path: path.to_path_buf(),
    })
}
