//! Pipeline configuration
//!
//! Every field has a default, so an empty YAML document is a valid
//! configuration. Defaults that depend on the method (output path, node
//! filtering, candidate selection) are resolved when left unset.

use crate::graph::LoadOptions;
use crate::learn::{Node2VecConfig, RuleWeights, SageConfig};
use crate::rank::{RankConfig, RuleFilter, Selection};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Unknown method '{0}' (expected sage, node2vec or rules)")]
    UnknownMethod(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Representation-learning method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// GraphSAGE message passing
    #[default]
    Sage,
    /// Random-walk skip-gram embeddings
    Node2Vec,
    /// Weighted structural and attribute rules
    Rules,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Sage => "sage",
            Method::Node2Vec => "node2vec",
            Method::Rules => "rules",
        }
    }

    pub fn default_output(&self) -> PathBuf {
        match self {
            Method::Sage => PathBuf::from("predictions/graphSAGE.csv"),
            Method::Node2Vec => PathBuf::from("predictions/node2vec.csv"),
            Method::Rules => PathBuf::from("data/predicted_collaborations.csv"),
        }
    }

    /// Walk-based learning has nothing to say about isolated artists
    pub fn default_connected_only(&self) -> bool {
        matches!(self, Method::Node2Vec)
    }

    /// Candidate selection for embedding methods; `None` for rules, whose
    /// output is bounded by the rule filter instead
    pub fn default_selection(&self) -> Option<Selection> {
        match self {
            Method::Node2Vec => Some(Selection::Global { limit: 200 }),
            Method::Sage => Some(Selection::PerNode { k: 10 }),
            Method::Rules => None,
        }
    }

    /// Whether ranking reads the selection and mirrored-pair settings
    pub fn uses_selection(&self) -> bool {
        !matches!(self, Method::Rules)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sage" | "graphsage" => Ok(Method::Sage),
            "node2vec" => Ok(Method::Node2Vec),
            "rules" | "rule" => Ok(Method::Rules),
            other => Err(ConfigError::UnknownMethod(other.to_string())),
        }
    }
}

/// Full pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub method: Method,
    pub artists: PathBuf,
    pub collaborations: PathBuf,
    /// Prediction table; the method's default path when unset
    pub output: Option<PathBuf>,
    /// Optional JSON export of learned embeddings
    pub embeddings_out: Option<PathBuf>,
    pub connected_only: Option<bool>,
    pub selection: Option<Selection>,
    pub dedupe_mirrored: bool,
    pub rule_filter: RuleFilter,
    pub rule_weights: RuleWeights,
    pub sage: SageConfig,
    pub node2vec: Node2VecConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            method: Method::default(),
            artists: PathBuf::from("data/artists.csv"),
            collaborations: PathBuf::from("data/collaborations.csv"),
            output: None,
            embeddings_out: None,
            connected_only: None,
            selection: None,
            dedupe_mirrored: false,
            rule_filter: RuleFilter::default(),
            rule_weights: RuleWeights::default(),
            sage: SageConfig::default(),
            node2vec: Node2VecConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn for_method(method: Method) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> ConfigResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Seed every stochastic learner
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.sage.seed = seed;
        self.node2vec.seed = seed;
        self
    }

    /// Copy of this config with every method-dependent default filled in
    pub fn resolved(&self) -> Self {
        let mut resolved = self.clone();
        resolved.output = Some(self.output_path());
        resolved.connected_only = Some(self.load_options().connected_only);
        resolved.selection = if self.method.uses_selection() {
            Some(self.selection())
        } else {
            None
        };
        resolved
    }

    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| self.method.default_output())
    }

    /// Effective embedding selection; rules ignore it
    pub fn selection(&self) -> Selection {
        self.selection
            .or_else(|| self.method.default_selection())
            .unwrap_or(Selection::PerNode { k: 10 })
    }

    /// Settings given explicitly that the chosen method never reads
    pub fn ignored_settings(&self) -> Vec<&'static str> {
        let mut ignored = Vec::new();
        if !self.method.uses_selection() {
            if self.selection.is_some() {
                ignored.push("selection");
            }
            if self.dedupe_mirrored {
                ignored.push("dedupe_mirrored");
            }
        }
        ignored
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            connected_only: self
                .connected_only
                .unwrap_or_else(|| self.method.default_connected_only()),
        }
    }

    pub fn rank_config(&self) -> RankConfig {
        RankConfig {
            selection: self.selection(),
            dedupe_mirrored: self.dedupe_mirrored,
            rule_filter: self.rule_filter.clone(),
        }
    }

    /// Reject values a run cannot use or that would leave it unbounded
    pub fn validate(&self) -> ConfigResult<()> {
        if self.method.uses_selection() {
            match self.selection() {
                Selection::PerNode { k: 0 } => return Err(invalid("selection k must be positive")),
                Selection::Global { limit: 0 } => return Err(invalid("selection limit must be positive")),
                _ => {}
            }
        }
        if self.rule_filter.max_popularity_diff.is_nan() {
            return Err(invalid("max_popularity_diff must be a number"));
        }
        self.rule_weights
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let learner = match self.method {
            Method::Sage => self.sage.validate(),
            Method::Node2Vec => self.node2vec.validate(),
            Method::Rules => Ok(()),
        };
        learner.map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_string())
}
