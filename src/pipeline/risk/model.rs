//! Serialized classification pipeline.
//!
//! The artifact mirrors the fitted training pipeline: a column transformer
//! (median-imputed + standard-scaled numerics, most-frequent-imputed
//! one-hot categoricals, raw passthrough flags) feeding either a logistic
//! head or a boosted tree ensemble. It is loaded once at startup and only
//! read afterwards.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ModelError, RiskModel};
use crate::pipeline::report::FeatureRecord;

/// Artifact layout version this build understands.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineArtifact {
    pub format_version: u32,
    #[serde(default)]
    pub description: Option<String>,
    pub numeric: Vec<NumericColumn>,
    pub categorical: Vec<CategoricalColumn>,
    #[serde(default)]
    pub passthrough: Vec<String>,
    pub classifier: Classifier,
}

/// Median imputation followed by standard scaling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericColumn {
    pub name: String,
    pub median: f64,
    pub mean: f64,
    pub scale: f64,
}

/// Most-frequent imputation followed by one-hot encoding; unknown
/// categories encode as an all-zero block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalColumn {
    pub name: String,
    pub most_frequent: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    Logistic {
        intercept: f64,
        coefficients: Vec<f64>,
    },
    BoostedTrees {
        base_margin: f64,
        trees: Vec<Tree>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Goes left when `x < threshold`; NaN follows `missing_left`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        #[serde(default)]
        missing_left: bool,
    },
    Leaf {
        value: f64,
    },
}

impl Tree {
    fn margin(&self, features: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    missing_left,
                } => {
                    let x = features[*feature];
                    let go_left = if x.is_nan() { *missing_left } else { x < *threshold };
                    index = if go_left { *left } else { *right };
                }
            }
        }
    }
}

/// A validated, ready-to-run pipeline.
#[derive(Debug, Clone)]
pub struct PipelineModel {
    artifact: PipelineArtifact,
    width: usize,
}

impl PipelineModel {
    /// Load and validate an artifact from disk.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let json = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let model = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            features = model.width,
            classifier = model.classifier_kind(),
            "Classifier artifact loaded"
        );
        Ok(model)
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let artifact: PipelineArtifact = serde_json::from_str(json)?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: PipelineArtifact) -> Result<Self, ModelError> {
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ModelError::UnsupportedVersion(artifact.format_version));
        }

        let mut seen = HashSet::new();
        let names = artifact
            .numeric
            .iter()
            .map(|c| c.name.as_str())
            .chain(artifact.categorical.iter().map(|c| c.name.as_str()))
            .chain(artifact.passthrough.iter().map(String::as_str));
        for name in names {
            if name.is_empty() {
                return Err(invalid("empty column name"));
            }
            if !seen.insert(name) {
                return Err(invalid(format!("column '{name}' appears twice")));
            }
        }

        for column in &artifact.numeric {
            if ![column.median, column.mean, column.scale].iter().all(|v| v.is_finite()) {
                return Err(invalid(format!("non-finite statistics for '{}'", column.name)));
            }
        }
        for column in &artifact.categorical {
            if column.categories.is_empty() {
                return Err(invalid(format!("no categories for '{}'", column.name)));
            }
        }

        let width = artifact.numeric.len()
            + artifact
                .categorical
                .iter()
                .map(|c| c.categories.len())
                .sum::<usize>()
            + artifact.passthrough.len();
        if width == 0 {
            return Err(invalid("pipeline has no input columns"));
        }

        match &artifact.classifier {
            Classifier::Logistic {
                intercept,
                coefficients,
            } => {
                if coefficients.len() != width {
                    return Err(invalid(format!(
                        "expected {width} coefficients, found {}",
                        coefficients.len()
                    )));
                }
                if !intercept.is_finite() || !coefficients.iter().all(|c| c.is_finite()) {
                    return Err(invalid("non-finite logistic weights"));
                }
            }
            Classifier::BoostedTrees { base_margin, trees } => {
                if !base_margin.is_finite() {
                    return Err(invalid("non-finite base margin"));
                }
                if trees.is_empty() {
                    return Err(invalid("tree ensemble is empty"));
                }
                for (t, tree) in trees.iter().enumerate() {
                    validate_tree(t, tree, width)?;
                }
            }
        }

        Ok(Self { artifact, width })
    }

    /// Number of transformed features fed to the classifier head.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn classifier_kind(&self) -> &'static str {
        match self.artifact.classifier {
            Classifier::Logistic { .. } => "logistic",
            Classifier::BoostedTrees { .. } => "boosted_trees",
        }
    }

    /// Apply the column transformer to one record.
    pub fn transform(&self, record: &FeatureRecord) -> Vec<f64> {
        let mut features = Vec::with_capacity(self.width);

        for column in &self.artifact.numeric {
            let raw = record.number(&column.name).unwrap_or(column.median);
            let scale = if column.scale == 0.0 { 1.0 } else { column.scale };
            features.push((raw - column.mean) / scale);
        }

        for column in &self.artifact.categorical {
            let value = record
                .category(&column.name)
                .unwrap_or_else(|| column.most_frequent.clone());
            for category in &column.categories {
                let hit = category.eq_ignore_ascii_case(&value);
                features.push(if hit { 1.0 } else { 0.0 });
            }
        }

        for name in &self.artifact.passthrough {
            features.push(record.number(name).unwrap_or(f64::NAN));
        }

        features
    }
}

impl RiskModel for PipelineModel {
    fn predict_proba(&self, record: &FeatureRecord) -> Result<f64, ModelError> {
        let features = self.transform(record);
        let margin = match &self.artifact.classifier {
            Classifier::Logistic {
                intercept,
                coefficients,
            } => {
                intercept
                    + coefficients
                        .iter()
                        .zip(&features)
                        .filter(|(_, x)| !x.is_nan())
                        .map(|(c, x)| c * x)
                        .sum::<f64>()
            }
            Classifier::BoostedTrees { base_margin, trees } => {
                base_margin + trees.iter().map(|t| t.margin(&features)).sum::<f64>()
            }
        };
        Ok(sigmoid(margin))
    }

    fn input_columns(&self) -> Vec<String> {
        self.artifact
            .numeric
            .iter()
            .map(|c| c.name.clone())
            .chain(self.artifact.categorical.iter().map(|c| c.name.clone()))
            .chain(self.artifact.passthrough.iter().cloned())
            .collect()
    }
}

fn validate_tree(t: usize, tree: &Tree, width: usize) -> Result<(), ModelError> {
    let len = tree.nodes.len();
    if len == 0 {
        return Err(invalid(format!("tree {t} has no nodes")));
    }
    for (i, node) in tree.nodes.iter().enumerate() {
        match node {
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
                ..
            } => {
                if *feature >= width {
                    return Err(invalid(format!(
                        "tree {t} node {i} splits on feature {feature} of {width}"
                    )));
                }
                if threshold.is_nan() {
                    return Err(invalid(format!("tree {t} node {i} has NaN threshold")));
                }
                // Children must point forward so traversal always terminates
                for child in [*left, *right] {
                    if child <= i || child >= len {
                        return Err(invalid(format!(
                            "tree {t} node {i} has invalid child {child}"
                        )));
                    }
                }
            }
            TreeNode::Leaf { value } => {
                if !value.is_finite() {
                    return Err(invalid(format!("tree {t} node {i} has non-finite leaf")));
                }
            }
        }
    }
    Ok(())
}

fn invalid(reason: impl Into<String>) -> ModelError {
    ModelError::Invalid(reason.into())
}

fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}
