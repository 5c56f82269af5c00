//! Evaluator for models saved with XGBoost's `Booster.save_model("*.json")`.
//!
//! Supports `gbtree`, `dart` and `gblinear` boosters with a single regression
//! output. Tree traversal mirrors XGBoost: features and thresholds are `f32`,
//! a row goes left when `x < split_condition`, missing values (NaN) follow
//! `default_left`, and leaf values live in `split_conditions`.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::{FareModel, ModelError, ModelInfo};
use crate::features::FeatureRecord;

// ============ On-disk layout ============

#[derive(Deserialize)]
struct ModelDocument {
    learner: Learner,
}

#[derive(Deserialize)]
struct Learner {
    #[serde(default)]
    feature_names: Vec<String>,
    gradient_booster: BoosterSpec,
    learner_model_param: LearnerModelParam,
    objective: ObjectiveSpec,
}

/// XGBoost writes every scalar parameter as a string
#[derive(Deserialize)]
struct LearnerModelParam {
    base_score: String,
    num_feature: String,
    #[serde(default)]
    num_class: Option<String>,
    #[serde(default)]
    num_target: Option<String>,
}

#[derive(Deserialize)]
struct ObjectiveSpec {
    name: String,
}

#[derive(Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
enum BoosterSpec {
    Gbtree {
        model: TreeEnsembleSpec,
    },
    Dart {
        gbtree: DartTrees,
        weight_drop: Vec<f32>,
    },
    Gblinear {
        model: LinearSpec,
    },
}

#[derive(Deserialize)]
struct DartTrees {
    model: TreeEnsembleSpec,
}

#[derive(Deserialize)]
struct TreeEnsembleSpec {
    trees: Vec<TreeSpec>,
}

#[derive(Deserialize)]
struct TreeSpec {
    left_children: Vec<i32>,
    right_children: Vec<i32>,
    split_indices: Vec<i64>,
    split_conditions: Vec<f32>,
    default_left: Vec<Flag>,
    #[serde(default)]
    split_type: Vec<u8>,
}

/// 1.x writes `default_left` as 0/1, some writers use booleans
#[derive(Deserialize, Clone, Copy)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(u8),
}

impl Flag {
    fn is_set(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        }
    }
}

#[derive(Deserialize)]
struct LinearSpec {
    weights: Vec<f32>,
}

// ============ Compiled model ============

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
        default_left: bool,
    },
    Leaf(f32),
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn compile(index: usize, spec: TreeSpec, num_features: usize) -> Result<Self, ModelError> {
        let malformed = |reason: String| ModelError::MalformedTree { tree: index, reason };

        let n = spec.left_children.len();
        if n == 0 {
            return Err(malformed("tree has no nodes".to_string()));
        }

        let lengths = [
            ("right_children", spec.right_children.len()),
            ("split_indices", spec.split_indices.len()),
            ("split_conditions", spec.split_conditions.len()),
            ("default_left", spec.default_left.len()),
        ];
        for (name, len) in lengths {
            if len != n {
                return Err(malformed(format!("{name} has {len} entries, expected {n}")));
            }
        }

        if spec.split_type.iter().any(|&t| t != 0) {
            return Err(malformed("categorical splits are not supported".to_string()));
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            if spec.left_children[i] == -1 {
                nodes.push(Node::Leaf(spec.split_conditions[i]));
                continue;
            }

            // Children always come after their parent, which rules out cycles
            let child = |raw: i32| {
                usize::try_from(raw)
                    .ok()
                    .filter(|&c| c > i && c < n)
                    .ok_or_else(|| malformed(format!("node {i} has invalid child {raw}")))
            };
            let left = child(spec.left_children[i])?;
            let right = child(spec.right_children[i])?;

            let feature = usize::try_from(spec.split_indices[i])
                .ok()
                .filter(|&f| f < num_features)
                .ok_or_else(|| {
                    malformed(format!(
                        "node {i} splits on feature {} of {num_features}",
                        spec.split_indices[i]
                    ))
                })?;

            nodes.push(Node::Split {
                feature,
                threshold: spec.split_conditions[i],
                left,
                right,
                default_left: spec.default_left[i].is_set(),
            });
        }

        Ok(Self { nodes })
    }

    fn leaf_value(&self, row: &[f32]) -> f32 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let x = row[feature];
                    idx = if x.is_nan() {
                        if default_left { left } else { right }
                    } else if x < threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Booster {
    Trees { trees: Vec<Tree>, weights: Vec<f32> },
    Linear { weights: Vec<f32>, bias: f32 },
}

impl Booster {
    fn name(&self, dart: bool) -> &'static str {
        match self {
            Booster::Trees { .. } if dart => "dart",
            Booster::Trees { .. } => "gbtree",
            Booster::Linear { .. } => "gblinear",
        }
    }

    fn num_trees(&self) -> usize {
        match self {
            Booster::Trees { trees, .. } => trees.len(),
            Booster::Linear { .. } => 0,
        }
    }

    fn margin(&self, row: &[f32]) -> f32 {
        match self {
            Booster::Trees { trees, weights } => trees
                .iter()
                .zip(weights)
                .map(|(tree, w)| w * tree.leaf_value(row))
                .sum(),
            Booster::Linear { weights, bias } => {
                bias + weights.iter().zip(row).map(|(w, x)| w * x).sum::<f32>()
            }
        }
    }
}

/// Inverse link from margin to prediction space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Identity,
    Log,
}

impl Link {
    fn for_objective(name: &str) -> Option<Self> {
        match name {
            "reg:squarederror"
            | "reg:linear"
            | "reg:squaredlogerror"
            | "reg:absoluteerror"
            | "reg:pseudohubererror"
            | "reg:quantileerror" => Some(Link::Identity),
            "reg:gamma" | "reg:tweedie" | "count:poisson" => Some(Link::Log),
            _ => None,
        }
    }

    fn to_margin(self, base_score: f32) -> Result<f32, ModelError> {
        match self {
            Link::Identity => Ok(base_score),
            Link::Log if base_score > 0.0 => Ok(base_score.ln()),
            Link::Log => Err(ModelError::InvalidParam {
                name: "base_score",
                value: base_score.to_string(),
            }),
        }
    }

    fn apply(self, margin: f64) -> f64 {
        match self {
            Link::Identity => margin,
            Link::Log => margin.exp(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct XgbModel {
    booster: Booster,
    dart: bool,
    link: Link,
    objective: String,
    base_score: f32,
    base_margin: f32,
}

impl XgbModel {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ModelError> {
        let document: ModelDocument = serde_json::from_str(text)?;
        Self::compile(document.learner)
    }

    fn compile(learner: Learner) -> Result<Self, ModelError> {
        let params = &learner.learner_model_param;
        let num_features = FeatureRecord::WIDTH;

        let declared: usize = parse_param("num_feature", &params.num_feature)?;
        if declared != num_features {
            return Err(ModelError::SchemaMismatch(format!(
                "model expects {declared} features, record has {num_features}"
            )));
        }

        if !learner.feature_names.is_empty() && learner.feature_names != FeatureRecord::COLUMNS {
            return Err(ModelError::SchemaMismatch(format!(
                "model columns {:?} differ from {:?}",
                learner.feature_names,
                FeatureRecord::COLUMNS
            )));
        }

        for (name, value) in [("num_class", &params.num_class), ("num_target", &params.num_target)] {
            if let Some(value) = value {
                let outputs: usize = parse_param(name, value)?;
                if outputs > 1 {
                    return Err(ModelError::SchemaMismatch(format!(
                        "{name} is {outputs}, only single-output regression is supported"
                    )));
                }
            }
        }

        let objective = learner.objective.name;
        let link = Link::for_objective(&objective)
            .ok_or_else(|| ModelError::UnsupportedObjective(objective.clone()))?;

        let base_score = parse_base_score(&params.base_score)?;
        let base_margin = link.to_margin(base_score)?;

        let (booster, dart) = match learner.gradient_booster {
            BoosterSpec::Gbtree { model } => {
                let weights = vec![1.0; model.trees.len()];
                (compile_trees(model, weights, num_features)?, false)
            }
            BoosterSpec::Dart {
                gbtree,
                weight_drop,
            } => {
                if weight_drop.len() != gbtree.model.trees.len() {
                    return Err(ModelError::InvalidParam {
                        name: "weight_drop",
                        value: format!(
                            "{} weights for {} trees",
                            weight_drop.len(),
                            gbtree.model.trees.len()
                        ),
                    });
                }
                (compile_trees(gbtree.model, weight_drop, num_features)?, true)
            }
            BoosterSpec::Gblinear { model } => {
                let mut weights = model.weights;
                if weights.len() != num_features + 1 {
                    return Err(ModelError::SchemaMismatch(format!(
                        "linear booster has {} weights, expected {}",
                        weights.len(),
                        num_features + 1
                    )));
                }
                let bias = weights.pop().unwrap_or_default();
                (Booster::Linear { weights, bias }, false)
            }
        };

        Ok(Self {
            booster,
            dart,
            link,
            objective,
            base_score,
            base_margin,
        })
    }

    /// Raw sum of the base margin and every booster contribution
    pub fn margin(&self, row: &[f32; FeatureRecord::WIDTH]) -> f32 {
        self.base_margin + self.booster.margin(row)
    }
}

impl FareModel for XgbModel {
    fn predict_raw(&self, record: &FeatureRecord) -> Result<f64, ModelError> {
        let row = record.to_row().map(|v| v as f32);
        Ok(self.link.apply(f64::from(self.margin(&row))))
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            booster: self.booster.name(self.dart).to_string(),
            objective: self.objective.clone(),
            num_trees: self.booster.num_trees(),
            num_features: FeatureRecord::WIDTH,
            base_score: self.base_score,
        }
    }
}

fn compile_trees(
    ensemble: TreeEnsembleSpec,
    weights: Vec<f32>,
    num_features: usize,
) -> Result<Booster, ModelError> {
    let trees = ensemble
        .trees
        .into_iter()
        .enumerate()
        .map(|(i, spec)| Tree::compile(i, spec, num_features))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Booster::Trees { trees, weights })
}

fn parse_param<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ModelError> {
    value.trim().parse().map_err(|_| ModelError::InvalidParam {
        name,
        value: value.to_string(),
    })
}

/// Accepts both `"5E-1"` and the bracketed vector form `"[5E-1]"`
fn parse_base_score(value: &str) -> Result<f32, ModelError> {
    let inner = value.trim().trim_start_matches('[').trim_end_matches(']');
    let score: f32 = parse_param("base_score", inner)?;
    if !score.is_finite() {
        return Err(ModelError::InvalidParam {
            name: "base_score",
            value: value.to_string(),
        });
    }
    Ok(score)
}
