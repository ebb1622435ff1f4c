//! Deck documents: slides of nodes, edges and named steps, loaded from YAML.

pub mod builtin;
pub mod stepper;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stage::types::{EdgeSpec, NodeSpec, RoleLabel};
use crate::tokens::TokenKind;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("Failed to read deck '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid deck YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unknown built-in deck '{name}'. Available decks: {available}")]
    UnknownBuiltin { name: String, available: String },

    #[error("Deck '{0}' has no slides")]
    Empty(String),

    #[error("Slide {slide} ('{title}') has no steps")]
    NoSteps { slide: usize, title: String },
}

/// Steps a node or edge applies to.
///
/// `true`/`false` means every step or none; a list names the steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepSet {
    All(bool),
    Named(Vec<String>),
}

impl StepSet {
    pub fn contains(&self, step: &str) -> bool {
        match self {
            StepSet::All(all) => *all,
            StepSet::Named(names) => names.iter().any(|n| n == step),
        }
    }

    fn names(&self) -> &[String] {
        match self {
            StepSet::All(_) => &[],
            StepSet::Named(names) => names,
        }
    }
}

fn always() -> StepSet {
    StepSet::All(true)
}

fn never() -> StepSet {
    StepSet::All(false)
}

fn default_width() -> f32 {
    200.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_width")]
    pub w: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleLabel>,
    #[serde(default = "always")]
    pub steps: StepSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDef {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub dashed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Steps during which the edge is drawn.
    #[serde(default = "always")]
    pub steps: StepSet,
    /// Steps during which the edge pulses.
    #[serde(default = "never")]
    pub pulse: StepSet,
}

/// Side effect run when a step is entered or left.
///
/// Written in YAML as `- issue_token: id_jag`, `- toast: text` or a bare
/// `- revoke_tokens`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    IssueToken(TokenKind),
    RevokeTokens,
    Toast(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub node: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDef {
    pub name: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<Badge>,
    /// Advance automatically after this long.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advance_after_ms: Option<u64>,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        with = "serde_yaml::with::singleton_map_recursive"
    )]
    pub on_enter: Vec<Action>,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        with = "serde_yaml::with::singleton_map_recursive"
    )]
    pub on_exit: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub title: String,
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    #[serde(default)]
    pub edges: Vec<EdgeDef>,
    pub steps: Vec<StepDef>,
}

/// What the stage should show for one step of a slide.
#[derive(Debug, Clone, PartialEq)]
pub struct StepView {
    pub nodes: Vec<NodeSpec>,
    /// Every declared edge; edges outside the step are present but hidden.
    pub edges: Vec<EdgeSpec>,
}

impl Slide {
    /// Scene for step `index`. Out-of-range indices clamp to the last step.
    pub fn step_view(&self, index: usize) -> StepView {
        let Some(step) = self.steps.get(index.min(self.steps.len().saturating_sub(1))) else {
            return StepView {
                nodes: Vec::new(),
                edges: Vec::new(),
            };
        };
        let name = step.name.as_str();

        let nodes = self
            .nodes
            .iter()
            .filter(|n| n.steps.contains(name))
            .map(|n| NodeSpec {
                id: n.id.clone(),
                label: n.label.clone(),
                detail: n.detail.clone(),
                x: n.x,
                y: n.y,
                w: n.w,
                role_label: n.role.clone(),
            })
            .collect();

        let edges = self
            .edges
            .iter()
            .map(|e| EdgeSpec {
                id: e.id.clone(),
                from: e.from.clone(),
                to: e.to.clone(),
                label: e.label.clone(),
                dashed: e.dashed,
                pulse: e.pulse.contains(name),
                visible: e.steps.contains(name),
                color: e.color.clone(),
            })
            .collect();

        StepView { nodes, edges }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    pub slides: Vec<Slide>,
}

impl Deck {
    /// Parse a deck and check that it can be presented.
    pub fn parse(content: &str) -> Result<Self, DeckError> {
        let deck: Deck = serde_yaml::from_str(content)?;
        if deck.slides.is_empty() {
            return Err(DeckError::Empty(deck.title));
        }
        if let Some((i, slide)) = deck
            .slides
            .iter()
            .enumerate()
            .find(|(_, s)| s.steps.is_empty())
        {
            return Err(DeckError::NoSteps {
                slide: i + 1,
                title: slide.title.clone(),
            });
        }
        for warning in validate(&deck) {
            log::warn!("{warning}");
        }
        Ok(deck)
    }

    pub fn load(path: &Path) -> Result<Self, DeckError> {
        let content = std::fs::read_to_string(path).map_err(|source| DeckError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn step_count(&self) -> usize {
        self.slides.iter().map(|s| s.steps.len()).sum()
    }
}

/// Non-fatal problems: dangling references and duplicate ids.
pub fn validate(deck: &Deck) -> Vec<String> {
    let mut warnings = Vec::new();
    for (i, slide) in deck.slides.iter().enumerate() {
        let n = i + 1;
        let mut node_ids = BTreeSet::new();
        for node in &slide.nodes {
            if !node_ids.insert(node.id.as_str()) {
                warnings.push(format!("slide {n}: duplicate node id '{}'", node.id));
            }
        }
        let step_names: BTreeSet<&str> = slide.steps.iter().map(|s| s.name.as_str()).collect();
        if step_names.len() != slide.steps.len() {
            warnings.push(format!("slide {n}: duplicate step names"));
        }

        let mut edge_ids = BTreeSet::new();
        for edge in &slide.edges {
            if !edge_ids.insert(edge.id.as_str()) {
                warnings.push(format!("slide {n}: duplicate edge id '{}'", edge.id));
            }
            for end in [&edge.from, &edge.to] {
                if !node_ids.contains(end.as_str()) {
                    warnings.push(format!(
                        "slide {n}: edge '{}' references unknown node '{end}'",
                        edge.id
                    ));
                }
            }
            for step in edge.steps.names().iter().chain(edge.pulse.names()) {
                if !step_names.contains(step.as_str()) {
                    warnings.push(format!(
                        "slide {n}: edge '{}' references unknown step '{step}'",
                        edge.id
                    ));
                }
            }
        }
        for node in &slide.nodes {
            for step in node.steps.names() {
                if !step_names.contains(step.as_str()) {
                    warnings.push(format!(
                        "slide {n}: node '{}' references unknown step '{step}'",
                        node.id
                    ));
                }
            }
        }
        for step in &slide.steps {
            if let Some(badge) = &step.badge {
                if !node_ids.contains(badge.node.as_str()) {
                    warnings.push(format!(
                        "slide {n}: step '{}' badge targets unknown node '{}'",
                        step.name, badge.node
                    ));
                }
            }
        }
    }
    warnings
}
