//! Text overlay, style, and decoration configuration.

use serde::{Deserialize, Serialize};

use crate::ordered::OrderedMap;
use crate::value::Value;

/// An 8-bit RGB color, serialized as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const WHITE: Color = Color([255, 255, 255]);
    pub const BLACK: Color = Color([0, 0, 0]);
    pub const MAGENTA: Color = Color([255, 0, 255]);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color([r, g, b])
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Style for a text overlay box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// Font name, resolved by the painter's font registry.
    pub font: String,
    /// Scale relative to the font's nominal size.
    pub font_scale: f32,
    /// Stroke thickness in pixels.
    pub thickness: u32,
    /// Height of the background box; also the stacking step between overlays.
    pub box_height: u32,
    pub padding_left: u32,
    /// Distance from the box top to the text baseline.
    pub padding_top: u32,
    pub background_color: Color,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            font: "HERSHEY_SIMPLEX".to_string(),
            font_scale: 0.8,
            thickness: 2,
            box_height: 40,
            padding_left: 5,
            padding_top: 30,
            background_color: Color::BLACK,
        }
    }
}

/// A conditional color rule. A rule without `when` is the `else` fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawColorRule")]
pub struct ColorRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
    pub color: Color,
}

impl ColorRule {
    pub fn when(condition: impl Into<String>, color: Color) -> Self {
        Self {
            when: Some(condition.into()),
            color,
        }
    }

    pub fn otherwise(color: Color) -> Self {
        Self { when: None, color }
    }
}

/// Accepts both `{when, color}` and `{else: color}`.
#[derive(Deserialize)]
struct RawColorRule {
    when: Option<String>,
    color: Option<Color>,
    #[serde(rename = "else")]
    otherwise: Option<Color>,
}

impl From<RawColorRule> for ColorRule {
    fn from(raw: RawColorRule) -> Self {
        Self {
            when: raw.when,
            color: raw.color.or(raw.otherwise).unwrap_or(Color::WHITE),
        }
    }
}

/// One branch of a conditional variable. A branch without `when` is `else`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalBranch {
    pub when: Option<String>,
    /// Literal result; wins over `format` when both are present.
    pub value: Option<Value>,
    /// Template rendered against the context when no literal value is given.
    pub format: Option<String>,
}

/// How an overlay variable is computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawVariableSpec", into = "RawVariableSpec")]
pub enum VariableSpec {
    /// Reference to another name in the context (`"{name}"` or `"name"`).
    Direct { reference: String },
    /// Arithmetic over substituted values, e.g. `"{speed_ms} * 3.6"`.
    Formula { expr: String },
    /// Ordered branches; the first matching condition wins.
    Conditional { branches: Vec<ConditionalBranch> },
}

impl VariableSpec {
    pub fn direct(reference: impl Into<String>) -> Self {
        Self::Direct {
            reference: reference.into(),
        }
    }

    pub fn formula(expr: impl Into<String>) -> Self {
        Self::Formula { expr: expr.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum VariableKind {
    #[default]
    Direct,
    Formula,
    Conditional,
}

#[derive(Serialize, Deserialize)]
struct RawBranch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    when: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(rename = "else", default, skip_serializing_if = "Option::is_none")]
    otherwise: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    format: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct DetailedSpec {
    #[serde(rename = "type", default)]
    kind: VariableKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expr: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    conditions: Vec<RawBranch>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawVariableSpec {
    Reference(String),
    Detailed(DetailedSpec),
}

impl TryFrom<RawVariableSpec> for VariableSpec {
    type Error = String;

    fn try_from(raw: RawVariableSpec) -> Result<Self, Self::Error> {
        let detailed = match raw {
            RawVariableSpec::Reference(reference) => return Ok(Self::Direct { reference }),
            RawVariableSpec::Detailed(detailed) => detailed,
        };

        match detailed.kind {
            VariableKind::Direct => detailed
                .expr
                .map(|reference| Self::Direct { reference })
                .ok_or_else(|| "direct variable requires 'expr'".to_string()),
            VariableKind::Formula => detailed
                .expr
                .map(|expr| Self::Formula { expr })
                .ok_or_else(|| "formula variable requires 'expr'".to_string()),
            VariableKind::Conditional => Ok(Self::Conditional {
                branches: detailed
                    .conditions
                    .into_iter()
                    .map(|raw| match raw.otherwise {
                        Some(otherwise) => ConditionalBranch {
                            when: None,
                            value: Some(otherwise),
                            format: raw.format,
                        },
                        None => ConditionalBranch {
                            when: raw.when,
                            value: raw.value,
                            format: raw.format,
                        },
                    })
                    .collect(),
            }),
        }
    }
}

impl From<VariableSpec> for RawVariableSpec {
    fn from(spec: VariableSpec) -> Self {
        match spec {
            VariableSpec::Direct { reference } => RawVariableSpec::Reference(reference),
            VariableSpec::Formula { expr } => RawVariableSpec::Detailed(DetailedSpec {
                kind: VariableKind::Formula,
                expr: Some(expr),
                conditions: Vec::new(),
            }),
            VariableSpec::Conditional { branches } => RawVariableSpec::Detailed(DetailedSpec {
                kind: VariableKind::Conditional,
                expr: None,
                conditions: branches
                    .into_iter()
                    .map(|b| RawBranch {
                        when: b.when,
                        value: b.value,
                        otherwise: None,
                        format: b.format,
                    })
                    .collect(),
            }),
        }
    }
}

/// Configuration for a single text overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOverlayConfig {
    pub id: String,
    pub template: String,
    /// Cameras this overlay is drawn on.
    #[serde(default)]
    pub cameras: Vec<String>,
    /// Computed variables, resolved in declaration order.
    #[serde(default)]
    pub variables: OrderedMap<VariableSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub color_rules: Vec<ColorRule>,
    /// Static color; takes precedence over `color_rules`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Per-overlay style override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<OverlayStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_when: Option<String>,
}

impl TextOverlayConfig {
    pub fn new(id: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            template: template.into(),
            cameras: Vec::new(),
            variables: OrderedMap::new(),
            color_rules: Vec::new(),
            color: None,
            style: None,
            visible_when: None,
        }
    }

    pub fn on_cameras<I, S>(mut self, cameras: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cameras = cameras.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, spec: VariableSpec) -> Self {
        self.variables.insert(name, spec);
        self
    }

    pub fn targets(&self, camera: &str) -> bool {
        self.cameras.iter().any(|c| c == camera)
    }
}

/// Crosshair drawn at the center of flagged cameras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CentermarkConfig {
    pub enabled: bool,
    /// Arm length as a fraction of the image width.
    pub size_ratio: f64,
    pub thickness: u32,
    pub color: Color,
}

impl Default for CentermarkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size_ratio: 0.025,
            thickness: 4,
            color: Color::MAGENTA,
        }
    }
}

/// Outline drawn around each active camera tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderConfig {
    pub enabled: bool,
    pub thickness: u32,
    pub color: Color,
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            thickness: 1,
            color: Color::WHITE,
        }
    }
}
