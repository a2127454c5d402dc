//! Multiview Processing Core
//!
//! Pure computation behind the composer:
//! - **Templates:** `{name}` / `{name:spec}` substitution, conditions, color rules
//! - **Formulas:** a small recursive-descent arithmetic evaluator
//! - **Variables:** ordered resolution of direct, formula, and conditional variables
//! - **Layouts:** binary layout trees with proportional sizing
//!
//! No I/O and no pixels. Expression evaluation never fails: malformed input
//! degrades to `false`, the literal text, or plain display.

pub mod format;
pub mod formula;
pub mod layout;
pub mod template;
pub mod variables;

pub use format::{format_value, FormatSpec};
pub use formula::{evaluate_arithmetic, evaluate_formula, ArithError};
pub use layout::{
    build_layout, compute_layout, make_junction, LayoutError, LayoutManager, LayoutNode,
    TargetSizeMap,
};
pub use template::{
    evaluate_color_rules, evaluate_condition, parse_value, render_template, substitute_variables,
    CompareOp,
};
pub use variables::{build_context, resolve_variable};
