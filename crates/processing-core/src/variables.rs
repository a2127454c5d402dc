//! Overlay variable resolution.

use multiview_model::{Context, OrderedMap, Value, VariableSpec};

use crate::formula::evaluate_formula;
use crate::template::{evaluate_condition, render_template};

/// Resolve one variable against the current context.
///
/// Conditional variables take the first branch whose condition holds (a
/// branch without a condition always holds). A literal value wins over a
/// format; a matching branch with neither resolves to [`Value::Null`], as
/// does a variable with no matching branch at all.
pub fn resolve_variable(spec: &VariableSpec, context: &Context) -> Value {
    match spec {
        VariableSpec::Direct { reference } => {
            let name = reference.trim_matches(|c| c == '{' || c == '}');
            context
                .get(name)
                .cloned()
                .unwrap_or_else(|| Value::Str(reference.clone()))
        }
        VariableSpec::Formula { expr } => evaluate_formula(expr, context),
        VariableSpec::Conditional { branches } => branches
            .iter()
            .find(|branch| match &branch.when {
                Some(condition) => evaluate_condition(condition, context),
                None => true,
            })
            .map(|branch| match (&branch.value, &branch.format) {
                (Some(value), _) => value.clone(),
                (None, Some(format)) => Value::Str(render_template(format, context)),
                (None, None) => Value::Null,
            })
            .unwrap_or(Value::Null),
    }
}

/// Extend `base` with the resolved variables.
///
/// Variables are resolved in declaration order and become visible to the
/// ones declared after them.
pub fn build_context(base: Context, variables: &OrderedMap<VariableSpec>) -> Context {
    let mut context = base;
    for (name, spec) in variables.iter() {
        let value = resolve_variable(spec, &context);
        context.insert(name.to_string(), value);
    }
    context
}
