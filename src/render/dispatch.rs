//! Command dispatch: what each command name resolves to.

use super::command::Command;
use super::{EvalContext, RenderError, Renderer};
use std::borrow::Cow;

/// Command names with behavior. Everything else is echoed back.
pub mod names {
    pub const TEMPLATE: &str = "TEMPLATE";
    pub const EVAL: &str = "EVAL";
    pub const TITLE: &str = "TITLE";
}

/// Resolve one command to its replacement text.
///
/// - `TEMPLATE: name` renders `<templates>/name.html` recursively.
/// - `EVAL: expr` runs a registered evaluator.
/// - Anything else, including `TITLE` and `CONTENT` (handled by the page
///   builder) and argument-less `TEMPLATE`/`EVAL`, returns the raw token.
pub(super) fn resolve<'a>(
    renderer: &Renderer,
    command: &Command<'a>,
    ctx: &EvalContext<'_>,
    depth: usize,
) -> Result<Cow<'a, str>, RenderError> {
    match (command.name, command.argument) {
        (names::TEMPLATE, Some(name)) => renderer.include(name, ctx, depth).map(Cow::Owned),
        (names::EVAL, Some(expr)) => renderer
            .evaluators()
            .evaluate(expr, ctx)
            .map(Cow::Owned),
        _ => Ok(Cow::Borrowed(command.raw)),
    }
}
