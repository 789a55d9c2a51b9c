//! `EVAL` expressions served by registered callbacks.
//!
//! An expression is `name` or `name(arg, ...)`. Each argument is either a
//! double-quoted string (`\"` and `\\` escapes) or a bare word; bare words
//! are taken literally, they are not variables.
//!
//! ```text
//! <!-- #EVAL: year -->
//! <!-- #EVAL: env("GIT_SHA") -->
//! <!-- #EVAL: concat("v", "1.0") -->
//! ```
//!
//! Only functions in the [`Evaluators`] registry can run; there is no way
//! to evaluate host code from a page.

use super::RenderError;
use crate::core::BuildMode;
use crate::utils::date::DateTimeUtc;
use crate::utils::path::display_relative;
use anyhow::{Result, bail};
use rustc_hash::FxHashMap;
use std::path::Path;

/// Values an evaluator may read.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub site_title: &'a str,
    /// Page being rendered, relative to the pages root. `None` for the
    /// main template.
    pub page: Option<&'a Path>,
    pub mode: BuildMode,
}

impl<'a> EvalContext<'a> {
    pub const fn new(site_title: &'a str, mode: BuildMode) -> Self {
        Self {
            site_title,
            page: None,
            mode,
        }
    }

    /// Same context, naming `page`.
    pub const fn for_page(self, page: &'a Path) -> Self {
        Self {
            page: Some(page),
            ..self
        }
    }
}

/// Callback signature. `Ok(None)` renders as the empty string.
pub type EvalFn = dyn Fn(&EvalContext<'_>, &[String]) -> Result<Option<String>> + Send + Sync;

/// Named evaluator functions.
#[derive(Default)]
pub struct Evaluators {
    functions: FxHashMap<String, Box<EvalFn>>,
}

impl std::fmt::Debug for Evaluators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("Evaluators").field("functions", &names).finish()
    }
}

impl Evaluators {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in functions.
    pub fn with_builtins() -> Self {
        let mut evaluators = Self::new();
        evaluators
            .register("site_title", |ctx, args| {
                expect_args("site_title", args, 0)?;
                Ok(Some(ctx.site_title.to_owned()))
            })
            .register("year", |_, args| {
                expect_args("year", args, 0)?;
                Ok(Some(DateTimeUtc::now().year.to_string()))
            })
            .register("date", |_, args| {
                expect_args("date", args, 0)?;
                Ok(Some(DateTimeUtc::now().to_ymd()))
            })
            .register("now", |_, args| {
                expect_args("now", args, 0)?;
                Ok(Some(DateTimeUtc::now().to_rfc3339()))
            })
            .register("version", |_, args| {
                expect_args("version", args, 0)?;
                Ok(Some(env!("CARGO_PKG_VERSION").to_owned()))
            })
            .register("mode", |ctx, args| {
                expect_args("mode", args, 0)?;
                Ok(Some(ctx.mode.name.to_owned()))
            })
            .register("page", |ctx, args| {
                expect_args("page", args, 0)?;
                Ok(ctx.page.map(|p| display_relative(p, Path::new(""))))
            })
            .register("env", |_, args| {
                expect_args("env", args, 1)?;
                Ok(std::env::var(&args[0]).ok())
            })
            .register("upper", |_, args| {
                expect_args("upper", args, 1)?;
                Ok(Some(args[0].to_uppercase()))
            })
            .register("lower", |_, args| {
                expect_args("lower", args, 1)?;
                Ok(Some(args[0].to_lowercase()))
            })
            .register("concat", |_, args| Ok(Some(args.concat())));
        evaluators
    }

    /// Register (or replace) a function.
    pub fn register<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&EvalContext<'_>, &[String]) -> Result<Option<String>> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Box::new(f));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Evaluate one expression.
    pub fn evaluate(&self, expr: &str, ctx: &EvalContext<'_>) -> Result<String, RenderError> {
        let fail = |message: String| RenderError::Evaluation {
            expr: expr.to_owned(),
            message,
        };

        let call = Call::parse(expr).map_err(fail)?;
        let Some(function) = self.functions.get(call.name) else {
            return Err(fail(format!("unknown function `{}`", call.name)));
        };

        function(ctx, &call.args)
            .map(Option::unwrap_or_default)
            .map_err(|e| fail(format!("{e:#}")))
    }
}

fn expect_args(name: &str, args: &[String], count: usize) -> Result<()> {
    if args.len() != count {
        bail!(
            "`{name}` takes {count} argument{}, got {}",
            crate::utils::plural_s(count),
            args.len()
        );
    }
    Ok(())
}

// ============================================================================
// expression parsing
// ============================================================================

#[derive(Debug, PartialEq, Eq)]
struct Call<'a> {
    name: &'a str,
    args: Vec<String>,
}

impl<'a> Call<'a> {
    fn parse(expr: &'a str) -> Result<Self, String> {
        let expr = expr.trim();
        let name_end = expr
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(expr.len());
        let name = &expr[..name_end];

        if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err("expected a function name".into());
        }

        let rest = expr[name_end..].trim_start();
        if rest.is_empty() {
            return Ok(Self { name, args: vec![] });
        }

        let inner = rest
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .ok_or_else(|| format!("expected `{name}(...)`"))?;

        Ok(Self {
            name,
            args: parse_args(inner)?,
        })
    }
}

fn parse_args(inner: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut chars = inner.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        match chars.peek() {
            None if args.is_empty() => return Ok(args),
            None => return Err("trailing comma".into()),
            Some('"') => {
                chars.next();
                let mut arg = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c @ ('"' | '\\')) => arg.push(c),
                            Some(c) => return Err(format!("unknown escape `\\{c}`")),
                            None => return Err("unterminated string".into()),
                        },
                        Some(c) => arg.push(c),
                        None => return Err("unterminated string".into()),
                    }
                }
                args.push(arg);
            }
            Some(_) => {
                let mut arg = String::new();
                while let Some(c) = chars.next_if(|&c| c != ',') {
                    if matches!(c, '"' | '(' | ')') {
                        return Err(format!("unexpected `{c}` in bare argument"));
                    }
                    arg.push(c);
                }
                let arg = arg.trim_end();
                if arg.is_empty() {
                    return Err("empty argument".into());
                }
                args.push(arg.to_owned());
            }
        }

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            None => return Ok(args),
            Some(',') => continue,
            Some(c) => return Err(format!("expected `,` or `)`, found `{c}`")),
        }
    }
}
