//! Symbolic style value resolution.
//!
//! A [`StyleResolver`] is built once per scan from every style file and the
//! import graph, then shared read-only by all checks.

use super::color::{Hsl, Rgba};
use super::expr::Expr;
use super::scan::{strip_flags, StyleSheet};
use super::symbols::{Binding, SymbolTable};
use crate::graph::DependencyGraph;
use crate::types::{ContentType, SourceFile};

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Maximum number of symbol hops followed while resolving one value.
pub const MAX_RESOLUTION_DEPTH: usize = 32;

/// Resolution budget carried down the evaluation.
#[derive(Debug, Clone, Copy, Default)]
struct Depth {
    /// Symbol hops taken so far.
    hops: usize,
    /// Function calls entered so far, across hops.
    calls: usize,
}

impl Depth {
    fn hop(self) -> Self {
        Self {
            hops: self.hops + 1,
            ..self
        }
    }

    fn nest(self) -> Self {
        Self {
            calls: self.calls + 1,
            ..self
        }
    }
}

/// A resolved style value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A concrete color.
    Color(Rgba),
    /// A number with its unit (empty when unitless).
    Number(f64, String),
    /// Anything else (keywords, strings, unresolvable shorthand parts).
    Text(String),
}

impl Value {
    fn describe(&self) -> String {
        match self {
            Self::Color(c) => c.to_string(),
            Self::Number(v, unit) => format!("{v}{unit}"),
            Self::Text(t) => t.clone(),
        }
    }
}

/// Why a value could not be resolved.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    /// A referenced symbol has no binding in scope.
    #[error("undefined symbol '{0}'")]
    Undefined(String),

    /// The symbol chain is longer than [`MAX_RESOLUTION_DEPTH`] or cyclic.
    #[error("resolution depth limit exceeded at '{0}'")]
    DepthExceeded(String),

    /// The expression calls a function the resolver does not evaluate.
    #[error("unsupported function '{0}()'")]
    Unsupported(String),

    /// A value of the wrong kind was found.
    #[error("expected {expected}, found '{found}'")]
    Type {
        /// What was expected.
        expected: &'static str,
        /// What was found.
        found: String,
    },

    /// The expression text could not be parsed.
    #[error("cannot parse '{0}'")]
    Parse(String),
}

/// Resolves style expressions against per-file symbol tables and import order.
#[derive(Debug, Clone, Default)]
pub struct StyleResolver {
    sheets: HashMap<PathBuf, StyleSheet>,
    tables: HashMap<PathBuf, SymbolTable>,
    imports: HashMap<PathBuf, Vec<PathBuf>>,
}

/// Where an expression is evaluated: bindings after `position` are invisible.
#[derive(Clone, Copy)]
struct Scope<'a> {
    file: &'a Path,
    position: usize,
}

impl StyleResolver {
    /// A resolver with no symbols; only literals resolve.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds symbol tables for every style file.
    #[must_use]
    pub fn build(files: &[SourceFile], graph: &DependencyGraph) -> Self {
        let mut resolver = Self::default();
        for file in files.iter().filter(|f| f.content_type == ContentType::Style) {
            let sheet = StyleSheet::parse(&file.content);
            let table = SymbolTable::from_sheet(&sheet);
            debug!(
                "{}: {} binding(s), {} import(s)",
                file.path.display(),
                table.len(),
                graph.imports_of(&file.path).len()
            );
            resolver.tables.insert(file.path.clone(), table);
            resolver.sheets.insert(file.path.clone(), sheet);
            resolver
                .imports
                .insert(file.path.clone(), graph.imports_of(&file.path).to_vec());
        }
        resolver
    }

    /// Symbol table of a file, if it is a known style file.
    #[must_use]
    pub fn symbols(&self, file: &Path) -> Option<&SymbolTable> {
        self.tables.get(file)
    }

    /// Parsed style sheet of a file, if it is a known style file.
    #[must_use]
    pub fn sheet(&self, file: &Path) -> Option<&StyleSheet> {
        self.sheets.get(file)
    }

    /// The file followed by everything it transitively imports, breadth
    /// first. Cycles are visited once.
    #[must_use]
    pub fn import_closure<'a>(&'a self, file: &'a Path) -> Vec<&'a Path> {
        let mut order = vec![file];
        let mut seen: HashSet<&Path> = HashSet::from([file]);
        let mut next = 0;
        while let Some(current) = order.get(next).copied() {
            next += 1;
            for import in self.imports.get(current).into_iter().flatten() {
                if seen.insert(import.as_path()) {
                    order.push(import.as_path());
                }
            }
        }
        order
    }

    /// Resolves the leading expression of `text` as used at `position` in `file`.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] when the value cannot be reduced.
    pub fn resolve_value(
        &self,
        file: &Path,
        text: &str,
        position: usize,
    ) -> Result<Value, ResolveError> {
        let text = strip_flags(text);
        let expr = Expr::parse(text).ok_or_else(|| ResolveError::Parse(text.to_string()))?;
        self.eval(&expr, Scope { file, position }, Depth::default())
    }

    /// Resolves `text` to a color.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] when the value is not a resolvable color.
    pub fn resolve_color(
        &self,
        file: &Path,
        text: &str,
        position: usize,
    ) -> Result<Rgba, ResolveError> {
        expect_color(self.resolve_value(file, text, position)?)
    }

    /// Resolves the first color among the space-separated parts of a
    /// shorthand value such as `background: url(x.png) $bg no-repeat`.
    ///
    /// # Errors
    ///
    /// Returns the first symbolic failure (undefined, depth, unsupported)
    /// when no part is a color, or a type error if every part resolved to
    /// something else.
    pub fn resolve_shorthand_color(
        &self,
        file: &Path,
        text: &str,
        position: usize,
    ) -> Result<Rgba, ResolveError> {
        let scope = Scope { file, position };
        let mut first_error = None;
        for part in Expr::parse_all(strip_flags(text)) {
            // url(...) parts are opaque.
            if matches!(&part, Expr::Call { name, .. } if name == "url") {
                continue;
            }
            match self.eval(&part, scope, Depth::default()) {
                Ok(Value::Color(c)) => return Ok(c),
                Ok(_) => {}
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        Err(first_error.unwrap_or_else(|| ResolveError::Type {
            expected: "color",
            found: text.to_string(),
        }))
    }

    fn eval(&self, expr: &Expr, scope: Scope<'_>, depth: Depth) -> Result<Value, ResolveError> {
        match expr {
            Expr::Number { value, unit } => Ok(Value::Number(*value, unit.clone())),
            Expr::Hex(hex) => Rgba::from_hex(hex)
                .map(Value::Color)
                .ok_or_else(|| ResolveError::Parse(hex.clone())),
            Expr::Ident(name) => Ok(Rgba::from_name(name)
                .map_or_else(|| Value::Text(name.clone()), Value::Color)),
            Expr::Str(s) => Ok(Value::Text(s.clone())),
            Expr::Var(name) => self.eval_symbol(name, scope, depth),
            Expr::Call { name, .. } if depth.calls >= MAX_RESOLUTION_DEPTH => {
                Err(ResolveError::DepthExceeded(format!("{name}()")))
            }
            Expr::Call { name, args } => self.call(name, args, scope, depth.nest()),
        }
    }

    /// Follows one symbol hop.
    fn eval_symbol(
        &self,
        name: &str,
        scope: Scope<'_>,
        depth: Depth,
    ) -> Result<Value, ResolveError> {
        if depth.hops + 1 >= MAX_RESOLUTION_DEPTH {
            return Err(ResolveError::DepthExceeded(name.to_string()));
        }
        let (file, binding) = self
            .lookup(name, scope)
            .ok_or_else(|| ResolveError::Undefined(name.to_string()))?;
        let expr = Expr::parse(&binding.value)
            .ok_or_else(|| ResolveError::Parse(binding.value.clone()))?;
        let inner = Scope {
            file,
            position: binding.position,
        };
        self.eval(&expr, inner, depth.hop())
    }

    /// Finds the binding visible at `scope`: same file before the use point,
    /// then imports (later imports shadow earlier ones).
    fn lookup<'a>(&'a self, name: &str, scope: Scope<'a>) -> Option<(&'a Path, &'a Binding)> {
        if let Some(table) = self.tables.get(scope.file) {
            if let Some(b) = table.latest_before(name, scope.position) {
                return Some((scope.file, b));
            }
            // Custom properties and Less variables are not order-sensitive.
            if name.starts_with("--") || name.starts_with('@') {
                if let Some(b) = table.latest(name) {
                    return Some((scope.file, b));
                }
            }
        }
        let mut visited = HashSet::from([scope.file]);
        self.lookup_imports(name, scope.file, &mut visited)
    }

    fn lookup_imports<'a>(
        &'a self,
        name: &str,
        file: &'a Path,
        visited: &mut HashSet<&'a Path>,
    ) -> Option<(&'a Path, &'a Binding)> {
        let imports = self.imports.get(file)?;
        for import in imports.iter().rev() {
            let import = import.as_path();
            if !visited.insert(import) {
                continue;
            }
            if let Some(b) = self.tables.get(import).and_then(|t| t.latest(name)) {
                return Some((import, b));
            }
            if let Some(found) = self.lookup_imports(name, import, visited) {
                return Some(found);
            }
        }
        None
    }

    fn call(
        &self,
        name: &str,
        args: &[Expr],
        scope: Scope<'_>,
        depth: Depth,
    ) -> Result<Value, ResolveError> {
        match name {
            "var" => return self.call_var(args, scope, depth),
            "map-get" | "map.get" => return self.call_map_get(args, scope, depth),
            _ => {}
        }

        let values = args
            .iter()
            .map(|a| self.eval(a, scope, depth))
            .collect::<Result<Vec<_>, _>>()?;
        let arg = |i: usize| {
            values.get(i).ok_or_else(|| ResolveError::Type {
                expected: "argument",
                found: format!("{name}() with {} argument(s)", values.len()),
            })
        };
        let color = |i: usize| arg(i).and_then(|v| expect_color(v.clone()));
        let amount = |i: usize| arg(i).and_then(percent);

        let result = match name {
            "rgb" | "rgba" => {
                if let Some(Value::Color(c)) = values.first() {
                    // rgba($color, $alpha)
                    let alpha = values.get(1).map_or(Ok(c.a), alpha)?;
                    c.with_alpha(alpha)
                } else {
                    let channel = |i: usize| arg(i).and_then(rgb_channel);
                    let a = values.get(3).map_or(Ok(1.0), alpha)?;
                    Rgba {
                        r: channel(0)?,
                        g: channel(1)?,
                        b: channel(2)?,
                        a: a.clamp(0.0, 1.0),
                    }
                }
            }
            "hsl" | "hsla" => {
                let hsl = Hsl {
                    h: arg(0).and_then(degrees)?,
                    s: amount(1)?,
                    l: amount(2)?,
                };
                Rgba::from_hsl(hsl, values.get(3).map_or(Ok(1.0), alpha)?)
            }
            "lighten" => color(0)?.adjust_lightness(amount(1)?),
            "darken" => color(0)?.adjust_lightness(-amount(1)?),
            "saturate" => color(0)?.adjust_saturation(amount(1)?),
            "desaturate" => color(0)?.adjust_saturation(-amount(1)?),
            "adjust-hue" | "spin" => color(0)?.adjust_hue(arg(1).and_then(degrees)?),
            "complement" => color(0)?.adjust_hue(180.0),
            "grayscale" | "greyscale" => color(0)?.adjust_saturation(-100.0),
            "invert" => {
                let c = color(0)?;
                let weight = values.get(1).map_or(Ok(100.0), percent)?;
                c.invert().mix(c, weight / 100.0)
            }
            "mix" => {
                let weight = values.get(2).map_or(Ok(50.0), percent)?;
                color(0)?.mix(color(1)?, weight / 100.0)
            }
            "tint" => Rgba::WHITE.mix(color(0)?, amount(1)? / 100.0),
            "shade" => Rgba::BLACK.mix(color(0)?, amount(1)? / 100.0),
            "fade" => color(0)?.with_alpha(arg(1).and_then(alpha)?),
            "fadein" | "fade-in" | "opacify" => {
                let c = color(0)?;
                c.with_alpha(c.a + arg(1).and_then(alpha)?)
            }
            "fadeout" | "fade-out" | "transparentize" => {
                let c = color(0)?;
                c.with_alpha(c.a - arg(1).and_then(alpha)?)
            }
            other => return Err(ResolveError::Unsupported(other.to_string())),
        };
        Ok(Value::Color(result))
    }

    /// `var(--name, fallback)`: the fallback applies only when the property is undefined.
    fn call_var(&self, args: &[Expr], scope: Scope<'_>, depth: Depth) -> Result<Value, ResolveError> {
        let Some(Expr::Ident(name)) = args.first() else {
            return Err(ResolveError::Parse("var()".to_string()));
        };
        match self.eval_symbol(name, scope, depth) {
            Err(ResolveError::Undefined(_)) if args.len() > 1 => {
                self.eval(&args[1], scope, depth)
            }
            other => other,
        }
    }

    /// `map-get($map, key)` reads the `$map.key` entry binding.
    fn call_map_get(
        &self,
        args: &[Expr],
        scope: Scope<'_>,
        depth: Depth,
    ) -> Result<Value, ResolveError> {
        let (Some(Expr::Var(map)), Some(key)) = (args.first(), args.get(1)) else {
            return Err(ResolveError::Parse("map-get()".to_string()));
        };
        let key = match key {
            Expr::Str(k) | Expr::Ident(k) => k.clone(),
            other => match self.eval(other, scope, depth)? {
                Value::Text(k) => k,
                v => v.describe(),
            },
        };
        self.eval_symbol(&format!("{map}.{key}"), scope, depth)
    }
}

fn expect_color(value: Value) -> Result<Rgba, ResolveError> {
    match value {
        Value::Color(c) => Ok(c),
        other => Err(ResolveError::Type {
            expected: "color",
            found: other.describe(),
        }),
    }
}

fn number(value: &Value) -> Result<(f64, &str), ResolveError> {
    match value {
        Value::Number(v, unit) => Ok((*v, unit.as_str())),
        other => Err(ResolveError::Type {
            expected: "number",
            found: other.describe(),
        }),
    }
}

/// A percentage amount; unitless numbers are read as percent.
fn percent(value: &Value) -> Result<f64, ResolveError> {
    number(value).map(|(v, _)| v)
}

/// An alpha value: `50%` or `0.5`.
fn alpha(value: &Value) -> Result<f64, ResolveError> {
    let (v, unit) = number(value)?;
    Ok(if unit == "%" { v / 100.0 } else { v })
}

fn degrees(value: &Value) -> Result<f64, ResolveError> {
    let (v, unit) = number(value)?;
    Ok(match unit {
        "turn" => v * 360.0,
        "rad" => v.to_degrees(),
        "grad" => v * 0.9,
        _ => v,
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rgb_channel(value: &Value) -> Result<u8, ResolveError> {
    let (v, unit) = number(value)?;
    let v = if unit == "%" { v * 2.55 } else { v };
    Ok(v.clamp(0.0, 255.0).round() as u8)
}
