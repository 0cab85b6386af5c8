//! Import dependency graph over style files.
//!
//! An edge `A -> B` means stylesheet `A` imports (`@import`, `@use`,
//! `@forward`) stylesheet `B`. Targets that do not match a scanned file
//! (packages, URLs, `sass:` built-ins) are dropped.

use crate::style::scan::StyleSheet;
use crate::types::{ContentType, SourceFile};

use petgraph::algo::dijkstra;
use petgraph::graph::{DiGraph, NodeIndex};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// Extensions tried, in order, for extension-less import targets.
const STYLE_EXTENSIONS: &[&str] = &["scss", "sass", "css", "less"];

/// Directed import graph.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<PathBuf, ()>,
    index: HashMap<PathBuf, NodeIndex>,
    imports: HashMap<PathBuf, Vec<PathBuf>>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph from the style files among `files`.
    #[must_use]
    pub fn build(files: &[SourceFile]) -> Self {
        let styles: Vec<&SourceFile> = files
            .iter()
            .filter(|f| f.content_type == ContentType::Style)
            .collect();

        let mut graph = Self::new();
        let mut lookup = TargetLookup::default();
        for file in &styles {
            graph.add_file(&file.path);
            lookup.insert(&file.path);
        }

        for file in &styles {
            for target in import_targets(&file.content) {
                match lookup.resolve(&file.path, &target) {
                    Some(resolved) => graph.add_import(&file.path, &resolved),
                    None => debug!(
                        "Dropping unresolved import '{}' in {}",
                        target,
                        file.path.display()
                    ),
                }
            }
        }

        debug!(
            "Built dependency graph: {} node(s), {} edge(s)",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }

    /// Adds a node if it does not exist yet.
    pub fn add_file(&mut self, path: &Path) -> NodeIndex {
        if let Some(&idx) = self.index.get(path) {
            return idx;
        }
        let idx = self.graph.add_node(path.to_path_buf());
        self.index.insert(path.to_path_buf(), idx);
        idx
    }

    /// Adds an import edge, creating nodes as needed. Duplicate edges are ignored.
    pub fn add_import(&mut self, from: &Path, to: &Path) {
        let a = self.add_file(from);
        let b = self.add_file(to);
        let list = self.imports.entry(from.to_path_buf()).or_default();
        if list.iter().any(|p| p == to) {
            return;
        }
        list.push(to.to_path_buf());
        self.graph.add_edge(a, b, ());
    }

    /// Direct imports of a file, in source order.
    #[must_use]
    pub fn imports_of(&self, path: &Path) -> &[PathBuf] {
        self.imports.get(path).map_or(&[], Vec::as_slice)
    }

    /// Returns true if the file is a node of the graph.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.index.contains_key(path)
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Shortest import distance from `path` to every file in its import
    /// closure, including itself at distance 0. Files outside the graph
    /// only reach themselves. Cycles are safe.
    #[must_use]
    pub fn distances_from(&self, path: &Path) -> HashMap<PathBuf, usize> {
        let Some(&start) = self.index.get(path) else {
            return HashMap::from([(path.to_path_buf(), 0)]);
        };
        dijkstra(&self.graph, start, None, |_| 1usize)
            .into_iter()
            .map(|(node, dist)| (self.graph[node].clone(), dist))
            .collect()
    }
}

static QUOTED: OnceLock<Regex> = OnceLock::new();

#[allow(clippy::expect_used)]
fn quoted_pattern() -> &'static Regex {
    QUOTED.get_or_init(|| Regex::new(r#"["']([^"']+)["']"#).expect("valid regex"))
}

/// Extracts raw import targets from `@import`, `@use` and `@forward` statements.
#[must_use]
pub fn import_targets(content: &str) -> Vec<String> {
    let sheet = StyleSheet::parse(content);
    let mut targets = Vec::new();
    for stmt in &sheet.statements {
        let all = match stmt.name.as_str() {
            "import" => true,
            "use" | "forward" => false,
            _ => continue,
        };
        // Less import options: `@import (reference) "x";`
        let params = stmt.params.trim_start();
        let params = if params.starts_with('(') {
            params.find(')').map_or(params, |i| &params[i + 1..])
        } else {
            params
        };
        if params.contains("url(") {
            continue;
        }
        for cap in quoted_pattern().captures_iter(params) {
            let target = cap[1].trim();
            if !is_external(target) {
                targets.push(target.to_string());
            }
            if !all {
                break;
            }
        }
    }
    targets
}

fn is_external(target: &str) -> bool {
    target.contains("://")
        || target.starts_with("sass:")
        || target.starts_with('~')
        || target.starts_with("//")
}

/// Maps import targets to known style files.
#[derive(Debug, Default)]
struct TargetLookup {
    exact: HashMap<PathBuf, PathBuf>,
    by_key: HashMap<PathBuf, Vec<PathBuf>>,
}

impl TargetLookup {
    fn insert(&mut self, path: &Path) {
        let normalized = normalize(path);
        self.exact.insert(normalized.clone(), path.to_path_buf());
        let entry = self.by_key.entry(partial_key(&normalized)).or_default();
        entry.push(path.to_path_buf());
        entry.sort();
    }

    fn resolve(&self, importer: &Path, target: &str) -> Option<PathBuf> {
        let dir = importer.parent().unwrap_or_else(|| Path::new(""));
        let joined = normalize(&dir.join(target));

        if let Some(hit) = self.exact.get(&joined) {
            return Some(hit.clone());
        }
        for ext in STYLE_EXTENSIONS {
            if let Some(hit) = self.exact.get(&with_extra_extension(&joined, ext)) {
                return Some(hit.clone());
            }
        }
        let key = partial_key(&joined);
        if let Some(hit) = self.by_key.get(&key).and_then(|v| v.first()) {
            return Some(hit.clone());
        }
        self.by_key
            .get(&key.join("index"))
            .and_then(|v| v.first())
            .cloned()
    }
}

/// Appends an extension without replacing dotted names like `theme.dark`.
fn with_extra_extension(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

/// Lookup key: style extension removed and a leading non-alphanumeric
/// marker stripped from the file name (`_x.scss` is imported as `x`).
fn partial_key(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    for ext in STYLE_EXTENSIONS {
        if let Some(stem) = name.strip_suffix(&format!(".{ext}")) {
            name = stem.to_string();
            break;
        }
    }
    let name = name.trim_start_matches(|c: char| !c.is_alphanumeric());
    path.with_file_name(name)
}

/// Lexically normalizes `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
