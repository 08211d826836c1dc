//! Checks a [`MenuDefinition`] before any session may start.
//!
//! Fatal problems are collected rather than returned one by one, so the menu author sees all of
//! them at once. A missing `root` menu is the only check that stops validation immediately.

use crate::menu::{ItemKind, Menu, MenuDefinition, MenuGraph, MenuItem, QUIT_COMMAND, ROOT_MENU};
use crate::substitution::extract_variables;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// A fatal problem found in a menu definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Issue {
    #[error("menu '{menu}' must be a list of items")]
    MenuNotList { menu: String },

    #[error("menu '{menu}' item {index}: {reason}")]
    MalformedItem {
        menu: String,
        index: usize,
        reason: String,
    },

    #[error("menu '{name}' is referenced but not defined")]
    UndefinedMenu { name: String },

    #[error("circular menu reference detected: {}", .path.join(" → "))]
    CircularReference { path: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("menu structure must have a 'root' menu")]
    MissingRootMenu,

    #[error("menu structure validation failed with {} error(s):\n{}", .issues.len(), list(.issues))]
    Invalid { issues: Vec<Issue> },
}

fn list(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|issue| format!("  - {issue}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A non-fatal finding. Shown to the operator (unless disabled) and never blocks startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    EmptyMenu { menu: String },
    UnreferencedMenu { menu: String },
    /// Variables used by more than one command; each command asks for them separately.
    DuplicateVariables { names: Vec<String> },
    MisnamedQuit { menu: String, index: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::EmptyMenu { menu } => write!(f, "menu '{menu}' is empty"),
            Warning::UnreferencedMenu { menu } => {
                write!(f, "menu '{menu}' is defined but never referenced")
            }
            Warning::DuplicateVariables { names } => {
                write!(f, "duplicate variables found: {}", names.join(", "))
            }
            Warning::MisnamedQuit { menu, index } => write!(
                f,
                "menu '{menu}' item {index}: 'quit' command should probably be named 'Quit'"
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub warnings: Vec<Warning>,
    pub menu_count: usize,
    pub variable_count: usize,
}

/// Result of a successful validation: the graph to run and what was noticed on the way.
#[derive(Debug, Clone)]
pub struct Validated {
    pub graph: MenuGraph,
    pub report: ValidationReport,
}

#[derive(Default)]
struct Collector {
    issues: Vec<Issue>,
    warnings: Vec<Warning>,
    referenced: Vec<String>,
    variables: Vec<String>,
    duplicates: Vec<String>,
}

impl Collector {
    fn malformed(&mut self, menu: &str, index: usize, reason: impl Into<String>) {
        self.issues.push(Issue::MalformedItem {
            menu: menu.to_string(),
            index,
            reason: reason.into(),
        });
    }

    fn menu(&mut self, name: &str, raw: &Value) -> Option<Menu> {
        let Value::Array(raw_items) = raw else {
            self.issues.push(Issue::MenuNotList {
                menu: name.to_string(),
            });
            return None;
        };
        if raw_items.is_empty() {
            self.warnings.push(Warning::EmptyMenu {
                menu: name.to_string(),
            });
        }

        let mut items = Vec::with_capacity(raw_items.len());
        for (index, raw_item) in raw_items.iter().enumerate() {
            if let Some(item) = self.item(name, index, raw_item) {
                items.push(item);
            }
        }
        Some(Menu {
            name: name.to_string(),
            items,
        })
    }

    fn item(&mut self, menu: &str, index: usize, raw: &Value) -> Option<MenuItem> {
        let fields = match raw {
            Value::Array(fields) if fields.len() == 3 => fields,
            _ => {
                self.malformed(
                    menu,
                    index,
                    "must be a list with exactly 3 elements [label, kind, target]",
                );
                return None;
            }
        };

        let label = non_blank(&fields[0]);
        if label.is_none() {
            self.malformed(menu, index, "label must be a non-empty string");
        }

        let kind = fields[1].as_str().and_then(ItemKind::from_wire);
        if kind.is_none() {
            self.malformed(
                menu,
                index,
                format!("kind must be 'menu', 'exec', or 'debug', got {}", fields[1]),
            );
        }

        let target = non_blank(&fields[2]);
        if target.is_none() {
            self.malformed(menu, index, "target must be a non-empty string");
        }

        if let (Some(kind), Some(target)) = (kind, target) {
            self.track(menu, index, kind, target, label);
        }

        Some(MenuItem::new(label?, kind?, target?))
    }

    fn track(&mut self, menu: &str, index: usize, kind: ItemKind, target: &str, label: Option<&str>) {
        match kind {
            ItemKind::Navigate if target != ROOT_MENU => {
                if !self.referenced.iter().any(|r| r == target) {
                    self.referenced.push(target.to_string());
                }
            }
            ItemKind::Execute => {
                for name in extract_variables(target) {
                    if !self.variables.contains(&name) {
                        self.variables.push(name);
                    } else if !self.duplicates.contains(&name) {
                        self.duplicates.push(name);
                    }
                }
                let quit_named_quit = label.is_none_or(|l| l.eq_ignore_ascii_case(QUIT_COMMAND));
                if target == QUIT_COMMAND && !quit_named_quit {
                    self.warnings.push(Warning::MisnamedQuit {
                        menu: menu.to_string(),
                        index,
                    });
                }
            }
            _ => {}
        }
    }
}

fn non_blank(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}

/// Check `definition` and build the immutable [`MenuGraph`] from it.
pub fn validate(definition: &MenuDefinition) -> Result<Validated, ValidationError> {
    if definition.get(ROOT_MENU).is_none() {
        return Err(ValidationError::MissingRootMenu);
    }

    let mut collector = Collector::default();
    let mut menus = BTreeMap::new();
    for (name, raw) in definition.iter() {
        if let Some(menu) = collector.menu(name, raw) {
            menus.insert(name.to_string(), menu);
        }
    }

    for name in definition.iter().map(|(name, _)| name) {
        if name != ROOT_MENU && !collector.referenced.iter().any(|r| r == name) {
            collector.warnings.push(Warning::UnreferencedMenu {
                menu: name.to_string(),
            });
        }
    }
    for name in &collector.referenced {
        if definition.get(name).is_none() {
            collector.issues.push(Issue::UndefinedMenu { name: name.clone() });
        }
    }

    if let Some(path) = find_cycle(&menus) {
        collector.issues.push(Issue::CircularReference { path });
    }

    if !collector.duplicates.is_empty() {
        collector.warnings.push(Warning::DuplicateVariables {
            names: collector.duplicates.clone(),
        });
    }

    if !collector.issues.is_empty() {
        return Err(ValidationError::Invalid {
            issues: collector.issues,
        });
    }

    let report = ValidationReport {
        warnings: collector.warnings,
        menu_count: menus.len(),
        variable_count: collector.variables.len(),
    };
    debug!(
        menus = report.menu_count,
        variables = report.variable_count,
        warnings = report.warnings.len(),
        "menu structure validated"
    );
    Ok(Validated {
        graph: MenuGraph::from_menus(menus),
        report,
    })
}

/// Build a graph without enforcing the structural checks.
///
/// `root` is still required. Malformed items and non-list menus are dropped and logged, dangling
/// references and cycles are left in place; the session reports a missing target when it is
/// selected.
pub fn build_unchecked(definition: &MenuDefinition) -> Result<Validated, ValidationError> {
    if definition.get(ROOT_MENU).is_none() {
        return Err(ValidationError::MissingRootMenu);
    }

    let mut collector = Collector::default();
    let mut menus = BTreeMap::new();
    for (name, raw) in definition.iter() {
        if let Some(menu) = collector.menu(name, raw) {
            menus.insert(name.to_string(), menu);
        }
    }
    for issue in &collector.issues {
        warn!(%issue, "ignoring menu problem, validation is disabled");
    }

    let report = ValidationReport {
        warnings: Vec::new(),
        menu_count: menus.len(),
        variable_count: collector.variables.len(),
    };
    Ok(Validated {
        graph: MenuGraph::from_menus(menus),
        report,
    })
}

/// Depth-first search from `root` over navigation edges.
///
/// Edges back to `root` and to undefined menus are not followed. A cycle of exactly two menus
/// (A opens B, B goes back to A) is ordinary back navigation and is allowed wherever it sits on the
/// path, not only when A is the first menu after `root`. The first other cycle found is returned as
/// the full path from `root`.
fn find_cycle(menus: &BTreeMap<String, Menu>) -> Option<Vec<String>> {
    let names: Vec<&str> = menus.keys().map(String::as_str).collect();
    let index: HashMap<&str, usize> = names.iter().enumerate().map(|(i, n)| (*n, i)).collect();
    let edges: Vec<Vec<usize>> = menus
        .values()
        .map(|menu| {
            menu.items
                .iter()
                .filter(|item| item.kind == ItemKind::Navigate && item.target != ROOT_MENU)
                .filter_map(|item| index.get(item.target.as_str()).copied())
                .collect()
        })
        .collect();

    let root = *index.get(ROOT_MENU)?;
    let mut search = CycleSearch {
        edges: &edges,
        visited: vec![false; names.len()],
        on_stack: vec![false; names.len()],
        path: Vec::new(),
    };
    search
        .visit(root)
        .map(|cycle| cycle.into_iter().map(|i| names[i].to_string()).collect())
}

struct CycleSearch<'a> {
    edges: &'a [Vec<usize>],
    visited: Vec<bool>,
    on_stack: Vec<bool>,
    path: Vec<usize>,
}

impl CycleSearch<'_> {
    fn visit(&mut self, node: usize) -> Option<Vec<usize>> {
        if self.on_stack[node] {
            let start = self.path.iter().position(|&n| n == node)?;
            if self.path.len() - start == 2 {
                return None;
            }
            let mut cycle = self.path.clone();
            cycle.push(node);
            return Some(cycle);
        }
        if self.visited[node] {
            return None;
        }

        self.visited[node] = true;
        self.on_stack[node] = true;
        self.path.push(node);

        let edges = self.edges;
        for &next in &edges[node] {
            if let Some(cycle) = self.visit(next) {
                return Some(cycle);
            }
        }

        self.path.pop();
        self.on_stack[node] = false;
        None
    }
}
