//! Menu definitions as they are written, and the checked graph the session runs on.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Name of the menu every session starts in.
pub const ROOT_MENU: &str = "root";

/// Target of an `exec` item that ends the session.
pub const QUIT_COMMAND: &str = "quit";

/// What selecting an item does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// `"menu"`: switch to the menu named by the target.
    Navigate,
    /// `"exec"`: run the target as a command template.
    Execute,
    /// `"debug"`: show the report named by the target.
    Inspect,
}

impl ItemKind {
    pub const WIRE_NAMES: [&'static str; 3] = ["menu", "exec", "debug"];

    pub fn from_wire(kind: &str) -> Option<Self> {
        match kind {
            "menu" => Some(Self::Navigate),
            "exec" => Some(Self::Execute),
            "debug" => Some(Self::Inspect),
            _ => None,
        }
    }

    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Navigate => "menu",
            Self::Execute => "exec",
            Self::Inspect => "debug",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub kind: ItemKind,
    pub target: String,
}

impl MenuItem {
    pub fn new(label: impl Into<String>, kind: ItemKind, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind,
            target: target.into(),
        }
    }

    pub fn is_quit(&self) -> bool {
        self.kind == ItemKind::Execute && self.target == QUIT_COMMAND
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub name: String,
    pub items: Vec<MenuItem>,
}

/// Menus by name, built by [`crate::validate`] (or [`crate::build_unchecked`]) and never changed afterwards.
#[derive(Debug, Clone, Default)]
pub struct MenuGraph {
    menus: BTreeMap<String, Menu>,
}

impl MenuGraph {
    pub(crate) fn from_menus(menus: BTreeMap<String, Menu>) -> Self {
        Self { menus }
    }

    pub fn get(&self, name: &str) -> Option<&Menu> {
        self.menus.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.menus.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.menus.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.menus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }
}

/// Menus as written by the menu author: name to a list of `[label, kind, target]` triples.
///
/// Nothing is checked here; items are kept as raw JSON so that [`crate::validate`] can report
/// every malformed entry instead of failing on the first.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct MenuDefinition {
    menus: BTreeMap<String, Value>,
}

impl MenuDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a menu built from `[label, kind, target]` triples.
    pub fn menu<'a, I>(mut self, name: &str, items: I) -> Self
    where
        I: IntoIterator<Item = [&'a str; 3]>,
    {
        let items = items
            .into_iter()
            .map(|item| Value::Array(item.iter().map(|s| Value::from(*s)).collect()))
            .collect();
        self.menus.insert(name.to_string(), Value::Array(items));
        self
    }

    /// Add (or replace) a menu from arbitrary JSON, well-formed or not.
    pub fn raw_menu(mut self, name: &str, items: Value) -> Self {
        self.menus.insert(name.to_string(), items);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .context("menu definition must be a JSON object of menu name to item list")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("can't read menu file {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("in menu file {}", path.display()))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.menus.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.menus.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.menus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }
}

/// Heading shown for a menu: `root` is "Main Menu", camelCase names are split into words.
pub fn menu_title(name: &str) -> String {
    if name == ROOT_MENU {
        return "Main Menu".to_string();
    }
    let mut title = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if i == 0 {
            title.extend(c.to_uppercase());
        } else {
            if c.is_uppercase() {
                title.push(' ');
            }
            title.push(c);
        }
    }
    title
}

/// Demo menu used when no menu file is given.
pub fn default_menu() -> MenuDefinition {
    MenuDefinition::new()
        .menu(
            ROOT_MENU,
            [
                ["File Operations", "menu", "fileMenu"],
                ["System Tools", "menu", "systemMenu"],
                ["Text Processing", "menu", "textMenu"],
                ["Debug", "menu", "debugMenu"],
                ["Show Current Directory", "exec", "pwd"],
                ["List Files", "exec", "ls -la"],
                ["Quit", "exec", "quit"],
            ],
        )
        .menu(
            "fileMenu",
            [
                ["Create New File", "exec", "touch ${filename} && echo 'File created: ${filename}'"],
                ["Edit File", "exec", "${editor} ${filename}"],
                ["View File", "exec", "cat ${filename}"],
                ["Delete Files", "menu", "deleteMenu"],
                ["Back to Main Menu", "menu", "root"],
            ],
        )
        .menu(
            "deleteMenu",
            [
                ["Delete temp files", "exec", "rm -f *.tmp && echo 'Temp files deleted'"],
                ["Delete log files", "exec", "rm -f *.log && echo 'Log files deleted'"],
                ["Back to Main Menu", "menu", "root"],
            ],
        )
        .menu(
            "systemMenu",
            [
                ["Show System Info", "exec", "uname -a"],
                ["Show Disk Usage", "exec", "df -h"],
                ["Show Running Processes", "exec", "ps aux | head -10"],
                ["Connect to Server", "exec", "ssh ${username}@${serverName}"],
                ["Ping Host", "exec", "ping -c 4 ${hostName}"],
                ["Back to Main Menu", "menu", "root"],
            ],
        )
        .menu(
            "textMenu",
            [
                ["Count all files", "exec", "find . -type f | wc -l"],
                ["Search for TODO comments", "exec", "grep -rn 'TODO' . || echo 'No TODO comments found'"],
                ["Search for text", "exec", "grep -rn '${pattern}' ."],
                ["Back to Main Menu", "menu", "root"],
            ],
        )
        .menu(
            "debugMenu",
            [
                ["Show Variables", "debug", "vars"],
                ["Show Config Details", "debug", "config"],
                ["Show Environment", "debug", "env"],
                ["Show Menu Structure", "debug", "menu"],
                ["Show All Debug Info", "debug", "all"],
            ],
        )
}
