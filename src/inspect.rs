//! Reports behind `debug` menu items.

use crate::env::Environment;
use crate::menu::MenuGraph;
use crate::navigation::NavigationState;
use crate::store::VariableStore;
use std::env::consts;
use std::io::{Result, Write};

/// Names accepted as the target of a `debug` item, as listed to the operator.
pub const INSPECT_TARGETS: &str = "vars, config, env, menu, all";

const SEPARATOR_WIDTH: usize = 30;
const VALUE_PREVIEW: usize = 3;
const ENV_VAR_LIMIT: usize = 5;
const ENV_VALUE_WIDTH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectTarget {
    Variables,
    Config,
    Environment,
    Menu,
    All,
}

impl InspectTarget {
    /// Case-insensitive; `variables` and `environment` are accepted as long forms.
    pub fn parse(target: &str) -> Option<Self> {
        match target.trim().to_ascii_lowercase().as_str() {
            "vars" | "variables" => Some(Self::Variables),
            "config" => Some(Self::Config),
            "env" | "environment" => Some(Self::Environment),
            "menu" => Some(Self::Menu),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

/// Read-only view of a running session.
pub struct Inspector<'a> {
    pub store: &'a VariableStore,
    pub env: &'a Environment,
    pub nav: &'a NavigationState,
    pub graph: &'a MenuGraph,
}

impl Inspector<'_> {
    pub fn write(&self, out: &mut dyn Write, target: InspectTarget) -> Result<()> {
        match target {
            InspectTarget::Variables => self.variables(out),
            InspectTarget::Config => self.config(out),
            InspectTarget::Environment => self.environment(out),
            InspectTarget::Menu => self.menu(out),
            InspectTarget::All => {
                let separator = "─".repeat(SEPARATOR_WIDTH);
                self.variables(out)?;
                writeln!(out, "\n{separator}")?;
                self.config(out)?;
                writeln!(out, "\n{separator}")?;
                self.environment(out)?;
                writeln!(out, "\n{separator}")?;
                self.menu(out)
            }
        }
    }

    fn variables(&self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "📋 Configuration Variables:")?;
        if self.store.is_empty() {
            return writeln!(out, "  No variables configured");
        }
        writeln!(out, "  {} variable(s)", self.store.len())?;
        for (name, values) in self.store.iter() {
            let preview = values
                .iter()
                .take(VALUE_PREVIEW)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            let more = match values.len().checked_sub(VALUE_PREVIEW) {
                Some(extra) if extra > 0 => format!(" (+{extra} more)"),
                _ => String::new(),
            };
            writeln!(out, "  🔹 {name} ({}): {preview}{more}", values.len())?;
        }
        Ok(())
    }

    fn config(&self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "⚙️  Configuration Details:")?;
        match self.store.path() {
            Some(path) => {
                writeln!(out, "  Config file: {}", path.display())?;
                writeln!(out, "  Variables count: {}", self.store.len())?;
                writeln!(out, "  Config exists: {}", path.exists())
            }
            None => {
                writeln!(out, "  Config file: (in memory)")?;
                writeln!(out, "  Variables count: {}", self.store.len())
            }
        }
    }

    fn environment(&self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "🌍 Environment Information:")?;
        writeln!(out, "  Working directory: {}", self.env.current_dir.display())?;
        writeln!(out, "  Platform: {}", consts::OS)?;
        writeln!(out, "  Architecture: {}", consts::ARCH)?;

        let vars = self.env.notable_vars(ENV_VAR_LIMIT);
        if !vars.is_empty() {
            writeln!(out, "  Key environment variables:")?;
            for (key, value) in vars {
                writeln!(out, "    {key}={}", truncate(value, ENV_VALUE_WIDTH))?;
            }
        }
        Ok(())
    }

    fn menu(&self, out: &mut dyn Write) -> Result<()> {
        let current = self.nav.current();
        let items = self.graph.get(current).map_or(0, |menu| menu.items.len());
        writeln!(out, "📁 Menu Structure:")?;
        writeln!(out, "  Current menu: {current}")?;
        writeln!(out, "  Menu history: [{}]", self.nav.history().join(" → "))?;
        writeln!(
            out,
            "  Available menus: {}",
            self.graph.names().collect::<Vec<_>>().join(", ")
        )?;
        writeln!(out, "  Current menu items: {items}")
    }
}

fn truncate(value: &str, width: usize) -> String {
    match value.char_indices().nth(width) {
        Some((cut, _)) => format!("{}...", &value[..cut]),
        None => value.to_string(),
    }
}
