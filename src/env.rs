use std::collections::HashMap;
use std::env as stdenv;
use std::path::{Path, PathBuf};

/// Process environment the menu runs commands in.
///
/// The environment contains:
/// - `vars`: environment variables passed to every spawned command.
/// - `current_dir`: the working directory commands normally run in.
/// - `parent_dir_tools`: tool names whose commands run one directory level up instead.
#[derive(Debug, Clone)]
pub struct Environment {
    pub vars: HashMap<String, String>,
    pub current_dir: PathBuf,
    pub parent_dir_tools: Vec<String>,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    ///
    /// `parent_dir_tools` starts empty; the session fills it from its configuration.
    pub fn new() -> Self {
        let vars = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            vars,
            current_dir,
            parent_dir_tools: Vec::new(),
        }
    }

    pub fn with_parent_dir_tools(mut self, tools: Vec<String>) -> Self {
        self.parent_dir_tools = tools;
        self
    }

    /// Directory `command` should be run from.
    ///
    /// Commands that mention one of `parent_dir_tools` run from the parent of `current_dir`
    /// (or `current_dir` itself when it has no parent).
    pub fn working_dir_for(&self, command: &str) -> PathBuf {
        let wants_parent = self
            .parent_dir_tools
            .iter()
            .any(|tool| !tool.is_empty() && command.contains(tool.as_str()));
        if wants_parent {
            parent_or_self(&self.current_dir)
        } else {
            self.current_dir.clone()
        }
    }

    /// Variables worth showing in an environment report, sorted by name.
    pub fn notable_vars(&self, limit: usize) -> Vec<(&str, &str)> {
        let mut vars: Vec<(&str, &str)> = self
            .vars
            .iter()
            .filter(|(k, _)| k.contains("PATH") || k.contains("SHELL") || k.contains("TERM"))
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        vars.sort();
        vars.truncate(limit);
        vars
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

fn parent_or_self(dir: &Path) -> PathBuf {
    match dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => dir.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use crate::env::Environment;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn env_at(dir: &str, tools: &[&str]) -> Environment {
        Environment {
            vars: HashMap::new(),
            current_dir: PathBuf::from(dir),
            parent_dir_tools: tools.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn tool_commands_run_one_level_up() {
        let env = env_at("/work/project/app", &["supabase"]);

        assert_eq!(
            env.working_dir_for("npx supabase link"),
            PathBuf::from("/work/project")
        );
        assert_eq!(env.working_dir_for("ls -la"), PathBuf::from("/work/project/app"));
    }

    #[test]
    fn root_dir_has_no_parent_to_move_to() {
        let env = env_at("/", &["supabase"]);
        assert_eq!(env.working_dir_for("supabase login"), PathBuf::from("/"));
    }

    #[test]
    fn notable_vars_are_filtered_and_sorted() {
        let mut env = env_at("/", &[]);
        for (key, value) in [("PATH", "/bin"), ("TERM", "xterm"), ("SECRET", "x")] {
            env.vars.insert(key.to_string(), value.to_string());
        }

        let vars = env.notable_vars(5);
        assert_eq!(vars, vec![("PATH", "/bin"), ("TERM", "xterm")]);
    }
}
