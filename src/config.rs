use crate::menu::MenuDefinition;
use crate::presenter::Tone;
use crate::store::VariableStore;
use anyhow::Result;
use std::path::PathBuf;
use tracing::warn;

/// Where recent variable values are kept unless configured otherwise.
pub const DEFAULT_VARIABLES_FILE: &str = "./menu-config.json";

#[derive(Debug, Clone)]
pub enum MenuSource {
    Inline(MenuDefinition),
    /// JSON file holding a [`MenuDefinition`].
    File(PathBuf),
}

/// Everything needed to start a [`crate::MenuSession`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub menu: MenuSource,
    pub variables_file: PathBuf,
    /// `.env` files whose values seed the store at start.
    pub env_files: Vec<PathBuf>,
    /// Variables added at start unless the store already has them.
    pub seed: Vec<(String, Vec<String>)>,
    /// Use this store instead of opening `variables_file`.
    pub store: Option<VariableStore>,
    pub validate: bool,
    pub warnings: bool,
    /// Commands mentioning one of these run from the parent directory.
    pub parent_dir_tools: Vec<String>,
}

impl SessionConfig {
    fn with_menu(menu: MenuSource) -> Self {
        Self {
            menu,
            variables_file: PathBuf::from(DEFAULT_VARIABLES_FILE),
            env_files: Vec::new(),
            seed: Vec::new(),
            store: None,
            validate: true,
            warnings: true,
            parent_dir_tools: vec!["supabase".to_string()],
        }
    }

    pub fn inline(definition: MenuDefinition) -> Self {
        Self::with_menu(MenuSource::Inline(definition))
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::with_menu(MenuSource::File(path.into()))
    }

    pub fn with_variables_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.variables_file = path.into();
        self
    }

    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_files.push(path.into());
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.seed.push((name.into(), values));
        self
    }

    pub fn with_store(mut self, store: VariableStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate = enabled;
        self
    }

    pub fn with_warnings(mut self, enabled: bool) -> Self {
        self.warnings = enabled;
        self
    }

    pub fn with_parent_dir_tools(mut self, tools: Vec<String>) -> Self {
        self.parent_dir_tools = tools;
        self
    }

    pub fn load_menu(&self) -> Result<MenuDefinition> {
        match &self.menu {
            MenuSource::Inline(definition) => Ok(definition.clone()),
            MenuSource::File(path) => MenuDefinition::from_file(path),
        }
    }

    /// Build the variable store and seed it. Problems with env files do not stop startup; they
    /// come back as messages for the operator.
    pub(crate) fn open_store(&mut self) -> (VariableStore, Vec<(Tone, String)>) {
        let mut store = self
            .store
            .take()
            .unwrap_or_else(|| VariableStore::open(&self.variables_file));
        let mut notices = Vec::new();

        for path in &self.env_files {
            match store.load_env_file(path) {
                Ok(added) => notices.push((
                    Tone::Success,
                    format!("Loaded {added} value(s) from {}", path.display()),
                )),
                Err(e) => {
                    warn!("skipping environment file: {e:#}");
                    notices.push((Tone::Warning, format!("{e:#}")));
                }
            }
        }
        for (name, values) in &self.seed {
            store.add_variable(name, values.clone());
        }
        (store, notices)
    }
}
