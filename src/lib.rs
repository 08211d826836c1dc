//! An interactive terminal menu runner.
//!
//! Menus are described as a mapping from menu name to a list of `[label, kind, target]` items,
//! either inline or in a JSON file. An item opens another menu (`"menu"`), runs a shell command
//! (`"exec"`), or shows a report about the running session (`"debug"`). Command templates may
//! contain `${name}` placeholders; the operator is asked for each value and recent values are
//! remembered in a JSON file.
//!
//! The definition is checked with [`validate`] before anything runs. Commands that need the
//! terminal (editors, `ssh`, `sudo`, REPLs, ...) are recognised by [`classify`] and get it for
//! the duration of the run; everything else is run with its output captured.
//!
//! The main entry point is [`MenuSession`], built from a [`SessionConfig`].

pub mod classifier;
pub mod command;
pub mod config;
pub mod env;
mod external;
pub mod input;
pub mod inspect;
mod io_adapters;
pub mod menu;
pub mod navigation;
pub mod presenter;
mod resolver;
mod session;
pub mod store;
pub mod substitution;
pub mod validator;

pub use classifier::{Classifier, classify};
pub use command::{CapturedOutput, CommandMode, ExitCode, ProcessRunner};
pub use config::{MenuSource, SessionConfig};
pub use external::ShellRunner;
pub use input::{EditorInput, LineInput};
pub use menu::{ItemKind, Menu, MenuDefinition, MenuGraph, MenuItem, default_menu, menu_title};
pub use navigation::{Choice, ChoiceError, NavigationError, NavigationState};
pub use presenter::{PlainPresenter, Presenter, Tone};
pub use resolver::PromptResolver;
pub use session::{MenuSession, Outcome};
pub use store::VariableStore;
pub use substitution::{SubstitutionError, VariableResolver, extract_variables, substitute};
pub use validator::{Issue, Validated, ValidationError, ValidationReport, Warning, build_unchecked, validate};

/// In-memory stand-ins for the terminal, used to drive sessions from tests.
pub use io_adapters::{InputLog, MemWriter, ScriptedInput};
