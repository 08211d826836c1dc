use crate::classifier::Classifier;
use crate::command::{CapturedOutput, CommandMode, ProcessRunner};
use crate::config::SessionConfig;
use crate::env::Environment;
use crate::external::ShellRunner;
use crate::input::{EditorInput, LineInput};
use crate::inspect::{INSPECT_TARGETS, InspectTarget, Inspector};
use crate::menu::{ItemKind, MenuGraph, MenuItem, menu_title};
use crate::navigation::{Choice, NavigationState, parse_choice};
use crate::presenter::{PlainPresenter, Presenter, Tone};
use crate::resolver::PromptResolver;
use crate::store::VariableStore;
use crate::substitution::{SubstitutionError, substitute};
use crate::validator::{ValidationReport, build_unchecked, validate};
use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// What the menu loop does after handling one choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Draw the (possibly new) current menu right away.
    Redraw,
    /// Wait for the operator to press Enter first.
    Pause,
    /// Leave the loop.
    Quit,
}

/// One interactive run over a validated menu graph.
///
/// A session owns everything it touches: the graph, the navigation state, the variable store and
/// the line input. Construction fails when the menu does not validate, so a session that exists
/// can always be run.
///
/// Example
/// ```no_run
/// use console_menu::{MenuDefinition, MenuSession, SessionConfig};
///
/// let menu = MenuDefinition::new().menu("root", [["Say hi", "exec", "echo hi"], ["Quit", "exec", "quit"]]);
/// MenuSession::new(SessionConfig::inline(menu))?.run()?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct MenuSession {
    graph: MenuGraph,
    report: ValidationReport,
    nav: NavigationState,
    store: VariableStore,
    classifier: Classifier,
    env: Environment,
    runner: Box<dyn ProcessRunner>,
    input: Box<dyn LineInput>,
    out: Box<dyn Write>,
    presenter: Box<dyn Presenter>,
    show_warnings: bool,
    startup_notices: Vec<(Tone, String)>,
}

impl MenuSession {
    /// Load and check the menu, open the variable store and wire up the terminal collaborators.
    ///
    /// Fails with a [`crate::ValidationError`] (inside the `anyhow::Error`) when the menu is
    /// invalid, or with the load error when the menu file can't be read.
    pub fn new(mut config: SessionConfig) -> Result<Self> {
        let definition = config.load_menu()?;
        let validated = if config.validate {
            validate(&definition)?
        } else {
            build_unchecked(&definition)?
        };
        for warning in &validated.report.warnings {
            if config.warnings {
                warn!(%warning, "menu validation warning");
            } else {
                debug!(%warning, "menu validation warning");
            }
        }

        let (store, startup_notices) = config.open_store();
        let env = Environment::new().with_parent_dir_tools(config.parent_dir_tools.clone());
        let runner = ShellRunner::new(env.vars.clone());

        Ok(Self {
            graph: validated.graph,
            report: validated.report,
            nav: NavigationState::new(),
            store,
            classifier: Classifier::default(),
            env,
            runner: Box::new(runner),
            input: Box::new(EditorInput::new()),
            out: Box::new(std::io::stdout()),
            presenter: Box::new(PlainPresenter),
            show_warnings: config.warnings,
            startup_notices,
        })
    }

    pub fn with_input(mut self, input: impl LineInput + 'static) -> Self {
        self.input = Box::new(input);
        self
    }

    pub fn with_output(mut self, out: impl Write + 'static) -> Self {
        self.out = Box::new(out);
        self
    }

    pub fn with_runner(mut self, runner: impl ProcessRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    pub fn with_presenter(mut self, presenter: impl Presenter + 'static) -> Self {
        self.presenter = Box::new(presenter);
        self
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Run commands from `dir` instead of the process working directory.
    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.env.current_dir = dir.into();
        self
    }

    pub fn nav(&self) -> &NavigationState {
        &self.nav
    }

    pub fn store(&self) -> &VariableStore {
        &self.store
    }

    pub fn graph(&self) -> &MenuGraph {
        &self.graph
    }

    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Show menus and handle choices until the operator quits or closes the input.
    pub fn run(&mut self) -> Result<()> {
        self.say(Tone::Info, "🚀 Console Menu System Started!")?;
        if self.show_warnings {
            let warnings: Vec<String> = self.report.warnings.iter().map(|w| w.to_string()).collect();
            for warning in warnings {
                self.say(Tone::Warning, &format!("Warning: {warning}"))?;
            }
        }
        for (tone, text) in std::mem::take(&mut self.startup_notices) {
            self.say(tone, &text)?;
        }

        while self.nav.is_running() {
            self.render()?;
            let Some(line) = self.input.read_line("> ")? else {
                debug!("input closed at menu prompt");
                self.nav.quit();
                break;
            };
            match self.handle_choice(&line)? {
                Outcome::Redraw | Outcome::Quit => {}
                Outcome::Pause => self.pause()?,
            }
        }
        self.out.flush()?;
        Ok(())
    }

    /// Apply one answer to the menu prompt.
    pub fn handle_choice(&mut self, line: &str) -> Result<Outcome> {
        match parse_choice(line, self.current_items().len()) {
            Ok(Choice::Back) => {
                self.nav.back();
                Ok(Outcome::Redraw)
            }
            Ok(Choice::Quit) => self.quit(),
            Ok(Choice::Item(index)) => self.dispatch(index),
            Err(e) => {
                self.say(Tone::Error, &format!("Invalid choice! {e}"))?;
                Ok(Outcome::Pause)
            }
        }
    }

    /// Act on item `index` (zero-based) of the current menu.
    pub fn dispatch(&mut self, index: usize) -> Result<Outcome> {
        let Some(item) = self.current_items().get(index).cloned() else {
            self.say(Tone::Error, &format!("No item {} in this menu", index + 1))?;
            return Ok(Outcome::Pause);
        };
        debug!(menu = self.nav.current(), label = %item.label, kind = %item.kind, "dispatching item");

        match item.kind {
            ItemKind::Navigate => match self.nav.enter(&item.target, &self.graph) {
                Ok(()) => Ok(Outcome::Redraw),
                Err(e) => {
                    warn!("{e}");
                    self.say(Tone::Error, &format!("Error: {e}"))?;
                    Ok(Outcome::Pause)
                }
            },
            ItemKind::Inspect => {
                self.inspect(&item.target)?;
                Ok(Outcome::Pause)
            }
            ItemKind::Execute if item.is_quit() => self.quit(),
            ItemKind::Execute => self.execute(&item.target),
        }
    }

    fn current_items(&self) -> &[MenuItem] {
        self.graph
            .get(self.nav.current())
            .map_or(&[][..], |menu| menu.items.as_slice())
    }

    fn say(&mut self, tone: Tone, text: &str) -> Result<()> {
        self.presenter.notice(&mut *self.out, tone, text)?;
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let title = menu_title(self.nav.current());
        let items = self
            .graph
            .get(self.nav.current())
            .map_or(&[][..], |menu| menu.items.as_slice());
        self.presenter.render_menu(&mut *self.out, &title, items)?;
        self.out.flush()?;
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        let prompt = format!("\n{}", self.presenter.pause_prompt());
        self.say(Tone::Info, &prompt)?;
        self.out.flush()?;
        if self.input.read_line("")?.is_none() {
            debug!("input closed at pause prompt");
            self.nav.quit();
        }
        Ok(())
    }

    fn quit(&mut self) -> Result<Outcome> {
        self.say(Tone::Info, "\nGoodbye! 👋")?;
        self.nav.quit();
        Ok(Outcome::Quit)
    }

    fn inspect(&mut self, target: &str) -> Result<()> {
        self.say(Tone::Info, &format!("\n🐛 Debug: {target}"))?;
        self.say(Tone::Info, &"═".repeat(50))?;
        match InspectTarget::parse(target) {
            Some(target) => {
                let inspector = Inspector {
                    store: &self.store,
                    env: &self.env,
                    nav: &self.nav,
                    graph: &self.graph,
                };
                inspector.write(&mut *self.out, target)?;
            }
            None => {
                self.say(Tone::Error, &format!("Unknown debug type: {target}"))?;
                self.say(Tone::Info, &format!("Available debug types: {INSPECT_TARGETS}"))?;
            }
        }
        Ok(())
    }

    fn execute(&mut self, template: &str) -> Result<Outcome> {
        let substituted = {
            let mut resolver = PromptResolver::new(
                &mut *self.input,
                &mut self.store,
                &mut *self.out,
                &*self.presenter,
            );
            substitute(template, &mut resolver)
        };
        let command = match substituted {
            Ok(command) => command,
            Err(SubstitutionError::Cancelled { variable }) => {
                debug!(%variable, "command cancelled");
                self.say(Tone::Warning, &format!("No value provided for variable: {variable}"))?;
                self.say(Tone::Info, "Command cancelled due to missing variables.")?;
                return Ok(Outcome::Pause);
            }
            Err(SubstitutionError::Input(e)) => return Err(e),
        };

        let cwd = self.env.working_dir_for(&command);
        let mode = self.classifier.classify(&command);
        info!(%command, ?mode, cwd = %cwd.display(), "running menu command");

        match mode {
            CommandMode::Plain => {
                self.say(Tone::Info, &format!("\nExecuting: {command}\n"))?;
                self.out.flush()?;
                match self.runner.run_captured(&command, &cwd) {
                    Ok(output) => self.report_captured(&output)?,
                    Err(e) => {
                        error!("{e:#}");
                        self.say(Tone::Error, &format!("Error: {e:#}"))?;
                    }
                }
            }
            CommandMode::Interactive => {
                self.say(Tone::Info, &format!("\nExecuting interactive command: {command}"))?;
                self.say(Tone::Info, "🔄 Handing control to interactive session...\n")?;
                self.out.flush()?;

                self.input.release();
                let result = self.runner.run_interactive(&command, &cwd);
                self.input.reacquire()?;

                match result {
                    Ok(0) => self.say(Tone::Success, "Command completed with exit code: 0")?,
                    Ok(code) => {
                        self.say(Tone::Warning, &format!("Command completed with exit code: {code}"))?
                    }
                    Err(e) => {
                        error!("{e:#}");
                        self.say(Tone::Error, &format!("Error running interactive command: {e:#}"))?;
                    }
                }
            }
        }
        Ok(Outcome::Pause)
    }

    fn report_captured(&mut self, output: &CapturedOutput) -> Result<()> {
        let stdout = output.stdout.trim_end();
        let stderr = output.stderr.trim_end();
        if !output.success() {
            warn!(exit_code = output.exit_code, "menu command failed");
            self.say(
                Tone::Error,
                &format!("Error: command failed with exit code {}", output.exit_code),
            )?;
            if !stderr.is_empty() {
                self.say(Tone::Info, stderr)?;
            }
            return Ok(());
        }
        if !stderr.is_empty() {
            self.say(Tone::Warning, &format!("Warning: {stderr}"))?;
        }
        if !stdout.is_empty() {
            self.say(Tone::Info, stdout)?;
        }
        Ok(())
    }
}
