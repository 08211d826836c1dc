use anyhow::Result;
use console_menu::{
    CapturedOutput, ExitCode, InputLog, MemWriter, MenuDefinition, MenuSession, ProcessRunner,
    ScriptedInput, SessionConfig, ValidationError, VariableStore,
};
use std::cell::RefCell;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Call {
    command: String,
    cwd: PathBuf,
    interactive: bool,
}

struct FakeRunner {
    calls: Rc<RefCell<Vec<Call>>>,
    output: CapturedOutput,
}

impl FakeRunner {
    fn record(&self, command: &str, cwd: &Path, interactive: bool) {
        self.calls.borrow_mut().push(Call {
            command: command.to_string(),
            cwd: cwd.to_path_buf(),
            interactive,
        });
    }
}

impl ProcessRunner for FakeRunner {
    fn run_captured(&mut self, command: &str, cwd: &Path) -> Result<CapturedOutput> {
        self.record(command, cwd, false);
        Ok(self.output.clone())
    }

    fn run_interactive(&mut self, command: &str, cwd: &Path) -> Result<ExitCode> {
        self.record(command, cwd, true);
        Ok(self.output.exit_code)
    }
}

/// Runner whose commands can never be started.
struct BrokenRunner;

impl ProcessRunner for BrokenRunner {
    fn run_captured(&mut self, command: &str, _cwd: &Path) -> Result<CapturedOutput> {
        anyhow::bail!("failed to spawn `{command}`")
    }

    fn run_interactive(&mut self, command: &str, _cwd: &Path) -> Result<ExitCode> {
        anyhow::bail!("failed to spawn `{command}`")
    }
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

/// Build a session with `config` under a `warn` level subscriber and return what it logged.
fn logs_while_building(config: SessionConfig) -> String {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_env_filter(EnvFilter::new("warn"))
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        MenuSession::new(config).unwrap();
    });
    logs.contents()
}

fn runner_menu() -> MenuDefinition {
    MenuDefinition::new().menu(
        "root",
        [
            ["List", "exec", "ls"],
            ["Edit", "exec", "vim notes.txt"],
            ["Quit", "exec", "quit"],
        ],
    )
}

struct Harness {
    session: MenuSession,
    out: Rc<RefCell<Vec<u8>>>,
    log: Rc<RefCell<InputLog>>,
    calls: Rc<RefCell<Vec<Call>>>,
}

impl Harness {
    fn new(config: SessionConfig, lines: &[&str], output: CapturedOutput) -> Self {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let runner = FakeRunner {
            calls: calls.clone(),
            output,
        };
        Self::with_runner(config, lines, runner, calls)
    }

    fn with_runner(
        config: SessionConfig,
        lines: &[&str],
        runner: impl ProcessRunner + 'static,
        calls: Rc<RefCell<Vec<Call>>>,
    ) -> Self {
        let (writer, out) = MemWriter::with_handle();
        let (input, log) = ScriptedInput::with_log(lines.iter().copied());
        let session = MenuSession::new(config)
            .unwrap()
            .with_input(input)
            .with_output(writer)
            .with_runner(runner)
            .with_current_dir("/work/project");
        Self {
            session,
            out,
            log,
            calls,
        }
    }

    fn inline(def: MenuDefinition, lines: &[&str]) -> Self {
        let config = SessionConfig::inline(def).with_store(VariableStore::in_memory());
        Self::new(config, lines, stdout("ok\n"))
    }

    fn run(mut self) -> Self {
        self.session.run().unwrap();
        self
    }

    fn output(&self) -> String {
        String::from_utf8(self.out.borrow().clone()).unwrap()
    }

    fn prompts(&self) -> Vec<String> {
        self.log.borrow().prompts.clone()
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

fn stdout(text: &str) -> CapturedOutput {
    CapturedOutput {
        stdout: text.to_string(),
        ..CapturedOutput::default()
    }
}

fn tools_menu() -> MenuDefinition {
    MenuDefinition::new()
        .menu(
            "root",
            [
                ["Tools", "menu", "toolsMenu"],
                ["Ping", "exec", "ping -c 1 ${host}"],
                ["Edit", "exec", "vim ${file}"],
                ["Variables", "debug", "vars"],
                ["Quit", "exec", "quit"],
            ],
        )
        .menu(
            "toolsMenu",
            [
                ["Status", "exec", "supabase status"],
                ["List", "exec", "ls"],
                ["Back", "menu", "root"],
            ],
        )
}

#[test]
fn navigate_then_back_then_quit() {
    let h = Harness::inline(tools_menu(), &["1", "0", "5"]).run();

    assert!(!h.session.nav().is_running());
    assert_eq!(h.session.nav().current(), "root");
    assert!(h.session.nav().history().is_empty());
    assert_eq!(h.prompts(), ["> ", "> ", "> "]);

    let out = h.output();
    assert_eq!(out.matches("=== Main Menu ===").count(), 2);
    assert_eq!(out.matches("=== Tools Menu ===").count(), 1);
    assert!(out.contains("Goodbye!"));
}

#[test]
fn quit_ends_without_pausing_or_redrawing() {
    let h = Harness::inline(tools_menu(), &["q"]).run();

    assert_eq!(h.prompts(), ["> "]);
    let out = h.output();
    assert_eq!(out.matches("=== Main Menu ===").count(), 1);
    assert!(!out.contains("Press Enter"));
    assert!(h.calls().is_empty());
}

#[test]
fn closed_input_at_menu_prompt_quits_cleanly() {
    let h = Harness::inline(tools_menu(), &[]).run();
    assert!(!h.session.nav().is_running());
}

#[test]
fn plain_command_prompts_for_variable_and_records_it() {
    let h = Harness::inline(tools_menu(), &["2", "db1", "", "q"]).run();

    assert_eq!(
        h.calls(),
        [Call {
            command: "ping -c 1 db1".to_string(),
            cwd: PathBuf::from("/work/project"),
            interactive: false,
        }]
    );
    assert_eq!(h.session.store().options("host"), ["db1"]);
    assert_eq!(h.prompts(), ["> ", "Enter value: ", "", "> "]);

    let out = h.output();
    assert!(out.contains("Executing: ping -c 1 db1"));
    assert!(out.contains("ok"));
}

#[test]
fn recent_values_are_offered_on_the_next_run() {
    let h = Harness::inline(tools_menu(), &["2", "db1", "", "2", "1", "", "q"]).run();

    let commands: Vec<String> = h.calls().into_iter().map(|c| c.command).collect();
    assert_eq!(commands, ["ping -c 1 db1", "ping -c 1 db1"]);
    assert!(h.output().contains("2. Enter new value"));
}

#[test]
fn blank_variable_value_cancels_the_command() {
    let h = Harness::inline(tools_menu(), &["2", "   ", "", "q"]).run();

    assert!(h.calls().is_empty());
    assert!(!h.session.store().contains("host"));
    let out = h.output();
    assert!(out.contains("No value provided for variable: host"));
    assert!(out.contains("Command cancelled due to missing variables."));
}

#[test]
fn interactive_command_gets_the_terminal_and_input_is_restored() {
    let h = Harness::inline(tools_menu(), &["3", "notes.txt", "", "q"]).run();

    assert_eq!(
        h.calls(),
        [Call {
            command: "vim notes.txt".to_string(),
            cwd: PathBuf::from("/work/project"),
            interactive: true,
        }]
    );
    let log = h.log.borrow();
    assert_eq!(log.releases, 1);
    assert_eq!(log.reacquires, 1);
    assert!(h.output().contains("Command completed with exit code: 0"));
}

#[test]
fn invalid_choices_are_rejected_without_moving() {
    let h = Harness::inline(tools_menu(), &["9", "", "abc", "", "", "", "q"]).run();

    let out = h.output();
    assert_eq!(out.matches("Invalid choice!").count(), 3);
    assert!(out.contains("choose a number between 0 and 5"));
    assert_eq!(h.session.nav().current(), "root");
    assert!(h.calls().is_empty());
}

#[test]
fn tool_commands_run_from_the_parent_directory() {
    let h = Harness::inline(tools_menu(), &["1", "1", "", "2", "", "q"]).run();

    let dirs: Vec<(String, PathBuf)> = h.calls().into_iter().map(|c| (c.command, c.cwd)).collect();
    assert_eq!(
        dirs,
        [
            ("supabase status".to_string(), PathBuf::from("/work")),
            ("ls".to_string(), PathBuf::from("/work/project")),
        ]
    );
}

#[test]
fn failed_command_shows_its_stderr() {
    let config = SessionConfig::inline(tools_menu()).with_store(VariableStore::in_memory());
    let failed = CapturedOutput {
        stdout: String::new(),
        stderr: "ls: cannot access\n".to_string(),
        exit_code: 2,
    };
    let h = Harness::new(config, &["1", "2", "", "q"], failed).run();

    let out = h.output();
    assert!(out.contains("command failed with exit code 2"));
    assert!(out.contains("ls: cannot access"));
}

#[test]
fn stderr_on_success_is_a_warning() {
    let config = SessionConfig::inline(tools_menu()).with_store(VariableStore::in_memory());
    let noisy = CapturedOutput {
        stdout: "listing\n".to_string(),
        stderr: "deprecated flag\n".to_string(),
        exit_code: 0,
    };
    let h = Harness::new(config, &["1", "2", "", "q"], noisy).run();

    let out = h.output();
    assert!(out.contains("Warning: deprecated flag"));
    assert!(out.contains("listing"));
}

#[test]
fn debug_item_shows_report_and_pauses() {
    let mut store = VariableStore::in_memory();
    store.record("host", "db1");
    let config = SessionConfig::inline(tools_menu()).with_store(store);
    let h = Harness::new(config, &["4", "", "q"], stdout("")).run();

    let out = h.output();
    assert!(out.contains("🐛 Debug: vars"));
    assert!(out.contains("🔹 host (1): db1"));
    assert!(out.contains("Press Enter to continue..."));
}

#[test]
fn unknown_debug_target_lists_the_known_ones() {
    let def = MenuDefinition::new().menu("root", [["Oops", "debug", "cpu"]]);
    let h = Harness::inline(def, &["1", "", "q"]).run();

    let out = h.output();
    assert!(out.contains("Unknown debug type: cpu"));
    assert!(out.contains("vars, config, env, menu, all"));
}

#[test]
fn invalid_menu_prevents_the_session() {
    let missing_root = MenuDefinition::new().menu("main", [["Quit", "exec", "quit"]]);
    let err = MenuSession::new(SessionConfig::inline(missing_root)).err().unwrap();
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::MissingRootMenu)
    );

    let dangling = MenuDefinition::new().menu("root", [["Go", "menu", "nowhere"]]);
    let err = MenuSession::new(
        SessionConfig::inline(dangling).with_store(VariableStore::in_memory()),
    )
    .err()
    .unwrap();
    assert!(matches!(
        err.downcast_ref::<ValidationError>(),
        Some(ValidationError::Invalid { .. })
    ));
}

#[test]
fn skipping_validation_reports_missing_menus_at_runtime() {
    let dangling = MenuDefinition::new().menu("root", [["Go", "menu", "nowhere"]]);
    let config = SessionConfig::inline(dangling)
        .with_store(VariableStore::in_memory())
        .with_validation(false);
    let h = Harness::new(config, &["1", "", "q"], stdout("")).run();

    assert_eq!(h.session.nav().current(), "root");
    assert!(h.output().contains("menu 'nowhere' not found"));
}

#[test]
fn validation_warnings_can_be_silenced() {
    let def = MenuDefinition::new()
        .menu("root", [["Quit", "exec", "quit"]])
        .menu("orphan", [["Quit", "exec", "quit"]]);

    let config = SessionConfig::inline(def.clone()).with_store(VariableStore::in_memory());
    let shown = Harness::new(config, &["q"], stdout("")).run();
    assert!(shown.output().contains("Warning: menu 'orphan' is defined but never referenced"));

    let config = SessionConfig::inline(def)
        .with_store(VariableStore::in_memory())
        .with_warnings(false);
    let hidden = Harness::new(config, &["q"], stdout("")).run();
    assert!(!hidden.output().contains("never referenced"));
}

#[test]
fn menu_file_and_variables_file_round_trip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let menu = dir.path().join("menu.json");
    let vars = dir.path().join("vars.json");
    std::fs::write(
        &menu,
        r#"{"root": [["Greet", "exec", "echo ${name}"], ["Quit", "exec", "quit"]]}"#,
    )?;

    let config = SessionConfig::from_file(&menu).with_variables_file(&vars);
    Harness::new(config, &["1", "ada", "", "q"], stdout("ada\n")).run();

    let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&vars)?)?;
    assert_eq!(saved, serde_json::json!({"name": ["ada"]}));
    Ok(())
}

#[test]
fn spawn_failures_are_reported_and_the_session_continues() {
    let config = SessionConfig::inline(runner_menu()).with_store(VariableStore::in_memory());
    let calls = Rc::new(RefCell::new(Vec::new()));
    let h = Harness::with_runner(config, &["1", "", "2", "", "3"], BrokenRunner, calls).run();

    let out = h.output();
    assert!(out.contains("❌ Error: failed to spawn `ls`"));
    assert!(out.contains("❌ Error running interactive command: failed to spawn `vim notes.txt`"));
    assert!(out.contains("Goodbye!"));
    assert_eq!(out.matches("Press Enter to continue...").count(), 2);
    assert_eq!(h.prompts(), ["> ", "", "> ", "", "> "]);

    let log = h.log.borrow();
    assert_eq!(log.releases, 1);
    assert_eq!(log.reacquires, 1);
}

#[test]
fn non_zero_interactive_exit_is_a_warning() {
    let config = SessionConfig::inline(runner_menu()).with_store(VariableStore::in_memory());
    let interrupted = CapturedOutput {
        exit_code: 130,
        ..CapturedOutput::default()
    };
    let h = Harness::new(config, &["2", "", "3"], interrupted).run();

    assert!(h.output().contains("⚠️  Command completed with exit code: 130"));
    assert!(!h.session.nav().is_running());
}

#[test]
fn silenced_warnings_are_not_logged_either() {
    let def = MenuDefinition::new()
        .menu("root", [["Quit", "exec", "quit"]])
        .menu("orphan", [["Quit", "exec", "quit"]]);

    let loud = logs_while_building(
        SessionConfig::inline(def.clone()).with_store(VariableStore::in_memory()),
    );
    assert!(loud.contains("menu 'orphan' is defined but never referenced"));

    let quiet = logs_while_building(
        SessionConfig::inline(def)
            .with_store(VariableStore::in_memory())
            .with_warnings(false),
    );
    assert!(!quiet.contains("never referenced"), "unexpected log output: {quiet}");
}
