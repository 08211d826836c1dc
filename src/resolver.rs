use crate::input::LineInput;
use crate::presenter::{Presenter, Tone};
use crate::store::VariableStore;
use crate::substitution::VariableResolver;
use anyhow::Result;
use std::io::Write;
use tracing::debug;

/// Asks the operator for variable values, offering what the store remembers.
///
/// Recent values are listed as `1..=n` and `n + 1` asks for a new one, as does any answer that is
/// not a number. Any other number yields no value, as does a blank new value or closed input.
/// Every value handed out is recorded as the most recent one, exactly as typed.
pub struct PromptResolver<'a> {
    input: &'a mut dyn LineInput,
    store: &'a mut VariableStore,
    out: &'a mut dyn Write,
    presenter: &'a dyn Presenter,
}

impl<'a> PromptResolver<'a> {
    pub fn new(
        input: &'a mut dyn LineInput,
        store: &'a mut VariableStore,
        out: &'a mut dyn Write,
        presenter: &'a dyn Presenter,
    ) -> Self {
        Self {
            input,
            store,
            out,
            presenter,
        }
    }

    fn say(&mut self, text: &str) -> Result<()> {
        self.presenter.notice(&mut *self.out, Tone::Info, text)?;
        Ok(())
    }

    fn ask_new(&mut self, name: &str, prompt: &str) -> Result<Option<String>> {
        self.out.flush()?;
        let Some(answer) = self.input.read_line(prompt)? else {
            return Ok(None);
        };
        if answer.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(self.accept(name, &answer)))
    }

    fn accept(&mut self, name: &str, value: &str) -> String {
        self.store.record(name, value);
        value.to_string()
    }
}

impl VariableResolver for PromptResolver<'_> {
    fn resolve(&mut self, name: &str) -> Result<Option<String>> {
        self.say(&format!("\n📝 Variable: {name}"))?;

        let options = self.store.options(name).to_vec();
        if options.is_empty() {
            return self.ask_new(name, "Enter value: ");
        }

        self.say("\nRecent values:")?;
        for (i, option) in options.iter().enumerate() {
            self.say(&format!("{}. {option}", i + 1))?;
        }
        self.say(&format!("{}. Enter new value", options.len() + 1))?;
        self.out.flush()?;

        let Some(answer) = self.input.read_line("Select option or enter new value: ")? else {
            return Ok(None);
        };
        match answer.trim().parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => {
                debug!(variable = name, choice = n, "reused recent value");
                Ok(Some(self.accept(name, &options[n - 1])))
            }
            Ok(n) if n == options.len() + 1 => self.ask_new(name, "Enter new value: "),
            Ok(n) => {
                debug!(variable = name, choice = n, "no such recent value");
                Ok(None)
            }
            Err(_) => self.ask_new(name, "Enter new value: "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io_adapters::ScriptedInput;
    use crate::presenter::PlainPresenter;
    use crate::substitution::{SubstitutionError, substitute};

    fn run(
        lines: &[&str],
        store: &mut VariableStore,
        template: &str,
    ) -> (Result<String, SubstitutionError>, String) {
        let mut input = ScriptedInput::new(lines.iter().copied());
        let mut out = Vec::new();
        let result = {
            let mut resolver = PromptResolver::new(&mut input, store, &mut out, &PlainPresenter);
            substitute(template, &mut resolver)
        };
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn first_value_is_typed_and_recorded() {
        let mut store = VariableStore::in_memory();
        let (result, _) = run(&["db1"], &mut store, "ping ${host}");

        assert_eq!(result.unwrap(), "ping db1");
        assert_eq!(store.options("host"), ["db1"]);
    }

    #[test]
    fn recent_value_is_picked_by_number_and_moved_to_front() {
        let mut store = VariableStore::in_memory();
        store.record("host", "a");
        store.record("host", "b");

        let (result, out) = run(&["2"], &mut store, "ping ${host}");

        assert_eq!(result.unwrap(), "ping a");
        assert_eq!(store.options("host"), ["a", "b"]);
        assert!(out.contains("1. b"));
        assert!(out.contains("3. Enter new value"));
    }

    #[test]
    fn new_value_after_choosing_enter_new() {
        let mut store = VariableStore::in_memory();
        store.record("host", "a");

        let (result, _) = run(&["2", "c"], &mut store, "ping ${host}");
        assert_eq!(result.unwrap(), "ping c");

        let (result, _) = run(&["", "d"], &mut store, "ping ${host}");
        assert_eq!(result.unwrap(), "ping d");
        assert_eq!(store.options("host"), ["d", "c", "a"]);
    }

    #[test]
    fn text_answer_asks_for_a_new_value() {
        let mut store = VariableStore::in_memory();
        store.record("host", "a");

        let (result, _) = run(&["other", "b"], &mut store, "ping ${host}");
        assert_eq!(result.unwrap(), "ping b");
        assert_eq!(store.options("host"), ["b", "a"]);
    }

    #[test]
    fn unknown_option_number_cancels() {
        let mut store = VariableStore::in_memory();
        store.record("port", "80");

        for answer in ["0", "3", "8080"] {
            let (result, _) = run(&[answer], &mut store, "curl :${port}");
            assert!(matches!(result, Err(SubstitutionError::Cancelled { .. })));
        }
        assert_eq!(store.options("port"), ["80"]);
    }

    #[test]
    fn new_values_keep_surrounding_spaces() {
        let mut store = VariableStore::in_memory();
        let (result, _) = run(&["  two words "], &mut store, "echo '${text}'");

        assert_eq!(result.unwrap(), "echo '  two words '");
        assert_eq!(store.options("text"), ["  two words "]);
    }

    #[test]
    fn blank_value_cancels_everything() {
        let mut store = VariableStore::in_memory();
        let (result, _) = run(&["root", "   "], &mut store, "ssh ${user}@${host}");

        assert!(matches!(
            result,
            Err(SubstitutionError::Cancelled { variable }) if variable == "host"
        ));
        assert_eq!(store.options("user"), ["root"]);
        assert!(!store.contains("host"));
    }

    #[test]
    fn closed_input_cancels() {
        let mut store = VariableStore::in_memory();
        let (result, _) = run(&[], &mut store, "echo ${x}");
        assert!(matches!(result, Err(SubstitutionError::Cancelled { .. })));
    }

    #[test]
    fn repeated_name_is_asked_once() {
        let mut store = VariableStore::in_memory();
        let (result, out) = run(&["me"], &mut store, "echo ${u} ${u}");

        assert_eq!(result.unwrap(), "echo me me");
        assert_eq!(out.matches("Variable: u").count(), 1);
    }
}
