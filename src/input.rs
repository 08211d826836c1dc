use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

/// Line-based operator input owned by one session.
///
/// Interactive commands need the terminal to themselves, so the session calls
/// [`release`](LineInput::release) before spawning one and [`reacquire`](LineInput::reacquire)
/// once it has exited. Reading while released is an error.
pub trait LineInput {
    /// Read one line. `Ok(None)` means the operator closed the input (Ctrl-D / Ctrl-C).
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Give up the terminal.
    fn release(&mut self);

    /// Take the terminal back after [`release`](LineInput::release).
    fn reacquire(&mut self) -> Result<()>;
}

/// [`LineInput`] backed by a rustyline editor.
///
/// The editor is created on first use, dropped by `release` (restoring the terminal mode) and
/// created again by `reacquire`.
pub struct EditorInput {
    editor: Option<DefaultEditor>,
    released: bool,
}

impl EditorInput {
    pub fn new() -> Self {
        Self {
            editor: None,
            released: false,
        }
    }

    fn editor(&mut self) -> Result<&mut DefaultEditor> {
        if self.released {
            anyhow::bail!("line input was released and not reacquired");
        }
        let editor = match self.editor.take() {
            Some(editor) => editor,
            None => {
                debug!("creating line editor");
                DefaultEditor::new()?
            }
        };
        Ok(self.editor.insert(editor))
    }
}

impl Default for EditorInput {
    fn default() -> Self {
        Self::new()
    }
}

impl LineInput for EditorInput {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let editor = self.editor()?;
        match editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    editor.add_history_entry(line.as_str())?;
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn release(&mut self) {
        debug!("releasing line editor");
        self.editor = None;
        self.released = true;
    }

    fn reacquire(&mut self) -> Result<()> {
        self.released = false;
        self.editor()?;
        Ok(())
    }
}
