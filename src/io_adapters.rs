use crate::input::LineInput;
use anyhow::Result;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{Result as IoResult, Write};
use std::rc::Rc;

/// Memory-backed writer for capturing what a session prints.
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    pub fn new() -> Self {
        Self {
            buf: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Convenience: create writer and return (writer, rc_handle).
    pub fn with_handle() -> (Self, Rc<RefCell<Vec<u8>>>) {
        let mw = MemWriter::new();
        let rc = mw.buf.clone();
        (mw, rc)
    }
}

impl Default for MemWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

/// What a [`ScriptedInput`] saw while a session ran.
#[derive(Debug, Default, Clone)]
pub struct InputLog {
    pub prompts: Vec<String>,
    pub releases: usize,
    pub reacquires: usize,
}

/// [`LineInput`] that answers from a fixed list of lines, then reports end of input.
///
/// It enforces the release/reacquire lifecycle the same way the terminal does: reading while
/// released fails.
pub struct ScriptedInput {
    lines: VecDeque<String>,
    released: bool,
    log: Rc<RefCell<InputLog>>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            released: false,
            log: Rc::new(RefCell::new(InputLog::default())),
        }
    }

    /// Convenience: create input and return (input, log_handle).
    pub fn with_log<I, S>(lines: I) -> (Self, Rc<RefCell<InputLog>>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let input = Self::new(lines);
        let log = input.log.clone();
        (input, log)
    }
}

impl LineInput for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        if self.released {
            anyhow::bail!("line input was released and not reacquired");
        }
        self.log.borrow_mut().prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }

    fn release(&mut self) {
        self.released = true;
        self.log.borrow_mut().releases += 1;
    }

    fn reacquire(&mut self) -> Result<()> {
        self.released = false;
        self.log.borrow_mut().reacquires += 1;
        Ok(())
    }
}
