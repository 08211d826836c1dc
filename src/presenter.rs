use crate::menu::{ItemKind, MenuItem};
use std::io::{Result, Write};

/// Kind of message shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Warning,
    Error,
}

/// How the session draws menus and messages.
///
/// The session hands every piece of operator-facing text to its presenter, so colour themes or
/// other layouts are a matter of passing a different implementation to
/// [`crate::MenuSession::with_presenter`].
pub trait Presenter {
    fn render_menu(&self, out: &mut dyn Write, title: &str, items: &[MenuItem]) -> Result<()>;

    fn notice(&self, out: &mut dyn Write, tone: Tone, text: &str) -> Result<()>;

    fn pause_prompt(&self) -> &str {
        "Press Enter to continue..."
    }
}

/// Uncoloured output with the emoji markers of the classic menu.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainPresenter;

fn icon(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Navigate => "📁",
        ItemKind::Execute => "⚡",
        ItemKind::Inspect => "🐛",
    }
}

impl Presenter for PlainPresenter {
    fn render_menu(&self, out: &mut dyn Write, title: &str, items: &[MenuItem]) -> Result<()> {
        writeln!(out, "\n=== {title} ===\n")?;
        for (i, item) in items.iter().enumerate() {
            writeln!(out, "{}. {} {}", i + 1, icon(item.kind), item.label)?;
        }
        writeln!(out, "\n0. Go Back")?;
        writeln!(out, "\nEnter your choice (number): ")
    }

    fn notice(&self, out: &mut dyn Write, tone: Tone, text: &str) -> Result<()> {
        match tone {
            Tone::Info => writeln!(out, "{text}"),
            Tone::Success => writeln!(out, "✅ {text}"),
            Tone::Warning => writeln!(out, "⚠️  {text}"),
            Tone::Error => writeln!(out, "❌ {text}"),
        }
    }
}
