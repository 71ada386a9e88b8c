//! Named terminal styles.
//!
//! Rendering code asks for a style by what the text means (`id`, `time`,
//! `archived`) and never picks colors directly.

use console::Style;

pub fn title() -> Style {
    Style::new().bold()
}

pub fn id() -> Style {
    Style::new().color256(244)
}

pub fn time() -> Style {
    Style::new().color256(246).italic()
}

pub fn archived() -> Style {
    Style::new().red().dim()
}

pub fn inactive() -> Style {
    Style::new().dim()
}

pub fn highlight() -> Style {
    Style::new().yellow()
}

pub fn success() -> Style {
    Style::new().green()
}

pub fn warning() -> Style {
    Style::new().yellow()
}

pub fn error() -> Style {
    Style::new().red()
}

pub fn muted() -> Style {
    Style::new().dim()
}
