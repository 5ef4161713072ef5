//! Editor session: commands, dialogs, history, and the conversion boundary.

mod commands;
mod converter;
mod dialogs;
mod editing;
mod history;
