//! Structural maintenance scenarios, driven through the editor session.

mod example_lists;
mod footnotes;
mod trailing_paragraph;
