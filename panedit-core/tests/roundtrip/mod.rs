//! Reader/writer round trips
//!
//! Interchange → document → interchange must reproduce the input for canonical
//! trees, and document → interchange → document must reproduce the document.

mod property;
mod scenarios;
