//! Conversion service boundary
//!
//! Parsing and rendering of text formats (Markdown and friends) is delegated to
//! an external service that speaks the interchange JSON: normally the `pandoc`
//! binary. [`ConversionService`] is that seam; [`Converter`] wraps a service
//! with the registry and handles two concerns of the round trip:
//!
//! - The API version of the interchange tree is learned from the first
//!   successful read and reused for every write. Writing before any read is an
//!   error, since the version to emit is unknown.
//! - Requests can overlap. Each read and each write takes a generation number;
//!   a result that comes back after a newer request of the same kind started
//!   is dropped (`Ok(None)`), so the last request wins.

use crate::doc::Node;
use crate::error::ConvertError;
use crate::pandoc::{ApiVersion, PandocAst};
use crate::reader::read_document;
use crate::registry::ConstructRegistry;
use crate::writer::write_document;
use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::sync::Arc;

/// Input/output dialect options passed to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Format name as the service knows it, e.g. `markdown` or `commonmark_x`.
    pub format: String,
    /// Do not inject automatic heading identifiers when reading.
    pub suppress_identifiers: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            format: "markdown".to_string(),
            suppress_identifiers: true,
        }
    }
}

/// Line wrapping of rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wrap {
    #[default]
    None,
    Column(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterOptions {
    /// `#`-style headings instead of setext underlines.
    pub atx_headings: bool,
    pub wrap: Wrap,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            atx_headings: true,
            wrap: Wrap::None,
        }
    }
}

/// Text ↔ interchange conversion, supplied by the host.
#[async_trait(?Send)]
pub trait ConversionService {
    async fn interchange_from_text(
        &self,
        text: &str,
        options: &FormatOptions,
    ) -> Result<PandocAst, ConvertError>;

    async fn text_from_interchange(
        &self,
        ast: &PandocAst,
        options: &FormatOptions,
        writer: &WriterOptions,
    ) -> Result<String, ConvertError>;
}

/// Reads and writes documents through a [`ConversionService`].
pub struct Converter<S> {
    service: S,
    registry: Arc<ConstructRegistry>,
    format: FormatOptions,
    writer: WriterOptions,
    api_version: RefCell<Option<ApiVersion>>,
    read_generation: Cell<u64>,
    write_generation: Cell<u64>,
}

impl<S: ConversionService> Converter<S> {
    pub fn new(service: S, registry: Arc<ConstructRegistry>) -> Self {
        Converter {
            service,
            registry,
            format: FormatOptions::default(),
            writer: WriterOptions::default(),
            api_version: RefCell::new(None),
            read_generation: Cell::new(0),
            write_generation: Cell::new(0),
        }
    }

    pub fn with_format(mut self, format: FormatOptions) -> Self {
        self.format = format;
        self
    }

    pub fn with_writer_options(mut self, writer: WriterOptions) -> Self {
        self.writer = writer;
        self
    }

    pub fn registry(&self) -> &Arc<ConstructRegistry> {
        &self.registry
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// The version learned from the last successful read.
    pub fn api_version(&self) -> Option<ApiVersion> {
        self.api_version.borrow().clone()
    }

    /// Build a document from an interchange tree already at hand.
    pub fn read_interchange(&self, ast: &PandocAst) -> Result<Node, ConvertError> {
        let doc = read_document(&self.registry, ast)?;
        self.api_version.replace(Some(ast.api_version.clone()));
        Ok(doc)
    }

    /// Convert `text` into a document.
    ///
    /// `Ok(None)` when a newer read started while this one was in flight.
    pub async fn read(&self, text: &str) -> Result<Option<Node>, ConvertError> {
        let generation = self.read_generation.get() + 1;
        self.read_generation.set(generation);
        let result = self.service.interchange_from_text(text, &self.format).await;
        if self.read_generation.get() != generation {
            tracing::warn!(generation, "dropping superseded read");
            return Ok(None);
        }
        let ast = result?;
        self.read_interchange(&ast).map(Some)
    }

    /// Build the interchange tree for `doc` at the learned version.
    pub fn write_interchange(&self, doc: &Node) -> Result<PandocAst, ConvertError> {
        let version = self.api_version().ok_or(ConvertError::NoPriorRead)?;
        Ok(write_document(&self.registry, doc, &version)?)
    }

    /// Convert `doc` back into text.
    ///
    /// `Ok(None)` when a newer write started while this one was in flight.
    pub async fn write(&self, doc: &Node) -> Result<Option<String>, ConvertError> {
        let ast = self.write_interchange(doc)?;
        let generation = self.write_generation.get() + 1;
        self.write_generation.set(generation);
        let result = self
            .service
            .text_from_interchange(&ast, &self.format, &self.writer)
            .await;
        if self.write_generation.get() != generation {
            tracing::warn!(generation, "dropping superseded write");
            return Ok(None);
        }
        result.map(Some)
    }
}

#[cfg(feature = "pandoc-process")]
pub use process::PandocProcess;

#[cfg(feature = "pandoc-process")]
mod process {
    use super::{ConversionService, FormatOptions, Wrap, WriterOptions};
    use crate::error::ConvertError;
    use crate::pandoc::{from_json, to_json, PandocAst};
    use async_trait::async_trait;
    use std::env;
    use std::path::{Path, PathBuf};
    use std::process::Stdio;
    use tokio::io::AsyncWriteExt;
    use tokio::process::Command;
    use which::which;

    /// Runs the `pandoc` binary as the conversion service.
    #[derive(Debug, Clone)]
    pub struct PandocProcess {
        binary: PathBuf,
    }

    impl PandocProcess {
        pub fn new(binary: impl Into<PathBuf>) -> Self {
            PandocProcess {
                binary: binary.into(),
            }
        }

        /// Find pandoc through `PANEDIT_PANDOC` or the `PATH`.
        pub fn locate() -> Result<Self, ConvertError> {
            if let Some(path) = env::var_os("PANEDIT_PANDOC") {
                if !path.is_empty() {
                    return Ok(Self::new(path));
                }
            }
            which("pandoc")
                .map(Self::new)
                .map_err(|_| ConvertError::Service("pandoc was not found on the PATH".to_string()))
        }

        pub fn binary(&self) -> &Path {
            &self.binary
        }

        async fn run(&self, args: &[String], input: &[u8]) -> Result<String, ConvertError> {
            tracing::debug!(binary = %self.binary.display(), ?args, "running pandoc");
            let mut child = Command::new(&self.binary)
                .args(args)
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .map_err(|e| {
                    ConvertError::Service(format!(
                        "failed to launch pandoc ({}): {e}",
                        self.binary.display()
                    ))
                })?;
            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(input)
                    .await
                    .map_err(|e| ConvertError::Service(e.to_string()))?;
            }
            let output = child
                .wait_with_output()
                .await
                .map_err(|e| ConvertError::Service(e.to_string()))?;
            if !output.status.success() {
                let message = String::from_utf8_lossy(&output.stderr).trim().to_string();
                return Err(ConvertError::Service(if message.is_empty() {
                    format!("pandoc exited with status {}", output.status)
                } else {
                    message
                }));
            }
            String::from_utf8(output.stdout).map_err(|e| ConvertError::Service(e.to_string()))
        }
    }

    fn reader_format(options: &FormatOptions) -> String {
        if options.suppress_identifiers {
            format!("{}-auto_identifiers", options.format)
        } else {
            options.format.clone()
        }
    }

    fn writer_args(options: &FormatOptions, writer: &WriterOptions) -> Vec<String> {
        let mut args = vec!["--from=json".to_string(), format!("--to={}", options.format)];
        if writer.atx_headings {
            args.push("--markdown-headings=atx".to_string());
        }
        match writer.wrap {
            Wrap::None => args.push("--wrap=none".to_string()),
            Wrap::Column(columns) => {
                args.push("--wrap=auto".to_string());
                args.push(format!("--columns={columns}"));
            }
        }
        args
    }

    #[async_trait(?Send)]
    impl ConversionService for PandocProcess {
        async fn interchange_from_text(
            &self,
            text: &str,
            options: &FormatOptions,
        ) -> Result<PandocAst, ConvertError> {
            let args = vec![format!("--from={}", reader_format(options)), "--to=json".to_string()];
            let json = self.run(&args, text.as_bytes()).await?;
            Ok(from_json(&json)?)
        }

        async fn text_from_interchange(
            &self,
            ast: &PandocAst,
            options: &FormatOptions,
            writer: &WriterOptions,
        ) -> Result<String, ConvertError> {
            let json = to_json(ast)?;
            self.run(&writer_args(options, writer), json.as_bytes()).await
        }
    }

}
