//! Construct registry
//!
//! This module assembles the constructs into the single immutable table that
//! the reader, the writer, and the command layer consult. Constructs are
//! registered in order on a [`RegistryBuilder`]; [`RegistryBuilder::build`]
//! merges their specs into one schema and fails on any ambiguity. After that
//! nothing changes, so the registry can be shared freely by reference.

use crate::commands::{Command, CommandContext, CommandState};
use crate::construct::Construct;
use crate::doc::{self, MarkWriter, NodeWriteFn, Schema};
use crate::error::SchemaError;
use crate::pandoc::Token;
use crate::reader::TokenReader;
use std::collections::HashMap;

/// Collects constructs before the registry is built.
///
/// # Examples
///
/// ```ignore
/// let mut builder = RegistryBuilder::with_defaults();
/// builder.register(MyConstruct);
/// let registry = builder.build()?;
/// ```
pub struct RegistryBuilder {
    constructs: Vec<Box<dyn Construct>>,
}

impl RegistryBuilder {
    /// Create a builder with no constructs
    pub fn new() -> Self {
        RegistryBuilder {
            constructs: Vec::new(),
        }
    }

    /// Create a builder seeded with the built-in constructs
    pub fn with_defaults() -> Self {
        RegistryBuilder {
            constructs: crate::constructs::default_constructs(),
        }
    }

    /// Register a construct after the ones already present
    pub fn register<C: Construct + 'static>(&mut self, construct: C) {
        self.constructs.push(Box::new(construct));
    }

    /// Merge every construct into a registry.
    pub fn build(self) -> Result<ConstructRegistry, SchemaError> {
        let mut names = Vec::new();
        let mut nodes = Vec::new();
        let mut marks = Vec::new();
        let mut readers = Vec::new();
        let mut commands: Vec<Command> = Vec::new();

        for construct in &self.constructs {
            names.push(construct.name().to_string());
            nodes.extend(construct.nodes());
            marks.extend(construct.marks());
            readers.extend(construct.readers());
            commands.extend(construct.commands());
        }

        let schema = Schema::new(nodes, marks)?;
        for required in [
            doc::DOC,
            doc::BODY,
            doc::NOTES,
            doc::node::TEXT,
            crate::constructs::paragraph::PARAGRAPH,
        ] {
            if schema.node(required).is_none() {
                return Err(SchemaError::MissingNode(required.to_string()));
            }
        }

        let mut reader_index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, reader) in readers.iter().enumerate() {
            reader_index.entry(reader.token.clone()).or_default().push(i);
        }

        let node_writers = schema
            .nodes()
            .iter()
            .filter_map(|spec| spec.writer.map(|w| (spec.name.clone(), w)))
            .collect();

        let mut mark_writers: Vec<(String, MarkWriter)> = schema
            .marks()
            .iter()
            .filter_map(|spec| spec.writer.map(|w| (spec.name.clone(), w)))
            .collect();
        mark_writers.sort_by(|(a, wa), (b, wb)| wa.priority.cmp(&wb.priority).then_with(|| a.cmp(b)));

        let mut command_index = HashMap::new();
        for (i, command) in commands.iter().enumerate() {
            if command_index.insert(command.name().to_string(), i).is_some() {
                return Err(SchemaError::DuplicateCommand(command.name().to_string()));
            }
        }

        tracing::debug!(
            constructs = names.len(),
            readers = readers.len(),
            commands = commands.len(),
            "built construct registry"
        );

        Ok(ConstructRegistry {
            constructs: names,
            schema,
            readers,
            reader_index,
            node_writers,
            mark_writers,
            commands,
            command_index,
        })
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable table of everything the constructs contribute.
pub struct ConstructRegistry {
    constructs: Vec<String>,
    schema: Schema,
    readers: Vec<TokenReader>,
    reader_index: HashMap<String, Vec<usize>>,
    node_writers: HashMap<String, NodeWriteFn>,
    mark_writers: Vec<(String, MarkWriter)>,
    commands: Vec<Command>,
    command_index: HashMap<String, usize>,
}

impl ConstructRegistry {
    /// Create a registry with the built-in constructs
    pub fn with_defaults() -> Result<Self, SchemaError> {
        RegistryBuilder::with_defaults().build()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Construct names in registration order
    pub fn constructs(&self) -> &[String] {
        &self.constructs
    }

    /// Check if a construct is registered
    pub fn has_construct(&self, name: &str) -> bool {
        self.constructs.iter().any(|c| c == name)
    }

    pub fn readers(&self) -> &[TokenReader] {
        &self.readers
    }

    /// The first reader, in registration order, that accepts the token.
    pub fn reader_for(&self, token: &Token) -> Option<&TokenReader> {
        self.reader_index
            .get(&token.t)?
            .iter()
            .map(|&i| &self.readers[i])
            .find(|reader| reader.accepts(token))
    }

    pub fn node_writer(&self, node_type: &str) -> Option<NodeWriteFn> {
        self.node_writers.get(node_type).copied()
    }

    pub fn mark_writer(&self, mark_type: &str) -> Option<MarkWriter> {
        self.mark_writers
            .iter()
            .find(|(name, _)| name == mark_type)
            .map(|(_, writer)| *writer)
    }

    /// Mark writers sorted by ascending priority (outermost first)
    pub fn mark_writers(&self) -> &[(String, MarkWriter)] {
        &self.mark_writers
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn command(&self, name: &str) -> Option<&Command> {
        self.command_index.get(name).map(|&i| &self.commands[i])
    }

    /// List all command names (sorted)
    pub fn list_commands(&self) -> Vec<String> {
        let mut names: Vec<_> = self.command_index.keys().cloned().collect();
        names.sort();
        names
    }

    /// Enabled and active state of every command for the current selection.
    pub fn command_states(&self, ctx: &CommandContext<'_>) -> Vec<CommandState> {
        self.commands
            .iter()
            .map(|command| CommandState {
                name: command.name().to_string(),
                enabled: command.is_enabled(ctx),
                active: command.is_active(ctx),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::{ContentExpr, MarkSpec, NodeSpec};
    use crate::pandoc::tag;
    use crate::reader::{all_children, ReaderKind};

    struct TestConstruct {
        name: &'static str,
        node: &'static str,
    }

    impl Construct for TestConstruct {
        fn name(&self) -> &str {
            self.name
        }

        fn nodes(&self) -> Vec<NodeSpec> {
            vec![NodeSpec::block(self.node, ContentExpr::Inline)]
        }

        fn readers(&self) -> Vec<TokenReader> {
            vec![TokenReader::block("Div", self.node, all_children)]
        }
    }

    struct MarkConstruct(&'static str);

    impl Construct for MarkConstruct {
        fn name(&self) -> &str {
            self.0
        }

        fn marks(&self) -> Vec<MarkSpec> {
            vec![MarkSpec::new("highlight")]
        }
    }

    #[test]
    fn test_registry_defaults_build() {
        let registry = ConstructRegistry::with_defaults().unwrap();
        assert!(registry.has_construct("heading"));
        assert!(registry.has_construct("footnote"));
        assert!(registry.schema().node("paragraph").is_some());
        assert!(registry.command("strong").is_some());
    }

    #[test]
    fn test_registry_duplicate_node_is_fatal() {
        let mut builder = RegistryBuilder::with_defaults();
        builder.register(TestConstruct {
            name: "custom",
            node: "paragraph",
        });
        assert_eq!(
            builder.build().err(),
            Some(SchemaError::DuplicateNode("paragraph".into()))
        );
    }

    #[test]
    fn test_registry_duplicate_mark_is_fatal() {
        let mut builder = RegistryBuilder::with_defaults();
        builder.register(MarkConstruct("one"));
        builder.register(MarkConstruct("two"));
        assert_eq!(
            builder.build().err(),
            Some(SchemaError::DuplicateMark("highlight".into()))
        );
    }

    #[test]
    fn test_registry_requires_document_shape() {
        let mut builder = RegistryBuilder::new();
        builder.register(TestConstruct {
            name: "custom",
            node: "figure",
        });
        assert!(matches!(builder.build(), Err(SchemaError::MissingNode(_))));
    }

    #[test]
    fn test_registry_first_registered_reader_wins() {
        let mut builder = RegistryBuilder::with_defaults();
        builder.register(TestConstruct {
            name: "first",
            node: "first_div",
        });
        builder.register(TestConstruct {
            name: "second",
            node: "second_div",
        });
        let registry = builder.build().unwrap();
        let reader = registry.reader_for(&Token::new("Div")).unwrap();
        match &reader.kind {
            ReaderKind::Block { node, .. } => assert_eq!(node, "first_div"),
            _ => panic!("expected a block reader"),
        }
    }

    #[test]
    fn test_registry_predicate_selects_reader() {
        let registry = ConstructRegistry::with_defaults().unwrap();
        let underline_span = Token::with_children(
            tag::SPAN,
            vec![
                crate::doc::PandocAttr {
                    classes: vec!["underline".into()],
                    ..Default::default()
                }
                .to_token_value(),
                crate::pandoc::TokenValue::Array(vec![]),
            ],
        );
        let plain_span = Token::with_children(
            tag::SPAN,
            vec![
                crate::doc::PandocAttr::default().to_token_value(),
                crate::pandoc::TokenValue::Array(vec![]),
            ],
        );
        let pick = |token: &Token| match &registry.reader_for(token).unwrap().kind {
            ReaderKind::Mark { mark, .. } => mark.clone(),
            _ => String::new(),
        };
        assert_eq!(pick(&underline_span), "underline");
        assert_eq!(pick(&plain_span), "span");
    }

    #[test]
    fn test_registry_mark_writers_sorted_by_priority() {
        let registry = ConstructRegistry::with_defaults().unwrap();
        let priorities: Vec<i32> = registry
            .mark_writers()
            .iter()
            .map(|(_, w)| w.priority)
            .collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        assert_eq!(priorities, sorted);
        assert_eq!(registry.mark_writers().first().map(|(n, _)| n.as_str()), Some("link"));
        assert_eq!(registry.mark_writers().last().map(|(n, _)| n.as_str()), Some("code"));
    }

    #[test]
    fn test_registry_list_commands_sorted() {
        let registry = ConstructRegistry::with_defaults().unwrap();
        let names = registry.list_commands();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(names.contains(&"bullet_list".to_string()));
    }
}
