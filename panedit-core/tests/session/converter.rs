use crate::common::{load_fixture, registry};
use async_trait::async_trait;
use panedit_core::pandoc::{from_json, to_json};
use panedit_core::{
    ApiVersion, ConversionService, ConvertError, Converter, FormatOptions, PandocAst, WriterOptions,
};
use std::cell::RefCell;

/// Serves interchange JSON as the "text" format: reads parse it, writes print it.
#[derive(Default)]
struct JsonService {
    calls: RefCell<Vec<String>>,
}

#[async_trait(?Send)]
impl ConversionService for JsonService {
    async fn interchange_from_text(
        &self,
        text: &str,
        _options: &FormatOptions,
    ) -> Result<PandocAst, ConvertError> {
        self.calls.borrow_mut().push(format!("read {}", text.len()));
        tokio::task::yield_now().await;
        from_json(text).map_err(|e| ConvertError::Service(e.to_string()))
    }

    async fn text_from_interchange(
        &self,
        ast: &PandocAst,
        _options: &FormatOptions,
        _writer: &WriterOptions,
    ) -> Result<String, ConvertError> {
        self.calls.borrow_mut().push("write".to_string());
        tokio::task::yield_now().await;
        to_json(ast).map_err(|e| ConvertError::Service(e.to_string()))
    }
}

fn fixture_json(name: &str) -> String {
    to_json(&load_fixture(name)).unwrap()
}

#[tokio::test]
async fn test_write_before_read_fails() {
    let converter = Converter::new(JsonService::default(), registry());
    let doc = crate::common::read_fixture("hello_world.json");
    assert_eq!(converter.write(&doc).await, Err(ConvertError::NoPriorRead));
    assert!(converter.api_version().is_none());
}

#[tokio::test]
async fn test_read_learns_version_for_writes() {
    let converter = Converter::new(JsonService::default(), registry());
    let text = fixture_json("hello_world.json");

    let doc = converter.read(&text).await.unwrap().expect("single read wins");
    assert_eq!(converter.api_version(), Some(ApiVersion::new(&[1, 23, 1])));

    let written = converter.write(&doc).await.unwrap().expect("single write wins");
    assert_eq!(written, text);
}

#[tokio::test]
async fn test_superseded_read_is_dropped() {
    let converter = Converter::new(JsonService::default(), registry());
    let first = fixture_json("hello_world.json");
    let second = fixture_json("footnotes.json");

    let (a, b) = tokio::join!(converter.read(&first), converter.read(&second));
    assert_eq!(a, Ok(None));
    let doc = b.unwrap().expect("latest read wins");
    assert_eq!(doc.node_at(&[1]).unwrap().content.len(), 2);
}

#[tokio::test]
async fn test_superseded_write_is_dropped() {
    let converter = Converter::new(JsonService::default(), registry());
    let doc = converter
        .read(&fixture_json("hello_world.json"))
        .await
        .unwrap()
        .unwrap();

    let (a, b) = tokio::join!(converter.write(&doc), converter.write(&doc));
    assert_eq!(a, Ok(None));
    assert!(b.unwrap().is_some());
    assert_eq!(converter_calls(&converter), 3);
}

fn converter_calls(converter: &Converter<JsonService>) -> usize {
    converter.service().calls.borrow().len()
}

#[tokio::test]
async fn test_service_failure_is_reported() {
    let converter = Converter::new(JsonService::default(), registry());
    let result = converter.read("not json").await;
    assert!(matches!(result, Err(ConvertError::Service(_))));
    assert!(converter.api_version().is_none());
}
