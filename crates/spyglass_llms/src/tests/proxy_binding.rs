use crate::client::{ChatCompletionClient, ChatModel};
use crate::error::{ClientError, Result};
use crate::proxy::{TracedChatClient, TracedChatModel};
use crate::types::{
    BaseMessage, ChatCompletion, ChatCompletionRequest, ChatResult, GenerateOptions,
    ModelParameters,
};
use async_trait::async_trait;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use spyglass_core::{BindingError, Instrumentor, SpyglassError};

/// Mock client exposing a fixed set of entry points
struct MockClient {
    entry_points: &'static [&'static str],
}

#[async_trait]
impl ChatCompletionClient for MockClient {
    fn client_name(&self) -> &str {
        "MockClient"
    }

    fn entry_points(&self) -> &[&'static str] {
        self.entry_points
    }

    async fn create_chat_completion(&self, _request: ChatCompletionRequest) -> Result<ChatCompletion> {
        Err(ClientError::Other("mock".to_string()))
    }
}

/// Mock model exposing a fixed set of entry points
struct MockModel {
    parameters: ModelParameters,
    entry_points: &'static [&'static str],
}

#[async_trait]
impl ChatModel for MockModel {
    fn model_type(&self) -> &str {
        "MockModel"
    }

    fn parameters(&self) -> &ModelParameters {
        &self.parameters
    }

    fn entry_points(&self) -> &[&'static str] {
        self.entry_points
    }

    fn generate(&self, _messages: &[BaseMessage], _options: &GenerateOptions) -> Result<ChatResult> {
        Ok(ChatResult::default())
    }
}

fn instrumentor() -> Instrumentor {
    let provider = SdkTracerProvider::builder().build();
    Instrumentor::new(provider.tracer("test"))
}

#[test]
fn test_client_without_create_is_rejected() {
    let client = MockClient {
        entry_points: &["embeddings.create"],
    };

    let err = TracedChatClient::with_instrumentor(client, &instrumentor())
        .err()
        .unwrap();
    assert!(matches!(
        err,
        SpyglassError::Binding(BindingError::MissingEntryPoint { ref client, ref path })
            if client == "MockClient" && path == "chat.completions.create"
    ));
}

#[test]
fn test_client_with_create_is_accepted() {
    let client = MockClient {
        entry_points: &["chat.completions.create", "models.list"],
    };

    let traced = TracedChatClient::with_instrumentor(client, &instrumentor()).unwrap();
    assert_eq!(traced.client_name(), "MockClient");
    assert_eq!(traced.entry_points().len(), 2);
}

#[test]
fn test_model_without_generate_is_rejected() {
    let model = MockModel {
        parameters: ModelParameters::new("vertex_ai", "gemini-1.5-pro"),
        entry_points: &["predict"],
    };

    let err = TracedChatModel::with_instrumentor(model, &instrumentor())
        .err()
        .unwrap();
    assert_eq!(
        err.to_string(),
        "Binding error: MockModel has no entry point 'generate'"
    );
}

#[test]
fn test_model_parameters_are_forwarded() {
    let model = MockModel {
        parameters: ModelParameters::new("vertex_ai", "gemini-1.5-pro").with_top_k(32),
        entry_points: &["generate"],
    };

    let traced = TracedChatModel::with_instrumentor(model, &instrumentor()).unwrap();
    assert_eq!(traced.parameters().top_k, Some(32));
    assert_eq!(traced.model_type(), "MockModel");
}
