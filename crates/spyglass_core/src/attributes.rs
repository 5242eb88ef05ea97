//! Span attribute names and the flat attribute set extractors return.
//!
//! The names are read by downstream dashboards, so they must stay stable
//! across every provider integration.

use opentelemetry::{KeyValue, Value};

// Generic function calls
pub const CODE_FUNCTION: &str = "code.function";
pub const SPYGLASS_DURATION_MS: &str = "spyglass.duration_ms";
pub const SPYGLASS_FUNCTION_ARG_COUNT: &str = "spyglass.function.arg_count";
pub const SPYGLASS_FUNCTION_ARG_TYPES: &str = "spyglass.function.arg_types";

// Errors
pub const ERROR_TYPE: &str = "error.type";
pub const ERROR_MESSAGE: &str = "error.message";
pub const HTTP_RESPONSE_STATUS_CODE: &str = "http.response.status_code";
pub const EXCEPTION_EVENT: &str = "exception";
pub const EXCEPTION_TYPE: &str = "exception.type";
pub const EXCEPTION_MESSAGE: &str = "exception.message";

// GenAI request
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";
pub const GEN_AI_SYSTEM: &str = "gen_ai.system";
pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";
pub const GEN_AI_REQUEST_MAX_TOKENS: &str = "gen_ai.request.max_tokens";
pub const GEN_AI_REQUEST_TEMPERATURE: &str = "gen_ai.request.temperature";
pub const GEN_AI_REQUEST_TOP_P: &str = "gen_ai.request.top_p";
pub const GEN_AI_REQUEST_TOP_K: &str = "gen_ai.request.top_k";
pub const GEN_AI_REQUEST_STREAM: &str = "gen_ai.request.stream";
pub const GEN_AI_REQUEST_TOOLS_COUNT: &str = "gen_ai.request.tools.count";
pub const GEN_AI_REQUEST_TOOLS_NAMES: &str = "gen_ai.request.tools.names";
pub const GEN_AI_INPUT_MESSAGES: &str = "gen_ai.input.messages";
pub const GEN_AI_INPUT_MESSAGES_COUNT: &str = "gen_ai.input.messages.count";

// Vertex AI request extras
pub const GEN_AI_REQUEST_VERTEX_AI_PROJECT: &str = "gen_ai.request.vertex_ai.project";
pub const GEN_AI_REQUEST_VERTEX_AI_LOCATION: &str = "gen_ai.request.vertex_ai.location";
pub const GEN_AI_REQUEST_VERTEX_AI_SAFETY_SETTINGS_ENABLED: &str =
    "gen_ai.request.vertex_ai.safety_settings.enabled";

// GenAI response
pub const GEN_AI_RESPONSE_ID: &str = "gen_ai.response.id";
pub const GEN_AI_RESPONSE_MODEL: &str = "gen_ai.response.model";
pub const GEN_AI_RESPONSE_FINISH_REASONS: &str = "gen_ai.response.finish_reasons";
pub const GEN_AI_RESPONSE_CONTENT_LENGTH: &str = "gen_ai.response.content_length";
pub const GEN_AI_RESPONSE_TOOLS_COUNT: &str = "gen_ai.response.tools.count";
pub const GEN_AI_RESPONSE_TOOLS_NAMES: &str = "gen_ai.response.tools.names";
pub const GEN_AI_OUTPUT_MESSAGES: &str = "gen_ai.output.messages";
pub const GEN_AI_USAGE_INPUT_TOKENS: &str = "gen_ai.usage.input_tokens";
pub const GEN_AI_USAGE_OUTPUT_TOKENS: &str = "gen_ai.usage.output_tokens";
pub const GEN_AI_USAGE_TOTAL_TOKENS: &str = "gen_ai.usage.total_tokens";

// Vertex AI response extras
pub const GEN_AI_RESPONSE_VERTEX_AI_SAFETY_RATINGS_COUNT: &str =
    "gen_ai.response.vertex_ai.safety_ratings.count";
pub const GEN_AI_RESPONSE_VERTEX_AI_HAS_CITATIONS: &str = "gen_ai.response.vertex_ai.has_citations";

/// Ordered set of span attributes.
///
/// Later inserts of the same key win when the span is exported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: Vec<KeyValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &'static str, value: impl Into<Value>) -> &mut Self {
        self.entries.push(KeyValue::new(key, value));
        self
    }

    /// Insert only when a value is present.
    pub fn insert_opt<V: Into<Value>>(&mut self, key: &'static str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.insert(key, value);
        }
        self
    }

    /// Insert an unsigned count. Counts that do not fit an `i64` are omitted.
    pub fn insert_count(&mut self, key: &'static str, count: impl TryInto<i64>) -> &mut Self {
        self.insert_opt(key, count.try_into().ok())
    }

    /// Last value recorded for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .rev()
            .find(|kv| kv.key.as_str() == key)
            .map(|kv| &kv.value)
    }

    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key).map(|value| value.as_str().into_owned())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn extend(&mut self, other: Attributes) -> &mut Self {
        self.entries.extend(other.entries);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyValue> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<KeyValue> {
        self.entries
    }
}

impl From<Vec<KeyValue>> for Attributes {
    fn from(entries: Vec<KeyValue>) -> Self {
        Self { entries }
    }
}

impl IntoIterator for Attributes {
    type Item = KeyValue;
    type IntoIter = std::vec::IntoIter<KeyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_opt_skips_none() {
        let mut attrs = Attributes::new();
        attrs
            .insert_opt(GEN_AI_REQUEST_MODEL, Some("gpt-4o".to_string()))
            .insert_opt::<i64>(GEN_AI_REQUEST_MAX_TOKENS, None);

        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get_str(GEN_AI_REQUEST_MODEL).as_deref(), Some("gpt-4o"));
        assert!(!attrs.contains(GEN_AI_REQUEST_MAX_TOKENS));
    }

    #[test]
    fn test_insert_count_omits_overflow() {
        let mut attrs = Attributes::new();
        attrs
            .insert_count(GEN_AI_USAGE_INPUT_TOKENS, 10u32)
            .insert_count(GEN_AI_USAGE_TOTAL_TOKENS, u64::MAX);

        assert_eq!(attrs.get(GEN_AI_USAGE_INPUT_TOKENS), Some(&Value::I64(10)));
        assert!(!attrs.contains(GEN_AI_USAGE_TOTAL_TOKENS));
    }

    #[test]
    fn test_get_returns_latest_value() {
        let mut attrs = Attributes::new();
        attrs.insert(ERROR_TYPE, "Error").insert(ERROR_TYPE, "RateLimitError");
        assert_eq!(attrs.get_str(ERROR_TYPE).as_deref(), Some("RateLimitError"));
    }
}
