// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent classification through the oracle.

use std::sync::Arc;

use taskwright_core::{Intent, OracleAdapter, OracleRequest, TaskwrightError};
use tracing::debug;

use crate::prompt;

/// Asks the oracle what a message wants and parses the JSON it returns.
///
/// One oracle call per message, no retries. Anything that is not a JSON
/// object is a [`TaskwrightError::MalformedIntent`].
pub struct IntentClassifier {
    oracle: Arc<dyn OracleAdapter>,
}

impl IntentClassifier {
    pub fn new(oracle: Arc<dyn OracleAdapter>) -> Self {
        Self { oracle }
    }

    pub async fn classify(&self, message: &str) -> Result<Intent, TaskwrightError> {
        let request = OracleRequest::json(prompt::classification_prompt(message));
        let response = self.oracle.complete(request).await?;
        let intent = parse_intent(&response.text)?;
        debug!(
            intent = %intent.kind,
            confidence = ?intent.confidence,
            model = %response.model,
            "classified message"
        );
        Ok(intent)
    }
}

/// Parses the oracle's classification text.
///
/// Missing fields take their defaults; a missing or unrecognized `intent`
/// becomes [`taskwright_core::IntentKind::Unknown`].
pub fn parse_intent(text: &str) -> Result<Intent, TaskwrightError> {
    let value: serde_json::Value =
        serde_json::from_str(text.trim()).map_err(|e| TaskwrightError::MalformedIntent {
            message: format!("response is not valid JSON: {e}"),
            source: Some(Box::new(e)),
        })?;

    if !value.is_object() {
        return Err(TaskwrightError::MalformedIntent {
            message: "expected a JSON object".to_string(),
            source: None,
        });
    }

    serde_json::from_value(value).map_err(|e| TaskwrightError::MalformedIntent {
        message: format!("unexpected intent shape: {e}"),
        source: Some(Box::new(e)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskwright_core::{IntentKind, ResponseFormat};
    use taskwright_test_utils::MockOracle;

    #[test]
    fn parses_add_intent() {
        let intent = parse_intent(
            r#"{"intent":"add","confidence":0.95,"entities":{"title":"buy milk","description":null,"status":null,"task_id":null,"task_description":null},"response":null}"#,
        )
        .unwrap();
        assert_eq!(intent.kind, IntentKind::Add);
        assert_eq!(intent.entities.title.as_deref(), Some("buy milk"));
        assert!(intent.entities.description.is_none());
    }

    #[test]
    fn greeting_carries_response() {
        let intent =
            parse_intent(r#"{"intent":"greeting","response":"Hello there!"}"#).unwrap();
        assert_eq!(intent.kind, IntentKind::Greeting);
        assert_eq!(intent.direct_response.as_deref(), Some("Hello there!"));
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let intent = parse_intent("\n  {\"intent\": \"list\"}  \n").unwrap();
        assert_eq!(intent.kind, IntentKind::List);
    }

    #[test]
    fn non_json_is_malformed() {
        let err = parse_intent("Sure! You want to add a task.").unwrap_err();
        assert!(matches!(err, TaskwrightError::MalformedIntent { .. }));
        assert!(err.is_oracle_failure());
    }

    #[test]
    fn non_object_json_is_malformed() {
        for text in ["[1, 2]", "\"add\"", "42", "null"] {
            let err = parse_intent(text).unwrap_err();
            assert!(
                matches!(err, TaskwrightError::MalformedIntent { .. }),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn wrongly_typed_field_is_malformed() {
        let err = parse_intent(r#"{"intent":"add","entities":{"title":["a"]}}"#).unwrap_err();
        assert!(matches!(err, TaskwrightError::MalformedIntent { .. }));
    }

    #[test]
    fn loose_confidence_and_scalar_entities_are_accepted() {
        let intent = parse_intent(
            r#"{"intent":"add","confidence":"high","entities":{"title":"buy milk"}}"#,
        )
        .unwrap();
        assert_eq!(intent.kind, IntentKind::Add);
        assert!(intent.confidence.is_none());
        assert_eq!(intent.entities.title.as_deref(), Some("buy milk"));

        let intent = parse_intent(r#"{"intent":"add","entities":{"title":42}}"#).unwrap();
        assert_eq!(intent.kind, IntentKind::Add);
        assert_eq!(intent.entities.title.as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn classify_requests_json_mode() {
        let oracle = Arc::new(MockOracle::with_responses(vec![
            r#"{"intent":"list","entities":{"status":"pending"}}"#.to_string(),
        ]));
        let classifier = IntentClassifier::new(oracle.clone());

        let intent = classifier.classify("what's left to do?").await.unwrap();
        assert_eq!(intent.kind, IntentKind::List);
        assert_eq!(intent.entities.status.as_deref(), Some("pending"));

        let requests = oracle.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].format, ResponseFormat::JsonObject);
        assert!(requests[0].prompt.contains("what's left to do?"));
    }

    #[tokio::test]
    async fn oracle_failure_propagates() {
        let oracle = Arc::new(MockOracle::new());
        oracle.add_failure("upstream unavailable").await;
        let classifier = IntentClassifier::new(oracle);

        let err = classifier.classify("hi").await.unwrap_err();
        assert!(matches!(err, TaskwrightError::Oracle { .. }));
    }
}
