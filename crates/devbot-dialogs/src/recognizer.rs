use async_trait::async_trait;
use devbot_core::config::ClassifierConfig;
use devbot_core::types::ItemType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClassifierError;

/// Intent label meaning "nothing recognised".
pub const NONE_INTENT: &str = "None";

/// A named value pulled out of the utterance (e.g. `ItemType = "Bug"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub value: String,
}

/// Top intent plus entities for one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recognition {
    pub intent: String,
    pub confidence: f64,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl Recognition {
    pub fn none() -> Self {
        Self {
            intent: NONE_INTENT.to_string(),
            confidence: 1.0,
            entities: Vec::new(),
        }
    }

    pub fn top_entity(&self) -> Option<&Entity> {
        self.entities.first()
    }

    /// Parse a Bot Builder style recognizer result:
    ///
    /// ```json
    /// { "intents":  { "Create_New": { "score": 0.92 }, "None": { "score": 0.03 } },
    ///   "entities": { "$instance": { ... }, "ItemType": [["Bug"]] } }
    /// ```
    ///
    /// The highest-scoring intent wins. Keys starting with `$` are metadata
    /// and skipped. List entities (`[["Bug"]]`) contribute their first value.
    /// Entity order follows key order.
    pub fn from_recognizer_json(raw: &Value) -> Result<Self, ClassifierError> {
        let intents = raw
            .get("intents")
            .and_then(Value::as_object)
            .ok_or_else(|| ClassifierError::Malformed("missing intents object".to_string()))?;

        let mut top: Option<(&str, f64)> = None;
        for (name, detail) in intents {
            let score = detail.get("score").and_then(Value::as_f64).ok_or_else(|| {
                ClassifierError::Malformed(format!("intent {name} has no numeric score"))
            })?;
            if top.map_or(true, |(_, best)| score > best) {
                top = Some((name.as_str(), score));
            }
        }
        let (intent, confidence) = top.unwrap_or((NONE_INTENT, 0.0));

        let mut entities = Vec::new();
        match raw.get("entities") {
            None | Some(Value::Null) => {}
            Some(Value::Object(map)) => {
                for (name, values) in map.iter().filter(|(k, _)| !k.starts_with('$')) {
                    let values = values.as_array().ok_or_else(|| {
                        ClassifierError::Malformed(format!("entity {name} is not an array"))
                    })?;
                    for v in values {
                        entities.push(Entity {
                            name: name.clone(),
                            value: entity_value(name, v)?,
                        });
                    }
                }
            }
            Some(_) => {
                return Err(ClassifierError::Malformed(
                    "entities is not an object".to_string(),
                ))
            }
        }

        Ok(Self {
            intent: intent.to_string(),
            confidence,
            entities,
        })
    }
}

/// A plain string, or the first string of a (possibly nested) list entity.
fn entity_value(name: &str, v: &Value) -> Result<String, ClassifierError> {
    match v {
        Value::String(s) => Ok(s.clone()),
        Value::Array(inner) => match inner.first() {
            Some(first) => entity_value(name, first),
            None => Err(ClassifierError::Malformed(format!(
                "entity {name} has an empty value list"
            ))),
        },
        other => Err(ClassifierError::Malformed(format!(
            "entity {name} has unexpected value {other}"
        ))),
    }
}

/// External NLU collaborator mapping free text to an intent.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Recognition, ClassifierError>;
}

/// Source of raw Bot Builder recognizer results (a hosted NLU endpoint,
/// a recorded fixture, ...).
#[async_trait]
pub trait RecognizerClient: Send + Sync {
    async fn recognize_raw(&self, text: &str) -> Result<Value, ClassifierError>;
}

/// Classifier over a [`RecognizerClient`]: fetches the raw result and
/// parses it with [`Recognition::from_recognizer_json`].
pub struct RecognizerClassifier<C> {
    client: C,
}

impl<C: RecognizerClient> RecognizerClassifier<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: RecognizerClient> IntentClassifier for RecognizerClassifier<C> {
    async fn classify(&self, text: &str) -> Result<Recognition, ClassifierError> {
        let raw = self.client.recognize_raw(text).await?;
        Recognition::from_recognizer_json(&raw)
    }
}

/// Deterministic classifier driven by the item-type table and a verb list.
///
/// "please create a bug" → create intent (0.9), "bug" alone → create intent
/// (0.6), anything without an item type → `None`.
pub struct KeywordClassifier {
    create_intent: String,
    verbs: Vec<String>,
}

impl KeywordClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            create_intent: config.create_intent.clone(),
            verbs: config.create_verbs.iter().map(|v| v.to_lowercase()).collect(),
        }
    }

    fn recognize(&self, text: &str) -> Recognition {
        // Lowercase, punctuation to spaces, single-spaced, padded for whole-word matching.
        let cleaned: String = text
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();
        let padded = format!(" {} ", cleaned.split_whitespace().collect::<Vec<_>>().join(" "));

        let item_type = ItemType::all()
            .find(|t| padded.contains(&format!(" {} ", t.label().to_lowercase())));
        let Some(item_type) = item_type else {
            return Recognition::none();
        };

        let has_verb = self
            .verbs
            .iter()
            .any(|v| padded.contains(&format!(" {} ", v)));

        Recognition {
            intent: self.create_intent.clone(),
            confidence: if has_verb { 0.9 } else { 0.6 },
            entities: vec![Entity {
                name: "ItemType".to_string(),
                value: item_type.as_str().to_string(),
            }],
        }
    }
}

#[async_trait]
impl IntentClassifier for KeywordClassifier {
    async fn classify(&self, text: &str) -> Result<Recognition, ClassifierError> {
        Ok(self.recognize(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_list_entities_and_top_intent() {
        let raw = json!({
            "text": "create a new bug",
            "intents": { "Create_New": { "score": 0.92 }, "None": { "score": 0.04 } },
            "entities": {
                "$instance": { "ItemType": [{ "startIndex": 13 }] },
                "ItemType": [["Bug"]]
            }
        });
        let rec = Recognition::from_recognizer_json(&raw).unwrap();
        assert_eq!(rec.intent, "Create_New");
        assert!((rec.confidence - 0.92).abs() < f64::EPSILON);
        assert_eq!(
            rec.top_entity(),
            Some(&Entity {
                name: "ItemType".into(),
                value: "Bug".into()
            })
        );
    }

    #[test]
    fn missing_entities_yield_empty_list() {
        let raw = json!({ "intents": { "None": { "score": 0.8 } } });
        let rec = Recognition::from_recognizer_json(&raw).unwrap();
        assert_eq!(rec.intent, "None");
        assert!(rec.top_entity().is_none());
    }

    #[test]
    fn malformed_shapes_are_rejected() {
        let cases = [
            json!({}),
            json!({ "intents": { "Create_New": { "score": "high" } } }),
            json!({ "intents": {}, "entities": { "ItemType": "Bug" } }),
            json!({ "intents": {}, "entities": { "ItemType": [[]] } }),
            json!({ "intents": {}, "entities": { "ItemType": [42] } }),
            json!({ "intents": {}, "entities": [] }),
        ];
        for raw in cases {
            let err = Recognition::from_recognizer_json(&raw).unwrap_err();
            assert!(matches!(err, ClassifierError::Malformed(_)), "{raw}");
        }
    }

    struct Canned(Value);

    #[async_trait]
    impl RecognizerClient for Canned {
        async fn recognize_raw(&self, _text: &str) -> Result<Value, ClassifierError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn recognizer_classifier_parses_client_results() {
        let c = RecognizerClassifier::new(Canned(json!({
            "intents": { "Create_New": { "score": 0.7 } },
            "entities": { "ItemType": [["Epic"]] }
        })));
        let rec = c.classify("new epic").await.unwrap();
        assert_eq!(rec.intent, "Create_New");
        assert_eq!(rec.top_entity().unwrap().value, "Epic");

        let broken = RecognizerClassifier::new(Canned(json!({ "topScoringIntent": "x" })));
        let err = broken.classify("anything").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Malformed(_)));
    }

    #[tokio::test]
    async fn keyword_classifier_scores_verbs_higher() {
        let c = KeywordClassifier::new(&ClassifierConfig::default());

        let rec = c.classify("Please create a new User Story!").await.unwrap();
        assert_eq!(rec.intent, "Create_New");
        assert_eq!(rec.confidence, 0.9);
        assert_eq!(rec.top_entity().unwrap().value, "User Story");

        let rec = c.classify("bug").await.unwrap();
        assert_eq!(rec.intent, "Create_New");
        assert_eq!(rec.confidence, 0.6);

        let rec = c.classify("what's the weather like").await.unwrap();
        assert_eq!(rec.intent, NONE_INTENT);
    }

    #[tokio::test]
    async fn keyword_classifier_matches_whole_words_only() {
        let c = KeywordClassifier::new(&ClassifierConfig::default());
        // "debugging" contains "bug" but is not the item type.
        let rec = c.classify("create debugging notes").await.unwrap();
        assert_eq!(rec.intent, NONE_INTENT);
    }
}
