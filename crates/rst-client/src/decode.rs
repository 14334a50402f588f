//! Typed decoding of server payloads.
//!
//! One payload shape per resource. Each decodes or fails as a whole; the
//! optional fields every payload may carry (parameters, freshness flags,
//! external data) live in a shared envelope.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use rst_filter::{CharacteristicValue, Item};
use rst_sync::{FetchError, Freshness, ParamValue, Parameters, ResultSet, TabKind};

/// Server-side parameter names that differ from the client's keys.
const RENAMED_PARAMETERS: [(&str, &str); 2] = [
    ("classifierType", "typeOfClassifier"),
    ("defaultClassificationResultType", "defaultClassificationResult"),
];

/// Rule characteristic names as sent by the server, and the names the
/// filter language uses for them.
const RULE_CHARACTERISTICS: [(&str, &str); 15] = [
    ("Support", "support"),
    ("Strength", "strength"),
    ("Confidence", "confidence"),
    ("CoverageFactor", "coverage-factor"),
    ("Coverage", "coverage"),
    ("NegativeCoverage", "negative-coverage"),
    ("Length", "length"),
    ("EpsilonMeasure", "epsilon"),
    ("EpsilonPrimeMeasure", "epsilon'"),
    ("FConfirmationMeasure", "F"),
    ("AConfirmationMeasure", "A"),
    ("ZConfirmationMeasure", "Z"),
    ("LConfirmationMeasure", "L"),
    ("C1ConfirmationMeasure", "c1"),
    ("SConfirmationMeasure", "S"),
];

/// Client key for a parameter name the server uses.
pub fn client_parameter_name(server: &str) -> &str {
    RENAMED_PARAMETERS
        .iter()
        .find(|(from, _)| *from == server)
        .map_or(server, |(_, to)| *to)
}

/// Server name for a client parameter key.
pub fn server_parameter_name(client: &str) -> &str {
    RENAMED_PARAMETERS
        .iter()
        .find(|(_, to)| *to == client)
        .map_or(client, |(from, _)| *from)
}

/// Filter name of a rule characteristic; unknown names pass through.
pub fn rule_characteristic_name(server: &str) -> &str {
    RULE_CHARACTERISTICS
        .iter()
        .find(|(from, _)| *from == server)
        .map_or(server, |(_, to)| *to)
}

/// Decode a payload for `kind`.
///
/// # Errors
///
/// Returns [`FetchError::Decode`] naming the resource if the body does not
/// have that resource's shape.
pub fn decode(kind: TabKind, body: &[u8]) -> Result<ResultSet, FetchError> {
    match kind {
        TabKind::Unions => decode_as::<UnionsPayload>(kind, body),
        TabKind::Rules => decode_as::<RulesPayload>(kind, body),
        TabKind::Classification => decode_as::<ClassificationPayload>(kind, body),
        TabKind::CrossValidation => decode_as::<CrossValidationPayload>(kind, body),
    }
}

fn decode_as<P: Payload + DeserializeOwned>(kind: TabKind, body: &[u8]) -> Result<ResultSet, FetchError> {
    let payload: P = serde_json::from_slice(body).map_err(|e| FetchError::Decode {
        resource: kind.resource_name().to_string(),
        reason: e.to_string(),
    })?;
    let (envelope, items) = payload.into_parts();
    tracing::trace!(resource = kind.resource_name(), items = items.len(), "payload decoded");
    Ok(envelope.into_result(items))
}

trait Payload {
    fn into_parts(self) -> (Envelope, Vec<Item>);
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    #[serde(default)]
    parameters: BTreeMap<String, ParamValue>,
    is_current_learning_data: Option<bool>,
    is_current_rule_set: Option<bool>,
    external_data: Option<bool>,
}

impl Envelope {
    fn into_result(self, items: Vec<Item>) -> ResultSet {
        let parameters: Parameters = self
            .parameters
            .into_iter()
            .map(|(name, value)| (client_parameter_name(&name).to_string(), value))
            .collect();

        ResultSet {
            items,
            parameters,
            freshness: Freshness {
                learning_data: self.is_current_learning_data,
                rule_set: self.is_current_rule_set,
            },
            external_data: self.external_data,
        }
    }
}

// =============================================================================
// UNIONS
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnionsPayload {
    #[serde(flatten)]
    envelope: Envelope,
    #[serde(default)]
    downward_unions: Vec<Union>,
    #[serde(default)]
    upward_unions: Vec<Union>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Union {
    union_type: String,
    accuracy_of_approximation: f64,
    quality_of_approximation: f64,
    #[serde(default)]
    objects: Vec<usize>,
}

impl Payload for UnionsPayload {
    fn into_parts(self) -> (Envelope, Vec<Item>) {
        let items = self
            .downward_unions
            .into_iter()
            .chain(self.upward_unions)
            .enumerate()
            .map(|(id, union)| {
                Item::new(id)
                    .with("unionType", union.union_type)
                    .with("accuracyOfApproximation", union.accuracy_of_approximation)
                    .with("qualityOfApproximation", union.quality_of_approximation)
                    .with("objects", union.objects.len())
            })
            .collect();
        (self.envelope, items)
    }
}

// =============================================================================
// RULES
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RulesPayload {
    #[serde(flatten)]
    envelope: Envelope,
    #[serde(default)]
    rule_set: Vec<RuleEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuleEntry {
    /// `null` marks a characteristic the server could not compute.
    #[serde(default)]
    rule_characteristics: BTreeMap<String, Option<f64>>,
}

impl Payload for RulesPayload {
    fn into_parts(self) -> (Envelope, Vec<Item>) {
        let items = self
            .rule_set
            .into_iter()
            .enumerate()
            .map(|(id, entry)| {
                let mut item = Item::new(id);
                for (name, value) in entry.rule_characteristics {
                    if let Some(value) = value {
                        item.set(rule_characteristic_name(&name), value);
                    }
                }
                item
            })
            .collect();
        (self.envelope, items)
    }
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassificationPayload {
    #[serde(flatten)]
    envelope: Envelope,
    #[serde(default)]
    classified_objects: Vec<ClassifiedObject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassifiedObject {
    original_decision: Option<CharacteristicValue>,
    suggested_decision: Option<CharacteristicValue>,
    certainty: Option<f64>,
    number_of_covering_rules: Option<usize>,
}

impl Payload for ClassificationPayload {
    fn into_parts(self) -> (Envelope, Vec<Item>) {
        let items = self
            .classified_objects
            .into_iter()
            .enumerate()
            .map(|(id, object)| {
                let mut item = Item::new(id);
                if let Some(decision) = object.original_decision {
                    item.set("originalDecision", decision);
                }
                if let Some(decision) = object.suggested_decision {
                    item.set("suggestedDecision", decision);
                }
                if let Some(certainty) = object.certainty {
                    item.set("certainty", certainty);
                }
                if let Some(rules) = object.number_of_covering_rules {
                    item.set("numberOfCoveringRules", rules);
                }
                item
            })
            .collect();
        (self.envelope, items)
    }
}

// =============================================================================
// CROSS-VALIDATION
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CrossValidationPayload {
    #[serde(flatten)]
    envelope: Envelope,
    #[serde(default)]
    folds: Vec<Fold>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Fold {
    accuracy: Option<f64>,
    number_of_training_objects: Option<usize>,
    number_of_test_objects: Option<usize>,
}

impl Payload for CrossValidationPayload {
    fn into_parts(self) -> (Envelope, Vec<Item>) {
        let items = self
            .folds
            .into_iter()
            .enumerate()
            .map(|(id, fold)| {
                let mut item = Item::new(id).with("fold", id + 1);
                if let Some(accuracy) = fold.accuracy {
                    item.set("accuracy", accuracy);
                }
                if let Some(count) = fold.number_of_training_objects {
                    item.set("numberOfTrainingObjects", count);
                }
                if let Some(count) = fold.number_of_test_objects {
                    item.set("numberOfTestObjects", count);
                }
                item
            })
            .collect();
        (self.envelope, items)
    }
}
