//! Structured-output schema and reply validation.
//!
//! The schema is generated from [`ClassificationReply`] with `schemars` and
//! then rewritten for strict structured output:
//! 1. `additionalProperties: false` on every object schema
//! 2. every property listed in `required`
//! 3. `$ref`s inlined, single-entry `allOf` wrappers flattened and
//!    `definitions` removed

use schemars::{schema_for, JsonSchema};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ClassifierError, ClassifierResult};
use crate::types::{category::Category, proposal::ClassificationResult};

/// Shape the backend is asked to produce.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ClassificationReply {
    #[schemars(description = "A categoria da proposta.")]
    pub category: Category,

    #[schemars(
        description = "Uma lista de locais geográficos (ruas, bairros, praças, etc.) mencionados \
                       na ementa. Se nenhum local for mencionado, retorne um array vazio."
    )]
    pub locations: Vec<String>,
}

/// What is actually accepted back: the category may be any string so an
/// off-taxonomy label can be coerced instead of discarding the locations.
#[derive(Debug, Deserialize)]
struct LenientReply {
    category: Option<String>,
    locations: Option<Value>,
}

/// Strict JSON schema for [`ClassificationReply`].
pub fn classification_schema() -> Value {
    strict_schema::<ClassificationReply>()
}

/// Generate a strict structured-output schema for any `JsonSchema` type.
pub fn strict_schema<T: JsonSchema>() -> Value {
    let mut value = serde_json::to_value(schema_for!(T)).unwrap_or_default();

    close_objects(&mut value);

    let definitions = value.get("definitions").cloned();
    if let Some(definitions) = definitions {
        inline_refs(&mut value, &definitions);
    }
    flatten_all_of(&mut value);

    if let Value::Object(map) = &mut value {
        map.remove("definitions");
        map.remove("$schema");
    }

    value
}

fn close_objects(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.get("type").and_then(Value::as_str) == Some("object") {
                map.insert("additionalProperties".to_string(), Value::Bool(false));
                if let Some(Value::Object(props)) = map.get("properties") {
                    let required = props.keys().cloned().map(Value::String).collect();
                    map.insert("required".to_string(), Value::Array(required));
                }
            }
            for (_, nested) in map.iter_mut() {
                close_objects(nested);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(close_objects),
        _ => {}
    }
}

fn inline_refs(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            let target = map
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|r| r.strip_prefix("#/definitions/"))
                .and_then(|name| definitions.get(name))
                .cloned();

            if let Some(mut definition) = target {
                inline_refs(&mut definition, definitions);
                // Keep sibling keywords such as `description` next to the ref.
                map.remove("$ref");
                if let Value::Object(def_map) = definition {
                    for (key, v) in def_map {
                        map.entry(key).or_insert(v);
                    }
                }
                return;
            }

            for (_, nested) in map.iter_mut() {
                inline_refs(nested, definitions);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|item| inline_refs(item, definitions)),
        _ => {}
    }
}

/// schemars wraps a described `$ref` as `{"allOf": [ref], "description": ..}`.
fn flatten_all_of(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let single = match map.get("allOf") {
                Some(Value::Array(items)) if items.len() == 1 => items[0].as_object().cloned(),
                _ => None,
            };
            if let Some(inner) = single {
                map.remove("allOf");
                for (key, v) in inner {
                    map.entry(key).or_insert(v);
                }
            }
            for (_, nested) in map.iter_mut() {
                flatten_all_of(nested);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(flatten_all_of),
        _ => {}
    }
}

/// Validate and normalize a raw backend reply.
///
/// Markdown code fences are tolerated. A missing or empty category, or
/// `locations` that is not an array, is an error; those are the only checks.
/// The rest is normalization, not validation: an unknown category label is
/// coerced to the catch-all, and location entries are trimmed with
/// non-string and blank entries dropped. Order is kept.
pub fn parse_reply(raw: &str) -> ClassifierResult<ClassificationResult> {
    let reply: LenientReply = serde_json::from_str(strip_code_blocks(raw))?;

    let label = reply
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ClassifierError::InvalidReply("missing category".into()))?;

    let locations = match reply.locations {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        Some(_) => {
            return Err(ClassifierError::InvalidReply(
                "locations is not an array".into(),
            ))
        }
        None => return Err(ClassifierError::InvalidReply("missing locations".into())),
    };

    Ok(ClassificationResult::new(
        Category::from_label_or_catch_all(&label),
        locations,
    ))
}

/// Strip markdown code blocks from a response.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}
