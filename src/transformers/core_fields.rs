//! Core field mapping.
//!
//! Copies the well-known top-level string fields from whichever alias the
//! source document uses onto their canonical names.

use serde_json::{Map, Value};

use super::{Context, TransformError, Transformer, WorkingState};

/// Target field and its source keys, in priority order.
pub const CORE_MAPPINGS: &[(&str, &[&str])] = &[
    ("name", &["name", "title"]),
    ("description", &["description", "details", "summary"]),
    ("image", &["image", "image_url", "imageUrl", "imageURI"]),
    ("animation_url", &["animation_url", "animationUrl", "animationURI"]),
    ("external_url", &["external_url", "externalUrl"]),
];

/// String fields defaulted to `""` when still unset after mapping.
const REQUIRED_DEFAULTS: &[&str] = &["name", "description", "image"];

pub struct CoreFieldsTransformer;

impl Transformer for CoreFieldsTransformer {
    fn name(&self) -> &str {
        "core_fields"
    }

    fn transform(&self, state: &mut WorkingState<'_>, ctx: &mut Context<'_>) -> Result<(), TransformError> {
        for (target, candidates) in CORE_MAPPINGS {
            if let Some((source_key, value)) = pick_string(state.raw, candidates) {
                state.result.insert((*target).to_string(), Value::String(value));
                ctx.info(format!("Mapped {target}"), source_key);
            }
        }

        for field in REQUIRED_DEFAULTS {
            fill_if_unset(&mut state.result, field, Value::String(String::new()));
        }
        fill_if_unset(&mut state.result, "attributes", Value::Array(Vec::new()));

        Ok(())
    }
}

/// First candidate holding a string, trimmed. Null and non-string values are skipped.
fn pick_string(source: &Map<String, Value>, candidates: &[&'static str]) -> Option<(&'static str, String)> {
    candidates.iter().find_map(|key| match source.get(*key) {
        Some(Value::String(text)) => Some((*key, text.trim().to_string())),
        _ => None,
    })
}

fn fill_if_unset(result: &mut Map<String, Value>, field: &str, default: Value) {
    match result.get_mut(field) {
        Some(value) if !value.is_null() => {}
        Some(value) => *value = default,
        None => {
            result.insert(field.to_string(), default);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::ResolvedOptions;
    use crate::profiles::default_profile;
    use serde_json::json;

    fn run(raw: Value, seed: Value) -> (Map<String, Value>, Vec<crate::diagnostics::Diagnostic>) {
        let profile = default_profile();
        let opts = ResolvedOptions {
            hash: false,
            include_meta: false,
            source: "unspecified".into(),
            timestamp: "2024-03-01T00:00:00.000Z".into(),
        };
        let raw = raw.as_object().cloned().unwrap();
        let mut state = WorkingState {
            raw: &raw,
            result: seed.as_object().cloned().unwrap(),
        };
        let mut ctx = Context::new(&profile, &opts);
        CoreFieldsTransformer.transform(&mut state, &mut ctx).unwrap();
        (state.result, ctx.into_diagnostics())
    }

    #[test]
    fn test_aliases_mapped_and_trimmed() {
        let (result, diagnostics) = run(
            json!({
                "title": "  Demo  ",
                "summary": "short",
                "imageURI": "ipfs://x",
                "externalUrl": "https://example.com"
            }),
            json!({}),
        );
        assert_eq!(result.get("name"), Some(&json!("Demo")));
        assert_eq!(result.get("description"), Some(&json!("short")));
        assert_eq!(result.get("image"), Some(&json!("ipfs://x")));
        assert_eq!(result.get("external_url"), Some(&json!("https://example.com")));
        assert!(result.get("animation_url").is_none());

        let paths: Vec<_> = diagnostics.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["title", "summary", "imageURI", "externalUrl"]);
        assert_eq!(diagnostics[0].message, "Mapped name");
    }

    #[test]
    fn test_priority_and_non_string_skipped() {
        let (result, diagnostics) = run(
            json!({"name": null, "title": "Fallback", "description": 42, "details": "d"}),
            json!({}),
        );
        assert_eq!(result.get("name"), Some(&json!("Fallback")));
        assert_eq!(result.get("description"), Some(&json!("d")));
        assert_eq!(diagnostics[0].path, "title");
        assert_eq!(diagnostics[1].path, "details");
    }

    #[test]
    fn test_defaults_forced_on_empty_input() {
        let (result, diagnostics) = run(json!({}), json!({"name": null}));
        assert_eq!(
            Value::Object(result),
            json!({"name": "", "description": "", "image": "", "attributes": []})
        );
        assert!(diagnostics.is_empty());
    }
}
