//! Agent Output Processing
//!
//! Best-effort structured extraction from model completions. The model is
//! asked to return JSON, but completions routinely wrap it in prose or
//! code fences, so we carve out the first embedded JSON object or array
//! (greedy: first opening bracket to the last matching closing bracket)
//! and parse that. When no parseable JSON exists the agent falls back to a
//! deterministic category-specific structure built from the truncated raw
//! text, scored at reduced confidence.

use serde_json::{json, Value};

use super::AgentKind;

/// Quality score assigned to fallback output
pub const FALLBACK_QUALITY: f64 = 0.6;

/// Structured, scored output of one completion
#[derive(Debug, Clone)]
pub struct ParsedOutput {
    /// The structured payload
    pub data: Value,
    /// Quality score in [0, 1]
    pub quality_score: f64,
}

/// Carve the first embedded JSON object or array out of `raw` and parse it
pub fn extract_json(raw: &str) -> Option<Value> {
    let object = raw.find('{').and_then(|start| {
        let end = raw.rfind('}')?;
        (end > start).then(|| &raw[start..=end])
    });
    let array = raw.find('[').and_then(|start| {
        let end = raw.rfind(']')?;
        (end > start).then(|| &raw[start..=end])
    });

    // Whichever structure opens first wins
    let candidate = match (object, array) {
        (Some(obj), Some(arr)) => {
            if raw.find('{') < raw.find('[') {
                obj
            } else {
                arr
            }
        }
        (Some(obj), None) => obj,
        (None, Some(arr)) => arr,
        (None, None) => return None,
    };

    serde_json::from_str(candidate).ok()
}

/// Process a raw completion into structured, scored output.
///
/// Deterministic and infallible: parse failures degrade to the kind's
/// fallback structure with a lower quality score.
pub fn process_output(kind: AgentKind, raw: &str) -> ParsedOutput {
    if let Some(mut value) = extract_json(raw) {
        if let Some(map) = value.as_object_mut() {
            if !map.contains_key("quality_score") {
                map.insert("quality_score".to_string(), json!(kind.default_quality()));
            }
        }
        let quality_score = value
            .get("quality_score")
            .and_then(Value::as_f64)
            .unwrap_or_else(|| kind.default_quality())
            .clamp(0.0, 1.0);
        return ParsedOutput {
            data: value,
            quality_score,
        };
    }

    ParsedOutput {
        data: fallback_output(kind, raw),
        quality_score: FALLBACK_QUALITY,
    }
}

/// Deterministic category-specific fallback built from the raw text
fn fallback_output(kind: AgentKind, raw: &str) -> Value {
    match kind {
        AgentKind::ContentWriter => json!({
            "title": "Obsah generovaný AI",
            "meta_description": truncate_chars(raw, 160),
            "content": {
                "intro": truncate_chars(raw, 200),
                "sections": [{"heading": "Obsah", "text": raw}],
                "conclusion": "Děkujeme za pozornost.",
            },
            "seo_keywords": [],
            "quality_score": FALLBACK_QUALITY,
        }),
        AgentKind::SeoSpecialist => json!({
            "meta_title": truncate_chars(raw, 60),
            "meta_description": truncate_chars(raw, 160),
            "h1": truncate_chars(raw, 80),
            "h2_sections": [],
            "keywords": {"primary": "", "secondary": []},
            "internal_links": [],
            "quality_score": FALLBACK_QUALITY,
        }),
        AgentKind::ProductManager => json!({
            "product_name": "Produkt Calor",
            "short_description": truncate_chars(raw, 160),
            "long_description": raw,
            "key_features": [],
            "benefits": [],
            "technical_specs": {},
            "target_audience": "",
            "quality_score": FALLBACK_QUALITY,
        }),
        AgentKind::MarketingCopy => json!({
            "headline": truncate_chars(raw, 80),
            "subheadline": "",
            "body_copy": raw,
            "value_propositions": [],
            "cta_primary": "Získejte nabídku",
            "cta_secondary": "",
            "quality_score": FALLBACK_QUALITY,
        }),
    }
}

/// Truncate to at most `max` characters, respecting char boundaries
fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
