//! Canonical placeholder grammar and the utterance-rewriting strategies.
//!
//! Two families of vendor encodings exist for "a slot mention inside free
//! text":
//! - inline markers embedded in the text itself (`{city}`,
//!   `[Paris](city)`, `[Paris]{"entity":"city","value":"paris"}`) —
//!   handled by [`rewrite_simple_markers`] and [`rewrite_entity_markers`];
//! - external structural annotations pointing into the text (character
//!   offset ranges, or pre-split plaintext/annotation segment lists) —
//!   handled by [`rewrite_spans`] and [`rewrite_segments`].
//!
//! Marker rewriting may create slots on first sight (the marker itself
//! carries the name); structural annotations must reference slots that
//! already exist, and an unresolvable reference is a hard
//! [`ImportError::MissingSlotReference`].

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::ImportError;
use super::registry::SlotRegistry;
use crate::models::SlotType;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W").unwrap());

/// `{slotName}` markers.
static SIMPLE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^{}]+)\}").unwrap());

/// `[literal](entity)` markers. The character classes exclude `.`/braces
/// so the JSON form never half-matches.
static ENTITY_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^.\[\]{}]*?)\]\(([^.\[\]{}]*?)\)").unwrap());

/// `[literal]{...}` markers with an inline JSON annotation object.
static ENTITY_MARKER_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^.\[\]{}]*?)\](\{.+?\})").unwrap());

/// Strip every non-word character from a slot display name, for use inside
/// the placeholder grammar.
pub fn sanitize_slot_name(name: &str) -> String {
    NON_WORD.replace_all(name, "").into_owned()
}

/// The canonical slot-mention encoding: `{{[name].key}}`.
pub fn placeholder(name: &str, key: &str) -> String {
    format!("{{{{[{}].{}}}}}", sanitize_slot_name(name), key)
}

/// A rewritten utterance: canonical text plus the keys of every slot it
/// references, in first-occurrence order, one entry per slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotated {
    pub text: String,
    pub slots: Vec<String>,
}

fn record_key(slots: &mut Vec<String>, key: &str) {
    if !slots.iter().any(|k| k == key) {
        slots.push(key.to_string());
    }
}

/// Rewrite `{name}` markers against the registry, creating `Custom` slots
/// for names seen for the first time. Unmatched text passes through
/// unchanged.
pub fn rewrite_simple_markers(text: &str, registry: &mut SlotRegistry) -> Annotated {
    let mut slots = Vec::new();
    let rewritten = SIMPLE_MARKER.replace_all(text, |caps: &Captures| {
        let slot = registry.get_or_create(&caps[1], |_| SlotType::Custom);
        let (name, key) = (slot.name.clone(), slot.key.clone());
        record_key(&mut slots, &key);
        placeholder(&name, &key)
    });
    Annotated {
        text: rewritten.into_owned(),
        slots,
    }
}

/// One slot mention found while rewriting entity markers.
#[derive(Debug, Clone, Copy)]
pub struct EntityMention<'a> {
    /// Entity (slot) name carried by the marker.
    pub entity: &'a str,
    /// The literal display text the marker wrapped.
    pub literal: &'a str,
    /// Canonical value from the JSON marker form, when present. The
    /// literal is then a synonym of this value.
    pub value: Option<&'a str>,
}

/// Rewrite `[literal](entity)` and `[literal]{json}` markers, creating
/// `Custom` slots on first sight. Every resolved mention is reported to
/// `on_mention` so the caller can accumulate slot inputs and synonyms. A
/// JSON marker whose object carries no `entity` field is left untouched.
pub fn rewrite_entity_markers<F>(
    text: &str,
    registry: &mut SlotRegistry,
    mut on_mention: F,
) -> Annotated
where
    F: FnMut(EntityMention<'_>),
{
    let mut slots = Vec::new();

    let pass = ENTITY_MARKER.replace_all(text, |caps: &Captures| {
        let (literal, entity) = (&caps[1], &caps[2]);
        let slot = registry.get_or_create(entity, |_| SlotType::Custom);
        let (name, key) = (slot.name.clone(), slot.key.clone());
        record_key(&mut slots, &key);
        on_mention(EntityMention {
            entity,
            literal,
            value: None,
        });
        placeholder(&name, &key)
    });

    let rewritten = ENTITY_MARKER_JSON.replace_all(&pass, |caps: &Captures| {
        let literal = &caps[1];
        let Ok(annotation) = serde_json::from_str::<serde_json::Value>(&caps[2]) else {
            return caps[0].to_string();
        };
        let Some(entity) = annotation.get("entity").and_then(serde_json::Value::as_str) else {
            return caps[0].to_string();
        };
        let slot = registry.get_or_create(entity, |_| SlotType::Custom);
        let (name, key) = (slot.name.clone(), slot.key.clone());
        record_key(&mut slots, &key);
        on_mention(EntityMention {
            entity,
            literal,
            value: annotation.get("value").and_then(serde_json::Value::as_str),
        });
        placeholder(&name, &key)
    });

    Annotated {
        text: rewritten.into_owned(),
        slots,
    }
}

/// One annotated character range over the original utterance text.
/// `start..end` is half-open, in Unicode scalar positions.
#[derive(Debug, Clone, Copy)]
pub struct SpanRef<'a> {
    pub start: usize,
    pub end: usize,
    /// Name of the referenced slot; must already be registered.
    pub slot: &'a str,
}

/// Rewrite externally-annotated spans. Spans are consumed in a single
/// ascending pass with a cursor into the original text — rewritten text is
/// never re-scanned, so replacement length changes cannot shift later
/// offsets. An out-of-range or overlapping span is a
/// [`ImportError::MalformedRecord`]; an unregistered slot reference is a
/// [`ImportError::MissingSlotReference`].
pub fn rewrite_spans(
    text: &str,
    spans: &[SpanRef<'_>],
    registry: &SlotRegistry,
) -> Result<Annotated, ImportError> {
    let chars: Vec<char> = text.chars().collect();
    let mut ordered: Vec<&SpanRef<'_>> = spans.iter().collect();
    ordered.sort_by_key(|span| span.start);

    let mut out = String::with_capacity(text.len());
    let mut slots = Vec::new();
    let mut cursor = 0usize;
    for span in ordered {
        if span.start < cursor || span.end < span.start || span.end > chars.len() {
            return Err(ImportError::MalformedRecord(format!(
                "annotation span {}..{} does not fit \"{}\"",
                span.start, span.end, text
            )));
        }
        let slot = registry
            .get(span.slot)
            .ok_or_else(|| ImportError::MissingSlotReference(span.slot.to_string()))?;
        out.extend(chars[cursor..span.start].iter());
        out.push_str(&placeholder(&slot.name, &slot.key));
        record_key(&mut slots, &slot.key);
        cursor = span.end;
    }
    out.extend(chars[cursor..].iter());

    Ok(Annotated { text: out, slots })
}

/// Pre-split utterance segment: plain text, or a slot annotation by name.
#[derive(Debug, Clone, Copy)]
pub enum Segment<'a> {
    Text(&'a str),
    Slot(&'a str),
}

/// Rewrite a pre-split segment list, joining the pieces with `joiner`.
/// Slot segments must reference registered slots.
pub fn rewrite_segments(
    segments: &[Segment<'_>],
    joiner: &str,
    registry: &SlotRegistry,
) -> Result<Annotated, ImportError> {
    let mut parts = Vec::with_capacity(segments.len());
    let mut slots = Vec::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => parts.push((*text).to_string()),
            Segment::Slot(name) => {
                let slot = registry
                    .get(name)
                    .ok_or_else(|| ImportError::MissingSlotReference((*name).to_string()))?;
                parts.push(placeholder(&slot.name, &slot.key));
                record_key(&mut slots, &slot.key);
            }
        }
    }
    Ok(Annotated {
        text: parts.join(joiner),
        slots,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_non_word() {
        assert_eq!(sanitize_slot_name("pick-up time"), "pickuptime");
        assert_eq!(sanitize_slot_name("@sys.date-time"), "sysdatetime");
        assert_eq!(sanitize_slot_name("city"), "city");
    }

    #[test]
    fn test_simple_markers_create_custom_slots() {
        let mut registry = SlotRegistry::new();
        let annotated = rewrite_simple_markers("I live in {city}", &mut registry);
        let slot = registry.get("city").unwrap();
        assert_eq!(slot.slot_type, SlotType::Custom);
        assert_eq!(annotated.text, format!("I live in {{{{[city].{}}}}}", slot.key));
        assert_eq!(annotated.slots, vec![slot.key.clone()]);
    }

    #[test]
    fn test_repeated_mentions_record_one_key() {
        let mut registry = SlotRegistry::new();
        let annotated = rewrite_simple_markers("from {city} to {city}", &mut registry);
        assert_eq!(annotated.slots.len(), 1);
        let key = &registry.get("city").unwrap().key;
        assert_eq!(
            annotated.text,
            format!("from {{{{[city].{key}}}}} to {{{{[city].{key}}}}}")
        );
    }

    #[test]
    fn test_entity_markers_report_mentions() {
        let mut registry = SlotRegistry::new();
        let mut mentions = Vec::new();
        let annotated = rewrite_entity_markers(
            "fly to [Paris](city) tomorrow",
            &mut registry,
            |mention| mentions.push((mention.entity.to_string(), mention.literal.to_string())),
        );
        assert_eq!(mentions, vec![("city".to_string(), "Paris".to_string())]);
        let key = &registry.get("city").unwrap().key;
        assert_eq!(annotated.text, format!("fly to {{{{[city].{key}}}}} tomorrow"));
    }

    #[test]
    fn test_json_entity_markers_carry_canonical_value() {
        let mut registry = SlotRegistry::new();
        let mut values = Vec::new();
        rewrite_entity_markers(
            r#"order a [coke]{"entity":"drink","value":"cola"}"#,
            &mut registry,
            |mention| values.push(mention.value.map(str::to_string)),
        );
        assert_eq!(values, vec![Some("cola".to_string())]);
        assert!(registry.contains("drink"));
    }

    #[test]
    fn test_json_marker_without_entity_is_left_alone() {
        let mut registry = SlotRegistry::new();
        let text = r#"a [b]{"value":"c"} d"#;
        let annotated = rewrite_entity_markers(text, &mut registry, |_| {});
        assert_eq!(annotated.text, text);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_spans_rewrite_left_to_right() {
        let mut registry = SlotRegistry::new();
        registry.get_or_create("city", |_| SlotType::Geography);
        let key = registry.get("city").unwrap().key.clone();

        let spans = [SpanRef {
            start: 17,
            end: 22,
            slot: "city",
        }];
        let annotated = rewrite_spans("book a flight to Paris", &spans, &registry).unwrap();
        assert_eq!(
            annotated.text,
            format!("book a flight to {{{{[city].{key}}}}}")
        );
        assert_eq!(annotated.slots, vec![key]);
    }

    #[test]
    fn test_multiple_spans_no_offset_drift() {
        let mut registry = SlotRegistry::new();
        registry.get_or_create("a", |_| SlotType::Custom);
        registry.get_or_create("b", |_| SlotType::Custom);
        let (ka, kb) = (
            registry.get("a").unwrap().key.clone(),
            registry.get("b").unwrap().key.clone(),
        );

        //               0123456789
        let text = "x met y in z";
        let spans = [
            SpanRef { start: 0, end: 1, slot: "a" },
            SpanRef { start: 6, end: 7, slot: "b" },
        ];
        let annotated = rewrite_spans(text, &spans, &registry).unwrap();
        assert_eq!(
            annotated.text,
            format!("{{{{[a].{ka}}}}} met {{{{[b].{kb}}}}} in z")
        );
    }

    #[test]
    fn test_span_unknown_slot_is_fatal() {
        let registry = SlotRegistry::new();
        let spans = [SpanRef { start: 0, end: 1, slot: "ghost" }];
        let err = rewrite_spans("x", &spans, &registry).unwrap_err();
        assert!(matches!(err, ImportError::MissingSlotReference(_)));
    }

    #[test]
    fn test_overlapping_spans_are_malformed() {
        let mut registry = SlotRegistry::new();
        registry.get_or_create("a", |_| SlotType::Custom);
        let spans = [
            SpanRef { start: 0, end: 3, slot: "a" },
            SpanRef { start: 2, end: 4, slot: "a" },
        ];
        let err = rewrite_spans("abcd", &spans, &registry).unwrap_err();
        assert!(matches!(err, ImportError::MalformedRecord(_)));
    }

    #[test]
    fn test_segments_join_and_resolve() {
        let mut registry = SlotRegistry::new();
        registry.get_or_create("CITY", |_| SlotType::Custom);
        let key = registry.get("CITY").unwrap().key.clone();

        let segments = [
            Segment::Text("I want to go to"),
            Segment::Slot("CITY"),
            Segment::Text("please"),
        ];
        let annotated = rewrite_segments(&segments, " ", &registry).unwrap();
        assert_eq!(
            annotated.text,
            format!("I want to go to {{{{[CITY].{key}}}}} please")
        );
    }
}
