//! A2UI Message Decoder
//!
//! Classifies framed records into [`ProtocolMessage`]s. Nothing here returns
//! an error: a record that cannot be decoded becomes
//! [`ProtocolMessage::Unrecognized`], so one bad line never ends a stream.

use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::framer::LineFramer;
use super::message::*;

const KNOWN_KEYS: [&str; 4] = [
    SURFACE_UPDATE_KEY,
    DATA_MODEL_UPDATE_KEY,
    BEGIN_RENDERING_KEY,
    DELETE_SURFACE_KEY,
];

/// Decode one record into exactly one message.
///
/// A top-level JSON array is not a single message and decodes to
/// `Unrecognized`; use [`decode_many`] to expand batches.
pub fn decode(record: &str) -> ProtocolMessage {
    let trimmed = record.trim();
    if !looks_structured(trimmed) {
        return unrecognized(record);
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => classify(map, record),
        Ok(_) => unrecognized(record),
        Err(e) => {
            ::log::debug!("[A2UI decoder] Parse failed: {}", e);
            unrecognized(record)
        }
    }
}

/// Decode one record, expanding a top-level array into its elements.
///
/// Elements that are not valid messages come back as `Unrecognized` in
/// their position, so the valid ones still apply.
pub fn decode_many(record: &str) -> Vec<ProtocolMessage> {
    let trimmed = record.trim();
    if !trimmed.starts_with('[') {
        return vec![decode(record)];
    }

    match serde_json::from_str::<Vec<Value>>(trimmed) {
        Ok(values) => values
            .into_iter()
            .map(|value| match value {
                Value::Object(map) => {
                    let raw = Value::Object(map.clone()).to_string();
                    classify(map, &raw)
                }
                other => unrecognized(&other.to_string()),
            })
            .collect(),
        Err(e) => {
            ::log::debug!("[A2UI decoder] Batch parse failed: {}", e);
            vec![unrecognized(record)]
        }
    }
}

fn classify(mut map: Map<String, Value>, raw: &str) -> ProtocolMessage {
    let present: Vec<&str> = KNOWN_KEYS
        .into_iter()
        .filter(|key| map.contains_key(*key))
        .collect();

    match present.as_slice() {
        [key] => {
            let key = *key;
            let payload = map.remove(key).unwrap_or(Value::Null);
            let decoded = match key {
                SURFACE_UPDATE_KEY => payload_as(payload).map(ProtocolMessage::SurfaceUpdate),
                DATA_MODEL_UPDATE_KEY => {
                    payload_as(payload).map(ProtocolMessage::DataModelUpdate)
                }
                BEGIN_RENDERING_KEY => payload_as(payload).map(ProtocolMessage::BeginRendering),
                _ => payload_as(payload).map(ProtocolMessage::DeleteSurface),
            };
            decoded.unwrap_or_else(|e| {
                ::log::warn!("[A2UI decoder] Malformed {} payload: {}", key, e);
                unrecognized(raw)
            })
        }
        [] => match map.remove(META_KEY) {
            Some(tag) => {
                let tag = match tag {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                ProtocolMessage::StatusEvent(StatusEvent { tag, payload: map })
            }
            None => unrecognized(raw),
        },
        many => {
            ::log::warn!(
                "[A2UI decoder] Record carries {} message kinds ({}), ignoring",
                many.len(),
                many.join(", ")
            );
            unrecognized(raw)
        }
    }
}

fn payload_as<T: DeserializeOwned>(payload: Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(payload)
}

fn unrecognized(raw: &str) -> ProtocolMessage {
    ProtocolMessage::Unrecognized {
        raw: raw.to_string(),
    }
}

/// Framer and decoder combined, for one inbound text stream.
///
/// Blank records and lines that never looked like JSON are absorbed here.
/// Structured records that fail to decode are passed on as `Unrecognized`.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    framer: LineFramer,
    absorbed: usize,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a fragment and return the messages it completed.
    pub fn push(&mut self, fragment: &str) -> Vec<ProtocolMessage> {
        let mut messages = Vec::new();
        for record in self.framer.feed(fragment) {
            let trimmed = record.trim();
            if trimmed.is_empty() {
                continue;
            }
            // Noise is judged on the whole record; a bad batch element stays.
            if !looks_structured(trimmed) {
                ::log::debug!("[A2UI decoder] Skipping non-JSON line: {:.80}", record);
                self.absorbed += 1;
                continue;
            }
            messages.extend(decode_many(&record));
        }
        messages
    }

    /// End of stream: decode whatever is left in the framer.
    ///
    /// Leftover text that does not decode is reported as `Unrecognized`,
    /// even if it never looked like JSON.
    pub fn finish(&mut self) -> Vec<ProtocolMessage> {
        match self.framer.flush() {
            Some(rest) if !rest.trim().is_empty() => {
                ::log::debug!("[A2UI decoder] Flushing {} buffered bytes", rest.len());
                decode_many(&rest)
            }
            _ => Vec::new(),
        }
    }

    /// Noise lines absorbed so far.
    pub fn absorbed(&self) -> usize {
        self.absorbed
    }
}

/// Decode a stream of text fragments into a stream of messages.
pub fn decode_stream<S>(fragments: S) -> impl Stream<Item = ProtocolMessage>
where
    S: Stream<Item = String>,
{
    async_stream::stream! {
        let mut decoder = StreamDecoder::new();
        futures::pin_mut!(fragments);
        while let Some(fragment) = fragments.next().await {
            for message in decoder.push(&fragment) {
                yield message;
            }
        }
        for message in decoder.finish() {
            yield message;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_surface_update() {
        let msg = decode(
            r#"{"surfaceUpdate": {"components": [{"id": "title", "component": {"Text": {"text": {"literalString": "Hello"}, "usageHint": "h1"}}}]}}"#,
        );
        match msg {
            ProtocolMessage::SurfaceUpdate(su) => {
                assert_eq!(su.surface_id, None);
                assert_eq!(su.components.len(), 1);
                assert_eq!(su.components[0].id, "title");
            }
            other => panic!("Expected SurfaceUpdate, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_begin_rendering() {
        let msg = decode(
            r##"{"beginRendering": {"surfaceId": "main", "root": "root-column", "styles": {"primaryColor": "#007BFF"}}}"##,
        );
        match msg {
            ProtocolMessage::BeginRendering(br) => {
                assert_eq!(br.surface_id.as_deref(), Some("main"));
                assert_eq!(br.root, "root-column");
                assert_eq!(
                    br.styles.unwrap().primary_color,
                    Some("#007BFF".to_string())
                );
            }
            other => panic!("Expected BeginRendering, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_delete_surface_and_data_model() {
        assert!(matches!(
            decode(r#"{"deleteSurface": {"surfaceId": "side"}}"#),
            ProtocolMessage::DeleteSurface(d) if d.surface_id == "side"
        ));
        assert!(matches!(
            decode(r#"{"dataModelUpdate": {"contents": {}}}"#),
            ProtocolMessage::DataModelUpdate(d) if d.contents.is_empty()
        ));
    }

    #[test]
    fn test_decode_status_event() {
        let msg = decode(r#"{"_meta": "A2A_STATUS", "status": "DELEGATING_TO_AGENTS"}"#);
        match msg {
            ProtocolMessage::StatusEvent(event) => {
                assert_eq!(event.tag, "A2A_STATUS");
                assert_eq!(
                    event.payload.get("status"),
                    Some(&Value::String("DELEGATING_TO_AGENTS".to_string()))
                );
            }
            other => panic!("Expected StatusEvent, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_failures_are_unrecognized() {
        for record in [
            "",
            "not json",
            "{\"surfaceUpdate\": ",
            "{\"other\": 1}",
            "[1, 2]",
            "{\"beginRendering\": {}}",
            "{\"beginRendering\": {\"root\": \"\"}}",
            "{\"surfaceUpdate\": {\"components\": []}, \"beginRendering\": {\"root\": \"r\"}}",
        ] {
            assert!(decode(record).is_unrecognized(), "{record:?}");
        }
    }

    #[test]
    fn test_decode_is_idempotent() {
        for record in [
            r#"{"surfaceUpdate": {"components": [{"id": "a", "component": {"Gauge": {}}}]}}"#,
            r#"{"_meta": "X"}"#,
            "garbage",
            "{\"broken\"",
        ] {
            assert_eq!(decode(record), decode(record));
        }
    }

    #[test]
    fn test_reserialized_line_decodes_to_same_message() {
        let record = r#"{"surfaceUpdate":{"components":[{"id":"a","component":{"Row":{"children":{"explicitList":["b","c"]},"alignment":"center"}}}]}}"#;
        let msg = decode(record);
        assert_eq!(decode(&msg.to_line().unwrap()), msg);
    }

    #[test]
    fn test_decode_many_expands_batches() {
        let batch = r#"[{"beginRendering": {"root": "r"}}, {"nope": true}, {"deleteSurface": {"surfaceId": "s"}}]"#;
        let messages = decode_many(batch);
        assert_eq!(messages.len(), 3);
        assert!(matches!(messages[0], ProtocolMessage::BeginRendering(_)));
        assert!(messages[1].is_unrecognized());
        assert!(matches!(messages[2], ProtocolMessage::DeleteSurface(_)));
    }

    #[test]
    fn test_batch_with_bad_elements_is_not_noise() {
        let mut decoder = StreamDecoder::new();
        let messages = decoder.push("[1, 2]\n[{\"beginRendering\":{\"root\":\"r\"}}, \"x\"]\n");

        assert_eq!(decoder.absorbed(), 0);
        assert_eq!(messages.len(), 4);
        assert_eq!(
            messages[0],
            ProtocolMessage::Unrecognized {
                raw: "1".to_string()
            }
        );
        assert!(messages[1].is_unrecognized());
        assert!(matches!(messages[2], ProtocolMessage::BeginRendering(_)));
        assert!(messages[3].is_unrecognized());
    }

    #[test]
    fn test_stream_decoder_absorbs_noise() {
        let mut decoder = StreamDecoder::new();
        let mut messages = decoder.push("Here is your UI:\n\n{\"beginRendering\":");
        assert!(messages.is_empty());
        messages.extend(decoder.push("{\"root\":\"r\"}}\n{\"broken\n"));
        messages.extend(decoder.finish());

        assert_eq!(decoder.absorbed(), 1);
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0], ProtocolMessage::BeginRendering(_)));
        assert!(messages[1].is_unrecognized());
    }

    #[test]
    fn test_finish_reports_leftover_noise() {
        let mut decoder = StreamDecoder::new();
        assert!(decoder.push("trailing text without newline").is_empty());
        let rest = decoder.finish();
        assert_eq!(
            rest,
            vec![ProtocolMessage::Unrecognized {
                raw: "trailing text without newline".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_decode_stream_scenario() {
        let fragments = futures::stream::iter(vec![
            "{\"surfaceUpdate\":{\"components\":[{\"id\":\"a\",".to_string(),
            "\"component\":{\"Text\":{\"text\":{\"literalString\":\"Hi\"}}}}]}}\n".to_string(),
        ]);
        let messages: Vec<ProtocolMessage> = decode_stream(fragments).collect().await;
        assert_eq!(messages.len(), 1);
        match &messages[0] {
            ProtocolMessage::SurfaceUpdate(su) => {
                assert_eq!(su.components.len(), 1);
                assert_eq!(su.components[0].id, "a");
                assert_eq!(su.components[0].component.label().as_deref(), Some("Hi"));
            }
            other => panic!("Expected SurfaceUpdate, got {other:?}"),
        }
    }
}
