//! Agent runners
//!
//! An agent is anything that produces A2UI text for a request. The runner
//! frames and decodes what it produces and turns every kind of failure into
//! a displayable fragment for the agent's slot, so a coordinator never has to
//! handle agent errors itself.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::BoxStream;
use futures::{FutureExt, StreamExt};
use serde::{Deserialize, Serialize};
use url::Url;

use super::decoder::StreamDecoder;
use super::message::*;

/// What the user asked for, passed to every agent unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentRequest(String);

impl AgentRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        AgentRequest(topic.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Secret used to authenticate against an agent endpoint.
///
/// Never printed; `Debug` shows a redacted marker.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Credential(secret.into())
    }

    /// The raw secret, for building request headers.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Errors an agent can fail with.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("stream failed: {0}")]
    Stream(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("agent responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("agent panicked: {0}")]
    Panicked(String),
}

/// A producer of A2UI text.
pub trait Agent: Send + Sync {
    /// Stable name, unique within one coordinator.
    fn id(&self) -> &str;

    /// Start producing text fragments for `request`.
    ///
    /// Fragments may split records anywhere. An `Err` item ends the run.
    fn stream(&self, request: &AgentRequest) -> BoxStream<'static, Result<String, AgentError>>;
}

/// Per-agent settings, as read from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSettings {
    pub id: String,

    /// Component id the agent is expected to fill
    pub slot: ComponentId,

    /// Cap on this agent alone, in milliseconds on the wire
    #[serde(default, with = "millis", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

/// Serde helpers for `Option<Duration>` as integer milliseconds.
pub(crate) mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => s.serialize_u64(duration.as_millis() as u64),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
    }
}

/// Everything one agent contributed to a session.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOutcome {
    pub agent_id: String,
    pub slot: ComponentId,

    /// Well-formed messages in the order the agent produced them
    pub messages: Vec<ProtocolMessage>,

    /// Raw records that did not decode
    pub discarded: Vec<String>,

    /// Set when `messages` is the synthetic failure fragment
    pub error: Option<String>,
}

impl AgentOutcome {
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    /// Ids this outcome writes through `SurfaceUpdate`s.
    pub fn component_ids(&self) -> impl Iterator<Item = &ComponentId> {
        self.messages
            .iter()
            .flat_map(|message| match message {
                ProtocolMessage::SurfaceUpdate(update) => update.components.as_slice(),
                _ => &[] as &[ComponentEntry],
            })
            .map(|entry| &entry.id)
    }
}

/// Runs one agent to completion and contains its failures.
#[derive(Clone)]
pub struct AgentRunner {
    agent: Arc<dyn Agent>,
    slot: ComponentId,
    timeout: Option<Duration>,
}

impl fmt::Debug for AgentRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentRunner")
            .field("agent", &self.agent.id())
            .field("slot", &self.slot)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AgentRunner {
    pub fn new(agent: Arc<dyn Agent>, slot: ComponentId) -> Self {
        AgentRunner {
            agent,
            slot,
            timeout: None,
        }
    }

    pub fn from_settings(agent: Arc<dyn Agent>, settings: &AgentSettings) -> Self {
        if agent.id() != settings.id {
            ::log::warn!(
                "[A2UI agent] Settings for {} applied to agent {}",
                settings.id,
                agent.id()
            );
        }
        AgentRunner::new(agent, settings.slot.clone()).with_timeout(settings.timeout)
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn id(&self) -> &str {
        self.agent.id()
    }

    pub fn slot(&self) -> &ComponentId {
        &self.slot
    }

    /// Drive the agent to the end of its stream.
    ///
    /// Never fails: a stream error, a panic or the agent timeout replaces
    /// any partial output with a single fragment that overwrites the slot.
    pub async fn run(&self, request: &AgentRequest) -> AgentOutcome {
        let collect = AssertUnwindSafe(self.collect(request)).catch_unwind();

        let caught = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, collect).await {
                Ok(caught) => caught,
                Err(_) => Ok(Err(AgentError::Timeout(limit))),
            },
            None => collect.await,
        };

        let result = caught.unwrap_or_else(|panic| {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(AgentError::Panicked(message))
        });

        match result {
            Ok((messages, discarded)) => {
                ::log::debug!(
                    "[A2UI agent] {} produced {} messages ({} discarded)",
                    self.id(),
                    messages.len(),
                    discarded.len()
                );
                AgentOutcome {
                    agent_id: self.id().to_string(),
                    slot: self.slot.clone(),
                    messages,
                    discarded,
                    error: None,
                }
            }
            Err(e) => {
                ::log::warn!("[A2UI agent] {} failed: {}", self.id(), e);
                self.failure(e)
            }
        }
    }

    async fn collect(
        &self,
        request: &AgentRequest,
    ) -> Result<(Vec<ProtocolMessage>, Vec<String>), AgentError> {
        let mut fragments = self.agent.stream(request);
        let mut decoder = StreamDecoder::new();
        let mut messages = Vec::new();
        let mut discarded = Vec::new();

        while let Some(fragment) = fragments.next().await {
            let fragment = fragment?;
            sort_decoded(decoder.push(&fragment), &mut messages, &mut discarded);
        }
        sort_decoded(decoder.finish(), &mut messages, &mut discarded);

        Ok((messages, discarded))
    }

    fn failure(&self, error: AgentError) -> AgentOutcome {
        let text = format!("Agent {} failed: {}", self.id(), error);
        let fragment = ProtocolMessage::surface_update(vec![ComponentEntry::new(
            self.slot.clone(),
            ComponentNode::text(text.clone(), Some(TextUsageHint::Caption)),
        )]);
        AgentOutcome {
            agent_id: self.id().to_string(),
            slot: self.slot.clone(),
            messages: vec![fragment],
            discarded: Vec::new(),
            error: Some(text),
        }
    }
}

fn sort_decoded(
    decoded: Vec<ProtocolMessage>,
    messages: &mut Vec<ProtocolMessage>,
    discarded: &mut Vec<String>,
) {
    for message in decoded {
        match message {
            ProtocolMessage::Unrecognized { raw } => discarded.push(raw),
            other => messages.push(other),
        }
    }
}

// ============================================================================
// Scripted agent
// ============================================================================

/// Replays fixed fragments, for tests and offline demos.
#[derive(Debug, Clone)]
pub struct ScriptedAgent {
    id: String,
    fragments: Vec<String>,
    delay: Option<Duration>,
    fail_after: Option<(usize, String)>,
}

impl ScriptedAgent {
    pub fn new(id: impl Into<String>, fragments: Vec<String>) -> Self {
        ScriptedAgent {
            id: id.into(),
            fragments,
            delay: None,
            fail_after: None,
        }
    }

    /// Script from whole records, one per line.
    pub fn from_messages(id: impl Into<String>, messages: &[ProtocolMessage]) -> Self {
        let fragments = messages
            .iter()
            .filter_map(|message| message.to_line().ok())
            .map(|line| format!("{line}\n"))
            .collect();
        ScriptedAgent::new(id, fragments)
    }

    /// Sleep before each fragment.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Yield `count` fragments, then fail with `message`.
    pub fn failing_after(mut self, count: usize, message: impl Into<String>) -> Self {
        self.fail_after = Some((count, message.into()));
        self
    }
}

impl Agent for ScriptedAgent {
    fn id(&self) -> &str {
        &self.id
    }

    fn stream(&self, _request: &AgentRequest) -> BoxStream<'static, Result<String, AgentError>> {
        let fragments = self.fragments.clone();
        let delay = self.delay;
        let fail_after = self.fail_after.clone();

        let stream = async_stream::stream! {
            for (index, fragment) in fragments.into_iter().enumerate() {
                if let Some((count, message)) = &fail_after {
                    if index == *count {
                        yield Err(AgentError::Stream(message.clone()));
                        return;
                    }
                }
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                yield Ok(fragment);
            }
            if let Some((_, message)) = fail_after {
                yield Err(AgentError::Stream(message));
            }
        };
        stream.boxed()
    }
}

// ============================================================================
// HTTP agent
// ============================================================================

/// Endpoint settings for [`HttpAgent`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HttpAgentConfig {
    pub url: Url,
    #[serde(default)]
    pub credential: Option<Credential>,
}

#[derive(Serialize)]
struct HttpAgentBody<'a> {
    request: &'a str,
}

/// Streams A2UI text from an HTTP endpoint.
///
/// Sends `POST {"request": "..."}` and yields the response body as text
/// while it arrives.
#[derive(Debug, Clone)]
pub struct HttpAgent {
    id: String,
    config: HttpAgentConfig,
    client: reqwest::Client,
}

impl HttpAgent {
    pub fn new(id: impl Into<String>, config: HttpAgentConfig) -> Self {
        HttpAgent {
            id: id.into(),
            config,
            client: reqwest::Client::new(),
        }
    }
}

impl Agent for HttpAgent {
    fn id(&self) -> &str {
        &self.id
    }

    fn stream(&self, request: &AgentRequest) -> BoxStream<'static, Result<String, AgentError>> {
        let mut builder = self
            .client
            .post(self.config.url.clone())
            .json(&HttpAgentBody {
                request: request.as_str(),
            });
        if let Some(credential) = &self.config.credential {
            builder = builder.bearer_auth(credential.expose());
        }

        let stream = async_stream::stream! {
            let response = match builder.send().await {
                Ok(response) => response,
                Err(e) => {
                    yield Err(AgentError::Http(e));
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                yield Err(AgentError::Status { status: status.as_u16(), body });
                return;
            }

            let bytes = response.bytes_stream();
            futures::pin_mut!(bytes);
            let mut utf8 = Utf8Decoder::default();
            while let Some(chunk) = bytes.next().await {
                match chunk {
                    Ok(chunk) => match utf8.push(&chunk) {
                        Ok(text) => {
                            if !text.is_empty() {
                                yield Ok(text);
                            }
                        }
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    },
                    Err(e) => {
                        yield Err(AgentError::Http(e));
                        return;
                    }
                }
            }
            if let Err(e) = utf8.finish() {
                yield Err(e);
            }
        };
        stream.boxed()
    }
}

/// Incremental UTF-8 decoding over byte chunks.
///
/// A multi-byte character split across chunks is held back until the rest
/// of it arrives.
#[derive(Debug, Default)]
pub(crate) struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn push(&mut self, chunk: &[u8]) -> Result<String, AgentError> {
        self.pending.extend_from_slice(chunk);
        let valid = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            // An incomplete sequence at the end has no `error_len`.
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => return Err(AgentError::Stream(format!("Invalid UTF-8: {e}"))),
        };
        let rest = self.pending.split_off(valid);
        let complete = std::mem::replace(&mut self.pending, rest);
        String::from_utf8(complete).map_err(|e| AgentError::Stream(format!("Invalid UTF-8: {e}")))
    }

    pub fn finish(&mut self) -> Result<(), AgentError> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            let dangling = std::mem::take(&mut self.pending).len();
            Err(AgentError::Stream(format!(
                "stream ended inside a UTF-8 sequence ({dangling} bytes)"
            )))
        }
    }
}
