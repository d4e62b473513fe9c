//! Multi-agent coordinator
//!
//! Fans one request out to several agents and merges what they produce into
//! a single A2UI stream. A shell layout is emitted before any agent runs so
//! a consumer can paint immediately; agent output follows in configured
//! order regardless of which agent finished first.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

use futures::StreamExt;
use futures::future::join_all;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::agent::{AgentOutcome, AgentRequest, AgentRunner, millis};
use super::message::*;

/// Tag of the lifecycle status events.
pub const STATUS_TAG: &str = "A2A_STATUS";
/// Tag of the event describing the delegation.
pub const CONTEXT_TAG: &str = "COORDINATOR_CONTEXT";
/// Protocol name reported in the context event.
pub const PROTOCOL_NAME: &str = "A2UI v0.8";

/// Coordinator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoordinatorConfig {
    /// Header text shown above the agent slots
    pub title: String,
    pub root_id: ComponentId,
    pub header_id: ComponentId,
    /// Root of the surface shown when orchestration fails
    pub error_root_id: ComponentId,
    /// Emit `_meta` status events around the dispatch
    pub emit_status: bool,
    /// Budget for the whole dispatch phase, in milliseconds on the wire
    #[serde(with = "millis", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        CoordinatorConfig {
            title: "A2UI Dashboard".to_string(),
            root_id: ComponentId::fixed("main_root"),
            header_id: ComponentId::fixed("header"),
            error_root_id: ComponentId::fixed("error_root"),
            emit_status: true,
            timeout: None,
        }
    }
}

/// Orchestration failures. Each ends the stream on the error surface.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoordinatorError {
    #[error("no agents configured")]
    NoAgents,

    #[error("agent {0} is configured more than once")]
    DuplicateAgent(String),

    #[error("agent {agent} uses reserved component id {slot}")]
    ReservedSlot { agent: String, slot: ComponentId },

    #[error("agents {first} and {second} both fill slot {slot}")]
    SharedSlot {
        slot: ComponentId,
        first: String,
        second: String,
    },

    #[error("shell component id {0} is configured for more than one role")]
    ConflictingShellIds(ComponentId),

    #[error("agents did not finish within {}ms", .0.as_millis())]
    Timeout(Duration),
}

/// Runs a fixed set of agents for each request.
#[derive(Debug, Clone, Default)]
pub struct Coordinator {
    config: CoordinatorConfig,
    runners: Vec<AgentRunner>,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig) -> Self {
        Coordinator {
            config,
            runners: Vec::new(),
        }
    }

    /// Add an agent. Output order follows the order agents are added.
    pub fn with_agent(mut self, runner: AgentRunner) -> Self {
        self.runners.push(runner);
        self
    }

    pub fn add_agent(&mut self, runner: AgentRunner) {
        self.runners.push(runner);
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn agents(&self) -> &[AgentRunner] {
        &self.runners
    }

    /// Check the agent set before anything is emitted.
    pub fn validate(&self) -> Result<(), CoordinatorError> {
        if self.runners.is_empty() {
            return Err(CoordinatorError::NoAgents);
        }

        let mut reserved = HashSet::new();
        for shell_id in self.shell_ids() {
            if reserved.contains(&shell_id) {
                return Err(CoordinatorError::ConflictingShellIds(shell_id));
            }
            reserved.insert(shell_id);
        }

        let mut seen = HashSet::new();
        let mut slots: HashMap<&ComponentId, &str> = HashMap::new();
        for runner in &self.runners {
            if !seen.insert(runner.id()) {
                return Err(CoordinatorError::DuplicateAgent(runner.id().to_string()));
            }
            if reserved.contains(runner.slot()) {
                return Err(CoordinatorError::ReservedSlot {
                    agent: runner.id().to_string(),
                    slot: runner.slot().clone(),
                });
            }
            if let Some(first) = slots.insert(runner.slot(), runner.id()) {
                return Err(CoordinatorError::SharedSlot {
                    slot: runner.slot().clone(),
                    first: first.to_string(),
                    second: runner.id().to_string(),
                });
            }
        }
        Ok(())
    }

    /// The two `SurfaceUpdate`s that lay out the shell.
    pub fn shell(&self) -> Vec<ProtocolMessage> {
        let mut layout = vec![self.config.header_id.clone()];
        let mut parts = vec![ComponentEntry::new(
            self.config.header_id.clone(),
            ComponentNode::text(self.config.title.clone(), Some(TextUsageHint::H1)),
        )];

        for (index, runner) in self.runners.iter().enumerate() {
            if index > 0 {
                let divider = divider_id(index);
                layout.push(divider.clone());
                parts.push(ComponentEntry::new(
                    divider,
                    ComponentNode::Divider(DividerComponent::default()),
                ));
            }
            layout.push(runner.slot().clone());
            // Empty placeholder until the agent fills its slot
            parts.push(ComponentEntry::new(
                runner.slot().clone(),
                ComponentNode::column(Vec::new()),
            ));
        }

        vec![
            ProtocolMessage::surface_update(vec![ComponentEntry::new(
                self.config.root_id.clone(),
                ComponentNode::column(layout),
            )]),
            ProtocolMessage::surface_update(parts),
        ]
    }

    /// Run every agent for `request` and stream the merged result.
    ///
    /// The stream always ends with a `BeginRendering`, either for the main
    /// root or for the error root. Dropping it cancels all agents.
    pub fn run(&self, request: AgentRequest) -> BoxStream<'static, ProtocolMessage> {
        let config = self.config.clone();
        let runners = self.runners.clone();
        let validation = self.validate();
        let shell = self.shell();

        let stream = async_stream::stream! {
            if let Err(e) = validation {
                ::log::error!("[A2UI coordinator] Invalid setup: {}", e);
                for message in terminal(&config, &e) {
                    yield message;
                }
                return;
            }

            ::log::info!(
                "[A2UI coordinator] Delegating {:?} to {} agents",
                request.as_str(),
                runners.len()
            );

            // Init
            for message in shell {
                yield message;
            }

            // Announce
            if config.emit_status {
                let agent_ids: Vec<&str> = runners.iter().map(AgentRunner::id).collect();
                yield status(json!({"status": "COORDINATOR_ACTIVE"}));
                yield ProtocolMessage::status(CONTEXT_TAG, object(json!({
                    "context": {
                        "request": request.as_str(),
                        "agents": agent_ids,
                        "protocol": PROTOCOL_NAME,
                    }
                })));
                yield status(json!({"status": "DELEGATING_TO_AGENTS"}));
            }
            yield ProtocolMessage::begin_rendering(config.root_id.clone());

            // Dispatch
            let dispatch = join_all(runners.iter().map(|runner| runner.run(&request)));
            let outcomes = match config.timeout {
                Some(limit) => match tokio::time::timeout(limit, dispatch).await {
                    Ok(outcomes) => outcomes,
                    Err(_) => {
                        let e = CoordinatorError::Timeout(limit);
                        ::log::error!("[A2UI coordinator] {}", e);
                        for message in terminal(&config, &e) {
                            yield message;
                        }
                        return;
                    }
                },
                None => dispatch.await,
            };

            // Flush
            warn_shared_ids(&outcomes);
            if config.emit_status {
                yield status(completion_payload(&outcomes));
            }
            for message in merge_outcomes(&outcomes) {
                yield message;
            }

            // Finalize
            yield ProtocolMessage::empty_data_model();
            yield ProtocolMessage::begin_rendering(config.root_id.clone());

            ::log::info!("[A2UI coordinator] Stream complete");
        };
        stream.boxed()
    }

    /// Ids the shell itself writes, plus the error root.
    fn shell_ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        [
            self.config.root_id.clone(),
            self.config.header_id.clone(),
            self.config.error_root_id.clone(),
        ]
        .into_iter()
        .chain((1..self.runners.len()).map(divider_id))
    }
}

/// Concatenate agent outputs in the order given.
///
/// Completion order never shows up here, so identical outcomes always
/// produce identical output.
pub fn merge_outcomes(outcomes: &[AgentOutcome]) -> Vec<ProtocolMessage> {
    outcomes
        .iter()
        .flat_map(|outcome| outcome.messages.iter().cloned())
        .collect()
}

/// The error surface that ends a failed session.
pub fn terminal(config: &CoordinatorConfig, error: &CoordinatorError) -> Vec<ProtocolMessage> {
    vec![
        ProtocolMessage::surface_update(vec![ComponentEntry::new(
            config.error_root_id.clone(),
            ComponentNode::text(format!("Error: {error}"), None),
        )]),
        ProtocolMessage::begin_rendering(config.error_root_id.clone()),
    ]
}

fn divider_id(index: usize) -> ComponentId {
    ComponentId::fixed("divider").with_suffix(&format!("_{index}"))
}

fn status(payload: Value) -> ProtocolMessage {
    ProtocolMessage::status(STATUS_TAG, object(payload))
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn completion_payload(outcomes: &[AgentOutcome]) -> Value {
    let counts: Map<String, Value> = outcomes
        .iter()
        .map(|outcome| (outcome.agent_id.clone(), Value::from(outcome.messages.len())))
        .collect();
    let failed: Vec<&str> = outcomes
        .iter()
        .filter(|outcome| outcome.is_failure())
        .map(|outcome| outcome.agent_id.as_str())
        .collect();
    json!({
        "status": "AGENTS_COMPLETE",
        "counts": counts,
        "failed": failed,
    })
}

/// Ids written by more than one agent, with the agents that wrote them.
///
/// Colliding ids are left as they are; later agents win downstream.
pub fn shared_ids(outcomes: &[AgentOutcome]) -> BTreeMap<ComponentId, Vec<String>> {
    let mut writers: BTreeMap<ComponentId, Vec<String>> = BTreeMap::new();
    for outcome in outcomes {
        for id in outcome.component_ids() {
            let agents = writers.entry(id.clone()).or_default();
            if !agents.contains(&outcome.agent_id) {
                agents.push(outcome.agent_id.clone());
            }
        }
    }
    writers.retain(|_, agents| agents.len() > 1);
    writers
}

fn warn_shared_ids(outcomes: &[AgentOutcome]) {
    for (id, agents) in shared_ids(outcomes) {
        ::log::warn!(
            "[A2UI coordinator] Component {} written by several agents: {}",
            id,
            agents.join(", ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::a2ui::agent::{Agent, AgentError, ScriptedAgent};
    use std::sync::Arc;

    fn id(s: &str) -> ComponentId {
        ComponentId::new(s).unwrap()
    }

    fn text_entry(component_id: &str, text: &str) -> ComponentEntry {
        ComponentEntry::new(id(component_id), ComponentNode::text(text, None))
    }

    fn scripted(agent_id: &str, messages: &[ProtocolMessage], delay_ms: u64) -> Arc<dyn Agent> {
        Arc::new(
            ScriptedAgent::from_messages(agent_id, messages)
                .with_delay(Duration::from_millis(delay_ms)),
        )
    }

    fn market_messages() -> Vec<ProtocolMessage> {
        vec![
            ProtocolMessage::surface_update(vec![text_entry("market_root", "BTC 64k")]),
            ProtocolMessage::begin_rendering(id("market_root")),
        ]
    }

    fn news_messages() -> Vec<ProtocolMessage> {
        vec![ProtocolMessage::surface_update(vec![text_entry(
            "news_root",
            "Halving soon",
        )])]
    }

    fn coordinator(market_delay: u64, news_delay: u64) -> Coordinator {
        Coordinator::new(CoordinatorConfig {
            title: "BTC Analysis Dashboard".to_string(),
            ..Default::default()
        })
        .with_agent(AgentRunner::new(
            scripted("market", &market_messages(), market_delay),
            id("market_root"),
        ))
        .with_agent(AgentRunner::new(
            scripted("news", &news_messages(), news_delay),
            id("news_root"),
        ))
    }

    async fn collect_lines(stream: BoxStream<'static, ProtocolMessage>) -> Vec<String> {
        stream
            .map(|message| message.to_line().unwrap())
            .collect()
            .await
    }

    fn status_of(message: &ProtocolMessage) -> Option<&str> {
        match message {
            ProtocolMessage::StatusEvent(event) if event.tag == STATUS_TAG => {
                event.payload.get("status").and_then(Value::as_str)
            }
            _ => None,
        }
    }

    #[test]
    fn test_shell_layout() {
        let shell = coordinator(0, 0).shell();
        assert_eq!(shell.len(), 2);
        match &shell[0] {
            ProtocolMessage::SurfaceUpdate(update) => {
                assert_eq!(update.components[0].id, "main_root");
                let children: Vec<&str> = update.components[0]
                    .component
                    .children()
                    .into_iter()
                    .map(|child| match child {
                        Child::Ref(id) => id.as_str(),
                        Child::Inline(_) => "inline",
                    })
                    .collect();
                assert_eq!(children, vec!["header", "market_root", "divider_1", "news_root"]);
            }
            other => panic!("Expected SurfaceUpdate, got {other:?}"),
        }
        match &shell[1] {
            ProtocolMessage::SurfaceUpdate(update) => {
                let ids: Vec<&str> = update.components.iter().map(|e| e.id.as_str()).collect();
                assert_eq!(ids, vec!["header", "market_root", "divider_1", "news_root"]);
                assert_eq!(
                    update.components[0].component,
                    ComponentNode::text("BTC Analysis Dashboard", Some(TextUsageHint::H1))
                );
            }
            other => panic!("Expected SurfaceUpdate, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_run_phases() {
        let messages: Vec<ProtocolMessage> =
            coordinator(10, 5).run(AgentRequest::new("BTC")).collect().await;

        let statuses: Vec<&str> = messages.iter().filter_map(status_of).collect();
        assert_eq!(
            statuses,
            vec!["COORDINATOR_ACTIVE", "DELEGATING_TO_AGENTS", "AGENTS_COMPLETE"]
        );
        assert!(messages.iter().any(|m| matches!(
            m,
            ProtocolMessage::StatusEvent(event) if event.tag == CONTEXT_TAG
        )));

        // Shell is shown before any agent output.
        let first_render = messages
            .iter()
            .position(|m| matches!(m, ProtocolMessage::BeginRendering(_)))
            .unwrap();
        let first_agent_output = messages
            .iter()
            .position(|m| m == &market_messages()[0])
            .unwrap();
        assert!(first_render < first_agent_output);

        let tail = &messages[messages.len() - 2..];
        assert_eq!(tail[0], ProtocolMessage::empty_data_model());
        assert_eq!(tail[1], ProtocolMessage::begin_rendering(id("main_root")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_output_is_independent_of_completion_order() {
        let market_slow = collect_lines(coordinator(50, 1).run(AgentRequest::new("BTC"))).await;
        let news_slow = collect_lines(coordinator(1, 50).run(AgentRequest::new("BTC"))).await;
        assert_eq!(market_slow, news_slow);
    }

    #[test]
    fn test_merge_outcomes_in_configured_order() {
        let first = AgentOutcome {
            agent_id: "agent1".to_string(),
            slot: id("slot1"),
            messages: vec![
                ProtocolMessage::surface_update(vec![text_entry("x", "X")]),
                ProtocolMessage::begin_rendering(id("x")),
            ],
            discarded: vec![],
            error: None,
        };
        let second = AgentOutcome {
            agent_id: "agent2".to_string(),
            slot: id("slot2"),
            messages: vec![],
            discarded: vec![],
            error: None,
        };
        assert_eq!(
            merge_outcomes(&[first.clone(), second.clone()]),
            first.messages.clone()
        );
        assert_eq!(
            merge_outcomes(&[second, first.clone()]),
            merge_outcomes(&[first])
        );
    }

    #[tokio::test]
    async fn test_empty_agent_still_finalizes() {
        let coordinator = Coordinator::new(CoordinatorConfig {
            emit_status: false,
            ..Default::default()
        })
        .with_agent(AgentRunner::new(
            scripted(
                "agent1",
                &[
                    ProtocolMessage::surface_update(vec![text_entry("x", "X")]),
                    ProtocolMessage::begin_rendering(id("x")),
                ],
                0,
            ),
            id("slot1"),
        ))
        .with_agent(AgentRunner::new(scripted("agent2", &[], 0), id("slot2")));

        let messages: Vec<ProtocolMessage> =
            coordinator.run(AgentRequest::new("topic")).collect().await;

        // shell (2) + begin rendering + agent1 (2) + finalize (2)
        assert_eq!(messages.len(), 7);
        assert!(messages.iter().all(|m| !matches!(m, ProtocolMessage::StatusEvent(_))));
        assert_eq!(messages[3], ProtocolMessage::surface_update(vec![text_entry("x", "X")]));
        assert_eq!(messages[4], ProtocolMessage::begin_rendering(id("x")));
        assert_eq!(messages[6], ProtocolMessage::begin_rendering(id("main_root")));
    }

    #[tokio::test]
    async fn test_agent_failure_becomes_slot_fragment() {
        let failing = ScriptedAgent::new("flaky", vec![]).failing_after(0, "quota exceeded");
        let coordinator = Coordinator::default()
            .with_agent(AgentRunner::new(Arc::new(failing), id("flaky_root")));
        let messages: Vec<ProtocolMessage> =
            coordinator.run(AgentRequest::new("topic")).collect().await;

        let fragment = messages
            .iter()
            .find_map(|m| match m {
                ProtocolMessage::SurfaceUpdate(update)
                    if update.components.iter().any(|e| e.id == "flaky_root")
                        && update.components.len() == 1 =>
                {
                    update.components[0].component.label()
                }
                _ => None,
            })
            .unwrap();
        assert!(fragment.contains("quota exceeded"));
        assert_eq!(
            messages.last(),
            Some(&ProtocolMessage::begin_rendering(id("main_root")))
        );
    }

    struct PanickingAgent;

    impl Agent for PanickingAgent {
        fn id(&self) -> &str {
            "panicky"
        }

        fn stream(&self, _request: &AgentRequest) -> BoxStream<'static, Result<String, AgentError>> {
            panic!("agent bug")
        }
    }

    #[tokio::test]
    async fn test_panicking_agent_does_not_end_session() {
        let coordinator = coordinator(0, 0)
            .with_agent(AgentRunner::new(Arc::new(PanickingAgent), id("panic_root")));
        let messages: Vec<ProtocolMessage> =
            coordinator.run(AgentRequest::new("BTC")).collect().await;

        assert!(messages.contains(&news_messages()[0]));
        assert_eq!(
            messages.last(),
            Some(&ProtocolMessage::begin_rendering(id("main_root")))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_ends_on_error_surface() {
        let config = CoordinatorConfig {
            timeout: Some(Duration::from_millis(100)),
            ..Default::default()
        };
        let coordinator = Coordinator::new(config.clone())
            .with_agent(AgentRunner::new(scripted("slow", &market_messages(), 1_000), id("market_root")));

        let messages: Vec<ProtocolMessage> =
            coordinator.run(AgentRequest::new("BTC")).collect().await;

        let expected = terminal(&config, &CoordinatorError::Timeout(Duration::from_millis(100)));
        assert_eq!(&messages[messages.len() - 2..], expected.as_slice());
        assert!(!messages.contains(&market_messages()[0]));
        assert!(messages.iter().filter_map(status_of).all(|s| s != "AGENTS_COMPLETE"));
    }

    #[tokio::test]
    async fn test_setup_errors_go_straight_to_terminal() {
        let config = CoordinatorConfig::default();

        let messages: Vec<ProtocolMessage> = Coordinator::new(config.clone())
            .run(AgentRequest::new("BTC"))
            .collect()
            .await;
        assert_eq!(messages, terminal(&config, &CoordinatorError::NoAgents));

        let reserved = Coordinator::new(config.clone())
            .with_agent(AgentRunner::new(scripted("a", &[], 0), id("header")));
        let messages: Vec<ProtocolMessage> =
            reserved.run(AgentRequest::new("BTC")).collect().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[1],
            ProtocolMessage::begin_rendering(id("error_root"))
        );

        let duplicate = coordinator(0, 0)
            .with_agent(AgentRunner::new(scripted("news", &[], 0), id("extra_root")));
        assert_eq!(
            duplicate.validate(),
            Err(CoordinatorError::DuplicateAgent("news".to_string()))
        );
    }

    #[test]
    fn test_two_agents_on_one_slot_rejected() {
        let shared = coordinator(0, 0)
            .with_agent(AgentRunner::new(scripted("extra", &[], 0), id("news_root")));
        assert_eq!(
            shared.validate(),
            Err(CoordinatorError::SharedSlot {
                slot: id("news_root"),
                first: "news".to_string(),
                second: "extra".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_colliding_shell_ids_rejected() {
        let config = CoordinatorConfig {
            header_id: id("main_root"),
            ..Default::default()
        };
        let coordinator = Coordinator::new(config.clone())
            .with_agent(AgentRunner::new(scripted("a", &[], 0), id("a_root")));
        assert_eq!(
            coordinator.validate(),
            Err(CoordinatorError::ConflictingShellIds(id("main_root")))
        );

        let messages: Vec<ProtocolMessage> =
            coordinator.run(AgentRequest::new("BTC")).collect().await;
        assert_eq!(
            messages,
            terminal(
                &config,
                &CoordinatorError::ConflictingShellIds(id("main_root"))
            )
        );

        let config = CoordinatorConfig {
            error_root_id: id("main_root"),
            ..Default::default()
        };
        let coordinator = Coordinator::new(config)
            .with_agent(AgentRunner::new(scripted("a", &[], 0), id("a_root")));
        assert_eq!(
            coordinator.validate(),
            Err(CoordinatorError::ConflictingShellIds(id("main_root")))
        );
    }

    #[test]
    fn test_shared_ids_are_reported() {
        let outcome = |agent: &str, ids: &[&str]| AgentOutcome {
            agent_id: agent.to_string(),
            slot: id(&format!("{agent}_root")),
            messages: vec![ProtocolMessage::surface_update(
                ids.iter().map(|i| text_entry(i, "t")).collect(),
            )],
            discarded: vec![],
            error: None,
        };
        let shared = shared_ids(&[
            outcome("a", &["a_root", "title"]),
            outcome("b", &["b_root", "title"]),
        ]);
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[&id("title")], vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_config_from_json() {
        let config: CoordinatorConfig =
            serde_json::from_str(r#"{"title": "Report", "timeout": 2500, "emitStatus": false}"#)
                .unwrap();
        assert_eq!(config.title, "Report");
        assert_eq!(config.timeout, Some(Duration::from_millis(2500)));
        assert!(!config.emit_status);
        assert_eq!(config.root_id, "main_root");
    }
}
