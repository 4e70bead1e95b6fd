//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::traits::*;
use crate::llm::{LlmError, LlmRequest, LlmResponse, ToolDefinition};
use crate::state_machine::SlotPatch;
use crate::tools::ToolOutput;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Mock LLM Client
// ============================================================================

/// Mock decision step that returns queued responses
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_response(&self) -> Result<LlmResponse, LlmError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.next_response()
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Mock Tool Executor
// ============================================================================

/// Mock tool executor with predefined outputs
pub struct MockToolExecutor {
    outputs: HashMap<String, ToolOutput>,
    patches: HashMap<String, SlotPatch>,
    definitions: Vec<ToolDefinition>,
    /// Record of tool executions
    pub executions: Mutex<Vec<(String, Value)>>,
}

impl MockToolExecutor {
    pub fn new() -> Self {
        Self {
            outputs: HashMap::new(),
            patches: HashMap::new(),
            definitions: Vec::new(),
            executions: Mutex::new(Vec::new()),
        }
    }

    /// Add a tool with a predefined output
    pub fn with_tool(mut self, name: impl Into<String>, output: ToolOutput) -> Self {
        let name = name.into();
        self.definitions.push(ToolDefinition {
            name: name.clone(),
            description: format!("Mock {name}"),
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
        });
        self.outputs.insert(name, output);
        self
    }

    /// Make every call to `name` report the given slot patch
    pub fn with_patch(mut self, name: impl Into<String>, patch: SlotPatch) -> Self {
        self.patches.insert(name.into(), patch);
        self
    }

    /// Get recorded executions
    pub fn recorded_executions(&self) -> Vec<(String, Value)> {
        self.executions.lock().unwrap().clone()
    }
}

impl Default for MockToolExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutor for MockToolExecutor {
    async fn execute(&self, name: &str, input: Value) -> Option<ToolOutput> {
        self.executions
            .lock()
            .unwrap()
            .push((name.to_string(), input));
        self.outputs.get(name).cloned()
    }

    fn slot_patch(&self, name: &str, _input: &Value) -> SlotPatch {
        self.patches.get(name).cloned().unwrap_or_default()
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        self.definitions.clone()
    }
}

// ============================================================================
// Delayed Mock LLM Client (for timeout and concurrency testing)
// ============================================================================

/// Mock decision step with a configurable delay
pub struct DelayedMockLlmClient {
    inner: MockLlmClient,
    delay: Duration,
}

impl DelayedMockLlmClient {
    pub fn new(model_id: impl Into<String>, delay: Duration) -> Self {
        Self {
            inner: MockLlmClient::new(model_id),
            delay,
        }
    }

    pub fn queue_response(&self, response: LlmResponse) {
        self.inner.queue_response(response);
    }

    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.inner.recorded_requests()
    }
}

#[async_trait]
impl LlmClient for DelayedMockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.inner.requests.lock().unwrap().push(request.clone());
        tokio::time::sleep(self.delay).await;
        self.inner.next_response()
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeBase;
    use crate::llm::{ContentBlock, LlmMessage, MessageRole, Usage};
    use crate::runtime::{AgentLoop, ConversationManager, LoopConfig, TurnError};
    use crate::state_machine::TripSlots;
    use crate::tools::{ToolRegistry, GATHER_TOOL_NAME, ITINERARY_TOOL_NAME};
    use serde_json::json;

    fn loop_config(max_cycles: u32) -> LoopConfig {
        LoopConfig {
            max_cycles,
            decision_timeout: Duration::from_secs(5),
            known_cities: vec!["Ranchi".to_string()],
        }
    }

    fn tool_call_response(calls: &[(&str, &str, Value)]) -> LlmResponse {
        LlmResponse {
            content: calls
                .iter()
                .map(|(id, name, input)| ContentBlock::tool_use(*id, *name, input.clone()))
                .collect(),
            usage: Usage::default(),
        }
    }

    fn manager<L: LlmClient + 'static, T: ToolExecutor + 'static>(
        llm: L,
        tools: T,
        max_cycles: u32,
    ) -> ConversationManager<Arc<InMemoryStore>, L, T> {
        ConversationManager::new(
            Arc::new(InMemoryStore::new()),
            AgentLoop::new(llm, tools, loop_config(max_cycles)),
        )
    }

    #[tokio::test]
    async fn test_mock_llm_client() {
        let client = MockLlmClient::new("test-model");
        client.queue_response(LlmResponse::text("Hello!"));

        let request = LlmRequest {
            system: None,
            messages: vec![LlmMessage::user("Hi")],
            tools: vec![],
            max_tokens: None,
        };

        let response = client.complete(&request).await.unwrap();
        assert_eq!(response.content, vec![ContentBlock::text("Hello!")]);
        assert_eq!(client.recorded_requests().len(), 1);

        // Queue exhausted
        assert!(client.complete(&request).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_tool_executor() {
        let executor =
            MockToolExecutor::new().with_tool("echo", ToolOutput::success("echoed"));

        let output = executor.execute("echo", json!({"x": 1})).await.unwrap();
        assert!(output.success);
        assert_eq!(output.output, "echoed");
        assert!(executor.execute("missing", json!({})).await.is_none());
        assert_eq!(executor.recorded_executions().len(), 2);
    }

    #[tokio::test]
    async fn test_text_response_ends_turn() {
        let llm = Arc::new(MockLlmClient::new("test-model"));
        llm.queue_response(LlmResponse::text("Where would you like to go?"));
        let tools = Arc::new(MockToolExecutor::new());
        let manager = manager(llm.clone(), tools.clone(), 8);

        let reply = manager.handle_turn("Plan a trip", None).await.unwrap();
        assert_eq!(reply.response, "Where would you like to go?");
        assert_eq!(llm.recorded_requests().len(), 1);
        assert!(tools.recorded_executions().is_empty());

        let state = manager
            .conversation(&reply.conversation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[0], LlmMessage::user("Plan a trip"));
        assert_eq!(state.messages[1].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn test_tool_cycle_feeds_results_back() {
        let llm = Arc::new(MockLlmClient::new("test-model"));
        llm.queue_response(tool_call_response(&[("call_1", "lookup", json!({"q": 1}))]));
        llm.queue_response(LlmResponse::text("Done"));
        let tools = Arc::new(MockToolExecutor::new().with_tool("lookup", ToolOutput::success("found")));
        let manager = manager(llm.clone(), tools.clone(), 8);

        let reply = manager.handle_turn("go", None).await.unwrap();
        assert_eq!(reply.response, "Done");
        assert_eq!(tools.recorded_executions(), vec![("lookup".to_string(), json!({"q": 1}))]);

        let requests = llm.recorded_requests();
        assert_eq!(requests.len(), 2);
        let last = requests[1].messages.last().unwrap();
        assert_eq!(last.role, MessageRole::Tool);
        assert_eq!(
            last.content,
            vec![ContentBlock::tool_result("call_1", "found", false)]
        );
    }

    #[tokio::test]
    async fn test_tools_run_in_requested_order() {
        let llm = Arc::new(MockLlmClient::new("test-model"));
        llm.queue_response(tool_call_response(&[
            ("a", "first", json!({})),
            ("b", "second", json!({})),
        ]));
        llm.queue_response(LlmResponse::text("ok"));
        let tools = Arc::new(
            MockToolExecutor::new()
                .with_tool("first", ToolOutput::success("1"))
                .with_tool("second", ToolOutput::success("2")),
        );
        let manager = manager(llm.clone(), tools.clone(), 8);

        manager.handle_turn("go", None).await.unwrap();
        let names: Vec<String> = tools
            .recorded_executions()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["first", "second"]);

        let requests = llm.recorded_requests();
        let results = &requests[1].messages.last().unwrap().content;
        assert_eq!(
            results,
            &vec![
                ContentBlock::tool_result("a", "1", false),
                ContentBlock::tool_result("b", "2", false),
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_tool_yields_error_result() {
        let llm = Arc::new(MockLlmClient::new("test-model"));
        llm.queue_response(tool_call_response(&[("call_x", "teleport", json!({}))]));
        llm.queue_response(LlmResponse::text("Sorry about that"));
        let manager = manager(llm.clone(), MockToolExecutor::new(), 8);

        let reply = manager.handle_turn("go", None).await.unwrap();
        assert_eq!(reply.response, "Sorry about that");

        let requests = llm.recorded_requests();
        let results = &requests[1].messages.last().unwrap().content;
        assert_eq!(
            results,
            &vec![ContentBlock::tool_result("call_x", "Unknown tool: teleport", true)]
        );
    }

    #[tokio::test]
    async fn test_cycle_limit_fails_turn() {
        let llm = Arc::new(MockLlmClient::new("test-model"));
        for i in 0..5 {
            let id = format!("c{i}");
            llm.queue_response(tool_call_response(&[(id.as_str(), "loop", json!({}))]));
        }
        let tools = MockToolExecutor::new().with_tool("loop", ToolOutput::success("again"));
        let manager = manager(llm.clone(), tools, 2);

        let err = manager.handle_turn("go", None).await.unwrap_err();
        assert!(matches!(err, TurnError::CycleLimitExceeded { limit: 2 }));
        // Cycles 1 and 2 act, the third decision is rejected
        assert_eq!(llm.recorded_requests().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_turn_leaves_store_unchanged() {
        let llm = Arc::new(MockLlmClient::new("test-model"));
        llm.queue_response(LlmResponse::text("Hi there"));
        llm.queue_error(LlmError::server_error("boom"));
        let manager = manager(llm, MockToolExecutor::new(), 8);

        let first = manager.handle_turn("hello", None).await.unwrap();
        let before = manager.conversation(&first.conversation_id).await.unwrap();

        let err = manager
            .handle_turn("again", Some(first.conversation_id.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, TurnError::Upstream(_)));

        let after = manager.conversation(&first.conversation_id).await.unwrap();
        assert_eq!(before, after);
        assert_eq!(after.unwrap().messages.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_first_turn_releases_new_id() {
        let llm = Arc::new(MockLlmClient::new("test-model"));
        llm.queue_error(LlmError::server_error("boom"));
        llm.queue_response(LlmResponse::text("hi"));
        let manager = manager(llm, MockToolExecutor::new(), 8);

        assert!(manager.handle_turn("hello", None).await.is_err());
        assert!(manager.turn_locks.lock().await.is_empty());

        let reply = manager.handle_turn("hello", None).await.unwrap();
        let locks = manager.turn_locks.lock().await;
        assert_eq!(locks.len(), 1);
        assert!(locks.contains_key(&reply.conversation_id));
    }

    #[tokio::test]
    async fn test_decision_timeout() {
        let llm = DelayedMockLlmClient::new("slow", Duration::from_secs(5));
        llm.queue_response(LlmResponse::text("too late"));
        let agent = AgentLoop::new(
            llm,
            MockToolExecutor::new(),
            LoopConfig {
                max_cycles: 8,
                decision_timeout: Duration::from_millis(20),
                known_cities: vec![],
            },
        );
        let manager = ConversationManager::new(InMemoryStore::new(), agent);

        let err = manager.handle_turn("hello", None).await.unwrap_err();
        assert!(matches!(err, TurnError::DecisionTimeout(_)));
    }

    #[tokio::test]
    async fn test_new_ids_are_four_digits_and_distinct() {
        let llm = Arc::new(MockLlmClient::new("test-model"));
        for _ in 0..20 {
            llm.queue_response(LlmResponse::text("hi"));
        }
        let manager = manager(llm, MockToolExecutor::new(), 8);

        let mut seen = std::collections::HashSet::new();
        for _ in 0..20 {
            let reply = manager.handle_turn("hi", None).await.unwrap();
            let n: u32 = reply.conversation_id.parse().unwrap();
            assert!((1000..=9999).contains(&n));
            assert!(seen.insert(reply.conversation_id));
        }
    }

    #[tokio::test]
    async fn test_blank_id_starts_new_conversation() {
        let llm = Arc::new(MockLlmClient::new("test-model"));
        llm.queue_response(LlmResponse::text("hi"));
        let manager = manager(llm, MockToolExecutor::new(), 8);

        let reply = manager.handle_turn("hi", Some("  ".to_string())).await.unwrap();
        assert_eq!(reply.conversation_id.len(), 4);
    }

    #[tokio::test]
    async fn test_caller_supplied_id_is_used() {
        let llm = Arc::new(MockLlmClient::new("test-model"));
        llm.queue_response(LlmResponse::text("hi"));
        let manager = manager(llm, MockToolExecutor::new(), 8);

        let reply = manager
            .handle_turn("hi", Some("trip-42".to_string()))
            .await
            .unwrap();
        assert_eq!(reply.conversation_id, "trip-42");
        assert!(manager.conversation("trip-42").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_slots_only_grow_across_turns() {
        let llm = Arc::new(MockLlmClient::new("test-model"));
        llm.queue_response(tool_call_response(&[("g1", "gather", json!({}))]));
        llm.queue_response(LlmResponse::text("How many people?"));
        llm.queue_response(tool_call_response(&[("g2", "gather", json!({}))]));
        llm.queue_response(LlmResponse::text("Budget?"));

        let tools = Arc::new(
            MockToolExecutor::new()
                .with_tool("gather", ToolOutput::success("{}"))
                .with_patch(
                    "gather",
                    SlotPatch {
                        days: Some(3),
                        ..SlotPatch::default()
                    },
                ),
        );
        let manager = manager(llm.clone(), tools, 8);

        let first = manager.handle_turn("3 days", None).await.unwrap();
        let id = first.conversation_id;
        let state = manager.conversation(&id).await.unwrap().unwrap();
        assert_eq!(state.slots.days, Some(3));

        manager.handle_turn("2 people", Some(id.clone())).await.unwrap();
        let state = manager.conversation(&id).await.unwrap().unwrap();
        assert_eq!(state.slots.days, Some(3));
        assert_eq!(state.messages.len(), 8);

        // Collected details reach the decision step through the system prompt
        let last_request = llm.recorded_requests().pop().unwrap();
        assert!(last_request.system.unwrap().contains("- days: 3"));
    }

    #[tokio::test]
    async fn test_same_conversation_turns_are_serialized() {
        let llm = Arc::new(DelayedMockLlmClient::new("slow", Duration::from_millis(50)));
        llm.queue_response(LlmResponse::text("first"));
        llm.queue_response(LlmResponse::text("second"));
        let manager = Arc::new(manager(llm.clone(), MockToolExecutor::new(), 8));

        let a = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.handle_turn("one", Some("1234".into())).await })
        };
        let b = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.handle_turn("two", Some("1234".into())).await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let state = manager.conversation("1234").await.unwrap().unwrap();
        assert_eq!(state.messages.len(), 4);

        // The second turn saw the complete first turn
        let requests = llm.recorded_requests();
        assert_eq!(requests[0].messages.len(), 1);
        assert_eq!(requests[1].messages.len(), 3);
    }

    #[tokio::test]
    async fn test_gather_then_itinerary_with_real_tools() {
        let kb = Arc::new(KnowledgeBase::builtin());
        let tools = ToolRegistryExecutor::new(ToolRegistry::standard(kb));
        let llm = Arc::new(MockLlmClient::new("test-model"));

        // Turn 1: partial details
        llm.queue_response(tool_call_response(&[(
            "g1",
            GATHER_TOOL_NAME,
            json!({"cities": ["Ranchi"], "days": 2}),
        )]));
        llm.queue_response(LlmResponse::text("How many people, and what budget?"));

        // Turn 2: the rest, then the itinerary
        llm.queue_response(tool_call_response(&[(
            "g2",
            GATHER_TOOL_NAME,
            json!({"cities": ["Ranchi"], "days": 2, "people": 2, "budget": 20000}),
        )]));
        llm.queue_response(tool_call_response(&[(
            "i1",
            ITINERARY_TOOL_NAME,
            json!({"cities": ["Ranchi"], "days": 2, "people": 2, "budget": 20000}),
        )]));
        llm.queue_response(LlmResponse::text("Here is your plan"));

        let manager = manager(llm.clone(), tools, 8);

        let first = manager
            .handle_turn("Ranchi for 2 days", None)
            .await
            .unwrap();
        let requests = llm.recorded_requests();
        let gather_result = &requests[1].messages.last().unwrap().content;
        match &gather_result[0] {
            ContentBlock::ToolResult { content, is_error, .. } => {
                assert!(!is_error);
                assert!(content.contains("missing_info"));
                assert!(content.contains("how many people are traveling, your approximate budget"));
            }
            other => panic!("expected tool result, got {other:?}"),
        }

        let id = first.conversation_id;
        let reply = manager
            .handle_turn("2 people, 20000 rupees", Some(id.clone()))
            .await
            .unwrap();
        assert_eq!(reply.response, "Here is your plan");

        let requests = llm.recorded_requests();
        let itinerary_request = &requests[4];
        match &itinerary_request.messages.last().unwrap().content[0] {
            ContentBlock::ToolResult { content, is_error, .. } => {
                assert!(!is_error);
                assert!(content.contains("Day 1: Exploring Ranchi"));
                assert!(content.contains("Day 2: Exploring Ranchi"));
                assert!(content.contains("Travelers: 2 | Budget: ₹20,000"));
            }
            other => panic!("expected tool result, got {other:?}"),
        }

        let state = manager.conversation(&id).await.unwrap().unwrap();
        assert_eq!(
            state.slots,
            TripSlots {
                cities: Some(vec!["Ranchi".to_string()]),
                days: Some(2),
                people: Some(2),
                budget: Some(20000),
                transport: None,
            }
        );
    }
}
