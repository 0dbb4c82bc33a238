//! Conversation controller: owns the transcript and drives the
//! question/answer cycle against a [`RagTransport`].
//!
//! State lives behind a `Mutex` that is only held for short synchronous
//! sections. The backend round-trip in [`ConversationController::submit`] is
//! the single await point and never runs with the lock held.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use ragchat_client::RagTransport;
use ragchat_core::config::ChatConfig;
use ragchat_core::types::{
    is_known_model, HealthResponse, Message, ModelsResponse, Parameters, DEFAULT_MODEL,
    DEFAULT_TEMPERATURE, MAX_TEMPERATURE, MIN_TEMPERATURE,
};

use crate::error::ChatError;

/// Appended when an in-flight submission is dropped before it resolves.
const CANCELLED_MESSAGE: &str = "Sorry, the request was cancelled before the backend answered.";

/// Why a submission was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The question was empty or whitespace only.
    EmptyInput,
    /// Another question is still waiting for the backend.
    RequestInFlight,
}

/// Result of [`ConversationController::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Nothing happened: no message appended, no request sent.
    Skipped(SkipReason),
    /// The backend answered; carries the appended assistant message.
    Answered(Message),
    /// The request failed; carries the appended assistant error message.
    Failed(Message),
}

impl SubmitOutcome {
    /// The assistant message appended by this submission, if any.
    pub fn message(&self) -> Option<&Message> {
        match self {
            SubmitOutcome::Skipped(_) => None,
            SubmitOutcome::Answered(m) | SubmitOutcome::Failed(m) => Some(m),
        }
    }
}

#[derive(Debug)]
struct ConversationState {
    transcript: Vec<Message>,
    parameters: Parameters,
    draft: String,
    is_loading: bool,
    /// Bumped whenever the transcript is reset; replies to questions asked
    /// before the reset are discarded.
    generation: u64,
}

/// Single-session chat controller.
pub struct ConversationController {
    transport: Arc<dyn RagTransport>,
    welcome_message: String,
    state: Mutex<ConversationState>,
}

impl ConversationController {
    /// Create a controller that sends questions through `transport`, starting
    /// from the parameters in `config`.
    ///
    /// Invalid configured values fall back to defaults; the transcript starts
    /// with the welcome message.
    pub fn new(transport: Arc<dyn RagTransport>, config: &ChatConfig) -> Self {
        let model = if config.model.trim().is_empty() {
            tracing::warn!("Configured model is empty, using {}", DEFAULT_MODEL);
            DEFAULT_MODEL.to_string()
        } else {
            config.model.trim().to_string()
        };
        let temperature = clamp_temperature(config.temperature).unwrap_or_else(|_| {
            tracing::warn!(
                temperature = config.temperature,
                "Configured temperature is not a number, using {}",
                DEFAULT_TEMPERATURE
            );
            DEFAULT_TEMPERATURE
        });

        let controller = Self {
            transport,
            welcome_message: config.welcome_message.clone(),
            state: Mutex::new(ConversationState {
                transcript: Vec::new(),
                parameters: Parameters {
                    model,
                    temperature,
                    context: config.context.clone(),
                },
                draft: String::new(),
                is_loading: false,
                generation: 0,
            }),
        };
        controller.initialize();
        controller
    }

    /// Reset the transcript to just the welcome message.
    ///
    /// A question still in flight is abandoned: its reply will not be
    /// appended.
    pub fn initialize(&self) {
        let mut state = self.state();
        state.generation += 1;
        state.transcript.clear();
        state
            .transcript
            .push(Message::assistant(self.welcome_message.clone()));
    }

    /// Drop every message and start over with the welcome message.
    ///
    /// Parameters are kept. No backend call is made.
    pub fn clear_conversation(&self) {
        let cleared = self.state().transcript.len();
        self.initialize();
        tracing::info!(cleared, "Conversation cleared");
    }

    /// Empty the context string; model and temperature are untouched.
    pub fn clear_context(&self) {
        self.state().parameters.context.clear();
        tracing::debug!("Context cleared");
    }

    /// Ask the backend `question`.
    ///
    /// Skipped without side effects when the trimmed question is empty or
    /// a request is already in flight. Otherwise appends the user turn,
    /// clears the draft, awaits the backend and appends exactly one
    /// assistant turn, either the answer or a readable error.
    pub async fn submit(&self, question: &str) -> SubmitOutcome {
        let trimmed = question.trim();

        let (request, in_flight) = {
            let mut state = self.state();
            if trimmed.is_empty() {
                tracing::debug!("Ignoring empty question");
                return SubmitOutcome::Skipped(SkipReason::EmptyInput);
            }
            if state.is_loading {
                tracing::debug!("Ignoring question while another is in flight");
                return SubmitOutcome::Skipped(SkipReason::RequestInFlight);
            }

            let user_turn = Message::user(
                question,
                &state.parameters.model,
                state.parameters.temperature,
            );
            state.transcript.push(user_turn);
            state.draft.clear();
            state.is_loading = true;

            (
                state.parameters.to_request(trimmed),
                InFlight::new(&self.state, state.generation),
            )
        };

        let started = Instant::now();
        let result = self.transport.query(&request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let outcome = match result {
            Ok(response) => {
                tracing::info!(
                    elapsed_ms,
                    selected_model = %response.selected_model,
                    sources = response.sources.len(),
                    "Question answered"
                );
                SubmitOutcome::Answered(
                    Message::from_response(response).with_processing_time(elapsed_ms),
                )
            }
            Err(e) => {
                tracing::warn!(elapsed_ms, error = %e, "Question failed");
                let content = format!(
                    "Sorry, I encountered an error: {}. Please make sure the backend server is running on {}",
                    e,
                    self.transport.base_url()
                );
                SubmitOutcome::Failed(
                    Message::assistant(content).with_processing_time(elapsed_ms),
                )
            }
        };

        if let Some(reply) = outcome.message() {
            in_flight.complete(reply.clone());
        }
        outcome
    }

    /// Submit whatever is currently in the draft buffer.
    pub async fn submit_draft(&self) -> SubmitOutcome {
        let draft = self.draft();
        self.submit(&draft).await
    }

    // -- Accessors --

    /// Snapshot of the transcript, oldest first.
    pub fn transcript(&self) -> Vec<Message> {
        self.state().transcript.clone()
    }

    pub fn transcript_len(&self) -> usize {
        self.state().transcript.len()
    }

    /// Parameters that the next question will be sent with.
    pub fn parameters(&self) -> Parameters {
        self.state().parameters.clone()
    }

    /// Whether a question is waiting for the backend.
    pub fn is_loading(&self) -> bool {
        self.state().is_loading
    }

    /// The host's unsent input text.
    pub fn draft(&self) -> String {
        self.state().draft.clone()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        self.state().draft = text.into();
    }

    /// Replace all parameters at once, applying the same checks as the
    /// individual setters.
    pub fn set_parameters(&self, parameters: Parameters) -> Result<(), ChatError> {
        let model = validate_model(&parameters.model)?;
        let temperature = clamp_temperature(parameters.temperature)?;
        self.state().parameters = Parameters {
            model,
            temperature,
            context: parameters.context,
        };
        Ok(())
    }

    /// Select the model for subsequent questions.
    ///
    /// Names outside the known set are accepted and logged.
    pub fn set_model(&self, model: &str) -> Result<(), ChatError> {
        let model = validate_model(model)?;
        self.state().parameters.model = model;
        Ok(())
    }

    /// Set the temperature for subsequent questions, clamped into
    /// `[MIN_TEMPERATURE, MAX_TEMPERATURE]`. Returns the stored value.
    pub fn set_temperature(&self, temperature: f64) -> Result<f64, ChatError> {
        let temperature = clamp_temperature(temperature)?;
        self.state().parameters.temperature = temperature;
        Ok(temperature)
    }

    pub fn set_context(&self, context: impl Into<String>) {
        self.state().parameters.context = context.into();
    }

    // -- Backend discovery --

    /// Models the backend advertises. Does not touch the transcript.
    pub async fn available_models(&self) -> Result<ModelsResponse, ChatError> {
        Ok(self.transport.list_models().await?)
    }

    /// Backend health status. Does not touch the transcript.
    pub async fn backend_health(&self) -> Result<HealthResponse, ChatError> {
        Ok(self.transport.health().await?)
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    // -- Private helpers --

    fn state(&self) -> MutexGuard<'_, ConversationState> {
        lock_state(&self.state)
    }
}

/// Lock the conversation state, recovering it if a holder panicked.
///
/// Every critical section leaves the state consistent, so a poisoned lock
/// still guards valid data.
fn lock_state(state: &Mutex<ConversationState>) -> MutexGuard<'_, ConversationState> {
    state.lock().unwrap_or_else(|poisoned| {
        tracing::error!("Conversation state lock poisoned; recovering");
        poisoned.into_inner()
    })
}

/// Marks a submission as in flight until it completes.
///
/// Dropping it without calling [`InFlight::complete`] (the submit future was
/// dropped mid-request) still appends an assistant turn and clears the
/// loading flag.
///
/// The reply is discarded if the transcript was reset after the question
/// was asked, since its user turn is gone.
struct InFlight<'a> {
    state: &'a Mutex<ConversationState>,
    generation: u64,
    done: bool,
}

impl<'a> InFlight<'a> {
    fn new(state: &'a Mutex<ConversationState>, generation: u64) -> Self {
        Self {
            state,
            generation,
            done: false,
        }
    }

    fn complete(mut self, reply: Message) {
        self.finish(reply);
        self.done = true;
    }

    fn finish(&self, reply: Message) {
        let mut state = lock_state(self.state);
        if state.generation == self.generation {
            state.transcript.push(reply);
        } else {
            tracing::debug!("Conversation was cleared, discarding late reply");
        }
        state.is_loading = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        tracing::warn!("Question dropped before the backend answered");
        self.finish(Message::assistant(CANCELLED_MESSAGE));
    }
}

fn clamp_temperature(temperature: f64) -> Result<f64, ChatError> {
    if !temperature.is_finite() {
        return Err(ChatError::InvalidTemperature(temperature));
    }
    Ok(temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE))
}

fn validate_model(model: &str) -> Result<String, ChatError> {
    let model = model.trim();
    if model.is_empty() {
        return Err(ChatError::InvalidModel);
    }
    if !is_known_model(model) {
        tracing::warn!(model = %model, "Unknown model, sending it to the backend anyway");
    }
    Ok(model.to_string())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use ragchat_client::TransportError;
    use ragchat_core::config::DEFAULT_WELCOME_MESSAGE;
    use ragchat_core::types::{QueryRequest, QueryResponse, Source};
    use tokio::sync::Notify;

    /// Transport that replays queued results and records every request.
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<QueryResponse, TransportError>>>,
        requests: Mutex<Vec<QueryRequest>>,
        calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<Result<QueryResponse, TransportError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                gate: None,
            }
        }

        /// Hold every query until `gate` is notified.
        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn requests(&self) -> Vec<QueryRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RagTransport for ScriptedTransport {
        fn base_url(&self) -> &str {
            "http://localhost:8000"
        }

        async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::network("no scripted reply")))
        }

        async fn list_models(&self) -> Result<ModelsResponse, TransportError> {
            Ok(ModelsResponse {
                models: vec!["gpt-4o-mini".to_string(), "grok-3".to_string()],
                default: "gpt-4o-mini".to_string(),
            })
        }

        async fn health(&self) -> Result<HealthResponse, TransportError> {
            Err(TransportError::network("connection refused"))
        }
    }

    fn doc_a_response() -> QueryResponse {
        QueryResponse {
            answer: "RAG combines retrieval and generation.".to_string(),
            selected_model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            context: String::new(),
            sources: vec![Source {
                title: "Doc A".to_string(),
                content: "...".to_string(),
                score: 0.92,
            }],
        }
    }

    fn controller_with(transport: Arc<ScriptedTransport>) -> ConversationController {
        ConversationController::new(transport, &ChatConfig::default())
    }

    // ---- Construction / initialize ----

    #[test]
    fn test_new_starts_with_welcome_message() {
        let controller = controller_with(Arc::new(ScriptedTransport::new(vec![])));
        let transcript = controller.transcript();
        assert_eq!(transcript.len(), 1);
        assert!(!transcript[0].is_user);
        assert_eq!(transcript[0].content, DEFAULT_WELCOME_MESSAGE);
        assert!(!controller.is_loading());
    }

    #[test]
    fn test_new_uses_config_parameters() {
        let config = ChatConfig {
            model: "grok-3".to_string(),
            temperature: 1.4,
            context: String::new(),
            welcome_message: "Hi there".to_string(),
        };
        let controller =
            ConversationController::new(Arc::new(ScriptedTransport::new(vec![])), &config);
        let params = controller.parameters();
        assert_eq!(params.model, "grok-3");
        assert!((params.temperature - 1.4).abs() < f64::EPSILON);
        assert!(params.context.is_empty());
        assert_eq!(controller.transcript()[0].content, "Hi there");
    }

    #[test]
    fn test_new_repairs_invalid_config() {
        let config = ChatConfig {
            model: "  ".to_string(),
            temperature: f64::NAN,
            ..ChatConfig::default()
        };
        let controller =
            ConversationController::new(Arc::new(ScriptedTransport::new(vec![])), &config);
        assert_eq!(controller.parameters().model, DEFAULT_MODEL);
        assert!((controller.parameters().temperature - DEFAULT_TEMPERATURE).abs() < f64::EPSILON);

        let config = ChatConfig {
            temperature: 5.0,
            ..ChatConfig::default()
        };
        let controller =
            ConversationController::new(Arc::new(ScriptedTransport::new(vec![])), &config);
        assert!((controller.parameters().temperature - MAX_TEMPERATURE).abs() < f64::EPSILON);
    }

    // ---- Skipped submissions ----

    #[tokio::test]
    async fn test_blank_questions_are_ignored() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let controller = controller_with(Arc::clone(&transport));
        controller.set_draft("   ");

        for blank in ["", " ", "\t\n", "   \r\n  "] {
            let outcome = controller.submit(blank).await;
            assert_eq!(outcome, SubmitOutcome::Skipped(SkipReason::EmptyInput));
        }

        assert_eq!(controller.transcript_len(), 1);
        assert_eq!(transport.calls(), 0);
        assert!(!controller.is_loading());
        // Skipped submissions leave the draft alone.
        assert_eq!(controller.draft(), "   ");
    }

    #[tokio::test]
    async fn test_second_submit_while_loading_is_noop() {
        let gate = Arc::new(Notify::new());
        let transport = Arc::new(
            ScriptedTransport::new(vec![Ok(doc_a_response())]).gated(Arc::clone(&gate)),
        );
        let controller = controller_with(Arc::clone(&transport));

        let (first, second, loading_seen) = tokio::join!(
            controller.submit("What is RAG?"),
            controller.submit("And what is a vector store?"),
            async {
                let loading = controller.is_loading();
                gate.notify_one();
                loading
            }
        );

        assert!(loading_seen);
        assert!(matches!(first, SubmitOutcome::Answered(_)));
        assert_eq!(second, SubmitOutcome::Skipped(SkipReason::RequestInFlight));
        assert_eq!(transport.calls(), 1);
        assert_eq!(controller.transcript_len(), 3);
        assert!(!controller.is_loading());
    }

    // ---- Successful submissions ----

    #[tokio::test]
    async fn test_successful_submit_appends_two_messages() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(doc_a_response())]));
        let controller = controller_with(Arc::clone(&transport));
        controller.set_draft("What is RAG?");

        let outcome = controller.submit("What is RAG?").await;

        let transcript = controller.transcript();
        assert_eq!(transcript.len(), 3);
        assert!(!controller.is_loading());
        assert!(controller.draft().is_empty());

        let user = &transcript[1];
        assert!(user.is_user);
        assert_eq!(user.content, "What is RAG?");

        let reply = &transcript[2];
        assert!(!reply.is_user);
        assert_eq!(reply.content, "RAG combines retrieval and generation.");
        assert_eq!(reply.sources, Some(doc_a_response().sources));
        assert_eq!(reply.model.as_deref(), Some("gpt-4o-mini"));
        assert!(reply.processing_time_ms.is_some());
        assert_eq!(outcome, SubmitOutcome::Answered(reply.clone()));
    }

    #[tokio::test]
    async fn test_request_omits_empty_context_and_trims_question() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(doc_a_response())]));
        let controller = controller_with(Arc::clone(&transport));
        controller
            .set_parameters(Parameters {
                model: "gpt-4o-mini".to_string(),
                temperature: 0.7,
                context: String::new(),
            })
            .unwrap();

        controller.submit("  What is RAG?  ").await;

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].user_question, "What is RAG?");
        assert!(requests[0].context.is_none());
        let body = serde_json::to_value(&requests[0]).unwrap();
        assert!(body.get("context").is_none());

        // The transcript keeps the text as typed.
        assert_eq!(controller.transcript()[1].content, "  What is RAG?  ");
    }

    #[tokio::test]
    async fn test_request_uses_current_parameters() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(doc_a_response()),
            Ok(doc_a_response()),
        ]));
        let controller = controller_with(Arc::clone(&transport));

        controller.submit("first").await;
        controller.set_model("gpt-4o").unwrap();
        controller.set_temperature(1.1).unwrap();
        controller.set_context("Answer in Spanish.");
        controller.submit("second").await;

        let requests = transport.requests();
        assert_eq!(requests[0].model, "gpt-4o-mini");
        assert_eq!(requests[1].model, "gpt-4o");
        assert!((requests[1].temperature - 1.1).abs() < f64::EPSILON);
        assert_eq!(requests[1].context.as_deref(), Some("Answer in Spanish."));

        // Earlier user turns keep the parameters they were sent with.
        let transcript = controller.transcript();
        assert_eq!(transcript[1].model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(transcript[1].temperature, Some(0.7));
        assert_eq!(transcript[3].model.as_deref(), Some("gpt-4o"));
        assert_eq!(transcript[3].temperature, Some(1.1));
    }

    #[tokio::test]
    async fn test_submit_draft() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(doc_a_response())]));
        let controller = controller_with(Arc::clone(&transport));
        controller.set_draft("from the draft");

        let outcome = controller.submit_draft().await;

        assert!(matches!(outcome, SubmitOutcome::Answered(_)));
        assert_eq!(transport.requests()[0].user_question, "from the draft");
        assert!(controller.draft().is_empty());
    }

    // ---- Failed submissions ----

    #[tokio::test]
    async fn test_failed_submit_appends_error_message() {
        let transport = Arc::new(ScriptedTransport::new(vec![Err(TransportError::network(
            "connection refused",
        ))]));
        let controller = controller_with(Arc::clone(&transport));

        let outcome = controller.submit("What is RAG?").await;

        let transcript = controller.transcript();
        assert_eq!(transcript.len(), 3);
        assert!(!controller.is_loading());
        let reply = &transcript[2];
        assert!(!reply.is_user);
        assert_eq!(
            reply.content,
            "Sorry, I encountered an error: Error: connection refused. Please make sure the backend server is running on http://localhost:8000"
        );
        assert!(reply.sources.is_none());
        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_session_survives_failures() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Err(TransportError::network("down")),
            Err(TransportError::network("still down")),
            Ok(doc_a_response()),
        ]));
        let controller = controller_with(Arc::clone(&transport));

        assert!(matches!(controller.submit("q1").await, SubmitOutcome::Failed(_)));
        assert!(matches!(controller.submit("q1").await, SubmitOutcome::Failed(_)));
        assert!(matches!(controller.submit("q1").await, SubmitOutcome::Answered(_)));

        let transcript = controller.transcript();
        assert_eq!(transcript.len(), 7);
        let users: Vec<bool> = transcript.iter().map(|m| m.is_user).collect();
        assert_eq!(users, vec![false, true, false, true, false, true, false]);
    }

    #[tokio::test]
    async fn test_dropped_submit_still_resolves() {
        let gate = Arc::new(Notify::new());
        let transport = Arc::new(
            ScriptedTransport::new(vec![Ok(doc_a_response())]).gated(Arc::clone(&gate)),
        );
        let controller = controller_with(Arc::clone(&transport));

        let timed_out =
            tokio::time::timeout(Duration::from_millis(20), controller.submit("slow")).await;
        assert!(timed_out.is_err());

        assert!(!controller.is_loading());
        let transcript = controller.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[2].content, CANCELLED_MESSAGE);
    }

    // ---- Clearing ----

    #[tokio::test]
    async fn test_clear_conversation_leaves_only_welcome() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(doc_a_response()),
            Ok(doc_a_response()),
        ]));
        let controller = controller_with(Arc::clone(&transport));
        controller.submit("one").await;
        controller.submit("two").await;
        assert_eq!(controller.transcript_len(), 5);

        controller.clear_conversation();

        let transcript = controller.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].content, DEFAULT_WELCOME_MESSAGE);
        assert_eq!(transport.calls(), 2);

        controller.clear_conversation();
        assert_eq!(controller.transcript_len(), 1);
    }

    #[tokio::test]
    async fn test_clear_while_loading_discards_late_reply() {
        let gate = Arc::new(Notify::new());
        let transport = Arc::new(
            ScriptedTransport::new(vec![Ok(doc_a_response()), Ok(doc_a_response())])
                .gated(Arc::clone(&gate)),
        );
        let controller = controller_with(Arc::clone(&transport));

        let (outcome, ()) = tokio::join!(controller.submit("What is RAG?"), async {
            controller.clear_conversation();
            assert_eq!(controller.transcript_len(), 1);
            gate.notify_one();
        });

        assert!(matches!(outcome, SubmitOutcome::Answered(_)));
        assert!(!controller.is_loading());
        let transcript = controller.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].content, DEFAULT_WELCOME_MESSAGE);

        // The next question pairs normally.
        let (outcome, ()) = tokio::join!(controller.submit("again"), async {
            gate.notify_one();
        });
        assert!(matches!(outcome, SubmitOutcome::Answered(_)));
        let users: Vec<bool> = controller.transcript().iter().map(|m| m.is_user).collect();
        assert_eq!(users, vec![false, true, false]);
    }

    #[test]
    fn test_clear_context_keeps_model_and_temperature() {
        let controller = controller_with(Arc::new(ScriptedTransport::new(vec![])));
        controller.set_model("DeepSeek-R1").unwrap();
        controller.set_temperature(0.3).unwrap();
        assert!(!controller.parameters().context.is_empty());

        controller.clear_context();

        let params = controller.parameters();
        assert!(params.context.is_empty());
        assert_eq!(params.model, "DeepSeek-R1");
        assert!((params.temperature - 0.3).abs() < f64::EPSILON);
    }

    // ---- Parameter setters ----

    #[test]
    fn test_set_temperature_clamps() {
        let controller = controller_with(Arc::new(ScriptedTransport::new(vec![])));
        assert_eq!(controller.set_temperature(2.5).unwrap(), 2.0);
        assert_eq!(controller.set_temperature(-1.0).unwrap(), 0.0);
        assert_eq!(controller.set_temperature(1.5).unwrap(), 1.5);
        assert!((controller.parameters().temperature - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_temperature_rejects_non_finite() {
        let controller = controller_with(Arc::new(ScriptedTransport::new(vec![])));
        assert!(matches!(
            controller.set_temperature(f64::INFINITY),
            Err(ChatError::InvalidTemperature(_))
        ));
        assert!((controller.parameters().temperature - DEFAULT_TEMPERATURE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_model_accepts_unknown_rejects_blank() {
        let controller = controller_with(Arc::new(ScriptedTransport::new(vec![])));
        controller.set_model("llama-3-70b").unwrap();
        assert_eq!(controller.parameters().model, "llama-3-70b");

        assert!(matches!(controller.set_model("  "), Err(ChatError::InvalidModel)));
        assert_eq!(controller.parameters().model, "llama-3-70b");
    }

    #[test]
    fn test_set_parameters_validates() {
        let controller = controller_with(Arc::new(ScriptedTransport::new(vec![])));
        let result = controller.set_parameters(Parameters {
            model: String::new(),
            temperature: 0.5,
            context: "x".to_string(),
        });
        assert!(result.is_err());
        assert_eq!(controller.parameters().model, DEFAULT_MODEL);

        controller
            .set_parameters(Parameters {
                model: "grok-3".to_string(),
                temperature: 9.0,
                context: "x".to_string(),
            })
            .unwrap();
        let params = controller.parameters();
        assert_eq!(params.model, "grok-3");
        assert_eq!(params.temperature, MAX_TEMPERATURE);
        assert_eq!(params.context, "x");
    }

    // ---- Backend discovery ----

    #[tokio::test]
    async fn test_discovery_does_not_touch_transcript() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let controller = controller_with(Arc::clone(&transport));

        assert_eq!(controller.base_url(), "http://localhost:8000");
        let models = controller.available_models().await.unwrap();
        assert_eq!(models.default, "gpt-4o-mini");

        let health = controller.backend_health().await;
        assert!(matches!(health, Err(ChatError::Transport(_))));

        assert_eq!(controller.transcript_len(), 1);
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_controller_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConversationController>();
    }
}
