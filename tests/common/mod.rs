//! Shared test helpers: a scripted agent service and a recording reply sink.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use agent_bridge::agents::*;
use agent_bridge::error::{BridgeError, ServiceError};
use agent_bridge::relay::{PollPolicy, ReplySink};

/// An in-memory agent service driven by a script of run statuses.
#[derive(Default)]
pub struct ScriptedAgentService {
    pub create_thread_calls: AtomicUsize,
    pub get_agent_calls: AtomicUsize,
    pub create_run_calls: AtomicUsize,
    pub get_run_calls: AtomicUsize,
    pub list_messages_calls: AtomicUsize,
    fail_create_thread: bool,
    fail_create_message: bool,
    statuses: Mutex<VecDeque<RunStatus>>,
    last_error: Option<ServiceError>,
    latest: Mutex<Vec<ThreadMessage>>,
    submitted: Mutex<Vec<(String, String)>>,
    thread_delay: Option<Duration>,
}

impl ScriptedAgentService {
    /// Runs complete immediately and the agent answers `reply`.
    pub fn replying(reply: &str) -> Self {
        Self::default()
            .with_statuses(&[RunStatus::Completed])
            .with_latest(vec![assistant_message(reply)])
    }

    /// `create_run` returns the first status, each `get_run` the next one.
    /// The last status repeats once the script runs out.
    pub fn with_statuses(self, statuses: &[RunStatus]) -> Self {
        *self.statuses.lock().unwrap() = statuses.iter().copied().collect();
        self
    }

    pub fn with_latest(self, messages: Vec<ThreadMessage>) -> Self {
        *self.latest.lock().unwrap() = messages;
        self
    }

    pub fn with_last_error(mut self, code: &str, message: &str) -> Self {
        self.last_error = Some(ServiceError {
            code: Some(code.to_string()),
            message: message.to_string(),
        });
        self
    }

    pub fn failing_create_thread(mut self) -> Self {
        self.fail_create_thread = true;
        self
    }

    pub fn failing_create_message(mut self) -> Self {
        self.fail_create_message = true;
        self
    }

    /// Make thread creation take a while, to widen race windows.
    pub fn with_thread_delay(mut self, delay: Duration) -> Self {
        self.thread_delay = Some(delay);
        self
    }

    /// `(thread_id, text)` of every user message submitted.
    pub fn submitted(&self) -> Vec<(String, String)> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn next_status(&self) -> RunStatus {
        let mut statuses = self.statuses.lock().unwrap();
        if statuses.len() > 1 {
            statuses.pop_front().unwrap()
        } else {
            statuses.front().copied().unwrap_or(RunStatus::Completed)
        }
    }

    fn run(&self, thread_id: &str, status: RunStatus) -> Run {
        Run {
            id: "run-1".to_string(),
            thread_id: thread_id.to_string(),
            assistant_id: Some("asst-1".to_string()),
            status,
            last_error: if status == RunStatus::Failed {
                self.last_error.clone()
            } else {
                None
            },
        }
    }
}

#[async_trait]
impl AgentService for ScriptedAgentService {
    async fn create_thread(&self) -> Result<Thread, BridgeError> {
        let n = self.create_thread_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.thread_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_create_thread {
            return Err(BridgeError::api(503, "service unavailable"));
        }
        Ok(Thread {
            id: format!("t-{n}"),
            created_at: None,
        })
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        text: &str,
    ) -> Result<ThreadMessage, BridgeError> {
        if self.fail_create_message {
            return Err(BridgeError::Timeout(60_000));
        }
        self.submitted
            .lock()
            .unwrap()
            .push((thread_id.to_string(), text.to_string()));
        Ok(ThreadMessage {
            id: "msg-user".to_string(),
            thread_id: Some(thread_id.to_string()),
            role,
            content: vec![text_block(text)],
        })
    }

    async fn get_agent(&self, agent_id: &str) -> Result<Agent, BridgeError> {
        self.get_agent_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Agent {
            id: agent_id.to_string(),
            name: Some("helper".to_string()),
            model: None,
        })
    }

    async fn create_run(&self, thread_id: &str, _agent_id: &str) -> Result<Run, BridgeError> {
        self.create_run_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.run(thread_id, self.next_status()))
    }

    async fn get_run(&self, thread_id: &str, _run_id: &str) -> Result<Run, BridgeError> {
        self.get_run_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.run(thread_id, self.next_status()))
    }

    async fn list_messages(
        &self,
        _thread_id: &str,
        query: ListMessagesQuery,
    ) -> Result<Vec<ThreadMessage>, BridgeError> {
        self.list_messages_calls.fetch_add(1, Ordering::SeqCst);
        let latest = self.latest.lock().unwrap();
        Ok(latest.iter().take(query.limit as usize).cloned().collect())
    }
}

pub fn text_block(text: &str) -> MessageContent {
    MessageContent::Text {
        text: TextContent {
            value: text.to_string(),
            annotations: vec![],
        },
    }
}

pub fn assistant_message(text: &str) -> ThreadMessage {
    ThreadMessage {
        id: "msg-assistant".to_string(),
        thread_id: None,
        role: MessageRole::Assistant,
        content: vec![text_block(text)],
    }
}

pub fn user_message(text: &str) -> ThreadMessage {
    ThreadMessage {
        id: "msg-user".to_string(),
        thread_id: None,
        role: MessageRole::User,
        content: vec![text_block(text)],
    }
}

/// Poll policy matching the default cadence with a short timeout.
pub fn one_second_policy() -> PollPolicy {
    PollPolicy::builder().timeout(Duration::from_secs(30)).build()
}

/// Collects every reply it is asked to send.
#[derive(Default)]
pub struct RecordingSink {
    replies: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            replies: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn replies(&self) -> Vec<String> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplySink for RecordingSink {
    async fn send_reply(&self, text: &str) -> Result<(), BridgeError> {
        self.replies.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(BridgeError::api(502, "channel unavailable"));
        }
        Ok(())
    }
}

/// One tracing event seen by [`capture_events`].
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub fields: HashMap<String, String>,
}

/// Events recorded while the guard from [`capture_events`] is alive.
#[derive(Clone, Default)]
pub struct CapturedEvents(Arc<Mutex<Vec<CapturedEvent>>>);

impl CapturedEvents {
    pub fn at_level(&self, level: Level) -> Vec<CapturedEvent> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.level == level)
            .cloned()
            .collect()
    }
}

struct CaptureLayer {
    events: CapturedEvents,
}

#[derive(Default)]
struct FieldRecorder(HashMap<String, String>);

impl Visit for FieldRecorder {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut recorder = FieldRecorder::default();
        event.record(&mut recorder);
        self.events.0.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            fields: recorder.0,
        });
    }
}

/// Record tracing events on the current thread until the guard drops.
///
/// Use with a current-thread runtime so every task logs on this thread.
pub fn capture_events() -> (CapturedEvents, tracing::subscriber::DefaultGuard) {
    let events = CapturedEvents::default();
    let subscriber = tracing_subscriber::registry().with(CaptureLayer {
        events: events.clone(),
    });
    let guard = tracing::subscriber::set_default(subscriber);
    (events, guard)
}
