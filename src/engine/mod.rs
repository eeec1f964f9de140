//! Assistant pipeline
//!
//! TEXT → ROUTER → (canned reply) | CLASSIFY → REFINE → DIAGNOSIS | UNRECOGNIZED
//!
//! The cost estimate is a separate path driven by structured selections.
//! [`AssistantService`] wraps the pure engine with interaction logging.

use crate::audit::{InteractionKind, InteractionRecord, InteractionRecorder};
use crate::classifier::DiagnosticClassifier;
use crate::conversational::{ConversationRouter, RouterConfig};
use crate::device::DeviceContext;
use crate::estimator;
use crate::models::{AssistantReply, CostEstimate, Diagnosis};
use crate::refiner;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

pub const UNRECOGNIZED_MESSAGE: &str = "I couldn't identify the problem from that description.
Try mentioning the symptom, for example a noise, starting trouble, brakes or mileage.
You can also book an inspection and a mechanic will take a look.";

/// Pure, synchronous pipeline over the static tables
pub struct AssistantEngine {
    router: ConversationRouter,
}

impl AssistantEngine {
    pub fn new() -> Self {
        Self {
            router: ConversationRouter::new(),
        }
    }

    pub fn with_router_config(config: RouterConfig) -> Self {
        Self {
            router: ConversationRouter::with_config(config),
        }
    }

    /// Full chat pipeline. The classifier only runs when the router passes.
    pub fn respond(&self, text: &str) -> AssistantReply {
        if let Some(reply) = self.router.route(text) {
            debug!(intent = ?reply.intent, "Conversational short-circuit");
            return AssistantReply::Conversation {
                intent: reply.intent,
                lines: reply.lines().map(str::to_string).collect(),
                reply: reply.text,
            };
        }

        match self.diagnose(text) {
            Some(diagnosis) => AssistantReply::Diagnosis(diagnosis),
            None => AssistantReply::Unrecognized {
                message: UNRECOGNIZED_MESSAGE.to_string(),
            },
        }
    }

    /// Classify and refine without the conversation router
    pub fn diagnose(&self, text: &str) -> Option<Diagnosis> {
        let diagnosis = DiagnosticClassifier::classify(text)?;
        let record = refiner::refine(diagnosis.record, text, diagnosis.source.category());

        Some(Diagnosis {
            source: diagnosis.source,
            record,
        })
    }

    pub fn estimate(&self, bike_type: &str, service_type: &str) -> Option<CostEstimate> {
        estimator::estimate_cost(bike_type, service_type)
    }
}

impl Default for AssistantEngine {
    fn default() -> Self {
        Self::new()
    }
}

pub fn interaction_kind(reply: &AssistantReply) -> InteractionKind {
    match reply {
        AssistantReply::Conversation { .. } => InteractionKind::Conversation,
        AssistantReply::Diagnosis(_) => InteractionKind::Diagnosis,
        AssistantReply::Unrecognized { .. } => InteractionKind::Unrecognized,
    }
}

/// Request metadata passed alongside the text
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub session_id: Option<Uuid>,
    pub device: DeviceContext,
}

/// Engine plus fire-and-forget interaction logging
#[derive(Clone)]
pub struct AssistantService {
    engine: std::sync::Arc<AssistantEngine>,
    recorder: InteractionRecorder,
}

impl AssistantService {
    pub fn new(engine: AssistantEngine, recorder: InteractionRecorder) -> Self {
        Self {
            engine: std::sync::Arc::new(engine),
            recorder,
        }
    }

    pub fn engine(&self) -> &AssistantEngine {
        &self.engine
    }

    pub fn recorder(&self) -> &InteractionRecorder {
        &self.recorder
    }

    /// Chat turn; the log write is spawned and never awaited here
    pub fn chat(&self, text: &str, ctx: &RequestContext) -> AssistantReply {
        let reply = self.engine.respond(text);
        let kind = interaction_kind(&reply);
        info!(?kind, session_id = ?ctx.session_id, "Chat turn handled");

        self.record(kind, text, serde_json::to_value(&reply), ctx);
        reply
    }

    pub fn diagnose(&self, text: &str, ctx: &RequestContext) -> Option<Diagnosis> {
        let diagnosis = self.engine.diagnose(text);
        let (kind, outcome) = match &diagnosis {
            Some(d) => (InteractionKind::Diagnosis, serde_json::to_value(d)),
            None => (InteractionKind::Unrecognized, Ok(serde_json::Value::Null)),
        };
        info!(?kind, session_id = ?ctx.session_id, "Diagnosis request handled");

        self.record(kind, text, outcome, ctx);
        diagnosis
    }

    pub fn estimate(
        &self,
        bike_type: &str,
        service_type: &str,
        ctx: &RequestContext,
    ) -> Option<CostEstimate> {
        let estimate = self.engine.estimate(bike_type, service_type);
        info!(
            bike_type,
            service_type,
            found = estimate.is_some(),
            "Estimate request handled"
        );

        let outcome = match &estimate {
            Some(e) => serde_json::to_value(e),
            None => Ok(serde_json::Value::Null),
        };
        self.record(
            InteractionKind::Estimate,
            format!("{}/{}", bike_type, service_type),
            outcome,
            ctx,
        );
        estimate
    }

    fn record(
        &self,
        kind: InteractionKind,
        input: impl Into<String>,
        outcome: serde_json::Result<serde_json::Value>,
        ctx: &RequestContext,
    ) {
        let outcome = outcome.unwrap_or_else(|e| json!({ "serialization_error": e.to_string() }));
        let record = InteractionRecord::new(kind, input, outcome, ctx.session_id, ctx.device.clone());

        // detached; failures and a missing runtime are logged inside the recorder
        let _ = self.recorder.record(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::tests::FailingInteractionLog;
    use crate::audit::{InMemoryInteractionLog, InteractionLog};
    use crate::knowledge::{self, URGENT_TIP};
    use crate::models::{ConversationIntent, DiagnosisSource, IssueCategory, Urgency};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_conversation_short_circuit() {
        let engine = AssistantEngine::new();

        match engine.respond("hello") {
            AssistantReply::Conversation { intent, lines, reply } => {
                assert_eq!(intent, ConversationIntent::Greeting);
                assert_eq!(lines.len(), reply.lines().count());
            }
            other => panic!("expected conversation, got {:?}", other),
        }
    }

    #[test]
    fn test_router_wins_over_diagnostic_keywords() {
        // "book" routes to booking even though "brake" is a diagnostic keyword
        let engine = AssistantEngine::new();
        match engine.respond("book a brake service") {
            AssistantReply::Conversation { intent, .. } => {
                assert_eq!(intent, ConversationIntent::Booking)
            }
            other => panic!("expected booking, got {:?}", other),
        }
    }

    #[test]
    fn test_example_scenario() {
        let engine = AssistantEngine::new();
        let text = "Engine makes rattling noise and brakes feel unsafe, I think it's dangerous";

        let AssistantReply::Diagnosis(diagnosis) = engine.respond(text) else {
            panic!("expected diagnosis");
        };

        assert_eq!(diagnosis.source, DiagnosisSource::Category(IssueCategory::Noise));
        assert_eq!(diagnosis.record.title, knowledge::entry(IssueCategory::Noise).title);
        assert_eq!(diagnosis.record.urgency, Urgency::High);
        assert_eq!(diagnosis.record.tip, URGENT_TIP);
    }

    #[test]
    fn test_unrecognized_and_empty() {
        let engine = AssistantEngine::new();

        assert_eq!(
            engine.respond(""),
            AssistantReply::Unrecognized {
                message: UNRECOGNIZED_MESSAGE.to_string()
            }
        );
        assert!(engine.diagnose("").is_none());
        assert!(engine.diagnose("nice weather today").is_none());
    }

    #[test]
    fn test_diagnose_skips_router() {
        let engine = AssistantEngine::new();
        // "thanks" would be intercepted by the router in a chat turn
        let diagnosis = engine.diagnose("thanks, brakes fixed?").unwrap();
        assert_eq!(diagnosis.source.category(), Some(IssueCategory::Brake));
    }

    #[test]
    fn test_router_config_is_applied() {
        let engine = AssistantEngine::with_router_config(RouterConfig { thanks_max_chars: 5 });
        // "thanks" is 6 chars; with a 5 char bound it is not conversational
        assert!(matches!(
            engine.respond("thanks"),
            AssistantReply::Unrecognized { .. }
        ));
    }

    #[test]
    fn test_service_works_without_runtime() {
        let log = Arc::new(InMemoryInteractionLog::new());
        let service = AssistantService::new(
            AssistantEngine::new(),
            InteractionRecorder::new(log.clone()),
        );
        let ctx = RequestContext::default();

        let AssistantReply::Diagnosis(diagnosis) = service.chat("brake squeaking", &ctx) else {
            panic!("expected diagnosis");
        };
        assert_eq!(diagnosis.source.category(), Some(IssueCategory::Brake));
        assert!(service.diagnose("oil leaking", &ctx).is_some());
        assert!(service.estimate("cruiser", "engine", &ctx).is_some());

        // nothing was written, and nothing panicked
        assert_eq!(tokio_test::block_on(log.len()), 0);
    }

    async fn wait_for(log: &InMemoryInteractionLog, count: usize) {
        for _ in 0..100 {
            if log.len().await >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("interaction log never reached {} records", count);
    }

    #[tokio::test]
    async fn test_service_records_interactions() {
        let log = Arc::new(InMemoryInteractionLog::new());
        let service = AssistantService::new(
            AssistantEngine::new(),
            InteractionRecorder::new(log.clone()),
        );
        let ctx = RequestContext {
            session_id: Some(Uuid::new_v4()),
            device: DeviceContext::unknown(),
        };

        service.chat("hello", &ctx);
        service.diagnose("oil leaking", &ctx);
        service.estimate("electric", "oil", &ctx);
        wait_for(&log, 3).await;

        let recent = log.recent(10).await.unwrap();
        let mut kinds: Vec<_> = recent.iter().map(|r| r.kind).collect();
        kinds.sort_by_key(|k| format!("{:?}", k));
        assert_eq!(
            kinds,
            vec![
                InteractionKind::Conversation,
                InteractionKind::Diagnosis,
                InteractionKind::Estimate
            ]
        );
        assert!(recent.iter().all(|r| r.session_id == ctx.session_id));
    }

    #[tokio::test]
    async fn test_failing_log_does_not_affect_result() {
        let service = AssistantService::new(
            AssistantEngine::new(),
            InteractionRecorder::new(Arc::new(FailingInteractionLog)),
        );
        let ctx = RequestContext::default();

        let reply = service.chat("brake squeaking, completely stopped", &ctx);
        let AssistantReply::Diagnosis(diagnosis) = reply else {
            panic!("expected diagnosis");
        };
        assert_eq!(diagnosis.record.urgency, Urgency::High);

        let estimate = service.estimate("scooter", "general", &ctx).unwrap();
        assert!(estimate.applicable);
        assert!(service.estimate("moped", "general", &ctx).is_none());
    }
}
