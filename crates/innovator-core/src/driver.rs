//! Runs session effects against an idea service

use std::sync::Arc;

use innovator_api::IdeaService;
use tokio::sync::broadcast;

use crate::{
    conversation::ConversationState,
    error::Result,
    events::SessionEvent,
    generation::GenerationState,
    session::{Completion, Effect, Session},
};

/// Perform one effect and tag the result with its ticket
pub async fn execute(service: &dyn IdeaService, effect: Effect) -> Completion {
    match effect {
        Effect::Clarify { ticket, request } => {
            tracing::debug!("Dispatching clarification (session generation {})", ticket.epoch());
            let result = service.clarify(&request).await;
            Completion::Clarify { ticket, result }
        }
        Effect::Generate { ticket, request } => {
            tracing::debug!("Dispatching generation (session generation {})", ticket.epoch());
            let result = service.generate(&request).await;
            Completion::Generate { ticket, result }
        }
    }
}

/// Drives a [`Session`] to completion one submission at a time
pub struct SessionDriver {
    session: Session,
    service: Arc<dyn IdeaService>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl SessionDriver {
    pub fn new(service: Arc<dyn IdeaService>) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            session: Session::new(),
            service,
            event_tx,
        }
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Submit user input and wait until the chain it starts settles.
    ///
    /// Local rejections come back as `Err`. Service failures are recorded
    /// on the session and reported as [`SessionEvent::Error`].
    pub async fn submit(&mut self, text: &str) -> Result<()> {
        let effect = self.session.submit(text)?;
        let _ = self.event_tx.send(SessionEvent::ClarifyStart {
            text: text.trim().to_string(),
        });

        let mut next = Some(effect);
        while let Some(effect) = next.take() {
            let completion = execute(self.service.as_ref(), effect).await;
            let was_generate = matches!(completion, Completion::Generate { .. });
            next = self.session.apply(completion);
            if was_generate {
                self.emit_generation();
            } else {
                self.emit_clarification(next.is_some());
            }
        }
        Ok(())
    }

    /// Discard the session and start over
    pub fn reset(&mut self) {
        self.session.reset();
        let _ = self.event_tx.send(SessionEvent::Reset);
    }

    fn emit_clarification(&self, generation_started: bool) {
        let conversation = self.session.conversation();
        match conversation.state() {
            ConversationState::AwaitingClarification => {
                if let Some(question) = conversation.pending_question() {
                    let _ = self.event_tx.send(SessionEvent::QuestionAsked {
                        question: question.to_string(),
                    });
                }
            }
            ConversationState::Clarified => {
                let requirement = conversation.confirmed_requirement().unwrap_or_default();
                let _ = self.event_tx.send(SessionEvent::Clarified {
                    requirement: requirement.to_string(),
                });
                if generation_started {
                    let _ = self.event_tx.send(SessionEvent::GenerationStart {
                        requirement: requirement.to_string(),
                    });
                }
            }
            ConversationState::Error => {
                let message = conversation.last_error().unwrap_or_default();
                let _ = self.event_tx.send(SessionEvent::Error {
                    message: message.to_string(),
                });
            }
            ConversationState::Idle => {}
        }
    }

    fn emit_generation(&self) {
        match self.session.generation().state() {
            GenerationState::Succeeded { outcome } => {
                let _ = self.event_tx.send(SessionEvent::GenerationEnd {
                    ideas: outcome.ideas.clone(),
                    total_generated: outcome.total_generated,
                    total_comparisons: outcome.total_comparisons,
                    ranking_violation: outcome.ranking_violation.clone(),
                });
            }
            GenerationState::Failed { last_error, .. } => {
                let _ = self.event_tx.send(SessionEvent::Error {
                    message: last_error.clone(),
                });
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use async_trait::async_trait;
    use innovator_api::{
        ClarifyRequest, ClarifyResponse, ConversationTurn, GenerateRequest, GenerateResponse,
        Idea,
    };
    use parking_lot::Mutex;

    /// A mock service that replays canned responses and records requests.
    #[derive(Default)]
    struct MockService {
        clarify_responses: Mutex<Vec<innovator_api::Result<ClarifyResponse>>>,
        generate_responses: Mutex<Vec<innovator_api::Result<GenerateResponse>>>,
        clarify_calls: Mutex<Vec<ClarifyRequest>>,
        generate_calls: Mutex<Vec<GenerateRequest>>,
    }

    impl MockService {
        fn new(
            clarify: Vec<innovator_api::Result<ClarifyResponse>>,
            generate: Vec<innovator_api::Result<GenerateResponse>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                clarify_responses: Mutex::new(clarify),
                generate_responses: Mutex::new(generate),
                ..Default::default()
            })
        }
    }

    #[async_trait]
    impl IdeaService for MockService {
        async fn clarify(
            &self,
            request: &ClarifyRequest,
        ) -> innovator_api::Result<ClarifyResponse> {
            self.clarify_calls.lock().push(request.clone());
            let mut responses = self.clarify_responses.lock();
            if responses.is_empty() {
                Ok(ClarifyResponse::clear(vec![]))
            } else {
                responses.remove(0)
            }
        }

        async fn generate(
            &self,
            request: &GenerateRequest,
        ) -> innovator_api::Result<GenerateResponse> {
            self.generate_calls.lock().push(request.clone());
            let mut responses = self.generate_responses.lock();
            if responses.is_empty() {
                Ok(GenerateResponse {
                    top_ideas: vec![],
                    total_generated: 0,
                    total_comparisons: None,
                })
            } else {
                responses.remove(0)
            }
        }
    }

    fn three_ideas() -> GenerateResponse {
        GenerateResponse {
            top_ideas: vec![
                Idea::scored("a", 95.0),
                Idea::scored("b", 90.0),
                Idea::scored("c", 85.0),
            ],
            total_generated: 20,
            total_comparisons: None,
        }
    }

    fn drain(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
        let mut events = vec![];
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_clear_first_time() {
        let service = MockService::new(
            vec![Ok(ClarifyResponse::clear(vec![
                ConversationTurn::user("GRPO improvements"),
                ConversationTurn::assistant("Clear."),
            ]))],
            vec![Ok(three_ideas())],
        );
        let mut driver = SessionDriver::new(service.clone());
        let mut rx = driver.subscribe();

        driver.submit("GRPO improvements").await.unwrap();

        let clarify_calls = service.clarify_calls.lock();
        assert_eq!(clarify_calls.len(), 1);
        assert_eq!(clarify_calls[0].requirement, "GRPO improvements");
        assert!(clarify_calls[0].conversation_history.is_empty());

        let generate_calls = service.generate_calls.lock();
        assert_eq!(generate_calls.len(), 1);
        assert_eq!(generate_calls[0].requirement, "GRPO improvements");

        let session = driver.session();
        assert_eq!(session.conversation().state(), ConversationState::Clarified);
        assert_eq!(session.generation().ideas().len(), 3);
        assert!(!session.is_loading());

        let events = drain(&mut rx);
        assert!(matches!(events[0], SessionEvent::ClarifyStart { .. }));
        assert!(matches!(events[1], SessionEvent::Clarified { .. }));
        assert!(matches!(events[2], SessionEvent::GenerationStart { .. }));
        assert!(matches!(
            events[3],
            SessionEvent::GenerationEnd { total_generated: 20, .. }
        ));
    }

    #[tokio::test]
    async fn test_one_follow_up_round() {
        let asked = vec![
            ConversationTurn::user("RL"),
            ConversationTurn::assistant("Which algorithm?"),
        ];
        let mut answered = asked.clone();
        answered.push(ConversationTurn::user("GRPO"));
        answered.push(ConversationTurn::assistant("Got it."));

        let service = MockService::new(
            vec![
                Ok(ClarifyResponse::unclear("Which algorithm?", asked.clone())),
                Ok(ClarifyResponse::clear(answered)),
            ],
            vec![Ok(three_ideas())],
        );
        let mut driver = SessionDriver::new(service.clone());
        let mut rx = driver.subscribe();

        driver.submit("RL").await.unwrap();
        assert_eq!(
            driver.session().conversation().pending_question(),
            Some("Which algorithm?")
        );
        assert!(service.generate_calls.lock().is_empty());

        driver.submit("GRPO").await.unwrap();
        {
            let clarify_calls = service.clarify_calls.lock();
            assert_eq!(clarify_calls.len(), 2);
            assert_eq!(clarify_calls[1].requirement, "GRPO");
            assert_eq!(clarify_calls[1].conversation_history, asked);
        }
        // Confirmed requirement is the original one, not the reply
        assert_eq!(service.generate_calls.lock()[0].requirement, "RL");
        assert_eq!(driver.session().conversation().turns().len(), 4);

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(e, SessionEvent::QuestionAsked { .. })));
        assert!(events.iter().any(|e| matches!(e, SessionEvent::GenerationEnd { .. })));
    }

    #[tokio::test]
    async fn test_generation_failure_reports_detail() {
        let service = MockService::new(
            vec![Ok(ClarifyResponse::clear(vec![]))],
            vec![Err(innovator_api::Error::service(429, "rate limited"))],
        );
        let mut driver = SessionDriver::new(service);
        let mut rx = driver.subscribe();

        driver.submit("GRPO improvements").await.unwrap();
        assert_eq!(driver.session().generation().last_error(), Some("rate limited"));
        assert!(driver.session().generation().ideas().is_empty());

        let events = drain(&mut rx);
        assert!(matches!(
            events.last(),
            Some(SessionEvent::Error { message }) if message == "rate limited"
        ));
    }

    #[tokio::test]
    async fn test_clarify_failure_keeps_dialogue() {
        let service = MockService::new(
            vec![Err(innovator_api::Error::Status { status: 502 })],
            vec![],
        );
        let mut driver = SessionDriver::new(service.clone());
        driver.submit("RL").await.unwrap();

        let conversation = driver.session().conversation();
        assert_eq!(conversation.state(), ConversationState::Error);
        assert_eq!(
            conversation.last_error(),
            Some("Request failed with status code 502")
        );
        assert!(service.generate_calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_empty_input_sends_nothing() {
        let service = MockService::new(vec![], vec![]);
        let mut driver = SessionDriver::new(service.clone());
        let err = driver.submit("   ").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(service.clarify_calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let service = MockService::new(vec![], vec![Ok(three_ideas())]);
        let mut driver = SessionDriver::new(service);
        let mut rx = driver.subscribe();
        driver.submit("GRPO improvements").await.unwrap();

        driver.reset();
        assert!(driver.session().is_fresh());
        assert!(matches!(drain(&mut rx).last(), Some(SessionEvent::Reset)));
    }
}
