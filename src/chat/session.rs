//! Binds a `ChatController` to an `ApiClient`.
//!
//! The controller decides whether a submission goes out; the session
//! performs the single awaited network call and feeds the outcome back.
//! One request in flight at a time, by construction; no cancellation.

use super::controller::ChatController;
use crate::client::ApiClient;
use crate::schemas::ServiceFilter;

/// Outcome of one conversational turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The submission was ignored (empty input or a response pending).
    Ignored,
    /// The assistant message was appended.
    Answered,
    /// The request failed; the user message was rolled back and the
    /// error is available on the controller.
    Failed,
}

pub struct ChatSession {
    controller: ChatController,
    client: ApiClient,
}

impl ChatSession {
    pub fn new(client: ApiClient) -> Self {
        Self {
            controller: ChatController::new(),
            client,
        }
    }

    pub fn controller(&self) -> &ChatController {
        &self.controller
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn set_filter(&mut self, filter: ServiceFilter) {
        self.controller.set_filter(filter);
    }

    /// Run one turn: submit the question, await the response, and apply
    /// it to the conversation state.
    pub async fn ask(&mut self, question: &str) -> TurnOutcome {
        let Some(request) = self.controller.begin(question) else {
            return TurnOutcome::Ignored;
        };

        match self
            .client
            .send_chat_message(&request.question, request.service_filter)
            .await
        {
            Ok(response) => {
                self.controller.complete(response);
                TurnOutcome::Answered
            }
            Err(err) => {
                self.controller.fail(err.to_string());
                TurnOutcome::Failed
            }
        }
    }
}
