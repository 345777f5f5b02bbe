//! Conversation view-state.
//!
//! `ChatController` owns the ordered message list, the phase of the
//! in-flight request, and the active service filter. It issues at most
//! one request at a time: submissions made while a response is pending
//! are ignored, and a failed request rolls the triggering user message
//! back so the list returns to its pre-submission state.

use super::message::{Message, Role};
use crate::schemas::{ChatRequest, ChatResponse, ServiceFilter};

/// Prompts offered while the conversation is still empty.
pub const EXAMPLE_PROMPTS: [&str; 4] = [
    "How do I create a chain in LangChain?",
    "What is a StateGraph in LangGraph?",
    "How do I trace my application with LangSmith?",
    "How does retrieval-augmented generation work?",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingResponse,
    Error(String),
}

pub struct ChatController {
    messages: Vec<Message>,
    phase: Phase,
    filter: ServiceFilter,
}

impl ChatController {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            phase: Phase::Idle,
            filter: ServiceFilter::All,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_awaiting(&self) -> bool {
        self.phase == Phase::AwaitingResponse
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn filter(&self) -> ServiceFilter {
        self.filter
    }

    /// Change the active documentation scope. Does not issue a request
    /// and does not touch the message list.
    pub fn set_filter(&mut self, filter: ServiceFilter) {
        self.filter = filter;
    }

    pub fn show_examples(&self) -> bool {
        self.messages.is_empty()
    }

    /// Start a submission.
    ///
    /// Returns the request to send, or `None` when the submission is
    /// ignored: a response is already pending, or the question is empty
    /// after trimming.
    pub fn begin(&mut self, question: &str) -> Option<ChatRequest> {
        if self.is_awaiting() {
            return None;
        }

        let question = question.trim();
        if question.is_empty() {
            return None;
        }

        self.messages.push(Message::user(question));
        self.phase = Phase::AwaitingResponse;

        Some(ChatRequest {
            question: question.to_string(),
            service_filter: self.filter,
        })
    }

    /// Record a successful response: append the assistant message and
    /// return to idle.
    pub fn complete(&mut self, response: ChatResponse) {
        if !self.is_awaiting() {
            return;
        }

        self.messages.push(Message::assistant(
            response.answer,
            response.sources,
            Some(response.processing_time),
        ));
        self.phase = Phase::Idle;
    }

    /// Record a failed request: roll back the triggering user message
    /// and keep the error for display. The request is not retried.
    pub fn fail(&mut self, message: impl Into<String>) {
        if !self.is_awaiting() {
            return;
        }

        if self.messages.last().map(|m| m.role) == Some(Role::User) {
            self.messages.pop();
        }
        self.phase = Phase::Error(message.into());
    }
}

impl Default for ChatController {
    fn default() -> Self {
        Self::new()
    }
}
