//! services/api/src/adapters/chat_llm.rs
//!
//! This module contains the adapter for the assistant widget's LLM.
//! It implements the `ChatCompletionService` port from the `core` crate.

const SYSTEM_INSTRUCTIONS: &str = r#"You are the Safety Assistant for "Safety for All", a platform of process-safety analysis tools.

The platform offers these modules:
- BowTie Analysis (available to everyone, some features need an account)
- Fault Tree Analysis and Event Tree Analysis
- HAZOP Study, LOPA and FMEA
- QRA (Quantitative Risk Assessment)
- Case Studies

Plans: Monthly $15, Quarterly $30, Yearly $100 (10% tax is added at checkout).
Visitors can request a free trial from the landing page. For anything you cannot
answer, point them to support@sfl.com.pk.

Style:
- Be friendly, concise and practical. A few sentences is usually enough.
- Explain safety-engineering terms in plain language when asked.
- Never invent account details, prices or features that are not listed above."#;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use safety_portal_core::{
    domain::{ChatRole, ChatTurn},
    ports::{ChatCompletionService, PortError, PortResult},
};
use tracing::info;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ChatCompletionService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiChatAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiChatAdapter {
    /// Creates a new `OpenAiChatAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

fn to_port_error(e: OpenAIError) -> PortError {
    PortError::Unexpected(e.to_string())
}

/// System prompt, then the prior turns in order, then the new user message.
fn build_messages(message: &str, history: &[ChatTurn]) -> PortResult<Vec<ChatCompletionRequestMessage>> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(
        ChatCompletionRequestSystemMessageArgs::default()
            .content(SYSTEM_INSTRUCTIONS)
            .build()
            .map_err(to_port_error)?
            .into(),
    );

    for turn in history {
        let built: ChatCompletionRequestMessage = match turn.role {
            ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                .content(turn.text.as_str())
                .build()
                .map_err(to_port_error)?
                .into(),
            ChatRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(turn.text.as_str())
                .build()
                .map_err(to_port_error)?
                .into(),
        };
        messages.push(built);
    }

    messages.push(
        ChatCompletionRequestUserMessageArgs::default()
            .content(message)
            .build()
            .map_err(to_port_error)?
            .into(),
    );
    Ok(messages)
}

//=========================================================================================
// `ChatCompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ChatCompletionService for OpenAiChatAdapter {
    async fn complete(&self, message: &str, history: &[ChatTurn]) -> PortResult<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(build_messages(message, history)?)
            .max_tokens(500u32)
            .temperature(0.7)
            .build()
            .map_err(to_port_error)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(to_port_error)?;

        let reply = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| PortError::Unexpected("No reply generated".to_string()))?;

        info!("Assistant replied with {} characters", reply.len());
        Ok(reply.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_wrap_history_between_system_and_new_message() {
        let history = vec![
            ChatTurn::assistant("Hi! I am the Safety Assistant. How can I help you today?"),
            ChatTurn::user("What is a bow-tie?"),
            ChatTurn::assistant("A barrier diagram."),
        ];

        let messages = build_messages("And LOPA?", &history).unwrap();

        assert_eq!(messages.len(), 5);
        assert!(matches!(messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(messages[1], ChatCompletionRequestMessage::Assistant(_)));
        assert!(matches!(messages[2], ChatCompletionRequestMessage::User(_)));
        assert!(matches!(messages[3], ChatCompletionRequestMessage::Assistant(_)));
        assert!(matches!(messages[4], ChatCompletionRequestMessage::User(_)));
    }
}
