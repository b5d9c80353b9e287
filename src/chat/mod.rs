//! AI chat assistant: builds a health-aware prompt and asks a hosted model.
//!
//! Replies are always plain text. Provider failures are turned into a
//! readable message here so the HTTP layer never has to report them.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::models::{ChatRequest, HealthRecord};
use crate::store::RecordStore;

pub mod gemini;
pub mod groq;
pub mod prompt;
pub mod provider;

pub use gemini::GeminiProvider;
pub use groq::GroqProvider;
pub use prompt::{build_prompt, ClientContext, Persona, HISTORY_DAYS};
pub use provider::{classify, ChatProvider, FailureKind, ProviderError, UNAVAILABLE_MESSAGE};

pub const OFFLINE_MESSAGE: &str = "I'm sorry, my AI brain is currently offline (API Key missing). \
     Please tell the developer to check the server configuration.";

const DEFAULT_PREFERENCE: &str = "llama";

pub struct ChatAssistant {
    store: Arc<dyn RecordStore>,
    providers: Vec<Arc<dyn ChatProvider>>,
    persona: Persona,
}

impl ChatAssistant {
    pub fn new(
        store: Arc<dyn RecordStore>,
        providers: Vec<Arc<dyn ChatProvider>>,
        persona: Persona,
    ) -> Self {
        Self {
            store,
            providers,
            persona,
        }
    }

    /// Builds one provider per configured API key.
    pub fn from_config(
        store: Arc<dyn RecordStore>,
        config: &AppConfig,
    ) -> Result<Self, ProviderError> {
        let mut providers: Vec<Arc<dyn ChatProvider>> = Vec::new();
        if let Some(groq) = &config.groq {
            providers.push(Arc::new(GroqProvider::new(groq, config.llm_timeout)?));
        }
        if let Some(gemini) = &config.gemini {
            providers.push(Arc::new(GeminiProvider::new(gemini, config.llm_timeout)?));
        }
        if providers.is_empty() {
            tracing::warn!(
                "no AI provider API key configured, chat will answer with the offline notice"
            );
        }
        Ok(Self::new(store, providers, config.persona))
    }

    async fn history(&self, user_id: Option<Uuid>, today: NaiveDate) -> Vec<HealthRecord> {
        let Some(user_id) = user_id else {
            return Vec::new();
        };
        let from = today
            .checked_sub_days(Days::new(HISTORY_DAYS - 1))
            .unwrap_or(NaiveDate::MIN);
        match self.store.between(user_id, from, today).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, %user_id, "could not load chat history");
                Vec::new()
            }
        }
    }

    /// Preferred provider first, then at most one fallback.
    fn route(&self, preference: Option<&str>) -> Vec<Arc<dyn ChatProvider>> {
        let wanted = match preference.map(|p| p.trim().to_ascii_lowercase()) {
            Some(p) if p == "gemini" => "gemini",
            _ => DEFAULT_PREFERENCE,
        };
        let (mut ordered, others): (Vec<_>, Vec<_>) =
            self.providers.iter().cloned().partition(|p| p.key() == wanted);
        ordered.extend(others);
        ordered.truncate(2);
        ordered
    }

    /// Answers `request`, with the week of history of `user_id` when known.
    /// Never fails; problems become the reply text.
    pub async fn reply(
        &self,
        user_id: Option<Uuid>,
        request: &ChatRequest,
        today: NaiveDate,
    ) -> String {
        if self.providers.is_empty() {
            return OFFLINE_MESSAGE.to_string();
        }

        let history = self.history(user_id, today).await;

        let context = ClientContext::from_value(&request.context);
        let prompt = build_prompt(self.persona, &context, &history, &request.message);

        let attempts = self.route(request.model.as_deref());
        let mut failures = Vec::new();
        for provider in &attempts {
            match provider.generate(&prompt).await {
                Ok(text) => return text,
                Err(e) => {
                    let kind = classify(&e);
                    tracing::warn!(
                        provider = provider.key(),
                        model = provider.model(),
                        ?kind,
                        error = %e,
                        "chat provider failed"
                    );
                    failures.push(kind.message(provider.model()));
                }
            }
        }

        match failures.len() {
            1 => failures.remove(0),
            _ => UNAVAILABLE_MESSAGE.to_string(),
        }
    }
}
