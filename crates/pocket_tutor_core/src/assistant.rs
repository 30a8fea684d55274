//! crates/pocket_tutor_core/src/assistant.rs
//!
//! The educational assistant. It forwards a student's message to a
//! `CompletionService` under a localized system prompt and never fails:
//! any completion error becomes a canned apology in the requested language.

use std::sync::Arc;
use tracing::{error, warn};

use crate::localization::{ARABIC, ENGLISH, URDU};
use crate::ports::{CompletionService, PortError};

pub const EDUCATIONAL_CONTEXT: &str = "educational_assistant";

const SYSTEM_PROMPT_AR: &str = "أنت مساعد تعليمي ذكي يساعد الطلاب الجامعيين. قدم إجابات مفيدة ودقيقة باللغة العربية، واحرص على أن تكون تفسيراتك واضحة ومفهومة. ساعد في المواد الأكاديمية، والدراسة، وأي أسئلة تعليمية.";
const SYSTEM_PROMPT_EN: &str = "You are an intelligent educational assistant helping university students. Provide helpful and accurate answers in English, and make sure your explanations are clear and understandable. Help with academic subjects, studying, and any educational questions.";
const SYSTEM_PROMPT_UR: &str = "آپ ایک ذہین تعلیمی اسسٹنٹ ہیں جو یونیورسٹی کے طلباء کی مدد کرتے ہیں۔ اردو میں مفید اور درست جوابات فراہم کریں، اور یقینی بنائیں کہ آپ کی وضاحات واضح اور قابل فہم ہوں۔ تعلیمی مضامین، مطالعہ، اور کسی بھی تعلیمی سوالات میں مدد کریں۔";

const FALLBACK_AR: &str = "عذراً، لم أستطع معالجة طلبك في الوقت الحالي. يرجى المحاولة مرة أخرى لاحقاً.";
const FALLBACK_EN: &str = "Sorry, I couldn't process your request right now. Please try again later.";
const FALLBACK_UR: &str = "معذرت، میں فی الوقت آپ کی درخواست پر عمل نہیں کر سکا۔ براہ کرم بعد میں دوبارہ کوشش کریں۔";

/// System prompt for a (language, context) pair; English educational otherwise.
pub fn system_prompt(language: &str, context: &str) -> &'static str {
    match (language, context) {
        (ARABIC, EDUCATIONAL_CONTEXT) => SYSTEM_PROMPT_AR,
        (URDU, EDUCATIONAL_CONTEXT) => SYSTEM_PROMPT_UR,
        (ENGLISH, EDUCATIONAL_CONTEXT) => SYSTEM_PROMPT_EN,
        _ => SYSTEM_PROMPT_EN,
    }
}

pub fn fallback_reply(language: &str) -> &'static str {
    match language {
        ARABIC => FALLBACK_AR,
        URDU => FALLBACK_UR,
        _ => FALLBACK_EN,
    }
}

#[derive(Debug, Clone)]
pub struct AssistantRequest {
    pub message: String,
    pub language: String,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssistantReply {
    pub response: String,
    pub language: String,
}

#[derive(Clone)]
pub struct EducationalAssistant {
    completion: Option<Arc<dyn CompletionService>>,
}

impl EducationalAssistant {
    /// `None` means no provider is configured; every chat gets the fallback.
    pub fn new(completion: Option<Arc<dyn CompletionService>>) -> Self {
        Self { completion }
    }

    pub async fn chat(&self, request: AssistantRequest) -> AssistantReply {
        let prompt = system_prompt(&request.language, &request.context);

        let result = match &self.completion {
            Some(completion) => completion.complete(prompt, &request.message).await,
            None => Err(PortError::Unexpected("AI service is not configured".to_string())),
        };

        let response = match result {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("Assistant returned an empty completion");
                fallback_reply(&request.language).to_string()
            }
            Err(e) => {
                error!("AI Chat Error: {}", e);
                fallback_reply(&request.language).to_string()
            }
        };

        AssistantReply { response, language: request.language }
    }
}
