//! The question-answering use case.

use std::sync::Arc;

use tracing::{debug, info, warn};
use tutor_core::TutorError;
use tutor_core::capability::Capabilities;
use tutor_core::classification::{QuestionClassification, classify};
use tutor_core::config::TutorConfig;
use tutor_core::curriculum::{CurriculumIndex, Grade, Subject};
use tutor_core::error::Result;
use tutor_core::model::LanguageModel;
use tutor_core::prompt::{PromptComposer, history_summary};
use tutor_core::response::ModelResponse;
use tutor_core::retrieval::{ContextRetriever, RetrieverFactory, retrieve_with_status};
use tutor_core::session::{ChatMessage, ChatRole, ChatSession, MessageExtras, SearchStatus};
use tutor_interaction::{GateRequest, QualityGatedClient};

use crate::retriever_cache::RetrieverCache;

/// Shown instead of an answer when no model client could be built.
pub const TUTOR_UNAVAILABLE: &str = "عذرًا، المعلم الذكي غير جاهز حالياً. يرجى المحاولة لاحقاً.";
pub const TUTOR_UNAVAILABLE_ISSUE: &str = "المعلم الذكي غير متاح";

/// Runs questions through the tutoring pipeline:
///
/// classify → (optionally) retrieve → compose → quality-gated generation.
///
/// Built once at startup from the probed services. The model client is shared
/// by every question; retrievers are opened lazily per grade/subject and
/// cached.
pub struct TutorUseCase {
    config: TutorConfig,
    capabilities: Capabilities,
    composer: PromptComposer,
    curriculum: CurriculumIndex,
    model: Option<QualityGatedClient>,
    retrievers: Option<Arc<dyn RetrieverFactory>>,
    cache: RetrieverCache,
}

impl TutorUseCase {
    pub fn new(
        config: TutorConfig,
        capabilities: Capabilities,
        model: Option<Arc<dyn LanguageModel>>,
        retrievers: Option<Arc<dyn RetrieverFactory>>,
    ) -> Result<Self> {
        let model = model.map(|m| QualityGatedClient::new(m, config.max_retries));
        Ok(Self {
            config,
            capabilities,
            composer: PromptComposer::new()?,
            curriculum: CurriculumIndex::builtin(),
            model,
            retrievers,
            cache: RetrieverCache::new(),
        })
    }

    /// Replaces the built-in lesson index.
    pub fn with_curriculum(mut self, curriculum: CurriculumIndex) -> Self {
        self.curriculum = curriculum;
        self
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    /// Answers `question` and appends both turns to `session`.
    ///
    /// Always produces an assistant turn unless the question is blank or the
    /// prompt templates fail to render.
    pub async fn ask(&self, session: &mut ChatSession, question: &str) -> Result<ChatMessage> {
        let question = question.trim();
        if question.is_empty() {
            return Err(TutorError::invalid_input("question is empty"));
        }

        let classification = classify(question, session.history());
        debug!(?classification, "Classified question");

        let summary = history_summary(session.history(), self.config.history_turns);
        session.append(ChatRole::User, question, MessageExtras::default());

        if classification.is_greeting {
            let reply = greeting_reply(session.subject);
            let extras = MessageExtras {
                explanation: Some(reply.clone()),
                search_status: Some(SearchStatus::Skipped),
                ..Default::default()
            };
            return Ok(session.append(ChatRole::Assistant, reply, extras).clone());
        }

        let (context, search_status) = self
            .gather_context(question, &classification, session.grade, session.subject)
            .await;

        let prompt = self.composer.compose(
            question,
            &classification,
            session.grade,
            session.subject,
            Some(&context),
            summary.as_deref(),
        )?;

        let response = match &self.model {
            Some(client) => {
                client
                    .generate(
                        &prompt,
                        GateRequest {
                            expects_arabic: session.subject.expects_arabic(),
                            drawing_required: classification.needs_drawing,
                        },
                    )
                    .await
            }
            None => ModelResponse::unavailable(TUTOR_UNAVAILABLE, TUTOR_UNAVAILABLE_ISSUE),
        };
        info!(
            attempts = response.attempts,
            issues = response.quality_issues.len(),
            search = %search_status,
            "Answered question"
        );

        let extras = MessageExtras {
            explanation: Some(response.text_explanation.clone()),
            svg_markup: response.svg_code,
            quality_scores: Some(response.quality_scores),
            quality_issues: response.quality_issues,
            search_status: Some(search_status),
        };
        Ok(session
            .append(ChatRole::Assistant, response.text_explanation, extras)
            .clone())
    }

    /// Retrieved context for the question plus the lookup status.
    ///
    /// Lesson or unit requests search with a query built from the lesson
    /// index, and the lesson description is prepended to the context.
    async fn gather_context(
        &self,
        question: &str,
        classification: &QuestionClassification,
        grade: Grade,
        subject: Subject,
    ) -> (String, SearchStatus) {
        if !classification.needs_curriculum_search {
            return (String::new(), SearchStatus::Skipped);
        }

        let lesson = self.curriculum.detect_lesson_request(question, grade, subject);
        let query = lesson
            .as_ref()
            .map(|request| request.search_query.as_str())
            .unwrap_or(question);

        let retriever = self.retriever_for(grade, subject).await;
        let (context, status) =
            retrieve_with_status(retriever.as_deref(), query, self.config.retrieval_k).await;

        match lesson {
            Some(request) if !context.is_empty() => {
                (format!("{}\n\n{}", request.info.describe(), context), status)
            }
            _ => (context, status),
        }
    }

    /// The retriever for a selection, opened on first use.
    pub async fn retriever_for(
        &self,
        grade: Grade,
        subject: Subject,
    ) -> Option<Arc<dyn ContextRetriever>> {
        if let Some(cached) = self.cache.get(grade, subject).await {
            return cached;
        }

        let factory = self.retrievers.as_ref()?;
        let opened = match factory.open(grade, subject).await {
            Ok(retriever) => {
                info!(
                    "Curriculum collection '{}' ready",
                    retriever.collection_name()
                );
                Some(retriever)
            }
            Err(e) => {
                warn!("Could not open curriculum for {} / {}: {}", grade, subject, e);
                None
            }
        };
        self.cache.insert(grade, subject, opened.clone()).await;
        opened
    }
}

fn greeting_reply(subject: Subject) -> String {
    format!(
        "مرحباً يا بطل! 😊 أنا معلمك الذكي في مادة {}. اسألني أي سؤال عن دروسك وسأشرحه لك خطوة بخطوة.",
        subject.title()
    )
}
