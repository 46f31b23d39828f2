use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tutor_application::TutorUseCase;
use tutor_application::tutor_usecase::{TUTOR_UNAVAILABLE, TUTOR_UNAVAILABLE_ISSUE};
use tutor_core::TutorError;
use tutor_core::capability::Capabilities;
use tutor_core::config::TutorConfig;
use tutor_core::curriculum::{Grade, Subject};
use tutor_core::error::Result;
use tutor_core::model::{GenerationParams, LanguageModel, ModelError};
use tutor_core::retrieval::{ContextRetriever, CurriculumChunk, RetrieverFactory};
use tutor_core::session::{ChatRole, ChatSession, SearchStatus};

const GOOD_EXPLANATION: &str = "مرحباً يا بطل! الجمع يعني أن نضع الأشياء معاً. عندك تفاحتان وأضفنا ثلاث تفاحات فصار المجموع خمس تفاحات.";
const GOOD_SVG: &str = r##"<svg width="700" height="500" xmlns="http://www.w3.org/2000/svg"><circle cx="100" cy="100" r="40" fill="#FF6B6B"/></svg>"##;

struct RecordingModel {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    delay: Duration,
}

impl RecordingModel {
    fn new(replies: &[String]) -> Arc<Self> {
        Self::slow(replies, Duration::ZERO)
    }

    fn slow(replies: &[String], delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().cloned().collect()),
            prompts: Mutex::new(Vec::new()),
            delay,
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for RecordingModel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn generate(&self, prompt: &str, _params: &GenerationParams) -> std::result::Result<String, ModelError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| good_reply(Some(GOOD_SVG))))
    }
}

fn good_reply(svg: Option<&str>) -> String {
    serde_json::json!({ "text_explanation": GOOD_EXPLANATION, "svg_code": svg }).to_string()
}

struct FixedRetriever(Vec<CurriculumChunk>);

#[async_trait]
impl ContextRetriever for FixedRetriever {
    fn collection_name(&self) -> &str {
        "fixed"
    }

    async fn similarity_search(&self, _query: &str, k: usize) -> Result<Vec<CurriculumChunk>> {
        Ok(self.0.iter().take(k).cloned().collect())
    }
}

struct BrokenRetriever;

#[async_trait]
impl ContextRetriever for BrokenRetriever {
    fn collection_name(&self) -> &str {
        "broken"
    }

    async fn similarity_search(&self, _query: &str, _k: usize) -> Result<Vec<CurriculumChunk>> {
        Err(TutorError::retrieval("connection refused"))
    }
}

/// Hands out a [`FixedRetriever`] (or fails) and counts how often it is asked.
struct CountingFactory {
    chunks: Vec<CurriculumChunk>,
    fail: bool,
    broken_search: bool,
    opens: AtomicUsize,
}

impl CountingFactory {
    fn new(chunks: Vec<CurriculumChunk>, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            chunks,
            fail,
            broken_search: false,
            opens: AtomicUsize::new(0),
        })
    }

    /// Opens fine, but every search errors.
    fn with_broken_search() -> Arc<Self> {
        Arc::new(Self {
            chunks: Vec::new(),
            fail: false,
            broken_search: true,
            opens: AtomicUsize::new(0),
        })
    }

    fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RetrieverFactory for CountingFactory {
    async fn open(&self, _grade: Grade, _subject: Subject) -> Result<Arc<dyn ContextRetriever>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TutorError::retrieval("Chroma is unreachable"));
        }
        if self.broken_search {
            return Ok(Arc::new(BrokenRetriever));
        }
        Ok(Arc::new(FixedRetriever(self.chunks.clone())))
    }
}

fn use_case(
    model: Option<Arc<RecordingModel>>,
    factory: Option<Arc<CountingFactory>>,
) -> TutorUseCase {
    let capabilities = Capabilities {
        model_client: model.is_some(),
        retrieval: factory.is_some(),
        embedding_model: factory.as_ref().map(|_| "text-embedding-005".to_string()),
    };
    TutorUseCase::new(
        TutorConfig::default(),
        capabilities,
        model.map(|m| m as Arc<dyn LanguageModel>),
        factory.map(|f| f as Arc<dyn RetrieverFactory>),
    )
    .unwrap()
}

#[tokio::test]
async fn greeting_gets_canned_reply_without_retrieval_or_model() {
    let model = RecordingModel::new(&[]);
    let factory = CountingFactory::new(vec![CurriculumChunk::new("نص", "a.txt")], false);
    let tutor = use_case(Some(model.clone()), Some(factory.clone()));
    let mut session = ChatSession::new(Grade::Grade1, Subject::Arabic);

    let reply = tutor.ask(&mut session, "السلام عليكم").await.unwrap();

    assert_eq!(reply.role, ChatRole::Assistant);
    assert!(reply.extras.svg_markup.is_none());
    assert_eq!(reply.extras.search_status, Some(SearchStatus::Skipped));
    assert!(reply.content.contains("لغتي الجميلة"));
    assert!(model.prompts().is_empty());
    assert_eq!(factory.opens(), 0);

    let ids: Vec<usize> = session.history().iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![0, 1]);
}

#[tokio::test]
async fn empty_retrieval_is_not_found_and_still_answers() {
    let model = RecordingModel::new(&[]);
    let factory = CountingFactory::new(Vec::new(), false);
    let tutor = use_case(Some(model.clone()), Some(factory.clone()));
    let mut session = ChatSession::new(Grade::Grade3, Subject::Science);

    let reply = tutor
        .ask(&mut session, "ما هي أجزاء النبات وكيف يتغذى؟")
        .await
        .unwrap();

    assert_eq!(reply.extras.search_status, Some(SearchStatus::NotFound));
    assert_eq!(reply.content, GOOD_EXPLANATION);
    assert_eq!(model.prompts().len(), 1);
    assert!(!model.prompts()[0].contains("المعلومات المسترجعة"));
}

#[tokio::test]
async fn failed_search_is_not_found_and_still_answers() {
    let model = RecordingModel::new(&[]);
    let factory = CountingFactory::with_broken_search();
    let tutor = use_case(Some(model.clone()), Some(factory.clone()));
    let mut session = ChatSession::new(Grade::Grade3, Subject::Science);

    let reply = tutor
        .ask(&mut session, "ما هي أجزاء النبات وكيف يتغذى؟")
        .await
        .unwrap();

    assert_eq!(factory.opens(), 1);
    assert_eq!(reply.extras.search_status, Some(SearchStatus::NotFound));
    assert_eq!(reply.content, GOOD_EXPLANATION);
    assert_eq!(model.prompts().len(), 1);
}

#[tokio::test]
async fn question_opening_with_small_talk_reaches_the_model() {
    let model = RecordingModel::new(&[]);
    let tutor = use_case(Some(model.clone()), None);
    let mut session = ChatSession::new(Grade::Grade2, Subject::Science);

    for question in [
        "ماذا تفعل النحلة في الزهرة؟",
        "شكرا، والآن اشرح لي الضرب 3×4",
    ] {
        let reply = tutor.ask(&mut session, question).await.unwrap();
        assert_ne!(reply.extras.search_status, Some(SearchStatus::Skipped), "{question}");
        assert_eq!(reply.content, GOOD_EXPLANATION);
    }
    assert_eq!(model.prompts().len(), 2);
    assert!(model.prompts()[0].contains("النحلة"));
}

#[tokio::test(start_paused = true)]
async fn slow_model_still_ends_with_an_assistant_turn() {
    let model = RecordingModel::slow(&[], Duration::from_secs(200));
    let tutor = use_case(Some(model.clone()), None);
    let mut session = ChatSession::new(Grade::Grade1, Subject::Math);

    let started = tokio::time::Instant::now();
    let reply = tutor.ask(&mut session, "اشرح لي جمع 2+3").await.unwrap();

    assert!(started.elapsed() >= Duration::from_secs(200));
    assert_eq!(reply.content, GOOD_EXPLANATION);
    assert_eq!(session.len(), 2);
    assert_eq!(session.history().last().map(|m| m.role), Some(ChatRole::Assistant));
}

#[tokio::test]
async fn retrieved_context_reaches_the_prompt() {
    let model = RecordingModel::new(&[good_reply(Some(GOOD_SVG))]);
    let chunk = "الجمع هو ضم مجموعتين معاً للحصول على مجموعة أكبر";
    let factory = CountingFactory::new(vec![CurriculumChunk::new(chunk, "grade_1/Math/addition.txt")], false);
    let tutor = use_case(Some(model.clone()), Some(factory));
    let mut session = ChatSession::new(Grade::Grade1, Subject::Math);

    let reply = tutor.ask(&mut session, "اشرح لي جمع 2+3").await.unwrap();

    assert_eq!(reply.extras.search_status, Some(SearchStatus::Found));
    assert_eq!(reply.extras.svg_markup.as_deref(), Some(GOOD_SVG));
    assert!(reply.extras.quality_issues.is_empty());
    let prompt = &model.prompts()[0];
    assert!(prompt.contains(chunk));
    assert!(prompt.contains("grade_1/Math/addition.txt"));
}

#[tokio::test]
async fn missing_model_yields_unavailable_turn() {
    let tutor = use_case(None, None);
    let mut session = ChatSession::new(Grade::Grade2, Subject::Math);

    let reply = tutor.ask(&mut session, "كيف أطرح 9 من 15؟").await.unwrap();

    assert!(!tutor.is_ready());
    assert_eq!(reply.content, TUTOR_UNAVAILABLE);
    assert_eq!(reply.extras.quality_issues, vec![TUTOR_UNAVAILABLE_ISSUE.to_string()]);
    assert_eq!(reply.extras.search_status, Some(SearchStatus::Unavailable));
    assert_eq!(session.len(), 2);
}

#[tokio::test]
async fn invalid_then_valid_reply_is_accepted_on_second_attempt() {
    let model = RecordingModel::new(&["لا يوجد JSON هنا".to_string(), good_reply(Some(GOOD_SVG))]);
    let tutor = use_case(Some(model.clone()), None);
    let mut session = ChatSession::new(Grade::Grade1, Subject::Math);

    let reply = tutor.ask(&mut session, "اشرح لي جمع 2+3").await.unwrap();

    assert_eq!(model.prompts().len(), 2);
    assert!(reply.extras.quality_issues.is_empty());
    assert_eq!(reply.content, GOOD_EXPLANATION);
    assert_eq!(reply.extras.quality_scores.map(|s| s.svg), Some(100));
}

#[tokio::test]
async fn retrievers_are_opened_once_per_selection() {
    let model = RecordingModel::new(&[]);
    let factory = CountingFactory::new(Vec::new(), true);
    let tutor = use_case(Some(model), Some(factory.clone()));
    let mut session = ChatSession::new(Grade::Grade4, Subject::Science);

    let first = tutor.ask(&mut session, "لماذا تسقط الأمطار من السحب؟").await.unwrap();
    let second = tutor.ask(&mut session, "كيف تتكون الغيوم في السماء؟").await.unwrap();
    assert_eq!(first.extras.search_status, Some(SearchStatus::Unavailable));
    assert_eq!(second.extras.search_status, Some(SearchStatus::Unavailable));
    assert_eq!(factory.opens(), 1);

    session.select(Grade::Grade5, Subject::Science);
    tutor.ask(&mut session, "ما هي دورة الماء في الطبيعة؟").await.unwrap();
    assert_eq!(factory.opens(), 2);
}

#[tokio::test]
async fn follow_up_question_carries_history_summary() {
    let model = RecordingModel::new(&[]);
    let tutor = use_case(Some(model.clone()), None);
    let mut session = ChatSession::new(Grade::Grade2, Subject::Math);

    tutor.ask(&mut session, "ما هو الجمع في الرياضيات؟").await.unwrap();
    tutor.ask(&mut session, "لم أفهم، اشرح هذا مرة أخرى").await.unwrap();

    let prompts = model.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(!prompts[0].contains("ملخص المحادثة السابقة"));
    assert!(prompts[1].contains("ملخص المحادثة السابقة"));
    assert!(prompts[1].contains("ما هو الجمع في الرياضيات؟"));
    assert_eq!(session.len(), 4);
}

#[tokio::test]
async fn blank_question_is_rejected() {
    let tutor = use_case(None, None);
    let mut session = ChatSession::default();
    let err = tutor.ask(&mut session, "   ").await.unwrap_err();
    assert!(matches!(err, TutorError::InvalidInput(_)));
    assert!(session.is_empty());
}
