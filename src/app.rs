use ratatui::widgets::ListState;
use tokio::task::JoinHandle;

use crate::quiz::{Quiz, QuizQuestion};
use crate::tutor::{self, ImageAttachment, Tutor, WritingMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Chat,
    Image,
    Writing,
    Reading,
    Vocabulary,
    Grammar,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Home => "Dashboard",
            Screen::Chat => "AI Conversation Practice",
            Screen::Image => "Image Analyzer",
            Screen::Writing => "Writing Assistant",
            Screen::Reading => "Reading Comprehension",
            Screen::Vocabulary => "Vocabulary Builder",
            Screen::Grammar => "Grammar Lessons & Quizzes",
        }
    }
}

/// Dashboard entries: screen, display name, one-line description.
pub const FEATURES: &[(Screen, &str, &str)] = &[
    (
        Screen::Chat,
        "AI Chatbot",
        "Practice conversation with a friendly AI tutor.",
    ),
    (
        Screen::Image,
        "Image Analyzer",
        "Learn vocabulary by analyzing images.",
    ),
    (
        Screen::Writing,
        "Writing Assistant",
        "Get instant feedback on your writing.",
    ),
    (
        Screen::Reading,
        "Reading Comprehension",
        "Test your understanding of passages.",
    ),
    (
        Screen::Vocabulary,
        "Vocabulary Builder",
        "Get definitions, examples, and synonyms.",
    ),
    (
        Screen::Grammar,
        "Grammar Lessons",
        "Explore lessons and take quizzes on grammar.",
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

pub struct ChatPanel {
    pub messages: Vec<ChatMessage>,
    pub input: String,
    pub cursor: usize,
    pub loading: bool,
    pub scroll: u16,
    pub task: Option<JoinHandle<String>>,
}

impl ChatPanel {
    fn new() -> Self {
        Self {
            messages: vec![ChatMessage {
                sender: Sender::Ai,
                text: "Hello! I'm your AI English tutor. How can I help you practice today?"
                    .to_string(),
            }],
            input: String::new(),
            cursor: 0,
            loading: false,
            scroll: 0,
            task: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageField {
    Path,
    Prompt,
}

pub struct ImagePanel {
    pub path_input: String,
    pub prompt_input: String,
    pub field: ImageField,
    pub attachment: Option<ImageAttachment>,
    pub analysis: String,
    pub error: String,
    pub loading: bool,
    pub scroll: u16,
    pub task: Option<JoinHandle<String>>,
}

impl ImagePanel {
    fn new() -> Self {
        Self {
            path_input: String::new(),
            prompt_input:
                "Describe this image in detail. What vocabulary words can I learn from it?"
                    .to_string(),
            field: ImageField::Path,
            attachment: None,
            analysis: String::new(),
            error: String::new(),
            loading: false,
            scroll: 0,
            task: None,
        }
    }
}

pub struct WritingPanel {
    pub text: String,
    pub mode: WritingMode,
    pub feedback: String,
    pub loading: bool,
    pub scroll: u16,
    pub task: Option<JoinHandle<String>>,
}

impl WritingPanel {
    fn new() -> Self {
        Self {
            text: String::new(),
            mode: WritingMode::Quick,
            feedback: String::new(),
            loading: false,
            scroll: 0,
            task: None,
        }
    }
}

pub struct ReadingPanel {
    pub passage: &'static str,
    pub question: String,
    pub answer: String,
    pub loading: bool,
    pub scroll: u16,
    pub task: Option<JoinHandle<String>>,
}

impl ReadingPanel {
    fn new() -> Self {
        Self {
            passage: tutor::SAMPLE_PASSAGE,
            question: String::new(),
            answer: String::new(),
            loading: false,
            scroll: 0,
            task: None,
        }
    }
}

pub struct VocabularyPanel {
    pub word: String,
    pub definition: String,
    pub loading: bool,
    pub scroll: u16,
    pub task: Option<JoinHandle<String>>,
}

impl VocabularyPanel {
    fn new() -> Self {
        Self {
            word: String::new(),
            definition: String::new(),
            loading: false,
            scroll: 0,
            task: None,
        }
    }
}

pub struct GrammarPanel {
    pub topics_state: ListState,
    pub selected_topic: Option<String>,
    pub explanation: String,
    pub lesson_loading: bool,
    pub quiz_loading: bool,
    pub quiz: Option<Quiz>,
    pub scroll: u16,
    pub lesson_task: Option<JoinHandle<String>>,
    pub quiz_task: Option<JoinHandle<Option<Vec<QuizQuestion>>>>,
}

impl GrammarPanel {
    fn new() -> Self {
        let mut topics_state = ListState::default();
        topics_state.select(Some(0));
        Self {
            topics_state,
            selected_topic: None,
            explanation: String::new(),
            lesson_loading: false,
            quiz_loading: false,
            quiz: None,
            scroll: 0,
            lesson_task: None,
            quiz_task: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthModal {
    None,
    Login,
    Signup,
}

/// Client-only simulated auth: any submission succeeds. Fields are never
/// validated or stored anywhere beyond this in-memory form.
#[derive(Default)]
pub struct AuthForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub field: usize,
}

impl AuthForm {
    pub fn field_count(&self, modal: AuthModal) -> usize {
        match modal {
            AuthModal::Signup => 3,
            _ => 2,
        }
    }

    fn clear(&mut self) {
        self.name.clear();
        self.email.clear();
        self.password.clear();
        self.field = 0;
    }
}

pub struct App {
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,

    pub home_state: ListState,

    // Simulated session
    pub logged_in: bool,
    pub user_email: Option<String>,
    pub auth_modal: AuthModal,
    pub auth_form: AuthForm,

    // Feature panels, each with independent in-flight state
    pub chat: ChatPanel,
    pub image: ImagePanel,
    pub writing: WritingPanel,
    pub reading: ReadingPanel,
    pub vocabulary: VocabularyPanel,
    pub grammar: GrammarPanel,

    // Animation state (0-2 for ellipsis animation)
    pub animation_frame: u8,

    pub tutor: Tutor,
}

impl App {
    pub fn new(tutor: Tutor) -> Self {
        let mut home_state = ListState::default();
        home_state.select(Some(0));

        Self {
            should_quit: false,
            screen: Screen::Home,
            input_mode: InputMode::Normal,
            home_state,
            logged_in: false,
            user_email: None,
            auth_modal: AuthModal::None,
            auth_form: AuthForm::default(),
            chat: ChatPanel::new(),
            image: ImagePanel::new(),
            writing: WritingPanel::new(),
            reading: ReadingPanel::new(),
            vocabulary: VocabularyPanel::new(),
            grammar: GrammarPanel::new(),
            animation_frame: 0,
            tutor,
        }
    }

    pub fn tick_animation(&mut self) {
        if self.any_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    fn any_loading(&self) -> bool {
        self.chat.loading
            || self.image.loading
            || self.writing.loading
            || self.reading.loading
            || self.vocabulary.loading
            || self.grammar.lesson_loading
            || self.grammar.quiz_loading
    }

    // Home navigation
    pub fn home_nav_down(&mut self) {
        let len = FEATURES.len();
        let i = self.home_state.selected().unwrap_or(0);
        self.home_state.select(Some((i + 1).min(len - 1)));
    }

    pub fn home_nav_up(&mut self) {
        let i = self.home_state.selected().unwrap_or(0);
        self.home_state.select(Some(i.saturating_sub(1)));
    }

    pub fn open_selected_feature(&mut self) {
        if let Some(i) = self.home_state.selected() {
            if let Some((screen, _, _)) = FEATURES.get(i) {
                self.screen = *screen;
            }
        }
    }

    // Auth
    pub fn open_login(&mut self) {
        self.auth_form.clear();
        self.auth_modal = AuthModal::Login;
    }

    pub fn open_signup(&mut self) {
        self.auth_form.clear();
        self.auth_modal = AuthModal::Signup;
    }

    pub fn close_auth_modal(&mut self) {
        self.auth_modal = AuthModal::None;
        self.auth_form.clear();
    }

    /// Simulated submission: always succeeds.
    pub fn submit_auth(&mut self) {
        if self.auth_modal == AuthModal::None {
            return;
        }
        self.logged_in = true;
        self.user_email = if self.auth_form.email.is_empty() {
            Some("learner@example.com".to_string())
        } else {
            Some(self.auth_form.email.clone())
        };
        self.close_auth_modal();
    }

    pub fn logout(&mut self) {
        self.logged_in = false;
        self.user_email = None;
    }

    // Chat
    pub fn submit_chat(&mut self) {
        let message = self.chat.input.trim().to_string();
        if message.is_empty() || self.chat.task.is_some() {
            return;
        }

        self.chat.messages.push(ChatMessage {
            sender: Sender::User,
            text: message.clone(),
        });
        self.chat.input.clear();
        self.chat.cursor = 0;
        self.chat.loading = true;
        self.chat.scroll = u16::MAX; // clamped to bottom on next render

        let tutor = self.tutor.clone();
        self.chat.task = Some(tokio::spawn(async move {
            tutor.chat_response(&message).await
        }));
    }

    // Image
    pub fn attach_image(&mut self) {
        let path = self.image.path_input.trim().to_string();
        if path.is_empty() {
            return;
        }
        match tutor::load_image(std::path::Path::new(&path)) {
            Ok(attachment) => {
                self.image.attachment = Some(attachment);
                self.image.error.clear();
            }
            // Rejection leaves any existing attachment and analysis alone
            Err(e) => {
                self.image.error = e.to_string();
            }
        }
    }

    pub fn submit_image_analysis(&mut self) {
        if self.image.task.is_some() {
            return;
        }
        let prompt = self.image.prompt_input.trim().to_string();
        let Some(attachment) = self.image.attachment.clone() else {
            self.image.error = "Please select an image and provide a prompt.".to_string();
            return;
        };
        if prompt.is_empty() {
            self.image.error = "Please select an image and provide a prompt.".to_string();
            return;
        }

        self.image.error.clear();
        self.image.analysis.clear();
        self.image.loading = true;

        let tutor = self.tutor.clone();
        self.image.task = Some(tokio::spawn(async move {
            tutor.analyze_image(&attachment, &prompt).await
        }));
    }

    // Writing
    pub fn submit_writing(&mut self) {
        let text = self.writing.text.trim().to_string();
        if text.is_empty() || self.writing.task.is_some() {
            return;
        }

        self.writing.feedback.clear();
        self.writing.loading = true;
        self.writing.scroll = 0;

        let tutor = self.tutor.clone();
        let mode = self.writing.mode;
        self.writing.task = Some(tokio::spawn(async move {
            tutor.assist_writing(&text, mode).await
        }));
    }

    // Reading
    pub fn submit_reading_question(&mut self) {
        let question = self.reading.question.trim().to_string();
        if question.is_empty() || self.reading.task.is_some() {
            return;
        }

        self.reading.answer.clear();
        self.reading.loading = true;

        let tutor = self.tutor.clone();
        let passage = self.reading.passage;
        self.reading.task = Some(tokio::spawn(async move {
            tutor.answer_reading_question(passage, &question).await
        }));
    }

    // Vocabulary
    pub fn submit_word(&mut self) {
        let word = self.vocabulary.word.trim().to_string();
        if word.is_empty() || self.vocabulary.task.is_some() {
            return;
        }

        self.vocabulary.definition.clear();
        self.vocabulary.loading = true;
        self.vocabulary.scroll = 0;

        let tutor = self.tutor.clone();
        self.vocabulary.task = Some(tokio::spawn(async move {
            tutor.define_word(&word).await
        }));
    }

    // Grammar
    pub fn grammar_nav_down(&mut self) {
        let len = tutor::GRAMMAR_TOPICS.len();
        let i = self.grammar.topics_state.selected().unwrap_or(0);
        self.grammar.topics_state.select(Some((i + 1).min(len - 1)));
    }

    pub fn grammar_nav_up(&mut self) {
        let i = self.grammar.topics_state.selected().unwrap_or(0);
        self.grammar.topics_state.select(Some(i.saturating_sub(1)));
    }

    /// Select the highlighted topic: reset every piece of lesson and quiz
    /// state, then issue exactly one lesson request and one quiz request
    /// concurrently. The lesson can render while the quiz is still pending.
    pub fn select_grammar_topic(&mut self) {
        let Some(topic) = self
            .grammar
            .topics_state
            .selected()
            .and_then(|i| tutor::GRAMMAR_TOPICS.get(i))
            .map(|t| t.to_string())
        else {
            return;
        };

        // Re-selecting the topic already being fetched is a no-op
        if self.grammar.lesson_loading && self.grammar.selected_topic.as_deref() == Some(&topic) {
            return;
        }

        if let Some(task) = self.grammar.lesson_task.take() {
            task.abort();
        }
        if let Some(task) = self.grammar.quiz_task.take() {
            task.abort();
        }

        self.grammar.selected_topic = Some(topic.clone());
        self.grammar.explanation.clear();
        self.grammar.quiz = None;
        self.grammar.scroll = 0;
        self.grammar.lesson_loading = true;
        self.grammar.quiz_loading = true;

        let tutor_lesson = self.tutor.clone();
        let lesson_topic = topic.clone();
        self.grammar.lesson_task = Some(tokio::spawn(async move {
            tutor_lesson.grammar_lesson(&lesson_topic).await
        }));

        let tutor_quiz = self.tutor.clone();
        self.grammar.quiz_task = Some(tokio::spawn(async move {
            tutor_quiz.grammar_quiz(&topic).await
        }));
    }

    /// Drain any finished remote tasks, re-enabling the owning panel's
    /// inputs. Called once per loop iteration; never blocks on a task that
    /// is still running.
    pub async fn poll_tasks(&mut self) {
        if self.chat.task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.chat.task.take() {
                let text = task
                    .await
                    .unwrap_or_else(|_| tutor::CHAT_FALLBACK.to_string());
                self.chat.messages.push(ChatMessage {
                    sender: Sender::Ai,
                    text,
                });
                self.chat.loading = false;
                self.chat.scroll = u16::MAX;
            }
        }

        if self.image.task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.image.task.take() {
                self.image.analysis = task
                    .await
                    .unwrap_or_else(|_| tutor::IMAGE_FALLBACK.to_string());
                self.image.loading = false;
                self.image.scroll = 0;
            }
        }

        if self.writing.task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.writing.task.take() {
                self.writing.feedback = task
                    .await
                    .unwrap_or_else(|_| tutor::WRITING_FALLBACK.to_string());
                self.writing.loading = false;
            }
        }

        if self.reading.task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.reading.task.take() {
                self.reading.answer = task
                    .await
                    .unwrap_or_else(|_| tutor::READING_FALLBACK.to_string());
                self.reading.loading = false;
            }
        }

        if self.vocabulary.task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.vocabulary.task.take() {
                let word = self.vocabulary.word.clone();
                self.vocabulary.definition = task
                    .await
                    .unwrap_or_else(|_| tutor::vocabulary_fallback(&word));
                self.vocabulary.loading = false;
            }
        }

        if self
            .grammar
            .lesson_task
            .as_ref()
            .is_some_and(|t| t.is_finished())
        {
            if let Some(task) = self.grammar.lesson_task.take() {
                let topic = self.grammar.selected_topic.clone().unwrap_or_default();
                self.grammar.explanation = task
                    .await
                    .unwrap_or_else(|_| tutor::lesson_fallback(&topic));
                self.grammar.lesson_loading = false;
            }
        }

        if self
            .grammar
            .quiz_task
            .as_ref()
            .is_some_and(|t| t.is_finished())
        {
            if let Some(task) = self.grammar.quiz_task.take() {
                // Join or generation failure both leave the quiz unavailable
                self.grammar.quiz = task.await.ok().flatten().map(Quiz::new);
                self.grammar.quiz_loading = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::GeminiClient;
    use crate::quiz::QuizMode;
    use std::io::Write;
    use tempfile::TempDir;

    fn test_app() -> App {
        let client = GeminiClient::new("test-key");
        let tutor = Tutor::new(
            client,
            tutor::DEFAULT_FLASH_MODEL.to_string(),
            tutor::DEFAULT_PRO_MODEL.to_string(),
        );
        App::new(tutor)
    }

    #[tokio::test]
    async fn topic_selection_resets_state_and_issues_one_of_each_request() {
        let mut app = test_app();
        app.grammar.explanation = "old lesson".to_string();
        app.grammar.quiz = Some(Quiz::new(Vec::new()));
        app.grammar.scroll = 12;

        app.select_grammar_topic();

        // State reset before either request resolves
        assert!(app.grammar.explanation.is_empty());
        assert!(app.grammar.quiz.is_none());
        assert_eq!(app.grammar.scroll, 0);
        assert!(app.grammar.lesson_loading);
        assert!(app.grammar.quiz_loading);

        // Exactly one lesson task and one quiz task in flight
        assert!(app.grammar.lesson_task.is_some());
        assert!(app.grammar.quiz_task.is_some());
        assert_eq!(
            app.grammar.selected_topic.as_deref(),
            Some(tutor::GRAMMAR_TOPICS[0])
        );

        if let Some(t) = app.grammar.lesson_task.take() {
            t.abort();
        }
        if let Some(t) = app.grammar.quiz_task.take() {
            t.abort();
        }
    }

    #[tokio::test]
    async fn reselecting_loading_topic_is_a_no_op() {
        let mut app = test_app();
        app.select_grammar_topic();
        let first_lesson = app.grammar.lesson_task.take();
        app.grammar.lesson_loading = true;

        app.select_grammar_topic();
        // No replacement task was spawned for the same in-flight topic
        assert!(app.grammar.lesson_task.is_none());

        if let Some(t) = first_lesson {
            t.abort();
        }
        if let Some(t) = app.grammar.quiz_task.take() {
            t.abort();
        }
    }

    #[tokio::test]
    async fn chat_submit_requires_input_and_idle_task() {
        let mut app = test_app();
        let initial = app.chat.messages.len();

        app.chat.input = "   ".to_string();
        app.submit_chat();
        assert_eq!(app.chat.messages.len(), initial);
        assert!(app.chat.task.is_none());

        app.chat.input = "hello".to_string();
        app.submit_chat();
        assert_eq!(app.chat.messages.len(), initial + 1);
        assert!(app.chat.loading);
        assert!(app.chat.input.is_empty());

        // A second submit while the first call is live is ignored
        app.chat.input = "again".to_string();
        app.submit_chat();
        assert_eq!(app.chat.messages.len(), initial + 1);
        assert_eq!(app.chat.input, "again");

        if let Some(t) = app.chat.task.take() {
            t.abort();
        }
    }

    #[test]
    fn oversized_image_sets_error_and_preserves_analysis() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("huge.png");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&vec![0u8; (tutor::MAX_IMAGE_BYTES + 1) as usize])
            .unwrap();

        let mut app = test_app();
        app.image.analysis = "previous analysis".to_string();
        app.image.path_input = path.display().to_string();
        app.attach_image();

        assert_eq!(app.image.error, tutor::IMAGE_TOO_LARGE);
        assert_eq!(app.image.analysis, "previous analysis");
        assert!(app.image.attachment.is_none());
    }

    #[test]
    fn image_analysis_requires_attachment() {
        let mut app = test_app();
        app.submit_image_analysis();
        assert_eq!(app.image.error, "Please select an image and provide a prompt.");
        assert!(app.image.task.is_none());
    }

    #[test]
    fn simulated_auth_always_succeeds() {
        let mut app = test_app();
        assert!(!app.logged_in);

        app.open_login();
        assert_eq!(app.auth_modal, AuthModal::Login);
        app.auth_form.email = "student@example.com".to_string();
        app.submit_auth();

        assert!(app.logged_in);
        assert_eq!(app.user_email.as_deref(), Some("student@example.com"));
        assert_eq!(app.auth_modal, AuthModal::None);

        app.logout();
        assert!(!app.logged_in);
        assert!(app.user_email.is_none());
    }

    #[test]
    fn home_selection_routes_to_panels() {
        let mut app = test_app();
        app.home_nav_down();
        app.home_nav_down();
        app.open_selected_feature();
        assert_eq!(app.screen, Screen::Writing);
        assert_eq!(app.screen.title(), "Writing Assistant");
    }

    #[test]
    fn finished_quiz_state_machine_integrates_with_panel() {
        let mut app = test_app();
        app.grammar.quiz = Some(Quiz::new(vec![crate::quiz::QuizQuestion {
            question: "q".to_string(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer_index: 2,
        }]));

        let quiz = app.grammar.quiz.as_mut().unwrap();
        quiz.start();
        quiz.select_answer(2);
        quiz.advance();
        assert_eq!(quiz.mode(), QuizMode::Finished);
        assert_eq!(quiz.score(), 1);
    }
}
