use std::path::Path;

use anyhow::{Result, anyhow, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::gemini::GeminiClient;
use crate::quiz::QuizQuestion;

pub const DEFAULT_FLASH_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_PRO_MODEL: &str = "gemini-2.5-pro";

/// Image uploads larger than this are rejected before any network call.
pub const MAX_IMAGE_BYTES: u64 = 4 * 1024 * 1024;
pub const IMAGE_TOO_LARGE: &str = "Image size should be less than 4MB.";

// Fixed fallback strings shown verbatim when a remote call fails.
pub const CHAT_FALLBACK: &str = "Sorry, I encountered an error. Please try again.";
pub const IMAGE_FALLBACK: &str = "Sorry, I couldn't analyze the image. Please try again.";
pub const WRITING_FALLBACK: &str = "Sorry, an error occurred while analyzing your text.";
pub const READING_FALLBACK: &str = "Sorry, I couldn't process your question about the passage.";

pub fn vocabulary_fallback(word: &str) -> String {
    format!("Sorry, I couldn't find a definition for \"{}\".", word)
}

pub fn lesson_fallback(topic: &str) -> String {
    format!(
        "Sorry, I couldn't generate a lesson for \"{}\". Please try again.",
        topic
    )
}

pub const GRAMMAR_TOPICS: &[&str] = &[
    "Present Simple",
    "Present Continuous",
    "Past Simple",
    "Past Continuous",
    "Present Perfect",
    "Past Perfect",
    "Future Simple",
    "Articles (a, an, the)",
    "Prepositions of Place",
    "Prepositions of Time",
    "First Conditional",
    "Second Conditional",
    "Third Conditional",
    "Modal Verbs",
    "Reported Speech",
    "Passive Voice",
];

pub const SAMPLE_PASSAGE: &str = "The Industrial Revolution, which began in Great Britain in the late 18th century, was a period of major industrialization that saw the mechanization of agriculture and textile manufacturing and a revolution in power, including steam ships and railroads. This period of transition had a profound effect on the social, economic, and cultural conditions of the time. The shift from a manual labor-based economy to one dominated by industry and machine manufacturing led to a massive migration of people from rural areas to urban centers, creating new social classes and challenges. While it brought about unprecedented growth in wealth and population, it also resulted in difficult working conditions and crowded living situations for many.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritingMode {
    #[default]
    Quick,
    Deep,
}

impl WritingMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            WritingMode::Quick => "Quick Check",
            WritingMode::Deep => "Deep Analysis",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            WritingMode::Quick => WritingMode::Deep,
            WritingMode::Deep => WritingMode::Quick,
        }
    }
}

/// An image file read from disk and prepared for the API's inline payload.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub mime_type: String,
    pub data: String,
    pub file_name: String,
    pub size_bytes: u64,
}

/// Load and validate an image for analysis. Enforces the supported formats
/// and the 4 MiB limit before any bytes go over the wire.
pub fn load_image(path: &Path) -> Result<ImageAttachment> {
    let mime_type = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => bail!("Unsupported image type. Use PNG, JPG, or WEBP."),
    };

    let metadata = std::fs::metadata(path)
        .map_err(|_| anyhow!("File not found: {}", path.display()))?;
    if metadata.len() > MAX_IMAGE_BYTES {
        bail!("{}", IMAGE_TOO_LARGE);
    }

    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    Ok(ImageAttachment {
        mime_type: mime_type.to_string(),
        data: BASE64.encode(bytes),
        file_name,
        size_bytes: metadata.len(),
    })
}

pub fn chat_prompt(message: &str) -> String {
    format!(
        "You are an English learning assistant. Keep your responses concise and helpful. User: {}",
        message
    )
}

pub fn reading_prompt(passage: &str, question: &str) -> String {
    format!(
        "Based on the following passage, answer the user's question. If the answer isn't in the passage, say so.\n\nPassage: \"{}\"\n\nQuestion: \"{}\"",
        passage, question
    )
}

pub fn vocabulary_prompt(word: &str) -> String {
    format!(
        "Act as a dictionary. For the word \"{}\", provide:\n1.  **Definition**: A clear and concise definition.\n2.  **Example Sentence**: A sentence using the word correctly.\n3.  **Synonyms**: A few common synonyms.\n4.  **Antonyms**: A few common antonyms.\nFormat the response using Markdown.",
        word
    )
}

pub fn lesson_prompt(topic: &str) -> String {
    format!(
        "Act as an expert English grammar teacher. Provide a clear and comprehensive lesson on the topic: \"{}\".\nThe lesson should include:\n1.  **Explanation**: A simple and clear explanation of the grammar rule.\n2.  **Formation/Structure**: How to form sentences using the rule (if applicable).\n3.  **Examples**: At least 3-5 clear example sentences.\n4.  **Common Mistakes**: Point out common mistakes learners make.\n\nFormat the entire response using Markdown with headings, bold text, and lists for readability.",
        topic
    )
}

pub fn quiz_prompt(topic: &str) -> String {
    format!(
        "Generate a 3-question multiple-choice quiz about the English grammar topic: \"{}\". Each question must have exactly 4 options. Ensure the correctAnswerIndex is the zero-based index of the correct option in the options array.",
        topic
    )
}

const QUICK_WRITING_INSTRUCTION: &str = "You are a helpful proofreader. Quickly review the following text for grammar, spelling, and punctuation errors. Provide a corrected version and a brief summary of the changes. Be concise.";

const DEEP_WRITING_INSTRUCTION: &str = "You are an expert English writing tutor. Provide a deep, comprehensive analysis of the following text. Cover grammar, style, tone, clarity, and suggest specific, actionable improvements with explanations. Structure your feedback in clear sections using Markdown.";

fn quiz_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "questions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "question": {
                            "type": "STRING",
                            "description": "The quiz question."
                        },
                        "options": {
                            "type": "ARRAY",
                            "items": {"type": "STRING"},
                            "description": "An array of 4 possible answers."
                        },
                        "correctAnswerIndex": {
                            "type": "INTEGER",
                            "description": "The 0-based index of the correct answer in the 'options' array."
                        }
                    },
                    "required": ["question", "options", "correctAnswerIndex"]
                }
            }
        },
        "required": ["questions"]
    })
}

#[derive(Deserialize)]
struct QuizPayload {
    questions: Vec<QuizQuestion>,
}

/// Parse the structured quiz response. Anything that is not a non-empty set
/// of four-option questions with in-range answer indexes counts as a parse
/// failure and leaves the quiz unavailable.
pub fn parse_quiz(text: &str) -> Option<Vec<QuizQuestion>> {
    let payload: QuizPayload = serde_json::from_str(text).ok()?;
    if payload.questions.is_empty() {
        return None;
    }
    let valid = payload.questions.iter().all(|q| {
        q.options.len() == 4 && q.correct_answer_index < q.options.len() && !q.question.is_empty()
    });
    if !valid {
        return None;
    }
    Some(payload.questions)
}

/// Per-feature wrapper around the Gemini client. Each method maps any
/// remote failure to its panel's fixed fallback string, so callers never see
/// an error surface.
#[derive(Clone)]
pub struct Tutor {
    client: GeminiClient,
    flash_model: String,
    pro_model: String,
}

impl Tutor {
    pub fn new(client: GeminiClient, flash_model: String, pro_model: String) -> Self {
        Self {
            client,
            flash_model,
            pro_model,
        }
    }

    pub async fn chat_response(&self, message: &str) -> String {
        self.client
            .generate(&self.flash_model, &chat_prompt(message))
            .await
            .unwrap_or_else(|_| CHAT_FALLBACK.to_string())
    }

    pub async fn analyze_image(&self, attachment: &ImageAttachment, prompt: &str) -> String {
        self.client
            .generate_with_image(
                &self.flash_model,
                &attachment.mime_type,
                &attachment.data,
                prompt,
            )
            .await
            .unwrap_or_else(|_| IMAGE_FALLBACK.to_string())
    }

    pub async fn assist_writing(&self, text: &str, mode: WritingMode) -> String {
        let result = match mode {
            WritingMode::Quick => {
                self.client
                    .generate_with_system(&self.flash_model, QUICK_WRITING_INSTRUCTION, text)
                    .await
            }
            WritingMode::Deep => {
                self.client
                    .generate_with_system(&self.pro_model, DEEP_WRITING_INSTRUCTION, text)
                    .await
            }
        };
        result.unwrap_or_else(|_| WRITING_FALLBACK.to_string())
    }

    pub async fn answer_reading_question(&self, passage: &str, question: &str) -> String {
        self.client
            .generate(&self.flash_model, &reading_prompt(passage, question))
            .await
            .unwrap_or_else(|_| READING_FALLBACK.to_string())
    }

    pub async fn define_word(&self, word: &str) -> String {
        self.client
            .generate(&self.flash_model, &vocabulary_prompt(word))
            .await
            .unwrap_or_else(|_| vocabulary_fallback(word))
    }

    pub async fn grammar_lesson(&self, topic: &str) -> String {
        self.client
            .generate(&self.pro_model, &lesson_prompt(topic))
            .await
            .unwrap_or_else(|_| lesson_fallback(topic))
    }

    /// Generate a quiz for a topic. Returns None on any remote or parse
    /// failure; the caller shows no quiz rather than an error.
    pub async fn grammar_quiz(&self, topic: &str) -> Option<Vec<QuizQuestion>> {
        let text = self
            .client
            .generate_json(&self.flash_model, &quiz_prompt(topic), quiz_schema())
            .await
            .ok()?;
        parse_quiz(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn chat_prompt_embeds_the_user_message() {
        let prompt = chat_prompt("How do I use 'whom'?");
        assert!(prompt.starts_with("You are an English learning assistant."));
        assert!(prompt.ends_with("User: How do I use 'whom'?"));
    }

    #[test]
    fn reading_prompt_contains_passage_and_question() {
        let prompt = reading_prompt("Some passage.", "What happened?");
        assert!(prompt.contains("Passage: \"Some passage.\""));
        assert!(prompt.contains("Question: \"What happened?\""));
    }

    #[test]
    fn lesson_and_quiz_prompts_name_the_topic() {
        assert!(lesson_prompt("Passive Voice").contains("\"Passive Voice\""));
        assert!(quiz_prompt("Passive Voice").contains("\"Passive Voice\""));
        assert!(quiz_prompt("Passive Voice").contains("exactly 4 options"));
    }

    #[test]
    fn quiz_schema_requires_questions() {
        let schema = quiz_schema();
        assert_eq!(schema["required"][0], "questions");
        let item = &schema["properties"]["questions"]["items"];
        assert_eq!(item["required"][2], "correctAnswerIndex");
    }

    #[test]
    fn parse_quiz_accepts_well_formed_questions() {
        let text = r#"{"questions": [
            {"question": "Pick the past tense of 'go'.",
             "options": ["goed", "went", "gone", "going"],
             "correctAnswerIndex": 1}
        ]}"#;
        let questions = parse_quiz(text).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_answer_index, 1);
        assert_eq!(questions[0].options.len(), 4);
    }

    #[test]
    fn parse_quiz_rejects_malformed_payloads() {
        assert!(parse_quiz("not json").is_none());
        assert!(parse_quiz("{}").is_none());
        assert!(parse_quiz(r#"{"questions": []}"#).is_none());

        // Wrong option count
        let three_options = r#"{"questions": [
            {"question": "q", "options": ["a", "b", "c"], "correctAnswerIndex": 0}
        ]}"#;
        assert!(parse_quiz(three_options).is_none());

        // Answer index out of range
        let bad_index = r#"{"questions": [
            {"question": "q", "options": ["a", "b", "c", "d"], "correctAnswerIndex": 4}
        ]}"#;
        assert!(parse_quiz(bad_index).is_none());
    }

    #[test]
    fn load_image_rejects_oversized_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.png");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&vec![0u8; (MAX_IMAGE_BYTES + 1) as usize])
            .unwrap();

        let err = load_image(&path).unwrap_err();
        assert_eq!(err.to_string(), IMAGE_TOO_LARGE);
    }

    #[test]
    fn load_image_rejects_unsupported_extensions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.gif");
        std::fs::write(&path, b"GIF89a").unwrap();
        assert!(load_image(&path).is_err());
    }

    #[test]
    fn load_image_encodes_supported_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.JPG");
        std::fs::write(&path, b"fake jpeg bytes").unwrap();

        let attachment = load_image(&path).unwrap();
        assert_eq!(attachment.mime_type, "image/jpeg");
        assert_eq!(attachment.file_name, "photo.JPG");
        assert_eq!(attachment.data, BASE64.encode(b"fake jpeg bytes"));
    }

    #[test]
    fn load_image_reports_missing_files() {
        let err = load_image(Path::new("/nonexistent/photo.png")).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn fallbacks_match_the_fixed_strings() {
        assert_eq!(CHAT_FALLBACK, "Sorry, I encountered an error. Please try again.");
        assert_eq!(
            vocabulary_fallback("ubiquitous"),
            "Sorry, I couldn't find a definition for \"ubiquitous\"."
        );
        assert_eq!(
            lesson_fallback("Modal Verbs"),
            "Sorry, I couldn't generate a lesson for \"Modal Verbs\". Please try again."
        );
    }
}
