//! Study notes Q&A prompt plus the answer-style and quick-question catalogs
//! the tab offers.

use serde::Serialize;

/// Answer styles the options panel offers.
pub const ANSWER_STYLES: &[&str] = &[
    "Bullet Points",
    "Numbered",
    "Flashcards",
    "Short Paragraphs",
    "Outline",
    "Q&A",
];
pub const DEFAULT_STYLE: &str = "Bullet Points";

pub const MIN_DEPTH: u8 = 1;
pub const MAX_DEPTH: u8 = 5;
pub const DEFAULT_DEPTH: u8 = 3;

const QNA_INSTRUCTION: &str = "Using the student's study notes below, answer the question. \
Cite key concepts from the notes, avoid fabricating content, and keep it well-structured.";

/// Clamps a requested detail level into `MIN_DEPTH..=MAX_DEPTH`.
pub fn clamp_depth(depth: u8) -> u8 {
    depth.clamp(MIN_DEPTH, MAX_DEPTH)
}

/// The style directive text, e.g. `"Bullet Points, Flashcards"`. Blank
/// entries are dropped; no styles at all means `DEFAULT_STYLE`.
pub fn style_directive(styles: &[String]) -> String {
    let picked: Vec<&str> = styles
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    if picked.is_empty() {
        DEFAULT_STYLE.to_string()
    } else {
        picked.join(", ")
    }
}

/// Builds the Q&A request over the student's notes.
pub fn build_qna_prompt(notes: &str, question: &str, styles: &[String], depth: u8) -> String {
    format!(
        "{QNA_INSTRUCTION} Prefer style: {style}. Detail level: {depth}.\n\nStudy Notes:\n{notes}\n\nQuestion:\n{question}",
        style = style_directive(styles),
        depth = clamp_depth(depth),
        notes = notes.trim(),
        question = question.trim(),
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Quick questions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct QuickQuestion {
    pub icon: &'static str,
    pub label: &'static str,
    pub prompt: &'static str,
    pub tooltip: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuickQuestionCategory {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub questions: &'static [QuickQuestion],
}

pub const QUICK_QUESTIONS: &[QuickQuestionCategory] = &[
    QuickQuestionCategory {
        key: "summary",
        title: "📋 Summary & Overview",
        description: "Get comprehensive overviews and key points",
        questions: &[
            QuickQuestion {
                icon: "📝",
                label: "Summarize main points",
                prompt: "Summarize the main points from my study notes.",
                tooltip: "Get a concise summary of the most important information",
            },
            QuickQuestion {
                icon: "🎯",
                label: "Key takeaways",
                prompt: "What are the most important takeaways from my study notes?",
                tooltip: "Focus on the essential lessons and insights",
            },
            QuickQuestion {
                icon: "🔍",
                label: "Overview",
                prompt: "Give me a comprehensive overview of my study notes.",
                tooltip: "Get a complete picture of all topics covered",
            },
        ],
    },
    QuickQuestionCategory {
        key: "study_tools",
        title: "🎓 Study Tools",
        description: "Create materials to enhance your learning",
        questions: &[
            QuickQuestion {
                icon: "🃏",
                label: "Create flashcards",
                prompt: "Create flashcards from the key concepts in my notes.",
                tooltip: "Generate flashcards for active recall practice",
            },
            QuickQuestion {
                icon: "❓",
                label: "Practice questions",
                prompt: "Generate practice questions based on my study notes.",
                tooltip: "Create questions to test your understanding",
            },
            QuickQuestion {
                icon: "📊",
                label: "Quiz me",
                prompt: "Create a quiz to test my understanding of these notes.",
                tooltip: "Interactive quiz with immediate feedback",
            },
        ],
    },
    QuickQuestionCategory {
        key: "analysis",
        title: "💡 Analysis & Understanding",
        description: "Deepen your comprehension of the material",
        questions: &[
            QuickQuestion {
                icon: "💡",
                label: "Explain concepts",
                prompt: "Explain the key concepts from my study notes in simple terms.",
                tooltip: "Break down complex ideas into understandable explanations",
            },
            QuickQuestion {
                icon: "🔗",
                label: "Find connections",
                prompt: "What are the connections between different concepts in my notes?",
                tooltip: "Discover relationships and patterns in the material",
            },
            QuickQuestion {
                icon: "🤔",
                label: "Clarify topics",
                prompt: "Help me clarify any confusing topics from my notes.",
                tooltip: "Get help with difficult or unclear concepts",
            },
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn styles(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_photosynthesis_prompt_contains_notes_question_and_directive() {
        let prompt = build_qna_prompt(
            "Photosynthesis converts light to energy.",
            "What is photosynthesis?",
            &styles(&["Bullet Points"]),
            3,
        );
        assert!(prompt.contains("Photosynthesis converts light to energy."));
        assert!(prompt.contains("What is photosynthesis?"));
        assert!(prompt.contains("Prefer style: Bullet Points. Detail level: 3."));
        assert!(prompt.contains("avoid fabricating content"));
    }

    #[test]
    fn test_empty_inputs_yield_template_with_empty_sections() {
        let prompt = build_qna_prompt("", "", &[], DEFAULT_DEPTH);
        assert!(prompt.starts_with(QNA_INSTRUCTION));
        assert!(prompt.contains("Prefer style: Bullet Points. Detail level: 3."));
        assert!(prompt.ends_with("Study Notes:\n\n\nQuestion:\n"));
    }

    #[test]
    fn test_multiple_styles_are_joined() {
        let prompt = build_qna_prompt("n", "q", &styles(&["Numbered", " ", "Flashcards"]), 2);
        assert!(prompt.contains("Prefer style: Numbered, Flashcards. Detail level: 2."));
    }

    #[test]
    fn test_question_and_notes_are_trimmed() {
        let prompt = build_qna_prompt("  notes \n", "  why?  ", &[], 3);
        assert!(prompt.contains("Study Notes:\nnotes\n\nQuestion:\nwhy?"));
    }

    #[test]
    fn test_depth_is_clamped() {
        assert_eq!(clamp_depth(0), MIN_DEPTH);
        assert_eq!(clamp_depth(9), MAX_DEPTH);
        assert!(build_qna_prompt("n", "q", &[], 42).contains("Detail level: 5."));
    }

    #[test]
    fn test_builder_is_deterministic() {
        let s = styles(&["Outline"]);
        assert_eq!(
            build_qna_prompt("notes", "q", &s, 4),
            build_qna_prompt("notes", "q", &s, 4)
        );
    }

    #[test]
    fn test_quick_question_catalog_is_complete() {
        assert_eq!(QUICK_QUESTIONS.len(), 3);
        for category in QUICK_QUESTIONS {
            assert_eq!(category.questions.len(), 3, "{}", category.key);
            assert!(category.questions.iter().all(|q| !q.prompt.is_empty()));
        }
    }
}
