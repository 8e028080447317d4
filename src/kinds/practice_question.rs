//! `practice_question`: one multiple-choice question themed on an interest.
//!
//! Parameters: `subject` (text), `interests` (list), `gradeLevel` (text).

use std::sync::Arc;

use serde_json::json;

use super::ContentKind;
use crate::fallback::{Synthesizer, display_text, fill, pick_index, primary_text, seed};
use crate::schema::{ArrayLength, FieldType, Schema};
use crate::types::Parameters;

pub const NAME: &str = "practice_question";

/// The `practice_question` kind.
pub fn practice_question() -> Arc<ContentKind> {
    Arc::new(ContentKind::new(NAME, schema(), PracticeQuestionSynthesizer))
}

fn schema() -> Schema {
    Schema::new()
        .required("question", FieldType::String)
        .required(
            "options",
            FieldType::array_of(FieldType::String).length(ArrayLength::Exact(4)),
        )
        .required("correctAnswer", FieldType::String)
        .required("explanation", FieldType::String)
        .optional("hint", FieldType::String)
}

struct Template {
    question: &'static str,
    options: [&'static str; 4],
    answer: usize,
    explanation: &'static str,
}

static MATH: &[Template] = &[
    Template {
        question: "A {interest} club has 24 members and splits them evenly into 4 groups. How many members are in each group?",
        options: ["4", "6", "8", "20"],
        answer: 1,
        explanation: "Dividing 24 members into 4 equal groups gives 24 ÷ 4 = 6 members per group.",
    },
    Template {
        question: "You spend 15 minutes on {interest} each day. How many minutes is that over one week?",
        options: ["75", "90", "105", "120"],
        answer: 2,
        explanation: "A week has 7 days, so 15 × 7 = 105 minutes.",
    },
    Template {
        question: "A {interest} event sold 3/4 of its 80 tickets. How many tickets were sold?",
        options: ["20", "40", "60", "75"],
        answer: 2,
        explanation: "3/4 of 80 is 80 ÷ 4 × 3 = 60 tickets.",
    },
];

static SCIENCE: &[Template] = &[
    Template {
        question: "While doing {interest} outside on a hot day, you sweat. What is the main purpose of sweating?",
        options: [
            "To cool the body",
            "To build muscle",
            "To digest food",
            "To store energy",
        ],
        answer: 0,
        explanation: "Sweat evaporates from the skin and carries heat away, cooling the body.",
    },
    Template {
        question: "Which form of energy powers most equipment used for {interest} that plugs into a wall?",
        options: ["Chemical", "Electrical", "Nuclear", "Sound"],
        answer: 1,
        explanation: "Wall outlets supply electrical energy, which devices convert into other forms.",
    },
];

static ENGLISH: &[Template] = &[
    Template {
        question: "Which sentence about {interest} uses correct punctuation?",
        options: [
            "I love {interest} it is fun.",
            "I love {interest}, it is fun.",
            "I love {interest}; it is fun.",
            "I love {interest} it, is fun.",
        ],
        answer: 2,
        explanation: "A semicolon correctly joins two related independent clauses.",
    },
    Template {
        question: "In a story about {interest}, what is the climax?",
        options: [
            "The introduction of characters",
            "The turning point of the conflict",
            "The list of sources",
            "The title of the story",
        ],
        answer: 1,
        explanation: "The climax is the point of highest tension, where the conflict turns.",
    },
];

static HISTORY: &[Template] = &[Template {
    question: "Historians studying the origins of {interest} would most likely use which kind of source first?",
    options: [
        "A primary source from the time",
        "A recent video game",
        "A weather forecast",
        "A random guess",
    ],
    answer: 0,
    explanation: "Primary sources were created at the time being studied and give first-hand evidence.",
}];

static GENERAL: &[Template] = &[Template {
    question: "You want to get better at {interest}. Which plan is most likely to help?",
    options: [
        "Practice a little every day and track progress",
        "Practice once a year",
        "Only watch others do it",
        "Avoid asking for feedback",
    ],
    answer: 0,
    explanation: "Regular practice with feedback and tracked progress is the most reliable way to improve.",
}];

/// Template table for a normalized subject.
fn templates_for(subject: Option<&str>) -> &'static [Template] {
    match subject {
        Some("math" | "mathematics" | "algebra" | "geometry" | "arithmetic") => MATH,
        Some("science" | "biology" | "chemistry" | "physics" | "earth science") => SCIENCE,
        Some("english" | "ela" | "language arts" | "reading" | "writing") => ENGLISH,
        Some("history" | "social studies" | "civics") => HISTORY,
        _ => GENERAL,
    }
}

struct PracticeQuestionSynthesizer;

impl Synthesizer for PracticeQuestionSynthesizer {
    fn synthesize(&self, parameters: &Parameters) -> serde_json::Value {
        let subject = primary_text(parameters, "subject");
        let interest = primary_text(parameters, "interests")
            .unwrap_or_else(|| "your favorite hobby".to_string());
        let grade = display_text(parameters, "gradeLevel");

        let table = templates_for(subject.as_deref());
        let template = &table[pick_index(table.len(), &seed(parameters, NAME))];
        let vars = [("interest", interest.as_str())];

        let options: Vec<String> = template.options.iter().map(|o| fill(o, &vars)).collect();
        let correct = options[template.answer].clone();
        let hint = match &grade {
            Some(grade) => format!("Think about what you learned in {grade} and read every option."),
            None => "Read every option before choosing.".to_string(),
        };

        json!({
            "question": fill(template.question, &vars),
            "options": options,
            "correctAnswer": correct,
            "explanation": template.explanation,
            "hint": hint,
        })
    }
}
