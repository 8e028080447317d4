//! `key_points`: a title, exactly three key points, and a summary.
//!
//! Parameters: `topic` (text), optional `audience` (text).

use std::sync::Arc;

use serde_json::json;

use super::ContentKind;
use crate::fallback::{Synthesizer, display_text, fill, pick_index, primary_text, seed};
use crate::schema::{ArrayLength, FieldType, Schema};
use crate::types::Parameters;

pub const NAME: &str = "key_points";

/// The `key_points` kind.
pub fn key_points() -> Arc<ContentKind> {
    Arc::new(ContentKind::new(NAME, schema(), KeyPointsSynthesizer))
}

fn schema() -> Schema {
    Schema::new()
        .required("title", FieldType::String)
        .required(
            "keyPoints",
            FieldType::array_of(FieldType::String).length(ArrayLength::Exact(3)),
        )
        .required("summary", FieldType::String)
}

struct Entry {
    points: [&'static str; 3],
    summary: &'static str,
}

static COLLEGE: Entry = Entry {
    points: [
        "Start researching schools early and note each one's deadlines.",
        "Strong coursework matters more than a long list of activities.",
        "Ask teachers for recommendation letters well before they are due.",
    ],
    summary: "Planning ahead turns {topic} from a scramble into a series of small, manageable steps.",
};

static FINANCIAL_AID: Entry = Entry {
    points: [
        "File the FAFSA as soon as it opens each year.",
        "Scholarships come from schools, employers and local groups, so look widely.",
        "Compare the net price of each offer, not just the sticker price.",
    ],
    summary: "Understanding {topic} early can make a big difference in what school really costs.",
};

static STUDY_SKILLS: Entry = Entry {
    points: [
        "Short, spaced study sessions beat last-minute cramming.",
        "Testing yourself is more effective than rereading notes.",
        "A consistent place and time to study builds a lasting habit.",
    ],
    summary: "Small, consistent habits are the foundation of effective {topic}.",
};

static GENERIC: &[Entry] = &[
    Entry {
        points: [
            "Begin with the core ideas before moving on to the details.",
            "Connect new information to something you already know.",
            "Review what you learned a few days later to make it stick.",
        ],
        summary: "A steady, step-by-step approach is the best way to understand {topic}.",
    },
    Entry {
        points: [
            "Identify the main question {topic} tries to answer.",
            "Look at real examples to see the ideas in action.",
            "Explain it to someone else to check your understanding.",
        ],
        summary: "Exploring {topic} through questions and examples builds real understanding.",
    },
];

fn entry_for(topic: Option<&str>, seed: &str) -> &'static Entry {
    match topic {
        Some("college" | "college admissions" | "admissions" | "college applications") => &COLLEGE,
        Some("financial aid" | "scholarships" | "fafsa" | "paying for college") => &FINANCIAL_AID,
        Some("study skills" | "studying" | "study habits" | "test prep") => &STUDY_SKILLS,
        _ => &GENERIC[pick_index(GENERIC.len(), seed)],
    }
}

struct KeyPointsSynthesizer;

impl Synthesizer for KeyPointsSynthesizer {
    fn synthesize(&self, parameters: &Parameters) -> serde_json::Value {
        let topic = primary_text(parameters, "topic");
        let display = display_text(parameters, "topic").unwrap_or_else(|| "this topic".to_string());
        let entry = entry_for(topic.as_deref(), &seed(parameters, NAME));
        let vars = [("topic", display.as_str())];

        let title = match display_text(parameters, "audience") {
            Some(audience) => format!("Key points about {display} for {audience}"),
            None => format!("Key points about {display}"),
        };
        let points: Vec<String> = entry.points.iter().map(|p| fill(p, &vars)).collect();

        json!({
            "title": title,
            "keyPoints": points,
            "summary": fill(entry.summary, &vars),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validate;
    use crate::types::ParamValue;

    fn params(topic: &str) -> Parameters {
        let mut params = Parameters::new();
        params.insert("topic".into(), ParamValue::from(topic));
        params
    }

    #[test]
    fn known_topic_uses_its_entry() {
        let value = KeyPointsSynthesizer.synthesize(&params("  Financial   Aid "));
        assert_eq!(value["keyPoints"][0], FINANCIAL_AID.points[0]);
        assert_eq!(value["title"], "Key points about Financial   Aid");
    }

    #[test]
    fn missing_topic_is_still_valid() {
        let value = KeyPointsSynthesizer.synthesize(&Parameters::new());
        assert!(validate(value, &schema()).is_ok());
    }
}
