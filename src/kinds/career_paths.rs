//! `career_paths`: at least three careers matched to a student's interests.
//!
//! Parameters: `interests` (list), `gradeLevel` (text).

use std::sync::Arc;

use serde_json::{Value, json};

use super::ContentKind;
use crate::fallback::{Synthesizer, display_text, pick_index, seed, sorted_texts};
use crate::schema::{ArrayLength, FieldType, Schema};
use crate::types::Parameters;

pub const NAME: &str = "career_paths";

const MIN_CAREERS: usize = 3;

/// The `career_paths` kind.
pub fn career_paths() -> Arc<ContentKind> {
    Arc::new(ContentKind::new(NAME, schema(), CareerPathsSynthesizer))
}

fn schema() -> Schema {
    let career = Schema::new()
        .required("title", FieldType::String)
        .required("description", FieldType::String)
        .required(
            "skills",
            FieldType::array_of(FieldType::String).length(ArrayLength::AtLeast(1)),
        );
    Schema::new()
        .optional("intro", FieldType::String)
        .required(
            "careers",
            FieldType::array_of(FieldType::Object(career))
                .length(ArrayLength::AtLeast(MIN_CAREERS)),
        )
}

struct Career {
    title: &'static str,
    description: &'static str,
    skills: &'static [&'static str],
}

static SPORTS: &[Career] = &[
    Career {
        title: "Athletic Trainer",
        description: "Helps athletes prevent and recover from injuries.",
        skills: &["anatomy", "first aid", "communication"],
    },
    Career {
        title: "Sports Analyst",
        description: "Uses game data to explain performance and guide strategy.",
        skills: &["statistics", "critical thinking"],
    },
    Career {
        title: "Physical Therapist",
        description: "Guides patients through exercises that restore movement.",
        skills: &["biology", "patience", "motivation"],
    },
    Career {
        title: "Coach",
        description: "Teaches skills and builds teamwork on and off the field.",
        skills: &["leadership", "planning"],
    },
];

static MUSIC: &[Career] = &[
    Career {
        title: "Sound Engineer",
        description: "Records, mixes and balances audio for music and film.",
        skills: &["acoustics", "attention to detail"],
    },
    Career {
        title: "Music Teacher",
        description: "Teaches students to play, read and appreciate music.",
        skills: &["musicianship", "patience"],
    },
    Career {
        title: "Music Therapist",
        description: "Uses music to support people's health and well-being.",
        skills: &["psychology", "empathy", "musicianship"],
    },
];

static ART: &[Career] = &[
    Career {
        title: "Graphic Designer",
        description: "Creates visuals for brands, websites and print.",
        skills: &["design software", "typography"],
    },
    Career {
        title: "Animator",
        description: "Brings characters and stories to life frame by frame.",
        skills: &["drawing", "storytelling"],
    },
    Career {
        title: "Architect",
        description: "Designs buildings that are useful, safe and beautiful.",
        skills: &["geometry", "drafting", "creativity"],
    },
];

static TECHNOLOGY: &[Career] = &[
    Career {
        title: "Software Developer",
        description: "Writes and tests the programs people use every day.",
        skills: &["programming", "problem solving"],
    },
    Career {
        title: "Game Designer",
        description: "Plans the rules, levels and stories that make games fun.",
        skills: &["creativity", "logic", "teamwork"],
    },
    Career {
        title: "Cybersecurity Analyst",
        description: "Protects computer systems from attacks.",
        skills: &["networking", "attention to detail"],
    },
    Career {
        title: "Data Scientist",
        description: "Finds patterns in data to answer real questions.",
        skills: &["statistics", "programming"],
    },
];

static ANIMALS: &[Career] = &[
    Career {
        title: "Veterinarian",
        description: "Diagnoses and treats illness in animals.",
        skills: &["biology", "compassion"],
    },
    Career {
        title: "Wildlife Biologist",
        description: "Studies animals in their natural habitats.",
        skills: &["field research", "ecology"],
    },
    Career {
        title: "Zookeeper",
        description: "Cares for animals and teaches visitors about them.",
        skills: &["animal care", "communication"],
    },
];

static SCIENCE: &[Career] = &[
    Career {
        title: "Research Scientist",
        description: "Designs experiments to answer open questions.",
        skills: &["scientific method", "curiosity"],
    },
    Career {
        title: "Environmental Engineer",
        description: "Develops solutions to protect air, water and land.",
        skills: &["chemistry", "problem solving"],
    },
    Career {
        title: "Lab Technician",
        description: "Runs tests and keeps laboratory work accurate.",
        skills: &["precision", "safety procedures"],
    },
];

static GENERIC: &[Career] = &[
    Career {
        title: "Teacher",
        description: "Helps students learn and grow in a subject they love.",
        skills: &["communication", "patience"],
    },
    Career {
        title: "Entrepreneur",
        description: "Starts and runs a business around a new idea.",
        skills: &["initiative", "budgeting"],
    },
    Career {
        title: "Project Manager",
        description: "Keeps teams organized and projects on schedule.",
        skills: &["organization", "leadership"],
    },
    Career {
        title: "Nurse",
        description: "Cares for patients and supports their recovery.",
        skills: &["biology", "empathy"],
    },
];

fn careers_for(interest: &str) -> &'static [Career] {
    match interest {
        "sports" | "soccer" | "basketball" | "football" | "baseball" | "running" | "swimming" => {
            SPORTS
        }
        "music" | "singing" | "guitar" | "piano" | "band" => MUSIC,
        "art" | "drawing" | "painting" | "design" | "photography" => ART,
        "gaming" | "video games" | "coding" | "computers" | "programming" | "technology" => {
            TECHNOLOGY
        }
        "animals" | "pets" | "nature" => ANIMALS,
        "science" | "space" | "chemistry" | "biology" | "experiments" => SCIENCE,
        _ => GENERIC,
    }
}

/// Up to `MIN_CAREERS` distinct careers: one per interest in turn, each table
/// read from a hash-chosen offset, topped up from the generic table.
fn select(interests: &[String], seed: &str) -> Vec<&'static Career> {
    fn push(career: &'static Career, picked: &mut Vec<&'static Career>) {
        if picked.len() < MIN_CAREERS && !picked.iter().any(|c| c.title == career.title) {
            picked.push(career);
        }
    }

    let mut picked: Vec<&'static Career> = Vec::with_capacity(MIN_CAREERS);

    let tables: Vec<&'static [Career]> = interests.iter().map(|i| careers_for(i)).collect();
    let offsets: Vec<usize> = tables
        .iter()
        .enumerate()
        .map(|(i, table)| pick_index(table.len(), &format!("{seed}:{i}")))
        .collect();
    let longest = tables.iter().map(|t| t.len()).max().unwrap_or(0);

    for round in 0..longest {
        for (table, offset) in tables.iter().zip(&offsets) {
            if round < table.len() {
                push(&table[(offset + round) % table.len()], &mut picked);
            }
        }
    }
    let offset = pick_index(GENERIC.len(), seed);
    for round in 0..GENERIC.len() {
        push(&GENERIC[(offset + round) % GENERIC.len()], &mut picked);
    }
    picked
}

struct CareerPathsSynthesizer;

impl Synthesizer for CareerPathsSynthesizer {
    fn synthesize(&self, parameters: &Parameters) -> Value {
        let interests = sorted_texts(parameters, "interests");
        let careers: Vec<Value> = select(&interests, &seed(parameters, NAME))
            .into_iter()
            .map(|career| {
                json!({
                    "title": career.title,
                    "description": career.description,
                    "skills": career.skills,
                })
            })
            .collect();

        let intro = match (interests.is_empty(), display_text(parameters, "gradeLevel")) {
            (false, Some(grade)) => format!(
                "Careers connected to {} that a {grade} student can start exploring now.",
                interests.join(", ")
            ),
            (false, None) => format!("Careers connected to {}.", interests.join(", ")),
            (true, _) => "A few careers worth exploring.".to_string(),
        };

        json!({
            "intro": intro,
            "careers": careers,
        })
    }
}
