//! Tag vocabularies. The single source of truth for which tags a prompt may
//! carry, shared by the generator's instruction text and its output filter.

use std::sync::Arc;

use crate::CoreError;

/// Categories the metadata generator may assign.
pub const EDUCATION_TAGS: &[&str] = &[
    "Lesson Planning",
    "Assessment Creation",
    "Differentiation",
    "Parent Communication",
    "Student Feedback",
    "Classroom Management",
    "Professional Development",
    "Content Explanation",
    "Curriculum Planning",
    "Writing Assistance",
    "Discussion Facilitation",
    "Grading & Rubrics",
];

pub const EDUCATION_FALLBACK: &str = "Professional Development";

/// Labels used by the browse sidebar.
pub const CATALOG_TAGS: &[&str] = &[
    "AI Literacy",
    "AP History",
    "AP Science",
    "AP Seminar",
    "Assessment",
    "College & Career",
    "Communications",
    "Curriculum Alignment",
    "Data & Intervention",
    "Debate",
    "Development & Grants",
    "Differentiation & SPED",
    "ELA",
    "Elementary (3-5)",
    "Engineering",
    "Events & Meetings",
    "Feedback & Coaching",
    "HR & Talent",
    "High School (9-12)",
    "IT & Tech Support",
    "Inquiry-Based",
    "Intellectual Prep",
    "Leadership & Strategy",
    "Lesson Planning",
    "Math",
    "Middle School (6-8)",
    "Multi-Grade",
    "NYS Test Prep",
    "Other",
    "Personal/Non-Work",
    "PreK-2",
    "Primary Sources",
    "Science",
    "Social Studies",
    "Student Services",
];

pub const CATALOG_FALLBACK: &str = "Other";

#[derive(Debug)]
struct Entry {
    label: String,
    folded: String,
}

/// An ordered, immutable set of tag labels with one designated fallback.
///
/// Lookups are exact after case folding. Clones share storage.
#[derive(Debug, Clone)]
pub struct TagVocabulary {
    entries: Arc<[Entry]>,
    fallback: usize,
}

impl TagVocabulary {
    pub fn new<I, S>(tags: I, fallback: &str) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries: Vec<Entry> = Vec::new();
        for tag in tags {
            let label = tag.into();
            if label.trim().is_empty() {
                return Err(CoreError::InvalidVocabulary(
                    "tags must not be blank".to_string(),
                ));
            }
            let folded = label.to_lowercase();
            if entries.iter().any(|e| e.folded == folded) {
                return Err(CoreError::InvalidVocabulary(format!(
                    "duplicate tag \"{label}\""
                )));
            }
            entries.push(Entry { label, folded });
        }

        if entries.is_empty() {
            return Err(CoreError::InvalidVocabulary(
                "at least one tag is required".to_string(),
            ));
        }

        let folded_fallback = fallback.to_lowercase();
        let fallback = entries
            .iter()
            .position(|e| e.folded == folded_fallback)
            .ok_or_else(|| {
                CoreError::InvalidVocabulary(format!(
                    "fallback tag \"{fallback}\" is not in the vocabulary"
                ))
            })?;

        Ok(Self {
            entries: entries.into(),
            fallback,
        })
    }

    /// The vocabulary the metadata generator assigns from.
    pub fn education() -> Self {
        Self::from_static(EDUCATION_TAGS, EDUCATION_FALLBACK)
    }

    /// The broader browse catalog.
    pub fn catalog() -> Self {
        Self::from_static(CATALOG_TAGS, CATALOG_FALLBACK)
    }

    /// Look up a built-in vocabulary by its deploy-time name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "education" => Some(Self::education()),
            "catalog" => Some(Self::catalog()),
            _ => None,
        }
    }

    // Built-in lists are checked by the tests below.
    fn from_static(tags: &[&str], fallback: &str) -> Self {
        let entries: Vec<Entry> = tags
            .iter()
            .map(|t| Entry {
                label: t.to_string(),
                folded: t.to_lowercase(),
            })
            .collect();
        let fallback = tags.iter().position(|t| *t == fallback).unwrap_or(0);
        Self {
            entries: entries.into(),
            fallback,
        }
    }

    /// Return the vocabulary's spelling of `tag`, if it is a member.
    pub fn canonical(&self, tag: &str) -> Option<&str> {
        let folded = tag.to_lowercase();
        self.entries
            .iter()
            .find(|e| e.folded == folded)
            .map(|e| e.label.as_str())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.canonical(tag).is_some()
    }

    pub fn fallback(&self) -> &str {
        &self.entries[self.fallback].label
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TagVocabulary {
    fn default() -> Self {
        Self::education()
    }
}
