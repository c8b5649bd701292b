//! Curated knowledge base about the two supported colleges.
//!
//! Content is loaded from JSON files under the configured data directory:
//! `<dir>/<college>/general-info.json`, `<dir>/<college>/tuition-fees.json`
//! and a shared `<dir>/common-questions.json`. Missing or malformed files
//! degrade to `None` with a log line; the chat feature works without them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Colleges the knowledge base knows about (directory names)
pub const KNOWN_COLLEGES: &[&str] = &["middle_east_college", "sohar_university"];

/// A name in both supported languages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalizedName {
    pub ar: String,
    pub en: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollegeLocation {
    pub city: String,
    pub address: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollegeContact {
    pub phone: String,
    pub email: String,
    pub website: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollegeAbout {
    pub brief: String,
    #[serde(default)]
    pub vision: String,
    #[serde(default)]
    pub mission: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// General information about a college
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollegeInfo {
    pub name: LocalizedName,
    pub location: CollegeLocation,
    pub contact: CollegeContact,
    pub about: CollegeAbout,
    /// Program catalogues vary per college; kept as free-form JSON
    #[serde(default)]
    pub programs: serde_json::Value,
}

/// Tuition-fee tables; the per-program shapes vary, kept as free-form JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuitionFees {
    #[serde(default)]
    pub undergraduate: serde_json::Value,
    #[serde(default)]
    pub postgraduate: serde_json::Value,
    #[serde(default)]
    pub additional_fees: serde_json::Value,
    #[serde(default)]
    pub scholarships: serde_json::Value,
}

/// One FAQ entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

/// FAQ entries grouped by section (general, per-college, admission, ...)
pub type CommonQuestions = BTreeMap<String, Vec<Faq>>;

/// Loader for the curated college content
#[derive(Debug, Clone)]
pub struct CollegeKb {
    data_dir: PathBuf,
}

impl CollegeKb {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The colleges this knowledge base covers
    pub fn list(&self) -> &'static [&'static str] {
        KNOWN_COLLEGES
    }

    pub fn is_known(&self, college: &str) -> bool {
        KNOWN_COLLEGES.contains(&college)
    }

    /// Loads a college's general information
    pub fn general_info(&self, college: &str) -> Option<CollegeInfo> {
        if !self.is_known(college) {
            return None;
        }
        self.load_json(&self.data_dir.join(college).join("general-info.json"))
    }

    /// Loads a college's tuition fees
    pub fn tuition_fees(&self, college: &str) -> Option<TuitionFees> {
        if !self.is_known(college) {
            return None;
        }
        self.load_json(&self.data_dir.join(college).join("tuition-fees.json"))
    }

    /// Loads the shared FAQ file
    pub fn common_questions(&self) -> Option<CommonQuestions> {
        self.load_json(&self.data_dir.join("common-questions.json"))
    }

    fn load_json<T: serde::de::DeserializeOwned>(&self, path: &Path) -> Option<T> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("College data file {} unavailable: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("College data file {} malformed: {}", path.display(), e);
                None
            }
        }
    }

    /// Picks curated context to inject into the chat system prompt when the
    /// question mentions one of the known colleges, in either language.
    pub fn context_for(&self, question: &str) -> Option<String> {
        let lowered = question.to_lowercase();
        let mut mentioned: Vec<&str> = Vec::new();

        if lowered.contains("middle east")
            || lowered.contains("mec")
            || question.contains("الشرق الأوسط")
        {
            mentioned.push("middle_east_college");
        }
        if lowered.contains("sohar") || question.contains("صحار") {
            mentioned.push("sohar_university");
        }

        if mentioned.is_empty() {
            return None;
        }

        let mut context = String::new();
        for college in &mentioned {
            if let Some(info) = self.general_info(college) {
                context.push_str(&format!(
                    "{} ({}), {}: {}\nContact: {} / {}\n",
                    info.name.en,
                    info.name.ar,
                    info.location.city,
                    info.about.brief,
                    info.contact.phone,
                    info.contact.website,
                ));
            }
        }

        if let Some(faqs) = self.common_questions() {
            for college in &mentioned {
                if let Some(entries) = faqs.get(*college) {
                    for faq in entries.iter().take(5) {
                        context.push_str(&format!("Q: {}\nA: {}\n", faq.question, faq.answer));
                    }
                }
            }
        }

        if context.is_empty() {
            None
        } else {
            Some(context)
        }
    }
}
