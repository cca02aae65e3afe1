use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subjects offered by the capture screen. The list is a convention for the
/// host UI; `Question::subject` stays free text.
pub const SUBJECTS: [&str; 7] = [
    "Math",
    "Chinese",
    "English",
    "Physics",
    "Chemistry",
    "Biology",
    "Other",
];

/// A single recorded mistake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique, assigned at creation, immutable.
    pub id: String,
    pub title: String,
    pub subject: String,
    pub category: String,
    /// Opaque severity weight; 1-5 by convention, unvalidated.
    pub difficulty: i32,
    /// Opaque reference to the stored image; immutable once set.
    pub image_url: String,
    pub created_at: NaiveDate,
    /// Next reminder instant; absent means no reminder scheduled. Mutated
    /// only by the review scheduler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_date: Option<DateTime<Utc>>,
}

impl Question {
    pub fn new(
        title: impl Into<String>,
        subject: impl Into<String>,
        category: impl Into<String>,
        difficulty: i32,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            subject: subject.into(),
            category: category.into(),
            difficulty,
            image_url: image_url.into(),
            created_at: Local::now().date_naive(),
            review_date: None,
        }
    }

    /// A question is due once its review date is set and not after `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.review_date.is_some_and(|date| date <= now)
    }
}

/// First-run collection for a fresh install; the second sample ships with a
/// review date of "now" so the reminder path is exercised immediately.
pub(crate) fn seed_questions() -> Vec<Question> {
    vec![
        Question {
            id: "1".into(),
            title: "Trigonometric identities problem".into(),
            subject: "Math".into(),
            category: "Geometry".into(),
            difficulty: 4,
            image_url: "https://picsum.photos/seed/101/100/100".into(),
            created_at: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap_or_default(),
            review_date: None,
        },
        Question {
            id: "2".into(),
            title: "Cloze passage on the subjunctive".into(),
            subject: "English".into(),
            category: "Grammar".into(),
            difficulty: 3,
            image_url: "https://picsum.photos/seed/102/100/100".into(),
            created_at: NaiveDate::from_ymd_opt(2024, 5, 19).unwrap_or_default(),
            review_date: Some(Utc::now()),
        },
        Question {
            id: "3".into(),
            title: "Momentum conservation experiment".into(),
            subject: "Physics".into(),
            category: "Mechanics".into(),
            difficulty: 5,
            image_url: "https://picsum.photos/seed/103/100/100".into(),
            created_at: NaiveDate::from_ymd_opt(2024, 5, 18).unwrap_or_default(),
            review_date: None,
        },
    ]
}
