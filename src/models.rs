use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fixed set of activity tags a tracked session can carry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Study,
    Coding,
    Entertainment,
    Gaming,
    Music,
    Shopping,
    Break,
    Other,
}

#[derive(Debug, Error)]
#[error("Unknown category: {0}")]
pub struct CategoryParseError(pub String);

impl Category {
    /// All categories in picker order
    pub const ALL: [Category; 8] = [
        Category::Study,
        Category::Coding,
        Category::Entertainment,
        Category::Gaming,
        Category::Music,
        Category::Shopping,
        Category::Break,
        Category::Other,
    ];

    /// Identifier stored in the `tasks.category` column
    pub fn id(&self) -> &'static str {
        match self {
            Category::Study => "study",
            Category::Coding => "coding",
            Category::Entertainment => "entertainment",
            Category::Gaming => "gaming",
            Category::Music => "music",
            Category::Shopping => "shopping",
            Category::Break => "break",
            Category::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Study => "Study",
            Category::Coding => "Coding",
            Category::Entertainment => "Entertainment",
            Category::Gaming => "Gaming",
            Category::Music => "Music",
            Category::Shopping => "Shopping",
            Category::Break => "Break",
            Category::Other => "Other",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).unwrap_or(0)
    }

    /// Next category in picker order, wrapping around
    pub fn next(&self) -> Category {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous category in picker order, wrapping around
    pub fn previous(&self) -> Category {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.id() == s.trim())
            .ok_or_else(|| CategoryParseError(s.to_string()))
    }
}

/// A stored row of the `tasks` table: one closed, tracked interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub category: Category,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: i64, // seconds
    pub is_productive: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for the `tasks` table. `id` and `created_at` are assigned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub user_id: String,
    pub title: String,
    pub category: Category,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: i64,
    pub is_productive: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub study_goal: i64,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Name shown in the navigation bar
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
}

/// Handle returned by a successful sign-in. Every data call is made on behalf of one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub user: User,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Both fields must be filled in before anything is sent
    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

// Keep passwords out of logs and panic messages
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}
