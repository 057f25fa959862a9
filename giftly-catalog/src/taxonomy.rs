//! Categories and the subcategories filed under them.
//!
//! Names are the keys: products and subcategories refer to a category by its
//! name, and names compare case-insensitively.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_NAME_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCategory {
    pub id: Uuid,
    /// Name of the parent category
    pub category: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubCategoryDraft {
    pub category: String,
    pub name: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TaxonomyError {
    #[error("{0} name is required")]
    EmptyName(&'static str),

    #[error("{0} name must be at most {MAX_NAME_LEN} characters")]
    NameTooLong(&'static str),
}

impl Category {
    pub fn from_draft(draft: CategoryDraft) -> Result<Self, TaxonomyError> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name: clean_name("Category", &draft.name)?,
            created_at: now,
            updated_at: now,
        })
    }
}

impl SubCategory {
    pub fn from_draft(draft: SubCategoryDraft) -> Result<Self, TaxonomyError> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            category: clean_name("Category", &draft.category)?,
            name: clean_name("Subcategory", &draft.name)?,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn belongs_to(&self, category: &str) -> bool {
        same_name(&self.category, category)
    }
}

pub fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn clean_name(kind: &'static str, raw: &str) -> Result<String, TaxonomyError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(TaxonomyError::EmptyName(kind));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(TaxonomyError::NameTooLong(kind));
    }
    Ok(name.to_string())
}
