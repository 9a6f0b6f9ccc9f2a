use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use crate::db::Db;
use crate::error::{ApiError, ApiResult};
use crate::models::id_string;
use crate::util::now_millis;

pub const MEMBER_TABLE: &str = "member";

/// Shown for members who have not had a photo uploaded. Lives with the
/// static site assets, so storage must never try to delete it.
pub const PLACEHOLDER_IMAGE: &str = "/images/member-placeholder.png";

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum MemberCategory {
    Patron,
    #[serde(rename = "Core Team")]
    CoreTeam,
    #[serde(rename = "Vice President")]
    VicePresident,
}

impl MemberCategory {
    pub const ALL: [MemberCategory; 3] = [
        MemberCategory::Patron,
        MemberCategory::CoreTeam,
        MemberCategory::VicePresident,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MemberCategory::Patron => "Patron",
            MemberCategory::CoreTeam => "Core Team",
            MemberCategory::VicePresident => "Vice President",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MemberDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    pub position: String,
    pub category: MemberCategory,
    pub image: String,
    pub fallback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
    pub sort_order: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// The ID of the member
    pub id: String,
    /// The member's full name
    pub name: String,
    /// The role shown under the name, e.g. "President"
    pub position: String,
    /// Which board grouping the member is listed under
    pub category: MemberCategory,
    /// A photo of the member, or the shared placeholder
    pub image: String,
    /// Initials rendered when the photo fails to load
    pub fallback: String,
    /// A short biography
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Notable achievements, in display order
    pub achievements: Vec<String>,
    /// Position within the member's category, lowest first
    #[serde(rename = "order")]
    pub sort_order: i64,
}

/// The initials fallback shown in place of a missing photo, computed from
/// the member's name and capped at three characters.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(3)
        .flat_map(char::to_uppercase)
        .collect()
}

impl MemberDocument {
    pub fn into_member(self) -> Member {
        Member {
            id: id_string(&self.id),
            name: self.name,
            position: self.position,
            category: self.category,
            image: self.image,
            fallback: self.fallback,
            bio: self.bio,
            achievements: self.achievements,
            sort_order: self.sort_order,
        }
    }

    pub async fn all(db: &Db) -> ApiResult<Vec<Self>> {
        let mut response = db
            .query("SELECT * FROM member ORDER BY category, sort_order, created_at")
            .await
            .map_err(ApiError::from)?;
        response.take(0).map_err(ApiError::from)
    }

    pub async fn with_id(id: &str, db: &Db) -> ApiResult<Option<Self>> {
        db.select((MEMBER_TABLE, id)).await.map_err(ApiError::from)
    }

    /// The order slot after the last member of the given category.
    pub async fn next_order_in(category: MemberCategory, db: &Db) -> ApiResult<i64> {
        let mut response = db
            .query("SELECT VALUE sort_order FROM member WHERE category = $category")
            .bind(("category", category))
            .await
            .map_err(ApiError::from)?;
        let orders: Vec<i64> = response.take(0).map_err(ApiError::from)?;

        Ok(orders.into_iter().max().map(|order| order + 1).unwrap_or(0))
    }

    pub async fn create(self, db: &Db) -> ApiResult<Self> {
        let created: Option<Self> = db
            .create(MEMBER_TABLE)
            .content(self)
            .await
            .map_err(ApiError::from)?;
        created.ok_or_else(|| ApiError::Database("member was not created".to_owned()))
    }

    pub async fn update(id: &str, mut updated: Self, db: &Db) -> ApiResult<Option<Self>> {
        updated.id = None;
        updated.updated_at = now_millis();
        db.update((MEMBER_TABLE, id))
            .content(updated)
            .await
            .map_err(ApiError::from)
    }

    pub async fn delete(id: &str, db: &Db) -> ApiResult<Option<Self>> {
        db.delete((MEMBER_TABLE, id)).await.map_err(ApiError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Db {
        let db = surrealdb::engine::any::connect("mem://").await.unwrap();
        db.use_ns("test").use_db("test").await.unwrap();
        db
    }

    fn sample_member(name: &str, category: MemberCategory, sort_order: i64) -> MemberDocument {
        MemberDocument {
            id: None,
            name: name.to_owned(),
            position: "Trustee".to_owned(),
            category,
            image: PLACEHOLDER_IMAGE.to_owned(),
            fallback: initials(name),
            bio: None,
            achievements: vec![],
            sort_order,
            created_at: now_millis(),
            updated_at: now_millis(),
        }
    }

    #[test]
    fn initials_cap_at_three_characters() {
        assert_eq!(initials("Asha Rao"), "AR");
        assert_eq!(initials("Anil Kumar Verma Gupta"), "AKV");
        assert_eq!(initials("single"), "S");
        assert_eq!(initials(""), "");
    }

    #[test]
    fn category_parses_display_names() {
        assert_eq!(
            MemberCategory::parse("Core Team"),
            Some(MemberCategory::CoreTeam)
        );
        assert_eq!(
            MemberCategory::parse("Vice President"),
            Some(MemberCategory::VicePresident)
        );
        assert_eq!(MemberCategory::parse("CoreTeam"), None);
    }

    #[test]
    fn view_model_exposes_order_under_its_public_name() {
        let member = sample_member("Asha Rao", MemberCategory::Patron, 4).into_member();
        let json = serde_json::to_value(&member).unwrap();
        assert_eq!(json["order"], 4);
        assert_eq!(json["fallback"], "AR");
        assert!(json.get("createdAt").is_none());
    }

    #[tokio::test]
    async fn next_order_appends_to_the_category() {
        let db = test_db().await;
        sample_member("First Patron", MemberCategory::Patron, 0)
            .create(&db)
            .await
            .unwrap();
        sample_member("Second Patron", MemberCategory::Patron, 1)
            .create(&db)
            .await
            .unwrap();
        sample_member("A Vice President", MemberCategory::VicePresident, 7)
            .create(&db)
            .await
            .unwrap();

        assert_eq!(
            MemberDocument::next_order_in(MemberCategory::Patron, &db)
                .await
                .unwrap(),
            2
        );
        // other categories are not affected by patron ordering
        assert_eq!(
            MemberDocument::next_order_in(MemberCategory::VicePresident, &db)
                .await
                .unwrap(),
            8
        );
        assert_eq!(
            MemberDocument::next_order_in(MemberCategory::CoreTeam, &db)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn missing_ids_come_back_as_none() {
        let db = test_db().await;
        assert!(MemberDocument::with_id("not-an-id", &db)
            .await
            .unwrap()
            .is_none());
    }
}
