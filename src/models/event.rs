use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use time::Date;

use crate::db::Db;
use crate::error::{ApiError, ApiResult};
use crate::models::{id_string, DATE_FORMAT};
use crate::util::{now_millis, today};

pub const EVENT_TABLE: &str = "event";

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum EventCategory {
    Community,
    Education,
    Health,
    Agriculture,
    National,
}

impl EventCategory {
    pub const ALL: [EventCategory; 5] = [
        EventCategory::Community,
        EventCategory::Education,
        EventCategory::Health,
        EventCategory::Agriculture,
        EventCategory::National,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Community => "Community",
            EventCategory::Education => "Education",
            EventCategory::Health => "Health",
            EventCategory::Agriculture => "Agriculture",
            EventCategory::National => "National",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLink {
    pub url: String,
    pub text: String,
}

/// The stored shape of an event. Dates are kept as ISO `YYYY-MM-DD`
/// strings so range queries order lexicographically.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub title: String,
    pub date: String,
    pub location: String,
    pub description: String,
    pub category: EventCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub additional_images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_link: Option<EventLink>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// What the website sees: the generated id flattened to a string, the
/// storage timestamps stripped.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// The ID of the event
    pub id: String,
    /// The name of the event
    pub title: String,
    /// The day the event takes place on
    pub date: Date,
    /// Where the event is held
    pub location: String,
    pub description: String,
    /// Which of the foundation's programs the event belongs to
    pub category: EventCategory,
    /// The main photo shown on event cards
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Extra gallery photos, in display order
    pub additional_images: Vec<String>,
    /// An optional external link (registration page, press coverage, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_link: Option<EventLink>,
}

impl EventDocument {
    pub fn into_event(self) -> Event {
        Event {
            id: id_string(&self.id),
            date: parse_stored_date(&self.date),
            title: self.title,
            location: self.location,
            description: self.description,
            category: self.category,
            image: self.image,
            additional_images: self.additional_images,
            additional_link: self.additional_link,
        }
    }

    /// Every file reference this event owns, for cascade deletion.
    pub fn image_references(&self) -> Vec<String> {
        let mut references: Vec<String> = self.image.iter().cloned().collect();
        references.extend(self.additional_images.iter().cloned());
        references
    }

    pub async fn all(db: &Db) -> ApiResult<Vec<Self>> {
        let mut response = db
            .query("SELECT * FROM event ORDER BY date DESC")
            .await
            .map_err(ApiError::from)?;
        response.take(0).map_err(ApiError::from)
    }

    pub async fn with_id(id: &str, db: &Db) -> ApiResult<Option<Self>> {
        db.select((EVENT_TABLE, id)).await.map_err(ApiError::from)
    }

    pub async fn upcoming(db: &Db) -> ApiResult<Vec<Self>> {
        let mut response = db
            .query("SELECT * FROM event WHERE date >= $today ORDER BY date ASC")
            .bind(("today", today_string()))
            .await
            .map_err(ApiError::from)?;
        response.take(0).map_err(ApiError::from)
    }

    pub async fn past(db: &Db) -> ApiResult<Vec<Self>> {
        let mut response = db
            .query("SELECT * FROM event WHERE date < $today ORDER BY date DESC")
            .bind(("today", today_string()))
            .await
            .map_err(ApiError::from)?;
        response.take(0).map_err(ApiError::from)
    }

    // The embedded engines can misorder WHERE + ORDER BY results once LIMIT
    // is added, so the page is cut after the fetch. Past events number in
    // the dozens, not millions.
    pub async fn past_page(skip: u64, limit: u64, db: &Db) -> ApiResult<Vec<Self>> {
        let past = Self::past(db).await?;
        Ok(past
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    pub async fn create(self, db: &Db) -> ApiResult<Self> {
        let created: Option<Self> = db
            .create(EVENT_TABLE)
            .content(self)
            .await
            .map_err(ApiError::from)?;
        created.ok_or_else(|| ApiError::Database("event was not created".to_owned()))
    }

    pub async fn update(id: &str, mut updated: Self, db: &Db) -> ApiResult<Option<Self>> {
        // the record id is addressed by the key below, not by the content
        updated.id = None;
        updated.updated_at = now_millis();
        db.update((EVENT_TABLE, id))
            .content(updated)
            .await
            .map_err(ApiError::from)
    }

    pub async fn delete(id: &str, db: &Db) -> ApiResult<Option<Self>> {
        db.delete((EVENT_TABLE, id)).await.map_err(ApiError::from)
    }
}

fn today_string() -> String {
    today().format(DATE_FORMAT).unwrap_or_default()
}

/// Stored dates should always be `YYYY-MM-DD`, but the mapping stays total:
/// longer datetime strings are truncated and anything unreadable collapses
/// to the epoch rather than failing the whole listing.
fn parse_stored_date(raw: &str) -> Date {
    let date_part = raw.get(..10).unwrap_or(raw);
    Date::parse(date_part, DATE_FORMAT)
        .or_else(|_| Date::parse(raw, DATE_FORMAT))
        .unwrap_or(Date::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    async fn test_db() -> Db {
        let db = surrealdb::engine::any::connect("mem://").await.unwrap();
        db.use_ns("test").use_db("test").await.unwrap();
        db
    }

    fn sample_event(title: &str, date: &str) -> EventDocument {
        EventDocument {
            id: None,
            title: title.to_owned(),
            date: date.to_owned(),
            location: "Community hall".to_owned(),
            description: "A day of free health checkups".to_owned(),
            category: EventCategory::Health,
            image: None,
            additional_images: vec![],
            additional_link: None,
            created_at: now_millis(),
            updated_at: now_millis(),
        }
    }

    #[test]
    fn category_parses_only_known_values() {
        assert_eq!(
            EventCategory::parse("Agriculture"),
            Some(EventCategory::Agriculture)
        );
        assert_eq!(EventCategory::parse("agriculture"), None);
        assert_eq!(EventCategory::parse("Sports"), None);
    }

    #[test]
    fn stored_dates_parse_defensively() {
        assert_eq!(parse_stored_date("2024-06-15"), date!(2024 - 06 - 15));
        assert_eq!(
            parse_stored_date("2024-06-15T10:30:00Z"),
            date!(2024 - 06 - 15)
        );
        assert_eq!(parse_stored_date("not a date"), Date::MIN);
    }

    #[tokio::test]
    async fn create_then_fetch_round_trips() {
        let db = test_db().await;
        let created = sample_event("Health camp", "2024-06-15")
            .create(&db)
            .await
            .unwrap();

        let id = id_string(&created.id);
        assert!(!id.is_empty());

        let fetched = EventDocument::with_id(&id, &db).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Health camp");
        assert_eq!(fetched.category, EventCategory::Health);
        assert_eq!(fetched.date, "2024-06-15");
    }

    #[tokio::test]
    async fn missing_ids_come_back_as_none() {
        let db = test_db().await;
        assert!(EventDocument::with_id("not-an-id", &db)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn upcoming_and_past_split_on_today() {
        let db = test_db().await;
        sample_event("Long past", "2001-01-01")
            .create(&db)
            .await
            .unwrap();
        sample_event("Far future", "2999-01-01")
            .create(&db)
            .await
            .unwrap();

        let upcoming = EventDocument::upcoming(&db).await.unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].title, "Far future");

        let past = EventDocument::past(&db).await.unwrap();
        assert_eq!(past.len(), 1);
        assert_eq!(past[0].title, "Long past");
    }

    #[tokio::test]
    async fn past_events_paginate_newest_first() {
        let db = test_db().await;
        for (title, date) in [
            ("Oldest", "2001-01-01"),
            ("Middle", "2002-01-01"),
            ("Newest", "2003-01-01"),
        ] {
            sample_event(title, date).create(&db).await.unwrap();
        }

        let first_page = EventDocument::past_page(0, 2, &db).await.unwrap();
        assert_eq!(first_page.len(), 2);
        assert_eq!(first_page[0].title, "Newest");
        assert_eq!(first_page[1].title, "Middle");

        let second_page = EventDocument::past_page(2, 2, &db).await.unwrap();
        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].title, "Oldest");
    }

    #[tokio::test]
    async fn update_replaces_and_delete_removes() {
        let db = test_db().await;
        let created = sample_event("Draft", "2024-06-15").create(&db).await.unwrap();
        let id = id_string(&created.id);

        let mut updated = created.clone();
        updated.title = "Published".to_owned();
        let stored = EventDocument::update(&id, updated, &db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.title, "Published");

        assert!(EventDocument::delete(&id, &db).await.unwrap().is_some());
        assert!(EventDocument::with_id(&id, &db).await.unwrap().is_none());
        // deleting again is a no-op, not an error
        assert!(EventDocument::delete(&id, &db).await.unwrap().is_none());
    }
}
