use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use crate::db::Db;
use crate::error::{ApiError, ApiResult};
use crate::models::id_string;
use crate::util::now_millis;

pub const AGM_REPORT_TABLE: &str = "agm_report";

/// The earliest and latest years an AGM report may be filed under.
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2100;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgmReportDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub title: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub pdf_url: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgmReport {
    /// The ID of the report
    pub id: String,
    /// The report's display title
    pub title: String,
    /// The year of the annual general meeting the report covers
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Where the report PDF can be downloaded
    pub pdf_url: String,
}

impl AgmReportDocument {
    pub fn into_report(self) -> AgmReport {
        AgmReport {
            id: id_string(&self.id),
            title: self.title,
            year: self.year,
            description: self.description,
            pdf_url: self.pdf_url,
        }
    }

    pub async fn all(db: &Db) -> ApiResult<Vec<Self>> {
        let mut response = db
            .query("SELECT * FROM agm_report ORDER BY year DESC, created_at DESC")
            .await
            .map_err(ApiError::from)?;
        response.take(0).map_err(ApiError::from)
    }

    pub async fn with_id(id: &str, db: &Db) -> ApiResult<Option<Self>> {
        db.select((AGM_REPORT_TABLE, id))
            .await
            .map_err(ApiError::from)
    }

    pub async fn create(self, db: &Db) -> ApiResult<Self> {
        let created: Option<Self> = db
            .create(AGM_REPORT_TABLE)
            .content(self)
            .await
            .map_err(ApiError::from)?;
        created.ok_or_else(|| ApiError::Database("AGM report was not created".to_owned()))
    }

    pub async fn update(id: &str, mut updated: Self, db: &Db) -> ApiResult<Option<Self>> {
        updated.id = None;
        updated.updated_at = now_millis();
        db.update((AGM_REPORT_TABLE, id))
            .content(updated)
            .await
            .map_err(ApiError::from)
    }

    pub async fn delete(id: &str, db: &Db) -> ApiResult<Option<Self>> {
        db.delete((AGM_REPORT_TABLE, id))
            .await
            .map_err(ApiError::from)
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

    fn sample_report(year: i32) -> AgmReportDocument {
        AgmReportDocument {
            id: None,
            title: format!("AGM {year}"),
            year,
            description: None,
            pdf_url: format!("/uploads/agm-reports/agm-{year}.pdf"),
            created_at: now_millis(),
            updated_at: now_millis(),
        }
    }

    #[tokio::test]
    async fn reports_list_newest_year_first() {
        let db = test_db().await;
        for year in [2019, 2024, 2021] {
            sample_report(year).create(&db).await.unwrap();
        }

        let reports = AgmReportDocument::all(&db).await.unwrap();
        let years: Vec<i32> = reports.iter().map(|report| report.year).collect();
        assert_eq!(years, vec![2024, 2021, 2019]);
    }

    #[tokio::test]
    async fn create_then_fetch_round_trips() {
        let db = test_db().await;
        let created = sample_report(2024).create(&db).await.unwrap();
        let id = id_string(&created.id);

        let fetched = AgmReportDocument::with_id(&id, &db).await.unwrap().unwrap();
        assert_eq!(fetched.title, "AGM 2024");
        assert_eq!(fetched.pdf_url, "/uploads/agm-reports/agm-2024.pdf");

        assert!(AgmReportDocument::with_id("missing", &db)
            .await
            .unwrap()
            .is_none());
    }
}
