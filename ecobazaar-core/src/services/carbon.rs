//! Carbon impact reports and the community leaderboard

use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::http::ApiClient;
use super::session_handle::SessionHandle;
use crate::domain::result::{Error, Result};
use crate::domain::{CarbonReport, LeaderboardEntry};
use crate::ports::{path_segment, ApiRequest};

const LOGIN_FOR_REPORT: &str = "Please login to view your carbon report";

/// Export formats the server renders as a binary download
const BINARY_FORMATS: &[&str] = &["pdf"];

pub struct CarbonService {
    api: Arc<ApiClient>,
    session: Arc<SessionHandle>,
}

impl CarbonService {
    pub fn new(api: Arc<ApiClient>, session: Arc<SessionHandle>) -> Self {
        Self { api, session }
    }

    pub async fn report(&self) -> Result<CarbonReport> {
        let user_id = self.session.require_user_id(LOGIN_FOR_REPORT).await?;
        self.api
            .get_json(format!("/carbon/report/{}", path_segment(&user_id)))
            .await
    }

    /// The signed-in user's report rendered by the server in `format`
    /// (`txt` when unsure). Binary formats are refused before any request.
    pub async fn export(&self, format: &str) -> Result<String> {
        if BINARY_FORMATS.contains(&format.to_ascii_lowercase().as_str()) {
            return Err(Error::Validation {
                status: 400,
                payload: Some(serde_json::json!({
                    "error": format!("'{}' export is binary, only text formats are supported", format)
                })),
            });
        }
        let user_id = self.session.require_user_id(LOGIN_FOR_REPORT).await?;
        let request = ApiRequest::get(format!("/carbon/report/{}/export", path_segment(&user_id)))
            .query("format", format);
        Ok(match self.api.send(request).await? {
            JsonValue::Null => String::new(),
            JsonValue::String(text) => text,
            other => serde_json::to_string_pretty(&other)?,
        })
    }

    /// Platform-wide carbon totals (admin)
    pub async fn platform_summary(&self) -> Result<JsonValue> {
        self.api.get_json("/carbon/admin/summary").await
    }

    /// Top users by carbon saved; public
    pub async fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>> {
        let request = ApiRequest::get("/community/carbon-leaderboard").query("limit", limit);
        match self.api.send(request).await? {
            JsonValue::Null => Ok(Vec::new()),
            body => Ok(serde_json::from_value(body)?),
        }
    }
}
