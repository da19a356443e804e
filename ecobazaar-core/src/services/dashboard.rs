//! Dashboards
//!
//! Each audience has an overview plus a fixed set of named panels. Panel
//! payloads are charts and tables the server shapes freely, so they are
//! passed through as JSON.

use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::http::ApiClient;
use super::session_handle::SessionHandle;
use crate::domain::result::{Error, Result};
use crate::domain::Role;
use crate::ports::{path_segment, ApiRequest};

const LOGIN_FOR_DASHBOARD: &str = "Please login to view your dashboard";

/// Whose dashboard to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    User,
    Seller,
    Admin,
}

impl Audience {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::User => Audience::User,
            Role::Seller => Audience::Seller,
            Role::Admin => Audience::Admin,
        }
    }

    /// Panel names with the row limit the server is asked for, if any
    pub fn panels(&self) -> &'static [(&'static str, Option<u32>)] {
        match self {
            Audience::User => &[
                ("stats", None),
                ("achievements", None),
                ("tips", None),
                ("carbon-trend", None),
                ("category-breakdown", None),
                ("eco-rating-distribution", None),
                ("recent-orders", Some(10)),
            ],
            Audience::Seller => &[
                ("stats", None),
                ("top-products", Some(5)),
                ("sales-by-category", None),
                ("revenue-breakdown", None),
            ],
            Audience::Admin => &[
                ("platform-stats", None),
                ("pending-verifications", None),
                ("top-sellers", Some(10)),
                ("recent-activities", Some(10)),
                ("carbon-impact", None),
                ("user-role-distribution", None),
            ],
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Audience::User => "user",
            Audience::Seller => "seller",
            Audience::Admin => "admin",
        })
    }
}

pub struct DashboardService {
    api: Arc<ApiClient>,
    session: Arc<SessionHandle>,
}

impl DashboardService {
    pub fn new(api: Arc<ApiClient>, session: Arc<SessionHandle>) -> Self {
        Self { api, session }
    }

    /// Read the overview (`panel == None`) or one named panel. User and
    /// seller dashboards belong to the signed-in account.
    pub async fn panel(&self, audience: Audience, panel: Option<&str>) -> Result<JsonValue> {
        let limit = match panel {
            None => None,
            Some(name) => match audience.panels().iter().find(|(known, _)| *known == name) {
                Some((_, limit)) => *limit,
                None => {
                    return Err(Error::not_found(format!(
                        "{} dashboard panel '{}'",
                        audience, name
                    )))
                }
            },
        };
        let user_id = self.session.require_user_id(LOGIN_FOR_DASHBOARD).await?;
        let mut path = match audience {
            Audience::Admin => "/dashboard/admin".to_string(),
            _ => format!("/dashboard/{}/{}", audience, path_segment(&user_id)),
        };
        if let Some(name) = panel {
            path.push('/');
            path.push_str(name);
        }
        let mut request = ApiRequest::get(path);
        if let Some(limit) = limit {
            request = request.query("limit", limit);
        }
        self.api.send(request).await
    }
}
