//! Endpoint resolution for operations without a fixed route
//!
//! Deployments of the storefront backend disagree on how "remove from
//! wishlist" is addressed. The resolver walks an ordered list of candidate
//! request shapes, strictly one at a time, and adopts the first one the
//! server accepts. Each candidate moves `NotTried → Trying → Succeeded |
//! Failed`; the trace is kept for diagnostics only.

use serde_json::json;
use tracing::{debug, info, warn};

use super::http::ApiClient;
use crate::domain::result::{Error, Result};
use crate::domain::{ProbeRecord, ProbeState, ResourceId};
use crate::ports::{path_segment, ApiRequest};

/// Builds one request shape from `(user id, target id)`
pub type RequestBuilder = fn(&ResourceId, &ResourceId) -> ApiRequest;

/// One candidate request shape
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub label: &'static str,
    pub build: RequestBuilder,
}

impl Candidate {
    pub const fn new(label: &'static str, build: RequestBuilder) -> Self {
        Self { label, build }
    }
}

/// Outcome of a resolution: the adopted candidate (or the error) plus the
/// full trace
#[derive(Debug)]
pub struct Probe {
    pub trace: Vec<ProbeRecord>,
    pub outcome: Result<&'static str>,
}

#[derive(Debug, Clone)]
pub struct EndpointResolver {
    operation: &'static str,
    candidates: Vec<Candidate>,
}

fn wishlist_path_param(user_id: &ResourceId, product_id: &ResourceId) -> ApiRequest {
    ApiRequest::delete(format!(
        "/wishlist/{}/{}",
        path_segment(user_id),
        path_segment(product_id)
    ))
}

fn wishlist_query_params(user_id: &ResourceId, product_id: &ResourceId) -> ApiRequest {
    ApiRequest::delete("/wishlist/remove")
        .query("userId", user_id)
        .query("productId", product_id)
}

fn wishlist_root_with_query(user_id: &ResourceId, product_id: &ResourceId) -> ApiRequest {
    ApiRequest::delete(format!("/wishlist/{}", path_segment(user_id)))
        .query("productId", product_id)
}

fn wishlist_root_with_body(user_id: &ResourceId, product_id: &ResourceId) -> ApiRequest {
    ApiRequest::delete(format!("/wishlist/{}", path_segment(user_id)))
        .json(json!({ "productId": product_id }))
}

impl EndpointResolver {
    pub fn new(operation: &'static str, candidates: Vec<Candidate>) -> Self {
        Self {
            operation,
            candidates,
        }
    }

    /// Known shapes of "remove product from wishlist", most likely first
    pub fn wishlist_removal() -> Self {
        Self::new(
            "wishlist removal",
            vec![
                Candidate::new("path-param", wishlist_path_param),
                Candidate::new("query-params", wishlist_query_params),
                Candidate::new("root-with-query", wishlist_root_with_query),
                Candidate::new("root-with-body", wishlist_root_with_body),
            ],
        )
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.candidates.iter().map(|c| c.label).collect()
    }

    /// Try the candidates in order until one succeeds.
    ///
    /// A 401 stops the walk: the access layer has just torn the session
    /// down, so later shapes would only go out unauthenticated. When every
    /// shape fails the outcome is `ContractMismatch` carrying the trace.
    pub async fn resolve(&self, api: &ApiClient, user_id: &ResourceId, target: &ResourceId) -> Probe {
        let requests: Vec<ApiRequest> = self
            .candidates
            .iter()
            .map(|c| (c.build)(user_id, target))
            .collect();
        let mut trace: Vec<ProbeRecord> = self
            .candidates
            .iter()
            .zip(&requests)
            .map(|(c, r)| ProbeRecord::new(c.label, r.method.as_str(), r.target()))
            .collect();

        for (index, (candidate, request)) in self.candidates.iter().zip(requests).enumerate() {
            trace[index].transition(ProbeState::Trying);
            debug!("Trying {} shape: {} {}", candidate.label, request.method, request.target());

            match api.send(request).await {
                Ok(_) => {
                    trace[index].transition(ProbeState::Succeeded);
                    info!("{} succeeded with {} shape", self.operation, candidate.label);
                    return Probe {
                        trace,
                        outcome: Ok(candidate.label),
                    };
                }
                Err(e) => {
                    warn!("{} shape failed for {}: {}", candidate.label, self.operation, e);
                    trace[index].transition(ProbeState::Failed {
                        status: e.status(),
                        reason: e.to_string(),
                    });
                    if matches!(e, Error::AuthExpired { .. }) {
                        return Probe {
                            trace,
                            outcome: Err(e),
                        };
                    }
                }
            }
        }

        let attempts = trace
            .iter()
            .filter(|r| r.state != ProbeState::NotTried)
            .count();
        let error = Error::ContractMismatch {
            operation: self.operation.to_string(),
            attempts,
            trace: trace.clone(),
        };
        Probe {
            trace,
            outcome: Err(error),
        }
    }
}
