//! Stateless HTTP request builder and response parser for the Routemaster API.
//!
//! # Design
//! `RoutemasterClient` holds only the parsed base URL and carries no mutable
//! state between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller (or [`crate::RoutemasterApi`]) executes the
//! round-trip in between.
//!
//! Every `parse_*` method checks the status codes the operation gives meaning
//! to before falling back to the generic non-2xx check, so a 404/409/410 is
//! always reported as a domain error rather than as `ApiError::Http`.

use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    Json, Label, LabelBody, LabelList, LabelRef, Metadata, MetadataBody, StateMachine,
    StateMachineList,
};

const STATE_MACHINES: &str = "state-machines";
const LABELS: &str = "labels";

/// Synchronous, stateless client for the Routemaster API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutemasterClient {
    status_url: Url,
    state_machines_url: Url,
}

impl RoutemasterClient {
    /// Create a client for the API rooted at `api_url`.
    ///
    /// Endpoints are resolved against `api_url` with standard URL-join
    /// semantics: `http://host/api/` keeps the `/api/` prefix, `http://host/api`
    /// does not.
    pub fn new(api_url: &str) -> Result<Self, ApiError> {
        let base = Url::parse(api_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{api_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!("{api_url}: cannot be a base url")));
        }
        let status_url = join(&base, "")?;
        let state_machines_url = join(&base, STATE_MACHINES)?;
        Ok(Self {
            status_url,
            state_machines_url,
        })
    }

    /// The URL of the API root, also used for the status endpoint.
    pub fn base_url(&self) -> &Url {
        &self.status_url
    }

    /// `state-machines/{state_machine}/labels`
    pub fn labels_url(&self, state_machine: &StateMachine) -> Result<Url, ApiError> {
        self.state_machines_segments(&[state_machine.as_str(), LABELS])
    }

    /// `state-machines/{state_machine}/labels/{name}`
    pub fn label_url(&self, label: &LabelRef) -> Result<Url, ApiError> {
        self.state_machines_segments(&[
            label.state_machine.as_str(),
            LABELS,
            label.name.as_str(),
        ])
    }

    /// Names that URL path normalisation would drop or collapse are rejected:
    /// the request would otherwise reach a different endpoint.
    fn state_machines_segments(&self, segments: &[&str]) -> Result<Url, ApiError> {
        if let Some(bad) = segments
            .iter()
            .find(|segment| matches!(**segment, "" | "." | ".."))
        {
            return Err(ApiError::InvalidUrl(format!(
                "{bad:?} cannot be used as a path segment"
            )));
        }
        let mut url = self.state_machines_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl("cannot append path segments".to_string()))?
            .extend(segments);
        Ok(url)
    }

    pub fn build_get_status(&self) -> HttpRequest {
        get(&self.status_url)
    }

    pub fn build_get_state_machines(&self) -> HttpRequest {
        get(&self.state_machines_url)
    }

    pub fn build_get_labels(&self, state_machine: &StateMachine) -> Result<HttpRequest, ApiError> {
        Ok(get(&self.labels_url(state_machine)?))
    }

    pub fn build_get_label(&self, label: &LabelRef) -> Result<HttpRequest, ApiError> {
        Ok(get(&self.label_url(label)?))
    }

    pub fn build_create_label(
        &self,
        label: &LabelRef,
        metadata: &Metadata,
    ) -> Result<HttpRequest, ApiError> {
        with_metadata(HttpMethod::Post, &self.label_url(label)?, metadata)
    }

    /// The server merges `metadata` into the label's existing metadata.
    pub fn build_update_label(
        &self,
        label: &LabelRef,
        metadata: &Metadata,
    ) -> Result<HttpRequest, ApiError> {
        with_metadata(HttpMethod::Patch, &self.label_url(label)?, metadata)
    }

    pub fn build_delete_label(&self, label: &LabelRef) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Delete,
            url: self.label_url(label)?.into(),
            headers: Vec::new(),
            body: None,
        })
    }

    pub fn parse_get_status(&self, response: HttpResponse) -> Result<Json, ApiError> {
        check_status(&response)?;
        decode(&response)
    }

    pub fn parse_get_state_machines(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<StateMachine>, ApiError> {
        check_status(&response)?;
        let list: StateMachineList = decode(&response)?;
        Ok(list.state_machines.into_iter().map(|entry| entry.name).collect())
    }

    pub fn parse_get_labels(
        &self,
        state_machine: &StateMachine,
        response: HttpResponse,
    ) -> Result<Vec<LabelRef>, ApiError> {
        if response.status == 404 {
            return Err(ApiError::UnknownStateMachine(state_machine.clone()));
        }
        check_status(&response)?;
        let list: LabelList = decode(&response)?;
        Ok(list
            .labels
            .into_iter()
            .map(|entry| LabelRef {
                name: entry.name,
                state_machine: state_machine.clone(),
            })
            .collect())
    }

    pub fn parse_get_label(&self, label: &LabelRef, response: HttpResponse) -> Result<Label, ApiError> {
        match response.status {
            404 => return Err(ApiError::UnknownLabel(label.clone())),
            410 => return Err(ApiError::DeletedLabel(label.clone())),
            _ => {}
        }
        check_status(&response)?;
        decode_label(label, &response)
    }

    pub fn parse_create_label(
        &self,
        label: &LabelRef,
        response: HttpResponse,
    ) -> Result<Label, ApiError> {
        match response.status {
            404 => return Err(ApiError::UnknownStateMachine(label.state_machine.clone())),
            409 => return Err(ApiError::LabelAlreadyExists(label.clone())),
            _ => {}
        }
        check_status(&response)?;
        decode_label(label, &response)
    }

    /// A 404 is reported as `UnknownLabel` even when it is the state machine
    /// that is missing; the server does not distinguish the two.
    pub fn parse_update_label(
        &self,
        label: &LabelRef,
        response: HttpResponse,
    ) -> Result<Label, ApiError> {
        match response.status {
            404 => return Err(ApiError::UnknownLabel(label.clone())),
            410 => return Err(ApiError::DeletedLabel(label.clone())),
            _ => {}
        }
        check_status(&response)?;
        decode_label(label, &response)
    }

    pub fn parse_delete_label(&self, label: &LabelRef, response: HttpResponse) -> Result<(), ApiError> {
        if response.status == 404 {
            return Err(ApiError::UnknownStateMachine(label.state_machine.clone()));
        }
        check_status(&response)
    }
}

fn join(base: &Url, path: &str) -> Result<Url, ApiError> {
    base.join(path)
        .map_err(|e| ApiError::InvalidUrl(format!("{base} + {path:?}: {e}")))
}

fn get(url: &Url) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Get,
        url: url.as_str().to_string(),
        headers: Vec::new(),
        body: None,
    }
}

fn with_metadata(method: HttpMethod, url: &Url, metadata: &Metadata) -> Result<HttpRequest, ApiError> {
    let body = serde_json::to_string(&MetadataBody { metadata })
        .map_err(|e| ApiError::Serialization(e.to_string()))?;
    Ok(HttpRequest {
        method,
        url: url.as_str().to_string(),
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

/// Map any non-2xx status left over after the operation's own checks.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn decode_label(label: &LabelRef, response: &HttpResponse) -> Result<Label, ApiError> {
    let body: LabelBody = decode(response)?;
    Ok(Label {
        label_ref: label.clone(),
        metadata: body.metadata,
        state: body.state,
    })
}
