//! Blocking API wrapper: one method per remote operation.
//!
//! `RoutemasterApi` pairs a `RoutemasterClient` with a retained transport
//! handle and runs build → execute → parse for each call. Every call is a
//! single round-trip with no retries or caching; errors are returned to the
//! caller unchanged.

use crate::client::RoutemasterClient;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{Json, Label, LabelRef, Metadata, StateMachine};

#[derive(Debug, Clone)]
pub struct RoutemasterApi<T> {
    client: RoutemasterClient,
    transport: T,
}

impl<T: Transport> RoutemasterApi<T> {
    pub fn new(api_url: &str, transport: T) -> Result<Self, ApiError> {
        Ok(Self::from_client(RoutemasterClient::new(api_url)?, transport))
    }

    pub fn from_client(client: RoutemasterClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &RoutemasterClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Status document of the API instance, passed through undecoded.
    pub fn get_status(&self) -> Result<Json, ApiError> {
        let response = self.transport.execute(self.client.build_get_status())?;
        self.client.parse_get_status(response)
    }

    pub fn get_state_machines(&self) -> Result<Vec<StateMachine>, ApiError> {
        let response = self.transport.execute(self.client.build_get_state_machines())?;
        self.client.parse_get_state_machines(response)
    }

    /// # Errors
    /// - `UnknownStateMachine` if the state machine is not known (HTTP 404).
    /// - `Http` for any other non-2xx status.
    pub fn get_labels(&self, state_machine: &StateMachine) -> Result<Vec<LabelRef>, ApiError> {
        let response = self
            .transport
            .execute(self.client.build_get_labels(state_machine)?)?;
        self.client.parse_get_labels(state_machine, response)
    }

    /// # Errors
    /// - `UnknownLabel` if the label is not known (HTTP 404).
    /// - `DeletedLabel` if the label has been deleted (HTTP 410).
    /// - `Http` for any other non-2xx status.
    pub fn get_label(&self, label: &LabelRef) -> Result<Label, ApiError> {
        let response = self.transport.execute(self.client.build_get_label(label)?)?;
        self.client.parse_get_label(label, response)
    }

    /// Create a label with the given metadata, starting it in the state machine.
    ///
    /// # Errors
    /// - `UnknownStateMachine` if the state machine is not known (HTTP 404).
    /// - `LabelAlreadyExists` if the label already exists (HTTP 409).
    /// - `Http` for any other non-2xx status.
    pub fn create_label(&self, label: &LabelRef, metadata: &Metadata) -> Result<Label, ApiError> {
        let response = self
            .transport
            .execute(self.client.build_create_label(label, metadata)?)?;
        self.client.parse_create_label(label, response)
    }

    /// Merge `metadata` into the label's metadata. The server may move the
    /// label to a new state as a result.
    ///
    /// # Errors
    /// - `UnknownLabel` if the label or its state machine is not known (HTTP 404).
    /// - `DeletedLabel` if the label has been deleted (HTTP 410).
    /// - `Http` for any other non-2xx status.
    pub fn update_label(&self, label: &LabelRef, metadata: &Metadata) -> Result<Label, ApiError> {
        let response = self
            .transport
            .execute(self.client.build_update_label(label, metadata)?)?;
        self.client.parse_update_label(label, response)
    }

    /// Soft-delete a label. Deleted labels cannot be updated and do not move.
    ///
    /// # Errors
    /// - `UnknownStateMachine` if the state machine is not known (HTTP 404).
    /// - `Http` for any other non-2xx status.
    pub fn delete_label(&self, label: &LabelRef) -> Result<(), ApiError> {
        let response = self.transport.execute(self.client.build_delete_label(label)?)?;
        self.client.parse_delete_label(label, response)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use serde_json::json;

    use super::*;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Replays canned responses in order and records every request.
    #[derive(Default)]
    struct FakeTransport {
        responses: RefCell<VecDeque<HttpResponse>>,
        requests: RefCell<Vec<HttpRequest>>,
    }

    impl FakeTransport {
        fn replying(responses: impl IntoIterator<Item = (u16, &'static str)>) -> Self {
            Self {
                responses: RefCell::new(
                    responses
                        .into_iter()
                        .map(|(status, body)| HttpResponse::new(status, body))
                        .collect(),
                ),
                requests: RefCell::new(Vec::new()),
            }
        }

        fn last_request(&self) -> HttpRequest {
            self.requests.borrow().last().cloned().unwrap()
        }
    }

    impl Transport for FakeTransport {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.requests.borrow_mut().push(request);
            self.responses
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| ApiError::Transport("no canned response".into()))
        }
    }

    struct Unreachable;

    impl Transport for Unreachable {
        fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, ApiError> {
            Err(ApiError::Transport("connection refused".into()))
        }
    }

    fn api(transport: &FakeTransport) -> RoutemasterApi<&FakeTransport> {
        RoutemasterApi::new("http://localhost:2017", transport).unwrap()
    }

    fn metadata(value: serde_json::Value) -> Metadata {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn get_status_returns_payload_unchanged() {
        let transport =
            FakeTransport::replying([(200, r#"{"status":"ok","state-machines":"/state-machines"}"#)]);
        let status = api(&transport).get_status().unwrap();
        assert_eq!(
            serde_json::Value::Object(status),
            json!({"status": "ok", "state-machines": "/state-machines"})
        );
        assert_eq!(transport.last_request().url, "http://localhost:2017/");
    }

    #[test]
    fn get_state_machines_in_response_order() {
        let transport = FakeTransport::replying([(
            200,
            r#"{"state-machines":[{"name":"m1"},{"name":"m2"}]}"#,
        )]);
        let machines = api(&transport).get_state_machines().unwrap();
        assert_eq!(machines, vec![StateMachine::new("m1"), StateMachine::new("m2")]);
    }

    #[test]
    fn get_labels_unknown_state_machine() {
        let transport = FakeTransport::replying([(404, "")]);
        let err = api(&transport)
            .get_labels(&StateMachine::new("none"))
            .unwrap_err();
        assert_eq!(err.state_machine(), Some(&StateMachine::new("none")));
        assert_eq!(
            transport.last_request().url,
            "http://localhost:2017/state-machines/none/labels"
        );
    }

    #[test]
    fn create_label_sends_exactly_the_metadata() {
        let transport = FakeTransport::replying([(201, r#"{"metadata":{"foo":"bar"},"state":"start"}"#)]);
        let label = LabelRef::new("foo", "testing-machine");
        let created = api(&transport)
            .create_label(&label, &metadata(json!({"foo": "bar"})))
            .unwrap();

        let request = transport.last_request();
        assert_eq!(request.method, HttpMethod::Post);
        let body: serde_json::Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"metadata": {"foo": "bar"}}));

        assert_eq!(created.label_ref, label);
        assert_eq!(created.metadata, metadata(json!({"foo": "bar"})));
        assert_eq!(created.state, "start");
    }

    #[test]
    fn create_existing_label_conflicts() {
        let transport = FakeTransport::replying([(409, "")]);
        let label = LabelRef::new("foo", "testing-machine");
        let err = api(&transport).create_label(&label, &Metadata::new()).unwrap_err();
        assert!(matches!(&err, ApiError::LabelAlreadyExists(l) if *l == label));
    }

    #[test]
    fn update_label_returns_server_metadata() {
        let transport =
            FakeTransport::replying([(200, r#"{"metadata":{"a":1,"b":2},"state":"next"}"#)]);
        let label = LabelRef::new("foo", "testing-machine");
        let updated = api(&transport)
            .update_label(&label, &metadata(json!({"b": 2})))
            .unwrap();
        assert_eq!(transport.last_request().method, HttpMethod::Patch);
        assert_eq!(updated.label_ref, label);
        assert_eq!(updated.metadata, metadata(json!({"a": 1, "b": 2})));
        assert_eq!(updated.state, "next");
    }

    #[test]
    fn update_deleted_label() {
        let transport = FakeTransport::replying([(410, "")]);
        let label = LabelRef::new("gone", "testing-machine");
        let err = api(&transport).update_label(&label, &Metadata::new()).unwrap_err();
        assert!(err.is_deleted());
        assert_eq!(err.label(), Some(&label));
    }

    #[test]
    fn delete_label_no_content() {
        let transport = FakeTransport::replying([(204, "")]);
        let label = LabelRef::new("foo", "testing-machine");
        api(&transport).delete_label(&label).unwrap();
        assert_eq!(transport.last_request().method, HttpMethod::Delete);
    }

    #[test]
    fn bad_gateway_is_never_a_domain_error() {
        let transport = FakeTransport::replying([(502, "bad gateway"), (503, "unavailable")]);
        let label = LabelRef::new("foo", "testing-machine");
        let api = api(&transport);

        let err = api.get_label(&label).unwrap_err();
        assert!(matches!(&err, ApiError::Http { status: 502, body } if body == "bad gateway"));
        assert!(!err.is_unknown_label());

        let err = api.delete_label(&label).unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 503, .. }));
    }

    #[test]
    fn transport_failures_propagate() {
        let api = RoutemasterApi::new("http://localhost:2017", Unreachable).unwrap();
        let err = api.get_status().unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn shared_transport_handle() {
        let transport = std::sync::Arc::new(FakeTransport::replying([(200, r#"{"labels":[]}"#)]));
        let api = RoutemasterApi::new("http://localhost:2017", transport.clone()).unwrap();
        assert!(api.get_labels(&StateMachine::new("m")).unwrap().is_empty());
        assert_eq!(transport.requests.borrow().len(), 1);
    }
}
