use hateoas_resource::eventify::{NOTIFIED, PENDING, REJECTED, RESOLVED};
use hateoas_resource::mock::{create_mock_http, expect_request, MockHttpClient};
use hateoas_resource::{
    eventify, Action, ActionEvent, DynamicResource, HttpClient, HttpRequest, HttpResponse, Link,
    Progress, ProgressSink, Resource, ResourceAction, ResourceBase, ResourceError,
    SharedResource,
};
use http::{Method, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Posts to the resource's `publish` endpoint and marks it published.
struct Publish;

#[async_trait::async_trait]
impl ResourceAction<DynamicResource> for Publish {
    fn name(&self) -> &str {
        "publish"
    }

    fn check(&self, resource: &SharedResource<DynamicResource>) -> Result<(), ResourceError> {
        resource.with(|r| r.get_link("self").map(drop))
    }

    async fn run(
        &self,
        resource: &SharedResource<DynamicResource>,
        http: &dyn HttpClient,
        progress: ProgressSink,
    ) -> Result<HttpResponse, ResourceError> {
        let href = resource.with(|r| r.get_link("self").map(str::to_string))?;
        let response = http
            .send(HttpRequest::new(Method::POST, format!("{href}/publish")), progress)
            .await?;
        if !response.status.is_success() {
            return Err(ResourceError::RequestFailed(Box::new(response)));
        }
        resource.with_mut(|r| r.set("published", &true))?;
        Ok(response)
    }
}

fn resource_at(href: &str) -> SharedResource<DynamicResource> {
    let base = ResourceBase::new().with_links(vec![Link::to_self(href)]);
    SharedResource::new(DynamicResource::with_base(base))
}

fn observer() -> (
    mpsc::UnboundedSender<ActionEvent<DynamicResource>>,
    mpsc::UnboundedReceiver<ActionEvent<DynamicResource>>,
) {
    mpsc::unbounded_channel()
}

fn drain<R>(receiver: &mut mpsc::UnboundedReceiver<ActionEvent<R>>) -> Vec<&'static str> {
    let mut names = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        names.push(event.name());
    }
    names
}

#[tokio::test]
async fn test_pending_is_emitted_before_invoke_returns() {
    let (http, _exchanges) = create_mock_http(4);
    let (events, mut received) = observer();
    let read = eventify(events, resource_at("/resource/1"), Action::Read, Arc::new(http));

    let _task = read.invoke().unwrap();

    let event = received.try_recv().expect("Pending should already be queued");
    assert_eq!(event.name(), PENDING);
    assert_eq!(event.action(), "read");
}

#[tokio::test]
async fn test_lifecycle_order_on_success() {
    let http = MockHttpClient::new();
    http.expect(Method::GET, "/resource/1")
        .with_progress([
            Progress { loaded: 4, total: Some(8) },
            Progress { loaded: 8, total: Some(8) },
        ])
        .respond_json(StatusCode::OK, &json!({ "message": "hello" }));

    let (events, mut received) = observer();
    let resource = resource_at("/resource/1");
    let read = eventify(events, resource.clone(), Action::Read, Arc::new(http));

    let response = read.invoke().unwrap().outcome().await.unwrap();
    assert_eq!(response.status, StatusCode::OK);

    assert_eq!(
        drain(&mut received),
        vec![PENDING, NOTIFIED, NOTIFIED, RESOLVED]
    );
    assert_eq!(
        resource.with(|r| r.get("message").cloned()),
        Some(json!("hello"))
    );
}

#[tokio::test]
async fn test_rejected_carries_failed_response() {
    let http = MockHttpClient::new();
    http.expect(Method::DELETE, "/resource/1")
        .respond(StatusCode::NOT_FOUND, "missing");

    let (events, mut received) = observer();
    let resource = resource_at("/resource/1");
    let delete = eventify(events, resource.clone(), Action::Delete, Arc::new(http));

    let error = delete.invoke().unwrap().outcome().await.unwrap_err();
    assert!(matches!(error, ResourceError::RequestFailed(_)));

    assert_eq!(received.recv().await.unwrap().name(), PENDING);
    match received.recv().await.unwrap() {
        ActionEvent::Rejected {
            action,
            response,
            reason,
            ..
        } => {
            assert_eq!(action, "delete");
            let response = response.expect("Rejected by the server");
            assert_eq!(response.status, StatusCode::NOT_FOUND);
            assert_eq!(response.body, "missing");
            assert!(reason.contains("404"));
        }
        other => panic!("Expected Rejected, got {other:?}"),
    }
    assert!(resource.with(|r| !r.is_new()));
}

#[tokio::test]
async fn test_missing_link_is_refused_before_dispatch() {
    let http = MockHttpClient::new();
    let (events, mut received) = observer();
    let update = eventify(
        events,
        SharedResource::new(DynamicResource::default()),
        Action::Update,
        Arc::new(http.clone()),
    );

    let error = update.invoke().unwrap_err();
    assert!(matches!(error, ResourceError::LinkNotFound(_)));
    assert!(http.requests().is_empty());

    // Pending went out, nothing settles afterwards.
    tokio::task::yield_now().await;
    assert_eq!(drain(&mut received), vec![PENDING]);
}

#[tokio::test]
async fn test_transport_failure_is_rejected_without_response() {
    let http = MockHttpClient::new();
    http.expect(Method::GET, "/resource/1")
        .fail(ResourceError::Transport("connection reset".to_string()));

    let (events, mut received) = observer();
    let read = eventify(events, resource_at("/resource/1"), Action::Read, Arc::new(http));

    let error = read.invoke().unwrap().outcome().await.unwrap_err();
    assert!(matches!(error, ResourceError::Transport(_)));

    assert_eq!(received.recv().await.unwrap().name(), PENDING);
    match received.recv().await.unwrap() {
        ActionEvent::Rejected {
            response, reason, ..
        } => {
            assert!(response.is_none());
            assert!(reason.contains("connection reset"));
        }
        other => panic!("Expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_custom_action_is_eventified_under_its_name() {
    let http = MockHttpClient::new();
    http.expect(Method::POST, "/resource/1/publish")
        .with_progress([Progress { loaded: 2, total: Some(2) }])
        .respond(StatusCode::NO_CONTENT, "");

    let (events, mut received) = observer();
    let resource = resource_at("/resource/1");
    let publish = eventify(events, resource.clone(), Publish, Arc::new(http.clone()));
    assert_eq!(publish.action(), "publish");

    let response = publish.invoke().unwrap().outcome().await.unwrap();
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    http.verify();

    let events: Vec<_> = std::iter::from_fn(|| received.try_recv().ok()).collect();
    let names: Vec<_> = events.iter().map(|e| e.name()).collect();
    assert_eq!(names, vec![PENDING, NOTIFIED, RESOLVED]);
    assert!(events.iter().all(|e| e.action() == "publish"));
    assert_eq!(
        resource.with(|r| r.get("published").cloned()),
        Some(json!(true))
    );
}

#[tokio::test]
async fn test_custom_action_check_refuses_new_resource() {
    let http = MockHttpClient::new();
    let (events, mut received) = observer();
    let publish = eventify(
        events,
        SharedResource::new(DynamicResource::default()),
        Publish,
        Arc::new(http.clone()),
    );

    assert!(matches!(
        publish.invoke(),
        Err(ResourceError::LinkNotFound(_))
    ));
    assert!(http.requests().is_empty());
    assert_eq!(drain(&mut received), vec![PENDING]);
}

#[tokio::test]
async fn test_progress_is_forwarded_to_caller() {
    let http = MockHttpClient::new();
    http.expect(Method::PUT, "/resource/1")
        .with_progress([
            Progress { loaded: 1, total: None },
            Progress { loaded: 2, total: None },
        ])
        .respond(StatusCode::ACCEPTED, "");

    let (events, _received) = observer();
    let update = eventify(events, resource_at("/resource/1"), Action::Update, Arc::new(http));

    let mut task = update.invoke().unwrap();
    assert_eq!(task.progress().await.map(|p| p.loaded), Some(1));
    assert_eq!(task.progress().await.map(|p| p.loaded), Some(2));
    assert_eq!(task.progress().await, None);
    task.outcome().await.unwrap();
}

#[tokio::test]
async fn test_invocations_are_independent() {
    let (http, mut exchanges) = create_mock_http(4);
    let http: Arc<dyn HttpClient> = Arc::new(http);
    let (events, mut received) = observer();
    let read = eventify(events, resource_at("/resource/1"), Action::Read, http);

    let first = read.invoke().unwrap();
    let second = read.invoke().unwrap();
    assert_eq!(drain(&mut received), vec![PENDING, PENDING]);

    let a = expect_request(&mut exchanges).await.unwrap();
    let b = expect_request(&mut exchanges).await.unwrap();
    a.respond_to
        .send(Ok(HttpResponse::new(StatusCode::OK, "{}")))
        .unwrap();
    b.respond_to
        .send(Ok(HttpResponse::new(StatusCode::GONE, "")))
        .unwrap();

    let outcomes = [first.outcome().await, second.outcome().await];
    assert_eq!(outcomes.iter().filter(|o| o.is_ok()).count(), 1);
    assert_eq!(outcomes.iter().filter(|o| o.is_err()).count(), 1);

    let mut settled = drain(&mut received);
    settled.sort();
    assert_eq!(settled, vec![REJECTED, RESOLVED]);
}

#[tokio::test]
async fn test_resolved_sees_settled_state() {
    let http = MockHttpClient::new();
    http.expect(Method::POST, "/resource")
        .with_header("location", "/resource/3")
        .respond(StatusCode::CREATED, "");

    let (events, mut received) = observer();
    let create = eventify(events, resource_at("/resource"), Action::Create, Arc::new(http));
    create.invoke().unwrap().outcome().await.unwrap();

    received.recv().await.unwrap();
    let resolved = received.recv().await.unwrap();
    assert_eq!(resolved.name(), RESOLVED);
    assert!(resolved.resource().ptr_eq(create.resource()));
    assert_eq!(
        resolved
            .resource()
            .with(|r| r.get_link("self").map(str::to_string))
            .unwrap(),
        "/resource/3"
    );
}
