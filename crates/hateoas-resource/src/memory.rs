//! # In-Memory HATEOAS Server
//!
//! A small server that speaks the wire format this crate consumes, running as an
//! actor task. It is used by the sample application and by tests that want a
//! real round trip without a network.
//!
//! The server is split the same way an actor is:
//!
//! - [`MemoryServer`] owns the store and the receiving end of a channel, and
//!   processes exchanges *sequentially* in [`MemoryServer::run`]. No locks are
//!   needed for the store.
//! - [`ChannelHttpClient`] is the cloneable sending half. It implements
//!   [`HttpClient`], so resources use it like any other transport.
//!
//! ## Routes
//!
//! Any path is a collection; a path whose last segment is a number is an item
//! in the collection before it.
//!
//! | Request | Response |
//! |---------|----------|
//! | `POST /notes` | `201`, `Location: /notes/{id}`, stored body with its `self` link |
//! | `GET /notes` | `200`, JSON array of every item in id order |
//! | `GET /notes/{id}` | `200` with the item, or `404` |
//! | `PUT /notes/{id}` | `202`, body replaces the item (links are kept), or `404` |
//! | `DELETE /notes/{id}` | `204`, or `404` |
//!
//! Bodies that are not JSON objects get `400`; other methods get `405`. Each
//! response with a body is preceded by one progress report covering the body.

use crate::error::ResourceError;
use crate::http::{HttpClient, HttpRequest, HttpResponse, Progress, ProgressSink};
use crate::link::{Link, LinkSet};
use crate::simplification::{self, Simplification};
use async_trait::async_trait;
use http::header::{CONTENT_TYPE, LOCATION};
use http::{HeaderValue, Method, StatusCode};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Type alias for the one-shot channel an exchange is answered on.
pub type Respond = oneshot::Sender<Result<HttpResponse, ResourceError>>;

/// One request travelling from a [`ChannelHttpClient`] to whoever serves it.
#[derive(Debug)]
pub struct Exchange {
    pub request: HttpRequest,
    pub progress: ProgressSink,
    pub respond_to: Respond,
}

/// The sending half: forwards requests over a channel and awaits the answer.
#[derive(Clone, Debug)]
pub struct ChannelHttpClient {
    sender: mpsc::Sender<Exchange>,
}

impl ChannelHttpClient {
    pub fn new(sender: mpsc::Sender<Exchange>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl HttpClient for ChannelHttpClient {
    async fn send(
        &self,
        request: HttpRequest,
        progress: ProgressSink,
    ) -> Result<HttpResponse, ResourceError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(Exchange {
                request,
                progress,
                respond_to,
            })
            .await
            .map_err(|_| ResourceError::Transport("server closed".into()))?;
        response
            .await
            .map_err(|_| ResourceError::Transport("server dropped the exchange".into()))?
    }
}

#[derive(Debug, Default)]
struct Collection {
    items: BTreeMap<u32, Simplification>,
    next_id: u32,
}

enum Route<'a> {
    Collection(&'a str),
    Item(&'a str, u32),
}

fn route(url: &str) -> Route<'_> {
    let path = url.trim_end_matches('/');
    if let Some((collection, last)) = path.rsplit_once('/') {
        if let Ok(id) = last.parse() {
            if !collection.is_empty() {
                return Route::Item(collection, id);
            }
        }
    }
    Route::Collection(path)
}

fn json_response(status: StatusCode, body: String) -> HttpResponse {
    let mut response = HttpResponse::new(status, body);
    response
        .headers
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn empty(status: StatusCode) -> HttpResponse {
    HttpResponse::new(status, "")
}

/// The serving half: owns every collection and answers exchanges in order.
pub struct MemoryServer {
    receiver: mpsc::Receiver<Exchange>,
    collections: HashMap<String, Collection>,
}

impl MemoryServer {
    /// Creates a server and the client that talks to it.
    ///
    /// `buffer_size` bounds the number of queued exchanges; senders wait when it
    /// is full.
    pub fn new(buffer_size: usize) -> (Self, ChannelHttpClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let server = Self {
            receiver,
            collections: HashMap::new(),
        };
        (server, ChannelHttpClient::new(sender))
    }

    /// Serves exchanges until every client has been dropped.
    pub async fn run(mut self) {
        info!("Memory server started");

        while let Some(exchange) = self.receiver.recv().await {
            let Exchange {
                request,
                progress,
                respond_to,
            } = exchange;
            debug!(method = %request.method, url = %request.url, "Exchange");
            let response = self.handle(&request);
            if response.has_body() {
                let size = response.body.len() as u64;
                progress.notify(Progress {
                    loaded: size,
                    total: Some(size),
                });
            }
            if response.is_success() {
                info!(url = %request.url, status = response.status.as_u16(), "Served");
            } else {
                warn!(url = %request.url, status = response.status.as_u16(), "Refused");
            }
            let _ = respond_to.send(Ok(response));
        }

        let size: usize = self.collections.values().map(|c| c.items.len()).sum();
        info!(size, "Memory server shutdown");
    }

    fn handle(&mut self, request: &HttpRequest) -> HttpResponse {
        match (route(&request.url), &request.method) {
            (Route::Collection(path), &Method::POST) => self.create(path, request),
            (Route::Collection(path), &Method::GET) => self.list(path),
            (Route::Item(path, id), &Method::GET) => self.get(path, id),
            (Route::Item(path, id), &Method::PUT) => self.replace(path, id, request),
            (Route::Item(path, id), &Method::DELETE) => self.remove(path, id),
            _ => empty(StatusCode::METHOD_NOT_ALLOWED),
        }
    }

    fn create(&mut self, path: &str, request: &HttpRequest) -> HttpResponse {
        let mut item = match body(request) {
            Some(item) => item,
            None => return empty(StatusCode::BAD_REQUEST),
        };
        let collection = self.collections.entry(path.to_string()).or_default();
        collection.next_id += 1;
        let id = collection.next_id;
        let location = format!("{path}/{id}");

        let links = LinkSet::from(vec![Link::to_self(location.clone())]);
        if simplification::put(&mut item, "links", &links).is_err() {
            return empty(StatusCode::INTERNAL_SERVER_ERROR);
        }
        let text = serde_json::Value::Object(item.clone()).to_string();
        collection.items.insert(id, item);

        let mut response = json_response(StatusCode::CREATED, text);
        if let Ok(value) = HeaderValue::from_str(&location) {
            response.headers.insert(LOCATION, value);
        }
        response
    }

    fn list(&self, path: &str) -> HttpResponse {
        let items: Vec<serde_json::Value> = self
            .collections
            .get(path)
            .map(|c| {
                c.items
                    .values()
                    .cloned()
                    .map(serde_json::Value::Object)
                    .collect()
            })
            .unwrap_or_default();
        json_response(StatusCode::OK, serde_json::Value::Array(items).to_string())
    }

    fn get(&self, path: &str, id: u32) -> HttpResponse {
        match self.collections.get(path).and_then(|c| c.items.get(&id)) {
            Some(item) => json_response(
                StatusCode::OK,
                serde_json::Value::Object(item.clone()).to_string(),
            ),
            None => empty(StatusCode::NOT_FOUND),
        }
    }

    fn replace(&mut self, path: &str, id: u32, request: &HttpRequest) -> HttpResponse {
        let Some(stored) = self
            .collections
            .get_mut(path)
            .and_then(|c| c.items.get_mut(&id))
        else {
            return empty(StatusCode::NOT_FOUND);
        };
        let Some(mut item) = body(request) else {
            return empty(StatusCode::BAD_REQUEST);
        };
        if let Some(links) = stored.get("links") {
            item.insert("links".to_string(), links.clone());
        }
        *stored = item;
        empty(StatusCode::ACCEPTED)
    }

    fn remove(&mut self, path: &str, id: u32) -> HttpResponse {
        match self
            .collections
            .get_mut(path)
            .and_then(|c| c.items.remove(&id))
        {
            Some(_) => empty(StatusCode::NO_CONTENT),
            None => empty(StatusCode::NOT_FOUND),
        }
    }
}

fn body(request: &HttpRequest) -> Option<Simplification> {
    request
        .data
        .as_deref()
        .and_then(|data| simplification::parse(data).ok())
}
