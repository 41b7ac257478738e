#![allow(dead_code)]

use parking_lot::Mutex;
use std::net::SocketAddr;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::path::FullPath;
use warp::Filter;

use promptmesh_lib::{ApiClient, CollectingNotifier, Config, KeyValueStore, MemoryStore, Session};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub authorization: Option<String>,
    pub referer: Option<String>,
    pub title: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn ok(body: serde_json::Value) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

/// In-process stand-in for the provider: answers the key exchange and the
/// generation endpoint with canned replies, serves `/files/*` and top-level
/// `*.ply` for downloads, and records every POST it sees.
pub struct MockProvider {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockProvider {
    pub async fn start(key_reply: Reply, generation_reply: Reply) -> Self {
        Self::start_with_delay(key_reply, generation_reply, Duration::ZERO).await
    }

    /// Like `start`, but every POST is answered only after `delay`. The
    /// request is recorded as soon as it arrives.
    pub async fn start_with_delay(key_reply: Reply, generation_reply: Reply, delay: Duration) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorder = requests.clone();

        let posts = warp::post()
            .and(warp::path::full())
            .and(warp::header::optional::<String>("authorization"))
            .and(warp::header::optional::<String>("http-referer"))
            .and(warp::header::optional::<String>("x-title"))
            .and(warp::body::bytes())
            .and_then(
                move |path: FullPath,
                      authorization: Option<String>,
                      referer: Option<String>,
                      title: Option<String>,
                      body: Bytes| {
                    let path = path.as_str().to_string();
                    recorder.lock().push(Recorded {
                        path: path.clone(),
                        authorization,
                        referer,
                        title,
                        body: serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null),
                    });
                    let reply = match path.as_str() {
                        "/api/v1/auth/keys" => key_reply.clone(),
                        "/api/v1/objects/generations" => generation_reply.clone(),
                        _ => Reply::raw(404, "{}"),
                    };
                    async move {
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        let status = StatusCode::from_u16(reply.status)
                            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                        Ok::<_, Infallible>(warp::reply::with_status(reply.body, status))
                    }
                },
            );

        let files = warp::get()
            .and(warp::path!("files" / String))
            .map(|name: String| format!("ply\ncomment {}\nend_header\n", name));

        let top_level = warp::get()
            .and(warp::path!(String))
            .and_then(|name: String| async move {
                if name.ends_with(".ply") {
                    Ok(format!("ply\ncomment {}\nend_header\n", name))
                } else {
                    Err(warp::reject::not_found())
                }
            });

        let (addr, server) =
            warp::serve(posts.or(files).or(top_level)).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        Self { addr, requests }
    }

    pub fn base(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().clone()
    }

    pub fn config(&self) -> Config {
        Config {
            api_base: self.base(),
            auth_base: self.base(),
            ..Config::default()
        }
    }
}

pub struct Harness {
    pub session: Session,
    pub store: Arc<MemoryStore>,
    pub notices: Arc<CollectingNotifier>,
}

pub fn harness(config: &Config, store: MemoryStore) -> Harness {
    let store = Arc::new(store);
    let notices = Arc::new(CollectingNotifier::new());
    let session = Session::new(
        config,
        store.clone() as Arc<dyn KeyValueStore>,
        ApiClient::new(config),
        notices.clone(),
    );
    Harness {
        session,
        store,
        notices,
    }
}
