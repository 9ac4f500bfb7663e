use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming as IncomingBody};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{header, Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

type GenericError = Box<dyn std::error::Error + Send + Sync>;

/// What the mock server saw for one request.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

pub type Log = Arc<Mutex<Vec<Recorded>>>;

/// Serves `handler` on an ephemeral localhost port until the test's runtime
/// shuts down. Returns the base URL and the request log.
pub async fn serve<F>(handler: F) -> (String, Log)
where
    F: Fn(&Recorded) -> (u16, String) + Send + Sync + 'static,
{
    serve_delayed(Duration::ZERO, handler).await
}

/// Like [`serve`], but holds every response back for `delay`.
pub async fn serve_delayed<F>(delay: Duration, handler: F) -> (String, Log)
where
    F: Fn(&Recorded) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let server_log = log.clone();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let io = TokioIo::new(stream);
            let handler = handler.clone();
            let log = server_log.clone();
            tokio::spawn(async move {
                let service = service_fn(move |req: Request<IncomingBody>| {
                    let handler = handler.clone();
                    let log = log.clone();
                    async move {
                        let (parts, body) = req.into_parts();
                        let body = body.collect().await?.to_bytes();
                        let recorded = Recorded {
                            method: parts.method.to_string(),
                            path: parts.uri.path().to_string(),
                            query: parts.uri.query().map(str::to_string),
                            headers: parts
                                .headers
                                .iter()
                                .filter_map(|(n, v)| {
                                    v.to_str().ok().map(|v| (n.to_string(), v.to_string()))
                                })
                                .collect(),
                            body: body.to_vec(),
                        };
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        let (status, json) = handler(&recorded);
                        log.lock().unwrap().push(recorded);
                        let response = Response::builder()
                            .status(status)
                            .header(header::CONTENT_TYPE, "application/json")
                            .body(Full::new(Bytes::from(json)))?;
                        Ok::<_, GenericError>(response)
                    }
                });
                let conn: std::pin::Pin<
                    Box<dyn std::future::Future<Output = hyper::Result<()>> + Send>,
                > = Box::pin(http1::Builder::new().serve_connection(io, service));
                let _ = conn.await;
            });
        }
    });
    (format!("http://{}", addr), log)
}

/// A localhost URL nothing listens on.
pub async fn dead_url() -> String {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
