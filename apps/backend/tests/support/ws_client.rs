//! Minimal websocket client for end-to-end realtime tests.

use std::net::TcpListener;
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::{web, App, HttpServer};
use draft_backend::middleware::{RequestTrace, StructuredLogger, TraceSpan};
use draft_backend::routes;
use draft_backend::AppState;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type BoxError = Box<dyn std::error::Error>;

/// Bind the real route table on an ephemeral port.
pub fn start_server(state: AppState) -> Result<(ServerHandle, std::net::SocketAddr), BoxError> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let data = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .workers(1)
    .listen(listener)?
    .run();

    let handle = server.handle();
    tokio::spawn(server);
    Ok((handle, addr))
}

pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    /// Connect, retrying briefly while the server comes up.
    pub async fn connect(url: &str) -> Result<Self, BoxError> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            match connect_async(url).await {
                Ok((stream, _)) => return Ok(Self { stream }),
                Err(err) if tokio::time::Instant::now() >= deadline => return Err(Box::new(err)),
                Err(_) => tokio::time::sleep(Duration::from_millis(10)).await,
            }
        }
    }

    pub async fn send_json(&mut self, value: &Value) -> Result<(), BoxError> {
        self.stream.send(Message::text(value.to_string())).await?;
        Ok(())
    }

    /// Next text frame as JSON; `None` on close or timeout.
    pub async fn next_json(&mut self, timeout: Duration) -> Option<Value> {
        loop {
            let frame = tokio::time::timeout(timeout, self.stream.next()).await.ok()??;
            match frame.ok()? {
                Message::Text(text) => return serde_json::from_str(&text).ok(),
                Message::Close(_) => return None,
                _ => continue,
            }
        }
    }

    /// Skip frames until one has `"type": ty`.
    pub async fn expect_type(&mut self, ty: &str, timeout: Duration) -> Value {
        loop {
            let msg = self
                .next_json(timeout)
                .await
                .unwrap_or_else(|| panic!("no `{ty}` message before timeout"));
            if msg["type"] == ty {
                return msg;
            }
        }
    }
}
