//! Helpers shared by the integration tests.
//!
//! Each test starts the real router on an ephemeral port with in-memory
//! stores and a manually driven clock.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use yoriai_server::{
    domain::{ConnectionCounter, Document, DocumentId, UserId},
    infrastructure::{
        auth::{JwtClaims, JwtCredentialVerifier},
        message_pusher::WebSocketMessagePusher,
        repository::{
            InMemoryDocumentStore, InMemoryRoomRepository, InMemoryShareGrantRepository,
            InMemoryShareLinkRepository,
        },
    },
    ui::{AppDependencies, AppState, Server, ServerSettings},
};
use yoriai_shared::time::{ManualClock, get_utc_timestamp};

pub const SECRET: &str = "integration-test-secret";
const RECV_TIMEOUT: Duration = Duration::from_secs(3);

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct TestApp {
    pub addr: SocketAddr,
    pub documents: Arc<InMemoryDocumentStore>,
    pub clock: Arc<ManualClock>,
    pub http: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let clock = Arc::new(ManualClock::new(get_utc_timestamp()));
        let documents = Arc::new(InMemoryDocumentStore::with_clock(Box::new(clock.clone())));

        let state = AppState::new(
            AppDependencies {
                rooms: Arc::new(InMemoryRoomRepository::new()),
                documents: documents.clone(),
                grants: Arc::new(InMemoryShareGrantRepository::new()),
                links: Arc::new(InMemoryShareLinkRepository::new()),
                message_pusher: Arc::new(WebSocketMessagePusher::new()),
                verifier: Arc::new(JwtCredentialVerifier::new(Some(SECRET))),
                counter: Arc::new(ConnectionCounter::new()),
                clock: clock.clone(),
            },
            ServerSettings {
                frontend_url: "https://docs.example.com".to_string(),
                ..ServerSettings::default()
            },
        );
        let router = Server::new(state).router();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            addr,
            documents,
            clock,
            http: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn seed_document(&self, id: &str, owner: &str) {
        self.documents.insert(Document {
            id: DocumentId::new(id.to_string()).unwrap(),
            title: format!("Title of {id}"),
            owner_id: UserId::new(owner.to_string()).unwrap(),
            collaborator_ids: Vec::new(),
            is_shared: false,
        });
    }

    /// WebSocket で接続する（credential は任意）
    pub async fn connect(&self, token: Option<&str>) -> WsClient {
        let url = match token {
            Some(token) => format!("ws://{}/ws?token={}", self.addr, token),
            None => format!("ws://{}/ws", self.addr),
        };
        let (ws, _) = connect_async(url).await.unwrap();
        ws
    }

    /// 共有リンクを発行してトークンを返す
    pub async fn create_link(&self, token: &str, document_id: &str, body: Value) -> String {
        let response = self
            .http
            .post(self.url(&format!(
                "/api/share/document/{document_id}/generate-link"
            )))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        body["shareToken"].as_str().unwrap().to_string()
    }

    pub async fn redeem(&self, token: &str, share_token: &str) -> reqwest::Response {
        self.http
            .post(self.url("/api/share/join-by-token"))
            .bearer_auth(token)
            .json(&json!({ "shareToken": share_token }))
            .send()
            .await
            .unwrap()
    }
}

/// HS256 の credential を発行する
pub fn mint_token(user_id: &str, username: &str) -> String {
    let claims = JwtClaims {
        id: user_id.to_string(),
        username: username.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as u64,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub async fn send_event(ws: &mut WsClient, event: &str, data: Value) {
    let frame = json!({ "event": event, "data": data }).to_string();
    ws.send(Message::text(frame)).await.unwrap();
}

/// 指定したイベントを受信するまで待つ（他のイベントは読み飛ばす）
pub async fn recv_event(ws: &mut WsClient, event: &str) -> Value {
    tokio::time::timeout(RECV_TIMEOUT, async {
        loop {
            let msg = ws.next().await.expect("stream closed").unwrap();
            if let Message::Text(text) = msg {
                let frame: Value = serde_json::from_str(text.as_str()).unwrap();
                if frame["event"] == event {
                    return frame["data"].clone();
                }
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for '{event}'"))
}

/// 一定時間内に受信したイベント名を全て集める
pub async fn collect_events(ws: &mut WsClient, window: Duration) -> Vec<Value> {
    let mut frames = Vec::new();
    let _ = tokio::time::timeout(window, async {
        while let Some(Ok(msg)) = ws.next().await {
            if let Message::Text(text) = msg {
                frames.push(serde_json::from_str(text.as_str()).unwrap());
            }
        }
    })
    .await;
    frames
}

/// 参加して `connected-users` を受け取るまで待つ
pub async fn join(ws: &mut WsClient, document_id: &str) -> Value {
    send_event(ws, "join-document", json!({ "documentId": document_id })).await;
    recv_event(ws, "connected-users").await
}
