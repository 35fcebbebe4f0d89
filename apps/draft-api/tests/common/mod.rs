//! Shared harness: an in-process server on an ephemeral port plus a thin
//! WebSocket client for driving the gateway.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::time;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use draft_api::catalog::{CardFacts, CardId, Catalog, JumpstartTheme, Rarity};
use draft_api::config::Config;
use draft_api::registry::Registry;
use draft_api::AppState;

pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

const WUBRG: [&str; 5] = ["W", "U", "B", "R", "G"];

fn build_catalog(set: &str, commons: u32, uncommons: u32, rares: u32, mythics: u32) -> Catalog {
    let mut cards = HashMap::new();
    let mut next_id = 1u32;
    let mut add = |count: u32, rarity: Rarity, cards: &mut HashMap<CardId, CardFacts>| {
        for i in 0..count {
            cards.insert(
                next_id,
                CardFacts {
                    name: format!("{set} {rarity} {next_id}"),
                    set: set.to_string(),
                    rarity,
                    colors: vec![WUBRG[(i % 5) as usize].to_string()],
                    in_booster: true,
                },
            );
            next_id += 1;
        }
    };
    add(commons, Rarity::Common, &mut cards);
    add(uncommons, Rarity::Uncommon, &mut cards);
    add(rares, Rarity::Rare, &mut cards);
    add(mythics, Rarity::Mythic, &mut cards);

    let themes = (0..6)
        .map(|i| JumpstartTheme {
            name: format!("Theme {i}"),
            cards: (1 + i * 20..=(i + 1) * 20).collect(),
        })
        .collect();
    Catalog::from_parts(cards, vec![set.to_string()], HashMap::new(), themes)
}

/// Pool sizes from the two-player reference scenario.
pub fn thb_catalog() -> Catalog {
    build_catalog("thb", 101, 80, 53, 15)
}

/// A pool large enough for eight-seat drafts and sealed runs.
pub fn big_catalog() -> Catalog {
    build_catalog("big", 400, 160, 100, 30)
}

/// Start a real TCP server for WebSocket testing. Returns the address
/// and the shared state; the server runs in the background.
pub async fn start_server(catalog: Catalog) -> (SocketAddr, AppState) {
    let config = Config {
        card_db_path: "unused-in-tests".to_string(),
        card_lists_dir: "unused-in-tests".to_string(),
        port: 0,
        debug_secret: Some("test-secret".to_string()),
    };
    let state = AppState {
        config: Arc::new(config),
        catalog: Arc::new(catalog),
        registry: Arc::new(Registry::new()),
    };
    let app = draft_api::routes::router().with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

/// A connected gateway client.
pub struct Client {
    pub user_id: String,
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Client {
    pub async fn connect(addr: SocketAddr, user_id: &str, user_name: &str, session_id: &str) -> Self {
        let url = format!(
            "ws://{addr}/gateway?userID={user_id}&userName={user_name}&sessionID={session_id}"
        );
        let (ws, _) = connect_async(&url).await.expect("ws connect");
        Self {
            user_id: user_id.to_string(),
            ws,
        }
    }

    pub async fn send(&mut self, event: &str, data: Value) {
        let frame = json!({ "t": event, "d": data });
        self.ws
            .send(Message::Text(frame.to_string().into()))
            .await
            .expect("ws send");
    }

    pub async fn send_signal(&mut self, event: &str) {
        let frame = json!({ "t": event });
        self.ws
            .send(Message::Text(frame.to_string().into()))
            .await
            .expect("ws send");
    }

    /// Next `{t, d}` frame, skipping non-text messages.
    pub async fn next_frame(&mut self) -> (String, Value) {
        loop {
            let msg = time::timeout(RECV_TIMEOUT, self.ws.next())
                .await
                .expect("timeout waiting for frame")
                .expect("stream ended")
                .expect("ws read error");
            if let Message::Text(text) = msg {
                let value: Value = serde_json::from_str(&text).expect("parse frame");
                let name = value["t"].as_str().expect("frame name").to_string();
                let data = value.get("d").cloned().unwrap_or(Value::Null);
                return (name, data);
            }
        }
    }

    /// Skip frames until `event` arrives; panics after too many strays.
    pub async fn expect(&mut self, event: &str) -> Value {
        for _ in 0..500 {
            let (name, data) = self.next_frame().await;
            if name == event {
                return data;
            }
        }
        panic!("event '{event}' never arrived");
    }

    /// Skip frames until one of `events` arrives.
    pub async fn expect_any(&mut self, events: &[&str]) -> (String, Value) {
        for _ in 0..500 {
            let (name, data) = self.next_frame().await;
            if events.contains(&name.as_str()) {
                return (name, data);
            }
        }
        panic!("none of {events:?} ever arrived");
    }

    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }
}

/// Convenience: pick the first card of the booster in a `nextBooster`
/// payload. The ack is left in the stream (later `expect` calls skip it).
pub async fn send_first_pick(client: &mut Client, next_booster: &Value) {
    let card = next_booster["booster"].as_array().expect("booster array")[0]
        .as_u64()
        .expect("card id");
    client
        .send("pickCard", json!({ "selectedCard": card }))
        .await;
}
