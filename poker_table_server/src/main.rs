mod config;
mod dispatch;

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use clap::Parser;
use dashmap::DashMap;
use futures_util::{stream::StreamExt, SinkExt};
use parking_lot::Mutex as P_Mutex;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use poker_table_core::{Address, GameTable, ServerMessage};

use crate::config::Args;
use crate::dispatch::{dispatch, parse_message, Treasury};

// 服务器全局状态
// 所有牌桌共用一个引擎，由互斥锁保证每次只执行一个操作。
// 锁的顺序：table -> treasury，connections 只在释放 table 之后访问。
struct AppState {
    table: P_Mutex<GameTable>,
    treasury: Treasury,
    // 将 Address 映射到具体的网络连接
    connections: DashMap<Address, mpsc::Sender<ServerMessage>>,
}

type SharedState = Arc<AppState>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let table_config = args.table_config();
    info!(?table_config, "牌桌配置");

    let table = match args.seed {
        Some(seed) => GameTable::with_seed(table_config, seed),
        None => GameTable::new(table_config),
    };

    let state = SharedState::new(AppState {
        table: P_Mutex::new(table),
        treasury: Treasury::default(),
        connections: DashMap::new(),
    });

    let app = Router::new()
        .route("/ws", get(websocket_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    info!("服务器正在监听 {}", args.bind);
    axum::serve(listener, app).await?;
    Ok(())
}

/// 处理 WebSocket 连接请求
async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// 处理单个 WebSocket 连接的生命周期
async fn handle_socket(socket: WebSocket, state: SharedState) {
    let (mut sender, mut receiver) = socket.split();

    // 创建一个 MPSC 通道，用于从其他任务接收要发送的消息
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(32);

    // 启动一个新任务，专门负责将 MPSC 通道中的消息发送到 WebSocket
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let payload = match serde_json::to_string(&msg) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!("序列化消息失败: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(payload.into())).await.is_err() {
                // 发送失败，说明客户端已断开，退出任务
                break;
            }
        }
    });

    // 每个连接就是一个参与者身份
    let address = Uuid::new_v4();
    state.connections.insert(address, tx.clone());
    info!("客户端 {} 已连接", address);
    let _ = tx.send(ServerMessage::Welcome { your_address: address }).await;

    // 主循环，处理从客户端接收到的消息
    while let Some(Ok(msg)) = receiver.next().await {
        if let Message::Text(text) = msg {
            let client_msg = match parse_message(&text) {
                Ok(client_msg) => client_msg,
                Err(reply) => {
                    tracing::warn!("解析消息失败: {}", text.as_str());
                    let _ = tx.send(reply).await;
                    continue;
                }
            };

            let outcome = {
                let mut table = state.table.lock();
                dispatch(&mut table, &state.treasury, address, client_msg)
            };

            for reply in outcome.reply {
                let _ = tx.send(reply).await;
            }
            for event in outcome.broadcast {
                broadcast(&state.connections, &event);
            }
        }
    }

    // 客户端断开连接。座位和筹码保留在牌局中，只移除连接。
    state.connections.remove(&address);
    info!("客户端 {} 连接关闭", address);
}

/// 向所有连接广播消息
///
/// 使用 `try_send`：某个客户端的队列满了只丢弃发给它的这条消息，不会阻塞其他连接。
fn broadcast(connections: &DashMap<Address, mpsc::Sender<ServerMessage>>, message: &ServerMessage) {
    for entry in connections.iter() {
        match entry.value().try_send(message.clone()) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("客户端 {} 的发送队列已满，丢弃一条广播", entry.key());
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                // 该客户端已断开，后续由其自己的 handle_socket 任务清理
                tracing::warn!("向客户端 {} 发送消息失败（可能已断开）", entry.key());
            }
        }
    }
}
