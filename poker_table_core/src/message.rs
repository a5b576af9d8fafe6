use crate::card::{Card, HandStrength};
use crate::error::TableError;
use crate::state::{Address, Chips, GameId, GameInfo, PlayerInfo};
use serde::{Deserialize, Serialize};

// --- 引擎事件 ---
// 每个成功的操作都会返回它产生的事件，失败的操作不产生任何事件。

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    GameCreated { game_id: GameId, creator: Address },
    PlayerJoined { game_id: GameId, player: Address },
    GameStarted { game_id: GameId },
    BetPlaced { game_id: GameId, player: Address, amount: Chips },
    PlayerFolded { game_id: GameId, player: Address },
    /// 整个奖池 `pot` 归 `winner` 所有，实际转账由外部托管方完成
    GameEnded {
        game_id: GameId,
        winner: Address,
        pot: Chips,
        resolution: Resolution,
    },
}

/// 牌局是怎样结束的
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// 其他人全部弃牌，只剩一名玩家
    Attrition,
    /// 比牌
    Showdown { winning_hand: HandStrength },
}

impl GameEvent {
    pub fn game_id(&self) -> GameId {
        match self {
            GameEvent::GameCreated { game_id, .. }
            | GameEvent::PlayerJoined { game_id, .. }
            | GameEvent::GameStarted { game_id }
            | GameEvent::BetPlaced { game_id, .. }
            | GameEvent::PlayerFolded { game_id, .. }
            | GameEvent::GameEnded { game_id, .. } => *game_id,
        }
    }
}

// --- 客户端 -> 服务器 的消息 ---

#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum ClientMessage {
    /// 创建牌桌并押上入场筹码
    CreateGame { stake: Chips },
    JoinGame { game_id: GameId, stake: Chips },
    /// 仅房主
    StartGame { game_id: GameId },
    PlaceBet { game_id: GameId, amount: Chips },
    Fold { game_id: GameId },
    Showdown { game_id: GameId },
    GetGame { game_id: GameId },
    GetPlayerInfo { game_id: GameId, address: Address },
    /// 只能查看自己的手牌
    GetPlayerCards { game_id: GameId, address: Address },
    /// 查询自己已赢得的筹码
    Balance,
}

// --- 服务器 -> 客户端 的消息 ---

#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum ServerMessage {
    /// 连接建立后私密地发给该客户端，告知它的身份
    Welcome { your_address: Address },
    /// 创建成功后只发给创建者
    GameCreated { game_id: GameId },
    /// 广播给所有连接
    Event(GameEvent),
    Game(GameInfo),
    PlayerInfo(PlayerInfo),
    PlayerCards { game_id: GameId, cards: Vec<Card> },
    Balance { amount: Chips },
    /// 引擎拒绝了请求，只发给请求者
    Error { error: TableError, message: String },
    /// 无法解析的请求
    BadRequest { message: String },
}

impl From<TableError> for ServerMessage {
    fn from(error: TableError) -> Self {
        let message = error.to_string();
        ServerMessage::Error { error, message }
    }
}

impl From<GameEvent> for ServerMessage {
    fn from(event: GameEvent) -> Self {
        ServerMessage::Event(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_json_shape() {
        let msg: ClientMessage = serde_json::from_str(r#"{"PlaceBet":{"game_id":1,"amount":100}}"#).unwrap();
        assert!(matches!(msg, ClientMessage::PlaceBet { game_id: 1, amount: 100 }));

        let msg: ClientMessage = serde_json::from_str(r#""Balance""#).unwrap();
        assert!(matches!(msg, ClientMessage::Balance));
    }

    #[test]
    fn test_error_message_carries_kind_and_text() {
        let msg = ServerMessage::from(TableError::NotCreator);
        match msg {
            ServerMessage::Error { error, message } => {
                assert_eq!(error, TableError::NotCreator);
                assert_eq!(message, "Not game creator");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_event_game_id() {
        let event = GameEvent::BetPlaced { game_id: 3, player: Address::nil(), amount: 100 };
        assert_eq!(event.game_id(), 3);
    }
}
