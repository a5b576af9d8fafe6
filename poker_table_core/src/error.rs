use crate::state::GameId;
use crate::Chips;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 牌桌引擎拒绝一次调用的原因。
///
/// 任何一个错误都意味着本次调用没有产生任何状态变化。
/// 变体本身就是可供机器判断的错误类型，`Display` 给出人类可读的说明。
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TableError {
    #[error("Insufficient chips: staked {stake}, minimum is {minimum}")]
    InsufficientStake { stake: Chips, minimum: Chips },

    #[error("Game does not exist: {0}")]
    GameNotFound(GameId),

    #[error("Game already started")]
    GameAlreadyStarted,

    #[error("Table is full ({capacity} seats)")]
    TableFull { capacity: usize },

    #[error("Already joined this game")]
    AlreadyJoined,

    #[error("Not game creator")]
    NotCreator,

    #[error("Invalid game state")]
    InvalidState,

    #[error("Not an active player")]
    NotActivePlayer,

    #[error("Player already folded")]
    AlreadyFolded,

    #[error("Bet too small: bet {amount}, minimum is {minimum}")]
    BetTooSmall { amount: Chips, minimum: Chips },

    #[error("Can only view own cards")]
    NotOwnCards,

    #[error("No active players")]
    NoActivePlayers,

    /// 零地址是“未设置”的占位值，不能作为参与者
    #[error("Caller is the zero address")]
    ZeroAddress,

    /// 筹码累加溢出。正常的下注规模不会触发。
    #[error("Chip amount overflow")]
    InvalidAmount,
}

pub type TableResult<T> = Result<T, TableError>;

/// 从线上格式（纯数字）还原枚举时的错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid suit: {0}, expected 0..=3")]
    Suit(u8),
    #[error("invalid rank: {0}, expected 1..=13")]
    Rank(u8),
    #[error("invalid game state: {0}, expected 0..=4")]
    GameState(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_human_readable() {
        let err = TableError::InsufficientStake { stake: 999, minimum: 1000 };
        assert_eq!(err.to_string(), "Insufficient chips: staked 999, minimum is 1000");
        assert_eq!(TableError::NotOwnCards.to_string(), "Can only view own cards");
        assert_eq!(TableError::GameNotFound(7).to_string(), "Game does not exist: 7");
    }

    #[test]
    fn test_kind_survives_serialization() {
        let err = TableError::BetTooSmall { amount: 99, minimum: 100 };
        let json = serde_json::to_string(&err).unwrap();
        let back: TableError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }
}
