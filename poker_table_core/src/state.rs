use crate::card::{Card, Deck};
use crate::error::DecodeError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type GameId = u64;
/// 参与者身份。`Uuid::nil()` 代表“零地址”，即未设置。
pub type Address = Uuid;
pub type Chips = u64;

/// 一张牌桌（一局游戏）的完整记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub creator: Address,
    // 按加入顺序排列，房主永远在 0 号座位
    pub players: Vec<Player>,
    pub pot: Chips, // 总奖池金额，结算前只增不减
    pub state: GameState,
    pub winner: Option<Address>,
    // 本局剩余的牌，不会发给客户端
    #[serde(skip)]
    pub deck: Deck,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub address: Address,
    pub chips: Chips, // 入场筹码加上之后所有下注
    pub is_active: bool, // 弃牌后为 false，本局内不可恢复
    pub hand: [Card; 3], // 入场时发牌，之后不再改变
}

/// 牌桌生命周期，只能按顺序前进：
/// Waiting -> Started -> Betting -> Showdown -> Finished
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum GameState {
    Waiting = 0,
    Started = 1,
    Betting = 2,
    Showdown = 3,
    Finished = 4,
}

/// `get_game` 的返回值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInfo {
    pub game_id: GameId,
    pub creator: Address,
    pub player_count: usize,
    pub pot: Chips,
    pub state: GameState,
    pub winner: Address,
}

/// `get_player_info` 的返回值，任何人都可以查询
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub address: Address,
    pub chips: Chips,
    pub hand_size: usize,
    pub is_active: bool,
}

impl From<GameState> for u8 {
    fn from(state: GameState) -> u8 {
        state as u8
    }
}

impl TryFrom<u8> for GameState {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(GameState::Waiting),
            1 => Ok(GameState::Started),
            2 => Ok(GameState::Betting),
            3 => Ok(GameState::Showdown),
            4 => Ok(GameState::Finished),
            _ => Err(DecodeError::GameState(value)),
        }
    }
}

// --- Game 的实现方法 ---

impl Game {
    pub fn player(&self, address: &Address) -> Option<&Player> {
        self.players.iter().find(|p| p.address == *address)
    }

    pub(crate) fn player_mut(&mut self, address: &Address) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.address == *address)
    }

    pub fn is_seated(&self, address: &Address) -> bool {
        self.player(address).is_some()
    }

    /// 还没有弃牌的玩家，按座位顺序
    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_active)
    }

    pub fn info(&self) -> GameInfo {
        GameInfo {
            game_id: self.id,
            creator: self.creator,
            player_count: self.players.len(),
            pot: self.pot,
            state: self.state,
            winner: self.winner.unwrap_or(Address::nil()),
        }
    }
}

impl GameInfo {
    /// 查询不存在的牌桌时返回的占位记录：creator 与 winner 都是零地址
    pub fn sentinel(game_id: GameId) -> Self {
        GameInfo {
            game_id,
            creator: Address::nil(),
            player_count: 0,
            pot: 0,
            state: GameState::Waiting,
            winner: Address::nil(),
        }
    }

    pub fn exists(&self) -> bool {
        !self.creator.is_nil()
    }
}

impl PlayerInfo {
    pub fn sentinel(address: Address) -> Self {
        PlayerInfo { address, chips: 0, hand_size: 0, is_active: false }
    }
}

impl From<&Player> for PlayerInfo {
    fn from(player: &Player) -> Self {
        PlayerInfo {
            address: player.address,
            chips: player.chips,
            hand_size: player.hand.len(),
            is_active: player.is_active,
        }
    }
}
