use crate::card::{best_hand, Card, Deck};
use crate::config::{TableConfig, MAX_SEATS};
use crate::error::{TableError, TableResult};
use crate::message::{GameEvent, Resolution};
use crate::state::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// 牌桌引擎
///
/// 持有所有牌局记录以及单调递增的牌局编号。每个操作都是原子的：
/// 先检查全部前置条件，全部通过后才修改状态并返回产生的事件；
/// 任何一项检查失败都直接返回错误，状态保持不变。
///
/// 引擎本身不转移任何价值。`GameEnded` 事件中的奖池由外部托管方支付给赢家。
#[derive(Debug)]
pub struct GameTable {
    config: TableConfig,
    games: BTreeMap<GameId, Game>,
    next_game_id: GameId,
    rng: StdRng,
}

impl GameTable {
    /// 使用操作系统提供的随机数种子创建引擎
    ///
    /// # Panics
    /// 如果 `max_players` 为 0 或超过 [`MAX_SEATS`]，则会 panic。
    pub fn new(config: TableConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// 使用固定种子创建引擎，同样的调用序列会发出同样的牌
    pub fn with_seed(config: TableConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: TableConfig, rng: StdRng) -> Self {
        assert!(
            config.max_players >= 1 && config.max_players <= MAX_SEATS,
            "Number of seats must be between 1 and {}.",
            MAX_SEATS
        );
        GameTable {
            config,
            games: BTreeMap::new(),
            next_game_id: 1,
            rng,
        }
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    // --- 会改变状态的操作 ---

    /// 开一张新牌桌，调用者坐在 0 号座位并押上入场筹码
    pub fn create_game(&mut self, caller: Address, stake: Chips) -> TableResult<(GameId, Vec<GameEvent>)> {
        check_caller(&caller)?;
        check_stake(&self.config, stake)?;

        let game_id = self.next_game_id;
        let mut deck = Deck::shuffled(&mut self.rng);
        let hand = deck
            .deal_hand()
            .ok_or(TableError::TableFull { capacity: self.config.max_players })?;

        let game = Game {
            id: game_id,
            creator: caller,
            players: vec![Player { address: caller, chips: stake, is_active: true, hand }],
            pot: stake,
            state: GameState::Waiting,
            winner: None,
            deck,
        };
        self.games.insert(game_id, game);
        self.next_game_id += 1;

        info!(game_id, creator = %caller, stake, "牌桌已创建");
        Ok((game_id, vec![GameEvent::GameCreated { game_id, creator: caller }]))
    }

    /// 在牌局开始前加入牌桌
    pub fn join_game(&mut self, caller: Address, game_id: GameId, stake: Chips) -> TableResult<Vec<GameEvent>> {
        let capacity = self.config.max_players;
        let min_entry_stake = self.config.min_entry_stake;
        check_caller(&caller)?;
        let game = self.game_mut(game_id)?;

        if game.state != GameState::Waiting {
            return Err(TableError::GameAlreadyStarted);
        }
        if game.is_seated(&caller) {
            return Err(TableError::AlreadyJoined);
        }
        if game.players.len() >= capacity {
            return Err(TableError::TableFull { capacity });
        }
        if stake < min_entry_stake {
            return Err(TableError::InsufficientStake { stake, minimum: min_entry_stake });
        }
        let pot = game.pot.checked_add(stake).ok_or(TableError::InvalidAmount)?;
        let hand = game.deck.deal_hand().ok_or(TableError::TableFull { capacity })?;

        game.pot = pot;
        game.players.push(Player { address: caller, chips: stake, is_active: true, hand });

        debug!(game_id, player = %caller, stake, seats = game.players.len(), "玩家入座");
        Ok(vec![GameEvent::PlayerJoined { game_id, player: caller }])
    }

    /// 房主开始游戏，牌桌直接进入下注阶段，不再接受新玩家
    pub fn start_game(&mut self, caller: Address, game_id: GameId) -> TableResult<Vec<GameEvent>> {
        let game = self.game_mut(game_id)?;

        if game.creator != caller {
            return Err(TableError::NotCreator);
        }
        if game.state != GameState::Waiting {
            return Err(TableError::InvalidState);
        }
        // 至少两人才能开局，否则弃牌后没有人能赢得奖池
        if game.players.len() < 2 {
            return Err(TableError::InvalidState);
        }

        // 手牌在入座时已经发好，Started 只是一个过渡状态
        game.state = GameState::Started;
        game.state = GameState::Betting;

        info!(game_id, players = game.players.len(), pot = game.pot, "牌局开始");
        Ok(vec![GameEvent::GameStarted { game_id }])
    }

    pub fn place_bet(&mut self, caller: Address, game_id: GameId, amount: Chips) -> TableResult<Vec<GameEvent>> {
        let min_bet = self.config.min_bet;
        let game = self.game_mut(game_id)?;

        if game.state != GameState::Betting {
            return Err(TableError::InvalidState);
        }
        let player = game
            .player(&caller)
            .filter(|p| p.is_active)
            .ok_or(TableError::NotActivePlayer)?;
        if amount < min_bet {
            return Err(TableError::BetTooSmall { amount, minimum: min_bet });
        }
        let chips = player.chips.checked_add(amount).ok_or(TableError::InvalidAmount)?;
        let pot = game.pot.checked_add(amount).ok_or(TableError::InvalidAmount)?;

        game.pot = pot;
        if let Some(player) = game.player_mut(&caller) {
            player.chips = chips;
        }

        debug!(game_id, player = %caller, amount, pot, "下注");
        Ok(vec![GameEvent::BetPlaced { game_id, player: caller, amount }])
    }

    /// 弃牌。如果弃牌后只剩一名玩家，该玩家立即赢得整个奖池。
    pub fn fold(&mut self, caller: Address, game_id: GameId) -> TableResult<Vec<GameEvent>> {
        let game = self.game_mut(game_id)?;

        if game.state != GameState::Betting {
            return Err(TableError::InvalidState);
        }
        let player = game.player_mut(&caller).ok_or(TableError::NotActivePlayer)?;
        if !player.is_active {
            return Err(TableError::AlreadyFolded);
        }
        player.is_active = false;
        debug!(game_id, player = %caller, "弃牌");

        let mut events = vec![GameEvent::PlayerFolded { game_id, player: caller }];

        let last_standing = {
            let mut active = game.active_players();
            match (active.next(), active.next()) {
                (Some(p), None) => Some(p.address),
                _ => None,
            }
        };
        if let Some(winner) = last_standing {
            events.push(finish(game, winner, Resolution::Attrition));
        }

        Ok(events)
    }

    /// 比牌：所有未弃牌玩家中牌力最大者赢得奖池。任何人都可以触发。
    pub fn showdown(&mut self, caller: Address, game_id: GameId) -> TableResult<Vec<GameEvent>> {
        let game = self.game_mut(game_id)?;

        if game.state != GameState::Betting {
            return Err(TableError::InvalidState);
        }
        let (winner, strength) = best_hand(game.active_players().map(|p| (p.address, &p.hand)))
            .ok_or(TableError::NoActivePlayers)?;

        debug!(game_id, caller = %caller, "摊牌");
        game.state = GameState::Showdown;
        let event = finish(game, winner, Resolution::Showdown { winning_hand: strength });

        Ok(vec![event])
    }

    // --- 只读查询 ---
    // 查询不存在的牌局或玩家时统一返回占位记录，而不是错误。

    pub fn get_game(&self, game_id: GameId) -> GameInfo {
        self.games
            .get(&game_id)
            .map_or_else(|| GameInfo::sentinel(game_id), Game::info)
    }

    pub fn get_player_info(&self, game_id: GameId, address: Address) -> PlayerInfo {
        self.games
            .get(&game_id)
            .and_then(|g| g.player(&address))
            .map_or_else(|| PlayerInfo::sentinel(address), PlayerInfo::from)
    }

    /// 所有座位的公开信息，按加入顺序
    pub fn get_players(&self, game_id: GameId) -> Vec<PlayerInfo> {
        self.games
            .get(&game_id)
            .map(|g| g.players.iter().map(PlayerInfo::from).collect())
            .unwrap_or_default()
    }

    /// 查看手牌，只能查看自己的；未入座时返回空列表。
    ///
    /// 注意：这只是对调用者身份的访问检查，并不是保密手段。
    /// 持有引擎的一方可以通过 [`GameTable::game`] 读到所有人的手牌。
    pub fn get_player_cards(&self, caller: Address, game_id: GameId, address: Address) -> TableResult<Vec<Card>> {
        if caller != address {
            return Err(TableError::NotOwnCards);
        }
        Ok(self
            .games
            .get(&game_id)
            .and_then(|g| g.player(&address))
            .map(|p| p.hand.to_vec())
            .unwrap_or_default())
    }

    /// 完整的牌局记录（包括所有手牌）
    pub fn game(&self, game_id: GameId) -> Option<&Game> {
        self.games.get(&game_id)
    }

    /// 已创建的牌局数量
    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    fn game_mut(&mut self, game_id: GameId) -> TableResult<&mut Game> {
        self.games.get_mut(&game_id).ok_or(TableError::GameNotFound(game_id))
    }
}

// --- 辅助逻辑函数 ---

fn check_caller(caller: &Address) -> TableResult<()> {
    if caller.is_nil() {
        return Err(TableError::ZeroAddress);
    }
    Ok(())
}

fn check_stake(config: &TableConfig, stake: Chips) -> TableResult<()> {
    if stake < config.min_entry_stake {
        return Err(TableError::InsufficientStake { stake, minimum: config.min_entry_stake });
    }
    Ok(())
}

/// 结算：记录赢家并结束牌局，赢家一旦设置就不再改变
fn finish(game: &mut Game, winner: Address, resolution: Resolution) -> GameEvent {
    game.winner = Some(winner);
    game.state = GameState::Finished;

    info!(game_id = game.id, winner = %winner, pot = game.pot, ?resolution, "牌局结束");
    GameEvent::GameEnded { game_id: game.id, winner, pot: game.pot, resolution }
}

// --- 单元测试 ---
