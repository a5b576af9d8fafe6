use dashmap::DashMap;
use poker_table_core::{Address, Chips, ClientMessage, GameEvent, GameTable, ServerMessage};

/// 价值托管方：牌局结束时把整个奖池记到赢家名下
#[derive(Default)]
pub struct Treasury {
    balances: DashMap<Address, Chips>,
}

impl Treasury {
    pub fn settle(&self, event: &GameEvent) {
        if let GameEvent::GameEnded { winner, pot, .. } = event {
            let mut balance = self.balances.entry(*winner).or_insert(0);
            match balance.checked_add(*pot) {
                Some(total) => *balance = total,
                None => tracing::warn!("赢家 {} 的余额溢出，奖池 {} 未入账", winner, pot),
            }
        }
    }

    pub fn balance(&self, address: &Address) -> Chips {
        self.balances.get(address).map_or(0, |b| *b)
    }
}

/// 一条消息处理完后需要发出的内容
#[derive(Debug, Default)]
pub struct Outcome {
    /// 只发给请求者
    pub reply: Vec<ServerMessage>,
    /// 广播给所有连接
    pub broadcast: Vec<ServerMessage>,
}

/// 把客户端文本帧解析成消息，失败时给出可以直接回复的错误
pub fn parse_message(text: &str) -> Result<ClientMessage, ServerMessage> {
    serde_json::from_str::<ClientMessage>(text).map_err(|e| ServerMessage::BadRequest { message: e.to_string() })
}

/// 核心消息处理逻辑
///
/// 调用者必须独占 `table`，保证每次调用完整执行后才处理下一条。
pub fn dispatch(table: &mut GameTable, treasury: &Treasury, caller: Address, msg: ClientMessage) -> Outcome {
    let result = match msg {
        ClientMessage::CreateGame { stake } => table
            .create_game(caller, stake)
            .map(|(game_id, events)| (vec![ServerMessage::GameCreated { game_id }], events)),
        ClientMessage::JoinGame { game_id, stake } => {
            table.join_game(caller, game_id, stake).map(|events| (vec![], events))
        }
        ClientMessage::StartGame { game_id } => table.start_game(caller, game_id).map(|events| (vec![], events)),
        ClientMessage::PlaceBet { game_id, amount } => {
            table.place_bet(caller, game_id, amount).map(|events| (vec![], events))
        }
        ClientMessage::Fold { game_id } => table.fold(caller, game_id).map(|events| (vec![], events)),
        ClientMessage::Showdown { game_id } => table.showdown(caller, game_id).map(|events| (vec![], events)),
        ClientMessage::GetGame { game_id } => Ok((vec![ServerMessage::Game(table.get_game(game_id))], vec![])),
        ClientMessage::GetPlayerInfo { game_id, address } => Ok((
            vec![ServerMessage::PlayerInfo(table.get_player_info(game_id, address))],
            vec![],
        )),
        ClientMessage::GetPlayerCards { game_id, address } => table
            .get_player_cards(caller, game_id, address)
            .map(|cards| (vec![ServerMessage::PlayerCards { game_id, cards }], vec![])),
        ClientMessage::Balance => Ok((vec![ServerMessage::Balance { amount: treasury.balance(&caller) }], vec![])),
    };

    match result {
        Ok((reply, events)) => {
            for event in &events {
                treasury.settle(event);
            }
            Outcome {
                reply,
                broadcast: events.into_iter().map(ServerMessage::from).collect(),
            }
        }
        Err(error) => Outcome {
            reply: vec![error.into()],
            broadcast: vec![],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poker_table_core::{GameState, Resolution, TableConfig, TableError};
    use uuid::Uuid;

    fn setup() -> (GameTable, Treasury, Address, Address) {
        let table = GameTable::with_seed(TableConfig::default(), 1);
        (table, Treasury::default(), Uuid::new_v4(), Uuid::new_v4())
    }

    fn created_game_id(outcome: &Outcome) -> u64 {
        match outcome.reply.as_slice() {
            [ServerMessage::GameCreated { game_id }] => *game_id,
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[test]
    fn test_create_replies_to_creator_and_broadcasts_event() {
        let (mut table, treasury, alice, _) = setup();
        let outcome = dispatch(&mut table, &treasury, alice, ClientMessage::CreateGame { stake: 1000 });

        assert_eq!(created_game_id(&outcome), 1);
        assert!(matches!(
            outcome.broadcast.as_slice(),
            [ServerMessage::Event(GameEvent::GameCreated { game_id: 1, creator })] if *creator == alice
        ));
    }

    #[test]
    fn test_errors_go_only_to_caller() {
        let (mut table, treasury, alice, bob) = setup();
        let game_id = created_game_id(&dispatch(&mut table, &treasury, alice, ClientMessage::CreateGame { stake: 1000 }));

        let outcome = dispatch(&mut table, &treasury, bob, ClientMessage::StartGame { game_id });
        assert!(outcome.broadcast.is_empty());
        match outcome.reply.as_slice() {
            [ServerMessage::Error { error, message }] => {
                assert_eq!(*error, TableError::NotCreator);
                assert_eq!(message, "Not game creator");
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[test]
    fn test_full_game_credits_winner() {
        let (mut table, treasury, alice, bob) = setup();
        let game_id = created_game_id(&dispatch(&mut table, &treasury, alice, ClientMessage::CreateGame { stake: 1000 }));
        dispatch(&mut table, &treasury, bob, ClientMessage::JoinGame { game_id, stake: 1000 });
        dispatch(&mut table, &treasury, alice, ClientMessage::StartGame { game_id });
        dispatch(&mut table, &treasury, alice, ClientMessage::PlaceBet { game_id, amount: 300 });

        let outcome = dispatch(&mut table, &treasury, bob, ClientMessage::Fold { game_id });
        assert_eq!(outcome.broadcast.len(), 2);
        assert!(matches!(
            &outcome.broadcast[1],
            ServerMessage::Event(GameEvent::GameEnded { winner, pot: 2300, resolution: Resolution::Attrition, .. })
                if *winner == alice
        ));

        assert_eq!(treasury.balance(&alice), 2300);
        assert_eq!(treasury.balance(&bob), 0);

        let outcome = dispatch(&mut table, &treasury, alice, ClientMessage::Balance);
        assert!(matches!(outcome.reply.as_slice(), [ServerMessage::Balance { amount: 2300 }]));

        let outcome = dispatch(&mut table, &treasury, bob, ClientMessage::GetGame { game_id });
        match outcome.reply.as_slice() {
            [ServerMessage::Game(info)] => {
                assert_eq!(info.state, GameState::Finished);
                assert_eq!(info.winner, alice);
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[test]
    fn test_card_queries() {
        let (mut table, treasury, alice, bob) = setup();
        let game_id = created_game_id(&dispatch(&mut table, &treasury, alice, ClientMessage::CreateGame { stake: 1000 }));
        dispatch(&mut table, &treasury, bob, ClientMessage::JoinGame { game_id, stake: 1000 });

        let own = dispatch(&mut table, &treasury, bob, ClientMessage::GetPlayerCards { game_id, address: bob });
        assert!(matches!(own.reply.as_slice(), [ServerMessage::PlayerCards { cards, .. }] if cards.len() == 3));

        let other = dispatch(&mut table, &treasury, bob, ClientMessage::GetPlayerCards { game_id, address: alice });
        assert!(matches!(
            other.reply.as_slice(),
            [ServerMessage::Error { error: TableError::NotOwnCards, .. }]
        ));

        let info = dispatch(&mut table, &treasury, bob, ClientMessage::GetPlayerInfo { game_id, address: alice });
        assert!(matches!(
            info.reply.as_slice(),
            [ServerMessage::PlayerInfo(p)] if p.address == alice && p.hand_size == 3 && p.is_active
        ));
    }

    #[test]
    fn test_overflowing_credit_is_not_clamped() {
        let treasury = Treasury::default();
        let winner = Uuid::new_v4();
        let ended = |pot| GameEvent::GameEnded { game_id: 1, winner, pot, resolution: Resolution::Attrition };

        treasury.settle(&ended(Chips::MAX - 5));
        treasury.settle(&ended(10));
        assert_eq!(treasury.balance(&winner), Chips::MAX - 5);

        treasury.settle(&ended(5));
        assert_eq!(treasury.balance(&winner), Chips::MAX);
    }

    #[test]
    fn test_parse_message() {
        assert!(matches!(
            parse_message(r#"{"Fold":{"game_id":3}}"#),
            Ok(ClientMessage::Fold { game_id: 3 })
        ));
        assert!(matches!(parse_message("not json"), Err(ServerMessage::BadRequest { .. })));
    }
}
