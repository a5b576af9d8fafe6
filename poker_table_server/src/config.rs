use std::net::SocketAddr;

use clap::Parser;
use poker_table_core::{Chips, TableConfig, MAX_SEATS};

/// 命令行参数，均可用环境变量代替
#[derive(Debug, Parser)]
#[command(name = "poker_table_server", about = "Three card poker table over WebSocket")]
pub struct Args {
    /// 监听地址
    #[arg(long, env = "POKER_TABLE_BIND", default_value = "0.0.0.0:25917")]
    pub bind: SocketAddr,

    #[arg(long, env = "POKER_TABLE_MIN_ENTRY_STAKE", default_value_t = TableConfig::default().min_entry_stake)]
    pub min_entry_stake: Chips,

    #[arg(long, env = "POKER_TABLE_MIN_BET", default_value_t = TableConfig::default().min_bet)]
    pub min_bet: Chips,

    #[arg(long, env = "POKER_TABLE_MAX_PLAYERS", default_value_t = TableConfig::default().max_players, value_parser = parse_seats)]
    pub max_players: usize,

    /// 固定随机数种子，便于复现发牌
    #[arg(long, env = "POKER_TABLE_SEED")]
    pub seed: Option<u64>,
}

impl Args {
    pub fn table_config(&self) -> TableConfig {
        TableConfig {
            min_entry_stake: self.min_entry_stake,
            min_bet: self.min_bet,
            max_players: self.max_players,
        }
    }
}

fn parse_seats(s: &str) -> Result<usize, String> {
    let seats: usize = s.parse().map_err(|e| format!("{e}"))?;
    if seats == 0 || seats > MAX_SEATS {
        return Err(format!("seats must be between 1 and {MAX_SEATS}"));
    }
    Ok(seats)
}
