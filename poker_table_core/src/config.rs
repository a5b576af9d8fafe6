use crate::Chips;
use serde::{Deserialize, Serialize};

/// 一副牌 52 张，每个座位 3 张，因此一张牌桌最多 17 个座位
pub const MAX_SEATS: usize = 52 / 3;

/// 牌桌规则参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// 创建或加入牌桌的最低筹码
    pub min_entry_stake: Chips,
    /// 单次下注的最低金额
    pub min_bet: Chips,
    /// 每张牌桌的座位上限（包含房主）
    pub max_players: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            min_entry_stake: 1000,
            min_bet: 100,
            max_players: 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TableConfig::default();
        assert_eq!(config.min_entry_stake, 1000);
        assert_eq!(config.min_bet, 100);
        assert_eq!(config.max_players, 6);
        assert!(config.max_players <= MAX_SEATS);
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let config: TableConfig = serde_json::from_str(r#"{"min_bet": 50}"#).unwrap();
        assert_eq!(config.min_bet, 50);
        assert_eq!(config.min_entry_stake, 1000);
        assert_eq!(config.max_players, 6);
    }
}
