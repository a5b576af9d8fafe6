use crate::error::DecodeError;
use rand::Rng;
use rand::prelude::SliceRandom;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
// --- 核心数据结构定义 ---

/// 花色 (Suit)
/// 线上格式为 0..=3。花色本身不分大小，
/// 只在牌力完全相同时作为最后的比较依据：Spade < Heart < Club < Diamond。
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Suit {
    Spade = 0,   // 黑桃 ♠️
    Heart = 1,   // 红心 ♥️
    Club = 2,    // 梅花 ♣️
    Diamond = 3, // 方块 ♦️
}

/// 点数 (Rank)
/// 线上格式为 1..=13，A 记作 1。
/// 比较时 A 是最大的（见 `Ord` 实现），只有在 A-2-3 顺子中才当作最小。
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Rank {
    Ace = 1,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

/// 单张扑克牌 (Card)
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

/// 三张牌的牌型等级，变体按从小到大排列，直接用派生的 `Ord` 比较。
/// 变体内部存储了同牌型比较所需的点数。
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Serialize, Deserialize)]
pub enum HandRank {
    HighCard(Rank, Rank, Rank), // 高牌
    Pair(Rank, Rank),           // 一对 (对子的点数, 踢脚牌)
    Straight(Rank),             // 顺子 (最高牌的点数)
    Flush(Rank, Rank, Rank),    // 同花
    StraightFlush(Rank),        // 同花顺 (最高牌的点数)
    ThreeOfAKind(Rank),         // 三条
}

/// 一手牌的完整强度：先比牌型，再按牌力从大到小逐张比较花色。
/// 同一局里不会出现重复的牌，所以两手不同的牌永远分得出大小。
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Serialize, Deserialize)]
pub struct HandStrength {
    pub rank: HandRank,
    pub suits: [Suit; 3],
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spade, Suit::Heart, Suit::Club, Suit::Diamond];
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace, Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six, Rank::Seven,
        Rank::Eight, Rank::Nine, Rank::Ten, Rank::Jack, Rank::Queen, Rank::King,
    ];

    /// 比较用的点数，A 为 14
    pub fn high_value(self) -> u8 {
        match self {
            Rank::Ace => 14,
            other => other as u8,
        }
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> Ordering {
        self.high_value().cmp(&other.high_value())
    }
}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { suit, rank }
    }
}

impl From<Suit> for u8 {
    fn from(suit: Suit) -> u8 {
        suit as u8
    }
}

impl TryFrom<u8> for Suit {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Suit::ALL.get(value as usize).copied().ok_or(DecodeError::Suit(value))
    }
}

impl From<Rank> for u8 {
    fn from(rank: Rank) -> u8 {
        rank as u8
    }
}

impl TryFrom<u8> for Rank {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1..=13 => Ok(Rank::ALL[value as usize - 1]),
            _ => Err(DecodeError::Rank(value)),
        }
    }
}

// --- 实现辅助功能 ---

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            Suit::Spade => "♠️",
            Suit::Heart => "♥️",
            Suit::Club => "♣️",
            Suit::Diamond => "♦️",
        })
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "T",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        })
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.suit, self.rank)
    }
}

impl fmt::Display for HandRank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HandRank::HighCard(r1, ..) => write!(f, "高牌({})", r1),
            HandRank::Pair(r1, _) => write!(f, "一对({})", r1),
            HandRank::Straight(r1) => write!(f, "顺子({})", r1),
            HandRank::Flush(r1, ..) => write!(f, "同花({})", r1),
            HandRank::StraightFlush(r1) => write!(f, "同花顺({})", r1),
            HandRank::ThreeOfAKind(r1) => write!(f, "三条({})", r1),
        }
    }
}

// --- 牌堆 ---

/// 创建一副完整的 52 张扑克牌
fn create_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(52);
    for &suit in &Suit::ALL {
        for &rank in &Rank::ALL {
            deck.push(Card { suit, rank });
        }
    }
    deck
}

/// 每张牌桌独享的一副洗好的牌，只从顶部发牌，不放回
#[derive(Debug, Clone, Default)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Deck {
        let mut cards = create_deck();
        cards.shuffle(rng);
        Deck { cards }
    }

    /// 发一手 3 张牌；剩余不足 3 张时返回 None
    pub fn deal_hand(&mut self) -> Option<[Card; 3]> {
        if self.cards.len() < 3 {
            return None;
        }
        let first = self.cards.pop()?;
        let second = self.cards.pop()?;
        let third = self.cards.pop()?;
        Some([first, second, third])
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }
}

// --- 牌型评估逻辑 ---

/// 评估一手 3 张牌
pub fn evaluate_hand(hand: &[Card; 3]) -> HandStrength {
    let mut cards = *hand;
    // 从大到小排序，点数相同时花色大的在前
    cards.sort_by(|a, b| b.rank.cmp(&a.rank).then(b.suit.cmp(&a.suit)));
    let ranks = cards.map(|c| c.rank);

    let is_flush = cards.windows(2).all(|w| w[0].suit == w[1].suit);
    // 特殊情况: A-2-3，A 当作 1
    let is_wheel = ranks == [Rank::Ace, Rank::Three, Rank::Two];
    let is_straight = is_wheel
        || ranks.windows(2).all(|w| w[0].high_value() == w[1].high_value() + 1);

    if is_wheel {
        cards.rotate_left(1);
    }
    let high_card = cards[0].rank;

    let rank = if ranks[0] == ranks[2] {
        HandRank::ThreeOfAKind(ranks[0])
    } else if is_straight && is_flush {
        HandRank::StraightFlush(high_card)
    } else if is_flush {
        HandRank::Flush(ranks[0], ranks[1], ranks[2])
    } else if is_straight {
        HandRank::Straight(high_card)
    } else if ranks[0] == ranks[1] {
        HandRank::Pair(ranks[0], ranks[2])
    } else if ranks[1] == ranks[2] {
        HandRank::Pair(ranks[1], ranks[0])
    } else {
        HandRank::HighCard(ranks[0], ranks[1], ranks[2])
    };

    HandStrength { rank, suits: cards.map(|c| c.suit) }
}

/// 从若干手牌中找出严格最大的一手。
/// 强度完全相同时保留先出现的那一手（即座位更靠前的玩家）。
pub fn best_hand<'a, K>(hands: impl IntoIterator<Item = (K, &'a [Card; 3])>) -> Option<(K, HandStrength)> {
    let mut best: Option<(K, HandStrength)> = None;
    for (key, hand) in hands {
        let strength = evaluate_hand(hand);
        if best.as_ref().map_or(true, |(_, b)| strength > *b) {
            best = Some((key, strength));
        }
    }
    best
}

// --- 单元测试 ---
