//! # 三张牌扑克牌桌核心库
//!
//! 这个 `core` crate 包含牌桌的全部状态管理：开桌、入座、发牌、
//! 下注与弃牌记账、奖池累计，以及比牌时的牌力评估，
//! 还有客户端-服务器通信消息的定义。
//! 筹码只是一个数字，真正的价值托管和支付由外部完成，
//! 所以它可以被任何上层应用（网络服务器、链上合约的宿主等）复用。

mod card;
mod config;
mod error;
mod logic;
mod message;
mod state;

pub use card::*;

pub use config::*;

pub use error::*;

pub use logic::*;

pub use message::*;

pub use state::*;
