//! 王、象、马变体的 AI 引擎
//!
//! 包含:
//! - 走法选择策略接口与工厂
//! - 贪心、王居中两种简单策略
//! - Minimax 与 Alpha-Beta 剪枝搜索
//! - 象马杀单王专用搜索
//! - 子力评估
//! - Zobrist 哈希

mod error;
mod evaluate;
mod greedy;
mod kbnk;
mod search;
mod strategy;
mod zobrist;

pub use error::AiError;
pub use evaluate::{Evaluator, DRAW_SCORE, MATE_SCORE};
pub use greedy::{CenterStrategy, GreedyStrategy};
pub use kbnk::{CornerMap, KbnkStrategy, KBNK_DRAW_SCORE, KBNK_LEAF_BASE, KBNK_MATE_SCORE};
pub use search::{AiConfig, AlphaBetaStrategy, Difficulty, MinimaxStrategy, SearchResult};
pub use strategy::{build_strategy, Proposal, Strategy, StrategyKind};
pub use zobrist::ZobristTable;
