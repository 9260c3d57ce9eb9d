//! 走法选择策略

use chess_rules::{Board, Color, PieceId, Position};
use serde::{Deserialize, Serialize};

use crate::error::AiError;
use crate::greedy::{CenterStrategy, GreedyStrategy};
use crate::kbnk::KbnkStrategy;
use crate::search::{AiConfig, AlphaBetaStrategy, MinimaxStrategy};

/// 策略给出的走法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Proposal {
    pub piece: PieceId,
    pub to: Position,
}

impl Proposal {
    pub fn new(piece: PieceId, to: Position) -> Self {
        Self { piece, to }
    }
}

/// 走法选择策略
///
/// `propose` 可以在棋盘上试走，但返回前必须把棋盘还原。
/// 返回 None 表示 `color` 没有合法走法。
pub trait Strategy {
    fn name(&self) -> &'static str;

    fn propose(&self, board: &mut Board, color: Color) -> Option<Proposal>;
}

/// 策略类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// 第一个能走的棋子的第一个走法
    Greedy,
    /// 王向中心靠拢
    Center,
    /// 完整极小极大搜索
    Minimax,
    /// Alpha-Beta 剪枝搜索
    AlphaBeta,
    /// 象马杀单王
    Kbnk,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::Greedy,
        StrategyKind::Center,
        StrategyKind::Minimax,
        StrategyKind::AlphaBeta,
        StrategyKind::Kbnk,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Greedy => "greedy",
            StrategyKind::Center => "center",
            StrategyKind::Minimax => "minimax",
            StrategyKind::AlphaBeta => "alpha_beta",
            StrategyKind::Kbnk => "kbnk",
        }
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown strategy: {s}"))
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 按类型和配置创建策略
///
/// 象马杀单王策略需要在构造时读取 `color` 一方的象和马，其余策略忽略 `board`。
pub fn build_strategy(
    kind: StrategyKind,
    config: &AiConfig,
    board: &Board,
    color: Color,
) -> Result<Box<dyn Strategy>, AiError> {
    if config.max_depth == 0 && matches!(kind, StrategyKind::Minimax | StrategyKind::AlphaBeta) {
        return Err(AiError::InvalidDepth(config.max_depth));
    }

    let strategy: Box<dyn Strategy> = match kind {
        StrategyKind::Greedy => Box::new(GreedyStrategy),
        StrategyKind::Center => Box::new(CenterStrategy),
        StrategyKind::Minimax => Box::new(MinimaxStrategy::new(config.max_depth)),
        StrategyKind::AlphaBeta => Box::new(AlphaBetaStrategy::new(config.max_depth)),
        StrategyKind::Kbnk => Box::new(KbnkStrategy::new(board, color, config.max_depth)?),
    };
    Ok(strategy)
}
