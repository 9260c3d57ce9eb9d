//! AI 错误类型

use chess_rules::{Color, PieceVariant};
use thiserror::Error;

/// AI 构造错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AiError {
    /// 局面缺少策略所需的棋子
    #[error("{color:?} {variant:?} is required but not on the board")]
    MissingPiece { color: Color, variant: PieceVariant },

    /// 搜索深度至少为 1
    #[error("Search depth must be at least 1, got {0}")]
    InvalidDepth(u8),
}
