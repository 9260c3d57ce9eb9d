//! 错误类型定义

use thiserror::Error;

/// 规则错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChessError {
    /// 无效的位置
    #[error("Invalid position: ({x}, {y})")]
    InvalidPosition { x: i16, y: i16 },

    /// 位置已被占据
    #[error("Square ({x}, {y}) is already occupied")]
    SquareOccupied { x: u8, y: u8 },

    /// 没有棋子
    #[error("No piece at position ({x}, {y})")]
    NoPiece { x: u8, y: u8 },

    /// 棋子已被吃掉或不存在
    #[error("Piece #{0} is not on the board")]
    UnknownPiece(usize),

    /// 不是你的回合
    #[error("Not your turn")]
    NotYourTurn,

    /// 无效的 FEN 字符串
    #[error("Invalid FEN string: {reason}")]
    InvalidFen { reason: String },

    /// 游戏已结束
    #[error("Game is already over")]
    GameOver,
}

/// 规则操作结果类型
pub type Result<T> = std::result::Result<T, ChessError>;
