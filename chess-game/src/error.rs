//! 对局错误类型

use chess_ai::AiError;
use chess_rules::{ChessError, Color, Position};
use thiserror::Error;

/// 对局错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// 规则错误（不是你的回合、对局已结束、没有棋子等）
    #[error(transparent)]
    Rules(#[from] ChessError),

    /// 策略创建失败
    #[error(transparent)]
    Ai(#[from] AiError),

    /// 引擎给出了非法走法
    #[error("{strategy} proposed an illegal move for {color:?}: {from} -> {to}")]
    IllegalProposal {
        strategy: &'static str,
        color: Color,
        from: Position,
        to: Position,
    },

    /// 引擎在仍有合法走法时放弃
    #[error("{strategy} returned no move for {color:?} although legal moves exist")]
    NoProposal { strategy: &'static str, color: Color },
}

/// 对局操作结果类型
pub type Result<T> = std::result::Result<T, SessionError>;
