//! 王、象、马变体国际象棋规则库
//!
//! 包含:
//! - 棋子、棋盘、位置等核心数据结构
//! - 可撤销的走子与作用域试走
//! - 将军检测（含牵制识别）
//! - 走法生成和规则验证
//! - FEN 局面格式

mod attack;
mod board;
mod constants;
mod error;
mod fen;
mod moves;
mod piece;

pub use attack::{interpose, AttackDetector, AttackMode, AttackStatus};
pub use board::{Board, MoveGuard, MoveKind, MoveRecord};
pub use constants::*;
pub use error::{ChessError, Result};
pub use fen::{Fen, INITIAL_FEN, KBNK_FEN};
pub use moves::MoveGenerator;
pub use piece::{Color, Piece, PieceId, PieceVariant, Position};
