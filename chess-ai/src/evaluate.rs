//! 棋局评估函数

use chess_rules::{AttackDetector, AttackMode, Board, Color, MoveGenerator};

/// 将死分值，每多一层减一分，越快的将死分值越高
pub const MATE_SCORE: i32 = 10_000;

/// 和棋分值
pub const DRAW_SCORE: i32 = 0;

/// 评估器
pub struct Evaluator;

impl Evaluator {
    /// 子力评估（白方视角，正值对白方有利）
    ///
    /// 每个非王棋子计 3 分。
    pub fn material(board: &Board) -> i32 {
        board
            .pieces()
            .map(|(_, piece)| match piece.color {
                Color::White => piece.value(),
                Color::Black => -piece.value(),
            })
            .sum()
    }

    /// `side` 在第 `ply` 层被将死时的分值（白方视角）
    pub fn mated_score(side: Color, ply: u32) -> i32 {
        let score = MATE_SCORE - ply as i32;
        match side {
            Color::White => -score,
            Color::Black => score,
        }
    }

    /// 轮到 `side` 走但无子可动时的终局分值，仍有走法时返回 None
    pub fn terminal(board: &Board, side: Color, ply: u32) -> Option<i32> {
        if MoveGenerator::has_legal_move(board, side) {
            return None;
        }
        Some(Self::no_move_score(board, side, ply))
    }

    /// 无子可动：被将军为将死，否则为困毙
    pub fn no_move_score(board: &Board, side: Color, ply: u32) -> i32 {
        if AttackDetector::is_in_check(board, side, AttackMode::Committed) {
            Self::mated_score(side, ply)
        } else {
            DRAW_SCORE
        }
    }
}
