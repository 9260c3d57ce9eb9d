//! 象马杀单王
//!
//! 把防守方的王赶向与象同色的角落。叶节点分值为 `60 - 角落距离`，
//! 将死为 `1000 - 层数`，和棋（困毙或防守方吃掉子力）为 0，
//! 低于任何非终局分值，所以进攻方会主动避开。分值始终是进攻方视角。

use chess_rules::{
    AttackDetector, AttackMode, Board, Color, MoveGenerator, PieceId, PieceVariant, Position,
    SQUARE_COUNT,
};
use tracing::debug;

use crate::error::AiError;
use crate::strategy::{Proposal, Strategy};

/// 将死分值
pub const KBNK_MATE_SCORE: i32 = 1000;

/// 叶节点分值的基准
pub const KBNK_LEAF_BASE: i32 = 60;

/// 和棋分值
pub const KBNK_DRAW_SCORE: i32 = 0;

/// 每个格子到最近的“象色角”的距离
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CornerMap {
    distances: [u8; SQUARE_COUNT],
}

impl CornerMap {
    /// 浅色象对应 (0, 0)、(7, 7)，深色象对应 (7, 0)、(0, 7)
    pub fn new(light_bishop: bool) -> Self {
        let mut distances = [0u8; SQUARE_COUNT];
        for pos in Position::all() {
            let (x, y) = (pos.x as i32, pos.y as i32);
            let distance = if light_bishop {
                (x + y).min(14 - x - y)
            } else {
                (7 - x + y).min(7 + x - y)
            };
            distances[pos.to_index()] = distance as u8;
        }
        Self { distances }
    }

    pub fn distance(&self, pos: Position) -> u8 {
        self.distances[pos.to_index()]
    }
}

/// 象马杀单王策略
#[derive(Debug, Clone)]
pub struct KbnkStrategy {
    attacker: Color,
    depth: u8,
    corners: CornerMap,
}

impl KbnkStrategy {
    /// 从局面中读取进攻方的象和马，以及双方的王
    pub fn new(board: &Board, attacker: Color, depth: u8) -> Result<Self, AiError> {
        if depth == 0 {
            return Err(AiError::InvalidDepth(depth));
        }

        let find = |color: Color, variant: PieceVariant| {
            board
                .pieces_of(color)
                .find(|(_, piece)| piece.variant == variant)
                .map(|(_, piece)| piece.position)
                .ok_or(AiError::MissingPiece { color, variant })
        };

        let bishop = find(attacker, PieceVariant::Bishop)?;
        find(attacker, PieceVariant::Knight)?;
        find(attacker, PieceVariant::King)?;
        find(attacker.opponent(), PieceVariant::King)?;

        Ok(Self {
            attacker,
            depth,
            corners: CornerMap::new(bishop.is_light()),
        })
    }

    pub fn corners(&self) -> &CornerMap {
        &self.corners
    }

    /// 搜索最佳走法并返回分值，进攻方取最大值，防守方取最小值
    pub fn search(&self, board: &mut Board, color: Color) -> Option<(Proposal, i32)> {
        let mut nodes = 0u64;
        let mut best: Option<(Proposal, i32)> = None;

        for (id, to) in MoveGenerator::all_legal_moves(board, color) {
            let score = self.child_score(board, color, id, to, self.depth - 1, 1, &mut nodes);
            if best.map_or(true, |(_, best_score)| self.improves(color, score, best_score)) {
                best = Some((Proposal::new(id, to), score));
            }
        }

        let (proposal, score) = best?;
        debug!(depth = self.depth, nodes, score, "kbnk search finished");
        Some((proposal, score))
    }

    fn improves(&self, side: Color, score: i32, best: i32) -> bool {
        if side == self.attacker {
            score > best
        } else {
            score < best
        }
    }

    /// 走一步后的分值；防守方吃子直接判和，不再展开
    #[allow(clippy::too_many_arguments)]
    fn child_score(
        &self,
        board: &mut Board,
        side: Color,
        id: PieceId,
        to: Position,
        depth: u8,
        ply: u32,
        nodes: &mut u64,
    ) -> i32 {
        if side != self.attacker && board.occupant(to) == Some(self.attacker) {
            return KBNK_DRAW_SCORE;
        }
        let mut guard = board.apply_scoped(id, to);
        self.node(&mut guard, side.opponent(), depth, ply, nodes)
    }

    fn node(&self, board: &mut Board, side: Color, depth: u8, ply: u32, nodes: &mut u64) -> i32 {
        *nodes += 1;

        let moves = MoveGenerator::all_legal_moves(board, side);
        if moves.is_empty() {
            return self.no_move_score(board, side, ply);
        }
        if depth == 0 {
            return self.leaf(board);
        }

        let mut best: Option<i32> = None;
        for (id, to) in moves {
            let score = self.child_score(board, side, id, to, depth - 1, ply + 1, nodes);
            if best.map_or(true, |best_score| self.improves(side, score, best_score)) {
                best = Some(score);
            }
        }
        best.unwrap_or(KBNK_DRAW_SCORE)
    }

    fn no_move_score(&self, board: &Board, side: Color, ply: u32) -> i32 {
        if !AttackDetector::is_in_check(board, side, AttackMode::Committed) {
            return KBNK_DRAW_SCORE;
        }
        let score = KBNK_MATE_SCORE - ply as i32;
        if side == self.attacker {
            -score
        } else {
            score
        }
    }

    fn leaf(&self, board: &Board) -> i32 {
        match board.find_king(self.attacker.opponent()) {
            Some(king) => {
                KBNK_LEAF_BASE - self.corners.distance(board.piece(king).position) as i32
            }
            None => KBNK_DRAW_SCORE,
        }
    }
}

impl Strategy for KbnkStrategy {
    fn name(&self) -> &'static str {
        "kbnk"
    }

    fn propose(&self, board: &mut Board, color: Color) -> Option<Proposal> {
        self.search(board, color).map(|(proposal, _)| proposal)
    }
}
