//! 将军检测
//!
//! 统计攻击某个王的敌方棋子数量。象除了按实际可达格判断以外，
//! 还会按斜线上被占据的中间格数量判断“隔子攻击”，用来发现牵制，
//! 同时避免走法生成与将军检测之间的无限递归。

use crate::board::Board;
use crate::constants::{COMMITTED_INTERPOSE_THRESHOLD, PRE_MOVE_INTERPOSE_THRESHOLD};
use crate::moves::MoveGenerator;
use crate::piece::{Color, Piece, PieceVariant, Position};

/// 遮挡阈值模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackMode {
    /// 枚举某个棋子的候选走法时使用：斜线上最多允许一个被占据的中间格，
    /// 且该格必须是正在走的棋子本身（即该棋子被牵制）
    ///
    /// 比单纯计数更严格：只数遮挡格时，一个无关的遮挡子也会被当成牵制，
    /// 错误地限制正在走的棋子。
    PreMove(Position),
    /// 判定已经落子的局面（将死、困毙）时使用：斜线必须完全畅通
    Committed,
}

impl AttackMode {
    /// 被占据的中间格必须少于此数
    pub fn threshold(&self) -> usize {
        match self {
            AttackMode::PreMove(_) => PRE_MOVE_INTERPOSE_THRESHOLD,
            AttackMode::Committed => COMMITTED_INTERPOSE_THRESHOLD,
        }
    }
}

/// 将军状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttackStatus {
    /// 同时攻击王的棋子数
    pub count: usize,
    /// 遍历中最后找到的攻击者位置
    pub attacker: Option<Position>,
}

impl AttackStatus {
    pub fn is_attacked(&self) -> bool {
        self.count > 0
    }

    /// 双将
    pub fn is_double(&self) -> bool {
        self.count > 1
    }
}

/// 将军检测器
pub struct AttackDetector;

impl AttackDetector {
    /// 统计攻击 `king` 的敌方棋子
    pub fn attack_status(board: &Board, king: &Piece, mode: AttackMode) -> AttackStatus {
        let mut status = AttackStatus::default();

        for (_, enemy) in board.pieces_of(king.color.opponent()) {
            let reaches = MoveGenerator::reach(board, enemy, true, None).contains(&king.position);
            let x_rays = !reaches
                && enemy.variant == PieceVariant::Bishop
                && enemy.position.shares_diagonal(king.position)
                && Self::line_open(board, enemy.position, king.position, mode);

            if reaches || x_rays {
                status.count += 1;
                status.attacker = Some(enemy.position);
            }
        }

        status
    }

    /// 指定阵营的王是否被攻击，没有王视为不被攻击
    pub fn is_in_check(board: &Board, color: Color, mode: AttackMode) -> bool {
        match board.find_king(color) {
            Some(king) => Self::attack_status(board, board.piece(king), mode).is_attacked(),
            None => false,
        }
    }

    /// 统计 `from` 与 `to` 之间被占据的格子数
    pub fn interposed_count(board: &Board, from: Position, to: Position) -> usize {
        interpose(from, to)
            .into_iter()
            .filter(|&pos| board.occupant(pos).is_some())
            .count()
    }

    fn line_open(board: &Board, from: Position, to: Position, mode: AttackMode) -> bool {
        let blockers: Vec<Position> = interpose(from, to)
            .into_iter()
            .filter(|&pos| board.occupant(pos).is_some())
            .collect();

        if blockers.len() >= mode.threshold() {
            return false;
        }
        match mode {
            AttackMode::PreMove(mover) => blockers.iter().all(|&pos| pos == mover),
            AttackMode::Committed => true,
        }
    }
}

/// `from` 与 `to` 之间的格子（不含两端），按从 `from` 出发的顺序排列
///
/// 两点不在同一行、列或斜线上时返回空。
pub fn interpose(from: Position, to: Position) -> Vec<Position> {
    let (dx, dy) = from.delta(to);
    let aligned = dx == 0 || dy == 0 || dx.abs() == dy.abs();
    if !aligned || (dx == 0 && dy == 0) {
        return Vec::new();
    }

    let (step_x, step_y) = (dx.signum(), dy.signum());
    let mut squares = Vec::new();
    let mut current = from;
    while let Some(next) = current.offset(step_x, step_y) {
        if next == to {
            break;
        }
        squares.push(next);
        current = next;
    }
    squares
}
