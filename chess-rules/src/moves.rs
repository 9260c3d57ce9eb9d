//! 走法生成和验证

use crate::attack::{interpose, AttackDetector, AttackMode};
use crate::board::Board;
use crate::piece::{Color, Piece, PieceId, PieceVariant, Position};

/// 象的四个斜线方向
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// 马的八个跳点
const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-1, -2),
    (-2, 1),
    (1, -2),
    (2, -1),
    (-1, 2),
    (2, 1),
    (1, 2),
];

/// 王的八个相邻格
const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// 走法生成器
pub struct MoveGenerator;

impl MoveGenerator {
    /// 生成棋子的走法
    ///
    /// `check_legality` 为 false 时返回原始可达格（包括被己方占据、可以“保护”的格子），
    /// 供将军检测使用；为 true 时只返回走完后己方王安全的目标格。
    pub fn legal_moves(board: &Board, id: PieceId, check_legality: bool) -> Vec<Position> {
        let piece = board.piece(id);
        if !check_legality {
            return Self::reach(board, piece, true, None);
        }

        match piece.variant {
            PieceVariant::King => Self::safe_king_moves(board, piece),
            PieceVariant::Bishop | PieceVariant::Knight => {
                let moves = Self::reach(board, piece, false, None);
                Self::resolve_check(board, piece, moves)
            }
        }
    }

    /// 选中棋子时用于高亮的合法目标格
    pub fn legal_destinations(board: &Board, id: PieceId) -> Vec<Position> {
        Self::legal_moves(board, id, true)
    }

    /// 生成指定阵营的所有合法走法，按棋子顺序再按目标格顺序排列
    pub fn all_legal_moves(board: &Board, color: Color) -> Vec<(PieceId, Position)> {
        let mut moves = Vec::with_capacity(32);
        for &id in board.piece_ids() {
            if board.piece(id).color != color {
                continue;
            }
            moves.extend(
                Self::legal_moves(board, id, true)
                    .into_iter()
                    .map(|to| (id, to)),
            );
        }
        moves
    }

    /// 指定阵营是否还有合法走法
    pub fn has_legal_move(board: &Board, color: Color) -> bool {
        board
            .pieces_of(color)
            .any(|(id, _)| !Self::legal_moves(board, id, true).is_empty())
    }

    /// 原始可达格
    ///
    /// `include_own` 决定是否包含己方棋子所在格；`vacated` 指定的格子在滑动时视为空格。
    pub(crate) fn reach(
        board: &Board,
        piece: &Piece,
        include_own: bool,
        vacated: Option<Position>,
    ) -> Vec<Position> {
        match piece.variant {
            PieceVariant::Bishop => Self::bishop_reach(board, piece, include_own, vacated),
            PieceVariant::Knight => Self::step_reach(board, piece, &KNIGHT_OFFSETS, include_own),
            PieceVariant::King => Self::step_reach(board, piece, &KING_OFFSETS, include_own),
        }
    }

    /// 象沿斜线滑动，遇到棋子停下
    fn bishop_reach(
        board: &Board,
        piece: &Piece,
        include_own: bool,
        vacated: Option<Position>,
    ) -> Vec<Position> {
        let mut moves = Vec::with_capacity(13);

        for (dx, dy) in BISHOP_DIRECTIONS {
            let mut current = piece.position;
            while let Some(to) = current.offset(dx, dy) {
                let occupant = if Some(to) == vacated {
                    None
                } else {
                    board.occupant(to)
                };
                match occupant {
                    Some(color) if color == piece.color => {
                        if include_own {
                            moves.push(to);
                        }
                        break;
                    }
                    Some(_) => {
                        // 敌方棋子，可以吃
                        moves.push(to);
                        break;
                    }
                    None => moves.push(to),
                }
                current = to;
            }
        }

        moves
    }

    /// 马和王的单步走法
    fn step_reach(
        board: &Board,
        piece: &Piece,
        offsets: &[(i8, i8)],
        include_own: bool,
    ) -> Vec<Position> {
        offsets
            .iter()
            .filter_map(|&(dx, dy)| piece.position.offset(dx, dy))
            .filter(|&to| include_own || board.occupant(to) != Some(piece.color))
            .collect()
    }

    /// 王不能走进任何敌方棋子的可达格
    fn safe_king_moves(board: &Board, king: &Piece) -> Vec<Position> {
        let mut moves = Self::reach(board, king, false, None);

        for (_, enemy) in board.pieces_of(king.color.opponent()) {
            if moves.is_empty() {
                break;
            }
            // 王离开原位后，原位不再遮挡敌方的象
            let attacked = Self::reach(board, enemy, true, Some(king.position));
            moves.retain(|to| !attacked.contains(to));
        }

        moves
    }

    /// 被将军时，象和马只能吃掉攻击者或者挡在攻击线上；双将时无子可动
    fn resolve_check(board: &Board, piece: &Piece, mut moves: Vec<Position>) -> Vec<Position> {
        let Some(king_id) = board.find_king(piece.color) else {
            return moves;
        };
        let king = board.piece(king_id);
        let status = AttackDetector::attack_status(board, king, AttackMode::PreMove(piece.position));

        if status.is_double() {
            return Vec::new();
        }
        if let Some(attacker) = status.attacker {
            let mut allowed = interpose(attacker, king.position);
            allowed.push(attacker);
            moves.retain(|to| allowed.contains(to));
        }
        moves
    }
}
