//! 不搜索的简单策略

use chess_rules::{Board, Color, MoveGenerator, Position, CENTER_X, CENTER_Y};
use tracing::debug;

use crate::strategy::{Proposal, Strategy};

const CENTER: Position = Position::new_unchecked(CENTER_X, CENTER_Y);

/// 按棋子顺序取第一个有合法走法的棋子，走它的第一个目标格
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyStrategy;

impl Strategy for GreedyStrategy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn propose(&self, board: &mut Board, color: Color) -> Option<Proposal> {
        let board: &Board = board;
        board.pieces_of(color).find_map(|(id, _)| {
            MoveGenerator::legal_moves(board, id, true)
                .first()
                .map(|&to| Proposal::new(id, to))
        })
    }
}

/// 王走向离中心 (4, 4) 最近的格子，距离相同时取第一个；王走不动时退回贪心策略
#[derive(Debug, Clone, Copy, Default)]
pub struct CenterStrategy;

impl Strategy for CenterStrategy {
    fn name(&self) -> &'static str {
        "center"
    }

    fn propose(&self, board: &mut Board, color: Color) -> Option<Proposal> {
        let king_move = {
            let board: &Board = board;
            board.find_king(color).and_then(|king| {
                MoveGenerator::legal_moves(board, king, true)
                    .into_iter()
                    .reduce(|best, to| {
                        if to.chebyshev_distance(CENTER) < best.chebyshev_distance(CENTER) {
                            to
                        } else {
                            best
                        }
                    })
                    .map(|to| Proposal::new(king, to))
            })
        };

        match king_move {
            Some(proposal) => Some(proposal),
            None => {
                debug!("{color:?} king cannot move, falling back to greedy");
                GreedyStrategy.propose(board, color)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_rules::Fen;

    fn pos(x: u8, y: u8) -> Position {
        Position::new_unchecked(x, y)
    }

    #[test]
    fn test_greedy_takes_first_piece_first_move() {
        let mut board = Board::initial();
        let proposal = GreedyStrategy.propose(&mut board, Color::White).unwrap();

        // 白象排在白王前面，取其第一个目标格
        let bishop = board.piece_at(pos(0, 6)).unwrap();
        assert_eq!(proposal.piece, bishop);
        assert_eq!(proposal.to, MoveGenerator::legal_moves(&board, bishop, true)[0]);
    }

    #[test]
    fn test_greedy_none_when_stalemated() {
        let (mut board, _) = Fen::parse("k7/8/1K6/8/8/8/7B/8 b").unwrap();
        assert_eq!(GreedyStrategy.propose(&mut board, Color::Black), None);
    }

    #[test]
    fn test_center_moves_king_toward_center() {
        let (mut board, _) = Fen::parse("k7/8/8/8/8/8/8/7K w").unwrap();
        let proposal = CenterStrategy.propose(&mut board, Color::White).unwrap();

        assert_eq!(board.piece(proposal.piece).position, pos(7, 7));
        assert_eq!(proposal.to, pos(6, 6));
    }

    #[test]
    fn test_center_prefers_first_on_ties() {
        // 王在 (4, 3)，多个目标格离中心距离为 0 或 1，(4, 4) 唯一距离为 0
        let (mut board, _) = Fen::parse("k7/8/8/4K3/8/8/8/8 w").unwrap();
        let proposal = CenterStrategy.propose(&mut board, Color::White).unwrap();
        assert_eq!(proposal.to, pos(4, 4));

        // 王已在中心：所有目标格距离都是 1，取第一个
        let (mut board, _) = Fen::parse("k7/8/8/8/4K3/8/8/8 w").unwrap();
        let king = board.find_king(Color::White).unwrap();
        let first = MoveGenerator::legal_moves(&board, king, true)[0];
        let proposal = CenterStrategy.propose(&mut board, Color::White).unwrap();
        assert_eq!(proposal.to, first);
    }

    #[test]
    fn test_center_falls_back_when_king_is_stuck() {
        // 黑王被白王和白象封死但黑马还能走
        let (mut board, _) = Fen::parse("k7/8/1K6/8/8/8/7B/3n4 b").unwrap();
        let proposal = CenterStrategy.propose(&mut board, Color::Black).unwrap();
        let knight = board.piece_at(pos(3, 7)).unwrap();
        assert_eq!(proposal.piece, knight);
    }
}
