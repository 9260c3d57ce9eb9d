//! FEN 格式解析和生成
//!
//! 格式：`<棋盘> <走子方>`，棋盘部分从 y=0 到 y=7 逐行列出，
//! 每行从 x=0 到 x=7。白方大写，黑方小写，数字表示连续空格。
//!
//! 示例（演示局面）：
//! `8/1b6/8/8/4K3/8/B7/7k w`

use crate::board::Board;
use crate::constants::BOARD_SIZE;
use crate::error::ChessError;
use crate::piece::{Color, PieceVariant, Position};

/// 演示局面 FEN
///
/// 解析结果的格子与 `Board::initial` 相同，但棋子按行优先顺序编号，
/// 遍历顺序（以及依赖它的贪心走法）与之不同。
pub const INITIAL_FEN: &str = "8/1b6/8/8/4K3/8/B7/7k w";

/// 象马杀单王的练习局面
pub const KBNK_FEN: &str = "8/8/8/3k4/8/8/8/B3KN2 w";

/// FEN 格式处理
pub struct Fen;

impl Fen {
    /// 解析 FEN 字符串为棋盘和走子方
    pub fn parse(fen: &str) -> Result<(Board, Color), ChessError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        let Some(board_str) = parts.first() else {
            return Err(ChessError::InvalidFen {
                reason: "Empty FEN string".to_string(),
            });
        };

        let board = Self::parse_board(board_str)?;

        // 解析走子方（默认白方）
        let side_to_move = match parts.get(1) {
            Some(side) => side
                .chars()
                .next()
                .and_then(Color::from_fen_char)
                .ok_or_else(|| ChessError::InvalidFen {
                    reason: format!("Invalid side to move: {side}"),
                })?,
            None => Color::White,
        };

        Ok((board, side_to_move))
    }

    /// 解析棋盘部分
    fn parse_board(board_str: &str) -> Result<Board, ChessError> {
        let mut board = Board::empty();
        let rows: Vec<&str> = board_str.split('/').collect();

        if rows.len() != BOARD_SIZE {
            return Err(ChessError::InvalidFen {
                reason: format!("Expected {} rows, got {}", BOARD_SIZE, rows.len()),
            });
        }

        for (y, row) in rows.iter().enumerate() {
            let mut x = 0usize;

            for c in row.chars() {
                if x >= BOARD_SIZE {
                    return Err(ChessError::InvalidFen {
                        reason: format!("Row {} has too many columns", y),
                    });
                }

                if let Some(empty_count) = c.to_digit(10) {
                    x += empty_count as usize;
                } else if let Some((variant, color)) = PieceVariant::from_fen_char(c) {
                    board.place(color, variant, Position::new_unchecked(x as u8, y as u8))?;
                    x += 1;
                } else {
                    return Err(ChessError::InvalidFen {
                        reason: format!("Invalid piece character: {}", c),
                    });
                }
            }

            if x != BOARD_SIZE {
                return Err(ChessError::InvalidFen {
                    reason: format!("Row {} has {} columns, expected {}", y, x, BOARD_SIZE),
                });
            }
        }

        Ok(board)
    }

    /// 将棋盘和走子方转换为 FEN 字符串
    pub fn to_string(board: &Board, side_to_move: Color) -> String {
        format!("{} {}", Self::board_to_string(board), side_to_move.to_fen_char())
    }

    /// 将棋盘转换为 FEN 棋盘部分
    pub fn board_to_string(board: &Board) -> String {
        let mut squares = [None; BOARD_SIZE * BOARD_SIZE];
        for (_, piece) in board.pieces() {
            squares[piece.position.to_index()] = Some(piece.to_fen_char());
        }

        let mut rows = Vec::with_capacity(BOARD_SIZE);
        for row_squares in squares.chunks(BOARD_SIZE) {
            let mut row = String::new();
            let mut empty_count = 0;

            for square in row_squares {
                match square {
                    Some(c) => {
                        if empty_count > 0 {
                            row.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        row.push(*c);
                    }
                    None => empty_count += 1,
                }
            }

            if empty_count > 0 {
                row.push_str(&empty_count.to_string());
            }

            rows.push(row);
        }

        rows.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_initial_fen() {
        let (board, side) = Fen::parse(INITIAL_FEN).unwrap();

        assert_eq!(side, Color::White);
        assert_eq!(board.piece_count(), 4);

        let white_king = board.find_king(Color::White).unwrap();
        assert_eq!(board.piece(white_king).position, Position::new_unchecked(4, 4));

        let bishop = board.piece_at(Position::new_unchecked(0, 6)).unwrap();
        assert_eq!(board.piece(bishop).variant, PieceVariant::Bishop);
        assert_eq!(board.piece(bishop).color, Color::White);

        assert_eq!(board.occupant(Position::new_unchecked(1, 1)), Some(Color::Black));
        assert_eq!(board.occupant(Position::new_unchecked(7, 7)), Some(Color::Black));
    }

    #[test]
    fn test_board_to_string_matches_initial_board() {
        assert_eq!(
            Fen::to_string(&Board::initial(), Color::White),
            INITIAL_FEN
        );
    }

    #[test]
    fn test_parse_kbnk_fen() {
        let (board, side) = Fen::parse(KBNK_FEN).unwrap();
        assert_eq!(side, Color::White);
        assert_eq!(board.pieces_of(Color::White).count(), 3);
        assert_eq!(board.pieces_of(Color::Black).count(), 1);
        assert_eq!(
            board.occupant(Position::new_unchecked(5, 7)),
            Some(Color::White)
        );
    }

    #[test]
    fn test_side_defaults_to_white() {
        let (_, side) = Fen::parse("7k/8/8/8/8/8/8/K7").unwrap();
        assert_eq!(side, Color::White);

        let (_, side) = Fen::parse("7k/8/8/8/8/8/8/K7 b").unwrap();
        assert_eq!(side, Color::Black);
    }

    #[test]
    fn test_invalid_fen() {
        // 行数不对
        assert!(Fen::parse("8/8/8").is_err());

        // 列数不对
        assert!(Fen::parse("9/8/8/8/8/8/8/8 w").is_err());
        assert!(Fen::parse("7k1/8/8/8/8/8/8/8 w").is_err());

        // 无效字符
        assert!(Fen::parse("7q/8/8/8/8/8/8/8 w").is_err());

        // 无效走子方
        assert!(Fen::parse("7k/8/8/8/8/8/8/K7 x").is_err());

        assert!(Fen::parse("").is_err());
    }
}
