//! Zobrist 哈希
//!
//! 用于判断重复局面

use chess_rules::{Board, Color, PieceVariant, Position, SQUARE_COUNT};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Zobrist 哈希表
///
/// 使用随机数为每个位置的每种棋子生成唯一的哈希值
#[derive(Debug, Clone)]
pub struct ZobristTable {
    /// 棋子哈希值 [color][variant][position]
    /// color: 0=White, 1=Black
    /// variant: 0-2 对应王、象、马
    pieces: [[[u64; SQUARE_COUNT]; 3]; 2],
}

impl ZobristTable {
    /// 创建新的 Zobrist 表（使用固定种子保证确定性）
    pub fn new() -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(0x4B42_4E4B_0000_0008);

        let mut pieces = [[[0u64; SQUARE_COUNT]; 3]; 2];
        for color in pieces.iter_mut() {
            for variant in color.iter_mut() {
                for key in variant.iter_mut() {
                    *key = rng.gen();
                }
            }
        }

        Self { pieces }
    }

    /// 只由棋子摆放决定的哈希值
    pub fn hash(&self, board: &Board) -> u64 {
        board.pieces().fold(0u64, |hash, (_, piece)| {
            hash ^ self.piece_hash(piece.color, piece.variant, piece.position)
        })
    }

    /// 获取棋子的哈希值
    #[inline]
    pub fn piece_hash(&self, color: Color, variant: PieceVariant, pos: Position) -> u64 {
        self.pieces[color.index()][variant.index()][pos.to_index()]
    }
}

impl Default for ZobristTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_rules::{Fen, KBNK_FEN};

    #[test]
    fn test_zobrist_deterministic() {
        let board = Board::initial();
        assert_eq!(ZobristTable::new().hash(&board), ZobristTable::new().hash(&board));
    }

    #[test]
    fn test_zobrist_ignores_piece_order_and_log() {
        let table = ZobristTable::new();
        let (parsed, _) = Fen::parse(chess_rules::INITIAL_FEN).unwrap();
        assert_eq!(table.hash(&parsed), table.hash(&Board::initial()));
    }

    #[test]
    fn test_zobrist_different_positions() {
        let table = ZobristTable::new();
        let (mut board, _) = Fen::parse(KBNK_FEN).unwrap();
        let hash1 = table.hash(&board);

        let king = board.find_king(Color::Black).unwrap();
        let hash2 = {
            let guard = board.apply_scoped(king, Position::new_unchecked(3, 2));
            table.hash(&guard)
        };

        assert_ne!(hash1, hash2, "不同局面应该有不同的哈希值");
        assert_eq!(table.hash(&board), hash1, "撤销后哈希值应该还原");
    }

    #[test]
    fn test_zobrist_same_squares_other_owner() {
        // 同样的格子被另一方占据，哈希值不同
        let table = ZobristTable::new();
        let (white, _) = Fen::parse("k7/8/8/8/8/8/8/6BK w").unwrap();
        let (black, _) = Fen::parse("k7/8/8/8/8/8/8/6bK w").unwrap();
        assert_ne!(table.hash(&white), table.hash(&black));
    }
}
