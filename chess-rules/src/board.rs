//! 棋盘状态
//!
//! 棋子存放在对象池中，通过 [`PieceId`] 引用。棋盘同时维护一份按格子索引的
//! 占据表（只记录颜色），以及可撤销的走法日志。

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::SQUARE_COUNT;
use crate::error::{ChessError, Result};
use crate::moves::MoveGenerator;
use crate::piece::{Color, Piece, PieceId, PieceVariant, Position};

/// 走法类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    /// 普通移动
    Move,
    /// 吃子
    Take,
    /// 被拒绝的走法（不修改棋盘，也不入日志）
    Failed,
}

/// 走法记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveRecord {
    pub kind: MoveKind,
    /// 走动的棋子
    pub moved: PieceId,
    /// 起始位置
    pub from: Position,
    /// 目标位置
    pub to: Position,
    /// 被吃的棋子（如果有）
    pub taken: Option<PieceId>,
}

impl MoveRecord {
    /// 创建被拒绝的走法记录
    pub fn failed(moved: PieceId, from: Position, to: Position) -> Self {
        Self {
            kind: MoveKind::Failed,
            moved,
            from,
            to,
            taken: None,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.kind == MoveKind::Failed
    }

    pub fn is_capture(&self) -> bool {
        self.kind == MoveKind::Take
    }
}

impl std::fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            MoveKind::Move => write!(f, "{} {} -> {}", self.moved, self.from, self.to),
            MoveKind::Take => write!(f, "{} {} x {}", self.moved, self.from, self.to),
            MoveKind::Failed => write!(f, "{} {} -> {} (rejected)", self.moved, self.from, self.to),
        }
    }
}

/// 棋盘
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// 所有放上过棋盘的棋子，下标即 PieceId
    arena: Vec<Piece>,
    /// 在场棋子，始终按 PieceId 升序排列
    live: Vec<PieceId>,
    /// 8x8 占据表，索引为 y * 8 + x
    occupancy: [Option<Color>; SQUARE_COUNT],
    /// 走法日志（栈）
    log: Vec<MoveRecord>,
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self {
            arena: Vec::new(),
            live: Vec::new(),
            occupancy: [None; SQUARE_COUNT],
            log: Vec::new(),
        }
    }

    /// 用给定棋子创建棋盘，棋子顺序即遍历顺序
    pub fn new(pieces: impl IntoIterator<Item = Piece>) -> Result<Self> {
        let mut board = Self::empty();
        for piece in pieces {
            board.place(piece.color, piece.variant, piece.position)?;
        }
        Ok(board)
    }

    /// 创建演示局面：白王 (4,4)、白象 (0,6)，黑王 (7,7)、黑象 (1,1)
    pub fn initial() -> Self {
        let mut board = Self::empty();
        let setup = [
            (Color::Black, PieceVariant::King, 7, 7),
            (Color::White, PieceVariant::Bishop, 0, 6),
            (Color::White, PieceVariant::King, 4, 4),
            (Color::Black, PieceVariant::Bishop, 1, 1),
        ];
        for (color, variant, x, y) in setup {
            board.push_piece(Piece::new(color, variant, Position::new_unchecked(x, y)));
        }
        board
    }

    /// 放置一个新棋子
    pub fn place(&mut self, color: Color, variant: PieceVariant, position: Position) -> Result<PieceId> {
        if !position.is_valid() {
            return Err(ChessError::InvalidPosition {
                x: position.x as i16,
                y: position.y as i16,
            });
        }
        if self.occupancy[position.to_index()].is_some() {
            return Err(ChessError::SquareOccupied {
                x: position.x,
                y: position.y,
            });
        }
        Ok(self.push_piece(Piece::new(color, variant, position)))
    }

    fn push_piece(&mut self, piece: Piece) -> PieceId {
        let id = PieceId(self.arena.len());
        self.occupancy[piece.position.to_index()] = Some(piece.color);
        self.arena.push(piece);
        self.live.push(id);
        id
    }

    /// 获取棋子（包括已被吃掉的棋子）
    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.arena[id.0]
    }

    /// 获取在场棋子，编号无效或已被吃掉时返回错误
    pub fn live_piece(&self, id: PieceId) -> Result<&Piece> {
        if self.is_live(id) {
            Ok(&self.arena[id.0])
        } else {
            Err(ChessError::UnknownPiece(id.0))
        }
    }

    /// 棋子是否仍在场上
    pub fn is_live(&self, id: PieceId) -> bool {
        self.live.binary_search(&id).is_ok()
    }

    /// 在场棋子编号（遍历顺序）
    pub fn piece_ids(&self) -> &[PieceId] {
        &self.live
    }

    /// 遍历在场棋子
    pub fn pieces(&self) -> impl Iterator<Item = (PieceId, &Piece)> + '_ {
        self.live.iter().map(move |&id| (id, &self.arena[id.0]))
    }

    /// 遍历指定阵营的在场棋子
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (PieceId, &Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.color == color)
    }

    pub fn piece_count(&self) -> usize {
        self.live.len()
    }

    /// 获取指定位置上棋子的颜色
    pub fn occupant(&self, pos: Position) -> Option<Color> {
        if pos.is_valid() {
            self.occupancy[pos.to_index()]
        } else {
            None
        }
    }

    /// 整张占据表
    pub fn occupancy(&self) -> &[Option<Color>; SQUARE_COUNT] {
        &self.occupancy
    }

    /// 获取指定位置上的棋子
    pub fn piece_at(&self, pos: Position) -> Option<PieceId> {
        self.occupant(pos)?;
        self.live
            .iter()
            .copied()
            .find(|&id| self.arena[id.0].position == pos)
    }

    /// 查找指定阵营的王
    pub fn find_king(&self, color: Color) -> Option<PieceId> {
        self.pieces_of(color)
            .find(|(_, piece)| piece.is_king())
            .map(|(id, _)| id)
    }

    /// 走法日志（最早的在前）
    pub fn log(&self) -> &[MoveRecord] {
        &self.log
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.log.last()
    }

    /// 不检查规则地走一步并记入日志
    ///
    /// 目标格有棋子时将其移出在场列表，记录为吃子。
    pub fn apply(&mut self, id: PieceId, to: Position) -> MoveRecord {
        assert!(self.is_live(id), "piece {id} is not on the board");

        let Piece { color, position: from, .. } = self.arena[id.0];
        self.occupancy[from.to_index()] = None;

        let mut kind = MoveKind::Move;
        let mut taken = None;
        if self.occupancy[to.to_index()].is_some() {
            let Some(slot) = self
                .live
                .iter()
                .position(|&other| self.arena[other.0].position == to)
            else {
                panic!("occupancy out of sync: {to} is marked occupied but no piece stands there");
            };
            taken = Some(self.live.remove(slot));
            kind = MoveKind::Take;
        }

        self.occupancy[to.to_index()] = Some(color);
        self.arena[id.0].position = to;

        let record = MoveRecord {
            kind,
            moved: id,
            from,
            to,
            taken,
        };
        self.log.push(record);
        record
    }

    /// 检查合法性后再走，非法时返回 Failed 记录且不修改棋盘
    pub fn attempt_move(&mut self, id: PieceId, to: Position) -> MoveRecord {
        if !self.is_live(id) {
            debug!("rejected move of captured piece {id}");
            return MoveRecord::failed(id, self.arena[id.0].position, to);
        }
        if !MoveGenerator::legal_moves(self, id, true).contains(&to) {
            let from = self.arena[id.0].position;
            debug!("rejected illegal move {id} {from} -> {to}");
            return MoveRecord::failed(id, from, to);
        }
        self.apply(id, to)
    }

    /// 撤销最近一步
    ///
    /// # Panics
    ///
    /// 日志为空时 panic：每次撤销都必须对应之前的一次 `apply`。
    pub fn undo(&mut self) -> MoveRecord {
        let Some(record) = self.log.pop() else {
            panic!("undo called on an empty move log");
        };

        let color = self.arena[record.moved.0].color;
        self.arena[record.moved.0].position = record.from;
        self.occupancy[record.to.to_index()] = None;
        self.occupancy[record.from.to_index()] = Some(color);

        if let Some(taken) = record.taken {
            match self.live.binary_search(&taken) {
                Ok(_) => panic!("captured piece {taken} is already back on the board"),
                Err(slot) => self.live.insert(slot, taken),
            }
            self.occupancy[record.to.to_index()] = Some(self.arena[taken.0].color);
        }

        record
    }

    /// 走一步并返回守卫，守卫释放时自动撤销
    pub fn apply_scoped(&mut self, id: PieceId, to: Position) -> MoveGuard<'_> {
        let record = self.apply(id, to);
        MoveGuard { board: self, record }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

/// 作用域内的试走
///
/// 通过 `Deref` 访问走完之后的棋盘；离开作用域时撤销这一步，
/// 保证搜索在任何返回路径上都能还原棋盘。
pub struct MoveGuard<'a> {
    board: &'a mut Board,
    record: MoveRecord,
}

impl MoveGuard<'_> {
    pub fn record(&self) -> MoveRecord {
        self.record
    }
}

impl Deref for MoveGuard<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for MoveGuard<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for MoveGuard<'_> {
    fn drop(&mut self) {
        let undone = self.board.undo();
        debug_assert_eq!(undone, self.record, "scoped move undone out of order");
    }
}
