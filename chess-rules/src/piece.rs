//! 棋子定义

use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_SIZE, MINOR_PIECE_VALUE, SQUARE_COUNT};

/// 棋子类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceVariant {
    /// 王
    King,
    /// 象
    Bishop,
    /// 马
    Knight,
}

impl PieceVariant {
    /// 全部棋子类型，按 Zobrist 表索引顺序排列
    pub const ALL: [PieceVariant; 3] = [PieceVariant::King, PieceVariant::Bishop, PieceVariant::Knight];

    /// 子力分值（王不计分）
    pub fn value(&self) -> i32 {
        match self {
            PieceVariant::King => 0,
            PieceVariant::Bishop | PieceVariant::Knight => MINOR_PIECE_VALUE,
        }
    }

    /// 在 [`PieceVariant::ALL`] 中的下标
    pub fn index(&self) -> usize {
        match self {
            PieceVariant::King => 0,
            PieceVariant::Bishop => 1,
            PieceVariant::Knight => 2,
        }
    }

    /// 获取 FEN 字符（白方大写，黑方小写）
    pub fn to_fen_char(&self, color: Color) -> char {
        let c = match self {
            PieceVariant::King => 'k',
            PieceVariant::Bishop => 'b',
            PieceVariant::Knight => 'n',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// 从 FEN 字符解析
    pub fn from_fen_char(c: char) -> Option<(PieceVariant, Color)> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let variant = match c.to_ascii_lowercase() {
            'k' => PieceVariant::King,
            'b' => PieceVariant::Bishop,
            'n' => PieceVariant::Knight,
            _ => return None,
        };
        Some((variant, color))
    }
}

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// 白方（先手）
    White,
    /// 黑方
    Black,
}

impl Color {
    /// 获取对方阵营
    pub fn opponent(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    /// 获取 FEN 字符
    pub fn to_fen_char(&self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    /// 从 FEN 字符解析
    pub fn from_fen_char(c: char) -> Option<Color> {
        match c {
            'w' | 'W' => Some(Color::White),
            'b' | 'B' => Some(Color::Black),
            _ => None,
        }
    }
}

/// 棋盘位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// 列 (0-7)
    pub x: u8,
    /// 行 (0-7)
    pub y: u8,
}

impl Position {
    /// 创建新位置
    pub fn new(x: u8, y: u8) -> Option<Self> {
        if (x as usize) < BOARD_SIZE && (y as usize) < BOARD_SIZE {
            Some(Self { x, y })
        } else {
            None
        }
    }

    /// 创建新位置（不检查边界，内部使用）
    pub const fn new_unchecked(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// 检查位置是否在棋盘内
    pub fn is_valid(&self) -> bool {
        (self.x as usize) < BOARD_SIZE && (self.y as usize) < BOARD_SIZE
    }

    /// 获取偏移后的位置，越界返回 None
    pub fn offset(&self, dx: i8, dy: i8) -> Option<Position> {
        let new_x = self.x as i16 + dx as i16;
        let new_y = self.y as i16 + dy as i16;
        if (0..BOARD_SIZE as i16).contains(&new_x) && (0..BOARD_SIZE as i16).contains(&new_y) {
            Some(Position {
                x: new_x as u8,
                y: new_y as u8,
            })
        } else {
            None
        }
    }

    /// 坐标差 `other - self`
    pub fn delta(&self, other: Position) -> (i8, i8) {
        (other.x as i8 - self.x as i8, other.y as i8 - self.y as i8)
    }

    /// 切比雪夫距离（王步距离）
    pub fn chebyshev_distance(&self, other: Position) -> u8 {
        let (dx, dy) = self.delta(other);
        dx.unsigned_abs().max(dy.unsigned_abs())
    }

    /// 是否与 `other` 位于同一斜线
    pub fn shares_diagonal(&self, other: Position) -> bool {
        let (dx, dy) = self.delta(other);
        dx != 0 && dx.abs() == dy.abs()
    }

    /// 格子颜色：与 (0, 0) 同色为浅色
    pub fn is_light(&self) -> bool {
        (self.x ^ self.y) & 1 == 0
    }

    /// 转换为数组索引
    pub fn to_index(&self) -> usize {
        self.y as usize * BOARD_SIZE + self.x as usize
    }

    /// 从数组索引转换
    pub fn from_index(index: usize) -> Option<Self> {
        if index < SQUARE_COUNT {
            Some(Position {
                x: (index % BOARD_SIZE) as u8,
                y: (index / BOARD_SIZE) as u8,
            })
        } else {
            None
        }
    }

    /// 遍历棋盘所有格子（按索引顺序）
    pub fn all() -> impl Iterator<Item = Position> {
        (0..SQUARE_COUNT).filter_map(Position::from_index)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// 棋子在棋盘对象池中的稳定编号
///
/// 走法记录和搜索都通过编号引用棋子，被吃掉的棋子撤销后仍是同一个编号。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub(crate) usize);

impl PieceId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for PieceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 棋子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub variant: PieceVariant,
    pub position: Position,
}

impl Piece {
    /// 创建新棋子
    pub fn new(color: Color, variant: PieceVariant, position: Position) -> Self {
        Self {
            color,
            variant,
            position,
        }
    }

    /// 获取 FEN 字符
    pub fn to_fen_char(&self) -> char {
        self.variant.to_fen_char(self.color)
    }

    /// 获取棋子分值
    pub fn value(&self) -> i32 {
        self.variant.value()
    }

    pub fn is_king(&self) -> bool {
        self.variant == PieceVariant::King
    }
}
