//! 规则常量定义

/// 棋盘边长（行数 = 列数）
pub const BOARD_SIZE: usize = 8;

/// 棋盘格子总数
pub const SQUARE_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// 棋盘中心，王居中策略以此为目标
pub const CENTER_X: u8 = 4;
pub const CENTER_Y: u8 = 4;

/// 轻子（象/马）的子力分值
pub const MINOR_PIECE_VALUE: i32 = 3;

/// 对局回合上限（完整回合数）
pub const MOVE_LIMIT: u32 = 50;

/// 同一局面出现多少次判和
pub const REPETITION_LIMIT: u32 = 3;

/// 走子前（枚举候选走法时）的遮挡阈值：斜线上被占据的中间格少于此数视为攻击
pub const PRE_MOVE_INTERPOSE_THRESHOLD: usize = 2;

/// 已落子局面的遮挡阈值（严格）
pub const COMMITTED_INTERPOSE_THRESHOLD: usize = 1;
