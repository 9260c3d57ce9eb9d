//! 王、象、马变体的对局控制
//!
//! 包含:
//! - 轮流调用双方策略
//! - 将死、困毙、重复局面、回合上限判定
//! - 手动走子入口

pub mod error;
pub mod session;

pub use error::{Result, SessionError};
pub use session::{EndReason, GameSession, GameStatus, SessionConfig, StepOutcome};
