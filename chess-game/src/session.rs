//! 对局控制
//!
//! 负责轮流调用双方策略、执行走法，并在每个半回合之后判断对局是否结束。

use std::collections::HashMap;

use chess_ai::{Strategy, ZobristTable};
use chess_rules::{
    AttackDetector, AttackMode, Board, ChessError, Color, MoveGenerator, MoveRecord, Position,
    MOVE_LIMIT, REPETITION_LIMIT,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{Result, SessionError};

/// 对局配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// 完整回合数上限
    pub move_limit: u32,
    /// 同一局面出现多少次判和
    pub repetition_limit: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            move_limit: MOVE_LIMIT,
            repetition_limit: REPETITION_LIMIT,
        }
    }
}

/// 终局原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndReason {
    /// 将死
    CheckMate,
    /// 困毙
    Stalemate,
    /// 重复局面
    Repetition,
    /// 回合数达到上限
    FiftyMoveRule,
    /// 走子方的王不在棋盘上
    InsufficientMaterial,
}

/// 对局状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// 进行中
    Pending,
    /// 白方胜
    WhiteWin(EndReason),
    /// 黑方胜
    BlackWin(EndReason),
    /// 和棋
    Draw(EndReason),
}

impl GameStatus {
    pub fn is_finished(&self) -> bool {
        *self != GameStatus::Pending
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        match self {
            GameStatus::Pending => None,
            GameStatus::WhiteWin(reason) | GameStatus::BlackWin(reason) | GameStatus::Draw(reason) => {
                Some(*reason)
            }
        }
    }

    /// `color` 获胜
    fn win(color: Color, reason: EndReason) -> Self {
        match color {
            Color::White => GameStatus::WhiteWin(reason),
            Color::Black => GameStatus::BlackWin(reason),
        }
    }
}

/// 一次 `step` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// 引擎走了一步
    Moved(MoveRecord),
    /// 轮到手动一方，等待 `play`
    AwaitingInput,
    /// 对局已结束
    Finished(GameStatus),
}

/// 一局棋
///
/// 拥有棋盘和局面历史；双方策略只是借用，`None` 表示由外部手动走子。
pub struct GameSession<'a> {
    board: Board,
    config: SessionConfig,
    side_to_move: Color,
    /// 黑方每走一步加一
    turn_counter: u32,
    status: GameStatus,
    /// 局面哈希 -> 出现次数
    history: HashMap<u64, u32>,
    zobrist: ZobristTable,
    white: Option<&'a dyn Strategy>,
    black: Option<&'a dyn Strategy>,
}

impl<'a> GameSession<'a> {
    /// 创建对局，初始局面计入历史，并立即检查走子方是否已经无路可走
    pub fn new(
        board: Board,
        side_to_move: Color,
        config: SessionConfig,
        white: Option<&'a dyn Strategy>,
        black: Option<&'a dyn Strategy>,
    ) -> Self {
        let zobrist = ZobristTable::new();
        let mut history = HashMap::new();
        history.insert(zobrist.hash(&board), 1);

        let mut session = Self {
            board,
            config,
            side_to_move,
            turn_counter: 0,
            status: GameStatus::Pending,
            history,
            zobrist,
            white,
            black,
        };
        session.update_status();
        session
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// 已完成的完整回合数
    pub fn turn_counter(&self) -> u32 {
        self.turn_counter
    }

    /// 当前局面出现过的次数
    pub fn repetition_count(&self) -> u32 {
        self.history
            .get(&self.zobrist.hash(&self.board))
            .copied()
            .unwrap_or(0)
    }

    /// 指定格子上棋子的合法目标格，用于高亮
    pub fn legal_destinations(&self, from: Position) -> Vec<Position> {
        match self.board.piece_at(from) {
            Some(id) => MoveGenerator::legal_destinations(&self.board, id),
            None => Vec::new(),
        }
    }

    fn strategy_for(&self, color: Color) -> Option<&'a dyn Strategy> {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    /// 让走子方的引擎走一步
    pub fn step(&mut self) -> Result<StepOutcome> {
        if self.is_finished() {
            return Ok(StepOutcome::Finished(self.status));
        }

        let color = self.side_to_move;
        let Some(strategy) = self.strategy_for(color) else {
            return Ok(StepOutcome::AwaitingInput);
        };

        let Some(proposal) = strategy.propose(&mut self.board, color) else {
            self.update_status();
            if self.is_finished() {
                return Ok(StepOutcome::Finished(self.status));
            }
            error!(strategy = strategy.name(), ?color, "strategy gave up with legal moves left");
            return Err(SessionError::NoProposal {
                strategy: strategy.name(),
                color,
            });
        };

        let piece = match self.board.live_piece(proposal.piece) {
            Ok(piece) => *piece,
            Err(err) => {
                error!(strategy = strategy.name(), %err, "engine proposed a piece that is not on the board");
                return Err(err.into());
            }
        };
        let record = if piece.color == color {
            self.board.attempt_move(proposal.piece, proposal.to)
        } else {
            MoveRecord::failed(proposal.piece, piece.position, proposal.to)
        };
        if record.is_failed() {
            error!(strategy = strategy.name(), %record, "engine proposed an illegal move");
            return Err(SessionError::IllegalProposal {
                strategy: strategy.name(),
                color,
                from: record.from,
                to: record.to,
            });
        }

        debug!(strategy = strategy.name(), %record, "engine move");
        self.advance();
        Ok(StepOutcome::Moved(record))
    }

    /// 手动走子
    ///
    /// 非法走法返回 Failed 记录，棋盘和对局状态都不变。
    pub fn play(&mut self, from: Position, to: Position) -> Result<MoveRecord> {
        if self.is_finished() {
            return Err(ChessError::GameOver.into());
        }

        let id = self.board.piece_at(from).ok_or(ChessError::NoPiece {
            x: from.x,
            y: from.y,
        })?;
        if self.board.piece(id).color != self.side_to_move
            || self.strategy_for(self.side_to_move).is_some()
        {
            return Err(ChessError::NotYourTurn.into());
        }

        let record = self.board.attempt_move(id, to);
        if record.is_failed() {
            warn!(%record, "rejected manual move");
            return Ok(record);
        }

        self.advance();
        Ok(record)
    }

    /// 连续走子，直到对局结束或需要手动输入
    pub fn run(&mut self) -> Result<StepOutcome> {
        loop {
            match self.step()? {
                StepOutcome::Moved(_) => continue,
                outcome => return Ok(outcome),
            }
        }
    }

    /// 一个半回合之后：换边、记录局面、检查终局
    fn advance(&mut self) {
        if self.side_to_move == Color::Black {
            self.turn_counter += 1;
        }
        self.side_to_move = self.side_to_move.opponent();
        *self.history.entry(self.zobrist.hash(&self.board)).or_insert(0) += 1;
        self.update_status();
    }

    fn update_status(&mut self) {
        if let Some(status) = self.check_game_over() {
            self.status = status;
            info!(
                ?status,
                turn = self.turn_counter,
                moves = self.board.log().len(),
                "game over"
            );
        }
    }

    /// 按顺序检查：王不在、将死、困毙、重复局面、回合上限
    fn check_game_over(&self) -> Option<GameStatus> {
        let side = self.side_to_move;

        if self.board.find_king(side).is_none() {
            return Some(GameStatus::Draw(EndReason::InsufficientMaterial));
        }

        if !MoveGenerator::has_legal_move(&self.board, side) {
            if AttackDetector::is_in_check(&self.board, side, AttackMode::Committed) {
                return Some(GameStatus::win(side.opponent(), EndReason::CheckMate));
            }
            return Some(GameStatus::Draw(EndReason::Stalemate));
        }

        if self.repetition_count() >= self.config.repetition_limit {
            return Some(GameStatus::Draw(EndReason::Repetition));
        }

        if self.turn_counter >= self.config.move_limit {
            return Some(GameStatus::Draw(EndReason::FiftyMoveRule));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_ai::{GreedyStrategy, KbnkStrategy, Proposal};
    use chess_rules::{Fen, MoveKind, INITIAL_FEN};

    fn pos(x: u8, y: u8) -> Position {
        Position::new_unchecked(x, y)
    }

    fn manual(fen: &str) -> GameSession<'static> {
        let (board, side) = Fen::parse(fen).unwrap();
        GameSession::new(board, side, SessionConfig::default(), None, None)
    }

    /// 总是给出同一个走法的策略
    struct Fixed(Proposal);

    impl Strategy for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn propose(&self, _board: &mut Board, _color: Color) -> Option<Proposal> {
            Some(self.0)
        }
    }

    #[test]
    fn test_config_default_and_json() {
        let config = SessionConfig::default();
        assert_eq!(config.move_limit, 50);
        assert_eq!(config.repetition_limit, 3);

        let parsed: SessionConfig =
            serde_json::from_str(r#"{"move_limit":10,"repetition_limit":2}"#).unwrap();
        assert_eq!(parsed.move_limit, 10);
    }

    #[test]
    fn test_threefold_repetition_on_third_occurrence() {
        let mut session = manual("k7/8/8/8/8/8/8/7K w");
        let cycle = [
            (pos(7, 7), pos(7, 6)),
            (pos(0, 0), pos(0, 1)),
            (pos(7, 6), pos(7, 7)),
            (pos(0, 1), pos(0, 0)),
        ];

        for (i, &(from, to)) in cycle.iter().cycle().take(8).enumerate() {
            assert_eq!(session.status(), GameStatus::Pending, "half-move {i}");
            let record = session.play(from, to).unwrap();
            assert_eq!(record.kind, MoveKind::Move);
        }

        assert_eq!(session.repetition_count(), 3);
        assert_eq!(session.status(), GameStatus::Draw(EndReason::Repetition));
    }

    #[test]
    fn test_second_occurrence_is_not_a_draw() {
        let mut session = manual("k7/8/8/8/8/8/8/7K w");
        for (from, to) in [
            (pos(7, 7), pos(7, 6)),
            (pos(0, 0), pos(0, 1)),
            (pos(7, 6), pos(7, 7)),
            (pos(0, 1), pos(0, 0)),
        ] {
            session.play(from, to).unwrap();
        }
        assert_eq!(session.repetition_count(), 2);
        assert_eq!(session.status(), GameStatus::Pending);
    }

    #[test]
    fn test_fifty_move_rule_triggers_at_fifty() {
        let (board, side) = Fen::parse("k7/8/8/8/8/8/8/7K w").unwrap();
        let config = SessionConfig {
            repetition_limit: u32::MAX,
            ..SessionConfig::default()
        };
        let greedy = GreedyStrategy;
        let mut session = GameSession::new(board, side, config, Some(&greedy), Some(&greedy));

        for _ in 0..99 {
            assert!(matches!(session.step().unwrap(), StepOutcome::Moved(_)));
        }
        assert_eq!(session.turn_counter(), 49);
        assert_eq!(session.status(), GameStatus::Pending);

        session.step().unwrap();
        assert_eq!(session.turn_counter(), 50);
        assert_eq!(session.status(), GameStatus::Draw(EndReason::FiftyMoveRule));
        assert_eq!(
            session.step().unwrap(),
            StepOutcome::Finished(GameStatus::Draw(EndReason::FiftyMoveRule))
        );
    }

    #[test]
    fn test_kbnk_mate_in_one_session() {
        let (board, side) = Fen::parse("k7/8/NK4B1/8/8/8/8/8 w").unwrap();
        let kbnk = KbnkStrategy::new(&board, Color::White, 2).unwrap();
        let greedy = GreedyStrategy;
        let mut session =
            GameSession::new(board, side, SessionConfig::default(), Some(&kbnk), Some(&greedy));

        let outcome = session.run().unwrap();
        assert_eq!(outcome, StepOutcome::Finished(GameStatus::WhiteWin(EndReason::CheckMate)));
        assert_eq!(session.board().log().len(), 1);
        assert_eq!(session.board().last_move().unwrap().to, pos(4, 4));
    }

    #[test]
    fn test_initial_stalemate_and_missing_king() {
        let session = manual("k7/8/1K6/8/8/8/7B/8 b");
        assert_eq!(session.status(), GameStatus::Draw(EndReason::Stalemate));

        let session = manual("k7/8/8/8/8/8/8/8 w");
        assert_eq!(
            session.status(),
            GameStatus::Draw(EndReason::InsufficientMaterial)
        );
    }

    #[test]
    fn test_manual_play_errors() {
        let mut session = manual("k7/8/8/8/8/8/8/7K w");

        assert_eq!(
            session.play(pos(3, 3), pos(3, 4)),
            Err(SessionError::Rules(ChessError::NoPiece { x: 3, y: 3 }))
        );
        assert_eq!(
            session.play(pos(0, 0), pos(0, 1)),
            Err(SessionError::Rules(ChessError::NotYourTurn))
        );

        let before = session.board().clone();
        let record = session.play(pos(7, 7), pos(5, 5)).unwrap();
        assert!(record.is_failed());
        assert_eq!(session.board(), &before);
        assert_eq!(session.side_to_move(), Color::White);
    }

    #[test]
    fn test_play_after_game_over() {
        let mut session = manual("k7/8/1K6/8/8/8/7B/8 b");
        assert_eq!(
            session.play(pos(0, 0), pos(1, 0)),
            Err(SessionError::Rules(ChessError::GameOver))
        );
    }

    #[test]
    fn test_manual_side_awaits_input() {
        let (board, side) = Fen::parse(INITIAL_FEN).unwrap();
        let greedy = GreedyStrategy;
        let mut session = GameSession::new(board, side, SessionConfig::default(), None, Some(&greedy));

        assert_eq!(session.step().unwrap(), StepOutcome::AwaitingInput);
        assert!(session.legal_destinations(pos(3, 3)).is_empty());

        // 白王被黑象将军，白象只能挡在 (3, 3)
        assert_eq!(session.legal_destinations(pos(0, 6)), vec![pos(3, 3)]);
        session.play(pos(0, 6), pos(3, 3)).unwrap();

        assert!(matches!(session.run().unwrap(), StepOutcome::AwaitingInput | StepOutcome::Finished(_)));
        assert_eq!(session.board().log().len(), 2);
    }

    #[test]
    fn test_engine_side_rejects_manual_move() {
        let greedy = GreedyStrategy;
        let (board, side) = Fen::parse("k7/8/8/8/8/8/8/7K w").unwrap();
        let mut session = GameSession::new(board, side, SessionConfig::default(), Some(&greedy), None);
        assert_eq!(
            session.play(pos(7, 7), pos(6, 6)),
            Err(SessionError::Rules(ChessError::NotYourTurn))
        );
    }

    #[test]
    fn test_illegal_engine_proposal_is_an_error() {
        let (board, side) = Fen::parse("k7/8/8/8/8/8/8/7K w").unwrap();
        let king = board.piece_at(pos(7, 7)).unwrap();
        let cheat = Fixed(Proposal::new(king, pos(5, 5)));
        let mut session = GameSession::new(board, side, SessionConfig::default(), Some(&cheat), None);
        let before = session.board().clone();

        assert!(matches!(
            session.step(),
            Err(SessionError::IllegalProposal { strategy: "fixed", .. })
        ));
        assert_eq!(session.board(), &before);

        // 走对方的棋子也算非法
        let enemy = session.board().piece_at(pos(0, 0)).unwrap();
        let cheat = Fixed(Proposal::new(enemy, pos(1, 1)));
        let (board, side) = Fen::parse("k7/8/8/8/8/8/8/7K w").unwrap();
        let mut session = GameSession::new(board, side, SessionConfig::default(), Some(&cheat), None);
        assert!(matches!(session.step(), Err(SessionError::IllegalProposal { .. })));
        assert_eq!(session.board().log().len(), 0);
    }

    #[test]
    fn test_engine_proposal_with_unknown_piece() {
        // 编号来自另一个棋子更多的棋盘
        let (other, _) = Fen::parse(chess_rules::KBNK_FEN).unwrap();
        let stranger = other.piece_ids()[3];
        let cheat = Fixed(Proposal::new(stranger, pos(5, 5)));

        let (board, side) = Fen::parse("k7/8/8/8/8/8/8/7K w").unwrap();
        let mut session = GameSession::new(board, side, SessionConfig::default(), Some(&cheat), None);
        assert!(matches!(
            session.step(),
            Err(SessionError::Rules(ChessError::UnknownPiece(3)))
        ));
        assert_eq!(session.board().log().len(), 0);
        assert_eq!(session.status(), GameStatus::Pending);
    }
}
