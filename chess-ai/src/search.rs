//! 搜索引擎
//!
//! 实现完整 Minimax 与 Alpha-Beta 剪枝。白方取最大值，黑方取最小值，
//! 分值始终是白方视角的子力分。

use chess_rules::{Board, Color, MoveGenerator};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::evaluate::{Evaluator, MATE_SCORE};
use crate::strategy::{Proposal, Strategy};

/// 比任何分值都大的窗口边界
const INFINITY: i32 = MATE_SCORE + 1;

/// 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// AI 配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiConfig {
    pub difficulty: Difficulty,
    /// 搜索层数（半回合）
    pub max_depth: u8,
}

impl AiConfig {
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        let max_depth = match difficulty {
            Difficulty::Easy => 2,
            Difficulty::Medium => 3,
            Difficulty::Hard => 4,
        };
        Self {
            difficulty,
            max_depth,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::from_difficulty(Difficulty::Medium)
    }
}

/// 一次搜索的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub proposal: Proposal,
    /// 根节点分值（白方视角）
    pub score: i32,
    /// 访问的节点数
    pub nodes: u64,
}

/// 完整 Minimax 搜索
#[derive(Debug, Clone, Copy)]
pub struct MinimaxStrategy {
    depth: u8,
}

impl MinimaxStrategy {
    pub fn new(depth: u8) -> Self {
        Self { depth }
    }

    /// 搜索最佳走法，分值相同时取走法顺序中的第一个
    pub fn search(&self, board: &mut Board, color: Color) -> Option<SearchResult> {
        let mut nodes = 0u64;
        let mut best: Option<(Proposal, i32)> = None;

        for (id, to) in MoveGenerator::all_legal_moves(board, color) {
            let score = {
                let mut guard = board.apply_scoped(id, to);
                minimax(&mut guard, color.opponent(), self.depth.saturating_sub(1), 1, &mut nodes)
            };
            if best.map_or(true, |(_, best_score)| improves(color, score, best_score)) {
                best = Some((Proposal::new(id, to), score));
            }
        }

        let (proposal, score) = best?;
        debug!(depth = self.depth, nodes, score, "minimax search finished");
        Some(SearchResult {
            proposal,
            score,
            nodes,
        })
    }
}

impl Strategy for MinimaxStrategy {
    fn name(&self) -> &'static str {
        "minimax"
    }

    fn propose(&self, board: &mut Board, color: Color) -> Option<Proposal> {
        self.search(board, color).map(|result| result.proposal)
    }
}

/// Alpha-Beta 剪枝搜索（fail-hard）
#[derive(Debug, Clone, Copy)]
pub struct AlphaBetaStrategy {
    depth: u8,
}

impl AlphaBetaStrategy {
    pub fn new(depth: u8) -> Self {
        Self { depth }
    }

    /// 搜索最佳走法，根节点分值与 [`MinimaxStrategy::search`] 相同
    pub fn search(&self, board: &mut Board, color: Color) -> Option<SearchResult> {
        let mut nodes = 0u64;
        let mut alpha = -INFINITY;
        let mut beta = INFINITY;
        let mut best: Option<(Proposal, i32)> = None;

        for (id, to) in MoveGenerator::all_legal_moves(board, color) {
            let score = {
                let mut guard = board.apply_scoped(id, to);
                alpha_beta(
                    &mut guard,
                    color.opponent(),
                    self.depth.saturating_sub(1),
                    1,
                    alpha,
                    beta,
                    &mut nodes,
                )
            };
            if best.map_or(true, |(_, best_score)| improves(color, score, best_score)) {
                best = Some((Proposal::new(id, to), score));
                match color {
                    Color::White => alpha = score,
                    Color::Black => beta = score,
                }
            }
        }

        let (proposal, score) = best?;
        debug!(depth = self.depth, nodes, score, "alpha-beta search finished");
        Some(SearchResult {
            proposal,
            score,
            nodes,
        })
    }
}

impl Strategy for AlphaBetaStrategy {
    fn name(&self) -> &'static str {
        "alpha_beta"
    }

    fn propose(&self, board: &mut Board, color: Color) -> Option<Proposal> {
        self.search(board, color).map(|result| result.proposal)
    }
}

/// `score` 对 `color` 而言是否严格优于 `best`
fn improves(color: Color, score: i32, best: i32) -> bool {
    match color {
        Color::White => score > best,
        Color::Black => score < best,
    }
}

fn minimax(board: &mut Board, side: Color, depth: u8, ply: u32, nodes: &mut u64) -> i32 {
    *nodes += 1;

    if depth == 0 {
        return Evaluator::terminal(board, side, ply).unwrap_or_else(|| Evaluator::material(board));
    }

    let moves = MoveGenerator::all_legal_moves(board, side);
    if moves.is_empty() {
        return Evaluator::no_move_score(board, side, ply);
    }

    let mut best = match side {
        Color::White => -INFINITY,
        Color::Black => INFINITY,
    };
    for (id, to) in moves {
        let mut guard = board.apply_scoped(id, to);
        let score = minimax(&mut guard, side.opponent(), depth - 1, ply + 1, nodes);
        if improves(side, score, best) {
            best = score;
        }
    }
    best
}

fn alpha_beta(
    board: &mut Board,
    side: Color,
    depth: u8,
    ply: u32,
    mut alpha: i32,
    mut beta: i32,
    nodes: &mut u64,
) -> i32 {
    *nodes += 1;

    if depth == 0 {
        return Evaluator::terminal(board, side, ply).unwrap_or_else(|| Evaluator::material(board));
    }

    let moves = MoveGenerator::all_legal_moves(board, side);
    if moves.is_empty() {
        return Evaluator::no_move_score(board, side, ply);
    }

    match side {
        Color::White => {
            for (id, to) in moves {
                let mut guard = board.apply_scoped(id, to);
                let score = alpha_beta(&mut guard, Color::Black, depth - 1, ply + 1, alpha, beta, nodes);
                if score >= beta {
                    return beta;
                }
                if score > alpha {
                    alpha = score;
                }
            }
            alpha
        }
        Color::Black => {
            for (id, to) in moves {
                let mut guard = board.apply_scoped(id, to);
                let score = alpha_beta(&mut guard, Color::White, depth - 1, ply + 1, alpha, beta, nodes);
                if score <= alpha {
                    return alpha;
                }
                if score < beta {
                    beta = score;
                }
            }
            beta
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_rules::{Fen, Position, INITIAL_FEN, KBNK_FEN};

    fn pos(x: u8, y: u8) -> Position {
        Position::new_unchecked(x, y)
    }

    #[test]
    fn test_difficulty_config() {
        assert_eq!(AiConfig::from_difficulty(Difficulty::Easy).max_depth, 2);
        assert_eq!(AiConfig::from_difficulty(Difficulty::Medium).max_depth, 3);
        assert_eq!(AiConfig::from_difficulty(Difficulty::Hard).max_depth, 4);
        assert_eq!(AiConfig::default().difficulty, Difficulty::Medium);
    }

    #[test]
    fn test_config_json() {
        let config: AiConfig =
            serde_json::from_str(r#"{"difficulty":"hard","max_depth":4}"#).unwrap();
        assert_eq!(config, AiConfig::from_difficulty(Difficulty::Hard));

        let json = serde_json::to_string(&AiConfig::default()).unwrap();
        assert_eq!(json, r#"{"difficulty":"medium","max_depth":3}"#);
    }

    #[test]
    fn test_minimax_finds_free_capture() {
        // 白象可以白吃黑马
        let (mut board, _) = Fen::parse("7k/8/8/8/8/8/1n6/B6K w").unwrap();
        let result = MinimaxStrategy::new(1).search(&mut board, Color::White).unwrap();

        assert_eq!(board.piece(result.proposal.piece).position, pos(0, 7));
        assert_eq!(result.proposal.to, pos(1, 6));
        assert_eq!(result.score, 3);
    }

    #[test]
    fn test_search_restores_board() {
        let (mut board, _) = Fen::parse(KBNK_FEN).unwrap();
        let before = board.clone();

        MinimaxStrategy::new(2).search(&mut board, Color::White).unwrap();
        assert_eq!(board, before);

        AlphaBetaStrategy::new(3).search(&mut board, Color::White).unwrap();
        assert_eq!(board, before);
    }

    #[test]
    fn test_alpha_beta_matches_minimax() {
        let positions = [
            (INITIAL_FEN, Color::White),
            ("7k/8/8/8/8/8/1n6/B6K w", Color::White),
            ("7k/8/2n5/8/3B4/8/8/K7 b", Color::Black),
            ("8/8/8/3k4/8/8/8/B3KN2 w", Color::White),
        ];

        for (fen, color) in positions {
            for depth in 1..=3 {
                let (mut board, _) = Fen::parse(fen).unwrap();
                let minimax = MinimaxStrategy::new(depth).search(&mut board, color).unwrap();
                let alpha_beta = AlphaBetaStrategy::new(depth).search(&mut board, color).unwrap();

                assert_eq!(minimax.score, alpha_beta.score, "{fen} depth {depth}");
                assert_eq!(minimax.proposal, alpha_beta.proposal, "{fen} depth {depth}");
                assert!(alpha_beta.nodes <= minimax.nodes, "{fen} depth {depth}");
            }
        }
    }

    #[test]
    fn test_mate_in_one_scores_by_ply() {
        // 黑王在角落，白象走到 (4, 4) 将死
        let (mut board, _) = Fen::parse("k7/8/NK4B1/8/8/8/8/8 w").unwrap();
        let result = MinimaxStrategy::new(2).search(&mut board, Color::White).unwrap();
        assert_eq!(result.score, MATE_SCORE - 1);

        let result = AlphaBetaStrategy::new(3).search(&mut board, Color::White).unwrap();
        assert_eq!(result.score, MATE_SCORE - 1);
    }

    #[test]
    fn test_no_moves_returns_none() {
        let (mut board, _) = Fen::parse("k7/8/1K6/8/8/8/7B/8 b").unwrap();
        assert!(MinimaxStrategy::new(2).search(&mut board, Color::Black).is_none());
        assert!(AlphaBetaStrategy::new(2).propose(&mut board, Color::Black).is_none());
    }
}
