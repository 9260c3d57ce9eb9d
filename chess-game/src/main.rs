use anyhow::{bail, Context, Result};
use chess_ai::{build_strategy, AiConfig, Difficulty, StrategyKind};
use chess_game::{GameSession, GameStatus, SessionConfig, StepOutcome};
use chess_rules::{Board, Color, Fen, MoveRecord, MOVE_LIMIT, REPETITION_LIMIT};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 引擎自对弈，结束后输出 JSON 摘要
#[derive(Parser, Debug)]
#[command(name = "kbn-selfplay", version)]
struct Args {
    /// 起始局面，省略时使用演示局面
    #[arg(long)]
    fen: Option<String>,

    /// 白方策略：greedy, center, minimax, alpha_beta, kbnk
    #[arg(long, default_value = "alpha_beta")]
    white: StrategyKind,

    /// 黑方策略
    #[arg(long, default_value = "alpha_beta")]
    black: StrategyKind,

    /// 难度：easy, medium, hard
    #[arg(long, default_value = "medium", value_parser = parse_difficulty)]
    difficulty: Difficulty,

    /// 覆盖难度对应的搜索层数
    #[arg(long)]
    depth: Option<u8>,

    /// 完整回合数上限
    #[arg(long, default_value_t = MOVE_LIMIT)]
    move_limit: u32,

    /// 同一局面出现多少次判和
    #[arg(long, default_value_t = REPETITION_LIMIT)]
    repetition_limit: u32,
}

fn parse_difficulty(s: &str) -> std::result::Result<Difficulty, String> {
    match s {
        "easy" => Ok(Difficulty::Easy),
        "medium" => Ok(Difficulty::Medium),
        "hard" => Ok(Difficulty::Hard),
        _ => Err(format!("unknown difficulty: {s}")),
    }
}

/// 起始局面和走子方
///
/// 演示局面直接由 `Board::initial` 构造，保留其棋子顺序；
/// FEN 解析出的棋子按行优先排列，遍历顺序不同。
fn starting_position(fen: Option<&str>) -> Result<(Board, Color)> {
    match fen {
        Some(fen) => Fen::parse(fen).context("invalid starting position"),
        None => Ok((Board::initial(), Color::White)),
    }
}

#[derive(Serialize)]
struct Summary {
    start_fen: String,
    final_fen: String,
    white: StrategyKind,
    black: StrategyKind,
    ai: AiConfig,
    status: GameStatus,
    turns: u32,
    moves: Vec<MoveRecord>,
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chess_game=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let (board, side_to_move) = starting_position(args.fen.as_deref())?;
    let start_fen = Fen::to_string(&board, side_to_move);

    let mut ai = AiConfig::from_difficulty(args.difficulty);
    if let Some(depth) = args.depth {
        ai.max_depth = depth;
    }

    let white = build_strategy(args.white, &ai, &board, Color::White)
        .context("cannot build white strategy")?;
    let black = build_strategy(args.black, &ai, &board, Color::Black)
        .context("cannot build black strategy")?;

    let config = SessionConfig {
        move_limit: args.move_limit,
        repetition_limit: args.repetition_limit,
    };

    info!(white = %args.white, black = %args.black, depth = ai.max_depth, "self-play started");

    let mut session = GameSession::new(
        board,
        side_to_move,
        config,
        Some(white.as_ref()),
        Some(black.as_ref()),
    );

    let status = match session.run()? {
        StepOutcome::Finished(status) => status,
        outcome => bail!("self-play stopped unexpectedly: {outcome:?}"),
    };

    let summary = Summary {
        start_fen,
        final_fen: Fen::to_string(session.board(), session.side_to_move()),
        white: args.white,
        black: args.black,
        ai,
        status,
        turns: session.turn_counter(),
        moves: session.board().log().to_vec(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_ai::{GreedyStrategy, Strategy};
    use chess_rules::INITIAL_FEN;

    #[test]
    fn test_default_start_is_demo_board() {
        let (mut board, side) = starting_position(None).unwrap();
        let mut demo = Board::initial();
        assert_eq!(side, Color::White);
        assert_eq!(board.piece_ids(), demo.piece_ids());
        assert_eq!(
            GreedyStrategy.propose(&mut board, side),
            GreedyStrategy.propose(&mut demo, Color::White)
        );
    }

    #[test]
    fn test_explicit_fen_uses_row_order() {
        let (mut parsed, side) = starting_position(Some(INITIAL_FEN)).unwrap();
        let mut demo = Board::initial();

        // 同样的格子，但行优先顺序下白王排在白象前面
        assert_eq!(Fen::to_string(&parsed, side), Fen::to_string(&demo, Color::White));
        let from_fen = GreedyStrategy.propose(&mut parsed, side).unwrap();
        let from_demo = GreedyStrategy.propose(&mut demo, Color::White).unwrap();
        assert!(parsed.piece(from_fen.piece).is_king());
        assert!(!demo.piece(from_demo.piece).is_king());
    }

    #[test]
    fn test_invalid_fen_is_reported() {
        assert!(starting_position(Some("not a fen")).is_err());
    }
}
