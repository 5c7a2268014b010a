//! 自己対局による学習データ生成

use crate::player::{Player, PlayerError};
use crate::replay::{interleave, GameOutput};
use crate::state::{GameState, Transition, Winner};
use crate::types::Color;

/// 平手から1局指し、両者のラベルを結果付きで返す
///
/// `max_plies` 手に達しても終局しなければ引き分けとする。
/// 非合法手・投了・千日手はそれぞれ `GameState` の規則どおりに終局する。
pub fn play_selfplay_game<B, W>(
    black: &mut B,
    white: &mut W,
    max_plies: u32,
) -> Result<GameOutput, PlayerError>
where
    B: Player,
    W: Player,
{
    let mut state = GameState::new();
    let mut moves = Vec::new();

    while !state.done() {
        if state.halfmove_count() >= max_plies {
            state.adjudicate();
            break;
        }
        let player: &mut dyn Player = if state.black_to_move() {
            &mut *black
        } else {
            &mut *white
        };
        let action = player.action(&state, None)?;
        if let Transition::Applied(mv) | Transition::Repetition(mv) =
            state.apply_move(action.as_deref(), true)
        {
            moves.push(mv.to_usi());
        }
    }

    let winner = state.winner().unwrap_or(Winner::Draw);
    let black_value = winner.signed_for(Color::Black);
    let examples = interleave(black.finish_game(black_value), white.finish_game(-black_value));
    Ok(GameOutput {
        state,
        moves,
        examples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{SelfPlayPlayer, UniformEvaluator};

    #[test]
    fn test_selfplay_respects_max_plies() {
        let mut black = SelfPlayPlayer::new(UniformEvaluator, 1.0, 11);
        let mut white = SelfPlayPlayer::new(UniformEvaluator, 1.0, 12);
        let out = play_selfplay_game(&mut black, &mut white, 10).unwrap();
        assert!(out.state.done());
        assert!(out.moves.len() <= 10);
        assert_eq!(out.examples.len(), out.moves.len());
        if out.state.halfmove_count() == 10 {
            assert_eq!(out.winner(), Winner::Draw);
            assert!(out.examples.iter().all(|e| e.value == 0.0));
        }
    }

    #[test]
    fn test_selfplay_is_reproducible() {
        let run = || {
            let mut black = SelfPlayPlayer::new(UniformEvaluator, 1.0, 5);
            let mut white = SelfPlayPlayer::new(UniformEvaluator, 1.0, 6);
            play_selfplay_game(&mut black, &mut white, 20).map(|out| out.moves)
        };
        assert_eq!(run().unwrap(), run().unwrap());
    }
}
