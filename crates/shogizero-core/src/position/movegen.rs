//! 合法手生成と合法性判定
//!
//! 盤面配列を直接走査する素朴な実装。対象は学習データ生成と棋譜再生なので、
//! 速度よりも規則の網羅性（二歩・行き所のない駒・打ち歩詰め・自殺手）を優先する。

use super::Position;
use crate::types::{Color, File, Move, Piece, PieceType, Rank, Square};

type Dir = (i8, i8);

// 先手視点の (筋増分, 段増分)。後手は段増分の符号を反転して使う。
const PAWN_STEPS: &[Dir] = &[(0, -1)];
const KNIGHT_STEPS: &[Dir] = &[(-1, -2), (1, -2)];
const SILVER_STEPS: &[Dir] = &[(-1, -1), (0, -1), (1, -1), (-1, 1), (1, 1)];
const GOLD_STEPS: &[Dir] = &[(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (0, 1)];
const KING_STEPS: &[Dir] =
    &[(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)];
const DIAGONALS: &[Dir] = &[(-1, -1), (1, -1), (-1, 1), (1, 1)];
const ORTHOGONALS: &[Dir] = &[(0, -1), (-1, 0), (1, 0), (0, 1)];
const LANCE_RAYS: &[Dir] = &[(0, -1)];
const NONE: &[Dir] = &[];

/// 駒種ごとの (1マス移動, 飛び利き) の方向
fn movement(pt: PieceType) -> (&'static [Dir], &'static [Dir]) {
    match pt {
        PieceType::Pawn => (PAWN_STEPS, NONE),
        PieceType::Lance => (NONE, LANCE_RAYS),
        PieceType::Knight => (KNIGHT_STEPS, NONE),
        PieceType::Silver => (SILVER_STEPS, NONE),
        PieceType::Gold
        | PieceType::ProPawn
        | PieceType::ProLance
        | PieceType::ProKnight
        | PieceType::ProSilver => (GOLD_STEPS, NONE),
        PieceType::King => (KING_STEPS, NONE),
        PieceType::Bishop => (NONE, DIAGONALS),
        PieceType::Rook => (NONE, ORTHOGONALS),
        PieceType::Horse => (ORTHOGONALS, DIAGONALS),
        PieceType::Dragon => (DIAGONALS, ORTHOGONALS),
    }
}

#[inline]
fn oriented(color: Color, (df, dr): Dir) -> Dir {
    match color {
        Color::Black => (df, dr),
        Color::White => (df, -dr),
    }
}

/// 成らないと行き所がなくなる移動先か
fn must_promote(pt: PieceType, to: Square, us: Color) -> bool {
    match pt {
        PieceType::Pawn | PieceType::Lance => to.rank().is_last(us),
        PieceType::Knight => to.rank().is_last_two(us),
        _ => false,
    }
}

/// その升に打つと行き所がなくなる駒か
fn dead_drop(pt: PieceType, to: Square, us: Color) -> bool {
    must_promote(pt, to, us)
}

impl Position {
    /// 駒の利きの升を列挙する（自駒の升も含む。飛び駒は最初の駒で止まる）
    fn for_each_target(&self, piece: Piece, from: Square, mut f: impl FnMut(Square)) {
        let (steps, rays) = movement(piece.piece_type);
        for &dir in steps {
            let (df, dr) = oriented(piece.color, dir);
            if let Some(to) = from.offset(df, dr) {
                f(to);
            }
        }
        for &dir in rays {
            let (df, dr) = oriented(piece.color, dir);
            let mut cur = from;
            while let Some(to) = cur.offset(df, dr) {
                f(to);
                if self.piece_on(to).is_some() {
                    break;
                }
                cur = to;
            }
        }
    }

    /// `by` 側の駒が `sq` に利いているか
    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        Square::all().any(|from| {
            let Some(piece) = self.piece_on(from) else {
                return false;
            };
            if piece.color != by {
                return false;
            }
            let mut hit = false;
            self.for_each_target(piece, from, |to| hit |= to == sq);
            hit
        })
    }

    /// 手番側の玉に王手がかかっているか
    pub fn in_check(&self) -> bool {
        let us = self.side_to_move;
        self.king_square(us).is_some_and(|k| self.is_attacked(k, !us))
    }

    /// 全ての合法手
    pub fn legal_moves(&self) -> Vec<Move> {
        self.generate_legal(true)
    }

    /// 指し手が現局面で合法か
    pub fn is_legal(&self, mv: Move) -> bool {
        self.is_pseudo_legal(mv) && self.passes_legality(mv, true)
    }

    fn generate_legal(&self, check_drop_mate: bool) -> Vec<Move> {
        let mut moves = Vec::with_capacity(128);
        self.generate_pseudo(&mut moves);
        moves.retain(|&mv| self.passes_legality(mv, check_drop_mate));
        moves
    }

    /// 自玉が取られないこと・打ち歩詰めでないことを確認する
    fn passes_legality(&self, mv: Move, check_drop_mate: bool) -> bool {
        let us = self.side_to_move;
        let next = self.after(mv);
        if next.king_square(us).is_some_and(|k| next.is_attacked(k, !us)) {
            return false;
        }
        if check_drop_mate {
            if let Move::Drop { piece_type: PieceType::Pawn, to } = mv {
                let ahead = to.offset(0, us.forward());
                if ahead.is_some() && ahead == next.king_square(!us) {
                    // 打ち歩で王手した局面で相手に応手がなければ反則
                    return !next.generate_legal(false).is_empty();
                }
            }
        }
        true
    }

    /// 自駒か玉がいて移動先にできない升か
    fn cannot_capture(&self, sq: Square, us: Color) -> bool {
        self.piece_on(sq).is_some_and(|p| p.color == us || p.piece_type == PieceType::King)
    }

    /// 二歩になる筋か
    fn has_pawn_on_file(&self, file: File, us: Color) -> bool {
        Rank::ALL.iter().any(|&rank| {
            self.piece_on(Square::new(file, rank)) == Some(Piece::new(us, PieceType::Pawn))
        })
    }

    fn generate_pseudo(&self, out: &mut Vec<Move>) {
        let us = self.side_to_move;
        for from in Square::all() {
            let Some(piece) = self.piece_on(from) else {
                continue;
            };
            if piece.color != us {
                continue;
            }
            self.for_each_target(piece, from, |to| {
                if self.cannot_capture(to, us) {
                    return;
                }
                let pt = piece.piece_type;
                let zone = from.rank().can_promote(us) || to.rank().can_promote(us);
                if pt.can_promote() && zone {
                    out.push(Move::Normal {
                        from,
                        to,
                        promote: true,
                    });
                }
                if !must_promote(pt, to, us) {
                    out.push(Move::Normal {
                        from,
                        to,
                        promote: false,
                    });
                }
            });
        }

        let hand = *self.hand(us);
        if hand.is_empty() {
            return;
        }
        for to in Square::all() {
            if self.piece_on(to).is_some() {
                continue;
            }
            for pt in PieceType::HAND_ORDER {
                if !hand.has(pt) || dead_drop(pt, to, us) {
                    continue;
                }
                if pt == PieceType::Pawn && self.has_pawn_on_file(to.file(), us) {
                    continue;
                }
                out.push(Move::Drop { piece_type: pt, to });
            }
        }
    }

    fn is_pseudo_legal(&self, mv: Move) -> bool {
        let us = self.side_to_move;
        match mv {
            Move::Normal { from, to, promote } => {
                let Some(piece) = self.piece_on(from) else {
                    return false;
                };
                if piece.color != us {
                    return false;
                }
                // 玉は取らない（取れる局面は SFEN の時点で弾く）
                if self.cannot_capture(to, us) {
                    return false;
                }
                let mut reachable = false;
                self.for_each_target(piece, from, |sq| reachable |= sq == to);
                if !reachable {
                    return false;
                }
                let pt = piece.piece_type;
                if promote {
                    pt.can_promote() && (from.rank().can_promote(us) || to.rank().can_promote(us))
                } else {
                    !must_promote(pt, to, us)
                }
            }
            Move::Drop { piece_type, to } => {
                self.hand(us).has(piece_type)
                    && self.piece_on(to).is_none()
                    && !dead_drop(piece_type, to, us)
                    && !(piece_type == PieceType::Pawn && self.has_pawn_on_file(to.file(), us))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(sfen: &str) -> Position {
        let mut p = Position::new();
        p.set_sfen(sfen).unwrap();
        p
    }

    fn usi_set(moves: &[Move]) -> Vec<String> {
        let mut v: Vec<String> = moves.iter().map(|m| m.to_usi()).collect();
        v.sort();
        v
    }

    #[test]
    fn test_hirate_has_30_moves() {
        let moves = Position::hirate().legal_moves();
        assert_eq!(moves.len(), 30);
        assert!(moves.contains(&Move::from_usi("7g7f").unwrap()));
        assert!(moves.contains(&Move::from_usi("2h1h").unwrap()));
    }

    #[test]
    fn test_must_promote_pawn_on_last_rank() {
        let p = pos("4k4/P8/9/9/9/9/9/9/4K4 b - 1");
        let moves = usi_set(&p.legal_moves());
        assert!(moves.contains(&"9b9a+".to_string()));
        assert!(!moves.contains(&"9b9a".to_string()));
    }

    #[test]
    fn test_knight_cannot_stop_on_last_two_ranks() {
        let p = pos("4k4/9/9/N8/9/9/9/9/4K4 b - 1");
        let moves = usi_set(&p.legal_moves());
        assert!(moves.contains(&"9d8b+".to_string()));
        assert!(!moves.contains(&"9d8b".to_string()));
    }

    #[test]
    fn test_nifu_and_dead_drops() {
        let p = pos("4k4/9/9/9/9/9/P8/9/4K4 b PNL 1");
        let moves = usi_set(&p.legal_moves());
        // 9筋には既に歩がある
        assert!(!moves.iter().any(|m| m.starts_with("P*9")));
        assert!(moves.contains(&"P*8e".to_string()));
        // 1段目に歩・香は打てない、桂は1-2段目に打てない
        assert!(!moves.contains(&"P*8a".to_string()));
        assert!(!moves.contains(&"L*8a".to_string()));
        assert!(!moves.contains(&"N*8b".to_string()));
        assert!(moves.contains(&"N*8c".to_string()));
    }

    #[test]
    fn test_pinned_piece_cannot_move() {
        // 5筋の銀は飛車に釘付けにされているので筋から外れられない
        let p = pos("4r4/9/9/9/9/9/9/4S4/4K4 b - 1");
        let moves = usi_set(&p.legal_moves());
        assert!(!moves.contains(&"5h4g".to_string()));
        assert!(!moves.contains(&"5h6g".to_string()));
        assert!(moves.contains(&"5h5g".to_string()));
        assert!(moves.contains(&"5i4i".to_string()));
    }

    #[test]
    fn test_king_must_escape_check() {
        let p = pos("4k4/9/9/9/9/9/9/4r4/4K4 b - 1");
        assert!(p.in_check());
        for mv in p.legal_moves() {
            let next = p.after(mv);
            let king = next.king_square(Color::Black).unwrap();
            assert!(!next.is_attacked(king, Color::White));
        }
        // 玉で飛車を取る手は合法
        assert!(p.is_legal(Move::from_usi("5i5h").unwrap()));
    }

    #[test]
    fn test_drop_pawn_mate_is_illegal() {
        // 1一玉を金2枚で囲い、1二への打ち歩が詰みになる形
        let p = pos("7lk/9/7G1/9/9/9/9/9/K8 b P 1");
        let drop = Move::from_usi("P*1b").unwrap();
        assert!(p.after(drop).in_check());
        assert!(!p.is_legal(drop));
        assert!(!p.legal_moves().contains(&drop));
    }

    #[test]
    fn test_drop_pawn_check_that_is_not_mate_is_legal() {
        let p = pos("8k/9/9/9/9/9/9/9/K8 b P 1");
        let drop = Move::from_usi("P*1b").unwrap();
        assert!(p.is_legal(drop));
    }

    #[test]
    fn test_white_moves_downward() {
        let p = pos("lnsgkgsnl/1r5b1/ppppppppp/9/9/2P6/PP1PPPPPP/1B5R1/LNSGKGSNL w - 2");
        assert!(p.is_legal(Move::from_usi("3c3d").unwrap()));
        assert!(!p.is_legal(Move::from_usi("3c3b").unwrap()));
    }
}
