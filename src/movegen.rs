// Move generation for the stacked board.
//
// Pseudo-legal moves are produced by dispatching on the contents of each
// square: single pieces generate normal/capture/klik moves, 2-stacks
// generate per-piece unklik moves plus combined moves of the whole stack.
// Legal generation filters through make / is_attacked / unmake.

use arrayvec::ArrayVec;

use crate::board::{Board, Color, Move, MoveKind, Piece, PieceKind, Undo, BK, BQ, WK, WQ};
use crate::utils::{
    king_targets, knight_targets, make_square, pop_lsb, square_file, square_rank,
    BISHOP_DIRECTIONS, QUEEN_DIRECTIONS, ROOK_DIRECTIONS,
};

const PROMOTION_KINDS: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

/// Upper bound on slider targets (queen from a center square reaches 27)
type Targets = ArrayVec<u8, 28>;

impl Board {
    // Pseudo-legal target enumeration ------------------------------

    /// Ray walk stopping at the first occupied square, which is included;
    /// whether it is a capture or a klik is decided by the caller.
    fn sliding_targets(&self, sq: u8, directions: &[i8]) -> Targets {
        let mut targets = Targets::new();
        for &dir in directions {
            let mut current = sq as i8;
            loop {
                let prev = current;
                current += dir;
                if !(0..64).contains(&current) {
                    break;
                }
                // niente wrap oltre il bordo
                if ((current & 7) - (prev & 7)).abs() > 1 {
                    break;
                }
                targets.push(current as u8);
                if !self.stack_at(current as u8).is_empty() {
                    break;
                }
            }
        }
        targets
    }

    /// Pawn (target, base kind) pairs: forward pushes, the double push
    /// gated by the unmoved-pawn mask, forward kliks, diagonal captures
    /// and en passant. Forward klik onto the promotion rank is forbidden.
    fn pawn_targets(
        &self,
        sq: u8,
        color: Color,
        captures_only: bool,
        include_klik: bool,
    ) -> ArrayVec<(u8, MoveKind), 6> {
        let mut out = ArrayVec::new();
        let dir = color.pawn_direction();
        let promo_rank = color.promotion_rank();
        let rank = square_rank(sq);
        let file = square_file(sq);

        if !captures_only {
            let one = sq as i8 + dir;
            if (0..64).contains(&one) {
                let one = one as u8;
                let ahead = self.stack_at(one);
                if ahead.is_empty() {
                    if square_rank(one) == promo_rank {
                        out.push((one, MoveKind::Promotion));
                    } else {
                        out.push((one, MoveKind::Normal));
                        // Doppia spinta solo se il pedone non si è mai mosso
                        if rank == color.pawn_start_rank()
                            && self.unmoved_pawns[color.index()] & (1 << file) != 0
                        {
                            let two = sq as i8 + 2 * dir;
                            if (0..64).contains(&two) {
                                let two = two as u8;
                                let far = self.stack_at(two);
                                if far.is_empty() {
                                    out.push((two, MoveKind::Normal));
                                } else if include_klik
                                    && far.count() < 2
                                    && far.top().is_some_and(|p| {
                                        p.color == color && p.kind != PieceKind::King
                                    })
                                {
                                    out.push((two, MoveKind::Klik));
                                }
                            }
                        }
                    }
                } else if include_klik
                    && ahead.count() < 2
                    && ahead
                        .top()
                        .is_some_and(|p| p.color == color && p.kind != PieceKind::King)
                    && square_rank(one) != promo_rank
                {
                    out.push((one, MoveKind::Klik));
                }
            }
        }

        for df in [-1i8, 1] {
            let to_file = file as i8 + df;
            if !(0..8).contains(&to_file) {
                continue;
            }
            let to = sq as i8 + dir + df;
            if !(0..64).contains(&to) {
                continue;
            }
            let to = to as u8;
            if let Some(top) = self.stack_at(to).top() {
                if top.color != color {
                    if square_rank(to) == promo_rank {
                        out.push((to, MoveKind::PromotionCapture));
                    } else {
                        out.push((to, MoveKind::Capture));
                    }
                }
            }
            if Some(to) == self.ep_square {
                out.push((to, MoveKind::EnPassant));
            }
        }

        out
    }

    // Per-square generators ---------------------------------------

    fn generate_piece_moves(&self, sq: u8, piece: Piece, captures_only: bool, out: &mut Vec<Move>) {
        let color = piece.color;

        if piece.kind == PieceKind::Pawn {
            for (to, base) in self.pawn_targets(sq, color, captures_only, true) {
                match base {
                    MoveKind::Promotion | MoveKind::PromotionCapture => {
                        for promo in PROMOTION_KINDS {
                            out.push(Move::with_promotion(sq, to, base, 0, promo));
                        }
                    }
                    _ => out.push(Move::new(sq, to, base)),
                }
            }
            return;
        }

        let targets: Targets = match piece.kind {
            PieceKind::Knight => knight_targets(sq).iter().copied().collect(),
            PieceKind::King => king_targets(sq).iter().copied().collect(),
            PieceKind::Bishop => self.sliding_targets(sq, &BISHOP_DIRECTIONS),
            PieceKind::Rook => self.sliding_targets(sq, &ROOK_DIRECTIONS),
            PieceKind::Queen => self.sliding_targets(sq, &QUEEN_DIRECTIONS),
            PieceKind::Pawn => unreachable!(),
        };

        for to in targets {
            let target = self.stack_at(to);
            match target.top() {
                None => {
                    if !captures_only {
                        out.push(Move::new(sq, to, MoveKind::Normal));
                    }
                }
                Some(top) if top.color != color => {
                    out.push(Move::new(sq, to, MoveKind::Capture));
                }
                Some(top) => {
                    // Klik su un singolo pezzo amico; mai sul re, mai del re
                    if !captures_only
                        && target.count() < 2
                        && piece.kind != PieceKind::King
                        && top.kind != PieceKind::King
                    {
                        out.push(Move::new(sq, to, MoveKind::Klik));
                    }
                }
            }
        }
    }

    /// Moves of one piece out of a 2-stack. The companion stays behind and
    /// keeps blocking rays through the origin; departure itself is free
    /// because rays start one step away from the square.
    fn generate_unklik_moves(
        &self,
        sq: u8,
        index: usize,
        piece: Piece,
        captures_only: bool,
        out: &mut Vec<Move>,
    ) {
        let color = piece.color;
        let idx = index as i8;

        if piece.kind == PieceKind::Pawn {
            for (to, base) in self.pawn_targets(sq, color, captures_only, true) {
                match base {
                    MoveKind::EnPassant => {
                        out.push(Move::with_index(sq, to, MoveKind::EnPassant, idx));
                    }
                    MoveKind::Promotion | MoveKind::PromotionCapture => {
                        for promo in PROMOTION_KINDS {
                            out.push(Move::with_promotion(sq, to, base, idx, promo));
                        }
                    }
                    MoveKind::Klik => {
                        out.push(Move::with_index(sq, to, MoveKind::UnklikKlik, idx));
                    }
                    _ => {
                        out.push(Move::with_index(sq, to, MoveKind::Unklik, idx));
                    }
                }
            }
            return;
        }

        let targets: Targets = match piece.kind {
            PieceKind::Knight => knight_targets(sq).iter().copied().collect(),
            PieceKind::King => king_targets(sq).iter().copied().collect(),
            PieceKind::Bishop => self.sliding_targets(sq, &BISHOP_DIRECTIONS),
            PieceKind::Rook => self.sliding_targets(sq, &ROOK_DIRECTIONS),
            PieceKind::Queen => self.sliding_targets(sq, &QUEEN_DIRECTIONS),
            PieceKind::Pawn => unreachable!(),
        };

        for to in targets {
            let target = self.stack_at(to);
            match target.top() {
                None => {
                    if !captures_only {
                        out.push(Move::with_index(sq, to, MoveKind::Unklik, idx));
                    }
                }
                Some(top) if top.color != color => {
                    out.push(Move::with_index(sq, to, MoveKind::Unklik, idx));
                }
                Some(top) => {
                    if !captures_only
                        && target.count() < 2
                        && piece.kind != PieceKind::King
                        && top.kind != PieceKind::King
                    {
                        out.push(Move::with_index(sq, to, MoveKind::UnklikKlik, idx));
                    }
                }
            }
        }
    }

    /// Both stack pieces move together; the target set is the union of both
    /// pieces' reachable squares. A combined move can never klik (three
    /// pieces on one square), and a carried pawn restricts the back rank
    /// and the promotion rank.
    fn generate_combined_moves(
        &self,
        sq: u8,
        pieces: [Piece; 2],
        captures_only: bool,
        out: &mut Vec<Move>,
    ) {
        let color = pieces[0].color;
        let has_pawn = pieces.iter().any(|p| p.kind == PieceKind::Pawn);
        let back_rank = color.back_rank();
        let promo_rank = color.promotion_rank();

        let mut all_targets = 0u64;
        let mut pawn_reach = 0u64;

        for piece in pieces {
            match piece.kind {
                PieceKind::Pawn => {
                    for (to, _) in self.pawn_targets(sq, color, captures_only, false) {
                        pawn_reach |= 1 << to;
                        all_targets |= 1 << to;
                    }
                }
                PieceKind::Knight => {
                    for &t in knight_targets(sq) {
                        all_targets |= 1 << t;
                    }
                }
                PieceKind::King => {
                    // un re non sta mai in uno stack, gestito per robustezza
                    for &t in king_targets(sq) {
                        all_targets |= 1 << t;
                    }
                }
                PieceKind::Bishop => {
                    for t in self.sliding_targets(sq, &BISHOP_DIRECTIONS) {
                        all_targets |= 1 << t;
                    }
                }
                PieceKind::Rook => {
                    for t in self.sliding_targets(sq, &ROOK_DIRECTIONS) {
                        all_targets |= 1 << t;
                    }
                }
                PieceKind::Queen => {
                    for t in self.sliding_targets(sq, &QUEEN_DIRECTIONS) {
                        all_targets |= 1 << t;
                    }
                }
            }
        }

        let mut mask = all_targets;
        while let Some(to) = pop_lsb(&mut mask) {
            let to_rank = square_rank(to);
            let to_bit = 1u64 << to;
            let target = self.stack_at(to);

            // Un pedone non può mai occupare la propria prima traversa
            if has_pawn && to_rank == back_rank {
                continue;
            }

            // La traversa di promozione si raggiunge solo con movimento di
            // pedone; il compagno accompagna la promozione
            if has_pawn && to_rank == promo_rank {
                if pawn_reach & to_bit == 0 {
                    continue;
                }
                if target.is_empty() {
                    for promo in PROMOTION_KINDS {
                        out.push(Move::with_promotion(
                            sq,
                            to,
                            MoveKind::Promotion,
                            Move::COMBINED,
                            promo,
                        ));
                    }
                } else if target.top().is_some_and(|p| p.color != color) {
                    for promo in PROMOTION_KINDS {
                        out.push(Move::with_promotion(
                            sq,
                            to,
                            MoveKind::PromotionCapture,
                            Move::COMBINED,
                            promo,
                        ));
                    }
                }
                continue;
            }

            if Some(to) == self.ep_square && pawn_reach & to_bit != 0 {
                out.push(Move::with_index(sq, to, MoveKind::EnPassant, Move::COMBINED));
                continue;
            }

            match target.top() {
                None => {
                    if !captures_only {
                        out.push(Move::with_index(sq, to, MoveKind::Normal, Move::COMBINED));
                    }
                }
                Some(top) if top.color != color => {
                    out.push(Move::with_index(sq, to, MoveKind::Capture, Move::COMBINED));
                }
                _ => {} // destinazione amica: klik combinato vietato
            }
        }
    }

    /// Castling, including the stacked-rook and rook-klik variants. The
    /// landing square of the king is covered by the legality filter.
    fn generate_castling_moves(&self, out: &mut Vec<Move>) {
        let color = self.side_to_move;
        let enemy = color.opposite();
        let rank = color.back_rank();
        let king_sq = make_square(4, rank);

        // Il re deve stare da solo sulla casa di partenza
        let king_stack = self.stack_at(king_sq);
        if king_stack.count() != 1 || king_stack.top() != Some(Piece::new(color, PieceKind::King)) {
            return;
        }
        if self.is_attacked(king_sq, enemy) {
            return;
        }

        let (ks_right, qs_right) = match color {
            Color::White => (WK, WQ),
            Color::Black => (BK, BQ),
        };
        let rook = Piece::new(color, PieceKind::Rook);

        if self.castling & ks_right != 0 {
            let rook_sq = make_square(7, rank);
            let f_sq = make_square(5, rank);
            let g_sq = make_square(6, rank);
            if self.stack_at(rook_sq).iter().any(|p| p == rook)
                && self.stack_at(g_sq).is_empty()
                && !self.is_attacked(f_sq, enemy)
            {
                let f_stack = self.stack_at(f_sq);
                if f_stack.is_empty() {
                    out.push(Move::new(king_sq, g_sq, MoveKind::CastleK));
                } else if f_stack.count() == 1
                    && f_stack
                        .top()
                        .is_some_and(|p| p.color == color && p.kind != PieceKind::King)
                {
                    out.push(Move::new(king_sq, g_sq, MoveKind::CastleKKlik));
                }
            }
        }

        if self.castling & qs_right != 0 {
            let rook_sq = make_square(0, rank);
            let d_sq = make_square(3, rank);
            let c_sq = make_square(2, rank);
            let b_sq = make_square(1, rank);
            if self.stack_at(rook_sq).iter().any(|p| p == rook)
                && self.stack_at(c_sq).is_empty()
                && self.stack_at(b_sq).is_empty()
                && !self.is_attacked(d_sq, enemy)
            {
                let d_stack = self.stack_at(d_sq);
                if d_stack.is_empty() {
                    out.push(Move::new(king_sq, c_sq, MoveKind::CastleQ));
                } else if d_stack.count() == 1
                    && d_stack
                        .top()
                        .is_some_and(|p| p.color == color && p.kind != PieceKind::King)
                {
                    out.push(Move::new(king_sq, c_sq, MoveKind::CastleQKlik));
                }
            }
        }
    }

    // Entry points -------------------------------------------------

    fn pseudo_moves(&self, captures_only: bool) -> Vec<Move> {
        let mut out = Vec::with_capacity(64);
        let color = self.side_to_move;

        for sq in 0..64u8 {
            let stack = self.stack_at(sq);
            match stack.count() {
                0 => {}
                1 => {
                    if let Some(piece) = stack.top() {
                        if piece.color == color {
                            self.generate_piece_moves(sq, piece, captures_only, &mut out);
                        }
                    }
                }
                _ => {
                    let friendly: ArrayVec<(usize, Piece), 2> = stack
                        .iter()
                        .enumerate()
                        .filter(|(_, p)| p.color == color)
                        .collect();
                    for &(idx, piece) in &friendly {
                        self.generate_unklik_moves(sq, idx, piece, captures_only, &mut out);
                    }
                    if friendly.len() == 2 {
                        self.generate_combined_moves(
                            sq,
                            [friendly[0].1, friendly[1].1],
                            captures_only,
                            &mut out,
                        );
                    }
                }
            }
        }

        if !captures_only {
            self.generate_castling_moves(&mut out);
        }

        out
    }

    /// All pseudo-legal moves for the side to move
    pub fn generate_pseudo_moves(&self) -> Vec<Move> {
        self.pseudo_moves(false)
    }

    /// Pseudo-legal captures only, for quiescence
    pub fn generate_captures(&self) -> Vec<Move> {
        self.pseudo_moves(true)
    }

    /// Legal moves: pseudo-legal filtered through make / attack test / unmake
    pub fn generate_moves(&mut self) -> Vec<Move> {
        let pseudo = self.generate_pseudo_moves();
        let mut legal = Vec::with_capacity(pseudo.len());
        let us = self.side_to_move;
        for mv in pseudo {
            let undo = self.make_move(mv);
            if !self.is_in_check(us) {
                legal.push(mv);
            }
            self.unmake_move(undo);
        }
        legal
    }

    /// True when the pseudo-legal move does not leave our king attacked
    pub fn is_legal(&mut self, mv: Move) -> bool {
        let us = self.side_to_move;
        let undo = self.make_move(mv);
        let legal = !self.is_in_check(us);
        self.unmake_move(undo);
        legal
    }

    /// Resolve a UCI-extended move string against the legal move list
    pub fn parse_move(&mut self, uci: &str) -> Option<Move> {
        self.generate_moves().into_iter().find(|m| m.to_uci() == uci)
    }

    /// Validate-then-apply for callers holding untrusted moves
    pub fn try_make_move(&mut self, mv: Move) -> Option<Undo> {
        if self.generate_moves().contains(&mv) {
            Some(self.make_move(mv))
        } else {
            None
        }
    }

    // Attack detection ---------------------------------------------

    /// Any piece anywhere in a stack attacks; the layer does not matter.
    pub fn is_attacked(&self, sq: u8, by: Color) -> bool {
        for &from in knight_targets(sq) {
            if self
                .stack_at(from)
                .iter()
                .any(|p| p.color == by && p.kind == PieceKind::Knight)
            {
                return true;
            }
        }

        for &from in king_targets(sq) {
            if self
                .stack_at(from)
                .iter()
                .any(|p| p.color == by && p.kind == PieceKind::King)
            {
                return true;
            }
        }

        for &dir in &BISHOP_DIRECTIONS {
            let mut current = sq as i8;
            loop {
                let prev = current;
                current += dir;
                if !(0..64).contains(&current) || ((current & 7) - (prev & 7)).abs() > 1 {
                    break;
                }
                let stack = self.stack_at(current as u8);
                if !stack.is_empty() {
                    if stack.iter().any(|p| {
                        p.color == by && matches!(p.kind, PieceKind::Bishop | PieceKind::Queen)
                    }) {
                        return true;
                    }
                    break;
                }
            }
        }

        for &dir in &ROOK_DIRECTIONS {
            let mut current = sq as i8;
            loop {
                let prev = current;
                current += dir;
                if !(0..64).contains(&current) || ((current & 7) - (prev & 7)).abs() > 1 {
                    break;
                }
                let stack = self.stack_at(current as u8);
                if !stack.is_empty() {
                    if stack.iter().any(|p| {
                        p.color == by && matches!(p.kind, PieceKind::Rook | PieceKind::Queen)
                    }) {
                        return true;
                    }
                    break;
                }
            }
        }

        let dir = by.pawn_direction();
        for df in [-1i8, 1] {
            let from = sq as i8 - dir + df;
            if (0..64).contains(&from)
                && (square_file(from as u8) as i8 - square_file(sq) as i8).abs() == 1
                && self
                    .stack_at(from as u8)
                    .iter()
                    .any(|p| p.color == by && p.kind == PieceKind::Pawn)
            {
                return true;
            }
        }

        false
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        match self.king_sq[color.index()] {
            Some(sq) => self.is_attacked(sq, color.opposite()),
            None => false,
        }
    }
}
