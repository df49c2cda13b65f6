// Mapping di quadrati: A1=0, B1=1, ..., H8=63
// Ogni casella contiene uno stack di 0, 1 o 2 pezzi dello stesso colore;
// il fondo dello stack è l'indice 0.

use arrayvec::ArrayVec;
use thiserror::Error;

use crate::utils::{make_square, parse_square, square_file, square_name, square_rank};
use crate::zobrist;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// Castling rights bits
pub const WK: u8 = 1;
pub const WQ: u8 = 2;
pub const BK: u8 = 4;
pub const BQ: u8 = 8;

// Rights-relevant squares
pub const A1: u8 = 0;
pub const E1: u8 = 4;
pub const H1: u8 = 7;
pub const A8: u8 = 56;
pub const E8: u8 = 60;
pub const H8: u8 = 63;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    #[inline]
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Rank holding this color's unmoved pawns (rank 2 / rank 7)
    #[inline]
    pub fn pawn_start_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    #[inline]
    pub fn promotion_rank(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    #[inline]
    pub fn back_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// Forward square delta for this color's pawns
    #[inline]
    pub fn pawn_direction(self) -> i8 {
        match self {
            Color::White => 8,
            Color::Black => -8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    #[inline]
    pub fn new(color: Color, kind: PieceKind) -> Piece {
        Piece { color, kind }
    }

    /// Table index: kind in the low 3 bits (1..=6), color in bit 3
    #[inline]
    pub fn index(self) -> usize {
        ((self.color as usize) << 3) | (self.kind as usize + 1)
    }

    pub fn to_char(self) -> char {
        let c = match self.kind {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    pub fn from_char(c: char) -> Option<Piece> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let kind = match c.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return None,
        };
        Some(Piece::new(color, kind))
    }
}

/// Stack di caselle: al massimo due pezzi, fondo per primo
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SquareStack {
    pieces: ArrayVec<Piece, 2>,
}

impl SquareStack {
    #[inline]
    pub fn empty() -> SquareStack {
        SquareStack::default()
    }

    #[inline]
    pub fn single(piece: Piece) -> SquareStack {
        let mut stack = SquareStack::default();
        stack.pieces.push(piece);
        stack
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// True when two pieces share the square
    #[inline]
    pub fn is_stack(&self) -> bool {
        self.pieces.len() == 2
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.pieces.len()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Piece> {
        self.pieces.get(index).copied()
    }

    #[inline]
    pub fn top(&self) -> Option<Piece> {
        self.pieces.last().copied()
    }

    #[inline]
    pub fn bottom(&self) -> Option<Piece> {
        self.pieces.first().copied()
    }

    #[inline]
    pub fn push(&mut self, piece: Piece) {
        self.pieces.push(piece);
    }

    #[inline]
    pub fn remove(&mut self, index: usize) -> Piece {
        self.pieces.remove(index)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.pieces.clear();
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = Piece> + '_ {
        self.pieces.iter().copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Piece] {
        &self.pieces
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Normal,
    Capture,
    Klik,
    Unklik,
    UnklikKlik,
    EnPassant,
    CastleK,
    CastleQ,
    CastleKKlik,
    CastleQKlik,
    Promotion,
    PromotionCapture,
}

impl MoveKind {
    /// Kinds that remove an enemy piece by definition. An Unklik onto an
    /// enemy square also captures; that is decided from the board.
    #[inline]
    pub fn is_capture(self) -> bool {
        matches!(
            self,
            MoveKind::Capture | MoveKind::EnPassant | MoveKind::PromotionCapture
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            MoveKind::Normal => "NORMAL",
            MoveKind::Capture => "CAPTURE",
            MoveKind::Klik => "KLIK",
            MoveKind::Unklik => "UNKLIK",
            MoveKind::UnklikKlik => "UNKLIK_KLIK",
            MoveKind::EnPassant => "EN_PASSANT",
            MoveKind::CastleK => "CASTLE_K",
            MoveKind::CastleQ => "CASTLE_Q",
            MoveKind::CastleKKlik => "CASTLE_K_KLIK",
            MoveKind::CastleQKlik => "CASTLE_Q_KLIK",
            MoveKind::Promotion => "PROMOTION",
            MoveKind::PromotionCapture => "PROMOTION_CAPTURE",
        }
    }
}

/// Mossa codificata come record di valori.
///
/// `unklik_index` seleziona quale pezzo dello stack di partenza si muove:
/// 0 = fondo, 1 = cima, [`Move::COMBINED`] = entrambi insieme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: u8,
    pub to: u8,
    pub kind: MoveKind,
    pub unklik_index: i8,
    pub promotion: Option<PieceKind>,
}

impl Move {
    pub const COMBINED: i8 = -1;

    #[inline]
    pub fn new(from: u8, to: u8, kind: MoveKind) -> Move {
        Move {
            from,
            to,
            kind,
            unklik_index: 0,
            promotion: None,
        }
    }

    #[inline]
    pub fn with_index(from: u8, to: u8, kind: MoveKind, unklik_index: i8) -> Move {
        Move {
            from,
            to,
            kind,
            unklik_index,
            promotion: None,
        }
    }

    #[inline]
    pub fn with_promotion(
        from: u8,
        to: u8,
        kind: MoveKind,
        unklik_index: i8,
        promotion: PieceKind,
    ) -> Move {
        Move {
            from,
            to,
            kind,
            unklik_index,
            promotion: Some(promotion),
        }
    }

    #[inline]
    pub fn is_combined(&self) -> bool {
        self.unklik_index == Move::COMBINED
    }

    /// UCI-style string with the Klikschaak extensions:
    /// `k` klik, `u<i>` unklik, `U<i>` unklik-klik
    pub fn to_uci(&self) -> String {
        let mut s = square_name(self.from);
        s.push_str(&square_name(self.to));

        if let Some(kind) = self.promotion {
            s.push(match kind {
                PieceKind::Knight => 'n',
                PieceKind::Bishop => 'b',
                PieceKind::Rook => 'r',
                PieceKind::Queen => 'q',
                _ => '?',
            });
        }

        match self.kind {
            MoveKind::Klik => s.push('k'),
            MoveKind::Unklik => {
                s.push('u');
                s.push((b'0' + self.unklik_index as u8) as char);
            }
            MoveKind::UnklikKlik => {
                s.push('U');
                s.push((b'0' + self.unklik_index as u8) as char);
            }
            _ => {}
        }

        s
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("expected at least 4 FEN fields, found {0}")]
    MissingFields(usize),
    #[error("invalid piece character '{0}'")]
    InvalidPiece(char),
    #[error("unterminated stack group")]
    UnterminatedStack,
    #[error("stack holds more than two pieces")]
    OversizedStack,
    #[error("stack with mixed colors")]
    MixedStack,
    #[error("king inside a stack")]
    KingInStack,
    #[error("piece placement runs off the board")]
    OutOfBounds,
    #[error("invalid side to move '{0}'")]
    InvalidSide(String),
    #[error("invalid castling character '{0}'")]
    InvalidCastling(char),
    #[error("invalid en passant square '{0}'")]
    InvalidEnPassant(String),
    #[error("invalid clock value '{0}'")]
    InvalidClock(String),
}

/// Record di rollback per unmake_move: stack precedenti delle caselle
/// toccate più tutto lo stato scalare.
#[derive(Debug, Clone)]
pub struct Undo {
    touched: ArrayVec<(u8, SquareStack), 4>,
    castling: u8,
    ep_square: Option<u8>,
    halfmove_clock: u16,
    fullmove: u16,
    king_sq: [Option<u8>; 2],
    unmoved_pawns: [u8; 2],
    zobrist: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [SquareStack; 64],
    pub side_to_move: Color,
    pub castling: u8,
    pub ep_square: Option<u8>,
    pub halfmove_clock: u16,
    pub fullmove: u16,
    pub king_sq: [Option<u8>; 2],
    /// Per colore, bit per colonna: pedone ancora fermo sulla traversa iniziale
    pub unmoved_pawns: [u8; 2],
    pub zobrist: u64,
}

impl Board {
    /// Empty board to be populated via set_from_fen
    pub fn new() -> Board {
        let mut board = Board {
            squares: std::array::from_fn(|_| SquareStack::empty()),
            side_to_move: Color::White,
            castling: 0,
            ep_square: None,
            halfmove_clock: 0,
            fullmove: 1,
            king_sq: [None, None],
            unmoved_pawns: [0, 0],
            zobrist: 0,
        };
        board.zobrist = zobrist::compute(&board);
        board
    }

    // Piece access ------------------------------------------------

    #[inline]
    pub fn stack_at(&self, sq: u8) -> &SquareStack {
        &self.squares[sq as usize]
    }

    /// Top piece of a square, None when empty
    #[inline]
    pub fn piece_at(&self, sq: u8) -> Option<Piece> {
        self.squares[sq as usize].top()
    }

    #[inline]
    pub fn is_empty_square(&self, sq: u8) -> bool {
        self.squares[sq as usize].is_empty()
    }

    fn put_piece(&mut self, sq: u8, piece: Piece) {
        if piece.kind == PieceKind::King {
            self.king_sq[piece.color.index()] = Some(sq);
        }
        self.squares[sq as usize] = SquareStack::single(piece);
    }

    // Make/unmake -------------------------------------------------

    /// Apply a move in place. Legality is NOT checked; feeding a move that
    /// was not generated for this position is a programmer error.
    pub fn make_move(&mut self, mv: Move) -> Undo {
        let from = mv.from as usize;
        let to = mv.to as usize;
        let us = self.side_to_move;

        let mut undo = Undo {
            touched: ArrayVec::new(),
            castling: self.castling,
            ep_square: self.ep_square,
            halfmove_clock: self.halfmove_clock,
            fullmove: self.fullmove,
            king_sq: self.king_sq,
            unmoved_pawns: self.unmoved_pawns,
            zobrist: self.zobrist,
        };
        undo.touched.push((mv.from, self.squares[from].clone()));
        undo.touched.push((mv.to, self.squares[to].clone()));

        // Quali pezzi lasciano davvero l'origine, per orologio e maschere
        let pawn_moved = match mv.kind {
            MoveKind::Unklik | MoveKind::UnklikKlik => self.squares[from]
                .get(mv.unklik_index as usize)
                .is_some_and(|p| p.kind == PieceKind::Pawn),
            MoveKind::Promotion | MoveKind::PromotionCapture
                if mv.unklik_index >= 0 && self.squares[from].count() >= 2 =>
            {
                self.squares[from]
                    .get(mv.unklik_index as usize)
                    .is_some_and(|p| p.kind == PieceKind::Pawn)
            }
            _ => self.squares[from].iter().any(|p| p.kind == PieceKind::Pawn),
        };

        let is_capture = match mv.kind {
            MoveKind::Capture | MoveKind::EnPassant | MoveKind::PromotionCapture => true,
            MoveKind::Unklik => self.squares[to].top().is_some_and(|p| p.color != us),
            _ => false,
        };

        match mv.kind {
            MoveKind::CastleK | MoveKind::CastleQ | MoveKind::CastleKKlik | MoveKind::CastleQKlik => {
                let kingside = matches!(mv.kind, MoveKind::CastleK | MoveKind::CastleKKlik);
                let klik = matches!(mv.kind, MoveKind::CastleKKlik | MoveKind::CastleQKlik);
                let rank = us.back_rank();
                let rook_from = make_square(if kingside { 7 } else { 0 }, rank) as usize;
                let rook_to = make_square(if kingside { 5 } else { 3 }, rank) as usize;
                undo.touched
                    .push((rook_from as u8, self.squares[rook_from].clone()));
                undo.touched
                    .push((rook_to as u8, self.squares[rook_to].clone()));

                // Estrae la torre dall'angolo lasciando l'eventuale compagno
                let rook_idx = self.squares[rook_from]
                    .iter()
                    .position(|p| p.color == us && p.kind == PieceKind::Rook);
                let rook = match rook_idx {
                    Some(i) => self.squares[rook_from].remove(i),
                    None => Piece::new(us, PieceKind::Rook),
                };

                self.squares[from].clear();
                self.squares[to] = SquareStack::single(Piece::new(us, PieceKind::King));
                if klik {
                    self.squares[rook_to].push(rook);
                } else {
                    self.squares[rook_to] = SquareStack::single(rook);
                }
                self.king_sq[us.index()] = Some(mv.to);
            }
            MoveKind::Unklik | MoveKind::UnklikKlik => {
                let piece = self.squares[from].remove(mv.unklik_index as usize);
                if mv.kind == MoveKind::UnklikKlik {
                    self.squares[to].push(piece);
                } else {
                    self.squares[to] = SquareStack::single(piece);
                }
                if piece.kind == PieceKind::King {
                    self.king_sq[us.index()] = Some(mv.to);
                }
            }
            MoveKind::Klik => {
                let movers = std::mem::take(&mut self.squares[from]);
                for piece in movers.iter() {
                    self.squares[to].push(piece);
                    if piece.kind == PieceKind::King {
                        self.king_sq[us.index()] = Some(mv.to);
                    }
                }
            }
            MoveKind::EnPassant => {
                let captured_sq = if us == Color::White { to - 8 } else { to + 8 };
                undo.touched
                    .push((captured_sq as u8, self.squares[captured_sq].clone()));
                // L'unklik lascia il compagno; la mossa combinata porta tutto
                let movers = if mv.unklik_index >= 0 && self.squares[from].count() >= 2 {
                    SquareStack::single(self.squares[from].remove(mv.unklik_index as usize))
                } else {
                    std::mem::take(&mut self.squares[from])
                };
                self.squares[captured_sq].clear();
                self.squares[to] = movers;
            }
            MoveKind::Promotion | MoveKind::PromotionCapture => {
                let promoted = Piece::new(us, mv.promotion.expect("promotion without piece kind"));
                if mv.unklik_index == Move::COMBINED {
                    // Il compagno accompagna e resta sotto il pezzo promosso
                    let companion = self.squares[from].iter().find(|p| p.kind != PieceKind::Pawn);
                    let mut landing = SquareStack::empty();
                    if let Some(companion) = companion {
                        landing.push(companion);
                    }
                    landing.push(promoted);
                    self.squares[from].clear();
                    self.squares[to] = landing;
                } else if self.squares[from].count() >= 2 {
                    self.squares[from].remove(mv.unklik_index as usize);
                    self.squares[to] = SquareStack::single(promoted);
                } else {
                    self.squares[from].clear();
                    self.squares[to] = SquareStack::single(promoted);
                }
            }
            MoveKind::Normal | MoveKind::Capture => {
                let movers = std::mem::take(&mut self.squares[from]);
                for piece in movers.iter() {
                    if piece.kind == PieceKind::King {
                        self.king_sq[us.index()] = Some(mv.to);
                    }
                }
                self.squares[to] = movers;
            }
        }

        // Touched-square rights update: e1/a1/h1 e simmetrici
        for sq in [mv.from, mv.to] {
            match sq {
                E1 => self.castling &= !(WK | WQ),
                A1 => self.castling &= !WQ,
                H1 => self.castling &= !WK,
                E8 => self.castling &= !(BK | BQ),
                A8 => self.castling &= !BQ,
                H8 => self.castling &= !BK,
                _ => {}
            }
        }

        if pawn_moved || is_capture {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        // En passant si arma solo con una spinta di pedone di due traverse
        self.ep_square = None;
        if pawn_moved
            && square_file(mv.from) == square_file(mv.to)
            && square_rank(mv.from) == us.pawn_start_rank()
            && square_rank(mv.from).abs_diff(square_rank(mv.to)) == 2
        {
            self.ep_square = Some((mv.from + mv.to) / 2);
        }

        if pawn_moved && square_rank(mv.from) == us.pawn_start_rank() {
            self.unmoved_pawns[us.index()] &= !(1 << square_file(mv.from));
        }

        self.side_to_move = us.opposite();
        if self.side_to_move == Color::White {
            self.fullmove += 1;
        }

        self.zobrist = zobrist::compute(self);
        undo
    }

    /// Exact inverse of make_move
    pub fn unmake_move(&mut self, undo: Undo) {
        for (sq, stack) in undo.touched {
            self.squares[sq as usize] = stack;
        }
        self.castling = undo.castling;
        self.ep_square = undo.ep_square;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove = undo.fullmove;
        self.king_sq = undo.king_sq;
        self.unmoved_pawns = undo.unmoved_pawns;
        self.zobrist = undo.zobrist;
        self.side_to_move = self.side_to_move.opposite();
    }

    // FEN ---------------------------------------------------------

    pub fn from_fen(fen: &str) -> Result<Board, FenError> {
        let mut board = Board::new();
        board.set_from_fen(fen)?;
        Ok(board)
    }

    /// Parse a FEN string extended with `(XY)` stack groups.
    pub fn set_from_fen(&mut self, fen: &str) -> Result<(), FenError> {
        crate::init();

        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(FenError::MissingFields(parts.len()));
        }

        self.squares = std::array::from_fn(|_| SquareStack::empty());
        self.king_sq = [None, None];

        let mut rank: i8 = 7;
        let mut file: i8 = 0;
        let mut chars = parts[0].chars();
        while let Some(c) = chars.next() {
            match c {
                '/' => {
                    rank -= 1;
                    file = 0;
                }
                '1'..='8' => {
                    file += c as i8 - '0' as i8;
                }
                '(' => {
                    let mut stack = SquareStack::empty();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        if inner == ')' {
                            closed = true;
                            break;
                        }
                        if stack.count() == 2 {
                            return Err(FenError::OversizedStack);
                        }
                        let piece =
                            Piece::from_char(inner).ok_or(FenError::InvalidPiece(inner))?;
                        stack.push(piece);
                    }
                    if !closed {
                        return Err(FenError::UnterminatedStack);
                    }
                    if stack.is_stack() {
                        if stack.iter().any(|p| p.kind == PieceKind::King) {
                            return Err(FenError::KingInStack);
                        }
                        if stack.bottom().map(|p| p.color) != stack.top().map(|p| p.color) {
                            return Err(FenError::MixedStack);
                        }
                    }
                    if !(0..8).contains(&rank) || !(0..8).contains(&file) {
                        return Err(FenError::OutOfBounds);
                    }
                    let sq = make_square(file as u8, rank as u8);
                    for piece in stack.iter() {
                        if piece.kind == PieceKind::King {
                            self.king_sq[piece.color.index()] = Some(sq);
                        }
                    }
                    self.squares[sq as usize] = stack;
                    file += 1;
                }
                _ => {
                    let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece(c))?;
                    if !(0..8).contains(&rank) || !(0..8).contains(&file) {
                        return Err(FenError::OutOfBounds);
                    }
                    self.put_piece(make_square(file as u8, rank as u8), piece);
                    file += 1;
                }
            }
        }

        self.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            s => return Err(FenError::InvalidSide(s.to_string())),
        };

        self.castling = 0;
        for c in parts[2].chars() {
            match c {
                'K' => self.castling |= WK,
                'Q' => self.castling |= WQ,
                'k' => self.castling |= BK,
                'q' => self.castling |= BQ,
                '-' => {}
                _ => return Err(FenError::InvalidCastling(c)),
            }
        }

        self.ep_square = match parts[3] {
            "-" => None,
            s => {
                let sq = parse_square(s)
                    .filter(|&sq| square_rank(sq) == 2 || square_rank(sq) == 5)
                    .ok_or_else(|| FenError::InvalidEnPassant(s.to_string()))?;
                Some(sq)
            }
        };

        self.halfmove_clock = match parts.get(4) {
            Some(s) => s
                .parse()
                .map_err(|_| FenError::InvalidClock(s.to_string()))?,
            None => 0,
        };
        self.fullmove = match parts.get(5) {
            Some(s) => s
                .parse()
                .map_err(|_| FenError::InvalidClock(s.to_string()))?,
            None => 1,
        };

        // Maschera dei pedoni fermi: ricostruita guardando le traverse iniziali
        self.unmoved_pawns = [0, 0];
        for f in 0..8u8 {
            for color in [Color::White, Color::Black] {
                let sq = make_square(f, color.pawn_start_rank());
                let has_pawn = self.squares[sq as usize]
                    .iter()
                    .any(|p| p.color == color && p.kind == PieceKind::Pawn);
                if has_pawn {
                    self.unmoved_pawns[color.index()] |= 1 << f;
                }
            }
        }

        self.zobrist = zobrist::compute(self);
        Ok(())
    }

    /// Emit the position as a FEN string; 2-stacks become `(XY)` groups.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);

        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                let stack = &self.squares[make_square(file, rank) as usize];
                if stack.is_empty() {
                    empty += 1;
                    continue;
                }
                if empty > 0 {
                    fen.push((b'0' + empty) as char);
                    empty = 0;
                }
                if stack.is_stack() {
                    fen.push('(');
                    for piece in stack.iter() {
                        fen.push(piece.to_char());
                    }
                    fen.push(')');
                } else if let Some(piece) = stack.top() {
                    fen.push(piece.to_char());
                }
            }
            if empty > 0 {
                fen.push((b'0' + empty) as char);
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        fen.push(' ');
        if self.castling == 0 {
            fen.push('-');
        } else {
            if self.castling & WK != 0 {
                fen.push('K');
            }
            if self.castling & WQ != 0 {
                fen.push('Q');
            }
            if self.castling & BK != 0 {
                fen.push('k');
            }
            if self.castling & BQ != 0 {
                fen.push('q');
            }
        }

        fen.push(' ');
        match self.ep_square {
            Some(sq) => fen.push_str(&square_name(sq)),
            None => fen.push('-'),
        }

        fen.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove));
        fen
    }
}

impl Default for Board {
    fn default() -> Board {
        let mut board = Board::new();
        board
            .set_from_fen(START_FEN)
            .expect("starting FEN is valid");
        board
    }
}

// Simple grid dump for debugging; stacks print as two characters
impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let stack = &self.squares[make_square(file, rank) as usize];
                match (stack.bottom(), stack.top()) {
                    (Some(bottom), Some(top)) if stack.is_stack() => {
                        write!(f, "{}{} ", bottom.to_char(), top.to_char())?;
                    }
                    (Some(piece), _) => write!(f, "{}  ", piece.to_char())?,
                    _ => write!(f, ".  ")?,
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "  a  b  c  d  e  f  g  h")?;
        write!(f, "{}", self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_index_layout() {
        let wp = Piece::new(Color::White, PieceKind::Pawn);
        let bp = Piece::new(Color::Black, PieceKind::Pawn);
        let bk = Piece::new(Color::Black, PieceKind::King);
        assert_eq!(wp.index(), 1);
        assert_eq!(bp.index(), 9);
        assert_eq!(bk.index(), 14);
    }

    #[test]
    fn test_stack_order() {
        let mut stack = SquareStack::single(Piece::new(Color::White, PieceKind::Pawn));
        stack.push(Piece::new(Color::White, PieceKind::Knight));
        assert!(stack.is_stack());
        assert_eq!(stack.bottom().unwrap().kind, PieceKind::Pawn);
        assert_eq!(stack.top().unwrap().kind, PieceKind::Knight);
        let removed = stack.remove(0);
        assert_eq!(removed.kind, PieceKind::Pawn);
        assert_eq!(stack.top().unwrap().kind, PieceKind::Knight);
        assert_eq!(stack.count(), 1);
    }

    #[test]
    fn test_fen_start_position() {
        let board = Board::default();
        assert_eq!(board.side_to_move, Color::White);
        assert_eq!(board.castling, WK | WQ | BK | BQ);
        assert_eq!(board.unmoved_pawns, [0xFF, 0xFF]);
        assert_eq!(board.king_sq, [Some(E1), Some(E8)]);
        assert_eq!(board.to_fen(), START_FEN);
    }

    #[test]
    fn test_fen_rejects_garbage() {
        let mut board = Board::new();
        assert_eq!(
            board.set_from_fen("rnbqkbnr/pppppppp w KQkq"),
            Err(FenError::MissingFields(3))
        );
        assert!(matches!(
            board.set_from_fen("rnbqkbnr/ppppXppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenError::InvalidPiece('X'))
        ));
        assert!(matches!(
            board.set_from_fen("8/8/8/4(NPQ)3/8/8/8/4K2k w - - 0 1"),
            Err(FenError::OversizedStack)
        ));
        assert!(matches!(
            board.set_from_fen("8/8/8/4(Np)3/8/8/8/4K2k w - - 0 1"),
            Err(FenError::MixedStack)
        ));
        assert!(matches!(
            board.set_from_fen("8/8/8/4(KP)3/8/8/8/7k w - - 0 1"),
            Err(FenError::KingInStack)
        ));
        assert!(matches!(
            board.set_from_fen("8/8/8/4(NP3/8/8/8/4K2k w - - 0 1"),
            Err(FenError::UnterminatedStack)
        ));
    }

    #[test]
    fn test_make_unmake_restores_everything() {
        let mut board = Board::default();
        let before = board.clone();
        let moves = board.generate_pseudo_moves();
        assert!(!moves.is_empty());
        for mv in moves {
            let undo = board.make_move(mv);
            let restored = board.clone();
            board.unmake_move(undo);
            assert_eq!(board, before, "board not restored after {:?}", mv);
            assert_ne!(restored, before, "make had no effect for {:?}", mv);
        }
    }

    #[test]
    fn test_klik_stacks_in_order() {
        let mut board = Board::from_fen("4k3/8/8/8/4N3/8/4P3/4K3 w - - 0 1").unwrap();
        let mv = Move::new(12, 28, MoveKind::Klik); // e2 pawn onto e4 knight
        board.make_move(mv);
        let stack = board.stack_at(28);
        assert!(stack.is_stack());
        assert_eq!(stack.bottom().unwrap().kind, PieceKind::Knight);
        assert_eq!(stack.top().unwrap().kind, PieceKind::Pawn);
        assert!(board.is_empty_square(12));
    }

    #[test]
    fn test_unklik_leaves_companion() {
        let mut board = Board::from_fen("4k3/8/8/8/4(NP)3/8/8/4K3 w - - 0 1").unwrap();
        // Knight (bottom, index 0) leaves the e4 stack for c5
        let mv = Move::with_index(28, 34, MoveKind::Unklik, 0);
        board.make_move(mv);
        assert_eq!(board.stack_at(28).count(), 1);
        assert_eq!(board.stack_at(28).top().unwrap().kind, PieceKind::Pawn);
        assert_eq!(board.stack_at(34).top().unwrap().kind, PieceKind::Knight);
    }

    #[test]
    fn test_double_push_arms_en_passant() {
        let mut board = Board::default();
        board.make_move(Move::new(12, 28, MoveKind::Normal)); // e2e4
        assert_eq!(board.ep_square, Some(20)); // e3
        assert_eq!(board.unmoved_pawns[Color::White.index()], 0xFF & !(1 << 4));
        board.make_move(Move::new(57, 42, MoveKind::Normal)); // Nb8c6
        assert_eq!(board.ep_square, None);
    }

    #[test]
    fn test_halfmove_clock_resets_on_unklik_capture() {
        let mut board =
            Board::from_fen("4k3/8/8/8/8/2p5/8/1(NB)2K3 w - - 7 20").unwrap();
        // Knight (bottom, index 0) unkliks from b1 and captures on c3
        let mv = Move::with_index(1, 18, MoveKind::Unklik, 0);
        board.make_move(mv);
        assert_eq!(board.halfmove_clock, 0);
    }
}
