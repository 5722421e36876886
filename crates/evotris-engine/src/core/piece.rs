use arrayvec::ArrayVec;

/// A falling piece with its kind, rotation state, and offset on the grid.
///
/// Pieces are immutable values: movement and rotation return new `Piece`s and leave
/// validation to the caller (see [`Grid::contains`](super::grid::Grid::contains) and
/// [`Grid::fits`](super::grid::Grid::fits)).
///
/// # Coordinate System
///
/// - Offsets are signed so a piece may be positioned partly outside the grid
/// - `row_offset` grows downward, `column_offset` grows rightward
/// - Cell positions are the shape cells of the current rotation shifted by the offsets
///
/// # Example
///
/// ```
/// use evotris_engine::{Piece, PieceKind};
///
/// let piece = Piece::new(PieceKind::T);
/// let moved = piece.right().rotated();
/// assert_eq!(moved.column_offset(), piece.column_offset() + 1);
/// assert_eq!(moved.rotation(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    rotation: u8,
    row_offset: i32,
    column_offset: i32,
}

impl Piece {
    /// Creates a piece at its spawn position in rotation state 0.
    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        let (row_offset, column_offset) = kind.spawn_offset();
        Self {
            kind,
            rotation: 0,
            row_offset,
            column_offset,
        }
    }

    /// Creates a piece at an explicit rotation state and offset.
    ///
    /// `rotation` is reduced modulo the kind's rotation count.
    #[must_use]
    pub fn with_position(kind: PieceKind, rotation: u8, row_offset: i32, column_offset: i32) -> Self {
        Self {
            kind,
            rotation: rotation % kind.rotation_count(),
            row_offset,
            column_offset,
        }
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    #[must_use]
    pub fn row_offset(&self) -> i32 {
        self.row_offset
    }

    #[must_use]
    pub fn column_offset(&self) -> i32 {
        self.column_offset
    }

    /// Returns the `(row, column)` grid positions covered by this piece.
    #[must_use]
    pub fn cells(&self) -> ArrayVec<(i32, i32), 4> {
        self.kind
            .shape(self.rotation)
            .iter()
            .map(|&(dr, dc)| {
                (
                    self.row_offset + i32::from(dr),
                    self.column_offset + i32::from(dc),
                )
            })
            .collect()
    }

    #[must_use]
    pub fn moved(&self, rows: i32, columns: i32) -> Self {
        Self {
            row_offset: self.row_offset + rows,
            column_offset: self.column_offset + columns,
            ..*self
        }
    }

    #[must_use]
    pub fn left(&self) -> Self {
        self.moved(0, -1)
    }

    #[must_use]
    pub fn right(&self) -> Self {
        self.moved(0, 1)
    }

    #[must_use]
    pub fn down(&self) -> Self {
        self.moved(1, 0)
    }

    /// Rotates one step clockwise, wrapping after the kind's last rotation state.
    #[must_use]
    pub fn rotated(&self) -> Self {
        Self {
            rotation: (self.rotation + 1) % self.kind.rotation_count(),
            ..*self
        }
    }
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    #[display("I")]
    I = 0,
    /// O-piece.
    #[display("O")]
    O = 1,
    /// S-piece.
    #[display("S")]
    S = 2,
    /// Z-piece.
    #[display("Z")]
    Z = 3,
    /// J-piece.
    #[display("J")]
    J = 4,
    /// L-piece.
    #[display("L")]
    L = 5,
    /// T-piece.
    #[display("T")]
    T = 6,
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
        PieceKind::T,
    ];

    /// Stable index in `0..LEN`, used for one-hot encodings.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Number of distinct rotation states (1 for O, 4 otherwise).
    #[must_use]
    pub const fn rotation_count(self) -> u8 {
        match self {
            PieceKind::O => 1,
            _ => 4,
        }
    }

    /// `(row, column)` offset at which a new piece of this kind appears.
    #[must_use]
    pub const fn spawn_offset(self) -> (i32, i32) {
        match self {
            PieceKind::I => (-1, 3),
            PieceKind::O => (0, 4),
            _ => (0, 3),
        }
    }

    fn shape(self, rotation: u8) -> &'static PieceShape {
        &PIECE_SHAPES[self.index()][usize::from(rotation % self.rotation_count())]
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use evotris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::T => 'T',
        }
    }
}

/// Cells of one rotation state as `(row, column)` offsets inside the bounding box.
type PieceShape = [(i8, i8); 4];

const PIECE_SHAPES: [[PieceShape; 4]; PieceKind::LEN] = [
    // I-piece
    [
        [(1, 0), (1, 1), (1, 2), (1, 3)],
        [(0, 2), (1, 2), (2, 2), (3, 2)],
        [(2, 0), (2, 1), (2, 2), (2, 3)],
        [(0, 1), (1, 1), (2, 1), (3, 1)],
    ],
    // O-piece (single rotation state, repeated)
    [[(0, 0), (0, 1), (1, 0), (1, 1)]; 4],
    // S-piece
    [
        [(0, 1), (0, 2), (1, 0), (1, 1)],
        [(0, 1), (1, 1), (1, 2), (2, 2)],
        [(1, 1), (1, 2), (2, 0), (2, 1)],
        [(0, 0), (1, 0), (1, 1), (2, 1)],
    ],
    // Z-piece
    [
        [(0, 0), (0, 1), (1, 1), (1, 2)],
        [(0, 2), (1, 1), (1, 2), (2, 1)],
        [(1, 0), (1, 1), (2, 1), (2, 2)],
        [(0, 1), (1, 0), (1, 1), (2, 0)],
    ],
    // J-piece
    [
        [(0, 0), (1, 0), (1, 1), (1, 2)],
        [(0, 1), (0, 2), (1, 1), (2, 1)],
        [(1, 0), (1, 1), (1, 2), (2, 2)],
        [(0, 1), (1, 1), (2, 0), (2, 1)],
    ],
    // L-piece
    [
        [(0, 2), (1, 0), (1, 1), (1, 2)],
        [(0, 1), (1, 1), (2, 1), (2, 2)],
        [(1, 0), (1, 1), (1, 2), (2, 0)],
        [(0, 0), (0, 1), (1, 1), (2, 1)],
    ],
    // T-piece
    [
        [(0, 1), (1, 0), (1, 1), (1, 2)],
        [(0, 1), (1, 1), (1, 2), (2, 1)],
        [(1, 0), (1, 1), (1, 2), (2, 1)],
        [(0, 1), (1, 0), (1, 1), (2, 1)],
    ],
];
