/// Everything a generator or a mesh check can reject.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A polygon needs at least 3 points; holds the count that was given
    DegeneratePolygon(usize),
    /// A triangle refers to a position that does not exist
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        len: usize,
    },
    /// A per-vertex attribute list is neither empty nor one entry per position
    AttributeLengthMismatch {
        attribute: &'static str,
        expected: usize,
        found: usize,
    },
    /// NaN or infinite coordinate at the given position index
    NonFiniteCoordinate(usize),
    /// A generator parameter is out of its valid range
    InvalidParameter(String),
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use GeometryError::*;

        match self {
            DegeneratePolygon(n) => write!(f, "Polygon needs at least 3 points, got {n}"),
            IndexOutOfRange { triangle, index, len } => write!(
                f,
                "Triangle {triangle} refers to index {index} but the mesh has {len} positions"
            ),
            AttributeLengthMismatch {
                attribute,
                expected,
                found,
            } => write!(
                f,
                "Attribute `{attribute}` has {found} entries, expected 0 or {expected}"
            ),
            NonFiniteCoordinate(i) => write!(f, "Position {i} has a non-finite coordinate"),
            InvalidParameter(msg) => write!(f, "Invalid parameter: {msg}"),
        }
    }
}

impl std::error::Error for GeometryError {}

/// Shorthand for rejecting a parameter with a formatted message.
pub(crate) fn invalid<T>(msg: impl Into<String>) -> Result<T, GeometryError> {
    Err(GeometryError::InvalidParameter(msg.into()))
}
