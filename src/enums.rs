/// Coordinate axis, used for mirroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// The five convex regular polyhedra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatonicSolid {
    Tetrahedron,
    Cube,
    Octahedron,
    Dodecahedron,
    Icosahedron,
}

impl PlatonicSolid {
    pub const ALL: [PlatonicSolid; 5] = [
        PlatonicSolid::Tetrahedron,
        PlatonicSolid::Cube,
        PlatonicSolid::Octahedron,
        PlatonicSolid::Dodecahedron,
        PlatonicSolid::Icosahedron,
    ];
}

/// One step of a spherical camera controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMove {
    /// Decrease azimuth
    Left,
    /// Increase azimuth
    Right,
    /// Move toward the +Y pole
    Up,
    /// Move toward the -Y pole
    Down,
    /// Shrink the orbit radius
    In,
    /// Grow the orbit radius
    Out,
}

/// Horizontal placement of text inside its rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizontalAlignment {
    Left,
    #[default]
    Center,
    Right,
    /// Ignore the aspect ratio and fill the width
    Stretch,
}

/// Vertical placement of text inside its rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAlignment {
    Top,
    #[default]
    Center,
    Bottom,
    /// Ignore the aspect ratio and fill the height
    Stretch,
}
