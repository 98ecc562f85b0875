// Re-export parry for the selected float size
#[cfg(feature = "f64")]
pub use parry3d_f64 as parry3d;

#[cfg(feature = "f32")]
pub use parry3d;

// Scalar type used by every generator:
#[cfg(feature = "f32")]
pub type Real = f32;
#[cfg(feature = "f64")]
pub type Real = f64;

/// Tolerance for geometric comparisons, adjusted per precision.
#[cfg(feature = "f32")]
pub const EPSILON: Real = 1e-5;
#[cfg(feature = "f64")]
pub const EPSILON: Real = 1e-10;

// Pi
#[cfg(feature = "f32")]
pub const PI: Real = core::f32::consts::PI;
#[cfg(feature = "f64")]
pub const PI: Real = core::f64::consts::PI;

// Frac Pi 2
#[cfg(feature = "f32")]
pub const FRAC_PI_2: Real = core::f32::consts::FRAC_PI_2;
#[cfg(feature = "f64")]
pub const FRAC_PI_2: Real = core::f64::consts::FRAC_PI_2;

// Tau
#[cfg(feature = "f32")]
pub const TAU: Real = core::f32::consts::TAU;
#[cfg(feature = "f64")]
pub const TAU: Real = core::f64::consts::TAU;

/// Golden ratio, used by the icosahedron and dodecahedron.
#[cfg(feature = "f32")]
pub const PHI: Real = 1.618_034;
#[cfg(feature = "f64")]
pub const PHI: Real = 1.618_033_988_749_895;

/// Grid step used when two points must hash to the same key.
/// Coarser than `EPSILON` so generator round-off still lands in one bucket.
#[cfg(feature = "f32")]
pub const WELD_TOLERANCE: Real = 1e-4;
#[cfg(feature = "f64")]
pub const WELD_TOLERANCE: Real = 1e-7;
