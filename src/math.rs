
//! Simple math utilities.

/// Simple two-dimensional vector of any numerical type.
/// Supports only few mathematical operations
/// as this is used mainly as data struct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Vec2<T> (pub T, pub T);

impl<T> Vec2<T> {

    /// Maps all components of this vector to a new type, yielding a vector of that new type.
    pub fn map<B>(self, map: impl Fn(T) -> B) -> Vec2<B> {
        Vec2(map(self.0), map(self.1))
    }
}

impl<T: Copy> Vec2<T> {

    /// The first component of this 2D vector.
    #[inline] pub fn x(&self) -> T { self.0 }

    /// The second component of this 2D vector.
    #[inline] pub fn y(&self) -> T { self.1 }

    /// The first component of this 2D vector.
    #[inline] pub fn width(&self) -> T { self.0 }

    /// The second component of this 2D vector.
    #[inline] pub fn height(&self) -> T { self.1 }
}

impl<T> From<(T, T)> for Vec2<T> {
    fn from((x, y): (T, T)) -> Self { Vec2(x, y) }
}


/// Simple three-dimensional vector of any numerical type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Vec3<T> (pub T, pub T, pub T);


/// Specifies how to round when dividing integers, used for tiled resolution levels.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum RoundingMode {

    /// Round down.
    Down,

    /// Round up.
    Up,
}

impl RoundingMode {

    /// Divide, rounding in the direction of this mode.
    pub fn divide(self, dividend: usize, divisor: usize) -> usize {
        match self {
            RoundingMode::Up => (dividend + divisor - 1) / divisor, // only works for positive numbers
            RoundingMode::Down => dividend / divisor,
        }
    }
}
