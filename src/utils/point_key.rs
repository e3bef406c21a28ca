use crate::math::{Point, Real};
use core::hash::{Hash, Hasher};

/// A point wrapper hashable by the bit pattern of its coordinates.
///
/// Negative zeros are normalized so `-0.0` and `0.0` hash and compare equal.
#[derive(Copy, Clone, Debug)]
pub struct PointKey(pub Point<Real>);

impl PointKey {
    fn bits(&self) -> [u64; 3] {
        let norm = |x: Real| if x == 0.0 { 0.0 } else { x };
        [
            norm(self.0.x).to_bits() as u64,
            norm(self.0.y).to_bits() as u64,
            norm(self.0.z).to_bits() as u64,
        ]
    }
}

impl PartialEq for PointKey {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for PointKey {}

impl Hash for PointKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state)
    }
}
