use crate::math::{Point, Real};

/// Error returned when a strided view does not fit in its backing buffer.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum StridedPointsError {
    /// The stride is smaller than the three coordinates of a point.
    #[error("the stride {stride} with offset {offset} cannot hold three coordinates")]
    StrideTooSmall {
        /// The requested stride, in scalars.
        stride: usize,
        /// The requested offset, in scalars.
        offset: usize,
    },
    /// The last element would read past the end of the buffer.
    #[error("{count} elements with stride {stride} need {needed} scalars, but only {available} are available")]
    OutOfBounds {
        /// Number of requested elements.
        count: usize,
        /// The requested stride, in scalars.
        stride: usize,
        /// Number of scalars the view needs, saturated to `usize::MAX`.
        needed: usize,
        /// Length of the backing buffer.
        available: usize,
    },
}

/// A bounds-checked view over points stored in an interleaved scalar buffer.
///
/// The `i`-th point is read from `data[offset + i * stride..offset + i * stride + 3]`.
/// This lets vertex buffers with non-uniform attribute layouts (position, normal, uvs...)
/// feed mesh construction without being repacked by the caller.
#[derive(Copy, Clone, Debug)]
pub struct StridedPoints<'a> {
    data: &'a [Real],
    stride: usize,
    offset: usize,
    count: usize,
}

impl<'a> StridedPoints<'a> {
    /// Creates a view of `count` points, validating that every element lies inside `data`.
    pub fn new(
        data: &'a [Real],
        stride: usize,
        offset: usize,
        count: usize,
    ) -> Result<Self, StridedPointsError> {
        if stride < 3 || offset.checked_add(3).map_or(true, |end| end > stride) {
            return Err(StridedPointsError::StrideTooSmall { stride, offset });
        }

        // Saturates: an overflowing view never fits in memory.
        let needed = match count.checked_sub(1) {
            None => 0,
            Some(last) => last
                .checked_mul(stride)
                .and_then(|n| n.checked_add(offset + 3))
                .unwrap_or(usize::MAX),
        };

        if needed > data.len() {
            return Err(StridedPointsError::OutOfBounds {
                count,
                stride,
                needed,
                available: data.len(),
            });
        }

        Ok(Self {
            data,
            stride,
            offset,
            count,
        })
    }

    /// A view over a tightly packed `[x, y, z, x, y, z, ...]` buffer.
    pub fn packed(data: &'a [Real]) -> Self {
        Self {
            data,
            stride: 3,
            offset: 0,
            count: data.len() / 3,
        }
    }

    /// The number of points in this view.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Is this view empty?
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The `i`-th point of this view, if it exists.
    pub fn get(&self, i: usize) -> Option<Point<Real>> {
        if i >= self.count {
            return None;
        }

        let base = self.offset + i * self.stride;
        Some(Point::new(
            self.data[base],
            self.data[base + 1],
            self.data[base + 2],
        ))
    }

    /// Iterates through all the points of this view.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Point<Real>> + '_ {
        (0..self.count).map(move |i| {
            let base = self.offset + i * self.stride;
            Point::new(self.data[base], self.data[base + 1], self.data[base + 2])
        })
    }

    /// Copies the points of this view into an owned buffer.
    pub fn to_vec(&self) -> Vec<Point<Real>> {
        self.iter().collect()
    }
}

#[cfg(test)]
mod test {
    use super::{StridedPoints, StridedPointsError};
    use crate::math::Point;

    #[test]
    fn interleaved_positions() {
        // position + normal, 6 scalars per vertex.
        let data = [
            1.0, 2.0, 3.0, 0.0, 0.0, 1.0, //
            4.0, 5.0, 6.0, 0.0, 1.0, 0.0,
        ];
        let view = StridedPoints::new(&data, 6, 0, 2).unwrap();
        assert_eq!(view.len(), 2);
        assert_eq!(view.get(1), Some(Point::new(4.0, 5.0, 6.0)));
        assert_eq!(view.get(2), None);

        let normals = StridedPoints::new(&data, 6, 3, 2).unwrap();
        assert_eq!(normals.get(0), Some(Point::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn out_of_bounds_view_is_rejected() {
        // Two points with a stride of 6 fit in 9 scalars, not three.
        let data = [0.0; 10];
        assert!(StridedPoints::new(&data, 6, 0, 2).is_ok());
        assert!(matches!(
            StridedPoints::new(&data, 6, 0, 3),
            Err(StridedPointsError::OutOfBounds { needed: 15, .. })
        ));
        assert!(matches!(
            StridedPoints::new(&data, 4, 2, 1),
            Err(StridedPointsError::StrideTooSmall { .. })
        ));
        assert!(matches!(
            StridedPoints::new(&data, 6, usize::MAX, 1),
            Err(StridedPointsError::StrideTooSmall { .. })
        ));
    }

    #[test]
    fn overflowing_view_is_rejected() {
        let data = [0.0; 12];
        assert_eq!(
            StridedPoints::new(&data, 6, 0, usize::MAX / 2).unwrap_err(),
            StridedPointsError::OutOfBounds {
                count: usize::MAX / 2,
                stride: 6,
                needed: usize::MAX,
                available: 12,
            }
        );
    }
}
