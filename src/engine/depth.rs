/// One perpendicular wall distance per screen column.
///
/// Reset to `INFINITY` before the wall pass, written only by walls, read by
/// the sprite pass.
#[derive(Clone, Debug, Default)]
pub struct DepthBuffer {
    cols: Vec<f32>,
}

impl DepthBuffer {
    pub fn new(width: usize) -> Self {
        Self {
            cols: vec![f32::INFINITY; width],
        }
    }

    /// Resize to `width` columns and clear every column to "no wall".
    pub fn reset(&mut self, width: usize) {
        self.cols.clear();
        self.cols.resize(width, f32::INFINITY);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cols.is_empty()
    }

    /// Keep the nearer of the stored and the new distance.
    #[inline]
    pub fn record(&mut self, x: usize, depth: f32) {
        if let Some(d) = self.cols.get_mut(x) {
            *d = d.min(depth);
        }
    }

    /// Stored distance; columns outside the buffer read as empty.
    #[inline]
    pub fn get(&self, x: usize) -> f32 {
        self.cols.get(x).copied().unwrap_or(f32::INFINITY)
    }

    /// Does the wall in column `x` hide something at `depth`?
    /// Equal distances favour the wall.
    #[inline]
    pub fn occludes(&self, x: usize, depth: f32) -> bool {
        self.get(x) <= depth
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.cols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_to_infinity() {
        let mut d = DepthBuffer::new(2);
        d.record(0, 3.0);
        d.reset(4);
        assert_eq!(d.len(), 4);
        assert!(d.as_slice().iter().all(|v| v.is_infinite()));
    }

    #[test]
    fn record_keeps_minimum() {
        let mut d = DepthBuffer::new(1);
        d.record(0, 4.0);
        d.record(0, 6.0);
        assert_eq!(d.get(0), 4.0);
        d.record(0, 2.5);
        assert_eq!(d.get(0), 2.5);
    }

    #[test]
    fn equal_depth_favours_the_wall() {
        let mut d = DepthBuffer::new(3);
        d.record(1, 2.0);
        assert!(d.occludes(1, 2.0));
        assert!(d.occludes(1, 2.5));
        assert!(!d.occludes(1, 1.999));
        assert!(!d.occludes(0, 1000.0));
        assert!(!d.occludes(99, 1.0));
    }
}
