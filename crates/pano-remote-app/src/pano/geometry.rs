/// One resolution level of an equirectangular source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSpec {
    pub width: u32,
}

/// Equirectangular projection: the full sphere mapped onto one 2:1 frame.
#[derive(Debug, Clone, PartialEq)]
pub struct EquirectGeometry {
    levels: Vec<LevelSpec>,
}

impl EquirectGeometry {
    /// Levels are kept sorted from smallest to largest. Zero-width levels
    /// are dropped; an empty list becomes a single nominal level.
    pub fn new(mut levels: Vec<LevelSpec>) -> Self {
        levels.retain(|l| l.width > 0);
        if levels.is_empty() {
            levels.push(LevelSpec { width: 1 });
        }
        levels.sort_by_key(|l| l.width);
        levels.dedup();
        Self { levels }
    }

    /// A single level. For video the width is nominal: there is only one
    /// level to choose from regardless of the decoded frame size.
    pub fn single_level(width: u32) -> Self {
        Self::new(vec![LevelSpec { width }])
    }

    pub fn levels(&self) -> &[LevelSpec] {
        &self.levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_level_video_geometry() {
        let g = EquirectGeometry::single_level(1);
        assert_eq!(g.levels(), &[LevelSpec { width: 1 }]);
    }

    #[test]
    fn empty_levels_get_a_default() {
        let g = EquirectGeometry::new(vec![LevelSpec { width: 0 }]);
        assert_eq!(g.levels().len(), 1);
    }

    #[test]
    fn levels_are_sorted_and_deduplicated() {
        let g = EquirectGeometry::new(vec![
            LevelSpec { width: 8192 },
            LevelSpec { width: 2048 },
            LevelSpec { width: 4096 },
            LevelSpec { width: 2048 },
        ]);
        let widths: Vec<u32> = g.levels().iter().map(|l| l.width).collect();
        assert_eq!(widths, vec![2048, 4096, 8192]);
    }
}
