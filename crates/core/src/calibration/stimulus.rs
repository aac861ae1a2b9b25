/// A screen position shown to the user to elicit a fixation, in percent
/// coordinates relative to the presentation surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StimulusPoint {
    pub x: f64,
    pub y: f64,
}

impl StimulusPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The default 9-point calibration grid at {10, 50, 90}% in each axis.
pub fn default_grid() -> Vec<StimulusPoint> {
    const STOPS: [f64; 3] = [10.0, 50.0, 90.0];
    let mut points = Vec::with_capacity(9);
    for &x in &STOPS {
        for &y in &STOPS {
            points.push(StimulusPoint::new(x, y));
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_is_nine_points() {
        let grid = default_grid();
        assert_eq!(grid.len(), 9);
        assert_eq!(grid[0], StimulusPoint::new(10.0, 10.0));
        assert_eq!(grid[4], StimulusPoint::new(50.0, 50.0));
        assert_eq!(grid[8], StimulusPoint::new(90.0, 90.0));
    }

    #[test]
    fn test_default_grid_has_no_duplicates() {
        let grid = default_grid();
        for (i, a) in grid.iter().enumerate() {
            for b in &grid[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
