use crate::shared::constants::{FACE_MESH_POINT_COUNT, IRIS_POINT_RANGE};

/// Axis-aligned box enclosing a detected face, in frame pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        (self.x_max - self.x_min).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.y_max - self.y_min).max(0.0)
    }
}

/// Result of one detector invocation: the full landmark mesh for at most one
/// face, or an empty mesh when no face was found.
///
/// Transient by design; callers consume it immediately for overlay rendering
/// or a calibration record and never persist it independently.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionResult {
    landmarks: Vec<(f64, f64)>,
    bounding_box: Option<BoundingBox>,
}

impl DetectionResult {
    pub fn new(landmarks: Vec<(f64, f64)>, bounding_box: Option<BoundingBox>) -> Self {
        Self {
            landmarks,
            bounding_box,
        }
    }

    /// The "no face this frame" result.
    pub fn empty() -> Self {
        Self {
            landmarks: Vec::new(),
            bounding_box: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn landmarks(&self) -> &[(f64, f64)] {
        &self.landmarks
    }

    pub fn into_landmarks(self) -> Vec<(f64, f64)> {
        self.landmarks
    }

    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bounding_box.as_ref()
    }

    /// Face-contour subset of the mesh (indices below 468).
    pub fn face_points(&self) -> &[(f64, f64)] {
        let end = self.landmarks.len().min(FACE_MESH_POINT_COUNT);
        &self.landmarks[..end]
    }

    /// Refined iris keypoints (mesh indices 468..478). Empty when the model
    /// was loaded without iris refinement.
    pub fn iris_points(&self) -> &[(f64, f64)] {
        let start = IRIS_POINT_RANGE.start.min(self.landmarks.len());
        let end = IRIS_POINT_RANGE.end.min(self.landmarks.len());
        &self.landmarks[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::REFINED_MESH_POINT_COUNT;
    use approx::assert_relative_eq;

    fn refined_mesh() -> Vec<(f64, f64)> {
        (0..REFINED_MESH_POINT_COUNT)
            .map(|i| (i as f64, i as f64 * 2.0))
            .collect()
    }

    #[test]
    fn test_empty_result() {
        let result = DetectionResult::empty();
        assert!(result.is_empty());
        assert!(result.face_points().is_empty());
        assert!(result.iris_points().is_empty());
        assert!(result.bounding_box().is_none());
    }

    #[test]
    fn test_refined_mesh_splits_at_fixed_ranges() {
        let result = DetectionResult::new(refined_mesh(), None);
        assert_eq!(result.face_points().len(), 468);
        assert_eq!(result.iris_points().len(), 10);
        assert_relative_eq!(result.iris_points()[0].0, 468.0);
        assert_relative_eq!(result.iris_points()[9].0, 477.0);
    }

    #[test]
    fn test_unrefined_mesh_has_no_iris_points() {
        let mesh: Vec<(f64, f64)> = (0..468).map(|i| (i as f64, 0.0)).collect();
        let result = DetectionResult::new(mesh, None);
        assert_eq!(result.face_points().len(), 468);
        assert!(result.iris_points().is_empty());
    }

    #[test]
    fn test_short_mesh_does_not_panic() {
        let result = DetectionResult::new(vec![(1.0, 2.0)], None);
        assert_eq!(result.face_points().len(), 1);
        assert!(result.iris_points().is_empty());
    }

    #[test]
    fn test_bounding_box_dimensions() {
        let bbox = BoundingBox {
            x_min: 10.0,
            y_min: 20.0,
            x_max: 110.0,
            y_max: 170.0,
        };
        assert_relative_eq!(bbox.width(), 100.0);
        assert_relative_eq!(bbox.height(), 150.0);
    }

    #[test]
    fn test_inverted_bounding_box_clamps_to_zero() {
        let bbox = BoundingBox {
            x_min: 50.0,
            y_min: 50.0,
            x_max: 10.0,
            y_max: 10.0,
        };
        assert_relative_eq!(bbox.width(), 0.0);
        assert_relative_eq!(bbox.height(), 0.0);
    }
}
