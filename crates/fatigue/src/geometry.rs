//! Eye and mouth aspect ratios from 68-point facial landmarks

use crate::FatigueError;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Landmark count of the iBUG 300-W annotation scheme
pub const LANDMARK_COUNT: usize = 68;

const RIGHT_EYE: Range<usize> = 36..42;
const LEFT_EYE: Range<usize> = 42..48;
const MOUTH: Range<usize> = 48..68;

/// Image-space landmark position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// EAR: mean of the two vertical lid distances over the horizontal span.
/// A degenerate eye (zero span) yields 0, the "no face" sentinel.
pub fn eye_aspect_ratio(eye: &[Point; 6]) -> f64 {
    let vertical = eye[1].distance(&eye[5]) + eye[2].distance(&eye[4]);
    let horizontal = eye[0].distance(&eye[3]);
    if horizontal == 0.0 {
        0.0
    } else {
        vertical / (2.0 * horizontal)
    }
}

/// MAR over the 20 mouth landmarks (outer lip 0..12, inner lip 12..20)
pub fn mouth_aspect_ratio(mouth: &[Point; 20]) -> f64 {
    let vertical = mouth[2].distance(&mouth[10]) + mouth[4].distance(&mouth[8]);
    let horizontal = mouth[0].distance(&mouth[6]);
    if horizontal == 0.0 {
        0.0
    } else {
        vertical / (2.0 * horizontal)
    }
}

/// One face's 68 landmarks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct FaceLandmarks {
    points: Vec<Point>,
}

impl FaceLandmarks {
    pub fn from_points(points: Vec<Point>) -> Result<Self, FatigueError> {
        if points.len() != LANDMARK_COUNT {
            return Err(FatigueError::Landmarks(format!(
                "expected {LANDMARK_COUNT} points, got {}",
                points.len()
            )));
        }
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(FatigueError::Landmarks("non-finite coordinate".into()));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// EAR averaged over both eyes
    pub fn eye_aspect_ratio(&self) -> f64 {
        let right = eye_aspect_ratio(&self.region::<6>(RIGHT_EYE));
        let left = eye_aspect_ratio(&self.region::<6>(LEFT_EYE));
        (left + right) / 2.0
    }

    pub fn mouth_aspect_ratio(&self) -> f64 {
        mouth_aspect_ratio(&self.region::<20>(MOUTH))
    }

    /// `(ear, mar)` for the classifier
    pub fn ratios(&self) -> (f64, f64) {
        (self.eye_aspect_ratio(), self.mouth_aspect_ratio())
    }

    fn region<const N: usize>(&self, range: Range<usize>) -> [Point; N] {
        let mut out = [Point::new(0.0, 0.0); N];
        out.copy_from_slice(&self.points[range]);
        out
    }
}

impl TryFrom<Vec<Point>> for FaceLandmarks {
    type Error = FatigueError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Self::from_points(points)
    }
}

impl From<FaceLandmarks> for Vec<Point> {
    fn from(landmarks: FaceLandmarks) -> Self {
        landmarks.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eye(openness: f64) -> [Point; 6] {
        // Corners 6 apart, lids `openness` apart
        [
            Point::new(0.0, 0.0),
            Point::new(2.0, -openness / 2.0),
            Point::new(4.0, -openness / 2.0),
            Point::new(6.0, 0.0),
            Point::new(4.0, openness / 2.0),
            Point::new(2.0, openness / 2.0),
        ]
    }

    fn face(eye_openness: f64, mouth_openness: f64) -> FaceLandmarks {
        let mut points = vec![Point::new(0.0, 0.0); LANDMARK_COUNT];
        for (i, p) in eye(eye_openness).into_iter().enumerate() {
            points[36 + i] = Point::new(p.x + 10.0, p.y + 10.0);
            points[42 + i] = Point::new(p.x + 30.0, p.y + 10.0);
        }
        let mut mouth = [Point::new(0.0, 0.0); 20];
        mouth[0] = Point::new(0.0, 0.0);
        mouth[6] = Point::new(10.0, 0.0);
        mouth[2] = Point::new(3.0, -mouth_openness / 2.0);
        mouth[10] = Point::new(3.0, mouth_openness / 2.0);
        mouth[4] = Point::new(7.0, -mouth_openness / 2.0);
        mouth[8] = Point::new(7.0, mouth_openness / 2.0);
        for (i, p) in mouth.into_iter().enumerate() {
            points[48 + i] = Point::new(p.x + 15.0, p.y + 40.0);
        }
        FaceLandmarks::from_points(points).unwrap()
    }

    #[test]
    fn test_eye_aspect_ratio() {
        assert!((eye_aspect_ratio(&eye(3.0)) - 0.5).abs() < 1e-9);
        assert!((eye_aspect_ratio(&eye(0.6)) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_eye_is_zero() {
        let eye = [Point::new(1.0, 1.0); 6];
        assert_eq!(eye_aspect_ratio(&eye), 0.0);
    }

    #[test]
    fn test_face_ratios() {
        let (ear, mar) = face(1.8, 7.0).ratios();
        assert!((ear - 0.3).abs() < 1e-9);
        assert!((mar - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_wrong_point_count() {
        let err = FaceLandmarks::from_points(vec![Point::new(0.0, 0.0); 5]).unwrap_err();
        assert!(matches!(err, FatigueError::Landmarks(_)));
    }

    #[test]
    fn test_deserialize_from_pairs() {
        let pairs: Vec<[f64; 2]> = (0..LANDMARK_COUNT).map(|i| [i as f64, 1.0]).collect();
        let json = serde_json::to_string(&pairs).unwrap();
        let landmarks: FaceLandmarks = serde_json::from_str(&json).unwrap();
        assert_eq!(landmarks.points()[10], Point::new(10.0, 1.0));

        assert!(serde_json::from_str::<FaceLandmarks>("[[0.0, 1.0]]").is_err());
    }
}
