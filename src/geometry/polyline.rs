use crate::error::{GeometryError, Result};
use crate::math::distance_2d::project_to_segment;
use crate::math::{Point3, Vector3, TOLERANCE};

/// Consecutive points closer than this are collapsed into one.
const DUPLICATE_TOLERANCE: f64 = TOLERANCE * 100.0;

/// A road centerline: an ordered point chain parameterised by arc length.
///
/// Arc-length positions along the chain are called *stations*; station `0`
/// is the first point and station [`Polyline::length`] the last.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    points: Vec<Point3>,
    stations: Vec<f64>,
}

impl Polyline {
    /// Creates a polyline, removing consecutive duplicate points.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::NonFinite` if any coordinate is NaN or
    /// infinite, and `GeometryError::Degenerate` if fewer than two distinct
    /// points remain.
    pub fn new(points: Vec<Point3>) -> Result<Self> {
        if points.iter().any(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return Err(GeometryError::NonFinite("polyline").into());
        }

        let mut cleaned: Vec<Point3> = Vec::with_capacity(points.len());
        for p in points {
            match cleaned.last() {
                Some(last) if (p - last).norm() < DUPLICATE_TOLERANCE => {}
                _ => cleaned.push(p),
            }
        }
        if cleaned.len() < 2 {
            return Err(GeometryError::Degenerate(
                "polyline needs at least two distinct points".into(),
            )
            .into());
        }

        let mut stations = Vec::with_capacity(cleaned.len());
        let mut acc = 0.0;
        stations.push(acc);
        for w in cleaned.windows(2) {
            acc += (w[1] - w[0]).norm();
            stations.push(acc);
        }

        Ok(Self {
            points: cleaned,
            stations,
        })
    }

    /// Returns the vertices.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Returns the total arc length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.stations.last().copied().unwrap_or(0.0)
    }

    /// Returns the first point.
    #[must_use]
    pub fn start(&self) -> Point3 {
        self.points[0]
    }

    /// Returns the last point.
    #[must_use]
    pub fn end(&self) -> Point3 {
        self.points[self.points.len() - 1]
    }

    /// Returns `true` when the two ends coincide within `tolerance`.
    #[must_use]
    pub fn is_closed(&self, tolerance: f64) -> bool {
        (self.end() - self.start()).norm() <= tolerance
    }

    /// Number of straight spans.
    #[must_use]
    pub fn span_count(&self) -> usize {
        self.points.len() - 1
    }

    /// Returns span `i` as `(start, end, start_station, span_length)`.
    #[must_use]
    pub fn span(&self, i: usize) -> (Point3, Point3, f64, f64) {
        (
            self.points[i],
            self.points[i + 1],
            self.stations[i],
            self.stations[i + 1] - self.stations[i],
        )
    }

    /// Index of the span containing station `s` (clamped to the chain).
    fn span_index(&self, s: f64) -> usize {
        let idx = self.stations.partition_point(|&x| x <= s);
        idx.saturating_sub(1).min(self.span_count() - 1)
    }

    /// Unit direction of span `i`.
    fn span_dir(&self, i: usize) -> Vector3 {
        let d = self.points[i + 1] - self.points[i];
        let len = d.norm();
        if len > TOLERANCE {
            d / len
        } else {
            Vector3::x()
        }
    }

    /// Evaluates the point at station `s` (clamped to `[0, length]`).
    #[must_use]
    pub fn point_at(&self, s: f64) -> Point3 {
        let s = s.clamp(0.0, self.length());
        let i = self.span_index(s);
        let (a, b, s0, len) = self.span(i);
        if len < TOLERANCE {
            return a;
        }
        let t = ((s - s0) / len).clamp(0.0, 1.0);
        a + (b - a) * t
    }

    /// Unit tangent at station `s`, pointing toward increasing stations.
    ///
    /// At an interior vertex the two adjacent span directions are averaged.
    #[must_use]
    pub fn tangent_at(&self, s: f64) -> Vector3 {
        let s = s.clamp(0.0, self.length());
        let i = self.span_index(s);
        let dir = self.span_dir(i);

        let at_vertex = |k: usize| {
            k > 0 && k < self.span_count() && (self.stations[k] - s).abs() < DUPLICATE_TOLERANCE
        };
        let vertex = if at_vertex(i) {
            Some(i)
        } else if at_vertex(i + 1) {
            Some(i + 1)
        } else {
            None
        };

        match vertex {
            Some(k) => {
                let sum = self.span_dir(k - 1) + self.span_dir(k);
                let len = sum.norm();
                if len > TOLERANCE {
                    sum / len
                } else {
                    self.span_dir(k)
                }
            }
            None => dir,
        }
    }

    /// Returns the station of the closest point to `p` and its planar distance.
    #[must_use]
    pub fn closest_station(&self, p: &Point3) -> (f64, f64) {
        let mut best = (0.0, f64::INFINITY);
        for i in 0..self.span_count() {
            let (a, b, s0, len) = self.span(i);
            let (t, dist) = project_to_segment(p, &a, &b);
            if dist < best.1 {
                best = (s0 + t * len, dist);
            }
        }
        best
    }

    /// Extracts the piece between stations `s0 < s1`.
    ///
    /// Returns `None` if the piece is degenerate.
    #[must_use]
    pub fn sub(&self, s0: f64, s1: f64) -> Option<Self> {
        let s0 = s0.clamp(0.0, self.length());
        let s1 = s1.clamp(0.0, self.length());
        if s1 - s0 < DUPLICATE_TOLERANCE {
            return None;
        }

        let mut pts = Vec::new();
        pts.push(self.point_at(s0));
        for (p, &s) in self.points.iter().zip(&self.stations) {
            if s > s0 + DUPLICATE_TOLERANCE && s < s1 - DUPLICATE_TOLERANCE {
                pts.push(*p);
            }
        }
        pts.push(self.point_at(s1));
        Self::new(pts).ok()
    }

    /// Splits the polyline at the given sorted interior stations.
    #[must_use]
    pub fn split_at(&self, stations: &[f64]) -> Vec<Self> {
        let mut bounds = Vec::with_capacity(stations.len() + 2);
        bounds.push(0.0);
        bounds.extend_from_slice(stations);
        bounds.push(self.length());
        bounds
            .windows(2)
            .filter_map(|w| self.sub(w[0], w[1]))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn l_shape() -> Polyline {
        Polyline::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(4.0, 3.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn length_and_stations() {
        let p = l_shape();
        assert_relative_eq!(p.length(), 7.0);
        let pt = p.point_at(5.0);
        assert_relative_eq!(pt.x, 4.0);
        assert_relative_eq!(pt.y, 1.0);
    }

    #[test]
    fn duplicates_are_removed() {
        let p = Polyline::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(p.points().len(), 2);
    }

    #[test]
    fn single_point_is_degenerate() {
        let result = Polyline::new(vec![Point3::new(1.0, 1.0, 0.0), Point3::new(1.0, 1.0, 0.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn nan_is_rejected() {
        let result = Polyline::new(vec![Point3::new(f64::NAN, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn tangent_averages_at_corner() {
        let p = l_shape();
        let t = p.tangent_at(4.0);
        let expected = Vector3::new(1.0, 1.0, 0.0).normalize();
        assert_relative_eq!((t - expected).norm(), 0.0, epsilon = 1e-12);

        let t_end = p.tangent_at(7.0);
        assert_relative_eq!((t_end - Vector3::y()).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn closest_station_on_second_span() {
        let p = l_shape();
        let (s, d) = p.closest_station(&Point3::new(5.0, 2.0, 0.0));
        assert_relative_eq!(s, 6.0);
        assert_relative_eq!(d, 1.0);
    }

    #[test]
    fn split_keeps_corner_vertex() {
        let p = l_shape();
        let pieces = p.split_at(&[2.0, 5.0]);
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[1].points().len(), 3);
        assert_relative_eq!(pieces[1].length(), 3.0);
        let total: f64 = pieces.iter().map(Polyline::length).sum();
        assert_relative_eq!(total, 7.0, epsilon = 1e-12);
    }

    #[test]
    fn closed_detection() {
        let square = Polyline::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        ])
        .unwrap();
        assert!(square.is_closed(1e-6));
        assert!(!l_shape().is_closed(1e-6));
    }
}
