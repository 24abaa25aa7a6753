use crate::error::{InputError, Result};
use crate::graph::{EdgeId, RoadEdge};
use crate::mesh::QuadMesh;

use super::junction::Setbacks;

/// Parameters controlling street strip subdivision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripParams {
    /// Lower bound for the number of quads along a strip.
    pub min_spans: usize,
}

impl Default for StripParams {
    fn default() -> Self {
        Self { min_spans: 1 }
    }
}

impl StripParams {
    /// # Errors
    ///
    /// Returns `InputError::InvalidParameter` if `min_spans` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.min_spans == 0 {
            return Err(InputError::InvalidParameter {
                parameter: "strip.min_spans",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        Ok(())
    }
}

/// Sweeps a road's cross-section along the trimmed part of its centerline.
///
/// The strip runs between the two junction setbacks and has roughly
/// square quads: one span per road width of length.
#[derive(Debug)]
pub struct BuildStreetStrip<'a> {
    id: EdgeId,
    edge: &'a RoadEdge,
    setbacks: &'a Setbacks,
    params: StripParams,
}

impl<'a> BuildStreetStrip<'a> {
    /// Creates a new strip operation.
    #[must_use]
    pub fn new(
        id: EdgeId,
        edge: &'a RoadEdge,
        setbacks: &'a Setbacks,
        params: StripParams,
    ) -> Self {
        Self {
            id,
            edge,
            setbacks,
            params,
        }
    }

    /// Executes the sweep. A road fully consumed by its junctions yields
    /// an empty mesh.
    #[must_use]
    pub fn execute(&self) -> QuadMesh {
        let (s0, s1) = self.setbacks.trimmed_range(self.id, self.edge);
        let trimmed = s1 - s0;
        let mut mesh = QuadMesh::new();
        if trimmed <= 0.0 {
            return mesh;
        }

        let spans = span_count(trimmed, self.edge.road_type.width(), self.params.min_spans);
        let mut previous: Option<(u32, u32)> = None;
        for i in 0..=spans {
            #[allow(clippy::cast_precision_loss)]
            let station = if i == spans {
                s1
            } else {
                s0 + trimmed * i as f64 / spans as f64
            };
            let (_, left, right, _) = self.edge.offsets_at(station);
            let l = mesh.add_vertex(left);
            let r = mesh.add_vertex(right);
            if let Some((pl, pr)) = previous {
                mesh.add_face([pr, r, l, pl]);
            }
            previous = Some((l, r));
        }
        mesh
    }
}

/// `max(min_spans, round(length / width))`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn span_count(length: f64, width: f64, min_spans: usize) -> usize {
    let spans = (length / width).round();
    if spans.is_finite() && spans > 0.0 {
        (spans as usize).max(min_spans.max(1))
    } else {
        min_spans.max(1)
    }
}
