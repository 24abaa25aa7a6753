//! The road network generator.
//!
//! [`QuadRoadNetwork`] runs the whole pipeline: centerlines are shattered
//! at every crossing, merged into a road graph, dressed with junction and
//! street strip meshes, welded per level and finally relaxed.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::{InputError, Result};
use crate::geometry::WorkPlane;
use crate::graph::RoadGraph;
use crate::math::NODE_TOLERANCE;
use crate::mesh::{LevelMesh, QuadMesh, RelaxMesh, RelaxParams};
use crate::operations::{
    combine_levels, AssembleLevels, AssemblyParams, BuildGraph, BuildJunction, BuildStreetStrip,
    JunctionParams, Setbacks, ShatterCurves, StripParams,
};
use crate::road::RoadNetworkInput;

/// Parameters for a generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadNetworkParams {
    /// Plane all centerlines are flattened onto.
    pub work_plane: WorkPlane,
    /// Endpoints closer than this are one node.
    pub node_tolerance: f64,
    pub junction: JunctionParams,
    pub strip: StripParams,
    pub assembly: AssemblyParams,
    pub relax: RelaxParams,
}

impl Default for RoadNetworkParams {
    fn default() -> Self {
        Self {
            work_plane: WorkPlane::world_xy(),
            node_tolerance: NODE_TOLERANCE,
            junction: JunctionParams::default(),
            strip: StripParams::default(),
            assembly: AssemblyParams::default(),
            relax: RelaxParams::default(),
        }
    }
}

impl RoadNetworkParams {
    /// Validates every parameter group.
    ///
    /// # Errors
    ///
    /// Returns `InputError::InvalidParameter` naming the first invalid
    /// parameter.
    pub fn validate(&self) -> Result<()> {
        if !(self.node_tolerance.is_finite() && self.node_tolerance > 0.0) {
            return Err(InputError::InvalidParameter {
                parameter: "node_tolerance",
                reason: format!("{} is not a positive length", self.node_tolerance),
            }
            .into());
        }
        self.junction.validate()?;
        self.strip.validate()?;
        self.assembly.validate()?;
        self.relax.validate()
    }
}

/// Result of a generation run.
///
/// Meshes are in world coordinates. The graph and the setbacks stay in
/// work-plane coordinates.
#[derive(Debug)]
pub struct RoadNetworkOutput {
    /// Welded, relaxed mesh per level, ascending.
    pub levels: BTreeMap<i32, QuadMesh>,
    /// All levels concatenated, never welded across levels.
    pub combined: QuadMesh,
    pub graph: RoadGraph,
    /// Raw per-node junction meshes.
    pub junctions: Vec<LevelMesh>,
    /// Raw per-edge street strips.
    pub streets: Vec<LevelMesh>,
    pub setbacks: Setbacks,
}

impl RoadNetworkOutput {
    /// The mesh of one level, if any road of that level produced faces.
    #[must_use]
    pub fn level(&self, level: i32) -> Option<&QuadMesh> {
        self.levels.get(&level)
    }

    /// All levels in one mesh.
    #[must_use]
    pub fn all_levels(&self) -> &QuadMesh {
        &self.combined
    }

    /// Levels present in the output, ascending.
    pub fn level_numbers(&self) -> impl Iterator<Item = i32> + '_ {
        self.levels.keys().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.combined.is_empty()
    }
}

/// Generates a quad-dominant road surface from tagged centerlines.
#[derive(Debug)]
pub struct QuadRoadNetwork<'a> {
    input: &'a RoadNetworkInput,
    params: RoadNetworkParams,
}

impl<'a> QuadRoadNetwork<'a> {
    /// Creates a new generator.
    #[must_use]
    pub fn new(input: &'a RoadNetworkInput, params: RoadNetworkParams) -> Self {
        Self { input, params }
    }

    /// Runs the pipeline.
    ///
    /// Degenerate curves are skipped and failing junctions leave a hole
    /// instead of aborting the run. An empty input yields an empty output.
    ///
    /// # Errors
    ///
    /// Returns an `InputError` if a parameter or a curve attribute is
    /// invalid. Nothing is generated in that case.
    pub fn generate(&self) -> Result<RoadNetworkOutput> {
        let params = &self.params;
        params.validate()?;
        for curve in self.input.curves() {
            curve.validate()?;
        }

        let plane = &params.work_plane;
        let segments =
            ShatterCurves::new(self.input.curves(), plane, params.node_tolerance).execute()?;
        let graph = BuildGraph::new(&segments, params.node_tolerance).execute()?;

        let mut setbacks = Setbacks::new();
        let mut junctions = Vec::new();
        for (id, _) in graph.nodes() {
            match BuildJunction::new(&graph, id, &params.junction).execute(&mut setbacks) {
                Ok(meshes) => junctions.extend(meshes),
                Err(e) => warn!(node = ?id, error = %e, "junction skipped"),
            }
        }

        let mut streets = Vec::new();
        for (id, edge) in graph.edges() {
            let mesh = BuildStreetStrip::new(id, edge, &setbacks, params.strip).execute();
            if mesh.is_empty() {
                debug!(edge = ?id, "street fully consumed by junctions");
                continue;
            }
            streets.push(LevelMesh {
                level: edge.road_type.level(),
                mesh,
            });
        }

        let parts: Vec<LevelMesh> = junctions.iter().chain(&streets).cloned().collect();
        let mut levels = BTreeMap::new();
        for (level, mesh) in AssembleLevels::new(&parts, params.assembly).execute() {
            let relaxed = RelaxMesh::new(&mesh, params.relax).execute()?;
            levels.insert(level, to_world(&relaxed, plane));
        }
        let combined = combine_levels(&levels);

        debug!(
            curves = self.input.len(),
            segments = segments.len(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            levels = levels.len(),
            faces = combined.face_count(),
            "generated road network"
        );

        Ok(RoadNetworkOutput {
            levels,
            combined,
            graph,
            junctions: junctions.iter().map(|m| level_to_world(m, plane)).collect(),
            streets: streets.iter().map(|m| level_to_world(m, plane)).collect(),
            setbacks,
        })
    }
}

fn to_world(mesh: &QuadMesh, plane: &WorkPlane) -> QuadMesh {
    let mut out = mesh.map_points(|p| plane.to_world(p));
    out.normals = mesh
        .normals
        .iter()
        .map(|n| plane.vector_to_world(n))
        .collect();
    out
}

fn level_to_world(part: &LevelMesh, plane: &WorkPlane) -> LevelMesh {
    LevelMesh {
        level: part.level,
        mesh: to_world(&part.mesh, plane),
    }
}
