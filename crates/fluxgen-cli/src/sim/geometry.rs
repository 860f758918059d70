use fluxgen::core::models::ids::TargetId;
use fluxgen::core::models::path::PathLengthList;
use fluxgen::core::models::probe::ProbeSample;
use fluxgen::core::traits::{BoxError, GeometryAnalyzer};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("Geometry has no layers")]
    NoLayers,
    #[error("Layer '{name}' has invalid {field}: {value}")]
    InvalidLayer {
        name: String,
        field: &'static str,
        value: f64,
    },
}

/// One homogeneous slab, read from a `[[geometry.layers]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct LayerSettings {
    pub name: String,
    pub target: TargetId,
    pub thickness: f64,
    /// Half extent of the square transverse aperture.
    pub half_width: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct GeometrySettings {
    /// Upstream face of the first layer along `z`.
    #[serde(default)]
    pub z_start: f64,
    #[serde(default)]
    pub layers: Vec<LayerSettings>,
}

#[derive(Debug, Clone)]
struct Slab {
    target: TargetId,
    z_min: f64,
    z_max: f64,
    half_width: f64,
}

/// Stack of slabs placed back to back along the `z` axis.
#[derive(Debug, Clone)]
pub struct SlabGeometry {
    slabs: Vec<Slab>,
    names: Vec<String>,
}

impl SlabGeometry {
    pub fn new(settings: &GeometrySettings) -> Result<Self, GeometryError> {
        if settings.layers.is_empty() {
            return Err(GeometryError::NoLayers);
        }
        let mut z = settings.z_start;
        let mut slabs = Vec::with_capacity(settings.layers.len());
        for layer in &settings.layers {
            for (field, value) in [("thickness", layer.thickness), ("half-width", layer.half_width)]
            {
                if !(value.is_finite() && value > 0.0) {
                    return Err(GeometryError::InvalidLayer {
                        name: layer.name.clone(),
                        field,
                        value,
                    });
                }
            }
            slabs.push(Slab {
                target: layer.target,
                z_min: z,
                z_max: z + layer.thickness,
                half_width: layer.half_width,
            });
            z += layer.thickness;
        }
        Ok(Self {
            slabs,
            names: settings.layers.iter().map(|l| l.name.clone()).collect(),
        })
    }

    /// Layer names with their `[z_min, z_max)` extents.
    pub fn layers(&self) -> impl Iterator<Item = (&str, TargetId, f64, f64)> {
        self.names
            .iter()
            .zip(&self.slabs)
            .map(|(name, s)| (name.as_str(), s.target, s.z_min, s.z_max))
    }
}

/// Length of the forward ray `origin + t * dir` (t >= 0) inside an axis-aligned box.
fn chord(origin: [f64; 3], dir: [f64; 3], lo: [f64; 3], hi: [f64; 3]) -> f64 {
    let mut t_enter: f64 = 0.0;
    let mut t_exit = f64::INFINITY;
    for axis in 0..3 {
        if dir[axis].abs() < f64::EPSILON {
            if origin[axis] < lo[axis] || origin[axis] > hi[axis] {
                return 0.0;
            }
            continue;
        }
        let t0 = (lo[axis] - origin[axis]) / dir[axis];
        let t1 = (hi[axis] - origin[axis]) / dir[axis];
        t_enter = t_enter.max(t0.min(t1));
        t_exit = t_exit.min(t0.max(t1));
    }
    (t_exit - t_enter).max(0.0)
}

impl GeometryAnalyzer for SlabGeometry {
    fn path_lengths(&self, probe: &ProbeSample) -> Result<PathLengthList, BoxError> {
        let origin = [probe.position.x, probe.position.y, probe.position.z];
        let dir = [probe.direction.x, probe.direction.y, probe.direction.z];
        if dir.iter().any(|c| !c.is_finite()) {
            return Err(format!("probe direction is not finite: {:?}", dir).into());
        }

        let mut list = PathLengthList::new();
        for slab in &self.slabs {
            let length = chord(
                origin,
                dir,
                [-slab.half_width, -slab.half_width, slab.z_min],
                [slab.half_width, slab.half_width, slab.z_max],
            );
            if length > 0.0 {
                list.push(slab.target, length);
            }
        }
        Ok(list)
    }

    fn targets(&self) -> Vec<TargetId> {
        let mut targets: Vec<_> = self.slabs.iter().map(|s| s.target).collect();
        targets.sort_unstable();
        targets.dedup();
        targets
    }
}
