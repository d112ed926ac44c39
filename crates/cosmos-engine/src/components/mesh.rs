//! Geometry and shading descriptions attached to scene nodes.
//!
//! The shading programs themselves live outside the engine; a `Material`
//! only names its program and carries the parameters the program consumes.

use glam::Vec3;
use serde::Serialize;

use crate::api::types::ResourceId;
use crate::renderer::resources::{ResourceHandle, ResourceKind, ResourcePool};

/// Per-vertex buffers for point clouds (flat xyz / rgb arrays).
#[derive(Debug, Clone, Default, Serialize)]
pub struct PointBuffers {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
    pub sizes: Vec<f32>,
    /// Per-point twinkle speed, or empty when the program has none.
    pub twinkle: Vec<f32>,
}

impl PointBuffers {
    pub fn with_capacity(count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(count * 3),
            colors: Vec::with_capacity(count * 3),
            sizes: Vec::with_capacity(count),
            twinkle: Vec::with_capacity(count),
        }
    }

    pub fn push(&mut self, position: Vec3, color: [f32; 3], size: f32, twinkle: Option<f32>) {
        self.positions.extend_from_slice(&position.to_array());
        self.colors.extend_from_slice(&color);
        self.sizes.push(size);
        if let Some(t) = twinkle {
            self.twinkle.push(t);
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position(&self, index: usize) -> Vec3 {
        Vec3::from_slice(&self.positions[index * 3..index * 3 + 3])
    }
}

/// Geometry primitive.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum GeometryKind {
    Points(PointBuffers),
    Sphere { radius: f32, segments: u32 },
    Plane { width: f32, height: f32 },
    Torus { radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32 },
    Icosahedron { radius: f32, detail: u32 },
    /// Pairs of endpoints, flat xyz.
    LineSegments { positions: Vec<f32> },
}

#[derive(Debug)]
pub struct Geometry {
    pub kind: GeometryKind,
    handle: ResourceHandle,
}

impl Geometry {
    pub fn new(pool: &ResourcePool, kind: GeometryKind) -> Self {
        Self {
            kind,
            handle: pool.allocate(ResourceKind::Geometry),
        }
    }

    pub fn id(&self) -> ResourceId {
        self.handle.id()
    }

    /// Number of points for point clouds, endpoints for line segments, else 0.
    pub fn vertex_count(&self) -> usize {
        match &self.kind {
            GeometryKind::Points(buffers) => buffers.len(),
            GeometryKind::LineSegments { positions } => positions.len() / 3,
            _ => 0,
        }
    }
}

/// Named shading programs evaluated by the external rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ShaderProgram {
    Star,
    Nebula,
    Galaxy,
    MilkyWay,
    Ether,
    Sun,
    BlackHole,
    Portal,
    PlanetSurface,
    Atmosphere,
    Cloud,
    Ring,
    ShootingStar,
    MorphParticle,
    /// Lit standard surface (roughness/metalness).
    Standard,
    /// Unlit flat colour.
    Basic,
    Line,
}

/// A single shading parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec3([f32; 3]),
}

impl UniformValue {
    pub fn as_float(&self) -> Option<f32> {
        match self {
            UniformValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

/// Small ordered parameter set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Uniforms {
    values: Vec<(&'static str, UniformValue)>,
}

impl Uniforms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, value: UniformValue) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_float(self, name: &'static str, value: f32) -> Self {
        self.with(name, UniformValue::Float(value))
    }

    pub fn with_color(self, name: &'static str, rgb: [f32; 3]) -> Self {
        self.with(name, UniformValue::Vec3(rgb))
    }

    pub fn set(&mut self, name: &'static str, value: UniformValue) {
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.values.push((name, value)),
        }
    }

    pub fn set_float(&mut self, name: &'static str, value: f32) {
        self.set(name, UniformValue::Float(value));
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.values.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(|v| v.as_float())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.iter().any(|(n, _)| *n == name)
    }
}

/// Blend mode for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BlendMode {
    /// Standard alpha blending.
    #[default]
    Normal,
    /// Additive blending for glows.
    Additive,
}

/// Which faces are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

/// Fixed-function state and parameters for one program instance.
#[derive(Debug, Clone, Serialize)]
pub struct MaterialDesc {
    pub program: ShaderProgram,
    pub uniforms: Uniforms,
    pub blend: BlendMode,
    pub side: Side,
    pub transparent: bool,
    pub wireframe: bool,
    pub depth_write: bool,
    pub depth_test: bool,
    /// Base colour for `Basic`/`Standard`/`Line` programs.
    pub color: [f32; 3],
    pub opacity: f32,
}

impl MaterialDesc {
    pub fn new(program: ShaderProgram) -> Self {
        Self {
            program,
            uniforms: Uniforms::new(),
            blend: BlendMode::Normal,
            side: Side::Front,
            transparent: false,
            wireframe: false,
            depth_write: true,
            depth_test: true,
            color: [1.0, 1.0, 1.0],
            opacity: 1.0,
        }
    }

    /// Transparent, additive, no depth writes: the usual glow setup.
    pub fn glow(program: ShaderProgram) -> Self {
        Self::new(program).additive().transparent()
    }

    pub fn with_uniforms(mut self, uniforms: Uniforms) -> Self {
        self.uniforms = uniforms;
        self
    }

    pub fn additive(mut self) -> Self {
        self.blend = BlendMode::Additive;
        self
    }

    pub fn transparent(mut self) -> Self {
        self.transparent = true;
        self.depth_write = false;
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn wireframe(mut self) -> Self {
        self.wireframe = true;
        self
    }

    pub fn without_depth_test(mut self) -> Self {
        self.depth_test = false;
        self
    }

    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }
}

#[derive(Debug)]
pub struct Material {
    pub desc: MaterialDesc,
    handle: ResourceHandle,
}

impl Material {
    pub fn new(pool: &ResourcePool, desc: MaterialDesc) -> Self {
        Self {
            desc,
            handle: pool.allocate(ResourceKind::Material),
        }
    }

    pub fn id(&self) -> ResourceId {
        self.handle.id()
    }
}

/// Renderable part of a node: one geometry, one material, both owned.
#[derive(Debug)]
pub struct MeshComponent {
    pub geometry: Geometry,
    pub material: Material,
}

impl MeshComponent {
    pub fn new(pool: &ResourcePool, kind: GeometryKind, desc: MaterialDesc) -> Self {
        Self {
            geometry: Geometry::new(pool, kind),
            material: Material::new(pool, desc),
        }
    }

    pub fn uniforms_mut(&mut self) -> &mut Uniforms {
        &mut self.material.desc.uniforms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_set_replaces() {
        let mut u = Uniforms::new().with_float("time", 0.0).with_float("energy", 0.0);
        u.set_float("time", 2.5);
        assert_eq!(u.float("time"), Some(2.5));
        assert!(u.contains("energy"));
        assert!(!u.contains("warp"));
    }

    #[test]
    fn mesh_owns_two_resources() {
        let pool = ResourcePool::new();
        let mesh = MeshComponent::new(
            &pool,
            GeometryKind::Sphere { radius: 1.0, segments: 8 },
            MaterialDesc::glow(ShaderProgram::Atmosphere),
        );
        assert_eq!(pool.live_count(), 2);
        assert!(mesh.material.desc.transparent);
        assert!(!mesh.material.desc.depth_write);
        drop(mesh);
        assert_eq!(pool.live_count(), 0);
        assert_eq!(pool.released_total(), 2);
    }

    #[test]
    fn point_buffers_track_count() {
        let mut pts = PointBuffers::with_capacity(2);
        pts.push(Vec3::new(1.0, 2.0, 3.0), [1.0; 3], 1.0, Some(0.5));
        pts.push(Vec3::ZERO, [1.0; 3], 1.0, None);
        assert_eq!(pts.len(), 2);
        assert_eq!(pts.position(0), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(pts.twinkle.len(), 1);
    }
}
