//! Scene description: spheres, blocks, the point light and the spot beam.
//!
//! Slot counts are fixed because the trace shader declares fixed-size
//! arrays. The active counts are pushed alongside the arrays.

use glam::Vec3;

use crate::input::{Input, KeyCode};

pub const MAX_SPHERES: usize = 2;
pub const MAX_BLOCKS: usize = 6;

/// Per-tick nudge of the light position while a key is held.
const LIGHT_STEP: f32 = 0.2;
/// Light intensity change per second while a key is held.
const LIGHT_INTENSITY_RATE: f32 = 1.0;
const LIGHT_POSITION_LIMIT: f32 = 50.0;
const LIGHT_INTENSITY_RANGE: (f32, f32) = (-10.0, 10.0);

const BEAM_ANGLE_STEP: f32 = 0.01;
const BEAM_ANGLE_RANGE: (f32, f32) = (0.1, 1.5);
const BEAM_INTENSITY_STEP: f32 = 0.5;
const BEAM_DIRECTION_STEP: f32 = 0.02;

/// Surface response, matching the trace shader's material switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MaterialKind {
    Diffuse = 0,
    Metal = 1,
    Glass = 2,
    Emissive = 3,
    Mirror = 4,
    EmitterZone = 5,
    Water = 6,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub kind: MaterialKind,
    /// 0.0 (polished) to 1.0 (rough).
    pub roughness: f32,
    /// Index of refraction, used by glass.
    pub ior: f32,
    pub albedo: Vec3,
}

impl Material {
    pub fn new(kind: MaterialKind, roughness: f32, ior: f32, albedo: Vec3) -> Self {
        Self { kind, roughness, ior, albedo }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub position: Vec3,
    pub radius: f32,
    pub material: Material,
}

/// Axis-aligned box centered on `position`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    pub position: Vec3,
    /// Full extent along each axis.
    pub size: Vec3,
    pub material: Material,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

/// Cone-shaped spot light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beam {
    pub enabled: bool,
    pub position: Vec3,
    /// Unit vector.
    pub direction: Vec3,
    pub color: Vec3,
    /// Cone half-angle in radians.
    pub angle: f32,
    pub intensity: f32,
}

#[derive(Debug, Clone)]
pub struct SceneState {
    spheres: Vec<Sphere>,
    blocks: Vec<Block>,
    pub light: Light,
    pub beam: Beam,
}

impl SceneState {
    /// An orange emissive ball above a water floor, lit by a warm light and
    /// a red beam.
    pub fn new() -> Self {
        let ball = Sphere {
            position: Vec3::new(0.0, 10.0, 0.0),
            radius: 1.0,
            material: Material::new(MaterialKind::Emissive, 0.0, 1.0, Vec3::new(1.0, 0.5, 0.0)),
        };
        let water = Block {
            position: Vec3::new(0.0, -1.0, 0.0),
            size: Vec3::new(200.0, 0.1, 200.0),
            material: Material::new(MaterialKind::Water, 0.8, 1.0, Vec3::new(0.2, 0.2, 0.225)),
        };

        Self {
            spheres: vec![ball],
            blocks: vec![water],
            light: Light {
                position: Vec3::new(0.0, 1.0, 0.0),
                color: Vec3::new(1.0, 0.5, 0.0),
                intensity: -0.2,
            },
            beam: Beam {
                enabled: true,
                position: Vec3::new(-1.0, 10.0, 0.0),
                direction: Vec3::new(-0.5, -1.0, 0.5).normalize(),
                color: Vec3::new(1.0, 0.0, 0.0),
                angle: BEAM_ANGLE_RANGE.0,
                intensity: 100.0,
            },
        }
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn sphere_mut(&mut self, index: usize) -> Option<&mut Sphere> {
        self.spheres.get_mut(index)
    }

    /// Add a sphere. Returns `false` (and drops it) once all slots are used.
    pub fn push_sphere(&mut self, sphere: Sphere) -> bool {
        if self.spheres.len() >= MAX_SPHERES {
            return false;
        }
        self.spheres.push(sphere);
        true
    }

    /// Add a block. Returns `false` (and drops it) once all slots are used.
    pub fn push_block(&mut self, block: Block) -> bool {
        if self.blocks.len() >= MAX_BLOCKS {
            return false;
        }
        self.blocks.push(block);
        true
    }

    /// Apply held-key nudges for the light and beam.
    ///
    /// Position and angle nudges are per tick; intensity is per second.
    pub fn apply_controls(&mut self, input: &Input, dt: f32) {
        let held = |key| input.key_held(key);

        let light = &mut self.light;
        if held(KeyCode::U) {
            light.position.y += LIGHT_STEP;
        }
        if held(KeyCode::J) {
            light.position.y -= LIGHT_STEP;
        }
        if held(KeyCode::H) {
            light.position.x -= LIGHT_STEP;
        }
        if held(KeyCode::K) {
            light.position.x += LIGHT_STEP;
        }
        if held(KeyCode::Y) {
            light.intensity -= LIGHT_INTENSITY_RATE * dt;
        }
        if held(KeyCode::I) {
            light.intensity += LIGHT_INTENSITY_RATE * dt;
        }
        light.position = light
            .position
            .clamp(Vec3::splat(-LIGHT_POSITION_LIMIT), Vec3::splat(LIGHT_POSITION_LIMIT));
        light.intensity = light.intensity.clamp(LIGHT_INTENSITY_RANGE.0, LIGHT_INTENSITY_RANGE.1);

        let beam = &mut self.beam;
        if input.key_pressed(KeyCode::B) {
            beam.enabled = !beam.enabled;
        }
        if held(KeyCode::Q) {
            beam.angle -= BEAM_ANGLE_STEP;
        }
        if held(KeyCode::E) {
            beam.angle += BEAM_ANGLE_STEP;
        }
        if held(KeyCode::T) {
            beam.intensity += BEAM_INTENSITY_STEP;
        }
        if held(KeyCode::G) {
            beam.intensity -= BEAM_INTENSITY_STEP;
        }

        if held(KeyCode::LeftShift) {
            let mut nudge = Vec3::ZERO;
            if held(KeyCode::W) {
                nudge.y += BEAM_DIRECTION_STEP;
            }
            if held(KeyCode::S) {
                nudge.y -= BEAM_DIRECTION_STEP;
            }
            if held(KeyCode::A) {
                nudge.x -= BEAM_DIRECTION_STEP;
            }
            if held(KeyCode::D) {
                nudge.x += BEAM_DIRECTION_STEP;
            }
            if held(KeyCode::Z) {
                nudge.z -= BEAM_DIRECTION_STEP;
            }
            if held(KeyCode::X) {
                nudge.z += BEAM_DIRECTION_STEP;
            }
            // A nudge that cancels the direction keeps the previous one.
            beam.direction = (beam.direction + nudge).try_normalize().unwrap_or(beam.direction);
        }

        beam.angle = beam.angle.clamp(BEAM_ANGLE_RANGE.0, BEAM_ANGLE_RANGE.1);
        beam.intensity = beam.intensity.max(0.0);
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new()
    }
}
