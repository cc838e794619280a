//! Scene uniforms for the trace pass.
//!
//! The trace shader declares one uniform struct (`SceneUniforms`). At
//! startup its layout is reflected out of the WGSL with naga into a
//! [`BindingTable`]: parameter name → byte offset and size. Every tick the
//! [`UniformBinder`] writes the whole [`FrameSnapshot`] into a byte block of
//! that layout, which the pipeline uploads in one `write_buffer`.
//!
//! A parameter the shader does not declare (or declares with a different
//! size) is reported once with `log::warn!` and then skipped. Rendering goes
//! on; that parameter simply is not driven.

use std::collections::{HashMap, HashSet};

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};

use crate::camera::CameraRig;
use crate::error::ShaderError;
use crate::ripple::RippleEffect;
use crate::scene::{Material, SceneState, MAX_BLOCKS, MAX_SPHERES};

/// Name of the uniform struct the trace shader must declare.
pub const SCENE_BLOCK: &str = "SceneUniforms";

/// Sphere record: `vec4<f32>(center, radius)`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SphereGpu {
    pub position: [f32; 3],
    pub radius: f32,
}

/// Mirrors `struct Material { kind: u32, roughness: f32, ior: f32, albedo: vec3<f32> }`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MaterialGpu {
    pub kind: u32,
    pub roughness: f32,
    pub ior: f32,
    pub _pad0: f32,
    pub albedo: [f32; 3],
    pub _pad1: f32,
}

impl From<&Material> for MaterialGpu {
    fn from(m: &Material) -> Self {
        Self {
            kind: m.kind as u32,
            roughness: m.roughness,
            ior: m.ior,
            _pad0: 0.0,
            albedo: m.albedo.to_array(),
            _pad1: 0.0,
        }
    }
}

/// Uniforms shared by the denoise and TAA passes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PassUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub frame: u32,
    pub denoise_strength: f32,
    pub _pad: f32,
}

/// A value headed for one member of the uniform block.
#[derive(Clone, Copy, Debug)]
pub enum UniformValue<'a> {
    F32(f32),
    I32(i32),
    U32(u32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    /// Pre-laid-out array of `Pod` records.
    Records(&'a [u8]),
}

impl UniformValue<'_> {
    /// Byte size of this value without trailing padding.
    pub fn byte_size(&self) -> usize {
        match self {
            UniformValue::F32(_) | UniformValue::I32(_) | UniformValue::U32(_) => 4,
            UniformValue::Vec2(_) => 8,
            UniformValue::Vec3(_) => 12,
            UniformValue::Vec4(_) => 16,
            UniformValue::Records(bytes) => bytes.len(),
        }
    }

    /// Write into `out`, which must be exactly `byte_size()` long.
    fn write_bytes(&self, out: &mut [u8]) {
        match self {
            UniformValue::F32(v) => out.copy_from_slice(&v.to_le_bytes()),
            UniformValue::I32(v) => out.copy_from_slice(&v.to_le_bytes()),
            UniformValue::U32(v) => out.copy_from_slice(&v.to_le_bytes()),
            UniformValue::Vec2(v) => out.copy_from_slice(bytemuck::bytes_of(&v.to_array())),
            UniformValue::Vec3(v) => out.copy_from_slice(bytemuck::bytes_of(&v.to_array())),
            UniformValue::Vec4(v) => out.copy_from_slice(bytemuck::bytes_of(&v.to_array())),
            UniformValue::Records(bytes) => out.copy_from_slice(bytes),
        }
    }
}

/// Everything the trace shader sees for one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSnapshot {
    pub view_eye: Vec3,
    pub view_center: Vec3,
    pub resolution: Vec2,
    pub time: f32,

    pub sphere_count: i32,
    pub spheres: [SphereGpu; MAX_SPHERES],
    pub materials: [MaterialGpu; MAX_SPHERES],

    pub block_count: i32,
    pub blocks: [[f32; 4]; MAX_BLOCKS],
    pub block_sizes: [[f32; 4]; MAX_BLOCKS],
    pub block_materials: [MaterialGpu; MAX_BLOCKS],

    pub light_pos: Vec3,
    pub light_color: Vec3,
    pub light_intensity: f32,

    pub beam_direction: Vec3,
    pub beam_position: Vec3,
    pub beam_color: Vec3,
    pub beam_angle: f32,
    pub beam_intensity: f32,
    pub enable_beam: u32,

    pub wave_center: Vec3,
    pub enable_waves: u32,
    pub wave_duration: f32,
    pub wave_amplitude: f32,
    pub wave_start_time: f32,
    pub wave_decay_rate: f32,
}

impl FrameSnapshot {
    /// Gather the current state. Call after every mutation of the tick.
    pub fn capture(
        camera: &CameraRig,
        scene: &SceneState,
        ripple: &RippleEffect,
        resolution: Vec2,
        time: f32,
    ) -> Self {
        let mut spheres = [SphereGpu::default(); MAX_SPHERES];
        let mut materials = [MaterialGpu::default(); MAX_SPHERES];
        for (i, s) in scene.spheres().iter().enumerate() {
            spheres[i] = SphereGpu { position: s.position.to_array(), radius: s.radius };
            materials[i] = MaterialGpu::from(&s.material);
        }

        let mut blocks = [[0.0; 4]; MAX_BLOCKS];
        let mut block_sizes = [[0.0; 4]; MAX_BLOCKS];
        let mut block_materials = [MaterialGpu::default(); MAX_BLOCKS];
        for (i, b) in scene.blocks().iter().enumerate() {
            blocks[i] = b.position.extend(0.0).to_array();
            block_sizes[i] = b.size.extend(0.0).to_array();
            block_materials[i] = MaterialGpu::from(&b.material);
        }

        Self {
            view_eye: camera.position(),
            view_center: camera.target(),
            resolution,
            time,
            sphere_count: scene.spheres().len() as i32,
            spheres,
            materials,
            block_count: scene.blocks().len() as i32,
            blocks,
            block_sizes,
            block_materials,
            light_pos: scene.light.position,
            light_color: scene.light.color,
            light_intensity: scene.light.intensity,
            beam_direction: scene.beam.direction,
            beam_position: scene.beam.position,
            beam_color: scene.beam.color,
            beam_angle: scene.beam.angle,
            beam_intensity: scene.beam.intensity,
            enable_beam: scene.beam.enabled as u32,
            wave_center: ripple.center(),
            enable_waves: ripple.is_active(time) as u32,
            wave_duration: ripple.duration(),
            wave_amplitude: ripple.amplitude(),
            wave_start_time: ripple.start_time(),
            wave_decay_rate: ripple.decay_rate(),
        }
    }

    /// Call `f` with every parameter, by shader member name.
    pub fn visit(&self, mut f: impl FnMut(&'static str, UniformValue<'_>)) {
        use UniformValue::*;

        f("view_eye", Vec3(self.view_eye));
        f("view_center", Vec3(self.view_center));
        f("resolution", Vec2(self.resolution));
        f("time", F32(self.time));

        f("sphere_count", I32(self.sphere_count));
        f("spheres", Records(bytemuck::cast_slice(&self.spheres)));
        f("materials", Records(bytemuck::cast_slice(&self.materials)));

        f("block_count", I32(self.block_count));
        f("blocks", Records(bytemuck::cast_slice(&self.blocks)));
        f("block_sizes", Records(bytemuck::cast_slice(&self.block_sizes)));
        f("block_materials", Records(bytemuck::cast_slice(&self.block_materials)));

        f("light_pos", Vec3(self.light_pos));
        f("light_color", Vec3(self.light_color));
        f("light_intensity", F32(self.light_intensity));

        f("beam_direction", Vec3(self.beam_direction));
        f("beam_position", Vec3(self.beam_position));
        f("beam_color", Vec3(self.beam_color));
        f("beam_angle", F32(self.beam_angle));
        f("beam_intensity", F32(self.beam_intensity));
        f("enable_beam", U32(self.enable_beam));

        f("wave_center", Vec3(self.wave_center));
        f("enable_waves", U32(self.enable_waves));
        f("wave_duration", F32(self.wave_duration));
        f("wave_amplitude", F32(self.wave_amplitude));
        f("wave_start_time", F32(self.wave_start_time));
        f("wave_decay_rate", F32(self.wave_decay_rate));
    }
}

impl Default for FrameSnapshot {
    fn default() -> Self {
        Self::capture(
            &CameraRig::default(),
            &SceneState::default(),
            &RippleEffect::default(),
            Vec2::new(1280.0, 720.0),
            0.0,
        )
    }
}

/// Location of one member inside the uniform block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot {
    pub offset: usize,
    pub size: usize,
}

/// Member layout of a WGSL uniform struct, reflected once at startup.
#[derive(Clone, Debug)]
pub struct BindingTable {
    slots: HashMap<String, Slot>,
    size: usize,
    group: u32,
    binding: u32,
}

impl BindingTable {
    /// Find the `var<uniform>` whose type is the struct `block` and record
    /// its members.
    pub fn resolve(source: &str, block: &str, stage: &'static str) -> Result<Self, ShaderError> {
        let module = naga::front::wgsl::parse_str(source)
            .map_err(|e| ShaderError::new(stage, e.emit_to_string(source)))?;
        let gctx = module.to_ctx();

        for (_, var) in module.global_variables.iter() {
            if var.space != naga::AddressSpace::Uniform {
                continue;
            }
            let ty = &module.types[var.ty];
            if ty.name.as_deref() != Some(block) {
                continue;
            }
            let naga::TypeInner::Struct { members, span } = &ty.inner else {
                continue;
            };
            let Some(binding) = &var.binding else {
                return Err(ShaderError::new(stage, format!("uniform `{block}` has no @group/@binding")));
            };

            let slots = members
                .iter()
                .filter_map(|m| {
                    let name = m.name.clone()?;
                    let size = module.types[m.ty].inner.size(gctx) as usize;
                    Some((name, Slot { offset: m.offset as usize, size }))
                })
                .collect();

            return Ok(Self {
                slots,
                size: *span as usize,
                group: binding.group,
                binding: binding.binding,
            });
        }

        Err(ShaderError::new(stage, format!("no uniform variable of struct type `{block}`")))
    }

    pub fn slot(&self, name: &str) -> Option<Slot> {
        self.slots.get(name).copied()
    }

    /// Size of the whole block in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn group(&self) -> u32 {
        self.group
    }

    pub fn binding(&self) -> u32 {
        self.binding
    }
}

/// Writes frame snapshots into the trace shader's uniform block.
#[derive(Debug)]
pub struct UniformBinder {
    table: BindingTable,
    block: Vec<u8>,
    skipped: HashSet<&'static str>,
}

impl UniformBinder {
    /// Build a binder for `table`, warning once about every snapshot
    /// parameter the shader cannot receive.
    pub fn new(table: BindingTable) -> Self {
        let mut skipped = HashSet::new();
        FrameSnapshot::default().visit(|name, value| match table.slot(name) {
            None => {
                log::warn!("trace shader has no uniform `{name}`; it will not be driven");
                skipped.insert(name);
            }
            Some(slot) if slot.size != value.byte_size() => {
                log::warn!(
                    "uniform `{name}` is {} bytes in the shader but {} bytes on the host; it will not be driven",
                    slot.size,
                    value.byte_size()
                );
                skipped.insert(name);
            }
            Some(_) => {}
        });

        let block = vec![0u8; table.size()];
        Self { table, block, skipped }
    }

    /// Write `snapshot` into the block and return the bytes to upload.
    pub fn push(&mut self, snapshot: &FrameSnapshot) -> &[u8] {
        let Self { table, block, skipped } = self;
        snapshot.visit(|name, value| {
            if skipped.contains(name) {
                return;
            }
            if let Some(slot) = table.slot(name) {
                value.write_bytes(&mut block[slot.offset..slot.offset + slot.size]);
            }
        });
        block.as_slice()
    }

    /// Bytes of the most recent push.
    pub fn bytes(&self) -> &[u8] {
        &self.block
    }

    pub fn table(&self) -> &BindingTable {
        &self.table
    }

    /// Parameters that are not being driven.
    pub fn skipped(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.skipped.iter().copied()
    }

    /// Raw bytes of one parameter as last pushed.
    pub fn value_bytes(&self, name: &str) -> Option<&[u8]> {
        let slot = self.table.slot(name)?;
        Some(&self.block[slot.offset..slot.offset + slot.size])
    }

    /// Read back a `vec2<f32>` parameter.
    pub fn read_vec2(&self, name: &str) -> Option<Vec2> {
        let bytes = self.value_bytes(name)?;
        let v: [f32; 2] = bytemuck::pod_read_unaligned(bytes.get(..8)?);
        Some(Vec2::from_array(v))
    }

    /// Read back an `f32` parameter.
    pub fn read_f32(&self, name: &str) -> Option<f32> {
        let bytes = self.value_bytes(name)?;
        Some(bytemuck::pod_read_unaligned(bytes.get(..4)?))
    }
}
