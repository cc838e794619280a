//! # tidewave
//!
//! Real-time raytraced scene with a temporally stable post-processing chain
//! and a small physics state machine driving it.
//!
//! Every frame traces one noisy sample per pixel, then denoises it, blends
//! it over a running history (TAA) and presents. Meanwhile an emissive
//! sphere falls onto a water plane, bobs and settles. Its first contact
//! with the water starts an expanding ripple.
//!
//! ## Quick Start
//!
//! ```ignore
//! use tidewave::prelude::*;
//!
//! fn main() -> Result<(), AppError> {
//!     Renderer::new()
//!         .with_window_size(1280, 720)
//!         .with_settle_timeout(SettleTimeout::ForceRest)
//!         .run()
//! }
//! ```
//!
//! ## Frame Anatomy
//!
//! | Stage | Module | Runs on |
//! |-------|--------|---------|
//! | Input, camera, light and beam controls | [`input`], [`camera`], [`scene`] | CPU |
//! | Sphere motion, contact event | [`motion`] | CPU |
//! | Ripple timeline | [`ripple`] | CPU |
//! | Uniform snapshot and packing | [`uniforms`] | CPU |
//! | Trace → Denoise → TAA → History → Present | [`passes`], [`gpu`] | GPU |
//!
//! [`world::World::tick`] runs the CPU half and is usable without a window,
//! which is how the tests drive it.
//!
//! ## Controls
//!
//! | Input | Effect |
//! |-------|--------|
//! | Right drag / wheel | Orbit / zoom |
//! | U J H K, Y I | Move the light, change its intensity |
//! | B, Q E, T G | Toggle beam, beam angle, beam intensity |
//! | Shift + W S A D Z X | Steer the beam |
//! | V, R | Toggle ripple, restart it at the sphere |
//! | Ctrl + W S A D | Move the ripple center |
//! | Alt + arrows | Ripple amplitude (up/down), duration (left/right) |
//! | Right Alt + Up/Down | Ripple decay rate |
//! | Escape | Quit |

pub mod app;
pub mod camera;
pub mod error;
pub mod gpu;
pub mod hud;
pub mod input;
pub mod motion;
pub mod passes;
pub mod ripple;
pub mod scene;
pub mod shaders;
pub mod time;
pub mod uniforms;
pub mod world;

pub use app::{Renderer, RendererConfig, ResizePolicy};
pub use bytemuck;
pub use camera::{CameraLimits, CameraRig};
pub use error::{AppError, GpuError, ShaderError};
pub use glam::{Vec2, Vec3, Vec4};
pub use motion::{Contact, MotionConfig, MotionPhase, MotionSimulator, SettleTimeout};
pub use passes::{PassExecutor, PassStep, RecordingExecutor, Target};
pub use ripple::{RippleEffect, RippleStatus};
pub use scene::{Block, Material, MaterialKind, SceneState, Sphere};
pub use uniforms::{BindingTable, FrameSnapshot, UniformBinder};
pub use world::{TickOutput, World};

/// Convenient imports for common usage.
pub mod prelude {
    pub use crate::app::{Renderer, RendererConfig, ResizePolicy};
    pub use crate::error::AppError;
    pub use crate::input::{Input, KeyCode, MouseButton};
    pub use crate::motion::{MotionConfig, MotionPhase, SettleTimeout};
    pub use crate::ripple::RippleStatus;
    pub use crate::world::World;
    pub use glam::{Vec2, Vec3};
}
