//! The WGSL programs behind each pass, and their pre-flight validation.
//!
//! Each fragment program is stored on its own and composed with the shared
//! fullscreen vertex stage at load time. Validation with naga happens
//! before anything is handed to wgpu, so a broken program fails startup
//! with a readable message instead of a device-lost later on.

use naga::front::wgsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::error::ShaderError;

const FULLSCREEN: &str = include_str!("shaders/fullscreen.wgsl");
const TRACE: &str = include_str!("shaders/trace.wgsl");
const DENOISE: &str = include_str!("shaders/denoise.wgsl");
const TAA: &str = include_str!("shaders/taa.wgsl");
const PRESENT: &str = include_str!("shaders/present.wgsl");

/// The four programs of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Trace,
    Denoise,
    Taa,
    Present,
}

impl ShaderStage {
    pub const ALL: [ShaderStage; 4] = [
        ShaderStage::Trace,
        ShaderStage::Denoise,
        ShaderStage::Taa,
        ShaderStage::Present,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShaderStage::Trace => "Trace",
            ShaderStage::Denoise => "Denoise",
            ShaderStage::Taa => "TAA",
            ShaderStage::Present => "Present",
        }
    }

    fn fragment(&self) -> &'static str {
        match self {
            ShaderStage::Trace => TRACE,
            ShaderStage::Denoise => DENOISE,
            ShaderStage::Taa => TAA,
            ShaderStage::Present => PRESENT,
        }
    }

    /// Full WGSL source: vertex stage plus this program.
    pub fn source(&self) -> String {
        compose(self.fragment())
    }
}

/// Prepend the fullscreen vertex stage to a fragment program.
pub fn compose(fragment: &str) -> String {
    format!("{FULLSCREEN}\n{fragment}")
}

/// Parse and validate WGSL source.
pub fn validate(source: &str, stage: &'static str) -> Result<naga::Module, ShaderError> {
    let module = wgsl::parse_str(source).map_err(|err| ShaderError::new(stage, err.emit_to_string(source)))?;

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
    validator
        .validate(&module)
        .map_err(|err| ShaderError::new(stage, err.emit_to_string(source)))?;

    Ok(module)
}

/// Validate every shipped program, collecting all failures.
pub fn validate_all() -> Result<(), Vec<ShaderError>> {
    let errors: Vec<ShaderError> = ShaderStage::ALL
        .iter()
        .filter_map(|stage| validate(&stage.source(), stage.name()).err())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composed_source_has_both_entry_points() {
        for stage in ShaderStage::ALL {
            let src = stage.source();
            assert!(src.contains("fn vs_main"), "{}", stage.name());
            assert!(src.contains("fn fs_main"), "{}", stage.name());
        }
    }

    #[test]
    fn rejects_bad_wgsl() {
        let err = validate(&compose("fn fs_main( {"), "Broken").unwrap_err();
        assert_eq!(err.stage, "Broken");
        assert!(!err.message.is_empty());
    }

    #[test]
    fn rejects_type_errors() {
        let src = compose("@fragment fn fs_main() -> @location(0) vec4<f32> { return 1u; }");
        assert!(validate(&src, "Typed").is_err());
    }
}
