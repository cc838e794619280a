use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tidewave::{Renderer, ResizePolicy, SettleTimeout};

#[derive(Parser, Debug)]
#[command(name = "tidewave", version, about = "Raytraced sphere-into-water demo with denoise and TAA")]
struct Cli {
    /// Window width in logical pixels.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Window height in logical pixels.
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Fixed simulation step in seconds (e.g. 0.016667). Defaults to the
    /// measured frame time.
    #[arg(long)]
    fixed_dt: Option<f32>,

    /// Reset TAA history from the denoised frame every N frames (0 = never).
    #[arg(long, default_value_t = 3)]
    history_cadence: u32,

    /// What to do when the settle phase runs out while the sphere still bobs.
    #[arg(long, value_enum, default_value_t = SettleArg::ForceRest)]
    settle: SettleArg,

    /// What to do with the offscreen targets on window resize.
    #[arg(long, value_enum, default_value_t = ResizeArg::Keep)]
    resize: ResizeArg,

    /// Disable vsync.
    #[arg(long, default_value_t = false)]
    no_vsync: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SettleArg {
    ForceRest,
    KeepOscillating,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ResizeArg {
    Keep,
    Reallocate,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let settle = match cli.settle {
        SettleArg::ForceRest => SettleTimeout::ForceRest,
        SettleArg::KeepOscillating => SettleTimeout::KeepOscillating,
    };
    let resize = match cli.resize {
        ResizeArg::Keep => ResizePolicy::KeepTargets,
        ResizeArg::Reallocate => ResizePolicy::ReallocateTargets,
    };

    let result = Renderer::new()
        .with_window_size(cli.width, cli.height)
        .with_fixed_delta(cli.fixed_dt)
        .with_history_cadence(cli.history_cadence)
        .with_settle_timeout(settle)
        .with_resize_policy(resize)
        .with_vsync(!cli.no_vsync)
        .run();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("tidewave failed: {err}");
            ExitCode::FAILURE
        }
    }
}
