//! Ripple CLI
//!
//! Simulates tweened and spring-driven values and prints every committed
//! value with its host timestamp. Runs use simulated time by default, so the
//! output is reproducible; `--realtime` runs on the wall clock instead.

mod config;
mod simulate;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use ripple_animation::{Easing, Motion, Spring, SpringOverrides, Tween, TweenOverrides};
use ripple_core::FrameMode;
use simulate::Trajectory;
use std::path::PathBuf;

/// Simulate tweened and spring-driven values
#[derive(Parser, Debug)]
#[command(name = "ripple")]
#[command(about = "Simulate tweened and spring-driven values")]
#[command(version)]
struct Cli {
    /// Presets file, or a directory containing ripple.toml
    #[arg(long, global = true)]
    presets: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tween between two values
    Tween(TweenArgs),

    /// Spring between two values
    Spring(SpringArgs),

    /// Show the available presets
    Presets {
        /// How to print the presets
        #[arg(long, value_enum, default_value_t = PresetFormat::Names)]
        format: PresetFormat,
    },
}

/// Options shared by every run
#[derive(Args, Debug)]
struct RunArgs {
    /// Start value
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    from: f64,

    /// Target value
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    to: f64,

    /// Start from a named preset; explicit flags still win
    #[arg(long)]
    preset: Option<String>,

    /// Native frame interval in ms
    #[arg(long, default_value_t = 16.0)]
    frame_ms: f64,

    /// Simulate a host without native frames (33ms timer frames)
    #[arg(long)]
    fallback_frames: bool,

    /// Give up after this many ms
    #[arg(long, default_value_t = 10_000.0)]
    max_ms: f64,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Run on the wall clock instead of simulated time
    #[arg(long)]
    realtime: bool,
}

#[derive(Args, Debug)]
struct TweenArgs {
    #[command(flatten)]
    run: RunArgs,

    /// Duration in ms
    #[arg(long)]
    duration: Option<f64>,

    /// Easing curve, e.g. ease-out-cubic
    #[arg(long)]
    easing: Option<Easing>,

    /// Delay before starting, in ms
    #[arg(long)]
    delay: Option<f64>,
}

#[derive(Args, Debug)]
struct SpringArgs {
    #[command(flatten)]
    run: RunArgs,

    #[arg(long)]
    stiffness: Option<f64>,

    #[arg(long)]
    damping: Option<f64>,

    /// Settling threshold
    #[arg(long)]
    precision: Option<f64>,

    /// Reflect at the target instead of overshooting (true|false)
    #[arg(long)]
    clamp: Option<bool>,

    /// Delay before starting, in ms
    #[arg(long)]
    delay: Option<f64>,
}

impl TweenArgs {
    /// Flags given on the command line, applied over the preset
    fn overrides(&self) -> TweenOverrides {
        TweenOverrides {
            delay: self.delay,
            duration: self.duration,
            easing: self.easing,
        }
    }
}

impl SpringArgs {
    /// Flags given on the command line, applied over the preset
    fn overrides(&self) -> SpringOverrides {
        SpringOverrides {
            delay: self.delay,
            stiffness: self.stiffness,
            damping: self.damping,
            precision: self.precision,
            clamp: self.clamp,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Aligned columns
    Table,
    /// One JSON object per line
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PresetFormat {
    Names,
    Toml,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let presets = config::load_presets(cli.presets.as_deref())?;

    match cli.command {
        Commands::Tween(args) => {
            let options = config::resolve_tween(
                &presets,
                args.run.preset.as_deref(),
                &args.overrides(),
            )?;
            tracing::info!(
                duration = options.duration,
                delay = options.delay,
                easing = options.easing.name().unwrap_or("custom"),
                "Tweening {} -> {}",
                args.run.from,
                args.run.to
            );
            run(Tween, options, &args.run)
        }
        Commands::Spring(args) => {
            let options = config::resolve_spring(
                &presets,
                args.run.preset.as_deref(),
                &args.overrides(),
            )?;
            tracing::info!(
                stiffness = options.stiffness,
                damping = options.damping,
                clamp = options.clamp,
                "Springing {} -> {}",
                args.run.from,
                args.run.to
            );
            run(Spring, options, &args.run)
        }
        Commands::Presets { format } => {
            match format {
                PresetFormat::Names => {
                    for name in presets.tween_names() {
                        println!("tween   {name}");
                    }
                    for name in presets.spring_names() {
                        println!("spring  {name}");
                    }
                }
                PresetFormat::Toml => print!("{}", presets.to_toml()?),
            }
            Ok(())
        }
    }
}

fn run<M: Motion>(motion: M, options: M::Options, args: &RunArgs) -> Result<()> {
    let trajectory = if args.realtime {
        simulate::run_realtime(motion, options, args.from, args.to, args.max_ms)?
    } else {
        let frame_mode = if args.fallback_frames {
            FrameMode::Fallback
        } else {
            FrameMode::Native {
                interval_ms: args.frame_ms,
            }
        };
        simulate::simulate(motion, options, args.from, args.to, frame_mode, args.max_ms)?
    };

    print_trajectory(&trajectory, args.format)?;
    if let Some(last) = trajectory.last() {
        tracing::info!(
            t = last.t,
            value = last.value,
            samples = trajectory.samples.len(),
            "Run finished"
        );
    }
    if !trajectory.settled {
        anyhow::bail!("Animation did not settle within {}ms", args.max_ms);
    }
    Ok(())
}

fn print_trajectory(trajectory: &Trajectory, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{:>10}  {:>14}", "t (ms)", "value");
            for sample in &trajectory.samples {
                println!("{:>10.2}  {:>14.6}", sample.t, sample.value);
            }
        }
        OutputFormat::Json => {
            for sample in &trajectory.samples {
                println!("{}", serde_json::to_string(sample)?);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tween_flags() {
        let cli = Cli::try_parse_from([
            "ripple", "tween", "--from", "-2", "--to", "3", "--easing", "ease-out-back",
            "--format", "json",
        ])
        .unwrap();

        let Commands::Tween(args) = cli.command else {
            panic!("expected tween command");
        };
        assert_eq!(args.run.from, -2.0);
        assert_eq!(args.run.to, 3.0);
        assert!(matches!(args.easing, Some(Easing::EaseOutBack)));
        assert_eq!(args.run.format, OutputFormat::Json);
        assert!(args.duration.is_none());
    }

    #[test]
    fn test_parse_spring_with_global_presets() {
        let cli = Cli::try_parse_from([
            "ripple", "spring", "--preset", "wobbly", "--clamp", "true", "--presets", "motion.toml",
        ])
        .unwrap();

        assert_eq!(cli.presets, Some(PathBuf::from("motion.toml")));
        let Commands::Spring(args) = cli.command else {
            panic!("expected spring command");
        };
        assert_eq!(args.run.preset.as_deref(), Some("wobbly"));
        assert_eq!(args.clamp, Some(true));
        assert!(!args.run.realtime);
    }

    #[test]
    fn test_clamp_flag_turns_off_clamped_preset() {
        let mut presets = ripple_animation::MotionPresets::builtin();
        presets.spring.insert(
            "pinned".to_string(),
            ripple_animation::SpringOptions::stiff().with_clamp(true),
        );

        let parse = |argv: &[&str]| {
            let Commands::Spring(args) = Cli::try_parse_from(argv.iter().copied()).unwrap().command else {
                panic!("expected spring command");
            };
            config::resolve_spring(&presets, args.run.preset.as_deref(), &args.overrides())
                .unwrap()
        };

        assert!(parse(&["ripple", "spring", "--preset", "pinned"]).clamp);
        assert!(!parse(&["ripple", "spring", "--preset", "pinned", "--clamp", "false"]).clamp);
        assert!(parse(&["ripple", "spring", "--clamp", "true"]).clamp);
    }

    #[test]
    fn test_unknown_easing_rejected() {
        assert!(Cli::try_parse_from(["ripple", "tween", "--easing", "wobble"]).is_err());
    }
}
