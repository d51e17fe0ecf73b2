use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mazeview_common::{Action, Control, ControlFlags, ViewerConfig};
use mazeview_kernel::{Player, Simulation, Tuning};
use mazeview_map::GridMap;
use mazeview_render::{AsciiRenderer, Renderer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mazeview-cli", about = "Headless tools for mazeview maps")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Viewer config (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print map dimensions, start pose and wall count
    Info {
        /// Map file
        map: PathBuf,
    },
    /// Print the map with the player at the start pose
    Render {
        /// Map file
        map: PathBuf,
    },
    /// Step the player with a fixed set of held controls
    Simulate {
        /// Map file
        map: PathBuf,
        /// Number of ticks to run
        #[arg(short, long, default_value = "60")]
        ticks: u64,
        /// Controls held for the whole run
        #[arg(long, value_enum, num_args = 1..)]
        hold: Vec<HeldControl>,
        /// Run on the simulation thread in wall-clock time
        #[arg(long)]
        realtime: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum HeldControl {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
    TurnLeft,
    TurnRight,
    TiltUp,
    TiltDown,
}

impl From<HeldControl> for Control {
    fn from(held: HeldControl) -> Self {
        match held {
            HeldControl::Forward => Control::Forward,
            HeldControl::Back => Control::Back,
            HeldControl::StrafeLeft => Control::StrafeLeft,
            HeldControl::StrafeRight => Control::StrafeRight,
            HeldControl::TurnLeft => Control::TurnLeft,
            HeldControl::TurnRight => Control::TurnRight,
            HeldControl::TiltUp => Control::TiltUp,
            HeldControl::TiltDown => Control::TiltDown,
        }
    }
}

fn load_map(path: &Path) -> Result<Arc<GridMap>> {
    let map = GridMap::load(path).with_context(|| format!("failed to load map {}", path.display()))?;
    Ok(Arc::new(map))
}

/// Run `ticks` steps on the calling thread.
fn simulate_steps(player: &mut Player, controls: &[Control], ticks: u64, tuning: &Tuning) {
    let mut flags = ControlFlags::new();
    for &control in controls {
        flags.set(control, true);
    }
    for _ in 0..ticks {
        mazeview_kernel::step(&flags, player, tuning);
    }
}

/// Run on the simulation thread until it has ticked `ticks` times.
fn simulate_realtime(
    player: Player,
    controls: &[Control],
    ticks: u64,
    config: &ViewerConfig,
) -> Result<Player> {
    let sim = Simulation::spawn(player, config)?;
    for &control in controls {
        sim.send(Action::Control {
            control,
            engaged: true,
        })?;
    }
    let started = Instant::now();
    while sim.ticks() < ticks && sim.is_running() {
        std::thread::sleep(config.tick_period() / 2);
    }
    tracing::info!(elapsed = ?started.elapsed(), ticks = sim.ticks(), "realtime run finished");
    Ok(sim.shutdown()?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ViewerConfig::default(),
    };

    match cli.command {
        Commands::Info { map } => {
            let map = load_map(&map)?;
            let start = map.start();
            println!("mazeview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("size: {}x{}", map.width(), map.height());
            println!(
                "start: ({:.2}, {:.2}) facing {:.1}deg",
                start.x,
                start.y,
                map.start_dir().to_degrees()
            );
            println!("walls: {}", map.wall_count());
        }
        Commands::Render { map } => {
            let map = load_map(&map)?;
            let player = Player::spawn(Arc::clone(&map));
            print!("{}", AsciiRenderer::new().render(&map, &player.pose()));
        }
        Commands::Simulate {
            map,
            ticks,
            hold,
            realtime,
        } => {
            let map = load_map(&map)?;
            let controls: Vec<Control> = hold.into_iter().map(Control::from).collect();
            let mut player = Player::spawn(Arc::clone(&map)).with_tilt_limit(config.tilt_limit);
            tracing::debug!(?controls, ticks, realtime, "simulating");

            if realtime {
                player = simulate_realtime(player, &controls, ticks, &config)?;
            } else {
                simulate_steps(&mut player, &controls, ticks, &Tuning::from(&config));
            }
            print!("{}", AsciiRenderer::new().render(&map, &player.pose()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> Arc<GridMap> {
        Arc::new(GridMap::parse("6 3 1.5 1.5 0\n######\n#@...#\n######\n").unwrap())
    }

    #[test]
    fn held_forward_walks_then_stops_at_wall() {
        let mut player = Player::spawn(corridor());
        simulate_steps(&mut player, &[Control::Forward], 50, &Tuning::default());
        assert!((player.x() - 2.5).abs() < 1e-9);

        simulate_steps(&mut player, &[Control::Forward], 1000, &Tuning::default());
        assert_eq!(player.x().floor(), 4.0);
        assert_eq!(player.y(), 1.5);
    }

    #[test]
    fn no_controls_leave_player_in_place() {
        let mut player = Player::spawn(corridor());
        let before = player.pose();
        simulate_steps(&mut player, &[], 100, &Tuning::default());
        assert_eq!(player.pose(), before);
    }

    #[test]
    fn value_enum_maps_every_control() {
        let all = HeldControl::value_variants()
            .iter()
            .map(|&h| Control::from(h))
            .collect::<Vec<_>>();
        for control in Control::ALL {
            assert!(all.contains(&control));
        }
    }

    #[test]
    fn cli_parses_simulate() {
        let cli = Cli::try_parse_from([
            "mazeview-cli",
            "simulate",
            "map.txt",
            "--ticks",
            "10",
            "--hold",
            "forward",
            "turn-left",
        ])
        .unwrap();
        match cli.command {
            Commands::Simulate {
                ticks, hold, realtime, ..
            } => {
                assert_eq!(ticks, 10);
                assert_eq!(hold.len(), 2);
                assert!(!realtime);
            }
            _ => panic!("expected simulate"),
        }
    }
}
