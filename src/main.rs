use anyhow::{bail, Context};
use boardsense::core::{load_settings, save_settings, settings_path, BoardSettings, ModeSetting};
use boardsense::game::ai::{EngineDifficulty, HttpEngine};
use boardsense::game::controller::GameController;
use boardsense::game::types::Color;
use boardsense::networking::EmulatorLink;
use boardsense::session::Session;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (defaults to the platform config directory)
    #[arg(long)]
    settings: Option<PathBuf>,

    #[arg(long, value_enum)]
    mode: Option<ModeSetting>,

    /// Side the engine plays in assisted mode (white or black)
    #[arg(long, value_parser = parse_color)]
    engine_color: Option<Color>,

    /// easy, medium, hard or expert
    #[arg(long)]
    difficulty: Option<EngineDifficulty>,

    #[arg(long)]
    engine_endpoint: Option<String>,

    /// Emulator address, host:port
    #[arg(long)]
    emulator: Option<String>,

    #[arg(long)]
    poll_ms: Option<u64>,

    /// Start from this position instead of verifying the starting layout
    #[arg(long)]
    position: Option<String>,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    save: bool,
}

fn parse_color(s: &str) -> Result<Color, String> {
    match s.to_ascii_lowercase().as_str() {
        "white" | "w" => Ok(Color::White),
        "black" | "b" => Ok(Color::Black),
        other => Err(format!("unknown color '{other}'")),
    }
}

impl Args {
    fn apply(&self, settings: &mut BoardSettings) {
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        if let Some(color) = self.engine_color {
            settings.engine_color = color;
        }
        if let Some(difficulty) = self.difficulty {
            settings.difficulty = difficulty;
        }
        if let Some(endpoint) = &self.engine_endpoint {
            settings.engine_endpoint = endpoint.clone();
        }
        if let Some(addr) = &self.emulator {
            settings.emulator_addr = addr.clone();
        }
        if let Some(poll_ms) = self.poll_ms {
            settings.poll_interval_ms = poll_ms;
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let path = args.settings.clone().unwrap_or_else(settings_path);
    let mut settings = load_settings(&path);
    args.apply(&mut settings);
    settings.validate().context("invalid settings")?;

    if args.save {
        save_settings(&path, &settings).context("saving settings")?;
    }

    run_session(&settings, args.position.as_deref())
}

fn run_session(settings: &BoardSettings, position: Option<&str>) -> anyhow::Result<()> {
    let mode = settings.game_mode();
    let engine = HttpEngine::new(&settings.engine_endpoint)?;
    let mut link = EmulatorLink::connect(settings.emulator_addr.as_str())
        .with_context(|| format!("connecting to emulator at {}", settings.emulator_addr))?;

    let interval = Duration::from_millis(settings.poll_interval_ms);
    let mut session = if settings.mode == ModeSetting::SensorTest {
        Session::sensor_test()
    } else {
        let controller = match position {
            Some(position) => GameController::from_position(mode, position)?,
            None => GameController::new(mode),
        };
        info!(
            "[SESSION] {:?} game, difficulty {}, polling every {:?}",
            mode, settings.difficulty, interval
        );
        Session::with_controller(controller, settings.engine_settings())
    };

    loop {
        session.poll(&mut link, &engine)?;
        if !link.is_connected() {
            bail!("emulator disconnected");
        }
        std::thread::sleep(interval);
    }
}
