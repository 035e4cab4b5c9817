use heatbrush::config::{Config, DEFAULT_CONFIG_PATH};
use heatbrush::display::{Display, InputEvent, RenderTarget, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use heatbrush::palette::{palette_keys, Palette};
use heatbrush::sim::{DeviceProfile, Simulation};
use heatbrush::util::FrameClock;
use sdl2::keyboard::Keycode;

/// Brush radius / fade radius step per key press (px)
const RADIUS_STEP: f32 = 5.0;
const SPEED_STEP: f32 = 0.1;
/// Seconds between FPS log lines
const STATS_INTERVAL: f32 = 2.0;

struct Options {
    width: u32,
    height: u32,
    vsync: bool,
    profile: DeviceProfile,
    reduced_motion: bool,
    palette: Option<String>,
    config_path: String,
    control: bool,
}

/// Parse command line arguments
fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut opts = Options {
        width: DEFAULT_WIDTH,
        height: DEFAULT_HEIGHT,
        vsync: true,
        profile: DeviceProfile::Desktop,
        reduced_motion: std::env::var("HEATBRUSH_REDUCED_MOTION").is_ok_and(|v| v == "1"),
        palette: None,
        config_path: DEFAULT_CONFIG_PATH.to_string(),
        control: false,
    };

    let mut i = 1;
    while i < args.len() {
        let next = args.get(i + 1);
        match args[i].as_str() {
            "--no-vsync" => opts.vsync = false,
            "--touch" => opts.profile = DeviceProfile::Touch,
            "--reduced-motion" => opts.reduced_motion = true,
            "--control" => opts.control = true,
            "--width" | "-w" => {
                if let Some(w) = next.and_then(|v| v.parse().ok()) {
                    opts.width = w;
                }
                i += 1;
            }
            "--height" | "-h" => {
                if let Some(h) = next.and_then(|v| v.parse().ok()) {
                    opts.height = h;
                }
                i += 1;
            }
            "--resolution" | "-r" => {
                // WxH, e.g. 1920x1080
                if let Some((w, h)) = next.and_then(|v| v.split_once('x')) {
                    if let (Ok(w), Ok(h)) = (w.parse::<u32>(), h.parse::<u32>()) {
                        opts.width = w;
                        opts.height = h;
                    }
                }
                i += 1;
            }
            "--palette" | "-p" => {
                opts.palette = next.cloned();
                i += 1;
            }
            "--config" | "-c" => {
                if let Some(path) = next {
                    opts.config_path = path.clone();
                }
                i += 1;
            }
            "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => log::warn!("Ignoring unknown argument '{}'", other),
        }
        i += 1;
    }

    opts
}

fn print_help() {
    println!("Usage: heatbrush [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --width W, -w W           Window width (default: {})", DEFAULT_WIDTH);
    println!("  --height H, -h H          Window height (default: {})", DEFAULT_HEIGHT);
    println!("  --resolution WxH, -r WxH  Window size (e.g., 1920x1080)");
    println!("  --no-vsync                Disable VSync");
    println!("  --touch                   Touch device profile (coarser grid)");
    println!("  --reduced-motion          Show the background only, no animation");
    println!("  --palette KEY, -p KEY     Start with this palette");
    println!("  --config PATH, -c PATH    Config file (default: {})", DEFAULT_CONFIG_PATH);
    println!("  --control                 Listen for commands on a Unix socket");
    println!("  --help                    Show this help message");
    println!();
    println!("Palettes: {}", palette_keys().collect::<Vec<_>>().join(", "));
    println!();
    println!("Controls:");
    println!("  Mouse / touch  - Paint heat");
    println!("  1-9            - Select palette");
    println!("  [ ]            - Brush radius");
    println!("  ; '            - Fade radius");
    println!("  G              - Cycle glow limit");
    println!("  - =            - Burn speed");
    println!("  C              - Clear");
    println!("  F              - Toggle FPS logging");
    println!("  S / L          - Save / load config");
    println!("  Escape         - Quit");
}

/// Edit the newest known configuration and queue it for the next frame
fn edit_config(sim: &mut Simulation, edit: impl FnOnce(&mut Config)) {
    let mut config = sim
        .inbox()
        .pending_config()
        .cloned()
        .unwrap_or_else(|| sim.config().clone());
    edit(&mut config);
    sim.inbox_mut().set_config(config.clamped());
}

/// Number keys pick palettes in registry order
fn palette_slot(key: Keycode) -> Option<usize> {
    match key {
        Keycode::Num1 => Some(0),
        Keycode::Num2 => Some(1),
        Keycode::Num3 => Some(2),
        Keycode::Num4 => Some(3),
        Keycode::Num5 => Some(4),
        Keycode::Num6 => Some(5),
        Keycode::Num7 => Some(6),
        Keycode::Num8 => Some(7),
        Keycode::Num9 => Some(8),
        _ => None,
    }
}

/// Keyboard shortcuts. Returns false to quit.
fn handle_key(sim: &mut Simulation, key: Keycode, config_path: &str, show_fps: &mut bool) -> bool {
    match key {
        Keycode::Escape => return false,
        Keycode::LeftBracket => edit_config(sim, |c| c.brush_radius -= RADIUS_STEP),
        Keycode::RightBracket => edit_config(sim, |c| c.brush_radius += RADIUS_STEP),
        Keycode::Semicolon => edit_config(sim, |c| c.fade_radius -= RADIUS_STEP),
        Keycode::Quote => edit_config(sim, |c| c.fade_radius += RADIUS_STEP),
        Keycode::Minus => edit_config(sim, |c| c.burn_speed -= SPEED_STEP),
        Keycode::Equals => edit_config(sim, |c| c.burn_speed += SPEED_STEP),
        Keycode::G => edit_config(sim, |c| c.glow = c.glow.next()),
        Keycode::C => sim.inbox_mut().request_clear(),
        Keycode::F => *show_fps = !*show_fps,
        Keycode::S => match sim.config().save(config_path) {
            Ok(()) => log::info!("Config saved to {}", config_path),
            Err(e) => log::warn!("Failed to save config: {}", e),
        }
        Keycode::L => match Config::load(config_path) {
            Ok(config) => {
                sim.inbox_mut().set_config(config);
                log::info!("Config loaded from {}", config_path);
            }
            Err(e) => log::warn!("Failed to load config: {}", e),
        }
        other => {
            if let Some(palette) = palette_slot(other).and_then(|s| Palette::all().get(s)) {
                edit_config(sim, |c| c.palette = palette.key.to_string());
            }
        }
    }
    true
}

#[cfg(unix)]
fn apply_command(sim: &mut Simulation, cmd: heatbrush::control::Command) -> bool {
    use heatbrush::control::Command;
    match cmd {
        Command::Palette(key) => edit_config(sim, |c| c.palette = key),
        Command::BrushRadius(r) => edit_config(sim, |c| c.brush_radius = r),
        Command::FadeRadius(r) => edit_config(sim, |c| c.fade_radius = r),
        Command::Glow(g) => edit_config(sim, |c| c.glow = g),
        Command::BurnSpeed(s) => edit_config(sim, |c| c.burn_speed = s),
        Command::Clear => sim.inbox_mut().request_clear(),
        Command::Quit => return false,
    }
    true
}

fn load_config(opts: &Options) -> Config {
    let mut config = match Config::load(&opts.config_path) {
        Ok(config) => {
            log::info!("Config loaded from {}", opts.config_path);
            config
        }
        Err(e) => {
            log::info!("Using default config ({}: {})", opts.config_path, e);
            Config::default()
        }
    };
    if let Some(palette) = &opts.palette {
        config.palette = palette.clone();
    }
    config.clamped()
}

/// Reduced motion: keep the window up with the palette background, nothing else
fn run_static(display: &mut Display, config: &Config) {
    let background = config.palette().background;
    'main: loop {
        for event in display.poll_events() {
            if matches!(event, InputEvent::Quit | InputEvent::KeyDown(Keycode::Escape)) {
                break 'main;
            }
        }
        display.present_background(background);
        std::thread::sleep(std::time::Duration::from_millis(50));
    }
}

fn main() -> Result<(), String> {
    env_logger::init();
    let opts = parse_args();
    let config = load_config(&opts);

    let (mut display, texture_creator) =
        Display::with_options("heatbrush", opts.width, opts.height, opts.vsync)?;

    let Some(mut sim) = Simulation::start(
        config.clone(),
        (opts.width, opts.height),
        opts.profile,
        opts.reduced_motion,
    ) else {
        run_static(&mut display, &config);
        return Ok(());
    };

    #[cfg(unix)]
    let controller = if opts.control {
        heatbrush::control::Controller::new()
            .map_err(|e| log::warn!("Control socket unavailable: {}", e))
            .ok()
    } else {
        None
    };

    let mut target = RenderTarget::with_size(
        &texture_creator,
        sim.frame().width(),
        sim.frame().height(),
    )?;
    let mut clock = FrameClock::new(60);
    let mut show_fps = false;
    let mut stats_timer = 0.0;

    log::info!("Palettes: {}", palette_keys().collect::<Vec<_>>().join(", "));

    'main: while sim.is_running() {
        let (dt, avg_fps) = clock.tick();

        for event in display.poll_events() {
            match event {
                InputEvent::Quit => break 'main,
                InputEvent::KeyDown(key) => {
                    if !handle_key(&mut sim, key, &opts.config_path, &mut show_fps) {
                        break 'main;
                    }
                }
                InputEvent::PointerMove { x, y } => sim.inbox_mut().pointer_moved(x, y),
                InputEvent::PointerDown { x, y } => sim.inbox_mut().pointer_down(x, y),
                InputEvent::PointerUp | InputEvent::PointerLeave => sim.inbox_mut().pointer_up(),
                InputEvent::Resized { width, height } => sim.inbox_mut().resize(width, height),
            }
        }

        #[cfg(unix)]
        if let Some(controller) = &controller {
            for cmd in controller.poll() {
                if !apply_command(&mut sim, cmd) {
                    break 'main;
                }
            }
        }

        sim.tick(dt);

        // Texture follows the grid size; only changes on resize
        if !target.matches(sim.frame()) {
            target = RenderTarget::with_size(
                &texture_creator,
                sim.frame().width(),
                sim.frame().height(),
            )?;
        }
        display.present(&mut target, sim.frame(), sim.pixel_scale(), sim.background())?;

        if show_fps {
            stats_timer += dt / heatbrush::util::TARGET_FPS;
            if stats_timer >= STATS_INTERVAL {
                stats_timer = 0.0;
                let (min_fps, max_fps) = clock.min_max_fps();
                let stats = sim.last_stats();
                log::info!(
                    "FPS {:.0} avg {:.0} min {:.0} max {:.1}ms | {:?} passes {} hot cells {}",
                    avg_fps,
                    min_fps,
                    max_fps,
                    clock.avg_frame_time_ms(),
                    stats.mode,
                    stats.passes,
                    sim.grid().active_cells()
                );
            }
        }
    }

    sim.stop();
    Ok(())
}
