//! Game Boy Core - Entry Point
//!
//! Usage: `gbcore-rust <rom> [--frames N] [--trace] [--boot <file>]`
//!
//! Runs headless by default; built with the `sdl` feature it opens a window.

use log::info;
use std::env;
use std::fs;
use std::process;

use gbcore::ui::BackgroundRenderer;
use gbcore::{Emulator, EmulatorConfig};

/// Frames run headless when `--frames` is not given
#[cfg(not(feature = "sdl"))]
const DEFAULT_FRAMES: u64 = 60;

#[derive(Debug, Default)]
struct Options {
    rom_path: String,
    frames: Option<u64>,
    trace: bool,
    boot_path: Option<String>,
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options::default();
    let mut rom_path = None;
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--frames" => {
                let value = iter.next().ok_or("--frames needs a count")?;
                let frames = value.parse().map_err(|_| format!("invalid frame count {value:?}"))?;
                options.frames = Some(frames);
            }
            "--trace" => options.trace = true,
            "--boot" => {
                let path = iter.next().ok_or("--boot needs a file")?;
                options.boot_path = Some(path.clone());
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            path => rom_path = Some(path.to_string()),
        }
    }

    options.rom_path = rom_path.ok_or("missing rom file")?;
    Ok(options)
}

fn run(options: Options) -> Result<(), String> {
    let rom = fs::read(&options.rom_path)
        .map_err(|e| format!("Failed to load ROM {}: {}", options.rom_path, e))?;

    let mut config = EmulatorConfig::new().with_trace(options.trace);
    if let Some(path) = &options.boot_path {
        let image = fs::read(path).map_err(|e| format!("Failed to load boot ROM {path}: {e}"))?;
        config = config.with_boot_rom(image).with_boot_rom_trace(options.trace);
    }

    let mut emulator = Emulator::with_renderer(rom, config, BackgroundRenderer::new())
        .map_err(|e| e.to_string())?;

    #[cfg(feature = "sdl")]
    {
        let mut ui = gbcore::ui::Ui::new()?;
        ui.run(&mut emulator, options.frames)?;
    }

    #[cfg(not(feature = "sdl"))]
    {
        let frames = options.frames.unwrap_or(DEFAULT_FRAMES);
        for _ in 0..frames {
            emulator.frame().map_err(|e| e.to_string())?;
        }
    }

    info!(
        "stopped after {} frames, {} cycles, pc {:#06x}",
        emulator.frames(),
        emulator.cycles(),
        emulator.pc()
    );
    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Usage: {} <rom> [--frames N] [--trace] [--boot <file>]", args[0]);
            process::exit(2);
        }
    };

    if let Err(e) = run(options) {
        eprintln!("Emulator error: {e}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("gbcore-rust").chain(list.iter().copied()).map(String::from).collect()
    }

    #[test]
    fn test_parse_all_options() {
        let options =
            parse_args(&args(&["game.gb", "--frames", "10", "--trace", "--boot", "dmg.bin"]))
                .unwrap();
        assert_eq!(options.rom_path, "game.gb");
        assert_eq!(options.frames, Some(10));
        assert!(options.trace);
        assert_eq!(options.boot_path.as_deref(), Some("dmg.bin"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["game.gb", "--frames"])).is_err());
        assert!(parse_args(&args(&["game.gb", "--frames", "x"])).is_err());
        assert!(parse_args(&args(&["game.gb", "--turbo"])).is_err());
    }
}
