//! Front-end contract and the real-time driver loop.
//!
//! The windowing/audio stack lives outside the core; the core only
//! defines the interface it is driven through and a pacing loop that
//! clocks the console against the wall clock. A front-end that starts
//! failing (window gone, audio device lost) degrades the loop to a
//! headless run instead of stopping emulation.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::console::{timing, Console};

/// A transient front-end failure, reported back to the driver.
#[derive(Debug, thiserror::Error)]
#[error("front-end failure: {0}")]
pub struct FrontendError(pub String);

/// Actions the user can queue from the front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    /// Insert the ROM at this path.
    LoadRom(PathBuf),
    /// Eject the current ROM.
    CloseRom,
    /// Quit.
    Exit,
}

/// What the core needs from a front-end.
pub trait Frontend {
    /// Present a finished 256x240 RGBA frame.
    fn draw_frame(&mut self, framebuffer: &[u8]) -> Result<(), FrontendError>;

    /// Submit drained PCM samples.
    fn submit_audio(&mut self, samples: &[f32]) -> Result<(), FrontendError>;

    /// Current button byte for a player (bit 0 = A .. bit 7 = Right).
    fn controller_state(&mut self, player: usize) -> u8;

    /// Tell the front-end whether a ROM is currently loaded.
    fn set_rom_loaded(&mut self, loaded: bool);

    /// Dequeue one pending user action, if any.
    fn poll_action(&mut self) -> Option<UiAction>;
}

/// Maximum catch-up after a stall, in frames.
const MAX_CATCH_UP_FRAMES: u64 = 3;

/// Audio chunk size per submit call.
const AUDIO_CHUNK: usize = 4096;

/// Drive the console against a front-end until it asks to exit.
///
/// Real-time pacing: each pass measures elapsed wall-clock time and
/// clocks the corresponding number of CPU cycles, capped at three
/// frames so a stalled host does not trigger unbounded catch-up.
pub fn run_driver(console: &mut Console, frontend: &mut dyn Frontend) {
    let frame_budget = u64::from(timing::CPU_CYCLES_PER_FRAME);
    let frame_time = Duration::from_secs_f64(1.0 / timing::FRAME_RATE);
    let mut degraded = false;
    let mut last = Instant::now();

    frontend.set_rom_loaded(console.cartridge_present());

    loop {
        match frontend.poll_action() {
            Some(UiAction::Exit) => break,
            Some(UiAction::CloseRom) => {
                console.remove_cartridge();
                frontend.set_rom_loaded(false);
            }
            Some(UiAction::LoadRom(path)) => {
                match console.insert_cartridge_file(&path) {
                    Ok(()) => frontend.set_rom_loaded(true),
                    Err(err) => {
                        log::warn!("rejected ROM {}: {err}", path.display());
                        frontend.set_rom_loaded(false);
                    }
                }
            }
            None => {}
        }

        if !console.cartridge_present() {
            last = Instant::now();
            std::thread::sleep(frame_time);
            continue;
        }

        for player in 0..2 {
            let buttons = frontend.controller_state(player);
            console.set_controller(player, buttons);
        }

        let elapsed = last.elapsed();
        last = Instant::now();
        let budget = (elapsed.as_secs_f64() * f64::from(timing::CPU_CLOCK)) as u64;
        let budget = budget.clamp(1, MAX_CATCH_UP_FRAMES * frame_budget);

        let mut frame_finished = false;
        for _ in 0..budget {
            frame_finished |= console.clock();
        }

        if frame_finished && !degraded {
            if let Err(err) = frontend.draw_frame(console.framebuffer()) {
                log::warn!("front-end degraded, continuing headless: {err}");
                degraded = true;
            }
        }

        let mut chunk = [0.0f32; AUDIO_CHUNK];
        loop {
            let drained = console.drain_audio(&mut chunk, AUDIO_CHUNK);
            if drained == 0 {
                break;
            }
            if !degraded {
                if let Err(err) = frontend.submit_audio(&chunk[..drained]) {
                    log::warn!("audio path degraded: {err}");
                    degraded = true;
                }
            }
        }

        if let Some(remaining) = frame_time.checked_sub(last.elapsed()) {
            std::thread::sleep(remaining);
        }
    }
}
