use anyhow::{Context, Result};
use clap::Parser;

use windowing::input::Key;
use windowing::native::headless::HeadlessController;
use windowing::native::Platform;
use windowing::{config, logging, Cli, Dispatcher, NativeError, Window, WindowEvent};

/// Frames a headless run lasts when no limit is given; nothing would close it.
const HEADLESS_FRAMES: u64 = 600;

fn headless_platform() -> std::result::Result<Box<dyn Platform>, NativeError> {
    Ok(Box::new(HeadlessController::new().platform()))
}

#[cfg(feature = "sdl")]
fn native_platform() -> std::result::Result<Box<dyn Platform>, NativeError> {
    Ok(Box::new(windowing::native::sdl::SdlPlatform::new()?))
}

#[cfg(not(feature = "sdl"))]
fn native_platform() -> std::result::Result<Box<dyn Platform>, NativeError> {
    headless_platform()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let options = config::load_config(cli.config.as_deref())?;
    let options = cli.merge_into_options(options)?;
    logging::init_logging(options.log_level())?;

    tracing::info!(?options, "starting");

    let headless = cli.headless || !cfg!(feature = "sdl");
    let frame_limit = cli.frames.or(headless.then_some(HEADLESS_FRAMES));

    let dispatcher = if headless {
        Dispatcher::global_or_init(headless_platform)
    } else {
        Dispatcher::global_or_init(native_platform)
    }
    .context("Failed to start the dispatcher thread")?;

    let window = Window::new(dispatcher, options.create_info(), options.platform_options())
        .context("Failed to create window")?;

    window.subscribe(|window, event| match event {
        WindowEvent::TextInput(ch) => println!("text: {ch}"),
        WindowEvent::KeyDown(args) if args.key == Key::ESCAPE => {
            if let Err(err) = window.close() {
                tracing::warn!(error = %err, "close failed");
            }
        }
        WindowEvent::Drop(paths) => {
            for path in paths {
                println!("dropped: {}", path.display());
            }
        }
        WindowEvent::JoystickConnection { id, connected } => {
            println!("joystick {id} {}", if *connected { "connected" } else { "disconnected" });
        }
        WindowEvent::Closed => println!("closed"),
        _ => {}
    });

    let mut frames = 0u64;
    while window.exists() {
        window
            .begin_process_events()
            .wait()
            .context("Event processing failed")?;
        frames += 1;

        for id in window.joysticks().connected().iter().map(|j| j.id()) {
            if let Ok(Some(joystick)) = window.joystick(id) {
                for button in 0..joystick.button_count() {
                    if joystick.is_single_click(button, 0).unwrap_or(false) {
                        println!("joystick {id} button {button} clicked");
                    }
                }
            }
        }

        if frame_limit.is_some_and(|limit| frames >= limit) {
            tracing::info!(frames, "frame limit reached");
            window.close()?;
            break;
        }
    }

    tracing::info!(frames, "window closed, exiting");
    Ok(())
}
