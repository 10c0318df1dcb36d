mod app;

use app::FxApp;
use eframe::egui;

fn main() -> Result<(), eframe::Error> {
    // Configure logging
    env_logger::init();

    // Configure viewport/window
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("ASCII FX")
            .with_icon(load_icon()),
        ..Default::default()
    };

    eframe::run_native(
        "ASCII FX",
        options,
        Box::new(|cc| Ok(Box::new(FxApp::new(cc)))),
    )
}

/// 32x32 icon: a left-to-right density ramp of block glyph bands
fn load_icon() -> egui::IconData {
    const SIZE: u32 = 32;
    const LEVELS: [u8; 4] = [40, 100, 170, 240];

    let mut rgba = Vec::with_capacity((SIZE * SIZE * 4) as usize);
    for y in 0..SIZE {
        for x in 0..SIZE {
            let level = LEVELS[(x / 8) as usize];
            // Dark grid lines every 8 pixels read as character cells
            let gap = x % 8 == 7 || y % 8 == 7;
            if gap {
                rgba.extend_from_slice(&[10, 10, 10, 255]);
            } else {
                rgba.extend_from_slice(&[level / 3, level, level / 2, 255]);
            }
        }
    }

    egui::IconData {
        rgba,
        width: SIZE,
        height: SIZE,
    }
}
