mod app;
mod gwas;
mod tracks;

use app::RegLandApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let api_base = std::env::var("REGLAND_API_URL")
        .unwrap_or_else(|_| "http://localhost:8000/api".to_string());
    log::info!("using API at {api_base}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "RegLand Browser",
        options,
        Box::new(move |cc| Ok(Box::new(RegLandApp::new(cc, api_base)?))),
    )
}
