// src/main.rs
mod codec;
mod config;
mod error;
mod plot;
mod session;
mod table;
mod transport;

use std::path::Path;

use config::SessionConfig;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = SessionConfig::load_or_default(Path::new("fftlink.json"))?;

    println!(
        "Send input signal of length {} from {} to board and receive FFT magnitude",
        config.samples,
        config.input_path.display()
    );
    println!(
        "Store results in {} and plot input and output",
        config.output_path.display()
    );

    let report = session::run(&config)?;
    println!(
        "Done: {} samples sent, {} magnitudes received",
        report.samples.len(),
        report.magnitudes.len()
    );
    Ok(())
}
