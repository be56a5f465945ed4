use std::fs;
use std::io::{Read, Write};

use log::info;

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::plot::{self, PlotStyle};
use crate::table;
use crate::transport;

/// In-memory results of one completed session, handed back for inspection.
#[derive(Debug)]
pub struct SessionReport {
    pub samples: Vec<i16>,
    pub magnitudes: Vec<i16>,
}

/// Runs one full measurement session:
/// load -> open -> transmit -> receive -> persist -> render.
pub fn run(config: &SessionConfig) -> Result<SessionReport, SessionError> {
    run_with(config, || {
        let port = transport::open(config)?;
        info!("opened {} at {} Bd", config.port, config.baud_rate);
        Ok(port)
    })
}

/// Session pipeline, generic over how the device link is opened so a scripted
/// in-memory link can drive it in tests.
///
/// The input table is validated before the link is opened, and the link is
/// released before any result is persisted, on success and failure alike. A
/// transport failure aborts the session with the output path untouched.
fn run_with<L, F>(config: &SessionConfig, open_link: F) -> Result<SessionReport, SessionError>
where
    L: Read + Write,
    F: FnOnce() -> Result<L, SessionError>,
{
    let samples = table::read_samples(&config.input_path, config.samples)?;
    info!(
        "loaded {} samples from {}",
        samples.len(),
        config.input_path.display()
    );

    let mut link = open_link()?;
    let outcome = exchange(config, &mut link, &samples);
    drop(link);
    let magnitudes = outcome?;

    persist(config, samples, magnitudes)
}

fn exchange<L: Read + Write>(
    config: &SessionConfig,
    link: &mut L,
    samples: &[i16],
) -> Result<Vec<i16>, SessionError> {
    println!("Sending values to board...");
    transport::transmit(link, samples)?;
    println!("Reading messages from board...");
    transport::receive(link, config.magnitude_count())
}

fn persist(
    config: &SessionConfig,
    samples: Vec<i16>,
    magnitudes: Vec<i16>,
) -> Result<SessionReport, SessionError> {
    println!("Writing output to {}", config.output_path.display());
    table::write_magnitudes(&config.output_path, &magnitudes)?;

    println!("Rendering graphs to {}", config.plot_path.display());
    let png = plot::render_session_png(
        &samples,
        &magnitudes,
        config.sampling_rate_hz,
        &PlotStyle::default(),
    )?;
    fs::write(&config.plot_path, png)
        .map_err(|e| SessionError::Plot(format!("{}: {e}", config.plot_path.display())))?;

    Ok(SessionReport {
        samples,
        magnitudes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::transport::ScriptedLink;
    use std::path::Path;

    fn test_config(dir: &Path, samples: usize) -> SessionConfig {
        SessionConfig {
            samples,
            input_path: dir.join("fft_input.csv"),
            output_path: dir.join("fft_output.csv"),
            plot_path: dir.join("fft_plot.png"),
            ..SessionConfig::default()
        }
    }

    fn write_input(config: &SessionConfig, samples: &[i16]) {
        let rows: Vec<String> = samples.iter().map(|s| s.to_string()).collect();
        fs::write(&config.input_path, rows.join("\n")).unwrap();
    }

    fn scripted_response(magnitudes: &[i16]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(magnitudes.len() * 2);
        for &m in magnitudes {
            bytes.extend_from_slice(&codec::encode(m));
        }
        bytes
    }

    #[test]
    fn completes_and_persists_magnitudes() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), 16);
        let sent: Vec<i16> = (0..16).collect();
        write_input(&config, &sent);
        let expected: Vec<i16> = (0..8).map(|i| i * 100 - 350).collect();

        let report = run_with(&config, || {
            Ok(ScriptedLink::new(scripted_response(&expected)))
        })
        .unwrap();
        assert_eq!(report.samples, sent);
        assert_eq!(report.magnitudes, expected);

        let written = fs::read_to_string(&config.output_path).unwrap();
        let rows: Vec<&str> = written.lines().collect();
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0], "-350");
        assert!(config.plot_path.exists());
    }

    #[test]
    fn receive_failure_leaves_output_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), 4);
        write_input(&config, &[1, 2, 3, 4]);
        fs::write(&config.output_path, "previous run\n").unwrap();

        let err = run_with(&config, || Ok(ScriptedLink::unresponsive())).unwrap_err();
        assert!(matches!(
            err,
            SessionError::TransportIo { phase: "receive", .. }
        ));
        // Prior results survive a failed session.
        assert_eq!(
            fs::read_to_string(&config.output_path).unwrap(),
            "previous run\n"
        );
        assert!(!config.plot_path.exists());
    }

    #[test]
    fn short_input_fails_before_the_link_is_opened() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), 1024);
        fs::write(&config.input_path, "1\n2\n3\n").unwrap();

        let err = run_with(&config, || -> Result<ScriptedLink, SessionError> {
            panic!("link must not be opened for a malformed table")
        })
        .unwrap_err();
        assert!(matches!(err, SessionError::MalformedInput { .. }));
    }
}
