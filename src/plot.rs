use std::io::Cursor;

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::*;

use crate::error::SessionError;

#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub trace: RGBColor,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 800,
            background: WHITE,
            trace: BLUE,
        }
    }
}

/// Time axis in seconds: sample i sits at `i / fs`.
pub fn time_axis(count: usize, sampling_rate_hz: u32) -> Vec<f32> {
    (0..count)
        .map(|i| i as f32 / sampling_rate_hz as f32)
        .collect()
}

/// Frequency-bin axis in Hz: bin i sits at `i * fs / sample_count`.
pub fn frequency_axis(bins: usize, sampling_rate_hz: u32, sample_count: usize) -> Vec<f32> {
    (0..bins)
        .map(|i| i as f32 * sampling_rate_hz as f32 / sample_count as f32)
        .collect()
}

/// Renders the time-domain trace and the magnitude spectrum as two stacked
/// charts and returns the encoded PNG bytes.
pub fn render_session_png(
    samples: &[i16],
    magnitudes: &[i16],
    sampling_rate_hz: u32,
    style: &PlotStyle,
) -> Result<Vec<u8>, SessionError> {
    if samples.is_empty() || magnitudes.is_empty() {
        return Err(SessionError::Plot("nothing to plot".into()));
    }
    let time = time_axis(samples.len(), sampling_rate_hz);
    let freq = frequency_axis(magnitudes.len(), sampling_rate_hz, samples.len());

    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let panels = root.split_evenly((2, 1));

        draw_trace(
            &panels[0],
            "Time based data",
            "Time (s)",
            "Acceleration (ms-2)",
            &time,
            samples,
            style,
        )?;
        draw_trace(
            &panels[1],
            "Frequency spectrum",
            "Frequency (Hz)",
            "Magnitude",
            &freq,
            magnitudes,
            style,
        )?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}

fn draw_trace<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    caption: &str,
    x_label: &str,
    y_label: &str,
    x: &[f32],
    values: &[i16],
    style: &PlotStyle,
) -> Result<(), SessionError>
where
    DB::ErrorType: 'static,
{
    let y_min = values.iter().copied().min().unwrap_or(0) as f32;
    let y_max = values.iter().copied().max().unwrap_or(0) as f32;
    let y_bounds = if (y_max - y_min).abs() < f32::EPSILON {
        (y_min - 50.0, y_max + 50.0)
    } else {
        (y_min, y_max)
    };
    let x_max = x.last().copied().unwrap_or(1.0);

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .caption(caption, ("sans-serif", 20).into_font())
        .set_label_area_size(LabelAreaPosition::Left, 55)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(0f32..x_max, y_bounds.0..y_bounds.1)?;
    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .light_line_style(&BLACK.mix(0.1))
        .draw()?;
    let series = x.iter().copied().zip(values.iter().map(|&v| v as f32));
    chart.draw_series(LineSeries::new(series, &style.trace))?;
    Ok(())
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, SessionError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| SessionError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axes_have_exact_endpoint_values() {
        let time = time_axis(1024, 8192);
        assert_eq!(time[0], 0.0);
        assert_eq!(time[511], 511.0 / 8192.0);
        let freq = frequency_axis(512, 8192, 1024);
        assert_eq!(freq[0], 0.0);
        assert_eq!(freq[511], 4088.0);
    }

    #[test]
    fn renders_png_for_typical_session_shapes() {
        let samples: Vec<i16> = (0..1024).map(|i| ((i % 64) as i16 - 32) * 100).collect();
        let magnitudes: Vec<i16> = (0..512).map(|i| (i % 100) as i16).collect();
        let png = render_session_png(&samples, &magnitudes, 8192, &PlotStyle::default()).unwrap();
        assert!(!png.is_empty());
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn flat_signal_still_renders() {
        let png =
            render_session_png(&[0; 16], &[0; 8], 8192, &PlotStyle::default()).unwrap();
        assert!(!png.is_empty());
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = render_session_png(&[], &[], 8192, &PlotStyle::default()).unwrap_err();
        assert!(matches!(err, SessionError::Plot(_)));
    }
}
