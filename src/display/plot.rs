use std::io::Cursor;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::LineSeries;
use plotters::prelude::*;
use crate::display::{DisplayError, PlotFrame};
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub palette: Vec<RGBColor>,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 400,
            background: RGBColor(10, 10, 10),
            palette: vec![BLUE, RED],
        }
    }
}
/// Draws one published curve to a PNG. No text is drawn, so no font backend is needed.
pub fn render_frame_png(frame: &PlotFrame, style: &PlotStyle) -> Result<Vec<u8>, DisplayError> {
    if frame.x.is_empty() || frame.x.len() != frame.y.len() {
        return Err(DisplayError::Plot(format!(
            "frame has {} x and {} y values",
            frame.x.len(),
            frame.y.len()
        )));
    }
    let (x_min, x_max) = padded_bounds(&frame.x, 0.0);
    let (y_min, y_max) = padded_bounds(&frame.y, 1.0);
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
        if y_min < 0.0 && y_max > 0.0 {
            chart.draw_series(LineSeries::new(
                [(x_min, 0.0), (x_max, 0.0)],
                &WHITE.mix(0.2),
            ))?;
        }
        let color = style.palette[frame.channel.index() % style.palette.len()];
        let series = frame.x.iter().copied().zip(frame.y.iter().copied());
        chart.draw_series(LineSeries::new(series, &color))?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
/// Min/max of `values`, widened by `min_span` when flat.
fn padded_bounds(values: &[f64], min_span: f64) -> (f64, f64) {
    let (lo, hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if hi - lo < f64::EPSILON {
        let half = min_span.max(1e-3) / 2.0;
        (lo - half, hi + half)
    } else {
        (lo, hi)
    }
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, DisplayError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| DisplayError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
