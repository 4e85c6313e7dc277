use thiserror::Error;
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("sample rate must be finite and greater than zero, got {0}")]
    InvalidSampleRate(f64),
    #[error("transform failed: {0}")]
    Transform(String),
    #[error("failed to render plot: {0}")]
    Plot(String),
}
impl From<realfft::FftError> for DisplayError {
    fn from(value: realfft::FftError) -> Self {
        DisplayError::Transform(value.to_string())
    }
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for DisplayError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        DisplayError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for DisplayError {
    fn from(value: image::ImageError) -> Self {
        DisplayError::Plot(value.to_string())
    }
}
