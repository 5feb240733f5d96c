use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("PDF read error: {0}")]
    PdfReadError(String),

    #[error("Page load error: {0}")]
    PageLoadError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Summary error: {0}")]
    SummaryError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Generates factory methods for [`ExtractError`] variants that wrap a `String`.
macro_rules! error_constructors {
    ($(
        $(#[doc = $doc:expr])*
        $method:ident => $variant:ident
    ),* $(,)?) => {
        impl ExtractError {
            $(
                $(#[doc = $doc])*
                pub fn $method(msg: impl Into<String>) -> Self {
                    Self::$variant(msg.into())
                }
            )*
        }
    };
}

error_constructors! {
    /// Create a configuration error.
    config => ConfigError,
    /// Create an invalid input error.
    invalid_input => InvalidInput,
    /// Create a PDF read error.
    pdf_read => PdfReadError,
    /// Create a page load error.
    page_load => PageLoadError,
    /// Create a render error.
    render => RenderError,
    /// Create a summary error.
    summary => SummaryError,
}

impl From<lopdf::Error> for ExtractError {
    fn from(e: lopdf::Error) -> Self {
        Self::PdfReadError(e.to_string())
    }
}

impl From<serde_json::Error> for ExtractError {
    fn from(e: serde_json::Error) -> Self {
        Self::SummaryError(e.to_string())
    }
}

impl From<serde_yml::Error> for ExtractError {
    fn from(e: serde_yml::Error) -> Self {
        Self::ConfigError(e.to_string())
    }
}

#[cfg(feature = "pdfium")]
impl From<pdfium_render::prelude::PdfiumError> for ExtractError {
    fn from(e: pdfium_render::prelude::PdfiumError) -> Self {
        Self::PageLoadError(e.to_string())
    }
}

impl From<image::ImageError> for ExtractError {
    fn from(e: image::ImageError) -> Self {
        Self::RenderError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
