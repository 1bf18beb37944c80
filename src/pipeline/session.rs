use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::ExtractError;
use crate::pipeline::config::ExtractionConfig;
use crate::pipeline::extract::{extract_colors, ExtractedColor};
use crate::pipeline::sample::{load_image, sample_pixels, ImageSource};

/// Handle for one extraction request. A newer [`PaletteSession::begin`]
/// makes every older ticket stale.
#[derive(Debug, Clone)]
pub struct Ticket {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl Ticket {
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::Acquire) == self.generation
    }

    fn ensure_current(&self) -> Result<(), ExtractError> {
        if self.is_current() {
            Ok(())
        } else {
            tracing::debug!(generation = self.generation, "Dropping superseded extraction");
            Err(ExtractError::Cancelled)
        }
    }
}

#[derive(Debug)]
pub enum Completion {
    /// The result became the session's palette.
    Applied,
    /// A newer request was started; the result was discarded.
    Stale,
    /// Extraction failed; the previous palette is kept.
    Failed(ExtractError),
}

/// Holds the most recent successful palette and arbitrates overlapping
/// extraction requests (last request wins).
#[derive(Debug, Default)]
pub struct PaletteSession {
    latest: Arc<AtomicU64>,
    palette: Option<Vec<ExtractedColor>>,
}

impl PaletteSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding any in flight.
    pub fn begin(&self) -> Ticket {
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        Ticket {
            generation,
            latest: Arc::clone(&self.latest),
        }
    }

    pub fn palette(&self) -> Option<&[ExtractedColor]> {
        self.palette.as_deref()
    }

    /// Record the outcome of the request behind `ticket`.
    pub fn complete(
        &mut self,
        ticket: &Ticket,
        result: Result<Vec<ExtractedColor>, ExtractError>,
    ) -> Completion {
        if !ticket.is_current() {
            return Completion::Stale;
        }
        match result {
            Ok(colors) => {
                self.palette = Some(colors);
                Completion::Applied
            }
            Err(ExtractError::Cancelled) => Completion::Stale,
            Err(err) => {
                tracing::warn!(error = %err, "Extraction failed, keeping previous palette");
                Completion::Failed(err)
            }
        }
    }
}

/// Run a full extraction for `ticket`, bailing out between stages once the
/// ticket has been superseded.
pub fn run(
    ticket: &Ticket,
    source: &ImageSource,
    config: &ExtractionConfig,
) -> Result<Vec<ExtractedColor>, ExtractError> {
    ticket.ensure_current()?;
    let img = load_image(source, config)?;
    ticket.ensure_current()?;
    let buffer = sample_pixels(&img, config.max_dimension);
    ticket.ensure_current()?;
    Ok(extract_colors(&buffer.data, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::error::ImageLoadError;

    fn red_palette() -> Vec<ExtractedColor> {
        vec![ExtractedColor::new(Color::new(255, 0, 0), 100.0)]
    }

    fn png_source() -> ImageSource {
        let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([0, 0, 255, 255]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        ImageSource::Bytes(buf)
    }

    #[test]
    fn newer_ticket_supersedes_older() {
        let session = PaletteSession::new();
        let first = session.begin();
        assert!(first.is_current());
        let second = session.begin();
        assert!(!first.is_current());
        assert!(second.is_current());
    }

    #[test]
    fn stale_result_is_discarded() {
        let mut session = PaletteSession::new();
        let first = session.begin();
        let second = session.begin();

        assert!(matches!(
            session.complete(&first, Ok(red_palette())),
            Completion::Stale
        ));
        assert!(session.palette().is_none());

        assert!(matches!(
            session.complete(&second, Ok(red_palette())),
            Completion::Applied
        ));
        assert_eq!(session.palette().unwrap()[0].hex, "#FF0000");
    }

    #[test]
    fn failure_keeps_previous_palette() {
        let mut session = PaletteSession::new();
        let ticket = session.begin();
        session.complete(&ticket, Ok(red_palette()));

        let ticket = session.begin();
        let err = ExtractError::Load(ImageLoadError::DataUrl("bad".into()));
        assert!(matches!(
            session.complete(&ticket, Err(err)),
            Completion::Failed(_)
        ));
        assert_eq!(session.palette().unwrap(), red_palette().as_slice());
    }

    #[test]
    fn run_extracts_for_current_ticket() {
        let session = PaletteSession::new();
        let ticket = session.begin();
        let colors = run(&ticket, &png_source(), &ExtractionConfig::full()).unwrap();
        assert_eq!(colors.len(), 1);
        assert_eq!(colors[0].hex, "#0000FF");
    }

    #[test]
    fn run_refuses_superseded_ticket() {
        let session = PaletteSession::new();
        let stale = session.begin();
        let _newer = session.begin();
        let err = run(&stale, &png_source(), &ExtractionConfig::full()).unwrap_err();
        assert!(matches!(err, ExtractError::Cancelled));
    }

    #[test]
    fn empty_palette_is_applied() {
        let mut session = PaletteSession::new();
        let ticket = session.begin();
        assert!(matches!(
            session.complete(&ticket, Ok(Vec::new())),
            Completion::Applied
        ));
        assert_eq!(session.palette(), Some(&[][..]));
    }
}
