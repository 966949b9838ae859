//! Upload processing pipeline.
//!
//! One upload runs five stages in a fixed order:
//!
//! ```text
//! decode -> resize -> composite -> encode -> write
//! ```
//!
//! Each stage consumes the previous stage's output and a failure stops the
//! run at that stage; nothing reaches the sink unless every earlier stage
//! succeeded. A [`CancellationToken`] is checked before every stage, so a
//! request whose deadline has passed stops at the next stage boundary.
//!
//! The pipeline holds no per-request state. A single [`Pipeline`] (with its
//! pre-decoded watermark) is shared by every request, and calls may run
//! concurrently on different threads.

pub mod config;
pub mod error;

use image::RgbaImage;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::imaging::{self, EncoderQuality, FormatTag, ImageError};
use crate::storage::DestinationSink;
use crate::watermark::{Watermark, WatermarkOptions};

pub use config::PipelineConfig;
pub use error::{PipelineError, Stage};

/// One upload to process
#[derive(Debug, Clone, Copy)]
pub struct ProcessingRequest<'a> {
    /// Raw uploaded bytes
    pub input: &'a [u8],
    /// Output width; `None` uses the configured default
    pub target_width: Option<u32>,
    /// Identifier handed to the sink (the uploaded file name)
    pub destination: &'a str,
    /// JPEG quality override
    pub quality: Option<u8>,
}

impl<'a> ProcessingRequest<'a> {
    pub fn new(input: &'a [u8], destination: &'a str) -> Self {
        Self {
            input,
            target_width: None,
            destination,
            quality: None,
        }
    }

    pub fn with_target_width(mut self, width: u32) -> Self {
        self.target_width = Some(width);
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }
}

/// What a successful run produced
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedOutput {
    /// Location reported by the sink
    pub stored: String,
    /// Container detected on input
    pub source_format: FormatTag,
    /// Container written
    pub format: FormatTag,
    pub original_width: u32,
    pub original_height: u32,
    pub width: u32,
    pub height: u32,
    /// Encoded byte count
    pub bytes: usize,
    pub elapsed: Duration,
}

enum WatermarkSource<'a> {
    Decoded(&'a Watermark),
    Png(&'a [u8], WatermarkOptions),
}

/// Shared, stateless upload processor
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    watermark: Arc<Watermark>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, watermark: Arc<Watermark>) -> Self {
        Self { config, watermark }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn watermark(&self) -> &Watermark {
        &self.watermark
    }

    /// Run all five stages for `request`, writing the result to `sink`
    pub fn process(
        &self,
        request: &ProcessingRequest<'_>,
        sink: &dyn DestinationSink,
        cancel: &CancellationToken,
    ) -> Result<ProcessedOutput, PipelineError> {
        run(
            &self.config,
            request,
            WatermarkSource::Decoded(&self.watermark),
            sink,
            cancel,
        )
    }
}

/// Run the pipeline with a watermark given as PNG bytes.
///
/// The watermark is decoded after the upload has been resized, as part of the
/// composite step's input; a watermark that fails to decode is reported as a
/// decode-stage error.
pub fn process_with_watermark_bytes(
    config: &PipelineConfig,
    options: WatermarkOptions,
    request: &ProcessingRequest<'_>,
    watermark_png: &[u8],
    sink: &dyn DestinationSink,
    cancel: &CancellationToken,
) -> Result<ProcessedOutput, PipelineError> {
    run(
        config,
        request,
        WatermarkSource::Png(watermark_png, options),
        sink,
        cancel,
    )
}

fn checkpoint(cancel: &CancellationToken, stage: Stage) -> Result<Instant, PipelineError> {
    if cancel.is_cancelled() {
        tracing::debug!(stage = %stage, "Upload cancelled");
        return Err(PipelineError::Cancelled { stage });
    }
    Ok(Instant::now())
}

fn stage_done(stage: Stage, started: Instant) {
    tracing::debug!(
        stage = %stage,
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "Stage complete"
    );
}

fn resolve_width(config: &PipelineConfig, requested: Option<u32>) -> Result<u32, ImageError> {
    let width = requested.unwrap_or(config.target_width);
    if width > config.max_target_width {
        return Err(ImageError::invalid_dimensions(
            width,
            0,
            format!("target width exceeds maximum {}", config.max_target_width),
        ));
    }
    Ok(width)
}

fn run(
    config: &PipelineConfig,
    request: &ProcessingRequest<'_>,
    watermark: WatermarkSource<'_>,
    sink: &dyn DestinationSink,
    cancel: &CancellationToken,
) -> Result<ProcessedOutput, PipelineError> {
    let total = Instant::now();

    let started = checkpoint(cancel, Stage::Decode)?;
    let (decoded, source_format) = imaging::decode(request.input, config.max_source_pixels)
        .map_err(|e| PipelineError::at(Stage::Decode, e))?;
    let (original_width, original_height) = decoded.dimensions();
    stage_done(Stage::Decode, started);

    let started = checkpoint(cancel, Stage::Resize)?;
    let resized = resolve_width(config, request.target_width)
        .and_then(|width| imaging::resize_within(decoded, width, config.max_source_pixels))
        .map_err(|e| PipelineError::at(Stage::Resize, e))?;
    stage_done(Stage::Resize, started);

    let started = checkpoint(cancel, Stage::Composite)?;
    let stamped = stamp(resized, watermark)?;
    stage_done(Stage::Composite, started);

    let started = checkpoint(cancel, Stage::Encode)?;
    let quality = EncoderQuality::with_quality(request.quality.unwrap_or(config.jpeg_quality));
    let encoded = imaging::encode(&stamped, source_format, quality)
        .map_err(|e| PipelineError::at(Stage::Encode, e))?;
    stage_done(Stage::Encode, started);

    let started = checkpoint(cancel, Stage::Write)?;
    let stored = sink
        .write(request.destination, &encoded.data)
        .map_err(|e| {
            PipelineError::at(
                Stage::Write,
                ImageError::write_failed(request.destination, e.to_string()),
            )
        })?;
    stage_done(Stage::Write, started);

    let (width, height) = stamped.dimensions();
    Ok(ProcessedOutput {
        stored,
        source_format,
        format: encoded.format,
        original_width,
        original_height,
        width,
        height,
        bytes: encoded.data.len(),
        elapsed: total.elapsed(),
    })
}

fn stamp(base: RgbaImage, watermark: WatermarkSource<'_>) -> Result<RgbaImage, PipelineError> {
    match watermark {
        WatermarkSource::Decoded(mark) => mark
            .apply(base)
            .map_err(|e| PipelineError::at(Stage::Composite, e)),
        WatermarkSource::Png(data, options) => {
            let mark =
                imaging::decode_png(data).map_err(|e| PipelineError::at(Stage::Decode, e))?;
            crate::watermark::composite(base, &mark, &options)
                .map_err(|e| PipelineError::at(Stage::Composite, e))
        }
    }
}
