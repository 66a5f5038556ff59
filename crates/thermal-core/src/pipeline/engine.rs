use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ndarray::Array2;
use tracing::{debug, info, warn};

use crate::alarm::apply_alarm;
use crate::calibration::{corrector, CalibrationStore, CorrectionParams};
use crate::color::{render_rgba, ColorSource, DisplayRange, RenderMode, StandardPalette};
use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{Result, ThermalError};
use crate::frame::{Point, RawFrame, TemperatureField};
use crate::header::{decode_header_or_default, FrameHeader, RotationMode};
use crate::io::capture::split_capture;
use crate::orient::{display_to_sensor, orient_bytes};
use crate::temperature::{decode_celsius, query_point, TempStats};

use super::config::EngineConfig;
use super::range::DisplayMode;
use super::snapshot::ConfigSnapshot;
use super::types::{CancelToken, NoOpReporter, PipelineStage, ProgressReporter};

/// Output of one frame: display-space pixels plus the sensor-space field.
#[derive(Clone, Debug)]
pub struct RenderedFrame {
    /// RGBA, display space.
    pub rgba: Vec<u8>,
    /// Display width.
    pub width: usize,
    /// Display height.
    pub height: usize,
    pub rotation: RotationMode,
    /// Corrected temperatures, sensor space.
    pub temperatures: Arc<TemperatureField>,
    /// Range the palette was mapped over.
    pub range: DisplayRange,
    /// Min/max of this frame's temperatures; what a lock would capture.
    pub frame_range: Option<DisplayRange>,
    /// Alarm regions drawn.
    pub alarm_regions: usize,
    /// Version of the config snapshot used.
    pub config_version: u64,
}

impl RenderedFrame {
    /// Temperature shown at a display-space point, clamped onto the frame.
    pub fn temperature_at_display(&self, p: Point) -> Option<TempStats> {
        let (w, h) = (self.temperatures.width(), self.temperatures.height());
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let clamped = Point::new(p.x.min(self.width - 1), p.y.min(self.height - 1));
        let s = display_to_sensor(clamped, w, h, self.rotation);
        query_point(&self.temperatures, s.x as i64, s.y as i64)
    }
}

/// A capture file decoded and rendered.
#[derive(Clone, Debug)]
pub struct DecodedCapture {
    pub header: FrameHeader,
    /// The stored header predates fields this version knows about.
    pub header_truncated: bool,
    pub frame: RenderedFrame,
}

/// Frame processing: decode, correct, color, highlight, orient.
pub struct ThermalEngine {
    config: EngineConfig,
    calibration: Arc<CalibrationStore>,
    warned_uncalibrated: AtomicBool,
}

impl ThermalEngine {
    pub fn new(config: EngineConfig, calibration: Arc<CalibrationStore>) -> Self {
        Self {
            config,
            calibration,
            warned_uncalibrated: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn calibration(&self) -> &CalibrationStore {
        &self.calibration
    }

    /// Decoded and corrected temperatures of a frame, in sensor space.
    pub fn temperature_field(&self, raw: &RawFrame, header: &FrameHeader) -> Result<TemperatureField> {
        raw.validate()?;
        let mut data = self.decode_plane(raw)?;
        self.correct_in_place(&mut data, header);
        Ok(TemperatureField::new(data))
    }

    pub fn render_frame(&self, raw: &RawFrame, snapshot: &ConfigSnapshot) -> Result<RenderedFrame> {
        self.render_frame_with(raw, snapshot, &CancelToken::default(), &NoOpReporter)
    }

    /// Render one frame, checking `cancel` between stages.
    ///
    /// The only error besides cancellation is a raw frame whose planes do not
    /// match its dimensions; every other problem degrades the output instead.
    pub fn render_frame_with(
        &self,
        raw: &RawFrame,
        snapshot: &ConfigSnapshot,
        cancel: &CancelToken,
        reporter: &dyn ProgressReporter,
    ) -> Result<RenderedFrame> {
        raw.validate()?;
        let header = &snapshot.header;
        if header.width != raw.width || header.height != raw.height {
            debug!(
                header_width = header.width,
                header_height = header.height,
                frame_width = raw.width,
                frame_height = raw.height,
                "header dimensions differ from frame, using frame"
            );
        }
        let pixels = raw.pixel_count();

        // Stage 1: temperatures
        check_cancelled(cancel)?;
        reporter.begin_stage(PipelineStage::DecodingTemperature, Some(pixels));
        let mut temps = self.decode_plane(raw)?;
        reporter.advance(pixels);
        reporter.finish_stage();

        // Stage 2: correction
        check_cancelled(cancel)?;
        reporter.begin_stage(PipelineStage::Correcting, Some(pixels));
        self.correct_in_place(&mut temps, header);
        reporter.advance(pixels);
        reporter.finish_stage();

        let field = Arc::new(TemperatureField::new(temps));
        let frame_range = DisplayRange::of_values(field.data.iter());

        // Stage 3: color mapping
        check_cancelled(cancel)?;
        reporter.begin_stage(PipelineStage::ColorMapping, Some(pixels));
        let luminance;
        let intensity: &Array2<f32> = match self.config.render.source {
            ColorSource::Temperature => &field.data,
            ColorSource::ImagePlane => {
                luminance = raw.luminance();
                &luminance
            }
        };
        let (mode, range) = self.render_mode(&snapshot.mode, header, intensity, frame_range);
        let mut rgba = render_rgba(&field.data, intensity, mode, &self.config.render);
        reporter.advance(pixels);
        reporter.finish_stage();

        // Stage 4: alarm overlay
        check_cancelled(cancel)?;
        reporter.begin_stage(PipelineStage::Highlighting, None);
        let alarm_regions = apply_alarm(&mut rgba, &field, &header.alarm, &self.config.alarm);
        reporter.finish_stage();

        // Stage 5: sensor space to display space
        check_cancelled(cancel)?;
        reporter.begin_stage(PipelineStage::Orienting, None);
        let (rgba, width, height) = orient_bytes(
            &rgba,
            4,
            field.width(),
            field.height(),
            header.rotate,
        );
        reporter.finish_stage();

        debug!(
            width,
            height,
            mode = snapshot.mode.name(),
            alarm_regions,
            version = snapshot.version,
            "frame rendered"
        );

        Ok(RenderedFrame {
            rgba,
            width,
            height,
            rotation: header.rotate,
            temperatures: field,
            range,
            frame_range,
            alarm_regions,
            config_version: snapshot.version,
        })
    }

    /// Decode and render a capture file held in memory.
    pub fn decode_capture(
        &self,
        bytes: &[u8],
        cancel: &CancelToken,
        reporter: &dyn ProgressReporter,
    ) -> Result<DecodedCapture> {
        let parts = split_capture(bytes)?;

        check_cancelled(cancel)?;
        reporter.begin_stage(PipelineStage::DecodingHeader, None);
        let decoded = decode_header_or_default(parts.header);
        if decoded.truncated {
            info!(len = parts.header.len(), "capture header is from an older layout");
        }
        reporter.finish_stage();

        let header = decoded.header;
        let raw = RawFrame::from_bytes(header.width, header.height, parts.frame)?;
        let snapshot = ConfigSnapshot::new(header.clone());
        let frame = self.render_frame_with(&raw, &snapshot, cancel, reporter)?;

        info!(
            name = %header.name,
            width = frame.width,
            height = frame.height,
            mode = snapshot.mode.name(),
            "capture decoded"
        );

        Ok(DecodedCapture {
            header,
            header_truncated: decoded.truncated,
            frame,
        })
    }

    fn decode_plane(&self, raw: &RawFrame) -> Result<Array2<f32>> {
        let values = decode_celsius(&raw.temp_plane, self.config.decode.scale);
        let actual = values.len();
        Array2::from_shape_vec((raw.height as usize, raw.width as usize), values).map_err(|_| {
            ThermalError::InvalidFrameLength {
                plane: "temperature",
                expected: raw.pixel_count(),
                actual,
            }
        })
    }

    fn correct_in_place(&self, temps: &mut Array2<f32>, header: &FrameHeader) {
        if !self.config.correction.enabled {
            return;
        }
        let params = CorrectionParams::from_header(header, self.config.correction.humidity);
        if params.is_identity() {
            return;
        }
        let table = self.calibration.for_device(&header.name);
        if table.is_none() {
            if !self.warned_uncalibrated.swap(true, Ordering::Relaxed) {
                warn!(
                    device = %header.name,
                    "calibration unavailable, temperatures left uncorrected"
                );
            }
            return;
        }

        let correct = corrector(&params, table);
        if temps.len() >= PARALLEL_PIXEL_THRESHOLD {
            temps.par_mapv_inplace(&correct);
        } else {
            temps.mapv_inplace(&correct);
        }
    }

    fn render_mode<'a>(
        &self,
        mode: &'a DisplayMode,
        header: &FrameHeader,
        intensity: &Array2<f32>,
        frame_range: Option<DisplayRange>,
    ) -> (RenderMode<'a>, DisplayRange) {
        let palette = StandardPalette::from_id_or_default(header.pseudo_mode);
        let fallback = DisplayRange::new(0.0, 0.0);
        match (mode, self.config.render.source) {
            (DisplayMode::Custom(custom), _) => (
                RenderMode::Custom(custom),
                DisplayRange::new(custom.min_temp, custom.max_temp),
            ),
            // A locked temperature range means nothing for image-plane intensity.
            (_, ColorSource::ImagePlane) => {
                let range = DisplayRange::of_values(intensity.iter()).unwrap_or(fallback);
                (RenderMode::Standard { palette, range }, range)
            }
            (mode, ColorSource::Temperature) => {
                let range = mode.resolve(frame_range).unwrap_or(fallback);
                (RenderMode::Standard { palette, range }, range)
            }
        }
    }
}

fn check_cancelled(cancel: &CancelToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(ThermalError::Cancelled)
    } else {
        Ok(())
    }
}
