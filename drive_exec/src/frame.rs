//! # Camera frame
//!
//! A frame is the top-down RGB view of the track supplied by the simulation
//! on every cycle. The vehicle sits just below the band of rows used by lane
//! detection, looking up the image, so that row 0 is the farthest row from
//! the vehicle and the last row of the band is the nearest.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use image::RgbImage;
use ndarray::{Array3, ArrayView3};
use std::path::Path;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Width of a frame in pixels.
pub const FRAME_WIDTH: usize = 96;

/// Height of a frame in pixels.
pub const FRAME_HEIGHT: usize = 96;

/// Number of channels in a frame.
pub const FRAME_CHANNELS: usize = 3;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An RGB raster frame, indexed as `[row, column, channel]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    data: Array3<u8>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while building a frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("Expected a 96x96x3 frame, found {0:?}")]
    InvalidShape([usize; 3]),

    #[error("Could not load the frame image: {0}")]
    ImageError(image::ImageError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Frame {
    /// Create a new frame filled with a single colour.
    pub fn filled(rgb: [u8; 3]) -> Self {
        let data = Array3::from_shape_fn(
            (FRAME_HEIGHT, FRAME_WIDTH, FRAME_CHANNELS),
            |(_, _, c)| rgb[c]
        );

        Self { data }
    }

    /// Wrap an existing `[row, column, channel]` array as a frame.
    ///
    /// The array must have the fixed frame shape.
    pub fn from_array(data: Array3<u8>) -> Result<Self, FrameError> {
        let shape = data.shape();
        if shape != [FRAME_HEIGHT, FRAME_WIDTH, FRAME_CHANNELS] {
            return Err(FrameError::InvalidShape([shape[0], shape[1], shape[2]]))
        }

        Ok(Self { data })
    }

    /// Build a frame from an RGB image.
    pub fn from_rgb_image(img: &RgbImage) -> Result<Self, FrameError> {
        let (width, height) = img.dimensions();
        if width as usize != FRAME_WIDTH || height as usize != FRAME_HEIGHT {
            return Err(FrameError::InvalidShape(
                [height as usize, width as usize, FRAME_CHANNELS]
            ))
        }

        let data = Array3::from_shape_fn(
            (FRAME_HEIGHT, FRAME_WIDTH, FRAME_CHANNELS),
            |(r, c, ch)| img.get_pixel(c as u32, r as u32)[ch]
        );

        Ok(Self { data })
    }

    /// Load a frame from an image file on disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, FrameError> {
        let img = image::open(path)
            .map_err(FrameError::ImageError)?
            .to_rgb8();

        Self::from_rgb_image(&img)
    }

    /// Set the colour of a single pixel.
    pub fn set_pixel(&mut self, row: usize, col: usize, rgb: [u8; 3]) {
        for (c, v) in rgb.iter().enumerate() {
            self.data[[row, col, c]] = *v;
        }
    }

    /// View the underlying `[row, column, channel]` data.
    pub fn view(&self) -> ArrayView3<u8> {
        self.data.view()
    }

    pub fn width(&self) -> usize {
        self.data.shape()[1]
    }

    pub fn height(&self) -> usize {
        self.data.shape()[0]
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
