//! Perspective camera and the viewport it projects onto.
//!
//! While an XR session runs the device supplies per-eye view and projection matrices, so this
//! camera only matters for the inline (non-XR) frame and for keeping the aspect ratio in sync
//! with the window.

use cgmath::{Matrix4, Rad};

use crate::config::CameraConfig;

/// Size of the render surface in CSS/logical pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
        }
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: f64) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

#[derive(Clone, Debug)]
pub struct PerspectiveCamera {
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl PerspectiveCamera {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        let aspect = if width > 0 && height > 0 {
            width as f32 / height as f32
        } else {
            1.0
        };
        Self {
            aspect,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn from_config(config: &CameraConfig, viewport: Viewport) -> Self {
        Self::new(
            viewport.width,
            viewport.height,
            config.fovy,
            config.znear,
            config.zfar,
        )
    }

    /// Keeps the aspect ratio in sync with the viewport. Zero sized viewports (minimised
    /// windows) are ignored so the projection never degenerates.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}
