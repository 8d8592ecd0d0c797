//! Seams to the XR runtime.
//!
//! The session controller never talks to a device directly. It asks an [`XrSession`] for a
//! reference space and a hit-test source, and once per frame for the poses of the current hits.
//! The browser binding lives in `crate::web`, tests use scripted sessions.

use std::fmt;

use cgmath::Matrix4;
use futures::future::LocalBoxFuture;

use crate::render::RenderView;


/// Coordinate frames a session can be asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceSpaceType {
    /// Origin tracks the viewer's head/device. Hit-test rays are cast from here.
    Viewer,
    /// Origin stays near where the session started. Poses are reported in this space.
    Local,
}

impl ReferenceSpaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceSpaceType::Viewer => "viewer",
            ReferenceSpaceType::Local => "local",
        }
    }
}

impl fmt::Display for ReferenceSpaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a session has to be started with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionInit {
    pub mode: &'static str,
    pub required_features: Vec<String>,
}

/// A running XR session.
///
/// Requests return `'static` futures so they can be held across frames; implementations clone
/// whatever handle they need into the future. Everything runs on one thread, hence the
/// non-`Send` [`LocalBoxFuture`].
pub trait XrSession {
    type Space: 'static;
    type HitTestSource: 'static;
    type Frame;

    fn request_reference_space(
        &self,
        kind: ReferenceSpaceType,
    ) -> LocalBoxFuture<'static, anyhow::Result<Self::Space>>;

    fn request_hit_test_source(
        &self,
        space: &Self::Space,
    ) -> LocalBoxFuture<'static, anyhow::Result<Self::HitTestSource>>;

    /// Poses of this frame's hits for `source`, nearest first, expressed in the space the scene
    /// is rendered in. An empty vector means no surface was found.
    fn hit_test_poses(&self, frame: &Self::Frame, source: &Self::HitTestSource)
    -> Vec<Matrix4<f32>>;

    /// Where the device looks from in this frame, one entry per view (one on a phone, two on a
    /// headset), in the same space as the hit poses. Empty when the viewer pose is not known,
    /// the controller's camera is used then.
    fn viewer_views(&self, _frame: &Self::Frame) -> Vec<RenderView> {
        Vec::new()
    }
}

/// Builds a matrix from the 16 column-major floats XR runtimes hand out
/// (`XRRigidTransform.matrix`). `None` if the slice has the wrong length.
pub fn matrix_from_column_major(m: &[f32]) -> Option<Matrix4<f32>> {
    if m.len() != 16 {
        return None;
    }
    let mut columns = [[0.0f32; 4]; 4];
    for (column, chunk) in columns.iter_mut().zip(m.chunks_exact(4)) {
        column.copy_from_slice(chunk);
    }
    Some(Matrix4::from(columns))
}

#[cfg(test)]
mod tests {
    use cgmath::{Vector3, Vector4};

    use super::*;

    #[test]
    fn column_major_translation_lands_in_last_column() {
        let raw = [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.3, -1.2, -2.0, 1.0,
        ];
        let m = matrix_from_column_major(&raw).unwrap();
        assert_eq!(m, Matrix4::from_translation(Vector3::new(0.3, -1.2, -2.0)));
        assert_eq!(m.w, Vector4::new(0.3, -1.2, -2.0, 1.0));
    }

    #[test]
    fn columns_keep_their_order() {
        let raw: Vec<f32> = (0..16).map(|i| i as f32).collect();
        let m = matrix_from_column_major(&raw).unwrap();
        assert_eq!(m.x, Vector4::new(0.0, 1.0, 2.0, 3.0));
        assert_eq!(m.y, Vector4::new(4.0, 5.0, 6.0, 7.0));
        assert_eq!(m.w, Vector4::new(12.0, 13.0, 14.0, 15.0));
        // row 0, column 3
        assert_eq!(m[3][0], 12.0);
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(matrix_from_column_major(&[0.0; 12]).is_none());
        assert!(matrix_from_column_major(&[0.0; 17]).is_none());
    }

    #[test]
    fn reference_space_names_match_webxr() {
        assert_eq!(ReferenceSpaceType::Viewer.to_string(), "viewer");
        assert_eq!(ReferenceSpaceType::Local.as_str(), "local");
    }
}
