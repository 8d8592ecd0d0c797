//! Render pipelines and the uniform data they read.
//!
//! There is a single pipeline, [`basic`], used for the reticle and for placed models.

pub mod basic;
