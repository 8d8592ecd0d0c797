//! The scene an AR session renders: one light, the reticle and whatever the user placed.

use cgmath::Matrix4;

use crate::{
    config::Config,
    data_structures::{
        instance::Instance, light::HemisphereLight, model::LoadedModel, reticle::Reticle,
    },
};

/// A model that was added on tap. It is never edited or removed afterwards.
#[derive(Clone, Debug)]
pub struct PlacedModel {
    model: LoadedModel,
    local_transform: Matrix4<f32>,
}

impl PlacedModel {
    pub fn model(&self) -> &LoadedModel {
        &self.model
    }

    /// Transform relative to the scene root.
    pub fn local_transform(&self) -> Matrix4<f32> {
        self.local_transform
    }
}

#[derive(Debug)]
pub struct Scene {
    root: Instance,
    light: HemisphereLight,
    reticle: Reticle,
    models: Vec<PlacedModel>,
}

impl Scene {
    pub fn new(config: &Config) -> Self {
        Self {
            root: Instance::new(),
            light: HemisphereLight::from_config(&config.light),
            reticle: Reticle::new(&config.reticle),
            models: Vec::new(),
        }
    }

    pub fn root(&self) -> &Instance {
        &self.root
    }

    pub fn light(&self) -> &HemisphereLight {
        &self.light
    }

    pub fn reticle(&self) -> &Reticle {
        &self.reticle
    }

    pub fn reticle_mut(&mut self) -> &mut Reticle {
        &mut self.reticle
    }

    /// Adds `model` under the root and returns its index.
    pub fn add_model(&mut self, model: LoadedModel, local_transform: Matrix4<f32>) -> usize {
        self.models.push(PlacedModel {
            model,
            local_transform,
        });
        self.models.len() - 1
    }

    pub fn models(&self) -> &[PlacedModel] {
        &self.models
    }

    pub fn world_transform(&self, placed: &PlacedModel) -> Matrix4<f32> {
        self.root.to_matrix() * placed.local_transform
    }
}
