//! Render composition and pipeline batching.
//!
//! This module defines the [`Render`] enum, which is used by flows to specify
//! what they want drawn. Each scene pass of the compositor sorts the renders of
//! all flows into per-pipeline lists, keeping only entries whose layer mask
//! matches the pass.
//!
//! # Key types
//!
//! - [`Render<'a>`] is the primary enum describing render operations
//! - [`Instanced<'a>`] contains data for instanced rendering (mesh + instance buffer)
//! - [`Lines<'a>`] contains an unlit line list
//!

use crate::data_structures::{layers::Layers, model::Mesh};

/// Data for instanced object rendering: a mesh, instance buffer, and layer mask.
///
/// The instance buffer holds one [`InstanceRaw`](crate::data_structures::instance::InstanceRaw)
/// per drawn copy of `mesh`.
#[derive(Debug)]
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub mesh: &'a Mesh,
    pub amount: usize,
    pub layers: Layers,
}

/// A vertex buffer drawn as a line list.
#[derive(Debug)]
pub struct Lines<'a> {
    pub vertex: &'a wgpu::Buffer,
    pub amount: u32,
    pub layers: Layers,
}

/// Specifies how a flow's objects should be rendered.
///
/// # Variants
///
/// - `Defaults(Vec<Instanced>)` renders a batch of opaque instanced objects
/// - `Transparents(Vec<Instanced>)` renders a batch of transparent objects
/// - `Lines(Lines)` renders unlit lines
/// - `Composed(Vec<Render>)` recursively renders composition of multiple renders
///
#[derive(Debug)]
pub enum Render<'a> {
    Defaults(Vec<Instanced<'a>>),
    Transparents(Vec<Instanced<'a>>),
    Lines(Lines<'a>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    /// Sort `self` into per-pipeline lists, dropping everything that is not on
    /// one of the `pass` layers.
    pub(crate) fn set_pipelines(
        self,
        pass: &Layers,
        basics: &mut Vec<Instanced<'a>>,
        trans: &mut Vec<Instanced<'a>>,
        lines: &mut Vec<Lines<'a>>,
    ) {
        match self {
            Render::Defaults(vec) => {
                basics.extend(vec.into_iter().filter(|i| i.layers.test(pass)))
            }
            Render::Transparents(vec) => {
                trans.extend(vec.into_iter().filter(|i| i.layers.test(pass)))
            }
            Render::Lines(line) => {
                if line.layers.test(pass) {
                    lines.push(line);
                }
            }
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(pass, basics, trans, lines)),
        }
    }
}
