use crate::bake::{BakeRegistry, BakeVisual, DrawOutcome, Drawable};
use crate::data::{unique_sorted, Array2, Shape};
use crate::error::{ProgramError, VisualError};
use crate::render::{
    DrawMode, PassConfig, Program, ProgramFactory, SharedProgram, UniformValue, VertexData,
};

use super::colors::{check_cluster_colors, upload_cluster_colors, upload_unset_colors};

/// Spike attributes shared by every spike plot.
///
/// `n_spikes` is set by `set_positions`, or by the first per-spike setter when
/// no positions exist yet; the other per-spike setters must match it.
#[derive(Debug, Default)]
pub struct SpikeState {
    n_spikes: Option<usize>,
    positions: Option<Array2<f32>>,
    masks: Option<Array2<f32>>,
    spike_ids: Option<Vec<u64>>,
    /// Cluster of every spike in the dataset, indexed by spike id.
    spike_clusters: Option<Vec<u32>>,
    cluster_colors: Option<Array2<f32>>,
}

impl SpikeState {
    fn spike_ids(&self) -> Vec<u64> {
        match &self.spike_ids {
            Some(ids) => ids.clone(),
            None => (0..self.n_spikes.unwrap_or(0) as u64).collect(),
        }
    }

    /// Sorted clusters of the displayed spikes.
    fn cluster_ids(&self) -> Vec<u32> {
        let Some(clusters) = &self.spike_clusters else {
            return Vec::new();
        };
        unique_sorted(
            self.spike_ids()
                .into_iter()
                .filter_map(|id| clusters.get(id as usize).copied()),
        )
    }

    /// Index of each displayed spike's cluster within `cluster_ids`.
    fn cluster_indices(&self) -> Vec<f32> {
        let n = self.n_spikes.unwrap_or(0);
        let Some(clusters) = &self.spike_clusters else {
            return vec![0.0; n];
        };
        let cluster_ids = self.cluster_ids();
        self.spike_ids()
            .into_iter()
            .map(|id| {
                clusters
                    .get(id as usize)
                    .and_then(|c| cluster_ids.binary_search(c).ok())
                    .unwrap_or(0) as f32
            })
            .collect()
    }

    /// Rows a per-spike attribute must have: the established count, or its own.
    fn check_rows(&self, attribute: &'static str, actual: Shape, cols: usize) -> Result<usize, VisualError> {
        let rows = self.n_spikes.unwrap_or(actual.rows);
        let expected = Shape::new(rows, cols);
        if actual != expected {
            return Err(VisualError::ShapeMismatch { attribute, expected, actual });
        }
        Ok(rows)
    }
}

/// Scatter of spikes, one point each, colored by cluster.
///
/// Dirty names:
/// - `color`: cluster color texture and `n_clusters`.
/// - `spikes`: positions and masks.
/// - `spikes_clusters`: per-spike cluster index.
pub struct SpikeVisual<P: Program> {
    inner: BakeVisual<SpikeState, P>,
}

impl<P: Program> SpikeVisual<P> {
    pub fn new<F>(factory: &F) -> Result<Self, ProgramError>
    where
        F: ProgramFactory<Program = P>,
    {
        let program = factory.create_program("spikes")?;
        let registry = BakeRegistry::new()
            .on("color", |s: &SpikeState, p: &mut P| {
                let n_clusters = s.cluster_ids().len();
                match &s.cluster_colors {
                    Some(colors) if colors.rows() == n_clusters => upload_cluster_colors(p, colors)?,
                    _ => upload_unset_colors(p, n_clusters)?,
                }
                p.set_uniform("n_clusters", UniformValue::Float(n_clusters as f32))
            })
            .on("spikes", |s: &SpikeState, p: &mut P| {
                let n = s.n_spikes.unwrap_or(0);
                if let Some(positions) = &s.positions {
                    p.set_attribute("a_position", VertexData::new(positions.as_slice(), 2))?;
                }
                let masks = match &s.masks {
                    Some(m) => m.as_slice().to_vec(),
                    None => vec![1.0; n],
                };
                p.set_attribute("a_mask", VertexData::new(&masks, 1))?;
                log::debug!("bake spikes: {n}");
                Ok(())
            })
            .on("spikes_clusters", |s: &SpikeState, p: &mut P| {
                let indices = s.cluster_indices();
                p.set_attribute("a_cluster", VertexData::new(&indices, 1))?;
                log::debug!("bake spikes clusters: {}", indices.len());
                Ok(())
            });

        Ok(Self {
            inner: BakeVisual::new("spikes", SpikeState::default(), program, DrawMode::Points, registry),
        })
    }

    pub fn n_spikes(&self) -> Option<usize> {
        self.inner.state().n_spikes
    }

    pub fn positions(&self) -> Option<&Array2<f32>> {
        self.inner.state().positions.as_ref()
    }

    /// Sets `n × 2` positions and makes `n` the spike count.
    ///
    /// A different count drops the masks and spike ids set for the previous one.
    pub fn set_positions(&mut self, positions: Array2<f32>) -> Result<(), VisualError> {
        let n = positions.rows();
        let expected = Shape::new(n, 2);
        if positions.shape() != expected {
            return Err(VisualError::ShapeMismatch {
                attribute: "positions",
                expected,
                actual: positions.shape(),
            });
        }

        let state = self.inner.state();
        let new_count = state.n_spikes != Some(n);
        if let Some(clusters) = &state.spike_clusters {
            let ids = match &state.spike_ids {
                Some(ids) if !new_count => ids.clone(),
                _ => (0..n as u64).collect(),
            };
            check_covered(&ids, clusters.len())?;
        }

        if new_count {
            log::debug!("spike count: {:?} -> {n}", state.n_spikes);
        }
        self.recluster(&["spikes", "spikes_clusters"], |s| {
            if new_count {
                s.masks = None;
                s.spike_ids = None;
            }
            s.n_spikes = Some(n);
            s.positions = Some(positions);
        });
        self.inner.set_empty(n == 0);
        Ok(())
    }

    pub fn masks(&self) -> Option<&Array2<f32>> {
        self.inner.state().masks.as_ref()
    }

    /// Sets one mask value per spike (`n_spikes × 1`). Masked spikes fade to gray.
    pub fn set_masks(&mut self, masks: Array2<f32>) -> Result<(), VisualError> {
        let n = self.inner.state().check_rows("masks", masks.shape(), 1)?;
        self.inner.update(&["spikes"], |s| {
            s.n_spikes = Some(n);
            s.masks = Some(masks);
        });
        self.inner.set_empty(n == 0);
        Ok(())
    }

    /// Displayed spike ids; `0..n_spikes` unless set.
    pub fn spike_ids(&self) -> Vec<u64> {
        self.inner.state().spike_ids()
    }

    pub fn set_spike_ids(&mut self, spike_ids: Vec<u64>) -> Result<(), VisualError> {
        let state = self.inner.state();
        let n = state.check_rows("spike_ids", Shape::column(spike_ids.len()), 1)?;
        if let Some(clusters) = &state.spike_clusters {
            check_covered(&spike_ids, clusters.len())?;
        }
        self.recluster(&["spikes", "spikes_clusters"], |s| {
            s.n_spikes = Some(n);
            s.spike_ids = Some(spike_ids);
        });
        self.inner.set_empty(n == 0);
        Ok(())
    }

    pub fn spike_clusters(&self) -> Option<&[u32]> {
        self.inner.state().spike_clusters.as_deref()
    }

    /// Sets the cluster of every spike in the dataset, not only the displayed ones.
    pub fn set_spike_clusters(&mut self, spike_clusters: Vec<u32>) -> Result<(), VisualError> {
        check_covered(&self.spike_ids(), spike_clusters.len())?;
        self.recluster(&["spikes_clusters"], |s| s.spike_clusters = Some(spike_clusters));
        Ok(())
    }

    /// Sorted unique clusters of the displayed spikes.
    pub fn cluster_ids(&self) -> Vec<u32> {
        self.inner.state().cluster_ids()
    }

    pub fn n_clusters(&self) -> usize {
        self.cluster_ids().len()
    }

    pub fn cluster_colors(&self) -> Option<&Array2<f32>> {
        self.inner.state().cluster_colors.as_ref()
    }

    /// Sets `n_clusters × 3|4` RGB(A) colors in `[0, 1]`, ordered like `cluster_ids`.
    pub fn set_cluster_colors(&mut self, colors: Array2<f32>) -> Result<(), VisualError> {
        check_cluster_colors(&colors, self.n_clusters())?;
        self.inner
            .update(&["color"], |s| s.cluster_colors = Some(colors));
        Ok(())
    }

    pub fn visual(&self) -> &BakeVisual<SpikeState, P> {
        &self.inner
    }

    /// Applies an update that may change the displayed clusters.
    ///
    /// A new cluster count drops colors sized for the old one and marks `color`.
    fn recluster(&mut self, names: &[&'static str], f: impl FnOnce(&mut SpikeState)) {
        let before = self.n_clusters();
        self.inner.update(names, f);
        let after = self.n_clusters();
        if after != before {
            self.inner.update(&["color"], |s| {
                if s.cluster_colors.as_ref().is_some_and(|c| c.rows() != after) {
                    s.cluster_colors = None;
                }
            });
        }
    }
}

fn check_covered(spike_ids: &[u64], n_assigned: usize) -> Result<(), VisualError> {
    match spike_ids.iter().find(|&&id| id as usize >= n_assigned) {
        Some(id) => Err(VisualError::InvalidValue {
            attribute: "spike_clusters",
            reason: format!("spike {id} has no cluster ({n_assigned} spikes assigned)"),
        }),
        None => Ok(()),
    }
}

impl<P: Program> Drawable<P> for SpikeVisual<P> {
    fn programs(&self) -> Vec<SharedProgram<P>> {
        self.inner.programs()
    }

    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn bake(&mut self) -> Result<bool, ProgramError> {
        self.inner.bake()
    }

    fn draw(
        &mut self,
        target: &mut P::Target<'_>,
        pass: &PassConfig,
    ) -> Result<DrawOutcome, ProgramError> {
        self.inner.draw(target, pass)
    }
}
