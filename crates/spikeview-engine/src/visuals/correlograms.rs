use crate::bake::{BakeRegistry, BakeVisual, DrawOutcome, Drawable};
use crate::data::{Array2, Shape};
use crate::error::{ProgramError, VisualError};
use crate::render::{
    DrawMode, PassConfig, Program, ProgramFactory, SharedProgram, UniformValue, VertexData,
};

use super::colors::{check_cluster_colors, upload_cluster_colors, upload_unset_colors};

/// Triangles filling a histogram with bar heights in `[0, 1]`.
///
/// Bars span `[-1, 1]` in x and `[-1, -1 + 2h]` in y, two triangles each.
pub fn tessellate_histogram(heights: &[f32]) -> Vec<[f32; 2]> {
    if heights.is_empty() {
        return Vec::new();
    }
    let dx = 2.0 / heights.len() as f32;
    let mut out = Vec::with_capacity(heights.len() * 6);
    for (i, &h) in heights.iter().enumerate() {
        let x0 = -1.0 + dx * i as f32;
        let x1 = x0 + dx;
        let top = -1.0 + 2.0 * h;
        out.extend_from_slice(&[
            [x0, -1.0],
            [x0, top],
            [x1, top],
            [x0, -1.0],
            [x1, top],
            [x1, -1.0],
        ]);
    }
    out
}

#[derive(Debug)]
pub struct CorrelogramState {
    n_clusters: usize,
    /// One histogram per cluster pair, row `i * n_clusters + j`.
    correlograms: Array2<f32>,
    cluster_colors: Option<Array2<f32>>,
}

impl CorrelogramState {
    /// `[x, y, cell]` vertices of every histogram, each scaled to its own maximum.
    fn vertices(&self) -> Vec<f32> {
        let mut out = Vec::new();
        for (cell, hist) in self.correlograms.iter_rows().enumerate() {
            let max = hist.iter().copied().fold(0.0f32, f32::max);
            let heights: Vec<f32> = if max > 0.0 {
                hist.iter().map(|v| v / max).collect()
            } else {
                vec![0.0; hist.len()]
            };
            for [x, y] in tessellate_histogram(&heights) {
                out.extend_from_slice(&[x, y, cell as f32]);
            }
        }
        out
    }
}

/// `n_clusters × n_clusters` grid of cross-correlograms drawn as filled bars.
///
/// Diagonal cells take their cluster's color.
pub struct CorrelogramVisual<P: Program> {
    inner: BakeVisual<CorrelogramState, P>,
}

impl<P: Program> CorrelogramVisual<P> {
    pub fn new<F>(factory: &F) -> Result<Self, ProgramError>
    where
        F: ProgramFactory<Program = P>,
    {
        let program = factory.create_program("correlograms")?;
        let registry = BakeRegistry::new()
            .on("color", |s: &CorrelogramState, p: &mut P| match &s.cluster_colors {
                Some(colors) if colors.rows() == s.n_clusters => upload_cluster_colors(p, colors),
                _ => upload_unset_colors(p, s.n_clusters),
            })
            .on("correlograms", |s: &CorrelogramState, p: &mut P| {
                let position = s.vertices();
                p.set_attribute("a_position", VertexData::new(&position, 3))?;
                p.set_uniform("n_rows", UniformValue::Float(s.n_clusters as f32))?;
                log::debug!(
                    "bake correlograms: {} x {} bins",
                    s.correlograms.rows(),
                    s.correlograms.cols()
                );
                Ok(())
            });

        let state = CorrelogramState {
            n_clusters: 0,
            correlograms: Array2::empty(0),
            cluster_colors: None,
        };
        Ok(Self {
            inner: BakeVisual::new("correlograms", state, program, DrawMode::Triangles, registry),
        })
    }

    pub fn n_clusters(&self) -> usize {
        self.inner.state().n_clusters
    }

    pub fn n_bins(&self) -> usize {
        self.inner.state().correlograms.cols()
    }

    pub fn correlograms(&self) -> &Array2<f32> {
        &self.inner.state().correlograms
    }

    /// Sets `n_clusters² × n_bins` non-negative histogram counts.
    ///
    /// A different cluster count drops the colors and marks `color`.
    pub fn set_correlograms(&mut self, n_clusters: usize, correlograms: Array2<f32>) -> Result<(), VisualError> {
        let expected = Shape::new(n_clusters * n_clusters, correlograms.cols());
        if correlograms.shape() != expected {
            return Err(VisualError::ShapeMismatch {
                attribute: "correlograms",
                expected,
                actual: correlograms.shape(),
            });
        }
        if let Some(v) = correlograms.as_slice().iter().find(|v| !(v.is_finite() && **v >= 0.0)) {
            return Err(VisualError::InvalidValue {
                attribute: "correlograms",
                reason: format!("counts must be finite and non-negative, got {v}"),
            });
        }

        let empty = n_clusters == 0 || correlograms.cols() == 0;
        let names: &[&'static str] = if self.n_clusters() == n_clusters {
            &["correlograms"]
        } else {
            &["color", "correlograms"]
        };
        self.inner.update(names, |s| {
            if s.n_clusters != n_clusters {
                s.cluster_colors = None;
            }
            s.n_clusters = n_clusters;
            s.correlograms = correlograms;
        });
        self.inner.set_empty(empty);
        Ok(())
    }

    pub fn cluster_colors(&self) -> Option<&Array2<f32>> {
        self.inner.state().cluster_colors.as_ref()
    }

    /// Sets `n_clusters × 3|4` RGB(A) colors in `[0, 1]`.
    pub fn set_cluster_colors(&mut self, colors: Array2<f32>) -> Result<(), VisualError> {
        check_cluster_colors(&colors, self.n_clusters())?;
        self.inner
            .update(&["color"], |s| s.cluster_colors = Some(colors));
        Ok(())
    }

    pub fn visual(&self) -> &BakeVisual<CorrelogramState, P> {
        &self.inner
    }
}

impl<P: Program> Drawable<P> for CorrelogramVisual<P> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::headless::{DrawLog, HeadlessProgram};
    use crate::render::HeadlessFactory;

    fn correlograms() -> CorrelogramVisual<HeadlessProgram> {
        CorrelogramVisual::new(&HeadlessFactory).unwrap()
    }

    #[test]
    fn histogram_bars_are_two_triangles() {
        let v = tessellate_histogram(&[0.5, 1.0]);
        assert_eq!(v.len(), 12);
        assert_eq!(v[0], [-1.0, -1.0]);
        assert_eq!(v[1], [-1.0, 0.0]);
        assert_eq!(v[2], [0.0, 0.0]);
        assert_eq!(v[11], [1.0, -1.0]);
        assert!(tessellate_histogram(&[]).is_empty());
    }

    #[test]
    fn histograms_need_one_row_per_cluster_pair() {
        let mut c = correlograms();
        let rows = Array2::from_vec(3, 4, vec![1.0; 12]).unwrap();
        assert_eq!(
            c.set_correlograms(2, rows),
            Err(VisualError::ShapeMismatch {
                attribute: "correlograms",
                expected: Shape::new(4, 4),
                actual: Shape::new(3, 4),
            })
        );
        assert!(c.visual().dirty().is_empty());
    }

    #[test]
    fn negative_counts_are_rejected() {
        let mut c = correlograms();
        let rows = Array2::from_vec(1, 2, vec![1.0, -1.0]).unwrap();
        assert!(matches!(c.set_correlograms(1, rows), Err(VisualError::InvalidValue { .. })));
    }

    #[test]
    fn no_clusters_is_empty() {
        let mut c = correlograms();
        c.set_correlograms(0, Array2::empty(51)).unwrap();
        assert!(c.is_empty());
    }

    #[test]
    fn bake_scales_each_histogram_to_its_maximum() {
        let mut c = correlograms();
        let counts = Array2::from_vec(4, 2, vec![2.0, 4.0, 0.0, 0.0, 1.0, 1.0, 3.0, 6.0]).unwrap();
        c.set_correlograms(2, counts).unwrap();
        c.set_cluster_colors(Array2::from(vec![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]])).unwrap();

        let mut log = DrawLog::default();
        c.draw(&mut log, &PassConfig::default()).unwrap();

        let p = c.visual().program().borrow();
        let position = p.attribute("a_position").unwrap();
        assert_eq!(position.len(), 4 * 2 * 6 * 3);
        // First bar of cell 0 reaches half height: -1 + 2 * 0.5.
        assert_eq!(&position[3..6], &[-1.0, 0.0, 0.0]);
        assert_eq!(p.uniform("n_rows"), Some(UniformValue::Float(2.0)));
        assert_eq!(p.texture("u_cluster_color").map(|t| t.width), Some(2));
        assert_eq!(log.calls[0].mode, DrawMode::Triangles);
        assert_eq!(log.calls[0].vertex_count, 48);
    }

    #[test]
    fn new_cluster_count_drops_stale_colors() {
        let mut c = correlograms();
        c.set_correlograms(1, Array2::from_vec(1, 1, vec![1.0]).unwrap()).unwrap();
        c.set_cluster_colors(Array2::from(vec![[1.0, 1.0, 1.0]])).unwrap();
        c.bake().unwrap();

        c.set_correlograms(2, Array2::from_vec(4, 1, vec![1.0; 4]).unwrap()).unwrap();
        assert!(c.cluster_colors().is_none());
        assert!(c.visual().dirty().contains("color"));

        c.bake().unwrap();
        let p = c.visual().program().borrow();
        assert_eq!(p.texture("u_cluster_color").map(|t| t.width), Some(2));
    }
}
