use crate::bake::{BakeRegistry, BakeVisual, DrawOutcome, Drawable};
use crate::error::{ProgramError, VisualError};
use crate::render::{
    DrawMode, PassConfig, Program, ProgramFactory, SharedProgram, UniformValue, VertexData,
};

/// Per-cell vertices of a grid overlay.
///
/// Cells are numbered row-major; the vertex shader places each cell from its
/// index and `n_rows`.
pub trait GridGeometry: 'static {
    /// Bundled shader drawing this geometry.
    const SHADER: &'static str;
    /// Floats per vertex in `a_position`.
    const COMPONENTS: u32;

    /// Vertices for cells `0..n_cells`.
    fn vertices(&self, n_cells: usize) -> Vec<f32>;
}

/// Cell outlines: four line segments per cell, inset slightly.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct BoxGrid;

const BOX_INSET: f32 = 0.975;

const BOX_OUTLINE: [[f32; 2]; 8] = [
    [-1.0, -1.0],
    [-1.0, 1.0],
    [-1.0, 1.0],
    [1.0, 1.0],
    [1.0, 1.0],
    [1.0, -1.0],
    [1.0, -1.0],
    [-1.0, -1.0],
];

impl GridGeometry for BoxGrid {
    const SHADER: &'static str = "box";
    const COMPONENTS: u32 = 3;

    fn vertices(&self, n_cells: usize) -> Vec<f32> {
        let mut out = Vec::with_capacity(n_cells * BOX_OUTLINE.len() * 3);
        for cell in 0..n_cells {
            for [x, y] in BOX_OUTLINE {
                out.extend_from_slice(&[x * BOX_INSET, y * BOX_INSET, cell as f32]);
            }
        }
        out
    }
}

/// One vertical and one horizontal axis per cell, crossing at `(x, y)`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct AxisGrid {
    pub x: f32,
    pub y: f32,
}

impl GridGeometry for AxisGrid {
    const SHADER: &'static str = "axis";
    const COMPONENTS: u32 = 4;

    fn vertices(&self, n_cells: usize) -> Vec<f32> {
        let (x, y) = (self.x, self.y);
        let segments = [[x, -1.0, 0.0], [x, 1.0, 0.0], [-1.0, y, 1.0], [1.0, y, 1.0]];
        let mut out = Vec::with_capacity(n_cells * 16);
        for cell in 0..n_cells {
            for [px, py, axis] in segments {
                out.extend_from_slice(&[px, py, cell as f32, axis]);
            }
        }
        out
    }
}

#[derive(Debug)]
pub struct GridState<G> {
    n_rows: u32,
    geometry: G,
}

/// `n_rows × n_rows` grid overlay drawn as lines.
pub struct GridVisual<G: GridGeometry, P: Program> {
    inner: BakeVisual<GridState<G>, P>,
}

/// Box outlines around every cell.
pub type BoxVisual<P> = GridVisual<BoxGrid, P>;
/// Crosshair axes in every cell.
pub type AxisVisual<P> = GridVisual<AxisGrid, P>;

impl<G: GridGeometry, P: Program> GridVisual<G, P> {
    pub fn new<F>(factory: &F, geometry: G) -> Result<Self, ProgramError>
    where
        F: ProgramFactory<Program = P>,
    {
        let program = factory.create_program(G::SHADER)?;
        let registry = BakeRegistry::new()
            .on("geometry", |s: &GridState<G>, p: &mut P| {
                if s.n_rows == 0 {
                    return Ok(());
                }
                let n_cells = (s.n_rows * s.n_rows) as usize;
                let position = s.geometry.vertices(n_cells);
                p.set_attribute("a_position", VertexData::new(&position, G::COMPONENTS))?;
                log::debug!("bake {} geometry: {n_cells} cells", G::SHADER);
                Ok(())
            })
            .on("n_rows", |s: &GridState<G>, p: &mut P| {
                p.set_uniform("n_rows", UniformValue::Float(s.n_rows as f32))
            });

        let state = GridState { n_rows: 0, geometry };
        Ok(Self {
            inner: BakeVisual::new(G::SHADER, state, program, DrawMode::Lines, registry),
        })
    }

    pub fn n_rows(&self) -> u32 {
        self.inner.state().n_rows
    }

    pub fn n_cells(&self) -> usize {
        let n = self.n_rows() as usize;
        n * n
    }

    pub fn geometry(&self) -> &G {
        &self.inner.state().geometry
    }

    /// Sets the grid size. Zero rows makes the visual empty.
    pub fn set_n_rows(&mut self, n_rows: u32) {
        self.inner
            .update(&["geometry", "n_rows"], |s| s.n_rows = n_rows);
        self.inner.set_empty(n_rows == 0);
    }

    pub fn visual(&self) -> &BakeVisual<GridState<G>, P> {
        &self.inner
    }
}

impl<P: Program> GridVisual<AxisGrid, P> {
    /// Moves the crossing point of the axes, in cell-local coordinates.
    pub fn set_axis_positions(&mut self, x: f32, y: f32) -> Result<(), VisualError> {
        if !(x.is_finite() && y.is_finite()) {
            return Err(VisualError::InvalidValue {
                attribute: "axis_positions",
                reason: format!("({x}, {y}) is not finite"),
            });
        }
        self.inner
            .update(&["geometry"], |s| s.geometry = AxisGrid { x, y });
        Ok(())
    }
}

impl<G: GridGeometry, P: Program> Drawable<P> for GridVisual<G, P> {
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
