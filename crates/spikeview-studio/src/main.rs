mod synthetic;

use anyhow::Result;

use spikeview_engine::canvas::{Canvas, CanvasConfig};
use spikeview_engine::core::{App, AppControl, FrameCtx};
use spikeview_engine::device::GpuInit;
use spikeview_engine::input::{InputEvent, Key, KeyState};
use spikeview_engine::logging::{init_logging, LoggingConfig};
use spikeview_engine::render::{ProgramFactory, WgpuProgram};
use spikeview_engine::visuals::{BoxGrid, BoxVisual, GridVisual, SpikeVisual};
use spikeview_engine::window::{Runtime, RuntimeConfig};

const N_SPIKES: usize = 20_000;
const N_CLUSTERS: usize = 6;
const SEED: u32 = 0x5eed;

type FeatureCanvas = Canvas<WgpuProgram, (SpikeVisual<WgpuProgram>, BoxVisual<WgpuProgram>)>;

/// Feature scatter of a synthetic recording with a box grid overlay.
///
/// Drag pans, the wheel zooms at the pointer, arrows/`+`/`-`/`R` navigate.
/// `1`-`4` change the grid rows and `C` cycles cluster colors.
#[derive(Default)]
struct Studio {
    canvas: Option<FeatureCanvas>,
    palette_shift: f32,
}

impl Studio {
    fn build_canvas<F>(factory: &F, ctx: &FrameCtx<'_, '_>) -> Result<FeatureCanvas>
    where
        F: ProgramFactory<Program = WgpuProgram>,
    {
        let rec = synthetic::recording(N_SPIKES, N_CLUSTERS, SEED);

        let mut scatter = SpikeVisual::new(factory)?;
        scatter.set_positions(rec.positions)?;
        scatter.set_masks(rec.masks)?;
        scatter.set_spike_clusters(rec.spike_clusters)?;
        scatter.set_cluster_colors(synthetic::palette(scatter.n_clusters(), 0.0))?;

        let mut boxes = GridVisual::new(factory, BoxGrid)?;
        boxes.set_n_rows(1);

        log::info!(
            "{} spikes in {} clusters",
            scatter.n_spikes().unwrap_or(0),
            rec.n_clusters
        );
        let size = ctx.window.logical_size();
        Ok(Canvas::new(CanvasConfig::default(), size, (scatter, boxes)))
    }

    fn handle_key(&mut self, key: Key) {
        let Some(canvas) = &mut self.canvas else {
            return;
        };

        if let Some(rows @ 1..=4) = key.digit() {
            canvas.visual_mut().1.set_n_rows(rows);
            canvas.transform_mut().set_grid_rows(rows);
            log::info!("grid: {rows}x{rows}");
        } else if key == Key::Char('c') {
            self.palette_shift = (self.palette_shift + 0.1).fract();
            let scatter = &mut canvas.visual_mut().0;
            let colors = synthetic::palette(scatter.n_clusters(), self.palette_shift);
            if let Err(err) = scatter.set_cluster_colors(colors) {
                log::warn!("recolor rejected: {err}");
            }
        }
    }
}

impl App for Studio {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.canvas.is_none() {
            let factory = ctx.program_factory();
            match Self::build_canvas(&factory, ctx) {
                Ok(canvas) => self.canvas = Some(canvas),
                Err(err) => {
                    log::error!("failed to build the feature view: {err:#}");
                    return AppControl::Exit;
                }
            }
        }

        for event in ctx.events {
            if event.is_plain_press(Key::Escape) {
                return AppControl::Exit;
            }
            if let InputEvent::Key { key, state: KeyState::Pressed, modifiers } = event {
                if !modifiers.any() {
                    self.handle_key(*key);
                }
            }
        }

        match &mut self.canvas {
            Some(canvas) => canvas.render(ctx),
            None => AppControl::Continue,
        }
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "spikeview studio".to_string(),
        ..RuntimeConfig::default()
    };
    Runtime::run(config, GpuInit::default(), Studio::default())
}
