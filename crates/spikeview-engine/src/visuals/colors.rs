use crate::coords::ColorRgba;
use crate::data::{Array2, Shape};
use crate::error::{ProgramError, VisualError};
use crate::render::{Program, TextureData};

pub(crate) const CLUSTER_COLOR_TEXTURE: &str = "u_cluster_color";

/// Checks an `n_clusters × 3|4` color table with finite entries.
pub(crate) fn check_cluster_colors(colors: &Array2<f32>, n_clusters: usize) -> Result<(), VisualError> {
    let cols = colors.cols();
    if !matches!(cols, 3 | 4) || colors.rows() != n_clusters {
        return Err(VisualError::ShapeMismatch {
            attribute: "cluster_colors",
            expected: Shape::new(n_clusters, if cols == 3 { 3 } else { 4 }),
            actual: colors.shape(),
        });
    }
    if colors.as_slice().iter().any(|v| !v.is_finite()) {
        return Err(VisualError::InvalidValue {
            attribute: "cluster_colors",
            reason: "components must be finite".to_string(),
        });
    }
    Ok(())
}

/// RGBA8 texels of a color table, one per row.
pub(crate) fn color_texels(colors: &Array2<f32>) -> Vec<u8> {
    colors
        .iter_rows()
        .filter_map(ColorRgba::from_slice)
        .flat_map(ColorRgba::to_rgba8)
        .collect()
}

/// Color of clusters whose table has not been set for the current cluster count.
pub(crate) const UNSET_CLUSTER_COLOR: ColorRgba = ColorRgba::gray(0.5);

/// Uploads the table as a `n × 1` texture. An empty table uploads nothing.
pub(crate) fn upload_cluster_colors<P: Program>(
    program: &mut P,
    colors: &Array2<f32>,
) -> Result<(), ProgramError> {
    upload_texels(program, colors.rows(), &color_texels(colors))
}

/// Uploads `n_clusters` texels of [`UNSET_CLUSTER_COLOR`].
pub(crate) fn upload_unset_colors<P: Program>(
    program: &mut P,
    n_clusters: usize,
) -> Result<(), ProgramError> {
    let texels: Vec<u8> = std::iter::repeat_n(UNSET_CLUSTER_COLOR.to_rgba8(), n_clusters)
        .flatten()
        .collect();
    upload_texels(program, n_clusters, &texels)
}

fn upload_texels<P: Program>(program: &mut P, width: usize, texels: &[u8]) -> Result<(), ProgramError> {
    if width == 0 {
        return Ok(());
    }
    program.set_texture(
        CLUSTER_COLOR_TEXTURE,
        TextureData {
            width: width as u32,
            height: 1,
            rgba: texels,
        },
    )?;
    log::debug!("bake color {width}x1");
    Ok(())
}
