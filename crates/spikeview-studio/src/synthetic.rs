//! Deterministic stand-in for a sorted recording.

use spikeview_engine::data::Array2;

/// Spikes scattered around one center per cluster in a 2D feature space.
pub struct Recording {
    pub positions: Array2<f32>,
    pub masks: Array2<f32>,
    pub spike_clusters: Vec<u32>,
    pub n_clusters: usize,
}

/// xorshift32; same seed, same recording.
struct Rng(u32);

impl Rng {
    fn next_f32(&mut self) -> f32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        (x >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Roughly normal, zero mean, unit variance (Irwin-Hall).
    fn next_normal(&mut self) -> f32 {
        (0..12).map(|_| self.next_f32()).sum::<f32>() - 6.0
    }
}

pub fn recording(n_spikes: usize, n_clusters: usize, seed: u32) -> Recording {
    let mut rng = Rng(seed.max(1));
    let centers: Vec<[f32; 2]> = (0..n_clusters)
        .map(|_| [rng.next_f32() * 1.4 - 0.7, rng.next_f32() * 1.4 - 0.7])
        .collect();

    let mut positions = Vec::with_capacity(n_spikes);
    let mut masks = Vec::with_capacity(n_spikes);
    let mut spike_clusters = Vec::with_capacity(n_spikes);
    for i in 0..n_spikes {
        let cluster = i % n_clusters.max(1);
        let [cx, cy] = centers.get(cluster).copied().unwrap_or([0.0, 0.0]);
        positions.push([cx + 0.08 * rng.next_normal(), cy + 0.08 * rng.next_normal()]);
        masks.push([if rng.next_f32() < 0.9 { 1.0 } else { 0.3 }]);
        spike_clusters.push(cluster as u32);
    }

    Recording {
        positions: Array2::from(positions),
        masks: Array2::from(masks),
        spike_clusters,
        n_clusters,
    }
}

/// `n` evenly spaced hues, rotated by `shift` turns.
pub fn palette(n: usize, shift: f32) -> Array2<f32> {
    let rows: Vec<[f32; 3]> = (0..n)
        .map(|i| hue_to_rgb((i as f32 / n.max(1) as f32 + shift).fract()))
        .collect();
    Array2::from(rows)
}

fn hue_to_rgb(h: f32) -> [f32; 3] {
    let channel = |offset: f32| {
        let k = (h * 6.0 + offset) % 6.0;
        1.0 - k.min(4.0 - k).clamp(0.0, 1.0)
    };
    [channel(5.0), channel(3.0), channel(1.0)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_is_deterministic() {
        let a = recording(50, 3, 7);
        let b = recording(50, 3, 7);
        assert_eq!(a.positions, b.positions);
        assert_eq!(a.spike_clusters, b.spike_clusters);
        assert_eq!(a.positions.rows(), 50);
        assert_eq!(a.masks.cols(), 1);
    }

    #[test]
    fn palette_has_one_row_per_cluster() {
        let p = palette(4, 0.25);
        assert_eq!((p.rows(), p.cols()), (4, 3));
        assert!(p.as_slice().iter().all(|c| (0.0..=1.0).contains(c)));
    }

    #[test]
    fn primary_hues() {
        let close = |a: [f32; 3], b: [f32; 3]| a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5);
        assert!(close(hue_to_rgb(0.0), [1.0, 0.0, 0.0]));
        assert!(close(hue_to_rgb(1.0 / 3.0), [0.0, 1.0, 0.0]));
    }
}
