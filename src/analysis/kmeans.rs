//! Seeded k-means over RGB colors.
//!
//! Pixels are collapsed into weighted unique colors (sorted, so the input
//! order never depends on hashing), seeded with k-means++ from a `StdRng`,
//! then refined with Lloyd iterations. Restart `i` uses `seed + i`; the run
//! with the lowest inertia wins, the earliest on ties.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::KMeansConfig;

type Point = [f64; 3];

/// Final partition of one k-means run.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansOutcome {
    pub centroids: Vec<Point>,
    /// Pixels assigned to each centroid
    pub counts: Vec<u64>,
    /// Weighted sum of squared distances to the assigned centroid
    pub inertia: f64,
}

impl KMeansOutcome {
    /// Clusters with at least one pixel.
    pub fn populated(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }
}

/// Cluster RGB pixels; `None` for an empty input or `k == 0`.
pub fn cluster<I>(pixels: I, params: &KMeansConfig) -> Option<KMeansOutcome>
where
    I: IntoIterator<Item = [u8; 3]>,
{
    let mut histogram: BTreeMap<[u8; 3], u64> = BTreeMap::new();
    for px in pixels {
        *histogram.entry(px).or_insert(0) += 1;
    }
    if histogram.is_empty() || params.k == 0 {
        return None;
    }

    let points: Vec<Point> = histogram
        .keys()
        .map(|c| [f64::from(c[0]), f64::from(c[1]), f64::from(c[2])])
        .collect();
    let weights: Vec<u64> = histogram.values().copied().collect();

    let mut best: Option<KMeansOutcome> = None;
    for run in 0..params.runs.max(1) {
        let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(u64::from(run)));
        let seeds = seed_plus_plus(&points, &weights, params.k, &mut rng);
        let outcome = lloyd(&points, &weights, seeds, params.max_iter.max(1));
        if best.as_ref().is_none_or(|b| outcome.inertia < b.inertia) {
            best = Some(outcome);
        }
    }
    best
}

fn dist2(a: &Point, b: &Point) -> f64 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    dr * dr + dg * dg + db * db
}

fn nearest(p: &Point, centroids: &[Point]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let d = dist2(p, c);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

/// Pick an index with probability proportional to `mass[i]`.
fn pick_weighted(mass: &[f64], total: f64, rng: &mut StdRng) -> usize {
    let mut target = rng.random::<f64>() * total;
    for (i, &m) in mass.iter().enumerate() {
        if target < m {
            return i;
        }
        target -= m;
    }
    // float residue lands on the last index with mass
    mass.iter().rposition(|&m| m > 0.0).unwrap_or(0)
}

/// k-means++ seeding. Stops early once every color coincides with a centroid,
/// so inputs with fewer than `k` distinct colors get fewer centroids.
fn seed_plus_plus(points: &[Point], weights: &[u64], k: usize, rng: &mut StdRng) -> Vec<Point> {
    let w: Vec<f64> = weights.iter().map(|&w| w as f64).collect();
    let total_w: f64 = w.iter().sum();
    let mut centroids = vec![points[pick_weighted(&w, total_w, rng)]];

    let mut d2: Vec<f64> = points.iter().map(|p| dist2(p, &centroids[0])).collect();
    while centroids.len() < k {
        let mass: Vec<f64> = d2.iter().zip(&w).map(|(d, w)| d * w).collect();
        let total: f64 = mass.iter().sum();
        if total <= 0.0 {
            break;
        }
        let next = points[pick_weighted(&mass, total, rng)];
        for (d, p) in d2.iter_mut().zip(points) {
            *d = d.min(dist2(p, &next));
        }
        centroids.push(next);
    }
    centroids
}

fn lloyd(points: &[Point], weights: &[u64], mut centroids: Vec<Point>, max_iter: u32) -> KMeansOutcome {
    let mut assignment: Vec<usize> = points.iter().map(|p| nearest(p, &centroids).0).collect();

    for _ in 0..max_iter {
        let mut sums = vec![[0f64; 3]; centroids.len()];
        let mut mass = vec![0u64; centroids.len()];
        for ((p, &w), &a) in points.iter().zip(weights).zip(&assignment) {
            let wf = w as f64;
            sums[a][0] += p[0] * wf;
            sums[a][1] += p[1] * wf;
            sums[a][2] += p[2] * wf;
            mass[a] += w;
        }
        // empty clusters keep their previous centroid
        for (c, (s, &m)) in centroids.iter_mut().zip(sums.iter().zip(&mass)) {
            if m > 0 {
                let mf = m as f64;
                *c = [s[0] / mf, s[1] / mf, s[2] / mf];
            }
        }

        let next: Vec<usize> = points.iter().map(|p| nearest(p, &centroids).0).collect();
        if next == assignment {
            break;
        }
        assignment = next;
    }

    let mut counts = vec![0u64; centroids.len()];
    let mut inertia = 0.0;
    for ((p, &w), &a) in points.iter().zip(weights).zip(&assignment) {
        counts[a] += w;
        inertia += dist2(p, &centroids[a]) * w as f64;
    }
    KMeansOutcome {
        centroids,
        counts,
        inertia,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> KMeansConfig {
        KMeansConfig::default()
    }

    #[test]
    fn single_color_yields_one_cluster() {
        let outcome = cluster(std::iter::repeat_n([12, 200, 40], 500), &params()).unwrap();
        assert_eq!(outcome.populated(), 1);
        assert_eq!(outcome.inertia, 0.0);
    }

    #[test]
    fn separated_colors_fill_their_own_clusters() {
        let colors = [[255, 0, 0], [0, 255, 0], [0, 0, 255]];
        let pixels = colors.iter().flat_map(|c| std::iter::repeat_n(*c, 100));
        let outcome = cluster(pixels, &params()).unwrap();
        assert_eq!(outcome.populated(), 3);
        assert_eq!(outcome.inertia, 0.0);
    }

    #[test]
    fn populated_never_exceeds_k() {
        let pixels = (0..=255u8).flat_map(|r| (0..=255u8).step_by(17).map(move |g| [r, g, 128]));
        let outcome = cluster(pixels, &params()).unwrap();
        assert!(outcome.populated() <= 5);
        assert!(outcome.populated() >= 1);
    }

    #[test]
    fn same_seed_same_result() {
        let pixels: Vec<[u8; 3]> = (0..2000u32)
            .map(|i| [(i * 7 % 256) as u8, (i * 13 % 256) as u8, (i * 31 % 256) as u8])
            .collect();
        let a = cluster(pixels.iter().copied(), &params()).unwrap();
        let b = cluster(pixels.iter().copied(), &params()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_input_is_none() {
        assert!(cluster(std::iter::empty(), &params()).is_none());
    }
}
