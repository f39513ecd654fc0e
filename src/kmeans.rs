use std::collections::HashSet;

use glam::Vec3;
use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Seedings tried by default, the same number scikit-learn uses
pub const DEFAULT_RESTARTS: usize = 10;

/// Lloyd's k-means over rgb points with k-means++ seeding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeans {
    pub k: usize,
    pub max_iters: usize,
    /// stop once the summed squared movement of all centers drops to this
    pub tolerance: f32,
    /// independent seedings, the one with the lowest inertia wins
    pub restarts: usize,
    pub seed: u64,
}

impl Default for KMeans {
    fn default() -> Self {
        return Self {
            k: 3,
            max_iters: 300,
            tolerance: 1e-4,
            restarts: DEFAULT_RESTARTS,
            seed: 0,
        };
    }
}

#[derive(Debug, Clone)]
struct Run {
    centers: Vec<Vec3>,
    inertia: f32,
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        return Self {
            k,
            ..Default::default()
        };
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        return self;
    }

    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        return self;
    }

    /// Returns exactly `k` centers, or none at all for empty input.
    pub fn fit(&self, points: &[Vec3]) -> Vec<Vec3> {
        if self.k == 0 || points.is_empty() {
            return Vec::new();
        }

        let distinct = distinct_points(points);
        if distinct.len() <= self.k {
            debug!(
                "only {} distinct colors for {} clusters, using them directly",
                distinct.len(),
                self.k
            );
            let last = distinct[distinct.len() - 1];
            let mut centers = distinct;
            centers.resize(self.k, last);
            return centers;
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<Run> = None;
        for _ in 0..self.restarts.max(1) {
            let run = self.run(points, &mut rng);
            if best.as_ref().map_or(true, |b| run.inertia < b.inertia) {
                best = Some(run);
            }
        }
        return best.map(|run| run.centers).unwrap_or_default();
    }

    fn run(&self, points: &[Vec3], rng: &mut StdRng) -> Run {
        let mut centers = seed_centers(points, self.k, rng);
        let mut sums = vec![Vec3::ZERO; self.k];
        let mut counts = vec![0usize; self.k];

        for iter in 0..self.max_iters {
            sums.fill(Vec3::ZERO);
            counts.fill(0);
            for &p in points {
                let c = nearest(&centers, p);
                sums[c] += p;
                counts[c] += 1;
            }

            let mut shift = 0.0;
            for c in 0..self.k {
                // empty clusters keep their previous center
                if counts[c] > 0 {
                    let moved = sums[c] / counts[c] as f32;
                    shift += centers[c].distance_squared(moved);
                    centers[c] = moved;
                }
            }
            if shift <= self.tolerance {
                debug!("k-means converged after {} iterations", iter + 1);
                break;
            }
        }

        let inertia = points
            .iter()
            .map(|&p| p.distance_squared(centers[nearest(&centers, p)]))
            .sum();
        return Run { centers, inertia };
    }
}

/// Index of the center closest to `p`, ties go to the lowest index
pub fn nearest(centers: &[Vec3], p: Vec3) -> usize {
    let mut best = 0;
    let mut best_dist = f32::INFINITY;
    for (i, c) in centers.iter().enumerate() {
        let dist = c.distance_squared(p);
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    return best;
}

fn distinct_points(points: &[Vec3]) -> Vec<Vec3> {
    let mut seen = HashSet::new();
    return points
        .iter()
        .copied()
        .filter(|p| seen.insert(p.to_array().map(f32::to_bits)))
        .collect();
}

fn seed_centers(points: &[Vec3], k: usize, rng: &mut StdRng) -> Vec<Vec3> {
    let mut centers = Vec::with_capacity(k);
    centers.push(points[rng.gen_range(0..points.len())]);

    let mut dists: Vec<f32> = points
        .iter()
        .map(|p| p.distance_squared(centers[0]))
        .collect();
    while centers.len() < k {
        let total: f32 = dists.iter().sum();
        let next = if total > 0.0 {
            let mut target = rng.gen::<f32>() * total;
            let mut pick = points.len() - 1;
            for (i, &d) in dists.iter().enumerate() {
                if target < d {
                    pick = i;
                    break;
                }
                target -= d;
            }
            pick
        } else {
            rng.gen_range(0..points.len())
        };
        let center = points[next];
        for (d, p) in dists.iter_mut().zip(points) {
            *d = d.min(p.distance_squared(center));
        }
        centers.push(center);
    }
    return centers;
}

#[cfg(test)]
mod test {
    use super::*;

    fn sorted(mut centers: Vec<Vec3>) -> Vec<Vec3> {
        centers.sort_by(|a, b| a.x.total_cmp(&b.x));
        return centers;
    }

    fn two_blobs() -> Vec<Vec3> {
        let mut points = Vec::new();
        for i in 0..20 {
            let o = (i % 5) as f32;
            points.push(Vec3::new(10.0 + o, 10.0, 10.0));
            points.push(Vec3::new(200.0 + o, 200.0, 200.0));
        }
        return points;
    }

    #[test]
    fn separates_blobs() {
        let centers = sorted(KMeans::new(2).fit(&two_blobs()));
        assert_eq!(centers.len(), 2);
        assert!(centers[0].distance(Vec3::new(12.0, 10.0, 10.0)) < 0.01);
        assert!(centers[1].distance(Vec3::new(202.0, 200.0, 200.0)) < 0.01);
    }

    #[test]
    fn same_seed_same_centers() {
        let mut points = two_blobs();
        points.push(Vec3::new(100.0, 50.0, 0.0));
        points.push(Vec3::new(0.0, 255.0, 30.0));
        let a = KMeans::new(3).with_seed(7).fit(&points);
        let b = KMeans::new(3).with_seed(7).fit(&points);
        assert_eq!(a, b);
    }

    #[test]
    fn restarts_never_worsen_inertia() {
        let mut points = two_blobs();
        points.extend((0..30).map(|i| Vec3::new(i as f32 * 8.0, 128.0, 255.0 - i as f32)));
        let inertia = |centers: &[Vec3]| -> f32 {
            points
                .iter()
                .map(|&p| p.distance_squared(centers[nearest(centers, p)]))
                .sum()
        };
        let one = KMeans::new(3).with_seed(3).with_restarts(1).fit(&points);
        let many = KMeans::new(3).with_seed(3).with_restarts(8).fit(&points);
        assert!(inertia(&many) <= inertia(&one) + 1e-3);
    }

    #[test]
    fn default_keeps_best_of_ten_seedings() {
        let kmeans = KMeans::new(3);
        assert_eq!(kmeans.restarts, 10);
        assert_eq!(kmeans, KMeans::default());

        let mut points = two_blobs();
        points.extend((0..30).map(|i| Vec3::new(i as f32 * 8.0, 128.0, 255.0 - i as f32)));
        let inertia = |centers: &[Vec3]| -> f32 {
            points
                .iter()
                .map(|&p| p.distance_squared(centers[nearest(centers, p)]))
                .sum()
        };
        let single = kmeans.with_restarts(1).fit(&points);
        assert!(inertia(&kmeans.fit(&points)) <= inertia(&single) + 1e-3);
    }

    #[test]
    fn few_distinct_colors_are_padded() {
        let red = Vec3::new(255.0, 0.0, 0.0);
        let blue = Vec3::new(0.0, 0.0, 255.0);
        let centers = KMeans::new(3).fit(&[red, blue, red, red]);
        assert_eq!(centers, vec![red, blue, blue]);
    }

    #[test]
    fn empty_input_has_no_centers() {
        assert!(KMeans::new(3).fit(&[]).is_empty());
    }

    #[test]
    fn nearest_prefers_lowest_index_on_tie() {
        let centers = [Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)];
        assert_eq!(nearest(&centers, Vec3::new(1.0, 0.0, 0.0)), 0);
        assert_eq!(nearest(&centers, Vec3::new(1.5, 0.0, 0.0)), 1);
    }
}
