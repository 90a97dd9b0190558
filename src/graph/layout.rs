// src/graph/layout.rs
use crate::graph::matrix::AdjacencyMatrix;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy)]
pub struct LayoutParams {
    pub iterations: usize,
    /// Half-width of the square the final positions are scaled into
    pub scale: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            iterations: 50,
            scale: 1.0,
        }
    }
}

/// Force-directed (Fruchterman-Reingold) positions for every vertex.
///
/// Starts from evenly spaced points on a circle, so the result is the same
/// for the same graph on every run. Output is centred on the origin and fits
/// in `[-scale, scale]` on both axes.
pub fn spring_layout(graph: &AdjacencyMatrix, params: LayoutParams) -> Vec<(f64, f64)> {
    let n = graph.size();
    match n {
        0 => return Vec::new(),
        1 => return vec![(0.0, 0.0)],
        _ => {}
    }

    let mut pos: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / n as f64;
            (angle.cos(), angle.sin())
        })
        .collect();

    // Optimal pairwise distance
    let k = (1.0 / n as f64).sqrt();
    let mut temperature = 0.1;
    let cooling = temperature / (params.iterations as f64 + 1.0);

    for _ in 0..params.iterations {
        let mut shift = vec![(0.0f64, 0.0f64); n];

        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dx = pos[i].0 - pos[j].0;
                let dy = pos[i].1 - pos[j].1;
                let dist = (dx * dx + dy * dy).sqrt().max(0.01);

                let mut force = k * k / dist;
                if graph.has_edge(i, j) {
                    force -= dist * dist / k;
                }
                shift[i].0 += dx / dist * force;
                shift[i].1 += dy / dist * force;
            }
        }

        for (p, (sx, sy)) in pos.iter_mut().zip(shift) {
            let length = (sx * sx + sy * sy).sqrt().max(0.01);
            let step = length.min(temperature);
            p.0 += sx / length * step;
            p.1 += sy / length * step;
        }

        temperature -= cooling;
    }

    rescale(pos, params.scale)
}

fn rescale(mut pos: Vec<(f64, f64)>, scale: f64) -> Vec<(f64, f64)> {
    let n = pos.len() as f64;
    let cx = pos.iter().map(|p| p.0).sum::<f64>() / n;
    let cy = pos.iter().map(|p| p.1).sum::<f64>() / n;
    for p in pos.iter_mut() {
        p.0 -= cx;
        p.1 -= cy;
    }

    let extent = pos
        .iter()
        .map(|p| p.0.abs().max(p.1.abs()))
        .fold(0.0f64, f64::max);
    if extent > 0.0 {
        for p in pos.iter_mut() {
            p.0 = p.0 / extent * scale;
            p.1 = p.1 / extent * scale;
        }
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph(n: usize) -> AdjacencyMatrix {
        let rows = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| i64::from(i + 1 == j || j + 1 == i))
                    .collect()
            })
            .collect();
        AdjacencyMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn positions_fit_in_scale() {
        let layout = spring_layout(&path_graph(6), LayoutParams::default());
        assert_eq!(layout.len(), 6);
        assert!(layout
            .iter()
            .all(|(x, y)| x.abs() <= 1.0 + 1e-9 && y.abs() <= 1.0 + 1e-9));
    }

    #[test]
    fn layout_is_deterministic() {
        let graph = path_graph(5);
        let first = spring_layout(&graph, LayoutParams::default());
        let second = spring_layout(&graph, LayoutParams::default());
        assert_eq!(first, second);
    }

    #[test]
    fn adjacent_vertices_end_up_closer_than_ends() {
        let layout = spring_layout(&path_graph(5), LayoutParams::default());
        let dist = |a: usize, b: usize| {
            let (dx, dy) = (layout[a].0 - layout[b].0, layout[a].1 - layout[b].1);
            (dx * dx + dy * dy).sqrt()
        };
        assert!(dist(0, 1) < dist(0, 4));
    }

    #[test]
    fn trivial_graphs() {
        let empty = AdjacencyMatrix::from_rows(Vec::new()).unwrap();
        assert!(spring_layout(&empty, LayoutParams::default()).is_empty());
        let single = AdjacencyMatrix::from_rows(vec![vec![0]]).unwrap();
        assert_eq!(spring_layout(&single, LayoutParams::default()), vec![(0.0, 0.0)]);
    }
}
