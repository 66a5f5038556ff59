use std::collections::HashMap;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Pixel adjacency used when grouping mask pixels into regions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Connectivity {
    /// Edge neighbors only.
    #[default]
    Four,
    /// Edge and corner neighbors.
    Eight,
}

/// Statistics for a single connected component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Component {
    /// Label of this component in [`Labeling::labels`].
    pub label: u32,
    /// Number of pixels in the component.
    pub area: usize,
    /// Bounding box: (min_row, max_row, min_col, max_col).
    pub bbox: (usize, usize, usize, usize),
}

/// Resolved label map (0 = background) plus per-component statistics.
#[derive(Clone, Debug)]
pub struct Labeling {
    pub labels: Array2<u32>,
    /// Sorted by area descending, ties by label.
    pub components: Vec<Component>,
}

impl Labeling {
    /// Whether `(row, col)` belongs to the component with `label`.
    pub fn is(&self, row: usize, col: usize, label: u32) -> bool {
        self.labels[[row, col]] == label
    }
}

/// Two-pass connected component labeling with union-find.
pub fn connected_components(mask: &Array2<bool>, connectivity: Connectivity) -> Labeling {
    let (h, w) = mask.dim();
    let mut labels = Array2::<u32>::zeros((h, w));
    if h == 0 || w == 0 {
        return Labeling {
            labels,
            components: Vec::new(),
        };
    }

    // Union-find parent array. Index 0 unused; labels start at 1.
    let mut parent: Vec<u32> = vec![0];
    let mut neighbors: Vec<u32> = Vec::with_capacity(4);

    // Pass 1: assign provisional labels from already-visited neighbors.
    for row in 0..h {
        for col in 0..w {
            if !mask[[row, col]] {
                continue;
            }

            neighbors.clear();
            if row > 0 {
                neighbors.push(labels[[row - 1, col]]);
            }
            if col > 0 {
                neighbors.push(labels[[row, col - 1]]);
            }
            if connectivity == Connectivity::Eight && row > 0 {
                if col > 0 {
                    neighbors.push(labels[[row - 1, col - 1]]);
                }
                if col + 1 < w {
                    neighbors.push(labels[[row - 1, col + 1]]);
                }
            }
            neighbors.retain(|&l| l > 0);

            match neighbors.iter().min().copied() {
                None => {
                    let label = parent.len() as u32;
                    parent.push(label);
                    labels[[row, col]] = label;
                }
                Some(smallest) => {
                    labels[[row, col]] = smallest;
                    for &other in &neighbors {
                        if other != smallest {
                            union(&mut parent, smallest, other);
                        }
                    }
                }
            }
        }
    }

    // Flatten parent references.
    for i in 1..parent.len() {
        parent[i] = find(&parent, i as u32);
    }

    // Pass 2: resolve labels and collect stats.
    let mut stats = HashMap::<u32, Component>::new();
    for ((row, col), lbl) in labels.indexed_iter_mut() {
        if *lbl == 0 {
            continue;
        }
        let root = parent[*lbl as usize];
        *lbl = root;

        let entry = stats.entry(root).or_insert(Component {
            label: root,
            area: 0,
            bbox: (row, row, col, col),
        });
        entry.area += 1;
        entry.bbox.0 = entry.bbox.0.min(row);
        entry.bbox.1 = entry.bbox.1.max(row);
        entry.bbox.2 = entry.bbox.2.min(col);
        entry.bbox.3 = entry.bbox.3.max(col);
    }

    let mut components: Vec<Component> = stats.into_values().collect();
    components.sort_unstable_by(|a, b| b.area.cmp(&a.area).then(a.label.cmp(&b.label)));
    Labeling { labels, components }
}

fn find(parent: &[u32], mut x: u32) -> u32 {
    while parent[x as usize] != x {
        x = parent[x as usize];
    }
    x
}

fn union(parent: &mut [u32], a: u32, b: u32) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        // Smaller root wins so labels stay stable in scan order.
        let (small, big) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[big as usize] = small;
    }
}
