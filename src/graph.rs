//! Contact interaction graph.
//!
//! Turns the adjacency table into a sender × receiver matrix and an
//! undirected weighted `petgraph` graph, then places the nodes with a
//! Fruchterman-Reingold spring embedding:
//! - repulsion `k² / d` between every node pair
//! - attraction `w · d² / k` along every edge of weight `w`
//! - displacement capped by a temperature that cools linearly to zero
//!
//! Initial positions come from a seeded RNG, so a given input and seed always
//! produce the same layout. Final positions are centred and scaled to [-1, 1].

use std::collections::{BTreeSet, HashMap};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

use crate::config::LayoutConfig;
use crate::models::AdjacencyEntry;

/// Minimum distance used in force calculations, avoids division by zero
const MIN_DISTANCE: f64 = 0.01;

/// Sender × receiver participation counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionMatrix {
    /// Row and column labels, sorted
    pub names: Vec<String>,
    /// `values[sender][receiver]`, `None` when the pair never shared a conversation
    pub values: Vec<Vec<Option<u64>>>,
}

impl ConnectionMatrix {
    /// Value for a sender/receiver pair by name
    #[must_use]
    pub fn get(&self, sender: &str, receiver: &str) -> Option<u64> {
        let row = self.names.iter().position(|n| n == sender)?;
        let col = self.names.iter().position(|n| n == receiver)?;
        self.cell(row, col)
    }

    /// Value at `values[row][col]`; `None` for missing or out-of-range cells
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<u64> {
        self.values.get(row).and_then(|r| r.get(col)).copied().flatten()
    }
}

/// Pivot adjacency entries into a square matrix over every name involved.
#[must_use]
pub fn connection_matrix(entries: &[AdjacencyEntry]) -> ConnectionMatrix {
    let names: Vec<String> = entries
        .iter()
        .flat_map(|e| [e.sender.as_str(), e.receiver.as_str()])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(ToOwned::to_owned)
        .collect();
    let position: HashMap<&str, usize> = names
        .iter()
        .enumerate()
        .map(|(i, n)| (n.as_str(), i))
        .collect();

    let mut values = vec![vec![None; names.len()]; names.len()];
    for entry in entries {
        let (Some(&row), Some(&col)) = (
            position.get(entry.sender.as_str()),
            position.get(entry.receiver.as_str()),
        ) else {
            continue;
        };
        let cell: &mut Option<u64> = &mut values[row][col];
        *cell = Some(cell.unwrap_or(0).saturating_add(entry.count));
    }

    ConnectionMatrix { names, values }
}

/// Node payload of the interaction graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactNode {
    /// Sender name
    pub name: String,
    /// Layout x coordinate in [-1, 1]
    pub x: f64,
    /// Layout y coordinate in [-1, 1]
    pub y: f64,
}

/// Positioned node with its total incident edge weight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedNode {
    /// Sender name
    pub name: String,
    /// Layout x coordinate
    pub x: f64,
    /// Layout y coordinate
    pub y: f64,
    /// Sum of incident edge weights
    pub weight: u64,
}

/// Undirected edge between two contacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactEdge {
    /// One endpoint
    pub source: String,
    /// Other endpoint
    pub target: String,
    /// Combined participation count of both directions
    pub weight: u64,
}

/// Weighted, undirected contact graph with a 2-D layout
#[derive(Debug, Clone)]
pub struct InteractionGraph {
    /// The underlying graph; edge weights are participation counts
    pub graph: UnGraph<ContactNode, u64>,
    /// Mapping from contact name to node index
    pub index: HashMap<String, NodeIndex>,
}

impl InteractionGraph {
    /// Build and lay out the graph for an adjacency table
    #[must_use]
    pub fn from_adjacency(entries: &[AdjacencyEntry], layout: &LayoutConfig) -> Self {
        Self::from_matrix(&connection_matrix(entries), layout)
    }

    /// Build and lay out the graph for a connection matrix.
    ///
    /// One edge joins two contacts when either direction has a value; its
    /// weight is the sum of the values present. Missing cells contribute
    /// nothing, and the diagonal is ignored.
    #[must_use]
    pub fn from_matrix(matrix: &ConnectionMatrix, layout: &LayoutConfig) -> Self {
        let n = matrix.names.len();
        let mut graph = UnGraph::with_capacity(n, n * n.saturating_sub(1) / 2);
        let mut index = HashMap::with_capacity(n);

        let nodes: Vec<NodeIndex> = matrix
            .names
            .iter()
            .map(|name| {
                let idx = graph.add_node(ContactNode {
                    name: name.clone(),
                    x: 0.0,
                    y: 0.0,
                });
                index.insert(name.clone(), idx);
                idx
            })
            .collect();

        for i in 0..n {
            for j in (i + 1)..n {
                let forward = matrix.cell(i, j);
                let backward = matrix.cell(j, i);
                if forward.is_none() && backward.is_none() {
                    continue;
                }
                let weight = forward.unwrap_or(0).saturating_add(backward.unwrap_or(0));
                graph.add_edge(nodes[i], nodes[j], weight);
            }
        }

        let positions = spring_layout(&graph, layout);
        for (idx, (x, y)) in graph.node_indices().zip(positions) {
            graph[idx].x = x;
            graph[idx].y = y;
        }
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Built interaction graph"
        );

        Self { graph, index }
    }

    /// Sum of the weights of every edge touching `name`
    #[must_use]
    pub fn node_weight(&self, name: &str) -> Option<u64> {
        let &idx = self.index.get(name)?;
        Some(self.graph.edges(idx).map(|e| *e.weight()).sum())
    }

    /// Nodes with positions and weights, in name order
    #[must_use]
    pub fn nodes(&self) -> Vec<PositionedNode> {
        self.graph
            .node_indices()
            .map(|idx| {
                let node = &self.graph[idx];
                PositionedNode {
                    name: node.name.clone(),
                    x: node.x,
                    y: node.y,
                    weight: self.graph.edges(idx).map(|e| *e.weight()).sum(),
                }
            })
            .collect()
    }

    /// Edges with endpoint names
    #[must_use]
    pub fn edges(&self) -> Vec<ContactEdge> {
        self.graph
            .edge_references()
            .map(|e| ContactEdge {
                source: self.graph[e.source()].name.clone(),
                target: self.graph[e.target()].name.clone(),
                weight: *e.weight(),
            })
            .collect()
    }
}

/// Fruchterman-Reingold positions for every node, in node index order.
fn spring_layout(graph: &UnGraph<ContactNode, u64>, layout: &LayoutConfig) -> Vec<(f64, f64)> {
    let n = graph.node_count();
    match n {
        0 => return Vec::new(),
        1 => return vec![(0.0, 0.0)],
        _ => {}
    }

    let mut rng = StdRng::seed_from_u64(layout.seed);
    let mut pos: Vec<[f64; 2]> = (0..n).map(|_| [rng.gen::<f64>(), rng.gen::<f64>()]).collect();

    let edges: Vec<(usize, usize, f64)> = graph
        .edge_references()
        .map(|e| (e.source().index(), e.target().index(), *e.weight() as f64))
        .collect();

    let k = (1.0 / n as f64).sqrt();
    let mut temperature = 0.1 * spread(&pos);
    let cooling = temperature / (layout.iterations as f64 + 1.0);

    for _ in 0..layout.iterations {
        let mut displacement = vec![[0.0_f64; 2]; n];

        for i in 0..n {
            for j in (i + 1)..n {
                let dx = pos[i][0] - pos[j][0];
                let dy = pos[i][1] - pos[j][1];
                let distance = dx.hypot(dy).max(MIN_DISTANCE);
                let force = k * k / (distance * distance);
                displacement[i][0] += dx * force;
                displacement[i][1] += dy * force;
                displacement[j][0] -= dx * force;
                displacement[j][1] -= dy * force;
            }
        }

        for &(a, b, weight) in &edges {
            let dx = pos[a][0] - pos[b][0];
            let dy = pos[a][1] - pos[b][1];
            let distance = dx.hypot(dy).max(MIN_DISTANCE);
            let force = weight * distance / k;
            displacement[a][0] -= dx * force;
            displacement[a][1] -= dy * force;
            displacement[b][0] += dx * force;
            displacement[b][1] += dy * force;
        }

        let mut moved = 0.0;
        for (p, d) in pos.iter_mut().zip(&displacement) {
            let length = d[0].hypot(d[1]).max(MIN_DISTANCE);
            let step = [d[0] * temperature / length, d[1] * temperature / length];
            p[0] += step[0];
            p[1] += step[1];
            moved += step[0].hypot(step[1]);
        }

        temperature -= cooling;
        if moved / (n as f64) < layout.threshold {
            break;
        }
    }

    rescale(&pos)
}

/// Largest extent of the point cloud along either axis
fn spread(pos: &[[f64; 2]]) -> f64 {
    (0..2)
        .map(|axis| {
            let (lo, hi) = pos.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p[axis]), hi.max(p[axis]))
            });
            hi - lo
        })
        .fold(0.0, f64::max)
}

/// Centre on the mean and scale so the largest coordinate magnitude is 1
fn rescale(pos: &[[f64; 2]]) -> Vec<(f64, f64)> {
    let n = pos.len() as f64;
    let mean_x = pos.iter().map(|p| p[0]).sum::<f64>() / n;
    let mean_y = pos.iter().map(|p| p[1]).sum::<f64>() / n;
    let centred: Vec<(f64, f64)> = pos.iter().map(|p| (p[0] - mean_x, p[1] - mean_y)).collect();

    let extent = centred
        .iter()
        .map(|&(x, y)| x.abs().max(y.abs()))
        .fold(0.0, f64::max);
    if extent > 0.0 {
        centred.into_iter().map(|(x, y)| (x / extent, y / extent)).collect()
    } else {
        centred
    }
}
