// src/graph/mod.rs
pub mod draw;
pub mod layout;
pub mod matrix;

pub use draw::{draw_graph, draw_graph_from_file, draw_graphs_in_dir, GraphStyle};
pub use matrix::AdjacencyMatrix;
