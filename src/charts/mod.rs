// src/charts/mod.rs
pub mod dispatcher;
pub mod render;
pub mod series;
pub mod spec;

pub use dispatcher::{ChartData, ChartDispatcher, ChartRenderer};
pub use render::PlottersRenderer;
pub use series::RenderRequest;
pub use spec::{ChartKind, ChartSpec, PlotStyle};
