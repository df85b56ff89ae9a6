pub mod models;
pub mod optimistic;
pub mod schedule;
pub mod settings;
pub mod view;

pub use optimistic::apply_optimistic;
pub use schedule::{Debouncer, Timers};
pub use view::{InitCtx, PageQuery, View, ViewState};
