pub mod chart;
pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use chart::bar_chart;
pub use icons::Icons;
pub use output::{banner, error, header, info, section, success, summary_row, warn};
pub use progress::Spinner;
pub use table::{frame_table, TableBuilder};
pub use theme::{theme, Theme};
