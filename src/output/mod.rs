pub mod chart;
pub mod export;
pub mod formatter;

pub use chart::{render_text, segment_widths, Bar, LongFormRow, Segment, StackedBarChart};
pub use export::{export_result, ExportFormat};
pub use formatter::{
    format_breakdown_table, format_score, format_tsv, format_weights, output_width,
    should_use_colors,
};
