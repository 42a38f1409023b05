pub mod formatter;

pub use formatter::{
    format_catalog_errors, format_range_table, format_score_result, should_use_colors,
};
