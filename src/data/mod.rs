pub mod queries;
pub mod source;

pub use queries::chart_data;
pub use source::{ProfileSource, Universes};

/// Profiler CSV fixture with the export's column layout
#[cfg(test)]
pub(crate) fn write_profile(rows: &[&str]) -> tempfile::NamedTempFile {
    use std::io::Write;

    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "operator;uir_code;srcline;ev_name;time;pipeline;addr").unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file.flush().unwrap();
    file
}
