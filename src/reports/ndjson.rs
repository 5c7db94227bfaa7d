use crate::Result;
use crate::model::MetricResult;
use ohno::IntoAppError;
use std::io::Write;

/// Write one JSON object per line for each result, in the order given.
///
/// # Errors
///
/// Returns an error when serialization or the underlying writer fails.
pub fn write_ndjson(out: &mut impl Write, results: &[MetricResult]) -> Result<()> {
    for result in results {
        let line = serde_json::to_string(result).into_app_err("Failed to serialize a result record")?;
        writeln!(out, "{line}").into_app_err("Failed to write a result record")?;
    }

    Ok(())
}
