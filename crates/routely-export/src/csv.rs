//! CSV table serializer.
//!
//! Writes [`Route::dataframe`] as CSV: a header row `x,y,<channels>,d`
//! followed by one record per point.

use routely::Route;

/// Errors raised while serializing a route table.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The CSV writer rejected a record.
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing the in-memory buffer failed.
    #[error("I/O error while writing CSV: {0}")]
    Io(#[from] std::io::Error),

    /// The written bytes were not valid UTF-8.
    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Serialize the route table to a CSV string.
///
/// Column order is `x`, `y`, each channel in channel order, then `d`.
/// Values use Rust's shortest round-trip float formatting.
///
/// # Errors
///
/// Returns [`ExportError`] if the CSV writer fails; this does not happen
/// for in-memory output in practice.
///
/// # Examples
///
/// ```
/// use routely::Route;
/// use routely_export::to_csv;
///
/// let route = Route::new(vec![0.0, 3.0], vec![0.0, 4.0], None).unwrap();
/// assert_eq!(to_csv(&route).unwrap(), "x,y,d\n0,0,0\n3,4,5\n");
/// ```
pub fn to_csv(route: &Route) -> Result<String, ExportError> {
    let table = route.dataframe();
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(ToString::to_string))?;
    }
    let bytes = writer.into_inner().map_err(csv::IntoInnerError::into_error)?;
    Ok(String::from_utf8(bytes)?)
}
