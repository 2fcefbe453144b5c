use crate::error::Result;
use crate::models::ActivityTable;
use std::path::Path;

pub mod csv;

pub use self::csv::{CsvImporter, EXPORT_COLUMNS};

/// Trait for loading an activity table from a file format
pub trait ImportFormat {
    /// Check if this importer can handle the given file
    fn can_import(&self, file_path: &Path) -> bool;

    /// Load every activity in the file, in file order
    fn import_file(&self, file_path: &Path) -> Result<ActivityTable>;

    /// Get the format name for this importer
    fn get_format_name(&self) -> &'static str;
}

/// Load the activity export with the fixed-schema CSV importer
pub fn load_activities(file_path: &Path) -> Result<ActivityTable> {
    let importer = CsvImporter::new();
    tracing::debug!(
        path = %file_path.display(),
        format = importer.get_format_name(),
        "Loading activity export"
    );
    importer.import_file(file_path)
}
