/// Path constants and utilities for the logistics system
use once_cell::sync::OnceCell;
use std::path::PathBuf;

// Static storage for configurable data root
static DATA_ROOT: OnceCell<String> = OnceCell::new();

// Static storage for configurable templates root
static TEMPLATES_ROOT: OnceCell<String> = OnceCell::new();

// Default root constants
const DEFAULT_DATA_ROOT: &str = "/data/logistics";
const DEFAULT_TEMPLATES_ROOT: &str = "/app/templates";

pub const DATABASE_FILE_NAME: &str = "logistics.db";
pub const REQUEST_TEMPLATE_FILE_NAME: &str = "request_pdf.hbs";

/// Initialize the data root directory. Can only be called once.
/// If not called, the default `/data/logistics` will be used.
pub fn init_data_root(path: String) -> Result<(), String> {
    DATA_ROOT
        .set(path)
        .map_err(|_| "Data root already initialized".to_string())
}

/// Initialize the templates root directory. Can only be called once.
/// If not called, the default `/app/templates` will be used.
pub fn init_templates_root(path: String) -> Result<(), String> {
    TEMPLATES_ROOT
        .set(path)
        .map_err(|_| "Templates root already initialized".to_string())
}

fn get_data_root() -> &'static str {
    DATA_ROOT.get().map(|s| s.as_str()).unwrap_or(DEFAULT_DATA_ROOT)
}

fn get_templates_root() -> &'static str {
    TEMPLATES_ROOT
        .get()
        .map(|s| s.as_str())
        .unwrap_or(DEFAULT_TEMPLATES_ROOT)
}

pub fn data_root() -> PathBuf {
    PathBuf::from(get_data_root())
}

pub fn templates_dir() -> PathBuf {
    PathBuf::from(get_templates_root())
}

/// SQLite database file inside the data root
pub fn database_path() -> PathBuf {
    data_root().join(DATABASE_FILE_NAME)
}

/// Optional override of the embedded request report template
pub fn request_template_path() -> PathBuf {
    templates_dir().join(REQUEST_TEMPLATE_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names_are_joined_onto_roots() {
        assert!(database_path().ends_with(DATABASE_FILE_NAME));
        assert!(request_template_path().ends_with(REQUEST_TEMPLATE_FILE_NAME));
        assert_eq!(database_path().parent().unwrap(), data_root());
    }
}
