pub mod csv_export;
pub mod csv_import;
pub mod file;

pub use csv_export::export_csv;
pub use csv_import::{import_csv, import_csv_str};
pub use file::{load_any, load_tasks, save_tasks};
