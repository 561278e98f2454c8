pub mod scenario;
pub mod util;

pub use util::{artifacts_dir, capture_artifacts, page_url, split_csv};
