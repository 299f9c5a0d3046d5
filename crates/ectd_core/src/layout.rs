use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The fixed eCTD folder skeleton created for every sequence.
pub const ECTD_DIRECTORIES: &[&str] = &[
    // Utilities
    "util",
    "util/dtd",
    "util/style",
    // Module 1: Administrative (US regional)
    "m1/us",
    // Module 2: Summaries
    "m2/22-intro",
    "m2/23-qos",
    "m2/24-nonclin-over",
    "m2/25-clin-over",
    "m2/26-nonclin-sum",
    "m2/27-clin-sum",
    // Module 3: Quality
    "m3/32-body-data/32s-drug-sub",
    "m3/32-body-data/32p-drug-prod",
    "m3/32-body-data/32a-app",
    "m3/32-body-data/32r-reg-info",
    "m3/33-lit-ref",
    // Module 4: Nonclinical
    "m4/42-stud-rep",
    "m4/43-lit-ref",
    // Module 5: Clinical
    "m5/52-tab-list",
    "m5/53-clin-stud-rep",
    "m5/54-lit-ref",
];

/// Top-level folders a planned document may target.
pub const MODULE_ROOTS: &[&str] = &["m1", "m2", "m3", "m4", "m5", "util"];

pub const MODULE_ONE_PREFIX: &str = "m1";

/// Where the US regional backbone lives, relative to the sequence root.
pub const US_REGIONAL_PATH: &str = "m1/us/us-regional.xml";

/// Folder holding the US regional backbone. Its leaf hrefs are relative to it.
pub const US_REGIONAL_DIR: &str = "m1/us";

/// Creates the skeleton under `root`. Existing folders are left alone.
pub fn create_skeleton(root: &Path) -> io::Result<()> {
    for dir in ECTD_DIRECTORIES {
        fs::create_dir_all(root.join(dir))?;
    }
    Ok(())
}

/// A module path must be relative, stay inside the sequence and start at one
/// of the module roots.
pub fn is_valid_module_path(module: &str) -> bool {
    let module = module.trim_end_matches('/');
    if module.is_empty() || module.starts_with('/') || module.contains('\\') {
        return false;
    }

    let mut segments = module.split('/');
    let first = segments.next().unwrap_or_default();
    if !MODULE_ROOTS.contains(&first) {
        return false;
    }

    segments.all(|segment| {
        !segment.is_empty()
            && segment != "."
            && segment != ".."
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    })
}

/// Resolves a validated module path below `root`.
pub fn module_dir(root: &Path, module: &str) -> Option<PathBuf> {
    if !is_valid_module_path(module) {
        return None;
    }
    let mut path = root.to_path_buf();
    for segment in module.trim_end_matches('/').split('/') {
        path.push(segment);
    }
    Some(path)
}

pub fn is_module_one(module: &str) -> bool {
    module == MODULE_ONE_PREFIX || module.starts_with("m1/")
}
