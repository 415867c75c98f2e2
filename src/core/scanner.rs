use crate::utils::error::{Result, StatError};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

pub const JSON_EXTENSION: &str = ".json";

/// 遞迴尋找 root 底下所有副檔名為 `.json` (不分大小寫) 的一般檔案
///
/// 回傳順序沒有意義；無法讀取的子目錄只記錄警告並略過。
///
/// # Errors
/// root 不存在或不是目錄時回傳 `DirectoryNotFoundError`。
pub fn scan(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(StatError::DirectoryNotFoundError {
            path: root.to_path_buf(),
        });
    }

    let walker = WalkDir::new(root).follow_links(false).into_iter();
    let (paths, error_count) = accumulate_walker(walker);
    if error_count > 0 {
        tracing::warn!(
            "⚠️ Encountered {} errors while scanning {}",
            error_count,
            root.display()
        );
    }

    tracing::debug!("Found {} json files under {}", paths.len(), root.display());
    Ok(paths)
}

fn accumulate_walker<I>(walker: I) -> (Vec<PathBuf>, usize)
where
    I: Iterator<Item = walkdir::Result<DirEntry>>,
{
    let mut paths = Vec::new();
    let mut errors = 0;
    for item in walker {
        match item {
            Ok(entry) => {
                if is_regular_file(&entry) && has_json_extension(&entry) {
                    paths.push(entry.into_path());
                }
            }
            Err(e) => {
                tracing::debug!("Skipping unreadable entry: {}", e);
                errors += 1;
            }
        }
    }
    (paths, errors)
}

// 指向一般檔案的 symlink 也算；symlink 目錄不會被展開
fn is_regular_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

fn has_json_extension(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_string_lossy()
        .to_lowercase()
        .ends_with(JSON_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    fn setup_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        fs::write(root.join("order_root_1.json"), "").unwrap();
        fs::write(root.join("ignore.txt"), "").unwrap();
        fs::write(root.join("order_root_2.JSON"), "").unwrap();

        fs::create_dir(root.join("data_x")).unwrap();
        fs::write(root.join("data_x/order_a_1.json"), "").unwrap();
        fs::write(root.join("data_x/report.xml"), "").unwrap();

        fs::create_dir(root.join("data_y")).unwrap();
        fs::write(root.join("data_y/order_b_1.json"), "").unwrap();
        fs::write(root.join("data_y/order_b_2.JSON"), "").unwrap();

        fs::create_dir(root.join("empty_dir")).unwrap();
        // 名稱像 json 的目錄不應被收錄
        fs::create_dir(root.join("nested.json")).unwrap();
        fs::write(root.join("nested.json/order_c_1.Json"), "").unwrap();

        dir
    }

    fn file_names(paths: &[PathBuf]) -> HashSet<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_scan_finds_json_files_recursively() {
        let dir = setup_tree();
        let found = scan(dir.path()).unwrap();

        assert_eq!(found.len(), 6);
        let names = file_names(&found);
        for expected in [
            "order_root_1.json",
            "order_root_2.JSON",
            "order_a_1.json",
            "order_b_1.json",
            "order_b_2.JSON",
            "order_c_1.Json",
        ] {
            assert!(names.contains(expected), "missing {}", expected);
        }
        assert!(!names.contains("ignore.txt"));
        assert!(!names.contains("report.xml"));
        assert!(!names.contains("nested.json"));
        assert!(found.iter().all(|p| p.is_file()));
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        assert!(scan(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_scan_missing_root() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(matches!(
            scan(&missing),
            Err(StatError::DirectoryNotFoundError { .. })
        ));
    }

    #[test]
    fn test_scan_root_is_a_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("orders.json");
        fs::write(&file, "[]").unwrap();
        assert!(matches!(
            scan(&file),
            Err(StatError::DirectoryNotFoundError { .. })
        ));
    }
}
