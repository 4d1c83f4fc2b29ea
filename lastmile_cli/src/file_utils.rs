use std::path::{Path, PathBuf};

pub fn read_folder(folder_path: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder_path)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        } else if path.is_dir() {
            files.extend(read_folder(&path)?);
        }
    }

    files.sort();

    Ok(files)
}

/// The file itself, or every `.json` file below the folder.
pub fn json_files(path: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = read_folder(path)?;
    files.retain(|path| path.extension().map(|ext| ext == "json").unwrap_or(false));
    Ok(files)
}

pub fn output_path(folder: &Path, name: &str) -> PathBuf {
    folder.join(format!("{}.json", name))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_read_folder() {
        let folder = tempfile::tempdir().unwrap();
        let root = folder.path();
        fs::create_dir_all(root.join("subfolder1")).unwrap();
        fs::create_dir_all(root.join("subfolder2")).unwrap();
        fs::write(root.join("file1.json"), "{}").unwrap();
        fs::write(root.join("subfolder1/file2.json"), "{}").unwrap();
        fs::write(root.join("subfolder2/file3.txt"), "").unwrap();

        let files = read_folder(root).unwrap();
        assert_eq!(
            files,
            vec![
                root.join("file1.json"),
                root.join("subfolder1/file2.json"),
                root.join("subfolder2/file3.txt"),
            ]
        );

        assert_eq!(json_files(root).unwrap().len(), 2);
        assert_eq!(
            json_files(&root.join("file1.json")).unwrap(),
            vec![root.join("file1.json")]
        );
    }
}
