use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Write `bytes` to `path` through a `.part` sibling and rename it into place,
/// replacing any previous artifact.
pub fn write_artifact(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("part");
    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_artifact_overwrites_in_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("model.onnx");
        write_artifact(&path, b"first").unwrap();
        write_artifact(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert!(!path.with_extension("part").exists());
        let entries = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
