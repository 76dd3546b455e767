use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;

/// Serializes `value` as TOML, creating the parent directories of `path` if needed.
pub fn write_toml<P: Into<PathBuf>, T: Serialize>(path: P, value: &T) -> anyhow::Result<()> {
    let path = path.into();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs_err::create_dir_all(parent)?;
    }
    let text = toml::to_string_pretty(value)
        .with_context(|| format!("While serializing {}", std::any::type_name::<T>()))?;
    fs_err::write(&path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::write_toml;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        ids: Vec<u32>,
    }

    #[test]
    fn write_creates_directories() {
        let dir = std::env::temp_dir().join(format!("tv-grab-utils-{}", std::process::id()));
        let path = dir.join("nested").join("sample.toml");
        let value = Sample {
            name: "NRK1".to_owned(),
            ids: vec![1, 2],
        };
        write_toml(&path, &value).unwrap();
        let read: Sample = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read, value);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
