#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use xml_compare::ComparisonManager;

/// Temporary base directory with `old/` and `new/` folders
pub struct CompareFixture {
    pub temp_dir: TempDir,
}

impl CompareFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        fs::create_dir_all(temp_dir.path().join("old")).expect("failed to create old/");
        fs::create_dir_all(temp_dir.path().join("new")).expect("failed to create new/");
        Self { temp_dir }
    }

    pub fn base_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn old_path(&self, name: &str) -> PathBuf {
        self.base_dir().join("old").join(name)
    }

    pub fn new_path(&self, name: &str) -> PathBuf {
        self.base_dir().join("new").join(name)
    }

    pub fn write_old(&self, name: &str, xml: &str) {
        fs::write(self.old_path(name), xml).expect("failed to write old file");
    }

    pub fn write_new(&self, name: &str, xml: &str) {
        fs::write(self.new_path(name), xml).expect("failed to write new file");
    }

    /// Write the same file name into both `old/` and `new/`
    pub fn write_pair(&self, name: &str, old_xml: &str, new_xml: &str) {
        self.write_old(name, old_xml);
        self.write_new(name, new_xml);
    }

    pub fn write_config(&self, name: &str, content: &str) -> PathBuf {
        let path = self.base_dir().join(name);
        fs::write(&path, content).expect("failed to write config");
        path
    }

    pub fn manager(&self) -> ComparisonManager {
        ComparisonManager::new(self.base_dir())
    }
}

/// A larger document with `count` items under `root/items`, for realistic runs
pub fn catalog_xml(ids: impl IntoIterator<Item = usize>) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<root>\n  <items>\n");
    for id in ids {
        xml.push_str(&format!(
            "    <item id=\"{}\" kind=\"k{}\">value {}</item>\n",
            id,
            id % 3,
            id
        ));
    }
    xml.push_str("  </items>\n</root>\n");
    xml
}
