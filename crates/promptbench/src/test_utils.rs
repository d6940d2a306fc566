use crate::config::WorkbenchConfig;
use crate::model::version_file_name;
use crate::store::mem_files::MemFileStore;
use crate::store::mem_local::MemObjectStore;
use crate::workbench::Workbench;

pub type MemWorkbench = Workbench<MemObjectStore, MemFileStore>;

/// A workbench over the in-memory backends with default settings.
pub fn mem_workbench() -> MemWorkbench {
    Workbench::new(
        MemObjectStore::new(),
        MemFileStore::new(),
        &WorkbenchConfig::default(),
    )
}

/// A workbench whose File Store already holds `<name>_v1.md`, `<name>_v2.md`, …
pub fn workbench_with_files(name: &str, contents: &[&str]) -> MemWorkbench {
    let wb = mem_workbench();
    for (idx, content) in contents.iter().enumerate() {
        wb.files()
            .put_file(name, &version_file_name(name, idx as u32 + 1), content);
    }
    wb
}
