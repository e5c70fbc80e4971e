use lodestar_api::{BoxError, DefinitionFormat};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use zip::write::SimpleFileOptions;

#[allow(dead_code)]
pub fn write_file(root: &Path, path: &str, bytes: &[u8]) {
    let file = root.join(path);
    std::fs::create_dir_all(file.parent().unwrap()).unwrap();
    std::fs::write(file, bytes).unwrap();
}

#[allow(dead_code)]
pub fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for (name, bytes) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}

/// Accepts everything, counting calls and the most calls seen at once.
#[allow(dead_code)]
#[derive(Default)]
pub struct CountingFormat {
    pub validations: AtomicUsize,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl CountingFormat {
    #[allow(dead_code)]
    pub fn count(&self) -> usize {
        self.validations.load(Ordering::SeqCst)
    }

    #[allow(dead_code)]
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl DefinitionFormat for CountingFormat {
    fn name(&self) -> &str {
        "counting"
    }

    fn validate(&self, _name: &str, _bytes: &[u8]) -> Result<(), BoxError> {
        self.validations.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        // Widen the race window for contention tests.
        std::thread::sleep(std::time::Duration::from_millis(20));
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}
