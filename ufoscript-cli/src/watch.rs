//! Re-run a check whenever one of the watched scripts changes

use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// Block forever, calling `on_change` with every watched file that was
/// modified. Parent directories are watched so editors that replace the
/// file on save are still seen.
pub fn watch_files(
    files: &[PathBuf],
    mut on_change: impl FnMut(&Path),
) -> Result<(), Box<dyn Error>> {
    let watched: Vec<PathBuf> = files
        .iter()
        .map(|f| f.canonicalize())
        .collect::<Result<_, _>>()?;

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res| {
        // Receiver is gone during shutdown
        let _ = tx.send(res);
    })?;

    let dirs: BTreeSet<&Path> = watched.iter().filter_map(|f| f.parent()).collect();
    for dir in dirs {
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        tracing::debug!(dir = %dir.display(), "watching");
    }

    while let Ok(first) = rx.recv() {
        // Editors emit bursts of events for one save
        let mut changed = BTreeSet::new();
        for event in std::iter::once(first).chain(rx.try_iter()) {
            match event {
                Ok(Event {
                    kind: EventKind::Modify(_) | EventKind::Create(_),
                    paths,
                    ..
                }) => {
                    for (index, file) in watched.iter().enumerate() {
                        if paths.iter().any(|p| p == file) {
                            changed.insert(index);
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "file watcher error"),
            }
        }

        for index in changed {
            tracing::info!(file = %files[index].display(), "file changed");
            on_change(&files[index]);
        }
    }

    Ok(())
}
