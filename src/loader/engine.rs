use crossbeam::channel::{self, Receiver, Sender};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crate::geometry::TriangleMesh;
use crate::loader::obj::load_obj;

pub enum LoadCommand {
    Load(PathBuf),
    Stop,
}

pub enum LoadOutcome {
    Loaded { path: PathBuf, mesh: TriangleMesh },
    Failed { path: PathBuf, error: String },
}

/// Loads model files on a background thread. Each request is attempted
/// once; the outcome is polled from the render loop.
pub struct MeshLoader {
    tx_cmd: Sender<LoadCommand>,
    rx_result: Receiver<LoadOutcome>,
    loading: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl MeshLoader {
    pub fn new() -> Self {
        let (tx_cmd, rx_cmd) = channel::unbounded::<LoadCommand>();
        let (tx_result, rx_result) = channel::bounded::<LoadOutcome>(2);
        let loading = Arc::new(AtomicBool::new(false));

        let loading_clone = Arc::clone(&loading);

        let thread_handle = thread::Builder::new()
            .name("mesh-loader".into())
            .spawn(move || loader_thread(rx_cmd, tx_result, loading_clone))
            .map_err(|e| log::error!("failed to spawn mesh loader thread: {e}"))
            .ok();

        Self {
            tx_cmd,
            rx_result,
            loading,
            thread_handle,
        }
    }

    pub fn load(&self, path: impl Into<PathBuf>) {
        self.loading.store(true, Ordering::Relaxed);
        let _ = self.tx_cmd.send(LoadCommand::Load(path.into()));
    }

    pub fn try_recv_result(&self) -> Option<LoadOutcome> {
        self.rx_result.try_recv().ok()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Relaxed)
    }

    pub fn stop(&self) {
        let _ = self.tx_cmd.send(LoadCommand::Stop);
    }
}

impl Drop for MeshLoader {
    fn drop(&mut self) {
        let _ = self.tx_cmd.send(LoadCommand::Stop);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

fn loader_thread(
    rx_cmd: Receiver<LoadCommand>,
    tx_result: Sender<LoadOutcome>,
    loading: Arc<AtomicBool>,
) {
    loop {
        let cmd = match rx_cmd.recv() {
            Ok(c) => c,
            Err(_) => return,
        };

        match cmd {
            LoadCommand::Load(path) => {
                let outcome = match load_obj(&path) {
                    Ok(mesh) => LoadOutcome::Loaded { path, mesh },
                    Err(e) => LoadOutcome::Failed {
                        path,
                        error: e.to_string(),
                    },
                };

                loading.store(false, Ordering::Relaxed);
                if tx_result.send(outcome).is_err() {
                    return;
                }
            }
            LoadCommand::Stop => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn wait(loader: &MeshLoader) -> LoadOutcome {
        loader
            .rx_result
            .recv_timeout(Duration::from_secs(5))
            .expect("loader did not answer")
    }

    #[test]
    fn test_missing_file_reports_failure() {
        let loader = MeshLoader::new();
        loader.load("/no/such/dir/sphere.obj");

        match wait(&loader) {
            LoadOutcome::Failed { path, error } => {
                assert_eq!(path, PathBuf::from("/no/such/dir/sphere.obj"));
                assert!(error.contains("IO error"));
            }
            LoadOutcome::Loaded { .. } => panic!("expected failure"),
        }
        assert!(!loader.is_loading());
    }

    #[test]
    fn test_loads_file_from_disk() {
        let path = std::env::temp_dir().join(format!("surfview-loader-{}.obj", std::process::id()));
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let loader = MeshLoader::new();
        loader.load(&path);
        let outcome = wait(&loader);
        let _ = std::fs::remove_file(&path);

        match outcome {
            LoadOutcome::Loaded { mesh, .. } => assert_eq!(mesh.triangle_count(), 1),
            LoadOutcome::Failed { error, .. } => panic!("load failed: {error}"),
        }
    }
}
