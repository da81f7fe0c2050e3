use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::geometry::mesh::TriangleMesh;
use crate::geometry::torus::TorusParams;

const RESULT_CAPACITY: usize = 2;

pub enum MeshCommand {
    Generate(TorusParams),
    Stop,
}

pub enum MeshResult {
    Mesh {
        mesh: TriangleMesh,
        params: TorusParams,
        elapsed: Duration,
    },
    Error(String),
}

pub struct MeshEngine {
    tx_cmd: Sender<MeshCommand>,
    rx_result: Receiver<MeshResult>,
    last_error: Arc<Mutex<Option<String>>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl MeshEngine {
    pub fn new() -> Self {
        let (tx_cmd, rx_cmd) = channel::unbounded::<MeshCommand>();
        let (tx_result, rx_result) = channel::bounded::<MeshResult>(RESULT_CAPACITY);
        let last_error = Arc::new(Mutex::new(None));
        let last_error_clone = Arc::clone(&last_error);

        let thread_handle = thread::Builder::new()
            .name("mesh-engine".into())
            .spawn(move || mesh_thread(rx_cmd, tx_result, last_error_clone))
            .map_err(|e| log::error!("failed to spawn mesh thread: {}", e))
            .ok();

        Self {
            tx_cmd,
            rx_result,
            last_error,
            thread_handle,
        }
    }

    pub fn generate(&self, params: TorusParams) {
        if self.tx_cmd.send(MeshCommand::Generate(params)).is_err() {
            *self.last_error.lock() = Some("mesh thread is not running".to_string());
        }
    }

    pub fn try_recv_result(&self) -> Option<MeshResult> {
        self.rx_result.try_recv().ok()
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    pub fn stop(&self) {
        let _ = self.tx_cmd.send(MeshCommand::Stop);
    }
}

impl Drop for MeshEngine {
    fn drop(&mut self) {
        let _ = self.tx_cmd.send(MeshCommand::Stop);
        // disconnect results so a worker blocked on a full channel can exit
        drop(std::mem::replace(&mut self.rx_result, channel::never()));
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

fn mesh_thread(
    rx_cmd: Receiver<MeshCommand>,
    tx_result: Sender<MeshResult>,
    last_error: Arc<Mutex<Option<String>>>,
) {
    while let Ok(cmd) = rx_cmd.recv() {
        let mut params = match cmd {
            MeshCommand::Generate(params) => params,
            MeshCommand::Stop => return,
        };

        // Only the newest request matters when several queue up.
        while let Ok(next) = rx_cmd.try_recv() {
            match next {
                MeshCommand::Generate(p) => params = p,
                MeshCommand::Stop => return,
            }
        }

        *last_error.lock() = None;

        let result = match build_mesh(params) {
            Ok((mesh, elapsed)) => {
                log::info!(
                    "generated torus R={} r={} {}x{}: {} vertices, {} triangles in {:.2?}",
                    params.major_radius,
                    params.minor_radius,
                    params.major_segments,
                    params.minor_segments,
                    mesh.vertex_count(),
                    mesh.triangle_count(),
                    elapsed
                );
                MeshResult::Mesh {
                    mesh,
                    params,
                    elapsed,
                }
            }
            Err(e) => {
                log::warn!("rejected torus parameters: {}", e);
                *last_error.lock() = Some(e.clone());
                MeshResult::Error(e)
            }
        };

        if tx_result.send(result).is_err() {
            return;
        }
    }
}

fn build_mesh(params: TorusParams) -> Result<(TriangleMesh, Duration), String> {
    let start = Instant::now();
    let tessellation = params.generate().map_err(|e| e.to_string())?;
    let mesh = TriangleMesh::from_tessellation(tessellation);
    Ok((mesh, start.elapsed()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_secs(10);

    fn wait_result(engine: &MeshEngine) -> MeshResult {
        engine
            .rx_result
            .recv_timeout(WAIT)
            .expect("mesh thread produced no result")
    }

    #[test]
    fn generates_mesh_off_thread() {
        let engine = MeshEngine::new();
        let params = TorusParams {
            major_segments: 8,
            minor_segments: 6,
            ..TorusParams::default()
        };

        engine.generate(params);

        match wait_result(&engine) {
            MeshResult::Mesh {
                mesh, params: p, ..
            } => {
                assert_eq!(p, params);
                assert_eq!(mesh.vertex_count(), 48);
                assert_eq!(mesh.triangle_count(), 96);
                assert_eq!(mesh.normals.len(), 48);
            }
            MeshResult::Error(e) => panic!("unexpected error: {}", e),
        }
        assert_eq!(engine.last_error(), None);
    }

    #[test]
    fn invalid_params_report_error() {
        let engine = MeshEngine::new();
        engine.generate(TorusParams {
            major_segments: 2,
            ..TorusParams::default()
        });

        match wait_result(&engine) {
            MeshResult::Error(e) => assert!(e.contains("major_segments"), "{}", e),
            MeshResult::Mesh { .. } => panic!("expected an error"),
        }

        let stored = engine.last_error().expect("error is remembered");
        assert!(stored.contains("major_segments"));
    }

    #[test]
    fn next_request_clears_last_error() {
        let engine = MeshEngine::new();
        engine.generate(TorusParams {
            minor_radius: -1.0,
            ..TorusParams::default()
        });
        assert!(matches!(wait_result(&engine), MeshResult::Error(_)));

        engine.generate(TorusParams::default());
        assert!(matches!(wait_result(&engine), MeshResult::Mesh { .. }));
        assert_eq!(engine.last_error(), None);
    }

    fn wait_until(mut ready: impl FnMut() -> bool) {
        let deadline = Instant::now() + WAIT;
        while !ready() {
            assert!(Instant::now() < deadline, "timed out");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn drop_with_unread_results_does_not_hang() {
        let engine = MeshEngine::new();
        let params = TorusParams {
            major_segments: 4,
            minor_segments: 4,
            ..TorusParams::default()
        };

        engine.generate(params);
        wait_until(|| engine.rx_result.len() == 1);
        engine.generate(params);
        wait_until(|| engine.rx_result.len() == RESULT_CAPACITY);
        // third result has nowhere to go, so the worker blocks on send
        engine.generate(params);
        thread::sleep(Duration::from_millis(50));

        let (done_tx, done_rx) = channel::bounded(1);
        thread::spawn(move || {
            drop(engine);
            let _ = done_tx.send(());
        });

        assert!(done_rx.recv_timeout(WAIT).is_ok(), "drop never returned");
    }

    #[test]
    fn stop_ends_the_worker() {
        let mut engine = MeshEngine::new();
        engine.stop();

        let handle = engine.thread_handle.take().expect("thread was spawned");
        handle.join().expect("mesh thread exits cleanly");
    }
}
