//! Background worker for long travel-graph passes.
//!
//! Generation and pruning can take seconds. The worker runs them on the
//! blocking pool while bots keep routing: [`TravelNodeMap`] only takes its
//! write lock per node, never for a whole pass.
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use travel_graph::{FileNodeStore, GenerationReport, NodeId, PointOfInterest, TravelNodeMap};

use crate::error::{Result, RuntimeError};

/// Commands accepted by the maintenance worker.
pub enum Command {
    /// Seed nodes from points of interest and run a full generation pass.
    GenerateAll {
        points: Vec<PointOfInterest>,
        reply: oneshot::Sender<Result<GenerationReport>>,
    },
    /// Explore the neighbourhood of one node.
    LinkNode {
        node: NodeId,
        reply: oneshot::Sender<Result<usize>>,
    },
    /// Remove redundant nodes, then redundant links and leftover edges.
    CropUseless { reply: oneshot::Sender<Result<usize>> },
    /// Write the graph to the store.
    Save { reply: oneshot::Sender<Result<usize>> },
    Shutdown,
}

/// Owns the command receiver and runs one command at a time.
pub struct MaintenanceWorker {
    map: Arc<TravelNodeMap>,
    store: Arc<FileNodeStore>,
    command_rx: mpsc::Receiver<Command>,
}

impl MaintenanceWorker {
    pub fn new(map: Arc<TravelNodeMap>, store: Arc<FileNodeStore>, command_rx: mpsc::Receiver<Command>) -> Self {
        Self {
            map,
            store,
            command_rx,
        }
    }

    /// Main worker loop. Ends on `Shutdown` or when every handle is gone.
    pub async fn run(mut self) {
        while let Some(command) = self.command_rx.recv().await {
            if matches!(command, Command::Shutdown) {
                break;
            }
            self.handle_command(command).await;
        }
        info!(target: "runtime::maintenance", "maintenance worker stopped");
    }

    async fn handle_command(&self, command: Command) {
        match command {
            Command::GenerateAll { points, reply } => {
                let result = self
                    .blocking(move |map, _| {
                        let mut rng = StdRng::from_entropy();
                        Ok(map.generate_all(&points, &mut rng))
                    })
                    .await;
                let _ = reply.send(result);
            }
            Command::LinkNode { node, reply } => {
                let result = self.blocking(move |map, _| Ok(map.full_link_node(node))).await;
                let _ = reply.send(result);
            }
            Command::CropUseless { reply } => {
                let result = self
                    .blocking(|map, _| {
                        let nodes = map
                            .with_graph(|graph| graph.ids())
                            .into_iter()
                            .filter(|id| map.crop_useless_node(*id))
                            .count();
                        let paths = map.remove_useless_paths();
                        info!(target: "runtime::maintenance", nodes, paths, "graph cropped");
                        Ok(nodes + paths)
                    })
                    .await;
                let _ = reply.send(result);
            }
            Command::Save { reply } => {
                let result = self
                    .blocking(|map, store| map.save(store).map_err(RuntimeError::from))
                    .await;
                if let Err(error) = &result {
                    warn!(target: "runtime::maintenance", %error, "graph save failed");
                }
                let _ = reply.send(result);
            }
            Command::Shutdown => {}
        }
    }

    async fn blocking<T, F>(&self, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&TravelNodeMap, &FileNodeStore) -> Result<T> + Send + 'static,
    {
        let map = Arc::clone(&self.map);
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || job(&map, &store))
            .await
            .map_err(RuntimeError::WorkerJoin)?
    }
}

/// Cloneable client of the maintenance worker.
#[derive(Clone)]
pub struct MaintenanceHandle {
    command_tx: mpsc::Sender<Command>,
}

impl MaintenanceHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>) -> Self {
        Self { command_tx }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<Result<T>>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    pub async fn generate_all(&self, points: Vec<PointOfInterest>) -> Result<GenerationReport> {
        self.request(|reply| Command::GenerateAll { points, reply }).await
    }

    pub async fn link_node(&self, node: NodeId) -> Result<usize> {
        self.request(|reply| Command::LinkNode { node, reply }).await
    }

    pub async fn crop_useless(&self) -> Result<usize> {
        self.request(|reply| Command::CropUseless { reply }).await
    }

    pub async fn save(&self) -> Result<usize> {
        self.request(|reply| Command::Save { reply }).await
    }

    /// Ask the worker to stop after the commands already queued.
    pub async fn shutdown(&self) -> Result<()> {
        self.command_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }
}

/// Start the worker on the current runtime.
pub fn spawn_maintenance(
    map: Arc<TravelNodeMap>,
    store: Arc<FileNodeStore>,
    buffer: usize,
) -> (MaintenanceHandle, JoinHandle<()>) {
    let (command_tx, command_rx) = mpsc::channel(buffer.max(1));
    let worker = MaintenanceWorker::new(map, store, command_rx);
    let join = tokio::spawn(worker.run());
    (MaintenanceHandle::new(command_tx), join)
}
