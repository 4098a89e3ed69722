//! Native host: runs a [`ForceSimulator`] on its own tokio task.
//!
//! Control flows in over an unbounded command channel and snapshots flow out
//! over a [`PositionChannel`]; neither side ever waits on the other. Commands
//! are applied between ticks, so a reset or a new graph never observes a
//! half-finished tick.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::channel::{PositionChannel, PositionReceiver};
use crate::error::LayoutError;
use crate::graph::Edge;
use crate::layout::{ForceSimulator, ParamsPatch, SimulationParameters, SimulatorStats};

type Reply<T> = oneshot::Sender<Result<T, LayoutError>>;

enum Command {
    Init {
        node_count: usize,
        edges: Vec<Edge>,
        reply: Reply<()>,
    },
    SetGraph {
        node_count: usize,
        edges: Vec<Edge>,
        reply: Reply<()>,
    },
    Pause,
    Resume,
    Reset,
    Tune {
        patch: ParamsPatch,
        reply: Reply<()>,
    },
    Stats(oneshot::Sender<SimulatorStats>),
    Subscribe(oneshot::Sender<PositionReceiver>),
    Shutdown,
}

/// Cloneable control handle for a running simulator task.
#[derive(Clone)]
pub struct SimulatorHandle {
    commands: mpsc::UnboundedSender<Command>,
}

/// Start a simulator task on the current tokio runtime.
///
/// Returns the control handle and a first position receiver. The task ends
/// on [`SimulatorHandle::shutdown`] or once every handle is dropped.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
pub fn spawn(
    params: SimulationParameters,
) -> Result<(SimulatorHandle, PositionReceiver), LayoutError> {
    let simulator = ForceSimulator::new(params)?;
    let channel = PositionChannel::new();
    let receiver = channel.subscribe();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(run(simulator, rx, channel));
    info!(
        tick_interval_ms = params.tick_interval_ms,
        publish_interval_ms = params.publish_interval_ms,
        "Simulator task spawned"
    );

    Ok((SimulatorHandle { commands: tx }, receiver))
}

impl SimulatorHandle {
    fn send(&self, command: Command) -> Result<(), LayoutError> {
        self.commands
            .send(command)
            .map_err(|_| LayoutError::SimulatorStopped)
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, LayoutError> {
        let (reply, response) = oneshot::channel();
        self.send(make(reply))?;
        response.await.map_err(|_| LayoutError::SimulatorStopped)?
    }

    /// Load a graph and start ticking.
    pub async fn init(&self, node_count: usize, edges: Vec<Edge>) -> Result<(), LayoutError> {
        self.request(|reply| Command::Init {
            node_count,
            edges,
            reply,
        })
        .await
    }

    /// Load a graph without changing the run state.
    pub async fn set_graph(&self, node_count: usize, edges: Vec<Edge>) -> Result<(), LayoutError> {
        self.request(|reply| Command::SetGraph {
            node_count,
            edges,
            reply,
        })
        .await
    }

    /// Halt ticking and publishing.
    pub fn pause(&self) -> Result<(), LayoutError> {
        self.send(Command::Pause)
    }

    /// Continue ticking.
    pub fn resume(&self) -> Result<(), LayoutError> {
        self.send(Command::Resume)
    }

    /// Re-scatter positions.
    pub fn reset(&self) -> Result<(), LayoutError> {
        self.send(Command::Reset)
    }

    /// Merge a parameter patch; rejected patches change nothing.
    pub async fn tune(&self, patch: ParamsPatch) -> Result<(), LayoutError> {
        self.request(|reply| Command::Tune { patch, reply }).await
    }

    /// Current simulator counters.
    pub async fn stats(&self) -> Result<SimulatorStats, LayoutError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Stats(reply))?;
        response.await.map_err(|_| LayoutError::SimulatorStopped)
    }

    /// A new receiver that sees snapshots published from now on.
    pub async fn subscribe(&self) -> Result<PositionReceiver, LayoutError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Subscribe(reply))?;
        response.await.map_err(|_| LayoutError::SimulatorStopped)
    }

    /// Stop the task. Receivers then drain to `None`.
    pub fn shutdown(&self) -> Result<(), LayoutError> {
        self.send(Command::Shutdown)
    }
}

fn ticker(params: &SimulationParameters) -> Interval {
    let mut interval = time::interval(Duration::from_millis(params.tick_interval_ms));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn run(
    mut simulator: ForceSimulator,
    mut commands: mpsc::UnboundedReceiver<Command>,
    channel: PositionChannel,
) {
    let started = Instant::now();
    let mut interval = ticker(simulator.params());

    loop {
        tokio::select! {
            biased;

            command = commands.recv() => {
                let Some(command) = command else {
                    break;
                };
                let tick_interval = simulator.params().tick_interval_ms;
                match command {
                    Command::Init { node_count, edges, reply } => {
                        let _ = reply.send(simulator.init(node_count, edges));
                    }
                    Command::SetGraph { node_count, edges, reply } => {
                        let _ = reply.send(simulator.set_graph(node_count, edges));
                    }
                    Command::Pause => simulator.pause(),
                    Command::Resume => simulator.resume(),
                    Command::Reset => simulator.reset(),
                    Command::Tune { patch, reply } => {
                        let result = simulator.tune(&patch);
                        if let Err(e) = &result {
                            warn!(error = %e, "Rejected parameter patch");
                        }
                        let _ = reply.send(result);
                    }
                    Command::Stats(reply) => {
                        let _ = reply.send(simulator.stats());
                    }
                    Command::Subscribe(reply) => {
                        let _ = reply.send(channel.subscribe());
                    }
                    Command::Shutdown => break,
                }
                if simulator.params().tick_interval_ms != tick_interval {
                    interval = ticker(simulator.params());
                }
            }

            _ = interval.tick() => {
                let now_ms = started.elapsed().as_secs_f64() * 1000.0;
                if let Some(snapshot) = simulator.advance(now_ms) {
                    channel.publish(snapshot);
                }
            }
        }
    }

    let stats = simulator.stats();
    info!(
        ticks = stats.ticks,
        faults = stats.faults,
        snapshots = stats.snapshots,
        "Simulator task stopped"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::RunState;

    async fn count_snapshots(rx: &mut PositionReceiver, window: Duration) -> usize {
        let deadline = Instant::now() + window;
        let mut count = 0;
        while let Ok(Some(_)) = time::timeout_at(deadline, rx.recv()).await {
            count += 1;
        }
        count
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_cadence() {
        let (handle, mut rx) = spawn(SimulationParameters::default()).unwrap();
        handle.init(50, vec![Edge::new(1, 2, 1.0)]).await.unwrap();

        let count = count_snapshots(&mut rx, Duration::from_secs(1)).await;
        assert!((24..=36).contains(&count), "{count} snapshots in 1s");

        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.len(), 50);
        assert_eq!(snapshot.epoch, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_stops_publishing() {
        let (handle, mut rx) = spawn(SimulationParameters::default()).unwrap();
        handle.init(10, vec![]).await.unwrap();
        assert!(count_snapshots(&mut rx, Duration::from_millis(200)).await > 0);

        handle.pause().unwrap();
        let paused = handle.stats().await.unwrap();
        assert_eq!(paused.state, RunState::Paused);
        assert_eq!(count_snapshots(&mut rx, Duration::from_millis(500)).await, 0);
        assert_eq!(handle.stats().await.unwrap().ticks, paused.ticks);

        handle.resume().unwrap();
        assert!(count_snapshots(&mut rx, Duration::from_millis(200)).await > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_come_back_to_caller() {
        let (handle, _rx) = spawn(SimulationParameters::default()).unwrap();
        assert!(matches!(
            handle.init(0, vec![]).await,
            Err(LayoutError::NodeCount { count: 0 })
        ));

        let bad = ParamsPatch {
            damping: Some(2.0),
            ..Default::default()
        };
        assert!(handle.tune(bad).await.is_err());

        let good = ParamsPatch {
            tick_interval_ms: Some(8),
            ..Default::default()
        };
        assert!(handle.tune(good).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_subscriber_and_shutdown() {
        let (handle, _first) = spawn(SimulationParameters::default()).unwrap();
        handle.init(5, vec![]).await.unwrap();
        time::sleep(Duration::from_millis(100)).await;

        let mut late = handle.subscribe().await.unwrap();
        assert!(late.try_recv().is_none());
        let next = late.recv().await.unwrap();
        assert_eq!(next.len(), 5);

        handle.shutdown().unwrap();
        assert!(late.recv().await.is_none());
        assert!(matches!(handle.stats().await, Err(LayoutError::SimulatorStopped)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_graph_bumps_epoch() {
        let (handle, _first) = spawn(SimulationParameters::default()).unwrap();
        handle.init(5, vec![]).await.unwrap();
        handle.set_graph(7, vec![Edge::new(1, 7, 1.0)]).await.unwrap();
        handle.reset().unwrap();

        let mut rx = handle.subscribe().await.unwrap();
        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.epoch, 2);
        assert_eq!(snapshot.len(), 7);
        assert_eq!(handle.stats().await.unwrap().edge_count, 1);
    }
}
