//! Streaming Loop
//!
//! AwaitingConnection -> Streaming -> Closed.
//!
//! - Binds the loopback endpoint with backlog 1 and accepts exactly one peer.
//!   The accept has no timeout; only a stop request ends the wait.
//! - Every tick: copy state -> analyse -> frame -> write. The first snapshot
//!   goes out as soon as the peer connects.
//! - Stops at a tick boundary when the running flag is down, or as soon as a
//!   write fails (peer gone). Nothing is retried.
//! - Both sockets are released on every exit path.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::constants::LISTEN_BACKLOG;
use crate::error::{AppError, AppResult};
use crate::logic::analysis::Analyzer;
use crate::logic::commands::{self, CommandLine};
use crate::logic::sensor::AirQualityAlert;
use crate::logic::snapshot::encode_frame;
use crate::logic::state::SharedState;

/// Why streaming ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// Running flag was cleared (quit / Ctrl-C)
    Stopped { ticks: u64 },
    /// A write to the peer failed
    PeerDisconnected { ticks: u64, reason: String },
}

impl StreamOutcome {
    pub fn ticks(&self) -> u64 {
        match self {
            StreamOutcome::Stopped { ticks } => *ticks,
            StreamOutcome::PeerDisconnected { ticks, .. } => *ticks,
        }
    }
}

// ============================================================================
// SERVER
// ============================================================================

/// Bind the listening socket (SO_REUSEADDR, backlog 1)
pub fn bind(addr: SocketAddr) -> AppResult<TcpListener> {
    let bind_err = |source| AppError::Bind { addr, source };

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()
    } else {
        TcpSocket::new_v6()
    }
    .map_err(bind_err)?;

    socket.set_reuseaddr(true).map_err(bind_err)?;
    socket.bind(addr).map_err(bind_err)?;
    socket.listen(LISTEN_BACKLOG).map_err(bind_err)
}

/// Serve one peer on an already bound listener.
///
/// The listener is owned here and closed when this returns, whatever the
/// outcome. `peer_commands`, when set, receives command lines the peer sends.
pub async fn serve(
    listener: TcpListener,
    state: SharedState,
    analyzer: &Analyzer,
    period: Duration,
    peer_commands: Option<mpsc::Sender<CommandLine>>,
) -> AppResult<StreamOutcome> {
    let local = listener.local_addr()?;
    let result = serve_one_peer(&listener, state, analyzer, period, peer_commands).await;

    drop(listener);
    info!(addr = %local, "listening socket closed");

    result
}

async fn serve_one_peer(
    listener: &TcpListener,
    state: SharedState,
    analyzer: &Analyzer,
    period: Duration,
    peer_commands: Option<mpsc::Sender<CommandLine>>,
) -> AppResult<StreamOutcome> {
    info!(addr = %listener.local_addr()?, "Waiting for client connection...");

    let (stream, peer) = tokio::select! {
        accepted = listener.accept() => accepted.map_err(AppError::Accept)?,
        _ = state.wait_stopped() => {
            info!("stop requested before a client connected");
            return Ok(StreamOutcome::Stopped { ticks: 0 });
        }
    };
    if let Err(e) = stream.set_nodelay(true) {
        debug!("set_nodelay failed: {}", e);
    }
    info!(peer = %peer, "Client connected, streaming status");
    commands::announce_commands();

    let (read_half, mut write_half) = stream.into_split();
    let peer_reader =
        peer_commands.map(|tx| tokio::spawn(commands::forward_peer_commands(read_half, tx)));

    let result = stream_snapshots(&mut write_half, &state, analyzer, period).await;

    if let Some(task) = peer_reader {
        task.abort();
    }
    if matches!(result, Ok(StreamOutcome::Stopped { .. })) {
        // Graceful FIN for a peer that is still there
        let _ = write_half.shutdown().await;
    }
    drop(write_half);
    info!(peer = %peer, "connection closed");

    result
}

// ============================================================================
// TICK LOOP
// ============================================================================

/// Write one snapshot per tick until stopped or the writer fails
pub async fn stream_snapshots<W>(
    writer: &mut W,
    state: &SharedState,
    analyzer: &Analyzer,
    period: Duration,
) -> AppResult<StreamOutcome>
where
    W: AsyncWrite + Unpin,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut ticks: u64 = 0;
    let mut last_air_quality: Vec<AirQualityAlert> = Vec::new();
    let mut last_alert = String::new();
    let mut forecast_failing = false;

    loop {
        interval.tick().await;

        let current = state.snapshot();
        if !current.running {
            info!(ticks, "stop requested, closing stream");
            return Ok(StreamOutcome::Stopped { ticks });
        }

        let analysis = analyzer.analyze(&current);

        match (&analysis.forecast_error, forecast_failing) {
            (Some(e), false) => warn!("forecast failed, sending sentinel: {}", e),
            (None, true) => info!("forecast recovered"),
            _ => {}
        }
        forecast_failing = analysis.forecast_error.is_some();

        if analysis.air_quality != last_air_quality {
            for alert in &analysis.air_quality {
                warn!(alert = %alert, "{}", alert.response());
            }
            last_air_quality = analysis.air_quality.clone();
        }

        if analysis.assessment.alert_message != last_alert {
            info!(
                alert = %analysis.assessment.alert_message,
                action = %analysis.assessment.action_plan,
                "alert changed"
            );
            if let Some(decision) = &analysis.assessment.decision {
                info!(
                    category = %decision.category,
                    priority = decision.priority,
                    follow_ups = ?decision.follow_up_actions,
                    resources = ?decision.resources,
                    "decision table response"
                );
            }
            last_alert = analysis.assessment.alert_message.clone();
        }

        let frame = encode_frame(&analysis.snapshot)?;
        match write_frame(writer, &frame).await {
            Ok(()) => {}
            Err(e) if e.is_disconnect() => {
                info!(ticks, "peer disconnected: {}", e);
                return Ok(StreamOutcome::PeerDisconnected {
                    ticks,
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }

        ticks += 1;
        debug!(
            tick = ticks,
            level = %current.level,
            alert = %analysis.snapshot.alert_message,
            prediction_water = analysis.snapshot.prediction_water,
            forecast_failed = analysis.snapshot.forecast_failed(),
            "snapshot sent"
        );
    }
}

async fn write_frame<W>(writer: &mut W, frame: &[u8]) -> AppResult<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(frame).await.map_err(AppError::PeerWrite)?;
    writer.flush().await.map_err(AppError::PeerWrite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::analysis::ForecastBaseline;
    use crate::logic::forecast::{ForecastError, Forecaster};
    use crate::logic::sensor::AirQualityThresholds;
    use crate::logic::snapshot::decode_frame;
    use crate::logic::state::{HabitatState, ScenarioCommand};
    use crate::logic::snapshot::StatusSnapshot;
    use crate::logic::state::NORMAL_READING;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::TcpStream;

    struct FixedForecaster(f64);

    impl Forecaster for FixedForecaster {
        fn forecast(
            &self,
            _: u32,
            _: u32,
            _: u8,
            _: f64,
            horizon: usize,
        ) -> Result<Vec<f64>, ForecastError> {
            Ok(vec![self.0; horizon])
        }
    }

    /// Always fails; requests a stop after `stop_after` calls
    struct FailingForecaster {
        calls: AtomicUsize,
        stop_after: usize,
        state: SharedState,
    }

    impl Forecaster for FailingForecaster {
        fn forecast(
            &self,
            _: u32,
            _: u32,
            _: u8,
            _: f64,
            _: usize,
        ) -> Result<Vec<f64>, ForecastError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) + 1 >= self.stop_after {
                self.state.stop();
            }
            Err(ForecastError::Degenerate("solver diverged".to_string()))
        }
    }

    fn analyzer() -> Analyzer {
        Analyzer::new(
            AirQualityThresholds::default(),
            ForecastBaseline {
                current_day: 100,
                population: 50,
                activity_level: 1.0,
            },
            Arc::new(FixedForecaster(250.0)),
        )
    }

    const PERIOD: Duration = Duration::from_millis(20);

    fn loopback() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    #[tokio::test]
    async fn test_write_failure_ends_stream() {
        let analyzer = analyzer();
        let state = SharedState::default();
        let first = encode_frame(&analyzer.analyze(&HabitatState::default()).snapshot).unwrap();

        let mut peer = tokio_test::io::Builder::new()
            .write(&first)
            .write_error(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"))
            .build();

        let outcome = stream_snapshots(&mut peer, &state, &analyzer, PERIOD).await.unwrap();
        match outcome {
            StreamOutcome::PeerDisconnected { ticks, reason } => {
                assert_eq!(ticks, 1);
                assert!(reason.contains("peer gone"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_forecast_failure_streams_sentinel_frames() {
        let state = SharedState::default();
        let analyzer = Analyzer::new(
            AirQualityThresholds::default(),
            ForecastBaseline {
                current_day: 100,
                population: 50,
                activity_level: 1.0,
            },
            Arc::new(FailingForecaster {
                calls: AtomicUsize::new(0),
                stop_after: 3,
                state: state.clone(),
            }),
        );

        let sentinel = encode_frame(&StatusSnapshot {
            sensor: NORMAL_READING,
            alert_message: "SYSTEM NORMAL".to_string(),
            action_plan: "MONITORING".to_string(),
            prediction_water: -1.0,
            mode: "n".to_string(),
        })
        .unwrap();

        // Exactly three frames, all carrying the sentinel, then a clean stop
        let mut peer = tokio_test::io::Builder::new()
            .write(&sentinel)
            .write(&sentinel)
            .write(&sentinel)
            .build();

        let outcome = stream_snapshots(&mut peer, &state, &analyzer, PERIOD).await.unwrap();
        assert_eq!(outcome, StreamOutcome::Stopped { ticks: 3 });
    }

    #[tokio::test]
    async fn test_stopped_state_sends_nothing() {
        let state = SharedState::default();
        state.stop();

        let mut peer = tokio_test::io::Builder::new().build();
        let outcome = stream_snapshots(&mut peer, &state, &analyzer(), PERIOD).await.unwrap();
        assert_eq!(outcome, StreamOutcome::Stopped { ticks: 0 });
    }

    #[tokio::test]
    async fn test_bind_conflict_is_bind_error() {
        let first = bind(loopback()).unwrap();
        let addr = first.local_addr().unwrap();

        match bind(addr) {
            Err(AppError::Bind { addr: failed, .. }) => assert_eq!(failed, addr),
            other => panic!("expected bind error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_stop_while_awaiting_connection() {
        let listener = bind(loopback()).unwrap();
        let addr = listener.local_addr().unwrap();
        let state = SharedState::default();

        let server = {
            let state = state.clone();
            tokio::spawn(async move {
                let analyzer = analyzer();
                serve(listener, state, &analyzer, PERIOD, None).await
            })
        };

        tokio::time::sleep(PERIOD).await;
        state.stop();

        let outcome = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("server kept waiting after stop")
            .unwrap()
            .unwrap();
        assert_eq!(outcome, StreamOutcome::Stopped { ticks: 0 });

        // Listener released
        drop(bind(addr).unwrap());
    }

    #[tokio::test]
    async fn test_quit_closes_connection() {
        let listener = bind(loopback()).unwrap();
        let addr = listener.local_addr().unwrap();
        let state = SharedState::default();

        let server = {
            let state = state.clone();
            tokio::spawn(async move {
                let analyzer = analyzer();
                serve(listener, state, &analyzer, PERIOD, None).await
            })
        };

        let client = TcpStream::connect(addr).await.unwrap();
        let mut lines = BufReader::new(client).lines();
        let first = decode_frame(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(first.alert_message, "SYSTEM NORMAL");
        assert_eq!(first.prediction_water, 250.0);

        state.apply(ScenarioCommand::Quit);

        // Drain until the server closes its side
        let closed = tokio::time::timeout(Duration::from_secs(5), async {
            while let Ok(Some(_)) = lines.next_line().await {}
        })
        .await;
        assert!(closed.is_ok(), "server did not close the connection");

        let outcome = server.await.unwrap().unwrap();
        assert!(matches!(outcome, StreamOutcome::Stopped { .. }));
    }

    #[tokio::test]
    async fn test_repeated_cycles_release_sockets() {
        let port = bind(loopback()).unwrap().local_addr().unwrap().port();
        let addr: SocketAddr = format!("127.0.0.1:{}", port).parse().unwrap();

        for cycle in 0..3 {
            // Fails with AddrInUse if the previous cycle leaked its listener
            let listener = bind(addr).unwrap_or_else(|e| panic!("cycle {}: {}", cycle, e));
            let state = SharedState::default();
            let server = tokio::spawn(async move {
                let analyzer = analyzer();
                serve(listener, state, &analyzer, PERIOD, None).await
            });

            let client = TcpStream::connect(addr).await.unwrap();
            let mut lines = BufReader::new(client).lines();
            assert!(lines.next_line().await.unwrap().is_some());
            drop(lines);

            let outcome = tokio::time::timeout(Duration::from_secs(5), server)
                .await
                .expect("server did not notice the disconnect")
                .unwrap()
                .unwrap();
            assert!(
                matches!(outcome, StreamOutcome::PeerDisconnected { .. }),
                "cycle {}: {:?}",
                cycle,
                outcome
            );
        }
    }
}
