//! Real-time race loop driven by a tokio interval

use std::ops::ControlFlow;

use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;
use uuid::Uuid;

use crate::sim::controls::ControlFlags;
use crate::util::time::{
    tick_duration, tick_millis, Timer, DEFAULT_SNAPSHOT_RATE, DEFAULT_TICK_RATE,
};

use super::message::{ClientMsg, ServerMsg};
use super::snapshot::SnapshotBuilder;
use super::{Race, TickReport};

/// Loop settings for a [`RaceSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub tick_rate: u32,
    pub snapshot_rate: u32,
    /// Stop after this many ticks
    pub max_ticks: Option<u64>,
    /// Stop once every driver has finished
    pub stop_when_finished: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            snapshot_rate: DEFAULT_SNAPSHOT_RATE,
            max_ticks: None,
            stop_when_finished: true,
        }
    }
}

/// Why a session stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Finished,
    TickLimit,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub race_id: Uuid,
    pub ticks: u64,
    pub reason: EndReason,
    /// Wall-clock run time
    pub elapsed_ms: u64,
}

/// Handle to a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub race_id: Uuid,
    pub input_tx: mpsc::Sender<ClientMsg>,
    pub events_tx: broadcast::Sender<ServerMsg>,
}

impl SessionHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<ServerMsg> {
        self.events_tx.subscribe()
    }

    /// Queue a message; returns false once the session is gone
    pub async fn send(&self, msg: ClientMsg) -> bool {
        self.input_tx.send(msg).await.is_ok()
    }
}

/// Owns a [`Race`] and ticks it at a fixed rate.
///
/// Input is drained at the start of every tick; the last control message
/// wins and stays in effect until replaced.
pub struct RaceSession {
    race: Race,
    options: SessionOptions,
    input_rx: mpsc::Receiver<ClientMsg>,
    events_tx: broadcast::Sender<ServerMsg>,
    snapshot_builder: SnapshotBuilder,
    controls: ControlFlags,
    quit: bool,
}

impl RaceSession {
    pub fn new(race: Race, options: SessionOptions) -> (Self, SessionHandle) {
        let (input_tx, input_rx) = mpsc::channel(256);
        let (events_tx, _) = broadcast::channel(64);

        let handle = SessionHandle {
            race_id: race.id(),
            input_tx,
            events_tx: events_tx.clone(),
        };

        let session = Self {
            race,
            options,
            input_rx,
            events_tx,
            snapshot_builder: SnapshotBuilder::for_rates(options.tick_rate, options.snapshot_rate),
            controls: ControlFlags::NONE,
            quit: false,
        };

        (session, handle)
    }

    pub fn race(&self) -> &Race {
        &self.race
    }

    /// Run the tick loop until the race ends, the tick limit is hit or a
    /// quit message arrives
    pub async fn run(mut self) -> SessionSummary {
        info!(
            race_id = %self.race.id(),
            tick_rate = self.options.tick_rate,
            snapshot_rate = self.options.snapshot_rate,
            "Session started"
        );

        let timer = Timer::new();
        let mut tick_interval = interval(tick_duration(self.options.tick_rate));
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let reason = loop {
            tick_interval.tick().await;

            if let ControlFlow::Break(reason) = self.step() {
                break reason;
            }
        };

        let summary = SessionSummary {
            race_id: self.race.id(),
            ticks: self.race.tick_count(),
            reason,
            elapsed_ms: timer.elapsed_ms(),
        };

        info!(
            race_id = %summary.race_id,
            ticks = summary.ticks,
            reason = ?summary.reason,
            elapsed_ms = summary.elapsed_ms,
            "Session ended"
        );

        summary
    }

    /// Run one tick without waiting on the clock
    pub fn step(&mut self) -> ControlFlow<EndReason> {
        self.process_inputs();
        if self.quit {
            return ControlFlow::Break(EndReason::Quit);
        }

        let report = self
            .race
            .tick(tick_millis(self.options.tick_rate), self.controls);
        self.publish(&report);

        if self.options.stop_when_finished && self.race.is_active() && self.race.is_finished() {
            let _ = self.events_tx.send(ServerMsg::RaceFinished {
                race_id: self.race.id(),
                tick: report.tick,
            });
            return ControlFlow::Break(EndReason::Finished);
        }

        if self
            .options
            .max_ticks
            .is_some_and(|limit| self.race.tick_count() >= limit)
        {
            return ControlFlow::Break(EndReason::TickLimit);
        }

        ControlFlow::Continue(())
    }

    /// Drain pending input messages
    fn process_inputs(&mut self) {
        while let Ok(msg) = self.input_rx.try_recv() {
            match msg {
                ClientMsg::Input { controls } => {
                    self.controls = controls;
                }
                ClientMsg::Reset => {
                    self.race.reset();
                    self.controls = ControlFlags::NONE;
                    let _ = self.events_tx.send(ServerMsg::RaceReset {
                        race_id: self.race.id(),
                    });
                }
                ClientMsg::Quit => {
                    info!(race_id = %self.race.id(), "Quit requested");
                    self.quit = true;
                    return;
                }
            }
        }
    }

    fn publish(&mut self, report: &TickReport) {
        if report.started {
            let _ = self.events_tx.send(ServerMsg::RaceStarted {
                race_id: self.race.id(),
                tick: report.tick,
            });
            self.snapshot_builder.force_next();
        }

        for event in &report.navigation {
            let _ = self.events_tx.send(ServerMsg::Navigation {
                tick: report.tick,
                event: *event,
            });
        }

        for contact in &report.contacts {
            let _ = self.events_tx.send(ServerMsg::Contact {
                tick: report.tick,
                contact: *contact,
            });
        }

        if self.snapshot_builder.should_send() {
            let _ = self.events_tx.send(ServerMsg::Snapshot {
                snapshot: self.race.snapshot(),
            });
        }
    }
}
