//! Fixed-rate simulation thread.
//!
//! The thread owns the [`Player`] and the held [`ControlFlags`]. The render
//! loop talks to it only through a bounded action queue and reads back the
//! latest published [`Pose`].

use crate::player::Player;
use crate::sim::{self, Tuning};
use mazeview_common::{Action, ControlFlags, Pose, ViewerConfig};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Errors from driving the simulation thread.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("failed to spawn simulation thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("simulation thread is no longer running")]
    Stopped,
    #[error("simulation thread panicked")]
    Panicked,
}

enum Message {
    Act(Action),
    Quit,
}

/// State the simulation thread publishes for readers.
#[derive(Debug, Default)]
struct Published {
    pose: RwLock<Pose>,
    ticks: AtomicU64,
}

impl Published {
    fn store(&self, pose: Pose) {
        *self.pose.write().unwrap_or_else(PoisonError::into_inner) = pose;
    }
}

/// Handle to the running simulation thread.
///
/// Dropping the handle stops and joins the thread.
pub struct Simulation {
    sender: SyncSender<Message>,
    published: Arc<Published>,
    handle: Option<JoinHandle<Player>>,
}

impl Simulation {
    /// Start ticking `player` on a dedicated thread at `config.tick_rate_hz`.
    pub fn spawn(player: Player, config: &ViewerConfig) -> Result<Self, SimError> {
        let (sender, receiver) = mpsc::sync_channel(config.queue_capacity.max(1));
        let published = Arc::new(Published::default());
        published.store(player.pose());

        let tick_loop = TickLoop {
            player,
            flags: ControlFlags::new(),
            tuning: Tuning::from(config),
            period: config.tick_period(),
            max_lag: config.max_catch_up_ticks,
            receiver,
            published: Arc::clone(&published),
        };
        let handle = std::thread::Builder::new()
            .name("mazeview-sim".into())
            .spawn(move || tick_loop.run())?;

        tracing::info!(tick_rate_hz = config.tick_rate_hz, "simulation started");
        Ok(Self {
            sender,
            published,
            handle: Some(handle),
        })
    }

    /// Queue an action. Blocks while the queue is full.
    pub fn send(&self, action: Action) -> Result<(), SimError> {
        self.sender
            .send(Message::Act(action))
            .map_err(|_| SimError::Stopped)
    }

    /// Latest pose published by the simulation thread.
    pub fn pose(&self) -> Pose {
        *self
            .published
            .pose
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.published.ticks.load(Ordering::Acquire)
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the thread, wait for it to exit, and return the final player.
    pub fn shutdown(mut self) -> Result<Player, SimError> {
        self.stop()
    }

    fn stop(&mut self) -> Result<Player, SimError> {
        let handle = self.handle.take().ok_or(SimError::Stopped)?;
        // The thread may already have exited; joining still reports how.
        let _ = self.sender.send(Message::Quit);
        let player = handle.join().map_err(|_| SimError::Panicked)?;
        tracing::info!(ticks = self.ticks(), "simulation stopped");
        Ok(player)
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        if self.handle.is_some() {
            if let Err(e) = self.stop() {
                tracing::error!("simulation shutdown failed: {e}");
            }
        }
    }
}

struct TickLoop {
    player: Player,
    flags: ControlFlags,
    tuning: Tuning,
    period: Duration,
    max_lag: u32,
    receiver: Receiver<Message>,
    published: Arc<Published>,
}

impl TickLoop {
    fn run(mut self) -> Player {
        let mut next_tick = Instant::now() + self.period;
        loop {
            let now = Instant::now();
            if now >= next_tick {
                self.tick();
                next_tick = advance(next_tick, now, self.period, self.max_lag);
                continue;
            }

            // Wakes early for queued actions and for quit.
            match self.receiver.recv_timeout(next_tick - now) {
                Ok(Message::Act(action)) => {
                    tracing::trace!(?action, "applying action");
                    sim::apply(&action, &mut self.flags, &mut self.player);
                    self.published.store(self.player.pose());
                }
                Ok(Message::Quit) => break,
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::debug!("action queue closed");
                    break;
                }
                Err(RecvTimeoutError::Timeout) => {}
            }
        }
        self.player
    }

    fn tick(&mut self) {
        sim::step(&self.flags, &mut self.player, &self.tuning);
        self.published.store(self.player.pose());
        self.published.ticks.fetch_add(1, Ordering::AcqRel);
    }
}

/// Deadline of the tick after the one due at `next_tick`, run at `now`.
///
/// Keeps the absolute schedule while the loop is at most `max_lag` periods
/// late; past that the clock restarts one period from `now`.
fn advance(next_tick: Instant, now: Instant, period: Duration, max_lag: u32) -> Instant {
    let next = next_tick + period;
    let lag = now.saturating_duration_since(next);
    if lag > period * max_lag {
        tracing::warn!(
            lag_ms = lag.as_secs_f64() * 1000.0,
            "simulation fell behind, resyncing tick clock"
        );
        return now + period;
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use mazeview_common::Control;
    use mazeview_map::GridMap;
    use std::thread;

    fn corridor() -> Arc<GridMap> {
        Arc::new(
            GridMap::parse("12 3 1.5 1.5 0\n############\n#..........#\n############\n")
                .unwrap(),
        )
    }

    fn config(tick_rate_hz: u32) -> ViewerConfig {
        ViewerConfig {
            tick_rate_hz,
            ..ViewerConfig::default()
        }
    }

    /// Poll `cond` until it holds or `timeout` elapses.
    fn wait_for(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        cond()
    }

    #[test]
    fn publishes_spawn_pose_before_first_tick() {
        let map = corridor();
        let sim = Simulation::spawn(Player::spawn(Arc::clone(&map)), &config(1)).unwrap();
        assert_eq!(sim.pose().position, map.start());
        assert!(sim.is_running());
    }

    #[test]
    fn held_forward_advances_on_ticks() {
        let sim = Simulation::spawn(Player::spawn(corridor()), &config(200)).unwrap();
        sim.send(Action::Control {
            control: Control::Forward,
            engaged: true,
        })
        .unwrap();
        assert!(wait_for(Duration::from_secs(2), || sim.pose().position.x > 1.6));
        assert!(sim.ticks() > 0);

        let published = sim.pose();
        let player = sim.shutdown().unwrap();
        assert!(player.x() >= published.position.x);
        assert_eq!(player.y(), 1.5);
    }

    #[test]
    fn look_applies_without_waiting_for_a_tick() {
        let sim = Simulation::spawn(Player::spawn(corridor()), &config(1)).unwrap();
        sim.send(Action::Look {
            yaw: 0.5,
            pitch: 0.0,
        })
        .unwrap();
        assert!(wait_for(Duration::from_millis(500), || {
            (sim.pose().dir - 0.5).abs() < 1e-12
        }));
        assert_eq!(sim.ticks(), 0);
    }

    #[test]
    fn shutdown_interrupts_sleep() {
        let sim = Simulation::spawn(Player::spawn(corridor()), &config(1)).unwrap();
        thread::sleep(Duration::from_millis(20));
        let started = Instant::now();
        let player = sim.shutdown().unwrap();
        assert!(started.elapsed() < Duration::from_millis(500));
        assert_eq!(player.x(), 1.5);
    }

    #[test]
    fn thread_releases_map_after_shutdown() {
        let map = corridor();
        let sim = Simulation::spawn(Player::spawn(Arc::clone(&map)), &config(500)).unwrap();
        sim.send(Action::Control {
            control: Control::TurnRight,
            engaged: true,
        })
        .unwrap();
        assert!(wait_for(Duration::from_secs(2), || sim.ticks() > 3));
        let player = sim.shutdown().unwrap();
        assert!(player.dir() > 0.0);
        assert_eq!(Arc::strong_count(&map), 2, "only the returned player holds the map");
        drop(player);
        assert_eq!(Arc::strong_count(&map), 1);
    }

    #[test]
    fn advance_keeps_schedule_when_slightly_late() {
        let period = Duration::from_millis(10);
        let start = Instant::now();
        let due = start + period;
        // Ran two periods late: still within a lag budget of five.
        let now = due + period * 2;
        assert_eq!(advance(due, now, period, 5), due + period);
        assert_eq!(advance(due, due, period, 5), due + period);
    }

    #[test]
    fn advance_resyncs_when_too_far_behind() {
        let period = Duration::from_millis(10);
        let start = Instant::now();
        let due = start + period;
        let now = due + period * 20;
        assert_eq!(advance(due, now, period, 5), now + period);

        // Zero budget: any lag beyond the next deadline resyncs.
        let now = due + period * 2;
        assert_eq!(advance(due, now, period, 0), now + period);
    }

    #[test]
    fn drop_joins_thread() {
        let map = corridor();
        let sim = Simulation::spawn(Player::spawn(Arc::clone(&map)), &config(60)).unwrap();
        assert_eq!(Arc::strong_count(&map), 2);
        drop(sim);
        assert_eq!(Arc::strong_count(&map), 1, "player was returned and dropped");
    }
}
