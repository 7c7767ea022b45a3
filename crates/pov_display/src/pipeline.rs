//! # Frame Pipeline
//!
//! Two threads around one frame store:
//!
//! ```text
//! Producer (tick scheduler, period P):
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. SAMPLE INPUT                                                     │
//! │    └─ poll_mask() -> edge detector -> event queue (drop-oldest)     │
//! │                                                                     │
//! │ 2. BEGIN WRITE                                                      │
//! │    └─ try-lock the write buffer; busy -> render skipped, counted    │
//! │                                                                     │
//! │ 3. DISPATCH                                                         │
//! │    ├─ clear the write frame                                         │
//! │    ├─ route drained events to the active scene (may switch)         │
//! │    └─ update + render the active scene                              │
//! │                                                                     │
//! │ 4. PUBLISH                                                          │
//! │    └─ single atomic index flip                                      │
//! └─────────────────────────────────────────────────────────────────────┘
//!
//! Consumer (own cadence):
//!   read() latest frame -> Presenter::publish -> sleep until next look
//! ```
//!
//! Both threads watch one [`StopSignal`]. The producer sees it at tick
//! boundaries, the consumer between two presents.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use pov_core::{EdgeDetector, EventQueue, FrameStore, FrameStoreStats};

use crate::config::PovConfig;
use crate::dispatcher::{DispatcherStats, SceneDispatcher};
use crate::error::{PovError, PovResult};
use crate::presenter::Presenter;
use crate::scenes::{SceneId, SceneRegistry};
use crate::source::InputSource;
use crate::tick::{MonotonicClock, StopSignal, TickClock, TickScheduler, TickStats};

// =============================================================================
// PRODUCER
// =============================================================================

/// Producer counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProducerStats {
    /// Ticks run.
    pub ticks: u64,
    /// Frames rendered and published.
    pub frames_published: u64,
    /// Ticks whose write buffer was still held by a reader.
    pub frames_skipped: u64,
    /// Events evicted from the full queue.
    pub events_dropped: u64,
    /// Scene dispatcher counters.
    pub dispatcher: DispatcherStats,
    /// Active scene after the last tick.
    pub active_scene: Option<SceneId>,
}

/// One tick's worth of producer work, independent of any thread or clock.
pub struct Producer<I> {
    input: I,
    detector: EdgeDetector,
    queue: EventQueue,
    dispatcher: SceneDispatcher,
    store: Arc<FrameStore>,
    stats: ProducerStats,
}

impl<I: InputSource> Producer<I> {
    /// Assembles a producer.
    ///
    /// # Panics
    ///
    /// Panics if `buttons` exceeds 32 or `queue_capacity` is zero.
    #[must_use]
    pub fn new(
        input: I,
        store: Arc<FrameStore>,
        dispatcher: SceneDispatcher,
        buttons: u8,
        queue_capacity: usize,
    ) -> Self {
        let stats = ProducerStats {
            active_scene: Some(dispatcher.active()),
            ..ProducerStats::default()
        };
        Self {
            input,
            detector: EdgeDetector::new(buttons),
            queue: EventQueue::new(queue_capacity),
            dispatcher,
            store,
            stats,
        }
    }

    /// Builds a producer with the built-in scenes.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn from_config(config: &PovConfig, input: I, store: Arc<FrameStore>) -> PovResult<Self> {
        Self::with_registry(config, SceneRegistry::new(&config.scene_settings()), input, store)
    }

    /// Builds a producer with a caller-supplied registry.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn with_registry(
        config: &PovConfig,
        registry: SceneRegistry,
        input: I,
        store: Arc<FrameStore>,
    ) -> PovResult<Self> {
        config.validate()?;
        if store.geometry() != config.geometry() {
            return Err(PovError::InvalidConfig(format!(
                "frame store geometry {:?} does not match config {:?}",
                store.geometry(),
                config.geometry()
            )));
        }
        let dispatcher = SceneDispatcher::new(registry, config.default_scene()?);
        Ok(Self::new(
            input,
            store,
            dispatcher,
            config.button_count(),
            config.input.queue_capacity,
        ))
    }

    /// Runs one tick: sample, dispatch, render, publish.
    ///
    /// Returns true if a frame was published.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        self.stats.ticks += 1;

        let mask = self.input.poll_mask();
        let dropped_before = self.queue.dropped();
        self.queue.push_all(self.detector.sample(mask));
        let dropped = self.queue.dropped() - dropped_before;
        if dropped > 0 {
            self.stats.events_dropped += dropped;
            tracing::debug!("Event queue full: dropped {} oldest events", dropped);
        }

        let published = match self.store.begin_write() {
            Some(mut frame) => {
                frame.clear();
                self.dispatcher.tick(elapsed, self.queue.drain(), Some(&mut *frame));
                frame.publish();
                self.stats.frames_published += 1;
                true
            }
            None => {
                self.dispatcher.tick(elapsed, self.queue.drain(), None);
                self.stats.frames_skipped += 1;
                // Log the 1st, 2nd, 4th, 8th... occurrence only.
                if self.stats.frames_skipped.is_power_of_two() {
                    tracing::warn!(
                        "Write buffer still held by a reader, frame skipped ({} so far)",
                        self.stats.frames_skipped
                    );
                }
                false
            }
        };

        self.stats.dispatcher = self.dispatcher.stats();
        self.stats.active_scene = Some(self.dispatcher.active());
        published
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> ProducerStats {
        self.stats
    }

    /// The scene dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &SceneDispatcher {
        &self.dispatcher
    }

    /// Mutable scene dispatcher.
    pub fn dispatcher_mut(&mut self) -> &mut SceneDispatcher {
        &mut self.dispatcher
    }

    /// The frame store written to.
    #[must_use]
    pub fn store(&self) -> &Arc<FrameStore> {
        &self.store
    }
}

// =============================================================================
// CONSUMER
// =============================================================================

/// Consumer counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    /// Frames handed to the presenter.
    pub frames_presented: u64,
    /// Error that stopped the presenter, if any.
    pub error: Option<String>,
}

/// Presents the latest published frame every `interval` until `stop` is
/// raised. A frame is only presented if something new was published since
/// the previous look. On a presenter error the stop signal is raised for
/// the whole pipeline.
pub fn run_presenter<P: Presenter + ?Sized>(
    store: &FrameStore,
    presenter: &mut P,
    interval: Duration,
    stop: &StopSignal,
) -> ConsumerStats {
    let mut clock = MonotonicClock::new(Duration::ZERO);
    let mut stats = ConsumerStats::default();
    let mut last_seen = 0;
    let mut next_look = clock.now();

    loop {
        let stopping = stop.is_stopped();
        let published = store.frame_count();
        if published != last_seen {
            let frame = store.read();
            last_seen = published;
            if let Err(e) = presenter.publish(&frame) {
                tracing::warn!("Presenter failed, stopping pipeline: {}", e);
                stats.error = Some(e.to_string());
                stop.stop();
                return stats;
            }
            stats.frames_presented += 1;
        }
        // One last look after the stop so the final frame is shown.
        if stopping {
            return stats;
        }

        next_look += interval;
        clock.wait_until(next_look);
    }
}

// =============================================================================
// THREADS
// =============================================================================

/// Everything the pipeline measured, returned by [`PipelineHandle::join`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineReport {
    /// Scheduler timing.
    pub tick: TickStats,
    /// Producer counters.
    pub producer: ProducerStats,
    /// Frame store counters.
    pub store: FrameStoreStats,
    /// Consumer counters.
    pub consumer: ConsumerStats,
}

struct ProducerReport {
    tick: TickStats,
    producer: ProducerStats,
}

/// Running pipeline.
pub struct PipelineHandle {
    stop: StopSignal,
    store: Arc<FrameStore>,
    live: Arc<Mutex<ProducerStats>>,
    producer: JoinHandle<ProducerReport>,
    consumer: JoinHandle<ConsumerStats>,
}

impl PipelineHandle {
    /// Requests shutdown. The producer exits at the end of its current tick,
    /// within one tick period. The presenter exits within one presenter
    /// interval, after one last look at the store.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Signal that stops this pipeline, for other threads.
    #[must_use]
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// The shared frame store.
    #[must_use]
    pub fn store(&self) -> &Arc<FrameStore> {
        &self.store
    }

    /// Latest producer counters. Updated by the producer without blocking,
    /// so it may lag a tick behind.
    #[must_use]
    pub fn live_stats(&self) -> ProducerStats {
        *self.live.lock()
    }

    /// Returns true once the producer thread exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.producer.is_finished()
    }

    /// Waits for both threads.
    ///
    /// Without a tick limit the producer runs until [`PipelineHandle::stop`]
    /// is called from somewhere else.
    ///
    /// # Errors
    ///
    /// Returns [`PovError::ThreadPanicked`] if a thread panicked.
    pub fn join(self) -> PovResult<PipelineReport> {
        let producer = self.producer.join();
        self.stop.stop();
        let consumer = self.consumer.join();

        let producer = producer.map_err(|_| PovError::ThreadPanicked("producer"))?;
        let consumer = consumer.map_err(|_| PovError::ThreadPanicked("presenter"))?;

        let report = PipelineReport {
            tick: producer.tick,
            producer: producer.producer,
            store: self.store.stats(),
            consumer,
        };
        tracing::info!(
            "Pipeline stopped: {} ticks, {} frames published, {} presented, {} overruns",
            report.tick.ticks,
            report.producer.frames_published,
            report.consumer.frames_presented,
            report.tick.overruns
        );
        Ok(report)
    }
}

/// Starts the pipeline threads.
pub struct Pipeline;

impl Pipeline {
    /// Spawns producer and presenter threads with the built-in scenes.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or a thread cannot be
    /// spawned.
    pub fn spawn<I, P>(config: &PovConfig, input: I, presenter: P) -> PovResult<PipelineHandle>
    where
        I: InputSource + 'static,
        P: Presenter + 'static,
    {
        Self::spawn_with_registry(
            config,
            SceneRegistry::new(&config.scene_settings()),
            input,
            presenter,
        )
    }

    /// Spawns producer and presenter threads with a caller-supplied
    /// registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or a thread cannot be
    /// spawned.
    pub fn spawn_with_registry<I, P>(
        config: &PovConfig,
        registry: SceneRegistry,
        input: I,
        mut presenter: P,
    ) -> PovResult<PipelineHandle>
    where
        I: InputSource + 'static,
        P: Presenter + 'static,
    {
        let store = Arc::new(FrameStore::new(config.geometry()));
        let mut producer = Producer::with_registry(config, registry, input, Arc::clone(&store))?;
        let stop = StopSignal::new();
        let live = Arc::new(Mutex::new(producer.stats()));

        let scheduler_config = config.scheduler();
        let clock = MonotonicClock::new(config.spin_margin());
        let mut scheduler = TickScheduler::new(scheduler_config, clock, stop.clone());

        tracing::info!(
            "Pipeline starting: {}x{}x{} display, {:?} tick, scene {}",
            config.display.columns,
            config.display.rows,
            config.display.layers,
            scheduler_config.period,
            config.scenes.default
        );

        let producer_stop = stop.clone();
        let producer_live = Arc::clone(&live);
        let producer_thread = thread::Builder::new()
            .name("pov-producer".to_owned())
            .spawn(move || {
                let tick = scheduler.run(|info| {
                    producer.tick(info.elapsed);
                    // Never wait on a reader of the live stats.
                    if let Some(mut live) = producer_live.try_lock() {
                        *live = producer.stats();
                    }
                });
                *producer_live.lock() = producer.stats();
                // A tick limit ends the run; take the presenter down with it.
                producer_stop.stop();
                ProducerReport { tick, producer: producer.stats() }
            })
            .map_err(|source| spawn_error("producer", source))?;

        let consumer_store = Arc::clone(&store);
        let consumer_stop = stop.clone();
        let interval = config.presenter_interval();
        let consumer_thread = thread::Builder::new()
            .name("pov-presenter".to_owned())
            .spawn(move || run_presenter(&consumer_store, &mut presenter, interval, &consumer_stop));

        let consumer_thread = match consumer_thread {
            Ok(handle) => handle,
            Err(source) => {
                stop.stop();
                // The spawn error is the one worth reporting.
                let _ = producer_thread.join();
                return Err(spawn_error("presenter", source));
            }
        };

        Ok(PipelineHandle {
            stop,
            store,
            live,
            producer: producer_thread,
            consumer: consumer_thread,
        })
    }
}

fn spawn_error(name: &'static str, source: io::Error) -> PovError {
    PovError::Spawn { name, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::RecordingPresenter;
    use crate::source::ScriptedInput;
    use pov_core::{ButtonMask, Geometry};
    use pov_shared::Key;

    const TICK: Duration = Duration::from_millis(5);

    fn producer(masks: Vec<ButtonMask>) -> Producer<ScriptedInput> {
        let store = Arc::new(FrameStore::new(Geometry::POV));
        Producer::from_config(&PovConfig::default(), ScriptedInput::new(masks), store).unwrap()
    }

    #[test]
    fn test_each_tick_publishes() {
        let mut producer = producer(Vec::new());
        for _ in 0..3 {
            assert!(producer.tick(TICK));
        }
        assert_eq!(producer.store().frame_count(), 3);
        assert_eq!(producer.stats().frames_published, 3);
    }

    #[test]
    fn test_options_press_switches_scene() {
        let options = ButtonMask::from_key(Key::Options);
        let mut producer = producer(vec![ButtonMask::EMPTY, options, options, ButtonMask::EMPTY]);
        assert_eq!(producer.dispatcher().active(), SceneId::Marquee);

        for _ in 0..4 {
            producer.tick(TICK);
        }
        assert_eq!(producer.dispatcher().active(), SceneId::ButtonTest);
        // Press and release were both routed.
        assert_eq!(producer.stats().dispatcher.events_routed, 2);
        assert_eq!(producer.stats().active_scene, Some(SceneId::ButtonTest));
    }

    #[test]
    fn test_stale_reader_skips_render_but_advances_scene() {
        let options = ButtonMask::from_key(Key::Options);
        let mut producer = producer(vec![ButtonMask::EMPTY, ButtonMask::EMPTY, options]);
        let store = Arc::clone(producer.store());

        assert!(producer.tick(TICK));
        // Pin the published frame; after the next swap it is the write buffer.
        let pinned = store.read();
        assert!(producer.tick(TICK));
        assert!(!producer.tick(TICK));

        assert_eq!(producer.stats().frames_skipped, 1);
        assert_eq!(store.stats().skipped_writes, 1);
        // The OPTIONS press in the skipped tick still switched scenes.
        assert_eq!(producer.dispatcher().active(), SceneId::ButtonTest);

        drop(pinned);
        assert!(producer.tick(TICK));
    }

    #[test]
    fn test_queue_overflow_counted() {
        let store = Arc::new(FrameStore::new(Geometry::POV));
        let registry = SceneRegistry::default();
        let dispatcher = SceneDispatcher::new(registry, SceneId::Idle);
        // 4 buttons go down at once into a queue of 2.
        let input = ScriptedInput::new([ButtonMask::EMPTY, ButtonMask::new(0b1111)]);
        let mut producer = Producer::new(input, store, dispatcher, 4, 2);

        producer.tick(TICK);
        producer.tick(TICK);
        assert_eq!(producer.stats().events_dropped, 2);
        assert_eq!(producer.stats().dispatcher.events_routed, 2);
    }

    #[test]
    fn test_geometry_mismatch_rejected() {
        let store = Arc::new(FrameStore::new(Geometry::new(8, 8, 1)));
        let result = Producer::from_config(&PovConfig::default(), ScriptedInput::default(), store);
        assert!(matches!(result, Err(PovError::InvalidConfig(_))));
    }

    #[test]
    fn test_presenter_shows_final_frame_after_stop() {
        let store = FrameStore::new(Geometry::new(2, 1, 1));
        if let Some(frame) = store.begin_write() {
            frame.publish();
        }
        let stop = StopSignal::new();
        stop.stop();

        let mut recording = RecordingPresenter::new();
        let stats = run_presenter(&store, &mut recording, Duration::from_millis(1), &stop);
        assert_eq!(stats.frames_presented, 1);
        assert_eq!(recording.len(), 1);
    }

    #[test]
    fn test_spawned_pipeline_runs_to_tick_limit() {
        let mut config = PovConfig::default();
        config.tick.period_ms = 1;
        config.tick.max_ticks = Some(50);
        config.presenter.interval_ms = 5;

        let recording = RecordingPresenter::new();
        let handle = Pipeline::spawn(&config, ScriptedInput::default(), recording.clone()).unwrap();
        let report = handle.join().unwrap();

        assert_eq!(report.tick.ticks, 50);
        assert_eq!(report.producer.ticks, 50);
        assert_eq!(report.store.frames_published, report.producer.frames_published);
        assert!(report.consumer.frames_presented >= 1);
        assert_eq!(recording.len() as u64, report.consumer.frames_presented);
        assert!(report.consumer.error.is_none());
    }
}
