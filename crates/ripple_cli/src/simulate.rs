//! Animation runs driven by a host clock

use anyhow::{Context, Result};
use ripple_animation::{Animated, Motion};
use ripple_core::{FrameMode, HeadlessHost, Host, TokioHost, FALLBACK_FRAME_MS};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// One committed value
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Sample {
    /// Host time (ms)
    pub t: f64,
    pub value: f64,
}

/// Every value a run committed, in order
#[derive(Clone, Debug, Default)]
pub struct Trajectory {
    pub samples: Vec<Sample>,
    /// False if the run was still going when the time limit hit
    pub settled: bool,
}

impl Trajectory {
    pub fn last(&self) -> Option<Sample> {
        self.samples.last().copied()
    }
}

type Recorder = Rc<RefCell<Vec<Sample>>>;

fn record<M: Motion>(value: &Animated<f64, M>, host: Rc<dyn Host>) -> Recorder {
    let samples: Recorder = Rc::new(RefCell::new(vec![Sample {
        t: host.now(),
        value: value.value(),
    }]));
    let sink = samples.clone();
    value
        .subscribe(move |v| {
            sink.borrow_mut().push(Sample {
                t: host.now(),
                value: *v,
            })
        })
        .detach();
    samples
}

/// Run `from -> to` on simulated time
pub fn simulate<M: Motion>(
    motion: M,
    options: M::Options,
    from: f64,
    to: f64,
    frame_mode: FrameMode,
    max_ms: f64,
) -> Result<Trajectory> {
    let host = HeadlessHost::with_frame_mode(frame_mode);
    let value = Animated::new(host.shared(), from, motion, options)?;
    let samples = record(&value, host.shared());

    value.set(to);
    let settled = host.run_until_idle(max_ms);
    if !settled {
        tracing::warn!(max_ms, "Animation still running at the time limit");
    }
    drop(value);

    let samples = samples.take();
    tracing::debug!(samples = samples.len(), settled, "Simulation finished");
    Ok(Trajectory { samples, settled })
}

/// Run `from -> to` on the wall clock
pub fn run_realtime<M: Motion>(
    motion: M,
    options: M::Options,
    from: f64,
    to: f64,
    max_ms: f64,
) -> Result<Trajectory> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start tokio runtime")?;
    let local = tokio::task::LocalSet::new();

    local.block_on(&runtime, async move {
        let host: Rc<dyn Host> = Rc::new(TokioHost::new());
        let value = Animated::new(host.clone(), from, motion, options)?;
        let samples = record(&value, host.clone());

        value.set(to);
        let deadline = host.now() + max_ms;
        let poll = Duration::from_secs_f64(FALLBACK_FRAME_MS / 1000.0);
        while value.is_animating() && host.now() < deadline {
            tokio::time::sleep(poll).await;
        }

        let settled = !value.is_animating();
        if !settled {
            tracing::warn!(max_ms, "Animation still running at the time limit");
        }
        drop(value);

        let samples = samples.take();
        tracing::debug!(samples = samples.len(), settled, "Real-time run finished");
        Ok::<_, anyhow::Error>(Trajectory { samples, settled })
    })
}
