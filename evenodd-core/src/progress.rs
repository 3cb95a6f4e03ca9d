use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Periodic stderr reporter for long encode/repair runs. The ticker thread
/// only reads the counters; the pipeline itself stays single-threaded.
#[derive(Clone)]
pub struct Progress {
    enabled: bool,
    stage: Arc<Mutex<String>>,
    stripes_done: Arc<AtomicUsize>,
    stripes_total: Arc<AtomicUsize>,
    running: Arc<AtomicBool>,
}

impl Progress {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            stage: Arc::new(Mutex::new(String::new())),
            stripes_done: Arc::new(AtomicUsize::new(0)),
            stripes_total: Arc::new(AtomicUsize::new(0)),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_stage(&self, s: &str) {
        if self.enabled {
            *self.stage.lock().unwrap() = s.to_string();
        }
    }

    pub fn set_total(&self, n: usize) {
        self.stripes_total.store(n, Ordering::Relaxed);
        self.stripes_done.store(0, Ordering::Relaxed);
    }

    pub fn inc(&self) {
        self.stripes_done.fetch_add(1, Ordering::Relaxed);
    }

    pub fn start(&self) {
        if !self.enabled {
            return;
        }
        self.running.store(true, Ordering::Relaxed);
        let stage = self.stage.clone();
        let done = self.stripes_done.clone();
        let total = self.stripes_total.clone();
        let running = self.running.clone();
        thread::spawn(move || {
            let t0 = Instant::now();
            while running.load(Ordering::Relaxed) {
                thread::sleep(Duration::from_secs(5));
                if !running.load(Ordering::Relaxed) {
                    break;
                }
                let s = stage.lock().unwrap().clone();
                eprintln!(
                    "[{:>4}s] {} | stripes {}/{}",
                    t0.elapsed().as_secs(),
                    s,
                    done.load(Ordering::Relaxed),
                    total.load(Ordering::Relaxed)
                );
            }
        });
    }

    pub fn stop(&self) {
        if self.enabled {
            self.running.store(false, Ordering::Relaxed);
        }
    }
}
