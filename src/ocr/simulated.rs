//! Simulated recognition engine (test-only).
//!
//! Waits a fixed delay, reports progress in quarters and returns a canned
//! text keyed by the primary language.  Can be made to fail, and can be
//! gated so a test decides exactly when recognition finishes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use crate::capture::ImagePayload;

use super::{LanguageSet, OcrError, RawRecognition, RecognitionEngine, RecognitionWorker};

/// Canned text for a primary language.
pub fn canned_text(primary: &str) -> &'static str {
    match primary {
        "hin" => "नाम: राम प्रसाद शर्मा\nआयु: 45\nव्यवसाय: किसान",
        "eng" => "Name: Ram Prasad Sharma\nAge: 45\nOccupation: Farmer",
        _ => "Sample recognised text",
    }
}

/// Worker creation / termination counters shared with the test.
#[derive(Debug, Clone, Default)]
pub struct WorkerCounters {
    created: Arc<AtomicUsize>,
    terminated: Arc<AtomicUsize>,
}

impl WorkerCounters {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn terminated(&self) -> usize {
        self.terminated.load(Ordering::SeqCst)
    }
}

/// Blocks workers until [`Gate::open`] is called.
#[derive(Debug, Clone, Default)]
pub struct Gate(Arc<(Mutex<bool>, Condvar)>);

impl Gate {
    pub fn open(&self) {
        let (lock, cvar) = &*self.0;
        *lock.lock().unwrap() = true;
        cvar.notify_all();
    }

    fn wait(&self) {
        let (lock, cvar) = &*self.0;
        let mut open = lock.lock().unwrap();
        while !*open {
            open = cvar.wait(open).unwrap();
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedEngine {
    delay: Duration,
    text: Option<String>,
    confidence: f32,
    fail: bool,
    gate: Option<Gate>,
    counters: WorkerCounters,
}

impl SimulatedEngine {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            text: None,
            confidence: 87.4,
            fail: false,
            gate: None,
            counters: WorkerCounters::default(),
        }
    }

    /// Return `text` instead of the language-keyed canned text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Hold every worker at 50 % until the returned gate is opened.
    pub fn gated(mut self) -> (Self, Gate) {
        let gate = Gate::default();
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn counters(&self) -> WorkerCounters {
        self.counters.clone()
    }
}

impl RecognitionEngine for SimulatedEngine {
    fn name(&self) -> &str {
        "simulated"
    }

    fn create_worker(
        &self,
        languages: &LanguageSet,
    ) -> Result<Box<dyn RecognitionWorker>, OcrError> {
        self.counters.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SimulatedWorker {
            engine: self.clone(),
            primary: languages.primary().to_string(),
        }))
    }
}

struct SimulatedWorker {
    engine: SimulatedEngine,
    primary: String,
}

impl RecognitionWorker for SimulatedWorker {
    fn recognize(
        &mut self,
        _image: &ImagePayload,
        progress: &dyn Fn(f32),
    ) -> Result<RawRecognition, OcrError> {
        let step = self.engine.delay / 4;
        for quarter in 0..=4u8 {
            progress(f32::from(quarter) / 4.0);
            if quarter == 2 {
                if let Some(gate) = &self.engine.gate {
                    gate.wait();
                }
            }
            if quarter < 4 && !step.is_zero() {
                std::thread::sleep(step);
            }
        }

        if self.engine.fail {
            return Err(OcrError::Recognition("simulated engine failure".into()));
        }

        let text = self
            .engine
            .text
            .clone()
            .unwrap_or_else(|| canned_text(&self.primary).to_string());
        Ok(RawRecognition {
            text,
            confidence: self.engine.confidence,
        })
    }

    fn terminate(self: Box<Self>) {
        self.engine.counters.terminated.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canned_text_follows_primary_language() {
        let engine = SimulatedEngine::new(Duration::ZERO);
        let image = ImagePayload::new("a.png", "image/png", vec![0]).unwrap();

        let hin = LanguageSet::new(["hin", "eng"]).unwrap();
        let mut worker = engine.create_worker(&hin).unwrap();
        let rec = worker.recognize(&image, &|_| {}).unwrap();
        assert_eq!(rec.text, canned_text("hin"));
        worker.terminate();

        let eng = LanguageSet::new(["eng"]).unwrap();
        let mut worker = engine.create_worker(&eng).unwrap();
        let rec = worker.recognize(&image, &|_| {}).unwrap();
        assert_eq!(rec.text, canned_text("eng"));
        worker.terminate();

        assert_eq!(engine.counters().terminated(), 2);
    }
}
