use bytes::Bytes;
use chillroom_client::Result;
use chillroom_client::media::{MediaSink, SinkSignals};
use chillroom_core::MediaParams;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Recorded {
    params: Option<MediaParams>,
    signals: Option<SinkSignals>,
    busy: bool,
    appended: Vec<Bytes>,
    closes: usize,
}

/// Media sink whose appends stay busy until the test calls
/// [`RecordingSink::complete_append`].
#[derive(Clone, Default)]
pub struct RecordingSink {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish the in-flight append and signal completion.
    pub fn complete_append(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.busy = false;
        if let Some(signals) = &inner.signals {
            signals.append_complete();
        }
    }

    pub fn appended(&self) -> Vec<Bytes> {
        self.inner.lock().unwrap().appended.clone()
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().unwrap().signals.is_some()
    }

    pub fn mime(&self) -> Option<String> {
        self.inner.lock().unwrap().params.as_ref().map(|p| p.mime.clone())
    }

    pub fn closes(&self) -> usize {
        self.inner.lock().unwrap().closes
    }
}

impl MediaSink for RecordingSink {
    fn open(&mut self, params: &MediaParams, signals: SinkSignals) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.params = Some(params.clone());
        signals.opened();
        inner.signals = Some(signals);
        Ok(())
    }

    fn is_busy(&self) -> bool {
        self.inner.lock().unwrap().busy
    }

    fn append(&mut self, chunk: Bytes) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.busy = true;
        inner.appended.push(chunk);
        Ok(())
    }

    fn close(&mut self) {
        let mut inner = self.inner.lock().unwrap();
        inner.closes += 1;
        inner.signals = None;
    }
}
