//! In-memory camera used by the unit tests.

use crate::capture::media::{FacingMode, MediaDevice, MediaError, MediaStream, RawFrame};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn gray_frame(width: u32, height: u32) -> RawFrame {
    RawFrame {
        width,
        height,
        rgb: vec![128; (width * height * 3) as usize],
    }
}

pub struct FakeDevice {
    failure: Option<MediaError>,
    tracks: usize,
    frame: Option<RawFrame>,
    open_delay: Duration,
    stops: Mutex<Vec<Arc<AtomicUsize>>>,
    opened: Mutex<Vec<FacingMode>>,
}

impl FakeDevice {
    fn new(failure: Option<MediaError>, tracks: usize, frame: Option<RawFrame>) -> Self {
        Self {
            failure,
            tracks,
            frame,
            open_delay: Duration::ZERO,
            stops: Mutex::new(Vec::new()),
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: MediaError) -> Self {
        Self::new(Some(error), 0, None)
    }

    pub fn with_tracks(tracks: usize) -> Self {
        Self::new(None, tracks, Some(gray_frame(8, 6)))
    }

    /// Opens fine but never buffers a frame.
    pub fn unbuffered() -> Self {
        Self::new(None, 1, None)
    }

    /// Blocks the opening thread for `delay`, like a native camera warming up.
    pub fn slow(delay: Duration) -> Self {
        Self {
            open_delay: delay,
            ..Self::with_tracks(1)
        }
    }

    /// Stop count of every track handed out so far, in acquisition order.
    pub fn track_stops(&self) -> Vec<usize> {
        self.stops
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.load(Ordering::SeqCst))
            .collect()
    }

    pub fn opened(&self) -> Vec<FacingMode> {
        self.opened.lock().unwrap().clone()
    }
}

impl MediaDevice for FakeDevice {
    fn open(&self, facing: FacingMode) -> Result<Box<dyn MediaStream>, MediaError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        std::thread::sleep(self.open_delay);
        self.opened.lock().unwrap().push(facing);

        let tracks: Vec<_> = (0..self.tracks).map(|_| Arc::new(AtomicUsize::new(0))).collect();
        self.stops.lock().unwrap().extend(tracks.iter().cloned());

        Ok(Box::new(FakeStream {
            tracks,
            stopped: false,
            frame: self.frame.clone(),
        }))
    }
}

struct FakeStream {
    tracks: Vec<Arc<AtomicUsize>>,
    stopped: bool,
    frame: Option<RawFrame>,
}

impl MediaStream for FakeStream {
    fn tracks(&self) -> usize {
        self.tracks.len()
    }

    fn stop_tracks(&mut self) {
        if self.stopped {
            return;
        }
        for track in &self.tracks {
            track.fetch_add(1, Ordering::SeqCst);
        }
        self.stopped = true;
    }

    fn read_frame(&mut self) -> Result<Option<RawFrame>, MediaError> {
        if self.stopped {
            return Err(MediaError::Stream("stream stopped".into()));
        }
        Ok(self.frame.clone())
    }
}
