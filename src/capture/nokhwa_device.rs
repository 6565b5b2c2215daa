//! Native camera backed by nokhwa.
//!
//! nokhwa cameras are not `Send`, so each stream lives on its own thread and
//! is driven over a channel.

use crate::capture::media::{FacingMode, MediaDevice, MediaError, MediaStream, RawFrame};
use nokhwa::Camera;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use std::sync::mpsc;
use std::thread;
use tracing::{error, info};

enum Command {
    Frame(mpsc::Sender<Result<Option<RawFrame>, MediaError>>),
    Stop,
}

pub struct NokhwaDevice;

impl NokhwaDevice {
    fn index_for(facing: FacingMode) -> u32 {
        match facing {
            FacingMode::User => 0,
            FacingMode::Environment => 1,
        }
    }
}

fn classify(e: &nokhwa::NokhwaError) -> MediaError {
    let msg = e.to_string();
    let lower = msg.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") {
        MediaError::PermissionDenied
    } else if lower.contains("busy") || lower.contains("in use") {
        MediaError::Busy
    } else if lower.contains("not found") || lower.contains("no such") {
        MediaError::NoDevice
    } else {
        MediaError::Stream(msg)
    }
}

fn open_camera(index: u32) -> Result<Camera, MediaError> {
    let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
    let mut camera = Camera::new(CameraIndex::Index(index), format).map_err(|e| classify(&e))?;
    camera.open_stream().map_err(|e| classify(&e))?;
    Ok(camera)
}

fn read(camera: &mut Camera) -> Result<Option<RawFrame>, MediaError> {
    let buffer = camera.frame().map_err(|e| classify(&e))?;
    if buffer.buffer().is_empty() {
        return Ok(None);
    }
    let image = buffer
        .decode_image::<RgbFormat>()
        .map_err(|e| MediaError::Stream(e.to_string()))?;
    Ok(Some(RawFrame {
        width: image.width(),
        height: image.height(),
        rgb: image.into_raw(),
    }))
}

impl MediaDevice for NokhwaDevice {
    fn open(&self, facing: FacingMode) -> Result<Box<dyn MediaStream>, MediaError> {
        let index = Self::index_for(facing);
        let (ready_tx, ready_rx) = mpsc::channel();
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();

        thread::Builder::new()
            .name(format!("camera-{index}"))
            .spawn(move || {
                let mut camera = match open_camera(index) {
                    Ok(c) => {
                        let _ = ready_tx.send(Ok(()));
                        c
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                while let Ok(cmd) = cmd_rx.recv() {
                    match cmd {
                        Command::Frame(reply) => {
                            let _ = reply.send(read(&mut camera));
                        }
                        Command::Stop => break,
                    }
                }

                if let Err(e) = camera.stop_stream() {
                    error!(error = %e, "failed to stop camera stream");
                }
                info!(index, "camera thread finished");
            })
            .map_err(|e| MediaError::Stream(e.to_string()))?;

        ready_rx
            .recv()
            .map_err(|_| MediaError::Stream("camera thread exited".into()))??;

        Ok(Box::new(NokhwaStream {
            commands: cmd_tx,
            stopped: false,
        }))
    }
}

struct NokhwaStream {
    commands: mpsc::Sender<Command>,
    stopped: bool,
}

impl MediaStream for NokhwaStream {
    fn tracks(&self) -> usize {
        1
    }

    fn stop_tracks(&mut self) {
        if !self.stopped {
            let _ = self.commands.send(Command::Stop);
            self.stopped = true;
        }
    }

    fn read_frame(&mut self) -> Result<Option<RawFrame>, MediaError> {
        if self.stopped {
            return Err(MediaError::Stream("stream stopped".into()));
        }
        let (tx, rx) = mpsc::channel();
        self.commands
            .send(Command::Frame(tx))
            .map_err(|_| MediaError::Stream("camera thread exited".into()))?;
        rx.recv()
            .map_err(|_| MediaError::Stream("camera thread exited".into()))?
    }
}

impl Drop for NokhwaStream {
    fn drop(&mut self) {
        self.stop_tracks();
    }
}
