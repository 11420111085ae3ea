use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::library::Track;
use crate::playback::PlaybackError;

use super::sink::create_sink_at;
use super::types::{EngineCmd, EngineHandle};

/// State owned by the audio thread.
struct Output {
    current: Option<Track>,
    sink: Option<Sink>,
    paused: bool,
    /// Where the current sink started inside the track (seeks rebuild the sink).
    offset: Duration,
    volume: f32,
}

impl Output {
    fn load(&mut self, stream: &OutputStream, track: Track) -> Result<Option<Duration>, PlaybackError> {
        let (sink, total) = create_sink_at(stream, &track, Duration::ZERO)?;
        sink.set_volume(self.volume);
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        let length = total.or(track.duration);
        self.sink = Some(sink);
        self.current = Some(track);
        self.paused = true;
        self.offset = Duration::ZERO;
        Ok(length)
    }

    fn play(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.play();
            self.paused = false;
        }
    }

    fn pause(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.pause();
        }
        self.paused = true;
    }

    fn stop(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.current = None;
        self.paused = true;
        self.offset = Duration::ZERO;
    }

    /// Scrubbing: rebuild the current sink and skip into the file.
    fn seek(&mut self, stream: &OutputStream, to: Duration) -> Result<(), PlaybackError> {
        let Some(track) = self.current.as_ref() else {
            return Err(PlaybackError::EngineUnavailable("no track loaded".to_string()));
        };
        let (sink, _) = create_sink_at(stream, track, to)?;
        sink.set_volume(self.volume);
        if !self.paused {
            sink.play();
        }
        if let Some(old) = self.sink.replace(sink) {
            old.stop();
        }
        self.offset = to;
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(s) = self.sink.as_ref() {
            s.set_volume(volume);
        }
    }

    fn publish(&self, info: &EngineHandle) {
        let (elapsed, finished) = match self.sink.as_ref() {
            Some(s) => (self.offset + s.get_pos(), !self.paused && s.empty()),
            None => (Duration::ZERO, false),
        };
        if let Ok(mut i) = info.lock() {
            i.elapsed = elapsed;
            i.finished = finished;
        }
    }

    fn fade_out(&self, fade_out_ms: u64) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        if self.paused || fade_out_ms == 0 {
            sink.set_volume(0.0);
            return;
        }
        let steps: u64 = 20;
        let step_ms = (fade_out_ms / steps).max(1);
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            sink.set_volume(self.volume * (1.0 - t));
            thread::sleep(Duration::from_millis(step_ms));
        }
        sink.set_volume(0.0);
    }
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<EngineCmd>,
    info: EngineHandle,
    volume: f32,
    ready: Sender<Result<(), PlaybackError>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                let _ = ready.send(Err(PlaybackError::EngineUnavailable(e.to_string())));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped, which would land on the TUI.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));

        let mut output = Output {
            current: None,
            sink: None,
            paused: true,
            offset: Duration::ZERO,
            volume,
        };

        loop {
            match rx.recv_timeout(Duration::from_millis(100)) {
                Ok(EngineCmd::Load { track, reply }) => {
                    reply.finish(output.load(&stream, track));
                }
                Ok(EngineCmd::Play) => output.play(),
                Ok(EngineCmd::Pause) => output.pause(),
                Ok(EngineCmd::Stop) => output.stop(),
                Ok(EngineCmd::Seek { to, reply }) => {
                    reply.finish(output.seek(&stream, to));
                }
                Ok(EngineCmd::SetVolume(v)) => output.set_volume(v),
                Ok(EngineCmd::Quit { fade_out_ms }) => {
                    output.fade_out(fade_out_ms);
                    output.stop();
                    break;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            output.publish(&info);
        }
    })
}
