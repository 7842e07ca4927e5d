use std::collections::VecDeque;
use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use cpal::Sample;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use symphonia::core::audio::{SampleBuffer, SignalSpec};
use symphonia::core::codecs::{CODEC_TYPE_NULL, Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::Time;
use tracing::{debug, error, info, warn};

use crate::events::types::AppEvent;
use crate::player::commands::{PlayerCommand, PlayerState};
use crate::player::error::PlayerError;

const POSITION_INTERVAL: Duration = Duration::from_millis(100);
const IDLE_SLEEP: Duration = Duration::from_millis(50);

struct AudioOutput {
    ring_buffer: Arc<Mutex<VecDeque<f32>>>,
    spec: SignalSpec,
    _stream: cpal::Stream,
    paused: Arc<AtomicBool>,
}

impl AudioOutput {
    fn new(spec: SignalSpec) -> Result<Self, PlayerError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(PlayerError::NoOutputDevice)?;

        let config = cpal::StreamConfig {
            channels: spec.channels.count() as u16,
            sample_rate: cpal::SampleRate(spec.rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let buffer_capacity = spec.rate as usize * spec.channels.count() * 5;
        let ring_buffer = Arc::new(Mutex::new(VecDeque::with_capacity(buffer_capacity)));
        let ring_buffer_clone = ring_buffer.clone();
        let paused = Arc::new(AtomicBool::new(false));
        let paused_clone = paused.clone();

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let paused = paused_clone.load(Ordering::Relaxed);
                let Ok(mut buffer) = ring_buffer_clone.lock() else {
                    data.fill(Sample::EQUILIBRIUM);
                    return;
                };
                for sample in data.iter_mut() {
                    *sample = if paused {
                        Sample::EQUILIBRIUM
                    } else {
                        buffer.pop_front().unwrap_or(Sample::EQUILIBRIUM)
                    };
                }
            },
            |err| error!("audio stream error: {}", err),
            None,
        )?;

        stream.play()?;

        Ok(AudioOutput {
            ring_buffer,
            spec,
            _stream: stream,
            paused,
        })
    }

    fn write_samples(&self, samples: &[f32]) {
        if let Ok(mut buffer) = self.ring_buffer.lock() {
            buffer.extend(samples.iter().copied());
        }
    }

    fn buffer_len(&self) -> usize {
        self.ring_buffer.lock().map(|b| b.len()).unwrap_or(0)
    }

    fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Relaxed);
    }

    fn clear_buffer(&self) {
        if let Ok(mut buffer) = self.ring_buffer.lock() {
            buffer.clear();
        }
    }

    fn channels(&self) -> usize {
        self.spec.channels.count().max(1)
    }
}

struct PlaybackContext {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    audio_output: AudioOutput,
    sample_buf: SampleBuffer<f32>,
    total_frames_decoded: u64,
    total_duration: Option<Duration>,
    draining: bool,
}

impl PlaybackContext {
    /// Position of the sample currently reaching the speakers, not the decoder head.
    fn audible_position(&self) -> Duration {
        let buffered_frames =
            (self.audio_output.buffer_len() / self.audio_output.channels()) as u64;
        let frames = self.total_frames_decoded.saturating_sub(buffered_frames);
        Duration::from_secs_f64(frames as f64 / self.audio_output.spec.rate as f64)
    }

    fn seek(&mut self, position: Duration) -> Result<(), PlayerError> {
        self.audio_output.clear_buffer();

        let seek_to = SeekTo::Time {
            time: Time::from(position.as_secs_f64()),
            track_id: Some(self.track_id),
        };
        self.format.seek(SeekMode::Accurate, seek_to)?;
        self.decoder.reset();
        self.total_frames_decoded =
            (position.as_secs_f64() * self.audio_output.spec.rate as f64) as u64;
        self.draining = false;
        Ok(())
    }
}

fn send_state(event_tx: &mpsc::Sender<AppEvent>, state: PlayerState) {
    let _ = event_tx.send(AppEvent::PlayerStateChanged(state));
}

fn send_error(event_tx: &mpsc::Sender<AppEvent>, generation: u64, message: String, fatal: bool) {
    let _ = event_tx.send(AppEvent::PlayerError {
        generation,
        message,
        fatal,
    });
}

pub fn spawn(
    cmd_rx: mpsc::Receiver<PlayerCommand>,
    event_tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut ctx: Option<PlaybackContext> = None;
        let mut is_paused = false;
        let mut generation = 0u64;
        let mut last_position_update = Instant::now();

        loop {
            match cmd_rx.try_recv() {
                Ok(cmd) => {
                    debug!(?cmd, "player command");
                    match cmd {
                        PlayerCommand::Play {
                            path,
                            position,
                            generation: play_generation,
                        } => {
                            ctx = None;
                            is_paused = false;
                            generation = play_generation;

                            send_state(&event_tx, PlayerState::Loading);

                            match load_audio(&path, position) {
                                Ok(new_ctx) => {
                                    info!(path = %path.display(), "playback started");
                                    if let Some(dur) = new_ctx.total_duration {
                                        let _ = event_tx.send(AppEvent::DurationChanged {
                                            generation,
                                            duration: dur,
                                        });
                                    }
                                    ctx = Some(new_ctx);
                                    send_state(&event_tx, PlayerState::Playing);
                                }
                                Err(e) => {
                                    warn!(
                                        path = %path.display(),
                                        error = %e,
                                        "failed to load audio"
                                    );
                                    send_error(&event_tx, generation, e.to_string(), true);
                                    send_state(&event_tx, PlayerState::Stopped);
                                }
                            }
                        }

                        PlayerCommand::Pause => {
                            if let Some(ref c) = ctx {
                                c.audio_output.set_paused(true);
                                is_paused = true;
                                send_state(&event_tx, PlayerState::Paused);
                            }
                        }

                        PlayerCommand::Resume => {
                            if let Some(ref c) = ctx {
                                c.audio_output.set_paused(false);
                                is_paused = false;
                                send_state(&event_tx, PlayerState::Playing);
                            }
                        }

                        PlayerCommand::Stop => {
                            if let Some(ref c) = ctx {
                                c.audio_output.clear_buffer();
                            }
                            ctx = None;
                            is_paused = false;
                            send_state(&event_tx, PlayerState::Stopped);
                        }

                        PlayerCommand::Seek(position) => {
                            if let Some(ref mut c) = ctx {
                                match c.seek(position) {
                                    Ok(()) => {
                                        let _ = event_tx.send(AppEvent::PositionUpdate {
                                            generation,
                                            position,
                                        });
                                    }
                                    // The source stays open and keeps playing
                                    Err(e) => {
                                        warn!(error = %e, "seek failed");
                                        send_error(
                                            &event_tx,
                                            generation,
                                            format!("Seek error: {}", e),
                                            false,
                                        );
                                    }
                                }
                            }
                        }
                    }
                }

                Err(TryRecvError::Empty) => {}

                Err(TryRecvError::Disconnected) => {
                    debug!("command channel closed, player thread exiting");
                    break;
                }
            }

            let Some(ref mut c) = ctx else {
                std::thread::sleep(IDLE_SLEEP);
                continue;
            };

            if is_paused {
                std::thread::sleep(IDLE_SLEEP);
                continue;
            }

            if last_position_update.elapsed() >= POSITION_INTERVAL {
                let _ = event_tx.send(AppEvent::PositionUpdate {
                    generation,
                    position: c.audible_position(),
                });
                last_position_update = Instant::now();
            }

            if c.draining {
                if c.audio_output.buffer_len() == 0 {
                    info!("track ended");
                    if let Some(dur) = c.total_duration {
                        let _ = event_tx.send(AppEvent::PositionUpdate {
                            generation,
                            position: dur,
                        });
                    }
                    ctx = None;
                    let _ = event_tx.send(AppEvent::TrackEnded { generation });
                    send_state(&event_tx, PlayerState::Stopped);
                } else {
                    std::thread::sleep(IDLE_SLEEP);
                }
                continue;
            }

            // Throttle if buffer is full
            let max_buffer = c.audio_output.spec.rate as usize * c.audio_output.channels() * 3;
            if c.audio_output.buffer_len() > max_buffer {
                std::thread::sleep(Duration::from_millis(10));
                continue;
            }

            match c.format.next_packet() {
                Ok(packet) => {
                    if packet.track_id() != c.track_id {
                        continue;
                    }

                    let failure = match c.decoder.decode(&packet) {
                        Ok(decoded) => {
                            let needed = decoded.capacity() * decoded.spec().channels.count();
                            if c.sample_buf.capacity() < needed {
                                c.sample_buf =
                                    SampleBuffer::new(decoded.capacity() as u64, *decoded.spec());
                            }
                            c.sample_buf.copy_interleaved_ref(decoded);
                            c.total_frames_decoded +=
                                (c.sample_buf.len() / c.audio_output.channels()) as u64;
                            c.audio_output.write_samples(c.sample_buf.samples());
                            None
                        }
                        Err(SymphoniaError::DecodeError(e)) => {
                            // Non-fatal, continue
                            warn!("decode error: {}", e);
                            None
                        }
                        Err(e) => Some(e),
                    };

                    if let Some(e) = failure {
                        warn!(error = %e, "decoder failed, dropping source");
                        send_error(&event_tx, generation, format!("Decode error: {}", e), true);
                        ctx = None;
                        send_state(&event_tx, PlayerState::Stopped);
                    }
                }

                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    c.draining = true;
                }

                Err(e) => {
                    send_error(&event_tx, generation, format!("Read error: {}", e), true);
                    ctx = None;
                    send_state(&event_tx, PlayerState::Stopped);
                }
            }
        }
    })
}

fn load_audio(path: &Path, start_position: Duration) -> Result<PlaybackContext, PlayerError> {
    let codecs = symphonia::default::get_codecs();
    let probe = symphonia::default::get_probe();

    let file = File::open(path).map_err(|source| PlayerError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = probe.format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(PlayerError::NoTrack)?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let total_duration = codec_params.time_base.and_then(|tb| {
        codec_params.n_frames.map(|frames| {
            let time = tb.calc_time(frames);
            Duration::from_secs_f64(time.seconds as f64 + time.frac)
        })
    });

    let mut decoder = codecs.make(&codec_params, &DecoderOptions::default())?;

    if start_position > Duration::ZERO {
        let seek_to = SeekTo::Time {
            time: Time::from(start_position.as_secs_f64()),
            track_id: Some(track_id),
        };
        format.seek(SeekMode::Accurate, seek_to)?;
        decoder.reset();
    }

    // Decode until the first valid buffer; decoders may need warm-up after a seek
    let (spec, first_samples) = loop {
        let packet = format.next_packet()?;

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let mut sample_buf = SampleBuffer::new(decoded.capacity() as u64, spec);
                sample_buf.copy_interleaved_ref(decoded);
                break (spec, sample_buf);
            }
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(e.into()),
        }
    };

    let audio_output = AudioOutput::new(spec)?;
    audio_output.write_samples(first_samples.samples());

    let first_frames = (first_samples.len() / spec.channels.count().max(1)) as u64;
    let start_frames = (start_position.as_secs_f64() * spec.rate as f64) as u64;

    let capacity_frames = first_samples.capacity() / spec.channels.count().max(1);
    let sample_buf = SampleBuffer::new(capacity_frames as u64, spec);

    Ok(PlaybackContext {
        format,
        decoder,
        track_id,
        audio_output,
        sample_buf,
        total_frames_decoded: start_frames + first_frames,
        total_duration,
        draining: false,
    })
}
