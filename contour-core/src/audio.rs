//! Audio I/O: microphone capture and buffer playback.
//!
//! Capture streams fixed-size frames from the default input device to the
//! live pipeline over a crossbeam channel. Playback runs on its own
//! command-driven thread that owns the cpal output stream, so the playback
//! cursor (which may be shared across threads) never holds the stream
//! handle itself.

use std::sync::Arc;

use cpal::SupportedStreamConfigRange;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;

use crate::error::AnalysisError;
use crate::playback::RenderSink;

/// Target capture rate; actual rate is reported back to the caller.
const TARGET_SAMPLE_RATE: u32 = 44100;

/// Starts audio capture from the default input device.
///
/// Frames of exactly `frame_size` samples are accumulated inside the
/// stream callback and sent through `sender`; partial buffers are carried
/// over to the next callback. Returns the live stream handle (capture
/// stops when it is dropped) and the negotiated sample rate.
pub fn start_capture(
    sender: Sender<Vec<f32>>,
    frame_size: usize,
) -> Result<(cpal::Stream, u32), AnalysisError> {
    let host = cpal::default_host();
    let device = host.default_input_device().ok_or_else(|| {
        AnalysisError::DeviceAccess("no input device available; is a microphone connected?".into())
    })?;

    let name = device
        .name()
        .unwrap_or_else(|_| "<unnamed device>".to_string());
    log::info!("using audio input device: {name}");

    let configs = device
        .supported_input_configs()
        .map_err(|e| AnalysisError::DeviceAccess(format!("cannot query {name}: {e}")))?
        .collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, TARGET_SAMPLE_RATE).ok_or_else(|| {
        AnalysisError::DeviceAccess(format!("{name} offers no mono f32 input format"))
    })?;

    let config = supported_config.with_sample_rate(cpal::SampleRate(TARGET_SAMPLE_RATE));
    let sample_rate = config.sample_rate().0;
    let config: cpal::StreamConfig = config.into();
    log::info!("capture sample rate: {sample_rate} Hz");

    let err_fn = |err| log::error!("audio capture stream error: {err}");

    // Accumulates callback data until a full frame is available.
    let mut pending = Vec::with_capacity(frame_size * 2);

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                pending.extend_from_slice(data);
                while pending.len() >= frame_size {
                    let frame = pending[..frame_size].to_vec();
                    // Drop frames when the analysis side lags; capture
                    // must never block inside the callback.
                    let _ = sender.try_send(frame);
                    pending.drain(..frame_size);
                }
            },
            err_fn,
            None,
        )
        .map_err(|e| AnalysisError::DeviceAccess(format!("cannot open input stream: {e}")))?;

    stream
        .play()
        .map_err(|e| AnalysisError::DeviceAccess(format!("cannot start input stream: {e}")))?;

    Ok((stream, sample_rate))
}

/// Picks the closest mono f32 input configuration to the target rate.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.channels() == 1 && c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let min_diff = (c.min_sample_rate().0 as i32 - target_rate as i32).abs();
            let max_diff = (c.max_sample_rate().0 as i32 - target_rate as i32).abs();
            min_diff.min(max_diff)
        })
}

/// Commands understood by the playback thread.
enum PlayerCommand {
    /// Begin rendering from an offset in seconds.
    Start(f64),
    /// Release the live output stream.
    Stop,
    /// Exit the playback thread.
    Shutdown,
}

/// [`RenderSink`] that plays the loaded (unfiltered) buffer through the
/// default output device.
///
/// The cpal stream lives on a dedicated thread; the sink itself only holds
/// a command channel and is freely `Send`.
pub struct BufferRenderSink {
    command_tx: Sender<PlayerCommand>,
}

impl BufferRenderSink {
    /// Spawns the playback thread for one loaded buffer.
    pub fn new(samples: Arc<Vec<f32>>, sample_rate: u32) -> Self {
        let (command_tx, command_rx) = crossbeam_channel::unbounded();

        std::thread::spawn(move || {
            // Owns the output stream; dropping it stops rendering.
            let mut stream: Option<cpal::Stream> = None;
            for command in command_rx.iter() {
                match command {
                    PlayerCommand::Start(from_secs) => {
                        stream = None;
                        match open_output_stream(Arc::clone(&samples), sample_rate, from_secs) {
                            Ok(s) => stream = Some(s),
                            Err(e) => log::error!("playback start failed: {e}"),
                        }
                    }
                    PlayerCommand::Stop => stream = None,
                    PlayerCommand::Shutdown => break,
                }
            }
            drop(stream);
        });

        Self { command_tx }
    }
}

impl RenderSink for BufferRenderSink {
    fn start(&mut self, from_secs: f64) -> anyhow::Result<()> {
        self.command_tx.send(PlayerCommand::Start(from_secs))?;
        Ok(())
    }

    fn stop(&mut self) {
        let _ = self.command_tx.send(PlayerCommand::Stop);
    }
}

impl Drop for BufferRenderSink {
    fn drop(&mut self) {
        let _ = self.command_tx.send(PlayerCommand::Shutdown);
    }
}

/// Builds an output stream that renders `samples` starting at `from_secs`.
fn open_output_stream(
    samples: Arc<Vec<f32>>,
    sample_rate: u32,
    from_secs: f64,
) -> anyhow::Result<cpal::Stream> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow::anyhow!("no output device available"))?;
    let config = device.default_output_config()?;
    let channels = config.channels() as usize;
    let device_rate = config.sample_rate().0 as f64;
    let config: cpal::StreamConfig = config.into();

    // Fractional read position in source frames; stepping by the rate
    // ratio resamples on the fly when device and source rates differ.
    let mut position = from_secs * sample_rate as f64;
    let step = sample_rate as f64 / device_rate;

    let err_fn = |err| log::error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(channels) {
                let idx = position as usize;
                let value = samples.get(idx).copied().unwrap_or(0.0);
                for out in frame.iter_mut() {
                    *out = value;
                }
                position += step;
            }
        },
        err_fn,
        None,
    )?;
    stream.play()?;
    Ok(stream)
}
