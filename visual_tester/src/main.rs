use anyhow::{Context, bail};
use clap::Parser;
use heavenly_glory::sound::music::{DEFAULT_MUSIC_VOLUME, FADE_INTERVAL, MUSIC_TRACK};
use heavenly_glory::sound::{
    AudioEngine, FileSampleLoader, MusicLoop, PlayRequest, PlaybackGuard, Sound, SoundBank, SoundManifest,
};
use heavenly_glory::surface::{ImageSurface, RenderSurface};
use heavenly_glory::{AnalyzerConfig, Frame, Stage};
use opencv::{
    core::{self, Mat, Scalar},
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture, VideoWriter},
};
use std::env;
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Master gain the installation ran its sound effects at.
const INSTALLATION_GAIN: f32 = 3.0;
/// How long a triggered sample is assumed to sound, in seconds.
const NOMINAL_SAMPLE_SECONDS: f64 = 1.0;

/// Stands in for a real audio output: logs each trigger and keeps the playback
/// guard for a fixed number of frames, as if the sample were sounding.
struct LoggingAudioEngine {
    frames_per_sample: u32,
    sounding: Vec<(u32, PlaybackGuard)>,
    music: Option<PlaybackGuard>,
}

impl LoggingAudioEngine {
    fn new(fps: f64) -> Self {
        Self {
            frames_per_sample: (fps * NOMINAL_SAMPLE_SECONDS).round().max(1.0) as u32,
            sounding: Vec::new(),
            music: None,
        }
    }

    /// Advances playback by one frame, releasing samples that have ended.
    fn advance(&mut self) {
        self.sounding.retain_mut(|(frames_left, _)| {
            *frames_left = frames_left.saturating_sub(1);
            *frames_left > 0
        });
    }
}

impl AudioEngine for LoggingAudioEngine {
    fn play(&mut self, request: PlayRequest<'_>, guard: PlaybackGuard) {
        info!(
            family = ?request.family,
            sample = %request.sound.name,
            volume = request.volume,
            gain = request.gain,
            x = request.pan.x,
            y = request.pan.y,
            "play"
        );
        self.sounding.push((self.frames_per_sample, guard));
    }

    fn play_loop(&mut self, track: &Sound, gain: f32, guard: PlaybackGuard) {
        info!(track = %track.name, gain, "music started");
        self.music = Some(guard);
    }

    fn set_loop_gain(&mut self, gain: f32) {
        info!(gain, "music gain");
    }

    fn stop_loop(&mut self) {
        if self.music.take().is_some() {
            info!("music stopped");
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "visual_tester",
    about = "Runs the motion stage over a video file and writes the composited result",
    version
)]
struct Cli {
    /// Video to analyze.
    input: PathBuf,

    /// Where to write the composited video.
    output: PathBuf,

    /// Asset root holding `assets/audio/*.ogg`. Without it the run is silent.
    #[arg(long)]
    sounds: Option<PathBuf>,

    /// User-facing sensitivity, 0 (least) to 100 (most sensitive).
    #[arg(long, allow_negative_numbers = true)]
    sensitivity: Option<i64>,

    /// Overlay the change mask and region afterglow, and save the last debug view.
    #[arg(long)]
    debug: bool,

    /// Skip the background music fade-out at the end of the video.
    #[arg(long = "no-fade")]
    no_fade: bool,
}

fn init_tracing() {
    let use_json = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("heavenly_glory=info,visual_tester=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(env_filter)
            .init();
    }
}

fn load_audio(runtime: &Runtime, root: PathBuf) -> anyhow::Result<(SoundBank, MusicLoop)> {
    let loader = FileSampleLoader::new(root);
    runtime.block_on(async {
        let (bank, music) = tokio::try_join!(
            SoundBank::load(&loader, &SoundManifest::default()),
            MusicLoop::load(&loader, MUSIC_TRACK, DEFAULT_MUSIC_VOLUME),
        )?;
        Ok((bank, music))
    })
}

/// Converts an OpenCV BGR frame into a mirrored RGBA `Frame`, the way the
/// installation shows the camera to the audience.
fn mat_to_frame(mat: &Mat) -> anyhow::Result<Frame> {
    let mut rgba = Mat::default();
    imgproc::cvt_color(mat, &mut rgba, imgproc::COLOR_BGR2RGBA, 0)?;
    let frame = Frame::new(rgba.cols() as u32, rgba.rows() as u32, rgba.data_bytes()?.to_vec())?;
    Ok(frame.mirrored())
}

fn frame_to_mat(frame: &Frame) -> anyhow::Result<Mat> {
    let mut rgba = Mat::new_rows_cols_with_default(
        frame.height() as i32,
        frame.width() as i32,
        core::CV_8UC4,
        Scalar::all(0.0),
    )?;
    rgba.data_bytes_mut()?.copy_from_slice(frame.as_bytes());
    let mut bgr = Mat::default();
    imgproc::cvt_color(&rgba, &mut bgr, imgproc::COLOR_RGBA2BGR, 0)?;
    Ok(bgr)
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Cli::parse();
    let input = args.input.to_string_lossy();
    let output_path = args.output.to_string_lossy();

    let mut cap = VideoCapture::from_file(&input, videoio::CAP_ANY)?;
    if !cap.is_opened()? {
        bail!("could not open video file {input}");
    }

    let frame_width = cap.get(videoio::CAP_PROP_FRAME_WIDTH)? as i32;
    let frame_height = cap.get(videoio::CAP_PROP_FRAME_HEIGHT)? as i32;
    let fps = cap.get(videoio::CAP_PROP_FPS)?;

    let fourcc = VideoWriter::fourcc('m', 'p', '4', 'v')?;
    let mut writer = VideoWriter::new(
        &output_path,
        fourcc,
        fps,
        core::Size::new(frame_width, frame_height),
        true,
    )?;

    let config = AnalyzerConfig {
        display_debug_canvas: args.debug,
        ..AnalyzerConfig::default()
    };
    let (work_width, work_height) = (config.width, config.height);
    let mut stage = Stage::new(config)?;
    stage.set_gain(INSTALLATION_GAIN);
    stage.set_show_debug(args.debug);
    if let Some(value) = args.sensitivity {
        stage.set_sensitivity(value);
    }
    let runtime = Runtime::new().context("failed to start the async runtime")?;
    if let Some(root) = args.sounds {
        match load_audio(&runtime, root) {
            Ok((bank, music)) => {
                stage.set_sound_bank(bank);
                stage.set_music(music);
            }
            Err(error) => warn!(%error, "running without sound"),
        }
    }

    let mut engine = LoggingAudioEngine::new(fps);
    stage.start_music(&mut engine);
    let mut debug_view = None;
    let mut frame_count = 0u64;
    let mut mat = Mat::default();

    while cap.read(&mut mat)? {
        if mat.empty() {
            break;
        }

        let frame = mat_to_frame(&mat)?;
        let mut output = ImageSurface::from_frame(&frame);
        let report = stage.tick(&frame, &mut output, &mut engine);
        engine.advance();

        if args.debug {
            let mut debug_surface = ImageSurface::new(work_width, work_height);
            if stage.render_debug(&mut debug_surface) {
                let debug_frame = debug_surface.into_frame();
                output.put_frame(&debug_frame);
                debug_view = Some(debug_frame);
            }
        }

        writer.write(&frame_to_mat(&output.into_frame())?)?;
        frame_count += 1;
        if frame_count % 100 == 0 {
            info!(frame_count, peak = report.intensities.peak(), "progress");
        }
    }

    if let Some(debug_frame) = debug_view {
        let snapshot = format!("{output_path}.debug.png");
        debug_frame.save_png(&snapshot)?;
        info!(path = %snapshot, "saved last debug view");
    }

    if !args.no_fade {
        if let Some(music) = stage.music_mut() {
            runtime.block_on(music.fade_out(FADE_INTERVAL, &mut engine));
        }
    }

    info!(frame_count, output = %output_path, "processing complete");
    Ok(())
}
