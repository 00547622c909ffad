// THEORY:
// The `stage` module is the top-level API of the engine. It owns one analyzer and
// its consumers and runs them once per displayed frame, in the order the
// installation needs: analyze, pick a sound, paint the wash. The debug overlay is
// drawn on demand onto its own surface.
//
// The background music is owned here too, so the shell can start it together
// with capture and reach it later to fade it out.
//
// The stage holds no timer of its own. The shell calls `tick` from its frame
// callback; if the shell stops calling, analysis simply pauses, and stopping the
// loop is just not calling again.

use crate::config::{AnalyzerConfig, MAX_SENSITIVITY};
use crate::core_modules::debug_overlay::DebugOverlayRenderer;
use crate::core_modules::frame::Frame;
use crate::core_modules::motion_analyzer::{IntensityVector, MotionAnalyzer};
use crate::error::EngineResult;
use crate::reactions::audio::{AudioReaction, TierTrigger};
use crate::reactions::visual::VisualReaction;
use crate::sound::{AudioEngine, MusicLoop, SoundBank};
use crate::surface::RenderSurface;

/// Everything produced by one `tick`.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub intensities: IntensityVector,
    /// The sound tier selected this frame, whether or not a sample could play.
    pub trigger: Option<TierTrigger>,
}

pub struct Stage {
    analyzer: MotionAnalyzer,
    visual: VisualReaction,
    audio: AudioReaction,
    /// Only present when the configuration asks for a debug canvas.
    debug_overlay: Option<DebugOverlayRenderer>,
    sound_bank: Option<SoundBank>,
    music: Option<MusicLoop>,
    show_debug: bool,
    last_intensities: IntensityVector,
}

impl Stage {
    pub fn new(config: AnalyzerConfig) -> EngineResult<Self> {
        let analyzer = MotionAnalyzer::new(config)?;
        let grid = analyzer.grid();
        let audio = AudioReaction::new(grid.columns(), grid.rows());
        let debug_overlay = analyzer
            .config()
            .display_debug_canvas
            .then(|| DebugOverlayRenderer::new(grid.len()));
        let last_intensities = IntensityVector::zeros(grid.len());

        Ok(Self {
            analyzer,
            visual: VisualReaction::new(),
            audio,
            debug_overlay,
            sound_bank: None,
            music: None,
            show_debug: false,
            last_intensities,
        })
    }

    pub fn analyzer(&self) -> &MotionAnalyzer {
        &self.analyzer
    }

    pub fn visual(&self) -> &VisualReaction {
        &self.visual
    }

    pub fn audio(&self) -> &AudioReaction {
        &self.audio
    }

    /// Installs the sound sets once they have finished loading.
    pub fn set_sound_bank(&mut self, bank: SoundBank) {
        self.sound_bank = Some(bank);
    }

    pub fn sound_bank(&self) -> Option<&SoundBank> {
        self.sound_bank.as_ref()
    }

    pub fn set_music(&mut self, music: MusicLoop) {
        self.music = Some(music);
    }

    pub fn music(&self) -> Option<&MusicLoop> {
        self.music.as_ref()
    }

    /// Access for volume changes and the fade-out.
    pub fn music_mut(&mut self) -> Option<&mut MusicLoop> {
        self.music.as_mut()
    }

    /// Starts the background loop, if one is installed. Call when capture starts.
    pub fn start_music(&self, engine: &mut dyn AudioEngine) -> bool {
        self.music.as_ref().is_some_and(|music| music.play(engine))
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.audio.set_gain(gain);
    }

    /// User-facing sensitivity: higher means more sensitive. Forwarded to the
    /// analyzer as the inverse threshold `100 - value`; values whose inverse
    /// cannot be represented are ignored like any other out-of-range value.
    pub fn set_sensitivity(&mut self, value: i64) {
        if let Some(threshold) = (MAX_SENSITIVITY as i64).checked_sub(value) {
            self.analyzer.set_sensitivity(threshold);
        }
    }

    pub fn show_debug(&self) -> bool {
        self.show_debug
    }

    pub fn set_show_debug(&mut self, show: bool) {
        self.show_debug = show;
    }

    pub fn last_intensities(&self) -> &IntensityVector {
        &self.last_intensities
    }

    /// Runs one frame: analyze, trigger audio, paint the wash onto `output`.
    pub fn tick(
        &mut self,
        frame: &Frame,
        output: &mut dyn RenderSurface,
        engine: &mut dyn AudioEngine,
    ) -> TickReport {
        let emit_debug = self.show_debug && self.debug_overlay.is_some();
        let intensities = self.analyzer.analyze(frame, emit_debug);

        let trigger = self
            .audio
            .generate(&intensities, self.sound_bank.as_ref(), engine);
        self.visual.update(&intensities, output);

        self.last_intensities = intensities.clone();
        TickReport {
            intensities,
            trigger,
        }
    }

    /// Draws the last mask and the region afterglow. Returns `false` when the
    /// debug view is hidden or was not configured.
    pub fn render_debug(&mut self, surface: &mut dyn RenderSurface) -> bool {
        if !self.show_debug {
            return false;
        }
        let Some(overlay) = self.debug_overlay.as_mut() else {
            return false;
        };
        overlay.render(
            surface,
            self.analyzer.grid(),
            self.analyzer.last_mask(),
            &self.last_intensities,
        );
        true
    }
}
