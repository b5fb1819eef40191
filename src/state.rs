use crate::point::Rgba;

/// Assistant state asserted by the host. The visualizer never decides
/// transitions, it only renders whichever state is currently set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualState {
    Idle,
    Listening,
    Speaking,
    Thinking,
}

/// Radial ripple parameters:
/// `offset = sin(time * speed + index * phase_step) * (amplitude + level * level_gain)`
#[derive(Debug, Clone, Copy)]
pub struct Wave {
    pub speed: f64,
    pub phase_step: f64,
    pub amplitude: f64,
    pub level_gain: f64,
}

/// How per-dot opacity is derived for a state.
#[derive(Debug, Clone, Copy)]
pub enum OpacityStyle {
    /// `max(floor, depth_scale * 0.8)`
    DepthFade { floor: f64 },
    /// `clamp(bias + sin(time * speed + index * phase_step) * amplitude + level * level_gain, floor, 1)`
    Pulse {
        bias: f64,
        speed: f64,
        phase_step: f64,
        amplitude: f64,
        level_gain: f64,
        floor: f64,
    },
}

/// Glow parameters, clamped from below at `min`.
#[derive(Debug, Clone, Copy)]
pub struct Glow {
    pub base: f64,
    pub speed: f64,
    pub phase_step: f64,
    pub amplitude: f64,
    pub level_gain: f64,
    pub min: f64,
}

/// Everything the frame transform needs to know about one state, consumed
/// once per frame instead of branching per property.
#[derive(Debug, Clone, Copy)]
pub struct StateStyle {
    /// Per-frame rotation increment, `[y, x]`
    pub rotation_step: [f64; 2],
    pub wave: Wave,
    pub color: Rgba,
    pub opacity: OpacityStyle,
    pub glow: Option<Glow>,
}

const IDLE: StateStyle = StateStyle {
    rotation_step: [0.002, 0.001],
    wave: Wave {
        speed: 0.001,
        phase_step: 0.03,
        amplitude: 2.0,
        level_gain: 0.0,
    },
    color: Rgba::new(55, 65, 81, 0.7),
    opacity: OpacityStyle::DepthFade { floor: 0.1 },
    glow: None,
};

const LISTENING: StateStyle = StateStyle {
    rotation_step: [0.005, 0.002],
    wave: Wave {
        speed: 0.003,
        phase_step: 0.06,
        amplitude: 6.0,
        level_gain: 3.0,
    },
    color: Rgba::new(71, 85, 105, 0.8),
    opacity: OpacityStyle::Pulse {
        bias: 0.5,
        speed: 0.8,
        phase_step: 0.015,
        amplitude: 0.15,
        level_gain: 0.15,
        floor: 0.3,
    },
    glow: Some(Glow {
        base: 0.8,
        speed: 0.6,
        phase_step: 0.02,
        amplitude: 0.4,
        level_gain: 0.8,
        min: 0.0,
    }),
};

const SPEAKING: StateStyle = StateStyle {
    rotation_step: [0.005, 0.002],
    wave: Wave {
        speed: 0.004,
        phase_step: 0.08,
        amplitude: 7.0,
        level_gain: 3.5,
    },
    color: Rgba::new(124, 58, 237, 0.9),
    opacity: OpacityStyle::Pulse {
        bias: 0.6,
        speed: 1.0,
        phase_step: 0.02,
        amplitude: 0.15,
        level_gain: 0.2,
        floor: 0.4,
    },
    // glow never dips below its 1.0 baseline while speaking
    glow: Some(Glow {
        base: 1.0,
        speed: 0.8,
        phase_step: 0.025,
        amplitude: 0.5,
        level_gain: 1.2,
        min: 1.0,
    }),
};

const THINKING: StateStyle = StateStyle {
    rotation_step: [0.008, 0.003],
    wave: Wave {
        speed: 0.005,
        phase_step: 0.1,
        amplitude: 8.0,
        level_gain: 0.0,
    },
    color: Rgba::new(37, 99, 235, 0.8),
    opacity: OpacityStyle::DepthFade { floor: 0.4 },
    glow: Some(Glow {
        base: 0.0,
        speed: 2.0,
        phase_step: 0.1,
        amplitude: 0.5,
        level_gain: 0.0,
        min: 0.0,
    }),
};

impl VisualState {
    /// Collapse the host's mutually exclusive flags into a state; idle is
    /// the fallback when none is set.
    pub fn from_flags(recording: bool, playing: bool, processing: bool) -> Self {
        if recording {
            Self::Listening
        } else if playing {
            Self::Speaking
        } else if processing {
            Self::Thinking
        } else {
            Self::Idle
        }
    }

    pub fn style(self) -> &'static StateStyle {
        match self {
            Self::Idle => &IDLE,
            Self::Listening => &LISTENING,
            Self::Speaking => &SPEAKING,
            Self::Thinking => &THINKING,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Listening => "listening",
            Self::Speaking => "speaking",
            Self::Thinking => "thinking",
        }
    }
}

/// Accumulated rotation angles. The only state that persists and mutates
/// across frames; never reset or wrapped mid-animation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rotation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Current assistant state
    pub state: VisualState,
    /// Audio level in `0.0..=1.0`
    pub audio_level: f64,
    /// Frequency bins from the audio source. Carried for the host overlay;
    /// the per-point offset uses only the scalar level.
    pub spectrum: Vec<u8>,
    /// Current rotation of the point cloud
    pub rotation: Rotation,
    /// Animation clock in seconds
    pub time: f64,
    /// Simulation paused
    pub paused: bool,
    /// Debug overlay enabled
    pub debug: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            state: VisualState::Idle,
            audio_level: 0.0,
            spectrum: Vec::new(),
            rotation: Rotation::default(),
            time: 0.0,
            paused: false,
            debug: false,
        }
    }

    /// Advance the animation clock by `dt` seconds and the rotation by one
    /// fixed per-frame increment for the current state.
    pub fn advance(&mut self, dt: f64) {
        if self.paused {
            return;
        }
        self.time += dt;
        let [step_y, step_x] = self.state.style().rotation_step;
        self.rotation.y += step_y;
        self.rotation.x += step_x;
    }
}

/// Scripted assistant exchange used by auto mode: a short idle lead-in,
/// then listening, thinking and speaking in a loop.
pub struct Session {
    phase: usize,
    elapsed: f64,
}

const PHASES: [(VisualState, f64); 4] = [
    (VisualState::Idle, 1.5),
    (VisualState::Listening, 4.0),
    (VisualState::Thinking, 1.8),
    (VisualState::Speaking, 5.0),
];

impl Session {
    pub fn new() -> Self {
        Self {
            phase: 0,
            elapsed: 0.0,
        }
    }

    /// State for this tick, advancing through the script. The idle lead-in
    /// runs once; afterwards the exchange phases cycle.
    pub fn tick(&mut self, dt: f64) -> VisualState {
        self.elapsed += dt;
        while self.elapsed >= PHASES[self.phase].1 {
            self.elapsed -= PHASES[self.phase].1;
            self.phase += 1;
            if self.phase == PHASES.len() {
                self.phase = 1;
            }
        }
        PHASES[self.phase].0
    }
}
