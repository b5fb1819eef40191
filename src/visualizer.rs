use std::time::Instant;

use crate::math::{
    fibonacci_sphere, multiply_matrices, multiply_matrix_vector, perspective_scale,
    rotation_about_x, rotation_about_y,
};
use crate::point::{Point, ProjectedPoint};
use crate::state::{AppState, OpacityStyle};

/// How far outside the viewport a projected point may fall before culling
const CULL_MARGIN: f64 = 10.0;
/// Dot radius per unit of perspective scale; dots stay thin
const DOT_SIZE: f64 = 0.6;

/// Sphere geometry and projection parameters
#[derive(Debug, Clone, Copy)]
pub struct SceneConfig {
    pub points: usize,
    pub radius: f64,
    pub focal_length: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            points: 800,
            radius: 100.0,
            focal_length: 300.0,
        }
    }
}

/// Abstract-pixel viewport the sphere is projected into
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// 3D voice-orb widget: a fixed point cloud plus frame bookkeeping. The
/// cloud is generated once; every frame is derived from it from scratch.
pub struct Visualizer {
    points: Vec<Point>,
    config: SceneConfig,
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
}

impl Visualizer {
    pub fn new(config: SceneConfig) -> Self {
        let points = fibonacci_sphere(config.points, config.radius)
            .into_iter()
            .map(|original| Point { original })
            .collect();
        Visualizer {
            points,
            config,
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
        }
    }

    /// Project the point cloud for the current frame, returning the render
    /// set sorted ascending by depth. Pure in its inputs: identical state,
    /// time and audio level produce identical output.
    pub fn project(&self, data: &AppState, viewport: Viewport) -> Vec<ProjectedPoint> {
        let style = data.state.style();
        let focal = self.config.focal_length;
        let center_x = viewport.width / 2.0;
        let center_y = viewport.height / 2.0;
        let time = data.time;
        let level = data.audio_level;

        // slow breathing pulsation, independent of audio
        let pulse_y = (time * 0.6).sin() * 0.08;
        let pulse_z = (time * 0.4).cos() * 0.06;

        let rotation = multiply_matrices(
            &rotation_about_x(data.rotation.x),
            &rotation_about_y(data.rotation.y),
        );

        let mut projected = Vec::with_capacity(self.points.len());
        for (index, point) in self.points.iter().enumerate() {
            let [mut x, mut y, mut z] = multiply_matrix_vector(&rotation, &point.original);

            y += y * pulse_y;
            z += z * pulse_z;

            // radial ripple, out of phase per point
            let i = index as f64;
            let offset = (time * style.wave.speed + i * style.wave.phase_step).sin()
                * (style.wave.amplitude + level * style.wave.level_gain);

            let distance = (x * x + y * y + z * z).sqrt();
            if distance > 0.0 {
                let factor = (distance + offset) / distance;
                x *= factor;
                y *= factor;
                z *= factor;
            }

            if z <= -focal {
                // behind the camera plane
                continue;
            }
            let scale = perspective_scale(focal, z);
            let px = center_x + x * scale;
            let py = center_y + y * scale;
            if px < -CULL_MARGIN
                || px > viewport.width + CULL_MARGIN
                || py < -CULL_MARGIN
                || py > viewport.height + CULL_MARGIN
            {
                continue;
            }

            let opacity = match style.opacity {
                OpacityStyle::DepthFade { floor } => (scale * 0.8).max(floor),
                OpacityStyle::Pulse {
                    bias,
                    speed,
                    phase_step,
                    amplitude,
                    level_gain,
                    floor,
                } => (bias + (time * speed + i * phase_step).sin() * amplitude
                    + level * level_gain)
                    .clamp(floor, 1.0),
            };
            let glow = style.glow.map_or(0.0, |g| {
                (g.base + (time * g.speed + i * g.phase_step).sin() * g.amplitude
                    + level * g.level_gain)
                    .max(g.min)
            });

            projected.push(ProjectedPoint {
                x: px,
                y: py,
                depth: z,
                size: DOT_SIZE * scale,
                opacity,
                color: style.color,
                glow,
            });
        }

        projected.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        projected
    }

    /// Update the fps counter; call once per painted frame.
    pub fn note_frame(&mut self) {
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }
}
