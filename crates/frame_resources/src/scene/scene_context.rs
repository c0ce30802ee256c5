use std::f32::consts::PI;

use bevy_math::Mat4;
use bevy_math::Vec2;
use bevy_math::Vec3;

use super::FrameTimer;
use crate::constants::LIGHT_COUNT;
use crate::constants::Light;
use crate::constants::PassConstants;

const FOV_Y: f32 = 0.25 * PI;
const NEAR_Z: f32 = 1.0;
const FAR_Z: f32 = 1000.0;

/// Camera, viewport and timer state feeding the per-pass constants.
pub struct SceneContext {
    width: u32,
    height: u32,
    theta: f32,
    phi: f32,
    radius: f32,
    eye_pos: Vec3,
    view: Mat4,
    proj: Mat4,
    pub lights: [Light; LIGHT_COUNT],
    pub timer: FrameTimer,
}

impl SceneContext {
    pub fn new(width: u32, height: u32) -> Self {
        let mut context = Self {
            width,
            height,
            theta: 1.24 * PI,
            phi: 0.42 * PI,
            radius: 12.0,
            eye_pos: Vec3::ZERO,
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            lights: [
                Light::directional(Vec3::new(0.57735, -0.57735, 0.57735), Vec3::splat(0.6)),
                Light::directional(Vec3::new(-0.57735, -0.57735, 0.57735), Vec3::splat(0.3)),
                Light::directional(Vec3::new(0.0, -0.707, -0.707), Vec3::splat(0.15)),
            ],
            timer: FrameTimer::new(),
        };
        context.on_resize(width, height);
        context.update_camera();
        context
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }

    pub fn eye_pos(&self) -> Vec3 {
        self.eye_pos
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.proj = Mat4::perspective_lh(FOV_Y, self.aspect_ratio(), NEAR_Z, FAR_Z);
    }

    /// Orbits the camera; angles are in radians.
    pub fn orbit(&mut self, d_theta: f32, d_phi: f32) {
        self.theta += d_theta;
        self.phi = (self.phi + d_phi).clamp(0.1, PI - 0.1);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.radius = (self.radius + delta).clamp(5.0, 150.0);
    }

    pub fn update_camera(&mut self) {
        self.eye_pos = Vec3::new(
            self.radius * self.phi.sin() * self.theta.cos(),
            self.radius * self.phi.cos(),
            self.radius * self.phi.sin() * self.theta.sin(),
        );
        self.view = Mat4::look_at_lh(self.eye_pos, Vec3::ZERO, Vec3::Y);
    }

    pub fn main_pass_constants(&self) -> PassConstants {
        let mut pass = PassConstants::default();
        pass.set_camera(self.view, self.proj, self.eye_pos);
        pass.set_render_target_size(Vec2::new(self.width.max(1) as f32, self.height.max(1) as f32));
        pass.near_z = NEAR_Z;
        pass.far_z = FAR_Z;
        pass.total_time = self.timer.total_seconds();
        pass.delta_time = self.timer.delta_seconds();
        pass.lights = self.lights;
        pass
    }

    /// Main pass with every light mirrored across the xy plane.
    pub fn reflected_pass_constants(&self, main: &PassConstants) -> PassConstants {
        let mut reflected = *main;
        for light in &mut reflected.lights {
            light.direction[2] = -light.direction[2];
        }
        reflected
    }

    /// Records for the main and reflected passes, in pass record order.
    pub fn pass_constants(&self) -> [PassConstants; 2] {
        let main = self.main_pass_constants();
        let reflected = self.reflected_pass_constants(&main);
        [main, reflected]
    }
}
