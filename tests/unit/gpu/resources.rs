use std::rc::Rc;

use super::*;
use crate::foundation::color::Color;
use crate::foundation::error::FxError;

const FILL: &str = "#version 300 es\nprecision highp float;\nout vec4 o;\nvoid main() { o = vec4(1.0); }\n";

fn device() -> (Rc<HeadlessDevice>, SharedDevice) {
    let d = Rc::new(HeadlessDevice::new(8, 4));
    let shared: SharedDevice = d.clone();
    (d, shared)
}

fn position(cmds: &[DeviceCommand], needle: &DeviceCommand) -> usize {
    cmds.iter()
        .position(|c| c == needle)
        .unwrap_or_else(|| panic!("missing {needle:?} in {cmds:?}"))
}

#[test]
fn framebuffer_is_released_before_its_texture() {
    let (d, shared) = device();
    let fb = Framebuffer::new(&shared, TextureDesc::new(4, 4, TextureFormat::Rgba8)).unwrap();
    let (fb_id, tex_id) = (fb.id(), fb.texture().id());
    assert_eq!((d.live_framebuffers(), d.live_textures()), (1, 1));

    fb.dispose();
    let cmds = d.commands();
    assert!(
        position(&cmds, &DeviceCommand::DeleteFramebuffer(fb_id))
            < position(&cmds, &DeviceCommand::DeleteTexture(tex_id))
    );
    assert_eq!((d.live_framebuffers(), d.live_textures()), (0, 0));
}

#[test]
fn program_is_released_before_its_shaders_and_only_once() {
    let (d, shared) = device();
    let program = ShaderProgram::new(&shared, FILL).unwrap();
    let pid = program.id();
    assert_eq!((d.live_programs(), d.live_shaders()), (1, 2));

    drop(program);
    let cmds = d.commands();
    let program_at = position(&cmds, &DeviceCommand::DeleteProgram(pid));
    let shader_deletes: Vec<usize> = cmds
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, DeviceCommand::DeleteShader(_)))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(shader_deletes.len(), 2);
    assert!(shader_deletes.iter().all(|&i| i > program_at));
    assert_eq!(
        cmds.iter()
            .filter(|c| **c == DeviceCommand::DeleteProgram(pid))
            .count(),
        1
    );
    assert_eq!((d.live_programs(), d.live_shaders()), (0, 0));
}

#[test]
fn fragment_compile_failure_is_a_gpu_error_and_leaks_nothing() {
    let (d, shared) = device();
    let err = ShaderProgram::new(&shared, "#error broken\nvoid main() {}")
        .err()
        .unwrap();
    assert!(matches!(err, FxError::GpuResource(_)), "{err}");
    assert!(err.to_string().starts_with("gpu resource error: fragment shader"));

    let err = ShaderProgram::new(&shared, "   ").err().unwrap();
    assert!(matches!(err, FxError::GpuResource(_)));
    assert_eq!(d.live_shaders(), 0);
}

#[test]
fn zero_sized_attachment_makes_framebuffer_incomplete() {
    let (_d, shared) = device();
    let tex = shared
        .create_texture(TextureDesc::new(0, 4, TextureFormat::Rgba8))
        .unwrap();
    let err = shared.create_framebuffer(tex).unwrap_err();
    assert!(err.to_string().contains("framebuffer incomplete"), "{err}");

    assert!(Texture::new(&shared, TextureDesc::new(0, 0, TextureFormat::Rgba8)).is_err());
}

#[test]
fn sampling_the_render_target_is_rejected() {
    let (_d, shared) = device();
    let fb = Framebuffer::new(&shared, TextureDesc::new(4, 4, TextureFormat::Rgba8)).unwrap();
    let program = ShaderProgram::new(&shared, FILL).unwrap();

    fb.bind().unwrap();
    let err = program
        .draw(&[("u_prev", Uniform::Texture(fb.handle()))])
        .unwrap_err();
    fb.unbind().unwrap();
    assert!(err.to_string().contains("feedback loop"), "{err}");
}

#[test]
fn draw_sets_resolution_and_sequential_texture_units() {
    let (d, shared) = device();
    let a = Texture::new(&shared, TextureDesc::new(2, 2, TextureFormat::Rgba8)).unwrap();
    let b = Texture::new(&shared, TextureDesc::new(2, 2, TextureFormat::Rgba8)).unwrap();
    let target = Framebuffer::new(&shared, TextureDesc::new(16, 8, TextureFormat::Rgba32F)).unwrap();
    let program = ShaderProgram::new(&shared, FILL).unwrap();

    target.bind().unwrap();
    program
        .draw(&[
            ("u_a", Uniform::from(a.handle())),
            ("u_gain", Uniform::from(0.5f32)),
            ("u_b", Uniform::from(b.handle())),
            ("u_tint", Uniform::from(Color::WHITE)),
        ])
        .unwrap();
    target.unbind().unwrap();

    let pid = program.id();
    assert_eq!(d.uniform(pid, RESOLUTION_UNIFORM), Some(UniformValue::Vec2([16.0, 8.0])));
    assert_eq!(d.uniform(pid, "u_a"), Some(UniformValue::Sampler(0)));
    assert_eq!(d.uniform(pid, "u_b"), Some(UniformValue::Sampler(1)));
    assert_eq!(d.uniform(pid, "u_tint"), Some(UniformValue::Vec4([1.0; 4])));
    assert!(d.commands().iter().any(|c| matches!(
        c,
        DeviceCommand::Draw { target: Some(t), sampled, .. } if *t == target.id() && sampled.len() == 2
    )));
    assert_eq!(shared.viewport(), shared.screen_size());
}

#[test]
fn upload_checks_format_and_length() {
    let (d, shared) = device();
    let tex = Texture::new(&shared, TextureDesc::new(1, 2, TextureFormat::Rgba8)).unwrap();
    assert!(tex.update_data(PixelData::Rgba8(&[0; 4])).is_err());
    assert!(tex.update_data(PixelData::Rgba32F(&[0.0; 8])).is_err());
    tex.update_data(PixelData::Rgba8(&[255, 0, 0, 255, 0, 255, 0, 255]))
        .unwrap();

    let img = d.texture_image(tex.id()).unwrap();
    assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(0, 1).0, [0, 255, 0, 255]);
}

#[test]
fn stale_handle_fails_to_bind() {
    let (_d, shared) = device();
    let tex = Texture::new(&shared, TextureDesc::new(2, 2, TextureFormat::Rgba8)).unwrap();
    let handle = tex.handle();
    tex.dispose();
    assert!(handle.bind(&shared, 0).is_err());
    assert!(handle.draw_to_screen(&shared).is_err());
}

#[test]
fn clear_then_blit_reaches_the_screen() {
    let (d, shared) = device();
    let fb = Framebuffer::new(&shared, TextureDesc::new(2, 2, TextureFormat::Rgba8)).unwrap();
    fb.clear(Color::rgba(0.0, 0.0, 1.0, 1.0)).unwrap();
    fb.texture().draw_to_screen().unwrap();

    let screen = d.screen_image().unwrap();
    assert_eq!(screen.dimensions(), (8, 4));
    assert_eq!(screen.get_pixel(7, 3).0, [0, 0, 255, 255]);
    assert_eq!(d.bound_framebuffer(), None);
}
