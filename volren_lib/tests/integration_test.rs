use nalgebra::Vector4;
use proptest::prelude::*;
use volren_lib::{
    camera::OrbitCamera,
    color::{self, RGBA},
    common::CutoffWindow,
    gpu::{
        Device, Fragment, FragmentKernel, FragmentShader, Program, Samplers, Slot, StageInterface, Texture,
        Uniforms, ValueKind, Varyings, Vertex, VertexKernel, VertexShader,
    },
    render::{
        sampling::{ray_sampling, slice_sampling},
        Renderer, RendererKind,
    },
    settings::Settings,
    test_helpers::{brightness_centroid, covered_pixels, sphere_grid, upload_transfer_function},
    transfer_function::{build_opacity_table, OPACITY_TABLE_SIZE},
    volumetric::{decode_frame, encode_frame, RawFrame, Samples, VolumeGrid},
    ShaderError, VolumeError,
};

const SIZE: usize = 64;

fn render_sphere(kind: RendererKind) -> Device {
    let mut device = Device::new(SIZE, SIZE);
    let mut renderer = Renderer::new(kind);
    renderer.init(&mut device).unwrap();

    let data = device.create_texture(Texture::from_grid(&sphere_grid(SIZE)));
    let (colors, opacities) = upload_transfer_function(&mut device);
    renderer.set_data_texture(Some(data));
    renderer.set_color_texture(Some(colors));
    renderer.set_opacity_texture(Some(opacities));

    let camera = OrbitCamera::new(SIZE, SIZE);
    renderer.set_mvp(camera.model_matrix(), camera.view_matrix(), camera.projection_matrix());
    renderer.set_step_multiplier(1);

    device.clear(color::zero());
    renderer.render(&mut device);
    device
}

#[test]
fn sphere_rendered_in_centre() {
    for kind in RendererKind::ALL {
        let device = render_sphere(kind);
        let framebuffer = device.framebuffer();

        assert!(covered_pixels(framebuffer) > 0, "{} drew nothing", kind.name());

        let (x, y) = brightness_centroid(framebuffer).unwrap();
        let centre = SIZE as f32 / 2.0;
        assert!((x - centre).abs() < 2.0, "{}: x {}", kind.name(), x);
        assert!((y - centre).abs() < 2.0, "{}: y {}", kind.name(), y);

        // corners are outside of the volume
        assert_eq!(framebuffer.pixel(0, 0), Some(color::zero()));
        assert_eq!(framebuffer.pixel(SIZE - 1, SIZE - 1), Some(color::zero()));
    }
}

#[test]
fn truncated_frame_reports_sizes() {
    let header = [1u8, 0, 1, 0, 1, 0, 1];
    let mut bytes = header.to_vec();
    bytes.extend(std::iter::repeat(0).take(1000));

    let err = decode_frame(&bytes).unwrap_err();

    assert!(matches!(
        err,
        VolumeError::Truncated {
            expected: 16_777_216,
            actual: 1000
        }
    ));
    let message = err.to_string();
    assert!(message.contains("16777216"));
    assert!(message.contains("1000"));
}

#[test]
fn opacity_identity_table() {
    let table = build_opacity_table(OPACITY_TABLE_SIZE, |x| x);

    for (i, v) in table.iter().enumerate() {
        assert_eq!(*v, i as f32 / OPACITY_TABLE_SIZE as f32);
    }
}

#[test]
fn cutoff_coefficient_defined() {
    assert_eq!(CutoffWindow::new(0.5, 0.5).coefficient(), 1.0);
    assert_eq!(CutoffWindow::new(0.0, 1.0).coefficient(), 1.0);
}

#[test]
fn settings_file_round_trip() {
    let path = std::env::temp_dir().join(format!("volren_settings_{}.json", std::process::id()));
    let settings = Settings {
        background: [0.2, 0.4, 0.6],
        cutoff: CutoffWindow::new(0.1, 0.9),
        step_multiplier: 4,
        lighting: true,
        jitter: false,
        auto_rotate: true,
        renderer: RendererKind::RayCasting,
        frame_dir: Some("volumes".into()),
    };

    settings.save(&path).unwrap();
    let loaded = Settings::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded, settings);
}

struct WritesColor;
struct ReadsTexCoord;
struct Kernel;

impl VertexKernel for Kernel {
    fn run(&self, vertex: &Vertex, _out: &mut Varyings) -> Vector4<f32> {
        vertex.position.to_homogeneous()
    }
}

impl FragmentKernel for Kernel {
    fn run(&self, _fragment: &Fragment) -> Option<RGBA> {
        None
    }
}

impl VertexShader for WritesColor {
    fn name(&self) -> &str {
        "writes_color.vert"
    }

    fn interface(&self) -> StageInterface {
        StageInterface {
            inputs: vec![Slot::new("position", ValueKind::Vec3)],
            outputs: vec![Slot::new("vertexColor", ValueKind::Vec4)],
            uniforms: vec![],
        }
    }

    fn prepare<'a>(&'a self, _uniforms: &'a Uniforms) -> Box<dyn VertexKernel + 'a> {
        Box::new(Kernel)
    }
}

impl FragmentShader for ReadsTexCoord {
    fn name(&self) -> &str {
        "reads_tex.frag"
    }

    fn interface(&self) -> StageInterface {
        StageInterface {
            inputs: vec![Slot::new("texCoord", ValueKind::Vec3)],
            outputs: vec![Slot::new("fragColor", ValueKind::Vec4)],
            uniforms: vec![],
        }
    }

    fn prepare<'a>(&'a self, _uniforms: &'a Uniforms, _samplers: Samplers<'a>) -> Box<dyn FragmentKernel + 'a> {
        Box::new(Kernel)
    }
}

#[test]
fn link_failure_has_log() {
    let err = Program::link("mismatched", Box::new(WritesColor), Box::new(ReadsTexCoord)).unwrap_err();

    assert!(matches!(err, ShaderError::Link { .. }));
    assert!(err.log().contains("texCoord"));
    assert!(err.to_string().contains("mismatched"));
}

fn samples_strategy(count: usize) -> impl Strategy<Value = Samples> {
    prop_oneof![
        prop::collection::vec(any::<i8>(), count).prop_map(Samples::Int8),
        prop::collection::vec(any::<u8>(), count).prop_map(Samples::UInt8),
        prop::collection::vec(any::<i16>(), count).prop_map(Samples::Int16),
        prop::collection::vec(any::<u16>(), count).prop_map(Samples::UInt16),
        prop::collection::vec(any::<i32>(), count).prop_map(Samples::Int32),
        prop::collection::vec(any::<u32>(), count).prop_map(Samples::UInt32),
        prop::collection::vec(prop::num::f32::NORMAL, count).prop_map(Samples::Float32),
    ]
}

fn frame_strategy() -> impl Strategy<Value = RawFrame> {
    (1u16..6, 1u16..6, 1u16..6).prop_flat_map(|(w, h, d)| {
        let count = w as usize * h as usize * d as usize;
        samples_strategy(count).prop_map(move |samples| RawFrame::new(w, h, d, samples).unwrap())
    })
}

proptest! {
    #[test]
    fn frame_round_trip(frame in frame_strategy()) {
        let decoded = decode_frame(&encode_frame(&frame)).unwrap();
        prop_assert_eq!(decoded, frame);
    }

    #[test]
    fn grid_indices_unique(w in 1usize..8, h in 1usize..8, d in 1usize..8) {
        let grid = VolumeGrid::new(w, h, d, vec![0.0; w * h * d]).unwrap();
        let mut seen = vec![false; grid.len()];

        for z in 0..d {
            for y in 0..h {
                for x in 0..w {
                    let i = grid.index(x, y, z);
                    prop_assert!(i < grid.len());
                    prop_assert!(!seen[i]);
                    seen[i] = true;
                }
            }
        }
    }

    #[test]
    fn step_counts_increase(max_dim in 1usize..512, m in 1u32..16) {
        prop_assert!(slice_sampling(max_dim, m + 1).num_steps > slice_sampling(max_dim, m).num_steps);
        prop_assert!(ray_sampling(max_dim, m + 1).num_steps > ray_sampling(max_dim, m).num_steps);
    }

    #[test]
    fn cutoff_coefficient_finite(low in 0.0f32..=1.0, high in 0.0f32..=1.0) {
        let coeff = CutoffWindow::new(low, high).coefficient();
        prop_assert!(coeff.is_finite());
    }
}
