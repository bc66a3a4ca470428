/*
    volren_lib
    Author: Michal Majer
    Date: 2022-05-05
*/

//! Procedural volumes.
//!
//! Every generator produces a cube of `side^3` voxels with values in `<0;1>`.

use nalgebra::{point, Point3, Vector3};

use crate::{error::VolumeError, volumetric::VolumeGrid};

/// Generates one sample at a time, at any location
pub trait SampleGenerator {
    /// `pos` is in `<0;1>^3`, voxel centres at the corners of the range
    fn sample_at(&self, pos: Point3<f32>) -> f32;
}

pub fn generate<G>(side: usize, generator: &G) -> Result<VolumeGrid, VolumeError>
where
    G: SampleGenerator + ?Sized,
{
    let denom = side.saturating_sub(1).max(1) as f32;
    VolumeGrid::from_fn(side, side, side, |x, y, z| {
        let pos = point![x as f32 / denom, y as f32 / denom, z as f32 / denom];
        generator.sample_at(pos)
    })
}

// <0;1> to <-1;1>
fn centered(pos: Point3<f32>) -> Vector3<f32> {
    pos.coords * 2.0 - Vector3::repeat(1.0)
}

/// Distance from the origin corner
pub struct SectorGenerator;

impl SampleGenerator for SectorGenerator {
    fn sample_at(&self, pos: Point3<f32>) -> f32 {
        pos.coords.magnitude() / 3f32.sqrt()
    }
}

/// 1 in the centre, falling linearly to 0 at the inscribed sphere
pub struct SphereGenerator;

impl SampleGenerator for SphereGenerator {
    fn sample_at(&self, pos: Point3<f32>) -> f32 {
        let dist = centered(pos).magnitude();
        if dist <= 1.0 {
            1.0 - dist
        } else {
            0.0
        }
    }
}

/// Uniform noise
pub struct RandomGenerator {
    rng: fastrand::Rng,
}

impl RandomGenerator {
    pub fn new(seed: u64) -> RandomGenerator {
        RandomGenerator {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl SampleGenerator for RandomGenerator {
    fn sample_at(&self, _pos: Point3<f32>) -> f32 {
        self.rng.f32()
    }
}

/// Surfaces `f(x, y, z) = 0` over `<-1;1>^3`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Surface {
    Paraboloid,
    Hyperboloid,
    HyperbolicParaboloid,
    Helix { big_r: f32, r: f32, a: f32 },
    Helicoid,
    Torus { big_r: f32, r: f32 },
}

impl Surface {
    pub fn eval(&self, p: Vector3<f32>) -> f32 {
        let (x, y, z) = (p.x, p.y, p.z);
        match *self {
            Surface::Paraboloid => x * x + y * y - z,
            Surface::Hyperboloid => 2.0 * x * x + 2.0 * y * y - 2.0 * z * z - 1.0,
            Surface::HyperbolicParaboloid => x * x - y * y - z,
            Surface::Helix { big_r, r, a } => {
                let xr = x - big_r * (z * a).cos();
                let yr = y - big_r * (z * a).sin();
                xr * xr + yr * yr - r * r
            }
            Surface::Helicoid => x * (z * 4.0).sin() - y * (z * 4.0).cos(),
            Surface::Torus { big_r, r } => {
                let tmp = x * x + y * y + z * z + big_r * big_r - r * r;
                tmp * tmp - 4.0 * big_r * big_r * (x * x + y * y)
            }
        }
    }
}

/// Thick shell around an implicit surface.
/// Value is 1 on the surface, 0 where `|f| >= cutoff`.
pub struct ImplicitSurfaceGenerator {
    pub surface: Surface,
    pub cutoff: f32,
}

impl SampleGenerator for ImplicitSurfaceGenerator {
    fn sample_at(&self, pos: Point3<f32>) -> f32 {
        let diff = self.surface.eval(centered(pos)).abs();
        shell(diff, self.cutoff)
    }
}

/// Thick shell around a height field `z = f(x, y)`
pub struct AnalyticSurfaceGenerator<F>
where
    F: Fn(f32, f32) -> f32,
{
    pub function: F,
    pub cutoff: f32,
}

impl<F> SampleGenerator for AnalyticSurfaceGenerator<F>
where
    F: Fn(f32, f32) -> f32,
{
    fn sample_at(&self, pos: Point3<f32>) -> f32 {
        let p = centered(pos);
        let diff = (p.z - (self.function)(p.x, p.y)).abs();
        shell(diff, self.cutoff)
    }
}

fn shell(diff: f32, cutoff: f32) -> f32 {
    if cutoff > 0.0 && diff <= cutoff {
        1.0 - diff / cutoff
    } else {
        0.0
    }
}

/// Randomly placed overlapping balls
pub struct BubblesGenerator {
    bubbles: Vec<(Point3<f32>, f32)>,
}

impl BubblesGenerator {
    pub fn new(seed: u64, count: usize, min_radius: f32, max_radius: f32) -> BubblesGenerator {
        let rng = fastrand::Rng::with_seed(seed);
        let range = |low: f32, high: f32| low + rng.f32() * (high - low);

        let bubbles = (0..count)
            .map(|_| {
                let pos = point![
                    range(max_radius, 1.0 - max_radius),
                    range(max_radius, 1.0 - max_radius),
                    range(max_radius, 1.0 - max_radius)
                ];
                (pos, range(min_radius, max_radius))
            })
            .collect();

        BubblesGenerator { bubbles }
    }
}

impl SampleGenerator for BubblesGenerator {
    fn sample_at(&self, pos: Point3<f32>) -> f32 {
        let value: f32 = self
            .bubbles
            .iter()
            .map(|(centre, radius)| {
                let dist = (pos - centre).magnitude();
                if dist <= *radius {
                    1.0 - dist / radius
                } else {
                    0.0
                }
            })
            .sum();
        value.min(1.0)
    }
}

/// Volumes offered by the viewer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Preset {
    Sector,
    Random,
    Sphere,
    Paraboloid,
    Hyperboloid,
    HyperbolicParaboloid,
    Helix,
    Helicoid,
    Torus,
    Saddle,
    Bubbles,
}

impl Preset {
    pub const ALL: [Preset; 11] = [
        Preset::Sector,
        Preset::Random,
        Preset::Sphere,
        Preset::Paraboloid,
        Preset::Hyperboloid,
        Preset::HyperbolicParaboloid,
        Preset::Helix,
        Preset::Helicoid,
        Preset::Torus,
        Preset::Saddle,
        Preset::Bubbles,
    ];

    pub fn build(&self, side: usize, seed: u64) -> Result<VolumeGrid, VolumeError> {
        let implicit = |surface| ImplicitSurfaceGenerator {
            surface,
            cutoff: 0.1,
        };
        match *self {
            Preset::Sector => generate(side, &SectorGenerator),
            Preset::Random => generate(side, &RandomGenerator::new(seed)),
            Preset::Sphere => generate(side, &SphereGenerator),
            Preset::Paraboloid => generate(side, &implicit(Surface::Paraboloid)),
            Preset::Hyperboloid => generate(side, &implicit(Surface::Hyperboloid)),
            Preset::HyperbolicParaboloid => generate(side, &implicit(Surface::HyperbolicParaboloid)),
            Preset::Helix => generate(
                side,
                &implicit(Surface::Helix {
                    big_r: 0.5,
                    r: 0.2,
                    a: 5.0,
                }),
            ),
            Preset::Helicoid => generate(side, &implicit(Surface::Helicoid)),
            Preset::Torus => generate(
                side,
                &ImplicitSurfaceGenerator {
                    surface: Surface::Torus { big_r: 0.6, r: 0.3 },
                    cutoff: 0.05,
                },
            ),
            Preset::Saddle => generate(
                side,
                &AnalyticSurfaceGenerator {
                    function: |x: f32, y: f32| 0.5 * (x * x - y * y),
                    cutoff: 0.1,
                },
            ),
            Preset::Bubbles => generate(side, &BubblesGenerator::new(seed, 20, 0.05, 0.2)),
        }
    }
}
