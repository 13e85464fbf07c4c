use fastnoise_lite::{FastNoiseLite, NoiseType};
use voxlith_geom::Vec3;

/// Deterministic per-corner displacement keyed by world position, so corners
/// shared between faces and chunks move together.
pub struct Jitter {
    noise: FastNoiseLite,
    amplitude: f32,
}

impl Jitter {
    pub fn new(seed: i32, frequency: f32, amplitude: f32) -> Self {
        let mut noise = FastNoiseLite::with_seed(seed);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(frequency));
        Self { noise, amplitude }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.amplitude > 0.0
    }

    pub fn offset(&self, wx: i32, wy: i32, wz: i32) -> Vec3 {
        if !self.is_enabled() {
            return Vec3::ZERO;
        }
        let (x, y, z) = (wx as f32, wy as f32, wz as f32);
        Vec3::new(
            self.noise.get_noise_3d(x, y, z),
            self.noise.get_noise_3d(x + 311.7, y, z - 57.1),
            self.noise.get_noise_3d(x - 93.3, y + 129.9, z),
        ) * self.amplitude
    }
}

impl std::fmt::Debug for Jitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Jitter")
            .field("amplitude", &self.amplitude)
            .finish_non_exhaustive()
    }
}
