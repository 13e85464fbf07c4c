use fastnoise_lite::{FastNoiseLite, NoiseType};
use voxlith_chunk::{ChunkCoord, ChunkDims, VoxelChunk, WaterCell};
use voxlith_voxel::{LiquidKind, VoxelCatalog, VoxelTypeId};

use crate::error::WorldConfigError;
use crate::worldgen::{Mode, WorldGenConfig};

/// Produces a fully populated chunk for a coordinate that has none yet.
///
/// The chunk's origin is `coord.base(dims)`; every type id written must
/// resolve in the catalog the generator was built against.
pub trait TerrainGenerator: Send + Sync {
    fn generate_chunk(&self, coord: ChunkCoord, dims: ChunkDims) -> VoxelChunk;
}

fn resolve(catalog: &VoxelCatalog, name: &str) -> Result<VoxelTypeId, WorldConfigError> {
    catalog
        .id_by_name(name)
        .ok_or_else(|| WorldConfigError::UnknownVoxel(name.to_string()))
}

/// Writes a type id straight into the cell arrays; generation runs before any
/// lighting exists, so the chunk is already flagged for a full relight.
fn fill(chunk: &mut VoxelChunk, x: usize, y: usize, z: usize, id: VoxelTypeId, health: u8) {
    let i = chunk.dims().idx(x, y, z);
    chunk.cells.types[i] = id;
    chunk.cells.health[i] = health;
}

fn health_of(catalog: &VoxelCatalog, id: VoxelTypeId) -> u8 {
    catalog.get_type(id).map(|t| t.starting_health).unwrap_or(0)
}

/// Uniform slab of one voxel type below a fixed world height.
pub struct FlatGenerator {
    thickness: i32,
    voxel: VoxelTypeId,
    health: u8,
}

impl FlatGenerator {
    pub fn new(thickness: i32, voxel: VoxelTypeId, catalog: &VoxelCatalog) -> Self {
        Self {
            thickness,
            voxel,
            health: health_of(catalog, voxel),
        }
    }
}

impl TerrainGenerator for FlatGenerator {
    fn generate_chunk(&self, coord: ChunkCoord, dims: ChunkDims) -> VoxelChunk {
        let mut chunk = VoxelChunk::new(coord, dims);
        let [_, by, _] = coord.base(dims);
        for y in 0..dims.sy {
            if by + (y as i32) >= self.thickness {
                break;
            }
            for z in 0..dims.sz {
                for x in 0..dims.sx {
                    fill(&mut chunk, x, y, z, self.voxel, self.health);
                }
            }
        }
        chunk
    }
}

#[derive(Clone, Copy)]
struct Layer {
    id: VoxelTypeId,
    health: u8,
}

/// Heightmap terrain from 2D OpenSimplex noise, layered top/subsoil/deep,
/// with optional water filling empty cells under the water level.
pub struct NoiseGenerator {
    noise: FastNoiseLite,
    base: i32,
    amplitude: f32,
    topsoil: i32,
    top: Layer,
    shore: Layer,
    subsoil: Layer,
    deep: Layer,
    water_level: Option<i32>,
}

impl NoiseGenerator {
    pub fn new(cfg: &WorldGenConfig, seed: i32, catalog: &VoxelCatalog) -> Result<Self, WorldConfigError> {
        let layer = |name: &str| -> Result<Layer, WorldConfigError> {
            let id = resolve(catalog, name)?;
            Ok(Layer {
                id,
                health: health_of(catalog, id),
            })
        };
        let mut noise = FastNoiseLite::with_seed(seed);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(cfg.height.frequency));
        Ok(Self {
            noise,
            base: cfg.height.base,
            amplitude: cfg.height.amplitude,
            topsoil: cfg.surface.topsoil_thickness.max(1),
            top: layer(&cfg.surface.top)?,
            shore: layer(&cfg.surface.shore)?,
            subsoil: layer(&cfg.surface.subsoil)?,
            deep: layer(&cfg.surface.deep)?,
            water_level: cfg.water.enable.then_some(cfg.water.level),
        })
    }

    /// World height of the first empty cell in column `(wx, wz)`.
    pub fn surface_height(&self, wx: i32, wz: i32) -> i32 {
        let n = self.noise.get_noise_2d(wx as f32, wz as f32);
        self.base + (n * self.amplitude).round() as i32
    }

    fn layer_at(&self, wy: i32, height: i32) -> Layer {
        let depth = height - 1 - wy;
        if depth == 0 {
            match self.water_level {
                Some(level) if height <= level => self.shore,
                _ => self.top,
            }
        } else if depth < self.topsoil {
            self.subsoil
        } else {
            self.deep
        }
    }
}

impl TerrainGenerator for NoiseGenerator {
    fn generate_chunk(&self, coord: ChunkCoord, dims: ChunkDims) -> VoxelChunk {
        let mut chunk = VoxelChunk::new(coord, dims);
        let [bx, by, bz] = coord.base(dims);
        for z in 0..dims.sz {
            for x in 0..dims.sx {
                let height = self.surface_height(bx + x as i32, bz + z as i32);
                for y in 0..dims.sy {
                    let wy = by + y as i32;
                    if wy < height {
                        let l = self.layer_at(wy, height);
                        fill(&mut chunk, x, y, z, l.id, l.health);
                    } else if self.water_level.is_some_and(|level| wy < level) {
                        let i = dims.idx(x, y, z);
                        chunk.cells.water[i] = WaterCell::new(LiquidKind::Water, 255);
                    }
                }
            }
        }
        chunk
    }
}

/// Builds the generator selected by `cfg.mode`.
pub fn build_generator(
    cfg: &WorldGenConfig,
    seed: i32,
    catalog: &VoxelCatalog,
) -> Result<Box<dyn TerrainGenerator>, WorldConfigError> {
    let g: Box<dyn TerrainGenerator> = match cfg.mode {
        Mode::Flat => {
            let id = resolve(catalog, &cfg.flat.voxel)?;
            Box::new(FlatGenerator::new(cfg.flat.thickness, id, catalog))
        }
        Mode::Normal => Box::new(NoiseGenerator::new(cfg, seed, catalog)?),
    };
    log::info!(target: "runtime", "terrain generator: {:?} (seed {})", cfg.mode, seed);
    Ok(g)
}
