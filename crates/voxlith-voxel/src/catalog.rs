use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::config::{AtlasDef, FaceTiles, TextureDef, VoxelDef, VoxelsConfig};
use crate::error::CatalogError;
use crate::types::{AIR_ID, UvRect, VoxelType, VoxelTypeId};

const FLAG_SOLID: u8 = 1 << 0;
const FLAG_RAMP: u8 = 1 << 1;
const FLAG_EMIT: u8 = 1 << 2;
const FLAG_KNOWN: u8 = 1 << 3;

/// Read-only catalog of voxel types, addressed by `u8` id.
///
/// Hot-path predicates (`is_solid`, `can_ramp`, `emits_light`) read a baked
/// 256-entry flag table so meshing and lighting never touch the type records.
#[derive(Clone, Debug)]
pub struct VoxelCatalog {
    types: Vec<Option<VoxelType>>,
    by_name: HashMap<String, VoxelTypeId>,
    flags: [u8; 256],
    atlas: AtlasDef,
}

impl VoxelCatalog {
    fn empty(atlas: AtlasDef) -> Self {
        Self {
            types: Vec::new(),
            by_name: HashMap::new(),
            flags: [0; 256],
            atlas,
        }
    }

    /// Catalog used when no voxel file is supplied.
    pub fn builtin() -> Self {
        let mut cat = Self::empty(AtlasDef::default());
        for (id, def) in builtin_defs().into_iter().enumerate() {
            let ty = compile_def(&def, id as VoxelTypeId, cat.atlas);
            cat.insert(ty);
        }
        cat
    }

    pub fn from_config(cfg: VoxelsConfig) -> Result<Self, CatalogError> {
        let mut cat = Self::empty(cfg.atlas);
        let mut defs = cfg.voxels;
        if !defs.iter().any(|d| d.name == "air") {
            let mut air = VoxelDef::named("air");
            air.id = Some(AIR_ID);
            air.solid = Some(false);
            defs.insert(0, air);
        }
        // Explicit ids claim their slots first; the rest fill the gaps in file order.
        let mut taken: HashMap<VoxelTypeId, String> = HashMap::new();
        for def in defs.iter() {
            if let Some(id) = def.id {
                if id == AIR_ID && def.name != "air" {
                    return Err(CatalogError::ReservedAirId(def.name.clone()));
                }
                if let Some(first) = taken.insert(id, def.name.clone()) {
                    return Err(CatalogError::DuplicateId {
                        id,
                        first,
                        second: def.name.clone(),
                    });
                }
            }
        }
        let mut next: usize = 1;
        for def in defs.iter() {
            if cat.by_name.contains_key(&def.name) {
                return Err(CatalogError::DuplicateName(def.name.clone()));
            }
            let id = match def.id {
                Some(id) => id,
                None if def.name == "air" => AIR_ID,
                None => {
                    while next < 256 && taken.contains_key(&(next as VoxelTypeId)) {
                        next += 1;
                    }
                    if next >= 256 {
                        return Err(CatalogError::TooManyTypes);
                    }
                    let id = next as VoxelTypeId;
                    taken.insert(id, def.name.clone());
                    id
                }
            };
            let ty = compile_def(def, id, cat.atlas);
            cat.insert(ty);
        }
        log::debug!("voxel catalog compiled with {} types", cat.len());
        Ok(cat)
    }

    pub fn from_toml_str(src: &str) -> Result<Self, CatalogError> {
        let cfg: VoxelsConfig = toml::from_str(src)?;
        Self::from_config(cfg)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let src = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&src)
    }

    fn insert(&mut self, ty: VoxelType) {
        let ix = ty.id as usize;
        if self.types.len() <= ix {
            self.types.resize(ix + 1, None);
        }
        let mut f = FLAG_KNOWN;
        if ty.solid && ty.id != AIR_ID {
            f |= FLAG_SOLID;
        }
        if ty.can_ramp {
            f |= FLAG_RAMP;
        }
        if ty.emits_light {
            f |= FLAG_EMIT;
        }
        self.flags[ix] = f;
        self.by_name.insert(ty.name.clone(), ty.id);
        self.types[ix] = Some(ty);
    }

    #[inline]
    pub fn get_type(&self, id: VoxelTypeId) -> Option<&VoxelType> {
        self.types.get(id as usize).and_then(|t| t.as_ref())
    }

    pub fn get_type_by_name(&self, name: &str) -> Option<&VoxelType> {
        self.id_by_name(name).and_then(|id| self.get_type(id))
    }

    pub fn id_by_name(&self, name: &str) -> Option<VoxelTypeId> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn contains(&self, id: VoxelTypeId) -> bool {
        self.flags[id as usize] & FLAG_KNOWN != 0
    }

    #[inline]
    pub fn is_solid(&self, id: VoxelTypeId) -> bool {
        self.flags[id as usize] & FLAG_SOLID != 0
    }

    #[inline]
    pub fn can_ramp(&self, id: VoxelTypeId) -> bool {
        self.flags[id as usize] & (FLAG_SOLID | FLAG_RAMP) == (FLAG_SOLID | FLAG_RAMP)
    }

    #[inline]
    pub fn emits_light(&self, id: VoxelTypeId) -> bool {
        self.flags[id as usize] & FLAG_EMIT != 0
    }

    pub fn len(&self) -> usize {
        self.types.iter().filter(|t| t.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &VoxelType> {
        self.types.iter().filter_map(|t| t.as_ref())
    }

    pub fn atlas(&self) -> AtlasDef {
        self.atlas
    }

    /// Fails on the first id that does not resolve in this catalog.
    pub fn validate_ids(
        &self,
        ids: impl IntoIterator<Item = VoxelTypeId>,
    ) -> Result<(), CatalogError> {
        match ids.into_iter().find(|id| !self.contains(*id)) {
            Some(id) => Err(CatalogError::OrphanId(id)),
            None => Ok(()),
        }
    }
}

fn compile_def(def: &VoxelDef, id: VoxelTypeId, atlas: AtlasDef) -> VoxelType {
    let solid = id != AIR_ID && def.solid.unwrap_or(true);
    let (top, bottom, side) = def
        .texture
        .as_ref()
        .map(TextureDef::resolve)
        .unwrap_or(([0, 0], [0, 0], [0, 0]));
    let uv = |t| UvRect::from_tile(t, atlas.tiles_x, atlas.tiles_y);
    VoxelType {
        id,
        name: def.name.clone(),
        solid,
        can_ramp: solid && def.can_ramp.unwrap_or(false),
        emits_light: def.emits_light.unwrap_or(false),
        tint: def.tint.unwrap_or([255, 255, 255, 255]),
        starting_health: def.health.unwrap_or(if solid { 100 } else { 0 }),
        uvs: [uv(top), uv(bottom), uv(side)],
    }
}

fn builtin_defs() -> Vec<VoxelDef> {
    let def = |name: &str, solid: bool, ramp: bool, emit: bool, health: u8, tex: TextureDef| {
        VoxelDef {
            name: name.to_string(),
            id: None,
            solid: Some(solid),
            can_ramp: Some(ramp),
            emits_light: Some(emit),
            tint: None,
            health: Some(health),
            texture: Some(tex),
        }
    };
    vec![
        def("air", false, false, false, 0, TextureDef::Tile([0, 0])),
        def("stone", true, false, false, 120, TextureDef::Tile([1, 0])),
        def("dirt", true, true, false, 60, TextureDef::Tile([2, 0])),
        def(
            "grass",
            true,
            true,
            false,
            60,
            TextureDef::Faces(FaceTiles {
                all: None,
                top: Some([3, 0]),
                bottom: Some([2, 0]),
                side: Some([4, 0]),
            }),
        ),
        def("sand", true, true, false, 40, TextureDef::Tile([5, 0])),
        def("obsidian", true, false, false, 200, TextureDef::Tile([6, 0])),
        def("magma", true, false, true, 150, TextureDef::Tile([7, 0])),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_air_at_zero_and_stone() {
        let cat = VoxelCatalog::builtin();
        let air = cat.get_type(AIR_ID).unwrap();
        assert_eq!(air.name, "air");
        assert!(!cat.is_solid(AIR_ID));
        let stone = cat.id_by_name("stone").unwrap();
        assert!(cat.is_solid(stone));
        assert!(!cat.can_ramp(stone));
        assert!(cat.can_ramp(cat.id_by_name("dirt").unwrap()));
        assert!(cat.emits_light(cat.id_by_name("magma").unwrap()));
    }

    #[test]
    fn unknown_ids_are_not_solid() {
        let cat = VoxelCatalog::builtin();
        assert!(!cat.contains(200));
        assert!(!cat.is_solid(200));
        assert!(cat.get_type(200).is_none());
    }
}
