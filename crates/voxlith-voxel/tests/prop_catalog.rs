use proptest::prelude::*;
use voxlith_voxel::config::{VoxelDef, VoxelsConfig};
use voxlith_voxel::{AIR_ID, CatalogError, FaceRole, VoxelCatalog};

#[test]
fn toml_catalog_assigns_ids_and_bakes_uvs() {
    let cat = VoxelCatalog::from_toml_str(
        r#"
        [atlas]
        tiles_x = 4
        tiles_y = 2

        [[voxels]]
        name = "stone"
        texture = [1, 0]

        [[voxels]]
        name = "grass"
        can_ramp = true
        texture = { top = [2, 1], side = [3, 0], all = [0, 1] }

        [[voxels]]
        name = "lamp"
        id = 9
        emits_light = true
        "#,
    )
    .expect("catalog");

    assert_eq!(cat.get_type(AIR_ID).unwrap().name, "air");
    let stone = cat.get_type_by_name("stone").unwrap();
    assert_eq!(stone.id, 1);
    assert!((stone.uv_for(FaceRole::Side).u0 - 0.25).abs() < 1e-6);

    let grass = cat.get_type_by_name("grass").unwrap();
    assert_eq!(grass.id, 2);
    let top = grass.uv_for(FaceRole::Top);
    assert!((top.u0 - 0.5).abs() < 1e-6 && (top.v0 - 0.5).abs() < 1e-6);
    let bottom = grass.uv_for(FaceRole::Bottom);
    assert!((bottom.u0 - 0.0).abs() < 1e-6 && (bottom.v0 - 0.5).abs() < 1e-6);

    assert_eq!(cat.id_by_name("lamp"), Some(9));
    assert!(cat.emits_light(9));
}

#[test]
fn duplicate_names_and_reserved_air_are_rejected() {
    let dup = VoxelsConfig {
        atlas: Default::default(),
        voxels: vec![VoxelDef::named("stone"), VoxelDef::named("stone")],
    };
    assert!(matches!(
        VoxelCatalog::from_config(dup),
        Err(CatalogError::DuplicateName(_))
    ));

    let mut bad = VoxelDef::named("rock");
    bad.id = Some(0);
    let reserved = VoxelsConfig {
        atlas: Default::default(),
        voxels: vec![bad],
    };
    assert!(matches!(
        VoxelCatalog::from_config(reserved),
        Err(CatalogError::ReservedAirId(_))
    ));
}

#[test]
fn validate_ids_reports_orphans() {
    let cat = VoxelCatalog::builtin();
    assert!(cat.validate_ids([0u8, 1, 2]).is_ok());
    assert!(matches!(
        cat.validate_ids([1u8, 77]),
        Err(CatalogError::OrphanId(77))
    ));
}

proptest! {
    // Every generated name resolves back to a distinct id
    #[test]
    fn names_resolve_to_distinct_ids(n in 1usize..60) {
        let voxels = (0..n).map(|i| VoxelDef::named(&format!("v{i}"))).collect();
        let cat = VoxelCatalog::from_config(VoxelsConfig { atlas: Default::default(), voxels }).unwrap();
        let mut seen = std::collections::HashSet::new();
        for i in 0..n {
            let id = cat.id_by_name(&format!("v{i}")).unwrap();
            prop_assert!(id != AIR_ID);
            prop_assert!(seen.insert(id));
            prop_assert!(cat.is_solid(id));
        }
        prop_assert_eq!(cat.len(), n + 1);
    }
}
