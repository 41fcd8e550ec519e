use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::{AssetError, BlockDefinition, BlockDescriptor, BlockRegistry, ShapeKind};

/// Load a block registry from the provided JSON file path.
pub fn registry_from_file(path: &Path) -> Result<BlockRegistry, AssetError> {
    let data = fs::read_to_string(path)?;
    registry_from_str(&data)
}

/// Load a block registry from an in-memory JSON string.
///
/// The first definition must be `air`; it becomes id 0.
pub fn registry_from_str(input: &str) -> Result<BlockRegistry, AssetError> {
    let defs = crate::load_blocks_from_str(input)?;

    match defs.first() {
        Some(first) if first.name == "air" => {}
        Some(first) => {
            return Err(AssetError::Invalid {
                name: first.name.clone(),
                reason: "the first block must be air",
            })
        }
        None => {
            return Err(AssetError::Invalid {
                name: String::new(),
                reason: "block pack is empty",
            })
        }
    }

    let mut seen = HashSet::new();
    for def in &defs {
        if !seen.insert(def.name.as_str()) {
            return Err(AssetError::DuplicateName {
                name: def.name.clone(),
            });
        }
        validate(def)?;
    }

    let descriptors: Vec<_> = defs
        .into_iter()
        .enumerate()
        .map(|(id, def)| {
            if id == 0 {
                BlockDescriptor::air()
            } else {
                if def.shape == ShapeKind::Unsupported {
                    tracing::warn!(block = %def.name, "unsupported shape; block will not render");
                }
                BlockDescriptor::from_definition(def)
            }
        })
        .collect();
    tracing::debug!(blocks = descriptors.len(), "loaded block pack");
    Ok(BlockRegistry::new(descriptors))
}

fn validate(def: &BlockDefinition) -> Result<(), AssetError> {
    let invalid = |reason| AssetError::Invalid {
        name: def.name.clone(),
        reason,
    };
    if def.opaque && def.transparent {
        return Err(invalid("a block cannot be both opaque and transparent"));
    }
    if def.opaque && !def.shape.is_full_cube() {
        return Err(invalid("only full cubes may be opaque"));
    }
    let colors: crate::BlockColors = def.color.clone().into();
    if colors
        .channels()
        .any(|c| !c.is_finite() || !(0.0..=1.0).contains(&c))
    {
        return Err(invalid("color channels must lie in [0, 1]"));
    }
    if let Some(crate::DetailPattern::Speckle { amplitude }) = def.detail {
        if !amplitude.is_finite() || !(0.0..=1.0).contains(&amplitude) {
            return Err(invalid("speckle amplitude must lie in [0, 1]"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACK: &str = r#"[
        {"name": "air"},
        {"name": "stone", "solid": true, "opaque": true, "color": [0.5, 0.5, 0.5]},
        {"name": "grass", "solid": true, "opaque": true,
         "color": {"top": [0.3, 0.7, 0.2], "side": [0.5, 0.4, 0.2]}},
        {"name": "sand", "solid": true, "opaque": true, "color": [0.9, 0.8, 0.5],
         "detail": {"kind": "speckle", "amplitude": 0.2}},
        {"name": "glass", "solid": true, "transparent": true, "color": [0.8, 0.9, 1.0]},
        {"name": "oak_door_lower", "solid": true, "shape": "door_lower"},
        {"name": "torch", "shape": "torch"}
    ]"#;

    #[test]
    fn loads_pack_in_id_order() {
        let registry = registry_from_str(PACK).expect("pack loads");
        assert_eq!(registry.len(), 7);
        assert_eq!(registry.id_by_name("air"), Some(0));
        assert_eq!(registry.id_by_name("glass"), Some(4));

        let grass = registry.descriptor(2).unwrap();
        assert_eq!(grass.colors.bottom, [0.5, 0.4, 0.2]);
        assert!(registry.descriptor(3).unwrap().has_detail());
        assert!(registry.descriptor(4).unwrap().transparent);
        assert_eq!(registry.descriptor(5).unwrap().shape, ShapeKind::DoorLower);
        assert_eq!(registry.descriptor(6).unwrap().shape, ShapeKind::Unsupported);
    }

    #[test]
    fn air_entry_is_normalized() {
        let registry =
            registry_from_str(r#"[{"name": "air", "opaque": true}, {"name": "stone"}]"#).unwrap();
        let air = registry.descriptor(0).unwrap();
        assert!(!air.opaque);
        assert!(!air.is_visible());
    }

    #[test]
    fn rejects_missing_air() {
        let err = registry_from_str(r#"[{"name": "stone"}]"#).unwrap_err();
        assert!(matches!(err, AssetError::Invalid { .. }));
        let err = registry_from_str("[]").unwrap_err();
        assert!(matches!(err, AssetError::Invalid { .. }));
    }

    #[test]
    fn rejects_duplicates() {
        let err = registry_from_str(r#"[{"name": "air"}, {"name": "a"}, {"name": "a"}]"#)
            .unwrap_err();
        assert!(matches!(err, AssetError::DuplicateName { name } if name == "a"));
    }

    #[test]
    fn rejects_opaque_transparent_and_bad_colors() {
        let err = registry_from_str(
            r#"[{"name": "air"}, {"name": "x", "opaque": true, "transparent": true}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, AssetError::Invalid { .. }));

        let err = registry_from_str(r#"[{"name": "air"}, {"name": "x", "color": [2.0, 0, 0]}]"#)
            .unwrap_err();
        assert!(matches!(err, AssetError::Invalid { .. }));
    }

    #[test]
    fn rejects_opaque_shaped_blocks() {
        let err = registry_from_str(
            r#"[{"name": "air"}, {"name": "slab", "opaque": true, "shape": "half_slab"}]"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AssetError::Invalid { name, reason } if name == "slab" && reason.contains("full cubes")
        ));

        let err = registry_from_str(r#"[{"name": "air"}, {"name": "x", "opaque": true, "shape": "torch"}]"#)
            .unwrap_err();
        assert!(matches!(err, AssetError::Invalid { .. }));

        let registry = registry_from_str(
            r#"[{"name": "air"}, {"name": "slab", "solid": true, "shape": "half_slab"}]"#,
        )
        .expect("non-opaque slab loads");
        assert!(!registry.occludes(1));
    }

    #[test]
    fn reports_parse_and_io_errors() {
        assert!(matches!(
            registry_from_str("not json").unwrap_err(),
            AssetError::Parse(_)
        ));
        assert!(matches!(
            registry_from_file(Path::new("/definitely/not/here.json")).unwrap_err(),
            AssetError::Io(_)
        ));
    }

    #[test]
    fn loads_from_file() {
        let path = std::env::temp_dir().join(format!("voxkit-blocks-{}.json", std::process::id()));
        fs::write(&path, PACK).unwrap();
        let registry = registry_from_file(&path).expect("file loads");
        assert_eq!(registry.id_by_name("sand"), Some(3));
        let _ = fs::remove_file(path);
    }
}
