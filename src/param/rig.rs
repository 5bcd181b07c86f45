//! Live parameter rigs for single assets.

use std::fmt;
use std::sync::Arc;

use bevy::log::debug;

use super::{ParamEffect, ParamSpec, ParamValue, ParamValues, find_spec};
use crate::error::{BuildError, ParamError};
use crate::geometry::GeometryBuffer;
use crate::material::{AssetMaterials, MaterialSlice};

/// Where a patch is applied.
///
/// `materials` covers only the regions owned by the rig being patched; the
/// geometry is the asset's full buffer. Borrowing it mutably marks the patch
/// as a vertex edit.
pub struct PatchTarget<'a> {
    pub materials: MaterialSlice<'a>,
    geometry: &'a mut GeometryBuffer,
    geometry_edited: bool,
}

impl<'a> PatchTarget<'a> {
    pub fn new(materials: MaterialSlice<'a>, geometry: &'a mut GeometryBuffer) -> Self {
        Self {
            materials,
            geometry,
            geometry_edited: false,
        }
    }

    pub fn geometry_mut(&mut self) -> &mut GeometryBuffer {
        self.geometry_edited = true;
        &mut *self.geometry
    }

    /// [`ParamChange`] describing what the patch touched.
    pub fn change(&self) -> ParamChange {
        if self.geometry_edited {
            ParamChange::PatchedGeometry
        } else {
            ParamChange::Patched
        }
    }
}

/// The mutable parts of an asset a rig may touch.
pub struct RigTarget<'a> {
    pub materials: &'a mut AssetMaterials,
    pub geometry: &'a mut GeometryBuffer,
}

/// Asset-specific behavior behind a rig.
pub trait RigHooks: Send + Sync {
    /// Apply a [`ParamEffect::Patch`] parameter. `values` already holds the
    /// new value.
    fn patch(&self, id: &str, values: &ParamValues, target: &mut PatchTarget<'_>);

    /// Build fresh geometry for `values`.
    fn rebuild(&self, values: &ParamValues) -> Result<GeometryBuffer, BuildError>;
}

/// Outcome of a successful `set_value`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamChange {
    /// The normalized value equals the stored one; nothing was applied.
    Unchanged,
    /// Materials were updated in place.
    Patched,
    /// Vertex data was updated in place, materials possibly too.
    PatchedGeometry,
    Rebuilt,
}

impl ParamChange {
    /// Whether the geometry buffer differs from before the change.
    pub fn touches_geometry(self) -> bool {
        matches!(self, Self::PatchedGeometry | Self::Rebuilt)
    }
}

/// A value that was stored but not yet applied.
pub(crate) struct Staged {
    pub id: &'static str,
    pub previous: ParamValue,
    pub effect: ParamEffect,
}

/// Schema plus live values plus hooks.
#[derive(Clone)]
pub struct ParamRig {
    schema: Vec<ParamSpec>,
    values: ParamValues,
    hooks: Arc<dyn RigHooks>,
}

impl fmt::Debug for ParamRig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamRig")
            .field("schema", &self.schema.iter().map(|s| s.id).collect::<Vec<_>>())
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

impl ParamRig {
    /// `values` must already be resolved against `schema`.
    pub fn new(schema: Vec<ParamSpec>, values: ParamValues, hooks: Arc<dyn RigHooks>) -> Self {
        Self {
            schema,
            values,
            hooks,
        }
    }

    pub fn schema(&self) -> &[ParamSpec] {
        &self.schema
    }

    pub fn values(&self) -> &ParamValues {
        &self.values
    }

    pub fn get(&self, id: &str) -> Option<&ParamValue> {
        self.values.get(id)
    }

    pub fn spec(&self, id: &str) -> Option<&ParamSpec> {
        find_spec(&self.schema, id)
    }

    pub(crate) fn hooks(&self) -> &Arc<dyn RigHooks> {
        &self.hooks
    }

    /// Normalize and store `value`. `None` when it equals the stored value.
    pub(crate) fn stage(&mut self, id: &str, value: ParamValue) -> Result<Option<Staged>, ParamError> {
        let spec = find_spec(&self.schema, id).ok_or_else(|| ParamError::UnknownParam(id.to_string()))?;
        let value = spec.normalize(value)?;
        let (spec_id, effect) = (spec.id, spec.effect);

        let previous = self.values.get(spec_id).cloned().unwrap_or_else(|| spec.default.clone());
        if previous == value {
            return Ok(None);
        }
        self.values.insert(spec_id, value);
        Ok(Some(Staged {
            id: spec_id,
            previous,
            effect,
        }))
    }

    /// Put back a value replaced by [`stage`](Self::stage).
    pub(crate) fn restore(&mut self, staged: Staged) {
        self.values.insert(staged.id, staged.previous);
    }

    /// Set a parameter and apply it.
    ///
    /// Patch parameters update `target` in place. Rebuild parameters replace
    /// the geometry; if the rebuild fails the previous value is restored and
    /// the geometry is left untouched.
    pub fn set_value(
        &mut self,
        id: &str,
        value: impl Into<ParamValue>,
        target: RigTarget<'_>,
    ) -> Result<ParamChange, ParamError> {
        let Some(staged) = self.stage(id, value.into())? else {
            return Ok(ParamChange::Unchanged);
        };

        match staged.effect {
            ParamEffect::Patch => {
                let mut patch = PatchTarget::new(target.materials.all_mut(), target.geometry);
                self.hooks.patch(staged.id, &self.values, &mut patch);
                debug!("Patched '{}'", staged.id);
                Ok(patch.change())
            }
            ParamEffect::Rebuild => match self.hooks.rebuild(&self.values) {
                Ok(geometry) => {
                    *target.geometry = geometry;
                    debug!("Rebuilt geometry for '{}'", staged.id);
                    Ok(ParamChange::Rebuilt)
                }
                Err(source) => {
                    let id = staged.id.to_string();
                    self.restore(staged);
                    Err(ParamError::Rebuild { id, source })
                }
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::material::{RegionMaterial, SolidMaterials};
    use crate::param::resolve_values;

    /// Hooks that count calls and tint the first semantic material.
    #[derive(Default)]
    pub(crate) struct CountingHooks {
        pub patches: AtomicUsize,
        pub rebuilds: AtomicUsize,
        pub fail_rebuild: bool,
    }

    impl RigHooks for CountingHooks {
        fn patch(&self, _id: &str, values: &ParamValues, target: &mut PatchTarget<'_>) {
            self.patches.fetch_add(1, Ordering::SeqCst);
            if let Some(m) = target.materials.semantic.first_mut() {
                m.roughness = values.number("gloss").unwrap_or(0.0);
            }
        }

        fn rebuild(&self, values: &ParamValues) -> Result<GeometryBuffer, BuildError> {
            self.rebuilds.fetch_add(1, Ordering::SeqCst);
            if self.fail_rebuild {
                return Err(BuildError::UnknownMesh("broken".into()));
            }
            let size = values.number("size").unwrap_or(1.0);
            Ok(GeometryBuffer::new(
                vec![[0.0; 3], [size, 0.0, 0.0], [0.0, size, 0.0]],
                Some(vec![0, 1, 2]),
            ))
        }
    }

    pub(crate) fn schema() -> Vec<ParamSpec> {
        vec![
            ParamSpec::number("size", "Size", 1.0, (0.5, 4.0, 0.5), ParamEffect::Rebuild),
            ParamSpec::number("gloss", "Gloss", 0.5, (0.0, 1.0, 0.0), ParamEffect::Patch),
        ]
    }

    fn rig(hooks: Arc<CountingHooks>) -> ParamRig {
        let schema = schema();
        let values = resolve_values(&schema, &ParamValues::new()).unwrap();
        ParamRig::new(schema, values, hooks)
    }

    fn materials() -> AssetMaterials {
        AssetMaterials {
            semantic: vec![RegionMaterial::new("a")],
            solid: SolidMaterials::Shared(RegionMaterial::new("s")),
        }
    }

    #[test]
    fn test_patch_updates_materials() {
        let hooks = Arc::new(CountingHooks::default());
        let mut rig = rig(hooks.clone());
        let (mut mats, mut geo) = (materials(), GeometryBuffer::default());

        let change = rig
            .set_value(
                "gloss",
                0.25,
                RigTarget {
                    materials: &mut mats,
                    geometry: &mut geo,
                },
            )
            .unwrap();
        assert_eq!(change, ParamChange::Patched);
        assert_eq!(mats.semantic[0].roughness, 0.25);
        assert_eq!(hooks.rebuilds.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_rebuild_swaps_geometry() {
        let hooks = Arc::new(CountingHooks::default());
        let mut rig = rig(hooks.clone());
        let (mut mats, mut geo) = (materials(), GeometryBuffer::default());

        let change = rig
            .set_value(
                "size",
                2.0,
                RigTarget {
                    materials: &mut mats,
                    geometry: &mut geo,
                },
            )
            .unwrap();
        assert_eq!(change, ParamChange::Rebuilt);
        assert_eq!(geo.positions()[1], [2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_unchanged_is_noop() {
        let hooks = Arc::new(CountingHooks::default());
        let mut rig = rig(hooks.clone());
        let (mut mats, mut geo) = (materials(), GeometryBuffer::default());

        // 1.1 snaps back to the current 1.0.
        let change = rig
            .set_value(
                "size",
                1.1,
                RigTarget {
                    materials: &mut mats,
                    geometry: &mut geo,
                },
            )
            .unwrap();
        assert_eq!(change, ParamChange::Unchanged);
        assert_eq!(hooks.rebuilds.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failed_rebuild_restores_value() {
        let hooks = Arc::new(CountingHooks {
            fail_rebuild: true,
            ..Default::default()
        });
        let mut rig = rig(hooks);
        let (mut mats, mut geo) = (materials(), GeometryBuffer::default());

        let err = rig
            .set_value(
                "size",
                3.0,
                RigTarget {
                    materials: &mut mats,
                    geometry: &mut geo,
                },
            )
            .unwrap_err();
        assert!(matches!(err, ParamError::Rebuild { .. }));
        assert_eq!(rig.values().number("size"), Some(1.0));
        assert!(geo.is_empty());
    }

    #[test]
    fn test_errors_leave_state_untouched() {
        let hooks = Arc::new(CountingHooks::default());
        let mut rig = rig(hooks);
        let before = rig.values().clone();
        let (mut mats, mut geo) = (materials(), GeometryBuffer::default());

        let err = rig
            .set_value(
                "nope",
                1.0,
                RigTarget {
                    materials: &mut mats,
                    geometry: &mut geo,
                },
            )
            .unwrap_err();
        assert_eq!(err, ParamError::UnknownParam("nope".into()));

        let err = rig
            .set_value(
                "size",
                true,
                RigTarget {
                    materials: &mut mats,
                    geometry: &mut geo,
                },
            )
            .unwrap_err();
        assert!(matches!(err, ParamError::TypeMismatch { .. }));
        assert_eq!(rig.values(), &before);
    }
}
