//! Rigs for composite assets and the asset-level rig enum.

use std::ops::Range;

use bevy::log::debug;

use super::rig::{ParamChange, ParamRig, PatchTarget, RigTarget};
use super::{ParamEffect, ParamSpec, ParamValue, ParamValues, resolve_values};
use crate::error::ParamError;

/// A part rig mounted under `key`, owning a run of the composite's regions.
#[derive(Clone, Debug)]
pub struct RigChild {
    pub key: &'static str,
    pub rig: ParamRig,
    pub regions: Range<usize>,
}

/// Rig of a composite asset.
///
/// Own parameters live in `own`, whose hooks build the whole composite.
/// Child parameters are addressed as `key.id`; aliases map a short path to a
/// child path. Child patches see only the child's region range; child
/// rebuild parameters rebuild the whole composite.
#[derive(Clone, Debug)]
pub struct CompositeRig {
    own: ParamRig,
    children: Vec<RigChild>,
    aliases: Vec<(&'static str, &'static str)>,
}

impl CompositeRig {
    pub fn new(own: ParamRig) -> Self {
        Self {
            own,
            children: Vec::new(),
            aliases: Vec::new(),
        }
    }

    pub fn with_child(mut self, key: &'static str, rig: ParamRig, regions: Range<usize>) -> Self {
        self.children.push(RigChild { key, rig, regions });
        self
    }

    pub fn with_alias(mut self, alias: &'static str, path: &'static str) -> Self {
        self.aliases.push((alias, path));
        self
    }

    pub fn children(&self) -> &[RigChild] {
        &self.children
    }

    pub fn aliases(&self) -> &[(&'static str, &'static str)] {
        &self.aliases
    }

    fn resolve<'p>(&self, path: &'p str) -> &'p str {
        self.aliases
            .iter()
            .find(|(alias, _)| *alias == path)
            .map(|(_, target)| *target)
            .unwrap_or(path)
    }

    fn child_index(&self, path: &str) -> Option<(usize, usize)> {
        let (key, _) = path.split_once('.')?;
        let index = self.children.iter().position(|c| c.key == key)?;
        Some((index, key.len() + 1))
    }

    /// Own values plus every child value under `key.`.
    pub fn values(&self) -> ParamValues {
        let mut values = self.own.values().clone();
        for child in &self.children {
            values.extend_scoped(child.key, child.rig.values());
        }
        values
    }

    pub fn get(&self, path: &str) -> Option<&ParamValue> {
        let path = self.resolve(path);
        match self.child_index(path) {
            Some((index, skip)) => self.children[index].rig.get(&path[skip..]),
            None => self.own.get(path),
        }
    }

    /// Every addressable parameter: own, `key.id` for children, then aliases.
    pub fn entries(&self) -> Vec<(String, ParamSpec)> {
        let mut entries: Vec<(String, ParamSpec)> = self
            .own
            .schema()
            .iter()
            .map(|spec| (spec.id.to_string(), spec.clone()))
            .collect();
        for child in &self.children {
            entries.extend(
                child
                    .rig
                    .schema()
                    .iter()
                    .map(|spec| (format!("{}.{}", child.key, spec.id), spec.clone())),
            );
        }
        for (alias, target) in &self.aliases {
            if let Some((_, spec)) = entries.iter().find(|(path, _)| path == target) {
                let spec = spec.clone();
                entries.push((alias.to_string(), spec));
            }
        }
        entries
    }

    pub fn set_value(
        &mut self,
        path: &str,
        value: impl Into<ParamValue>,
        target: RigTarget<'_>,
    ) -> Result<ParamChange, ParamError> {
        let path = self.resolve(path);
        let Some((index, skip)) = self.child_index(path) else {
            return self.own_set_value(path, value.into(), target);
        };

        let Some(staged) = self.children[index].rig.stage(&path[skip..], value.into())? else {
            return Ok(ParamChange::Unchanged);
        };

        match staged.effect {
            ParamEffect::Patch => {
                let child = &self.children[index];
                let mut patch = PatchTarget::new(
                    target.materials.slice_mut(child.regions.clone()),
                    target.geometry,
                );
                child
                    .rig
                    .hooks()
                    .patch(staged.id, child.rig.values(), &mut patch);
                debug!("Patched '{}.{}'", child.key, staged.id);
                Ok(patch.change())
            }
            ParamEffect::Rebuild => match self.rebuild(path, target) {
                Ok(()) => Ok(ParamChange::Rebuilt),
                Err(err) => {
                    self.children[index].rig.restore(staged);
                    Err(err)
                }
            },
        }
    }

    fn own_set_value(
        &mut self,
        path: &str,
        value: ParamValue,
        target: RigTarget<'_>,
    ) -> Result<ParamChange, ParamError> {
        let Some(staged) = self.own.stage(path, value)? else {
            return Ok(ParamChange::Unchanged);
        };

        match staged.effect {
            ParamEffect::Patch => {
                let values = self.values();
                let mut patch = PatchTarget::new(target.materials.all_mut(), target.geometry);
                self.own.hooks().patch(staged.id, &values, &mut patch);
                Ok(patch.change())
            }
            ParamEffect::Rebuild => match self.rebuild(path, target) {
                Ok(()) => Ok(ParamChange::Rebuilt),
                Err(err) => {
                    self.own.restore(staged);
                    Err(err)
                }
            },
        }
    }

    fn rebuild(&self, path: &str, target: RigTarget<'_>) -> Result<(), ParamError> {
        let values = self.values();
        let geometry = self
            .own
            .hooks()
            .rebuild(&values)
            .map_err(|source| ParamError::Rebuild {
                id: path.to_string(),
                source,
            })?;
        *target.geometry = geometry;
        debug!("Rebuilt composite geometry for '{}'", path);
        Ok(())
    }
}

/// Rig attached to an asset.
#[derive(Clone, Debug)]
pub enum AssetRig {
    Single(ParamRig),
    Composite(CompositeRig),
}

impl AssetRig {
    pub fn get(&self, path: &str) -> Option<&ParamValue> {
        match self {
            Self::Single(rig) => rig.get(path),
            Self::Composite(rig) => rig.get(path),
        }
    }

    /// Flattened live values.
    pub fn values(&self) -> ParamValues {
        match self {
            Self::Single(rig) => rig.values().clone(),
            Self::Composite(rig) => rig.values(),
        }
    }

    /// Every addressable `(path, spec)` pair, aliases included.
    pub fn entries(&self) -> Vec<(String, ParamSpec)> {
        match self {
            Self::Single(rig) => rig
                .schema()
                .iter()
                .map(|spec| (spec.id.to_string(), spec.clone()))
                .collect(),
            Self::Composite(rig) => rig.entries(),
        }
    }

    pub fn set_value(
        &mut self,
        path: &str,
        value: impl Into<ParamValue>,
        target: RigTarget<'_>,
    ) -> Result<ParamChange, ParamError> {
        match self {
            Self::Single(rig) => rig.set_value(path, value, target),
            Self::Composite(rig) => rig.set_value(path, value, target),
        }
    }
}

/// Static description of a composite's parameters, for resolving flat value
/// sets before an asset exists.
#[derive(Clone, Debug)]
pub struct CompositeSchema {
    pub own: Vec<ParamSpec>,
    pub children: Vec<(&'static str, Vec<ParamSpec>)>,
    pub aliases: &'static [(&'static str, &'static str)],
}

impl CompositeSchema {
    /// Resolve a flat value set (own ids, `key.id` paths and aliases) into a
    /// complete normalized set keyed by canonical paths.
    ///
    /// # Errors
    /// Unknown ids or child keys and values of the wrong type.
    pub fn resolve(&self, values: &ParamValues) -> Result<ParamValues, ParamError> {
        let mut own = ParamValues::new();
        let mut scoped = vec![ParamValues::new(); self.children.len()];

        for (path, value) in values.iter() {
            let path = self
                .aliases
                .iter()
                .find(|(alias, _)| *alias == path)
                .map_or(path, |(_, target)| *target);
            match path.split_once('.') {
                Some((key, id)) => {
                    let index = self
                        .children
                        .iter()
                        .position(|(k, _)| *k == key)
                        .ok_or_else(|| ParamError::UnknownParam(path.to_string()))?;
                    scoped[index].insert(id, value.clone());
                }
                None => own.insert(path, value.clone()),
            }
        }

        let mut resolved = resolve_values(&self.own, &own)?;
        for ((key, schema), values) in self.children.iter().zip(&scoped) {
            resolved.extend_scoped(key, &resolve_values(schema, values)?);
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::geometry::GeometryBuffer;
    use crate::material::{AssetMaterials, RegionMaterial, SolidMaterials};
    use crate::param::rig::tests::{CountingHooks, schema};

    fn child_rig(hooks: Arc<CountingHooks>) -> ParamRig {
        let schema = schema();
        let values = resolve_values(&schema, &ParamValues::new()).unwrap();
        ParamRig::new(schema, values, hooks)
    }

    fn composite(own_hooks: Arc<CountingHooks>, child_hooks: Arc<CountingHooks>) -> CompositeRig {
        let own_schema = vec![ParamSpec::number(
            "length",
            "Length",
            2.0,
            (1.0, 5.0, 0.5),
            ParamEffect::Rebuild,
        )];
        let values = resolve_values(&own_schema, &ParamValues::new()).unwrap();
        CompositeRig::new(ParamRig::new(own_schema, values, own_hooks))
            .with_child("head", child_rig(child_hooks), 2..4)
            .with_alias("gloss", "head.gloss")
    }

    fn materials() -> AssetMaterials {
        AssetMaterials {
            semantic: (0..4).map(|i| RegionMaterial::new(format!("m{i}"))).collect(),
            solid: SolidMaterials::PerRegion((0..4).map(|i| RegionMaterial::new(format!("s{i}"))).collect()),
        }
    }

    #[test]
    fn test_alias_and_path_share_value() {
        let mut rig = composite(Arc::default(), Arc::default());
        let (mut mats, mut geo) = (materials(), GeometryBuffer::default());

        rig.set_value(
            "gloss",
            0.75,
            RigTarget {
                materials: &mut mats,
                geometry: &mut geo,
            },
        )
        .unwrap();
        assert_eq!(rig.get("gloss"), Some(&ParamValue::Number(0.75)));
        assert_eq!(rig.get("head.gloss"), Some(&ParamValue::Number(0.75)));
    }

    #[test]
    fn test_child_patch_sees_only_its_regions() {
        let mut rig = composite(Arc::default(), Arc::default());
        let (mut mats, mut geo) = (materials(), GeometryBuffer::default());

        rig.set_value(
            "head.gloss",
            0.1,
            RigTarget {
                materials: &mut mats,
                geometry: &mut geo,
            },
        )
        .unwrap();
        // The child's first region is composite region 2.
        assert!((mats.semantic[2].roughness - 0.1).abs() < 1e-6);
        assert_eq!(mats.semantic[0].roughness, RegionMaterial::default().roughness);
    }

    #[test]
    fn test_child_rebuild_rebuilds_composite() {
        let own = Arc::new(CountingHooks::default());
        let child = Arc::new(CountingHooks::default());
        let mut rig = composite(own.clone(), child.clone());
        let (mut mats, mut geo) = (materials(), GeometryBuffer::default());

        let change = rig
            .set_value(
                "head.size",
                2.0,
                RigTarget {
                    materials: &mut mats,
                    geometry: &mut geo,
                },
            )
            .unwrap();
        assert_eq!(change, ParamChange::Rebuilt);
        assert_eq!(own.rebuilds.load(Ordering::SeqCst), 1);
        assert_eq!(child.rebuilds.load(Ordering::SeqCst), 0);
        assert_eq!(rig.values().number("head.size"), Some(2.0));
    }

    #[test]
    fn test_failed_composite_rebuild_restores_child_value() {
        let own = Arc::new(CountingHooks {
            fail_rebuild: true,
            ..Default::default()
        });
        let mut rig = composite(own, Arc::default());
        let (mut mats, mut geo) = (materials(), GeometryBuffer::default());

        let result = rig.set_value(
            "head.size",
            2.0,
            RigTarget {
                materials: &mut mats,
                geometry: &mut geo,
            },
        );
        assert!(result.is_err());
        assert_eq!(rig.get("head.size"), Some(&ParamValue::Number(1.0)));
    }

    #[test]
    fn test_entries_include_aliases() {
        let rig = composite(Arc::default(), Arc::default());
        let paths: Vec<String> = rig.entries().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["length", "head.size", "head.gloss", "gloss"]);
    }

    #[test]
    fn test_unknown_child_path() {
        let mut rig = composite(Arc::default(), Arc::default());
        let (mut mats, mut geo) = (materials(), GeometryBuffer::default());
        let err = rig
            .set_value(
                "plate.size",
                1.0,
                RigTarget {
                    materials: &mut mats,
                    geometry: &mut geo,
                },
            )
            .unwrap_err();
        assert_eq!(err, ParamError::UnknownParam("plate.size".into()));
    }

    #[test]
    fn test_composite_schema_resolves_aliases() {
        let own = vec![ParamSpec::number("length", "Length", 2.0, (1.0, 5.0, 0.5), ParamEffect::Rebuild)];
        let schema = CompositeSchema {
            own,
            children: vec![("head", schema())],
            aliases: &[("gloss", "head.gloss")],
        };
        let values = schema
            .resolve(&ParamValues::new().with("gloss", 0.25).with("length", 9.0))
            .unwrap();
        assert_eq!(values.number("head.gloss"), Some(0.25));
        assert_eq!(values.number("head.size"), Some(1.0));
        assert_eq!(values.number("length"), Some(5.0));
        assert!(!values.contains("gloss"));

        assert_eq!(
            schema.resolve(&ParamValues::new().with("plate.size", 1.0)),
            Err(ParamError::UnknownParam("plate.size".into()))
        );
    }
}
