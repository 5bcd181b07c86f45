//! Parameter schemas and rigs.
//!
//! A schema lists typed parameters ([`ParamSpec`]) with their domain and
//! whether a change patches materials or rebuilds geometry. A rig holds live
//! values and applies changes through asset-specific [`RigHooks`].

mod composite;
mod rig;
mod schema;
mod values;

pub use composite::{AssetRig, CompositeRig, CompositeSchema, RigChild};
pub use rig::{ParamChange, ParamRig, PatchTarget, RigHooks, RigTarget};
pub use schema::{ParamEffect, ParamKind, ParamSpec, ParamValue, find_spec};
pub use values::{ParamValues, resolve_values};
