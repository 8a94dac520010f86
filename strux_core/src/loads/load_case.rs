use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityMeta};
use crate::errors::{StruxError, StruxResult};
use crate::restricted::{DurationClass, LoadCaseType, LoadCombType};

/// A named load case referenced by loads and combinations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCase {
    pub(crate) meta: EntityMeta,
    pub name: String,
    pub case_type: LoadCaseType,
    pub duration_class: DurationClass,
}

impl LoadCase {
    pub fn new(name: impl Into<String>, case_type: LoadCaseType, duration_class: DurationClass) -> Self {
        LoadCase {
            meta: EntityMeta::created(),
            name: name.into(),
            case_type,
            duration_class,
        }
    }

    /// Self-weight case, as most models start with
    pub fn dead_load(name: impl Into<String>) -> Self {
        LoadCase::new(name, LoadCaseType::DeadLoad, DurationClass::Permanent)
    }

    pub fn id(&self) -> EntityId {
        self.meta.id
    }

    /// Identity and change stamp; read-only outside the crate
    pub fn meta(&self) -> &EntityMeta {
        &self.meta
    }
}

/// Factored sum of load cases for one limit state
///
/// # Example
/// ```
/// use strux_core::loads::{LoadCase, LoadCombination};
/// use strux_core::restricted::LoadCombType;
///
/// let dead = LoadCase::dead_load("DL");
/// let combo = LoadCombination::new("ULS 1", LoadCombType::UltimateOrdinary)
///     .with_case(dead.id(), 1.35)?;
///
/// assert_eq!(combo.factor(dead.id()), 1.35);
/// # Ok::<(), strux_core::errors::StruxError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCombination {
    pub(crate) meta: EntityMeta,
    pub name: String,
    pub combination_type: LoadCombType,
    /// Load case references with their partial factors, in insertion order
    pub cases: Vec<(EntityId, f64)>,
}

impl LoadCombination {
    pub fn new(name: impl Into<String>, combination_type: LoadCombType) -> Self {
        LoadCombination {
            meta: EntityMeta::created(),
            name: name.into(),
            combination_type,
            cases: Vec::new(),
        }
    }

    /// Add a load case with its factor (builder pattern)
    pub fn with_case(mut self, load_case: EntityId, gamma: f64) -> StruxResult<Self> {
        if !gamma.is_finite() {
            return Err(StruxError::invalid_input(
                "gamma",
                gamma.to_string(),
                "load factor must be finite",
            ));
        }
        if self.cases.iter().any(|(id, _)| *id == load_case) {
            return Err(StruxError::invalid_input(
                "load_case",
                load_case.to_string(),
                "load case is already part of the combination",
            ));
        }
        self.cases.push((load_case, gamma));
        Ok(self)
    }

    /// Factor of a load case (0.0 if not in the combination)
    pub fn factor(&self, load_case: EntityId) -> f64 {
        self.cases
            .iter()
            .find(|(id, _)| *id == load_case)
            .map(|(_, gamma)| *gamma)
            .unwrap_or(0.0)
    }

    pub fn id(&self) -> EntityId {
        self.meta.id
    }

    /// Identity and change stamp; read-only outside the crate
    pub fn meta(&self) -> &EntityMeta {
        &self.meta
    }
}
