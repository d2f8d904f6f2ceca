use std::str::FromStr;

use serde_yaml::{Mapping, Sequence, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to parse job manifest: {0}")]
    Parse(#[source] serde_yaml::Error),
    #[error("failed to serialize job manifest: {0}")]
    Serialize(#[source] serde_yaml::Error),
    #[error("job manifest root must be a mapping")]
    NotAMapping,
}

/// A parsed workload manifest.
///
/// The document is kept untyped so every key the author wrote and this tool
/// does not know about survives the round trip unchanged. Key insertion
/// order is preserved by `serde_yaml::Mapping`.
pub struct JobManifest {
    root: Mapping,
}

impl FromStr for JobManifest {
    type Err = ManifestError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let doc: Value = serde_yaml::from_str(input).map_err(ManifestError::Parse)?;
        match doc {
            Value::Mapping(root) => Ok(Self { root }),
            _ => Err(ManifestError::NotAMapping),
        }
    }
}

impl JobManifest {
    /// Serialize the document back to YAML, block style, keys in insertion
    /// order. Multi-line string values come out as literal block scalars.
    pub fn to_yaml(&self) -> Result<String, ManifestError> {
        serde_yaml::to_string(&self.root).map_err(ManifestError::Serialize)
    }

    /// Root mapping, for read-only inspection.
    pub fn root(&self) -> &Mapping {
        &self.root
    }

    /// `spec.template.metadata`, creating every missing level on the way.
    pub fn pod_metadata(&mut self) -> &mut Mapping {
        mapping_entry(self.pod_template(), "metadata")
    }

    /// `spec.template.spec`, creating every missing level on the way.
    pub fn pod_spec(&mut self) -> &mut Mapping {
        mapping_entry(self.pod_template(), "spec")
    }

    /// `spec.template.spec` only if every level already exists.
    pub fn existing_pod_spec(&mut self) -> Option<&mut Mapping> {
        self.root
            .get_mut("spec")?
            .as_mapping_mut()?
            .get_mut("template")?
            .as_mapping_mut()?
            .get_mut("spec")?
            .as_mapping_mut()
    }

    fn pod_template(&mut self) -> &mut Mapping {
        mapping_entry(mapping_entry(&mut self.root, "spec"), "template")
    }
}

/// Return the mapping stored under `key`, inserting an empty one when the
/// key is absent. A non-mapping value under the key is replaced by an empty
/// mapping.
pub fn mapping_entry<'a>(map: &'a mut Mapping, key: &str) -> &'a mut Mapping {
    let slot = map
        .entry(key.into())
        .or_insert_with(|| Value::Mapping(Mapping::new()));
    if !slot.is_mapping() {
        *slot = Value::Mapping(Mapping::new());
    }
    match slot {
        Value::Mapping(inner) => inner,
        _ => unreachable!("slot was just set to a mapping"),
    }
}

/// Return the sequence stored under `key`, inserting an empty one when the
/// key is absent. A non-sequence value under the key is replaced by an empty
/// sequence.
pub fn sequence_entry<'a>(map: &'a mut Mapping, key: &str) -> &'a mut Sequence {
    let slot = map
        .entry(key.into())
        .or_insert_with(|| Value::Sequence(Sequence::new()));
    if !slot.is_sequence() {
        *slot = Value::Sequence(Sequence::new());
    }
    match slot {
        Value::Sequence(inner) => inner,
        _ => unreachable!("slot was just set to a sequence"),
    }
}
