// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use serde::Deserialize;

use crate::{Error, Result};

/// Database entry chosen for one unit of the architecture.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct UnitImplementation {
    pub unit: String,
    pub entry_id: u32,
}

impl UnitImplementation {
    pub fn new(unit: impl AsRef<str>, entry_id: u32) -> Self {
        UnitImplementation {
            unit: unit.as_ref().to_string(),
            entry_id,
        }
    }
}

/// Which implementation realizes each unit. Units listed under
/// `generated_fus`/`generated_rfs` have no stored implementation and are
/// built as parameterized blocks.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ImplementationSelection {
    pub fu_implementations: Vec<UnitImplementation>,
    pub rf_implementations: Vec<UnitImplementation>,
    pub iu_implementations: Vec<UnitImplementation>,
    pub generated_fus: Vec<String>,
    pub generated_rfs: Vec<String>,
}

impl ImplementationSelection {
    pub fn from_toml_str(content: &str) -> Result<ImplementationSelection> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<ImplementationSelection> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        ImplementationSelection::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tables() {
        let selection = ImplementationSelection::from_toml_str(
            r#"
generated_fus = ["ALU"]

[[fu_implementations]]
unit = "LSU"
entry_id = 4

[[rf_implementations]]
unit = "RF"
entry_id = 12
"#,
        )
        .unwrap();
        assert_eq!(selection.fu_implementations, vec![UnitImplementation::new("LSU", 4)]);
        assert_eq!(selection.rf_implementations[0].entry_id, 12);
        assert!(selection.iu_implementations.is_empty());
        assert_eq!(selection.generated_fus, vec!["ALU".to_string()]);
    }
}
