// SPDX-License-Identifier: Apache-2.0

/// A named, typed configuration value of a block (a VHDL generic or a
/// Verilog parameter), or a netlist-scoped constant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    param_type: String,
    value: String,
    default_value: String,
    package_constant: Option<PackageConstant>,
}

/// Reference to a constant defined in an external package.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageConstant {
    pub package: String,
    pub constant: String,
}

impl Parameter {
    /// Creates a parameter whose default value equals its assigned value.
    pub fn new(name: impl AsRef<str>, param_type: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        Parameter {
            name: name.as_ref().to_string(),
            param_type: param_type.as_ref().to_string(),
            value: value.as_ref().to_string(),
            default_value: value.as_ref().to_string(),
            package_constant: None,
        }
    }

    pub fn with_default(mut self, default_value: impl AsRef<str>) -> Self {
        self.default_value = default_value.as_ref().to_string();
        self
    }

    /// Makes the value a reference to `constant` of `package`. The owning
    /// block records the package as a dependency when the parameter is added.
    pub fn with_package_constant(
        mut self,
        package: impl AsRef<str>,
        constant: impl AsRef<str>,
    ) -> Self {
        self.value = constant.as_ref().to_string();
        self.package_constant = Some(PackageConstant {
            package: package.as_ref().to_string(),
            constant: constant.as_ref().to_string(),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param_type(&self) -> &str {
        &self.param_type
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn default_value(&self) -> &str {
        &self.default_value
    }

    pub fn set_value(&mut self, value: impl AsRef<str>) {
        self.value = value.as_ref().to_string();
    }

    pub fn package_constant(&self) -> Option<&PackageConstant> {
        self.package_constant.as_ref()
    }

    pub fn is_string_type(&self) -> bool {
        self.param_type.eq_ignore_ascii_case("string")
    }

    pub fn is_boolean_type(&self) -> bool {
        self.param_type.eq_ignore_ascii_case("boolean")
    }
}
