// SPDX-License-Identifier: Apache-2.0

use crate::{Block, Error, Parameter, Result};

impl Block {
    /// Adds a generic. A parameter whose value refers to a package constant
    /// records that package as a dependency of this block.
    pub fn add_parameter(&self, parameter: Parameter) -> Result<()> {
        if self.has_parameter(parameter.name()) {
            return Err(Error::AlreadyExists(format!(
                "parameter {} already exists in block {}",
                parameter.name(),
                self.instance_name()
            )));
        }
        self.insert_parameter(parameter);
        Ok(())
    }

    /// Adds a generic or replaces the one with the same name, keeping its
    /// position.
    pub fn set_parameter(&self, parameter: Parameter) {
        self.insert_parameter(parameter);
    }

    fn insert_parameter(&self, parameter: Parameter) {
        if let Some(constant) = parameter.package_constant() {
            self.add_package(constant.package.clone());
        }
        self.core
            .borrow_mut()
            .parameters
            .insert(parameter.name().to_string(), parameter);
    }

    /// Changes the assigned value of an existing generic.
    pub fn set_parameter_value(&self, name: &str, value: impl AsRef<str>) -> Result<()> {
        let mut core = self.core.borrow_mut();
        let instance_name = core.instance_name.clone();
        let parameter = core.parameters.get_mut(name).ok_or_else(|| {
            Error::NotFound(format!("no parameter {name} in block {instance_name}"))
        })?;
        parameter.set_value(value);
        Ok(())
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.core.borrow().parameters.contains_key(name)
    }

    pub fn parameter(&self, name: &str) -> Result<Parameter> {
        self.core
            .borrow()
            .parameters
            .get(name)
            .cloned()
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "no parameter {} in block {}",
                    name,
                    self.instance_name()
                ))
            })
    }

    pub fn parameter_at(&self, index: usize) -> Result<Parameter> {
        self.core
            .borrow()
            .parameters
            .get_index(index)
            .map(|(_, p)| p.clone())
            .ok_or_else(|| {
                Error::OutOfRange(format!(
                    "parameter index {} of block {} with {} parameters",
                    index,
                    self.instance_name(),
                    self.parameter_count()
                ))
            })
    }

    /// Removes a generic; returns whether it existed.
    pub fn remove_parameter(&self, name: &str) -> bool {
        self.core.borrow_mut().parameters.shift_remove(name).is_some()
    }

    /// Generics in insertion order.
    pub fn parameters(&self) -> Vec<Parameter> {
        self.core.borrow().parameters.values().cloned().collect()
    }

    pub fn parameter_count(&self) -> usize {
        self.core.borrow().parameters.len()
    }

    /// Records an external package dependency. Duplicates are ignored.
    pub fn add_package(&self, package: impl AsRef<str>) {
        self.core
            .borrow_mut()
            .packages
            .insert(package.as_ref().to_string());
    }

    pub fn packages(&self) -> Vec<String> {
        self.core.borrow().packages.iter().cloned().collect()
    }
}
