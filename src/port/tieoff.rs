// SPDX-License-Identifier: Apache-2.0

use crate::{Port, StaticValue};

impl Port {
    /// Ties the port to a constant. A tied port is rendered as a literal
    /// instead of a wire and is never tied to ground.
    pub fn set_to_static(&self, value: StaticValue) {
        self.core.borrow_mut().static_value = Some(value);
    }

    pub fn unset_static(&self) {
        self.core.borrow_mut().static_value = None;
    }

    pub fn has_static_value(&self) -> bool {
        self.core.borrow().static_value.is_some()
    }

    pub fn static_value(&self) -> Option<StaticValue> {
        self.core.borrow().static_value
    }
}
