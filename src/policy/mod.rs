// SPDX-License-Identifier: MIT

pub mod catalogue;
pub mod loader;
pub mod record;
pub mod rule;
pub mod validate;
