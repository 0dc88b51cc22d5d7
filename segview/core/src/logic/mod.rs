//! SPDX-License-Identifier: GPL-3.0-or-later

pub mod catalog;
pub mod loader;
pub mod presence;
pub mod registry;
