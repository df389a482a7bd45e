// SPDX-License-Identifier: MIT

pub mod editor;
pub mod engine;
