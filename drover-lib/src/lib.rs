// SPDX-License-Identifier: GPL-2.0-only
pub mod agent;
pub mod command;
pub mod net;
pub mod os;
pub mod package;
pub mod resolver;
pub mod setup;

#[cfg(test)]
mod test_support;
