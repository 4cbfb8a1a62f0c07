// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod asset;
pub mod edit;
pub mod place;
pub mod probe;
pub mod recent;
pub mod resolve;
pub mod show;
pub mod suggest;

pub use asset::fetch_asset_command;
pub use edit::{edit_command, parse_assignments};
pub use place::place_command;
pub use probe::probe_command;
pub use recent::recent_command;
pub use resolve::resolve_path_command;
pub use show::show_command;
pub use suggest::suggest_command;
