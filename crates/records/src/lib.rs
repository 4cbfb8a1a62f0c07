// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Record resolution over a spreadsheet
//!
//! An identifier becomes a business record in three layers:
//!
//! 1. **RecordStore**: the last data-tab row carrying the identifier
//! 2. **CatalogStore**: client defaults joined on `ID_Cliente`, filling blanks only
//! 3. **OverrideStore**: locally persisted edits, which always win
//!
//! [`RecordResolver`] composes the three. [`RecentIndexCache`] and
//! [`IdSuggester`] sit on top for listing and autocomplete. Every cache is a
//! [`TtlCell`] owned by the component that uses it.

mod catalog;
mod column;
mod error;
mod overrides;
mod probe;
mod recent;
mod record;
mod resolver;
mod source;
mod store;
mod suggest;
mod ttl;

pub use catalog::{
    ADDRESS_FIELD, CLIENT_ID_FIELD, CONTACT_FIELD, CatalogRecord, CatalogSnapshot, CatalogStore, CatalogTab,
    DEFAULT_CATALOG_TAB, NAME_FIELD, REPORTS_URL_FIELD, ROUND_FIELD,
};
pub use column::{ColumnRef, ColumnResolver, index_to_letter, letter_to_index};
pub use error::{RecordError, Result};
pub use overrides::{LEGACY_FIELD_ALIASES, OverrideStore};
pub use probe::{SheetProbe, probe};
pub use recent::{RecentEntry, RecentIndexCache, RecentList, recent_ids};
pub use record::{Patch, Record};
pub use resolver::{CATALOG_FILLS, CLIENT_LINK_FIELD, RecordResolver, fill_from_catalog};
pub use source::SheetSource;
pub use store::{DEFAULT_ID_FIELD, RecordStore};
pub use suggest::{DEFAULT_SUGGESTION_LIMIT, IdSuggester, rank};
pub use ttl::TtlCell;
