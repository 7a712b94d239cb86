//! Tabular input and output
//!
//! The engine itself is format-agnostic; these helpers read the CSV layouts
//! used by the command line tool and write the output tables.

mod de;
mod tables;
mod writer;

pub use tables::{
    BuildingParcelRow, MemberRow, ParcelRow, SegmentRow, StreetRow, building_parcels_from_rows,
    members_from_rows, read_registry_table, read_registry_table_from_reader, read_table,
    read_table_from_reader, registry_from_rows, street_table_from_rows,
};
pub use writer::{record_headers, write_records, write_segments, write_summary};
