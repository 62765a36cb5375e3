use calamine::Data;
use chrono::NaiveDate;
use tracing::{debug, instrument};

use crate::importers::sheet_parser::{FlowTable, MetadataBlock, SheetTables};
use crate::measurement::error::MeasurementError;
use crate::measurement::model::{FlowPoint, FlowSummary, Measurement, MeasurementMetadata, FLOW_COLUMNS};
use crate::measurement::schema::{cell_date, cell_number, cell_text, MetaField, METADATA_SCHEMA};
use crate::utils::site_code_from_sheet_name;

/// Separator crews use between names in the crew cell
pub const CREW_SEPARATOR: &str = ", ";

/// Raw cell values picked out of the metadata block by the schema
#[derive(Debug, Default)]
struct ResolvedFields {
    station: Option<Data>,
    coordinates: Option<Data>,
    site_code: Option<Data>,
    date: Option<Data>,
    start_time: Option<Data>,
    end_time: Option<Data>,
    timezone: Option<Data>,
    meter_type: Option<Data>,
    crew: Option<Data>,
}

impl ResolvedFields {
    fn from_block(block: &MetadataBlock) -> Self {
        let mut fields = Self::default();
        for location in METADATA_SCHEMA.iter() {
            let value = location.resolve(block);
            let slot = match location.field {
                MetaField::Station => &mut fields.station,
                MetaField::Coordinates => &mut fields.coordinates,
                MetaField::SiteCode => &mut fields.site_code,
                MetaField::Date => &mut fields.date,
                MetaField::StartTime => &mut fields.start_time,
                MetaField::EndTime => &mut fields.end_time,
                MetaField::Timezone => &mut fields.timezone,
                MetaField::MeterType => &mut fields.meter_type,
                MetaField::Crew => &mut fields.crew,
            };
            *slot = value;
        }
        fields
    }
}

/// Build a measurement from the tables of one sheet
pub fn build_from_tables(tables: &SheetTables) -> Result<Measurement, MeasurementError> {
    build(&tables.name, &tables.flow, &tables.metadata)
}

/// Turn one sheet's flow table and metadata block into a validated [`Measurement`]
///
/// Fails with `DataFormat` when a flow column is missing, `Division` when
/// the cross-section has no area, and `Validation` when no site code or date
/// can be resolved.
#[instrument(skip(flow, metadata), fields(sheet = %name))]
pub fn build(
    name: &str,
    flow: &FlowTable,
    metadata: &MetadataBlock,
) -> Result<Measurement, MeasurementError> {
    let points = flow_points(name, flow)?;
    let summary = FlowSummary::from_points(name, &points)?;

    let fields = ResolvedFields::from_block(metadata);
    let text = |value: &Option<Data>| value.as_ref().and_then(cell_text);

    let site_code = text(&fields.site_code).or_else(|| {
        debug!("No site code cell on sheet '{}', using sheet name", name);
        site_code_from_sheet_name(name)
    });

    let crew = text(&fields.crew)
        .map(|names| {
            names
                .split(CREW_SEPARATOR)
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default();

    let site_code = site_code.ok_or_else(|| MeasurementError::Validation {
        sheet: name.to_string(),
        msg: "no site code in metadata or sheet name".to_string(),
    })?;
    let date = resolve_date(name, fields.date.as_ref())?;

    let metadata = MeasurementMetadata {
        station: text(&fields.station),
        coordinates: text(&fields.coordinates),
        start_time: text(&fields.start_time),
        end_time: text(&fields.end_time),
        timezone: text(&fields.timezone),
        meter_type: text(&fields.meter_type),
        crew,
    };

    debug!(
        "Built measurement for site {} on {} from {} flow points",
        site_code,
        date,
        points.len()
    );

    Ok(Measurement::assemble(
        name.to_string(),
        site_code,
        date,
        metadata,
        points,
        summary,
    ))
}

/// Numeric flow points, dropping any row with a missing or non-numeric value
fn flow_points(name: &str, flow: &FlowTable) -> Result<Vec<FlowPoint>, MeasurementError> {
    let mut indices = [0usize; 6];
    for (slot, column) in indices.iter_mut().zip(FLOW_COLUMNS) {
        *slot = flow
            .column_index(column)
            .ok_or_else(|| MeasurementError::DataFormat {
                sheet: name.to_string(),
                column: column.to_string(),
            })?;
    }

    let mut points = Vec::with_capacity(flow.rows().len());
    let mut dropped = 0;
    for row in flow.rows() {
        let value = |idx: usize| row.get(indices[idx]).and_then(cell_number);
        match (value(0), value(1), value(2), value(3), value(4), value(5)) {
            (
                Some(distance_ft),
                Some(width_ft),
                Some(depth_ft),
                Some(velocity_fps),
                Some(area_sqft),
                Some(discharge_cfs),
            ) => points.push(FlowPoint {
                distance_ft,
                width_ft,
                depth_ft,
                velocity_fps,
                area_sqft,
                discharge_cfs,
            }),
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!("Dropped {} incomplete flow rows on sheet '{}'", dropped, name);
    }
    Ok(points)
}

fn resolve_date(name: &str, cell: Option<&Data>) -> Result<NaiveDate, MeasurementError> {
    let cell = cell.ok_or_else(|| MeasurementError::Validation {
        sheet: name.to_string(),
        msg: "missing observation date".to_string(),
    })?;

    cell_date(cell).ok_or_else(|| MeasurementError::Validation {
        sheet: name.to_string(),
        msg: format!("unreadable observation date: {cell}"),
    })
}
