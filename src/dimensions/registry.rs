use crate::model::Column;

/// Selector entry meaning "no primary filter".
pub const ALL_DATA: &str = "All Data";

/// Primary dimensions in selector order.
static DIMENSIONS: &[(&str, Column)] = &[
    ("Vehicle Type", Column::VehicleType),
    ("Pickup Location", Column::PickupLocation),
    ("Drop Location", Column::DropLocation),
    ("Customer ID", Column::CustomerId),
    ("Payment Method", Column::PaymentMethod),
];

/// Column behind a primary dimension, `None` for unregistered names
/// (including [`ALL_DATA`]).
pub fn column_for(dimension: &str) -> Option<Column> {
    DIMENSIONS
        .iter()
        .find(|(name, _)| *name == dimension)
        .map(|(_, column)| *column)
}

pub fn dimension_names() -> impl Iterator<Item = &'static str> {
    DIMENSIONS.iter().map(|(name, _)| *name)
}

/// Options for the primary selector: [`ALL_DATA`] first, then each dimension.
pub fn selector_options() -> Vec<&'static str> {
    std::iter::once(ALL_DATA).chain(dimension_names()).collect()
}
