use crate::error::{RequiredField, WorkflowError};
use crate::models::Quantities;

/// BAG and SMALL CAGE must be non-zero, checked in that order.
/// BIG CAGE and PALLET may be zero.
pub fn validate(quantities: &Quantities) -> Result<(), WorkflowError> {
    if quantities.bag == 0 {
        return Err(WorkflowError::Validation {
            field: RequiredField::Bag,
        });
    }
    if quantities.small_cage == 0 {
        return Err(WorkflowError::Validation {
            field: RequiredField::SmallCage,
        });
    }
    Ok(())
}
