use uuid::Uuid;

use crate::error::DomainError;

/// Resolve the venue a field belongs to.
pub async fn get_venue_id_for_field(
    db: &infra::db::Db,
    field_id: Uuid,
) -> Result<Uuid, DomainError> {
    let field = infra::repos::fields::get_by_id(db, field_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Field", field_id))?;
    Ok(field.venue_id)
}
