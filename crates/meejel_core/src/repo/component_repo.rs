//! Component repository contract and SQLite implementation.

use crate::model::component::{Component, ComponentId, ComponentType};
use crate::model::instrument::InstrumentId;
use crate::repo::rubric_repo::{
    parse_uuid, row_exists, EntityKind, RepoError, RepoResult, SqliteRubricRepository,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};

const COMPONENT_SELECT_SQL: &str =
    "SELECT uuid, instrument_uuid, description, component_type FROM components";

/// Repository interface for component CRUD operations.
pub trait ComponentRepository {
    fn create_component(&self, component: &Component) -> RepoResult<ComponentId>;
    /// Replaces description and type of an existing component.
    fn update_component(&self, component: &Component) -> RepoResult<()>;
    fn get_component(&self, id: ComponentId) -> RepoResult<Option<Component>>;
    /// Lists components of one instrument newest first, optionally filtered by type.
    fn list_components(
        &self,
        instrument: InstrumentId,
        component_type: Option<ComponentType>,
    ) -> RepoResult<Vec<Component>>;
    /// Deletes a component together with the evidence pointing at it.
    fn delete_component(&self, id: ComponentId) -> RepoResult<()>;
}

impl ComponentRepository for SqliteRubricRepository<'_> {
    fn create_component(&self, component: &Component) -> RepoResult<ComponentId> {
        component.validate()?;
        if !row_exists(self.conn, "instruments", component.instrument_uuid)? {
            return Err(RepoError::not_found(
                EntityKind::Instrument,
                component.instrument_uuid,
            ));
        }

        self.conn.execute(
            "INSERT INTO components (uuid, instrument_uuid, description, component_type)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                component.uuid.to_string(),
                component.instrument_uuid.to_string(),
                component.description.as_str(),
                component.component_type.label(),
            ],
        )?;

        Ok(component.uuid)
    }

    fn update_component(&self, component: &Component) -> RepoResult<()> {
        component.validate()?;

        let changed = self.conn.execute(
            "UPDATE components
             SET description = ?1, component_type = ?2
             WHERE uuid = ?3;",
            params![
                component.description.as_str(),
                component.component_type.label(),
                component.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Component, component.uuid));
        }

        Ok(())
    }

    fn get_component(&self, id: ComponentId) -> RepoResult<Option<Component>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COMPONENT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_component_row(row)?));
        }

        Ok(None)
    }

    fn list_components(
        &self,
        instrument: InstrumentId,
        component_type: Option<ComponentType>,
    ) -> RepoResult<Vec<Component>> {
        let mut sql = format!("{COMPONENT_SELECT_SQL} WHERE instrument_uuid = ?");
        let mut bind_values = vec![Value::Text(instrument.to_string())];

        if let Some(component_type) = component_type {
            sql.push_str(" AND component_type = ?");
            bind_values.push(Value::Text(component_type.label().to_string()));
        }
        sql.push_str(" ORDER BY rowid DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut components = Vec::new();
        while let Some(row) = rows.next()? {
            components.push(parse_component_row(row)?);
        }

        Ok(components)
    }

    fn delete_component(&self, id: ComponentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM components WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Component, id));
        }

        Ok(())
    }
}

fn parse_component_row(row: &Row<'_>) -> RepoResult<Component> {
    let uuid_text: String = row.get("uuid")?;
    let instrument_text: String = row.get("instrument_uuid")?;

    let type_text: String = row.get("component_type")?;
    let component_type = ComponentType::from_label(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid component type `{type_text}` in components.component_type"
        ))
    })?;

    let component = Component {
        uuid: parse_uuid(&uuid_text, "components.uuid")?,
        instrument_uuid: parse_uuid(&instrument_text, "components.instrument_uuid")?,
        description: row.get("description")?,
        component_type,
    };
    component.validate()?;
    Ok(component)
}
