use crate::{error::PhantomServerError, world::EntityDefinition};

/// Where `reload_all` reads entity definitions from
pub trait DefinitionSource {
    fn definitions(&self) -> Result<Vec<EntityDefinition>, PhantomServerError>;
}

impl DefinitionSource for Vec<EntityDefinition> {
    fn definitions(&self) -> Result<Vec<EntityDefinition>, PhantomServerError> {
        Ok(self.clone())
    }
}

/// A JSON array of entity definitions
#[derive(Clone, Debug)]
pub struct JsonDefinitions(pub String);

impl JsonDefinitions {
    pub fn new(json: impl Into<String>) -> Self {
        Self(json.into())
    }
}

impl DefinitionSource for JsonDefinitions {
    fn definitions(&self) -> Result<Vec<EntityDefinition>, PhantomServerError> {
        serde_json::from_str(&self.0).map_err(|err| PhantomServerError::DefinitionSource {
            reason: err.to_string(),
        })
    }
}
