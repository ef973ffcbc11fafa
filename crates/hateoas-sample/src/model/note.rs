use hateoas_resource::simplification::{assign, put, Simplification};
use hateoas_resource::{ExistenceCheck, Resource, ResourceBase, ResourceError, Validation};

/// A short text note, stored in the `/notes` collection.
///
/// A note needs a title before the server will take it seriously; the
/// validation attached by [`Default`] reports a missing one.
#[derive(Debug, Clone)]
pub struct Note {
    base: ResourceBase,
    pub title: Option<String>,
    pub message: Option<String>,
}

impl Note {
    pub const COLLECTION: &'static str = "/notes";

    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

impl Default for Note {
    fn default() -> Self {
        let mut validation = Validation::new();
        validation.add(ExistenceCheck::new("title").with_message("A note needs a title"));
        Self {
            base: ResourceBase::new().with_validation(validation),
            title: None,
            message: None,
        }
    }
}

impl Resource for Note {
    fn base(&self) -> &ResourceBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ResourceBase {
        &mut self.base
    }

    fn simplify(&self) -> Result<Simplification, ResourceError> {
        let mut simplification = self.base.simplify()?;
        put(&mut simplification, "title", &self.title)?;
        put(&mut simplification, "message", &self.message)?;
        Ok(simplification)
    }

    fn desimplify(&mut self, simplification: &Simplification) -> Result<(), ResourceError> {
        self.base.desimplify(simplification)?;
        assign(simplification, "title", &mut self.title)?;
        assign(simplification, "message", &mut self.message)
    }

    fn base_uri(&self) -> Result<String, ResourceError> {
        Ok(Self::COLLECTION.to_string())
    }

    fn search_uri(&self) -> Result<String, ResourceError> {
        Ok(Self::COLLECTION.to_string())
    }
}
