use hateoas_resource::simplification::{assign, put, Simplification};
use hateoas_resource::{
    ExistenceCheck, PredicateCheck, Resource, ResourceBase, ResourceError, Validation,
};

/// Someone known to the server, stored in the `/people` collection.
#[derive(Debug, Clone)]
pub struct Person {
    base: ResourceBase,
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<u32>,
}

impl Person {
    pub const COLLECTION: &'static str = "/people";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }
}

impl Default for Person {
    fn default() -> Self {
        let mut validation = Validation::new();
        validation
            .add(ExistenceCheck::new("name"))
            .add(PredicateCheck::new(
                "email",
                "email must contain '@'",
                |value| value.and_then(|v| v.as_str()).map_or(true, |email| email.contains('@')),
            ))
            .add(PredicateCheck::new("age", "age must be at most 150", |value| {
                value.and_then(|v| v.as_u64()).map_or(true, |age| age <= 150)
            }));
        Self {
            base: ResourceBase::new().with_validation(validation),
            name: None,
            email: None,
            age: None,
        }
    }
}

impl Resource for Person {
    fn base(&self) -> &ResourceBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ResourceBase {
        &mut self.base
    }

    fn simplify(&self) -> Result<Simplification, ResourceError> {
        let mut simplification = self.base.simplify()?;
        put(&mut simplification, "name", &self.name)?;
        put(&mut simplification, "email", &self.email)?;
        put(&mut simplification, "age", &self.age)?;
        Ok(simplification)
    }

    fn desimplify(&mut self, simplification: &Simplification) -> Result<(), ResourceError> {
        self.base.desimplify(simplification)?;
        assign(simplification, "name", &mut self.name)?;
        assign(simplification, "email", &mut self.email)?;
        assign(simplification, "age", &mut self.age)
    }

    fn base_uri(&self) -> Result<String, ResourceError> {
        Ok(Self::COLLECTION.to_string())
    }

    fn search_uri(&self) -> Result<String, ResourceError> {
        Ok(Self::COLLECTION.to_string())
    }
}
