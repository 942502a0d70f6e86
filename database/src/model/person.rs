use serde::{Deserialize, Serialize};

use crate::consts::consts::EntityId;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Person {
    pub id: EntityId,
    pub name: String,
    pub age: i32,
    pub email: String,
}

impl Person {
    /// Creates a person with a freshly generated id
    pub fn new(name: String, age: i32, email: String) -> Self {
        Person {
            id: EntityId::new(),
            name,
            age,
            email,
        }
    }

    pub fn new_test() -> Self {
        Person {
            id: EntityId("1".to_string()),
            name: "John Doe".to_string(),
            age: 30,
            email: "john@example.com".to_string(),
        }
    }
}
