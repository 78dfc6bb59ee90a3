use gencrud_store::{GenCrud, ObjectId};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Post {
    pub title: String,
}

#[derive(Debug, GenCrud)]
pub struct User {
    #[persisted(primary_key)]
    pub id: ObjectId,
    #[persisted(indexed)]
    pub name: String,
    #[persisted]
    pub posts: Vec<Post>,
    #[persisted]
    pub scores: HashMap<String, Vec<u32>>,
    #[persisted]
    pub nested: Option<BTreeMap<String, (u8, bool)>>,
    #[persisted]
    pub digest: [u8; 4],
    pub cache: Vec<String>,
}

fn main() {
    let _ = User::list();
}
