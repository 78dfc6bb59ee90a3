use gencrud_store::GenCrud;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, GenCrud)]
pub struct Node {
    #[persisted]
    pub label: String,
    #[persisted]
    pub children: Vec<Self>,
    #[persisted]
    pub parent: Option<Box<Self>>,
}

async fn graft(actor: &NodeActor, root: &Node) -> Result<Node, gencrud_store::StoreError> {
    let leaf = actor.create("leaf".into(), Vec::new(), None).await?;
    actor
        .update(root, None, Some(vec![leaf.clone()]), None)
        .await?;
    Ok(leaf)
}

fn main() {
    let _ = graft;
}
