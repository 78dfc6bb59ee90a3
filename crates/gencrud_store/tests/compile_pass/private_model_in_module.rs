mod notes {
    use gencrud_store::GenCrud;

    #[derive(Debug, GenCrud)]
    pub(crate) struct Note {
        #[persisted]
        r#type: String,
        #[persisted]
        object: String,
        #[persisted]
        configuration: Option<String>,
    }
}

async fn touch(actor: &notes::NoteActor) -> Result<(), gencrud_store::StoreError> {
    let note = actor.create("memo".into(), "desk".into(), None).await?;
    actor.update(&note, None, Some("shelf".into()), Some(None)).await?;
    actor.delete(&note).await?;
    Ok(())
}

fn main() {
    let _ = touch;
}
