use gencrud_store::GenCrud;

#[derive(Debug, GenCrud)]
pub struct Session {
    #[persisted(primary_key)]
    pub token: String,
    #[persisted]
    pub user: String,
    pub open: bool,
}

impl Drop for Session {
    fn drop(&mut self) {
        self.open = false;
    }
}

async fn rename(session: &mut Session) -> Result<(), gencrud_store::StoreError> {
    session.update(None, Some("guest".into())).await?;
    session.delete().await
}

fn main() {
    let _ = rename;
}
