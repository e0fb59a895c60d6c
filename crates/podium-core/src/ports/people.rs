//! PeopleDirectory port - トークに必要な人（登壇者・ホスト・コーディネーター）

use async_trait::async_trait;

use crate::domain::{Person, Result, Talk};

#[async_trait]
pub trait PeopleDirectory: Send + Sync {
    async fn required_people(&self, talk: &Talk) -> Result<Vec<Person>>;
}
