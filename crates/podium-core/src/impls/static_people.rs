//! StaticPeopleDirectory - トークごとの必要人員を固定表から引く

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{Person, Result, Talk, TalkId};
use crate::ports::PeopleDirectory;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct StaticPeopleDirectory {
    people: HashMap<TalkId, Vec<Person>>,
}

impl StaticPeopleDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_people(mut self, talk: impl Into<TalkId>, people: Vec<Person>) -> Self {
        self.people.insert(talk.into(), people);
        self
    }
}

#[async_trait]
impl PeopleDirectory for StaticPeopleDirectory {
    async fn required_people(&self, talk: &Talk) -> Result<Vec<Person>> {
        Ok(self.people.get(&talk.id).cloned().unwrap_or_default())
    }
}
