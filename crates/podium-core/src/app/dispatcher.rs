//! Dispatcher - what each task kind actually does.
//!
//! Every kind maps to one or more actions against the talk room, the
//! auditorium room, the auditorium's backstage room and the management room.
//! Actions run in order and the first failure aborts the rest of that task.

use std::sync::Arc;

use tracing::debug;

use crate::domain::{
    Message, Person, Result, RoomId, RoomRole, ScheduleError, Talk, Task, TaskKind, UserId,
};
use crate::ports::{ActionSink, CheckinRegistry, PeopleDirectory, RoomDirectory};

pub struct Dispatcher {
    sink: Arc<dyn ActionSink>,
    rooms: Arc<dyn RoomDirectory>,
    people: Arc<dyn PeopleDirectory>,
    checkins: Arc<dyn CheckinRegistry>,
}

impl Dispatcher {
    pub fn new(
        sink: Arc<dyn ActionSink>,
        rooms: Arc<dyn RoomDirectory>,
        people: Arc<dyn PeopleDirectory>,
        checkins: Arc<dyn CheckinRegistry>,
    ) -> Self {
        Self {
            sink,
            rooms,
            people,
            checkins,
        }
    }

    pub async fn dispatch(&self, task: &Task) -> Result<()> {
        let talk = &task.talk;
        match task.kind {
            TaskKind::TalkStart1H => {
                self.say(
                    RoomRole::Talk,
                    talk,
                    Message::plain(format!(
                        "{} starts in about an hour. Please make sure you are around and \
                         send a message here when you are ready.",
                        talk.display_title()
                    )),
                )
                .await
            }
            TaskKind::TalkCheckin45M => self.nag_missing(talk, 45, &[RoomRole::Talk]).await,
            TaskKind::TalkCheckin30M => {
                self.nag_missing(talk, 30, &[RoomRole::Talk, RoomRole::Backstage])
                    .await
            }
            TaskKind::TalkCheckin15M => {
                self.nag_missing(
                    talk,
                    15,
                    &[RoomRole::Talk, RoomRole::Backstage, RoomRole::Management],
                )
                .await
            }
            TaskKind::TalkStart5M => {
                let note = if talk.prerecorded {
                    "Your recording will be played automatically."
                } else {
                    "You will be live for the whole slot, so please be ready on stream."
                };
                self.say(
                    RoomRole::Talk,
                    talk,
                    Message::plain(format!(
                        "{} starts in about 5 minutes. {note}",
                        talk.display_title()
                    )),
                )
                .await?;
                self.say(
                    RoomRole::Auditorium,
                    talk,
                    announcement("Up next", talk, "Starts in about 5 minutes."),
                )
                .await
            }
            TaskKind::TalkStart => {
                let auditorium = self.room_for(RoomRole::Auditorium, talk)?;
                self.sink.reset_vote_board(&auditorium).await?;

                let detail = if talk.prerecorded {
                    "Ask your questions in this room and upvote the ones you want answered."
                } else {
                    "This talk is live and the whole slot is Q&A: ask your questions in this \
                     room and upvote the ones you want answered."
                };
                self.sink
                    .send_message(&auditorium, &announcement("Starting now", talk, detail))
                    .await?;
                self.say(
                    RoomRole::Talk,
                    talk,
                    Message::plain(format!("{} is starting now.", talk.display_title())),
                )
                .await
            }
            TaskKind::TalkQa5M => {
                self.say(
                    RoomRole::Talk,
                    talk,
                    Message::plain(format!(
                        "Q&A for {} starts in about 5 minutes. The most upvoted questions \
                         from the auditorium will be read out.",
                        talk.display_title()
                    )),
                )
                .await?;
                self.say(
                    RoomRole::Auditorium,
                    talk,
                    announcement(
                        "Q&A soon",
                        talk,
                        "Q&A starts in about 5 minutes. Post your questions and upvote \
                         the ones you like.",
                    ),
                )
                .await
            }
            TaskKind::TalkQa => {
                let ends = format!(
                    "The livestream ends at {}.",
                    talk.livestream_end.format("%H:%M UTC")
                );
                self.say(
                    RoomRole::Auditorium,
                    talk,
                    announcement("Q&A starting", talk, &ends),
                )
                .await?;
                self.say(
                    RoomRole::Talk,
                    talk,
                    Message::plain(format!("Your Q&A is starting now. {ends}")),
                )
                .await
            }
            TaskKind::TalkEnd5M => {
                self.say(
                    RoomRole::Talk,
                    talk,
                    Message::plain(format!(
                        "{} ends in about 5 minutes. The next talk starts automatically \
                         afterwards.",
                        talk.display_title()
                    )),
                )
                .await
            }
            TaskKind::TalkEnd1M => {
                let talk_room = self.room_for(RoomRole::Talk, talk)?;
                self.sink
                    .send_message(
                        &talk_room,
                        &Message::plain("About a minute left. Time to wrap up."),
                    )
                    .await?;
                self.say(
                    RoomRole::Auditorium,
                    talk,
                    announcement(
                        "Ending soon",
                        talk,
                        &format!("The conversation continues in {talk_room} after the talk."),
                    ),
                )
                .await
            }
            TaskKind::TalkEnd => {
                let talk_room = self.room_for(RoomRole::Talk, talk)?;
                self.sink.make_room_public(&talk_room).await?;
                self.say(RoomRole::Auditorium, talk, summary(talk, &talk_room))
                    .await?;
                self.sink
                    .send_message(
                        &talk_room,
                        &Message::plain(
                            "The talk has ended. This room is now open to the public.",
                        ),
                    )
                    .await
            }
        }
    }

    /// Best-effort notice to the management room.
    pub async fn notify_management(&self, text: impl Into<String>) -> Result<()> {
        let room = self.rooms.management_room();
        self.sink.send_message(&room, &Message::plain(text)).await
    }

    async fn say(&self, role: RoomRole, talk: &Talk, message: Message) -> Result<()> {
        let room = self.room_for(role, talk)?;
        self.sink.send_message(&room, &message).await
    }

    fn room_for(&self, role: RoomRole, talk: &Talk) -> Result<RoomId> {
        let found = match role {
            RoomRole::Talk => self.rooms.talk_room(&talk.id),
            RoomRole::Auditorium => self.rooms.auditorium_room(&talk.auditorium_id),
            RoomRole::Backstage => self.rooms.backstage_room(&talk.auditorium_id),
            RoomRole::Management => Some(self.rooms.management_room()),
        };
        found.ok_or_else(|| ScheduleError::RoomNotFound {
            role,
            subject: match role {
                RoomRole::Talk => talk.id.to_string(),
                _ => talk.auditorium_id.to_string(),
            },
        })
    }

    /// Mention everyone required for `talk` who has not checked in, in each
    /// of `audiences`, then re-arm their check-in expectation.
    async fn nag_missing(&self, talk: &Talk, minutes: i64, audiences: &[RoomRole]) -> Result<()> {
        let mut missing: Vec<(Person, UserId)> = Vec::new();
        for person in self.people.required_people(talk).await? {
            let Some(user) = person.user_id.clone() else {
                debug!(talk_id = %talk.id, person = %person.name, "no chat identity, cannot check in");
                continue;
            };
            if !self.checkins.is_checked_in(&user).await? {
                missing.push((person, user));
            }
        }

        if missing.is_empty() {
            debug!(talk_id = %talk.id, minutes, "everyone checked in");
            return Ok(());
        }

        let message = checkin_nag(talk, minutes, &missing);
        for role in audiences {
            self.say(*role, talk, message.clone()).await?;
        }

        let users: Vec<UserId> = missing.into_iter().map(|(_, user)| user).collect();
        self.checkins.expect_checkin_from(&users).await
    }
}

fn announcement(heading: &str, talk: &Talk, detail: &str) -> Message {
    Message::html(
        format!("{heading}: {}. {detail}", talk.display_title()),
        format!(
            "<h3>{}: {}</h3><p>{}</p>",
            escape_html(heading),
            escape_html(talk.display_title()),
            escape_html(detail)
        ),
    )
}

fn summary(talk: &Talk, talk_room: &RoomId) -> Message {
    let title = talk.display_title();
    let mut text = format!("{title} has ended. Continue the discussion in {talk_room}.");
    let mut html = format!(
        "<h3>{}</h3><ul><li>Discussion: <a href=\"https://matrix.to/#/{}\">{}</a></li>",
        escape_html(title),
        escape_html(talk_room.as_str()),
        escape_html(talk_room.as_str()),
    );
    if talk.has_qa() {
        text.push_str(" Unanswered questions can be asked there too.");
        html.push_str("<li>Unanswered questions can be asked there too</li>");
    }
    html.push_str("</ul>");
    Message::html(text, html)
}

fn checkin_nag(talk: &Talk, minutes: i64, missing: &[(Person, UserId)]) -> Message {
    let names: Vec<String> = missing
        .iter()
        .map(|(person, user)| format!("{} ({user})", person.name))
        .collect();
    let links: Vec<String> = missing
        .iter()
        .map(|(person, user)| {
            format!(
                "<a href=\"https://matrix.to/#/{}\">{}</a>",
                escape_html(user.as_str()),
                escape_html(&person.name)
            )
        })
        .collect();
    let ask = format!(
        "please check in. {} starts in about {minutes} minutes and you have not checked in \
         yet. Send any message in the talk room to check in.",
        talk.display_title()
    );
    Message::html(
        format!("{}: {ask}", names.join(", ")),
        format!("{}: {}", links.join(", "), escape_html(&ask)),
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
